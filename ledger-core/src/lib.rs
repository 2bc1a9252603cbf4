pub use cache::TransactionCache;
pub use expense_line::ExpenseLine;
pub use stamp::SourceStamp;
pub use status::Status;
pub use transaction::{Block, Transaction};

pub mod cache;
pub mod expense_line;
pub mod stamp;
pub mod status;
pub mod transaction;

pub use rust_decimal::Decimal;
