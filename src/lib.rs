//! Plain-text double-entry ledger kept inside a note vault.
//!
//! New transactions are formatted with [`format_expense`] and appended with [`append_ledger`];
//! existing ones are read back with [`get_transaction_cache`] and removed by line span with
//! [`LedgerEditor::delete_transaction`]. Storage is reached through the [`Vault`] and
//! [`FileLocator`] traits so the engine runs the same against [`MemoryVault`], [`FsVault`] or a
//! host's own storage.
//!
//! Line spans are tied to the text they were parsed from. After any append or delete, reload
//! the ledger before editing it again.

pub use ledger_core::{Block, ExpenseLine, SourceStamp, Status, Transaction, TransactionCache};

pub use editor::{remove_block, LedgerEditor};
pub use error::{LedgerError, VaultError, VaultResult};
pub use loader::get_transaction_cache;
pub use parser::{LedgerParser, TransactionParser};
pub use settings::Settings;
pub use vault::{FileLocator, FsFile, FsVault, MemoryFile, MemoryVault, Vault};
pub use writer::{append_ledger, append_transaction};

pub mod editor;
pub mod error;
pub mod loader;
pub mod parser;
pub mod settings;
pub mod vault;
pub mod writer;

/// Formats `tx` as a ledger block using the currency settings.
pub fn format_expense(tx: &Transaction, settings: &Settings) -> Result<String, LedgerError> {
    Ok(ledger_render::format_expense(
        tx,
        &settings.render_options(),
    )?)
}
