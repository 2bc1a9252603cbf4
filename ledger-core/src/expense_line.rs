use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use super::status::Status;

/// A single posting of a transaction: an amount moved into or out of an account.
///
/// Within a transaction the last line is special. Ledger allows its amount to be left out, in
/// which case it is whatever makes the transaction sum to zero:
///
/// ```text
/// 2024-01-01 Store
///     Checking    $-42.50
///     Groceries
/// ```
#[derive(Clone, Debug, Eq, PartialEq, TypedBuilder)]
pub struct ExpenseLine {
    /// Account as written in the file.
    pub account: String,

    /// Amount posted to the account. For an elided amount this is the balancing value.
    pub amount: Decimal,

    /// Commodity written next to the amount, `None` if the amount was elided or bare.
    #[builder(default)]
    pub currency: Option<String>,

    /// Trailing `; comment` of the posting line.
    #[builder(default)]
    pub comment: Option<String>,

    #[builder(default)]
    pub status: Option<Status>,

    /// Account after `alias` directives have been applied.
    #[builder(default)]
    pub dealiased_account: Option<String>,
}

impl ExpenseLine {
    /// Account name with aliases resolved, falling back to the written name.
    pub fn resolved_account(&self) -> &str {
        self.dealiased_account.as_deref().unwrap_or(&self.account)
    }
}
