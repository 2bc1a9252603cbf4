use std::path::Path;

use ledger_render::RenderOptions;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// User settings the engine reads.
///
/// ```toml
/// currency_symbol = "€"
/// include_final_line_amount = true
/// ledger_file = "Finance/transactions.ledger"
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix of every rendered amount.
    #[serde(alias = "currencySymbol")]
    pub currency_symbol: String,

    /// Whether the balancing line of a new transaction shows its amount.
    #[serde(alias = "includeFinalLineAmount")]
    pub include_final_line_amount: bool,

    /// Path or display name of the ledger file inside the vault.
    #[serde(alias = "ledgerFile")]
    pub ledger_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            currency_symbol: "$".to_string(),
            include_final_line_amount: false,
            ledger_file: "transactions.ledger".to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LedgerError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            currency_symbol: self.currency_symbol.clone(),
            include_final_line_amount: self.include_final_line_amount,
        }
    }
}
