use ledger_core::TransactionCache;
use ledger_parser::error::ParseError;

use crate::settings::Settings;

/// Turns ledger text into transactions with their line spans.
///
/// Implementations must report `first_line`/`last_line` consistent with splitting the text on
/// `'\n'`; deletion relies on it.
pub trait TransactionParser: Send + Sync {
    fn parse(&self, text: &str, settings: &Settings) -> Result<TransactionCache, ParseError>;
}

/// The bundled pest grammar.
#[derive(Copy, Clone, Debug, Default)]
pub struct LedgerParser;

impl TransactionParser for LedgerParser {
    fn parse(&self, text: &str, _settings: &Settings) -> Result<TransactionCache, ParseError> {
        ledger_parser::parse(text)
    }
}
