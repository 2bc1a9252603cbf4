use ledger_core::TransactionCache;
use tracing::debug;

use crate::error::LedgerError;
use crate::parser::TransactionParser;
use crate::settings::Settings;
use crate::vault::{FileLocator, Vault};

/// Reads and parses the ledger at `ledger_file_path`.
///
/// A path that resolves to no file is the normal state before the first transaction is
/// recorded, so it yields `Ok(None)` rather than an error.
pub async fn get_transaction_cache<L, V, P>(
    locator: &L,
    vault: &V,
    parser: &P,
    settings: &Settings,
    ledger_file_path: &str,
) -> Result<Option<TransactionCache>, LedgerError>
where
    L: FileLocator<V::File> + ?Sized,
    V: Vault + ?Sized,
    P: TransactionParser + ?Sized,
{
    let file = match locator.locate(ledger_file_path) {
        Some(file) => file,
        None => {
            debug!(path = %ledger_file_path, "unable to find ledger file to parse");
            return Ok(None);
        }
    };

    let contents = vault.read(&file).await?;
    let cache = parser.parse(&contents, settings)?;
    debug!(file = ?file, transactions = cache.len(), "loaded ledger");
    Ok(Some(cache))
}
