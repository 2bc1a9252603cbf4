use ledger_core::Transaction;
use tracing::debug;

use crate::error::LedgerError;
use crate::format_expense;
use crate::settings::Settings;
use crate::vault::{FileLocator, Vault};

/// Appends a formatted block to the ledger named by `settings.ledger_file`.
///
/// An existing ledger gets `"\n"` and the block added to its end. Without one, a file is created
/// at the configured path holding just the block. The read and the write are not atomic
/// together: a concurrent writer to the same file may be overwritten.
pub async fn append_ledger<L, V>(
    locator: &L,
    vault: &V,
    settings: &Settings,
    new_expense: &str,
) -> Result<(), LedgerError>
where
    L: FileLocator<V::File> + ?Sized,
    V: Vault + ?Sized,
{
    match locator.locate(&settings.ledger_file) {
        Some(file) => {
            let contents = vault.read(&file).await?;
            vault
                .modify(&file, &format!("{}\n{}", contents, new_expense))
                .await?;
            debug!(file = ?file, bytes = new_expense.len(), "appended to ledger");
        }
        None => {
            vault.create(&settings.ledger_file, new_expense).await?;
            debug!(path = %settings.ledger_file, "created ledger");
        }
    }
    Ok(())
}

/// Formats `tx` with `settings` and appends it.
pub async fn append_transaction<L, V>(
    locator: &L,
    vault: &V,
    settings: &Settings,
    tx: &Transaction,
) -> Result<(), LedgerError>
where
    L: FileLocator<V::File> + ?Sized,
    V: Vault + ?Sized,
{
    let text = format_expense(tx, settings)?;
    append_ledger(locator, vault, settings, &text).await
}
