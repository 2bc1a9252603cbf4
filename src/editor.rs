use std::sync::Arc;

use ledger_core::{Block, SourceStamp, Transaction};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::vault::Vault;

/// Edits a ledger file in place by line span.
///
/// The target file can be swapped with [`set_ledger_file`](Self::set_ledger_file) when the
/// configured ledger moves.
#[derive(Debug)]
pub struct LedgerEditor<V: Vault> {
    vault: Arc<V>,
    ledger_file: V::File,
}

impl<V: Vault> LedgerEditor<V> {
    pub fn new(vault: Arc<V>, ledger_file: V::File) -> Self {
        LedgerEditor { vault, ledger_file }
    }

    pub fn set_ledger_file(&mut self, ledger_file: V::File) {
        self.ledger_file = ledger_file;
    }

    pub fn ledger_file(&self) -> &V::File {
        &self.ledger_file
    }

    /// Removes the lines `tx` was parsed from.
    ///
    /// `tx` must come from a parse of the file's current text. When its block carries a stamp
    /// that does not match the text read here, or its lines are out of range, nothing is written
    /// and [`LedgerError::StaleSpan`] is returned.
    pub async fn delete_transaction(&self, tx: &Transaction) -> Result<(), LedgerError> {
        let contents = self.vault.cached_read(&self.ledger_file).await?;
        let updated = remove_block(&contents, &tx.block)?;
        self.vault.modify(&self.ledger_file, &updated).await?;
        debug!(
            file = ?self.ledger_file,
            first_line = tx.block.first_line,
            last_line = tx.block.last_line,
            "deleted transaction"
        );
        Ok(())
    }
}

/// Returns `text` without the lines covered by `block`.
pub fn remove_block(text: &str, block: &Block) -> Result<String, LedgerError> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let line_count = lines.len();
    let stale = LedgerError::StaleSpan {
        first_line: block.first_line,
        last_line: block.last_line,
        line_count,
    };

    if let Some(stamp) = block.stamp {
        if stamp != SourceStamp::of(text) {
            warn!(?stamp, "ledger changed since the transaction was read");
            return Err(stale);
        }
    }
    if block.first_line > block.last_line || block.last_line >= line_count {
        warn!(
            first_line = block.first_line,
            last_line = block.last_line,
            line_count,
            "transaction span out of range"
        );
        return Err(stale);
    }

    lines.drain(block.first_line..=block.last_line);
    Ok(lines.join("\n"))
}
