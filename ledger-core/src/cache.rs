use std::collections::{BTreeMap, BTreeSet};

use super::stamp::SourceStamp;
use super::transaction::Transaction;

/// Everything read from one ledger file.
///
/// A missing ledger file is represented by the absence of a cache, never by an empty one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionCache {
    /// Transactions in file order.
    pub transactions: Vec<Transaction>,

    /// `alias` directives, alias name to account.
    pub aliases: BTreeMap<String, String>,

    /// Every account used by a posting, dealiased, sorted and unique.
    pub accounts: Vec<String>,

    /// Every payee, sorted and unique.
    pub payees: Vec<String>,

    /// Stamp of the text the cache was built from.
    pub stamp: SourceStamp,
}

impl TransactionCache {
    pub fn new(
        transactions: Vec<Transaction>,
        aliases: BTreeMap<String, String>,
        stamp: SourceStamp,
    ) -> Self {
        let accounts: BTreeSet<&str> = transactions
            .iter()
            .flat_map(|tx| tx.expenselines.iter())
            .map(|line| line.resolved_account())
            .collect();
        let payees: BTreeSet<&str> = transactions.iter().map(|tx| tx.payee.as_str()).collect();
        let accounts = accounts.into_iter().map(String::from).collect();
        let payees = payees.into_iter().map(String::from).collect();
        TransactionCache {
            transactions,
            aliases,
            accounts,
            payees,
            stamp,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Transactions touching `account`, by written or dealiased name.
    pub fn transactions_for<'a>(
        &'a self,
        account: &'a str,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |tx| tx.involves_account(account))
    }
}
