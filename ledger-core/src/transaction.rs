use typed_builder::TypedBuilder;

use super::expense_line::ExpenseLine;
use super::stamp::SourceStamp;
use super::status::Status;

/// Inclusive range of 0-indexed lines a transaction occupies in the text it was parsed from.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Block {
    pub first_line: usize,
    pub last_line: usize,

    /// Stamp of the text the line numbers were taken from. `None` for transactions that were
    /// never read from a file.
    pub stamp: Option<SourceStamp>,
}

impl Block {
    pub fn new(first_line: usize, last_line: usize, stamp: Option<SourceStamp>) -> Self {
        Block {
            first_line,
            last_line,
            stamp,
        }
    }

    /// Number of lines covered by the block.
    pub fn line_len(&self) -> usize {
        self.last_line.saturating_sub(self.first_line) + 1
    }
}

/// A dated transaction made of two or more expense lines that together sum to zero.
///
/// ```text
/// 2024-01-01=2024-01-03 * (1042) Store ; weekly shop
///     Assets:Checking    $-42.50
///     Expenses:Groceries
/// ```
#[derive(Clone, Debug, Eq, PartialEq, TypedBuilder)]
pub struct Transaction {
    /// Date as written in the ledger. Its format is a matter of ledger convention.
    pub date: String,

    pub payee: String,

    /// Postings in file order. The last one is the balancing line.
    pub expenselines: Vec<ExpenseLine>,

    /// Where the transaction was found. Only valid against the exact text it was parsed from.
    #[builder(default)]
    pub block: Block,

    /// Numeric code written in parentheses after the date.
    #[builder(default)]
    pub check: Option<u32>,

    /// Trailing `; comment` of the header line.
    #[builder(default)]
    pub comment: Option<String>,

    #[builder(default)]
    pub status: Option<Status>,
}

impl Transaction {
    /// The line that balances the others, if there is one.
    pub fn balancing_line(&self) -> Option<&ExpenseLine> {
        self.expenselines.last()
    }

    pub fn involves_account(&self, account: &str) -> bool {
        self.expenselines
            .iter()
            .any(|line| line.account == account || line.resolved_account() == account)
    }
}
