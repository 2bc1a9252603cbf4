use std::fmt;

/// Clearing state of a transaction or a single posting.
///
/// ```text
/// 2024-01-03 * Landlord
///     ! Assets:Checking    $-900.00
///     Expenses:Rent
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// `*`
    Cleared,
    /// `!`
    Pending,
}

impl Status {
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "*" => Some(Status::Cleared),
            "!" => Some(Status::Pending),
            _ => None,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Status::Cleared => "*",
            Status::Pending => "!",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}
