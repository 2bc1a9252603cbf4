use std::fmt;

/// Identifies the exact text snapshot a set of line numbers refers to.
///
/// Line spans recorded by the parser are only meaningful against the text they were read from.
/// Comparing the stamp of that text with the stamp of the current text tells whether a span can
/// still be applied.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct SourceStamp {
    digest: [u8; 32],
    line_count: usize,
}

impl SourceStamp {
    pub fn of(text: &str) -> Self {
        SourceStamp {
            digest: *blake3::hash(text.as_bytes()).as_bytes(),
            line_count: line_count(text),
        }
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Number of lines the text splits into on `'\n'`. An empty text has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

impl fmt::Debug for SourceStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.digest[..6].iter().map(|b| format!("{:02x}", b)).collect();
        f.debug_struct("SourceStamp")
            .field("digest", &short)
            .field("line_count", &self.line_count)
            .finish()
    }
}

pub fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_lines_like_split() {
        for text in &["", "a", "a\n", "a\nb", "\n\n", "a\r\nb\r\n"] {
            assert_eq!(SourceStamp::of(text).line_count(), text.split('\n').count());
        }
    }

    #[test]
    fn differs_on_any_edit() {
        let before = SourceStamp::of("2024-01-01 Store\n    Checking    $1.00\n    Food");
        let after = SourceStamp::of("2024-01-01 Store\n    Checking    $1.01\n    Food");
        assert_eq!(before.line_count(), after.line_count());
        assert_ne!(before, after);
        assert_eq!(before, SourceStamp::of("2024-01-01 Store\n    Checking    $1.00\n    Food"));
    }
}
