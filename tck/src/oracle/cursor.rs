use std::fmt;

use serde::{Deserialize, Serialize};

/// Round-robin mint cursor (`nextPartnerToMint`).
///
/// Stored lazily wrapped: a raw value at or past the ledger length is read
/// as 0 the next time a partner is picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintCursor(u64);

impl MintCursor {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Index the cursor points at for a ledger of `len` records.
    pub fn resolve(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match usize::try_from(self.0) {
            Ok(index) if index < len => Some(index),
            _ => Some(0),
        }
    }

    /// Pick the current index and move past it.
    ///
    /// Leaves the cursor untouched when the ledger is empty.
    pub fn advance(&mut self, len: usize) -> Option<usize> {
        let index = self.resolve(len)?;
        self.0 = index as u64 + 1;
        Some(index)
    }
}

impl fmt::Display for MintCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_wrap() {
        let mut cursor = MintCursor::new(3);
        assert_eq!(cursor.resolve(3), Some(0));
        assert_eq!(cursor.advance(3), Some(0));
        assert_eq!(cursor.raw(), 1);
    }

    #[test]
    fn test_empty_ledger() {
        let mut cursor = MintCursor::new(2);
        assert_eq!(cursor.advance(0), None);
        assert_eq!(cursor.raw(), 2);
    }

    #[test]
    fn test_stays_unwrapped_after_last_index() {
        let mut cursor = MintCursor::new(1);
        assert_eq!(cursor.advance(2), Some(1));
        // raw value equals the length until the next pick
        assert_eq!(cursor.raw(), 2);
    }
}
