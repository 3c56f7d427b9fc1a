use std::collections::HashSet;

/// Mints already handled during this run.
///
/// Entries are never removed; the set lives as long as the monitor does and
/// is independent of what the record file already holds.
#[derive(Debug, Default)]
pub struct ProcessedMints {
    seen: HashSet<String>,
}

impl ProcessedMints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, mint: &str) -> bool {
        self.seen.contains(mint)
    }

    /// Returns true if the mint was not seen before.
    pub fn add(&mut self, mint: &str) -> bool {
        if self.seen.contains(mint) {
            return false;
        }
        self.seen.insert(mint.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// True for discovery entries worth a summary fetch.
pub fn should_process(processed: &ProcessedMints, mint: &str) -> bool {
    !mint.is_empty() && !processed.contains(mint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut processed = ProcessedMints::new();
        assert!(processed.add("So11111111111111111111111111111111111111112"));
        assert!(!processed.add("So11111111111111111111111111111111111111112"));
        assert_eq!(processed.len(), 1);
    }

    #[test]
    fn empty_and_seen_mints_are_filtered() {
        let mut processed = ProcessedMints::new();
        assert!(!should_process(&processed, ""));
        assert!(should_process(&processed, "A"));
        processed.add("A");
        assert!(!should_process(&processed, "A"));
        assert!(should_process(&processed, "B"));
    }
}
