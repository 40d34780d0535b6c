//! Generated field ids

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::IdStrategy;

/// Produces ids for fields that need one but were declared without.
///
/// Random ids are not checked for collisions; two fields in one form are
/// unlikely to draw the same suffix.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: String,
    strategy: IdStrategy,
    counter: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("form-input-", IdStrategy::Random)
    }
}

impl IdGenerator {
    pub fn new(prefix: &str, strategy: IdStrategy) -> Self {
        Self {
            prefix: prefix.to_string(),
            strategy,
            counter: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        match self.strategy {
            IdStrategy::Random => {
                let suffix = uuid::Uuid::new_v4().simple().to_string();
                format!("{}{}", self.prefix, &suffix[..11])
            }
            IdStrategy::Sequential => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
                format!("{}{}", self.prefix, n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_have_prefix() {
        let ids = IdGenerator::default();
        let first = ids.next_id();
        let second = ids.next_id();
        assert!(first.starts_with("form-input-"));
        assert_eq!(first.len(), "form-input-".len() + 11);
        assert_ne!(first, second);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = IdGenerator::new("field-", IdStrategy::Sequential);
        assert_eq!(ids.next_id(), "field-1");
        assert_eq!(ids.next_id(), "field-2");
    }
}
