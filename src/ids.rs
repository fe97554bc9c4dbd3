use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of opaque identifiers for files and folders.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Hands out `prefix-1`, `prefix-2`, ... in call order.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> SequentialIds {
        SequentialIds {
            prefix: prefix.to_string(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new("file");
        assert_eq!(ids.next_id(), "file-1");
        assert_eq!(ids.next_id(), "file-2");
    }

    #[test]
    fn uuids_are_distinct() {
        let ids = UuidGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
