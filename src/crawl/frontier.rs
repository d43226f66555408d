//! Breadth-first crawl frontier

use std::collections::{HashSet, VecDeque};

/// FIFO queue of pending URLs that admits each URL at most once per run
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    seen: HashSet<String>,
}

impl Frontier {
    /// Create an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `url` unless it was ever enqueued before. Returns whether it was added.
    pub fn push(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Next URL in discovery order
    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Pending URL count
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending URLs in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut f = Frontier::new();
        f.push("a".into());
        f.push("b".into());
        f.push("c".into());
        assert_eq!(f.pop().as_deref(), Some("a"));
        assert_eq!(f.pop().as_deref(), Some("b"));
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn test_enqueued_at_most_once() {
        let mut f = Frontier::new();
        assert!(f.push("a".into()));
        assert!(!f.push("a".into()));
        assert_eq!(f.pop().as_deref(), Some("a"));
        // Still rejected after it left the queue
        assert!(!f.push("a".into()));
        assert!(f.is_empty());
    }
}
