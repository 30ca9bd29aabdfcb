//! Load generations.
//!
//! Every load takes a token from the session's generation counter. Logout,
//! refresh and newer loads bump the counter, after which older tokens are stale
//! and their results must be discarded.
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct LoadGeneration {
    current: Arc<AtomicU64>,
}

/// Ticket of one load.
#[derive(Clone, Debug)]
pub struct LoadToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl LoadGeneration {
    /// Starts a new generation and returns its token; older tokens become stale.
    pub fn begin(&self) -> LoadToken {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        LoadToken {
            generation,
            current: self.current.clone(),
        }
    }

    /// Makes every outstanding token stale.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

impl LoadToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_load_supersedes() {
        let generation = LoadGeneration::default();
        let first = generation.begin();
        assert!(first.is_current());
        let second = generation.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn test_invalidate() {
        let generation = LoadGeneration::default();
        let token = generation.begin();
        generation.invalidate();
        assert!(!token.is_current());
        assert!(generation.begin().is_current());
    }
}
