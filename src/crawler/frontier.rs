//! Frontier shared by the detail workers

use crate::cache::{FrontierCache, RunKey};
use crate::Result;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug)]
struct FrontierState {
    pending: VecDeque<String>,
    completed: usize,
}

/// A queue of URLs drained by several workers, checkpointed to a
/// [`FrontierCache`] every `checkpoint_every` completions
///
/// URLs popped but not yet finished are not part of a checkpoint; a run
/// killed mid-fetch loses at most one URL per worker.
#[derive(Debug)]
pub struct SharedFrontier {
    state: Mutex<FrontierState>,
    checkpoint_every: usize,
}

impl SharedFrontier {
    pub fn new(urls: Vec<String>, checkpoint_every: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState {
                pending: urls.into(),
                completed: 0,
            }),
            checkpoint_every: checkpoint_every.max(1),
        }
    }

    // A panicking worker cannot leave the queue half-updated, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the next URL, if any
    pub fn pop(&self) -> Option<String> {
        self.lock().pending.pop_front()
    }

    /// Records one finished URL and checkpoints when due
    ///
    /// The save happens under the lock so checkpoints are written in order.
    ///
    /// # Returns
    ///
    /// `true` if a checkpoint was written
    pub fn finish_one(&self, cache: &FrontierCache, key: &RunKey) -> Result<bool> {
        let mut state = self.lock();
        state.completed += 1;

        if state.completed % self.checkpoint_every != 0 {
            return Ok(false);
        }

        let remaining: Vec<String> = state.pending.iter().cloned().collect();
        cache.save(key, &remaining)?;
        debug!(
            "Checkpointed detail frontier: {} done, {} left",
            state.completed,
            remaining.len()
        );
        Ok(true)
    }

    /// Writes the URLs still pending
    pub fn checkpoint(&self, cache: &FrontierCache, key: &RunKey) -> Result<()> {
        let state = self.lock();
        let remaining: Vec<String> = state.pending.iter().cloned().collect();
        cache.save(key, &remaining)
    }

    pub fn completed(&self) -> usize {
        self.lock().completed
    }

    pub fn remaining(&self) -> usize {
        self.lock().pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn key() -> RunKey {
        RunKey::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "xiaoqu", "detail")
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://h/xiaoqu/{}/", i)).collect()
    }

    #[test]
    fn test_pops_in_order() {
        let frontier = SharedFrontier::new(urls(2), 10);
        assert_eq!(frontier.pop().as_deref(), Some("https://h/xiaoqu/0/"));
        assert_eq!(frontier.pop().as_deref(), Some("https://h/xiaoqu/1/"));
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_checkpoints_every_n_completions() {
        let dir = TempDir::new().unwrap();
        let cache = FrontierCache::new(dir.path());
        let frontier = SharedFrontier::new(urls(5), 2);

        frontier.pop();
        assert!(!frontier.finish_one(&cache, &key()).unwrap());
        assert_eq!(cache.load(&key()), None);

        frontier.pop();
        assert!(frontier.finish_one(&cache, &key()).unwrap());
        assert_eq!(cache.load(&key()), Some(urls(5)[2..].to_vec()));
        assert_eq!(frontier.completed(), 2);
        assert_eq!(frontier.remaining(), 3);
    }

    #[test]
    fn test_zero_interval_checkpoints_every_time() {
        let dir = TempDir::new().unwrap();
        let cache = FrontierCache::new(dir.path());
        let frontier = SharedFrontier::new(urls(1), 0);

        frontier.pop();
        assert!(frontier.finish_one(&cache, &key()).unwrap());
        assert_eq!(cache.load(&key()), Some(vec![]));
    }
}
