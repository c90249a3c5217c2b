//! Crawl frontier: pending URLs plus the dedup record of URLs ever seen
//!
//! The queue, the seen-set, and the in-flight count are guarded as a single
//! unit so that a duplicate-check-then-enqueue can never race another
//! worker's push, and termination detection can never observe a popped entry
//! that is not yet counted as in flight.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use url::Url;

/// A URL queued for fetching, with its discovery distance from a seed
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

#[derive(Default)]
struct FrontierInner {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
    in_flight: usize,
}

/// Thread-safe FIFO frontier with at-most-once admission per URL
///
/// URLs are marked seen at push time, not at fetch time, so two links to the
/// same target discovered concurrently cannot both pass the not-seen check.
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    max_depth: Option<u32>,
}

impl Frontier {
    pub fn new(max_depth: Option<u32>) -> Self {
        Self {
            inner: Mutex::new(FrontierInner::default()),
            max_depth,
        }
    }

    /// Adds a URL at the given depth unless it was already seen or lies
    /// beyond the depth limit
    ///
    /// Returns true if the URL was enqueued.
    pub fn push(&self, url: Url, depth: u32) -> bool {
        if let Some(max_depth) = self.max_depth {
            if depth > max_depth {
                return false;
            }
        }

        let mut inner = self.inner.lock().unwrap();
        if !inner.seen.insert(url.as_str().to_string()) {
            return false;
        }
        inner.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Pops the next entry in FIFO order and counts it as in flight
    ///
    /// Returns None when the queue is momentarily empty; that is not a
    /// termination signal while other workers may still enqueue more.
    pub fn claim(&self) -> Option<FrontierEntry> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner.queue.pop_front();
        if entry.is_some() {
            inner.in_flight += 1;
        }
        entry
    }

    /// Marks a previously claimed entry as fully processed
    pub fn complete(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }

    /// Number of entries waiting to be claimed
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().queue.is_empty()
    }

    /// Number of distinct URLs ever admitted
    pub fn seen_count(&self) -> usize {
        self.inner.lock().unwrap().seen.len()
    }

    /// Number of claimed-but-unfinished entries
    pub fn in_flight(&self) -> usize {
        self.inner.lock().unwrap().in_flight
    }

    /// True when the queue is empty and no claimed entry is outstanding
    ///
    /// This is the crawl's terminal condition: nothing left to pull and no
    /// worker that could still push discoveries.
    pub fn is_drained(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.queue.is_empty() && inner.in_flight == 0
    }
}
