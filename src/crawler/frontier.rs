//! Bounded FIFO frontier shared by all crawl workers
//!
//! The frontier is the only backpressure point of a crawl: `put` parks the
//! caller while the queue is full and `take` parks it while the queue is
//! empty. It also tracks how many taken URLs are still being processed, which
//! is how a session detects that it has run out of work, and how many
//! producers are parked on a full queue, which is how it detects that no
//! worker is left to drain it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::Notify;
use url::Url;

/// Returned by [`Frontier::put`] once the frontier has been closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frontier is closed")]
pub struct FrontierClosed;

/// Bounded blocking queue of URLs awaiting fetch
pub struct Frontier {
    state: Mutex<FrontierState>,
    capacity: usize,

    /// Number of producers that, all parked in `put`, can make no progress
    stall_limit: Option<usize>,
    not_empty: Notify,
    not_full: Notify,
}

#[derive(Default)]
struct FrontierState {
    queue: VecDeque<Url>,

    /// Occurrence count of each queued URL, for O(1) membership tests
    queued: HashMap<Url, usize>,

    /// URLs handed out by `take` whose processing has not finished
    outstanding: usize,

    /// Callers currently waiting in `put` for room
    parked_producers: usize,

    closed: bool,
    stalled: bool,
}

impl FrontierState {
    fn push(&mut self, url: Url) {
        *self.queued.entry(url.clone()).or_insert(0) += 1;
        self.queue.push_back(url);
    }

    fn pop(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        if let Some(count) = self.queued.get_mut(&url) {
            *count -= 1;
            if *count == 0 {
                self.queued.remove(&url);
            }
        }
        Some(url)
    }

    fn is_quiescent(&self) -> bool {
        self.outstanding == 0 && self.parked_producers == 0 && self.queue.is_empty()
    }
}

impl Frontier {
    /// Creates an empty frontier holding at most `capacity` URLs
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            capacity: capacity.max(1),
            stall_limit: None,
            not_empty: Notify::new(),
            not_full: Notify::new(),
        }
    }

    /// Creates a frontier drained and filled by a pool of `workers`
    ///
    /// When every worker is parked in `put` on a full queue, nobody is left
    /// to `take`: the frontier then closes itself and reports the session as
    /// stalled instead of hanging.
    pub fn with_workers(capacity: usize, workers: usize) -> Self {
        Self {
            stall_limit: Some(workers.max(1)),
            ..Self::new(capacity)
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues a URL, waiting while the frontier is full
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The URL was enqueued
    /// * `Err(FrontierClosed)` - The frontier was closed, or stalled, before
    ///   space freed up
    pub async fn put(&self, url: Url) -> Result<(), FrontierClosed> {
        let mut parked = false;
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    if parked {
                        state.parked_producers -= 1;
                    }
                    return Err(FrontierClosed);
                }
                if state.queue.len() < self.capacity {
                    if parked {
                        state.parked_producers -= 1;
                    }
                    state.push(url);
                    drop(state);
                    self.not_empty.notify_one();
                    return Ok(());
                }
                if !parked {
                    parked = true;
                    state.parked_producers += 1;
                    if self
                        .stall_limit
                        .is_some_and(|limit| state.parked_producers >= limit)
                    {
                        state.parked_producers -= 1;
                        state.closed = true;
                        state.stalled = true;
                        let queued = state.queue.len();
                        drop(state);
                        tracing::warn!(
                            "Every worker is waiting on a full frontier ({} queued), stopping",
                            queued
                        );
                        self.wake_all();
                        return Err(FrontierClosed);
                    }
                }
            }

            notified.await;
        }
    }

    /// Enqueues a URL only if there is room right now
    pub fn try_put(&self, url: Url) -> Result<bool, FrontierClosed> {
        let mut state = self.lock();
        if state.closed {
            return Err(FrontierClosed);
        }
        if state.queue.len() >= self.capacity {
            return Ok(false);
        }
        state.push(url);
        drop(state);
        self.not_empty.notify_one();
        Ok(true)
    }

    /// Removes the oldest URL, waiting while the frontier is empty
    ///
    /// Every URL returned here counts as outstanding until [`task_done`] is
    /// called for it.
    ///
    /// Returns `None` once the frontier is closed, either explicitly or
    /// because it went quiescent.
    ///
    /// [`task_done`]: Frontier::task_done
    pub async fn take(&self) -> Option<Url> {
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }
                if let Some(url) = state.pop() {
                    state.outstanding += 1;
                    drop(state);
                    self.not_full.notify_one();
                    return Some(url);
                }
            }

            notified.await;
        }
    }

    /// Marks one URL obtained from `take` as fully processed
    ///
    /// When the queue is empty and nothing is outstanding any more, no worker
    /// can produce new URLs: the frontier closes itself and every parked
    /// `take` returns `None`.
    pub fn task_done(&self) {
        let mut state = self.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        self.close_if_quiescent(state);
    }

    fn close_if_quiescent(&self, mut state: MutexGuard<'_, FrontierState>) {
        if state.is_quiescent() && !state.closed {
            state.closed = true;
            drop(state);
            tracing::debug!("Frontier is quiescent, closing");
            self.wake_all();
        }
    }

    /// Closes the frontier
    ///
    /// Further `put` calls fail, `take` returns `None`, and every caller
    /// parked in either is woken up.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.wake_all();
    }

    fn wake_all(&self) {
        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
    }

    /// Drops every queued URL
    ///
    /// With nothing outstanding and no producer waiting, the frontier is then
    /// quiescent and closes just as it would in [`task_done`].
    ///
    /// [`task_done`]: Frontier::task_done
    pub fn clear(&self) {
        let mut state = self.lock();
        state.queue.clear();
        state.queued.clear();
        self.not_full.notify_waiters();
        self.close_if_quiescent(state);
    }

    /// Returns true if the URL is currently queued
    pub fn contains(&self, url: &Url) -> bool {
        self.lock().queued.contains_key(url)
    }

    /// Returns the number of queued URLs
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Returns the fixed capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of taken URLs still being processed
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    /// Returns whether the frontier has been closed
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns whether the frontier closed because every worker was parked
    /// on a full queue
    pub fn is_stalled(&self) -> bool {
        self.lock().stalled
    }
}
