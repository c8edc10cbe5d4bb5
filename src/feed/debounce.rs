use std::time::Duration;

use tokio::time::Instant;

/// Quiet period before typed search text is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds the latest value until input has been quiet for `delay`.
///
/// Every [`push`](Self::push) restarts the timer. The owner polls from its
/// event loop tick; nothing is spawned.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// When the pending value becomes ready, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value once its quiet period has elapsed.
    pub fn poll(&mut self) -> Option<T> {
        match &self.pending {
            Some((_, at)) if Instant::now() >= *at => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Take the pending value immediately, ignoring the timer.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}
