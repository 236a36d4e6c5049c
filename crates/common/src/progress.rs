//! Progress callbacks, throttled reporting and cooperative cancellation.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::OperationCancelled;

/// Generic progress callback trait.
///
/// Type parameter `T` is the progress data type, allowing different
/// operations to report different progress information while sharing
/// the same callback pattern.
pub trait ProgressCallback<T>: Send + Sync {
    /// Called with progress updates.
    ///
    /// # Arguments
    /// * `progress` - Progress data for the current operation
    ///
    /// # Returns
    /// - `true` to continue the operation
    /// - `false` to cancel the operation
    fn on_progress(&self, progress: &T) -> bool;
}

/// A no-op progress callback that always continues.
pub struct NoOpProgress;

impl<T> ProgressCallback<T> for NoOpProgress {
    fn on_progress(&self, _progress: &T) -> bool {
        true
    }
}

/// A progress callback that wraps a closure.
pub struct FnProgress<F, T> {
    callback: F,
    _marker: PhantomData<T>,
}

impl<F, T> FnProgress<F, T>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    /// Create a new closure-based progress callback.
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            _marker: PhantomData,
        }
    }
}

impl<F, T> ProgressCallback<T> for FnProgress<F, T>
where
    F: Fn(&T) -> bool + Send + Sync,
    T: Send + Sync,
{
    fn on_progress(&self, progress: &T) -> bool {
        (self.callback)(progress)
    }
}

/// Create a progress callback from a closure.
///
/// # Arguments
/// * `f` - Closure that receives progress and returns whether to continue
pub fn progress_fn<F, T>(f: F) -> FnProgress<F, T>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    FnProgress::new(f)
}

/// Status of a long-running lookup operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// High-level activity, e.g. "Refreshing".
    pub activity: &'static str,
    /// Step within the activity, e.g. "Hashing files".
    pub operation: &'static str,
    /// Item being processed, usually a file path.
    pub current_item: Option<String>,
    /// Units processed so far.
    pub current: u64,
    /// Total units, when known.
    pub total: Option<u64>,
    /// Time since the operation started.
    pub elapsed: Duration,
}

impl ProgressEvent {
    /// Create an event without item or counters.
    pub fn new(activity: &'static str, operation: &'static str) -> Self {
        Self {
            activity,
            operation,
            current_item: None,
            current: 0,
            total: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Attach the item being processed.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.current_item = Some(item.into());
        self
    }

    /// Attach progress counters.
    pub fn with_progress(mut self, current: u64, total: u64) -> Self {
        self.current = current;
        self.total = Some(total);
        self
    }

    /// Attach a running count when the total is not known yet.
    pub fn with_current(mut self, current: u64) -> Self {
        self.current = current;
        self
    }

    /// Attach the elapsed time of the operation.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Percentage complete rounded to two decimals, if a non-zero total is known.
    pub fn percent_complete(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => {
                let percent: f64 = self.current as f64 / total as f64 * 100.0;
                Some((percent * 100.0).round() / 100.0)
            }
            _ => None,
        }
    }

    /// Estimated seconds remaining, extrapolated from the average time per unit so far.
    pub fn seconds_remaining(&self) -> Option<u64> {
        let total: u64 = self.total.filter(|t: &u64| *t > 0)?;
        if self.elapsed.is_zero() {
            return None;
        }
        let per_unit: f64 = self.elapsed.as_secs_f64() / self.current.max(1) as f64;
        let remaining: u64 = total.saturating_sub(self.current);
        Some((per_unit * remaining as f64).round() as u64)
    }
}

/// Shared flag used to request cooperative cancellation from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every operation observing this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear a previous cancellation request.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`OperationCancelled`] if cancellation has been requested.
    pub fn check(&self) -> Result<(), OperationCancelled> {
        if self.is_cancelled() {
            Err(OperationCancelled)
        } else {
            Ok(())
        }
    }
}

/// Rate-limited front end for a [`ProgressCallback`].
///
/// `tick` is meant to be called once per processed item. The cancel token
/// is checked on every tick, while the callback only runs when at least
/// `interval` has passed since the previous report. A zero interval (or no
/// callback) disables reporting entirely.
pub struct ThrottledReporter<'a, T> {
    callback: Option<&'a dyn ProgressCallback<T>>,
    cancel: Option<&'a CancelToken>,
    interval: Duration,
    started: Instant,
    last_report: Instant,
}

impl<'a, T> ThrottledReporter<'a, T> {
    /// Create a reporter.
    ///
    /// # Arguments
    /// * `callback` - Optional sink for progress events
    /// * `interval` - Minimum time between two callbacks (zero disables reporting)
    pub fn new(callback: Option<&'a dyn ProgressCallback<T>>, interval: Duration) -> Self {
        let now: Instant = Instant::now();
        Self {
            callback,
            cancel: None,
            interval,
            started: now,
            last_report: now,
        }
    }

    /// Observe `cancel` on every tick.
    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Check for cancellation without reporting.
    ///
    /// # Errors
    /// Returns [`OperationCancelled`] if the token has been cancelled.
    pub fn check_cancelled(&self) -> Result<(), OperationCancelled> {
        match self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    /// Record one unit of work, reporting if the interval has elapsed.
    ///
    /// `make` receives the elapsed time of the operation and is only called
    /// when a report is actually sent.
    ///
    /// # Errors
    /// Returns [`OperationCancelled`] if the token was cancelled or the
    /// callback asked to stop.
    pub fn tick<F>(&mut self, make: F) -> Result<(), OperationCancelled>
    where
        F: FnOnce(Duration) -> T,
    {
        self.check_cancelled()?;

        let callback: &dyn ProgressCallback<T> = match self.callback {
            Some(cb) if !self.interval.is_zero() => cb,
            _ => return Ok(()),
        };

        if self.last_report.elapsed() < self.interval {
            return Ok(());
        }

        let event: T = make(self.started.elapsed());
        self.last_report = Instant::now();

        if callback.on_progress(&event) {
            Ok(())
        } else {
            Err(OperationCancelled)
        }
    }
}
