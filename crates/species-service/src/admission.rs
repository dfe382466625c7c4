//! Per-instance sliding-window admission control
//!
//! Each instance keeps the timestamps of the requests it admitted during
//! the trailing window. A request is admitted only while fewer than
//! `limit` timestamps remain after pruning. Instances never coordinate, so
//! the aggregate limit of a deployment is the sum of its instances' limits.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Length of the sliding window
pub const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Rejected,
}

pub struct AdmissionController {
    limit: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl AdmissionController {
    pub fn new(limit: usize) -> Self {
        Self::with_window(limit, WINDOW)
    }

    pub fn with_window(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            timestamps: Mutex::new(VecDeque::with_capacity(limit.min(4096))),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Decide on a request arriving at `now`.
    ///
    /// Pruning, the limit check and recording `now` happen under one lock,
    /// so two callers can never both take the last free slot.
    pub fn admit(&self, now: Instant) -> Admission {
        let mut timestamps = self.lock();
        self.decide(&mut timestamps, now)
    }

    /// Decide on a request arriving now. The clock is read under the lock,
    /// which keeps the window ordered.
    pub fn admit_now(&self) -> Admission {
        let mut timestamps = self.lock();
        self.decide(&mut timestamps, Instant::now())
    }

    /// Requests admitted within the trailing window, as of now
    pub fn window_len(&self) -> usize {
        let mut timestamps = self.lock();
        self.prune(&mut timestamps, Instant::now());
        timestamps.len()
    }

    fn prune(&self, timestamps: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = timestamps.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn decide(&self, timestamps: &mut VecDeque<Instant>, now: Instant) -> Admission {
        self.prune(timestamps, now);

        let window_size = timestamps.len();
        debug!(window_size, limit = self.limit, "Admission check");

        if window_size >= self.limit {
            warn!(window_size, limit = self.limit, "Rate limit exceeded");
            return Admission::Rejected;
        }

        timestamps.push_back(now);
        Admission::Accepted
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        // The window stays consistent even if a holder panicked
        self.timestamps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
