use crate::error::UmError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tracing::warn;

/// Cooperative shutdown flag shared between the signal handler and the sampling loop.
///
/// Clones observe the same flag. Once requested it stays requested.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn request(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once shutdown has been requested.
    pub async fn requested(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|requested| *requested).await;
    }
}

/// Why a wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Deadline,
    Shutdown,
}

/// Fixed-rate schedule built on absolute deadlines.
///
/// Each deadline is the previous deadline plus the interval, never "now plus
/// the interval", so time spent doing I/O inside a cycle does not accumulate
/// into drift. After an overrun the missed deadlines fire back to back.
#[derive(Debug, Clone)]
pub struct Schedule {
    interval: Duration,
    deadline: Instant,
}

impl Schedule {
    /// Convert a sampling interval in seconds into a [`Duration`].
    ///
    /// The value is split into whole seconds and a nanosecond remainder
    /// rounded to the nearest nanosecond.
    pub fn interval_from_secs(secs: f64) -> Result<Duration, UmError> {
        if !secs.is_finite() || secs <= 0.0 || secs >= u64::MAX as f64 {
            return Err(UmError::InvalidInterval(secs));
        }
        let whole = secs.trunc();
        let nanos = ((secs - whole) * 1e9).round() as u64;
        match Duration::from_secs(whole as u64).checked_add(Duration::from_nanos(nanos)) {
            Some(interval) if !interval.is_zero() => Ok(interval),
            _ => Err(UmError::InvalidInterval(secs)),
        }
    }

    /// Start a schedule whose first cycle is due now.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            interval,
            deadline: start,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Move the deadline one interval forward from the previous deadline.
    pub fn advance(&mut self) -> Result<Instant, UmError> {
        self.deadline = self
            .deadline
            .checked_add(self.interval)
            .ok_or_else(|| UmError::Clock("next sampling deadline is not representable".to_string()))?;
        Ok(self.deadline)
    }

    /// Block until the current deadline or until shutdown is requested.
    pub async fn wait(&self, shutdown: &Shutdown) -> Wake {
        if shutdown.is_requested() {
            return Wake::Shutdown;
        }
        tokio::select! {
            biased;
            _ = shutdown.requested() => Wake::Shutdown,
            _ = sleep_until(self.deadline) => Wake::Deadline,
        }
    }

    /// Advance to the next deadline and wait for it.
    pub async fn tick(&mut self, shutdown: &Shutdown) -> Result<Wake, UmError> {
        let deadline = self.advance()?;
        let now = Instant::now();
        if now > deadline {
            warn!(
                behind_ms = now.duration_since(deadline).as_millis() as u64,
                interval_ms = self.interval.as_millis() as u64,
                "Sampling cycle overran its deadline"
            );
        }
        Ok(self.wait(shutdown).await)
    }
}
