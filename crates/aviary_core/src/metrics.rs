//! Training metrics and structured logging.
//!
//! Counters are plain atomics so read-only observers (the trainer, tests, a
//! future UI) can sample them through a shared reference.

use aviary_data::DeathCause;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-engine statistics collector.
pub struct Metrics {
    tick_count: AtomicU64,
    rollover_count: AtomicU64,
    live_controllers: AtomicU64,
    spawned: AtomicU64,
    disposed: AtomicU64,
    collisions: AtomicU64,
    timeouts: AtomicU64,
    completions: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            rollover_count: AtomicU64::new(0),
            live_controllers: AtomicU64::new(0),
            spawned: AtomicU64::new(0),
            disposed: AtomicU64::new(0),
            collisions: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            completions: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, alive: usize) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;

        // Log at info level every 1000 ticks
        if tick % 1000 == 0 {
            tracing::info!(
                tick = tick,
                alive = alive,
                live_controllers = self.live_controllers(),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_rollover(&self) {
        self.rollover_count.fetch_add(1, Ordering::Relaxed);
    }

    /// A drone (and its controller) entered the simulation.
    pub fn record_spawn(&self) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
        self.live_controllers.fetch_add(1, Ordering::Relaxed);
    }

    /// A drone was disposed and its controller released.
    pub fn record_dispose(&self) {
        self.disposed.fetch_add(1, Ordering::Relaxed);
        // Saturating: a detached snapshot disposed outside the engine never
        // incremented the gauge.
        let _ = self
            .live_controllers
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n.saturating_sub(1))
            });
    }

    pub fn record_death(&self, cause: DeathCause) {
        let counter = match cause {
            DeathCause::Collision => &self.collisions,
            DeathCause::Timeout => &self.timeouts,
            DeathCause::Completed => &self.completions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(cause = cause.as_str(), "Drone destroyed");
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rollover_count(&self) -> u64 {
        self.rollover_count.load(Ordering::Relaxed)
    }

    /// Controllers currently owned by live or waiting drones.
    #[must_use]
    pub fn live_controllers(&self) -> u64 {
        self.live_controllers.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn disposed(&self) -> u64 {
        self.disposed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deaths(&self, cause: DeathCause) -> u64 {
        match cause {
            DeathCause::Collision => self.collisions.load(Ordering::Relaxed),
            DeathCause::Timeout => self.timeouts.load(Ordering::Relaxed),
            DeathCause::Completed => self.completions.load(Ordering::Relaxed),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honors `RUST_LOG`; defaults to `info`. Calling it twice is harmless.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.live_controllers(), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_millis(16), 100);
        assert_eq!(metrics.tick_count(), 1);
    }

    #[test]
    fn test_live_controller_gauge() {
        let metrics = Metrics::new();
        metrics.record_spawn();
        metrics.record_spawn();
        metrics.record_dispose();
        assert_eq!(metrics.live_controllers(), 1);
        assert_eq!(metrics.spawned(), 2);
        assert_eq!(metrics.disposed(), 1);
    }

    #[test]
    fn test_gauge_never_underflows() {
        let metrics = Metrics::new();
        metrics.record_dispose();
        assert_eq!(metrics.live_controllers(), 0);
    }

    #[test]
    fn test_deaths_by_cause() {
        let metrics = Metrics::new();
        metrics.record_death(DeathCause::Timeout);
        metrics.record_death(DeathCause::Timeout);
        metrics.record_death(DeathCause::Collision);
        assert_eq!(metrics.deaths(DeathCause::Timeout), 2);
        assert_eq!(metrics.deaths(DeathCause::Collision), 1);
        assert_eq!(metrics.deaths(DeathCause::Completed), 0);
    }
}
