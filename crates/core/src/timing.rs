//! Backoff and scoped benchmarking helpers, grounded in
//! `original_source/scrywarden/timing.py`.

use std::time::{Duration, Instant};

use rand::Rng;

/// Retry delay generator: quadratic growth for the first `after` attempts,
/// then linear growth past that threshold with a per-step increment that
/// itself keeps accumulating (a divergent harmonic series), with jitter
/// added to every step so concurrent backers-off don't lock-step.
///
/// Used wherever a bounded queue is full (`Queue::Full` retry) and wherever
/// an investigator polls for a rendezvous condition (previous investigation
/// committed, next event arrived).
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    after: u32,
    dividend: f64,
    attempts: u32,
    additional: f64,
}

impl ExponentialBackoff {
    pub fn new(after: u32, dividend: f64) -> Self {
        Self {
            after,
            dividend,
            attempts: 0,
            additional: 0.0,
        }
    }

    /// Mirrors `ExponentialBackoff(initialize=True)`: the first `next()`
    /// call already counts as attempt 1 rather than attempt 0, so a caller
    /// that resets-and-immediately-waits gets a nonzero delay right away.
    pub fn initialized(after: u32, dividend: f64) -> Self {
        Self {
            after,
            dividend,
            attempts: 1,
            additional: 0.0,
        }
    }

    /// Returns the delay for the next attempt and advances internal state.
    pub fn next(&mut self) -> Duration {
        self.attempts += 1;
        let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
        let seconds = if self.attempts <= self.after {
            (self.attempts as f64).powi(2) + jitter
        } else {
            self.additional += self.dividend / (self.attempts - self.after) as f64;
            (self.after as f64).powi(2) + self.additional + jitter
        };
        Duration::from_secs_f64(seconds)
    }

    /// Resets the attempt counter. `initialize` mirrors the Python
    /// `reset(initialize=True)` call used right after a successful
    /// operation that's about to be followed by another wait.
    pub fn reset(&mut self, initialize: bool) {
        self.attempts = if initialize { 1 } else { 0 };
        self.additional = 0.0;
    }
}

/// Scoped timer that logs elapsed time at `debug` on drop. Used the way the
/// original's `benchmark` was used as a context manager around
/// `Pipeline._process`.
pub struct Benchmark {
    label: &'static str,
    start: Instant,
}

impl Benchmark {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Benchmark {
    fn drop(&mut self) {
        tracing::debug!(label = self.label, elapsed_ms = self.elapsed().as_millis() as u64, "benchmark");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_quadratically_before_the_threshold() {
        let mut backoff = ExponentialBackoff::new(3, 1.0);
        let first = backoff.next().as_secs_f64();
        let second = backoff.next().as_secs_f64();
        let third = backoff.next().as_secs_f64();
        assert!(first >= 1.0 && first < 2.0);
        assert!(second >= 4.0 && second < 5.0);
        assert!(third >= 9.0 && third < 10.0);
    }

    #[test]
    fn additional_accumulates_past_the_threshold() {
        let mut backoff = ExponentialBackoff::new(2, 10.0);
        backoff.next();
        backoff.next();
        let past = backoff.next().as_secs_f64();
        // after^2 (=4) + additional (=10/1=10) + jitter in [0,1)
        assert!(past >= 14.0 && past < 15.0);
        let further = backoff.next().as_secs_f64();
        // after^2 (=4) + additional (=10 + 10/2=15) + jitter
        assert!(further >= 19.0 && further < 20.0);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut backoff = ExponentialBackoff::new(2, 1.0);
        backoff.next();
        backoff.next();
        backoff.reset(false);
        let after_reset = backoff.next().as_secs_f64();
        assert!(after_reset >= 1.0 && after_reset < 2.0);
    }
}
