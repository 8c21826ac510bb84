//! Fixed-backoff retry for store reads

use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

/// Waits between attempts
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<F: FnMut(Duration)> Sleeper for F {
    fn sleep(&mut self, duration: Duration) {
        self(duration)
    }
}

/// How often and how patiently to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first failure
    pub retries: u32,
    /// Wait before each retry, in milliseconds
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Run `op` until it succeeds or the retries are used up
    ///
    /// On failure returns the number of attempts made and the last error.
    pub fn run<T, E: Display>(
        &self,
        sleeper: &mut dyn Sleeper,
        mut op: impl FnMut() -> Result<T, E>,
    ) -> Result<T, (u32, E)> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt <= self.retries => {
                    warn!(
                        "attempt {} failed: {}; retrying ({}/{})",
                        attempt, err, attempt, self.retries
                    );
                    sleeper.sleep(self.backoff());
                    attempt += 1;
                }
                Err(err) => {
                    error!("giving up after {} attempts: {}", attempt, err);
                    return Err((attempt, err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_succeeds_after_failures() {
        let mut calls = 0;
        let mut waits = Vec::new();
        let result = RetryPolicy::default().run(&mut |d: Duration| waits.push(d), || {
            calls += 1;
            if calls < 3 {
                Err("busy")
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(3));
        assert_eq!(waits, vec![Duration::from_millis(1000); 2]);
    }

    #[test]
    fn test_gives_up_after_retries() {
        let mut waits = 0;
        let result: Result<(), _> =
            RetryPolicy::default().run(&mut |_: Duration| waits += 1, || Err("down"));
        assert_eq!(result, Err((4, "down")));
        assert_eq!(waits, 3);
    }

    #[test]
    fn test_no_retries() {
        let policy = RetryPolicy {
            retries: 0,
            backoff_ms: 5,
        };
        let result: Result<(), _> = policy.run(&mut ThreadSleeper, || Err("down"));
        assert_eq!(result, Err((1, "down")));
    }
}
