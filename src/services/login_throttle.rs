//! Failed-login accounting per client.
//!
//! A client that fails `max_attempts` logins inside the rolling window is
//! locked out for `lockout_seconds`. A successful login forgets the client.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::AuthThrottleConfig;

/// Tracked clients before stale entries are swept on the next failure.
const SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct Attempts {
    failures: u32,
    window_started: Instant,
    locked_until: Option<Instant>,
}

pub struct LoginThrottle {
    max_attempts: u32,
    window: Duration,
    lockout: Duration,
    clients: Mutex<HashMap<String, Attempts>>,
}

impl LoginThrottle {
    #[must_use]
    pub fn new(config: &AuthThrottleConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            window: Duration::from_secs(config.window_seconds),
            lockout: Duration::from_secs(config.lockout_seconds),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Remaining lockout for `client`, `None` when it may try again.
    #[must_use]
    pub fn retry_after(&self, client: &str) -> Option<Duration> {
        self.retry_after_at(client, Instant::now())
    }

    /// Counts one failed login. Returns the lockout when this failure
    /// triggered one.
    pub fn record_failure(&self, client: &str) -> Option<Duration> {
        self.record_failure_at(client, Instant::now())
    }

    pub fn record_success(&self, client: &str) {
        self.lock().remove(client);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Attempts>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn retry_after_at(&self, client: &str, now: Instant) -> Option<Duration> {
        if self.max_attempts == 0 {
            return None;
        }

        self.lock()
            .get(client)
            .and_then(|attempts| attempts.locked_until)
            .filter(|until| *until > now)
            .map(|until| until - now)
    }

    fn record_failure_at(&self, client: &str, now: Instant) -> Option<Duration> {
        if self.max_attempts == 0 {
            return None;
        }

        let mut clients = self.lock();
        if clients.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, attempts| {
                attempts.locked_until.is_some_and(|until| until > now)
                    || now.duration_since(attempts.window_started) < window
            });
        }

        let attempts = clients.entry(client.to_string()).or_insert(Attempts {
            failures: 0,
            window_started: now,
            locked_until: None,
        });

        if now.duration_since(attempts.window_started) >= self.window
            || attempts.locked_until.is_some_and(|until| until <= now)
        {
            *attempts = Attempts {
                failures: 0,
                window_started: now,
                locked_until: None,
            };
        }

        attempts.failures += 1;
        if attempts.failures >= self.max_attempts {
            attempts.locked_until = Some(now + self.lockout);
            return Some(self.lockout);
        }

        None
    }
}
