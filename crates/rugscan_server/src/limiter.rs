//! Fixed-window request counter per caller.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

struct Window {
    count: u32,
    resets_at: Instant,
}

pub struct RateLimiter {
    window: Duration,
    max: u32,
    callers: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max: u32) -> Self {
        Self {
            window,
            max,
            callers: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `caller`. False once it is over the limit for the current window.
    pub fn check(&self, caller: &str) -> bool {
        self.check_at(caller, Instant::now())
    }

    pub fn check_at(&self, caller: &str, now: Instant) -> bool {
        let mut callers = self.callers.lock().unwrap_or_else(PoisonError::into_inner);
        let w = callers.entry(caller.to_string()).or_insert(Window {
            count: 0,
            resets_at: now + self.window,
        });
        if now > w.resets_at {
            w.count = 0;
            w.resets_at = now + self.window;
        }
        w.count = w.count.saturating_add(1);
        w.count <= self.max
    }

    /// Drop callers whose window has ended.
    pub fn purge_at(&self, now: Instant) -> usize {
        let mut callers = self.callers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = callers.len();
        callers.retain(|_, w| w.resets_at >= now);
        before - callers.len()
    }
}
