use crate::{RateLimitStatus, RateLimiter};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u64,
}

#[derive(Debug)]
struct Windows {
    by_user: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Fixed-window limiter kept in process memory. Counters are lost on restart.
pub struct MemoryRateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<Windows>,
}

impl MemoryRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(Windows {
                by_user: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Users with a window currently held in memory.
    pub async fn tracked_users(&self) -> usize {
        self.windows.lock().await.by_user.len()
    }

    fn used(&self, windows: &Windows, user: &str) -> u64 {
        match windows.by_user.get(user) {
            Some(w) if w.started.elapsed() < self.window => w.used,
            _ => 0,
        }
    }

    /// Drops expired windows, at most once per window length.
    fn sweep(&self, windows: &mut Windows) {
        if windows.last_sweep.elapsed() < self.window {
            return;
        }
        let window = self.window;
        windows
            .by_user
            .retain(|_, w| w.started.elapsed() < window);
        windows.last_sweep = Instant::now();
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn status(&self, user: &str) -> RateLimitStatus {
        let windows = self.windows.lock().await;
        RateLimitStatus::from_usage(self.used(&windows, user), self.limit)
    }

    async fn acquire(&self, user: &str) -> RateLimitStatus {
        let mut windows = self.windows.lock().await;
        self.sweep(&mut windows);
        let now = Instant::now();
        let entry = windows.by_user.entry(user.to_string()).or_insert(Window {
            started: now,
            used: 0,
        });
        if entry.started.elapsed() >= self.window {
            *entry = Window {
                started: now,
                used: 0,
            };
        }
        if entry.used >= u64::from(self.limit) {
            return RateLimitStatus::from_usage(entry.used, self.limit);
        }
        entry.used += 1;
        RateLimitStatus {
            allowed: true,
            ..RateLimitStatus::from_usage(entry.used, self.limit)
        }
    }

    async fn release(&self, user: &str) {
        let mut windows = self.windows.lock().await;
        let window = self.window;
        if let Some(w) = windows.by_user.get_mut(user) {
            if w.started.elapsed() < window {
                w.used = w.used.saturating_sub(1);
            }
        }
    }
}
