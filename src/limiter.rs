// SPDX-FileCopyrightText: 2026 routecast contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Token bucket rate limiter for external provider calls.
//!
//! Both public providers used by this crate enforce usage policies (Nominatim
//! allows roughly one request per second). Call sites await
//! [`RateLimiter::acquire`] immediately before each outbound request; the
//! first acquisition on a fresh limiter is free, later ones wait until a
//! token is available.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

/// An awaitable token bucket shared between clones.
///
/// Tokens replenish at a fixed rate and each acquisition consumes one. With
/// [`RateLimiter::with_min_delay`] the bucket holds a single token, which
/// degenerates into a fixed minimum gap between consecutive requests - the
/// shape the geocoding sequence needs.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    state: Arc<Mutex<BucketState>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `requests` per `period`.
    pub fn new(requests: u32, period: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(BucketState::new(requests, period))),
        }
    }

    /// Creates a limiter enforcing a minimum delay between requests.
    ///
    /// Equivalent to a single-token bucket refilling once per `delay`; no
    /// bursts are possible.
    pub fn with_min_delay(delay: Duration) -> Self {
        Self::new(1, delay)
    }

    /// Acquires a token, sleeping until one is available.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                state.try_acquire()
            };

            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }
}

/// Internal token bucket state.
#[derive(Debug)]
struct BucketState {
    /// Maximum number of tokens available
    capacity: u32,
    /// Current number of available tokens
    tokens: f64,
    /// Token replenishment rate (tokens per nanosecond)
    refill_rate: f64,
    /// Last time tokens were refilled
    last_refill: Instant,
}

impl BucketState {
    fn new(requests: u32, period: Duration) -> Self {
        // A zero period would make the refill rate infinite; clamp so the
        // degenerate "no pacing" limiter stays finite.
        let period = period.max(Duration::from_nanos(1));
        let refill_rate = requests as f64 / period.as_nanos() as f64;
        Self {
            capacity: requests,
            tokens: requests as f64,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    /// Try to acquire a token, returning the wait time if not available.
    fn try_acquire(&mut self) -> Option<Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let needed = 1.0 - self.tokens;
            let wait_nanos = needed / self.refill_rate;
            Some(Duration::from_nanos(wait_nanos as u64))
        }
    }

    /// Refill tokens based on elapsed time.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_nanos() as f64 * self.refill_rate;

        self.tokens = (self.tokens + new_tokens).min(self.capacity as f64);
        self.last_refill = now;
    }
}
