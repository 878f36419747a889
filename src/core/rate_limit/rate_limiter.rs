// Per-user cooldown gate for the `/ask` command.
//
// The limiter only remembers when each user was last *allowed* through.
// A denied call never moves that timestamp, so spamming the command does not
// push the cooldown further out.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Default cooldown between two allowed `/ask` calls for the same user.
pub const ASK_COOLDOWN: Duration = Duration::from_millis(5000);

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Still cooling down. Carries the time left until the next allowed call.
    Denied(Duration),
}

impl RateLimitDecision {
    /// Remaining cooldown rounded up to whole seconds, as shown to users.
    /// `Allowed` reports zero.
    pub fn remaining_secs(&self) -> u64 {
        match self {
            RateLimitDecision::Allowed => 0,
            RateLimitDecision::Denied(remaining) => {
                let millis = remaining.as_millis() as u64;
                millis.div_ceil(1000)
            }
        }
    }
}

/// Storage-agnostic contract for the cooldown gate.
///
/// Callers only ever see `check_and_record`, so the backing map can be
/// replaced by an evicting cache without touching the command layer.
pub trait RateLimiter: Send + Sync {
    /// Check whether `user_id` may proceed at `now`, recording `now` as the
    /// new baseline when it may.
    fn check_and_record(&self, user_id: u64, now: Instant) -> RateLimitDecision;
}

/// In-process limiter backed by a concurrent map.
pub struct InMemoryRateLimiter {
    window: Duration,
    /// Maps user_id -> last allowed request.
    last_allowed: DashMap<u64, Instant>,
}

impl InMemoryRateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_allowed: DashMap::new(),
        }
    }

    /// Number of users currently tracked.
    pub fn tracked_users(&self) -> usize {
        self.last_allowed.len()
    }

    /// Drop entries whose cooldown already expired at `now`.
    ///
    /// An expired entry would let the next call through anyway, so pruning
    /// never changes a decision. Returns how many entries were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.last_allowed.len();
        self.last_allowed
            .retain(|_, last| now.saturating_duration_since(*last) < self.window);
        before.saturating_sub(self.last_allowed.len())
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new(ASK_COOLDOWN)
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check_and_record(&self, user_id: u64, now: Instant) -> RateLimitDecision {
        // entry() holds the shard lock for this key, so check and record
        // happen together for a given user.
        match self.last_allowed.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed < self.window {
                    return RateLimitDecision::Denied(self.window - elapsed);
                }
                entry.insert(now);
                RateLimitDecision::Allowed
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                RateLimitDecision::Allowed
            }
        }
    }
}
