//! Fixed-window request rate limiting.
//!
//! Counters are keyed by `(identity, operation class)` with a distinct
//! limit per class -- unauthenticated trial generation is far cheaper to
//! abuse than an authenticated paid edit, so the classes are throttled
//! independently.
//!
//! State lives in this process's memory behind an `RwLock`; under multiple
//! instances the counters under-count true request volume. This is an
//! approximate, best-effort guard, not a precise quota system.
//!
//! To bound memory against identity spoofing, cleanup of expired windows
//! runs every `cleanup_interval` checks and the number of tracked keys is
//! hard-capped; at the cap, requests from new identities are rejected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::error::CoreError;

/// Operation classes guarded by the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// Unauthenticated one-shot trial generation, keyed by caller address.
    TrialGeneration,
    /// First-time site generation on an owned project.
    SiteGeneration,
    /// Paid free-text AI edit.
    AiEdit,
}

impl OperationClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TrialGeneration => "trial_generation",
            Self::SiteGeneration => "site_generation",
            Self::AiEdit => "ai_edit",
        }
    }
}

/// Limit for one operation class: `max_requests` per fixed `window`.
#[derive(Debug, Clone, Copy)]
pub struct ClassLimit {
    pub max_requests: u32,
    pub window: Duration,
}

/// Limiter configuration with per-class limits.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub trial_generation: ClassLimit,
    pub site_generation: ClassLimit,
    pub ai_edit: ClassLimit,
    /// Run expired-window cleanup every N checks.
    pub cleanup_interval: u64,
    /// Hard cap on tracked `(identity, class)` keys.
    pub max_tracked_keys: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            trial_generation: ClassLimit {
                max_requests: 3,
                window: Duration::from_secs(24 * 3600),
            },
            site_generation: ClassLimit {
                max_requests: 5,
                window: Duration::from_secs(3600),
            },
            ai_edit: ClassLimit {
                max_requests: 20,
                window: Duration::from_secs(3600),
            },
            cleanup_interval: 100,
            max_tracked_keys: 10_000,
        }
    }
}

impl RateLimitConfig {
    fn limit_for(&self, class: OperationClass) -> ClassLimit {
        match class {
            OperationClass::TrialGeneration => self.trial_generation,
            OperationClass::SiteGeneration => self.site_generation,
            OperationClass::AiEdit => self.ai_edit,
        }
    }
}

/// One active fixed window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window rate limiter keyed by `(identity, operation class)`.
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    state: RwLock<HashMap<(String, OperationClass), Window>>,
    check_count: AtomicU64,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: RwLock::new(HashMap::new()),
            check_count: AtomicU64::new(0),
        }
    }

    /// Check and count one request for `identity` in `class`.
    ///
    /// Starting (or restarting) a window counts the request and allows it;
    /// within a live window the request is allowed while the count is below
    /// the class limit, else rejected with the seconds remaining until the
    /// window rolls over.
    pub fn check(&self, identity: &str, class: OperationClass) -> Result<(), CoreError> {
        self.check_at(identity, class, Instant::now())
    }

    fn check_at(
        &self,
        identity: &str,
        class: OperationClass,
        now: Instant,
    ) -> Result<(), CoreError> {
        let limit = self.config.limit_for(class);

        // Relaxed is fine: a missed or doubled cleanup is harmless.
        let count = self.check_count.fetch_add(1, Ordering::Relaxed);
        if count > 0 && count % self.config.cleanup_interval == 0 {
            self.cleanup_at(now);
        }

        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let key = (identity.to_string(), class);
        if !state.contains_key(&key) && state.len() >= self.config.max_tracked_keys {
            drop(state);
            self.cleanup_at(now);
            state = self
                .state
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if !state.contains_key(&key) && state.len() >= self.config.max_tracked_keys {
                tracing::warn!(
                    identity,
                    class = class.as_str(),
                    tracked = state.len(),
                    "Rate limiter key cap reached, rejecting new identity"
                );
                return Err(CoreError::RateLimited {
                    retry_after_secs: limit.window.as_secs(),
                });
            }
        }

        match state.get_mut(&key) {
            Some(window) if now.duration_since(window.started) < limit.window => {
                if window.count < limit.max_requests {
                    window.count += 1;
                    Ok(())
                } else {
                    let elapsed = now.duration_since(window.started);
                    let retry_after_secs = limit
                        .window
                        .checked_sub(elapsed)
                        .map_or(1, |d| d.as_secs().max(1));
                    tracing::warn!(
                        identity,
                        class = class.as_str(),
                        count = window.count,
                        max = limit.max_requests,
                        "Rate limit exceeded"
                    );
                    Err(CoreError::RateLimited { retry_after_secs })
                }
            }
            _ => {
                // No window, or the previous one has expired.
                state.insert(
                    key,
                    Window {
                        started: now,
                        count: 1,
                    },
                );
                Ok(())
            }
        }
    }

    /// Drop every window that has already expired.
    fn cleanup_at(&self, now: Instant) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.retain(|(_, class), window| {
            now.duration_since(window.started) < self.config.limit_for(*class).window
        });
    }

    /// Number of tracked `(identity, class)` keys (for tests and metrics).
    pub fn tracked_keys(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
