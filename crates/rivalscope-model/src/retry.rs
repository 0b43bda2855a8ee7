// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::time::{Duration, Instant};

use rivalscope_config::RetryConfig;
use tracing::warn;

use crate::{GenerateRequest, ModelError, ModelProvider, ModelReply};

/// Exponential backoff schedule derived from [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct Backoff {
    max_attempts: u32,
    initial: Duration,
    multiplier: f64,
    max_delay: Duration,
    deadline: Duration,
}

impl Backoff {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            initial: Duration::from_millis(cfg.initial_delay_ms),
            multiplier: cfg.multiplier.max(1.0),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            deadline: Duration::from_secs(cfg.deadline_secs),
        }
    }

    /// Delay to sleep after the `failed_attempt`-th failure (1-based).
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        let exp = failed_attempt.saturating_sub(1) as i32;
        let scaled = self.initial.as_secs_f64() * self.multiplier.powi(exp);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Call `provider.generate`, retrying only [`ModelError::RateLimited`].
///
/// `on_retry(attempt, delay)` runs before every backoff sleep.  When the
/// attempt budget or the total deadline is exhausted the last rate-limit
/// error is returned unchanged; every other error is returned immediately.
pub async fn generate_with_backoff<F>(
    provider: &dyn ModelProvider,
    req: &GenerateRequest,
    backoff: &Backoff,
    mut on_retry: F,
) -> Result<ModelReply, ModelError>
where
    F: FnMut(u32, Duration),
{
    let started = Instant::now();
    let mut attempt = 1;
    loop {
        match provider.generate(req).await {
            Ok(reply) => return Ok(reply),
            Err(ModelError::RateLimited(msg)) => {
                if attempt >= backoff.max_attempts {
                    warn!(attempt, "rate limit persisted after all retries");
                    return Err(ModelError::RateLimited(msg));
                }
                let delay = backoff.delay_after(attempt);
                if started.elapsed() + delay > backoff.deadline {
                    warn!(attempt, "rate limit retry deadline exceeded");
                    return Err(ModelError::RateLimited(msg));
                }
                warn!(attempt, delay_ms = delay.as_millis() as u64, "rate limited, backing off");
                on_retry(attempt, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedMockProvider;

    fn fast(max_attempts: u32) -> Backoff {
        Backoff::from_config(&RetryConfig {
            max_attempts,
            initial_delay_ms: 1,
            multiplier: 2.0,
            max_delay_ms: 4,
            deadline_secs: 5,
        })
    }

    #[test]
    fn default_schedule_doubles_and_caps() {
        let b = Backoff::from_config(&RetryConfig::default());
        assert_eq!(b.delay_after(1), Duration::from_secs(2));
        assert_eq!(b.delay_after(2), Duration::from_secs(4));
        assert_eq!(b.delay_after(3), Duration::from_secs(8));
        assert_eq!(b.delay_after(10), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn rate_limit_then_success_is_retried() {
        let p = ScriptedMockProvider::new(vec![
            Err(ModelError::RateLimited("quota".into())),
            Err(ModelError::RateLimited("quota".into())),
            Ok(ModelReply::text("ok")),
        ]);
        let mut retries = Vec::new();
        let reply = generate_with_backoff(&p, &GenerateRequest::default(), &fast(5), |a, _| {
            retries.push(a)
        })
        .await
        .unwrap();
        assert_eq!(reply.joined_text(), "ok");
        assert_eq!(retries, vec![1, 2]);
        assert_eq!(p.call_count(), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_return_rate_limited() {
        let p = ScriptedMockProvider::new(vec![
            Err(ModelError::RateLimited("a".into())),
            Err(ModelError::RateLimited("b".into())),
            Ok(ModelReply::text("never reached")),
        ]);
        let err = generate_with_backoff(&p, &GenerateRequest::default(), &fast(2), |_, _| {})
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(p.call_count(), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let p = ScriptedMockProvider::new(vec![
            Err(ModelError::Api { status: 400, message: "bad".into() }),
            Ok(ModelReply::text("never reached")),
        ]);
        let err = generate_with_backoff(&p, &GenerateRequest::default(), &fast(5), |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Api { status: 400, .. }));
        assert_eq!(p.call_count(), 1);
    }
}
