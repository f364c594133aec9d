use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse};

/// Backoff schedule for the startup connection to PostgreSQL.
///
/// Attempt `n` waits `initial_delay_ms * 2^n`, capped at `max_delay_ms`,
/// optionally scaled down by jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub use_jitter: bool,
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let base = self
            .initial_delay_ms
            .saturating_mul(1u64 << retry.min(20))
            .min(self.max_delay_ms);
        let millis = if self.use_jitter { jitter(base) } else { base };
        Duration::from_millis(millis)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            use_jitter: true,
        }
    }
}

/// Environment variables:
/// - `DB_CONNECT_RETRIES` (default: 3)
/// - `DB_CONNECT_RETRY_DELAY_MS` (default: 100)
#[cfg(feature = "config")]
impl FromEnv for RetryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new()
            .with_max_retries(env_parse("DB_CONNECT_RETRIES", "3")?)
            .with_initial_delay(env_parse("DB_CONNECT_RETRY_DELAY_MS", "100")?))
    }
}

/// Run `operation` until it succeeds or `config.max_retries` retries are spent.
/// The last error is returned.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retries = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if retries > 0 {
                    debug!(retries, "Connected after retrying");
                }
                return Ok(value);
            }
            Err(e) if retries >= config.max_retries => {
                warn!(attempts = retries + 1, error = %e, "Giving up");
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for(retries);
                retries += 1;
                warn!(
                    retry = retries,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Scale `delay_ms` to somewhere in 50%..100% of itself.
fn jitter(delay_ms: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + RandomState::new().hash_one(std::time::SystemTime::now()) % 51;
    delay_ms * percent / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_retries: u32) -> RetryConfig {
        RetryConfig::new()
            .with_max_retries(max_retries)
            .with_initial_delay(1)
            .without_jitter()
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);

        let result = retry_with_backoff(
            || async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err("refused"),
                    _ => Ok("connected"),
                }
            },
            quick(3),
        )
        .await;

        assert_eq!(result, Ok("connected"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_with_last_error() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = retry_with_backoff(
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("refused")
            },
            quick(2),
        )
        .await;

        assert_eq!(result, Err("refused"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_delay_doubles_up_to_cap() {
        let config = RetryConfig::new().without_jitter();
        let delays: Vec<u128> = (0..8).map(|n| config.delay_for(n).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1600, 3200, 5000, 5000]);
    }

    #[test]
    fn test_jitter_stays_within_half_to_full() {
        for _ in 0..20 {
            let value = jitter(1000);
            assert!((500..=1000).contains(&value));
        }
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_retry_config_from_env() {
        temp_env::with_vars(
            [
                ("DB_CONNECT_RETRIES", Some("7")),
                ("DB_CONNECT_RETRY_DELAY_MS", Some("250")),
            ],
            || {
                let config = RetryConfig::from_env().unwrap();
                assert_eq!(config.max_retries, 7);
                assert_eq!(config.initial_delay_ms, 250);
                assert!(config.use_jitter);
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_retry_config_from_env_rejects_garbage() {
        temp_env::with_var("DB_CONNECT_RETRIES", Some("many"), || {
            let err = RetryConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("DB_CONNECT_RETRIES"));
        });
    }
}
