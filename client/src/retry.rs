//! Retry logic for portal API operations.
//!
//! This module provides utilities for retrying failed portal requests with
//! exponential backoff. Transaction submission is deliberately outside its
//! reach: resubmitting a transaction creates a second transaction, so chain
//! writes fail fast and leave the decision to the caller.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result, RetryContext};
use backoff::{backoff::Backoff, ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry strategy configuration
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// Maximum number of retries
    pub max_retries: usize,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Maximum retry delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub multiplier: f64,
}

impl RetryStrategy {
    /// Create a new retry strategy from client config
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            multiplier: config.retry_multiplier,
        }
    }

    /// Create an exponential backoff instance
    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(self.multiplier)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Check if an error is retryable
    pub fn is_retryable(error: &ClientError) -> bool {
        match error {
            // Transport errors are retryable
            ClientError::NetworkError(_) => true,
            // Rate limit errors are retryable
            ClientError::RateLimitExceeded(_) => true,
            // Portal API errors are retryable when the server failed (5xx)
            ClientError::BookkeepingError(msg) => {
                msg.contains("500")
                    || msg.contains("502")
                    || msg.contains("503")
                    || msg.contains("504")
            }
            // Transaction not found might be retryable (still propagating)
            ClientError::TransactionNotFound(_) => true,
            // Invalid response might be temporary
            ClientError::InvalidResponse(_) => true,
            // Validation, wallet and chain errors are not retryable
            _ => false,
        }
    }

    /// Execute a function with retry logic
    pub async fn retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.create_backoff();
        let mut retry_ctx = RetryContext::new();
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("Attempt {} of {}", attempts, self.max_retries + 1);

            match operation().await {
                Ok(result) => {
                    if attempts > 1 {
                        debug!("Operation succeeded after {} attempts", attempts);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !Self::is_retryable(&error) {
                        warn!("Non-retryable error: {:?}", error);
                        return Err(error);
                    }

                    if attempts > self.max_retries {
                        warn!(
                            "Max retries ({}) exceeded. Last error: {:?}",
                            self.max_retries, error
                        );
                        return Err(ClientError::MaxRetriesExceeded(self.max_retries));
                    }

                    let delay = match backoff.next_backoff() {
                        Some(d) => d,
                        None => {
                            warn!("Backoff exhausted");
                            return Err(ClientError::MaxRetriesExceeded(self.max_retries));
                        }
                    };

                    retry_ctx.record_attempt(&error.to_string(), delay.as_millis() as u64);

                    warn!(
                        "Attempt {} failed: {:?}. Retrying in {:?}",
                        attempts, error, delay
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContractAddresses;
    use ethers::types::Address;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_config() -> ClientConfig {
        ClientConfig::polygon(
            "https://portal.example.com",
            ContractAddresses {
                core: Address::repeat_byte(0x11),
                token: Address::repeat_byte(0x22),
            },
        )
    }

    #[test]
    fn test_retry_strategy_from_config() {
        let config = test_config();
        let strategy = RetryStrategy::from_config(&config);
        assert_eq!(strategy.max_retries, config.max_retries);
        assert_eq!(
            strategy.initial_delay,
            Duration::from_millis(config.retry_initial_delay_ms)
        );
    }

    #[test]
    fn test_is_retryable() {
        // Rate limit is retryable
        assert!(RetryStrategy::is_retryable(
            &ClientError::RateLimitExceeded(60)
        ));

        // Server-side portal failures are retryable
        assert!(RetryStrategy::is_retryable(&ClientError::BookkeepingError(
            "HTTP 503: unavailable".to_string()
        )));

        // Client-side portal failures are not
        assert!(!RetryStrategy::is_retryable(&ClientError::BookkeepingError(
            "HTTP 400: missing transactionHash".to_string()
        )));

        // Validation errors are not retryable
        assert!(!RetryStrategy::is_retryable(&ClientError::InvalidCid(
            "bad".to_string()
        )));

        // Wallet rejection is not retryable
        assert!(!RetryStrategy::is_retryable(&ClientError::WalletError(
            "user denied signature".to_string()
        )));
    }

    #[tokio::test]
    async fn test_retry_success_on_first_attempt() {
        let strategy = RetryStrategy {
            max_retries: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
        };

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = strategy
            .retry(|| async {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Ok::<i32, ClientError>(42)
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_retries() {
        let strategy = RetryStrategy {
            max_retries: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
        };

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = strategy
            .retry(|| async {
                let count = counter_clone.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(ClientError::BookkeepingError(
                        "HTTP 502: bad gateway".to_string(),
                    ))
                } else {
                    Ok::<i32, ClientError>(42)
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_max_retries_exceeded() {
        let strategy = RetryStrategy {
            max_retries: 2,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
        };

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = strategy
            .retry(|| async {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Err::<i32, ClientError>(ClientError::BookkeepingError(
                    "HTTP 500: boom".to_string(),
                ))
            })
            .await;

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ClientError::MaxRetriesExceeded(_)
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 3); // Initial + 2 retries
    }

    #[tokio::test]
    async fn test_retry_non_retryable_error() {
        let strategy = RetryStrategy {
            max_retries: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
        };

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = strategy
            .retry(|| async {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Err::<i32, ClientError>(ClientError::BookkeepingError(
                    "HTTP 422: unknown campaign".to_string(),
                ))
            })
            .await;

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ClientError::BookkeepingError(_)
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 1); // No retries
    }
}
