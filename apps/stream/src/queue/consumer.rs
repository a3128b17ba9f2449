//! Reliable-list consumer.
//!
//! Each payload is moved atomically from the queue to `<queue>:processing`,
//! dispatched, then removed from the processing list. Payloads stranded in
//! the processing list by a crash are pushed back on start, so delivery is
//! at-least-once.

use std::error::Error as StdError;
use std::time::Duration;

use rand::random;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, ErrorKind, RedisError, ServerErrorKind};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::command::dispatch_payload;
use crate::config::app::StreamConfig;
use crate::error::AppError;
use crate::streams::SubscriptionRegistry;

/// Slack on top of the `BLMOVE` block time before the client gives up on a reply.
const RESPONSE_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

const BACKOFF_FIRST: Duration = Duration::from_secs(1);
const BACKOFF_CEILING: Duration = Duration::from_secs(60);
const BACKOFF_JITTER: f64 = 0.2;

pub struct QueueConsumer {
    redis_url: String,
    queue: String,
    processing: String,
    block_timeout: Duration,
    registry: SubscriptionRegistry,
}

impl QueueConsumer {
    pub fn new(config: &StreamConfig, registry: SubscriptionRegistry) -> Self {
        Self {
            redis_url: config.redis_url.clone(),
            queue: config.queue_name.clone(),
            processing: processing_list(&config.queue_name),
            block_timeout: config.queue_block_timeout,
            registry,
        }
    }

    /// Consume until `shutdown` fires or a permanent error occurs.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut backoff = Backoff::default();

        loop {
            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => Ok(()),
                result = self.consume(&mut backoff) => result,
            };

            let err = match result {
                Ok(()) => {
                    info!(queue = %self.queue, "queue consumer stopped");
                    break;
                }
                Err(err) => err,
            };

            if !is_transient_error(&err) {
                error!(error = %err, "queue consumer failed with permanent error, exiting");
                break;
            }

            let delay = backoff.next_delay();
            warn!(
                error = %err,
                failures = backoff.failures(),
                retry_delay_secs = delay.as_secs_f64(),
                "queue consumer failed, retrying"
            );
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(queue = %self.queue, "queue consumer stopped during backoff");
                    break;
                }
                _ = sleep(delay) => {}
            }
        }
    }

    /// Connect, recover, then block on the queue. `backoff` starts over once
    /// the connection is usable.
    async fn consume(&self, backoff: &mut Backoff) -> Result<(), AppError> {
        let client = Client::open(self.redis_url.as_str())
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;
        let manager_config = ConnectionManagerConfig::new()
            .set_response_timeout(Some(response_timeout(self.block_timeout)));
        let mut conn = ConnectionManager::new_with_config(client, manager_config)
            .await
            .map_err(|err| AppError::queue("Unable to connect to Redis queue", err))?;

        let recovered = self.requeue_unacknowledged(&mut conn).await?;
        backoff.reset();
        info!(queue = %self.queue, recovered, "queue consumer ready");

        loop {
            let payload: Option<String> = redis::cmd("BLMOVE")
                .arg(&self.queue)
                .arg(&self.processing)
                .arg("RIGHT")
                .arg("LEFT")
                .arg(self.block_timeout.as_secs_f64())
                .query_async(&mut conn)
                .await
                .map_err(|err| AppError::queue("BLMOVE failed", err))?;

            let Some(payload) = payload else {
                continue;
            };

            let outcome = dispatch_payload(&self.registry, &payload);
            debug!(?outcome, "queue payload dispatched");

            let _: i64 = redis::cmd("LREM")
                .arg(&self.processing)
                .arg(1)
                .arg(&payload)
                .query_async(&mut conn)
                .await
                .map_err(|err| AppError::queue("LREM acknowledgement failed", err))?;
        }
    }

    /// Move everything left in the processing list back onto the queue,
    /// oldest ending up next in line.
    async fn requeue_unacknowledged(
        &self,
        conn: &mut ConnectionManager,
    ) -> Result<usize, AppError> {
        let mut moved = 0;
        loop {
            let payload: Option<String> = redis::cmd("LMOVE")
                .arg(&self.processing)
                .arg(&self.queue)
                .arg("LEFT")
                .arg("RIGHT")
                .query_async(conn)
                .await
                .map_err(|err| AppError::queue("LMOVE recovery failed", err))?;
            match payload {
                Some(_) => moved += 1,
                None => return Ok(moved),
            }
        }
    }
}

pub fn processing_list(queue: &str) -> String {
    format!("{queue}:processing")
}

/// A blocked `BLMOVE` legitimately stays silent for the whole block time.
fn response_timeout(block: Duration) -> Duration {
    block + RESPONSE_TIMEOUT_MARGIN
}

/// Reconnect delay: doubles per consecutive failure up to a ceiling, with
/// jitter, and starts over after a successful connect.
#[derive(Debug, Default)]
struct Backoff {
    failures: u32,
}

impl Backoff {
    fn next_delay(&mut self) -> Duration {
        let doublings = self.failures.min(6);
        self.failures = self.failures.saturating_add(1);
        let base = (BACKOFF_FIRST * (1 << doublings)).min(BACKOFF_CEILING);
        base.mul_f64(1.0 + (random::<f64>() * 2.0 - 1.0) * BACKOFF_JITTER)
    }

    fn failures(&self) -> u32 {
        self.failures
    }

    fn reset(&mut self) {
        self.failures = 0;
    }
}

/// Bad configuration and rejected credentials are permanent; everything
/// else is retried.
fn is_transient_error(err: &AppError) -> bool {
    if matches!(err, AppError::Config { .. }) {
        return false;
    }
    let redis_err = StdError::source(err).and_then(|s| s.downcast_ref::<RedisError>());
    let Some(redis_err) = redis_err else {
        return true;
    };
    match redis_err.kind() {
        ErrorKind::AuthenticationFailed
        | ErrorKind::InvalidClientConfig
        | ErrorKind::Server(ServerErrorKind::NoPerm) => false,
        _ => !matches!(redis_err.code(), Some("NOAUTH" | "WRONGPASS")),
    }
}
