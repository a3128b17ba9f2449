//! Runtime configuration for the stream service, read from the environment.

use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_LICHESS_URL: &str = "https://lichess.org";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";
pub const DEFAULT_QUEUE_NAME: &str = "lichess-tg-queue";
const DEFAULT_QUEUE_BLOCK_TIMEOUT_MS: u64 = 400;
/// Upper bound on a single `BLMOVE` wait; shutdown waits at most this long
/// for the in-flight call.
pub const MAX_QUEUE_BLOCK_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub bot_token: String,
    pub telegram_api_url: String,
    pub lichess_url: String,
    pub redis_url: String,
    pub queue_name: String,
    /// How long a single `BLMOVE` waits server-side before the consumer loops.
    pub queue_block_timeout: Duration,
}

impl StreamConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let bot_token = lookup("BOT_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::config("Required environment variable 'BOT_TOKEN' is not set"))?;

        let block_ms = match lookup("QUEUE_BLOCK_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::config(format!(
                    "QUEUE_BLOCK_TIMEOUT_MS must be a number of milliseconds, got '{raw}'"
                ))
            })?,
            None => DEFAULT_QUEUE_BLOCK_TIMEOUT_MS,
        };
        if block_ms == 0 {
            // BLMOVE treats 0 as "block forever", which would pin shutdown.
            return Err(AppError::config("QUEUE_BLOCK_TIMEOUT_MS must be positive"));
        }
        if block_ms > MAX_QUEUE_BLOCK_TIMEOUT_MS {
            return Err(AppError::config(format!(
                "QUEUE_BLOCK_TIMEOUT_MS must be at most {MAX_QUEUE_BLOCK_TIMEOUT_MS}, \
                 got {block_ms}"
            )));
        }

        Ok(Self {
            bot_token,
            telegram_api_url: trim_slash(var("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL)),
            lichess_url: trim_slash(var("LICHESS_URL", DEFAULT_LICHESS_URL)),
            redis_url: var("REDIS_URL", DEFAULT_REDIS_URL),
            queue_name: var("QUEUE_NAME", DEFAULT_QUEUE_NAME),
            queue_block_timeout: Duration::from_millis(block_ms),
        })
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
