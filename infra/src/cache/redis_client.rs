//! Redis client used by the Redis code store
//!
//! Wraps a multiplexed connection with connect and per-operation retry
//! using exponential backoff capped at five seconds. Scripts that consume
//! or count run once, without retry.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Cloneable async Redis client with retry
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Connect with three attempts and a 100ms base delay
    pub async fn new(url: &str) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_config(url, 3, 100).await
    }

    /// Connect with custom retry settings
    pub async fn new_with_retry_config(
        url: &str,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!("Creating Redis client for {}", mask_url(url));

        let client = Client::open(url).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let max_retries = max_retries.max(1);
        let mut attempts = 0;
        let mut delay = retry_delay_ms;
        let connection = loop {
            attempts += 1;
            match client.get_multiplexed_async_connection().await {
                Ok(connection) => break connection,
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        };

        info!("Redis client connected");

        Ok(Self {
            connection,
            max_retries,
            retry_delay_ms,
        })
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let key = key.to_string();
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// DEL one or more keys, returning how many existed
    pub async fn delete(&self, keys: &[&str]) -> Result<u32, InfrastructureError> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.execute_with_retry(move |mut conn| {
            let keys = keys.clone();
            Box::pin(async move { conn.del::<_, u32>(keys).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Run an idempotent Lua script and return its integer result
    pub async fn eval_int(&self, script: &Script, keys: &[&str], args: &[&str]) -> Result<i64, InfrastructureError> {
        self.eval_int_with_attempts(self.max_retries, script, keys, args).await
    }

    /// Run a Lua script exactly once
    ///
    /// For scripts that consume or count. A lost reply after a committed
    /// write would otherwise be replayed against the new state.
    pub async fn eval_int_once(&self, script: &Script, keys: &[&str], args: &[&str]) -> Result<i64, InfrastructureError> {
        self.eval_int_with_attempts(1, script, keys, args).await
    }

    async fn eval_int_with_attempts(
        &self,
        max_attempts: u32,
        script: &Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<i64, InfrastructureError> {
        let script = script.clone();
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let connection = self.connection.clone();
        retry_with_backoff(max_attempts, self.retry_delay_ms, move || {
            let mut conn = connection.clone();
            let script = script.clone();
            let (keys, args) = (keys.clone(), args.clone());
            Box::pin(async move {
                let mut invocation = script.prepare_invoke();
                for key in &keys {
                    invocation.key(key);
                }
                for arg in &args {
                    invocation.arg(arg);
                }
                invocation.invoke_async::<_, i64>(&mut conn).await
            })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// PING the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await
            .map_err(InfrastructureError::Cache)?;
        Ok(response == "PONG")
    }

    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let connection = self.connection.clone();
        retry_with_backoff(self.max_retries, self.retry_delay_ms, move || operation(connection.clone())).await
    }
}

/// Run `operation` up to `max_attempts` times, doubling the delay after each
/// retriable failure (capped at five seconds)
pub(crate) async fn retry_with_backoff<F, T>(max_attempts: u32, retry_delay_ms: u64, operation: F) -> RedisResult<T>
where
    F: Fn() -> RedisFuture<T>,
{
    let mut attempts = 0;
    let mut delay = retry_delay_ms;

    loop {
        attempts += 1;
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                warn!(
                    "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                    attempts, max_attempts, e, delay
                );
                sleep(Duration::from_millis(delay)).await;
                delay = (delay * 2).min(5000);
            }
            Err(e) => {
                debug!("Redis operation failed after {} attempts: {}", attempts, e);
                return Err(e);
            }
        }
    }
}

/// Transient errors worth retrying
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Hide credentials in a Redis URL
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(proto_end), Some(at_pos)) if at_pos > proto_end => {
            format!("{}****{}", &url[..proto_end + 3], &url[at_pos..])
        }
        _ => url.to_string(),
    }
}
