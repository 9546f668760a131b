//! Wall-clock limit around a parse.
//!
//! The decoder has no cancellation points, so the parse runs on the blocking
//! pool and is abandoned when the deadline passes. An abandoned parse keeps
//! its thread until it finishes; its result is dropped.

use std::time::Duration;

use tokio::task::spawn_blocking;
use tokio::time::timeout;

use crate::codec::{parse_document, ParseOutcome};
use crate::config::ParseOptions;
use crate::error::{Error, Result};

/// Run `job` on the blocking pool, giving up after `limit`.
pub async fn run_with_deadline<T, F>(limit: Duration, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match timeout(limit, spawn_blocking(job)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Error::Io(format!("parse task failed: {e}"))),
        Err(_) => Err(Error::Timeout { seconds: limit.as_secs() }),
    }
}

/// [`parse_document`] with a deadline.
pub async fn parse_with_timeout(data: Vec<u8>, options: ParseOptions, limit: Duration) -> Result<ParseOutcome> {
    run_with_deadline(limit, move || parse_document(&data, &options)).await
}
