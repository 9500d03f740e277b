use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{header::HeaderMap, StatusCode};

const FIRST_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// How long one chat completion may keep trying.
///
/// `deadline` is measured from the first attempt and covers every request and
/// every backoff sleep, so a retry never outlives the assistant's own timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: usize,
    pub deadline: Duration,
}

impl RetryPolicy {
    /// Time left for the next attempt, or `None` once the deadline has passed.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.deadline
            .checked_sub(elapsed)
            .filter(|left| !left.is_zero())
    }

    /// Delay before attempt `attempt + 1`, or `None` when giving up.
    ///
    /// A server `Retry-After` replaces the local backoff. Either way the sleep
    /// must end before the deadline with time left to send the request.
    pub fn next_delay(
        &self,
        attempt: usize,
        elapsed: Duration,
        retry_after: Option<Duration>,
    ) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let delay = retry_after.unwrap_or_else(|| backoff(attempt));
        let left = self.remaining(elapsed)?;
        (delay < left).then_some(delay)
    }
}

fn backoff(attempt: usize) -> Duration {
    let factor = 1_u32 << attempt.min(3);
    FIRST_BACKOFF.saturating_mul(factor).min(MAX_BACKOFF)
}

/// Throttling, request timeouts and server faults; everything else is the caller's fault.
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

pub(crate) fn is_transient_transport(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Reads `Retry-After` as delta-seconds or an HTTP date.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    Some((at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
}
