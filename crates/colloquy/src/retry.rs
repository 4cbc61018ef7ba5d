use reqwest::header::HeaderMap;
use std::time::Duration;

/// Default exponential backoff for the blocking transport path.
///
/// 500ms initial, 8s cap per attempt, 60s total, 0.25 jitter. Streaming
/// requests never retry: a partially consumed stream cannot be replayed.
#[must_use]
pub fn default_backoff() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoff {
        max_elapsed_time: Some(Duration::from_secs(60)),
        initial_interval: Duration::from_millis(500),
        max_interval: Duration::from_secs(8),
        randomization_factor: 0.25,
        multiplier: 2.0,
        ..Default::default()
    }
}

/// Whether an HTTP status code should trigger a retry.
///
/// Retries on 408, 409, 429 and 5xx (including 529 overloaded).
#[must_use]
pub const fn is_retryable_status(code: u16) -> bool {
    matches!(code, 408 | 409 | 429 | 500..=599)
}

/// Parses `retry-after-ms` or `Retry-After` from response headers.
///
/// The returned wait is capped at 60 seconds; `None` if absent or malformed.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(v) = headers.get("retry-after-ms")
        && let Ok(s) = v.to_str()
        && let Ok(ms) = s.parse::<u64>()
    {
        return Some(Duration::from_millis(ms.min(60_000)));
    }

    if let Some(v) = headers.get("retry-after")
        && let Ok(s) = v.to_str()
        && let Ok(secs) = s.parse::<u64>()
    {
        return Some(Duration::from_secs(secs.min(60)));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_matrix() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(529));
        assert!(is_retryable_status(408));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(400));
    }

    #[test]
    fn retry_after_seconds_capped() {
        let mut h = HeaderMap::new();
        h.insert("retry-after", "120".parse().unwrap());
        let d = parse_retry_after(&h).unwrap();
        assert_eq!(d.as_secs(), 60);
    }

    #[test]
    fn retry_after_ms() {
        let mut h = HeaderMap::new();
        h.insert("retry-after-ms", "5000".parse().unwrap());
        let d = parse_retry_after(&h).unwrap();
        assert_eq!(d.as_millis(), 5000);
    }
}
