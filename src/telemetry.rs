//! Telemetry metric name constants.
//!
//! Centralised metric names for snaptask operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `snaptask_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `mode`: inference mode ("ocr" or "caption")
//! - `route`: backend route ("direct" or "relay")
//! - `status`: outcome: "ok" or "error"

/// Total upstream inference calls issued by the gateway (after retries).
///
/// Labels: `mode`, `route`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "snaptask_requests_total";

/// Upstream call duration in seconds, retries included.
///
/// Labels: `mode`, `route`.
pub const REQUEST_DURATION_SECONDS: &str = "snaptask_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `mode`, `route`.
pub const RETRIES_TOTAL: &str = "snaptask_retries_total";

/// Total suggestions handed back to callers.
///
/// Labels: `mode`.
pub const SUGGESTIONS_TOTAL: &str = "snaptask_suggestions_total";

/// Image requests that ended with no suggestions.
pub const EMPTY_RESULTS_TOTAL: &str = "snaptask_empty_results_total";
