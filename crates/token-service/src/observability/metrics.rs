//! Metrics definitions for token issuance
//!
//! All metrics follow Prometheus naming conventions:
//! - `oidc_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `token_type`: id_token, access_token, other
//! - `encoding`: asymmetric, client_secret, reference, none
//! - `status`: success, error
//! - `error_category`: values of `TokenError::category`

use metrics::{counter, histogram};
use std::time::Duration;

/// Record creation of an unserialized token
///
/// Metric: `oidc_tokens_created_total`
/// Labels: `token_type`, `status`
pub fn record_token_created(token_type: &str, status: &str) {
    counter!(
        "oidc_tokens_created_total",
        "token_type" => bounded_token_type(token_type),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record token serialization duration and outcome
///
/// Metric: `oidc_token_serialization_duration_seconds`, `oidc_token_serializations_total`
/// Labels: `encoding`, `status`, `error_category`
pub fn record_token_serialization(
    encoding: &str,
    status: &str,
    error_category: Option<&str>,
    duration: Duration,
) {
    histogram!("oidc_token_serialization_duration_seconds", "encoding" => encoding.to_string())
        .record(duration.as_secs_f64());

    counter!(
        "oidc_token_serializations_total",
        "encoding" => encoding.to_string(),
        "status" => status.to_string(),
        "error_category" => error_category.unwrap_or("none").to_string()
    )
    .increment(1);
}

/// Record refresh token issuance
///
/// Metric: `oidc_refresh_tokens_issued_total`
/// Labels: `status`
pub fn record_refresh_token_issued(status: &str) {
    counter!("oidc_refresh_tokens_issued_total", "status" => status.to_string()).increment(1);
}

fn bounded_token_type(token_type: &str) -> String {
    match token_type {
        "id_token" | "access_token" => token_type.to_string(),
        _ => "other".to_string(),
    }
}
