//! Prometheus metrics for post-service.
//!
//! Exposes scan and request collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Batches handed to a chunked scan visitor.
    pub static ref POST_SCAN_CHUNKS_TOTAL: IntCounter = register_int_counter!(
        "post_scan_chunks_total",
        "Total batches delivered by chunked post scans"
    )
    .expect("failed to register post_scan_chunks_total");

    /// Rows handed to a chunked scan visitor.
    pub static ref POST_SCAN_ROWS_TOTAL: IntCounter = register_int_counter!(
        "post_scan_rows_total",
        "Total rows delivered by chunked post scans"
    )
    .expect("failed to register post_scan_rows_total");

    pub static ref POST_SCAN_DURATION_SECONDS: Histogram = register_histogram!(
        "post_scan_duration_seconds",
        "Wall time of a full chunked post scan",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]
    )
    .expect("failed to register post_scan_duration_seconds");

    /// Post operations segmented by operation and outcome (ok/not_found/invalid/error).
    pub static ref POST_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_requests_total",
        "Post operations segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register post_requests_total");
}

/// How a post operation ended, as recorded in `post_requests_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    NotFound,
    Invalid,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::NotFound => "not_found",
            Outcome::Invalid => "invalid",
            Outcome::Error => "error",
        }
    }

    /// Lookups and updates: `None` means the post does not exist.
    pub fn of_lookup<T, E>(result: &Result<Option<T>, E>) -> Self {
        match result {
            Ok(Some(_)) => Outcome::Ok,
            Ok(None) => Outcome::NotFound,
            Err(_) => Outcome::Error,
        }
    }

    /// Deletes: `false` means nothing was removed.
    pub fn of_delete<E>(result: &Result<bool, E>) -> Self {
        match result {
            Ok(true) => Outcome::Ok,
            Ok(false) => Outcome::NotFound,
            Err(_) => Outcome::Error,
        }
    }

    pub fn of_result<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Outcome::Ok
        } else {
            Outcome::Error
        }
    }
}

pub fn record_outcome(operation: &str, outcome: Outcome) {
    POST_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome.as_str()])
        .inc();
}

pub fn requests_recorded(operation: &str, outcome: Outcome) -> u64 {
    POST_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome.as_str()])
        .get()
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels() {
        let before = requests_recorded("test_op", Outcome::NotFound);

        record_outcome("test_op", Outcome::of_lookup::<(), ()>(&Ok(None)));

        assert_eq!(requests_recorded("test_op", Outcome::NotFound), before + 1);
    }

    #[test]
    fn delete_outcomes() {
        assert_eq!(Outcome::of_delete::<()>(&Ok(true)), Outcome::Ok);
        assert_eq!(Outcome::of_delete::<()>(&Ok(false)), Outcome::NotFound);
        assert_eq!(Outcome::of_delete(&Err(())), Outcome::Error);
        assert_eq!(Outcome::of_result::<u8, ()>(&Ok(1)).as_str(), "ok");
    }
}
