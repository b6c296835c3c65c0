use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    CounterVec, Encoder, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // Submission Metrics
    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "submissions_total",
        "Total number of result submissions by outcome",
        &["outcome"]
    )
    .unwrap();

    pub static ref SUBMISSIONS_IN_FLIGHT: IntGauge = register_int_gauge!(
        "submissions_in_flight",
        "Number of submissions currently awaiting the transport"
    )
    .unwrap();

    pub static ref GUARD_HITS_TOTAL: IntCounter = register_int_counter!(
        "guard_hits_total",
        "Submissions short-circuited by the durable idempotence guard"
    )
    .unwrap();

    pub static ref IN_FLIGHT_JOINS_TOTAL: IntCounter = register_int_counter!(
        "in_flight_joins_total",
        "Callers that joined an already in-flight submission"
    )
    .unwrap();

    pub static ref TRANSPORT_RETRIES_TOTAL: IntCounter = register_int_counter!(
        "transport_retries_total",
        "Backoff retries performed against the transport"
    )
    .unwrap();

    // Cache Metrics
    pub static ref CACHE_HIT_RATIO: CounterVec = register_counter_vec!(
        "cache_hit_ratio",
        "Cache hit/miss ratio",
        &["result"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Record cache hit
pub fn record_cache_hit() {
    CACHE_HIT_RATIO.with_label_values(&["hit"]).inc();
}

/// Record cache miss
pub fn record_cache_miss() {
    CACHE_HIT_RATIO.with_label_values(&["miss"]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_render_in_text_format() {
        SUBMISSIONS_TOTAL.with_label_values(&["success"]).inc();
        record_cache_hit();
        record_cache_miss();

        let rendered = render_metrics().unwrap();
        assert!(rendered.contains("submissions_total"));
        assert!(rendered.contains("cache_hit_ratio"));
    }
}
