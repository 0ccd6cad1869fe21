//! Storage metrics on the default prometheus registry.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter_vec, register_int_gauge_vec, Encoder, IntCounterVec, IntGaugeVec, TextEncoder,
};

use models::EntityKind;

use crate::errors::ServiceError;
use crate::storage::Index;

pub static FLUSHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hbnb_storage_flushes_total",
        "Whole-store flushes to the backing medium, by result",
        &["result"]
    )
    .expect("register flushes_total")
});

pub static RELOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hbnb_storage_reloads_total",
        "Index reloads from the backing medium, by outcome",
        &["outcome"]
    )
    .expect("register reloads_total")
});

pub static STORED_OBJECTS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "hbnb_storage_objects",
        "Objects in the index after the last flush or reload",
        &["kind"]
    )
    .expect("register storage_objects")
});

pub fn record_flush(ok: bool) {
    FLUSHES_TOTAL.with_label_values(&[if ok { "ok" } else { "error" }]).inc();
}

pub fn record_reload(outcome: &str) {
    RELOADS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_objects(index: &Index) {
    for kind in EntityKind::ALL {
        let n = i64::try_from(index.count(Some(kind))).unwrap_or(i64::MAX);
        STORED_OBJECTS.with_label_values(&[kind.as_str()]).set(n);
    }
}

/// Text exposition of the default registry.
pub fn encode() -> Result<String, ServiceError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ServiceError::Internal(format!("metrics encode error: {e}")))?;
    String::from_utf8(buffer).map_err(|e| ServiceError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        record_flush(true);
        record_reload("empty");
        let text = encode().expect("encode");
        assert!(text.contains("hbnb_storage_flushes_total"));
        assert!(text.contains("hbnb_storage_reloads_total"));
    }
}
