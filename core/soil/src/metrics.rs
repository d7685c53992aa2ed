// agrisense/core/soil/src/metrics.rs

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec};

pub static SOIL_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "agrisense_soil_lookups_total",
        "Soil lookups by the source that produced the soil type",
        &["source"]
    )
    .expect("register agrisense_soil_lookups_total")
});

#[inline]
pub fn soil_lookup(source: &str) {
    SOIL_LOOKUPS.with_label_values(&[source]).inc();
}
