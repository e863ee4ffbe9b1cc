use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One hourly usage reading for a single meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub meter_id: String,
    pub kwh: f64,
}

/// A reading augmented with its moving-average value.
///
/// Derived on read; only the raw reading is ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedReading {
    #[serde(flatten)]
    pub reading: MeterReading,
    pub smoothed_kwh: f64,
}
