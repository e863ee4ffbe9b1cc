use serde::Serialize;
use time::Date;

/// The maximum evening-window usage for one meter on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPeak {
    pub meter_id: String,
    pub date: Date,
    pub peak_kwh: f64,
}
