use std::collections::BTreeMap;

use meter_domain::{DailyPeak, MeterReading};

/// Evening demand window, hours inclusive. Peaks for forecasting are
/// defined over this window only.
pub const EVENING_START_HOUR: u8 = 18;
pub const EVENING_END_HOUR: u8 = 22;

/// One evening peak per calendar date, ascending by date.
///
/// Readings outside the evening window are ignored; a date with no
/// evening readings contributes no entry at all (never a zero-valued
/// one). Dates are taken straight from the timestamp, in the same
/// offset the data was generated in.
pub fn daily_evening_peaks(meter_id: &str, series: &[MeterReading]) -> Vec<DailyPeak> {
    let mut peaks: BTreeMap<time::Date, f64> = BTreeMap::new();

    for reading in series {
        let hour = reading.ts.hour();
        if !(EVENING_START_HOUR..=EVENING_END_HOUR).contains(&hour) {
            continue;
        }
        let entry = peaks.entry(reading.ts.date()).or_insert(f64::NEG_INFINITY);
        if reading.kwh > *entry {
            *entry = reading.kwh;
        }
    }

    peaks
        .into_iter()
        .map(|(date, peak_kwh)| DailyPeak {
            meter_id: meter_id.to_string(),
            date,
            peak_kwh,
        })
        .collect()
}
