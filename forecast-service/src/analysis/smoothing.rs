use meter_domain::{Dataset, MeterReading, SmoothedReading};

/// Centered moving average over one meter's ordered series.
///
/// At row i the window spans `[i - (w-1)/2, i + w/2]`; for the default
/// window of 3 that is the symmetric [t-1, t, t+1]. Rows whose centered
/// window would run past either end copy the raw value instead, so every
/// row has a defined smoothed value. A series shorter than the window is
/// returned raw for the same reason.
pub fn smooth_series(series: &[MeterReading], window: usize) -> Vec<SmoothedReading> {
    let window = window.max(1);
    let left = (window - 1) / 2;
    let right = window / 2;

    series
        .iter()
        .enumerate()
        .map(|(i, reading)| {
            let smoothed_kwh = if i >= left && i + right < series.len() {
                let slice = &series[i - left..=i + right];
                slice.iter().map(|r| r.kwh).sum::<f64>() / window as f64
            } else {
                reading.kwh
            };
            SmoothedReading {
                reading: reading.clone(),
                smoothed_kwh,
            }
        })
        .collect()
}

/// Smooth every meter's series independently, concatenated in meter
/// order. Series boundaries are structural here, so meter A's tail can
/// never bleed into meter B's head.
pub fn smooth_dataset(dataset: &Dataset, window: usize) -> Vec<SmoothedReading> {
    let mut rows = Vec::with_capacity(dataset.len());
    for (_, series) in dataset.iter() {
        rows.extend(smooth_series(series, window));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn series(meter_id: &str, values: &[f64]) -> Vec<MeterReading> {
        values
            .iter()
            .enumerate()
            .map(|(i, &kwh)| MeterReading {
                ts: datetime!(2024-03-01 00:00:00 UTC) + time::Duration::hours(i as i64),
                meter_id: meter_id.to_string(),
                kwh,
            })
            .collect()
    }

    #[test]
    fn interior_rows_average_their_neighbors() {
        let smoothed = smooth_series(&series("m-1", &[3.0, 6.0, 9.0, 12.0]), 3);
        assert_eq!(smoothed[1].smoothed_kwh, 6.0);
        assert_eq!(smoothed[2].smoothed_kwh, 9.0);
    }

    #[test]
    fn boundary_rows_copy_the_raw_value() {
        let smoothed = smooth_series(&series("m-1", &[3.0, 6.0, 9.0, 12.0]), 3);
        assert_eq!(smoothed[0].smoothed_kwh, 3.0);
        assert_eq!(smoothed[3].smoothed_kwh, 12.0);
    }

    #[test]
    fn series_shorter_than_window_stays_raw() {
        let smoothed = smooth_series(&series("m-1", &[5.0, 7.0]), 3);
        assert_eq!(smoothed[0].smoothed_kwh, 5.0);
        assert_eq!(smoothed[1].smoothed_kwh, 7.0);
    }

    #[test]
    fn empty_series_smooths_to_nothing() {
        assert!(smooth_series(&[], 3).is_empty());
    }

    #[test]
    fn smoothing_never_crosses_meter_boundaries() {
        let mut rows = series("m-1", &[1.0, 1.0, 1.0]);
        rows.extend(series("m-2", &[100.0, 100.0, 100.0]));
        let dataset = Dataset::from_rows(rows);

        let smoothed = smooth_dataset(&dataset, 3);
        assert_eq!(smoothed.len(), 6);

        // Last row of m-1 and first row of m-2 are boundary rows of
        // their own series; neither sees the other's values.
        assert_eq!(smoothed[2].reading.meter_id, "m-1");
        assert_eq!(smoothed[2].smoothed_kwh, 1.0);
        assert_eq!(smoothed[3].reading.meter_id, "m-2");
        assert_eq!(smoothed[3].smoothed_kwh, 100.0);
    }
}
