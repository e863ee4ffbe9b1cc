use meter_domain::DailyPeak;

/// Extrapolate the next evening peak from the per-day peak history.
///
/// Ordinary least squares of peak kWh against the zero-based day index,
/// evaluated one index past the last observed day. Fewer than two peaks
/// cannot anchor a line and yield `None` — an expected condition for new
/// meters and short histories, not an error. Deliberately a minimal
/// baseline: no intervals, no outlier handling, no regularization.
pub fn predict_next_peak(peaks: &[DailyPeak]) -> Option<f64> {
    if peaks.len() < 2 {
        return None;
    }

    let n = peaks.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, peak) in peaks.iter().enumerate() {
        let x = i as f64;
        let y = peak.peak_kwh;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    // Day indices are distinct, so the denominator is strictly positive
    // whenever n >= 2.
    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    Some(intercept + slope * n)
}
