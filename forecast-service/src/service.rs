use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use meter_domain::{Dataset, SmoothedReading};

use crate::analysis;
use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::sinks::VecSink;
use crate::sources::SyntheticMeterSource;
use crate::store::DatasetStore;
use crate::transform::MeterReadingValidation;

/// Everything the external UI layer consumes: the smoothed reading table
/// and one predicted next evening peak per meter (`None` when the meter
/// has fewer than two daily peaks to regress on).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedData {
    pub rows: Vec<SmoothedReading>,
    pub predictions: BTreeMap<String, Option<f64>>,
}

/// Run the generation pipeline with an explicit source and persist the
/// result at the configured path, replacing whatever is there.
pub async fn generate_dataset(cfg: &AppConfig, source: SyntheticMeterSource) -> Result<()> {
    let store = DatasetStore::new(&cfg.dataset.path);
    let pipeline: Pipeline<_, meter_domain::MeterReading, _> = Pipeline {
        source,
        transforms: vec![Arc::new(MeterReadingValidation)],
        sink: store.writer_sink(),
    };
    pipeline
        .run()
        .await
        .with_context(|| format!("failed to generate dataset at {}", store.path().display()))?;
    Ok(())
}

/// Generate and persist a synthetic dataset unless one already exists.
/// No-op when the storage file is present.
pub async fn ensure_dataset_exists(cfg: &AppConfig) -> Result<()> {
    let store = DatasetStore::new(&cfg.dataset.path);
    if store.exists() {
        tracing::debug!(path = %store.path().display(), "dataset already present");
        return Ok(());
    }

    tracing::info!(path = %store.path().display(), "no dataset found, generating");
    let source = SyntheticMeterSource::new(
        cfg.generator.meter_ids.clone(),
        cfg.generator.lookback_days,
        cfg.generator.noise_std_kwh,
    );
    generate_dataset(cfg, source).await
}

/// Read the stored dataset, smooth it, and forecast every meter's next
/// evening peak.
///
/// Recomputes from storage on every call; with unchanged storage the
/// output is identical call to call. Meters with too little history get
/// a `None` prediction and do not disturb the others.
pub async fn get_processed_data(cfg: &AppConfig) -> Result<ProcessedData> {
    let store = DatasetStore::new(&cfg.dataset.path);
    if !store.exists() {
        bail!(
            "dataset file {} not found; call ensure_dataset_exists first",
            store.path().display()
        );
    }

    let sink = VecSink::new();
    let pipeline: Pipeline<_, meter_domain::MeterReading, _> = Pipeline {
        source: store.reader_source(),
        transforms: vec![Arc::new(MeterReadingValidation)],
        sink: sink.clone(),
    };
    pipeline
        .run()
        .await
        .with_context(|| format!("failed to read dataset at {}", store.path().display()))?;

    let dataset = Dataset::from_rows(sink.take_payloads().await);
    let rows = analysis::smooth_dataset(&dataset, cfg.smoothing.window);

    let mut predictions = BTreeMap::new();
    for meter_id in dataset.meter_ids() {
        let peaks = analysis::daily_evening_peaks(meter_id, dataset.series(meter_id));
        let prediction = analysis::predict_next_peak(&peaks);
        tracing::debug!(
            meter_id,
            peak_days = peaks.len(),
            prediction = ?prediction,
            "forecasted next evening peak"
        );
        predictions.insert(meter_id.to_string(), prediction);
    }

    metrics::counter!("processing_runs_total").increment(1);
    Ok(ProcessedData { rows, predictions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Envelope, Sink};
    use crate::sinks::CsvFileSink;
    use meter_domain::MeterReading;
    use std::path::Path;
    use time::macros::datetime;

    fn test_config(path: &Path, noise_std_kwh: f64) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.dataset.path = path.to_path_buf();
        cfg.generator.noise_std_kwh = noise_std_kwh;
        cfg
    }

    async fn write_readings(path: &Path, readings: Vec<MeterReading>) {
        let sink = CsvFileSink::new(path, 64);
        let input = futures::stream::iter(readings.into_iter().map(|r| Ok(Envelope::now(r))));
        sink.run(Box::pin(input)).await.unwrap();
    }

    fn evening_reading(meter_id: &str, day: u8, kwh: f64) -> MeterReading {
        MeterReading {
            ts: datetime!(2024-06-01 20:00:00 UTC) + time::Duration::days(day as i64),
            meter_id: meter_id.to_string(),
            kwh,
        }
    }

    #[tokio::test]
    async fn missing_storage_is_a_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(&dir.path().join("absent.csv"), 10.0);
        assert!(get_processed_data(&cfg).await.is_err());
    }

    #[tokio::test]
    async fn ensure_dataset_generates_once_then_noops() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(&dir.path().join("readings.csv"), 10.0);

        ensure_dataset_exists(&cfg).await.unwrap();
        assert!(cfg.dataset.path.exists());
        let first = std::fs::read_to_string(&cfg.dataset.path).unwrap();

        ensure_dataset_exists(&cfg).await.unwrap();
        let second = std::fs::read_to_string(&cfg.dataset.path).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn processing_is_idempotent_on_unchanged_storage() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(&dir.path().join("readings.csv"), 10.0);
        ensure_dataset_exists(&cfg).await.unwrap();

        let first = get_processed_data(&cfg).await.unwrap();
        let second = get_processed_data(&cfg).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn short_history_propagates_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(&dir.path().join("readings.csv"), 10.0);

        // One evening reading: one daily peak, not enough to regress.
        write_readings(&cfg.dataset.path, vec![evening_reading("meter-001", 0, 140.0)]).await;

        let processed = get_processed_data(&cfg).await.unwrap();
        assert_eq!(processed.predictions["meter-001"], None);
    }

    #[tokio::test]
    async fn sparse_meter_does_not_disturb_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(&dir.path().join("readings.csv"), 10.0);

        write_readings(
            &cfg.dataset.path,
            vec![
                evening_reading("meter-001", 0, 10.0),
                evening_reading("meter-001", 1, 12.0),
                evening_reading("meter-001", 2, 14.0),
                evening_reading("meter-002", 0, 99.0),
            ],
        )
        .await;

        let processed = get_processed_data(&cfg).await.unwrap();
        let healthy = processed.predictions["meter-001"].unwrap();
        assert!((healthy - 16.0).abs() < 1e-9, "got {healthy}");
        assert_eq!(processed.predictions["meter-002"], None);
    }

    #[tokio::test]
    async fn zero_noise_end_to_end_forecasts_the_profile_peak() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(&dir.path().join("readings.csv"), 0.0);

        // Anchor the grid mid-day so the final partial day has no
        // evening readings at all.
        let source = SyntheticMeterSource::anchored_at(
            cfg.generator.meter_ids.clone(),
            cfg.generator.lookback_days,
            cfg.generator.noise_std_kwh,
            datetime!(2024-06-15 12:00:00 UTC),
        );
        generate_dataset(&cfg, source).await.unwrap();

        let processed = get_processed_data(&cfg).await.unwrap();
        assert_eq!(processed.rows.len(), 3 * (14 * 24 + 1));

        // Without noise every day's evening peak sits at hour 20:
        // baseline(20) + bump(20) = 40 + 100 = 140 kWh. A constant peak
        // history regresses to a flat line through 140.
        for meter_id in &cfg.generator.meter_ids {
            let prediction = processed.predictions[meter_id]
                .unwrap_or_else(|| panic!("no prediction for {meter_id}"));
            assert!((prediction - 140.0).abs() < 1e-6, "got {prediction}");
        }

        // Raw hour-20 readings carry the full bump.
        for row in processed
            .rows
            .iter()
            .filter(|r| r.reading.ts.hour() == 20)
        {
            assert!((row.reading.kwh - 140.0).abs() < 1e-9);
        }
    }
}
