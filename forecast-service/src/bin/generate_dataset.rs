use anyhow::Result;
use forecast_service::{
    config::AppConfig,
    observability, service,
    sources::SyntheticMeterSource,
};
use std::env;

/// Force-regenerates the synthetic dataset, replacing any existing file.
/// An optional argument overrides the configured output path.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration (can point FORECAST_CONFIG to a dedicated file).
    let mut cfg = AppConfig::load()?;

    let args: Vec<String> = env::args().collect();
    if let Some(path) = args.get(1) {
        cfg.dataset.path = path.into();
    }

    let source = SyntheticMeterSource::new(
        cfg.generator.meter_ids.clone(),
        cfg.generator.lookback_days,
        cfg.generator.noise_std_kwh,
    );
    service::generate_dataset(&cfg, source).await?;

    tracing::info!(
        path = %cfg.dataset.path.display(),
        meters = cfg.generator.meter_ids.len(),
        lookback_days = cfg.generator.lookback_days,
        "dataset generated"
    );

    Ok(())
}
