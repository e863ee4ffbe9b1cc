use anyhow::Result;
use forecast_service::{config::AppConfig, metrics_server, observability, service};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // Generate the synthetic dataset on first run; later runs reuse the
    // stored file untouched.
    service::ensure_dataset_exists(&cfg).await?;

    let processed = service::get_processed_data(&cfg).await?;
    tracing::info!(
        rows = processed.rows.len(),
        meters = processed.predictions.len(),
        "processed dataset"
    );

    for (meter_id, prediction) in &processed.predictions {
        match prediction {
            Some(kwh) => {
                tracing::info!(meter_id = %meter_id, "predicted evening peak: {kwh:.2} kWh")
            }
            None => {
                tracing::info!(meter_id = %meter_id, "predicted evening peak unavailable (short history)")
            }
        }
    }

    // One JSON object on stdout, keyed by meter id; the dashboard layer
    // consumes this line.
    println!("{}", serde_json::to_string(&processed.predictions)?);

    Ok(())
}
