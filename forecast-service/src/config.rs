use serde::Deserialize;
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path of the flat storage file (header: timestamp,entity_id,usage).
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("electricity_data.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub meter_ids: Vec<String>,
    pub lookback_days: u32,
    /// Std-dev of the per-hour noise draw, in kWh. Zero disables noise.
    pub noise_std_kwh: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            meter_ids: vec![
                "meter-001".to_string(),
                "meter-002".to_string(),
                "meter-003".to_string(),
            ],
            lookback_days: 14,
            noise_std_kwh: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Centered moving-average window, in hours. Expected odd.
    pub window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window: 3 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub generator: GeneratorConfig,
    pub smoothing: SmoothingConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Load configuration from the TOML file named by `FORECAST_CONFIG`
    /// (default `forecast-config.toml`). A missing file is not an error:
    /// the built-in defaults cover the reference deployment, so the
    /// binaries run without any config on disk.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("FORECAST_CONFIG").unwrap_or_else(|_| "forecast-config.toml".to_string());
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let cfg: AppConfig = toml::from_str(&contents)?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
            Err(e) => Err(e.into()),
        }
    }
}
