pub mod analysis;
pub mod config;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod service;
pub mod sinks;
pub mod sources;
pub mod store;
pub mod transform;

pub use pipeline::{Envelope, Pipeline};
pub use service::{ensure_dataset_exists, get_processed_data, ProcessedData};
