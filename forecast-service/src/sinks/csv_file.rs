use std::{fs, path::PathBuf};

use futures::StreamExt;
use meter_domain::MeterReading;
use time::format_description::well_known::Rfc3339;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Batching CSV sink for `MeterReading`.
///
/// Writes the storage contract file (header `timestamp,entity_id,usage`).
/// Rows are staged into a `.tmp` sibling and renamed into place once the
/// stream completes, so a concurrent reader never observes a
/// half-written dataset. There is no retry loop: local file writes
/// either succeed or surface the error.
pub struct CsvFileSink {
    path: PathBuf,
    batch_size: usize,
}

impl CsvFileSink {
    pub fn new<P: Into<PathBuf>>(path: P, batch_size: usize) -> Self {
        Self {
            path: path.into(),
            batch_size: batch_size.max(1),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut s = self.path.clone().into_os_string();
        s.push(".tmp");
        PathBuf::from(s)
    }

    fn flush_batch<W: std::io::Write>(
        writer: &mut csv::Writer<W>,
        batch: &[Envelope<MeterReading>],
    ) -> Result<(), PipelineError> {
        for env in batch {
            let r = &env.payload;
            let ts = r
                .ts
                .format(&Rfc3339)
                .map_err(|e| PipelineError::Sink(format!("failed to format timestamp: {e}")))?;
            writer
                .write_record([ts.as_str(), r.meter_id.as_str(), r.kwh.to_string().as_str()])
                .map_err(|e| PipelineError::Sink(format!("failed to write CSV record: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| PipelineError::Sink(format!("failed to flush CSV writer: {e}")))?;

        metrics::counter!("dataset_rows_written_total").increment(batch.len() as u64);
        if let Some(min_received) = batch.iter().map(|e| e.received_at).min() {
            if let Ok(dur) = std::time::SystemTime::now().duration_since(min_received) {
                metrics::histogram!("dataset_write_latency_seconds").record(dur.as_secs_f64());
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Sink<MeterReading> for CsvFileSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<MeterReading>, PipelineError>>
            + Send
            + Unpin
            + 'static,
    {
        let staging = self.staging_path();
        let file = fs::File::create(&staging)
            .map_err(|e| PipelineError::Sink(format!("failed to create {}: {e}", staging.display())))?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(["timestamp", "entity_id", "usage"])
            .map_err(|e| PipelineError::Sink(format!("failed to write CSV header: {e}")))?;

        let mut buffer: Vec<Envelope<MeterReading>> = Vec::with_capacity(self.batch_size);

        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for CsvFileSink");
                    metrics::counter!("csv_sink_upstream_errors_total").increment(1);
                    return Err(e);
                }
            };

            buffer.push(env);
            if buffer.len() >= self.batch_size {
                Self::flush_batch(&mut writer, &buffer)?;
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            Self::flush_batch(&mut writer, &buffer)?;
        }

        writer
            .flush()
            .map_err(|e| PipelineError::Sink(format!("failed to flush CSV writer: {e}")))?;
        drop(writer);

        fs::rename(&staging, &self.path).map_err(|e| {
            PipelineError::Sink(format!(
                "failed to move {} into place: {e}",
                staging.display()
            ))
        })?;

        tracing::info!(path = %self.path.display(), "dataset written");
        Ok(())
    }
}
