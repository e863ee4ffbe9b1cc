use std::{fs::File, path::PathBuf, pin::Pin};

use csv::StringRecord;
use futures::Stream;
use meter_domain::MeterReading;
use time::OffsetDateTime;

use crate::pipeline::{Envelope, PipelineError, Source};

/// CSV source for `MeterReading`.
///
/// Expected header columns (by name):
/// - timestamp (RFC3339 instant)
/// - entity_id
/// - usage (kWh)
///
/// This is the read side of the storage contract; the write side is
/// `sinks::CsvFileSink`.
pub struct MeterReadingCsvFileSource {
    path: PathBuf,
}

impl MeterReadingCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn record_to_reading(
    record: &StringRecord,
    headers: &StringRecord,
) -> Result<MeterReading, PipelineError> {
    let get = |name: &str| -> Result<&str, PipelineError> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
            .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in CSV record")))
    };

    let ts_str = get("timestamp")?;
    let ts = OffsetDateTime::parse(ts_str.trim(), &time::format_description::well_known::Rfc3339)
        .map_err(|e| PipelineError::Source(format!("invalid timestamp '{ts_str}': {e}")))?;

    let meter_id = get("entity_id")?.trim().to_string();

    let usage_str = get("usage")?;
    let kwh: f64 = usage_str
        .trim()
        .parse()
        .map_err(|e| PipelineError::Source(format!("invalid usage '{usage_str}': {e}")))?;

    Ok(MeterReading { ts, meter_id, kwh })
}

#[async_trait::async_trait]
impl Source<MeterReading> for MeterReadingCsvFileSource {
    async fn stream(
        &self,
    ) -> Pin<Box<dyn Stream<Item = Result<Envelope<MeterReading>, PipelineError>> + Send>> {
        // The dataset is bounded (meters × lookback × 24 rows), so a
        // blocking CSV reader inside one async task is fine here.
        let path = self.path.clone();
        let s = async_stream::try_stream! {
            let file = File::open(&path)
                .map_err(|e| PipelineError::Source(format!("failed to open {}: {e}", path.display())))?;
            let mut rdr = csv::Reader::from_reader(file);
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
                .clone();

            for result in rdr.records() {
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read CSV record: {e}"
                )))?;

                let reading = match record_to_reading(&record, &headers) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("meter_reading_csv_parse_errors_total").increment(1);
                        Err(e)?
                    }
                };

                yield Envelope::now(reading);
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn parse(headers: &[&str], fields: &[&str]) -> Result<MeterReading, PipelineError> {
        let headers = StringRecord::from(headers.to_vec());
        let record = StringRecord::from(fields.to_vec());
        record_to_reading(&record, &headers)
    }

    #[test]
    fn parses_row_by_header_name() {
        let r = parse(
            &["timestamp", "entity_id", "usage"],
            &["2024-06-01T18:00:00Z", "meter-001", "141.5"],
        )
        .unwrap();

        assert_eq!(r.ts, datetime!(2024-06-01 18:00:00 UTC));
        assert_eq!(r.meter_id, "meter-001");
        assert_eq!(r.kwh, 141.5);
    }

    #[test]
    fn column_order_does_not_matter() {
        let r = parse(
            &["usage", "timestamp", "entity_id"],
            &["7.25", "2024-06-01T03:00:00Z", "meter-002"],
        )
        .unwrap();
        assert_eq!(r.kwh, 7.25);
        assert_eq!(r.meter_id, "meter-002");
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let res = parse(
            &["timestamp", "entity_id", "usage"],
            &["yesterday", "meter-001", "1.0"],
        );
        assert!(matches!(res, Err(PipelineError::Source(_))));
    }

    #[test]
    fn rejects_missing_column() {
        let res = parse(&["timestamp", "usage"], &["2024-06-01T00:00:00Z", "1.0"]);
        assert!(matches!(res, Err(PipelineError::Source(_))));
    }
}
