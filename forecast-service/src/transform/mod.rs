use meter_domain::MeterReading;
use time::macros::datetime;

use crate::pipeline::{Envelope, PipelineError, Transform};

/// Pure validation of a `MeterReading`.
///
/// Rules:
/// - kWh must be non-negative.
/// - ts must be within a broad sanity window [2000-01-01, 2100-01-01].
pub fn validate_meter_reading(
    env: Envelope<MeterReading>,
) -> Result<Envelope<MeterReading>, PipelineError> {
    let r = &env.payload;

    if r.kwh < 0.0 {
        return Err(PipelineError::Transform("usage must be non-negative".to_string()));
    }

    let min_ts = datetime!(2000-01-01 00:00:00 UTC);
    let max_ts = datetime!(2100-01-01 00:00:00 UTC);

    if r.ts < min_ts || r.ts > max_ts {
        return Err(PipelineError::Transform("timestamp out of allowed range".to_string()));
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct MeterReadingValidation;

#[async_trait::async_trait]
impl Transform<MeterReading, MeterReading> for MeterReadingValidation {
    async fn apply(
        &self,
        input: Envelope<MeterReading>,
    ) -> Result<Envelope<MeterReading>, PipelineError> {
        match validate_meter_reading(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("validation_meter_reading_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}
