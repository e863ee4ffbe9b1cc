use std::collections::BTreeMap;

use crate::domain::MeterReading;

/// A multi-meter dataset held as one ordered series per meter.
///
/// Keeping the series separate (rather than one flat table grouped by a
/// column) makes it impossible for windowed transforms to read across a
/// meter boundary. Within each series, readings are kept in ascending
/// timestamp order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    series: BTreeMap<String, Vec<MeterReading>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a flat row stream into per-meter series.
    ///
    /// Rows arriving out of timestamp order within a meter are sorted;
    /// order across meters does not matter.
    pub fn from_rows<I: IntoIterator<Item = MeterReading>>(rows: I) -> Self {
        let mut ds = Self::new();
        for reading in rows {
            ds.push(reading);
        }
        for series in ds.series.values_mut() {
            series.sort_by_key(|r| r.ts);
        }
        ds
    }

    pub fn push(&mut self, reading: MeterReading) {
        self.series
            .entry(reading.meter_id.clone())
            .or_default()
            .push(reading);
    }

    /// Meter ids in stable (lexicographic) order.
    pub fn meter_ids(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// The ordered series for one meter. An unknown meter id yields an
    /// empty slice, not an error.
    pub fn series(&self, meter_id: &str) -> &[MeterReading] {
        self.series.get(meter_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MeterReading])> {
        self.series.iter().map(|(id, s)| (id.as_str(), s.as_slice()))
    }

    /// Total number of readings across all meters.
    pub fn len(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }
}
