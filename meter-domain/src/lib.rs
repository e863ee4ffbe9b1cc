pub mod domain;

pub use domain::{DailyPeak, Dataset, MeterReading, SmoothedReading};
