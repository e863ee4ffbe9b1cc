pub mod daily_peak;
pub mod dataset;
pub mod meter_reading;

pub use daily_peak::DailyPeak;
pub use dataset::Dataset;
pub use meter_reading::{MeterReading, SmoothedReading};
