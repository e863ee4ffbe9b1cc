pub mod csv_file;
pub mod synthetic_meter;

pub use csv_file::MeterReadingCsvFileSource;
pub use synthetic_meter::SyntheticMeterSource;
