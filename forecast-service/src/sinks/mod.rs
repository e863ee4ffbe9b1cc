pub mod collect;
pub mod csv_file;

pub use collect::VecSink;
pub use csv_file::CsvFileSink;
