//! Concrete [`crate::traits::RowSource`] implementations.
mod csv_file;

pub use csv_file::CsvFileSource;
