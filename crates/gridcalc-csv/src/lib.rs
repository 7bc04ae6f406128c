//! # gridcalc-csv
//!
//! CSV reader and writer for gridcalc sheets.
//!
//! Fields beginning with `=` are loaded as stored formulas; everything else
//! becomes a number or text. Writing emits displayed values, so a sheet that
//! has been calculated writes out its results.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;
