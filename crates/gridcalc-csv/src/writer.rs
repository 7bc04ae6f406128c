//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use gridcalc_core::{CellCoordinate, Sheet};

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a sheet to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        sheet: &Sheet,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(sheet, file, options)
    }

    /// Write a sheet to a writer
    ///
    /// Output always starts at A1 so cell positions survive a round trip, and
    /// extends to the bottom-right corner of the used range.
    pub fn write<W: Write>(sheet: &Sheet, writer: W, options: &CsvWriteOptions) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        if let Some(range) = sheet.used_range() {
            for row in 0..=range.end.row {
                let record: Vec<String> = (0..=range.end.col)
                    .map(|col| Self::field(sheet, CellCoordinate::new(col, row), options))
                    .collect();
                csv_writer.write_record(&record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn field(sheet: &Sheet, coord: CellCoordinate, options: &CsvWriteOptions) -> String {
        if options.write_formulas {
            if let Some(formula) = sheet.formula_at(coord) {
                return formula.to_string();
            }
        }
        sheet.value_at(coord).to_string()
    }
}
