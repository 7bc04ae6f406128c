//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use gridcalc_core::{is_formula, CellCoordinate, Sheet, Value, MAX_COLS, MAX_ROWS};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a sheet
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Sheet> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a sheet
    ///
    /// Record `n`, field `m` lands in row `n`, column `m` (zero-based). Rows
    /// may have different lengths.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Sheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut sheet = Sheet::new(options.sheet_name.clone());
        let mut rows = 0usize;

        for (row, result) in csv_reader.records().enumerate() {
            let record = result?;
            let is_header = options.has_header && row == 0;

            for (col, field) in record.iter().enumerate() {
                if field.is_empty() {
                    continue;
                }
                let coord = Self::coordinate(row, col)?;

                if is_header {
                    sheet.set_value_at(coord, Value::text(field));
                } else if options.formulas && is_formula(field) {
                    sheet.set_input_at(coord, field);
                } else if options.auto_detect_types {
                    sheet.set_value_at(coord, Value::from_input(field));
                } else {
                    sheet.set_value_at(coord, Value::text(field));
                }
            }

            rows += 1;
        }

        tracing::debug!(
            sheet = sheet.name(),
            rows,
            formulas = sheet.formulas().len(),
            "loaded CSV"
        );
        Ok(sheet)
    }

    fn coordinate(row: usize, col: usize) -> CsvResult<CellCoordinate> {
        if row >= MAX_ROWS as usize || col >= MAX_COLS as usize {
            return Err(CsvError::OutOfGrid {
                row: row + 1,
                column: col + 1,
            });
        }
        Ok(CellCoordinate::new(col as u32, row as u32))
    }
}
