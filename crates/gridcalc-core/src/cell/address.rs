//! Cell coordinate and range types
//!
//! Formula syntax addresses cells as column letters followed by a 1-based row
//! number (`A1`, `AZ100`). Internally both axes are zero-based.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use lazy_regex::regex_captures;
use std::fmt;
use std::str::FromStr;

/// A zero-based cell location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoordinate {
    /// Row index (0-based internally, 1-based in formula text)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: u32,
}

impl CellCoordinate {
    /// Create a coordinate from zero-based column and row indices
    pub fn new(col: u32, row: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellCoordinate;
    ///
    /// let coord = CellCoordinate::parse("B2").unwrap();
    /// assert_eq!(coord.col, 1);
    /// assert_eq!(coord.row, 1);
    ///
    /// let coord = CellCoordinate::parse("az100").unwrap();
    /// assert_eq!(coord.col, 51);
    /// assert_eq!(coord.row, 99);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (_, letters, digits) = regex_captures!(r"^([A-Za-z]+)([0-9]+)$", s)
            .ok_or_else(|| Error::InvalidAddress(format!("'{}' is not letters followed by digits", s)))?;

        let col = column_to_index(letters)?;

        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Rows are 1-based in formula text
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = row - 1;
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self { row, col })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", index_to_column(self.col), self.row + 1)
    }

    /// Key used by host formula stores (`"row:col"`, zero-based)
    pub fn key(&self) -> String {
        format!("{}:{}", self.row, self.col)
    }

    /// Parse a `"row:col"` store key back into a coordinate
    pub fn from_key(key: &str) -> Option<Self> {
        let (row, col) = key.split_once(':')?;
        Some(Self {
            row: row.parse().ok()?,
            col: col.parse().ok()?,
        })
    }

    /// Create a range from this coordinate to another
    pub fn to(&self, other: CellCoordinate) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Convert column letters to a zero-based index (A = 0, Z = 25, AA = 26, etc.)
///
/// Letters are case-insensitive.
pub fn column_to_index(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .filter(|v| *v <= MAX_COLS)
            .ok_or_else(|| Error::ColumnOutOfBounds(u32::MAX, MAX_COLS - 1))?;
    }

    Ok(col - 1)
}

/// Convert a zero-based column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn index_to_column(index: u32) -> String {
    let mut letters = Vec::new();
    let mut n = index as u64 + 1;

    while n > 0 {
        n -= 1;
        letters.push((n % 26) as u8 + b'A');
        n /= 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parse a single-cell token such as `B7`
///
/// Returns `None` for anything that is not letters followed by digits,
/// including range tokens and row `0`.
pub fn parse_cell_ref(token: &str) -> Option<CellCoordinate> {
    if !lazy_regex::regex_is_match!(r"^[A-Za-z]+[0-9]+$", token) {
        return None;
    }
    CellCoordinate::parse(token).ok()
}

/// Parse a range token such as `A1:C3`
///
/// Corner order does not matter: `B2:A1` yields the same range as `A1:B2`.
pub fn parse_range(token: &str) -> Option<CellRange> {
    let (_, start, end) = regex_captures!(r"^([A-Za-z]+[0-9]+):([A-Za-z]+[0-9]+)$", token)?;
    let start = CellCoordinate::parse(start).ok()?;
    let end = CellCoordinate::parse(end).ok()?;
    Some(CellRange::new(start, end))
}

/// An inclusive rectangle of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start coordinate (top-left)
    pub start: CellCoordinate,
    /// End coordinate (bottom-right)
    pub end: CellCoordinate,
}

impl CellRange {
    /// Create a new cell range from any two corners
    pub fn new(a: CellCoordinate, b: CellCoordinate) -> Self {
        // Normalize so start is top-left and end is bottom-right
        Self {
            start: CellCoordinate::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellCoordinate::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }

    /// Create a single-cell range
    pub fn single(coord: CellCoordinate) -> Self {
        Self {
            start: coord,
            end: coord,
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        match s.split_once(':') {
            Some((start, end)) => {
                let start = CellCoordinate::parse(start)
                    .map_err(|e| Error::InvalidRange(format!("{}: {}", s, e)))?;
                let end = CellCoordinate::parse(end)
                    .map_err(|e| Error::InvalidRange(format!("{}: {}", s, e)))?;
                Ok(Self::new(start, end))
            }
            None => Ok(Self::single(CellCoordinate::parse(s)?)),
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, coord: &CellCoordinate) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Iterate over all cell coordinates in the range (rows outer, columns inner)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
            remaining: self.cell_count(),
        }
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major iterator over the cells in a range
pub struct CellRangeIterator {
    range: CellRange,
    current_row: u32,
    current_col: u32,
    remaining: u64,
}

impl Iterator for CellRangeIterator {
    type Item = CellCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let coord = CellCoordinate::new(self.current_col, self.current_row);
        self.remaining -= 1;

        self.current_col += 1;
        if self.current_col > self.range.end.col {
            self.current_col = self.range.start.col;
            self.current_row += 1;
        }

        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellRangeIterator {}
