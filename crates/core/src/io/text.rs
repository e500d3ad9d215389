//! Plain-text grid I/O
//!
//! Input format: one raster row per line, integer values separated by
//! spaces and/or commas. Empty and whitespace-only lines are skipped.
//! All rows must have the same length.

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read a plain-text grid into a raster.
///
/// Values are parsed as `i64` and cast into `T`; a value that does not
/// fit the target type is reported as a parse error.
pub fn read_text_grid<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut data: Vec<T> = Vec::new();
    let mut cols: Option<usize> = None;
    let mut rows = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            continue;
        }

        let expected = *cols.get_or_insert(tokens.len());
        if tokens.len() != expected {
            return Err(Error::RaggedRow {
                line: idx + 1,
                expected,
                found: tokens.len(),
            });
        }

        for token in tokens {
            let value: i64 = token.parse().map_err(|_| Error::InvalidValue {
                line: idx + 1,
                token: token.to_string(),
            })?;
            let cast: T = num_traits::cast(value).ok_or_else(|| Error::InvalidValue {
                line: idx + 1,
                token: token.to_string(),
            })?;
            data.push(cast);
        }
        rows += 1;
    }

    let cols = cols.unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    Raster::from_vec(data, rows, cols)
}

/// Write a raster as a plain-text grid, one row per line.
///
/// Columns are right-aligned to the widest value so the output reads as
/// a grid.
pub fn write_text_grid<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement + std::fmt::Display,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    let width = raster
        .data()
        .iter()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1);

    for row in raster.data().rows() {
        let mut first = true;
        for value in row.iter() {
            if first {
                write!(writer, "{value:>width$}")?;
                first = false;
            } else {
                write!(writer, " {value:>width$}")?;
            }
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
