//! I/O adapters for reading and writing rasters
//!
//! Two formats are supported: plain-text grids (one row of integers per
//! line) and single-band grayscale GeoTIFF via the `tiff` crate. Both
//! sides are adapters around the core data model; the solvers never
//! touch the filesystem.

mod geotiff;
mod text;

pub use geotiff::{read_geotiff, write_geotiff};
pub use text::{read_text_grid, write_text_grid};
