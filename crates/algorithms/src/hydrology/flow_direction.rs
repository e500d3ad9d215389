//! Local-slope D8 flow direction
//!
//! Picks each cell's direction by comparing its own elevation against
//! its eight neighbors: the neighbor with the steepest strictly positive
//! drop wins (cardinal drops over distance 1, diagonal over √2). Cells
//! with no positive drop (pits, flats) keep direction 0, so interior
//! sinks truncate downstream accumulation. The priority-flood solver is
//! the front-end of choice on unconditioned DEMs; this one is the
//! simpler local policy sharing the same data model.

use demflow_core::raster::{d8, Raster};
use demflow_core::{Algorithm, Error, Result};
use std::f64::consts::SQRT_2;

/// Neighbor lookup order. Ties on the steepest drop resolve to the
/// first entry, so this order is part of the output contract: document
/// it, don't reorder it.
const TIE_BREAK: [u8; 8] = [
    d8::S,
    d8::SE,
    d8::N,
    d8::E,
    d8::NE,
    d8::NW,
    d8::W,
    d8::SW,
];

/// Local-slope D8 flow direction algorithm
#[derive(Debug, Clone, Default)]
pub struct FlowDirection;

impl Algorithm for FlowDirection {
    type Input = Raster<i32>;
    type Output = Raster<u8>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Direction (local slope)"
    }

    fn description(&self) -> &'static str {
        "Assign D8 flow directions by steepest local drop"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        flow_direction(&input)
    }
}

/// Compute D8 flow directions by steepest local drop.
///
/// For each cell the drop to a neighbor is `elev[c] − elev[n]`, divided
/// by √2 for diagonal neighbors. Missing neighbors (off the raster) are
/// unavailable. A cell gets the code of the neighbor attaining the
/// maximum drop if that maximum is strictly positive, otherwise 0.
///
/// # Arguments
/// * `dem` - Input elevation raster, at least 2×2
///
/// # Returns
/// Raster<u8> with D8 direction codes
pub fn flow_direction(dem: &Raster<i32>) -> Result<Raster<u8>> {
    let (rows, cols) = dem.shape();
    if rows < 2 || cols < 2 {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    let mut direction = dem.with_same_meta::<u8>();

    for row in 0..rows {
        for col in 0..cols {
            let center = unsafe { dem.get_unchecked(row, col) };

            let mut max_drop = 0.0_f64;
            let mut best: u8 = 0;

            for &code in &TIE_BREAK {
                let Some((dr, dc)) = d8::offset(code) else {
                    continue;
                };
                let nr = row as isize + dr;
                let nc = col as isize + dc;
                if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                    continue;
                }
                let neighbor = unsafe { dem.get_unchecked(nr as usize, nc as usize) };

                let mut drop = f64::from(center) - f64::from(neighbor);
                if d8::is_diagonal(code) {
                    drop /= SQRT_2;
                }

                // Strict comparison keeps the first tied neighbor and
                // leaves flats and pits at 0.
                if drop > max_drop {
                    max_drop = drop;
                    best = code;
                }
            }

            unsafe { direction.set_unchecked(row, col, best) };
        }
    }

    Ok(direction)
}
