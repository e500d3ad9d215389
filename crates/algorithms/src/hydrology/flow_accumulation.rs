//! Flow accumulation
//!
//! Counts, for every cell, the upstream cells that eventually drain
//! through it. Two passes over a D8 direction field:
//!
//! - [`flow_accumulation_ordered`]: consumes the priority-flood
//!   processing sequence in reverse. One linear sweep, no graph
//!   bookkeeping; requires the sequence.
//! - [`flow_accumulation_trace`]: walks downstream from every cell.
//!   Works from the direction field alone, so it also serves the
//!   local-slope solver.
//!
//! On an acyclic direction field both produce identical counts.

use demflow_core::raster::{d8, Raster};
use demflow_core::{Algorithm, Error, Result};

/// Flow accumulation algorithm (downstream trace)
#[derive(Debug, Clone, Default)]
pub struct FlowAccumulation;

impl Algorithm for FlowAccumulation {
    type Input = Raster<u8>;
    type Output = Raster<u32>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Accumulation"
    }

    fn description(&self) -> &'static str {
        "Count upstream contributing cells from D8 flow direction"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        flow_accumulation_trace(&input)
    }
}

/// Accumulate flow along a direction field using its processing sequence.
///
/// The sequence must list every cell exactly once in priority-flood
/// extraction order: earlier cells are downstream of later ones, so a
/// single reverse sweep sees every upstream cell before its receiver and
/// can push `acc + 1` one hop downstream.
///
/// # Panics
/// A direction code outside the D8 set, or one whose target falls
/// outside the raster, indicates a corrupt direction field and panics.
/// Direction fields produced by the priority-flood solver never do.
pub fn flow_accumulation_ordered(
    direction: &Raster<u8>,
    order: &[(usize, usize)],
) -> Result<Raster<u32>> {
    let (rows, cols) = direction.shape();
    if order.len() != rows * cols {
        return Err(Error::Algorithm(format!(
            "processing sequence has {} entries for a raster of {} cells",
            order.len(),
            rows * cols
        )));
    }

    let mut acc = direction.with_same_meta::<u32>();

    for &(row, col) in order.iter().rev() {
        let code = direction.get(row, col)?;
        if code == 0 {
            continue;
        }

        let (dr, dc) = d8::offset(code)
            .unwrap_or_else(|| panic!("corrupt direction code {code} at ({row}, {col})"));
        let down_row = row as isize + dr;
        let down_col = col as isize + dc;
        if down_row < 0 || down_col < 0 || down_row >= rows as isize || down_col >= cols as isize
        {
            panic!("direction at ({row}, {col}) points outside the {rows}x{cols} raster");
        }
        let (down_row, down_col) = (down_row as usize, down_col as usize);

        let upstream = unsafe { acc.get_unchecked(row, col) };
        let downstream = unsafe { acc.get_unchecked(down_row, down_col) };
        unsafe { acc.set_unchecked(down_row, down_col, downstream + upstream + 1) };
    }

    Ok(acc)
}

/// Accumulate flow by tracing every cell downstream.
///
/// Each cell walks along the direction field until it reaches a cell
/// with direction 0 or steps off the raster, incrementing every cell it
/// passes through. Quadratic in path length but independent of any
/// processing order.
///
/// # Panics
/// Panics if the walk revisits cells indefinitely, which means the
/// direction field contains a cycle. Both solvers produce acyclic
/// fields.
pub fn flow_accumulation_trace(direction: &Raster<u8>) -> Result<Raster<u32>> {
    let (rows, cols) = direction.shape();
    let total = rows * cols;
    let mut acc = direction.with_same_meta::<u32>();

    for row in 0..rows {
        for col in 0..cols {
            let mut r = row;
            let mut c = col;
            let mut steps = 0usize;

            loop {
                let code = unsafe { direction.get_unchecked(r, c) };
                if code == 0 {
                    break;
                }
                let (dr, dc) = match d8::offset(code) {
                    Some(o) => o,
                    None => {
                        return Err(Error::Algorithm(format!(
                            "invalid direction code {code} at ({r}, {c})"
                        )))
                    }
                };
                let nr = r as isize + dr;
                let nc = c as isize + dc;
                if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                    break;
                }
                r = nr as usize;
                c = nc as usize;

                let count = unsafe { acc.get_unchecked(r, c) };
                unsafe { acc.set_unchecked(r, c, count + 1) };

                steps += 1;
                if steps > total {
                    panic!("cycle in direction field reached from ({row}, {col})");
                }
            }
        }
    }

    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::flow_direction::flow_direction;
    use crate::hydrology::priority_flood::flow_direction_priority_flood;

    #[test]
    fn test_ordered_linear_chain() {
        // (0,0) → (0,1) → (0,2), second row all outlets
        let direction =
            Raster::from_vec(vec![d8::E, d8::E, 0u8, 0, 0, 0], 2, 3).unwrap();
        let order = vec![(0, 2), (0, 1), (0, 0), (1, 0), (1, 1), (1, 2)];

        let acc = flow_accumulation_ordered(&direction, &order).unwrap();
        assert_eq!(acc.get(0, 0).unwrap(), 0);
        assert_eq!(acc.get(0, 1).unwrap(), 1);
        assert_eq!(acc.get(0, 2).unwrap(), 2);
        assert_eq!(acc.get(1, 1).unwrap(), 0);
    }

    #[test]
    fn test_ordered_rejects_short_sequence() {
        let direction = Raster::from_vec(vec![0u8; 6], 2, 3).unwrap();
        let order = vec![(0, 0), (0, 1)];
        assert!(flow_accumulation_ordered(&direction, &order).is_err());
    }

    #[test]
    #[should_panic(expected = "points outside")]
    fn test_ordered_panics_when_direction_leaves_raster() {
        // (0,0) claims to drain north, off the top edge
        let direction = Raster::from_vec(vec![d8::N, 0u8, 0, 0], 2, 2).unwrap();
        let order = vec![(0, 0), (0, 1), (1, 0), (1, 1)];
        let _ = flow_accumulation_ordered(&direction, &order);
    }

    #[test]
    #[should_panic(expected = "corrupt direction code")]
    fn test_ordered_panics_on_invalid_code() {
        let direction = Raster::from_vec(vec![3u8, 0, 0, 0], 2, 2).unwrap();
        let order = vec![(0, 0), (0, 1), (1, 0), (1, 1)];
        let _ = flow_accumulation_ordered(&direction, &order);
    }

    #[test]
    fn test_trace_rejects_invalid_code() {
        let direction = Raster::from_vec(vec![3u8, 0, 0, 0], 2, 2).unwrap();
        assert!(flow_accumulation_trace(&direction).is_err());
    }

    #[test]
    fn test_trace_convergent_pit() {
        // All eight neighbors drain into the central pit
        let dem = Raster::from_vec(vec![5, 5, 5, 5, 1, 5, 5, 5, 5], 3, 3).unwrap();
        let fdir = flow_direction(&dem).unwrap();
        let acc = flow_accumulation_trace(&fdir).unwrap();

        assert_eq!(acc.get(1, 1).unwrap(), 8);
        for &(row, col) in &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)] {
            assert_eq!(acc.get(row, col).unwrap(), 0);
        }
    }

    #[test]
    fn test_trace_linear_slope() {
        // 2x5 falling east: each row is an independent chain
        let mut dem = Raster::new(2, 5);
        for row in 0..2 {
            for col in 0..5 {
                dem.set(row, col, (5 - col) as i32).unwrap();
            }
        }

        let fdir = flow_direction(&dem).unwrap();
        let acc = flow_accumulation_trace(&fdir).unwrap();

        for row in 0..2 {
            for col in 0..5 {
                assert_eq!(acc.get(row, col).unwrap(), col as u32);
            }
        }
    }

    #[test]
    fn test_algorithm_wrapper_matches_trace() {
        let dem = Raster::from_vec(vec![5, 5, 5, 5, 1, 5, 5, 5, 5], 3, 3).unwrap();
        let fdir = flow_direction(&dem).unwrap();

        let direct = flow_accumulation_trace(&fdir).unwrap();
        let wrapped = FlowAccumulation.execute_default(fdir).unwrap();

        assert_eq!(wrapped.data(), direct.data());
    }

    #[test]
    fn test_ordered_and_trace_agree_on_priority_flood_field() {
        let dem = Raster::from_vec(
            vec![
                3, 1, 4, 1, 5, //
                9, 2, 6, 5, 3, //
                5, 8, 9, 7, 9, //
                3, 2, 3, 8, 4, //
                6, 2, 6, 4, 3,
            ],
            5,
            5,
        )
        .unwrap();

        let routed = flow_direction_priority_flood(&dem).unwrap();
        let ordered = flow_accumulation_ordered(&routed.direction, &routed.order).unwrap();
        let traced = flow_accumulation_trace(&routed.direction).unwrap();

        assert_eq!(ordered.data(), traced.data());
    }
}
