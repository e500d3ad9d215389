//! D8 flow direction code table.
//!
//! Directions use the classical powers-of-two encoding:
//! ```text
//!   32  64  128
//!   16   0    1
//!    8   4    2
//! ```
//! 0 = sink/outlet (no outflow). Every consumer of direction codes in
//! the workspace goes through this table; there is no second
//! code-to-offset mapping anywhere else.

/// East
pub const E: u8 = 1;
/// South-east
pub const SE: u8 = 2;
/// South
pub const S: u8 = 4;
/// South-west
pub const SW: u8 = 8;
/// West
pub const W: u8 = 16;
/// North-west
pub const NW: u8 = 32;
/// North
pub const N: u8 = 64;
/// North-east
pub const NE: u8 = 128;

/// All eight codes, clockwise from east.
///
/// This is the neighbor scan order of the priority-flood solver; the
/// order cascades into insertion-counter tie-breaks, so it is fixed.
pub const CODES: [u8; 8] = [E, SE, S, SW, W, NW, N, NE];

/// Decode a direction code into a (row, col) offset.
///
/// Returns `None` for 0 (sink) and for values outside the code set.
pub fn offset(code: u8) -> Option<(isize, isize)> {
    match code {
        E => Some((0, 1)),
        SE => Some((1, 1)),
        S => Some((1, 0)),
        SW => Some((1, -1)),
        W => Some((0, -1)),
        NW => Some((-1, -1)),
        N => Some((-1, 0)),
        NE => Some((-1, 1)),
        _ => None,
    }
}

/// The code pointing the opposite way.
///
/// `opposite(0)` is 0: a sink has no upstream-facing counterpart.
pub fn opposite(code: u8) -> u8 {
    match code {
        E => W,
        SE => NW,
        S => N,
        SW => NE,
        W => E,
        NW => SE,
        N => S,
        NE => SW,
        _ => 0,
    }
}

/// Whether a diagonal code (flow distance √2 rather than 1)
pub fn is_diagonal(code: u8) -> bool {
    matches!(code, SE | SW | NW | NE)
}

/// Translate from the compact decimal encoding {10, 20, .., 80} used by
/// some legacy direction rasters. Returns `None` for unknown values.
pub fn from_compact(code: u8) -> Option<u8> {
    match code {
        0 => Some(0),
        10 => Some(NW),
        20 => Some(N),
        30 => Some(NE),
        40 => Some(W),
        50 => Some(E),
        60 => Some(SW),
        70 => Some(S),
        80 => Some(SE),
        _ => None,
    }
}

/// Translate to the compact decimal encoding. Inverse of [`from_compact`].
pub fn to_compact(code: u8) -> Option<u8> {
    match code {
        0 => Some(0),
        NW => Some(10),
        N => Some(20),
        NE => Some(30),
        W => Some(40),
        E => Some(50),
        SW => Some(60),
        S => Some(70),
        SE => Some(80),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_cover_all_neighbors() {
        let mut seen = std::collections::HashSet::new();
        for &code in &CODES {
            let (dr, dc) = offset(code).unwrap();
            assert!(dr.abs() <= 1 && dc.abs() <= 1);
            assert!((dr, dc) != (0, 0));
            seen.insert((dr, dc));
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_offset_rejects_invalid() {
        assert_eq!(offset(0), None);
        assert_eq!(offset(3), None);
        assert_eq!(offset(255), None);
    }

    #[test]
    fn test_opposite_is_involution() {
        for &code in &CODES {
            assert_eq!(opposite(opposite(code)), code);
            let (dr, dc) = offset(code).unwrap();
            let (or, oc) = offset(opposite(code)).unwrap();
            assert_eq!((or, oc), (-dr, -dc));
        }
        assert_eq!(opposite(0), 0);
    }

    #[test]
    fn test_compact_roundtrip() {
        for &code in &CODES {
            let compact = to_compact(code).unwrap();
            assert_eq!(from_compact(compact), Some(code));
        }
        assert_eq!(from_compact(0), Some(0));
        assert_eq!(from_compact(90), None);
    }

    #[test]
    fn test_compact_known_values() {
        assert_eq!(from_compact(50), Some(E));
        assert_eq!(from_compact(70), Some(S));
        assert_eq!(from_compact(10), Some(NW));
        assert_eq!(to_compact(N), Some(20));
    }
}
