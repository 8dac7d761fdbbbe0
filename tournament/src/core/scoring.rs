//! Heat scoring table

/// Points awarded for positions 1 through 8
const POINTS_TABLE: [u32; 8] = [10, 8, 6, 5, 4, 3, 2, 1];

/// Points for a 1-based finishing position.
///
/// Total: positions past the table (and the non-position 0) score nothing.
pub fn points_for_position(position: u32) -> u32 {
    match position {
        0 => 0,
        p => POINTS_TABLE.get(p as usize - 1).copied().unwrap_or(0),
    }
}
