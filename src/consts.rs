//! Numeric constants shared by the clipping and offsetting engines.

/// Sentinel `OutPt::idx` / `TEdge::out_idx` value meaning "not currently
/// contributing to any output ring".
pub const UNASSIGNED: isize = -1;
/// Sentinel meaning "this edge would otherwise close a path but has been
/// marked to skip local-minima reinsertion" (horizontal edge bookkeeping).
pub const SKIP: isize = -2;

/// `dx` of a horizontal edge. Chosen far outside any real slope so ordering
/// comparisons against it are unambiguous.
pub const HORIZONTAL_DX: f64 = -1.0e40;

pub const TOLERANCE: f64 = 1.0e-20;

pub fn near_zero(val: f64) -> bool {
    val > -TOLERANCE && val < TOLERANCE
}

/// Coordinates within this magnitude use a 64-bit cross-product safely.
pub const LO_RANGE: i64 = 0x3FFF_FFFF;
/// Coordinates must not exceed this magnitude even on the 128-bit path.
pub const HI_RANGE: i64 = 0x3FFF_FFFF_FFFF_FFFF;

/// `RangeMode::Small` mirrors the source's `use_int32` compile option: a
/// narrower bound in exchange for (conceptually) cheaper arithmetic. Both
/// modes use `i64` storage in this port; see `SPEC_FULL.md`.
pub const SMALL_RANGE: i64 = 0x7FFF;
