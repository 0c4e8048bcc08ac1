//! Coordinate & attribute primitives (spec C1).

use crate::consts::{HI_RANGE, LO_RANGE, SMALL_RANGE};
use crate::error::ClipperError;

/// Coordinate storage type. The source distinguishes a 32-bit `use_int32`
/// mode from a 64-bit default at compile time; this port keeps one storage
/// type and exposes the distinction as the runtime [`RangeMode`] instead
/// (see `SPEC_FULL.md`).
pub type CInt = i64;

/// Which coordinate-magnitude tier `add_path` enforces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RangeMode {
    /// Mirrors the source's default (64-bit) range: magnitudes up to
    /// `HI_RANGE`, with the cheap 64-bit cross-product path available below
    /// `LO_RANGE` and the 128-bit path above it.
    #[default]
    Full,
    /// Mirrors the source's `use_int32` option: magnitudes up to
    /// `SMALL_RANGE`, always eligible for the 64-bit cross-product path.
    Small,
}

impl RangeMode {
    pub fn bound(self) -> CInt {
        match self {
            RangeMode::Full => HI_RANGE,
            RangeMode::Small => SMALL_RANGE,
        }
    }

    pub fn uses_full_range(self, x: CInt, y: CInt) -> bool {
        matches!(self, RangeMode::Full) && (x.abs() > LO_RANGE || y.abs() > LO_RANGE)
    }

    pub fn check(self, x: CInt, y: CInt) -> Result<(), ClipperError> {
        let bound = self.bound();
        if x.abs() > bound || y.abs() > bound {
            return Err(ClipperError::Range(format!(
                "coordinate ({x}, {y}) exceeds range bound {bound}"
            )));
        }
        Ok(())
    }
}

/// A vertex with optional per-vertex attribute data (spec C1).
///
/// `z` defaults to `0` for callers that do not use attribute propagation.
/// The teacher crate modeled this as a generic `IntPoint` trait with
/// `IntPoint2d`/`IntPoint3d` implementors; collapsed to one concrete type
/// here since every op in this engine needs the same three fields (see
/// `SPEC_FULL.md`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct IntPoint {
    pub x: CInt,
    pub y: CInt,
    pub z: CInt,
}

impl IntPoint {
    pub fn new(x: CInt, y: CInt) -> Self {
        Self { x, y, z: 0 }
    }

    pub fn with_z(x: CInt, y: CInt, z: CInt) -> Self {
        Self { x, y, z }
    }

    /// Slope `dx/dy` of the segment from `self` to `other`; `HORIZONTAL_DX`
    /// when the segment has zero height.
    pub fn dx_to(&self, other: &IntPoint) -> f64 {
        if self.y == other.y {
            crate::consts::HORIZONTAL_DX
        } else {
            (other.x - self.x) as f64 / (other.y - self.y) as f64
        }
    }
}

/// Dual-orientation attribute carrier (spec C1 `OutCoord`).
///
/// Every emitted output vertex keeps *two* attribute slots: one valid when
/// the ring is later read forward, one valid when read in reverse. The
/// engine may reverse a completed chain without recomputing attributes by
/// swapping which slot is authoritative.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OutCoord {
    pub x: CInt,
    pub y: CInt,
    pub correct_z: CInt,
    pub reverse_z: CInt,
}

impl OutCoord {
    pub fn new(x: CInt, y: CInt, correct_z: CInt, reverse_z: CInt) -> Self {
        Self { x, y, correct_z, reverse_z }
    }

    pub fn from_point(p: IntPoint) -> Self {
        Self { x: p.x, y: p.y, correct_z: p.z, reverse_z: 0 }
    }

    /// Swap `correct_z`/`reverse_z`: the attribute-carrier half of reversing
    /// a chain's traversal direction.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.correct_z, &mut self.reverse_z);
    }

    pub fn to_point(&self, reversed: bool) -> IntPoint {
        IntPoint {
            x: self.x,
            y: self.y,
            z: if reversed { self.reverse_z } else { self.correct_z },
        }
    }
}

/// `p1 -> p2` and `p3 -> p4` have equal slope, computed without floating
/// point division. Uses native `i128` multiplication unconditionally
/// (superseding the source's optional `extprim` crate for 128-bit ints on
/// pre-128-bit-stable Rust).
#[inline]
pub fn slopes_equal4(p1: IntPoint, p2: IntPoint, p3: IntPoint, p4: IntPoint) -> bool {
    let dy1 = (p1.y - p2.y) as i128;
    let dx1 = (p1.x - p2.x) as i128;
    let dy2 = (p3.y - p4.y) as i128;
    let dx2 = (p3.x - p4.x) as i128;
    dy1 * dx2 == dx1 * dy2
}

#[inline]
pub fn slopes_equal3(p1: IntPoint, p2: IntPoint, p3: IntPoint) -> bool {
    let dy1 = (p1.y - p2.y) as i128;
    let dx1 = (p1.x - p2.x) as i128;
    let dy2 = (p2.y - p3.y) as i128;
    let dx2 = (p2.x - p3.x) as i128;
    dy1 * dx2 == dx1 * dy2
}

/// Signed cross product `(p2 - p1) x (p3 - p1)`, sign gives turn direction.
#[inline]
pub fn cross(p1: IntPoint, p2: IntPoint, p3: IntPoint) -> i128 {
    let ax = (p2.x - p1.x) as i128;
    let ay = (p2.y - p1.y) as i128;
    let bx = (p3.x - p1.x) as i128;
    let by = (p3.y - p1.y) as i128;
    ax * by - ay * bx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_points_have_equal_slopes() {
        let a = IntPoint::new(0, 0);
        let b = IntPoint::new(10, 10);
        let c = IntPoint::new(20, 20);
        assert!(slopes_equal3(a, b, c));
        assert_eq!(cross(a, b, c), 0);
    }

    #[test]
    fn range_check_rejects_oversized_coordinates() {
        let mode = RangeMode::Full;
        assert!(mode.check(10, 10).is_ok());
        assert!(mode.check(HI_RANGE + 1, 0).is_err());
    }

    #[test]
    fn out_coord_reverse_swaps_attribute_slots() {
        let mut oc = OutCoord::new(1, 2, 10, 20);
        oc.reverse();
        assert_eq!(oc.correct_z, 20);
        assert_eq!(oc.reverse_z, 10);
    }
}
