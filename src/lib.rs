//! # clipper
//!
//! A Rust port of Angus Johnson's Clipper: a two-dimensional polygon
//! boolean-operations engine (union / intersection / difference / XOR) built
//! on Bala Vatti's scanline clipping algorithm, plus a polygon offsetting
//! facility, with per-vertex attribute ("Z") propagation through user
//! callbacks.
//!
//! "A generic solution to polygon clipping", Bala R. Vatti.
//! Communications of the ACM, Vol 35, Issue 7 (July 1992) pp 56-63.
//!
//! # License
//!
//! Use, modification & distribution is subject to the Boost Software License
//! Ver 1. http://www.boost.org/LICENSE_1_0.txt

pub mod arena;
pub mod base;
pub mod callback;
pub mod clipper;
pub mod consts;
pub mod edge;
pub mod error;
pub mod node;
pub mod offset;
pub mod output;
pub mod point;
pub mod scanbeam;

pub use callback::{FollowingZFill, FollowingZFillAdapter, NoOpZFill, ZFill};
pub use clipper::Clipper;
pub use error::{ClipperError, ClipperResult};
pub use node::{NodeIdx, PolyNode, PolyTree};
pub use offset::ClipperOffset;
pub use point::{CInt, IntPoint, RangeMode};

/// Direction a bound or horizontal run travels in.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Direction {
    RightToLeft,
    LeftToRight,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ClipType {
    Intersection,
    Union,
    Difference,
    Xor,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum PolyType {
    Subject,
    Clip,
}

/// By far the most widely used winding rules for polygon filling are
/// EvenOdd and NonZero (GDI, GDI+, XLib, OpenGL, Cairo, AGG, Quartz, SVG).
/// Positive/Negative restrict contribution to a single winding sign.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum PolyFillType {
    EvenOdd,
    NonZero,
    Positive,
    Negative,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum JoinType {
    Square,
    Round,
    Miter,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum EndType {
    ClosedPolygon,
    ClosedLine,
    OpenButt,
    OpenSquare,
    OpenRound,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum EdgeSide {
    Left,
    Right,
}

/// A single contour. `Paths` (`Vec<Path>`) is the flat, non-hierarchical
/// result type; `PolyTree` is the hierarchical one (spec §6 `Path`/`Paths`).
pub type Path = Vec<IntPoint>;
pub type Paths = Vec<Path>;

/// Signed area via the shoelace formula. Positive for a counter-clockwise
/// ring (in a Y-up frame); see [`orientation`].
pub fn area(path: &Path) -> f64 {
    let n = path.len();
    if n < 3 {
        return 0.0;
    }
    let mut a: i128 = 0;
    let mut j = n - 1;
    for i in 0..n {
        a += (path[j].x as i128 + path[i].x as i128) * (path[j].y as i128 - path[i].y as i128);
        j = i;
    }
    -(a as f64) * 0.5
}

pub fn orientation(path: &Path) -> bool {
    area(path) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccw_square_has_positive_area() {
        let square = vec![
            IntPoint::new(0, 0),
            IntPoint::new(0, 10),
            IntPoint::new(10, 10),
            IntPoint::new(10, 0),
        ];
        assert!(area(&square) > 0.0);
        assert!(orientation(&square));
    }
}
