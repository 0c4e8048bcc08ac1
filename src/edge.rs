//! `TEdge`: one record per input segment (spec C1/C2).

use crate::arena::Idx;
use crate::point::IntPoint;
use crate::{EdgeSide, PolyType};

pub type EdgeIdx = Idx<TEdge>;

/// One edge of an input path, doubly-linked into its original polygon and
/// (while active) into the AEL/SEL scratch lists.
///
/// `out_idx` holds the owning `OutRec`'s arena slot, or [`crate::consts::UNASSIGNED`]
/// when the edge is not currently contributing.
#[derive(Debug, Clone)]
pub struct TEdge {
    /// The endpoint with the numerically larger Y (the source's Y-down
    /// convention: this is where the edge is born, at the bottom of a beam).
    pub bot: IntPoint,
    /// Current X/Y on the active scanline.
    pub current: IntPoint,
    /// The endpoint with the numerically smaller Y.
    pub top: IntPoint,
    /// `dX/dY`, stored as a ratio rather than an angle so advancing `current`
    /// needs no division.
    pub dx: f64,
    pub poly_typ: PolyType,
    /// Which side of its output ring this edge is building.
    pub side: EdgeSide,
    /// `+1` for a left bound, `-1` for a right bound (direction of descent
    /// relative to the original polygon winding).
    pub winding_delta: i8,
    pub winding_count: isize,
    /// Winding count in the *other* polytype, used to decide contribution.
    pub winding_count_2: isize,
    pub out_idx: isize,

    pub next: Option<EdgeIdx>,
    pub prev: Option<EdgeIdx>,
    /// Next edge up the same bound (local-minima chain), consumed as the
    /// sweep advances past each edge's top.
    pub next_in_lml: Option<EdgeIdx>,
    pub next_in_ael: Option<EdgeIdx>,
    pub prev_in_ael: Option<EdgeIdx>,
    pub next_in_sel: Option<EdgeIdx>,
    pub prev_in_sel: Option<EdgeIdx>,
}

impl TEdge {
    pub fn is_horizontal(&self) -> bool {
        self.dx == crate::consts::HORIZONTAL_DX
    }

    pub fn is_contributing(&self) -> bool {
        self.out_idx != crate::consts::UNASSIGNED
    }
}

#[inline]
pub fn slopes_equal_edges(e1: &TEdge, e2: &TEdge) -> bool {
    crate::point::slopes_equal4(e1.top, e1.bot, e2.top, e2.bot)
}
