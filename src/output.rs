//! Output chain assembly (spec C7): `OutPt` rings and `OutRec` bookkeeping.

use crate::arena::{Arena, Idx};
use crate::point::{IntPoint, OutCoord};

pub type OutPtIdx = Idx<OutPt>;
pub type OutRecIdx = Idx<OutRec>;

/// One vertex of an output contour; rings are circular doubly-linked lists
/// through `next`/`prev`. `out_rec` must always equal the arena slot of the
/// `OutRec` this point belongs to (spec C1 invariant).
#[derive(Debug, Clone)]
pub struct OutPt {
    pub out_rec: OutRecIdx,
    pub pt: OutCoord,
    pub next: OutPtIdx,
    pub prev: OutPtIdx,
}

/// One candidate output polygon. `pts` is `None` until the first vertex is
/// emitted and is cleared again if the ring is fully absorbed by another
/// (`AppendPolygon`); `redirect` then points at the surviving record, the
/// union-find-without-path-compression scheme spec's Design Notes call for.
#[derive(Debug, Clone)]
pub struct OutRec {
    pub is_hole: bool,
    pub is_open: bool,
    pub first_left: Option<OutRecIdx>,
    pub pts: Option<OutPtIdx>,
    pub bottom_pt: Option<OutPtIdx>,
    /// Set once this OutRec has been merged into another by `append_polygon`.
    pub redirect: Option<OutRecIdx>,
}

impl OutRec {
    pub fn new() -> Self {
        OutRec {
            is_hole: false,
            is_open: false,
            first_left: None,
            pts: None,
            bottom_pt: None,
            redirect: None,
        }
    }
}

impl Default for OutRec {
    fn default() -> Self {
        Self::new()
    }
}

/// Follows `redirect` links to the surviving `OutRec`, as
/// `fixupFirstLefts`/`GetOutRec` do in the original.
pub fn resolve(recs: &Arena<OutRec>, mut idx: OutRecIdx) -> OutRecIdx {
    while let Some(next) = recs[idx].redirect {
        idx = next;
    }
    idx
}

/// A contact point between two output chains, recorded during the sweep and
/// resolved after it (spec C1 `Join`). `off_pt` is the reference X-position
/// at which the two points were observed to coincide.
#[derive(Debug, Clone, Copy)]
pub struct Join {
    pub out_pt1: OutPtIdx,
    pub out_pt2: OutPtIdx,
    pub off_pt: IntPoint,
}

/// Appends `pt` just before `head` (i.e. at the tail of the ring), used by
/// `EdgeSide::Right` contributions. The ring's head index is unchanged.
pub fn append_at_tail(pts: &mut Arena<OutPt>, head: OutPtIdx, pt: OutCoord, out_rec: OutRecIdx) -> OutPtIdx {
    let tail = pts[head].prev;
    let new_idx = pts.alloc(OutPt { out_rec, pt, next: head, prev: tail });
    pts[tail].next = new_idx;
    pts[head].prev = new_idx;
    new_idx
}

/// Prepends `pt` before `head`, making it the new ring head, used by
/// `EdgeSide::Left` contributions. Returns the new head index.
pub fn prepend_at_head(pts: &mut Arena<OutPt>, head: OutPtIdx, pt: OutCoord, out_rec: OutRecIdx) -> OutPtIdx {
    append_at_tail(pts, head, pt, out_rec)
}

/// Allocates a brand new one-element ring and returns its index.
pub fn new_ring(pts: &mut Arena<OutPt>, pt: OutCoord, out_rec: OutRecIdx) -> OutPtIdx {
    // `next`/`prev` are self-referential for a single-point ring; allocate
    // with a throwaway index and fix it up immediately after.
    let idx = pts.alloc(OutPt { out_rec, pt, next: Idx::new(0), prev: Idx::new(0) });
    pts[idx].next = idx;
    pts[idx].prev = idx;
    idx
}

pub fn ring_len(pts: &Arena<OutPt>, head: OutPtIdx) -> usize {
    let mut count = 1;
    let mut cur = pts[head].next;
    while cur != head {
        count += 1;
        cur = pts[cur].next;
    }
    count
}

/// Signed area of the ring, via the shoelace formula (spec C1 `OutPt::area`).
pub fn area(pts: &Arena<OutPt>, head: OutPtIdx) -> f64 {
    let mut a: i128 = 0;
    let mut cur = head;
    loop {
        let p = pts[cur].pt;
        let prev = pts[cur].prev;
        let pp = pts[prev].pt;
        a += (pp.x as i128 + p.x as i128) * (pp.y as i128 - p.y as i128);
        cur = pts[cur].next;
        if cur == head {
            break;
        }
    }
    a as f64 * 0.5
}

pub fn orientation(pts: &Arena<OutPt>, head: OutPtIdx) -> bool {
    area(pts, head) >= 0.0
}

/// Reverses ring traversal direction in place: swaps `next`/`prev` on every
/// point and swaps each point's attribute slots (spec §4.7: reading a
/// reversed ring uses `reverseZ` rather than `correctZ`).
pub fn reverse_ring(pts: &mut Arena<OutPt>, head: OutPtIdx) {
    let mut cur = head;
    loop {
        let node = &mut pts[cur];
        std::mem::swap(&mut node.next, &mut node.prev);
        node.pt.reverse();
        cur = pts[cur].prev; // prev is now the old "next"
        if cur == head {
            break;
        }
    }
}

/// Flattens a ring into an `IntPoint` sequence. `reversed` selects which
/// `OutCoord` attribute slot is authoritative for every vertex.
pub fn to_path(pts: &Arena<OutPt>, head: OutPtIdx, reversed: bool) -> Vec<IntPoint> {
    let mut out = Vec::with_capacity(ring_len(pts, head));
    let mut cur = head;
    loop {
        out.push(pts[cur].pt.to_point(reversed));
        cur = pts[cur].next;
        if cur == head {
            break;
        }
    }
    out
}
