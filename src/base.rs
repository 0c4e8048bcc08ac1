//! Edge construction and local-minima list (spec C2), the shared ancestor
//! of the clipping engine's input handling (`ClipperBase` in the source).

use tracing::debug;

use crate::arena::Arena;
use crate::edge::{EdgeIdx, TEdge};
use crate::error::{ClipperError, ClipperResult};
use crate::point::{slopes_equal3, IntPoint, RangeMode};
use crate::{EdgeSide, PolyType};

/// `(Y, leftBound, rightBound)`: a vertex where both adjacent edges ascend
/// away from it, and the two monotone-Y chains ("bounds") departing from
/// it. Y is the bound's bottom (the engine's Y axis runs bottom-to-top as
/// the sweep *decreases* Y, matching the source's screen-coordinate
/// convention where `Bot.Y >= Top.Y`).
#[derive(Debug, Clone, Copy)]
pub struct LocalMinimum {
    pub y: i64,
    pub left_bound: EdgeIdx,
    pub right_bound: EdgeIdx,
}

fn same_xy(a: IntPoint, b: IntPoint) -> bool {
    a.x == b.x && a.y == b.y
}

/// Removes zero-length segments and (unless `preserve_collinear`) reduces
/// runs of three collinear points to two (spec §4.1).
fn clean_points(path: &[IntPoint], closed: bool, preserve_collinear: bool) -> Vec<IntPoint> {
    let mut pts: Vec<IntPoint> = Vec::with_capacity(path.len());
    for &p in path {
        if pts.last().map_or(true, |&last| !same_xy(last, p)) {
            pts.push(p);
        }
    }
    if closed && pts.len() > 1 && same_xy(pts[0], *pts.last().unwrap()) {
        pts.pop();
    }
    if preserve_collinear || pts.len() < 3 {
        return pts;
    }

    // Drop interior vertices that lie exactly on the line through their
    // neighbors. Closed paths wrap; open paths keep their two endpoints.
    let mut changed = true;
    while changed && pts.len() >= 3 {
        changed = false;
        let n = pts.len();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            if !closed && (i == 0 || i == n - 1) {
                out.push(pts[i]);
                continue;
            }
            let prev = pts[(i + n - 1) % n];
            let next = pts[(i + 1) % n];
            if slopes_equal3(prev, pts[i], next) {
                changed = true;
                continue;
            }
            out.push(pts[i]);
        }
        pts = out;
    }
    pts
}

/// Holds the arena-allocated edge pool and local-minima list built from
/// every path added for one `execute` call (spec C2).
pub struct ClipperBase {
    pub edges: Arena<TEdge>,
    pub minima: Vec<LocalMinimum>,
    pub range_mode: RangeMode,
    pub preserve_collinear: bool,
    pub has_open_paths: bool,
    pub open_path_count: usize,
}

impl ClipperBase {
    pub fn new(range_mode: RangeMode) -> Self {
        ClipperBase {
            edges: Arena::new(),
            minima: Vec::new(),
            range_mode,
            preserve_collinear: false,
            has_open_paths: false,
            open_path_count: 0,
        }
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.minima.clear();
        self.has_open_paths = false;
        self.open_path_count = 0;
    }

    /// Adds one path. Open paths are recorded only for bookkeeping: per
    /// spec §9 ("`use_lines` ... treat as disabled"), the boolean engine
    /// never builds edges for them; `Clipper::execute` surfaces an
    /// `ClipperError::Input` if any are present as Subject. `ClipperOffset`
    /// (spec C11) handles open paths through its own, separate geometry.
    pub fn add_path(&mut self, path: &[IntPoint], poly_type: PolyType, closed: bool) -> ClipperResult<bool> {
        if !closed && poly_type == PolyType::Clip {
            return Err(ClipperError::Input(
                "open paths cannot be added as a Clip polygon".into(),
            ));
        }
        for &p in path {
            self.range_mode.check(p.x, p.y)?;
        }

        if !closed {
            let pts = clean_points(path, false, self.preserve_collinear);
            if pts.len() < 2 {
                return Ok(false);
            }
            self.has_open_paths = true;
            self.open_path_count += 1;
            return Ok(true);
        }

        let pts = clean_points(path, true, self.preserve_collinear);
        let n = pts.len();
        if n < 3 {
            return Ok(false);
        }

        debug!(vertices = n, ?poly_type, "adding closed path");

        // One TEdge per segment pts[i] -> pts[(i+1) % n], bot = the
        // numerically larger-Y endpoint (the source's Y-down convention:
        // the sweep's "bottom" is the largest Y, advancing toward smaller
        // Y as edges are traversed toward their top).
        let mut edge_ids: Vec<EdgeIdx> = Vec::with_capacity(n);
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            let (bot, top) = if a.y >= b.y { (a, b) } else { (b, a) };
            let dx = if bot.y == top.y { crate::consts::HORIZONTAL_DX } else { (top.x - bot.x) as f64 / (top.y - bot.y) as f64 };
            let idx = self.edges.alloc(TEdge {
                bot,
                current: bot,
                top,
                dx,
                poly_typ: poly_type,
                side: EdgeSide::Left,
                winding_delta: 0,
                winding_count: 0,
                winding_count_2: 0,
                out_idx: crate::consts::UNASSIGNED,
                next: None,
                prev: None,
                next_in_lml: None,
                next_in_ael: None,
                prev_in_ael: None,
                next_in_sel: None,
                prev_in_sel: None,
            });
            edge_ids.push(idx);
        }
        for i in 0..n {
            self.edges[edge_ids[i]].next = Some(edge_ids[(i + 1) % n]);
            self.edges[edge_ids[i]].prev = Some(edge_ids[(i + n - 1) % n]);
        }

        // Each segment got its winding_delta fixed once here, independent
        // of which bound (left/right) it ends up in: the edge continuing
        // the original polygon's forward order is always +1, the edge
        // arriving backward is always -1 (see DESIGN.md for the derivation
        // from the source's `leftBound->Next == rightBound` check).
        for i in 0..n {
            self.edges[edge_ids[i]].winding_delta = 1;
        }

        let mut edge_used = vec![false; n];
        for v in 0..n {
            let y_here = pts[v].y;
            let prev_y = pts[(v + n - 1) % n].y;
            let next_y = pts[(v + 1) % n].y;
            let is_local_min = y_here >= prev_y && y_here >= next_y;
            if !is_local_min {
                continue;
            }
            let fwd_local = v; // segment v -> v+1
            let bwd_local = (v + n - 1) % n; // segment v-1 -> v
            if edge_used[fwd_local] || edge_used[bwd_local] {
                continue; // already absorbed by a flat-bottom neighbor's bound
            }

            let fwd_edge = edge_ids[fwd_local];
            let bwd_edge = edge_ids[bwd_local];
            // bwd edge arrives at v "backward" relative to polygon order.
            self.edges[bwd_edge].winding_delta = -1;

            let (left_local, left_edge, left_step, right_local, right_edge, right_step) =
                if self.edges[fwd_edge].dx < self.edges[bwd_edge].dx {
                    (fwd_local, fwd_edge, 1i64, bwd_local, bwd_edge, -1i64)
                } else {
                    (bwd_local, bwd_edge, -1i64, fwd_local, fwd_edge, 1i64)
                };

            let left_chain = self.walk_bound(&edge_ids, &pts, left_local, left_step, &mut edge_used, EdgeSide::Left);
            let right_chain = self.walk_bound(&edge_ids, &pts, right_local, right_step, &mut edge_used, EdgeSide::Right);
            let _ = (left_edge, right_edge);

            self.minima.push(LocalMinimum {
                y: y_here,
                left_bound: left_chain[0],
                right_bound: right_chain[0],
            });
        }

        // Descending by Y so draining from the back visits ascending Y,
        // matching the source's iteration order (see `crate::clipper`).
        self.minima.sort_by(|a, b| b.y.cmp(&a.y));

        Ok(true)
    }

    pub fn add_paths(&mut self, paths: &[Vec<IntPoint>], poly_type: PolyType, closed: bool) -> ClipperResult<bool> {
        let mut any = false;
        for p in paths {
            if self.add_path(p, poly_type, closed)? {
                any = true;
            }
        }
        Ok(any)
    }

    /// Walks from `start_local` in direction `step` (+1/-1 vertex index
    /// steps) while Y is non-increasing, marking each edge's `side` and
    /// linking `next_in_lml` along the way; returns the chain in
    /// bottom-to-top order.
    fn walk_bound(
        &mut self,
        edge_ids: &[EdgeIdx],
        pts: &[IntPoint],
        start_local: usize,
        step: i64,
        used: &mut [bool],
        side: EdgeSide,
    ) -> Vec<EdgeIdx> {
        let n = pts.len() as i64;
        let mut chain = Vec::new();
        let mut cur = start_local as i64;
        loop {
            let local = cur.rem_euclid(n) as usize;
            if used[local] {
                break;
            }
            used[local] = true;
            let eid = edge_ids[local];
            self.edges[eid].side = side;
            chain.push(eid);

            let (this_vertex, next_vertex) = if step > 0 {
                (local, (local + 1) % n as usize)
            } else {
                (local, (local + n as usize - 1) % n as usize)
            };
            let _ = this_vertex;
            let after = (cur + 2 * step).rem_euclid(n) as usize; // vertex after `next_vertex` in walk direction
            let keep_going = pts[next_vertex].y <= pts[local].y && pts[after].y <= pts[next_vertex].y;
            if !keep_going {
                break;
            }
            cur += step;
        }
        for w in chain.windows(2) {
            self.edges[w[0]].next_in_lml = Some(w[1]);
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PolyType;

    fn square(x0: i64, y0: i64, s: i64) -> Vec<IntPoint> {
        vec![
            IntPoint::new(x0, y0),
            IntPoint::new(x0 + s, y0),
            IntPoint::new(x0 + s, y0 + s),
            IntPoint::new(x0, y0 + s),
        ]
    }

    #[test]
    fn add_path_builds_one_local_minimum_for_a_square() {
        let mut base = ClipperBase::new(RangeMode::Full);
        assert!(base.add_path(&square(0, 0, 10), PolyType::Subject, true).unwrap());
        assert_eq!(base.edges.len(), 4);
        assert_eq!(base.minima.len(), 1);
    }

    #[test]
    fn degenerate_path_is_silently_dropped() {
        let mut base = ClipperBase::new(RangeMode::Full);
        let pts = vec![IntPoint::new(0, 0), IntPoint::new(0, 0), IntPoint::new(1, 1)];
        assert_eq!(base.add_path(&pts, PolyType::Subject, true).unwrap(), false);
    }

    #[test]
    fn open_path_as_clip_is_rejected() {
        let mut base = ClipperBase::new(RangeMode::Full);
        let pts = vec![IntPoint::new(0, 0), IntPoint::new(1, 1)];
        assert!(base.add_path(&pts, PolyType::Clip, false).is_err());
    }

    #[test]
    fn out_of_range_coordinate_is_rejected() {
        let mut base = ClipperBase::new(RangeMode::Small);
        let pts = square(0, 0, 100_000);
        assert!(base.add_path(&pts, PolyType::Subject, true).is_err());
    }
}
