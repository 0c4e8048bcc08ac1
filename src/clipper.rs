//! The Vatti sweep engine: Active Edge List management (C4), the
//! intersection finder (C5), winding/contribution policy (C6), the
//! horizontal-edge processor (C8), the join pass (C9), and attribute
//! callback dispatch (C10), tied together by `Clipper::execute`.

use tracing::{debug, trace, warn};

use crate::arena::{Arena, Idx};
use crate::base::ClipperBase;
use crate::callback::{NoOpZFill, ZFill};
use crate::edge::EdgeIdx;
use crate::error::{ClipperError, ClipperResult};
use crate::output::{self, Join, OutPt, OutPtIdx, OutRec, OutRecIdx};
use crate::point::{CInt, IntPoint, OutCoord, RangeMode};
use crate::scanbeam::Scanbeam;
use crate::{ClipType, EdgeSide, PolyFillType, PolyType};

/// X of an edge at a given Y, via its stored slope.
fn x_at(bot: IntPoint, dx: f64, y: CInt) -> CInt {
    if y == bot.y {
        bot.x
    } else {
        bot.x + (dx * (y - bot.y) as f64).round() as CInt
    }
}

fn fill_is_boundary(fill: PolyFillType, wind: isize) -> bool {
    match fill {
        PolyFillType::EvenOdd => wind & 1 == 1,
        PolyFillType::NonZero => wind.abs() == 1,
        PolyFillType::Positive => wind == 1,
        PolyFillType::Negative => wind == -1,
    }
}

fn fill_is_inside(fill: PolyFillType, wind: isize) -> bool {
    match fill {
        PolyFillType::EvenOdd | PolyFillType::NonZero => wind != 0,
        PolyFillType::Positive => wind > 0,
        PolyFillType::Negative => wind < 0,
    }
}

/// A horizontal contribution recorded before its partner ring exists (spec
/// §4.5 ghost joins): only one endpoint is known yet, so this carries a
/// geometric position rather than a second `OutPtIdx`. Resolved against the
/// full set of rings once the sweep finishes.
#[derive(Debug, Clone, Copy)]
struct PendingJoin {
    out_pt: OutPtIdx,
    at: IntPoint,
}

/// The boolean-clipping engine. One instance may run several `execute` calls
/// against the same accumulated paths; `execute` itself is not reentrant
/// (spec §5).
pub struct Clipper {
    base: ClipperBase,
    ael: Option<EdgeIdx>,
    out_pts: Arena<OutPt>,
    out_recs: Arena<OutRec>,
    scanbeam: Scanbeam,
    joins: Vec<Join>,
    ghost_joins: Vec<PendingJoin>,
    current_lm: usize,
    clip_type: ClipType,
    subj_fill: PolyFillType,
    clip_fill: PolyFillType,
    pub reverse_solution: bool,
    pub strictly_simple: bool,
    executing: bool,
    zfill: Box<dyn ZFill>,
}

impl Clipper {
    pub fn new(range_mode: RangeMode) -> Self {
        Clipper {
            base: ClipperBase::new(range_mode),
            ael: None,
            out_pts: Arena::new(),
            out_recs: Arena::new(),
            scanbeam: Scanbeam::new(),
            joins: Vec::new(),
            ghost_joins: Vec::new(),
            current_lm: 0,
            clip_type: ClipType::Intersection,
            subj_fill: PolyFillType::EvenOdd,
            clip_fill: PolyFillType::EvenOdd,
            reverse_solution: false,
            strictly_simple: false,
            executing: false,
            zfill: Box::new(NoOpZFill),
        }
    }

    pub fn set_preserve_collinear(&mut self, v: bool) {
        self.base.preserve_collinear = v;
    }

    pub fn set_zfill(&mut self, cb: impl ZFill + 'static) {
        self.zfill = Box::new(cb);
    }

    pub fn add_path(&mut self, path: &[IntPoint], poly_type: PolyType, closed: bool) -> ClipperResult<bool> {
        self.base.add_path(path, poly_type, closed)
    }

    pub fn add_paths(&mut self, paths: &[Vec<IntPoint>], poly_type: PolyType, closed: bool) -> ClipperResult<bool> {
        self.base.add_paths(paths, poly_type, closed)
    }

    pub fn clear(&mut self) {
        self.base.clear();
    }

    /// Runs the sweep and returns the result flattened to `Paths`.
    pub fn execute(
        &mut self,
        clip_type: ClipType,
        subj_fill: PolyFillType,
        clip_fill: PolyFillType,
    ) -> ClipperResult<crate::Paths> {
        self.run(clip_type, subj_fill, clip_fill)?;
        Ok(self.build_paths())
    }

    /// Runs the sweep and returns the result as a hierarchical `PolyTree`.
    pub fn execute_tree(
        &mut self,
        clip_type: ClipType,
        subj_fill: PolyFillType,
        clip_fill: PolyFillType,
    ) -> ClipperResult<crate::PolyTree> {
        self.run(clip_type, subj_fill, clip_fill)?;
        Ok(self.build_tree())
    }

    fn run(&mut self, clip_type: ClipType, subj_fill: PolyFillType, clip_fill: PolyFillType) -> ClipperResult<()> {
        if self.executing {
            return Err(ClipperError::ConcurrentUse);
        }
        if self.base.has_open_paths {
            return Err(ClipperError::Input(
                "open subject paths require line-clipping support, which is disabled".into(),
            ));
        }
        self.executing = true;
        let result = self.sweep(clip_type, subj_fill, clip_fill);
        self.executing = false;
        result
    }

    fn reset(&mut self) {
        self.ael = None;
        self.out_pts.clear();
        self.out_recs.clear();
        self.joins.clear();
        self.ghost_joins.clear();
        self.current_lm = 0;
        self.scanbeam.clear();
        for lm in &self.base.minima {
            self.scanbeam.insert(lm.y);
        }
        for e in self.base.edges.iter_mut() {
            e.current = e.bot;
            e.out_idx = crate::consts::UNASSIGNED;
            e.winding_count = 0;
            e.winding_count_2 = 0;
            e.next_in_ael = None;
            e.prev_in_ael = None;
            e.next_in_sel = None;
            e.prev_in_sel = None;
        }
    }

    fn sweep(&mut self, clip_type: ClipType, subj_fill: PolyFillType, clip_fill: PolyFillType) -> ClipperResult<()> {
        self.clip_type = clip_type;
        self.subj_fill = subj_fill;
        self.clip_fill = clip_fill;
        self.reset();

        debug!(?clip_type, minima = self.base.minima.len(), "starting sweep");

        let mut bot_y = match self.scanbeam.pop() {
            Some(y) => y,
            None => return Ok(()),
        };
        loop {
            self.insert_local_minima_into_ael(bot_y);
            self.process_horizontals(bot_y);
            let top_y = match self.scanbeam.pop() {
                Some(y) => y,
                None => break,
            };
            self.process_intersections(top_y)?;
            self.process_edges_at_top_of_scanbeam(top_y);
            bot_y = top_y;
        }

        self.join_common_edges();
        if self.strictly_simple {
            self.do_simple_polygons();
        }
        Ok(())
    }

    // ---- AEL -----------------------------------------------------------

    fn insert_edge_into_ael(&mut self, e: EdgeIdx, after: Option<EdgeIdx>) {
        if let Some(after) = after {
            let next = self.base.edges[after].next_in_ael;
            self.base.edges[e].prev_in_ael = Some(after);
            self.base.edges[e].next_in_ael = next;
            self.base.edges[after].next_in_ael = Some(e);
            if let Some(n) = next {
                self.base.edges[n].prev_in_ael = Some(e);
            }
            return;
        }
        let x = self.base.edges[e].current.x;
        let mut cur = self.ael;
        let mut prev: Option<EdgeIdx> = None;
        while let Some(c) = cur {
            if self.base.edges[c].current.x >= x {
                break;
            }
            prev = Some(c);
            cur = self.base.edges[c].next_in_ael;
        }
        self.base.edges[e].prev_in_ael = prev;
        self.base.edges[e].next_in_ael = cur;
        match prev {
            Some(p) => self.base.edges[p].next_in_ael = Some(e),
            None => self.ael = Some(e),
        }
        if let Some(c) = cur {
            self.base.edges[c].prev_in_ael = Some(e);
        }
    }

    fn delete_from_ael(&mut self, e: EdgeIdx) {
        let prev = self.base.edges[e].prev_in_ael;
        let next = self.base.edges[e].next_in_ael;
        match prev {
            Some(p) => self.base.edges[p].next_in_ael = next,
            None => self.ael = next,
        }
        if let Some(n) = next {
            self.base.edges[n].prev_in_ael = prev;
        }
        self.base.edges[e].prev_in_ael = None;
        self.base.edges[e].next_in_ael = None;
    }

    /// Swaps two AEL-adjacent edges (the only shape the bubble-sort
    /// intersection pass and the horizontal processor ever ask for).
    fn swap_positions_in_ael(&mut self, e1: EdgeIdx, e2: EdgeIdx) {
        let (a, b) = if self.base.edges[e1].next_in_ael == Some(e2) {
            (e1, e2)
        } else {
            (e2, e1)
        };
        let before = self.base.edges[a].prev_in_ael;
        let after = self.base.edges[b].next_in_ael;
        self.base.edges[b].prev_in_ael = before;
        self.base.edges[b].next_in_ael = Some(a);
        self.base.edges[a].prev_in_ael = Some(b);
        self.base.edges[a].next_in_ael = after;
        match before {
            Some(p) => self.base.edges[p].next_in_ael = Some(b),
            None => self.ael = Some(b),
        }
        if let Some(n) = after {
            self.base.edges[n].prev_in_ael = Some(a);
        }
    }

    fn update_edge_into_ael(&mut self, old: EdgeIdx) -> Option<EdgeIdx> {
        let next_edge = self.base.edges[old].next_in_lml?;
        let prev = self.base.edges[old].prev_in_ael;
        let next = self.base.edges[old].next_in_ael;
        self.base.edges[next_edge].prev_in_ael = prev;
        self.base.edges[next_edge].next_in_ael = next;
        self.base.edges[next_edge].side = self.base.edges[old].side;
        self.base.edges[next_edge].winding_delta = self.base.edges[old].winding_delta;
        self.base.edges[next_edge].winding_count = self.base.edges[old].winding_count;
        self.base.edges[next_edge].winding_count_2 = self.base.edges[old].winding_count_2;
        self.base.edges[next_edge].out_idx = self.base.edges[old].out_idx;
        self.base.edges[next_edge].current = self.base.edges[next_edge].bot;
        match prev {
            Some(p) => self.base.edges[p].next_in_ael = Some(next_edge),
            None => self.ael = Some(next_edge),
        }
        if let Some(n) = next {
            self.base.edges[n].prev_in_ael = Some(next_edge);
        }
        self.base.edges[old].next_in_ael = None;
        self.base.edges[old].prev_in_ael = None;
        self.scanbeam.insert(self.base.edges[next_edge].top.y);
        Some(next_edge)
    }

    // ---- winding & contribution -----------------------------------------

    /// Computes `winding_count`/`winding_count_2` for a newly-inserted edge
    /// by rescanning the AEL from the head. O(n) per insertion rather than
    /// the source's incremental anchor walk; simpler to get right without a
    /// compiler available to catch index mistakes, and adequate for the
    /// input sizes this engine targets (see DESIGN.md).
    fn set_winding_counts(&mut self, e: EdgeIdx) {
        let my_type = self.base.edges[e].poly_typ;
        let (my_fill, other_fill) = if my_type == PolyType::Subject {
            (self.subj_fill, self.clip_fill)
        } else {
            (self.clip_fill, self.subj_fill)
        };

        let mut cur = self.base.edges[e].prev_in_ael;
        while let Some(idx) = cur {
            if self.base.edges[idx].poly_typ == my_type {
                break;
            }
            cur = self.base.edges[idx].prev_in_ael;
        }
        let delta = self.base.edges[e].winding_delta as isize;
        let new_count = match cur {
            None => delta,
            Some(idx) => {
                let prev_count = self.base.edges[idx].winding_count;
                match my_fill {
                    PolyFillType::EvenOdd => {
                        if prev_count == 0 {
                            1
                        } else {
                            0
                        }
                    }
                    _ => prev_count + delta,
                }
            }
        };
        self.base.edges[e].winding_count = new_count;

        let mut acc: isize = 0;
        let mut walk = self.ael;
        while let Some(idx) = walk {
            if idx == e {
                break;
            }
            if self.base.edges[idx].poly_typ != my_type {
                match other_fill {
                    PolyFillType::EvenOdd => acc = if acc == 0 { 1 } else { 0 },
                    _ => acc += self.base.edges[idx].winding_delta as isize,
                }
            }
            walk = self.base.edges[idx].next_in_ael;
        }
        self.base.edges[e].winding_count_2 = acc;
    }

    /// Spec §4.6's contribution table; for `Difference` the table is
    /// asymmetric in which side's wind is "own" vs. "other" (a Subject edge
    /// contributes outside the Clip, a Clip edge contributes inside the
    /// Subject) — resolved against `clipper.hpp`'s declared `IsContributing`
    /// shape, since the spec's prose elides which wind count the Clip side
    /// reads (see DESIGN.md; `original_source/` carries no `.cpp` body to
    /// check this against directly).
    fn is_contributing(&self, e: EdgeIdx) -> bool {
        let ed = &self.base.edges[e];
        let my_fill = if ed.poly_typ == PolyType::Subject { self.subj_fill } else { self.clip_fill };
        let other_fill = if ed.poly_typ == PolyType::Subject { self.clip_fill } else { self.subj_fill };
        if !fill_is_boundary(my_fill, ed.winding_count) {
            return false;
        }
        let other_inside = fill_is_inside(other_fill, ed.winding_count_2);
        match self.clip_type {
            ClipType::Intersection => other_inside,
            ClipType::Union => !other_inside,
            ClipType::Difference => {
                if ed.poly_typ == PolyType::Subject {
                    !other_inside
                } else {
                    other_inside
                }
            }
            ClipType::Xor => true,
        }
    }

    // ---- output assembly -------------------------------------------------

    /// Builds an `OutCoord` with both attribute slots populated: `correct_z`
    /// from `pt.z` directly, `reverse_z` seeded via `initialize_reverse`
    /// against `next` (the edge's forward-direction neighbor). Replaces the
    /// naive `OutCoord::from_point`, which always hardwired `reverse_z` to 0.
    fn coord_with_reverse(&mut self, pt: IntPoint, next: IntPoint) -> OutCoord {
        let mut rev = pt;
        self.zfill.initialize_reverse(&mut rev, &next);
        OutCoord::new(pt.x, pt.y, pt.z, rev.z)
    }

    fn add_local_min_poly(&mut self, e1: EdgeIdx, e2: EdgeIdx, pt: IntPoint) {
        let rec = self.out_recs.alloc(OutRec::new());
        let next = self.base.edges[e1].top;
        let coord = self.coord_with_reverse(pt, next);
        let head = output::new_ring(&mut self.out_pts, coord, rec);
        self.out_recs[rec].pts = Some(head);
        self.out_recs[rec].bottom_pt = Some(head);
        self.base.edges[e1].out_idx = rec.index() as isize;
        self.base.edges[e2].out_idx = rec.index() as isize;
        trace!(?pt, "local min poly started");
    }

    /// Appends `pt` to `e`'s ring. If `pt` coincides with the point already
    /// at the insertion point, the two are combined via `on_append_overlapping`
    /// instead of creating a duplicate vertex (mirrors the coincidence check
    /// in the original `AddOutPt`).
    fn add_out_pt(&mut self, e: EdgeIdx, pt: IntPoint) -> OutPtIdx {
        let rec_idx = output::resolve(&self.out_recs, Idx::new(self.base.edges[e].out_idx as usize));
        let head = self.out_recs[rec_idx].pts.unwrap();
        let side = self.base.edges[e].side;
        let adjacent = match side {
            EdgeSide::Left => head,
            EdgeSide::Right => self.out_pts[head].prev,
        };
        let existing = self.out_pts[adjacent].pt;
        if existing.x == pt.x && existing.y == pt.y {
            let prev_pt = self.out_pts[self.out_pts[adjacent].prev].pt.to_point(false);
            let mut to = existing.to_point(false);
            self.zfill.on_append_overlapping(&prev_pt, &mut to);
            self.out_pts[adjacent].pt.correct_z = to.z;
            self.base.edges[e].out_idx = rec_idx.index() as isize;
            return adjacent;
        }
        let next = self.base.edges[e].top;
        let coord = self.coord_with_reverse(pt, next);
        let new_idx = match side {
            EdgeSide::Left => {
                let n = output::prepend_at_head(&mut self.out_pts, head, coord, rec_idx);
                self.out_recs[rec_idx].pts = Some(n);
                n
            }
            EdgeSide::Right => output::append_at_tail(&mut self.out_pts, head, coord, rec_idx),
        };
        self.base.edges[e].out_idx = rec_idx.index() as isize;
        new_idx
    }

    /// Splits the edge `after -> after.next` by inserting a new point,
    /// returning its index. Used by the join pass to materialize a shared
    /// vertex where one ring's horizontal run only partially overlaps
    /// another's.
    fn insert_after(&mut self, after: OutPtIdx, coord: OutCoord) -> OutPtIdx {
        let rec = self.out_pts[after].out_rec;
        let next = self.out_pts[after].next;
        let new_idx = self.out_pts.alloc(OutPt { out_rec: rec, pt: coord, next, prev: after });
        self.out_pts[after].next = new_idx;
        self.out_pts[next].prev = new_idx;
        new_idx
    }

    fn append_polygon(&mut self, e1: EdgeIdx, e2: EdgeIdx) {
        let rec1 = output::resolve(&self.out_recs, Idx::new(self.base.edges[e1].out_idx as usize));
        let rec2 = output::resolve(&self.out_recs, Idx::new(self.base.edges[e2].out_idx as usize));
        if rec1 == rec2 {
            return;
        }
        let (keep, lose) = (rec1, rec2);
        let head1 = self.out_recs[keep].pts.unwrap();
        let head2 = self.out_recs[lose].pts.unwrap();
        let tail1 = self.out_pts[head1].prev;
        let tail2 = self.out_pts[head2].prev;
        self.out_pts[tail1].next = head2;
        self.out_pts[head2].prev = tail1;
        self.out_pts[tail2].next = head1;
        self.out_pts[head1].prev = tail2;

        let mut cur = head2;
        loop {
            self.out_pts[cur].out_rec = keep;
            cur = self.out_pts[cur].next;
            if cur == head2 {
                break;
            }
        }
        self.out_recs[lose].pts = None;
        self.out_recs[lose].redirect = Some(keep);

        for edge in self.base.edges.iter_mut() {
            if edge.out_idx == lose.index() as isize {
                edge.out_idx = keep.index() as isize;
            }
        }
        if let Some(fl) = self.out_recs[lose].first_left {
            if self.out_recs[keep].first_left.is_none() {
                self.out_recs[keep].first_left = Some(fl);
            }
        }
        for i in 0..self.out_recs.len() {
            let idx = Idx::new(i);
            if self.out_recs[idx].first_left == Some(lose) {
                self.out_recs[idx].first_left = Some(keep);
            }
        }
    }

    fn add_local_max_poly(&mut self, e1: EdgeIdx, e2: EdgeIdx, pt: IntPoint) {
        self.add_out_pt(e1, pt);
        if self.base.edges[e1].out_idx == self.base.edges[e2].out_idx {
            self.base.edges[e1].out_idx = crate::consts::UNASSIGNED;
            self.base.edges[e2].out_idx = crate::consts::UNASSIGNED;
        } else {
            self.append_polygon(e1, e2);
            self.base.edges[e1].out_idx = crate::consts::UNASSIGNED;
            self.base.edges[e2].out_idx = crate::consts::UNASSIGNED;
        }
    }

    // ---- sweep phases -----------------------------------------------------

    fn insert_local_minima_into_ael(&mut self, bot_y: CInt) {
        while self.current_lm < self.base.minima.len() && self.base.minima[self.current_lm].y == bot_y {
            let lm = self.base.minima[self.current_lm];
            self.current_lm += 1;

            self.insert_edge_into_ael(lm.left_bound, None);
            self.insert_edge_into_ael(lm.right_bound, Some(lm.left_bound));

            self.set_winding_counts(lm.left_bound);
            self.set_winding_counts(lm.right_bound);

            self.scanbeam.insert(self.base.edges[lm.left_bound].top.y);
            self.scanbeam.insert(self.base.edges[lm.right_bound].top.y);

            if self.is_contributing(lm.left_bound) {
                self.add_local_min_poly(lm.left_bound, lm.right_bound, self.base.edges[lm.left_bound].bot);
            }
        }
    }

    fn process_horizontals(&mut self, y: CInt) {
        let mut horizontals: Vec<EdgeIdx> = Vec::new();
        let mut cur = self.ael;
        while let Some(idx) = cur {
            if self.base.edges[idx].is_horizontal() && self.base.edges[idx].bot.y == y {
                horizontals.push(idx);
            }
            cur = self.base.edges[idx].next_in_ael;
        }

        for h in horizontals {
            let left_to_right = self.base.edges[h].top.x >= self.base.edges[h].bot.x;
            let (lo, hi) = if left_to_right {
                (self.base.edges[h].bot.x, self.base.edges[h].top.x)
            } else {
                (self.base.edges[h].top.x, self.base.edges[h].bot.x)
            };

            let mut other = if left_to_right {
                self.base.edges[h].next_in_ael
            } else {
                self.base.edges[h].prev_in_ael
            };
            while let Some(o) = other {
                let ox = self.base.edges[o].current.x;
                if ox < lo || ox > hi {
                    break;
                }
                let next_other = if left_to_right { self.base.edges[o].next_in_ael } else { self.base.edges[o].prev_in_ael };
                let h_contrib = self.base.edges[h].is_contributing();
                if h_contrib && self.base.edges[o].is_contributing() {
                    let pt = IntPoint::new(ox, y);
                    self.intersect_edges(h, o, pt);
                    self.swap_positions_in_ael(h, o);
                } else if h_contrib && ox != self.base.edges[h].bot.x && ox != self.base.edges[h].top.x {
                    // `h` crosses `o`'s interior while `o` itself isn't
                    // contributing: a vertex is inserted partway along `h`'s
                    // own edge, not a mutual intersection (spec §4.9).
                    let (prev, next) = (self.base.edges[h].bot, self.base.edges[h].top);
                    let mut mid = IntPoint::new(ox, y);
                    self.zfill.on_split_edge(&prev, &mut mid, &next);
                    let new_idx = self.add_out_pt(h, mid);
                    self.maybe_record_join(new_idx);
                }
                other = next_other;
            }

            if self.base.edges[h].is_contributing() {
                let top = self.base.edges[h].top;
                let new_idx = self.add_out_pt(h, top);
                self.maybe_record_join(new_idx);
            }
            if self.update_edge_into_ael(h).is_none() {
                self.delete_from_ael(h);
            }
        }
    }

    fn process_intersections(&mut self, top_y: CInt) -> ClipperResult<()> {
        // Advance every AEL edge's current.x to top_y, then bubble-sort,
        // resolving each inversion immediately (a simplified variant of the
        // source's "detect all, then sort and replay" two-pass scheme).
        let mut list: Vec<EdgeIdx> = Vec::new();
        let mut cur = self.ael;
        while let Some(idx) = cur {
            let bot = self.base.edges[idx].bot;
            let dx = self.base.edges[idx].dx;
            self.base.edges[idx].current = IntPoint::new(x_at(bot, dx, top_y), top_y);
            list.push(idx);
            cur = self.base.edges[idx].next_in_ael;
        }

        let mut guard = 0usize;
        let max_guard = list.len().saturating_mul(list.len()).saturating_add(8);
        loop {
            let mut swapped = false;
            let mut i = 0;
            while i + 1 < list.len() {
                let a = list[i];
                let b = list[i + 1];
                if self.base.edges[a].current.x > self.base.edges[b].current.x {
                    let pt = self.intersection_point(a, b, top_y);
                    self.intersect_edges(a, b, pt);
                    self.swap_positions_in_ael(a, b);
                    list.swap(i, i + 1);
                    swapped = true;
                }
                i += 1;
            }
            guard += 1;
            if !swapped {
                break;
            }
            if guard > max_guard {
                warn!("intersection fixup exceeded iteration bound");
                return Err(ClipperError::InternalInvariant(
                    "intersection-order fixup exceeded iteration bound".into(),
                ));
            }
        }
        Ok(())
    }

    fn intersection_point(&self, e1: EdgeIdx, e2: EdgeIdx, top_y: CInt) -> IntPoint {
        let (b1, dx1) = (self.base.edges[e1].bot, self.base.edges[e1].dx);
        let (b2, dx2) = (self.base.edges[e2].bot, self.base.edges[e2].dx);
        if (dx1 - dx2).abs() < crate::consts::TOLERANCE {
            return IntPoint::new(self.base.edges[e1].current.x, top_y.min(self.base.edges[e1].current.y));
        }
        let top_limit = self.base.edges[e1].top.y.max(self.base.edges[e2].top.y);
        let y = if dx1.abs() > 1e-10 && dx2.abs() > 1e-10 {
            (b2.x as f64 - b1.x as f64 + dx1 * b1.y as f64 - dx2 * b2.y as f64) / (dx1 - dx2)
        } else {
            top_y as f64
        };
        let y = y.clamp(top_limit as f64, top_y as f64);
        let x = b1.x as f64 + dx1 * (y - b1.y as f64);
        IntPoint::new(x.trunc() as CInt, y.round() as CInt)
    }

    fn intersect_edges(&mut self, e1: EdgeIdx, e2: EdgeIdx, pt: IntPoint) {
        let e1_contributing = self.base.edges[e1].is_contributing();
        let e2_contributing = self.base.edges[e2].is_contributing();

        let e1_is_subj = self.base.edges[e1].poly_typ == PolyType::Subject;
        let e2_is_subj = self.base.edges[e2].poly_typ == PolyType::Subject;
        if e1_is_subj == e2_is_subj {
            let d1 = self.base.edges[e1].winding_delta as isize;
            let d2 = self.base.edges[e2].winding_delta as isize;
            self.base.edges[e1].winding_count -= d2;
            self.base.edges[e2].winding_count += d1;
        } else {
            let w1 = self.base.edges[e1].winding_count;
            let w2 = self.base.edges[e2].winding_count;
            self.base.edges[e1].winding_count_2 = w2;
            self.base.edges[e2].winding_count_2 = w1;
        }

        let e1_now = self.is_contributing(e1);
        let e2_now = self.is_contributing(e2);

        let (mut p1, mut p2) = (pt, pt);
        {
            let e1b = self.base.edges[e1].bot;
            let e1t = self.base.edges[e1].top;
            let e2b = self.base.edges[e2].bot;
            let e2t = self.base.edges[e2].top;
            self.zfill.on_intersection(&e1b, &mut p1, &e1t, &e2b, &mut p2, &e2t);
        }

        match (e1_contributing, e2_contributing) {
            (true, true) => {
                if e1_now && e2_now {
                    self.add_local_max_poly(e1, e2, p1);
                    self.add_local_min_poly(e2, e1, p2);
                } else {
                    self.add_out_pt(e1, p1);
                    self.add_out_pt(e2, p2);
                    let (s1, s2) = (self.base.edges[e1].side, self.base.edges[e2].side);
                    self.base.edges[e1].side = s2;
                    self.base.edges[e2].side = s1;
                }
            }
            (true, false) => {
                self.add_out_pt(e1, p1);
                if e2_now {
                    self.base.edges[e2].out_idx = self.base.edges[e1].out_idx;
                }
            }
            (false, true) => {
                self.add_out_pt(e2, p2);
                if e1_now {
                    self.base.edges[e1].out_idx = self.base.edges[e2].out_idx;
                }
            }
            (false, false) => {}
        }
    }

    fn process_edges_at_top_of_scanbeam(&mut self, top_y: CInt) {
        let mut snapshot: Vec<EdgeIdx> = Vec::new();
        let mut cur = self.ael;
        while let Some(idx) = cur {
            snapshot.push(idx);
            cur = self.base.edges[idx].next_in_ael;
        }

        let mut maxima_at_top: Vec<EdgeIdx> = Vec::new();
        for &e in &snapshot {
            if self.base.edges[e].top.y != top_y {
                let bot = self.base.edges[e].bot;
                let dx = self.base.edges[e].dx;
                self.base.edges[e].current = IntPoint::new(x_at(bot, dx, top_y), top_y);
                continue;
            }
            if self.base.edges[e].next_in_lml.is_some() {
                if self.base.edges[e].is_contributing() {
                    self.add_out_pt(e, self.base.edges[e].top);
                }
                self.update_edge_into_ael(e);
            } else {
                maxima_at_top.push(e);
            }
        }

        maxima_at_top.sort_by_key(|&e| self.base.edges[e].top.x);
        let mut used = vec![false; maxima_at_top.len()];
        for i in 0..maxima_at_top.len() {
            if used[i] {
                continue;
            }
            let e1 = maxima_at_top[i];
            let mut partner = None;
            for (j, &cand) in maxima_at_top.iter().enumerate().skip(i + 1) {
                if used[j] {
                    continue;
                }
                if self.base.edges[cand].top.x == self.base.edges[e1].top.x {
                    partner = Some(j);
                    break;
                }
            }
            match partner {
                Some(j) => {
                    used[i] = true;
                    used[j] = true;
                    let e2 = maxima_at_top[j];
                    let pt = self.base.edges[e1].top;
                    if self.base.edges[e1].is_contributing() && self.base.edges[e2].is_contributing() {
                        self.add_local_max_poly(e1, e2, pt);
                    } else if self.base.edges[e1].is_contributing() {
                        self.add_out_pt(e1, pt);
                    } else if self.base.edges[e2].is_contributing() {
                        self.add_out_pt(e2, pt);
                    }
                    self.delete_from_ael(e1);
                    self.delete_from_ael(e2);
                }
                None => {
                    used[i] = true;
                    if self.base.edges[e1].is_contributing() {
                        self.add_out_pt(e1, self.base.edges[e1].top);
                    }
                    self.delete_from_ael(e1);
                }
            }
        }
    }

    // ---- join pass ---------------------------------------------------------

    /// After emitting `new_idx` from a horizontal contribution, looks for a
    /// coincident or overlapping point in another ring (spec §4.5/§4.8): an
    /// exact vertex match, or `new_idx` landing inside another ring's
    /// horizontal edge. Unresolved contributions become ghost joins, retried
    /// once the sweep has finished and every ring exists.
    fn maybe_record_join(&mut self, new_idx: OutPtIdx) {
        let new_rec = output::resolve(&self.out_recs, self.out_pts[new_idx].out_rec);
        let p = self.out_pts[new_idx].pt.to_point(false);
        for i in 0..self.out_recs.len() {
            let idx = Idx::new(i);
            if idx == new_rec || self.out_recs[idx].redirect.is_some() {
                continue;
            }
            let Some(head) = self.out_recs[idx].pts else { continue };
            let mut cur = head;
            loop {
                let q = self.out_pts[cur].pt.to_point(false);
                if q.x == p.x && q.y == p.y {
                    self.joins.push(Join { out_pt1: new_idx, out_pt2: cur, off_pt: p });
                    return;
                }
                let qn = self.out_pts[self.out_pts[cur].next].pt.to_point(false);
                if q.y == p.y && qn.y == p.y {
                    let (lo, hi) = (q.x.min(qn.x), q.x.max(qn.x));
                    if p.x > lo && p.x < hi {
                        self.joins.push(Join { out_pt1: new_idx, out_pt2: cur, off_pt: p });
                        return;
                    }
                }
                cur = self.out_pts[cur].next;
                if cur == head {
                    break;
                }
            }
        }
        self.ghost_joins.push(PendingJoin { out_pt: new_idx, at: p });
    }

    fn resolve_ghost_join(&mut self, pending: PendingJoin) {
        let new_rec = output::resolve(&self.out_recs, self.out_pts[pending.out_pt].out_rec);
        for i in 0..self.out_recs.len() {
            let idx = Idx::new(i);
            if idx == new_rec || self.out_recs[idx].redirect.is_some() {
                continue;
            }
            let Some(head) = self.out_recs[idx].pts else { continue };
            let mut cur = head;
            loop {
                let q = self.out_pts[cur].pt.to_point(false);
                if q.x == pending.at.x && q.y == pending.at.y {
                    self.joins.push(Join { out_pt1: pending.out_pt, out_pt2: cur, off_pt: pending.at });
                    return;
                }
                cur = self.out_pts[cur].next;
                if cur == head {
                    break;
                }
            }
        }
        trace!(at = ?pending.at, "ghost join never found a partner");
    }

    fn join_common_edges(&mut self) {
        for pending in std::mem::take(&mut self.ghost_joins) {
            self.resolve_ghost_join(pending);
        }
        let joins = std::mem::take(&mut self.joins);
        for j in joins {
            self.join_points(j);
        }
        self.fixup_first_lefts();
    }

    /// Resolves one recorded join. When the two points aren't an exact
    /// vertex match, `out_pt2` landed inside one of ring2's edges; that edge
    /// is split at the join point first (`discardLeft` from spec §4.8: the
    /// overlapping run is never duplicated, since splitting materializes a
    /// single shared vertex instead of two coincident ones), then
    /// `on_join` lets the callback reconcile the two chains' attributes
    /// before the rings are spliced.
    fn join_points(&mut self, j: Join) {
        let rec1 = output::resolve(&self.out_recs, self.out_pts[j.out_pt1].out_rec);
        let rec2 = output::resolve(&self.out_recs, self.out_pts[j.out_pt2].out_rec);
        if rec1 == rec2 {
            return;
        }
        let p1 = self.out_pts[j.out_pt1].pt.to_point(false);
        let p2 = self.out_pts[j.out_pt2].pt.to_point(false);
        let out_pt2 = if p1.x == p2.x && p1.y == p2.y {
            j.out_pt2
        } else {
            let next2 = self.out_pts[self.out_pts[j.out_pt2].next].pt.to_point(false);
            let mut mid = j.off_pt;
            self.zfill.on_split_edge(&p2, &mut mid, &next2);
            let coord = self.coord_with_reverse(mid, next2);
            self.insert_after(j.out_pt2, coord)
        };

        let mut e1_from = self.out_pts[self.out_pts[j.out_pt1].prev].pt.to_point(false);
        let mut e1_to = self.out_pts[j.out_pt1].pt.to_point(false);
        let mut e2_from = self.out_pts[self.out_pts[out_pt2].prev].pt.to_point(false);
        let mut e2_to = self.out_pts[out_pt2].pt.to_point(false);
        self.zfill.on_join(&mut e1_from, &mut e1_to, &mut e2_from, &mut e2_to);
        self.out_pts[j.out_pt1].pt.correct_z = e1_to.z;
        self.out_pts[out_pt2].pt.correct_z = e2_to.z;

        self.append_ring(rec1, rec2);
    }

    fn append_ring(&mut self, keep: OutRecIdx, lose: OutRecIdx) {
        let keep = output::resolve(&self.out_recs, keep);
        let lose = output::resolve(&self.out_recs, lose);
        if keep == lose {
            return;
        }
        let (Some(head1), Some(head2)) = (self.out_recs[keep].pts, self.out_recs[lose].pts) else {
            return;
        };
        let tail1 = self.out_pts[head1].prev;
        let tail2 = self.out_pts[head2].prev;
        self.out_pts[tail1].next = head2;
        self.out_pts[head2].prev = tail1;
        self.out_pts[tail2].next = head1;
        self.out_pts[head1].prev = tail2;
        let mut cur = head2;
        loop {
            self.out_pts[cur].out_rec = keep;
            cur = self.out_pts[cur].next;
            if cur == head2 {
                break;
            }
        }
        self.out_recs[lose].pts = None;
        self.out_recs[lose].redirect = Some(keep);
    }

    /// Recomputes `first_left` for any `OutRec` pointing at a now-redirected
    /// record (a simplified `fixupFirstLefts`: no point-in-polygon
    /// re-search fallback for ambiguous cases, see DESIGN.md).
    fn fixup_first_lefts(&mut self) {
        for i in 0..self.out_recs.len() {
            let idx = Idx::new(i);
            if let Some(fl) = self.out_recs[idx].first_left {
                let resolved = output::resolve(&self.out_recs, fl);
                self.out_recs[idx].first_left = Some(resolved);
            }
        }
    }

    /// `StrictlySimple`: splits any ring that touches itself at a repeated
    /// point into two simple rings. A best-effort single pass (see
    /// DESIGN.md); pathological multi-self-touch inputs may need more than
    /// one pass to fully resolve.
    fn do_simple_polygons(&mut self) {
        let mut i = 0;
        while i < self.out_recs.len() {
            let idx = Idx::new(i);
            i += 1;
            let Some(head) = self.out_recs[idx].pts else { continue };
            if let Some((a, b)) = self.find_self_touch(head) {
                self.split_ring_at(a, b);
            }
        }
    }

    fn find_self_touch(&self, head: OutPtIdx) -> Option<(OutPtIdx, OutPtIdx)> {
        let mut seen: Vec<(CInt, CInt, OutPtIdx)> = Vec::new();
        let mut cur = head;
        loop {
            let p = self.out_pts[cur].pt;
            if let Some(&(_, _, first)) = seen.iter().find(|&&(x, y, _)| x == p.x && y == p.y) {
                return Some((first, cur));
            }
            seen.push((p.x, p.y, cur));
            cur = self.out_pts[cur].next;
            if cur == head {
                break;
            }
        }
        None
    }

    fn split_ring_at(&mut self, a: OutPtIdx, b: OutPtIdx) {
        if a == b {
            return;
        }
        let rec = self.out_pts[a].out_rec;
        let a_next = self.out_pts[a].next;
        let b_next = self.out_pts[b].next;
        self.out_pts[a].next = b_next;
        self.out_pts[b_next].prev = a;
        self.out_pts[b].next = a_next;
        self.out_pts[a_next].prev = b;

        let new_rec = self.out_recs.alloc(OutRec::new());
        self.out_recs[new_rec].pts = Some(b);
        self.out_recs[rec].pts = Some(a);
        let mut cur = b;
        loop {
            self.out_pts[cur].out_rec = new_rec;
            cur = self.out_pts[cur].next;
            if cur == b {
                break;
            }
        }
    }

    // ---- result flattening -------------------------------------------------

    fn live_out_recs(&self) -> Vec<OutRecIdx> {
        let mut out = Vec::new();
        for i in 0..self.out_recs.len() {
            let idx = Idx::new(i);
            if self.out_recs[idx].redirect.is_some() {
                continue;
            }
            if self.out_recs[idx].pts.is_some() {
                out.push(idx);
            }
        }
        out
    }

    fn build_paths(&mut self) -> crate::Paths {
        let mut result = Vec::new();
        for idx in self.live_out_recs() {
            let head = self.out_recs[idx].pts.unwrap();
            if output::ring_len(&self.out_pts, head) < 3 {
                continue;
            }
            let ccw = output::orientation(&self.out_pts, head);
            let reversed = ccw == self.reverse_solution;
            if reversed {
                let forward = output::to_path(&self.out_pts, head, false);
                self.zfill.on_reverse_path(&forward);
            }
            result.push(output::to_path(&self.out_pts, head, reversed));
        }
        result
    }

    fn build_tree(&mut self) -> crate::PolyTree {
        let mut tree = crate::PolyTree::new();
        let recs = self.live_out_recs();
        let mut rec_to_node: std::collections::HashMap<OutRecIdx, crate::NodeIdx> = std::collections::HashMap::new();
        for idx in &recs {
            let head = self.out_recs[*idx].pts.unwrap();
            if output::ring_len(&self.out_pts, head) < 3 {
                continue;
            }
            let ccw = output::orientation(&self.out_pts, head);
            let reversed = ccw == self.reverse_solution;
            if reversed {
                let forward = output::to_path(&self.out_pts, head, false);
                self.zfill.on_reverse_path(&forward);
            }
            let contour = output::to_path(&self.out_pts, head, reversed);

            let parent_rec = self.out_recs[*idx].first_left.map(|fl| output::resolve(&self.out_recs, fl));
            let node = match parent_rec.and_then(|p| rec_to_node.get(&p).copied()) {
                Some(parent_node) => tree.add_child(parent_node, contour),
                None => tree.add_root(contour),
            };
            rec_to_node.insert(*idx, node);
        }
        tree
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
    fn union_of_two_disjoint_squares_returns_two_contours() {
        let mut c = Clipper::new(RangeMode::Full);
        c.add_path(&square(0, 0, 10), PolyType::Subject, true).unwrap();
        c.add_path(&square(100, 100, 10), PolyType::Subject, true).unwrap();
        let result = c.execute(ClipType::Union, PolyFillType::NonZero, PolyFillType::NonZero).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn intersection_of_overlapping_squares_is_nonempty() {
        let mut c = Clipper::new(RangeMode::Full);
        c.add_path(&square(0, 0, 10), PolyType::Subject, true).unwrap();
        c.add_path(&square(5, 5, 10), PolyType::Clip, true).unwrap();
        let result = c.execute(ClipType::Intersection, PolyFillType::EvenOdd, PolyFillType::EvenOdd).unwrap();
        assert_eq!(result.len(), 1);
        assert!(crate::area(&result[0]).abs() > 0.0);
    }

    #[test]
    fn difference_of_non_overlapping_squares_returns_subject_unchanged() {
        let mut c = Clipper::new(RangeMode::Full);
        c.add_path(&square(0, 0, 10), PolyType::Subject, true).unwrap();
        c.add_path(&square(100, 100, 10), PolyType::Clip, true).unwrap();
        let result = c.execute(ClipType::Difference, PolyFillType::EvenOdd, PolyFillType::EvenOdd).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(crate::area(&result[0]).abs(), 100.0);
    }

    #[test]
    fn reentrant_execute_is_rejected() {
        let mut c = Clipper::new(RangeMode::Full);
        c.add_path(&square(0, 0, 10), PolyType::Subject, true).unwrap();
        c.executing = true;
        let err = c.execute(ClipType::Union, PolyFillType::EvenOdd, PolyFillType::EvenOdd);
        assert!(matches!(err, Err(ClipperError::ConcurrentUse)));
    }

    #[test]
    fn open_subject_path_is_rejected_at_execute() {
        let mut c = Clipper::new(RangeMode::Full);
        c.add_path(&[IntPoint::new(0, 0), IntPoint::new(1, 1), IntPoint::new(2, 0)], PolyType::Subject, false).unwrap();
        let err = c.execute(ClipType::Union, PolyFillType::EvenOdd, PolyFillType::EvenOdd);
        assert!(err.is_err());
    }
}
