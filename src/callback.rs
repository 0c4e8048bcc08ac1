//! Attribute callback dispatch (spec C10) and the "following Z" convention
//! (spec §4.9), ported from `ZFill`/`FollowingZFill` in `clipper.hpp`.
//!
//! The source's C++ header carries several inconsistent drafts of this
//! interface across its example `main.cpp` files (some pass an edge side,
//! some decompose differently). Per spec §9's Open Question, this port
//! settles on the four-attribute, no-side form from the canonical
//! `clipper.hpp` header; the other drafts are superseded.

use crate::point::IntPoint;

/// User-installable hook invoked at every geometry event that creates,
/// splits, joins, or discards a vertex, so attribute ("Z") data can be kept
/// coherent with the geometric transformation that produced it.
///
/// All methods default to no-ops; implement only the ones a given attribute
/// scheme actually needs. `Clipper`/`ClipperOffset` hold the callback object
/// for the duration of one `execute` call and never invoke it concurrently.
pub trait ZFill {
    /// Fired once per input vertex as it enters the pipeline, letting the
    /// callback populate `curr`'s reverse-traversal attribute from `next`'s
    /// forward attribute (or similar).
    fn initialize_reverse(&mut self, _curr: &mut IntPoint, _next: &IntPoint) {}

    /// Fired at every edge intersection, before the AEL swap. Points are
    /// passed in original-polygon order; the callback writes the Z carried
    /// at `e1pt`/`e2pt` from the four surrounding vertices.
    #[allow(clippy::too_many_arguments)]
    fn on_intersection(
        &mut self,
        _e1_bot: &IntPoint,
        _e1_pt: &mut IntPoint,
        _e1_top: &IntPoint,
        _e2_bot: &IntPoint,
        _e2_pt: &mut IntPoint,
        _e2_top: &IntPoint,
    ) {
    }

    /// Fired when a new vertex is inserted partway along an existing edge,
    /// not at an intersection (e.g. a horizontal contribution crossing
    /// another edge's interior).
    fn on_split_edge(&mut self, _prev: &IntPoint, _pt: &mut IntPoint, _next: &IntPoint) {}

    /// Fired when a newly emitted point coincides with a previously emitted
    /// one and their attribute data must combine.
    fn on_append_overlapping(&mut self, _prev: &IntPoint, _to: &mut IntPoint) {}

    /// Fired during the join pass when two chains splice at a shared point.
    fn on_join(&mut self, _e1_from: &mut IntPoint, _e1_to: &mut IntPoint, _e2_from: &mut IntPoint, _e2_to: &mut IntPoint) {}

    /// Fired when collinear spike removal elides `curr`.
    fn on_remove_spike(&mut self, _prev: &IntPoint, _curr: &IntPoint, _next: &IntPoint) {}

    /// Fired immediately before a path is reversed.
    fn on_reverse_path(&mut self, _path: &[IntPoint]) {}

    /// Fired once, at the end of an offset execution.
    fn on_finish_offset(&mut self, _path: &[IntPoint]) {}

    /// Fired for each vertex emitted while offsetting; `step`/`steps` name
    /// which interpolated vertex of a rounded join is being produced
    /// (`steps == 1` for miter/square joins).
    #[allow(clippy::too_many_arguments)]
    fn on_offset(
        &mut self,
        _step: usize,
        _steps: usize,
        _prev: &IntPoint,
        _curr: &IntPoint,
        _next: &IntPoint,
        _out_pt: &mut IntPoint,
    ) {
    }
}

/// Default callback: every event is a no-op, so `z` fields are left at
/// whatever the caller initialized them to (generally `0`).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpZFill;

impl ZFill for NoOpZFill {}

/// The "following" attribute convention (spec §4.9): an attribute names the
/// edge ending at the vertex that carries it (`v[i]`'s Z describes
/// `v[i-1] -> v[i]`). Implementors only need three primitives; the eight
/// `ZFill` dispatch points are derived from them the way
/// `FollowingZFill` derives them in `clipper.hpp`.
pub trait FollowingZFill {
    /// The attribute valid when the edge is traversed in the other
    /// direction.
    fn reverse(&self, z: i64) -> i64 {
        z
    }

    /// Duplicate attribute state (used when a ring is split and both halves
    /// need independent copies).
    fn clone_z(&self, z: i64) -> i64 {
        z
    }

    /// The attribute for the sub-edge `from -> pt`, given the attribute `z`
    /// of the full edge `from -> to`. `pt` is guaranteed to lie on the
    /// segment and not coincide with either endpoint.
    fn strip_begin(&self, z: i64, _from: IntPoint, _to: IntPoint, _pt: IntPoint) -> i64 {
        z
    }

    /// The attribute for the sub-edge `pt -> to`.
    fn strip_end(&self, z: i64, from: IntPoint, to: IntPoint, pt: IntPoint) -> i64 {
        self.reverse(self.strip_begin(self.reverse(z), to, from, pt))
    }
}

/// Adapts a [`FollowingZFill`] implementation into the full [`ZFill`]
/// dispatch surface, the way `FollowingZFill : public ZFill` does in the
/// original header.
pub struct FollowingZFillAdapter<F: FollowingZFill>(pub F);

impl<F: FollowingZFill> ZFill for FollowingZFillAdapter<F> {
    fn initialize_reverse(&mut self, curr: &mut IntPoint, next: &IntPoint) {
        curr.z = self.0.reverse(next.z);
    }

    fn on_intersection(
        &mut self,
        e1_bot: &IntPoint,
        e1_pt: &mut IntPoint,
        e1_top: &IntPoint,
        e2_bot: &IntPoint,
        e2_pt: &mut IntPoint,
        e2_top: &IntPoint,
    ) {
        e1_pt.z = self.0.strip_begin(e1_bot.z, *e1_bot, *e1_top, *e1_pt);
        e2_pt.z = self.0.strip_begin(e2_bot.z, *e2_bot, *e2_top, *e2_pt);
    }

    fn on_split_edge(&mut self, prev: &IntPoint, pt: &mut IntPoint, next: &IntPoint) {
        pt.z = self.0.strip_begin(next.z, *prev, *next, *pt);
    }

    fn on_append_overlapping(&mut self, prev: &IntPoint, to: &mut IntPoint) {
        to.z = self.0.clone_z(prev.z);
    }

    fn on_join(&mut self, e1_from: &mut IntPoint, e1_to: &mut IntPoint, e2_from: &mut IntPoint, e2_to: &mut IntPoint) {
        let tmp = e1_to.z;
        e1_to.z = self.0.clone_z(e2_to.z);
        e2_to.z = self.0.clone_z(tmp);
        let _ = (e1_from, e2_from);
    }

    fn on_remove_spike(&mut self, prev: &IntPoint, curr: &IntPoint, next: &IntPoint) {
        let _ = (prev, curr, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Identity;
    impl FollowingZFill for Identity {}

    #[test]
    fn strip_end_is_reverse_of_mirrored_strip_begin() {
        let id = Identity;
        let from = IntPoint::new(0, 0);
        let to = IntPoint::new(10, 0);
        let pt = IntPoint::new(5, 0);
        assert_eq!(id.strip_end(7, from, to, pt), 7);
    }

    #[test]
    fn noop_zfill_leaves_points_untouched() {
        let mut cb = NoOpZFill;
        let mut p = IntPoint::with_z(1, 2, 99);
        let q = IntPoint::with_z(3, 4, 1);
        cb.initialize_reverse(&mut p, &q);
        assert_eq!(p.z, 99);
    }
}
