//! Polygon offsetting (spec C11): grows or shrinks paths by a delta using
//! miter/square/round joins, then self-clips the result through a union
//! pass of the same Vatti engine (C1-C10).

use crate::callback::{NoOpZFill, ZFill};
use crate::clipper::Clipper;
use crate::error::ClipperResult;
use crate::point::{CInt, IntPoint, RangeMode};
use crate::{ClipType, EndType, JoinType, PolyFillType};

#[derive(Clone, Copy)]
struct Normal {
    x: f64,
    y: f64,
}

/// Unit normal of `pt1 -> pt2`, rotated 90 degrees (`(dy, -dx)`); zero for a
/// degenerate zero-length segment.
fn unit_normal(pt1: IntPoint, pt2: IntPoint) -> Normal {
    let dx = (pt2.x - pt1.x) as f64;
    let dy = (pt2.y - pt1.y) as f64;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return Normal { x: 0.0, y: 0.0 };
    }
    Normal { x: dy / len, y: -dx / len }
}

fn round_pt(x: f64, y: f64) -> IntPoint {
    IntPoint::new(x.round() as CInt, y.round() as CInt)
}

struct PathSpec {
    path: Vec<IntPoint>,
    join_type: JoinType,
    end_type: EndType,
}

/// Offsets closed polygons and open lines by a signed delta (spec C11).
/// `miter_limit` caps how far a `Miter` join may extend before falling back
/// to `Square`; `arc_tolerance` controls how finely `Round` joins are
/// stepped.
pub struct ClipperOffset {
    paths: Vec<PathSpec>,
    miter_limit: f64,
    arc_tolerance: f64,
    zfill: Box<dyn ZFill>,
}

impl ClipperOffset {
    pub fn new(miter_limit: f64, arc_tolerance: f64) -> Self {
        ClipperOffset {
            paths: Vec::new(),
            miter_limit: miter_limit.max(2.0),
            arc_tolerance: if arc_tolerance > 0.0 { arc_tolerance } else { 0.25 },
            zfill: Box::new(NoOpZFill),
        }
    }

    pub fn set_zfill(&mut self, cb: impl ZFill + 'static) {
        self.zfill = Box::new(cb);
    }

    pub fn add_path(&mut self, path: &[IntPoint], join_type: JoinType, end_type: EndType) {
        if path.len() < 2 {
            return;
        }
        self.paths.push(PathSpec { path: path.to_vec(), join_type, end_type });
    }

    pub fn add_paths(&mut self, paths: &[Vec<IntPoint>], join_type: JoinType, end_type: EndType) {
        for p in paths {
            self.add_path(p, join_type, end_type);
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Offsets every added path by `delta` and self-clips the union.
    pub fn execute(&mut self, delta: f64) -> ClipperResult<crate::Paths> {
        let offset_paths = self.build_offset_paths(delta);
        let mut clipper = Clipper::new(RangeMode::Full);
        for p in &offset_paths {
            if p.len() >= 3 {
                clipper.add_path(p, crate::PolyType::Subject, true)?;
            }
        }
        clipper.execute(ClipType::Union, PolyFillType::NonZero, PolyFillType::NonZero)
    }

    pub fn execute_tree(&mut self, delta: f64) -> ClipperResult<crate::PolyTree> {
        let offset_paths = self.build_offset_paths(delta);
        let mut clipper = Clipper::new(RangeMode::Full);
        for p in &offset_paths {
            if p.len() >= 3 {
                clipper.add_path(p, crate::PolyType::Subject, true)?;
            }
        }
        clipper.execute_tree(ClipType::Union, PolyFillType::NonZero, PolyFillType::NonZero)
    }

    fn build_offset_paths(&mut self, delta: f64) -> crate::Paths {
        let miter_limit = self.miter_limit;
        let arc_tolerance = self.arc_tolerance;
        let mut out = Vec::new();
        for spec in &self.paths {
            let mut built = match spec.end_type {
                EndType::ClosedPolygon => {
                    vec![offset_closed(&spec.path, delta, spec.join_type, miter_limit, arc_tolerance, self.zfill.as_mut())]
                }
                _ => offset_open(&spec.path, delta, spec.join_type, spec.end_type, miter_limit, arc_tolerance, self.zfill.as_mut()),
            };
            out.append(&mut built);
        }
        if let Some(last) = out.last().cloned() {
            self.zfill.on_finish_offset(&last);
        }
        out
    }
}

fn steps_per_rad(abs_delta: f64, arc_tolerance: f64) -> f64 {
    if abs_delta < 1e-6 {
        return 1.0;
    }
    let y = (arc_tolerance.min(abs_delta * 0.25)).max(0.0025 * abs_delta);
    let cos_theta = (1.0 - y / abs_delta).clamp(-1.0, 1.0);
    let steps = std::f64::consts::PI / cos_theta.acos();
    steps / (2.0 * std::f64::consts::PI)
}

fn offset_closed(
    path: &[IntPoint],
    delta: f64,
    join_type: JoinType,
    miter_limit: f64,
    arc_tolerance: f64,
    zfill: &mut dyn ZFill,
) -> Vec<IntPoint> {
    let n = path.len();
    if n < 3 {
        return Vec::new();
    }
    let normals: Vec<Normal> = (0..n).map(|i| unit_normal(path[i], path[(i + 1) % n])).collect();
    let spr = steps_per_rad(delta.abs(), arc_tolerance);
    let miter_r_limit = 2.0 / (miter_limit * miter_limit);

    let mut dest = Vec::with_capacity(n * 2);
    for j in 0..n {
        let k = (j + n - 1) % n;
        offset_vertex(path[j], normals[k], normals[j], delta, join_type, miter_r_limit, spr, &mut dest);
        zfill.on_offset(0, 1, &path[k], &path[j], &path[(j + 1) % n], dest.last_mut().unwrap());
    }
    dest
}

fn offset_open(
    path: &[IntPoint],
    delta: f64,
    join_type: JoinType,
    end_type: EndType,
    miter_limit: f64,
    arc_tolerance: f64,
    zfill: &mut dyn ZFill,
) -> Vec<Vec<IntPoint>> {
    let n = path.len();
    if n < 2 {
        return Vec::new();
    }
    if matches!(end_type, EndType::ClosedLine) {
        // Same geometry as a closed polygon, but any reflex-corner
        // self-intersection is still resolved by the caller's union pass.
        return vec![offset_closed(path, delta, join_type, miter_limit, arc_tolerance, zfill)];
    }

    let normals: Vec<Normal> = (0..n - 1).map(|i| unit_normal(path[i], path[i + 1])).collect();
    let spr = steps_per_rad(delta.abs(), arc_tolerance);
    let miter_r_limit = 2.0 / (miter_limit * miter_limit);

    let mut dest = Vec::with_capacity(n * 2 + 4);
    // forward side
    for j in 1..n - 1 {
        offset_vertex(path[j], normals[j - 1], normals[j], delta, join_type, miter_r_limit, spr, &mut dest);
    }
    // end cap at path[n-1]
    end_cap(path[n - 2], path[n - 1], normals[n - 2], delta, end_type, spr, &mut dest);
    // backward side
    for j in (1..n - 1).rev() {
        let rev_prev = Normal { x: -normals[j].x, y: -normals[j].y };
        let rev_next = Normal { x: -normals[j - 1].x, y: -normals[j - 1].y };
        offset_vertex(path[j], rev_prev, rev_next, delta, join_type, miter_r_limit, spr, &mut dest);
    }
    // start cap at path[0]
    let rev_first = Normal { x: -normals[0].x, y: -normals[0].y };
    end_cap(path[1], path[0], rev_first, delta, end_type, spr, &mut dest);

    vec![dest]
}

fn end_cap(prev: IntPoint, tip: IntPoint, normal: Normal, delta: f64, end_type: EndType, spr: f64, out: &mut Vec<IntPoint>) {
    let _ = prev;
    match end_type {
        EndType::OpenButt => {
            out.push(round_pt(tip.x as f64 + normal.x * delta, tip.y as f64 + normal.y * delta));
            out.push(round_pt(tip.x as f64 - normal.x * delta, tip.y as f64 - normal.y * delta));
        }
        EndType::OpenSquare => {
            let perp = Normal { x: -normal.y, y: normal.x };
            out.push(round_pt(
                tip.x as f64 + normal.x * delta + perp.x * delta,
                tip.y as f64 + normal.y * delta + perp.y * delta,
            ));
            out.push(round_pt(
                tip.x as f64 - normal.x * delta + perp.x * delta,
                tip.y as f64 - normal.y * delta + perp.y * delta,
            ));
        }
        EndType::OpenRound => {
            let steps = ((std::f64::consts::PI * spr).ceil() as usize).max(2);
            for i in 0..=steps {
                let angle = std::f64::consts::PI * (i as f64) / (steps as f64);
                let (sin_a, cos_a) = angle.sin_cos();
                let nx = normal.x * cos_a - normal.y * sin_a;
                let ny = normal.x * sin_a + normal.y * cos_a;
                out.push(round_pt(tip.x as f64 + nx * delta, tip.y as f64 + ny * delta));
            }
        }
        EndType::ClosedPolygon | EndType::ClosedLine => unreachable!("end caps are only for open paths"),
    }
}

fn offset_vertex(
    p: IntPoint,
    n_prev: Normal,
    n_next: Normal,
    delta: f64,
    join_type: JoinType,
    miter_r_limit: f64,
    steps_per_rad: f64,
    out: &mut Vec<IntPoint>,
) {
    let cross = n_prev.x * n_next.y - n_prev.y * n_next.x;
    let cos_a = n_prev.x * n_next.x + n_prev.y * n_next.y;

    if cross * delta <= 0.0 {
        // Reflex corner: the two offset edges would overlap past `p`;
        // emit both raw endpoints and let the self-clip union sort it out.
        out.push(round_pt(p.x as f64 + n_prev.x * delta, p.y as f64 + n_prev.y * delta));
        out.push(round_pt(p.x as f64 + n_next.x * delta, p.y as f64 + n_next.y * delta));
        return;
    }

    match join_type {
        JoinType::Miter => {
            let r = 1.0 + cos_a;
            if r >= miter_r_limit {
                let q = delta / r;
                out.push(round_pt(p.x as f64 + (n_prev.x + n_next.x) * q, p.y as f64 + (n_prev.y + n_next.y) * q));
            } else {
                do_square(p, n_prev, n_next, delta, out);
            }
        }
        JoinType::Square => do_square(p, n_prev, n_next, delta, out),
        JoinType::Round => {
            let angle = cross.atan2(cos_a);
            let steps = ((angle.abs() * steps_per_rad).ceil() as usize).max(1);
            for i in 0..=steps {
                let t = angle * (i as f64) / (steps as f64);
                let (sin_t, cos_t) = t.sin_cos();
                let nx = n_prev.x * cos_t - n_prev.y * sin_t;
                let ny = n_prev.x * sin_t + n_prev.y * cos_t;
                out.push(round_pt(p.x as f64 + nx * delta, p.y as f64 + ny * delta));
            }
        }
    }
}

/// `sinA`/`cosA`-derived square join: offsets the shared vertex by `delta`
/// along each normal plus a perpendicular correction of `tan(angle/4)`, so
/// the truncation plane is equidistant from both adjoining edges.
fn do_square(p: IntPoint, n_prev: Normal, n_next: Normal, delta: f64, out: &mut Vec<IntPoint>) {
    let sin_a = n_prev.x * n_next.y - n_prev.y * n_next.x;
    let cos_a = n_prev.x * n_next.x + n_prev.y * n_next.y;
    let dx = (sin_a.atan2(cos_a) / 4.0).tan();
    out.push(round_pt(
        p.x as f64 + delta * (n_prev.x - n_prev.y * dx),
        p.y as f64 + delta * (n_prev.y + n_prev.x * dx),
    ));
    out.push(round_pt(
        p.x as f64 + delta * (n_next.x + n_next.y * dx),
        p.y as f64 + delta * (n_next.y - n_next.x * dx),
    ));
}
