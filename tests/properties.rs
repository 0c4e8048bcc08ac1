//! Randomized invariants from the testable-properties list, checked with
//! `proptest` over small families of well-formed closed paths.

use clipper::{
    area, orientation, ClipType, Clipper, ClipperOffset, EndType, JoinType, PolyFillType,
    PolyType, RangeMode,
};
use proptest::prelude::*;

/// An axis-aligned rectangle, always non-degenerate and always CCW.
fn rect_strategy() -> impl Strategy<Value = Vec<clipper::IntPoint>> {
    (0i64..2000, 0i64..2000, 200i64..2000, 200i64..2000).prop_map(|(x, y, w, h)| {
        vec![
            clipper::IntPoint::new(x, y),
            clipper::IntPoint::new(x + w, y),
            clipper::IntPoint::new(x + w, y + h),
            clipper::IntPoint::new(x, y + h),
        ]
    })
}

proptest! {
    /// Union of a single closed rectangle returns that rectangle's area
    /// unchanged, under either fill rule.
    #[test]
    fn union_of_one_rect_preserves_area(r in rect_strategy()) {
        let expected = area(&r).abs();
        let mut c = Clipper::new(RangeMode::Full);
        c.add_path(&r, PolyType::Subject, true).unwrap();
        let result = c.execute(ClipType::Union, PolyFillType::NonZero, PolyFillType::NonZero).unwrap();
        prop_assert_eq!(result.len(), 1);
        let got = area(&result[0]).abs();
        prop_assert!((got - expected).abs() < 1.0);
    }

    /// Outer rings in a single-path solution always carry a positive signed
    /// area; flipping `ReverseSolution` flips the sign.
    #[test]
    fn orientation_matches_reverse_solution_flag(r in rect_strategy()) {
        let mut c = Clipper::new(RangeMode::Full);
        c.add_path(&r, PolyType::Subject, true).unwrap();
        let normal = c.execute(ClipType::Union, PolyFillType::NonZero, PolyFillType::NonZero).unwrap();

        let mut c2 = Clipper::new(RangeMode::Full);
        c2.reverse_solution = true;
        c2.add_path(&r, PolyType::Subject, true).unwrap();
        let reversed = c2.execute(ClipType::Union, PolyFillType::NonZero, PolyFillType::NonZero).unwrap();

        prop_assert_eq!(normal.len(), 1);
        prop_assert_eq!(reversed.len(), 1);
        prop_assert_ne!(orientation(&normal[0]), orientation(&reversed[0]));
    }

    /// De Morgan: Difference(A, B) and Intersection(A, B) partition A's
    /// area exactly, for any two overlapping or disjoint rectangles.
    #[test]
    fn difference_and_intersection_partition_subject_area(a in rect_strategy(), b in rect_strategy()) {
        let subject_area = area(&a).abs();

        let mut diff = Clipper::new(RangeMode::Full);
        diff.add_path(&a, PolyType::Subject, true).unwrap();
        diff.add_path(&b, PolyType::Clip, true).unwrap();
        let difference = diff.execute(ClipType::Difference, PolyFillType::NonZero, PolyFillType::NonZero).unwrap();

        let mut inter = Clipper::new(RangeMode::Full);
        inter.add_path(&a, PolyType::Subject, true).unwrap();
        inter.add_path(&b, PolyType::Clip, true).unwrap();
        let intersection = inter.execute(ClipType::Intersection, PolyFillType::NonZero, PolyFillType::NonZero).unwrap();

        let diff_area: f64 = difference.iter().map(|p| area(p).abs()).sum();
        let inter_area: f64 = intersection.iter().map(|p| area(p).abs()).sum();

        prop_assert!((diff_area + inter_area - subject_area).abs() < 2.0);
    }

    /// Union never shrinks the area relative to either input rectangle.
    #[test]
    fn union_area_is_at_least_either_input(a in rect_strategy(), b in rect_strategy()) {
        let area_a = area(&a).abs();
        let area_b = area(&b).abs();

        let mut c = Clipper::new(RangeMode::Full);
        c.add_path(&a, PolyType::Subject, true).unwrap();
        c.add_path(&b, PolyType::Subject, true).unwrap();
        let result = c.execute(ClipType::Union, PolyFillType::NonZero, PolyFillType::NonZero).unwrap();

        let union_area: f64 = result.iter().map(|p| area(p).abs()).sum();
        prop_assert!(union_area >= area_a.max(area_b) - 1.0);
    }

    /// Offset monotonicity: growing a rectangle always grows its area;
    /// shrinking it always shrinks it, as long as the shrink doesn't
    /// collapse the shape entirely.
    #[test]
    fn offset_monotonicity(r in rect_strategy(), delta in 10i64..40) {
        let original = area(&r).abs();

        let mut grow = ClipperOffset::new(2.0, 0.25);
        grow.add_path(&r, JoinType::Round, EndType::ClosedPolygon);
        let grown = grow.execute(delta as f64).unwrap();
        prop_assert_eq!(grown.len(), 1);
        prop_assert!(area(&grown[0]).abs() > original);

        let mut shrink = ClipperOffset::new(2.0, 0.25);
        shrink.add_path(&r, JoinType::Round, EndType::ClosedPolygon);
        let shrunk = shrink.execute(-(delta as f64)).unwrap();
        prop_assert_eq!(shrunk.len(), 1);
        prop_assert!(area(&shrunk[0]).abs() < original);
    }
}
