use std::fmt;
use std::str::FromStr;

use crate::error::SceneError;
use crate::intersect::{ Intersection, Intersections };

/// A boolean operation between the left and right operand of a CSG shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CsgOp {
    Union,
    Intersection,
    Difference,
}

impl CsgOp {
    /// Decides whether an intersection survives the operation.
    ///
    /// `lhit` is true when the intersection belongs to the left operand;
    /// `inl` and `inr` tell whether the ray is currently inside the left and
    /// right operand, before this intersection is crossed.
    pub fn intersection_allowed(&self, lhit: bool, inl: bool, inr: bool)
        -> bool {
        match self {
            CsgOp::Union => (lhit && !inr) || (!lhit && !inl),
            CsgOp::Intersection => (lhit && inr) || (!lhit && inl),
            CsgOp::Difference => (lhit && !inr) || (!lhit && inl),
        }
    }

    /// Filters a sorted list of intersections through the operation.
    ///
    /// `in_left` decides whether an intersection belongs to the left operand
    /// (anything else belongs to the right one). Kept intersections keep
    /// their order.
    pub fn filter_intersections<F>(&self, xs: &Intersections, in_left: F)
        -> Intersections
    where
        F: Fn(&Intersection) -> bool,
    {
        let mut inl = false;
        let mut inr = false;

        let mut result = Intersections::new();
        for i in xs.iter() {
            let lhit = in_left(i);

            if self.intersection_allowed(lhit, inl, inr) {
                result.push(*i);
            }

            if lhit {
                inl = !inl;
            } else {
                inr = !inr;
            }
        }

        result
    }
}

impl FromStr for CsgOp {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<CsgOp, SceneError> {
        match s {
            "union" => Ok(CsgOp::Union),
            "intersection" => Ok(CsgOp::Intersection),
            "difference" => Ok(CsgOp::Difference),
            _ => Err(SceneError::UnknownCsgOperation(s.to_string())),
        }
    }
}

impl fmt::Display for CsgOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CsgOp::Union => "union",
            CsgOp::Intersection => "intersection",
            CsgOp::Difference => "difference",
        };

        write!(f, "{}", name)
    }
}

#[test]
fn csg_rules_for_every_state() {
    use CsgOp::*;

    // (op, lhit, inl, inr, expected)
    let table = [
        (Union, true,  true,  true,  false),
        (Union, true,  true,  false, true),
        (Union, true,  false, true,  false),
        (Union, true,  false, false, true),
        (Union, false, true,  true,  false),
        (Union, false, true,  false, false),
        (Union, false, false, true,  true),
        (Union, false, false, false, true),

        (Intersection, true,  true,  true,  true),
        (Intersection, true,  true,  false, false),
        (Intersection, true,  false, true,  true),
        (Intersection, true,  false, false, false),
        (Intersection, false, true,  true,  true),
        (Intersection, false, true,  false, true),
        (Intersection, false, false, true,  false),
        (Intersection, false, false, false, false),

        (Difference, true,  true,  true,  false),
        (Difference, true,  true,  false, true),
        (Difference, true,  false, true,  false),
        (Difference, true,  false, false, true),
        (Difference, false, true,  true,  true),
        (Difference, false, true,  false, true),
        (Difference, false, false, true,  false),
        (Difference, false, false, false, false),
    ];

    for (op, lhit, inl, inr, expected) in table {
        assert_eq!(op.intersection_allowed(lhit, inl, inr), expected,
            "{} lhit={} inl={} inr={}", op, lhit, inl, inr);
    }
}

#[test]
fn filtering_a_list_of_intersections() {
    use crate::shape::ShapeId;
    use slotmap::SlotMap;

    let mut keys: SlotMap<ShapeId, ()> = SlotMap::with_key();
    let left = keys.insert(());
    let right = keys.insert(());

    let xs: Intersections = vec![
        Intersection::new(1.0, left),
        Intersection::new(2.0, right),
        Intersection::new(3.0, left),
        Intersection::new(4.0, right),
    ].into();

    let cases = [
        (CsgOp::Union, 0, 3),
        (CsgOp::Intersection, 1, 2),
        (CsgOp::Difference, 0, 1),
    ];

    for (op, x0, x1) in cases {
        let result = op.filter_intersections(&xs, |i| i.object == left);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0], xs[x0]);
        assert_eq!(result[1], xs[x1]);
    }
}

#[test]
fn operation_names_round_trip_through_from_str() {
    assert_eq!("union".parse::<CsgOp>().unwrap(), CsgOp::Union);
    assert_eq!("difference".parse::<CsgOp>().unwrap(), CsgOp::Difference);

    match "xor".parse::<CsgOp>() {
        Err(SceneError::UnknownCsgOperation(name)) => assert_eq!(name, "xor"),
        other => panic!("expected an unknown operation error, got {:?}", other),
    }
}
