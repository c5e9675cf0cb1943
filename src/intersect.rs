use std::ops::Index;

use crate::consts::{ FEQ_EPSILON, VACUUM_RI };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::ShapeId;
use crate::arena::ShapeArena;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter
/// `t` is analogous to `t` for a ray (the offset from the ray origin).
///
/// `object` is the key of the primitive that was hit, never of a group or a
/// CSG. `uv` is only set for triangles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub object: ShapeId,
    pub uv: Option<(f64, f64)>,
}

impl Intersection {
    pub fn new(t: f64, object: ShapeId) -> Intersection {
        Intersection { t, object, uv: None }
    }

    /// Creates an intersection carrying barycentric coordinates.
    pub fn new_uv(t: f64, object: ShapeId, u: f64, v: f64) -> Intersection {
        Intersection { t, object, uv: Some((u, v)) }
    }
}

/// A collection of intersections.
///
/// Mostly a wrapper for a vector of `Intersection` objects. Lists produced by
/// shapes and worlds are sorted by ascending `t`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Intersections {
    pub intersections: Vec<Intersection>,
}

impl Intersections {
    /// Creates a new list of intersections.
    pub fn new() -> Intersections {
        Intersections { intersections: Vec::new() }
    }

    /// Merges several lists into a single sorted list.
    pub fn aggregate(all: Vec<Intersections>) -> Intersections {
        let mut is: Intersections = all.into_iter()
            .flat_map(|i| i.intersections)
            .collect();
        is.sort();
        is
    }

    /// Returns the visible hit: the intersection with the lowest positive
    /// `t`, if any.
    ///
    /// Intersections behind the ray origin are never chosen, though they
    /// stay in the list for refraction bookkeeping.
    pub fn hit(&self) -> Option<Intersection> {
        self.intersections.iter()
            .filter(|i| i.t > 0.0 && i.t.is_finite())
            .min_by(|a, b| a.t.total_cmp(&b.t))
            .copied()
    }

    /// Sorts the intersections by `t`, ignoring `f64` semantics.
    pub fn sort(&mut self) {
        self.intersections.sort_by(|a, b|
            a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal)
        );
    }

    pub fn push(&mut self, i: Intersection) {
        self.intersections.push(i);
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intersection> {
        self.intersections.iter()
    }
}

impl From<Vec<Intersection>> for Intersections {
    fn from(intersections: Vec<Intersection>) -> Intersections {
        Intersections { intersections }
    }
}

impl FromIterator<Intersection> for Intersections {
    fn from_iter<I: IntoIterator<Item = Intersection>>(iter: I)
        -> Intersections {
        Intersections { intersections: iter.into_iter().collect() }
    }
}

impl Index<usize> for Intersections {
    type Output = Intersection;

    fn index(&self, i: usize) -> &Intersection {
        &self.intersections[i]
    }
}

/// A record for computations associated with an `Intersection`.
///
/// Mostly a superset of an `Intersection`; everything shading needs to know
/// about one hit, in world space.
#[derive(Copy, Clone, Debug)]
pub struct IntersectionComputation {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The object being intersected.
    pub object: ShapeId,

    /// Barycentric coordinates of the hit, for triangles.
    pub uv: Option<(f64, f64)>,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the intersected surface. Used to prevent an
    /// object from shadowing itself (this causes "acne").
    pub over_point: Tuple4D,

    /// A point slightly below the intersected surface. Used as the origin of
    /// refracted rays.
    pub under_point: Tuple4D,

    /// The eye vector for the intersection.
    pub eyev: Tuple4D,

    /// The normal vector of the object being intersected, facing the eye.
    pub normalv: Tuple4D,

    /// The intersection ray, reflected across the normal.
    pub reflectv: Tuple4D,

    /// Whether the ray started inside the object.
    pub inside: bool,

    /// The refractive index of the material being exited.
    pub n1: f64,

    /// The refractive index of the material being entered.
    pub n2: f64,
}

impl IntersectionComputation {
    /// Prepares a hit for shading.
    ///
    /// `is` is the full sorted list the hit was chosen from, used to work
    /// out the refractive indices on either side of the surface. Without it,
    /// the hit is treated as the only crossing.
    pub fn new(arena: &ShapeArena, r: &Ray4D, hit: &Intersection,
        is: Option<&Intersections>) -> IntersectionComputation {
        let t = hit.t;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = arena.normal_at(hit.object, point, hit.uv);

        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * FEQ_EPSILON;
        let under_point = point - normalv * FEQ_EPSILON;

        let reflectv = r.direction.reflect(&normalv);

        let (n1, n2) = match is {
            Some(xs) => Self::refraction_indices(arena, hit, xs),
            None => Self::refraction_indices(arena, hit, &vec![*hit].into()),
        };

        IntersectionComputation {
            t,
            object: hit.object,
            uv: hit.uv,
            point, over_point, under_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
        }
    }

    fn refraction_indices(arena: &ShapeArena, hit: &Intersection,
        is: &Intersections) -> (f64, f64) {
        let innermost = |containers: &Vec<ShapeId>| {
            containers.last()
                .map(|&id| arena[id].material.refractive_index)
                .unwrap_or(VACUUM_RI)
        };

        let mut n1 = VACUUM_RI;
        let mut n2 = VACUUM_RI;

        // Objects the ray has entered but not yet left.
        let mut containers: Vec<ShapeId> = Vec::new();

        for i in is.iter() {
            if i == hit {
                n1 = innermost(&containers);
            }

            match containers.iter().position(|&x| x == i.object) {
                Some(j) => { containers.remove(j); },
                None => containers.push(i.object),
            }

            if i == hit {
                n2 = innermost(&containers);
                break;
            }
        }

        (n1, n2)
    }

    /// Calculates the reflectance of a hit with Schlick's approximation.
    ///
    /// The reflectance is a number between 0 and 1, representing what
    /// fraction of the light is reflected for the hit.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection can only occur if n1 > n2.
        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n.powi(2) * (1.0 - cos.powi(2));
            if sin2_t > 1.0 {
                return 1.0;
            }

            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

#[cfg(test)]
use crate::{ feq, shape::Shape, matrix::Matrix4D, light::Material };

#[test]
fn hit_skips_negative_and_zero_t() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::sphere());

    let xs: Intersections = vec![
        Intersection::new(-1.0, s),
        Intersection::new(1.0, s),
    ].into();
    assert_eq!(xs.hit(), Some(xs[1]));

    let xs: Intersections = vec![
        Intersection::new(-2.0, s),
        Intersection::new(-1.0, s),
        Intersection::new(0.0, s),
    ].into();
    assert_eq!(xs.hit(), None);
}

#[test]
fn hit_is_lowest_positive_in_any_order() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::sphere());

    let xs: Intersections = vec![
        Intersection::new(5.0, s),
        Intersection::new(7.0, s),
        Intersection::new(-3.0, s),
        Intersection::new(2.0, s),
    ].into();

    assert_eq!(xs.hit(), Some(xs[3]));
}

#[test]
fn aggregate_sorts_every_list() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::sphere());

    let a: Intersections = vec![Intersection::new(3.0, s)].into();
    let b: Intersections = vec![
        Intersection::new(-1.0, s),
        Intersection::new(2.0, s),
    ].into();

    let ts: Vec<f64> = Intersections::aggregate(vec![a, b])
        .iter()
        .map(|i| i.t)
        .collect();
    assert_eq!(ts, vec![-1.0, 2.0, 3.0]);
}

#[test]
fn hit_outside_and_inside() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::sphere());

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let comps = IntersectionComputation::new(&arena, &r,
        &Intersection::new(4.0, s), None);

    assert!(!comps.inside);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let comps = IntersectionComputation::new(&arena, &r,
        &Intersection::new(1.0, s), None);

    assert!(comps.inside);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn over_and_under_points_straddle_the_surface() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)));

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(5.0, s);
    let comps = IntersectionComputation::new(&arena, &r, &i, None);

    assert!(comps.over_point.z < -FEQ_EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
    assert!(comps.under_point.z > FEQ_EPSILON / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn reflection_vector_off_a_plane() {
    let mut arena = ShapeArena::new();
    let p = arena.insert(Shape::plane());

    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 1.0, -1.0),
        Tuple4D::vector(0.0, -k, k));
    let comps = IntersectionComputation::new(&arena, &r,
        &Intersection::new(2.0f64.sqrt(), p), None);

    assert_eq!(comps.reflectv, Tuple4D::vector(0.0, k, k));
}

#[test]
fn refractive_indices_at_nested_surfaces() {
    let mut arena = ShapeArena::new();

    let glass = |ri: f64| Material {
        refractive_index: ri,
        ..Material::glass()
    };

    let a = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0))
        .with_material(glass(1.5)));
    let b = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, -0.25))
        .with_material(glass(2.0)));
    let c = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 0.25))
        .with_material(glass(2.5)));

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -4.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let xs: Intersections = vec![
        Intersection::new(2.0, a),
        Intersection::new(2.75, b),
        Intersection::new(3.25, c),
        Intersection::new(4.75, b),
        Intersection::new(5.25, c),
        Intersection::new(6.0, a),
    ].into();

    let expected = [
        (1.0, 1.5), (1.5, 2.0), (2.0, 2.5),
        (2.5, 2.5), (2.5, 1.5), (1.5, 1.0),
    ];

    for (i, (n1, n2)) in expected.iter().enumerate() {
        let comps = IntersectionComputation::new(&arena, &r, &xs[i], Some(&xs));
        assert!(feq(comps.n1, *n1), "n1 at {}: {}", i, comps.n1);
        assert!(feq(comps.n2, *n2), "n2 at {}: {}", i, comps.n2);
    }
}

#[test]
fn schlick_under_total_internal_reflection() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::glass_sphere());

    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, k),
        Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-k, s),
        Intersection::new(k, s),
    ].into();

    let comps = IntersectionComputation::new(&arena, &r, &xs[1], Some(&xs));
    assert_eq!(comps.schlick(), 1.0);
}

#[test]
fn schlick_with_perpendicular_ray() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::glass_sphere());

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-1.0, s),
        Intersection::new(1.0, s),
    ].into();

    let comps = IntersectionComputation::new(&arena, &r, &xs[1], Some(&xs));
    assert!(feq(comps.schlick(), 0.04));
}

#[test]
fn schlick_with_small_angle_and_n2_greater() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::glass_sphere());

    let r = Ray4D::new(Tuple4D::point(0.0, 0.99, -2.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let xs: Intersections = vec![Intersection::new(1.8589, s)].into();

    let comps = IntersectionComputation::new(&arena, &r, &xs[0], Some(&xs));
    assert!(feq(comps.schlick(), 0.48873));
}
