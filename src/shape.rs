use crate::consts::FEQ_EPSILON;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::light::Material;
use crate::matrix::Matrix4D;
use crate::csg::CsgOp;
use crate::intersect::{ Intersection, Intersections };
use crate::geometry::{ TriangleInfo, SmoothTriangleInfo };

slotmap::new_key_type! {
    /// A non-owning handle to a shape stored in a `ShapeArena`.
    ///
    /// Intersections, parent links, group children and CSG operands all refer
    /// to shapes through this key.
    pub struct ShapeId;
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// A unit sphere with its center at the object-space origin.
    Sphere,

    /// The XZ plane through the object-space origin, with normal +Y.
    Plane,

    /// A 2-by-2-by-2 cube with its center at the object-space origin.
    Cube,

    /// A unit-radius cylinder around the Y axis, truncated to
    /// `(minimum, maximum)` and optionally capped.
    Cylinder { minimum: f64, maximum: f64, closed: bool },

    /// A double cone with its apex at the origin, truncated and optionally
    /// capped like the cylinder. Its radius at height `y` is `|y|`.
    Cone { minimum: f64, maximum: f64, closed: bool },

    /// A flat triangle. See `TriangleInfo`.
    Triangle(TriangleInfo),

    /// A triangle with interpolated vertex normals. See `SmoothTriangleInfo`.
    SmoothTriangle(SmoothTriangleInfo),

    /// An ordered group of child shapes. Can include other groups.
    Group(Vec<ShapeId>),

    /// A boolean combination of a left and a right operand.
    Csg(CsgOp, ShapeId, ShapeId),
}

/// A shape, as stored in a `ShapeArena`.
///
/// Every shape carries a transform from its own local space into the space
/// of its parent (or world space for root shapes). The inverse is computed
/// once when the transform is assigned, since it is needed for every ray.
#[derive(Clone, Debug)]
pub struct Shape {
    pub kind: ShapeKind,
    pub material: Material,

    transform: Matrix4D,
    inverse: Matrix4D,
    pub(crate) parent: Option<ShapeId>,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Shape {
        Shape {
            kind,
            material: Default::default(),
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            parent: None,
        }
    }

    /// Creates a unit sphere with identity transform and default material.
    pub fn sphere() -> Shape {
        Shape::new(ShapeKind::Sphere)
    }

    /// Creates a sphere made of glass. Handy for refraction scenes.
    pub fn glass_sphere() -> Shape {
        Shape::sphere().with_material(Material::glass())
    }

    pub fn plane() -> Shape {
        Shape::new(ShapeKind::Plane)
    }

    pub fn cube() -> Shape {
        Shape::new(ShapeKind::Cube)
    }

    /// Creates an infinite, open cylinder.
    pub fn cylinder() -> Shape {
        Shape::bounded_cylinder(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Creates an open cylinder truncated to `(minimum, maximum)`.
    pub fn bounded_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cylinder { minimum, maximum, closed: false })
    }

    /// Creates a cylinder truncated to `(minimum, maximum)` with end caps.
    pub fn capped_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cylinder { minimum, maximum, closed: true })
    }

    /// Creates an infinite, open double cone.
    pub fn cone() -> Shape {
        Shape::bounded_cone(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn bounded_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cone { minimum, maximum, closed: false })
    }

    pub fn capped_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cone { minimum, maximum, closed: true })
    }

    pub fn triangle(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> Shape {
        Shape::new(ShapeKind::Triangle(TriangleInfo::new(p1, p2, p3)))
    }

    pub fn smooth_triangle(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D,
        n1: Tuple4D, n2: Tuple4D, n3: Tuple4D) -> Shape {
        Shape::new(ShapeKind::SmoothTriangle(
            SmoothTriangleInfo::new(p1, p2, p3, n1, n2, n3)
        ))
    }

    /// Creates an empty group. Children are added through the arena, so that
    /// their parent links get set.
    pub fn group() -> Shape {
        Shape::new(ShapeKind::Group(Vec::new()))
    }

    /// Builder-style variant of `set_transform`.
    pub fn with_transform(mut self, transform: Matrix4D) -> Shape {
        self.set_transform(transform);
        self
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    pub fn inverse(&self) -> &Matrix4D {
        &self.inverse
    }

    /// Assigns the local-to-parent transform of this shape.
    ///
    /// # Panics
    ///
    /// Panics if `transform` is singular; a shape without an inverse
    /// transform cannot be intersected.
    pub fn set_transform(&mut self, transform: Matrix4D) {
        self.inverse = transform.inverse().expect(
            "Transformation matrix on shape should be invertible."
        );
        self.transform = transform;
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    /// Returns the children of a group, or `None` for any other kind.
    pub fn children(&self) -> Option<&Vec<ShapeId>> {
        match self.kind {
            ShapeKind::Group(ref children) => Some(children),
            _ => None,
        }
    }

    /// Returns whether this shape owns other shapes (a group or a CSG).
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, ShapeKind::Group(_) | ShapeKind::Csg(..))
    }

    /// Intersects a ray, already in this shape's local space, with a
    /// primitive.
    ///
    /// `id` is the key of this shape, recorded in every intersection.
    ///
    /// # Panics
    ///
    /// Groups and CSGs are intersected by the arena, which recurses into
    /// their children; calling this on them panics.
    pub fn local_intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        match self.kind {
            ShapeKind::Sphere => intersect_sphere(id, ray),
            ShapeKind::Plane => intersect_plane(id, ray),
            ShapeKind::Cube => intersect_cube(id, ray),
            ShapeKind::Cylinder { minimum, maximum, closed }
                => intersect_cylinder(id, ray, minimum, maximum, closed),
            ShapeKind::Cone { minimum, maximum, closed }
                => intersect_cone(id, ray, minimum, maximum, closed),
            ShapeKind::Triangle(ref ti) => intersect_triangle(ray, ti)
                .map(|(t, _, _)| Intersection::new(t, id))
                .into_iter()
                .collect(),
            ShapeKind::SmoothTriangle(ref sti)
                => intersect_triangle(ray, &sti.triangle_info)
                .map(|(t, u, v)| Intersection::new_uv(t, id, u, v))
                .into_iter()
                .collect(),
            ShapeKind::Group(_) | ShapeKind::Csg(..) => panic!(
                "Composite shapes should be intersected through their arena."
            ),
        }
    }

    /// Obtains the normal vector of a primitive at a local-space point.
    ///
    /// `uv` holds the barycentric coordinates of the hit, used by smooth
    /// triangles; without them a smooth triangle falls back to its flat
    /// normal.
    pub fn local_normal_at(&self, at: &Tuple4D, uv: Option<(f64, f64)>)
        -> Tuple4D {
        match self.kind {
            ShapeKind::Sphere => Tuple4D { w: 0.0, ..*at },
            ShapeKind::Plane => Tuple4D::vector(0.0, 1.0, 0.0),
            ShapeKind::Cube => normal_at_cube(at),
            ShapeKind::Cylinder { minimum, maximum, .. }
                => normal_at_cylinder(at, minimum, maximum),
            ShapeKind::Cone { minimum, maximum, .. }
                => normal_at_cone(at, minimum, maximum),
            ShapeKind::Triangle(ref ti) => ti.normal,
            ShapeKind::SmoothTriangle(ref sti) => match uv {
                Some((u, v)) => sti.interpolate(u, v),
                None => sti.triangle_info.normal,
            },

            // Groups and CSGs defer intersections to their children, so no
            // hit ever refers to them.
            ShapeKind::Group(_) | ShapeKind::Csg(..) => panic!(
                "Local normal calculations should never occur on composites."
            ),
        }
    }
}

/// Checks whether a ray intersects the unit sphere.
///
/// Returns either no intersections or two; a tangent ray produces two equal
/// values.
fn intersect_sphere(id: ShapeId, ray: &Ray4D) -> Intersections {
    // Subtracting the origin point drops the 'w' part of the ray origin.
    let sphere_to_ray = ray.origin - Tuple4D::origin();

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

    let discriminant = b.powi(2) - (4.0 * a * c);
    if discriminant < 0.0 {
        return Intersections::new();
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

    vec![Intersection::new(t1, id), Intersection::new(t2, id)].into()
}

fn intersect_plane(id: ShapeId, ray: &Ray4D) -> Intersections {
    // Parallel and coplanar rays both miss.
    if ray.direction.y.abs() < FEQ_EPSILON {
        return Intersections::new();
    }

    let t = -ray.origin.y / ray.direction.y;
    vec![Intersection::new(t, id)].into()
}

fn intersect_cube(id: ShapeId, ray: &Ray4D) -> Intersections {
    let (xtmin, xtmax) = check_cube_axis(ray.origin.x, ray.direction.x);
    let (ytmin, ytmax) = check_cube_axis(ray.origin.y, ray.direction.y);
    let (ztmin, ztmax) = check_cube_axis(ray.origin.z, ray.direction.z);

    let tmin = xtmin.max(ytmin).max(ztmin);
    let tmax = xtmax.min(ytmax).min(ztmax);

    if tmin > tmax {
        return Intersections::new();
    }

    vec![Intersection::new(tmin, id), Intersection::new(tmax, id)].into()
}

/// Gets where a ray crosses the two slab planes of one cube axis.
///
/// Takes one component of a ray's origin and direction, e.g. `origin.x` and
/// `direction.x`. The smaller `t` is first in the tuple.
fn check_cube_axis(origin: f64, direction: f64) -> (f64, f64) {
    let tmin_numerator = -1.0 - origin;
    let tmax_numerator =  1.0 - origin;

    let (tmin, tmax) = if direction.abs() >= FEQ_EPSILON {
        (tmin_numerator / direction, tmax_numerator / direction)
    } else {
        (tmin_numerator * f64::INFINITY, tmax_numerator * f64::INFINITY)
    };

    if tmin > tmax { (tmax, tmin) } else { (tmin, tmax) }
}

fn normal_at_cube(p: &Tuple4D) -> Tuple4D {
    let xa = p.x.abs();
    let ya = p.y.abs();
    let za = p.z.abs();

    // Ties go to x, then y.
    let max_component = xa.max(ya).max(za);
    if max_component == xa {
        Tuple4D::vector(p.x.signum(), 0.0, 0.0)
    } else if max_component == ya {
        Tuple4D::vector(0.0, p.y.signum(), 0.0)
    } else {
        Tuple4D::vector(0.0, 0.0, p.z.signum())
    }
}

/// Keeps the roots of a quadric whose height lies strictly between the
/// truncation bounds.
fn truncated_roots(id: ShapeId, ray: &Ray4D, a: f64, b: f64, c: f64,
    minimum: f64, maximum: f64) -> Intersections {
    let disc = b.powi(2) - 4.0 * a * c;
    if disc < 0.0 {
        return Intersections::new();
    }

    let mut t0 = (-b - disc.sqrt()) / (2.0 * a);
    let mut t1 = (-b + disc.sqrt()) / (2.0 * a);
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }

    let mut is = Intersections::new();
    for t in [t0, t1] {
        let y = ray.origin.y + t * ray.direction.y;
        if minimum < y && y < maximum {
            is.push(Intersection::new(t, id));
        }
    }

    is
}

fn intersect_cylinder(id: ShapeId, ray: &Ray4D, minimum: f64, maximum: f64,
    closed: bool) -> Intersections {
    let a = ray.direction.x.powi(2) + ray.direction.z.powi(2);

    // Parallel to the Y axis; only the caps can be hit.
    if a < FEQ_EPSILON {
        let mut is = Intersections::new();
        intersect_caps(id, ray, minimum, maximum, closed, &mut is,
            |_| 1.0);
        return is;
    }

    let b = 2.0 * ray.origin.x * ray.direction.x
          + 2.0 * ray.origin.z * ray.direction.z;
    let c = ray.origin.x.powi(2) + ray.origin.z.powi(2) - 1.0;

    let mut is = truncated_roots(id, ray, a, b, c, minimum, maximum);
    intersect_caps(id, ray, minimum, maximum, closed, &mut is, |_| 1.0);
    is.sort();
    is
}

fn normal_at_cylinder(at: &Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
    // Square of the distance from the Y axis.
    let dist = at.x.powi(2) + at.z.powi(2);

    if dist < 1.0 && at.y >= maximum - FEQ_EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < 1.0 && at.y <= minimum + FEQ_EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        Tuple4D::vector(at.x, 0.0, at.z)
    }
}

fn intersect_cone(id: ShapeId, ray: &Ray4D, minimum: f64, maximum: f64,
    closed: bool) -> Intersections {
    let a = ray.direction.x.powi(2)
          - ray.direction.y.powi(2)
          + ray.direction.z.powi(2);

    let b = 2.0 * ray.origin.x * ray.direction.x
          - 2.0 * ray.origin.y * ray.direction.y
          + 2.0 * ray.origin.z * ray.direction.z;

    let c = ray.origin.x.powi(2)
          - ray.origin.y.powi(2)
          + ray.origin.z.powi(2);

    let mut is = if a.abs() < FEQ_EPSILON {
        // Parallel to one nappe: a single crossing, unless b is zero too.
        let mut is = Intersections::new();
        if b.abs() >= FEQ_EPSILON {
            let t = -c / (2.0 * b);
            let y = ray.origin.y + t * ray.direction.y;
            if minimum < y && y < maximum {
                is.push(Intersection::new(t, id));
            }
        }
        is
    } else {
        truncated_roots(id, ray, a, b, c, minimum, maximum)
    };

    // The cap radius is the cone's radius at that height.
    intersect_caps(id, ray, minimum, maximum, closed, &mut is,
        |y: f64| y.abs());
    is.sort();
    is
}

fn normal_at_cone(at: &Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
    let dist = at.x.powi(2) + at.z.powi(2);

    if dist < maximum.powi(2) && at.y >= maximum - FEQ_EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < minimum.powi(2) && at.y <= minimum + FEQ_EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        let mut y = dist.sqrt();
        if at.y > 0.0 {
            y = -y;
        }

        Tuple4D::vector(at.x, y, at.z)
    }
}

/// Tests the end caps of a cylinder or cone.
///
/// `radius` gives the cap radius at a cap's height.
fn intersect_caps<F>(id: ShapeId, ray: &Ray4D, minimum: f64, maximum: f64,
    closed: bool, is: &mut Intersections, radius: F)
where
    F: Fn(f64) -> f64,
{
    if !closed || ray.direction.y.abs() < FEQ_EPSILON {
        return;
    }

    for cap in [minimum, maximum] {
        let t = (cap - ray.origin.y) / ray.direction.y;
        let x = ray.origin.x + t * ray.direction.x;
        let z = ray.origin.z + t * ray.direction.z;

        if x.powi(2) + z.powi(2) <= radius(cap).powi(2) {
            is.push(Intersection::new(t, id));
        }
    }
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns `t` and the barycentric `u`/`v` of the hit, if any.
fn intersect_triangle(ray: &Ray4D, ti: &TriangleInfo)
    -> Option<(f64, f64, f64)> {
    let dir_cross_e2 = ray.direction.cross(&ti.e2);
    let determinant = ti.e1.dot(&dir_cross_e2);

    // The ray is parallel to the triangle.
    if determinant.abs() < FEQ_EPSILON {
        return None;
    }

    let f = 1.0 / determinant;
    let p1_to_origin = ray.origin - ti.p1;
    let u = f * p1_to_origin.dot(&dir_cross_e2);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let origin_cross_e1 = p1_to_origin.cross(&ti.e1);
    let v = f * ray.direction.dot(&origin_cross_e1);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * ti.e2.dot(&origin_cross_e1);
    Some((t, u, v))
}

#[cfg(test)]
fn ts(s: &Shape, origin: Tuple4D, direction: Tuple4D) -> Vec<f64> {
    let r = Ray4D::new(origin, direction.normalize());
    s.local_intersect(ShapeId::default(), &r)
        .iter()
        .map(|i| i.t)
        .collect()
}

#[cfg(test)]
fn assert_ts(actual: Vec<f64>, expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!(crate::feq(*a, *e), "{:?} vs {:?}", actual, expected);
    }
}

#[test]
fn ray_intersects_sphere_at_two_points() {
    let s = Shape::sphere();
    assert_ts(ts(&s, Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[4.0, 6.0]);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let s = Shape::sphere();
    assert_ts(ts(&s, Tuple4D::point(0.0, 1.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[5.0, 5.0]);
}

#[test]
fn ray_misses_sphere() {
    let s = Shape::sphere();
    assert_ts(ts(&s, Tuple4D::point(0.0, 2.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[]);
}

#[test]
fn ray_inside_and_ahead_of_sphere() {
    let s = Shape::sphere();
    assert_ts(ts(&s, Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0)),
        &[-1.0, 1.0]);
    assert_ts(ts(&s, Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[-6.0, -4.0]);
}

#[test]
fn normal_on_sphere_is_the_point() {
    let s = Shape::sphere();
    let k = 3.0f64.sqrt() / 3.0;
    let n = s.local_normal_at(&Tuple4D::point(k, k, k), None);

    assert_eq!(n, Tuple4D::vector(k, k, k));
}

#[test]
fn ray_parallel_or_coplanar_to_plane() {
    let p = Shape::plane();
    assert_ts(ts(&p, Tuple4D::point(0.0, 10.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[]);
    assert_ts(ts(&p, Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0)), &[]);
}

#[test]
fn ray_intersects_plane_from_above_and_below() {
    let p = Shape::plane();
    assert_ts(ts(&p, Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::vector(0.0, -1.0, 0.0)), &[1.0]);
    assert_ts(ts(&p, Tuple4D::point(0.0, -1.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)), &[1.0]);
}

#[test]
fn normal_on_plane_is_constant() {
    let p = Shape::plane();
    for at in [Tuple4D::origin(), Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::point(-5.0, 0.0, 150.0)] {
        assert_eq!(p.local_normal_at(&at, None), Tuple4D::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn ray_intersects_each_cube_face() {
    let c = Shape::cube();
    let cases = [
        (( 5.0,  0.5,  0.0), (-1.0,  0.0,  0.0), [ 4.0, 6.0]),
        ((-5.0,  0.5,  0.0), ( 1.0,  0.0,  0.0), [ 4.0, 6.0]),
        (( 0.5,  5.0,  0.0), ( 0.0, -1.0,  0.0), [ 4.0, 6.0]),
        (( 0.5, -5.0,  0.0), ( 0.0,  1.0,  0.0), [ 4.0, 6.0]),
        (( 0.5,  0.0,  5.0), ( 0.0,  0.0, -1.0), [ 4.0, 6.0]),
        (( 0.5,  0.0, -5.0), ( 0.0,  0.0,  1.0), [ 4.0, 6.0]),
        (( 0.0,  0.5,  0.0), ( 0.0,  0.0,  1.0), [-1.0, 1.0]),
    ];

    for ((ox, oy, oz), (dx, dy, dz), expected) in cases {
        assert_ts(ts(&c, Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz)), &expected);
    }
}

#[test]
fn ray_misses_cube() {
    let c = Shape::cube();
    let cases = [
        ((-2.0,  0.0,  0.0), ( 0.2673,  0.5345,  0.8018)),
        (( 0.0, -2.0,  0.0), ( 0.8018,  0.2673,  0.5345)),
        (( 0.0,  0.0, -2.0), ( 0.5345,  0.8018,  0.2673)),
        (( 2.0,  0.0,  2.0), ( 0.0,     0.0,    -1.0)),
        (( 0.0,  2.0,  2.0), ( 0.0,    -1.0,     0.0)),
        (( 2.0,  2.0,  0.0), (-1.0,     0.0,     0.0)),
    ];

    for ((ox, oy, oz), (dx, dy, dz)) in cases {
        assert_ts(ts(&c, Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz)), &[]);
    }
}

#[test]
fn normal_on_cube_surface() {
    let c = Shape::cube();
    let cases = [
        (( 1.0,  0.5, -0.8), ( 1.0,  0.0,  0.0)),
        ((-1.0, -0.2,  0.9), (-1.0,  0.0,  0.0)),
        ((-0.4,  1.0, -0.1), ( 0.0,  1.0,  0.0)),
        (( 0.3, -1.0, -0.7), ( 0.0, -1.0,  0.0)),
        ((-0.6,  0.3,  1.0), ( 0.0,  0.0,  1.0)),
        (( 0.4,  0.4, -1.0), ( 0.0,  0.0, -1.0)),
        (( 1.0,  1.0,  1.0), ( 1.0,  0.0,  0.0)),
        ((-1.0, -1.0, -1.0), (-1.0,  0.0,  0.0)),
    ];

    for ((px, py, pz), (nx, ny, nz)) in cases {
        assert_eq!(c.local_normal_at(&Tuple4D::point(px, py, pz), None),
            Tuple4D::vector(nx, ny, nz));
    }
}

#[test]
fn ray_misses_cylinder() {
    let c = Shape::cylinder();
    assert_ts(ts(&c, Tuple4D::point(1.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)), &[]);
    assert_ts(ts(&c, Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0)), &[]);
    assert_ts(ts(&c, Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(1.0, 1.0, 1.0)), &[]);
}

#[test]
fn ray_strikes_cylinder() {
    let c = Shape::cylinder();
    assert_ts(ts(&c, Tuple4D::point(1.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[5.0, 5.0]);
    assert_ts(ts(&c, Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[4.0, 6.0]);
    assert_ts(ts(&c, Tuple4D::point(0.5, 0.0, -5.0),
        Tuple4D::vector(0.1, 1.0, 1.0)), &[6.80798, 7.08872]);
}

#[test]
fn truncated_cylinder_excludes_its_bounds() {
    let c = Shape::bounded_cylinder(1.0, 2.0);
    let cases = [
        ((0.0, 1.5,  0.0), (0.1, 1.0, 0.0), 0),
        ((0.0, 3.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 2.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.5, -2.0), (0.0, 0.0, 1.0), 2),
    ];

    for ((ox, oy, oz), (dx, dy, dz), count) in cases {
        let hits = ts(&c, Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz));
        assert_eq!(hits.len(), count);
    }
}

#[test]
fn capped_cylinder_hits_its_caps() {
    let c = Shape::capped_cylinder(1.0, 2.0);
    let cases = [
        ((0.0,  3.0,  0.0), (0.0, -1.0, 0.0), 2),
        ((0.0,  3.0, -2.0), (0.0, -1.0, 2.0), 2),
        ((0.0,  4.0, -2.0), (0.0, -1.0, 1.0), 2),
        ((0.0,  0.0, -2.0), (0.0,  1.0, 2.0), 2),
        ((0.0, -1.0, -2.0), (0.0,  1.0, 1.0), 2),
    ];

    for ((ox, oy, oz), (dx, dy, dz), count) in cases {
        let hits = ts(&c, Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz));
        assert_eq!(hits.len(), count);
    }
}

#[test]
fn normal_on_cylinder_side_and_caps() {
    let c = Shape::capped_cylinder(1.0, 2.0);
    let cases = [
        ((1.0, 1.5,  0.0), ( 1.0,  0.0,  0.0)),
        ((0.0, 1.5, -1.0), ( 0.0,  0.0, -1.0)),
        ((0.0, 1.0,  0.0), ( 0.0, -1.0,  0.0)),
        ((0.5, 1.0,  0.0), ( 0.0, -1.0,  0.0)),
        ((0.0, 2.0,  0.0), ( 0.0,  1.0,  0.0)),
        ((0.0, 2.0,  0.5), ( 0.0,  1.0,  0.0)),
    ];

    for ((px, py, pz), (nx, ny, nz)) in cases {
        assert_eq!(c.local_normal_at(&Tuple4D::point(px, py, pz), None),
            Tuple4D::vector(nx, ny, nz));
    }
}

#[test]
fn ray_strikes_cone() {
    let c = Shape::cone();
    assert_ts(ts(&c, Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[5.0, 5.0]);
    assert_ts(ts(&c, Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(1.0, 1.0, 1.0)), &[8.66025, 8.66025]);
    assert_ts(ts(&c, Tuple4D::point(1.0, 1.0, -5.0),
        Tuple4D::vector(-0.5, -1.0, 1.0)), &[4.55006, 49.44994]);
}

#[test]
fn ray_parallel_to_one_cone_half() {
    let c = Shape::cone();
    assert_ts(ts(&c, Tuple4D::point(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 1.0, 1.0)), &[0.35355]);
}

#[test]
fn capped_cone_hits_its_caps() {
    let c = Shape::capped_cone(-0.5, 0.5);
    let cases = [
        ((0.0, 0.0, -5.0), (0.0, 1.0, 0.0), 0),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 1.0), 2),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 0.0), 4),
    ];

    for ((ox, oy, oz), (dx, dy, dz), count) in cases {
        let hits = ts(&c, Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz));
        assert_eq!(hits.len(), count);
    }
}

#[test]
fn normal_on_cone_side() {
    let c = Shape::cone();
    let k = 2.0f64.sqrt();
    let cases = [
        (( 0.0,  0.0, 0.0), (0.0,  0.0, 0.0)),
        (( 1.0,  1.0, 1.0), (1.0,   -k, 1.0)),
        ((-1.0, -1.0, 0.0), (-1.0, 1.0, 0.0)),
    ];

    for ((px, py, pz), (nx, ny, nz)) in cases {
        assert_eq!(c.local_normal_at(&Tuple4D::point(px, py, pz), None),
            Tuple4D::vector(nx, ny, nz));
    }
}

#[cfg(test)]
fn test_triangle() -> Shape {
    Shape::triangle(
        Tuple4D::point( 0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point( 1.0, 0.0, 0.0),
    )
}

#[test]
fn ray_misses_triangle_edges_or_runs_parallel() {
    let t = test_triangle();
    let cases = [
        (( 0.0, -1.0, -2.0), (0.0, 1.0, 0.0)),
        (( 1.0,  1.0, -2.0), (0.0, 0.0, 1.0)),
        ((-1.0,  1.0, -2.0), (0.0, 0.0, 1.0)),
        (( 0.0, -1.0, -2.0), (0.0, 0.0, 1.0)),
    ];

    for ((ox, oy, oz), (dx, dy, dz)) in cases {
        assert_ts(ts(&t, Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz)), &[]);
    }
}

#[test]
fn ray_strikes_triangle() {
    let t = test_triangle();
    assert_ts(ts(&t, Tuple4D::point(0.0, 0.5, -2.0),
        Tuple4D::vector(0.0, 0.0, 1.0)), &[2.0]);
}

#[test]
fn triangle_normal_ignores_the_point() {
    let t = test_triangle();
    let n = Tuple4D::vector(0.0, 0.0, -1.0);

    assert_eq!(t.local_normal_at(&Tuple4D::point(0.0, 0.5, 0.0), None), n);
    assert_eq!(t.local_normal_at(&Tuple4D::point(-0.5, 0.75, 0.0), None), n);
}

#[cfg(test)]
fn test_smooth_triangle() -> Shape {
    Shape::smooth_triangle(
        Tuple4D::point( 0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point( 1.0, 0.0, 0.0),
        Tuple4D::vector( 0.0, 1.0, 0.0),
        Tuple4D::vector(-1.0, 0.0, 0.0),
        Tuple4D::vector( 1.0, 0.0, 0.0),
    )
}

#[test]
fn smooth_triangle_hit_stores_uv() {
    let t = test_smooth_triangle();
    let r = Ray4D::new(Tuple4D::point(-0.2, 0.3, -2.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = t.local_intersect(ShapeId::default(), &r);

    assert_eq!(xs.len(), 1);
    let (u, v) = xs[0].uv.unwrap();
    assert!(crate::feq(u, 0.45));
    assert!(crate::feq(v, 0.25));
}

#[test]
fn smooth_triangle_normal_uses_uv() {
    let t = test_smooth_triangle();
    let n = t.local_normal_at(&Tuple4D::origin(), Some((0.45, 0.25)));

    assert_eq!(n, Tuple4D::vector(-0.5547, 0.83205, 0.0));
}

#[test]
fn smooth_triangle_without_uv_is_flat() {
    let t = test_smooth_triangle();
    let n = t.local_normal_at(&Tuple4D::origin(), None);

    assert_eq!(n, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
#[should_panic]
fn singular_transform_is_rejected() {
    let _ = Shape::sphere().with_transform(Matrix4D::scaling(0.0, 1.0, 1.0));
}
