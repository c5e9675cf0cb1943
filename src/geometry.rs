use crate::tuple::Tuple4D;

/// Precomputed data for a flat triangle.
///
/// The edge vectors and the face normal never change once the vertices are
/// fixed, so they are computed once here instead of on every intersection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub p1: Tuple4D,
    pub p2: Tuple4D,
    pub p3: Tuple4D,

    /// `p2 - p1`
    pub e1: Tuple4D,

    /// `p3 - p1`
    pub e2: Tuple4D,

    pub normal: Tuple4D,
}

impl TriangleInfo {
    pub fn new(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> TriangleInfo {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e2.cross(&e1).normalize();

        TriangleInfo { p1, p2, p3, e1, e2, normal }
    }
}

/// A triangle with a normal at each vertex.
///
/// Normals are interpolated across the face with the barycentric `u`/`v`
/// coordinates of a hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothTriangleInfo {
    pub triangle_info: TriangleInfo,

    pub n1: Tuple4D,
    pub n2: Tuple4D,
    pub n3: Tuple4D,
}

impl SmoothTriangleInfo {
    pub fn new(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D,
        n1: Tuple4D, n2: Tuple4D, n3: Tuple4D) -> SmoothTriangleInfo {
        SmoothTriangleInfo {
            triangle_info: TriangleInfo::new(p1, p2, p3),
            n1: n1.as_vector(),
            n2: n2.as_vector(),
            n3: n3.as_vector(),
        }
    }

    /// Blends the vertex normals with weights `(1 - u - v, u, v)`.
    pub fn interpolate(&self, u: f64, v: f64) -> Tuple4D {
        (self.n2 * u + self.n3 * v + self.n1 * (1.0 - u - v)).normalize()
    }
}

#[test]
fn triangle_precomputes_edges_and_normal() {
    let t = TriangleInfo::new(
        Tuple4D::point( 0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point( 1.0, 0.0, 0.0),
    );

    assert_eq!(t.e1, Tuple4D::vector(-1.0, -1.0, 0.0));
    assert_eq!(t.e2, Tuple4D::vector( 1.0, -1.0, 0.0));
    assert_eq!(t.normal, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn smooth_triangle_interpolates_vertex_normals() {
    let st = SmoothTriangleInfo::new(
        Tuple4D::point( 0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point( 1.0, 0.0, 0.0),
        Tuple4D::vector( 0.0, 1.0, 0.0),
        Tuple4D::vector(-1.0, 0.0, 0.0),
        Tuple4D::vector( 1.0, 0.0, 0.0),
    );

    assert_eq!(st.interpolate(0.45, 0.25),
        Tuple4D::vector(-0.5547, 0.83205, 0.0));
}
