use crate::feq;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;

/// The shape of a pattern, along with the colors it alternates between.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PatternKind {
    /// Alternates between two colors on the parity of `floor(x)`.
    Stripe(Color, Color),

    /// Blends linearly from the first color to the second across each unit
    /// of `x`.
    Gradient(Color, Color),

    /// Concentric rings in the XZ plane.
    Ring(Color, Color),

    /// A 3D checkerboard of unit cubes.
    Checkers(Color, Color),

    /// Returns the pattern-space point as a color. Mostly for testing.
    Test,
}

/// A pattern: a function from a point to a color, with its own transform.
///
/// The transform places the pattern relative to the object it is applied
/// to. Its inverse is computed once, when the transform is assigned.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Pattern {
    pub fn new(kind: PatternKind) -> Pattern {
        Pattern {
            kind,
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
        }
    }

    pub fn stripe(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Stripe(a, b))
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Gradient(a, b))
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Ring(a, b))
    }

    pub fn checkers(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Checkers(a, b))
    }

    pub fn test() -> Pattern {
        Pattern::new(PatternKind::Test)
    }

    /// Builder-style variant of `set_transform`.
    pub fn with_transform(mut self, transform: Matrix4D) -> Pattern {
        self.set_transform(transform);
        self
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Assigns the pattern transform.
    ///
    /// # Panics
    ///
    /// Panics if `transform` is singular.
    pub fn set_transform(&mut self, transform: Matrix4D) {
        self.inverse = transform.inverse().expect(
            "Transformation matrix on pattern should be invertible."
        );
        self.transform = transform;
    }

    /// The color at a point already in pattern space.
    pub fn pattern_at(&self, p: Tuple4D) -> Color {
        match self.kind {
            PatternKind::Stripe(a, b) => {
                if is_even(p.x.floor()) { a } else { b }
            },

            PatternKind::Gradient(a, b) => {
                let fraction = p.x - p.x.floor();
                a + (b - a) * fraction
            },

            PatternKind::Ring(a, b) => {
                let distance = (p.x.powi(2) + p.z.powi(2)).sqrt();
                if is_even(distance.floor()) { a } else { b }
            },

            PatternKind::Checkers(a, b) => {
                let sum = p.x.floor() + p.y.floor() + p.z.floor();
                if is_even(sum) { a } else { b }
            },

            PatternKind::Test => Color::rgb(p.x, p.y, p.z),
        }
    }

    /// The color at a point in the local space of the object carrying this
    /// pattern.
    pub fn pattern_at_object(&self, object_point: Tuple4D) -> Color {
        self.pattern_at(self.inverse * object_point)
    }
}

fn is_even(n: f64) -> bool {
    feq(n.rem_euclid(2.0), 0.0)
}

#[test]
fn stripe_pattern_is_constant_along_y_and_z() {
    let pattern = Pattern::stripe(Color::WHITE, Color::BLACK);

    for i in 0..3 {
        let i = i as f64;
        assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, i, 0.0)), Color::WHITE);
        assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, i)), Color::WHITE);
    }
}

#[test]
fn stripe_pattern_alternates_along_x() {
    let pattern = Pattern::stripe(Color::WHITE, Color::BLACK);

    assert_eq!(pattern.pattern_at(Tuple4D::point( 0.0, 0.0, 0.0)), Color::WHITE);
    assert_eq!(pattern.pattern_at(Tuple4D::point( 0.9, 0.0, 0.0)), Color::WHITE);
    assert_eq!(pattern.pattern_at(Tuple4D::point( 1.0, 0.0, 0.0)), Color::BLACK);
    assert_eq!(pattern.pattern_at(Tuple4D::point(-0.1, 0.0, 0.0)), Color::BLACK);
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.0, 0.0, 0.0)), Color::BLACK);
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.1, 0.0, 0.0)), Color::WHITE);
}

#[test]
fn gradient_interpolates_between_colors() {
    let pattern = Pattern::gradient(Color::WHITE, Color::BLACK);

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)), Color::WHITE);
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.75, 0.0, 0.0)),
        Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn ring_extends_in_x_and_z() {
    let pattern = Pattern::ring(Color::WHITE, Color::BLACK);

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)), Color::WHITE);
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.0, 0.0, 0.0)), Color::BLACK);
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.0)), Color::BLACK);
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.708, 0.0, 0.708)), Color::BLACK);
}

#[test]
fn checkers_repeat_in_every_dimension() {
    let pattern = Pattern::checkers(Color::WHITE, Color::BLACK);

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.99, 0.0, 0.0)), Color::WHITE);
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.01, 0.0, 0.0)), Color::BLACK);
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 1.01, 0.0)), Color::BLACK);
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.01)), Color::BLACK);
}

#[test]
fn pattern_transform_is_applied_before_lookup() {
    let pattern = Pattern::test().with_transform(Matrix4D::scaling(2.0, 2.0, 2.0));

    assert_eq!(pattern.pattern_at_object(Tuple4D::point(2.0, 3.0, 4.0)),
        Color::rgb(1.0, 1.5, 2.0));
}
