use std::ops::{ Add, Sub, Mul };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values. Components are left
/// unclamped while shading, so intermediate colors may leave `[0, 1]`; only
/// the canvas clamps them when an image is written.
///
/// # Examples
///
/// Blend two colors:
///
/// ```
/// # use whitted::color::Color;
/// let blend = Color::WHITE * 0.5 + Color::rgb(0.0, 0.0, 0.5);
/// assert_eq!(blend, Color::rgb(0.5, 0.5, 1.0));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Colors are compared component-wise, allowing for floating point error.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    /// Creates a color with red, green and blue values.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Computes the Hadamard product of two colors.
    ///
    /// Each component of the two colors is multiplied, giving a new color.
    /// This is how a surface color is filtered by the color of a light.
    ///
    /// ```
    /// # use whitted::color::Color;
    /// let yellow = Color::rgb(1.0, 1.0, 0.0);
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// assert_eq!(Color::hadamard(&yellow, &purple), Color::rgb(1.0, 0.0, 0.0));
    /// ```
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color::rgb(c1.r * c2.r, c1.g * c2.g, c1.b * c2.b)
    }

    /// Scales each channel to `[0, max]` and rounds it to an integer.
    pub fn to_scaled(&self, max: usize) -> [usize; 3] {
        let scale = |c: f64| {
            (c * max as f64).clamp(0.0, max as f64).round() as usize
        };

        [scale(self.r), scale(self.g), scale(self.b)]
    }
}

impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color::rgb(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color::rgb(self.r - other.r, self.g - other.g, self.b - other.b)
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, s: f64) -> Self::Output {
        Color::rgb(self.r * s, self.g * s, self.b * s)
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, c: Color) -> Self::Output {
        c * self
    }
}

/// `c1 * c2` is shorthand for `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

impl std::iter::Sum for Color {
    fn sum<I: Iterator<Item = Color>>(iter: I) -> Color {
        iter.fold(Color::BLACK, |acc, c| acc + c)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
    assert_eq!(Color::rgb(0.2, 0.3, 0.4) * 2.0, Color::rgb(0.4, 0.6, 0.8));
}

#[test]
fn scaled_channels_are_clamped_and_rounded() {
    assert_eq!(Color::rgb(1.5, 0.0, 0.0).to_scaled(255), [255, 0, 0]);
    assert_eq!(Color::rgb(0.0, 0.5, 0.0).to_scaled(255), [0, 128, 0]);
    assert_eq!(Color::rgb(-0.5, 0.0, 1.0).to_scaled(255), [0, 0, 255]);
}

#[test]
fn colors_sum_over_an_iterator() {
    let total: Color = vec![Color::rgb(0.1, 0.2, 0.3); 3].into_iter().sum();

    assert_eq!(total, Color::rgb(0.3, 0.6, 0.9));
}
