use std::fmt;
use std::ops::{ Index, IndexMut, Mul };

use crate::feq;
use crate::tuple::Tuple4D;

/// A 4x4 matrix, stored row-major.
///
/// These matrices encode affine transformations in 3D space, transforming
/// both vectors and points (`w` components of `0.0` and `1.0`,
/// respectively). Every shape, pattern and camera carries one.
///
/// Builders are provided for the standard transforms. They compose right to
/// left: in `T * R * S` the scaling is applied first.
///
/// # Examples
///
/// ```
/// # use whitted::tuple::Tuple4D;
/// # use whitted::matrix::Matrix4D;
/// let m = Matrix4D::translation(10.0, 5.0, 7.0)
///     * Matrix4D::scaling(5.0, 5.0, 5.0)
///     * Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
/// assert_eq!(m * Tuple4D::point(1.0, 0.0, 1.0), Tuple4D::point(15.0, 0.0, 7.0));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Matrix4D {
    data: [f64; 16],
}

impl Default for Matrix4D {
    fn default() -> Matrix4D {
        Matrix4D::identity()
    }
}

/// Matrices are compared element-wise, allowing for floating point error.
impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix4D {
    /// Creates a matrix with every element set to `0.0`.
    pub fn zero() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    pub fn identity() -> Matrix4D {
        let mut m = Self::zero();
        for i in 0..4 {
            m[(i, i)] = 1.0;
        }

        m
    }

    /// Offsets a point by `x`, `y` and `z`. Vectors are unaffected.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 3)] = x;
        m[(1, 3)] = y;
        m[(2, 3)] = z;

        m
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 0)] = x;
        m[(1, 1)] = y;
        m[(2, 2)] = z;

        m
    }

    /// Rotation about the X axis by `r` radians (left-handed).
    ///
    /// ```
    /// # use whitted::tuple::Tuple4D;
    /// # use whitted::matrix::Matrix4D;
    /// let m = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::point(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(1, 1)] =  r.cos();
        m[(1, 2)] = -r.sin();
        m[(2, 1)] =  r.sin();
        m[(2, 2)] =  r.cos();

        m
    }

    /// Rotation about the Y axis by `r` radians.
    pub fn rotation_y(r: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 0)] =  r.cos();
        m[(0, 2)] =  r.sin();
        m[(2, 0)] = -r.sin();
        m[(2, 2)] =  r.cos();

        m
    }

    /// Rotation about the Z axis by `r` radians.
    pub fn rotation_z(r: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 0)] =  r.cos();
        m[(0, 1)] = -r.sin();
        m[(1, 0)] =  r.sin();
        m[(1, 1)] =  r.cos();

        m
    }

    /// Shearing: each parameter moves one coordinate in proportion to
    /// another, e.g. `xy` moves `x` in proportion to `y`.
    ///
    /// ```
    /// # use whitted::tuple::Tuple4D;
    /// # use whitted::matrix::Matrix4D;
    /// let m = Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    /// assert_eq!(m * Tuple4D::point(2.0, 3.0, 4.0), Tuple4D::point(5.0, 3.0, 4.0));
    /// ```
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 1)] = xy;
        m[(0, 2)] = xz;
        m[(1, 0)] = yx;
        m[(1, 2)] = yz;
        m[(2, 0)] = zx;
        m[(2, 1)] = zy;

        m
    }

    /// Orients the world relative to an eye at `from` looking toward `to`.
    ///
    /// Note that the view transformation moves the *world* with respect to
    /// the eye, not the other way around.
    pub fn view_transform(from: Tuple4D, to: Tuple4D, up: Tuple4D) -> Matrix4D {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize());
        let true_up = left.cross(&forward);

        let orientation: Matrix4D = [
            left.x,     left.y,     left.z,     0.0,
            true_up.x,  true_up.y,  true_up.z,  0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0,        0.0,        0.0,        1.0,
        ].into();

        orientation * Matrix4D::translation(-from.x, -from.y, -from.z)
    }

    pub fn transposition(&self) -> Matrix4D {
        let mut t = Self::zero();
        for r in 0..4 {
            for c in 0..4 {
                t[(c, r)] = self[(r, c)];
            }
        }

        t
    }

    /// The 3x3 submatrix left after deleting `row` and `col`.
    fn submatrix(&self, row: usize, col: usize) -> [[f64; 3]; 3] {
        let mut sub = [[0.0; 3]; 3];
        let rows = (0..4).filter(|&r| r != row);

        for (i, r) in rows.enumerate() {
            let cols = (0..4).filter(|&c| c != col);
            for (j, c) in cols.enumerate() {
                sub[i][j] = self[(r, c)];
            }
        }

        sub
    }

    /// The determinant of the submatrix at `row` and `col`.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        let m = self.submatrix(row, col);

        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The minor at `row` and `col`, negated when `row + col` is odd.
    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        if (row + col) % 2 == 0 { m } else { -m }
    }

    pub fn determinant(&self) -> f64 {
        (0..4).map(|c| self[(0, c)] * self.cofactor(0, c)).sum()
    }

    pub fn is_invertible(&self) -> bool {
        self.determinant() != 0.0
    }

    /// Calculates the inverse by cofactor expansion, if it exists.
    ///
    /// Returns `None` for a singular matrix. Callers that hold a transform
    /// treat that as fatal.
    pub fn inverse(&self) -> Option<Matrix4D> {
        let det = self.determinant();
        if det == 0.0 {
            return None;
        }

        let mut inv = Self::zero();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / det;
            }
        }

        Some(inv)
    }
}

impl From<[f64; 16]> for Matrix4D {
    fn from(data: [f64; 16]) -> Matrix4D {
        Matrix4D { data }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Matrix multiplication. Not commutative in general.
///
/// ```
/// # use whitted::matrix::Matrix4D;
/// let m1 = Matrix4D::scaling(2.0, 3.0, 4.0);
/// let m2 = Matrix4D::scaling(4.0, 3.0, 2.0);
/// assert_eq!(m1 * m2, Matrix4D::scaling(8.0, 9.0, 8.0));
/// ```
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::zero();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = (0..4).map(|k| self[(r, k)] * other[(k, c)]).sum();
            }
        }

        res
    }
}

/// Transforms a tuple, treated as a column vector on the right.
impl Mul<Tuple4D> for Matrix4D {
    type Output = Tuple4D;

    fn mul(self, t: Tuple4D) -> Tuple4D {
        let row = |r: usize| {
            self[(r, 0)] * t.x
                + self[(r, 1)] * t.y
                + self[(r, 2)] * t.z
                + self[(r, 3)] * t.w
        };

        Tuple4D::tuple(row(0), row(1), row(2), row(3))
    }
}

impl fmt::Display for Matrix4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[test]
fn multiply_by_identity() {
    let a: Matrix4D = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(a * Matrix4D::identity(), a);
}

#[test]
fn transpose_matrix() {
    let a: Matrix4D = [ 0.0, 9.0, 3.0, 0.0,
                        9.0, 8.0, 0.0, 8.0,
                        1.0, 8.0, 5.0, 3.0,
                        0.0, 0.0, 5.0, 8.0, ].into();
    let t: Matrix4D = [ 0.0, 9.0, 1.0, 0.0,
                        9.0, 8.0, 8.0, 0.0,
                        3.0, 0.0, 5.0, 5.0,
                        0.0, 8.0, 3.0, 8.0, ].into();

    assert_eq!(a.transposition(), t);
    assert_eq!(Matrix4D::identity().transposition(), Matrix4D::identity());
}

#[test]
fn determinant_by_cofactors() {
    let a: Matrix4D = [ -2.0, -8.0,  3.0,  5.0,
                        -3.0,  1.0,  7.0,  3.0,
                         1.0,  2.0, -9.0,  6.0,
                        -6.0,  7.0,  7.0, -9.0, ].into();

    assert_eq!(a.cofactor(0, 0), 690.0);
    assert_eq!(a.cofactor(0, 1), 447.0);
    assert_eq!(a.cofactor(0, 2), 210.0);
    assert_eq!(a.cofactor(0, 3), 51.0);
    assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn singular_matrix_has_no_inverse() {
    let a: Matrix4D = [ -4.0,  2.0, -2.0, -3.0,
                         9.0,  6.0,  2.0,  6.0,
                         0.0, -5.0,  1.0, -5.0,
                         0.0,  0.0,  0.0,  0.0, ].into();

    assert!(!a.is_invertible());
    assert!(a.inverse().is_none());
}

#[test]
fn inverse_matrix() {
    let a: Matrix4D = [ -5.0,  2.0,  6.0, -8.0,
                         1.0, -5.0,  1.0,  8.0,
                         7.0,  7.0, -6.0, -7.0,
                         1.0, -3.0,  7.0,  4.0, ].into();
    let b = a.inverse().unwrap();
    let expected: Matrix4D = [
         0.21805,  0.45113,  0.24060, -0.04511,
        -0.80827, -1.45677, -0.44361,  0.52068,
        -0.07895, -0.22368, -0.05263,  0.19737,
        -0.52256, -0.81391, -0.30075,  0.30639,
    ].into();

    assert_eq!(a.determinant(), 532.0);
    assert!(feq(b[(3, 2)], -160.0 / 532.0));
    assert_eq!(b, expected);
}

#[test]
fn product_times_inverse_restores_matrix() {
    let a: Matrix4D = [  3.0, -9.0,  7.0,  3.0,
                         3.0, -8.0,  2.0, -9.0,
                        -4.0,  4.0,  4.0,  1.0,
                        -6.0,  5.0, -1.0,  1.0, ].into();
    let b: Matrix4D = [  8.0,  2.0,  2.0,  2.0,
                         3.0, -1.0,  7.0,  0.0,
                         7.0,  0.0,  5.0,  4.0,
                         6.0, -2.0,  0.0,  5.0, ].into();
    let c = a * b;

    assert_eq!(c * b.inverse().unwrap(), a);
}

#[test]
fn translation_ignores_vectors() {
    let t = Matrix4D::translation(5.0, -3.0, 2.0);
    let inv = t.inverse().unwrap();

    assert_eq!(t * Tuple4D::point(-3.0, 4.0, 5.0), Tuple4D::point(2.0, 1.0, 7.0));
    assert_eq!(inv * Tuple4D::point(-3.0, 4.0, 5.0), Tuple4D::point(-8.0, 7.0, 3.0));
    assert_eq!(t * Tuple4D::vector(-3.0, 4.0, 5.0), Tuple4D::vector(-3.0, 4.0, 5.0));
}

#[test]
fn scaling_reflects_on_negative_axis() {
    let s = Matrix4D::scaling(-1.0, 1.0, 1.0);

    assert_eq!(s * Tuple4D::point(2.0, 3.0, 4.0), Tuple4D::point(-2.0, 3.0, 4.0));
}

#[test]
fn rotations_about_each_axis() {
    let k = 2.0f64.sqrt() / 2.0;
    let quarter = std::f64::consts::PI / 2.0;
    let eighth = std::f64::consts::PI / 4.0;

    assert_eq!(Matrix4D::rotation_x(eighth) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, k, k));
    assert_eq!(Matrix4D::rotation_y(quarter) * Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::point(1.0, 0.0, 0.0));
    assert_eq!(Matrix4D::rotation_z(quarter) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0));
}

#[test]
fn default_view_transform_is_identity() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, -1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up), Matrix4D::identity());
}

#[test]
fn view_transform_moves_the_world() {
    let from = Tuple4D::point(0.0, 0.0, 8.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up),
        Matrix4D::translation(0.0, 0.0, -8.0));
}

#[test]
fn arbitrary_view_transform() {
    let from = Tuple4D::point(1.0, 3.0, 2.0);
    let to = Tuple4D::point(4.0, -2.0, 8.0);
    let up = Tuple4D::vector(1.0, 1.0, 0.0);
    let expected: Matrix4D = [
        -0.50709, 0.50709,  0.67612, -2.36643,
         0.76772, 0.60609,  0.12122, -2.82843,
        -0.35857, 0.59761, -0.71714,  0.00000,
         0.00000, 0.00000,  0.00000,  1.00000,
    ].into();

    assert_eq!(Matrix4D::view_transform(from, to, up), expected);
}
