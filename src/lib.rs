pub mod consts;
pub mod error;

pub mod tuple;
pub mod matrix;
pub mod ray;
pub mod color;

pub mod pattern;
pub mod light;

pub mod geometry;
pub mod shape;
pub mod csg;
pub mod arena;
pub mod intersect;
pub mod world;

pub mod camera;
pub mod canvas;
pub mod parallel;
pub mod obj;
pub mod scene;

pub use error::{ SceneError, Result };

use consts::FEQ_EPSILON;

/// Approximate floating point equality, used by every geometric comparison.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
