use log::{ info, trace };

use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::world::World;
use crate::canvas::Canvas;
use crate::parallel;

/// A camera record for generating a canvas.
///
/// This record gives a "frame" of the world. The canvas sits one unit in
/// front of the eye; `transform` orients the world relative to the camera
/// (typically a view transformation).
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    pub half_width: f64,
    pub half_height: f64,
    pub pixel_size: f64,

    /// The angle describing "how much" the camera can see, in radians.
    pub field_of_view: f64,

    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Camera {
    /// Creates a camera.
    ///
    /// # Panics
    ///
    /// Panics if `transform` is singular.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64,
        transform: Matrix4D) -> Camera {
        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        let pixel_size = half_width * 2.0 / (hsize as f64);
        let inverse = transform.inverse()
            .expect("Camera matrix should have an inverse.");

        Camera {
            hsize,
            vsize,
            half_width,
            half_height,
            pixel_size,
            field_of_view,
            transform,
            inverse,
        }
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Builds the ray from the eye through the center of pixel `(px, py)`.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray4D {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The untransformed coordinates of the pixel in world space
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        let pixel = self.inverse * Tuple4D::point(world_x, world_y, -1.0);
        let origin = self.inverse * Tuple4D::origin();
        let direction = (pixel - origin).normalize();

        Ray4D::new(origin, direction)
    }

    /// Renders a world on the calling thread.
    pub fn render(&self, w: &World, depth: usize) -> Canvas {
        info!("Rendering {}x{} on 1 thread, depth {}",
            self.hsize, self.vsize, depth);

        let mut image = Canvas::new(self.hsize, self.vsize);
        for y in 0..self.vsize {
            trace!("Rendering row {}", y);
            image.write_row(y, &self.render_row(w, depth, y));
        }

        image
    }

    /// Renders a world, spreading rows over `threads` worker threads.
    pub fn render_parallel(&self, w: &World, depth: usize, threads: usize)
        -> Canvas {
        parallel::render(self, w, depth, threads)
    }

    /// Colors every pixel of row `y`.
    pub fn render_row(&self, w: &World, depth: usize, y: usize)
        -> Vec<crate::color::Color> {
        (0..self.hsize)
            .map(|x| w.color_at(&self.ray_for_pixel(x, y), depth))
            .collect()
    }
}

#[cfg(test)]
use std::f64::consts::PI;

#[test]
fn pixel_size_for_horizontal_and_vertical_canvas() {
    let c = Camera::new(200, 125, PI / 2.0, Matrix4D::identity());
    assert!(crate::feq(c.pixel_size, 0.01));

    let c = Camera::new(125, 200, PI / 2.0, Matrix4D::identity());
    assert!(crate::feq(c.pixel_size, 0.01));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, PI / 2.0, Matrix4D::identity());
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::origin());
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, PI / 2.0, Matrix4D::identity());
    let r = c.ray_for_pixel(0, 0);

    assert_eq!(r.origin, Tuple4D::origin());
    assert_eq!(r.direction, Tuple4D::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    let c = Camera::new(201, 101, PI / 2.0,
        Matrix4D::rotation_y(PI / 4.0) * Matrix4D::translation(0.0, -2.0, 5.0));
    let r = c.ray_for_pixel(100, 50);

    let k = 2.0f64.sqrt() / 2.0;
    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction, Tuple4D::vector(k, 0.0, -k));
}

#[cfg(test)]
fn default_view(size: usize) -> Camera {
    let from = Tuple4D::point(0.0, 0.0, -5.0);
    let to = Tuple4D::origin();
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    Camera::new(size, size, PI / 2.0, Matrix4D::view_transform(from, to, up))
}

#[test]
fn render_world_with_camera() {
    use crate::color::Color;

    let w = World::new();
    let image = default_view(11).render(&w, 5);

    assert_eq!(image.read_pixel(5, 5), Some(Color::rgb(0.38066, 0.47583, 0.2855)));
}

#[test]
fn parallel_render_matches_serial_render() {
    let w = World::new();
    let c = default_view(9);

    assert_eq!(c.render_parallel(&w, 5, 3), c.render(&w, 5));
}
