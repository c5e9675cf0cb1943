use std::fs;
use std::fmt::Write;
use std::path::Path;

use log::info;

use crate::Result;
use crate::color::Color;
use crate::consts::{ PPM_MAX_VALUE, PPM_LINE_WIDTH };

/// A canvas for drawing pixels.
///
/// This structure stores the results of the ray tracer: one color per pixel,
/// as computed by a `Camera` casting rays into a `World`. Colors are kept
/// unclamped until the canvas is written out.
///
/// For now, only PPM images are supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored row by row in a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::BLACK; width * height]
        }
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `x` is the column of the pixel and
    /// `y` the row, both zero-indexed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted::color::Color;
    /// # use whitted::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2), Some(purple));
    /// assert_eq!(canvas.read_pixel(8, 2), None);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`, or `None` if the
    /// location is out-of-bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Copies a full row of pixels into the canvas.
    ///
    /// Extra colors past the canvas width are ignored.
    pub fn write_row(&mut self, y: usize, row: &[Color]) {
        for (x, pixel) in row.iter().enumerate() {
            self.write_pixel(x, y, pixel);
        }
    }

    /// Serializes the canvas as a plain-text PPM image.
    ///
    /// Each channel is scaled to `0..=255`, clamped and rounded. Lines of
    /// pixel data never exceed 70 columns; a number that would cross the
    /// limit starts a new line instead. The output ends with a newline.
    pub fn to_ppm(&self) -> String {
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "P3");
        let _ = writeln!(out, "{} {}", self.width, self.height);
        let _ = writeln!(out, "{}", PPM_MAX_VALUE);

        for row in self.pixels.chunks(self.width.max(1)) {
            let mut col = 0;
            for value in row.iter().flat_map(|p| p.to_scaled(PPM_MAX_VALUE)) {
                let s = value.to_string();

                if col == 0 {
                    col = s.len();
                } else if col + 1 + s.len() > PPM_LINE_WIDTH {
                    out.push('\n');
                    col = s.len();
                } else {
                    out.push(' ');
                    col += 1 + s.len();
                }

                out.push_str(&s);
            }

            out.push('\n');
        }

        out
    }

    /// Saves a canvas to a PPM file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_ppm())?;
        info!("Saved {}x{} image to {}", self.width, self.height,
            path.as_ref().display());

        Ok(())
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(c.read_pixel(x, y), Some(Color::BLACK));
        }
    }
}

#[test]
fn ppm_header() {
    let c = Canvas::new(5, 3);
    let ppm = c.to_ppm();
    let header: Vec<&str> = ppm.lines().take(3).collect();

    assert_eq!(header, vec!["P3", "5 3", "255"]);
}

#[test]
fn ppm_pixel_data_is_clamped() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let ppm = c.to_ppm();
    let data: Vec<&str> = ppm.lines().skip(3).collect();

    assert_eq!(data, vec![
        "255 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
        "0 0 0 0 0 0 0 128 0 0 0 0 0 0 0",
        "0 0 0 0 0 0 0 0 0 0 0 0 0 0 255",
    ]);
}

#[test]
fn ppm_long_lines_are_split() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let ppm = c.to_ppm();
    let data: Vec<&str> = ppm.lines().skip(3).collect();

    assert_eq!(data, vec![
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204",
        "153 255 204 153 255 204 153 255 204 153 255 204 153",
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204",
        "153 255 204 153 255 204 153 255 204 153 255 204 153",
    ]);
    assert!(data.iter().all(|line| line.len() <= PPM_LINE_WIDTH));
}

#[test]
fn ppm_ends_with_newline() {
    assert!(Canvas::new(5, 3).to_ppm().ends_with('\n'));
}
