use crate::color::Color;
use crate::pattern::Pattern;
use crate::tuple::Tuple4D;
use crate::consts::VACUUM_RI;

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from; it has no extent, so shadows are always hard.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl Default for PointLight {
    fn default() -> PointLight {
        PointLight::new(Color::WHITE, Tuple4D::point(-10.0, 10.0, -10.0))
    }
}

impl PointLight {
    /// Creates a point light.
    ///
    /// If `position` isn't a point, it is converted to a point automatically.
    pub fn new(intensity: Color, mut position: Tuple4D) -> PointLight {
        position.w = 1.0;

        PointLight { intensity, position }
    }
}

/// A material record.
///
/// Materials use attributes from the Phong reflection model (ambient,
/// diffuse, specular and shininess) plus the coefficients driving the
/// recursive reflection and refraction rays.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub transparency: f64,
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::WHITE,
            pattern: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            transparency: 0.0,
            refractive_index: VACUUM_RI,
        }
    }
}

impl Material {
    /// A clear, glassy material.
    pub fn glass() -> Material {
        Material {
            transparency: 1.0,
            refractive_index: crate::consts::GLASS_RI,
            ..Default::default()
        }
    }

}

/// Calculates the Phong lighting of a point for a single light.
///
/// `object_point` is `point` expressed in the local space of the shape being
/// lit; it is only used to look up the material's pattern. If the point is
/// in a shadow, only ambient light is used.
pub fn lighting(m: &Material, light: &PointLight, point: Tuple4D,
    object_point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D, in_shadow: bool)
    -> Color {
    // A pattern supplies the color directly; a flat color is tinted by the
    // light.
    let effective_color = match m.pattern {
        Some(ref pattern) => pattern.pattern_at_object(object_point),
        None => m.color * light.intensity,
    };
    let ambient = effective_color * m.ambient;

    if in_shadow {
        return ambient;
    }

    let lightv = (light.position - point).normalize();

    // A negative cosine means the light is on the other side of the surface
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal < 0.0 {
        return ambient;
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);
    let specular = if reflect_dot_eye <= 0.0 {
        Color::BLACK
    } else {
        light.intensity * m.specular * reflect_dot_eye.powf(m.shininess)
    };

    ambient + diffuse + specular
}

#[cfg(test)]
fn lit(eyev: Tuple4D, light_position: Tuple4D, in_shadow: bool) -> Color {
    let m = Material::default();
    let position = Tuple4D::origin();
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::WHITE, light_position);

    lighting(&m, &light, position, position, eyev, normalv, in_shadow)
}

#[test]
fn eye_between_light_and_surface() {
    let c = lit(Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::point(0.0, 0.0, -10.0), false);

    assert_eq!(c, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_between_light_and_surface_offset_45() {
    let k = 2.0f64.sqrt() / 2.0;
    let c = lit(Tuple4D::vector(0.0, k, -k),
        Tuple4D::point(0.0, 0.0, -10.0), false);

    assert_eq!(c, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn eye_opposite_surface_light_offset_45() {
    let c = lit(Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::point(0.0, 10.0, -10.0), false);

    assert_eq!(c, Color::rgb(0.7364, 0.7364, 0.7364));
}

#[test]
fn eye_in_path_of_reflection() {
    let k = 2.0f64.sqrt() / 2.0;
    let c = lit(Tuple4D::vector(0.0, -k, -k),
        Tuple4D::point(0.0, 10.0, -10.0), false);

    assert_eq!(c, Color::rgb(1.6364, 1.6364, 1.6364));
}

#[test]
fn light_behind_surface() {
    let c = lit(Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::point(0.0, 0.0, 10.0), false);

    assert_eq!(c, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn surface_in_shadow() {
    let c = lit(Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::point(0.0, 0.0, -10.0), true);

    assert_eq!(c, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn lighting_with_stripe_pattern() {
    // Only ambient light is included, so the pattern color shows through
    // unchanged.
    let m = Material {
        pattern: Some(Pattern::stripe(Color::WHITE, Color::BLACK)),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    };

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::WHITE, Tuple4D::point(0.0, 0.0, -10.0));

    let p1 = Tuple4D::point(0.9, 0.0, 0.0);
    let p2 = Tuple4D::point(1.1, 0.0, 0.0);

    assert_eq!(lighting(&m, &light, p1, p1, eyev, normalv, false), Color::WHITE);
    assert_eq!(lighting(&m, &light, p2, p2, eyev, normalv, false), Color::BLACK);
}

#[test]
fn pattern_color_ignores_light_intensity() {
    let m = Material {
        pattern: Some(Pattern::stripe(Color::WHITE, Color::BLACK)),
        color: Color::rgb(1.0, 0.5, 0.25),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    };

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let grey = PointLight::new(Color::rgb(0.5, 0.5, 0.5),
        Tuple4D::point(0.0, 0.0, -10.0));
    let p = Tuple4D::point(0.5, 0.0, 0.0);

    assert_eq!(lighting(&m, &grey, p, p, eyev, normalv, false), Color::WHITE);

    // Without the pattern, the flat color is tinted by the light.
    let flat = Material { pattern: None, ..m };
    assert_eq!(lighting(&flat, &grey, p, p, eyev, normalv, false),
        Color::rgb(0.5, 0.25, 0.125));
}
