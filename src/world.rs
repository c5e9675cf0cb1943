use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::light::{ PointLight, Material, lighting };
use crate::shape::{ Shape, ShapeId };
use crate::arena::ShapeArena;
use crate::intersect::{ Intersections, IntersectionComputation };

/// A world with objects and lights.
///
/// Every shape lives in `shapes`; `objects` lists the root shapes that rays
/// are tested against. Groups and CSGs reach their children through the
/// arena, so only roots go in `objects`.
///
/// A world is read-only while rendering; every method here takes `&self`,
/// so one world can be shared between render threads.
#[derive(Clone, Debug)]
pub struct World {
    pub shapes: ShapeArena,
    pub objects: Vec<ShapeId>,
    pub lights: Vec<PointLight>,
}

impl Default for World {
    fn default() -> World {
        World::new()
    }
}

impl World {
    /// Creates the default world: two concentric spheres and one light.
    pub fn new() -> World {
        let mut w = World::empty();
        w.lights.push(PointLight::new(
            Color::WHITE,
            Tuple4D::point(-10.0, 10.0, -10.0)
        ));

        let m1 = Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        };

        w.add(Shape::sphere().with_material(m1));
        w.add(Shape::sphere().with_transform(Matrix4D::scaling(0.5, 0.5, 0.5)));

        w
    }

    /// Creates a world with no objects and no lights.
    pub fn empty() -> World {
        World {
            shapes: ShapeArena::new(),
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Stores a shape and makes it a root object of the world.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let id = self.shapes.insert(shape);
        self.objects.push(id);
        id
    }

    /// Makes a shape already stored in the arena (such as a group built
    /// with `ShapeArena::group`) a root object of the world.
    pub fn add_root(&mut self, id: ShapeId) {
        self.objects.push(id);
    }

    /// Gets a stored shape.
    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[id]
    }

    /// Gets a stored shape mutably, e.g. to change its material.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this world.
    pub fn shape_mut(&mut self, id: ShapeId) -> &mut Shape {
        self.shapes.get_mut(id).expect("Shape should belong to this world.")
    }

    /// Intersects a ray against all objects in a world, sorted by `t`.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        Intersections::aggregate(
            self.objects.iter()
                .map(|&obj| self.shapes.intersect(obj, r))
                .collect()
        )
    }

    /// Determines whether a point is hidden from a light.
    ///
    /// Only geometry between the point and the light casts a shadow.
    pub fn is_shadowed(&self, p: Tuple4D, light: &PointLight) -> bool {
        let v = light.position - p;
        let distance = v.magnitude();
        let direction = v.normalize();

        let r = Ray4D::new(p, direction);
        match self.intersect(&r).hit() {
            Some(i) => i.t < distance,
            None => false,
        }
    }

    /// Calculates the color for a prepared hit.
    ///
    /// Each light contributes its direct lighting plus the reflected and
    /// refracted colors, mixed by the Schlick reflectance when the surface is
    /// both reflective and transparent. The contributions of all lights are
    /// summed, so a world without lights shades everything black.
    pub fn shade_hit(&self, comps: &IntersectionComputation, depth: usize)
        -> Color {
        let material = &self.shapes[comps.object].material;
        let object_point = self.shapes.world_to_object(
            comps.object, comps.over_point
        );

        if self.lights.is_empty() {
            return Color::BLACK;
        }

        let reflected = self.reflected_color(comps, depth);
        let refracted = self.refracted_color(comps, depth);
        let secondary = if material.reflective > 0.0
            && material.transparency > 0.0 {
            let reflectance = comps.schlick();
            reflected * reflectance + refracted * (1.0 - reflectance)
        } else {
            reflected + refracted
        };

        self.lights.iter()
            .map(|light| {
                let surface = lighting(
                    material, light,
                    comps.over_point, object_point,
                    comps.eyev, comps.normalv,
                    self.is_shadowed(comps.over_point, light)
                );
                surface + secondary
            })
            .sum()
    }

    /// Color seen along the reflection vector of a hit.
    pub fn reflected_color(&self, comps: &IntersectionComputation,
        depth: usize) -> Color {
        let reflective = self.shapes[comps.object].material.reflective;
        if depth == 0 || reflective == 0.0 {
            return Color::BLACK;
        }

        let reflect_ray = Ray4D::new(comps.over_point, comps.reflectv);
        self.color_at(&reflect_ray, depth - 1) * reflective
    }

    /// Color seen through a transparent surface, bent by Snell's law.
    pub fn refracted_color(&self, comps: &IntersectionComputation,
        depth: usize) -> Color {
        let transparency = self.shapes[comps.object].material.transparency;
        if depth == 0 || transparency == 0.0 {
            return Color::BLACK;
        }

        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio.powi(2) * (1.0 - cos_i.powi(2));

        // Total internal reflection; nothing gets through.
        if sin2_t > 1.0 {
            return Color::BLACK;
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t)
            - comps.eyev * n_ratio;

        let refract_ray = Ray4D::new(comps.under_point, direction);
        self.color_at(&refract_ray, depth - 1) * transparency
    }

    /// Determines the color seen along a ray.
    ///
    /// `depth` bounds how many more reflected or refracted rays may be cast;
    /// at zero, secondary rays contribute black. Misses are black.
    pub fn color_at(&self, r: &Ray4D, depth: usize) -> Color {
        let is = self.intersect(r);

        match is.hit() {
            None => Color::BLACK,
            Some(i) => {
                let comps = IntersectionComputation::new(
                    &self.shapes, r, &i, Some(&is)
                );
                self.shade_hit(&comps, depth)
            },
        }
    }
}

#[cfg(test)]
use crate::intersect::Intersection;

#[cfg(test)]
use crate::consts::DEFAULT_RECURSION_DEPTH;

#[cfg(test)]
const SQRT2_2: f64 = std::f64::consts::SQRT_2 / 2.0;

#[test]
fn intersect_default_world_with_ray() {
    let w = World::new();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    let ts: Vec<f64> = w.intersect(&r).iter().map(|i| i.t).collect();
    assert_eq!(ts, vec![4.0, 4.5, 5.5, 6.0]);
}

#[test]
fn shade_intersection_from_outside() {
    let w = World::new();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    let i = Intersection::new(4.0, w.objects[0]);
    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);

    assert_eq!(w.shade_hit(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_from_inside() {
    let mut w = World::new();
    w.lights = vec![PointLight::new(Color::WHITE, Tuple4D::point(0.0, 0.25, 0.0))];

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(0.5, w.objects[1]);
    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);

    assert_eq!(w.shade_hit(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.90498, 0.90498, 0.90498));
}

#[test]
fn shade_intersection_in_shadow() {
    let mut w = World::empty();
    w.lights.push(PointLight::new(Color::WHITE, Tuple4D::point(0.0, 0.0, -10.0)));
    w.add(Shape::sphere());
    let s2 = w.add(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)));

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let comps = IntersectionComputation::new(&w.shapes, &r,
        &Intersection::new(4.0, s2), None);

    assert_eq!(w.shade_hit(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn each_light_adds_its_own_contribution() {
    let w1 = World::new();
    let mut w2 = World::new();
    w2.lights.push(w2.lights[0]);

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(w2.color_at(&r, 5), w1.color_at(&r, 5) * 2.0);
}

#[test]
fn color_when_ray_misses_or_hits() {
    let w = World::new();

    let miss = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(w.color_at(&miss, DEFAULT_RECURSION_DEPTH), Color::BLACK);

    let hit = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(w.color_at(&hit, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_with_intersection_behind_ray() {
    let mut w = World::new();
    let (outer, inner) = (w.objects[0], w.objects[1]);
    w.shape_mut(outer).material.ambient = 1.0;
    w.shape_mut(inner).material.ambient = 1.0;

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0));

    assert_eq!(w.color_at(&r, DEFAULT_RECURSION_DEPTH),
        w.shape(inner).material.color);
}

#[test]
fn shadows_need_an_occluder_between_point_and_light() {
    let w = World::new();
    let light = w.lights[0];

    assert!(!w.is_shadowed(Tuple4D::point(0.0, 10.0, 0.0), &light));
    assert!(w.is_shadowed(Tuple4D::point(10.0, -10.0, 10.0), &light));
    assert!(!w.is_shadowed(Tuple4D::point(-20.0, 20.0, -20.0), &light));
    assert!(!w.is_shadowed(Tuple4D::point(-2.0, 2.0, -2.0), &light));
}

#[test]
fn reflected_color_for_nonreflective_material() {
    let mut w = World::new();
    let inner = w.objects[1];
    w.shape_mut(inner).material.ambient = 1.0;

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let comps = IntersectionComputation::new(&w.shapes, &r,
        &Intersection::new(1.0, inner), None);

    assert_eq!(w.reflected_color(&comps, DEFAULT_RECURSION_DEPTH), Color::BLACK);
}

#[cfg(test)]
fn world_with_reflective_floor() -> (World, ShapeId) {
    let mut w = World::new();
    let floor = w.add(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .with_material(Material { reflective: 0.5, ..Default::default() }));

    (w, floor)
}

#[test]
fn reflected_color_for_reflective_material() {
    let (w, floor) = world_with_reflective_floor();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -SQRT2_2, SQRT2_2));
    let comps = IntersectionComputation::new(&w.shapes, &r,
        &Intersection::new(2.0f64.sqrt(), floor), None);

    assert_eq!(w.reflected_color(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.19032, 0.2379, 0.14274));
    assert_eq!(w.shade_hit(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.87677, 0.92436, 0.82918));
}

#[test]
fn reflection_is_added_for_every_light() {
    let (mut w, floor) = world_with_reflective_floor();
    w.lights.push(w.lights[0]);

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -SQRT2_2, SQRT2_2));
    let comps = IntersectionComputation::new(&w.shapes, &r,
        &Intersection::new(2.0f64.sqrt(), floor), None);

    // Both lights see the same reflection, so it counts twice.
    assert_eq!(w.reflected_color(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.38069, 0.47587, 0.28552));
    assert_eq!(w.shade_hit(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(2.13423, 2.32458, 1.94388));
}

#[test]
fn reflected_color_at_maximum_depth() {
    let (w, floor) = world_with_reflective_floor();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -SQRT2_2, SQRT2_2));
    let comps = IntersectionComputation::new(&w.shapes, &r,
        &Intersection::new(2.0f64.sqrt(), floor), None);

    assert_eq!(w.reflected_color(&comps, 0), Color::BLACK);
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let mut w = World::empty();
    w.lights.push(PointLight::new(Color::WHITE, Tuple4D::origin()));

    let mirror = Material { reflective: 1.0, ..Default::default() };
    w.add(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .with_material(mirror));
    w.add(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0))
        .with_material(mirror));

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0));
    let c = w.color_at(&r, DEFAULT_RECURSION_DEPTH);

    assert!(c.r.is_finite() && c.r > 0.0);
}

#[test]
fn refracted_color_with_opaque_surface_or_no_depth() {
    let mut w = World::new();
    let shape = w.objects[0];

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let xs: Intersections = vec![
        Intersection::new(4.0, shape),
        Intersection::new(6.0, shape),
    ].into();

    let comps = IntersectionComputation::new(&w.shapes, &r, &xs[0], Some(&xs));
    assert_eq!(w.refracted_color(&comps, DEFAULT_RECURSION_DEPTH), Color::BLACK);

    w.shape_mut(shape).material.transparency = 1.0;
    w.shape_mut(shape).material.refractive_index = 1.5;

    let comps = IntersectionComputation::new(&w.shapes, &r, &xs[0], Some(&xs));
    assert_eq!(w.refracted_color(&comps, 0), Color::BLACK);
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    let mut w = World::new();
    let shape = w.objects[0];
    w.shape_mut(shape).material.transparency = 1.0;
    w.shape_mut(shape).material.refractive_index = 1.5;

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, SQRT2_2),
        Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-SQRT2_2, shape),
        Intersection::new(SQRT2_2, shape),
    ].into();

    // Inside the sphere, so look at the second intersection.
    let comps = IntersectionComputation::new(&w.shapes, &r, &xs[1], Some(&xs));
    assert_eq!(w.refracted_color(&comps, DEFAULT_RECURSION_DEPTH), Color::BLACK);
}

#[cfg(test)]
fn world_with_glass_floor(reflective: f64) -> (World, ShapeId) {
    let mut w = World::new();
    let floor = w.add(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .with_material(Material {
            reflective,
            transparency: 0.5,
            refractive_index: 1.5,
            ..Default::default()
        }));

    w.add(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5))
        .with_material(Material {
            color: Color::rgb(1.0, 0.0, 0.0),
            ambient: 0.5,
            ..Default::default()
        }));

    (w, floor)
}

#[test]
fn shade_hit_with_transparent_material() {
    let (w, floor) = world_with_glass_floor(0.0);
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -SQRT2_2, SQRT2_2));
    let xs: Intersections = vec![Intersection::new(2.0f64.sqrt(), floor)].into();

    let comps = IntersectionComputation::new(&w.shapes, &r, &xs[0], Some(&xs));
    assert_eq!(w.shade_hit(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.93642, 0.68642, 0.68642));
}

#[test]
fn shade_hit_blends_with_schlick() {
    let (w, floor) = world_with_glass_floor(0.5);
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -SQRT2_2, SQRT2_2));
    let xs: Intersections = vec![Intersection::new(2.0f64.sqrt(), floor)].into();

    let comps = IntersectionComputation::new(&w.shapes, &r, &xs[0], Some(&xs));
    assert_eq!(w.shade_hit(&comps, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.93391, 0.69643, 0.69243));
}

#[test]
fn color_at_is_a_pure_function() {
    let (w, _) = world_with_glass_floor(0.5);
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -SQRT2_2, SQRT2_2));

    let a = w.color_at(&r, DEFAULT_RECURSION_DEPTH);
    let b = w.color_at(&r, DEFAULT_RECURSION_DEPTH);

    assert_eq!(a.r.to_bits(), b.r.to_bits());
    assert_eq!(a.g.to_bits(), b.g.to_bits());
    assert_eq!(a.b.to_bits(), b.b.to_bits());
}

#[test]
fn patterned_group_child_uses_full_transform_chain() {
    use crate::pattern::Pattern;

    // A stripe pattern on a sphere scaled by its group; the lit color only
    // shows the pattern because ambient is 1 and the rest is 0.
    let mut w = World::empty();
    w.lights.push(PointLight::new(Color::WHITE, Tuple4D::point(0.0, 0.0, -10.0)));

    let s = w.shapes.insert(Shape::sphere().with_material(Material {
        pattern: Some(Pattern::stripe(Color::WHITE, Color::BLACK)),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    }));
    let g = w.shapes.group(Matrix4D::scaling(2.0, 2.0, 2.0), &[s]);
    w.add_root(g);

    // World x = 1.5 is object x = 0.75, still inside the first stripe.
    let r = Ray4D::new(Tuple4D::point(1.5, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(w.color_at(&r, DEFAULT_RECURSION_DEPTH), Color::WHITE);
}
