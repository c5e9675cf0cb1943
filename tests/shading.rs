use whitted::feq;
use whitted::tuple::Tuple4D;
use whitted::matrix::Matrix4D;
use whitted::ray::Ray4D;
use whitted::color::Color;
use whitted::light::{ Material, PointLight };
use whitted::shape::Shape;
use whitted::csg::CsgOp;
use whitted::intersect::IntersectionComputation;
use whitted::world::World;
use whitted::consts::DEFAULT_RECURSION_DEPTH;

fn toward_z(z: f64) -> Ray4D {
    Ray4D::new(Tuple4D::point(0.0, 0.0, z), Tuple4D::vector(0.0, 0.0, 1.0))
}

#[test]
fn default_world_color_along_ray() {
    let w = World::default();
    let c = w.color_at(&toward_z(-5.0), DEFAULT_RECURSION_DEPTH);

    assert_eq!(c, Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn csg_intersection_keeps_the_overlap() {
    let mut w = World::empty();
    let a = w.shapes.insert(Shape::sphere());
    let b = w.shapes.insert(
        Shape::sphere().with_transform(Matrix4D::translation(0.0, 0.0, 0.5))
    );
    let c = w.shapes.csg(CsgOp::Intersection, a, b);
    w.add_root(c);

    let xs = w.intersect(&toward_z(-5.0));
    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0].t, 4.5));
    assert_eq!(xs[0].object, b);
    assert!(feq(xs[1].t, 6.0));
    assert_eq!(xs[1].object, a);
}

#[test]
fn refractive_indices_through_nested_glass() {
    let mut w = World::empty();
    let mut glass = |transform: Matrix4D, ri: f64| {
        let mut s = Shape::glass_sphere().with_transform(transform);
        s.material.refractive_index = ri;
        w.add(s)
    };

    glass(Matrix4D::scaling(2.0, 2.0, 2.0), 1.5);
    glass(Matrix4D::translation(0.0, 0.0, -0.25), 2.0);
    glass(Matrix4D::translation(0.0, 0.0, 0.25), 2.5);

    let r = toward_z(-4.0);
    let xs = w.intersect(&r);
    assert_eq!(xs.len(), 6);

    let expected = [
        (1.0, 1.5), (1.5, 2.0), (2.0, 2.5),
        (2.5, 2.5), (2.5, 1.5), (1.5, 1.0),
    ];
    for (i, &(n1, n2)) in expected.iter().enumerate() {
        let comps = IntersectionComputation::new(&w.shapes, &r, &xs[i], Some(&xs));
        assert!(feq(comps.n1, n1), "n1 at {}", i);
        assert!(feq(comps.n2, n2), "n2 at {}", i);
    }
}

#[test]
fn glass_floor_blends_reflection_and_refraction() {
    let mut w = World::new();

    let floor_material = Material {
        reflective: 0.5,
        transparency: 0.5,
        refractive_index: 1.5,
        ..Default::default()
    };
    w.add(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .with_material(floor_material));

    let ball_material = Material {
        color: Color::rgb(1.0, 0.0, 0.0),
        ambient: 0.5,
        ..Default::default()
    };
    w.add(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5))
        .with_material(ball_material));

    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0), Tuple4D::vector(0.0, -k, k));

    assert_eq!(w.color_at(&r, DEFAULT_RECURSION_DEPTH),
        Color::rgb(0.93391, 0.69643, 0.69243));
}

#[test]
fn grouped_shapes_cast_shadows() {
    let mut w = World::empty();
    w.lights.push(PointLight::new(Color::WHITE, Tuple4D::point(0.0, 10.0, 0.0)));

    let blocker = w.shapes.insert(Shape::sphere());
    let group = w.shapes.group(Matrix4D::translation(0.0, 5.0, 0.0), &[blocker]);
    w.add_root(group);

    assert!(w.is_shadowed(Tuple4D::origin(), &w.lights[0]));
    assert!(!w.is_shadowed(Tuple4D::point(5.0, 0.0, 0.0), &w.lights[0]));
}

#[test]
fn mutually_reflective_planes_terminate() {
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

    assert!(c.r.is_finite() && c.g.is_finite() && c.b.is_finite());
}
