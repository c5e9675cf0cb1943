use std::ops::Index;

use slotmap::SlotMap;

use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::matrix::Matrix4D;
use crate::color::Color;
use crate::pattern::Pattern;
use crate::csg::CsgOp;
use crate::intersect::Intersections;
use crate::shape::{ Shape, ShapeId, ShapeKind };

/// Storage for every shape of a scene.
///
/// Groups and CSGs refer to their children by `ShapeId`, and children refer
/// back to their parent the same way, so the scene graph has no ownership
/// cycles. Shapes are never removed once inserted.
///
/// Each shape keeps only its own transform. Conversions between world space
/// and a shape's local space walk the parent chain, applying one transform
/// per level.
#[derive(Clone, Debug, Default)]
pub struct ShapeArena {
    shapes: SlotMap<ShapeId, Shape>,
}

impl ShapeArena {
    pub fn new() -> ShapeArena {
        ShapeArena { shapes: SlotMap::with_key() }
    }

    /// Stores a shape, returning its key.
    ///
    /// The shape starts without a parent. A group passed in here should be
    /// empty; children are attached with `add_child`.
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        self.shapes.insert(shape)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Assigns the transform of a stored shape.
    ///
    /// # Panics
    ///
    /// Panics if `transform` is singular, or if `id` is not in the arena.
    pub fn set_transform(&mut self, id: ShapeId, transform: Matrix4D) {
        self.shapes[id].set_transform(transform);
    }

    /// Appends `child` to the children of `group` and points the child's
    /// parent link at the group.
    ///
    /// # Panics
    ///
    /// Panics if `group` is not a group.
    pub fn add_child(&mut self, group: ShapeId, child: ShapeId) {
        match self.shapes.get_mut(group).map(|g| &mut g.kind) {
            Some(ShapeKind::Group(children)) => children.push(child),
            _ => panic!("Cannot add child to non-group shape."),
        }

        self.shapes[child].parent = Some(group);
    }

    /// Stores a group holding `children`, in order.
    ///
    /// Children keep their own transforms; the group's transform is applied
    /// on top of them whenever they are intersected or shaded. Changing the
    /// group's transform later with `set_transform` therefore moves every
    /// child with it.
    pub fn group(&mut self, transform: Matrix4D, children: &[ShapeId])
        -> ShapeId {
        let group = self.insert(Shape::group().with_transform(transform));
        for &child in children {
            self.add_child(group, child);
        }

        group
    }

    /// Stores a CSG shape combining `left` and `right` and sets both
    /// operands' parent links to it.
    pub fn csg(&mut self, op: CsgOp, left: ShapeId, right: ShapeId)
        -> ShapeId {
        let csg = self.insert(Shape::new(ShapeKind::Csg(op, left, right)));

        self.shapes[left].parent = Some(csg);
        self.shapes[right].parent = Some(csg);

        csg
    }

    /// Intersects a world-space ray with a stored shape.
    ///
    /// The ray is moved into the shape's local space first. Groups then pass
    /// that ray on to each child, and CSGs filter the merged intersections
    /// of their operands. The result is sorted by `t`.
    pub fn intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        let shape = &self.shapes[id];
        let local_ray = ray.transform(shape.inverse());

        match shape.kind {
            ShapeKind::Group(ref children) => Intersections::aggregate(
                children.iter()
                    .map(|&child| self.intersect(child, &local_ray))
                    .collect()
            ),

            ShapeKind::Csg(op, left, right) => {
                let all = Intersections::aggregate(vec![
                    self.intersect(left, &local_ray),
                    self.intersect(right, &local_ray),
                ]);

                op.filter_intersections(&all, |i| self.includes(left, i.object))
            },

            _ => shape.local_intersect(id, &local_ray),
        }
    }

    /// Deduces whether shape `a` is or contains shape `b`.
    ///
    /// A group includes anything one of its children includes, a CSG
    /// anything either operand includes, and a primitive only itself.
    pub fn includes(&self, a: ShapeId, b: ShapeId) -> bool {
        if a == b {
            return true;
        }

        match self.shapes[a].kind {
            ShapeKind::Group(ref children)
                => children.iter().any(|&c| self.includes(c, b)),
            ShapeKind::Csg(_, left, right)
                => self.includes(left, b) || self.includes(right, b),
            _ => false,
        }
    }

    /// Converts a point from world space to the local space of `id`.
    ///
    /// The point goes through each ancestor's inverse transform, outermost
    /// first, and through the shape's own inverse last.
    pub fn world_to_object(&self, id: ShapeId, point: Tuple4D) -> Tuple4D {
        let shape = &self.shapes[id];
        let point = match shape.parent() {
            Some(parent) => self.world_to_object(parent, point),
            None => point,
        };

        *shape.inverse() * point
    }

    /// Converts a normal from the local space of `id` to world space.
    pub fn normal_to_world(&self, id: ShapeId, normal: Tuple4D) -> Tuple4D {
        let shape = &self.shapes[id];

        let mut normal = shape.inverse().transposition() * normal;
        normal.w = 0.0;
        let normal = normal.normalize();

        match shape.parent() {
            Some(parent) => self.normal_to_world(parent, normal),
            None => normal,
        }
    }

    /// Obtains the world-space normal of a primitive at a world-space point.
    ///
    /// `uv` carries the barycentric coordinates of the hit for smooth
    /// triangles.
    pub fn normal_at(&self, id: ShapeId, world_point: Tuple4D,
        uv: Option<(f64, f64)>) -> Tuple4D {
        let local_point = self.world_to_object(id, world_point);
        let local_normal = self.shapes[id].local_normal_at(&local_point, uv);
        self.normal_to_world(id, local_normal)
    }

    /// Evaluates `pattern` at a world-space point on shape `id`.
    pub fn pattern_at_shape(&self, id: ShapeId, pattern: &Pattern,
        world_point: Tuple4D) -> Color {
        pattern.pattern_at_object(self.world_to_object(id, world_point))
    }
}

impl Index<ShapeId> for ShapeArena {
    type Output = Shape;

    fn index(&self, id: ShapeId) -> &Shape {
        &self.shapes[id]
    }
}

#[cfg(test)]
use std::f64::consts::PI;

#[cfg(test)]
fn ray(origin: (f64, f64, f64), direction: (f64, f64, f64)) -> Ray4D {
    Ray4D::new(
        Tuple4D::point(origin.0, origin.1, origin.2),
        Tuple4D::vector(direction.0, direction.1, direction.2),
    )
}

#[test]
fn intersecting_an_empty_group() {
    let mut arena = ShapeArena::new();
    let g = arena.insert(Shape::group());

    assert!(arena.intersect(g, &ray((0.0, 0.0, 0.0), (0.0, 0.0, 1.0))).is_empty());
}

#[test]
fn adding_children_sets_parent_links() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::sphere());
    let g = arena.group(Matrix4D::identity(), &[s]);

    assert_eq!(arena[s].parent(), Some(g));
    assert_eq!(arena[g].children(), Some(&vec![s]));
    assert_eq!(arena[g].parent(), None);
}

#[test]
fn intersecting_a_group_of_spheres() {
    let mut arena = ShapeArena::new();
    let s1 = arena.insert(Shape::sphere());
    let s2 = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, -3.0)));
    let s3 = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)));
    let g = arena.group(Matrix4D::identity(), &[s1, s2, s3]);

    let xs = arena.intersect(g, &ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0)));
    let objects: Vec<ShapeId> = xs.iter().map(|i| i.object).collect();

    assert_eq!(objects, vec![s2, s2, s1, s1]);
}

#[test]
fn intersecting_a_transformed_group() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)));
    let g = arena.group(Matrix4D::scaling(2.0, 2.0, 2.0), &[s]);

    let xs = arena.intersect(g, &ray((10.0, 0.0, -10.0), (0.0, 0.0, 1.0)));
    assert_eq!(xs.len(), 2);
}

#[cfg(test)]
fn nested_sphere(arena: &mut ShapeArena) -> ShapeId {
    let s = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)));
    let g2 = arena.group(Matrix4D::scaling(2.0, 2.0, 2.0), &[s]);
    arena.group(Matrix4D::rotation_y(PI / 2.0), &[g2]);

    s
}

#[test]
fn converting_a_point_from_world_to_object_space() {
    let mut arena = ShapeArena::new();
    let s = nested_sphere(&mut arena);

    let p = arena.world_to_object(s, Tuple4D::point(-2.0, 0.0, -10.0));
    assert_eq!(p, Tuple4D::point(0.0, 0.0, -1.0));
}

#[test]
fn converting_a_normal_from_object_to_world_space() {
    let mut arena = ShapeArena::new();
    let s = nested_sphere(&mut arena);

    let k = 3.0f64.sqrt() / 3.0;
    let n = arena.normal_to_world(s, Tuple4D::vector(k, k, k));
    assert_eq!(n, Tuple4D::vector(0.2857, 0.4286, -0.8571));
}

#[test]
fn finding_the_normal_on_a_child_object() {
    let mut arena = ShapeArena::new();
    let s = nested_sphere(&mut arena);

    let n = arena.normal_at(s, Tuple4D::point(1.7321, 1.1547, -5.5774), None);
    assert_eq!(n, Tuple4D::vector(0.2857, 0.4286, -0.8571));
}

#[test]
fn normal_on_a_transformed_sphere() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(Shape::sphere().with_transform(
        Matrix4D::scaling(1.0, 0.5, 1.0) * Matrix4D::rotation_z(PI / 5.0)
    ));

    let k = 2.0f64.sqrt() / 2.0;
    let n = arena.normal_at(s, Tuple4D::point(0.0, k, -k), None);
    assert_eq!(n, Tuple4D::vector(0.0, 0.97014, -0.24254));
}

#[test]
fn csg_sets_operand_parents() {
    let mut arena = ShapeArena::new();
    let s1 = arena.insert(Shape::sphere());
    let s2 = arena.insert(Shape::cube());
    let c = arena.csg(CsgOp::Union, s1, s2);

    assert_eq!(arena[s1].parent(), Some(c));
    assert_eq!(arena[s2].parent(), Some(c));
}

#[test]
fn ray_misses_a_csg() {
    let mut arena = ShapeArena::new();
    let s1 = arena.insert(Shape::sphere());
    let s2 = arena.insert(Shape::cube());
    let c = arena.csg(CsgOp::Union, s1, s2);

    assert!(arena.intersect(c, &ray((0.0, 2.0, -5.0), (0.0, 0.0, 1.0))).is_empty());
}

#[test]
fn ray_hits_a_csg_union() {
    let mut arena = ShapeArena::new();
    let s1 = arena.insert(Shape::sphere());
    let s2 = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 0.5)));
    let c = arena.csg(CsgOp::Union, s1, s2);

    let xs = arena.intersect(c, &ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0)));

    assert_eq!(xs.len(), 2);
    assert!(crate::feq(xs[0].t, 4.0));
    assert_eq!(xs[0].object, s1);
    assert!(crate::feq(xs[1].t, 6.5));
    assert_eq!(xs[1].object, s2);
}

#[test]
fn csg_difference_with_a_grouped_operand() {
    // The left operand is a group, so membership has to look through it.
    let mut arena = ShapeArena::new();
    let s1 = arena.insert(Shape::sphere());
    let left = arena.group(Matrix4D::identity(), &[s1]);
    let s2 = arena.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 0.5)));
    let c = arena.csg(CsgOp::Difference, left, s2);

    let xs = arena.intersect(c, &ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0)));

    assert_eq!(xs.len(), 2);
    assert!(crate::feq(xs[0].t, 4.0));
    assert_eq!(xs[0].object, s1);
    assert!(crate::feq(xs[1].t, 4.5));
    assert_eq!(xs[1].object, s2);
}

#[test]
fn includes_looks_through_groups_and_csgs() {
    let mut arena = ShapeArena::new();
    let s1 = arena.insert(Shape::sphere());
    let s2 = arena.insert(Shape::cube());
    let s3 = arena.insert(Shape::plane());
    let g = arena.group(Matrix4D::identity(), &[s1]);
    let c = arena.csg(CsgOp::Intersection, g, s2);

    assert!(arena.includes(c, s1));
    assert!(arena.includes(c, s2));
    assert!(arena.includes(g, s1));
    assert!(!arena.includes(g, s2));
    assert!(!arena.includes(c, s3));
}

#[test]
fn deeply_nested_groups_still_intersect() {
    let mut arena = ShapeArena::new();
    let mut inner = arena.insert(Shape::sphere());
    let leaf = inner;
    for _ in 0..40 {
        inner = arena.group(Matrix4D::identity(), &[inner]);
    }

    let xs = arena.intersect(inner, &ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0)));
    assert_eq!(xs.len(), 2);
    assert_eq!(xs[0].object, leaf);
    assert_eq!(arena.normal_at(leaf, Tuple4D::point(0.0, 0.0, -1.0), None),
        Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn pattern_follows_every_parent_transform() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(
        Shape::sphere().with_transform(Matrix4D::translation(0.5, 1.0, 1.5))
    );
    arena.group(Matrix4D::scaling(2.0, 2.0, 2.0), &[s]);

    let pattern = Pattern::test()
        .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5));
    let c = arena.pattern_at_shape(s, &pattern, Tuple4D::point(2.5, 3.0, 3.5));

    assert_eq!(c, Color::rgb(1.5, 1.0, 0.5));
}

#[test]
fn group_transform_changed_after_adding_still_applies() {
    let mut arena = ShapeArena::new();
    let s = arena.insert(
        Shape::sphere().with_transform(Matrix4D::translation(5.0, 0.0, 0.0))
    );
    let g = arena.group(Matrix4D::identity(), &[s]);
    arena.set_transform(g, Matrix4D::scaling(2.0, 2.0, 2.0));

    let r = Ray4D::new(Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(arena.intersect(g, &r).len(), 2);

    assert_eq!(arena.world_to_object(s, Tuple4D::point(10.0, 0.0, -2.0)),
        Tuple4D::point(0.0, 0.0, -1.0));
}
