use std::fs;
use std::path::Path;

use log::{ debug, info };
use serde::{ Serialize, Deserialize };

use crate::{ Result, SceneError };
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::pattern::Pattern;
use crate::light::{ PointLight, Material };
use crate::shape::{ Shape, ShapeId, ShapeKind };
use crate::csg::CsgOp;
use crate::arena::ShapeArena;
use crate::obj::ObjParser;
use crate::world::World;
use crate::camera::Camera;

/// A world plus the camera that views it, as loaded from a scene file.
#[derive(Clone, Debug)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// Loads a JSON scene file.
    ///
    /// OBJ files named by the scene are resolved relative to the scene
    /// file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Scene> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let scene = Scene::from_json(&text, base_dir)?;
        info!("Loaded scene {} ({} objects, {} shapes, {} lights)",
            path.display(), scene.world.objects.len(),
            scene.world.shapes.len(), scene.world.lights.len());

        Ok(scene)
    }

    /// Decodes a JSON scene description.
    pub fn from_json(text: &str, base_dir: &Path) -> Result<Scene> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.build(base_dir)
    }
}

/// The top level of a scene file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneConfig {
    pub camera: CameraConfig,

    #[serde(default)]
    pub lights: Vec<LightConfig>,

    #[serde(default)]
    pub shapes: Vec<ShapeConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraConfig {
    pub width: usize,
    pub height: usize,

    /// In radians.
    pub field_of_view: f64,

    pub from: Vec<f64>,
    pub to: Vec<f64>,
    pub up: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightConfig {
    pub position: Vec<f64>,
    pub intensity: Vec<f64>,
}

/// One step of a shape or pattern transform.
///
/// Written as e.g. `{ "translate": [0, 1, 0] }` or `{ "rotate_y": 0.5 }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformConfig {
    Translate(Vec<f64>),
    Scale(Vec<f64>),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),

    /// `[xy, xz, yx, yz, zx, zy]`
    Shear(Vec<f64>),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub color: Option<Vec<f64>>,
    pub pattern: Option<PatternConfig>,

    pub ambient: Option<f64>,
    pub diffuse: Option<f64>,
    pub specular: Option<f64>,
    pub shininess: Option<f64>,

    pub reflective: Option<f64>,
    pub transparency: Option<f64>,
    pub refractive_index: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(rename = "type")]
    pub ty: String,

    pub a: Vec<f64>,
    pub b: Vec<f64>,

    #[serde(default)]
    pub transforms: Vec<TransformConfig>,
}

/// A shape entry. Which optional fields are read depends on `type`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShapeConfig {
    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub transforms: Vec<TransformConfig>,

    pub material: Option<MaterialConfig>,

    // Cylinders and cones
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub closed: Option<bool>,

    // Triangles
    pub points: Option<Vec<Vec<f64>>>,
    pub normals: Option<Vec<Vec<f64>>>,

    // Groups
    pub children: Option<Vec<ShapeConfig>>,

    // CSG
    pub operation: Option<String>,
    pub left: Option<Box<ShapeConfig>>,
    pub right: Option<Box<ShapeConfig>>,

    // OBJ models
    pub file: Option<String>,
}

impl SceneConfig {
    /// Turns the decoded description into a world and camera.
    pub fn build(&self, base_dir: &Path) -> Result<Scene> {
        let c = &self.camera;
        let camera = Camera::new(
            c.width,
            c.height,
            c.field_of_view,
            Matrix4D::view_transform(
                point("from", &c.from)?,
                point("to", &c.to)?,
                vector("up", &c.up)?,
            )
        );

        let mut world = World::empty();
        for light in &self.lights {
            world.lights.push(PointLight::new(
                color("intensity", &light.intensity)?,
                point("position", &light.position)?,
            ));
        }

        for shape in &self.shapes {
            let id = shape.build(&mut world.shapes, base_dir)?;
            world.add_root(id);
        }

        Ok(Scene { world, camera })
    }
}

impl ShapeConfig {
    /// Stores this shape, and any shapes it contains, in `arena`.
    pub fn build(&self, arena: &mut ShapeArena, base_dir: &Path)
        -> Result<ShapeId> {
        debug!("Building {} shape", self.ty);

        let material = match self.material {
            Some(ref m) => Some(m.build()?),
            None => None,
        };

        let minimum = self.minimum.unwrap_or(f64::NEG_INFINITY);
        let maximum = self.maximum.unwrap_or(f64::INFINITY);
        let closed = self.closed.unwrap_or(false);

        let primitive = match self.ty.as_str() {
            "sphere" => Some(Shape::sphere()),
            "plane" => Some(Shape::plane()),
            "cube" => Some(Shape::cube()),
            "cylinder" => Some(Shape::new(
                ShapeKind::Cylinder { minimum, maximum, closed }
            )),
            "cone" => Some(Shape::new(
                ShapeKind::Cone { minimum, maximum, closed }
            )),
            "triangle" => {
                let [p1, p2, p3] = self.three("points", &self.points, point)?;
                Some(Shape::triangle(p1, p2, p3))
            },
            "smooth_triangle" => {
                let [p1, p2, p3] = self.three("points", &self.points, point)?;
                let [n1, n2, n3] = self.three("normals", &self.normals, vector)?;
                Some(Shape::smooth_triangle(p1, p2, p3, n1, n2, n3))
            },
            _ => None,
        };

        let id = match primitive {
            Some(mut shape) => {
                if let Some(m) = material {
                    shape.material = m;
                }
                arena.insert(shape)
            },

            None => {
                let id = match self.ty.as_str() {
                    "group" => {
                        let mut ids = Vec::new();
                        for child in self.children.iter().flatten() {
                            ids.push(child.build(arena, base_dir)?);
                        }
                        arena.group(Matrix4D::identity(), &ids)
                    },

                    "csg" => {
                        let op: CsgOp = self.operation.as_deref()
                            .ok_or_else(|| self.missing("operation"))?
                            .parse()?;
                        let left = self.left.as_ref()
                            .ok_or_else(|| self.missing("left"))?
                            .build(arena, base_dir)?;
                        let right = self.right.as_ref()
                            .ok_or_else(|| self.missing("right"))?
                            .build(arena, base_dir)?;
                        arena.csg(op, left, right)
                    },

                    "obj" => {
                        let file = self.file.as_ref()
                            .ok_or_else(|| self.missing("file"))?;
                        ObjParser::from_file(base_dir.join(file))?
                            .into_group(arena)
                    },

                    other => return Err(SceneError::UnknownShape(other.into())),
                };

                // A material on a composite shape paints every primitive in it.
                if let Some(m) = material {
                    paint(arena, id, &m);
                }
                id
            },
        };

        arena.set_transform(id, transform(&self.transforms)?);
        Ok(id)
    }

    fn missing(&self, field: &'static str) -> SceneError {
        SceneError::MissingField { kind: self.ty.clone(), field }
    }

    /// Reads exactly three tuples from a list field.
    fn three<F>(&self, field: &'static str, values: &Option<Vec<Vec<f64>>>,
        f: F) -> Result<[Tuple4D; 3]>
    where
        F: Fn(&'static str, &[f64]) -> Result<Tuple4D>,
    {
        let values = values.as_ref().ok_or_else(|| self.missing(field))?;
        if values.len() != 3 {
            return Err(SceneError::BadArity {
                field, expected: 3, found: values.len()
            });
        }

        Ok([f(field, &values[0])?, f(field, &values[1])?, f(field, &values[2])?])
    }
}

impl MaterialConfig {
    /// Builds a material, starting from the defaults.
    pub fn build(&self) -> Result<Material> {
        let mut m = Material::default();

        if let Some(ref c) = self.color {
            m.color = color("color", c)?;
        }
        if let Some(ref p) = self.pattern {
            m.pattern = Some(p.build()?);
        }

        m.ambient = self.ambient.unwrap_or(m.ambient);
        m.diffuse = self.diffuse.unwrap_or(m.diffuse);
        m.specular = self.specular.unwrap_or(m.specular);
        m.shininess = self.shininess.unwrap_or(m.shininess);
        m.reflective = self.reflective.unwrap_or(m.reflective);
        m.transparency = self.transparency.unwrap_or(m.transparency);
        m.refractive_index = self.refractive_index.unwrap_or(m.refractive_index);

        Ok(m)
    }
}

impl PatternConfig {
    pub fn build(&self) -> Result<Pattern> {
        let a = color("a", &self.a)?;
        let b = color("b", &self.b)?;

        let pattern = match self.ty.as_str() {
            "stripe" => Pattern::stripe(a, b),
            "gradient" => Pattern::gradient(a, b),
            "ring" => Pattern::ring(a, b),
            "checkers" => Pattern::checkers(a, b),
            other => return Err(SceneError::UnknownPattern(other.into())),
        };

        Ok(pattern.with_transform(transform(&self.transforms)?))
    }
}

impl TransformConfig {
    pub fn matrix(&self) -> Result<Matrix4D> {
        Ok(match self {
            TransformConfig::Translate(v) => {
                let [x, y, z] = components::<3>("translate", v)?;
                Matrix4D::translation(x, y, z)
            },
            TransformConfig::Scale(v) => {
                let [x, y, z] = components::<3>("scale", v)?;
                Matrix4D::scaling(x, y, z)
            },
            TransformConfig::RotateX(r) => Matrix4D::rotation_x(*r),
            TransformConfig::RotateY(r) => Matrix4D::rotation_y(*r),
            TransformConfig::RotateZ(r) => Matrix4D::rotation_z(*r),
            TransformConfig::Shear(v) => {
                let [xy, xz, yx, yz, zx, zy] = components::<6>("shear", v)?;
                Matrix4D::shearing(xy, xz, yx, yz, zx, zy)
            },
        })
    }
}

/// Composes a list of transform steps; the first step is applied first.
pub fn transform(steps: &[TransformConfig]) -> Result<Matrix4D> {
    steps.iter().try_fold(Matrix4D::identity(), |acc, step| {
        Ok(step.matrix()? * acc)
    })
}

/// Assigns `material` to every primitive under `id`.
fn paint(arena: &mut ShapeArena, id: ShapeId, material: &Material) {
    let children: Option<Vec<ShapeId>> = match arena[id].kind {
        ShapeKind::Group(ref children) => Some(children.clone()),
        ShapeKind::Csg(_, left, right) => Some(vec![left, right]),
        _ => None,
    };

    match children {
        Some(children) => {
            for child in children {
                paint(arena, child, material);
            }
        },
        None => {
            if let Some(shape) = arena.get_mut(id) {
                shape.material = *material;
            }
        },
    }
}

fn components<const N: usize>(field: &'static str, values: &[f64])
    -> Result<[f64; N]> {
    values.try_into().map_err(|_| SceneError::BadArity {
        field, expected: N, found: values.len()
    })
}

fn point(field: &'static str, values: &[f64]) -> Result<Tuple4D> {
    let [x, y, z] = components::<3>(field, values)?;
    Ok(Tuple4D::point(x, y, z))
}

fn vector(field: &'static str, values: &[f64]) -> Result<Tuple4D> {
    let [x, y, z] = components::<3>(field, values)?;
    Ok(Tuple4D::vector(x, y, z))
}

fn color(field: &'static str, values: &[f64]) -> Result<Color> {
    let [r, g, b] = components::<3>(field, values)?;
    Ok(Color::rgb(r, g, b))
}

#[cfg(test)]
const CAMERA: &str = r#""camera": {
    "width": 11, "height": 11, "field_of_view": 1.5707963267948966,
    "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
}"#;

#[cfg(test)]
fn scene(body: &str) -> Result<Scene> {
    Scene::from_json(&format!("{{ {}, {} }}", CAMERA, body), Path::new("."))
}

#[test]
fn default_world_from_json_renders_the_same() {
    let s = scene(r#"
        "lights": [ { "position": [-10, 10, -10], "intensity": [1, 1, 1] } ],
        "shapes": [
            { "type": "sphere",
              "material": { "color": [0.8, 1.0, 0.6], "diffuse": 0.7, "specular": 0.2 } },
            { "type": "sphere", "transforms": [ { "scale": [0.5, 0.5, 0.5] } ] }
        ]
    "#).unwrap();

    let image = s.camera.render(&s.world, 5);
    assert_eq!(image.read_pixel(5, 5), Some(Color::rgb(0.38066, 0.47583, 0.2855)));
}

#[test]
fn transforms_apply_in_list_order() {
    let steps: Vec<TransformConfig> = serde_json::from_str(r#"[
        { "rotate_x": 1.5707963267948966 },
        { "scale": [5, 5, 5] },
        { "translate": [10, 5, 7] }
    ]"#).unwrap();

    let m = transform(&steps).unwrap();
    assert_eq!(m * Tuple4D::point(1.0, 0.0, 1.0), Tuple4D::point(15.0, 0.0, 7.0));
}

#[test]
fn csg_and_group_entries_link_parents() {
    let s = scene(r#"
        "shapes": [
            { "type": "csg", "operation": "difference",
              "left": { "type": "cube" },
              "right": { "type": "group", "children": [ { "type": "sphere" } ] } }
        ]
    "#).unwrap();

    let root = s.world.objects[0];
    match s.world.shape(root).kind {
        ShapeKind::Csg(CsgOp::Difference, left, right) => {
            assert_eq!(s.world.shape(left).parent(), Some(root));
            assert_eq!(s.world.shape(right).parent(), Some(root));
        },
        ref other => panic!("expected a CSG, got {:?}", other),
    }
}

#[test]
fn unknown_csg_operation_is_reported() {
    let err = scene(r#"
        "shapes": [
            { "type": "csg", "operation": "xor",
              "left": { "type": "cube" }, "right": { "type": "sphere" } }
        ]
    "#).unwrap_err();

    assert!(matches!(err, SceneError::UnknownCsgOperation(ref op) if op == "xor"));
}

#[test]
fn bad_entries_are_reported() {
    assert!(matches!(
        scene(r#""shapes": [ { "type": "torus" } ]"#).unwrap_err(),
        SceneError::UnknownShape(_)
    ));

    assert!(matches!(
        scene(r#""shapes": [ { "type": "triangle" } ]"#).unwrap_err(),
        SceneError::MissingField { field: "points", .. }
    ));

    assert!(matches!(
        scene(r#""lights": [ { "position": [0, 0], "intensity": [1, 1, 1] } ]"#)
            .unwrap_err(),
        SceneError::BadArity { field: "position", expected: 3, found: 2 }
    ));

    assert!(matches!(
        Scene::from_json("{ not json", Path::new(".")).unwrap_err(),
        SceneError::Json(_)
    ));
}

#[test]
fn material_and_pattern_entries() {
    let m: MaterialConfig = serde_json::from_str(r#"{
        "reflective": 0.5,
        "pattern": { "type": "checkers", "a": [1, 1, 1], "b": [0, 0, 0],
                     "transforms": [ { "scale": [0.5, 0.5, 0.5] } ] }
    }"#).unwrap();

    let m = m.build().unwrap();
    assert_eq!(m.reflective, 0.5);
    assert_eq!(m.diffuse, 0.9);

    let pattern = m.pattern.unwrap();
    assert_eq!(pattern.pattern_at_object(Tuple4D::point(0.25, 0.0, 0.0)), Color::WHITE);
    assert_eq!(pattern.pattern_at_object(Tuple4D::point(0.75, 0.0, 0.0)), Color::BLACK);
}

#[test]
fn group_material_paints_its_primitives() {
    let s = scene(r#"
        "shapes": [
            { "type": "group", "material": { "reflective": 0.25 },
              "children": [ { "type": "sphere" }, { "type": "cube" } ] }
        ]
    "#).unwrap();

    let group = s.world.objects[0];
    for &child in s.world.shape(group).children().unwrap() {
        assert_eq!(s.world.shape(child).material.reflective, 0.25);
    }
}
