use std::io::{ self, BufRead };
use std::fs::File;
use std::path::Path;
use std::collections::BTreeMap;

use log::{ debug, info };

use crate::Result;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::geometry::TriangleInfo;
use crate::shape::{ Shape, ShapeId };
use crate::arena::ShapeArena;

/// A face in an OBJ file: one-based vertex, texture and normal indices.
type ObjFace = Vec<(usize, Option<usize>, Option<usize>)>;

/// Name of the group collecting faces that appear before any `g` line.
const DEFAULT_GROUP: &str = "";

/// A parser for the subset of OBJ used to describe triangle meshes.
///
/// Recognized lines are `v` (vertex), `vn` (vertex normal), `f` (face) and
/// `g` (group). Anything else, and any malformed line, is counted in
/// `ignored_lines` and otherwise skipped; parsing never fails on content.
#[derive(Clone, Debug)]
pub struct ObjParser {
    pub ignored_lines: usize,

    pub vertices: Vec<Tuple4D>,
    pub normals: Vec<Tuple4D>,

    /// Triangles per group name. Faces before the first `g` line go in the
    /// group named `""`.
    pub groups: BTreeMap<String, Vec<Shape>>,

    current_group: String,
}

impl Default for ObjParser {
    fn default() -> ObjParser {
        ObjParser::new()
    }
}

impl ObjParser {
    pub fn new() -> ObjParser {
        let mut groups = BTreeMap::new();
        groups.insert(DEFAULT_GROUP.into(), Vec::new());

        ObjParser {
            ignored_lines: 0,
            vertices: Vec::new(),
            normals: Vec::new(),
            groups,
            current_group: DEFAULT_GROUP.into(),
        }
    }

    /// Opens and parses the OBJ file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ObjParser> {
        let file = File::open(path.as_ref())?;

        let mut parser = ObjParser::new();
        parser.parse(io::BufReader::new(file))?;

        info!("Loaded {} ({} vertices, {} groups, {} lines ignored)",
            path.as_ref().display(), parser.vertices.len(),
            parser.groups.len(), parser.ignored_lines);

        Ok(parser)
    }

    /// Parses OBJ text from any buffered reader.
    ///
    /// Only I/O failures are errors.
    pub fn parse<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (n, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            if !self.handle_command(&line) {
                debug!("Ignoring OBJ line {}: {:?}", n + 1, line);
                self.ignored_lines += 1;
            }
        }

        Ok(())
    }

    /// Parses OBJ text held in memory.
    pub fn parse_str(&mut self, text: &str) -> Result<()> {
        self.parse(text.as_bytes())
    }

    /// Handles one line of an OBJ file, returning whether it was used.
    ///
    /// A sample OBJ file may look like the following:
    ///
    /// ```obj
    /// v -1 1 0
    /// v -1 0 0
    /// v 1 0 0
    /// v 1 1 0
    ///
    /// g FirstGroup
    /// f 1 2 3
    /// g SecondGroup
    /// f 1 3 4
    /// ```
    ///
    /// Groups do not nest; `SecondGroup` above is separate from
    /// `FirstGroup`. Naming a group again switches back to it.
    fn handle_command(&mut self, line: &str) -> bool {
        let params: Vec<&str> = line.split_whitespace().collect();

        match params.as_slice() {
            ["v", x, y, z, ..] => match parse_triple(x, y, z) {
                Some((x, y, z)) => {
                    self.vertices.push(Tuple4D::point(x, y, z));
                    true
                },
                None => false,
            },

            ["vn", x, y, z, ..] => match parse_triple(x, y, z) {
                Some((x, y, z)) => {
                    self.normals.push(Tuple4D::vector(x, y, z));
                    true
                },
                None => false,
            },

            ["f", vertices @ ..] if vertices.len() >= 3 => {
                match self.parse_face(vertices) {
                    Some(face) => {
                        let triangles = self.fan_triangulation(&face);
                        self.groups.entry(self.current_group.clone())
                            .or_default()
                            .extend(triangles);
                        true
                    },
                    None => false,
                }
            },

            ["g", name, ..] => {
                self.groups.entry(name.to_string()).or_default();
                self.current_group = name.to_string();
                true
            },

            _ => false,
        }
    }

    /// Parses the vertex references of a face.
    ///
    /// Each reference is `v`, `v/t`, `v//n` or `v/t/n`. Returns `None` when a
    /// reference is malformed or out of range.
    fn parse_face(&self, vertices: &[&str]) -> Option<ObjFace> {
        let mut face: ObjFace = Vec::with_capacity(vertices.len());

        for vertex in vertices {
            let mut attributes = vertex.split('/');

            let v: usize = attributes.next()?.parse().ok()?;
            let t: Option<usize> = match attributes.next() {
                Some("") | None => None,
                Some(t) => Some(t.parse().ok()?),
            };
            let n: Option<usize> = match attributes.next() {
                Some("") | None => None,
                Some(n) => Some(n.parse().ok()?),
            };

            if attributes.next().is_some() {
                return None;
            }

            if v == 0 || v > self.vertices.len() {
                return None;
            }
            if let Some(n) = n {
                if n == 0 || n > self.normals.len() {
                    return None;
                }
            }

            face.push((v, t, n));
        }


        Some(face)
    }

    /// Partitions a polygon into triangles.
    ///
    /// Faces can list any number of vertices:
    ///
    /// ```obj
    /// f 1 2 3 4 5
    /// ```
    ///
    /// Since only triangle primitives exist, the polygon is split into a
    /// "fan" sharing the first vertex:
    ///
    /// ```text
    ///         B *
    ///          / \
    ///         /   \
    ///     A *       * C
    ///       |       |
    ///     E * ----- * D
    /// ```
    ///
    /// Starting at `A` this gives `A-B-C`, `A-C-D` and `A-D-E`. The polygon
    /// is assumed to be convex and planar. A face with any vertex normal
    /// produces smooth triangles; corners without a normal use the flat
    /// normal of their triangle.
    fn fan_triangulation(&self, face: &ObjFace) -> Vec<Shape> {
        let smooth = face.iter().any(|f| f.2.is_some());

        // Indices in the face are one-based.
        let vertex = |i: usize| self.vertices[face[i].0 - 1];
        let normal = |i: usize| face[i].2.map(|n| self.normals[n - 1]);

        (1..(face.len() - 1)).map(|i| {
            let (p1, p2, p3) = (vertex(0), vertex(i), vertex(i + 1));
            if !smooth {
                return Shape::triangle(p1, p2, p3);
            }

            let flat = TriangleInfo::new(p1, p2, p3).normal;
            Shape::smooth_triangle(p1, p2, p3,
                normal(0).unwrap_or(flat),
                normal(i).unwrap_or(flat),
                normal(i + 1).unwrap_or(flat))
        }).collect()
    }

    /// Moves every parsed triangle into `arena`.
    ///
    /// Each non-empty OBJ group becomes a group shape; all of them become
    /// children of one new parent group, which is returned.
    pub fn into_group(self, arena: &mut ShapeArena) -> ShapeId {
        let parent = arena.insert(Shape::group());

        for (_, triangles) in self.groups {
            if triangles.is_empty() {
                continue;
            }

            let ids: Vec<ShapeId> = triangles.into_iter()
                .map(|t| arena.insert(t))
                .collect();
            let group = arena.group(Matrix4D::identity(), &ids);
            arena.add_child(parent, group);
        }

        parent
    }
}

fn parse_triple(x: &str, y: &str, z: &str) -> Option<(f64, f64, f64)> {
    Some((x.parse().ok()?, y.parse().ok()?, z.parse().ok()?))
}

#[cfg(test)]
fn parsed(text: &str) -> ObjParser {
    let mut parser = ObjParser::new();
    parser.parse_str(text).unwrap();
    parser
}

#[cfg(test)]
fn triangle_points(s: &Shape) -> (Tuple4D, Tuple4D, Tuple4D) {
    use crate::shape::ShapeKind;

    match s.kind {
        ShapeKind::Triangle(ti) => (ti.p1, ti.p2, ti.p3),
        ShapeKind::SmoothTriangle(sti)
            => (sti.triangle_info.p1, sti.triangle_info.p2, sti.triangle_info.p3),
        _ => panic!("expected a triangle, got {:?}", s.kind),
    }
}

#[test]
fn ignoring_unrecognized_lines() {
    let parser = parsed("There was a young lady named Bright\n\
        who traveled much faster than light.\n\
        She set out one day\n\
        in a relative way,\n\
        and came back the previous night.\n");

    assert_eq!(parser.ignored_lines, 5);
}

#[test]
fn malformed_lines_are_ignored_too() {
    let parser = parsed("v 1 2\nv a b c\nv 1 1 1\nf 1 2 3\nf 1\ng\n");

    assert_eq!(parser.vertices.len(), 1);
    assert_eq!(parser.ignored_lines, 5);
}

#[test]
fn vertex_records() {
    let parser = parsed("v -1 1 0\nv -1.0000 0.5000 0.0000\nv 1 0 0\nv 1 1 0\n");

    assert_eq!(parser.ignored_lines, 0);
    assert_eq!(parser.vertices, vec![
        Tuple4D::point(-1.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.5, 0.0),
        Tuple4D::point( 1.0, 0.0, 0.0),
        Tuple4D::point( 1.0, 1.0, 0.0),
    ]);
}

#[test]
fn parsing_triangle_faces() {
    let parser = parsed("v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\nf 1 2 3\nf 1 3 4\n");
    let triangles = &parser.groups[DEFAULT_GROUP];

    assert_eq!(triangles.len(), 2);
    assert_eq!(triangle_points(&triangles[0]),
        (parser.vertices[0], parser.vertices[1], parser.vertices[2]));
    assert_eq!(triangle_points(&triangles[1]),
        (parser.vertices[0], parser.vertices[2], parser.vertices[3]));
}

#[test]
fn triangulating_polygons() {
    let parser = parsed("v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\nv 0 2 0\n\nf 1 2 3 4 5\n");
    let triangles = &parser.groups[DEFAULT_GROUP];
    let v = &parser.vertices;

    assert_eq!(triangles.len(), 3);
    assert_eq!(triangle_points(&triangles[0]), (v[0], v[1], v[2]));
    assert_eq!(triangle_points(&triangles[1]), (v[0], v[2], v[3]));
    assert_eq!(triangle_points(&triangles[2]), (v[0], v[3], v[4]));
}

#[test]
fn triangles_in_named_groups() {
    let parser = parsed("v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\
        g FirstGroup\nf 1 2 3\ng SecondGroup\nf 1 3 4\n");

    assert_eq!(parser.groups["FirstGroup"].len(), 1);
    assert_eq!(parser.groups["SecondGroup"].len(), 1);
    assert!(parser.groups[DEFAULT_GROUP].is_empty());
}

#[test]
fn vertex_normal_records() {
    let parser = parsed("vn 0 0 1\nvn 0.707 0 -0.707\nvn 1 2 3\n");

    assert_eq!(parser.normals, vec![
        Tuple4D::vector(0.0, 0.0, 1.0),
        Tuple4D::vector(0.707, 0.0, -0.707),
        Tuple4D::vector(1.0, 2.0, 3.0),
    ]);
}

#[test]
fn faces_with_normals_are_smooth() {
    use crate::shape::ShapeKind;

    let parser = parsed("v 0 1 0\nv -1 0 0\nv 1 0 0\n\
        vn -1 0 0\nvn 1 0 0\nvn 0 1 0\n\
        f 1//3 2//1 3//2\nf 1/0/3 2/102/1 3/14/2\n");
    let triangles = &parser.groups[DEFAULT_GROUP];

    assert_eq!(triangles.len(), 2);
    for t in triangles {
        match t.kind {
            ShapeKind::SmoothTriangle(sti) => {
                assert_eq!(sti.n1, parser.normals[2]);
                assert_eq!(sti.n2, parser.normals[0]);
                assert_eq!(sti.n3, parser.normals[1]);
            },
            _ => panic!("expected a smooth triangle"),
        }
    }
}

#[test]
fn faces_with_some_normals_are_smooth() {
    use crate::shape::ShapeKind;

    let parser = parsed("v 0 1 0\nv -1 0 0\nv 1 0 0\nvn 0 1 0\nf 1//1 2 3\n");
    let triangles = &parser.groups[DEFAULT_GROUP];

    assert_eq!(parser.ignored_lines, 0);
    assert_eq!(triangles.len(), 1);
    match triangles[0].kind {
        ShapeKind::SmoothTriangle(sti) => {
            let flat = sti.triangle_info.normal;
            assert_eq!(flat, Tuple4D::vector(0.0, 0.0, -1.0));
            assert_eq!(sti.n1, parser.normals[0]);
            assert_eq!(sti.n2, flat);
            assert_eq!(sti.n3, flat);
        },
        _ => panic!("expected a smooth triangle"),
    }
}

#[test]
fn out_of_range_faces_are_ignored() {
    let parser = parsed("v 0 1 0\nv -1 0 0\nv 1 0 0\nf 1 2 4\nf 1//1 2//1 3//1\n");

    assert!(parser.groups[DEFAULT_GROUP].is_empty());
    assert_eq!(parser.ignored_lines, 2);
}

#[test]
fn converting_to_a_group() {
    let parser = parsed("v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\
        g FirstGroup\nf 1 2 3\ng SecondGroup\nf 1 3 4\n");

    let mut arena = ShapeArena::new();
    let g = parser.into_group(&mut arena);

    let children = arena[g].children().unwrap().clone();
    assert_eq!(children.len(), 2);
    for child in children {
        assert_eq!(arena[child].parent(), Some(g));
        assert_eq!(arena[child].children().map(|c| c.len()), Some(1));
    }
}
