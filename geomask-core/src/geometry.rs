//! Mesh primitives for the silhouette
use nalgebra::{Point3, Vector3};
use std::cell::OnceCell;
use std::collections::HashSet;

/// Left eye socket (center of the left eye ring)
pub const LEFT_EYE: usize = 13;
/// Right eye socket
pub const RIGHT_EYE: usize = 14;
/// Top of the nose ridge
pub const NOSE_BRIDGE: usize = 15;
/// Tip of the nose ridge
pub const NOSE_TIP: usize = 18;
/// Vertices that carry a pulsing glow dot
pub const GLOW_VERTICES: [usize; 13] = [0, 3, 4, 5, 8, 18, 23, 25, 26, 29, 31, 36, 39];

/// Authored model-space positions. Y grows downwards, Z grows towards the viewer.
const MASK_VERTICES: [[f32; 3]; 46] = [
    [0.0, -180.0, 30.0],    // top center
    [-75.0, -160.0, 20.0],  // top left
    [75.0, -160.0, 20.0],   // top right
    [-120.0, -120.0, 0.0],  // temple left
    [120.0, -120.0, 0.0],   // temple right
    [-85.0, -95.0, 35.0],   // brow left outer
    [-40.0, -90.0, 45.0],   // brow left inner
    [40.0, -90.0, 45.0],    // brow right inner
    [85.0, -95.0, 35.0],    // brow right outer
    [-60.0, -65.0, 30.0],   // left eye outer
    [-25.0, -60.0, 38.0],   // left eye inner
    [25.0, -60.0, 38.0],    // right eye inner
    [60.0, -65.0, 30.0],    // right eye outer
    [-42.0, -68.0, 42.0],   // left eye center
    [42.0, -68.0, 42.0],    // right eye center
    [0.0, -55.0, 52.0],     // nose bridge top
    [-15.0, -30.0, 55.0],   // nose left
    [15.0, -30.0, 55.0],    // nose right
    [0.0, -10.0, 58.0],     // nose tip
    [-105.0, -50.0, 10.0],  // left cheek outer
    [-70.0, -30.0, 25.0],   // left cheek
    [70.0, -30.0, 25.0],    // right cheek
    [105.0, -50.0, 10.0],   // right cheek outer
    [-35.0, 15.0, 40.0],    // mouth left
    [0.0, 20.0, 45.0],      // mouth center
    [35.0, 15.0, 40.0],     // mouth right
    [-95.0, 10.0, 5.0],     // jaw left outer
    [-65.0, 45.0, 15.0],    // jaw left
    [65.0, 45.0, 15.0],     // jaw right
    [95.0, 10.0, 5.0],      // jaw right outer
    [-30.0, 65.0, 30.0],    // chin left
    [0.0, 75.0, 35.0],      // chin center
    [30.0, 65.0, 30.0],     // chin right
    [-40.0, 100.0, 15.0],   // neck left
    [0.0, 110.0, 20.0],     // neck center
    [40.0, 100.0, 15.0],    // neck right
    [-130.0, 160.0, -10.0], // shoulder left
    [-60.0, 140.0, 5.0],    // shoulder-neck left
    [60.0, 140.0, 5.0],     // shoulder-neck right
    [130.0, 160.0, -10.0],  // shoulder right
    [-80.0, -140.0, -40.0], // back left top
    [80.0, -140.0, -40.0],  // back right top
    [-100.0, -60.0, -50.0], // back left mid
    [100.0, -60.0, -50.0],  // back right mid
    [-80.0, 30.0, -40.0],   // back left low
    [80.0, 30.0, -40.0],    // back right low
];

/// Authored faces: three vertex ids followed by the shade level.
#[rustfmt::skip]
const MASK_FACES: [[usize; 4]; 75] = [
    [0, 1, 6, 2], [0, 6, 7, 2], [0, 7, 2, 2],
    [1, 3, 5, 1], [1, 5, 6, 1],
    [2, 8, 4, 1], [2, 7, 8, 1],
    [5, 9, 6, 2], [6, 9, 10, 3], [6, 10, 15, 3],
    [6, 15, 7, 3], [7, 15, 11, 3], [7, 11, 12, 3],
    [7, 12, 8, 2],
    [10, 16, 15, 3], [15, 17, 11, 3],
    [16, 18, 17, 4], [16, 17, 15, 3],
    [5, 19, 9, 1], [9, 19, 20, 1], [9, 20, 10, 2],
    [19, 26, 20, 0], [20, 26, 23, 1],
    [8, 12, 22, 1], [12, 21, 22, 1], [11, 21, 12, 2],
    [22, 29, 21, 0], [21, 29, 25, 1],
    [20, 23, 10, 2], [10, 23, 16, 2],
    [16, 23, 24, 2], [16, 24, 18, 3],
    [18, 24, 17, 3], [17, 24, 25, 2],
    [17, 25, 11, 2], [11, 25, 21, 2],
    [26, 27, 23, 0], [23, 27, 30, 1],
    [23, 30, 24, 1], [24, 30, 31, 2],
    [24, 31, 32, 2], [24, 32, 25, 1],
    [25, 32, 28, 1], [25, 28, 29, 0],
    [30, 33, 31, 1], [31, 33, 34, 0],
    [31, 34, 35, 0], [31, 35, 32, 1],
    [32, 35, 28, 0],
    [33, 37, 34, 0], [34, 37, 38, 0], [34, 38, 35, 0],
    [36, 37, 33, 0], [35, 38, 39, 0],
    [3, 40, 42, 0], [3, 42, 19, 0], [19, 42, 44, 0], [19, 44, 26, 0],
    [4, 43, 41, 0], [4, 22, 43, 0], [22, 43, 45, 0], [22, 45, 29, 0],
    [40, 41, 0, 0], [40, 0, 1, 0], [41, 2, 0, 0],
    [40, 42, 43, 0], [40, 43, 41, 0],
    [42, 44, 45, 0], [42, 45, 43, 0],
    [44, 26, 27, 0], [44, 27, 30, 0], [44, 30, 33, 0],
    [45, 29, 28, 0], [45, 28, 32, 0], [45, 32, 35, 0],
];

/// A model-space vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: usize,
    pub position: Point3<f32>,
}

impl Vertex {
    pub fn new(id: usize, x: f32, y: f32, z: f32) -> Self {
        Self {
            id,
            position: Point3::new(x, y, z),
        }
    }
}

/// A triangle face defined by three vertex ids and a shade level (0-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub shade: u8,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize, shade: u8) -> Self {
        Self {
            vertices: [a, b, c],
            shade,
        }
    }

    /// Calculate the face normal from positions indexed by vertex id.
    ///
    /// Degenerate triangles yield a zero vector, so they receive no diffuse light.
    pub fn normal(&self, positions: &[Point3<f32>]) -> Vector3<f32> {
        let [a, b, c] = self.vertices;
        let edge1 = positions[b] - positions[a];
        let edge2 = positions[c] - positions[a];

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// The three undirected edges of this face
    pub fn edges(&self) -> [Edge; 3] {
        let [a, b, c] = self.vertices;
        [Edge::new(a, b), Edge::new(b, c), Edge::new(a, c)]
    }
}

/// Undirected edge stored under its canonical (min, max) key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn new(i: usize, j: usize) -> Self {
        Self {
            a: i.min(j),
            b: i.max(j),
        }
    }
}

/// An immutable triangle mesh with a lazily derived edge list
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    edges: OnceCell<Vec<Edge>>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        debug_assert!(faces
            .iter()
            .all(|face| face.vertices.iter().all(|&v| v < vertices.len())));

        Self {
            vertices,
            faces,
            edges: OnceCell::new(),
        }
    }

    /// The authored head-and-shoulders silhouette
    pub fn silhouette() -> Self {
        let vertices = MASK_VERTICES
            .iter()
            .enumerate()
            .map(|(id, &[x, y, z])| Vertex::new(id, x, y, z))
            .collect();
        let faces = MASK_FACES
            .iter()
            .map(|&[a, b, c, shade]| Face::new(a, b, c, shade as u8))
            .collect();

        Self::new(vertices, faces)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Deduplicated edges in first-seen order, built on first access
    pub fn edges(&self) -> &[Edge] {
        self.edges.get_or_init(|| {
            let mut seen = HashSet::with_capacity(self.faces.len() * 3);
            let mut edges = Vec::with_capacity(self.faces.len() * 3 / 2);
            for face in &self.faces {
                for edge in face.edges() {
                    if seen.insert(edge) {
                        edges.push(edge);
                    }
                }
            }
            edges
        })
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::silhouette()
    }
}
