//! Triangle mesh data structures and bounds

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    /// Build the bounding box of a point set, `None` for an empty set
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3f>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self { min: first, max: first };
        for p in iter {
            bounds.expand(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `point`
    pub fn expand(&mut self, point: &Point3f) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(point[i]);
            self.max[i] = self.max[i].max(point[i]);
        }
    }

    /// Merge two boxes into their union
    pub fn union(self, other: Self) -> Self {
        let mut merged = self;
        merged.expand(&other.min);
        merged.expand(&other.max);
        merged
    }

    /// Center of the box
    pub fn center(&self) -> Point3f {
        Point3f::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Radius of the bounding sphere enclosing the box
    pub fn radius(&self) -> f32 {
        ((self.max - self.min).norm() * 0.5).max(f32::EPSILON)
    }
}

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<[u8; 3]>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            colors: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
            colors: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex colors
    pub fn set_colors(&mut self, colors: Vec<[u8; 3]>) {
        if colors.len() == self.vertices.len() {
            self.colors = Some(colors);
        }
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                let normal = edge1.cross(&edge2);
                if normal.norm() > f32::EPSILON {
                    normal.normalize()
                } else {
                    Vector3f::new(0.0, 0.0, 1.0)
                }
            })
            .collect()
    }

    /// Calculate per-vertex normals by averaging incident face normals
    pub fn calculate_vertex_normals(&self) -> Vec<Vector3f> {
        let face_normals = self.calculate_face_normals();
        let mut normals = vec![Vector3f::zeros(); self.vertices.len()];
        for (face, normal) in self.faces.iter().zip(face_normals.iter()) {
            for &index in face {
                normals[index] += normal;
            }
        }
        for normal in &mut normals {
            if normal.norm() > f32::EPSILON {
                *normal = normal.normalize();
            } else {
                *normal = Vector3f::new(0.0, 0.0, 1.0);
            }
        }
        normals
    }

    /// Unique undirected edges of the mesh, as vertex index pairs
    pub fn edges(&self) -> Vec<[usize; 2]> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for face in &self.faces {
            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    edges.push([key.0, key.1]);
                }
            }
        }
        edges
    }

    /// Axis-aligned bounds of the vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
