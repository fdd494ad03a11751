//! Unstructured grid data structures
//!
//! Volumetric datasets arrive as cells over a shared point set. The viewer
//! only ever draws surfaces, so the grid knows how to extract its boundary:
//! faces referenced by exactly one cell.

use crate::mesh::TriangleMesh;
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cell types of an unstructured grid, tagged with the VTK type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Triangle,
    Quad,
    Tetra,
    Hexahedron,
    Wedge,
    Pyramid,
}

impl CellKind {
    /// Map a VTK cell type code to a kind, `None` for unsupported codes
    pub fn from_type_code(code: u8) -> Option<Self> {
        match code {
            5 => Some(Self::Triangle),
            9 => Some(Self::Quad),
            10 => Some(Self::Tetra),
            12 => Some(Self::Hexahedron),
            13 => Some(Self::Wedge),
            14 => Some(Self::Pyramid),
            _ => None,
        }
    }

    /// Number of points a cell of this kind references
    pub fn point_count(&self) -> usize {
        match self {
            Self::Triangle => 3,
            Self::Quad => 4,
            Self::Tetra => 4,
            Self::Hexahedron => 8,
            Self::Wedge => 6,
            Self::Pyramid => 5,
        }
    }

    /// Faces of a cell as index lists into its connectivity
    fn faces(&self) -> &'static [&'static [usize]] {
        match self {
            Self::Triangle => &[&[0, 1, 2]],
            Self::Quad => &[&[0, 1, 2, 3]],
            Self::Tetra => &[&[0, 2, 1], &[0, 1, 3], &[1, 2, 3], &[0, 3, 2]],
            Self::Hexahedron => &[
                &[0, 3, 2, 1],
                &[4, 5, 6, 7],
                &[0, 1, 5, 4],
                &[1, 2, 6, 5],
                &[2, 3, 7, 6],
                &[3, 0, 4, 7],
            ],
            Self::Wedge => &[&[0, 2, 1], &[3, 4, 5], &[0, 1, 4, 3], &[1, 2, 5, 4], &[2, 0, 3, 5]],
            Self::Pyramid => &[&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]],
        }
    }
}

/// A single grid cell: kind plus point indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    pub connectivity: Vec<usize>,
}

/// An unstructured grid of cells over a shared point set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstructuredGrid {
    pub points: Vec<Point3f>,
    pub cells: Vec<Cell>,
}

impl UnstructuredGrid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Get the number of points
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Get the number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the grid is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.cells.is_empty()
    }

    /// Extract the boundary surface of the grid as a triangle mesh
    ///
    /// A face belongs to the boundary when exactly one cell references it.
    /// Quad faces are fan-triangulated. The full point set is carried over so
    /// face indices stay valid.
    pub fn boundary_surface(&self) -> TriangleMesh {
        let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();
        for cell in &self.cells {
            for face in cell.kind.faces() {
                let mut key: Vec<usize> = face.iter().map(|&i| cell.connectivity[i]).collect();
                key.sort_unstable();
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        let mut faces = Vec::new();
        for cell in &self.cells {
            for face in cell.kind.faces() {
                let indices: Vec<usize> = face.iter().map(|&i| cell.connectivity[i]).collect();
                let mut key = indices.clone();
                key.sort_unstable();
                if counts.get(&key).copied() != Some(1) {
                    continue;
                }
                for i in 1..indices.len() - 1 {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
        }

        TriangleMesh::from_vertices_and_faces(self.points.clone(), faces)
    }
}

impl Default for UnstructuredGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoded geometric dataset: a surface mesh or a volumetric grid
#[derive(Debug, Clone)]
pub enum Dataset {
    Surface(TriangleMesh),
    Volume(UnstructuredGrid),
}
