//! Wavefront OBJ decoder
//!
//! Handles `v`, `vn` and `f` records. Faces reference vertices 1-based
//! (negative indices count from the end) and are fan-triangulated. Normals
//! are kept only when they line up one per vertex.

use crate::registry::MeshDecoder;
use geomviewer_core::{Dataset, Error, Point3f, Result, TriangleMesh, Vector3f};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub struct ObjDecoder;

impl MeshDecoder for ObjDecoder {
    fn decode(&self, path: &Path) -> Result<Dataset> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut vertices: Vec<Point3f> = Vec::new();
        let mut normals: Vec<Vector3f> = Vec::new();
        let mut faces: Vec<[usize; 3]> = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let [x, y, z] = parse_triplet(&mut tokens, line_no)?;
                    vertices.push(Point3f::new(x, y, z));
                }
                Some("vn") => {
                    let [x, y, z] = parse_triplet(&mut tokens, line_no)?;
                    normals.push(Vector3f::new(x, y, z));
                }
                Some("f") => {
                    let polygon: Vec<usize> = tokens
                        .map(|token| parse_face_index(token, vertices.len(), line_no))
                        .collect::<Result<_>>()?;
                    if polygon.len() < 3 {
                        return Err(Error::InvalidData(format!(
                            "face with {} vertices at line {}",
                            polygon.len(),
                            line_no + 1
                        )));
                    }
                    for i in 1..polygon.len() - 1 {
                        faces.push([polygon[0], polygon[i], polygon[i + 1]]);
                    }
                }
                // Comments, groups, materials and texture coordinates are
                // irrelevant to a geometry-only viewer.
                _ => {}
            }
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if normals.len() == mesh.vertex_count() {
            mesh.set_normals(normals);
        }
        Ok(Dataset::Surface(mesh))
    }

    fn format_name(&self) -> &'static str {
        "obj"
    }
}

fn parse_triplet<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; 3]> {
    let mut values = [0.0f32; 3];
    for value in &mut values {
        let token = tokens.next().ok_or_else(|| {
            Error::InvalidData(format!("truncated coordinate at line {}", line_no + 1))
        })?;
        *value = token.parse().map_err(|_| {
            Error::InvalidData(format!("invalid coordinate '{}' at line {}", token, line_no + 1))
        })?;
    }
    Ok(values)
}

/// Resolve one face token (`7`, `7/1`, `7//3`, `-1`) to a 0-based index
fn parse_face_index(token: &str, vertex_count: usize, line_no: usize) -> Result<usize> {
    let vertex_part = token.split('/').next().unwrap_or(token);
    let raw: i64 = vertex_part.parse().map_err(|_| {
        Error::InvalidData(format!("invalid face index '{}' at line {}", token, line_no + 1))
    })?;
    let resolved = if raw > 0 {
        raw as usize - 1
    } else if raw < 0 {
        let back = (-raw) as usize;
        if back > vertex_count {
            return Err(Error::InvalidData(format!(
                "face index {} out of range at line {}",
                raw,
                line_no + 1
            )));
        }
        vertex_count - back
    } else {
        return Err(Error::InvalidData(format!(
            "face index 0 at line {}",
            line_no + 1
        )));
    };
    if resolved >= vertex_count {
        return Err(Error::InvalidData(format!(
            "face index {} out of range at line {}",
            raw,
            line_no + 1
        )));
    }
    Ok(resolved)
}
