//! STL decoder, binary and ASCII
//!
//! Binary is detected by the 80-byte-header + 4 + 50·n size equation; a file
//! starting with `solid` that fails that check is parsed as ASCII. Facet
//! vertices are welded by exact coordinate match so shared edges are real.

use crate::registry::MeshDecoder;
use geomviewer_core::{Dataset, Error, Point3f, Result, TriangleMesh};
use std::collections::HashMap;
use std::path::Path;

pub struct StlDecoder;

impl MeshDecoder for StlDecoder {
    fn decode(&self, path: &Path) -> Result<Dataset> {
        let bytes = std::fs::read(path)?;
        let mesh = if is_binary(&bytes) {
            decode_binary(&bytes)?
        } else {
            decode_ascii(&bytes)?
        };
        Ok(Dataset::Surface(mesh))
    }

    fn format_name(&self) -> &'static str {
        "stl"
    }
}

fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < 84 {
        return false;
    }
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    bytes.len() == 84 + count * 50
}

/// Welds exact-duplicate vertices while building the mesh
#[derive(Default)]
struct VertexWelder {
    vertices: Vec<Point3f>,
    lookup: HashMap<[u32; 3], usize>,
}

impl VertexWelder {
    fn index_of(&mut self, point: Point3f) -> usize {
        let key = [point.x.to_bits(), point.y.to_bits(), point.z.to_bits()];
        *self.lookup.entry(key).or_insert_with(|| {
            self.vertices.push(point);
            self.vertices.len() - 1
        })
    }
}

fn decode_binary(bytes: &[u8]) -> Result<TriangleMesh> {
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;

    let mut welder = VertexWelder::default();
    let mut faces = Vec::with_capacity(count);

    for i in 0..count {
        let record = &bytes[84 + i * 50..84 + (i + 1) * 50];
        // Skip the facet normal (first 12 bytes); normals are recomputed
        // from geometry during adaptation.
        let mut face = [0usize; 3];
        for (v, slot) in face.iter_mut().enumerate() {
            let base = 12 + v * 12;
            let point = Point3f::new(
                read_f32(record, base),
                read_f32(record, base + 4),
                read_f32(record, base + 8),
            );
            *slot = welder.index_of(point);
        }
        faces.push(face);
    }

    Ok(TriangleMesh::from_vertices_and_faces(welder.vertices, faces))
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn decode_ascii(bytes: &[u8]) -> Result<TriangleMesh> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::InvalidData("STL file is neither valid binary nor ASCII".to_string()))?;
    if !text.trim_start().starts_with("solid") {
        return Err(Error::InvalidData("missing 'solid' header".to_string()));
    }

    let mut welder = VertexWelder::default();
    let mut faces = Vec::new();
    let mut pending: Vec<usize> = Vec::new();

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("vertex") => {
                let mut coords = [0.0f32; 3];
                for value in &mut coords {
                    let token = tokens.next().ok_or_else(|| {
                        Error::InvalidData("truncated vertex record".to_string())
                    })?;
                    *value = token.parse().map_err(|_| {
                        Error::InvalidData(format!("invalid vertex coordinate '{}'", token))
                    })?;
                }
                pending.push(welder.index_of(Point3f::new(coords[0], coords[1], coords[2])));
            }
            Some("endfacet") => {
                if pending.len() != 3 {
                    return Err(Error::InvalidData(format!(
                        "facet with {} vertices",
                        pending.len()
                    )));
                }
                faces.push([pending[0], pending[1], pending[2]]);
                pending.clear();
            }
            _ => {}
        }
    }

    if !pending.is_empty() {
        return Err(Error::InvalidData("unterminated facet".to_string()));
    }

    Ok(TriangleMesh::from_vertices_and_faces(welder.vertices, faces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("geomviewer_stl_{}", name))
    }

    const ASCII_STL: &str = "\
solid square
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 1 1 0
  endloop
endfacet
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 1 0
    vertex 0 1 0
  endloop
endfacet
endsolid square
";

    fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut bytes = vec![0u8; 80];
        bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            for _ in 0..3 {
                bytes.extend_from_slice(&0.0f32.to_le_bytes());
            }
            for vertex in triangle {
                for &coord in vertex {
                    bytes.extend_from_slice(&coord.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_ascii_square_welds_shared_vertices() {
        let path = fixture_path("square.stl");
        fs::write(&path, ASCII_STL).unwrap();
        let Dataset::Surface(mesh) = StlDecoder.decode(&path).unwrap() else {
            panic!("stl should decode as a surface");
        };
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_binary_triangle() {
        let path = fixture_path("tri_binary.stl");
        let bytes = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        fs::write(&path, bytes).unwrap();
        let Dataset::Surface(mesh) = StlDecoder.decode(&path).unwrap() else {
            panic!("stl should decode as a surface");
        };
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_binary_shared_vertices_are_welded() {
        let path = fixture_path("quad_binary.stl");
        let bytes = binary_stl(&[
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        ]);
        fs::write(&path, bytes).unwrap();
        let Dataset::Surface(mesh) = StlDecoder.decode(&path).unwrap() else {
            panic!("stl should decode as a surface");
        };
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let path = fixture_path("garbage.stl");
        fs::write(&path, b"\xff\xfe\x00garbage").unwrap();
        assert!(StlDecoder.decode(&path).is_err());
        let _ = fs::remove_file(path);
    }
}
