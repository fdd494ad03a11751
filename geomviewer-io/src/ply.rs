//! PLY decoder

use crate::registry::MeshDecoder;
use geomviewer_core::{Dataset, Error, Point3f, Result, TriangleMesh, Vector3f};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct PlyDecoder;

impl MeshDecoder for PlyDecoder {
    fn decode(&self, path: &Path) -> Result<Dataset> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let mut vertices = Vec::new();
        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = extract_property_value(vertex, "x")?;
                let y = extract_property_value(vertex, "y")?;
                let z = extract_property_value(vertex, "z")?;
                vertices.push(Point3f::new(x, y, z));
            }
        }

        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                let indices = extract_face_indices(face)?;
                if indices.len() < 3 {
                    return Err(Error::InvalidData(format!(
                        "face with {} indices",
                        indices.len()
                    )));
                }
                if indices.iter().any(|&i| i >= vertices.len()) {
                    return Err(Error::InvalidData("face index out of range".to_string()));
                }
                for i in 1..indices.len() - 1 {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
        }

        // Vertex normals ride along when every vertex carries nx/ny/nz.
        let normals = if let Some(vertex_element) = ply.payload.get("vertex") {
            let mut normals = Vec::new();
            let mut complete = true;
            for vertex in vertex_element {
                match (
                    extract_property_value(vertex, "nx"),
                    extract_property_value(vertex, "ny"),
                    extract_property_value(vertex, "nz"),
                ) {
                    (Ok(nx), Ok(ny), Ok(nz)) => normals.push(Vector3f::new(nx, ny, nz)),
                    _ => {
                        complete = false;
                        break;
                    }
                }
            }
            (complete && !normals.is_empty()).then_some(normals)
        } else {
            None
        };

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(normals) = normals {
            mesh.set_normals(normals);
        }
        Ok(Dataset::Surface(mesh))
    }

    fn format_name(&self) -> &'static str {
        "ply"
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        Some(Property::Char(val)) => Ok(*val as f32),
        Some(Property::UChar(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(format!(
            "Property '{}' not found or invalid type",
            name
        ))),
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    match element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"))
    {
        Some(Property::ListInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUShort(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        _ => Err(Error::InvalidData("Face indices not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fixture(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("geomviewer_ply_{}", name));
        fs::write(&path, content).unwrap();
        path
    }

    const ASCII_PLY: &str = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float nx
property float ny
property float nz
element face 2
property list uchar int vertex_indices
end_header
0.0 0.0 0.0 0.0 0.0 1.0
1.0 0.0 0.0 0.0 0.0 1.0
1.0 1.0 0.0 0.0 0.0 1.0
0.0 1.0 0.0 0.0 0.0 1.0
3 0 1 2
3 0 2 3
";

    #[test]
    fn test_ascii_mesh_with_normals() {
        let path = fixture("tris.ply", ASCII_PLY);
        let Dataset::Surface(mesh) = PlyDecoder.decode(&path).unwrap() else {
            panic!("ply should decode as a surface");
        };
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert!(mesh.normals.is_some());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_quad_face_is_fan_triangulated() {
        let content = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0.0 0.0 0.0
1.0 0.0 0.0
1.0 1.0 0.0
0.0 1.0 0.0
4 0 1 2 3
";
        let path = fixture("quad.ply", content);
        let Dataset::Surface(mesh) = PlyDecoder.decode(&path).unwrap() else {
            panic!("ply should decode as a surface");
        };
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert!(mesh.normals.is_none());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_invalid_magic_is_rejected() {
        let path = fixture("bad.ply", "not_ply\n");
        assert!(PlyDecoder.decode(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_face_index_out_of_range() {
        let content = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0.0 0.0 0.0
1.0 0.0 0.0
0.0 1.0 0.0
3 0 1 9
";
        let path = fixture("range.ply", content);
        assert!(PlyDecoder.decode(&path).is_err());
        let _ = fs::remove_file(path);
    }
}
