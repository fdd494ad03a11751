//! VTK XML readers for PolyData (`.vtp`) and UnstructuredGrid (`.vtu`)
//!
//! Only inline ASCII DataArray payloads are handled; binary and appended
//! encodings are rejected. Polygons wider than a triangle are
//! fan-triangulated.

use crate::registry::MeshDecoder;
use geomviewer_core::{
    Cell, CellKind, Dataset, Error, Point3f, Result, TriangleMesh, UnstructuredGrid,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Decoder for VTK XML PolyData surface files
pub struct VtpDecoder;

impl MeshDecoder for VtpDecoder {
    fn decode(&self, path: &Path) -> Result<Dataset> {
        let document = VtkDocument::parse(&std::fs::read_to_string(path)?)?;
        document.expect_kind("PolyData")?;

        let points = document.points()?;
        let connectivity = document.indices("Polys", "connectivity")?;
        let offsets = document.indices("Polys", "offsets")?;

        let mut faces = Vec::new();
        let mut start = 0usize;
        for &end in &offsets {
            let polygon = connectivity.get(start..end).ok_or_else(|| {
                Error::InvalidData("polygon offsets exceed connectivity array".to_string())
            })?;
            if polygon.len() < 3 {
                return Err(Error::InvalidData(format!(
                    "polygon with {} vertices",
                    polygon.len()
                )));
            }
            for i in 1..polygon.len() - 1 {
                faces.push([polygon[0], polygon[i], polygon[i + 1]]);
            }
            start = end;
        }

        let mesh = TriangleMesh::from_vertices_and_faces(points, faces);
        validate_indices(mesh.faces.iter().flatten(), mesh.vertex_count())?;
        Ok(Dataset::Surface(mesh))
    }

    fn format_name(&self) -> &'static str {
        "vtp"
    }
}

/// Decoder for VTK XML UnstructuredGrid volume files
pub struct VtuDecoder;

impl MeshDecoder for VtuDecoder {
    fn decode(&self, path: &Path) -> Result<Dataset> {
        let document = VtkDocument::parse(&std::fs::read_to_string(path)?)?;
        document.expect_kind("UnstructuredGrid")?;

        let points = document.points()?;
        let connectivity = document.indices("Cells", "connectivity")?;
        let offsets = document.indices("Cells", "offsets")?;
        let types = document.indices("Cells", "types")?;

        if types.len() != offsets.len() {
            return Err(Error::InvalidData(format!(
                "{} cell types for {} offsets",
                types.len(),
                offsets.len()
            )));
        }

        let mut cells = Vec::with_capacity(types.len());
        let mut start = 0usize;
        for (&code, &end) in types.iter().zip(offsets.iter()) {
            let kind = u8::try_from(code)
                .ok()
                .and_then(CellKind::from_type_code)
                .ok_or_else(|| {
                    Error::InvalidData(format!("unsupported cell type code {}", code))
                })?;
            let slice = connectivity.get(start..end).ok_or_else(|| {
                Error::InvalidData("cell offsets exceed connectivity array".to_string())
            })?;
            if slice.len() != kind.point_count() {
                return Err(Error::InvalidData(format!(
                    "{:?} cell with {} points",
                    kind,
                    slice.len()
                )));
            }
            cells.push(Cell {
                kind,
                connectivity: slice.to_vec(),
            });
            start = end;
        }

        let grid = UnstructuredGrid { points, cells };
        validate_indices(
            grid.cells.iter().flat_map(|c| c.connectivity.iter()),
            grid.point_count(),
        )?;
        Ok(Dataset::Volume(grid))
    }

    fn format_name(&self) -> &'static str {
        "vtu"
    }
}

fn validate_indices<'a>(indices: impl Iterator<Item = &'a usize>, limit: usize) -> Result<()> {
    for &index in indices {
        if index >= limit {
            return Err(Error::InvalidData(format!(
                "index {} out of range for {} points",
                index, limit
            )));
        }
    }
    Ok(())
}

/// A parsed VTK XML file: the dataset kind plus its ASCII data arrays,
/// keyed by enclosing section and array name.
struct VtkDocument {
    kind: String,
    arrays: HashMap<(String, String), String>,
}

impl VtkDocument {
    fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut kind = String::new();
        let mut stack: Vec<String> = Vec::new();
        let mut current: Option<(String, String)> = None;
        let mut arrays = HashMap::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(element)) => {
                    let name = element_name(&element);
                    if name == "VTKFile" {
                        kind = attribute(&element, "type")?.unwrap_or_default();
                    } else if name == "DataArray" {
                        let format = attribute(&element, "format")?
                            .unwrap_or_else(|| "ascii".to_string());
                        if format != "ascii" {
                            return Err(Error::InvalidData(format!(
                                "unsupported DataArray encoding '{}'",
                                format
                            )));
                        }
                        let section = stack.last().cloned().unwrap_or_default();
                        let array_name = attribute(&element, "Name")?.unwrap_or_default();
                        current = Some((section, array_name));
                    }
                    stack.push(name);
                }
                Ok(Event::Empty(element)) => {
                    if element_name(&element) == "DataArray" {
                        let section = stack.last().cloned().unwrap_or_default();
                        let array_name = attribute(&element, "Name")?.unwrap_or_default();
                        arrays.insert((section, array_name), String::new());
                    }
                }
                Ok(Event::Text(text)) => {
                    if let Some(key) = &current {
                        let chunk = text
                            .unescape()
                            .map_err(|e| Error::InvalidData(e.to_string()))?;
                        let buffer: &mut String = arrays.entry(key.clone()).or_default();
                        if !buffer.is_empty() {
                            buffer.push(' ');
                        }
                        buffer.push_str(&chunk);
                    }
                }
                Ok(Event::End(element)) => {
                    if element.name().as_ref() == b"DataArray" {
                        if let Some(key) = current.take() {
                            arrays.entry(key).or_default();
                        }
                    }
                    stack.pop();
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::InvalidData(format!("malformed XML: {}", e))),
            }
        }

        if kind.is_empty() {
            return Err(Error::InvalidData("missing VTKFile element".to_string()));
        }
        Ok(Self { kind, arrays })
    }

    fn expect_kind(&self, expected: &str) -> Result<()> {
        if self.kind != expected {
            return Err(Error::InvalidData(format!(
                "expected a {} file, found {}",
                expected, self.kind
            )));
        }
        Ok(())
    }

    /// The point coordinates: any array inside the Points section
    fn points(&self) -> Result<Vec<Point3f>> {
        let text = self
            .arrays
            .iter()
            .find(|((section, _), _)| section == "Points")
            .map(|(_, text)| text)
            .ok_or_else(|| Error::InvalidData("missing Points data array".to_string()))?;
        let values: Vec<f32> = parse_numbers(text)?;
        if values.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "point array length {} is not a multiple of 3",
                values.len()
            )));
        }
        Ok(values
            .chunks_exact(3)
            .map(|c| Point3f::new(c[0], c[1], c[2]))
            .collect())
    }

    /// An integer array by section and name; missing arrays read as empty
    fn indices(&self, section: &str, name: &str) -> Result<Vec<usize>> {
        match self.arrays.get(&(section.to_string(), name.to_string())) {
            Some(text) => parse_numbers(text),
            None => Ok(Vec::new()),
        }
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::InvalidData(e.to_string()))?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

fn parse_numbers<T: FromStr>(text: &str) -> Result<Vec<T>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|_| Error::InvalidData(format!("invalid numeric token '{}'", token)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fixture(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("geomviewer_vtk_{}", name));
        fs::write(&path, content).unwrap();
        path
    }

    const QUAD_VTP: &str = r#"<?xml version="1.0"?>
<VTKFile type="PolyData" version="1.0" byte_order="LittleEndian">
  <PolyData>
    <Piece NumberOfPoints="4" NumberOfPolys="1">
      <Points>
        <DataArray type="Float32" Name="Points" NumberOfComponents="3" format="ascii">
          0 0 0  1 0 0  1 1 0  0 1 0
        </DataArray>
      </Points>
      <Polys>
        <DataArray type="Int64" Name="connectivity" format="ascii">0 1 2 3</DataArray>
        <DataArray type="Int64" Name="offsets" format="ascii">4</DataArray>
      </Polys>
    </Piece>
  </PolyData>
</VTKFile>
"#;

    const TETRA_VTU: &str = r#"<?xml version="1.0"?>
<VTKFile type="UnstructuredGrid" version="1.0" byte_order="LittleEndian">
  <UnstructuredGrid>
    <Piece NumberOfPoints="4" NumberOfCells="1">
      <Points>
        <DataArray type="Float32" Name="Points" NumberOfComponents="3" format="ascii">
          0 0 0  1 0 0  0 1 0  0 0 1
        </DataArray>
      </Points>
      <Cells>
        <DataArray type="Int64" Name="connectivity" format="ascii">0 1 2 3</DataArray>
        <DataArray type="Int64" Name="offsets" format="ascii">4</DataArray>
        <DataArray type="UInt8" Name="types" format="ascii">10</DataArray>
      </Cells>
    </Piece>
  </UnstructuredGrid>
</VTKFile>
"#;

    #[test]
    fn test_vtp_quad_is_fan_triangulated() {
        let path = fixture("quad.vtp", QUAD_VTP);
        let dataset = VtpDecoder.decode(&path).unwrap();
        match dataset {
            Dataset::Surface(mesh) => {
                assert_eq!(mesh.vertex_count(), 4);
                assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
            }
            Dataset::Volume(_) => panic!("vtp should decode as a surface"),
        }
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_vtu_tetra() {
        let path = fixture("tetra.vtu", TETRA_VTU);
        let dataset = VtuDecoder.decode(&path).unwrap();
        match dataset {
            Dataset::Volume(grid) => {
                assert_eq!(grid.point_count(), 4);
                assert_eq!(grid.cell_count(), 1);
                assert_eq!(grid.cells[0].kind, CellKind::Tetra);
            }
            Dataset::Surface(_) => panic!("vtu should decode as a volume"),
        }
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_wrong_dataset_kind_is_rejected() {
        let path = fixture("kind.vtp", TETRA_VTU);
        assert!(VtpDecoder.decode(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_binary_encoding_is_rejected() {
        let xml = QUAD_VTP.replace("format=\"ascii\"", "format=\"binary\"");
        let path = fixture("binary.vtp", &xml);
        let result = VtpDecoder.decode(&path);
        assert!(matches!(result, Err(Error::InvalidData(_))));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_unsupported_cell_type_is_rejected() {
        let xml = TETRA_VTU.replace(">10<", ">42<");
        let path = fixture("badtype.vtu", &xml);
        assert!(VtuDecoder.decode(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_cell_type_wider_than_a_byte_is_rejected() {
        // 266 must not wrap around to 10 (Tetra).
        let xml = TETRA_VTU.replace(">10<", ">266<");
        let path = fixture("widetype.vtu", &xml);
        assert!(matches!(
            VtuDecoder.decode(&path),
            Err(Error::InvalidData(_))
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let xml = QUAD_VTP.replace(">0 1 2 3<", ">0 1 2 9<");
        let path = fixture("range.vtp", &xml);
        assert!(VtpDecoder.decode(&path).is_err());
        let _ = fs::remove_file(path);
    }
}
