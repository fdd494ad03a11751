//! Codec registry: format identifiers and decoder/adapter bindings
//!
//! The registry is a fixed table populated at construction. Resolution is a
//! pure lookup; a missing binding is communicated as `None`, never as an
//! error, because the policy decision belongs to the caller.

use crate::{obj::ObjDecoder, ply::PlyDecoder, stl::StlDecoder};
use crate::vtk_xml::{VtpDecoder, VtuDecoder};
use geomviewer_core::{Dataset, Error, Result, TriangleMesh};
use std::collections::HashMap;
use std::path::Path;

/// Enumerated tag for a recognized geometry file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    SurfaceXml,
    VolumeXml,
    Gltf,
    Obj,
    Ply,
    Stl,
    Unknown,
}

impl FormatId {
    /// Derive the format from a path by ordered, case-sensitive suffix match
    pub fn from_path(path: &Path) -> Self {
        const SUFFIXES: &[(&str, FormatId)] = &[
            (".vtp", FormatId::SurfaceXml),
            (".vtu", FormatId::VolumeXml),
            (".glb", FormatId::Gltf),
            (".gltf", FormatId::Gltf),
            (".obj", FormatId::Obj),
            (".ply", FormatId::Ply),
            (".stl", FormatId::Stl),
        ];
        let name = path.to_string_lossy();
        for (suffix, format) in SUFFIXES {
            if name.ends_with(suffix) {
                return *format;
            }
        }
        FormatId::Unknown
    }

    /// Short human-readable name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            FormatId::SurfaceXml => "vtp",
            FormatId::VolumeXml => "vtu",
            FormatId::Gltf => "gltf",
            FormatId::Obj => "obj",
            FormatId::Ply => "ply",
            FormatId::Stl => "stl",
            FormatId::Unknown => "unknown",
        }
    }
}

/// Trait for decoding a file path into an in-memory geometric dataset
pub trait MeshDecoder: Send + Sync {
    /// Parse the file at `path` into a dataset
    fn decode(&self, path: &Path) -> Result<Dataset>;

    /// Get the format name this decoder handles
    fn format_name(&self) -> &'static str;
}

/// Trait for converting a decoded dataset into a renderable surface mesh
pub trait RenderAdapter: Send + Sync {
    /// Unify the dataset into a triangle mesh ready for upload
    fn adapt(&self, dataset: Dataset) -> Result<TriangleMesh>;
}

/// Adapter for surface datasets only
pub struct SurfaceAdapter;

impl RenderAdapter for SurfaceAdapter {
    fn adapt(&self, dataset: Dataset) -> Result<TriangleMesh> {
        match dataset {
            Dataset::Surface(mesh) => Ok(finalize(mesh)),
            Dataset::Volume(_) => Err(Error::InvalidData(
                "surface adapter cannot map a volumetric grid".to_string(),
            )),
        }
    }
}

/// Adapter for any dataset; grids are reduced to their boundary surface
pub struct DataSetAdapter;

impl RenderAdapter for DataSetAdapter {
    fn adapt(&self, dataset: Dataset) -> Result<TriangleMesh> {
        match dataset {
            Dataset::Surface(mesh) => Ok(finalize(mesh)),
            Dataset::Volume(grid) => Ok(finalize(grid.boundary_surface())),
        }
    }
}

/// Ensure the mesh carries vertex normals so the lit pass works
fn finalize(mut mesh: TriangleMesh) -> TriangleMesh {
    if mesh.normals.is_none() && !mesh.is_empty() {
        let normals = mesh.calculate_vertex_normals();
        mesh.set_normals(normals);
    }
    mesh
}

/// Pairing of a per-format decoder and a rendering adapter
pub struct CodecBinding {
    pub decoder: Box<dyn MeshDecoder>,
    pub adapter: Box<dyn RenderAdapter>,
}

impl CodecBinding {
    pub fn new(decoder: Box<dyn MeshDecoder>, adapter: Box<dyn RenderAdapter>) -> Self {
        Self { decoder, adapter }
    }
}

/// Registry mapping format identifiers to codec bindings
pub struct CodecRegistry {
    bindings: HashMap<FormatId, CodecBinding>,
}

impl CodecRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Registry with the default bindings for every supported format
    ///
    /// `Gltf` stays unbound: resolution yields `None` and loads fail with a
    /// typed unsupported-format error.
    // TODO: bind a glTF decoder once one is wired into this pipeline.
    pub fn with_default_bindings() -> Self {
        let mut registry = Self::new();
        registry.register(
            FormatId::SurfaceXml,
            CodecBinding::new(Box::new(VtpDecoder), Box::new(SurfaceAdapter)),
        );
        registry.register(
            FormatId::VolumeXml,
            CodecBinding::new(Box::new(VtuDecoder), Box::new(DataSetAdapter)),
        );
        registry.register(
            FormatId::Obj,
            CodecBinding::new(Box::new(ObjDecoder), Box::new(SurfaceAdapter)),
        );
        registry.register(
            FormatId::Ply,
            CodecBinding::new(Box::new(PlyDecoder), Box::new(SurfaceAdapter)),
        );
        registry.register(
            FormatId::Stl,
            CodecBinding::new(Box::new(StlDecoder), Box::new(SurfaceAdapter)),
        );
        registry
    }

    /// Register a binding for a format; at most one binding per format
    pub fn register(&mut self, format: FormatId, binding: CodecBinding) {
        self.bindings.insert(format, binding);
    }

    /// Look up the binding for a format
    pub fn resolve(&self, format: FormatId) -> Option<&CodecBinding> {
        self.bindings.get(&format)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_default_bindings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomviewer_core::{Cell, CellKind, Point3f, UnstructuredGrid};

    #[test]
    fn test_format_from_path() {
        assert_eq!(FormatId::from_path(Path::new("scene.vtp")), FormatId::SurfaceXml);
        assert_eq!(FormatId::from_path(Path::new("scene.vtu")), FormatId::VolumeXml);
        assert_eq!(FormatId::from_path(Path::new("scene.glb")), FormatId::Gltf);
        assert_eq!(FormatId::from_path(Path::new("scene.gltf")), FormatId::Gltf);
        assert_eq!(FormatId::from_path(Path::new("model.obj")), FormatId::Obj);
        assert_eq!(FormatId::from_path(Path::new("model.ply")), FormatId::Ply);
        assert_eq!(FormatId::from_path(Path::new("model.stl")), FormatId::Stl);
        assert_eq!(FormatId::from_path(Path::new("model.xyz")), FormatId::Unknown);
        assert_eq!(FormatId::from_path(Path::new("model")), FormatId::Unknown);
    }

    #[test]
    fn test_suffix_match_is_case_sensitive() {
        assert_eq!(FormatId::from_path(Path::new("MODEL.STL")), FormatId::Unknown);
        assert_eq!(FormatId::from_path(Path::new("scene.Vtp")), FormatId::Unknown);
    }

    #[test]
    fn test_default_bindings() {
        let registry = CodecRegistry::with_default_bindings();
        for format in [
            FormatId::SurfaceXml,
            FormatId::VolumeXml,
            FormatId::Obj,
            FormatId::Ply,
            FormatId::Stl,
        ] {
            assert!(registry.resolve(format).is_some(), "{:?} should be bound", format);
        }
        assert!(registry.resolve(FormatId::Gltf).is_none());
        assert!(registry.resolve(FormatId::Unknown).is_none());
    }

    fn tetra_grid() -> UnstructuredGrid {
        UnstructuredGrid {
            points: vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            cells: vec![Cell {
                kind: CellKind::Tetra,
                connectivity: vec![0, 1, 2, 3],
            }],
        }
    }

    #[test]
    fn test_dataset_adapter_extracts_boundary() {
        let mesh = DataSetAdapter.adapt(Dataset::Volume(tetra_grid())).unwrap();
        assert_eq!(mesh.face_count(), 4);
        assert!(mesh.normals.is_some());
    }

    #[test]
    fn test_surface_adapter_rejects_volume() {
        let result = SurfaceAdapter.adapt(Dataset::Volume(tetra_grid()));
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_adapter_fills_in_normals() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let adapted = SurfaceAdapter.adapt(Dataset::Surface(mesh)).unwrap();
        assert_eq!(adapted.normals.as_ref().map(|n| n.len()), Some(3));
    }
}
