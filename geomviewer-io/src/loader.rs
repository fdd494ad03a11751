//! Geometry loader: path in, scene node out

use crate::registry::{CodecRegistry, FormatId};
use geomviewer_core::{Error, Result, SceneNode};
use log::debug;
use std::path::Path;

/// Resolves a path's format through the codec registry and produces a
/// renderable scene node with default display properties.
pub struct GeometryLoader {
    registry: CodecRegistry,
}

impl GeometryLoader {
    /// Loader backed by the default codec bindings
    pub fn new() -> Self {
        Self {
            registry: CodecRegistry::with_default_bindings(),
        }
    }

    /// Loader backed by a caller-supplied registry
    pub fn with_registry(registry: CodecRegistry) -> Self {
        Self { registry }
    }

    /// Load the file at `path` into a scene node
    ///
    /// Unbound formats (glTF included) and unrecognized suffixes fail with
    /// `UnsupportedFormat`; decoder failures carry the path and format. The
    /// caller owns inserting the node into a scene graph.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<SceneNode> {
        let path = path.as_ref();
        let format = FormatId::from_path(path);
        debug!("resolving {:?} as {}", path, format.name());

        let binding = self.registry.resolve(format).ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "no codec bound for {} ({:?})",
                format.name(),
                path
            ))
        })?;

        let dataset = binding
            .decoder
            .decode(path)
            .map_err(|err| into_decode_error(path, binding.decoder.format_name(), err))?;
        let mesh = binding.adapter.adapt(dataset)?;
        Ok(SceneNode::new(mesh))
    }
}

impl Default for GeometryLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap decoder-level failures so they carry the path and format
fn into_decode_error(path: &Path, format: &'static str, err: Error) -> Error {
    match err {
        already @ Error::Decode { .. } => already,
        other => Error::Decode {
            path: path.to_path_buf(),
            format,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("geomviewer_loader_{}", name))
    }

    const OBJ_TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn test_load_obj_produces_node_with_default_props() {
        let path = fixture_path("tri.obj");
        fs::write(&path, OBJ_TRIANGLE).unwrap();

        let node = GeometryLoader::new().load(&path).unwrap();
        assert_eq!(node.mesh.vertex_count(), 3);
        assert_eq!(node.mesh.face_count(), 1);
        assert!(!node.props.edge_visibility);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_gltf_is_unsupported() {
        for name in ["scene.glb", "scene.gltf"] {
            let path = fixture_path(name);
            fs::write(&path, b"glTF").unwrap();
            let result = GeometryLoader::new().load(&path);
            assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn test_unknown_suffix_is_unsupported() {
        let result = GeometryLoader::new().load("points.xyz");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_caller_supplied_registry_controls_dispatch() {
        let path = fixture_path("custom.obj");
        fs::write(&path, OBJ_TRIANGLE).unwrap();

        // An empty registry binds nothing, so even .obj is unsupported.
        let loader = GeometryLoader::with_registry(CodecRegistry::new());
        assert!(matches!(
            loader.load(&path),
            Err(Error::UnsupportedFormat(_))
        ));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_a_decode_error() {
        let result = GeometryLoader::new().load("definitely_not_here.obj");
        match result {
            Err(Error::Decode { format, .. }) => assert_eq!(format, "obj"),
            other => panic!("expected decode error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_malformed_content_is_a_decode_error() {
        let path = fixture_path("garbage.ply");
        fs::write(&path, "not a ply file at all\n").unwrap();
        let result = GeometryLoader::new().load(&path);
        assert!(matches!(result, Err(Error::Decode { .. })));
        let _ = fs::remove_file(path);
    }
}
