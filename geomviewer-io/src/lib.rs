//! Geometry loading for geomviewer
//!
//! This crate maps file suffixes to codec bindings (a decoder plus a render
//! adapter) and turns paths into renderable scene nodes. Supported formats:
//! VTK XML PolyData (`.vtp`), VTK XML UnstructuredGrid (`.vtu`), Wavefront
//! OBJ, PLY and STL. glTF suffixes are recognized but deliberately unbound.

pub mod registry;
pub mod loader;
pub mod vtk_xml;
pub mod obj;
pub mod ply;
pub mod stl;

pub use loader::GeometryLoader;
pub use registry::{CodecBinding, CodecRegistry, FormatId, MeshDecoder, RenderAdapter};
