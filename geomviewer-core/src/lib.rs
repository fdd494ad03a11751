//! Core data structures for geomviewer
//!
//! This crate provides the shared data model for the viewer: points, triangle
//! meshes, unstructured grids, scene nodes with render properties, and the
//! workspace-wide error type.

pub mod point;
pub mod mesh;
pub mod grid;
pub mod scene;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use grid::*;
pub use scene::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};
