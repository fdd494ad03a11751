//! View state and rendering for geomviewer
//!
//! This crate provides the camera and interaction model, the view controller
//! that owns camera and per-node render properties, the viewer session
//! lifecycle, and the wgpu/winit renderer:
//! - Trackball/joystick interaction styles behind a capability trait
//! - Azimuth/elevation/zoom/roll camera operations
//! - Edge-visibility broadcast across the scene graph
//! - Blocking interaction loop

pub mod camera;
pub mod interaction;
pub mod controller;
pub mod session;
pub mod renderer;
pub mod shaders;

pub use camera::{Camera, CameraState};
pub use controller::{Background, ViewController};
pub use interaction::{InteractionStyle, InteractorStyle, StyleMode};
pub use session::{SessionState, ViewerSession};
