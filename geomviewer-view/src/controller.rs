//! View controller
//!
//! Owns the single camera, the interaction style binding, the background and
//! the stored scroll sensitivity, and applies camera operations and
//! render-prop broadcasts across the scene graph. All state lives in
//! explicit fields passed where needed; nothing is looked up ambiently.

use crate::camera::Camera;
use crate::interaction::{InteractorStyle, StyleMode};
use geomviewer_core::{SceneGraph, EDGE_COLOR};

/// Center color of the startup radial gradient
pub const BACKGROUND_CENTER: [f64; 3] = [0.573, 0.553, 0.671];
/// Edge color of the startup radial gradient
pub const BACKGROUND_EDGE: [f64; 3] = [0.122, 0.11, 0.173];
/// Solid background applied by the run sequence
pub const RUN_BACKGROUND: [f64; 3] = [0.2, 0.3, 0.4];

/// Render-surface background
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Solid([f64; 3]),
    /// Radial gradient from the viewport center to its farthest corner
    RadialGradient {
        center: [f64; 3],
        edge: [f64; 3],
    },
}

pub struct ViewController {
    camera: Camera,
    style: InteractorStyle,
    background: Background,
    scroll_sensitivity: f32,
}

impl ViewController {
    pub fn new() -> Self {
        Self {
            camera: Camera::default(),
            style: InteractorStyle::default_switch(),
            background: Background::Solid([0.0, 0.0, 0.0]),
            scroll_sensitivity: 1.0,
        }
    }

    /// One-time view setup: gradient background, trackball-camera mode
    ///
    /// Re-invocation reapplies the same constants; the session guards
    /// against it upstream.
    pub fn initialize(&mut self) {
        self.background = Background::RadialGradient {
            center: BACKGROUND_CENTER,
            edge: BACKGROUND_EDGE,
        };
        self.style.set_style_mode(StyleMode::Trackball);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn style(&self) -> &InteractorStyle {
        &self.style
    }

    pub fn background(&self) -> Background {
        self.background
    }

    /// Rotate about the up axis, then refresh the clipping range so the
    /// rotated geometry stays visible
    pub fn azimuth(&mut self, degrees: f32, scene: &SceneGraph) {
        self.camera.azimuth(degrees);
        self.camera.reset_clipping_range(scene.bounds());
    }

    /// Refit the camera to everything currently loaded; silently does
    /// nothing when the scene is empty
    pub fn reset_view(&mut self, scene: &SceneGraph) {
        if let Some(bounds) = scene.bounds() {
            self.camera.fit(bounds);
        }
    }

    /// Store the zoom-step multiplier and push it into the bound style
    pub fn set_scroll_sensitivity(&mut self, sensitivity: f32) {
        self.style.set_mouse_wheel_sensitivity(sensitivity);
        self.scroll_sensitivity = sensitivity;
    }

    pub fn scroll_sensitivity(&self) -> f32 {
        self.scroll_sensitivity
    }

    /// One-shot broadcast across the nodes currently in the graph; nodes
    /// added afterwards start from default props
    pub fn set_edge_visibility(&mut self, visible: bool, scene: &mut SceneGraph) {
        for node in scene.iter_mut() {
            node.props.edge_visibility = visible;
            node.props.edge_color = EDGE_COLOR;
        }
    }

    /// Fixed demonstration sequence applied when the interaction loop starts
    pub fn apply_startup_sequence(&mut self, scene: &SceneGraph) {
        self.camera.elevation(30.0);
        self.camera.azimuth(-40.0);
        self.camera.zoom(3.0);
        self.camera.roll(10.0);
        self.background = Background::Solid(RUN_BACKGROUND);
        self.reset_view(scene);
    }
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geomviewer_core::{Point3f, SceneNode, TriangleMesh};

    fn triangle_node() -> SceneNode {
        SceneNode::new(TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        ))
    }

    #[test]
    fn test_initialize_sets_gradient_and_trackball() {
        let mut controller = ViewController::new();
        controller.initialize();
        assert_eq!(
            controller.background(),
            Background::RadialGradient {
                center: BACKGROUND_CENTER,
                edge: BACKGROUND_EDGE,
            }
        );
        // Trackball gain is finer than the joystick default.
        assert_relative_eq!(controller.style().orbit_gain(), 0.4);
    }

    #[test]
    fn test_edge_broadcast_round_trip() {
        let mut controller = ViewController::new();
        let mut scene = SceneGraph::new();
        scene.add(triangle_node());
        scene.add(triangle_node());

        controller.set_edge_visibility(true, &mut scene);
        assert!(scene.iter().all(|n| n.props.edge_visibility));

        // A node added between broadcasts starts at the default.
        scene.add(triangle_node());
        assert!(!scene.iter().last().unwrap().props.edge_visibility);

        controller.set_edge_visibility(false, &mut scene);
        assert!(scene.iter().all(|n| !n.props.edge_visibility));
    }

    #[test]
    fn test_reset_view_on_empty_scene_is_a_noop() {
        let mut controller = ViewController::new();
        let scene = SceneGraph::new();
        let position = controller.camera().position;
        controller.reset_view(&scene);
        assert_eq!(controller.camera().position, position);
    }

    #[test]
    fn test_scroll_sensitivity_survives_reads() {
        let mut controller = ViewController::new();
        controller.initialize();
        controller.set_scroll_sensitivity(2.5);
        assert_relative_eq!(controller.scroll_sensitivity(), 2.5);
        assert_relative_eq!(controller.style().mouse_wheel_sensitivity(), 2.5);
    }

    #[test]
    fn test_startup_sequence_state() {
        let mut controller = ViewController::new();
        controller.initialize();
        let mut scene = SceneGraph::new();
        scene.add(triangle_node());

        controller.apply_startup_sequence(&scene);
        let state = controller.camera().state();
        assert_relative_eq!(state.elevation, 30.0, epsilon = 1e-3);
        assert_relative_eq!(state.azimuth, 320.0, epsilon = 1e-3);
        assert_relative_eq!(state.zoom, 3.0, epsilon = 1e-5);
        assert_relative_eq!(state.roll, 10.0, epsilon = 1e-3);
        assert_eq!(controller.background(), Background::Solid(RUN_BACKGROUND));
    }
}
