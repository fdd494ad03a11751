//! Camera for 3D viewing
//!
//! One camera serves the whole scene graph. Orbit operations rotate the
//! position about the focal point; the accumulated azimuth/elevation/zoom/
//! roll record is kept alongside so view state stays observable.

use geomviewer_core::Aabb;
use nalgebra::{Matrix4, Perspective3, Point3, Rotation3, Unit, Vector3};

/// Accumulated view angles and zoom, angles normalized to [0, 360)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub azimuth: f32,
    pub elevation: f32,
    pub zoom: f32,
    pub roll: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            elevation: 0.0,
            zoom: 1.0,
            roll: 0.0,
        }
    }
}

/// A 3D camera with an explicit focal point
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    state: CameraState,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
            state: CameraState::default(),
        }
    }

    /// Accumulated azimuth/elevation/zoom/roll
    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Rotate the camera about the up axis around the focal point
    ///
    /// Unbounded input; the angle wraps through the rotation itself and the
    /// recorded azimuth is normalized modulo 360.
    pub fn azimuth(&mut self, degrees: f32) {
        let axis = Unit::new_normalize(self.up);
        let rotation = Rotation3::from_axis_angle(&axis, degrees.to_radians());
        self.position = self.target + rotation * (self.position - self.target);
        self.state.azimuth = normalize_degrees(self.state.azimuth + degrees);
    }

    /// Rotate the camera vertically around the focal point
    pub fn elevation(&mut self, degrees: f32) {
        let forward = self.target - self.position;
        let right = forward.cross(&self.up);
        if right.norm() <= f32::EPSILON {
            return;
        }
        let axis = Unit::new_normalize(right);
        let rotation = Rotation3::from_axis_angle(&axis, degrees.to_radians());
        self.position = self.target + rotation * (self.position - self.target);
        self.up = rotation * self.up;
        self.state.elevation = normalize_degrees(self.state.elevation + degrees);
    }

    /// Narrow (factor > 1) or widen (factor < 1) the view angle
    pub fn zoom(&mut self, factor: f32) {
        if factor <= 0.0 {
            return;
        }
        self.fov = (self.fov / factor).clamp(1e-4, std::f32::consts::PI - 1e-4);
        self.state.zoom *= factor;
    }

    /// Rotate the view-up vector about the viewing direction
    pub fn roll(&mut self, degrees: f32) {
        let forward = self.target - self.position;
        if forward.norm() <= f32::EPSILON {
            return;
        }
        let axis = Unit::new_normalize(forward);
        let rotation = Rotation3::from_axis_angle(&axis, degrees.to_radians());
        self.up = rotation * self.up;
        self.state.roll = normalize_degrees(self.state.roll + degrees);
    }

    /// Recompute near/far so geometry within `bounds` stays visible
    pub fn reset_clipping_range(&mut self, bounds: Option<Aabb>) {
        let Some(bounds) = bounds else {
            self.near = 0.1;
            self.far = 100.0;
            return;
        };
        let distance = (self.position - bounds.center()).norm();
        let radius = bounds.radius();
        self.near = ((distance - radius) * 0.9).max(distance * 1e-3).max(1e-3);
        self.far = (distance + radius) * 1.1;
    }

    /// Recenter on the bounds and back off far enough to see all of them,
    /// keeping the current viewing direction
    pub fn fit(&mut self, bounds: Aabb) {
        let direction = (self.target - self.position).normalize();
        let distance = bounds.radius() / (self.fov * 0.5).sin().max(1e-4);
        self.target = bounds.center();
        self.position = self.target - direction * distance;
        self.reset_clipping_range(Some(bounds));
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_4,
            1.0,
            0.1,
            100.0,
        )
    }
}

fn normalize_degrees(value: f32) -> f32 {
    let wrapped = value.rem_euclid(360.0);
    if (wrapped - 360.0).abs() < 1e-4 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geomviewer_core::Point3f;

    #[test]
    fn test_azimuth_is_invertible() {
        let mut camera = Camera::default();
        let original = camera.position;

        camera.azimuth(73.5);
        camera.azimuth(-73.5);

        assert_relative_eq!(camera.state().azimuth, 0.0, epsilon = 1e-3);
        assert_relative_eq!(camera.position.x, original.x, epsilon = 1e-4);
        assert_relative_eq!(camera.position.z, original.z, epsilon = 1e-4);
    }

    #[test]
    fn test_azimuth_wraps_modulo_360() {
        let mut camera = Camera::default();
        camera.azimuth(400.0);
        assert_relative_eq!(camera.state().azimuth, 40.0, epsilon = 1e-3);

        camera.azimuth(-80.0);
        assert_relative_eq!(camera.state().azimuth, 320.0, epsilon = 1e-3);
    }

    #[test]
    fn test_azimuth_preserves_focal_distance() {
        let mut camera = Camera::default();
        let distance = (camera.position - camera.target).norm();
        camera.azimuth(123.0);
        assert_relative_eq!(
            (camera.position - camera.target).norm(),
            distance,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_zoom_accumulates() {
        let mut camera = Camera::default();
        let fov = camera.fov;
        camera.zoom(2.0);
        camera.zoom(1.5);
        assert_relative_eq!(camera.state().zoom, 3.0, epsilon = 1e-5);
        assert_relative_eq!(camera.fov, fov / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_zoom_ignores_nonpositive_factor() {
        let mut camera = Camera::default();
        let fov = camera.fov;
        camera.zoom(0.0);
        camera.zoom(-2.0);
        assert_relative_eq!(camera.fov, fov);
        assert_relative_eq!(camera.state().zoom, 1.0);
    }

    #[test]
    fn test_roll_keeps_position() {
        let mut camera = Camera::default();
        let position = camera.position;
        camera.roll(10.0);
        assert_eq!(camera.position, position);
        assert_relative_eq!(camera.state().roll, 10.0, epsilon = 1e-4);
        assert_relative_eq!(camera.up.norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_fit_recenter() {
        let mut camera = Camera::default();
        let bounds = Aabb {
            min: Point3f::new(9.0, 9.0, 9.0),
            max: Point3f::new(11.0, 11.0, 11.0),
        };
        camera.fit(bounds);
        assert_relative_eq!(camera.target.x, 10.0, epsilon = 1e-4);
        assert!((camera.position - camera.target).norm() > bounds.radius());
        assert!(camera.near > 0.0);
        assert!(camera.far > camera.near);
    }

    #[test]
    fn test_clipping_range_without_bounds() {
        let mut camera = Camera::default();
        camera.near = 5.0;
        camera.far = 6.0;
        camera.reset_clipping_range(None);
        assert_relative_eq!(camera.near, 0.1);
        assert_relative_eq!(camera.far, 100.0);
    }
}
