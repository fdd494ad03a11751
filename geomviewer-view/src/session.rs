//! Viewer session lifecycle
//!
//! A session owns the loader, the scene graph and the view controller, and
//! enforces the initialize-before-use ordering on every public operation.
//! Everything up to `run` is headless; the window, event loop and GPU
//! renderer only come into existence inside `run`, which consumes the
//! session and blocks until the window closes.

use crate::controller::ViewController;
use crate::renderer::SceneRenderer;
use geomviewer_core::{Error, Result, SceneGraph};
use geomviewer_io::GeometryLoader;
use std::path::Path;
use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

/// Startup window size in logical pixels
const WINDOW_SIZE: u32 = 300;
const WINDOW_TITLE: &str = "Geometry Viewer";

/// Zoom factor applied per scroll line at sensitivity 1.0
const ZOOM_STEP: f32 = 0.1;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    Running,
    Terminated,
}

pub struct ViewerSession {
    state: SessionState,
    loader: GeometryLoader,
    scene: SceneGraph,
    controller: ViewController,
    frame_requested: bool,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            loader: GeometryLoader::new(),
            scene: SceneGraph::new(),
            controller: ViewController::new(),
            frame_requested: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scroll_sensitivity(&self) -> f32 {
        self.controller.scroll_sensitivity()
    }

    /// One-time setup: background gradient and trackball-camera interaction
    pub fn initialize(&mut self) -> Result<()> {
        if self.state != SessionState::Uninitialized {
            return Err(Error::PreconditionViolation(format!(
                "initialize called in state {:?}",
                self.state
            )));
        }
        log::info!("Initializing viewer session");
        self.controller.initialize();
        self.state = SessionState::Initialized;
        Ok(())
    }

    fn ensure_ready(&self, operation: &str) -> Result<()> {
        match self.state {
            SessionState::Initialized | SessionState::Running => Ok(()),
            state => Err(Error::PreconditionViolation(format!(
                "{} called in state {:?}",
                operation, state
            ))),
        }
    }

    /// Load a geometry file and add it to the scene as a new node
    pub fn load_data_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_ready("load_data_file")?;
        let path = path.as_ref();
        log::info!("Loading {}", path.display());
        let node = self.loader.load(path)?;
        self.scene.add(node);
        Ok(())
    }

    /// Orbit the camera about its up axis
    pub fn azimuth(&mut self, degrees: f32) -> Result<()> {
        self.ensure_ready("azimuth")?;
        log::info!("Azimuth {} degrees", degrees);
        self.controller.azimuth(degrees, &self.scene);
        self.frame_requested = true;
        Ok(())
    }

    /// Refit the camera to the loaded geometry
    pub fn reset_view(&mut self) -> Result<()> {
        self.ensure_ready("reset_view")?;
        log::info!("Resetting view");
        self.controller.reset_view(&self.scene);
        self.frame_requested = true;
        Ok(())
    }

    /// Set the mouse-wheel zoom-step multiplier on the current style
    pub fn set_scroll_sensitivity(&mut self, sensitivity: f32) -> Result<()> {
        self.ensure_ready("set_scroll_sensitivity")?;
        log::info!("Scroll sensitivity {}", sensitivity);
        self.controller.set_scroll_sensitivity(sensitivity);
        Ok(())
    }

    /// Show or hide edge lines on every node currently in the scene
    pub fn set_edge_visibility(&mut self, visible: bool) -> Result<()> {
        self.ensure_ready("set_edge_visibility")?;
        log::info!("Edge visibility {}", visible);
        self.controller.set_edge_visibility(visible, &mut self.scene);
        self.frame_requested = true;
        Ok(())
    }

    /// Ask for a frame; drawing happens inside the interaction loop
    pub fn render(&mut self) -> Result<()> {
        self.ensure_ready("render")?;
        self.frame_requested = true;
        Ok(())
    }

    /// Apply the startup camera sequence, open the window and block on the
    /// interaction loop until the window is closed
    pub fn run(mut self) -> Result<()> {
        self.ensure_ready("run")?;
        log::info!("Starting interaction loop");
        self.controller.apply_startup_sequence(&self.scene);
        self.state = SessionState::Running;

        let event_loop = EventLoop::new()
            .map_err(|e| Error::Window(format!("Failed to create event loop: {}", e)))?;
        let window = WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(WINDOW_SIZE, WINDOW_SIZE))
            .build(&event_loop)
            .map_err(|e| Error::Window(format!("Failed to create window: {}", e)))?;
        let window = Arc::new(window);

        let size = window.inner_size();
        self.controller.camera_mut().aspect_ratio =
            size.width.max(1) as f32 / size.height.max(1) as f32;
        self.controller
            .camera_mut()
            .reset_clipping_range(self.scene.bounds());

        let mut renderer = pollster::block_on(SceneRenderer::new(window.clone()))?;

        // Satisfy any frame requested before `run` and draw the startup
        // state once; later draws ride the redraws the handlers request.
        self.frame_requested = false;
        window.request_redraw();

        let mut dragging = false;
        let mut last_cursor: Option<(f64, f64)> = None;

        event_loop
            .run(move |event, elwt| {
                elwt.set_control_flow(ControlFlow::Wait);

                let Event::WindowEvent { event, .. } = event else {
                    return;
                };
                match event {
                    WindowEvent::CloseRequested => {
                        log::info!("Window closed, terminating session");
                        self.state = SessionState::Terminated;
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        self.controller.camera_mut().aspect_ratio =
                            new_size.width.max(1) as f32 / new_size.height.max(1) as f32;
                        window.request_redraw();
                    }
                    WindowEvent::MouseInput {
                        state,
                        button: MouseButton::Left,
                        ..
                    } => {
                        dragging = state == ElementState::Pressed;
                        if !dragging {
                            last_cursor = None;
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        if dragging {
                            if let Some((last_x, last_y)) = last_cursor {
                                let gain = self.controller.style().orbit_gain();
                                let dx = (position.x - last_x) as f32 * gain;
                                let dy = (position.y - last_y) as f32 * gain;
                                self.controller.azimuth(-dx, &self.scene);
                                self.controller.camera_mut().elevation(dy);
                                self.controller
                                    .camera_mut()
                                    .reset_clipping_range(self.scene.bounds());
                                window.request_redraw();
                            }
                            last_cursor = Some((position.x, position.y));
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                        };
                        let sensitivity = self.controller.style().mouse_wheel_sensitivity();
                        let factor = (1.0 + ZOOM_STEP * lines * sensitivity).max(0.1);
                        self.controller.camera_mut().zoom(factor);
                        window.request_redraw();
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(e) = renderer.render(
                            &self.scene,
                            self.controller.camera(),
                            self.controller.background(),
                        ) {
                            log::error!("Render failed: {}", e);
                        }
                    }
                    _ => {}
                }
            })
            .map_err(|e| Error::Window(format!("Event loop failed: {}", e)))?;

        Ok(())
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}
