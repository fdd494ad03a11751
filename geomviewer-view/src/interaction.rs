//! Interaction styles
//!
//! A small closed set of styles behind a capability trait: trackball and
//! joystick behavior, plus a switch style that holds both and forwards to
//! whichever mode is current. No runtime type inspection anywhere; the
//! switch is an explicit variant of the `InteractorStyle` union.

/// Capability shared by every interaction style
pub trait InteractionStyle {
    /// Set the mouse-wheel zoom-step multiplier
    fn set_mouse_wheel_sensitivity(&mut self, sensitivity: f32);

    /// Get the mouse-wheel zoom-step multiplier
    fn mouse_wheel_sensitivity(&self) -> f32;

    /// Degrees of orbit per pixel of drag
    fn orbit_gain(&self) -> f32;
}

/// Trackball-camera style: motion proportional to drag distance
#[derive(Debug, Clone)]
pub struct TrackballStyle {
    wheel_sensitivity: f32,
}

impl Default for TrackballStyle {
    fn default() -> Self {
        Self {
            wheel_sensitivity: 1.0,
        }
    }
}

impl InteractionStyle for TrackballStyle {
    fn set_mouse_wheel_sensitivity(&mut self, sensitivity: f32) {
        self.wheel_sensitivity = sensitivity;
    }

    fn mouse_wheel_sensitivity(&self) -> f32 {
        self.wheel_sensitivity
    }

    fn orbit_gain(&self) -> f32 {
        0.4
    }
}

/// Joystick-camera style: coarser motion, the windowing default
#[derive(Debug, Clone)]
pub struct JoystickStyle {
    wheel_sensitivity: f32,
}

impl Default for JoystickStyle {
    fn default() -> Self {
        Self {
            wheel_sensitivity: 1.0,
        }
    }
}

impl InteractionStyle for JoystickStyle {
    fn set_mouse_wheel_sensitivity(&mut self, sensitivity: f32) {
        self.wheel_sensitivity = sensitivity;
    }

    fn mouse_wheel_sensitivity(&self) -> f32 {
        self.wheel_sensitivity
    }

    fn orbit_gain(&self) -> f32 {
        1.0
    }
}

/// Which style a switch style currently forwards to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleMode {
    Joystick,
    Trackball,
}

/// A style that owns both behaviors and forwards to the current mode
#[derive(Debug, Clone)]
pub struct SwitchStyle {
    mode: StyleMode,
    trackball: TrackballStyle,
    joystick: JoystickStyle,
}

impl Default for SwitchStyle {
    fn default() -> Self {
        Self {
            // Joystick is the default until the controller switches it.
            mode: StyleMode::Joystick,
            trackball: TrackballStyle::default(),
            joystick: JoystickStyle::default(),
        }
    }
}

impl SwitchStyle {
    pub fn mode(&self) -> StyleMode {
        self.mode
    }

    pub fn set_style_mode(&mut self, mode: StyleMode) {
        self.mode = mode;
    }

    pub fn current(&self) -> &dyn InteractionStyle {
        match self.mode {
            StyleMode::Trackball => &self.trackball,
            StyleMode::Joystick => &self.joystick,
        }
    }

    pub fn current_mut(&mut self) -> &mut dyn InteractionStyle {
        match self.mode {
            StyleMode::Trackball => &mut self.trackball,
            StyleMode::Joystick => &mut self.joystick,
        }
    }
}

/// The closed set of interactor styles a view controller can bind
#[derive(Debug, Clone)]
pub enum InteractorStyle {
    Switch(SwitchStyle),
    Trackball(TrackballStyle),
    Joystick(JoystickStyle),
}

impl InteractorStyle {
    /// The default binding: a switch style starting out in joystick mode
    pub fn default_switch() -> Self {
        Self::Switch(SwitchStyle::default())
    }

    /// Switch the current mode; base styles have a fixed behavior and
    /// ignore the request
    pub fn set_style_mode(&mut self, mode: StyleMode) {
        if let Self::Switch(switch) = self {
            switch.set_style_mode(mode);
        }
    }

    /// Apply the sensitivity to the switch's current style, or to the base
    /// style directly when no switch is bound
    pub fn set_mouse_wheel_sensitivity(&mut self, sensitivity: f32) {
        match self {
            Self::Switch(switch) => switch.current_mut().set_mouse_wheel_sensitivity(sensitivity),
            Self::Trackball(style) => style.set_mouse_wheel_sensitivity(sensitivity),
            Self::Joystick(style) => style.set_mouse_wheel_sensitivity(sensitivity),
        }
    }

    pub fn mouse_wheel_sensitivity(&self) -> f32 {
        match self {
            Self::Switch(switch) => switch.current().mouse_wheel_sensitivity(),
            Self::Trackball(style) => style.mouse_wheel_sensitivity(),
            Self::Joystick(style) => style.mouse_wheel_sensitivity(),
        }
    }

    pub fn orbit_gain(&self) -> f32 {
        match self {
            Self::Switch(switch) => switch.current().orbit_gain(),
            Self::Trackball(style) => style.orbit_gain(),
            Self::Joystick(style) => style.orbit_gain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_defaults_to_joystick() {
        let style = InteractorStyle::default_switch();
        let InteractorStyle::Switch(switch) = &style else {
            panic!("expected a switch style");
        };
        assert_eq!(switch.mode(), StyleMode::Joystick);
    }

    #[test]
    fn test_sensitivity_goes_to_current_style() {
        let mut style = InteractorStyle::default_switch();
        style.set_style_mode(StyleMode::Trackball);
        style.set_mouse_wheel_sensitivity(2.5);
        assert_eq!(style.mouse_wheel_sensitivity(), 2.5);

        // The joystick side kept its own default.
        style.set_style_mode(StyleMode::Joystick);
        assert_eq!(style.mouse_wheel_sensitivity(), 1.0);
    }

    #[test]
    fn test_base_style_takes_sensitivity_directly() {
        let mut style = InteractorStyle::Trackball(TrackballStyle::default());
        style.set_mouse_wheel_sensitivity(0.25);
        assert_eq!(style.mouse_wheel_sensitivity(), 0.25);

        // Mode switching on a base style is a no-op.
        style.set_style_mode(StyleMode::Joystick);
        assert_eq!(style.mouse_wheel_sensitivity(), 0.25);
    }
}
