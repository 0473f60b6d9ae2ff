use glam::DVec3;
use std::f64::consts::PI;
use std::time::Duration;

use crate::easing::Easing;

/// Damping (inertia) of pending rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Damping {
    pub enabled: bool,
    /// Fraction of the pending rotation applied per tick, in (0, 1].
    pub factor: f64,
}

impl Default for Damping {
    fn default() -> Self {
        Self {
            enabled: true,
            factor: 0.05,
        }
    }
}

/// Automatic rotation while the user is idle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoRotate {
    pub enabled: bool,
    /// Revolutions per minute at 60fps; negative spins eastward.
    pub speed: f64,
    /// Idle time after an interaction before rotation resumes.
    pub idle_delay: Duration,
}

impl Default for AutoRotate {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: -0.0000694444 * 4800.0,
            idle_delay: Duration::from_millis(2500),
        }
    }
}

/// Orbit controller options.
///
/// Bounds are not validated; a `min` above its `max` gives unspecified
/// clamping.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlsConfig {
    pub enabled: bool,
    pub rotate_enabled: bool,
    /// Rotate with the mouse wheel / trackpad scroll
    pub scroll_rotate: bool,
    pub rotate_speed: f64,
    pub damping: Damping,
    pub auto_rotate: AutoRotate,
    pub min_polar_angle: f64,
    pub max_polar_angle: f64,
    pub min_azimuth_angle: f64,
    pub max_azimuth_angle: f64,
    pub min_target_radius: f64,
    pub max_target_radius: f64,
    /// Initial camera position; the orbit target is the origin.
    pub camera_position: DVec3,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rotate_enabled: true,
            scroll_rotate: true,
            rotate_speed: 1.0,
            damping: Damping::default(),
            auto_rotate: AutoRotate::default(),
            min_polar_angle: PI / 2.0 - PI / 5.0,
            max_polar_angle: PI / 2.0 + PI / 5.0,
            min_azimuth_angle: f64::NEG_INFINITY,
            max_azimuth_angle: f64::INFINITY,
            min_target_radius: 0.0,
            max_target_radius: f64::INFINITY,
            camera_position: DVec3::new(0.0, 0.0, 5.0),
        }
    }
}

/// Line colour (linear RGB in [0, 1]) and opacity of a feature outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: DVec3,
    pub opacity: f64,
}

impl LineStyle {
    pub fn from_hex(hex: u32, opacity: f64) -> Self {
        let r = ((hex >> 16) & 0xff) as f64 / 255.0;
        let g = ((hex >> 8) & 0xff) as f64 / 255.0;
        let b = (hex & 0xff) as f64 / 255.0;
        Self {
            color: DVec3::new(r, g, b),
            opacity,
        }
    }
}

/// Hover highlight of the feature under the pointer.
#[derive(Clone, Debug)]
pub struct HoverConfig {
    pub enabled: bool,
    pub scale: f64,
    pub duration: Duration,
    pub easing: Easing,
    pub rest: LineStyle,
    pub hover: LineStyle,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.02,
            duration: Duration::from_millis(200),
            easing: Easing::linear(),
            rest: LineStyle::from_hex(0x666666, 1.0),
            hover: LineStyle::from_hex(0xeeeeee, 1.0),
        }
    }
}

/// Focus ring drawn around the globe while it has keyboard focus.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineConfig {
    /// Ring width in pixels
    pub width: f64,
    pub color: u32,
    pub label: String,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            width: 2.0,
            color: 0x4d90fe,
            label: "Use the arrow keys to rotate the globe".to_string(),
        }
    }
}

/// Everything the globe and its controls can be configured with.
#[derive(Clone, Debug, Default)]
pub struct GlobeConfig {
    pub controls: ControlsConfig,
    pub hover: HoverConfig,
    pub outline: OutlineConfig,
    /// Tilt the globe by the earth's axial tilt
    pub earth_tilt: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_style() {
        let style = LineStyle::from_hex(0xff8000, 0.5);
        assert_eq!(style.color.x, 1.0);
        assert!((style.color.y - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(style.color.z, 0.0);
        assert_eq!(style.opacity, 0.5);
    }

    #[test]
    fn test_default_polar_bounds() {
        let config = ControlsConfig::default();
        assert!(config.min_polar_angle < PI / 2.0);
        assert!(config.max_polar_angle > PI / 2.0);
        assert!((config.auto_rotate.speed + 0.333333).abs() < 1e-6);
    }
}
