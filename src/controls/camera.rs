use glam::{DMat3, DMat4, DQuat, DVec2, DVec3};

use crate::config::OutlineConfig;

/// Size of the element the globe is drawn into, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline(always)]
    pub fn min_dimension(&self) -> f64 {
        self.width.min(self.height)
    }

    #[inline(always)]
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(300.0, 150.0)
    }
}

/// Camera pose plus zoom. Up is always +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub orientation: DQuat,
    pub zoom: f64,
}

impl Camera {
    pub fn new(position: DVec3) -> Self {
        let mut camera = Self {
            position,
            orientation: DQuat::IDENTITY,
            zoom: 1.0,
        };
        camera.look_at(DVec3::ZERO);
        camera
    }

    /// Orient the camera toward `target`, keeping +Y up.
    pub fn look_at(&mut self, target: DVec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward == DVec3::ZERO {
            return;
        }
        let mut right = forward.cross(DVec3::Y);
        if right.length_squared() < 1e-12 {
            // Looking straight up or down
            right = DVec3::X;
        }
        let right = right.normalize();
        let up = right.cross(forward);
        self.orientation = DQuat::from_mat3(&DMat3::from_cols(right, up, -forward)).normalize();
    }

    #[inline(always)]
    pub fn forward(&self) -> DVec3 {
        self.orientation * DVec3::NEG_Z
    }

    #[inline(always)]
    pub fn right(&self) -> DVec3 {
        self.orientation * DVec3::X
    }

    #[inline(always)]
    pub fn up(&self) -> DVec3 {
        self.orientation * DVec3::Y
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.orientation, self.position).inverse()
    }
}

/// Perspective projection fitted so the unit globe fills the viewport at
/// zoom 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view at zoom 1, degrees
    pub fov: f64,
    pub aspect: f64,
    pub zoom: f64,
    pub near: f64,
    pub far: f64,
}

impl Projection {
    /// Globe diameter relative to the viewport height
    const SCALE_FACTOR: f64 = 1.05;

    pub fn fit(viewport: Viewport, camera_distance: f64, zoom: f64) -> Self {
        let min_dimension = viewport.min_dimension().max(1.0);
        let scaled_size = viewport.height * Self::SCALE_FACTOR;
        let fov = 2.0 * (scaled_size / min_dimension / camera_distance.max(1e-6)).atan();
        Self {
            fov: fov.to_degrees(),
            aspect: viewport.aspect(),
            zoom,
            near: 0.1,
            far: 2000.0,
        }
    }

    /// Field of view after zoom, radians
    pub fn effective_fov(&self) -> f64 {
        2.0 * ((self.fov.to_radians() / 2.0).tan() / self.zoom.max(1e-6)).atan()
    }

    pub fn matrix(&self) -> DMat4 {
        DMat4::perspective_rh(self.effective_fov(), self.aspect, self.near, self.far)
    }

    /// Project a world point to viewport pixels (origin top-left).
    pub fn to_screen(&self, camera: &Camera, viewport: Viewport, point: DVec3) -> DVec2 {
        let ndc = (self.matrix() * camera.view_matrix()).project_point3(point);
        DVec2::new(
            (ndc.x + 1.0) * viewport.width / 2.0,
            (-ndc.y + 1.0) * viewport.height / 2.0,
        )
    }

    /// World-space ray from the camera through a viewport pixel, as
    /// (origin, unit direction).
    pub fn to_ray(&self, camera: &Camera, viewport: Viewport, screen: DVec2) -> (DVec3, DVec3) {
        let ndc = DVec3::new(
            2.0 * screen.x / viewport.width.max(1.0) - 1.0,
            1.0 - 2.0 * screen.y / viewport.height.max(1.0),
            0.5,
        );
        let inverse = (self.matrix() * camera.view_matrix()).inverse();
        let through = inverse.project_point3(ndc);
        (camera.position, (through - camera.position).normalize_or_zero())
    }
}

/// Focus ring around the globe. Its diameter follows the camera zoom.
#[derive(Clone, Debug)]
pub struct FocusOutline {
    config: OutlineConfig,
    focused: bool,
    diameter: f64,
}

impl FocusOutline {
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            config,
            focused: false,
            diameter: 0.0,
        }
    }

    pub fn calculate_size(&mut self, zoom: f64, viewport: Viewport) {
        self.diameter = (viewport.min_dimension() - 2.0 * self.config.width) * zoom;
    }

    #[inline(always)]
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// The ring is only shown while focused
    #[inline(always)]
    pub fn is_visible(&self) -> bool {
        self.focused
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_origin() {
        let camera = Camera::new(DVec3::new(0.0, 0.0, 5.0));
        assert!((camera.forward() - DVec3::NEG_Z).length() < 1e-12);
        assert!((camera.up() - DVec3::Y).length() < 1e-12);

        let camera = Camera::new(DVec3::new(5.0, 0.0, 0.0));
        assert!((camera.forward() - DVec3::NEG_X).length() < 1e-12);
        assert!((camera.right() - DVec3::NEG_Z).length() < 1e-12);
    }

    #[test]
    fn test_globe_center_projects_to_viewport_center() {
        let camera = Camera::new(DVec3::new(3.0, 1.0, 4.0));
        let viewport = Viewport::new(200.0, 100.0);
        let projection = Projection::fit(viewport, camera.position.length(), 1.0);
        let center = projection.to_screen(&camera, viewport, DVec3::ZERO);
        assert!((center - DVec2::new(100.0, 50.0)).length() < 1e-9);
    }

    #[test]
    fn test_center_ray_points_at_origin() {
        let camera = Camera::new(DVec3::new(0.0, 3.0, 4.0));
        let viewport = Viewport::new(160.0, 90.0);
        let projection = Projection::fit(viewport, 5.0, 1.0);
        let (origin, direction) = projection.to_ray(&camera, viewport, DVec2::new(80.0, 45.0));
        assert_eq!(origin, camera.position);
        assert!((direction - (-camera.position.normalize())).length() < 1e-9);
    }

    #[test]
    fn test_zoom_narrows_field_of_view() {
        let viewport = Viewport::new(100.0, 100.0);
        let wide = Projection::fit(viewport, 5.0, 1.0);
        let narrow = Projection { zoom: 2.0, ..wide };
        assert!(narrow.effective_fov() < wide.effective_fov());
        assert!((wide.effective_fov() - wide.fov.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_outline_size() {
        let mut outline = FocusOutline::new(OutlineConfig::default());
        outline.calculate_size(0.75, Viewport::new(400.0, 300.0));
        assert_eq!(outline.diameter(), (300.0 - 4.0) * 0.75);
        assert!(!outline.is_visible());
        outline.set_focused(true);
        assert!(outline.is_visible());
    }
}
