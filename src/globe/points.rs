use glam::{DQuat, DVec2, DVec3};

use crate::controls::camera::{Camera, Projection, Viewport};
use crate::geo::spherical_to_cartesian;

/// A labelled point pinned to the globe surface
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub key: String,
    /// Lon/lat in degrees
    pub lon_lat: DVec2,
    /// Globe-local surface position
    pub position: DVec3,
    /// Viewport pixels, valid after the last `update`
    pub screen: DVec2,
    pub behind_globe: bool,
}

impl Marker {
    fn new(key: String, lon_lat: DVec2) -> Self {
        Self {
            key,
            lon_lat,
            position: spherical_to_cartesian(lon_lat.x, lon_lat.y),
            screen: DVec2::ZERO,
            behind_globe: false,
        }
    }
}

/// Markers in insertion order. Keys are unique; adding an existing key
/// moves that marker.
#[derive(Debug, Default)]
pub struct PointMarkers {
    markers: Vec<Marker>,
}

impl PointMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, lon_lat: DVec2) {
        let key = key.into();
        if !self.update_position(&key, lon_lat) {
            self.markers.push(Marker::new(key, lon_lat));
        }
    }

    /// Returns false if no marker has that key.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.key != key);
        self.markers.len() != before
    }

    /// Remove every marker at exactly this lon/lat.
    pub fn remove_at(&mut self, lon_lat: DVec2) -> usize {
        let before = self.markers.len();
        self.markers.retain(|m| m.lon_lat != lon_lat);
        before - self.markers.len()
    }

    pub fn update_position(&mut self, key: &str, lon_lat: DVec2) -> bool {
        match self.markers.iter_mut().find(|m| m.key == key) {
            Some(marker) => {
                marker.lon_lat = lon_lat;
                marker.position = spherical_to_cartesian(lon_lat.x, lon_lat.y);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Recompute screen positions and visibility. `globe_rotation` maps
    /// globe-local positions to world space.
    pub fn update(&mut self, camera: &Camera, projection: &Projection, viewport: Viewport, globe_rotation: DQuat) {
        let forward = camera.forward();
        for marker in &mut self.markers {
            let world = globe_rotation * marker.position;
            marker.screen = projection.to_screen(camera, viewport, world);
            // Facing away from the camera: on the far hemisphere
            marker.behind_globe = forward.dot(world) > 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let mut markers = PointMarkers::new();
        markers.add("paris", DVec2::new(2.3, 48.9));
        markers.add("tokyo", DVec2::new(139.7, 35.7));
        markers.add("paris", DVec2::new(2.35, 48.85));
        assert_eq!(markers.len(), 2);
        assert_eq!(markers.get("paris").unwrap().lon_lat, DVec2::new(2.35, 48.85));

        assert!(markers.remove("paris"));
        assert!(!markers.remove("paris"));
        assert_eq!(markers.remove_at(DVec2::new(139.7, 35.7)), 1);
        assert!(markers.is_empty());
    }

    #[test]
    fn test_projection_and_visibility() {
        let mut markers = PointMarkers::new();
        markers.add("front", DVec2::new(0.0, 0.0));
        markers.add("back", DVec2::new(180.0, 0.0));

        let camera = Camera::new(DVec3::new(0.0, 0.0, 5.0));
        let viewport = Viewport::new(200.0, 200.0);
        let projection = Projection::fit(viewport, 5.0, 1.0);
        markers.update(&camera, &projection, viewport, DQuat::IDENTITY);

        let front = markers.get("front").unwrap();
        assert!(!front.behind_globe);
        assert!((front.screen - DVec2::new(100.0, 100.0)).length() < 1e-9);

        let back = markers.get("back").unwrap();
        assert!(back.behind_globe);
    }

    #[test]
    fn test_north_projects_above_center() {
        let mut markers = PointMarkers::new();
        markers.add("north", DVec2::new(0.0, 45.0));
        let camera = Camera::new(DVec3::new(0.0, 0.0, 5.0));
        let viewport = Viewport::new(200.0, 200.0);
        let projection = Projection::fit(viewport, 5.0, 1.0);
        markers.update(&camera, &projection, viewport, DQuat::IDENTITY);
        let north = markers.get("north").unwrap();
        assert!(north.screen.y < 100.0);
        assert!((north.screen.x - 100.0).abs() < 1e-9);
    }
}
