//! The globe itself: indexed features, hover state and markers, plus the
//! tilt that places them in world space.

pub mod geometry;
pub mod hit;
pub mod hover;
pub mod index;
pub mod points;
pub mod spatial;

pub use geometry::{BoundingBox, Feature, FeatureGeometry, Ring};
pub use hover::{HoverAnimator, HoverState, VisualParams};
pub use index::{GeometryIndex, IndexEntry};
pub use points::{Marker, PointMarkers};

use glam::{DQuat, DVec2, DVec3};

use crate::config::{GlobeConfig, HoverConfig};
use crate::controls::camera::{Camera, Projection, Viewport};
use crate::data::FeatureSource;

/// Axial tilt applied as a roll of the whole globe, degrees
pub const EARTH_TILT_DEG: f64 = -23.4;
/// Graticule spacing, degrees
pub const GRATICULE_STEP: f64 = 10.0;

pub struct Globe {
    index: GeometryIndex,
    hover: HoverAnimator,
    markers: PointMarkers,
    earth_tilt: bool,
    rotation: DQuat,
    populated: bool,
}

impl Globe {
    pub fn new(config: &GlobeConfig) -> Self {
        let mut globe = Self {
            index: GeometryIndex::empty(),
            hover: HoverAnimator::new(0, config.hover.clone()),
            markers: PointMarkers::new(),
            earth_tilt: false,
            rotation: DQuat::IDENTITY,
            populated: false,
        };
        globe.set_earth_tilt(config.earth_tilt);
        globe
    }

    /// Load features from `source` and rebuild the index. On failure the
    /// error is logged and the globe keeps no features.
    pub fn populate(&mut self, source: &dyn FeatureSource) -> bool {
        match source.load() {
            Ok(features) => {
                tracing::info!(count = features.len(), "features loaded");
                self.set_features(features);
                true
            }
            Err(e) => {
                tracing::error!("loading features failed: {e:#}");
                self.set_features(Vec::new());
                self.populated = false;
                false
            }
        }
    }

    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.index = GeometryIndex::new(features);
        self.hover.reset(self.index.len());
        self.populated = true;
    }

    #[inline(always)]
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    #[inline(always)]
    pub fn index(&self) -> &GeometryIndex {
        &self.index
    }

    #[inline(always)]
    pub fn hover(&self) -> &HoverAnimator {
        &self.hover
    }

    pub fn set_hover_config(&mut self, config: HoverConfig) {
        self.hover.set_config(config);
    }

    /// Advance hover one frame. `surface_hit` is where the pointer ray meets
    /// the sphere, in world space.
    pub fn update(&mut self, surface_hit: Option<DVec3>) {
        let hovered = if self.hover.config().enabled {
            surface_hit.and_then(|hit| self.index.hit_test_surface(self.to_local(hit)))
        } else {
            None
        };
        self.hover.update(hovered);
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hover.hovered()
    }

    pub fn hovered_feature_id(&self) -> Option<&str> {
        self.hovered().and_then(|idx| self.index.get(idx)).map(|e| e.id())
    }

    /// Enable or disable the axial tilt. This also sets the globe roll to
    /// the tilt angle, or back to zero.
    pub fn set_earth_tilt(&mut self, enabled: bool) {
        self.earth_tilt = enabled;
        self.rotation = if enabled {
            DQuat::from_rotation_z(EARTH_TILT_DEG.to_radians())
        } else {
            DQuat::IDENTITY
        };
    }

    #[inline(always)]
    pub fn earth_tilt(&self) -> bool {
        self.earth_tilt
    }

    #[inline(always)]
    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    #[inline(always)]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.rotation * local
    }

    #[inline(always)]
    pub fn to_local(&self, world: DVec3) -> DVec3 {
        self.rotation.inverse() * world
    }

    /// Where the ray through a viewport pixel meets the unit sphere, in
    /// world space.
    pub fn raycast(&self, camera: &Camera, projection: &Projection, viewport: Viewport, screen: DVec2) -> Option<DVec3> {
        let (origin, direction) = projection.to_ray(camera, viewport, screen);
        intersect_unit_sphere(origin, direction)
    }

    pub fn markers(&self) -> &PointMarkers {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut PointMarkers {
        &mut self.markers
    }

    pub fn update_markers(&mut self, camera: &Camera, projection: &Projection, viewport: Viewport) {
        self.markers.update(camera, projection, viewport, self.rotation);
    }
}

/// Nearest intersection of a ray with the unit sphere at the origin
pub fn intersect_unit_sphere(origin: DVec3, direction: DVec3) -> Option<DVec3> {
    let b = origin.dot(direction);
    let c = origin.length_squared() - 1.0;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let t = if -b - root >= 0.0 { -b - root } else { -b + root };
    if t < 0.0 {
        return None;
    }
    Some(origin + direction * t)
}

/// Meridians every `step` degrees pole to pole, and parallels every `step`
/// degrees short of the poles, as lon/lat polylines sampled every degree.
pub fn graticule(step: f64) -> Vec<Ring> {
    let step = step.max(1.0);
    let mut lines = Vec::new();

    let mut lon = -180.0;
    while lon < 180.0 {
        lines.push((-90..=90).map(|lat| DVec2::new(lon, lat as f64)).collect());
        lon += step;
    }

    let mut lat = -90.0 + step;
    while lat < 90.0 - 1e-9 {
        lines.push((-180..=180).map(|lon| DVec2::new(lon as f64, lat)).collect());
        lat += step;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{builtin_world, GeoJsonFile};
    use crate::geo::spherical_to_cartesian;

    fn square(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Feature {
        Feature::polygon(
            id,
            vec![vec![
                DVec2::new(x0, y0),
                DVec2::new(x1, y0),
                DVec2::new(x1, y1),
                DVec2::new(x0, y1),
                DVec2::new(x0, y0),
            ]],
        )
    }

    fn globe() -> Globe {
        let mut globe = Globe::new(&GlobeConfig::default());
        assert!(globe.populate(&vec![square("A", -10.0, -10.0, 10.0, 10.0), square("B", 30.0, 0.0, 40.0, 10.0)]));
        globe
    }

    #[test]
    fn test_hover_follows_hit() {
        let mut globe = globe();
        globe.update(Some(spherical_to_cartesian(35.0, 5.0)));
        assert_eq!(globe.hovered_feature_id(), Some("B"));
        assert!(globe.hover().is_animating());

        globe.update(Some(spherical_to_cartesian(100.0, 5.0)));
        assert_eq!(globe.hovered_feature_id(), None);
        globe.update(None);
        assert_eq!(globe.hovered(), None);
    }

    #[test]
    fn test_tilt_is_undone_before_hit_test() {
        let mut globe = globe();
        globe.set_earth_tilt(true);
        let local = spherical_to_cartesian(35.0, 5.0);
        globe.update(Some(globe.to_world(local)));
        assert_eq!(globe.hovered_feature_id(), Some("B"));
        assert!((globe.to_local(globe.to_world(local)) - local).length() < 1e-12);

        globe.set_earth_tilt(false);
        assert_eq!(globe.rotation(), DQuat::IDENTITY);
    }

    #[test]
    fn test_failed_load_leaves_globe_empty() {
        let mut globe = globe();
        assert!(!globe.populate(&GeoJsonFile::new("missing/countries.json")));
        assert!(!globe.is_populated());
        assert!(globe.index().is_empty());
        globe.update(Some(spherical_to_cartesian(0.0, 0.0)));
        assert_eq!(globe.hovered(), None);
    }

    #[test]
    fn test_hover_disabled() {
        let mut config = GlobeConfig::default();
        config.hover.enabled = false;
        let mut globe = Globe::new(&config);
        globe.set_features(builtin_world());
        globe.update(Some(spherical_to_cartesian(2.3, 48.9)));
        assert_eq!(globe.hovered(), None);
    }

    #[test]
    fn test_raycast_hits_front_of_sphere() {
        let globe = globe();
        let camera = Camera::new(DVec3::new(0.0, 0.0, 5.0));
        let viewport = Viewport::new(200.0, 100.0);
        let projection = Projection::fit(viewport, 5.0, 1.0);

        let hit = globe.raycast(&camera, &projection, viewport, DVec2::new(100.0, 50.0)).unwrap();
        assert!((hit - DVec3::Z).length() < 1e-9);
        assert!(globe.raycast(&camera, &projection, viewport, DVec2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_ray_from_inside_exits() {
        let hit = intersect_unit_sphere(DVec3::ZERO, DVec3::X).unwrap();
        assert!((hit - DVec3::X).length() < 1e-12);
        assert!(intersect_unit_sphere(DVec3::new(0.0, 0.0, 5.0), DVec3::Z).is_none());
    }

    #[test]
    fn test_graticule_lines() {
        let lines = graticule(GRATICULE_STEP);
        // 36 meridians, 17 parallels from -80 to 80
        assert_eq!(lines.len(), 36 + 17);
        assert_eq!(lines[0][0], DVec2::new(-180.0, -90.0));
        assert_eq!(lines[36][0], DVec2::new(-180.0, -80.0));
        assert_eq!(lines.last().unwrap()[0].y, 80.0);
    }
}
