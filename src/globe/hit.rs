use glam::{DVec2, DVec3};

use crate::geo::cartesian_to_spherical;
use crate::globe::index::{GeometryIndex, IndexEntry};

impl GeometryIndex {
    /// Topmost feature containing the lon/lat point.
    ///
    /// Candidates pass the bounding-box test in insertion order and are then
    /// scanned last to first: later features are drawn on top, so they win
    /// overlaps.
    pub fn hit_test(&self, point: DVec2) -> Option<usize> {
        let candidates = self.candidates(point);
        candidates
            .into_iter()
            .rev()
            .find(|&idx| self.entries()[idx].point_in_geometry(point))
    }

    /// Hit test a point on (or near) the sphere surface, e.g. a raycast hit
    /// in globe-local coordinates.
    pub fn hit_test_surface(&self, surface: DVec3) -> Option<usize> {
        self.hit_test(cartesian_to_spherical(surface))
    }

    /// Like [`GeometryIndex::hit_test`], returning the entry itself.
    pub fn hit_entry(&self, point: DVec2) -> Option<&IndexEntry> {
        self.hit_test(point).and_then(|idx| self.get(idx))
    }
}
