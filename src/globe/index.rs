use glam::DVec2;
use rayon::prelude::*;

use crate::globe::geometry::{BoundingBox, Feature};
use crate::globe::spatial::{CellGrid, DEFAULT_CELL_SIZE};

/// One indexed feature with its precomputed bounding box
#[derive(Clone, Debug)]
pub struct IndexEntry {
    pub feature: Feature,
    pub bbox: BoundingBox,
}

impl IndexEntry {
    fn new(feature: Feature) -> Self {
        let bbox = feature.geometry.bounding_box();
        Self { feature, bbox }
    }

    #[inline(always)]
    pub fn id(&self) -> &str {
        &self.feature.id
    }

    #[inline(always)]
    pub fn point_in_bounding_box(&self, point: DVec2) -> bool {
        self.bbox.contains(point)
    }

    #[inline(always)]
    pub fn point_in_geometry(&self, point: DVec2) -> bool {
        self.feature.geometry.contains(point)
    }
}

/// Immutable index over a feature set, built once.
/// Entry order is insertion order, which doubles as draw order.
pub struct GeometryIndex {
    entries: Vec<IndexEntry>,
    grid: CellGrid,
}

impl GeometryIndex {
    pub fn new(features: Vec<Feature>) -> Self {
        Self::with_cell_size(features, DEFAULT_CELL_SIZE)
    }

    pub fn with_cell_size(features: Vec<Feature>, cell_size: f64) -> Self {
        // Bounding boxes are independent per feature; collect keeps order
        let entries: Vec<IndexEntry> = features.into_par_iter().map(IndexEntry::new).collect();
        let grid = CellGrid::build(entries.iter().map(|e| &e.bbox), cell_size);
        Self { entries, grid }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Indices of every entry whose bounding box contains `point`, in
    /// insertion order.
    pub fn candidates(&self, point: DVec2) -> Vec<usize> {
        self.grid
            .query_point(point)
            .iter()
            .copied()
            .filter(|&idx| self.entries[idx].point_in_bounding_box(point))
            .collect()
    }

    #[inline(always)]
    pub fn get(&self, idx: usize) -> Option<&IndexEntry> {
        self.entries.get(idx)
    }

    /// Position of the first entry with the given id
    pub fn find(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    #[inline(always)]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GeometryIndex {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::geometry::Ring;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x0, y1),
            DVec2::new(x1, y1),
            DVec2::new(x1, y0),
            DVec2::new(x0, y0),
        ]
    }

    fn sample_features() -> Vec<Feature> {
        vec![
            Feature::polygon("a", vec![rect(0.0, 0.0, 30.0, 30.0)]),
            Feature::polygon("b", vec![rect(-170.0, -80.0, 170.0, 80.0)]),
            Feature::multi_polygon(
                "c",
                vec![vec![rect(5.0, 5.0, 8.0, 8.0)], vec![rect(100.0, -10.0, 120.0, 10.0)]],
            ),
            Feature::polygon("empty", vec![]),
        ]
    }

    #[test]
    fn test_degenerate_cell_size_uses_default() {
        let reference = GeometryIndex::new(sample_features());
        for cell_size in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let index = GeometryIndex::with_cell_size(sample_features(), cell_size);
            for p in [DVec2::new(6.0, 6.0), DVec2::new(110.0, 0.0), DVec2::new(-179.0, 89.0)] {
                assert_eq!(index.candidates(p), reference.candidates(p));
            }
        }
    }

    #[test]
    fn test_candidates_match_linear_scan() {
        let index = GeometryIndex::new(sample_features());
        for lon in (-180..=180).step_by(7) {
            for lat in (-90..=90).step_by(7) {
                let p = DVec2::new(lon as f64 + 0.5, lat as f64 + 0.25);
                let linear: Vec<usize> = index
                    .entries()
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.point_in_bounding_box(p))
                    .map(|(i, _)| i)
                    .collect();
                assert_eq!(index.candidates(p), linear, "at {:?}", p);
            }
        }
    }

    #[test]
    fn test_candidates_keep_insertion_order() {
        let index = GeometryIndex::new(sample_features());
        assert_eq!(index.candidates(DVec2::new(6.0, 6.0)), vec![0, 1, 2]);
    }

    #[test]
    fn test_bbox_covers_every_coordinate() {
        let index = GeometryIndex::new(sample_features());
        for entry in index.entries() {
            for ring in entry.feature.geometry.rings() {
                for &p in ring {
                    assert!(entry.point_in_bounding_box(p));
                }
            }
        }
    }

    #[test]
    fn test_find_and_len() {
        let index = GeometryIndex::new(sample_features());
        assert_eq!(index.len(), 4);
        assert_eq!(index.find("c"), Some(2));
        assert_eq!(index.find("missing"), None);
        assert!(GeometryIndex::empty().is_empty());
    }
}
