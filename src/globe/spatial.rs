use glam::DVec2;
use std::collections::HashMap;

use crate::globe::geometry::BoundingBox;

/// Cell size used by the geometry index, in degrees.
pub const DEFAULT_CELL_SIZE: f64 = 10.0;

/// Coarse lon/lat grid over feature bounding boxes.
///
/// Each feature is inserted into every cell its bounding box overlaps, so a
/// point query never misses a feature whose box contains the point. False
/// positives are expected and removed by the exact bounding-box test.
pub struct CellGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl CellGrid {
    /// A cell size that is not a positive finite number falls back to
    /// [`DEFAULT_CELL_SIZE`].
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    /// Convert lon/lat to cell coordinates.
    /// Clamped to the world so that boxes reaching past ±180 / ±90 (or to
    /// infinity) still map to a bounded cell range.
    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let lon = lon.clamp(-180.0, 180.0);
        let lat = lat.clamp(-90.0, 90.0);
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes; the feature index is the position
    /// in the iterator. Empty boxes are skipped.
    pub fn build<'a>(bboxes: impl Iterator<Item = &'a BoundingBox>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            if bbox.is_empty() {
                continue;
            }
            let min_cell = grid.to_cell(bbox.min.x, bbox.min.y);
            let max_cell = grid.to_cell(bbox.max.x, bbox.max.y);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Feature indices registered in the cell containing `point`, in
    /// ascending (insertion) order.
    pub fn query_point(&self, point: DVec2) -> &[usize] {
        if point.is_nan() {
            return &[];
        }
        let cell = self.to_cell(point.x, point.y);
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty cells
    #[inline(always)]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
