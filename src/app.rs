use glam::{DVec2, DVec3};
use std::path::Path;
use std::time::{Duration, Instant};

use vector_globe::controls::camera::Viewport;
use vector_globe::controls::input::{KeyDirection, PointerEvent, WheelEvent};
use vector_globe::controls::{RotateToOptions, ZoomOptions};
use vector_globe::data::{builtin_world, DatasetSource, DetailLevel};
use vector_globe::{Globe, GlobeConfig, OrbitController};

use crate::render::GlobeRenderer;

const FLY_DURATION: Duration = Duration::from_millis(1000);
const ZOOM_DURATION: Duration = Duration::from_millis(500);
/// Outline resolution loaded from the data directory
const DETAIL: DetailLevel = DetailLevel::Medium;
/// Wheel delta of one scroll notch, in dots
const SCROLL_STEP: f64 = 12.0;

/// Places the fly-to key cycles through
const PLACES: [(&str, f64, f64); 8] = [
    ("New York", -74.0, 40.7),
    ("London", -0.1, 51.5),
    ("Tokyo", 139.7, 35.7),
    ("Sydney", 151.2, -33.9),
    ("Rio", -43.2, -22.9),
    ("Delhi", 77.2, 28.6),
    ("Moscow", 37.6, 55.8),
    ("Mexico City", -99.1, 19.4),
];

/// Convert a terminal cell inside the bordered globe area to dot
/// coordinates (cell centre).
fn cell_to_dots(col: u16, row: u16) -> DVec2 {
    DVec2::new(
        col.saturating_sub(1) as f64 * 2.0 + 1.0,
        row.saturating_sub(1) as f64 * 4.0 + 2.0,
    )
}

/// Dot size of the globe area for a terminal of `width` x `height` cells:
/// minus the border and the status bar.
fn dot_viewport(width: usize, height: usize) -> Viewport {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    Viewport::new(inner_width as f64 * 2.0, inner_height as f64 * 4.0)
}

pub struct App {
    pub controller: OrbitController,
    pub globe: Globe,
    pub renderer: GlobeRenderer,
    pub should_quit: bool,
    pub mouse_pos: Option<(u16, u16)>,
    next_place: usize,
    last_tick: Instant,
}

impl App {
    pub fn new(width: usize, height: usize, config: GlobeConfig) -> Self {
        let mut controller = OrbitController::new(config.controls.clone(), config.outline.clone(), dot_viewport(width, height));
        controller.listen_to_key_events();
        controller.save_state();

        let mut globe = Globe::new(&config);
        for (name, lon, lat) in PLACES {
            globe.markers_mut().add(name, DVec2::new(lon, lat));
        }

        Self {
            controller,
            globe,
            renderer: GlobeRenderer::new(),
            should_quit: false,
            mouse_pos: None,
            next_place: 0,
            last_tick: Instant::now(),
        }
    }

    /// Load country outlines from `data_dir`, or the built-in continents
    /// when no dataset is there.
    pub fn load(&mut self, data_dir: &Path) {
        let source = Self::dataset(data_dir);
        if source.path().exists() && self.globe.populate(&source) {
            return;
        }
        tracing::warn!(path = %source.path().display(), "no dataset, using built-in outlines");
        self.globe.populate(&builtin_world());
    }

    fn dataset(data_dir: &Path) -> DatasetSource {
        DatasetSource::new(data_dir, DETAIL, true)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.controller.set_viewport(dot_viewport(width, height));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// World-space point of the globe under a terminal cell
    fn surface_at(&self, col: u16, row: u16) -> Option<DVec3> {
        self.globe.raycast(
            self.controller.camera(),
            self.controller.projection(),
            self.controller.viewport(),
            cell_to_dots(col, row),
        )
    }

    fn pointer(&self, col: u16, row: u16) -> PointerEvent {
        let at = cell_to_dots(col, row);
        PointerEvent::mouse(at.x, at.y, self.surface_at(col, row).is_some())
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    pub fn mouse_down(&mut self, col: u16, row: u16) {
        let event = self.pointer(col, row);
        self.controller.pointer_down(&event);
    }

    pub fn mouse_drag(&mut self, col: u16, row: u16) {
        let event = self.pointer(col, row);
        self.controller.pointer_move(&event);
    }

    pub fn mouse_up(&mut self, col: u16, row: u16) {
        let event = self.pointer(col, row);
        self.controller.pointer_up(&event);
    }

    /// Scroll by whole notches; positive `dy` scrolls down.
    pub fn scroll(&mut self, col: u16, row: u16, dx: f64, dy: f64) {
        let event = WheelEvent {
            delta: DVec2::new(dx, dy) * SCROLL_STEP,
            over_globe: self.surface_at(col, row).is_some(),
        };
        self.controller.wheel(&event);
    }

    pub fn key(&mut self, direction: KeyDirection) {
        self.controller.key_down(direction);
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.controller.set_focused(focused);
    }

    pub fn toggle_zoom(&mut self) {
        self.controller.zoom(None, ZOOM_DURATION, ZoomOptions::default());
    }

    /// Fly to the next place in the list
    pub fn fly_to_next(&mut self) {
        let (name, lon, lat) = PLACES[self.next_place % PLACES.len()];
        self.next_place += 1;
        tracing::info!(name, lon, lat, "flying");
        self.controller
            .rotate_to(DVec2::new(lon, lat), FLY_DURATION, RotateToOptions::default());
    }

    pub fn toggle_tilt(&mut self) {
        let tilt = !self.globe.earth_tilt();
        self.globe.set_earth_tilt(tilt);
    }

    pub fn toggle_auto_rotate(&mut self) {
        let enabled = !self.controller.config().auto_rotate.enabled;
        self.controller.set_auto_rotate(enabled);
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Advance controls, hover and markers by one frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;

        self.controller.update(Some(delta));
        let hit = self.mouse_pos.and_then(|(col, row)| self.surface_at(col, row));
        self.globe.update(hit);
        self.globe.update_markers(
            self.controller.camera(),
            self.controller.projection(),
            self.controller.viewport(),
        );
    }

    pub fn hovered_label(&self) -> &str {
        self.globe.hovered_feature_id().unwrap_or("-")
    }

    /// Lon/lat facing the camera
    pub fn center_coords(&self) -> String {
        let center = self.controller.camera_lon_lat();
        format!(
            "{:.1}°{}, {:.1}°{}",
            center.y.abs(),
            if center.y >= 0.0 { "N" } else { "S" },
            center.x.abs(),
            if center.x >= 0.0 { "E" } else { "W" }
        )
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.2}x", self.controller.zoom_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_dots() {
        assert_eq!(cell_to_dots(1, 1), DVec2::new(1.0, 2.0));
        assert_eq!(cell_to_dots(11, 6), DVec2::new(21.0, 22.0));
    }

    #[test]
    fn test_dot_viewport() {
        let viewport = dot_viewport(82, 43);
        assert_eq!(viewport, Viewport::new(160.0, 160.0));
    }

    #[test]
    fn test_center_cell_is_over_globe() {
        let app = App::new(82, 43, GlobeConfig::default());
        // Centre of the 80x40 cell area, shifted by the border
        assert!(app.pointer(41, 21).over_globe);
        assert!(!app.pointer(1, 1).over_globe);
    }

    #[test]
    fn test_loads_medium_countries() {
        let source = App::dataset(Path::new("data"));
        assert_eq!(source.path(), Path::new("data").join("ne_50m_countries.json"));
    }

    #[test]
    fn test_missing_dataset_falls_back_to_builtin() {
        let mut app = App::new(82, 43, GlobeConfig::default());
        app.load(Path::new("no-such-dir"));
        assert!(app.globe.is_populated());
        assert_eq!(app.globe.index().len(), builtin_world().len());
    }

    #[test]
    fn test_markers_placed() {
        let app = App::new(82, 43, GlobeConfig::default());
        assert_eq!(app.globe.markers().len(), PLACES.len());
    }
}
