use glam::{DMat4, DQuat, DVec2, DVec3};

use vector_globe::controls::camera::{Camera, Projection, Viewport};
use vector_globe::geo::{great_circle_points, spherical_to_cartesian};
use vector_globe::globe::hover::VisualParams;
use vector_globe::globe::{graticule, Globe, Ring, GRATICULE_STEP};
use vector_globe::OrbitController;

use crate::braille::BrailleCanvas;
use crate::render::geometry::{draw_circle_outline, draw_line, draw_marker};

/// Arc subdivision for outlines, degrees
const ARC_STEP: f64 = 2.0;
const GRATICULE_RGB: (u8, u8, u8) = (40, 40, 48);
const MARKER_RGB: (u8, u8, u8) = (255, 200, 60);

/// One colour of dots
pub struct Layer {
    pub rgb: (u8, u8, u8),
    pub canvas: BrailleCanvas,
}

/// Everything drawn for one frame, back to front
pub struct GlobeLayers {
    pub layers: Vec<Layer>,
    /// Marker labels in character cells
    pub labels: Vec<(u16, u16, String)>,
}

impl GlobeLayers {
    fn new() -> Self {
        Self {
            layers: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Canvas for `rgb`; a colour gets one layer, placed at first use.
    fn layer(&mut self, rgb: (u8, u8, u8), width: usize, height: usize) -> &mut BrailleCanvas {
        let idx = match self.layers.iter().position(|l| l.rgb == rgb) {
            Some(idx) => idx,
            None => {
                self.layers.push(Layer {
                    rgb,
                    canvas: BrailleCanvas::new(width, height),
                });
                self.layers.len() - 1
            }
        };
        &mut self.layers[idx].canvas
    }
}

/// World to dot-space projection for one frame
struct ScreenProjector {
    view_projection: DMat4,
    camera_position: DVec3,
    rotation: DQuat,
    viewport: Viewport,
}

impl ScreenProjector {
    fn new(camera: &Camera, projection: &Projection, viewport: Viewport, rotation: DQuat) -> Self {
        Self {
            view_projection: projection.matrix() * camera.view_matrix(),
            camera_position: camera.position,
            rotation,
            viewport,
        }
    }

    /// Project a globe-local point scaled by `scale`. `None` on the far side
    /// of the sphere.
    #[inline(always)]
    fn project(&self, local: DVec3, scale: f64) -> Option<(i32, i32)> {
        let world = self.rotation * (local * scale);
        // Surface normal must face the camera
        if world.dot(self.camera_position - world) <= 0.0 {
            return None;
        }
        let ndc = self.view_projection.project_point3(world);
        let x = (ndc.x + 1.0) * self.viewport.width / 2.0;
        let y = (-ndc.y + 1.0) * self.viewport.height / 2.0;
        Some((x as i32, y as i32))
    }
}

pub struct GlobeRenderer {
    graticule: Vec<Ring>,
    pub show_graticule: bool,
}

impl GlobeRenderer {
    pub fn new() -> Self {
        Self {
            graticule: graticule(GRATICULE_STEP),
            show_graticule: true,
        }
    }

    pub fn toggle_graticule(&mut self) {
        self.show_graticule = !self.show_graticule;
    }

    /// Draw into a `width` x `height` cell area. The controller viewport
    /// must already be sized in dots (2 per column, 4 per row).
    pub fn render(&self, width: usize, height: usize, controller: &OrbitController, globe: &Globe) -> GlobeLayers {
        let mut out = GlobeLayers::new();
        let viewport = controller.viewport();
        let projector = ScreenProjector::new(controller.camera(), controller.projection(), viewport, globe.rotation());

        if self.show_graticule {
            let canvas = out.layer(GRATICULE_RGB, width, height);
            for line in &self.graticule {
                draw_polyline(canvas, &projector, line, 1.0);
            }
        }

        // Resting outlines first, the hovered one on top
        let hover = globe.hover();
        let mut order: Vec<usize> = (0..globe.index().len()).collect();
        order.sort_by_key(|&idx| hover.state(idx).map(|s| s.render_order()).unwrap_or(0));

        for idx in order {
            let (Some(entry), Some(state)) = (globe.index().get(idx), hover.state(idx)) else {
                continue;
            };
            let params = state.params();
            let canvas = out.layer(shade(params), width, height);
            for ring in entry.feature.geometry.rings() {
                draw_polyline(canvas, &projector, ring, params.scale);
            }
        }

        let outline = controller.outline();
        if outline.is_visible() {
            let rgb = hex_rgb(outline.config().color);
            let canvas = out.layer(rgb, width, height);
            let center = DVec2::new(viewport.width / 2.0, viewport.height / 2.0);
            draw_circle_outline(canvas, center, outline.diameter() / 2.0, outline.config().width);
        }

        for marker in globe.markers().iter() {
            if marker.behind_globe {
                continue;
            }
            let at = (marker.screen.x as i32, marker.screen.y as i32);
            draw_marker(out.layer(MARKER_RGB, width, height), at, 1);
            if at.0 >= 0 && at.1 >= 0 {
                out.labels.push(((at.0 / 2) as u16 + 2, (at.1 / 4) as u16, marker.key.clone()));
            }
        }

        out
    }
}

impl Default for GlobeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a lon/lat polyline along great-circle arcs, breaking it where it
/// passes behind the globe.
fn draw_polyline(canvas: &mut BrailleCanvas, projector: &ScreenProjector, line: &[DVec2], scale: f64) {
    let Some(first) = line.first() else {
        return;
    };
    let mut from = spherical_to_cartesian(first.x, first.y);
    let mut prev = projector.project(from, scale);

    for point in &line[1..] {
        let to = spherical_to_cartesian(point.x, point.y);
        great_circle_points(from, to, ARC_STEP, |p| {
            let current = projector.project(p, scale);
            if let (Some(a), Some(b)) = (prev, current) {
                draw_line(canvas, a, b);
            }
            prev = current;
        });
        from = to;
    }
}

/// Outline colour with opacity applied over a black background
fn shade(params: &VisualParams) -> (u8, u8, u8) {
    let c = (params.color * params.opacity.clamp(0.0, 1.0) * 255.0).round();
    (c.x as u8, c.y as u8, c.z as u8)
}

fn hex_rgb(hex: u32) -> (u8, u8, u8) {
    ((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vector_globe::config::{ControlsConfig, OutlineConfig};
    use vector_globe::globe::Feature;
    use vector_globe::GlobeConfig;

    fn scene() -> (OrbitController, Globe) {
        let controller = OrbitController::new(
            ControlsConfig::default(),
            OutlineConfig::default(),
            Viewport::new(160.0, 160.0),
        );
        let mut globe = Globe::new(&GlobeConfig::default());
        globe.set_features(vec![Feature::polygon(
            "front",
            vec![vec![
                DVec2::new(-10.0, -10.0),
                DVec2::new(10.0, -10.0),
                DVec2::new(10.0, 10.0),
                DVec2::new(-10.0, 10.0),
                DVec2::new(-10.0, -10.0),
            ]],
        )]);
        (controller, globe)
    }

    #[test]
    fn test_front_feature_drawn() {
        let (controller, globe) = scene();
        let mut renderer = GlobeRenderer::new();
        renderer.show_graticule = false;
        let frame = renderer.render(80, 40, &controller, &globe);
        assert_eq!(frame.layers.len(), 1);
        assert_eq!(frame.layers[0].rgb, (0x66, 0x66, 0x66));
        assert!(!frame.layers[0].canvas.is_blank());
    }

    #[test]
    fn test_back_points_culled() {
        let (controller, globe) = scene();
        let projector = ScreenProjector::new(controller.camera(), controller.projection(), controller.viewport(), globe.rotation());
        assert!(projector.project(spherical_to_cartesian(0.0, 0.0), 1.0).is_some());
        assert!(projector.project(spherical_to_cartesian(180.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_shade_applies_opacity() {
        let params = VisualParams {
            scale: 1.0,
            color: DVec3::ONE,
            opacity: 0.5,
        };
        assert_eq!(shade(&params), (128, 128, 128));
        assert_eq!(hex_rgb(0x4d90fe), (0x4d, 0x90, 0xfe));
    }
}
