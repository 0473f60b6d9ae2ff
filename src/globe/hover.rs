use glam::DVec3;

use crate::config::{HoverConfig, LineStyle};
use crate::easing::frame_count;

/// Render order of resting feature outlines
pub const REST_ORDER: u8 = 2;
/// Render order of the hovered outline, drawn above the rest
pub const HOVER_ORDER: u8 = 3;

/// What the renderer needs to draw one feature outline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualParams {
    pub scale: f64,
    pub color: DVec3,
    pub opacity: f64,
}

impl VisualParams {
    fn lerp(&self, target: &Self, t: f64) -> Self {
        Self {
            scale: self.scale + (target.scale - self.scale) * t,
            color: self.color + (target.color - self.color) * t,
            opacity: self.opacity + (target.opacity - self.opacity) * t,
        }
    }

    fn styled(style: &LineStyle, scale: f64) -> Self {
        Self {
            scale,
            color: style.color,
            opacity: style.opacity,
        }
    }
}

/// Per-feature hover animation state
#[derive(Clone, Debug)]
pub struct HoverState {
    current: VisualParams,
    from: VisualParams,
    hovered: bool,
    frame: u32,
}

impl HoverState {
    #[inline(always)]
    pub fn params(&self) -> &VisualParams {
        &self.current
    }

    #[inline(always)]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn render_order(&self) -> u8 {
        if self.hovered {
            HOVER_ORDER
        } else {
            REST_ORDER
        }
    }
}

/// Steps every feature's scale, colour and opacity toward its hover or rest
/// target once per call.
///
/// Progress is counted in calls, not elapsed time: a transition takes
/// `frame_budget()` calls whatever the frame rate.
pub struct HoverAnimator {
    states: Vec<HoverState>,
    config: HoverConfig,
    hovered: Option<usize>,
}

impl HoverAnimator {
    pub fn new(feature_count: usize, config: HoverConfig) -> Self {
        let mut animator = Self {
            states: Vec::new(),
            config,
            hovered: None,
        };
        animator.reset(feature_count);
        animator
    }

    /// Drop all state and start `feature_count` features at rest.
    pub fn reset(&mut self, feature_count: usize) {
        let rest = self.rest_params();
        let budget = self.frame_budget();
        self.hovered = None;
        self.states = vec![
            HoverState {
                current: rest,
                from: rest,
                hovered: false,
                frame: budget,
            };
            feature_count
        ];
    }

    pub fn frame_budget(&self) -> u32 {
        frame_count(self.config.duration)
    }

    fn rest_params(&self) -> VisualParams {
        VisualParams::styled(&self.config.rest, 1.0)
    }

    fn hover_params(&self) -> VisualParams {
        VisualParams::styled(&self.config.hover, self.config.scale)
    }

    /// Advance one frame with `hovered` as the feature under the pointer.
    pub fn update(&mut self, hovered: Option<usize>) {
        self.hovered = if self.config.enabled { hovered } else { None };

        let budget = self.frame_budget();
        let rest = self.rest_params();
        let hover = self.hover_params();

        for (idx, state) in self.states.iter_mut().enumerate() {
            let is_hovered = self.hovered == Some(idx);
            if is_hovered != state.hovered {
                // Target flipped: restart from wherever we are
                state.hovered = is_hovered;
                state.from = state.current;
                state.frame = 0;
            }

            if state.frame >= budget {
                continue;
            }

            state.frame += 1;
            let target = if is_hovered { &hover } else { &rest };
            state.current = if state.frame == budget {
                *target
            } else {
                let t = self.config.easing.sample(state.frame as f64 / budget as f64);
                state.from.lerp(target, t)
            };
        }
    }

    #[inline(always)]
    pub fn state(&self, idx: usize) -> Option<&HoverState> {
        self.states.get(idx)
    }

    #[inline(always)]
    pub fn states(&self) -> &[HoverState] {
        &self.states
    }

    #[inline(always)]
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// True while any feature is still moving toward its target
    pub fn is_animating(&self) -> bool {
        let budget = self.frame_budget();
        self.states.iter().any(|s| s.frame < budget)
    }

    pub fn config(&self) -> &HoverConfig {
        &self.config
    }

    /// Replace the configuration. Settled features snap to the new
    /// targets; running transitions keep their share of progress under the
    /// new budget.
    pub fn set_config(&mut self, config: HoverConfig) {
        let old_budget = self.frame_budget();
        self.config = config;
        let budget = self.frame_budget();
        let rest = self.rest_params();
        let hover = self.hover_params();

        for state in &mut self.states {
            if state.frame >= old_budget {
                let target = if state.hovered { hover } else { rest };
                state.current = target;
                state.from = target;
                state.frame = budget;
            } else {
                // Floor keeps a running transition short of the new budget
                let scaled = state.frame as u64 * budget as u64 / old_budget as u64;
                state.frame = scaled as u32;
            }
        }
    }
}
