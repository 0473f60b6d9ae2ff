//! Orbit camera controls.
//!
//! The controller is a plain state machine: the input source feeds it
//! pointer, wheel and key events, the renderer calls [`OrbitController::update`]
//! once per frame and redraws when it returns true.

pub mod animation;
pub mod camera;
pub mod input;
pub mod timer;

use glam::{DVec2, DVec3};
use std::f64::consts::{PI, TAU};
use std::time::Duration;

use crate::config::ControlsConfig;
use crate::config::OutlineConfig;
use crate::easing::Easing;
use crate::geo::{cartesian_to_spherical, wrap_angle};

use animation::{Callback, TransitionQueue};
use camera::{Camera, FocusOutline, Projection, Viewport};
use input::{
    InputChannel, KeyDirection, PointerEvent, PointerKind, PointerTracker, Subscription, Subscriptions,
    WheelEvent,
};
use timer::{Clock, IdleTimer, SystemClock};

/// Pose change below this is not worth a redraw
const EPS: f64 = 0.000001;
/// Keeps the polar angle off the poles
const POLE_EPS: f64 = 0.000001;
/// Wheel and key interactions count as finished after this much silence
const INTERACTION_IDLE: Duration = Duration::from_millis(200);

/// Interaction mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    None,
    Rotate,
    TouchRotate,
    ScrollRotate,
}

/// Spherical coordinates around the orbit target (Y up).
/// `theta` is the azimuth from +z toward +x, `phi` the angle from +y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spherical {
    pub radius: f64,
    pub phi: f64,
    pub theta: f64,
}

impl Spherical {
    pub fn from_vec(v: DVec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec(&self) -> DVec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        DVec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Options of [`OrbitController::rotate_to`]
pub struct RotateToOptions {
    pub easing: Easing,
    /// Lock user rotation while the transition runs
    pub disable_rotate: bool,
    pub on_complete: Option<Callback>,
}

impl Default for RotateToOptions {
    fn default() -> Self {
        Self {
            easing: Easing::in_out_cubic(),
            disable_rotate: true,
            on_complete: None,
        }
    }
}

/// Options of [`OrbitController::zoom`]
#[derive(Default)]
pub struct ZoomOptions {
    pub easing: Easing,
    pub on_complete: Option<Callback>,
}

/// Deltas still to be handed out by a fly-to transition
struct RotateStep {
    total_left: f64,
    total_up: f64,
    progress: f64,
    disable_rotate: bool,
}

struct ZoomStep {
    start: f64,
    target: f64,
}

/// Orbit camera controller around a target (the globe centre).
pub struct OrbitController<C: Clock = SystemClock> {
    config: ControlsConfig,
    clock: C,
    camera: Camera,
    target: DVec3,
    viewport: Viewport,
    projection: Projection,
    outline: FocusOutline,

    state: State,
    spherical: Spherical,
    delta_theta: f64,
    delta_phi: f64,
    rotate_start: DVec2,

    auto_rotate_paused: bool,
    auto_rotate_timer: IdleTimer,
    wheel_timer: IdleTimer,
    key_timer: IdleTimer,

    pointers: PointerTracker,
    subscriptions: Subscriptions,
    key_subscription: Option<Subscription>,

    rotations: TransitionQueue<RotateStep>,
    zooms: TransitionQueue<ZoomStep>,

    saved_target: DVec3,
    saved_position: DVec3,
    saved_zoom: f64,

    last_position: DVec3,
    last_orientation: glam::DQuat,
    last_target: DVec3,
}

impl OrbitController<SystemClock> {
    pub fn new(config: ControlsConfig, outline: OutlineConfig, viewport: Viewport) -> Self {
        Self::with_clock(config, outline, viewport, SystemClock)
    }
}

impl<C: Clock> OrbitController<C> {
    pub fn with_clock(config: ControlsConfig, outline: OutlineConfig, viewport: Viewport, clock: C) -> Self {
        let camera = Camera::new(config.camera_position);
        let projection = Projection::fit(viewport, camera.position.length(), camera.zoom);
        let mut subscriptions = Subscriptions::default();
        for channel in [InputChannel::Pointer, InputChannel::Wheel, InputChannel::ContextMenu] {
            subscriptions.subscribe(channel);
        }

        let mut controller = Self {
            clock,
            camera,
            target: DVec3::ZERO,
            viewport,
            projection,
            outline: FocusOutline::new(outline),
            state: State::None,
            spherical: Spherical::default(),
            delta_theta: 0.0,
            delta_phi: 0.0,
            rotate_start: DVec2::ZERO,
            auto_rotate_paused: false,
            auto_rotate_timer: IdleTimer::default(),
            wheel_timer: IdleTimer::default(),
            key_timer: IdleTimer::default(),
            pointers: PointerTracker::default(),
            subscriptions,
            key_subscription: None,
            rotations: TransitionQueue::new(),
            zooms: TransitionQueue::new(),
            saved_target: DVec3::ZERO,
            saved_position: config.camera_position,
            saved_zoom: 1.0,
            last_position: DVec3::ZERO,
            last_orientation: glam::DQuat::IDENTITY,
            last_target: DVec3::ZERO,
            config,
        };
        controller.outline.calculate_size(controller.camera.zoom, viewport);
        controller.update(None);
        controller
    }

    // --- accessors ---

    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline(always)]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline(always)]
    pub fn target(&self) -> DVec3 {
        self.target
    }

    #[inline(always)]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    #[inline(always)]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline(always)]
    pub fn outline(&self) -> &FocusOutline {
        &self.outline
    }

    #[inline(always)]
    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    #[inline(always)]
    pub fn zoom_level(&self) -> f64 {
        self.camera.zoom
    }

    /// Polar angle from +Y after the last update
    pub fn polar_angle(&self) -> f64 {
        self.spherical.phi
    }

    /// Azimuth after the last update
    pub fn azimuthal_angle(&self) -> f64 {
        self.spherical.theta
    }

    pub fn distance(&self) -> f64 {
        self.camera.position.distance(self.target)
    }

    /// Lon/lat (degrees) of the point on the globe facing the camera
    pub fn camera_lon_lat(&self) -> DVec2 {
        cartesian_to_spherical(self.camera.position)
    }

    /// Auto-rotation is currently spinning the camera (or would, once idle)
    pub fn is_auto_rotating(&self) -> bool {
        self.config.auto_rotate.enabled && !self.auto_rotate_paused && !self.rotations.is_active()
    }

    /// User rotation is allowed: enabled in config and not locked by a
    /// running fly-to transition.
    pub fn can_rotate(&self) -> bool {
        let locked = self.rotations.live().is_some_and(|t| t.state.disable_rotate);
        self.config.rotate_enabled && !locked
    }

    pub fn is_animating(&self) -> bool {
        self.rotations.is_active() || self.zooms.is_active()
    }

    // --- settings ---

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn set_rotate_enabled(&mut self, enabled: bool) {
        self.config.rotate_enabled = enabled;
    }

    /// Turning auto-rotation off also drops a pending idle restart.
    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.config.auto_rotate.enabled = enabled;
        if !enabled {
            self.auto_rotate_paused = false;
            self.auto_rotate_timer.cancel();
        }
    }

    pub fn set_damping(&mut self, damping: crate::config::Damping) {
        self.config.damping = damping;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.outline.set_focused(focused);
    }

    /// Resize the element; refits the projection and the focus outline.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.projection = Projection::fit(viewport, self.distance(), self.camera.zoom);
        self.outline.calculate_size(self.camera.zoom, viewport);
    }

    fn update_projection(&mut self) {
        self.projection.zoom = self.camera.zoom;
        self.outline.calculate_size(self.camera.zoom, self.viewport);
    }

    // --- subscriptions ---

    pub fn subscribe(&mut self, channel: InputChannel) -> Subscription {
        self.subscriptions.subscribe(channel)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        if self.key_subscription == Some(subscription) {
            self.key_subscription = None;
        }
        self.subscriptions.unsubscribe(subscription)
    }

    pub fn listen_to_key_events(&mut self) -> Subscription {
        if let Some(existing) = self.key_subscription {
            return existing;
        }
        let subscription = self.subscriptions.subscribe(InputChannel::Keyboard);
        self.key_subscription = Some(subscription);
        subscription
    }

    pub fn stop_listen_to_key_events(&mut self) {
        if let Some(subscription) = self.key_subscription.take() {
            self.subscriptions.unsubscribe(subscription);
        }
    }

    /// Detach from every input channel, stop running transitions and
    /// pending timers.
    pub fn dispose(&mut self) {
        self.subscriptions.clear();
        self.key_subscription = None;
        self.pointers.clear();
        self.rotations.cancel();
        self.zooms.cancel();
        self.wheel_timer.cancel();
        self.key_timer.cancel();
        self.auto_rotate_timer.cancel();
        self.state = State::None;
    }

    // --- save / reset ---

    pub fn save_state(&mut self) {
        self.saved_target = self.target;
        self.saved_position = self.camera.position;
        self.saved_zoom = self.camera.zoom;
    }

    pub fn reset(&mut self) {
        self.target = self.saved_target;
        self.camera.position = self.saved_position;
        self.camera.zoom = self.saved_zoom;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.update_projection();
        self.update(None);
        self.state = State::None;
    }

    // --- rotation primitives ---

    #[inline(always)]
    fn rotate_left(&mut self, angle: f64) {
        self.delta_theta -= angle;
    }

    #[inline(always)]
    fn rotate_up(&mut self, angle: f64) {
        self.delta_phi -= angle;
    }

    #[inline(always)]
    fn element_height(&self) -> f64 {
        self.viewport.height.max(1.0)
    }

    fn auto_rotation_angle(&self, delta: Option<Duration>) -> f64 {
        let speed = self.config.auto_rotate.speed;
        match delta {
            Some(dt) if !dt.is_zero() => TAU / 60.0 * speed * dt.as_secs_f64(),
            _ => TAU / 60.0 / 60.0 * speed,
        }
    }

    /// Pause auto-rotation and resume it after the idle delay.
    fn auto_rotate_restart(&mut self) {
        if !self.config.auto_rotate.enabled {
            return;
        }
        self.auto_rotate_paused = true;
        let now = self.clock.now();
        self.auto_rotate_timer.arm(now, self.config.auto_rotate.idle_delay);
    }

    // --- input ---

    pub fn pointer_down(&mut self, event: &PointerEvent) {
        if !self.config.enabled || !self.subscriptions.is_listening(InputChannel::Pointer) {
            return;
        }
        self.pointers.add(event.id, event.kind);
        self.pointers.track(event.id, event.position);
        match event.kind {
            PointerKind::Touch => self.touch_start(event),
            PointerKind::Mouse | PointerKind::Pen => self.mouse_down(event),
        }
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) {
        if !self.config.enabled || !self.pointers.contains(event.id) {
            return;
        }
        self.pointers.track(event.id, event.position);
        match event.kind {
            PointerKind::Touch => self.touch_move(event),
            PointerKind::Mouse | PointerKind::Pen => self.mouse_move(event),
        }
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) {
        if !self.subscriptions.is_listening(InputChannel::Pointer) {
            return;
        }
        self.pointers.remove(event.id);

        if event.over_globe {
            self.auto_rotate_restart();
        }

        match self.pointers.count() {
            0 => self.state = State::None,
            1 => {
                // One pointer left: continue rotating from where it is
                let Some((id, kind)) = self.pointers.first() else {
                    return;
                };
                let Some(position) = self.pointers.position(id) else {
                    return;
                };
                let remaining = PointerEvent {
                    id,
                    position,
                    kind,
                    over_globe: event.over_globe,
                };
                match kind {
                    PointerKind::Touch => self.touch_start(&remaining),
                    PointerKind::Mouse | PointerKind::Pen => self.mouse_down(&remaining),
                }
            }
            _ => {}
        }
    }

    pub fn pointer_cancel(&mut self, event: &PointerEvent) {
        self.pointer_up(event);
    }

    fn mouse_down(&mut self, event: &PointerEvent) {
        if !self.can_rotate() || !event.over_globe {
            return;
        }
        self.rotate_start = event.position;
        self.state = State::Rotate;
    }

    fn mouse_move(&mut self, event: &PointerEvent) {
        if self.state != State::Rotate || !self.can_rotate() || !event.over_globe {
            return;
        }
        self.apply_drag(event.position);
    }

    fn touch_start(&mut self, event: &PointerEvent) {
        if !self.can_rotate() || !event.over_globe {
            return;
        }
        self.rotate_start = self.pointers.gesture_center(event.id, event.position);
        self.state = State::TouchRotate;
    }

    fn touch_move(&mut self, event: &PointerEvent) {
        if self.state != State::TouchRotate || !self.can_rotate() || !event.over_globe {
            return;
        }
        let end = self.pointers.gesture_center(event.id, event.position);
        self.apply_drag(end);
    }

    /// Drag from `rotate_start` to `end`; a full element height turns 2π.
    fn apply_drag(&mut self, end: DVec2) {
        let delta = (end - self.rotate_start) * self.config.rotate_speed;
        let height = self.element_height();
        self.rotate_left(TAU * delta.x / height);
        self.rotate_up(TAU * delta.y / height);
        self.rotate_start = end;
    }

    pub fn wheel(&mut self, event: &WheelEvent) {
        if !self.config.enabled
            || !self.config.scroll_rotate
            || !self.can_rotate()
            || !event.over_globe
            || !self.subscriptions.is_listening(InputChannel::Wheel)
        {
            return;
        }
        let vertical = -event.delta.y * self.config.rotate_speed;
        let horizontal = -event.delta.x * self.config.rotate_speed;
        let height = self.element_height();
        self.rotate_up(TAU * vertical / height);
        self.rotate_left(TAU * horizontal / height);

        let now = self.clock.now();
        self.wheel_timer.arm(now, INTERACTION_IDLE);
        self.state = State::ScrollRotate;
    }

    /// Returns true if the key was handled.
    pub fn key_down(&mut self, direction: KeyDirection) -> bool {
        if !self.config.enabled || !self.subscriptions.is_listening(InputChannel::Keyboard) {
            return false;
        }
        let step = 2.0 * TAU * self.config.rotate_speed / self.element_height();
        match direction {
            KeyDirection::Up => self.rotate_up(step),
            KeyDirection::Down => self.rotate_up(-step),
            KeyDirection::Left => self.rotate_left(step),
            KeyDirection::Right => self.rotate_left(-step),
        }
        let now = self.clock.now();
        self.key_timer.arm(now, INTERACTION_IDLE);
        true
    }

    pub fn context_menu(&mut self, over_globe: bool) {
        if !self.config.enabled || !over_globe || !self.subscriptions.is_listening(InputChannel::ContextMenu) {
            return;
        }
        self.state = State::None;
    }

    // --- transitions ---

    /// Fly the camera so that `target` (lon/lat degrees) faces it.
    pub fn rotate_to(&mut self, target: DVec2, duration: Duration, options: RotateToOptions) {
        let target = target * (PI / 180.0);
        // Measure from the pose the pending deltas will settle at, so a
        // superseded flight's undelivered rotation is accounted for
        let pending = DVec2::new(self.delta_theta, -self.delta_phi);
        let camera_point = self.camera_lon_lat() * (PI / 180.0) + pending;

        let step = RotateStep {
            total_left: -(target.x - camera_point.x),
            total_up: target.y - camera_point.y,
            progress: 0.0,
            disable_rotate: options.disable_rotate,
        };
        let generation = self.rotations.start(duration, options.easing, step, options.on_complete);
        tracing::debug!(generation, lon = target.x.to_degrees(), lat = target.y.to_degrees(), "rotate_to");
    }

    /// Animate the camera zoom. `None` toggles between 1 and 0.75.
    pub fn zoom(&mut self, target: Option<f64>, duration: Duration, options: ZoomOptions) {
        let start = self.camera.zoom;
        let target = target.unwrap_or(if start == 1.0 { 0.75 } else { 1.0 });
        let generation = self.zooms.start(duration, options.easing, ZoomStep { start, target }, options.on_complete);
        tracing::debug!(generation, start, target, "zoom");
    }

    fn advance_transitions(&mut self) {
        let mut completed: Vec<Callback> = Vec::new();

        if let Some(frame) = self.rotations.step() {
            let step = frame.state;
            let delta = frame.progress - step.progress;
            step.progress = frame.progress;
            let (left, up) = (step.total_left * delta, step.total_up * delta);
            let finished = frame.finished;

            self.rotate_left(left);
            self.rotate_up(up);

            if finished {
                if let Some(mut done) = self.rotations.finish() {
                    completed.extend(done.take_callback());
                }
                self.auto_rotate_restart();
            }
        }

        if let Some(frame) = self.zooms.step() {
            let ZoomStep { start, target } = *frame.state;
            let finished = frame.finished;
            self.camera.zoom = if finished {
                target
            } else {
                start + frame.progress * (target - start)
            };
            self.update_projection();

            if finished {
                if let Some(mut done) = self.zooms.finish() {
                    completed.extend(done.take_callback());
                }
            }
        }

        for callback in completed {
            callback();
        }
    }

    fn fire_timers(&mut self) {
        let now = self.clock.now();
        if self.auto_rotate_timer.fire_due(now) {
            self.auto_rotate_paused = false;
        }
        if self.wheel_timer.fire_due(now) {
            self.auto_rotate_restart();
            self.state = State::None;
        }
        if self.key_timer.fire_due(now) {
            self.auto_rotate_restart();
            self.state = State::None;
        }
    }

    // --- per frame ---

    /// Advance one frame. `delta` is the time since the previous frame, if
    /// the renderer tracks it. Returns true if the camera moved.
    pub fn update(&mut self, delta: Option<Duration>) -> bool {
        self.fire_timers();
        self.advance_transitions();

        let offset = self.camera.position - self.target;
        let mut spherical = Spherical::from_vec(offset);

        if self.is_auto_rotating() && self.state == State::None {
            let angle = self.auto_rotation_angle(delta);
            self.rotate_left(angle);
        }

        let damping = self.config.damping;
        let factor = if damping.enabled { damping.factor } else { 1.0 };
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;

        spherical.theta = clamp_azimuth(spherical.theta, self.config.min_azimuth_angle, self.config.max_azimuth_angle);
        spherical.phi = clamp_polar(spherical.phi, self.config.min_polar_angle, self.config.max_polar_angle);

        self.target = clamp_length(self.target, self.config.min_target_radius, self.config.max_target_radius);

        self.camera.position = self.target + spherical.to_vec();
        self.camera.look_at(self.target);
        self.spherical = spherical;

        if damping.enabled {
            self.delta_theta *= 1.0 - damping.factor;
            self.delta_phi *= 1.0 - damping.factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }

        if self.last_position.distance_squared(self.camera.position) > EPS
            || 8.0 * (1.0 - self.last_orientation.dot(self.camera.orientation)) > EPS
            || self.last_target.distance_squared(self.target) > 0.0
        {
            self.last_position = self.camera.position;
            self.last_orientation = self.camera.orientation;
            self.last_target = self.target;
            return true;
        }
        false
    }
}

/// Clamp the azimuth into [min, max] when both bounds are finite. Bounds
/// are wrapped into [-π, π] first; a wrapped range that crosses ±π keeps
/// theta on whichever side of the range it is closer to.
fn clamp_azimuth(theta: f64, min: f64, max: f64) -> f64 {
    if !(min.is_finite() && max.is_finite()) {
        return theta;
    }
    let (min, max) = (wrap_angle(min), wrap_angle(max));
    if min <= max {
        theta.min(max).max(min)
    } else if theta > (min + max) / 2.0 {
        theta.max(min)
    } else {
        theta.min(max)
    }
}

/// Clamp into the polar bounds, keeping clear of the exact poles.
fn clamp_polar(phi: f64, min: f64, max: f64) -> f64 {
    let phi = phi.min(max).max(min);
    let phi = phi.clamp(POLE_EPS, PI - POLE_EPS);
    phi.min(max).max(min)
}

fn clamp_length(v: DVec3, min: f64, max: f64) -> DVec3 {
    let length = v.length();
    if length == 0.0 {
        return v;
    }
    v * (length.min(max).max(min) / length)
}
