use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Animations are scheduled in frames, assuming the renderer ticks at 60fps.
pub const FRAMES_PER_SECOND: u128 = 60;

/// Number of frames an animation of `duration` spans, rounded up, at least 1.
pub fn frame_count(duration: Duration) -> u32 {
    let frames = (duration.as_micros() * FRAMES_PER_SECOND).div_ceil(1_000_000);
    frames.clamp(1, u32::MAX as u128) as u32
}

/// Easing curve mapping animation progress `t` in [0, 1] to eased progress.
///
/// Curves are not required to start at 0 or end at 1; transitions snap to
/// their target on the final frame regardless.
#[derive(Clone)]
pub struct Easing(Rc<dyn Fn(f64) -> f64>);

impl Easing {
    pub fn new(curve: impl Fn(f64) -> f64 + 'static) -> Self {
        Self(Rc::new(curve))
    }

    /// `t`
    pub fn linear() -> Self {
        Self::new(|t| t)
    }

    /// Cubic ease-in-out, the default for fly-to transitions.
    pub fn in_out_cubic() -> Self {
        Self::new(|t| {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
            }
        })
    }

    /// Jump straight to `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(move |_| value)
    }

    #[inline]
    pub fn sample(&self, t: f64) -> f64 {
        (self.0)(t)
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::linear()
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Easing(..)")
    }
}
