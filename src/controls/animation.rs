use std::time::Duration;

use crate::easing::{frame_count, Easing};

/// Completion callback of a transition
pub type Callback = Box<dyn FnOnce()>;

/// A frame-scheduled, eased transition.
///
/// `S` carries the kind-specific state (deltas to distribute, zoom range).
pub struct Transition<S> {
    generation: u64,
    frame: u32,
    frames: u32,
    easing: Easing,
    pub state: S,
    on_complete: Option<Callback>,
}

impl<S> Transition<S> {
    #[inline(always)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Hand over the completion callback, if any.
    pub fn take_callback(&mut self) -> Option<Callback> {
        self.on_complete.take()
    }
}

/// One step of the live transition
pub struct Frame<'a, S> {
    pub state: &'a mut S,
    /// Eased progress, exactly 1.0 on the final frame
    pub progress: f64,
    pub finished: bool,
}

/// Transitions of one kind.
///
/// Starting a transition bumps the generation; tasks from older generations
/// are stale and get dropped, without their callbacks, the next time the
/// queue is stepped.
pub struct TransitionQueue<S> {
    generation: u64,
    tasks: Vec<Transition<S>>,
}

impl<S> TransitionQueue<S> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            tasks: Vec::new(),
        }
    }

    /// Schedule a new transition, superseding any running one.
    pub fn start(&mut self, duration: Duration, easing: Easing, state: S, on_complete: Option<Callback>) -> u64 {
        self.generation += 1;
        self.tasks.push(Transition {
            generation: self.generation,
            frame: 0,
            frames: frame_count(duration),
            easing,
            state,
            on_complete,
        });
        self.generation
    }

    /// Make every scheduled transition stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    #[inline(always)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The transition of the current generation, if still running
    pub fn live(&self) -> Option<&Transition<S>> {
        self.tasks.iter().rev().find(|t| t.generation == self.generation)
    }

    pub fn is_active(&self) -> bool {
        self.live().is_some()
    }

    /// Drop stale tasks and advance the live one by a frame.
    pub fn step(&mut self) -> Option<Frame<'_, S>> {
        let generation = self.generation;
        self.tasks.retain(|t| t.generation == generation);

        let task = self.tasks.last_mut()?;
        task.frame += 1;
        let finished = task.frame >= task.frames;
        let progress = if finished {
            1.0
        } else {
            task.easing.sample(task.frame as f64 / task.frames as f64)
        };
        Some(Frame {
            state: &mut task.state,
            progress,
            finished,
        })
    }

    /// Remove the finished live transition.
    pub fn finish(&mut self) -> Option<Transition<S>> {
        let generation = self.generation;
        let i = self.tasks.iter().rposition(|t| t.generation == generation)?;
        Some(self.tasks.remove(i))
    }
}

impl<S> Default for TransitionQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_progress_ends_at_one() {
        let mut queue = TransitionQueue::new();
        queue.start(Duration::from_millis(100), Easing::new(|t| t * 0.5), (), None);

        let mut seen = Vec::new();
        while let Some(frame) = queue.step() {
            seen.push(frame.progress);
            if frame.finished {
                queue.finish();
            }
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[5], 1.0);
        assert!((seen[0] - 1.0 / 12.0).abs() < 1e-12);
        assert!(!queue.is_active());
    }

    #[test]
    fn test_newer_generation_supersedes() {
        let fired = Rc::new(Cell::new(0));
        let mut queue = TransitionQueue::new();

        let first = fired.clone();
        let callback: Callback = Box::new(move || first.set(first.get() + 1));
        queue.start(Duration::from_millis(50), Easing::linear(), "first", Some(callback));
        queue.step();
        queue.start(Duration::from_millis(50), Easing::linear(), "second", None);

        let frame = queue.step().unwrap();
        assert_eq!(*frame.state, "second");
        assert_eq!(queue.live().map(|t| t.state), Some("second"));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_cancel_makes_live_task_stale() {
        let mut queue = TransitionQueue::new();
        queue.start(Duration::from_millis(50), Easing::linear(), 1u8, None);
        assert!(queue.is_active());
        queue.cancel();
        assert!(!queue.is_active());
        assert!(queue.step().is_none());
    }
}
