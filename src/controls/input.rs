use glam::DVec2;
use std::collections::HashMap;

/// Kind of device behind a pointer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

/// Pointer down/move/up/cancel event.
///
/// `over_globe` is the renderer's raycast verdict at dispatch time: does the
/// pointer currently hit the sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub id: u32,
    /// Client position in pixels
    pub position: DVec2,
    pub kind: PointerKind,
    pub over_globe: bool,
}

impl PointerEvent {
    pub fn mouse(x: f64, y: f64, over_globe: bool) -> Self {
        Self {
            id: 0,
            position: DVec2::new(x, y),
            kind: PointerKind::Mouse,
            over_globe,
        }
    }

    pub fn touch(id: u32, x: f64, y: f64, over_globe: bool) -> Self {
        Self {
            id,
            position: DVec2::new(x, y),
            kind: PointerKind::Touch,
            over_globe,
        }
    }
}

/// Scroll wheel / trackpad event, deltas in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelEvent {
    pub delta: DVec2,
    pub over_globe: bool,
}

/// Logical arrow key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDirection {
    Left,
    Up,
    Right,
    Down,
}

/// Event stream a controller can listen to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputChannel {
    Pointer,
    Wheel,
    Keyboard,
    ContextMenu,
}

/// Handle returned by a subscription; pass it back to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    channel: InputChannel,
}

impl Subscription {
    pub fn channel(&self) -> InputChannel {
        self.channel
    }
}

/// Active subscriptions. Events on a channel nobody listens to are dropped.
#[derive(Debug, Default)]
pub struct Subscriptions {
    next_id: u64,
    active: Vec<Subscription>,
}

impl Subscriptions {
    pub fn subscribe(&mut self, channel: InputChannel) -> Subscription {
        self.next_id += 1;
        let subscription = Subscription {
            id: self.next_id,
            channel,
        };
        self.active.push(subscription);
        subscription
    }

    /// Returns false if the handle was already released.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.active.len();
        self.active.retain(|s| *s != subscription);
        self.active.len() != before
    }

    pub fn is_listening(&self, channel: InputChannel) -> bool {
        self.active.iter().any(|s| s.channel == channel)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Pointers currently pressed, in press order, with their kind and last
/// known position.
#[derive(Debug, Default)]
pub struct PointerTracker {
    pointers: Vec<(u32, PointerKind)>,
    positions: HashMap<u32, DVec2>,
}

impl PointerTracker {
    /// A repeated down for a pointer already pressed only updates its kind.
    pub fn add(&mut self, id: u32, kind: PointerKind) {
        match self.pointers.iter_mut().find(|(p, _)| *p == id) {
            Some(entry) => entry.1 = kind,
            None => self.pointers.push((id, kind)),
        }
    }

    pub fn remove(&mut self, id: u32) {
        self.positions.remove(&id);
        self.pointers.retain(|(p, _)| *p != id);
    }

    pub fn contains(&self, id: u32) -> bool {
        self.pointers.iter().any(|(p, _)| *p == id)
    }

    pub fn track(&mut self, id: u32, position: DVec2) {
        self.positions.insert(id, position);
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        self.pointers.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn first(&self) -> Option<(u32, PointerKind)> {
        self.pointers.first().copied()
    }

    pub fn position(&self, id: u32) -> Option<DVec2> {
        self.positions.get(&id).copied()
    }

    /// Position of the other of the first two pointers, origin if unknown.
    pub fn other_position(&self, id: u32) -> DVec2 {
        let other = if self.pointers.first().is_some_and(|(p, _)| *p == id) {
            self.pointers.get(1)
        } else {
            self.pointers.first()
        };
        other
            .and_then(|(other, _)| self.positions.get(other))
            .copied()
            .unwrap_or(DVec2::ZERO)
    }

    /// Single pointer position, or the midpoint with the other pointer
    /// when more than one is down.
    pub fn gesture_center(&self, id: u32, position: DVec2) -> DVec2 {
        if self.count() <= 1 {
            position
        } else {
            (position + self.other_position(id)) * 0.5
        }
    }

    pub fn clear(&mut self) {
        self.pointers.clear();
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_unsubscribe() {
        let mut subs = Subscriptions::default();
        let keys = subs.subscribe(InputChannel::Keyboard);
        let keys_again = subs.subscribe(InputChannel::Keyboard);
        assert_ne!(keys, keys_again);
        assert!(subs.is_listening(InputChannel::Keyboard));
        assert!(!subs.is_listening(InputChannel::Wheel));

        assert!(subs.unsubscribe(keys));
        assert!(!subs.unsubscribe(keys));
        assert!(subs.is_listening(InputChannel::Keyboard));
        assert!(subs.unsubscribe(keys_again));
        assert!(!subs.is_listening(InputChannel::Keyboard));
    }

    #[test]
    fn test_gesture_center() {
        let mut tracker = PointerTracker::default();
        tracker.add(1, PointerKind::Touch);
        tracker.track(1, DVec2::new(10.0, 10.0));
        assert_eq!(tracker.gesture_center(1, DVec2::new(10.0, 10.0)), DVec2::new(10.0, 10.0));

        tracker.add(2, PointerKind::Touch);
        tracker.track(2, DVec2::new(30.0, 50.0));
        assert_eq!(tracker.gesture_center(2, DVec2::new(30.0, 50.0)), DVec2::new(20.0, 30.0));
        assert_eq!(tracker.gesture_center(1, DVec2::new(10.0, 10.0)), DVec2::new(20.0, 30.0));

        tracker.remove(1);
        assert_eq!(tracker.first(), Some((2, PointerKind::Touch)));
        assert_eq!(tracker.position(1), None);
    }

    #[test]
    fn test_repeated_down_is_tracked_once() {
        let mut tracker = PointerTracker::default();
        tracker.add(7, PointerKind::Touch);
        tracker.add(7, PointerKind::Touch);
        assert_eq!(tracker.count(), 1);

        tracker.remove(7);
        assert!(tracker.is_empty());
        assert!(!tracker.contains(7));
    }
}
