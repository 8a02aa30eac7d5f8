//! Swipe gesture recognition
//!
//! One tracker instance follows a single pointer gesture from begin to
//! finish. Touch gestures qualify as swipes on distance plus velocity;
//! mouse drags qualify on distance alone and only when the caller armed the
//! tracker (the app does so only in pan mode). Either way the gesture must
//! be horizontally dominant, and finishing resets the tracker no matter
//! what was recognized.

use std::time::{Duration, Instant};

/// Minimum horizontal travel for a touch swipe, in pixels
pub const TOUCH_MIN_DISTANCE: f32 = 50.0;
/// Minimum touch swipe velocity, in pixels per millisecond
pub const TOUCH_MIN_VELOCITY: f32 = 0.3;
/// Minimum horizontal travel for a mouse swipe, in pixels
pub const MOUSE_MIN_DISTANCE: f32 = 100.0;
/// Movement below this is not yet a drag
const DRAG_SLOP: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Touch,
    Mouse,
}

/// Page turn direction produced by a recognized swipe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageTurn {
    Prev,
    Next,
}

/// A recognized swipe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Swipe {
    pub turn: PageTurn,
    pub kind: PointerKind,
}

/// Platform hook fired on successful touch swipes
pub trait Haptics {
    fn pulse(&mut self);
}

/// No-op haptics for platforms without vibration
#[derive(Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&mut self) {}
}

#[derive(Debug)]
struct Gesture {
    kind: PointerKind,
    start_x: f32,
    start_y: f32,
    started_at: Instant,
    dragging: bool,
}

/// Follows one pointer gesture at a time
#[derive(Debug, Default)]
pub struct SwipeTracker {
    gesture: Option<Gesture>,
}

impl SwipeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a gesture at the given canvas position
    pub fn begin(&mut self, kind: PointerKind, x: f32, y: f32, at: Instant) {
        self.gesture = Some(Gesture {
            kind,
            start_x: x,
            start_y: y,
            started_at: at,
            dragging: false,
        });
    }

    /// Record pointer movement.
    ///
    /// Returns true while the gesture is horizontally dominant, which is the
    /// caller's cue to suppress native scrolling for touch input.
    pub fn update(&mut self, x: f32, y: f32) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };

        let dx = x - gesture.start_x;
        let dy = y - gesture.start_y;
        if !gesture.dragging && dx.abs().max(dy.abs()) >= DRAG_SLOP {
            gesture.dragging = true;
        }

        gesture.dragging && dx.abs() > dy.abs()
    }

    /// End the gesture and classify it. Always resets the tracker.
    pub fn finish(&mut self, x: f32, y: f32, at: Instant) -> Option<Swipe> {
        let gesture = self.gesture.take()?;

        let dx = x - gesture.start_x;
        let dy = y - gesture.start_y;
        let elapsed = at.saturating_duration_since(gesture.started_at);

        classify(gesture.kind, dx, dy, elapsed).map(|turn| Swipe {
            turn,
            kind: gesture.kind,
        })
    }

    /// Abandon the gesture without classification
    pub fn cancel(&mut self) {
        self.gesture = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.gesture.as_ref().is_some_and(|g| g.dragging)
    }
}

/// Classify a finished gesture.
///
/// Horizontal dominance (`|dx| > |dy|`) is required for every swipe.
/// Rightward movement turns to the previous page, leftward to the next.
#[must_use]
pub fn classify(
    kind: PointerKind,
    dx: f32,
    dy: f32,
    elapsed: Duration,
) -> Option<PageTurn> {
    let distance = dx.abs();
    if distance <= dy.abs() {
        return None;
    }

    let qualifies = match kind {
        // A long drag or a quick flick both count
        PointerKind::Touch => {
            let ms = (elapsed.as_secs_f32() * 1000.0).max(1.0);
            distance >= TOUCH_MIN_DISTANCE || distance / ms >= TOUCH_MIN_VELOCITY
        }
        PointerKind::Mouse => distance >= MOUSE_MIN_DISTANCE,
    };

    if !qualifies {
        return None;
    }

    Some(if dx > 0.0 {
        PageTurn::Prev
    } else {
        PageTurn::Next
    })
}
