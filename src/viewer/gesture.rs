use tracing::debug;

use crate::config::GestureThresholds;
use crate::events::{Direction, GestureSample, PointerKind, TransitionOutcome};

/// Response to a pointer move while a gesture is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerMove {
    /// Horizontal movement dominates; the host should not scroll the page.
    pub prevent_default_scroll: bool,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Tracking { start: GestureSample },
}

/// Classifies touch/stylus drags into slide commits or cancels.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    thresholds: GestureThresholds,
    viewport_width: f64,
    state: State,
    last_commit_ms: Option<f64>,
}

impl GestureTracker {
    pub fn new(thresholds: GestureThresholds, viewport_width: f64) -> Self {
        Self {
            thresholds,
            viewport_width,
            state: State::Idle,
            last_commit_ms: None,
        }
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, State::Tracking { .. })
    }

    /// Starts tracking; returns false for pointers that never navigate.
    pub fn on_pointer_down(&mut self, kind: PointerKind, sample: GestureSample) -> bool {
        if !kind.is_gesture_capable() {
            self.state = State::Idle;
            return false;
        }
        self.state = State::Tracking { start: sample };
        true
    }

    pub fn on_pointer_move(&mut self, sample: GestureSample) -> PointerMove {
        let State::Tracking { start } = self.state else {
            return PointerMove::default();
        };
        let dx = sample.x - start.x;
        let dy = sample.y - start.y;
        PointerMove {
            prevent_default_scroll: dx.abs() > dy.abs(),
        }
    }

    pub fn on_pointer_up(&mut self, sample: GestureSample) -> TransitionOutcome {
        let State::Tracking { start } = std::mem::replace(&mut self.state, State::Idle) else {
            return TransitionOutcome::Cancel;
        };

        let dx = sample.x - start.x;
        let dy = sample.y - start.y;
        let dt = (sample.timestamp_ms - start.timestamp_ms).max(1.0);
        let velocity = dx.abs() / dt;
        let distance = self.thresholds.distance_threshold(self.viewport_width);

        // Ties resolve to vertical, which never changes slides.
        let horizontal = dx.abs() > dy.abs();
        let intentional = dx.abs() > distance || velocity > self.thresholds.velocity_px_per_ms;

        let outcome = if horizontal && intentional {
            self.last_commit_ms = Some(sample.timestamp_ms);
            if dx < 0.0 {
                TransitionOutcome::Commit(Direction::Next)
            } else {
                TransitionOutcome::Commit(Direction::Prev)
            }
        } else {
            TransitionOutcome::Cancel
        };

        debug!(
            dx,
            dy,
            dt,
            velocity,
            distance_threshold = distance,
            ?outcome,
            "gesture classified"
        );
        outcome
    }

    pub fn on_pointer_cancel(&mut self) {
        self.state = State::Idle;
    }

    /// True when a tap at `timestamp_ms` is the synthetic tail of a swipe
    /// that just committed.
    pub fn suppresses_tap(&self, timestamp_ms: f64) -> bool {
        self.last_commit_ms.is_some_and(|committed| {
            let since = timestamp_ms - committed;
            (0.0..self.thresholds.commit_guard_ms).contains(&since)
        })
    }
}
