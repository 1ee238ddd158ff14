use serde::Deserialize;

use crate::gallery::ImageSet;
use crate::geometry::Rect;
use crate::viewer::thumbnails::ThumbnailRectCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Classification of one completed pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Commit(Direction),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Only touch and stylus drags navigate slides.
    pub fn is_gesture_capable(self) -> bool {
        matches!(self, Self::Touch | Self::Pen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GestureSample {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: f64,
}

impl GestureSample {
    pub const fn new(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self { x, y, timestamp_ms }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Escape,
    Other,
}

impl Key {
    /// Maps DOM-style key names, including the legacy short aliases.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// Everything needed to open a viewer session.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub images: ImageSet,
    pub initial_index: usize,
    /// Rect of the clicked thumbnail, if the host could measure it.
    pub origin_rect: Option<Rect>,
    /// All thumbnail rects, snapshotted at click time.
    pub thumbnails: ThumbnailRectCache,
}

/// Inputs to the viewer controller task.
#[derive(Debug, Clone)]
pub enum ViewerCommand {
    Open(OpenRequest),
    /// The slide surface painted the image at this index for the first time.
    InitialImagePainted(usize),
    /// The slide surface settled on a new index on its own.
    SlideChanged(usize),
    Navigate(Direction),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: SessionPhase,
    pub to: SessionPhase,
}

/// Notifications emitted by the controller task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    PhaseChanged(PhaseChange),
    /// The authoritative index changed; delivered one frame after the change.
    IndexChanged(usize),
    /// Fired exactly once per session after the close animation or its
    /// fallback finishes.
    CloseComplete { final_index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_accept_legacy_aliases() {
        assert_eq!(Key::from_name("Right"), Key::ArrowRight);
        assert_eq!(Key::from_name("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from_name("Esc"), Key::Escape);
        assert_eq!(Key::from_name("Enter"), Key::Other);
    }
}
