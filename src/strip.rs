//! The thumbnail strip on the product page: the caller side of the viewer.

use tracing::debug;

use crate::events::{OpenRequest, ViewerEvent};
use crate::gallery::ImageSet;
use crate::geometry::Rect;
use crate::viewer::thumbnails::{ThumbnailLayout, ThumbnailRectCache};

#[derive(Debug, Clone)]
pub struct ThumbnailStrip {
    images: ImageSet,
    step: usize,
    leading: usize,
    /// Thumbnail hidden because its image is "inside" the open viewer.
    opening_index: Option<usize>,
}

impl ThumbnailStrip {
    pub fn new(images: ImageSet, step: usize) -> Self {
        Self {
            images,
            step: step.max(1),
            leading: 0,
            opening_index: None,
        }
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn leading_index(&self) -> usize {
        self.leading
    }

    pub fn opening_index(&self) -> Option<usize> {
        self.opening_index
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.opening_index == Some(index)
    }

    /// Scroll forward by one step, stopping at the last thumbnail.
    pub fn step_forward(&mut self) -> usize {
        let last = self.images.len().saturating_sub(1);
        self.leading = (self.leading + self.step).min(last);
        self.leading
    }

    pub fn step_back(&mut self) -> usize {
        self.leading = self.leading.saturating_sub(self.step);
        self.leading
    }

    /// Click on thumbnail `index`: hide it and build the open request with
    /// a fresh snapshot of every thumbnail rect.
    ///
    /// `None` when the strip has nothing to open.
    pub fn open_request(
        &mut self,
        index: usize,
        clicked: Option<Rect>,
        layout: &dyn ThumbnailLayout,
    ) -> Option<OpenRequest> {
        if self.images.is_empty() {
            return None;
        }
        let index = index.min(self.images.len() - 1);
        self.opening_index = Some(index);
        Some(OpenRequest {
            images: self.images.clone(),
            initial_index: index,
            origin_rect: clicked,
            thumbnails: ThumbnailRectCache::capture(layout),
        })
    }

    /// Mirror a viewer notification; returns true when the hidden
    /// thumbnail changed.
    pub fn apply(&mut self, event: &ViewerEvent) -> bool {
        let next = match *event {
            ViewerEvent::IndexChanged(index) => Some(index),
            ViewerEvent::CloseComplete { .. } => None,
            ViewerEvent::PhaseChanged(_) => return false,
        };
        if next == self.opening_index {
            return false;
        }
        debug!(from = ?self.opening_index, to = ?next, "strip hidden thumbnail");
        self.opening_index = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::testkit::StaticLayout;

    fn strip(n: usize) -> ThumbnailStrip {
        let files: Vec<String> = (0..n).map(|i| format!("{i:02}.webp")).collect();
        ThumbnailStrip::new(ImageSet::from(files), 3)
    }

    #[test]
    fn steps_clamp_without_wrapping() {
        let mut s = strip(8);
        assert_eq!(s.step_forward(), 3);
        assert_eq!(s.step_forward(), 6);
        assert_eq!(s.step_forward(), 7);
        assert_eq!(s.step_back(), 4);
        assert_eq!(s.step_back(), 1);
        assert_eq!(s.step_back(), 0);
    }

    #[test]
    fn empty_strip_cannot_open() {
        let mut s = strip(0);
        assert_eq!(s.step_forward(), 0);
        assert!(s.open_request(0, None, &StaticLayout::default()).is_none());
        assert_eq!(s.opening_index(), None);
    }

    #[test]
    fn open_hides_clicked_thumbnail_and_snapshots_rects() {
        let mut s = strip(3);
        let layout = StaticLayout::strip(3);
        let req = s.open_request(1, None, &layout).unwrap();
        assert_eq!(req.initial_index, 1);
        assert_eq!(req.thumbnails.len(), 3);
        assert!(s.is_hidden(1));
    }

    #[test]
    fn follows_viewer_events() {
        let mut s = strip(3);
        s.open_request(0, None, &StaticLayout::strip(3));
        assert!(!s.apply(&ViewerEvent::IndexChanged(0)));
        assert!(s.apply(&ViewerEvent::IndexChanged(2)));
        assert!(s.is_hidden(2));
        assert!(s.apply(&ViewerEvent::CloseComplete { final_index: 2 }));
        assert_eq!(s.opening_index(), None);
    }
}
