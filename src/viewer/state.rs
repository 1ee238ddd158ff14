use tracing::debug;

use crate::events::{Direction, OpenRequest, PhaseChange, SessionPhase};
use crate::gallery::ImageSet;
use crate::geometry::Rect;

use super::navigator::SlideNavigator;
use super::thumbnails::{HeroAnchor, ThumbnailRectCache};

/// Why an open request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OpenRejected {
    #[error("a session is already {0:?}")]
    Busy(SessionPhase),
    #[error("no images to show")]
    NoImages,
}

/// Outcome of a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Already closed or closing.
    Ignored,
    /// The open animation is still running; close once it resolves.
    Deferred,
    Start(PhaseChange),
}

/// Book-keeping for one viewer session.
///
/// Pure state: the controller task owns it and performs every side effect.
/// The `transitioning` lock and both animation flags live here and nowhere
/// else.
#[derive(Debug)]
pub struct ViewerSession {
    phase: SessionPhase,
    images: ImageSet,
    navigator: SlideNavigator,
    origin: Option<Rect>,
    thumbnails: ThumbnailRectCache,
    transitioning: bool,
    opening_animation_active: bool,
    closing_animation_active: bool,
    close_deferred: bool,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Closed,
            images: ImageSet::default(),
            navigator: SlideNavigator::new(0, 0),
            origin: None,
            thumbnails: ThumbnailRectCache::default(),
            transitioning: false,
            opening_animation_active: false,
            closing_animation_active: false,
            close_deferred: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn current_index(&self) -> usize {
        self.navigator.current_index()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn opening_animation_active(&self) -> bool {
        self.opening_animation_active
    }

    pub fn closing_animation_active(&self) -> bool {
        self.closing_animation_active
    }

    pub fn close_deferred(&self) -> bool {
        self.close_deferred
    }

    /// Closed -> Opening. The initial index is clamped into the image range.
    pub fn begin_open(&mut self, req: OpenRequest) -> Result<PhaseChange, OpenRejected> {
        if self.phase != SessionPhase::Closed {
            return Err(OpenRejected::Busy(self.phase));
        }
        if req.images.is_empty() {
            return Err(OpenRejected::NoImages);
        }
        self.navigator = SlideNavigator::new(req.images.len(), req.initial_index);
        let index = self.navigator.current_index();
        self.origin = req.thumbnails.click_origin(index, req.origin_rect);
        self.thumbnails = req.thumbnails;
        self.images = req.images;
        self.transitioning = false;
        self.close_deferred = false;
        self.goto(SessionPhase::Opening)
            .ok_or(OpenRejected::Busy(self.phase))
    }

    /// Where the open animation starts.
    pub fn hero_anchor(&self) -> HeroAnchor {
        match self.origin {
            Some(rect) => HeroAnchor::Rect(rect),
            None => HeroAnchor::FadeOnly,
        }
    }

    /// Where the close animation lands: the thumbnail of the current index,
    /// then the open origin, then a plain fade.
    pub fn close_anchor(&self) -> HeroAnchor {
        self.thumbnails
            .anchor_for(self.navigator.current_index(), self.origin)
    }

    /// Marks the open animation as running; false outside `Opening` or when
    /// it already runs.
    pub fn start_opening_animation(&mut self) -> bool {
        if self.phase != SessionPhase::Opening || self.opening_animation_active {
            return false;
        }
        self.opening_animation_active = true;
        true
    }

    /// Opening -> Open.
    pub fn finish_opening(&mut self) -> Option<PhaseChange> {
        if self.phase != SessionPhase::Opening {
            return None;
        }
        self.opening_animation_active = false;
        self.goto(SessionPhase::Open)
    }

    pub fn request_close(&mut self) -> CloseDecision {
        match self.phase {
            SessionPhase::Closed | SessionPhase::Closing => CloseDecision::Ignored,
            SessionPhase::Opening => {
                self.close_deferred = true;
                CloseDecision::Deferred
            }
            SessionPhase::Open => {
                self.transitioning = false;
                match self.goto(SessionPhase::Closing) {
                    Some(ch) => CloseDecision::Start(ch),
                    None => CloseDecision::Ignored,
                }
            }
        }
    }

    /// Consumes a close recorded during `Opening`.
    pub fn take_deferred_close(&mut self) -> bool {
        std::mem::take(&mut self.close_deferred)
    }

    pub fn start_closing_animation(&mut self) -> bool {
        if self.phase != SessionPhase::Closing || self.closing_animation_active {
            return false;
        }
        self.closing_animation_active = true;
        true
    }

    /// Closing -> Closed, returning the index the viewer closed on.
    ///
    /// The session's images and geometry are dropped here.
    pub fn finish_closing(&mut self) -> Option<(PhaseChange, usize)> {
        if self.phase != SessionPhase::Closing {
            return None;
        }
        let final_index = self.navigator.current_index();
        let change = self.goto(SessionPhase::Closed)?;
        self.images = ImageSet::default();
        self.navigator = SlideNavigator::new(0, 0);
        self.origin = None;
        self.thumbnails = ThumbnailRectCache::default();
        self.transitioning = false;
        self.opening_animation_active = false;
        self.closing_animation_active = false;
        self.close_deferred = false;
        Some((change, final_index))
    }

    /// Step to the neighbouring slide and take the transition lock.
    ///
    /// Returns the new index, or `None` when not `Open`, already
    /// transitioning, or there is nowhere to go.
    pub fn navigate(&mut self, direction: Direction) -> Option<usize> {
        if self.phase != SessionPhase::Open || self.transitioning || self.navigator.len() < 2 {
            debug!(
                phase = ?self.phase,
                transitioning = self.transitioning,
                ?direction,
                "navigation ignored"
            );
            return None;
        }
        let index = match direction {
            Direction::Next => self.navigator.next(),
            Direction::Prev => self.navigator.prev(),
        };
        self.transitioning = true;
        Some(index)
    }

    /// The slide surface settled on `index` by itself; returns the new index
    /// when it differs from the current one.
    pub fn slide_changed(&mut self, index: usize) -> Option<usize> {
        if self.phase != SessionPhase::Open {
            return None;
        }
        let before = self.navigator.current_index();
        let after = self.navigator.set_index(index);
        (after != before).then_some(after)
    }

    /// Releases the transition lock.
    pub fn finish_slide(&mut self) {
        self.transitioning = false;
    }

    fn goto(&mut self, to: SessionPhase) -> Option<PhaseChange> {
        if self.phase == to {
            return None;
        }
        let ch = PhaseChange {
            from: self.phase,
            to,
        };
        self.phase = to;
        debug_assert!(!(self.opening_animation_active && self.closing_animation_active));
        Some(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(images: &[&str], initial: usize) -> OpenRequest {
        let rects = (0..images.len())
            .map(|i| Rect::new(600.0, 20.0 + 130.0 * i as f64, 120.0, 80.0))
            .collect();
        OpenRequest {
            images: ImageSet::from(images.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
            initial_index: initial,
            origin_rect: Some(Rect::new(601.0, 21.0, 118.0, 78.0)),
            thumbnails: ThumbnailRectCache::from_rects(rects),
        }
    }

    fn open_session(images: &[&str], initial: usize) -> ViewerSession {
        let mut s = ViewerSession::new();
        s.begin_open(request(images, initial)).unwrap();
        assert!(s.start_opening_animation());
        s.finish_opening().unwrap();
        s
    }

    #[test]
    fn empty_open_stays_closed() {
        let mut s = ViewerSession::new();
        assert_eq!(s.begin_open(request(&[], 0)), Err(OpenRejected::NoImages));
        assert_eq!(s.phase(), SessionPhase::Closed);
    }

    #[test]
    fn open_rejected_while_busy() {
        let mut s = ViewerSession::new();
        let ch = s.begin_open(request(&["a.png"], 0)).unwrap();
        assert_eq!((ch.from, ch.to), (SessionPhase::Closed, SessionPhase::Opening));
        assert_eq!(
            s.begin_open(request(&["b.png"], 0)),
            Err(OpenRejected::Busy(SessionPhase::Opening))
        );
        assert_eq!(&s.images()[0], "a.png");
    }

    #[test]
    fn initial_index_is_clamped() {
        let s = open_session(&["a", "b", "c"], 10);
        assert_eq!(s.current_index(), 2);
    }

    #[test]
    fn open_anchor_prefers_captured_thumbnail() {
        let mut s = ViewerSession::new();
        let mut req = request(&["a", "b"], 1);
        req.origin_rect = Some(Rect::new(10.0, 10.0, 50.0, 50.0));
        s.begin_open(req.clone()).unwrap();
        assert_eq!(s.hero_anchor(), HeroAnchor::Rect(Rect::new(600.0, 150.0, 120.0, 80.0)));

        let mut s = ViewerSession::new();
        req.thumbnails = ThumbnailRectCache::default();
        s.begin_open(req.clone()).unwrap();
        assert_eq!(s.hero_anchor(), HeroAnchor::Rect(Rect::new(10.0, 10.0, 50.0, 50.0)));

        let mut s = ViewerSession::new();
        req.origin_rect = None;
        s.begin_open(req).unwrap();
        assert_eq!(s.hero_anchor(), HeroAnchor::FadeOnly);
        assert_eq!(s.close_anchor(), HeroAnchor::FadeOnly);
    }

    #[test]
    fn navigation_holds_lock_until_slide_settles() {
        let mut s = open_session(&["a", "b", "c"], 0);
        assert_eq!(s.navigate(Direction::Next), Some(1));
        assert!(s.is_transitioning());
        assert_eq!(s.navigate(Direction::Next), None);
        s.finish_slide();
        assert_eq!(s.navigate(Direction::Next), Some(2));
        s.finish_slide();
        assert_eq!(s.navigate(Direction::Next), Some(0));
        s.finish_slide();
        assert_eq!(s.navigate(Direction::Prev), Some(2));
    }

    #[test]
    fn navigation_ignored_outside_open() {
        let mut s = ViewerSession::new();
        assert_eq!(s.navigate(Direction::Next), None);
        s.begin_open(request(&["a", "b"], 0)).unwrap();
        assert_eq!(s.navigate(Direction::Next), None);
        assert_eq!(s.slide_changed(1), None);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn close_anchors_to_current_thumbnail() {
        let mut s = open_session(&["a", "b", "c"], 0);
        s.navigate(Direction::Next);
        s.finish_slide();
        s.navigate(Direction::Next);
        s.finish_slide();
        assert_eq!(s.current_index(), 2);
        assert!(matches!(s.request_close(), CloseDecision::Start(_)));
        assert_eq!(s.close_anchor(), HeroAnchor::Rect(Rect::new(600.0, 280.0, 120.0, 80.0)));
    }

    #[test]
    fn close_is_idempotent() {
        let mut s = open_session(&["a", "b"], 1);
        let CloseDecision::Start(ch) = s.request_close() else {
            panic!("close should start");
        };
        assert_eq!((ch.from, ch.to), (SessionPhase::Open, SessionPhase::Closing));
        assert_eq!(s.request_close(), CloseDecision::Ignored);
        assert!(s.start_closing_animation());
        assert!(!s.start_closing_animation());
        let (ch, final_index) = s.finish_closing().unwrap();
        assert_eq!(ch.to, SessionPhase::Closed);
        assert_eq!(final_index, 1);
        assert!(s.finish_closing().is_none());
        assert_eq!(s.request_close(), CloseDecision::Ignored);
        assert!(s.images().is_empty());
    }

    #[test]
    fn close_while_opening_is_deferred() {
        let mut s = ViewerSession::new();
        s.begin_open(request(&["a"], 0)).unwrap();
        s.start_opening_animation();
        assert_eq!(s.request_close(), CloseDecision::Deferred);
        assert_eq!(s.phase(), SessionPhase::Opening);
        assert!(s.opening_animation_active());
        assert!(!s.closing_animation_active());
        s.finish_opening();
        assert!(s.take_deferred_close());
        assert!(!s.take_deferred_close());
        assert!(matches!(s.request_close(), CloseDecision::Start(_)));
    }

    #[test]
    fn surface_reported_index_is_clamped() {
        let mut s = open_session(&["a", "b", "c"], 0);
        assert_eq!(s.slide_changed(0), None);
        assert_eq!(s.slide_changed(7), Some(2));
    }
}
