//! In-memory stand-ins for the host side, for driving whole sessions in tests.

use std::collections::HashSet;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::ZoomBounds;
use crate::gallery::ImageSet;
use crate::geometry::Rect;

use super::surface::{ElementRef, ProxyFrame, ProxyId, ProxyStyle, ViewerSurface};
use super::thumbnails::ThumbnailLayout;

/// Every side effect the controller asked for, in order. Proxy frame updates
/// are tracked separately to keep the log readable.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Mount {
        len: usize,
        initial: usize,
        zoom: ZoomBounds,
    },
    Unmount,
    ShowSlide {
        index: usize,
        duration: Duration,
    },
    LiveImageVisible(bool),
    BackdropVisible(bool),
    OverlayVisible(bool),
    AttachProxy {
        id: ProxyId,
        source: ElementRef,
        at: Rect,
        style: ProxyStyle,
    },
    DetachProxy(ProxyId),
}

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<SurfaceCall>,
    mounted: bool,
    next_proxy: u64,
    live: HashSet<ProxyId>,
    max_live: usize,
    frames: usize,
    last_frame: Option<ProxyFrame>,
}

/// A [`ViewerSurface`] that records calls and answers lookups from fixed
/// geometry.
#[derive(Debug)]
pub struct RecordingSurface {
    state: Mutex<Recording>,
    has_layer: bool,
    has_elements: bool,
    slide_rect: Rect,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Recording::default()),
            has_layer: true,
            has_elements: true,
            slide_rect: Rect::new(40.0, 0.0, 1000.0, 700.0),
        }
    }

    /// Simulate a host without an animation overlay layer.
    pub fn without_layer(mut self) -> Self {
        self.has_layer = false;
        self
    }

    /// Simulate slide images that cannot be located.
    pub fn without_elements(mut self) -> Self {
        self.has_elements = false;
        self
    }

    pub fn with_slide_rect(mut self, rect: Rect) -> Self {
        self.slide_rect = rect;
        self
    }

    pub fn slide_rect(&self) -> Rect {
        self.slide_rect
    }

    pub fn slide_element(&self, index: usize) -> ElementRef {
        ElementRef(index as u64 + 1)
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn is_mounted(&self) -> bool {
        self.state.lock().mounted
    }

    pub fn live_proxies(&self) -> usize {
        self.state.lock().live.len()
    }

    /// Highest number of proxies that were attached at the same time.
    pub fn max_live_proxies(&self) -> usize {
        self.state.lock().max_live
    }

    pub fn proxy_frames(&self) -> usize {
        self.state.lock().frames
    }

    pub fn last_proxy_frame(&self) -> Option<ProxyFrame> {
        self.state.lock().last_frame
    }

    fn record(&self, call: SurfaceCall) {
        self.state.lock().calls.push(call);
    }
}

impl ViewerSurface for RecordingSurface {
    fn mount(&self, images: &ImageSet, initial: usize, zoom: ZoomBounds) {
        let mut st = self.state.lock();
        st.mounted = true;
        st.calls.push(SurfaceCall::Mount {
            len: images.len(),
            initial,
            zoom,
        });
    }

    fn unmount(&self) {
        let mut st = self.state.lock();
        st.mounted = false;
        st.calls.push(SurfaceCall::Unmount);
    }

    fn show_slide(&self, index: usize, duration: Duration) {
        self.record(SurfaceCall::ShowSlide { index, duration });
    }

    fn set_live_image_visible(&self, visible: bool) {
        self.record(SurfaceCall::LiveImageVisible(visible));
    }

    fn set_backdrop_visible(&self, visible: bool) {
        self.record(SurfaceCall::BackdropVisible(visible));
    }

    fn set_overlay_visible(&self, visible: bool) {
        self.record(SurfaceCall::OverlayVisible(visible));
    }

    fn active_image(&self, index: usize) -> Option<ElementRef> {
        let mounted = self.state.lock().mounted;
        (mounted && self.has_elements).then(|| self.slide_element(index))
    }

    fn measure(&self, _element: ElementRef) -> Option<Rect> {
        self.has_elements.then_some(self.slide_rect)
    }

    fn attach_proxy(&self, source: ElementRef, at: Rect, style: ProxyStyle) -> Option<ProxyId> {
        if !self.has_layer {
            return None;
        }
        let mut st = self.state.lock();
        st.next_proxy += 1;
        let id = ProxyId(st.next_proxy);
        st.live.insert(id);
        st.max_live = st.max_live.max(st.live.len());
        st.calls.push(SurfaceCall::AttachProxy {
            id,
            source,
            at,
            style,
        });
        Some(id)
    }

    fn update_proxy(&self, proxy: ProxyId, frame: ProxyFrame) {
        let mut st = self.state.lock();
        if st.live.contains(&proxy) {
            st.frames += 1;
            st.last_frame = Some(frame);
        }
    }

    fn detach_proxy(&self, proxy: ProxyId) {
        let mut st = self.state.lock();
        st.live.remove(&proxy);
        st.calls.push(SurfaceCall::DetachProxy(proxy));
    }
}

/// Fixed thumbnail geometry.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout(pub Vec<Rect>);

impl StaticLayout {
    /// `count` thumbnails of 120x80 in a horizontal row near the bottom of
    /// a 1000x750 viewport.
    pub fn strip(count: usize) -> Self {
        Self(
            (0..count)
                .map(|i| Rect::new(640.0, 20.0 + 130.0 * i as f64, 120.0, 80.0))
                .collect(),
        )
    }
}

impl ThumbnailLayout for StaticLayout {
    fn measure_thumbnail_rects(&self) -> Vec<Rect> {
        self.0.clone()
    }
}
