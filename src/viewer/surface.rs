use std::time::Duration;

use crate::config::ZoomBounds;
use crate::gallery::ImageSet;
use crate::geometry::{FlipTransform, Rect};

/// Opaque handle to an element owned by the host (e.g. a slide's `<img>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub u64);

/// Handle to a visual proxy living in the animation overlay layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyStyle {
    pub corner_radius_px: f64,
    /// Stack the proxy above the live surface (used while closing).
    pub on_top: bool,
}

/// One animation frame for a proxy. The transform has a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyFrame {
    pub transform: FlipTransform,
    pub opacity: f64,
}

/// Rendering seam between the viewer core and whatever draws it.
///
/// All methods are called from the controller task. Lookups return `None`
/// when the element or the overlay layer does not exist; the core then
/// degrades to a fade or skips the animation.
pub trait ViewerSurface: Send + Sync + 'static {
    /// Build the full-screen slide surface for `images`, showing `initial`.
    fn mount(&self, images: &ImageSet, initial: usize, zoom: ZoomBounds);
    /// Tear the full-screen surface down.
    fn unmount(&self);
    /// Programmatically move the slide surface to `index`.
    fn show_slide(&self, index: usize, duration: Duration);
    /// Show or hide the live slide image (hidden while a proxy stands in).
    fn set_live_image_visible(&self, visible: bool);
    fn set_backdrop_visible(&self, visible: bool);
    /// Close/prev/next buttons drawn over the slides.
    fn set_overlay_visible(&self, visible: bool);
    /// Image element of the slide at `index`, if it is rendered.
    fn active_image(&self, index: usize) -> Option<ElementRef>;
    /// Fresh viewport rect of `element`.
    fn measure(&self, element: ElementRef) -> Option<Rect>;
    /// Insert a detached clone of `source` at `at` in the overlay layer.
    fn attach_proxy(&self, source: ElementRef, at: Rect, style: ProxyStyle) -> Option<ProxyId>;
    fn update_proxy(&self, proxy: ProxyId, frame: ProxyFrame);
    fn detach_proxy(&self, proxy: ProxyId);
}
