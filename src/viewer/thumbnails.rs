use crate::geometry::Rect;

/// Source of live thumbnail geometry (the host's layout engine).
pub trait ThumbnailLayout {
    /// Current viewport rects of every rendered thumbnail, in strip order.
    fn measure_thumbnail_rects(&self) -> Vec<Rect>;
}

impl<F> ThumbnailLayout for F
where
    F: Fn() -> Vec<Rect>,
{
    fn measure_thumbnail_rects(&self) -> Vec<Rect> {
        self()
    }
}

/// Where the hero animation starts (open) or lands (close).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeroAnchor {
    Rect(Rect),
    /// No geometry available; use a plain fade.
    FadeOnly,
}

/// Thumbnail rects measured once, when a session opens.
///
/// Rects are never refreshed afterwards; a new session takes a new snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThumbnailRectCache {
    rects: Vec<Rect>,
}

impl ThumbnailRectCache {
    pub fn capture(layout: &dyn ThumbnailLayout) -> Self {
        Self {
            rects: layout.measure_thumbnail_rects(),
        }
    }

    pub fn from_rects(rects: Vec<Rect>) -> Self {
        Self { rects }
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rect> {
        self.rects.get(index).copied()
    }

    /// Origin for a click: the snapshot entry for `index`, else the clicked
    /// element's own rect if the host could measure it.
    pub fn click_origin(&self, index: usize, clicked: Option<Rect>) -> Option<Rect> {
        self.get(index).or(clicked)
    }

    /// Hero anchor for `index`: the snapshot entry, then `fallback`, then a fade.
    pub fn anchor_for(&self, index: usize, fallback: Option<Rect>) -> HeroAnchor {
        match self.get(index).or(fallback) {
            Some(rect) => HeroAnchor::Rect(rect),
            None => HeroAnchor::FadeOnly,
        }
    }
}
