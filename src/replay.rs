//! Headless session replay: drive the controller from a YAML script of host
//! inputs against a surface that only logs.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::{Configuration, ZoomBounds};
use crate::events::{GestureSample, Key, PointerKind, SessionPhase, ViewerEvent};
use crate::gallery::ImageSet;
use crate::geometry::Rect;
use crate::strip::ThumbnailStrip;
use crate::viewer::{
    self,
    surface::{ElementRef, ProxyFrame, ProxyId, ProxyStyle, ViewerSurface},
};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

fn default_swipe_ms() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Script {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    /// Thumbnail rects; a single row is laid out when omitted.
    #[serde(default)]
    pub thumbnails: Vec<Rect>,
    /// Each step is a single-key map (`- open: 0`) or a bare name (`- tap`).
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Click thumbnail `index`.
    Open(usize),
    /// The slide surface painted its first image.
    Paint(usize),
    /// DOM key name, e.g. `ArrowRight` or `Esc`.
    Key(String),
    WaitMs(u64),
    Swipe(Swipe),
    /// The slide surface settled on an index by itself.
    Slide(usize),
    Tap,
    Close,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Swipe {
    #[serde(default = "default_pointer")]
    pub pointer: PointerKind,
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
    #[serde(default = "default_swipe_ms")]
    pub duration_ms: u64,
}

fn default_pointer() -> PointerKind {
    PointerKind::Touch
}

impl Script {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    fn thumbnail_rects(&self, count: usize) -> Vec<Rect> {
        if !self.thumbnails.is_empty() {
            return self.thumbnails.clone();
        }
        let top = self.viewport_height - 140.0;
        (0..count)
            .map(|i| Rect::new(top, 20.0 + 130.0 * i as f64, 120.0, 80.0))
            .collect()
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    mounted: bool,
    next_proxy: u64,
}

/// Surface that draws nothing and logs every call.
#[derive(Debug)]
pub struct ScriptedSurface {
    viewport: Rect,
    state: Mutex<SurfaceState>,
}

impl ScriptedSurface {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport: Rect::new(0.0, 0.0, viewport_width, viewport_height),
            state: Mutex::new(SurfaceState::default()),
        }
    }
}

impl ViewerSurface for ScriptedSurface {
    fn mount(&self, images: &ImageSet, initial: usize, zoom: ZoomBounds) {
        self.state.lock().mounted = true;
        info!(
            images = images.len(),
            initial,
            zoom_min = zoom.min_ratio,
            zoom_max = zoom.max_ratio,
            "surface mount"
        );
    }

    fn unmount(&self) {
        self.state.lock().mounted = false;
        info!("surface unmount");
    }

    fn show_slide(&self, index: usize, duration: Duration) {
        info!(index, ?duration, "surface show slide");
    }

    fn set_live_image_visible(&self, visible: bool) {
        debug!(visible, "surface live image");
    }

    fn set_backdrop_visible(&self, visible: bool) {
        debug!(visible, "surface backdrop");
    }

    fn set_overlay_visible(&self, visible: bool) {
        debug!(visible, "surface overlay");
    }

    fn active_image(&self, index: usize) -> Option<ElementRef> {
        self.state
            .lock()
            .mounted
            .then_some(ElementRef(index as u64))
    }

    /// Slides are letterboxed at 4:3 in the middle of the viewport.
    fn measure(&self, _element: ElementRef) -> Option<Rect> {
        let vp = self.viewport;
        let width = vp.width.min(vp.height * 4.0 / 3.0);
        let height = width * 3.0 / 4.0;
        Some(Rect::new(
            (vp.height - height) / 2.0,
            (vp.width - width) / 2.0,
            width,
            height,
        ))
    }

    fn attach_proxy(&self, source: ElementRef, at: Rect, style: ProxyStyle) -> Option<ProxyId> {
        let mut st = self.state.lock();
        st.next_proxy += 1;
        let id = ProxyId(st.next_proxy);
        info!(?id, ?source, ?at, radius = style.corner_radius_px, "proxy attach");
        Some(id)
    }

    fn update_proxy(&self, proxy: ProxyId, frame: ProxyFrame) {
        debug!(?proxy, transform = %frame.transform, opacity = frame.opacity, "proxy frame");
    }

    fn detach_proxy(&self, proxy: ProxyId) {
        info!(?proxy, "proxy detach");
    }
}

fn drain(
    events: &mut mpsc::Receiver<ViewerEvent>,
    strip: &mut ThumbnailStrip,
    out: &mut Vec<ViewerEvent>,
) {
    while let Ok(event) = events.try_recv() {
        info!(?event, "viewer event");
        strip.apply(&event);
        out.push(event);
    }
}

/// Replays `script` against a fresh controller and returns every event it
/// emitted, in order.
#[instrument(skip_all, fields(images = images.len(), steps = script.steps.len()))]
pub async fn replay(
    cfg: Configuration,
    images: ImageSet,
    script: &Script,
    surface: Arc<dyn ViewerSurface>,
) -> Result<Vec<ViewerEvent>> {
    let cancel = CancellationToken::new();
    let mut strip = ThumbnailStrip::new(images.clone(), cfg.thumbnail_step);
    let rects = script.thumbnail_rects(images.len());
    let layout = move || rects.clone();

    let (mut handle, mut events, task) = viewer::spawn(cfg, surface, cancel.clone());
    handle.set_viewport_width(script.viewport_width);

    let started = Instant::now();
    let now_ms = || started.elapsed().as_secs_f64() * 1000.0;
    let mut seen = Vec::new();

    for step in &script.steps {
        debug!(?step, "replay step");
        match step {
            Step::Open(index) => match strip.open_request(*index, None, &layout) {
                Some(req) => {
                    if !handle.open(req) {
                        warn!(index, "open refused");
                    }
                }
                None => warn!(index, "nothing to open"),
            },
            Step::Paint(index) => {
                handle.initial_image_painted(*index);
            }
            Step::Key(name) => {
                let consumed = handle.key(Key::from_name(name));
                debug!(key = %name, consumed, "key");
            }
            Step::WaitMs(ms) => sleep(Duration::from_millis(*ms)).await,
            Step::Swipe(swipe) => {
                let (x, y) = (script.viewport_width / 2.0, script.viewport_height / 2.0);
                handle.pointer_down(swipe.pointer, GestureSample::new(x, y, now_ms()));
                let mid = GestureSample::new(x + swipe.dx / 2.0, y + swipe.dy / 2.0, now_ms());
                handle.pointer_move(mid);
                sleep(Duration::from_millis(swipe.duration_ms)).await;
                let outcome =
                    handle.pointer_up(GestureSample::new(x + swipe.dx, y + swipe.dy, now_ms()));
                info!(?outcome, "swipe");
            }
            Step::Slide(index) => {
                handle.slide_changed(*index);
            }
            Step::Tap => {
                handle.tap(now_ms());
            }
            Step::Close => {
                handle.close();
            }
        }
        tokio::task::yield_now().await;
        drain(&mut events, &mut strip, &mut seen);
    }

    let mut phase = handle.subscribe_phase();
    if timeout(SETTLE_TIMEOUT, phase.wait_for(|p| *p == SessionPhase::Closed))
        .await
        .is_err()
    {
        warn!(phase = ?handle.phase(), "viewer still active when the script ended");
    }

    cancel.cancel();
    task.await??;
    drain(&mut events, &mut strip, &mut seen);
    Ok(seen)
}
