//! FLIP hero animation between a thumbnail and the full-screen slide.
//!
//! Every animation drives a disposable proxy in the overlay layer. The proxy
//! is owned by a guard, so it is detached on every exit path: normal finish,
//! cancellation, or the animation future simply being dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::HeroTiming;
use crate::geometry::{CubicBezier, FlipTransform, Rect};

use super::surface::{ElementRef, ProxyFrame, ProxyId, ProxyStyle, ViewerSurface};

/// Paces animation steps and layout reads.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    interval: Duration,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn next_frame(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// How an animation resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEnd {
    /// The proxy reached its destination.
    Finished,
    /// A fixed-delay fade elapsed (no proxy involved).
    Faded,
    /// Nothing could be animated (missing element or overlay layer).
    Skipped,
    Cancelled,
}

/// Cancellation side of a running animation.
///
/// `cancel` may be called any number of times, before or after completion.
#[derive(Debug, Clone, Default)]
pub struct AnimationHandle {
    token: CancellationToken,
}

impl AnimationHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A running animation; resolves once with its [`AnimationEnd`].
pub struct HeroAnimation {
    handle: AnimationHandle,
    run: BoxFuture<'static, AnimationEnd>,
}

impl HeroAnimation {
    pub fn handle(&self) -> AnimationHandle {
        self.handle.clone()
    }
}

impl Future for HeroAnimation {
    type Output = AnimationEnd;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.run.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for HeroAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeroAnimation")
            .field("cancelled", &self.handle.is_cancelled())
            .finish_non_exhaustive()
    }
}

struct ProxyGuard {
    surface: Arc<dyn ViewerSurface>,
    id: ProxyId,
}

impl Drop for ProxyGuard {
    fn drop(&mut self) {
        self.surface.detach_proxy(self.id);
    }
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    Flip { at: Rect, flip: FlipTransform },
    Fade { at: Rect, from: f64, to: f64 },
}

impl Motion {
    fn start_rect(&self) -> Rect {
        match *self {
            Motion::Flip { at, .. } | Motion::Fade { at, .. } => at,
        }
    }

    fn frame(&self, eased: f64) -> ProxyFrame {
        match *self {
            Motion::Flip { flip, .. } => ProxyFrame {
                transform: flip.at(eased),
                opacity: 1.0,
            },
            Motion::Fade { from, to, .. } => ProxyFrame {
                transform: FlipTransform::IDENTITY,
                opacity: from + (to - from) * eased,
            },
        }
    }
}

#[derive(Clone)]
pub struct HeroTransitionEngine {
    surface: Arc<dyn ViewerSurface>,
    curve: CubicBezier,
    frames: FrameClock,
    open_style: ProxyStyle,
    close_style: ProxyStyle,
}

impl HeroTransitionEngine {
    pub fn new(surface: Arc<dyn ViewerSurface>, timing: &HeroTiming, frames: FrameClock) -> Self {
        Self {
            surface,
            curve: timing.curve(),
            frames,
            open_style: ProxyStyle {
                corner_radius_px: timing.open_corner_radius_px,
                on_top: false,
            },
            close_style: ProxyStyle {
                corner_radius_px: timing.close_corner_radius_px,
                on_top: true,
            },
        }
    }

    /// Grow a proxy of `target` from `origin` onto the target's own rect.
    ///
    /// The target is measured one frame after the call so the slide surface
    /// has been laid out.
    pub fn open(&self, target: ElementRef, origin: Rect, duration: Duration) -> HeroAnimation {
        self.animation(move |engine, token| async move {
            engine.frames.next_frame().await;
            if token.is_cancelled() {
                return AnimationEnd::Cancelled;
            }
            let Some(dest) = engine.surface.measure(target) else {
                warn!(?target, "open target vanished before measuring; skipping hero");
                return AnimationEnd::Skipped;
            };
            let motion = match FlipTransform::between(&origin, &dest) {
                Some(flip) => Motion::Flip { at: origin, flip },
                None => {
                    debug!(?origin, "degenerate hero origin; cross-fading instead");
                    Motion::Fade {
                        at: dest,
                        from: 0.0,
                        to: 1.0,
                    }
                }
            };
            engine
                .play(target, motion, engine.open_style, duration, &token)
                .await
        })
    }

    /// Shrink a proxy of `target` from its current rect onto `target_rect`.
    pub fn close(&self, target: ElementRef, target_rect: Rect, duration: Duration) -> HeroAnimation {
        self.animation(move |engine, token| async move {
            let Some(start) = engine.surface.measure(target) else {
                warn!(?target, "close target could not be measured; skipping hero");
                return AnimationEnd::Skipped;
            };
            let motion = match FlipTransform::between(&start, &target_rect) {
                Some(flip) => Motion::Flip { at: start, flip },
                None => {
                    debug!(?start, "degenerate close start; cross-fading instead");
                    Motion::Fade {
                        at: start,
                        from: 1.0,
                        to: 0.0,
                    }
                }
            };
            engine
                .play(target, motion, engine.close_style, duration, &token)
                .await
        })
    }

    /// Fixed-delay stand-in for when there is nothing to animate; the host
    /// runs its own CSS fade for the same duration.
    pub fn fade(&self, duration: Duration) -> HeroAnimation {
        self.animation(move |_engine, token| async move {
            tokio::select! {
                _ = token.cancelled() => AnimationEnd::Cancelled,
                _ = tokio::time::sleep(duration) => AnimationEnd::Faded,
            }
        })
    }

    fn animation<F, Fut>(&self, body: F) -> HeroAnimation
    where
        F: FnOnce(Self, CancellationToken) -> Fut,
        Fut: Future<Output = AnimationEnd> + Send + 'static,
    {
        let handle = AnimationHandle::default();
        let run = body(self.clone(), handle.token.clone()).boxed();
        HeroAnimation { handle, run }
    }

    async fn play(
        &self,
        source: ElementRef,
        motion: Motion,
        style: ProxyStyle,
        duration: Duration,
        token: &CancellationToken,
    ) -> AnimationEnd {
        if token.is_cancelled() {
            return AnimationEnd::Cancelled;
        }
        let Some(id) = self
            .surface
            .attach_proxy(source, motion.start_rect(), style)
        else {
            warn!("animation layer unavailable; skipping hero");
            return AnimationEnd::Skipped;
        };
        let _guard = ProxyGuard {
            surface: Arc::clone(&self.surface),
            id,
        };

        let started = Instant::now();
        loop {
            let linear = if duration.is_zero() {
                1.0
            } else {
                (started.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0)
            };
            self.surface
                .update_proxy(id, motion.frame(self.curve.ease(linear)));
            if linear >= 1.0 {
                return AnimationEnd::Finished;
            }
            tokio::select! {
                _ = token.cancelled() => return AnimationEnd::Cancelled,
                _ = self.frames.next_frame() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::testkit::{RecordingSurface, SurfaceCall};

    fn engine(surface: Arc<RecordingSurface>) -> HeroTransitionEngine {
        HeroTransitionEngine::new(
            surface,
            &HeroTiming::default(),
            FrameClock::new(Duration::from_millis(16)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn open_lands_proxy_on_measured_target_and_detaches() {
        let surface = Arc::new(RecordingSurface::new());
        let target = surface.slide_element(0);
        let origin = Rect::new(600.0, 20.0, 120.0, 80.0);

        let end = engine(surface.clone())
            .open(target, origin, Duration::from_millis(280))
            .await;

        assert_eq!(end, AnimationEnd::Finished);
        assert_eq!(surface.live_proxies(), 0);
        let last = surface.last_proxy_frame().expect("frames were applied");
        let landed = origin.transformed(&last.transform);
        let slide = surface.slide_rect();
        for (a, b) in [
            (landed.top, slide.top),
            (landed.left, slide.left),
            (landed.width, slide.width),
            (landed.height, slide.height),
        ] {
            assert!((a - b).abs() < 1e-6, "{landed:?} != {slide:?}");
        }
        assert!(matches!(
            surface.calls().first(),
            Some(SurfaceCall::AttachProxy { at, .. }) if *at == origin
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_resolves_promptly_and_releases_proxy() {
        let surface = Arc::new(RecordingSurface::new());
        let target = surface.slide_element(0);
        let anim = engine(surface.clone()).open(
            target,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Duration::from_secs(10),
        );
        let handle = anim.handle();
        let driver = tokio::spawn(anim);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(surface.live_proxies(), 1);
        handle.cancel();
        handle.cancel();

        let end = driver.await.expect("animation task");
        assert_eq!(end, AnimationEnd::Cancelled);
        assert_eq!(surface.live_proxies(), 0);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn degenerate_origin_cross_fades() {
        let surface = Arc::new(RecordingSurface::new());
        let target = surface.slide_element(0);
        let end = engine(surface.clone())
            .open(target, Rect::new(0.0, 0.0, 0.0, 0.0), Duration::from_millis(100))
            .await;
        assert_eq!(end, AnimationEnd::Finished);
        let last = surface.last_proxy_frame().expect("fade frames");
        assert_eq!(last.transform, FlipTransform::IDENTITY);
        assert!((last.opacity - 1.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_layer_skips_without_frames() {
        let surface = Arc::new(RecordingSurface::new().without_layer());
        let target = surface.slide_element(0);
        let end = engine(surface.clone())
            .close(target, Rect::new(0.0, 0.0, 50.0, 50.0), Duration::from_millis(280))
            .await;
        assert_eq!(end, AnimationEnd::Skipped);
        assert!(surface.last_proxy_frame().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_animation_mid_flight_detaches_proxy() {
        let surface = Arc::new(RecordingSurface::new());
        let target = surface.slide_element(0);
        let anim = engine(surface.clone()).close(
            target,
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Duration::from_secs(5),
        );
        let driver = tokio::spawn(anim);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(surface.live_proxies(), 1);
        driver.abort();
        let _ = driver.await;
        assert_eq!(surface.live_proxies(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fade_is_a_timer() {
        let surface = Arc::new(RecordingSurface::new());
        let started = Instant::now();
        let end = engine(surface.clone())
            .fade(Duration::from_millis(300))
            .await;
        assert_eq!(end, AnimationEnd::Faded);
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(surface.calls().is_empty());
    }
}
