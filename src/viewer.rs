//! The viewer session controller.
//!
//! One async task owns the session state and every animation. Hosts talk to
//! it through a [`ViewerHandle`] and listen on a [`ViewerEvent`] channel.

pub mod gesture;
pub mod hero;
pub mod navigator;
pub mod state;
pub mod surface;
pub mod testkit;
pub mod thumbnails;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Sleep, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::Configuration;
use crate::events::{
    Direction, GestureSample, Key, OpenRequest, PhaseChange, PointerKind, SessionPhase,
    TransitionOutcome, ViewerCommand, ViewerEvent,
};

use self::gesture::{GestureTracker, PointerMove};
use self::hero::{AnimationEnd, FrameClock, HeroAnimation, HeroTransitionEngine};
use self::state::{CloseDecision, ViewerSession};
use self::surface::ViewerSurface;
use self::thumbnails::HeroAnchor;

const COMMAND_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 64;

/// Resolves with the slot's output, or never when the slot is empty.
async fn poll_slot<F>(slot: &mut Option<F>) -> F::Output
where
    F: Future + Unpin,
{
    match slot.as_mut() {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

struct Controller {
    cfg: Configuration,
    surface: Arc<dyn ViewerSurface>,
    engine: HeroTransitionEngine,
    frames: FrameClock,
    session: ViewerSession,
    events: mpsc::Sender<ViewerEvent>,
    phase_tx: watch::Sender<SessionPhase>,
    animation: Option<HeroAnimation>,
    /// Post-frame work: index notification and backdrop reveal.
    frame: Option<Pin<Box<Sleep>>>,
    /// Index changes awaiting the next frame, in order.
    pending_indices: Vec<usize>,
    backdrop_pending: bool,
    /// Releases the transition lock once a slide change settles.
    settle: Option<Pin<Box<Sleep>>>,
}

impl Controller {
    fn new(
        cfg: Configuration,
        surface: Arc<dyn ViewerSurface>,
        events: mpsc::Sender<ViewerEvent>,
        phase_tx: watch::Sender<SessionPhase>,
    ) -> Self {
        let frames = FrameClock::new(cfg.frame_interval());
        let engine = HeroTransitionEngine::new(Arc::clone(&surface), &cfg.hero, frames);
        Self {
            cfg,
            surface,
            engine,
            frames,
            session: ViewerSession::new(),
            events,
            phase_tx,
            animation: None,
            frame: None,
            pending_indices: Vec::new(),
            backdrop_pending: false,
            settle: None,
        }
    }

    fn emit(&self, event: ViewerEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(?event, "event listener is not draining; dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                debug!(?event, "no event listener; dropping");
            }
        }
    }

    fn publish(&self, change: PhaseChange) {
        info!(from = ?change.from, to = ?change.to, "viewer phase");
        self.phase_tx.send_replace(change.to);
        self.emit(ViewerEvent::PhaseChanged(change));
    }

    fn request_frame(&mut self) {
        if self.frame.is_none() {
            self.frame = Some(Box::pin(sleep(self.frames.interval())));
        }
    }

    fn on_command(&mut self, cmd: ViewerCommand) {
        match cmd {
            ViewerCommand::Open(req) => self.open(req),
            ViewerCommand::InitialImagePainted(index) => self.initial_image_painted(index),
            ViewerCommand::SlideChanged(index) => {
                if let Some(index) = self.session.slide_changed(index) {
                    debug!(index, "slide surface settled on new index");
                    self.pending_indices.push(index);
                    self.request_frame();
                }
            }
            ViewerCommand::Navigate(direction) => self.navigate(direction),
            ViewerCommand::Close => self.close(),
        }
    }

    fn open(&mut self, req: OpenRequest) {
        let images = req.images.clone();
        let change = match self.session.begin_open(req) {
            Ok(change) => change,
            Err(reason) => {
                warn!(%reason, "open request rejected");
                return;
            }
        };
        let index = self.session.current_index();
        let anchor = self.session.hero_anchor();
        info!(images = images.len(), index, ?anchor, "opening viewer");

        self.surface.mount(&images, index, self.cfg.zoom);
        // The proxy stands in for the live image until the hero lands.
        self.surface
            .set_live_image_visible(matches!(anchor, HeroAnchor::FadeOnly));
        self.surface.set_overlay_visible(true);
        self.publish(change);

        self.pending_indices.push(index);
        self.backdrop_pending = true;
        self.request_frame();
    }

    fn initial_image_painted(&mut self, painted: usize) {
        if self.session.phase() != SessionPhase::Opening || self.session.opening_animation_active()
        {
            debug!(painted, phase = ?self.session.phase(), "first paint ignored");
            return;
        }
        let index = self.session.current_index();
        if painted != index {
            debug!(painted, index, "first paint for another slide; still waiting");
            return;
        }
        match self.session.hero_anchor() {
            HeroAnchor::Rect(origin) => match self.surface.active_image(index) {
                Some(target) => {
                    self.session.start_opening_animation();
                    self.animation =
                        Some(self.engine.open(target, origin, self.cfg.hero_duration()));
                }
                None => {
                    warn!(index, "active slide image missing; opening without hero");
                    self.opening_finished();
                }
            },
            HeroAnchor::FadeOnly => {
                self.session.start_opening_animation();
                self.animation = Some(self.engine.fade(self.cfg.hero.fade()));
            }
        }
    }

    fn opening_finished(&mut self) {
        self.surface.set_live_image_visible(true);
        if let Some(change) = self.session.finish_opening() {
            self.publish(change);
        }
        if self.session.take_deferred_close() {
            debug!("running close deferred during opening");
            if let CloseDecision::Start(change) = self.session.request_close() {
                self.begin_close(change);
            }
        }
    }

    fn navigate(&mut self, direction: Direction) {
        let Some(index) = self.session.navigate(direction) else {
            return;
        };
        let duration = self.cfg.slide_duration();
        debug!(?direction, index, "slide transition");
        self.surface.show_slide(index, duration);
        self.settle = Some(Box::pin(sleep(duration)));
        self.pending_indices.push(index);
        self.request_frame();
    }

    fn close(&mut self) {
        match self.session.request_close() {
            CloseDecision::Ignored => debug!("close ignored"),
            CloseDecision::Deferred => {
                if self.session.opening_animation_active() {
                    debug!("close deferred until the open animation resolves");
                } else {
                    // Nothing has painted yet, so there is no animation to wait for.
                    self.opening_finished();
                }
            }
            CloseDecision::Start(change) => self.begin_close(change),
        }
    }

    fn begin_close(&mut self, change: PhaseChange) {
        self.settle = None;
        self.backdrop_pending = false;
        self.publish(change);
        self.surface.set_backdrop_visible(false);
        self.surface.set_overlay_visible(false);

        let index = self.session.current_index();
        let target = self.surface.active_image(index);
        self.session.start_closing_animation();
        match (self.session.close_anchor(), target) {
            (HeroAnchor::Rect(rect), Some(target)) => {
                info!(index, ?rect, "closing viewer with hero");
                self.surface.set_live_image_visible(false);
                self.animation = Some(self.engine.close(target, rect, self.cfg.hero_duration()));
            }
            (anchor, target) => {
                warn!(
                    index,
                    ?anchor,
                    has_target = target.is_some(),
                    "no close geometry; fading out"
                );
                self.animation = Some(self.engine.fade(self.cfg.hero.fade()));
            }
        }
    }

    fn on_animation_end(&mut self, end: AnimationEnd) {
        debug!(?end, phase = ?self.session.phase(), "animation resolved");
        match self.session.phase() {
            SessionPhase::Opening => self.opening_finished(),
            SessionPhase::Closing => self.finalize(),
            SessionPhase::Open | SessionPhase::Closed => {}
        }
    }

    fn finalize(&mut self) {
        self.surface.unmount();
        self.pending_indices.clear();
        self.backdrop_pending = false;
        self.frame = None;
        if let Some((change, final_index)) = self.session.finish_closing() {
            self.publish(change);
            info!(final_index, "viewer closed");
            self.emit(ViewerEvent::CloseComplete { final_index });
        }
    }

    fn on_frame(&mut self) {
        let phase = self.session.phase();
        if std::mem::take(&mut self.backdrop_pending)
            && matches!(phase, SessionPhase::Opening | SessionPhase::Open)
        {
            self.surface.set_backdrop_visible(true);
        }
        let pending = std::mem::take(&mut self.pending_indices);
        if phase != SessionPhase::Closed {
            for index in pending {
                self.emit(ViewerEvent::IndexChanged(index));
            }
        }
    }

    /// Drops the running animation (detaching its proxy) and the surface.
    fn shutdown(&mut self) {
        if let Some(anim) = self.animation.take() {
            anim.handle().cancel();
        }
        if self.session.phase() != SessionPhase::Closed {
            self.surface.unmount();
        }
        self.phase_tx.send_replace(SessionPhase::Closed);
    }
}

/// Drives viewer sessions until `cancel` fires or every command sender is
/// gone.
#[instrument(skip_all, name = "viewer")]
pub async fn run(
    mut commands: mpsc::Receiver<ViewerCommand>,
    events: mpsc::Sender<ViewerEvent>,
    phase_tx: watch::Sender<SessionPhase>,
    cancel: CancellationToken,
    cfg: Configuration,
    surface: Arc<dyn ViewerSurface>,
) -> Result<()> {
    let mut ctl = Controller::new(cfg, surface, events, phase_tx);

    loop {
        select! {
            _ = cancel.cancelled() => break,

            cmd = commands.recv() => match cmd {
                Some(cmd) => ctl.on_command(cmd),
                None => {
                    debug!("command channel closed");
                    break;
                }
            },

            end = poll_slot(&mut ctl.animation) => {
                ctl.animation = None;
                ctl.on_animation_end(end);
            }

            _ = poll_slot(&mut ctl.frame) => {
                ctl.frame = None;
                ctl.on_frame();
            }

            _ = poll_slot(&mut ctl.settle) => {
                ctl.settle = None;
                ctl.session.finish_slide();
            }
        }
    }

    ctl.shutdown();
    Ok(())
}

/// Spawns the controller task on the current runtime.
pub fn spawn(
    cfg: Configuration,
    surface: Arc<dyn ViewerSurface>,
    cancel: CancellationToken,
) -> (
    ViewerHandle,
    mpsc::Receiver<ViewerEvent>,
    JoinHandle<Result<()>>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
    let (phase_tx, phase_rx) = watch::channel(SessionPhase::Closed);
    let handle = ViewerHandle {
        commands: cmd_tx,
        phase: phase_rx,
        gesture: GestureTracker::new(cfg.gesture, 0.0),
    };
    let task = tokio::spawn(run(cmd_rx, event_tx, phase_tx, cancel, cfg, surface));
    (handle, event_rx, task)
}

/// Host-side entry point: forwards input to the controller task.
///
/// Input handlers on the host are synchronous, so every method returns
/// immediately. Gesture classification happens here; only committed
/// navigations reach the controller.
#[derive(Debug)]
pub struct ViewerHandle {
    commands: mpsc::Sender<ViewerCommand>,
    phase: watch::Receiver<SessionPhase>,
    gesture: GestureTracker,
}

impl ViewerHandle {
    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Watch phase changes from async host code.
    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase.clone()
    }

    fn send(&self, cmd: ViewerCommand) -> bool {
        match self.commands.try_send(cmd) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "viewer command dropped");
                false
            }
        }
    }

    /// Returns false when there is nothing to open or a session is active.
    pub fn open(&self, req: OpenRequest) -> bool {
        if req.images.is_empty() {
            debug!("open ignored: empty image list");
            return false;
        }
        if self.phase() != SessionPhase::Closed {
            debug!(phase = ?self.phase(), "open ignored: session active");
            return false;
        }
        self.send(ViewerCommand::Open(req))
    }

    pub fn initial_image_painted(&self, index: usize) -> bool {
        self.send(ViewerCommand::InitialImagePainted(index))
    }

    pub fn slide_changed(&self, index: usize) -> bool {
        self.send(ViewerCommand::SlideChanged(index))
    }

    pub fn close(&self) -> bool {
        self.send(ViewerCommand::Close)
    }

    /// Keyboard input. Returns true when the key was consumed and the host
    /// should suppress its default action.
    pub fn key(&self, key: Key) -> bool {
        if self.phase() != SessionPhase::Open {
            return false;
        }
        match key {
            Key::ArrowRight => self.send(ViewerCommand::Navigate(Direction::Next)),
            Key::ArrowLeft => self.send(ViewerCommand::Navigate(Direction::Prev)),
            Key::Escape => self.send(ViewerCommand::Close),
            Key::Other => false,
        }
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.gesture.set_viewport_width(width);
    }

    pub fn pointer_down(&mut self, kind: PointerKind, sample: GestureSample) -> bool {
        if self.phase() != SessionPhase::Open {
            return false;
        }
        self.gesture.on_pointer_down(kind, sample)
    }

    pub fn pointer_move(&mut self, sample: GestureSample) -> PointerMove {
        self.gesture.on_pointer_move(sample)
    }

    /// Classifies the gesture and forwards a commit as navigation.
    pub fn pointer_up(&mut self, sample: GestureSample) -> TransitionOutcome {
        let outcome = self.gesture.on_pointer_up(sample);
        if let TransitionOutcome::Commit(direction) = outcome {
            if self.phase() == SessionPhase::Open {
                self.send(ViewerCommand::Navigate(direction));
            }
        }
        outcome
    }

    pub fn pointer_cancel(&mut self) {
        self.gesture.on_pointer_cancel();
    }

    /// Tap on the open viewer, which closes it unless the tap is the tail
    /// of a swipe that just committed. Returns true when close was requested.
    pub fn tap(&self, timestamp_ms: f64) -> bool {
        if self.phase() != SessionPhase::Open {
            return false;
        }
        if self.gesture.suppresses_tap(timestamp_ms) {
            debug!(timestamp_ms, "tap swallowed after swipe commit");
            return false;
        }
        self.close()
    }
}
