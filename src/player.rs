use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::assets::loader::FrameLoader;
use crate::assets::preload::{LoadStatus, Preload};
use crate::beats::{BeatFrame, BeatSequencer};
use crate::config::{PlayerConfig, StallAction};
use crate::foundation::core::{FrameIndex, Viewport};
use crate::foundation::error::ReelResult;
use crate::foundation::signal::{Signal, Subscription};
use crate::host::Host;
use crate::host::event_loop::Timeout;
use crate::render::draw::{DrawOutcome, FrameDrawer};
use crate::render::surface::CanvasElement;
use crate::scroll::progress::ProgressTracker;
use crate::scroll::smoothed::SmoothedProgress;

/// Lifecycle of a [`FramePlayer`].
///
/// `Loading` moves to `Ready` at most once per mount; `Unmounted` is final.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum Phase {
    Loading { loaded: u32, total: u32 },
    Ready,
    Unmounted,
}

impl Phase {
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    fn loading(status: LoadStatus) -> Self {
        Self::Loading {
            loaded: status.loaded,
            total: status.total,
        }
    }
}

/// Subscriptions that only exist while ready.
struct Live {
    tracker: ProgressTracker,
    smoothed: SmoothedProgress,
    _subs: Vec<Subscription>,
}

struct PlayerInner {
    host: Host,
    config: PlayerConfig,
    beats: BeatSequencer,
    preload: Preload,
    drawer: RefCell<Option<FrameDrawer>>,
    phase: Signal<Phase>,
    live: RefCell<Option<Live>>,
    load_sub: RefCell<Option<Subscription>>,
    stall_timer: RefCell<Option<Timeout>>,
}

impl PlayerInner {
    fn frame_count(&self) -> u32 {
        self.config.sequence.frame_count
    }

    fn is_ready(&self) -> bool {
        self.live.borrow().is_some()
    }

    fn raw_progress(&self) -> f64 {
        match &*self.live.borrow() {
            Some(live) => live.tracker.progress(),
            None => self.config.binding.progress(&self.host.page().layout()),
        }
    }

    fn smoothed_progress(&self) -> f64 {
        match &*self.live.borrow() {
            Some(live) => live.smoothed.value(),
            None => self.raw_progress(),
        }
    }

    fn current_index(&self) -> FrameIndex {
        FrameIndex::from_progress(self.smoothed_progress(), self.frame_count())
    }

    fn on_load_status(self: &Rc<Self>, status: LoadStatus) {
        if matches!(self.phase.get(), Phase::Unmounted) {
            return;
        }
        if self.is_ready() {
            // A frame that arrived after a stall timeout may be the one on screen.
            self.draw(self.current_index());
            return;
        }
        if status.is_complete() {
            self.become_ready("all frames decoded");
            return;
        }
        self.phase.set_if_changed(Phase::loading(status));
        if status.is_settled() {
            warn!(
                loaded = status.loaded,
                failed = status.failed,
                total = status.total,
                "preload settled with failures; still loading"
            );
        }
    }

    fn on_stall(self: &Rc<Self>) {
        drop(self.stall_timer.borrow_mut().take());
        if self.is_ready() || matches!(self.phase.get(), Phase::Unmounted) {
            return;
        }
        let status = self.preload.status();
        match self.config.preload.on_timeout {
            StallAction::KeepWaiting => {
                warn!(
                    loaded = status.loaded,
                    total = status.total,
                    "preload timed out; waiting for remaining frames"
                );
            }
            StallAction::ShowAvailable => {
                warn!(
                    loaded = status.loaded,
                    total = status.total,
                    "preload timed out; showing available frames"
                );
                self.become_ready("preload timeout");
            }
        }
    }

    fn become_ready(self: &Rc<Self>, reason: &str) {
        if self.is_ready() {
            return;
        }
        drop(self.stall_timer.borrow_mut().take());

        let tracker = ProgressTracker::bind(self.host.page(), &self.config.binding);
        let smoothed =
            SmoothedProgress::follow(tracker.signal(), self.config.spring, self.host.events());

        let weak = Rc::downgrade(self);
        let on_progress = smoothed.on_change(move |p| {
            if let Some(inner) = weak.upgrade() {
                inner.draw(FrameIndex::from_progress(*p, inner.frame_count()));
            }
        });
        let weak = Rc::downgrade(self);
        let on_resize = self.host.page().on_resize(move |vp| {
            if let Some(inner) = weak.upgrade() {
                inner.resize(*vp);
            }
        });

        *self.live.borrow_mut() = Some(Live {
            tracker,
            smoothed,
            _subs: vec![on_progress, on_resize],
        });

        let status = self.preload.status();
        info!(
            reason,
            loaded = status.loaded,
            total = status.total,
            "frame sequence ready"
        );
        self.phase.set(Phase::Ready);

        self.resize(self.host.page().viewport());
    }

    fn resize(&self, viewport: Viewport) {
        let resized = match self.drawer.borrow_mut().as_mut() {
            Some(drawer) => drawer.resize(viewport),
            None => return,
        };
        match resized {
            Ok(()) => debug!(width = viewport.width, height = viewport.height, "canvas resized"),
            Err(err) => warn!(error = %err, "canvas resize failed"),
        }
        self.draw(self.current_index());
    }

    fn draw(&self, index: FrameIndex) {
        let mut drawer = self.drawer.borrow_mut();
        let Some(drawer) = drawer.as_mut() else {
            return;
        };
        let image = self.preload.image(index);
        match drawer.draw(index, image.as_ref()) {
            Ok(DrawOutcome::Drawn(dest)) => debug!(
                frame = index.0,
                x = dest.x0,
                y = dest.y0,
                w = dest.width(),
                h = dest.height(),
                "frame drawn"
            ),
            Ok(DrawOutcome::Missing) => debug!(frame = index.0, "frame unavailable; kept previous"),
            Ok(DrawOutcome::Unchanged | DrawOutcome::Skipped) => {}
            Err(err) => warn!(frame = index.0, error = %err, "frame draw failed"),
        }
    }

    fn shutdown(&self) {
        if matches!(self.phase.get(), Phase::Unmounted) {
            return;
        }
        let live = self.live.borrow_mut().take();
        drop(live);
        drop(self.load_sub.borrow_mut().take());
        drop(self.stall_timer.borrow_mut().take());
        info!("frame sequence player unmounted");
        self.phase.set(Phase::Unmounted);
    }
}

/// Scroll-scrubbed image sequence bound to a canvas.
///
/// Mounting requests every frame. Once all of them have decoded (or the stall policy gives up
/// waiting) the player follows scroll progress through a spring and paints the matching frame,
/// contain-fit over the background color, on every progress change and every resize.
///
/// Dropping the player (or calling [`FramePlayer::teardown`]) releases every subscription; decodes
/// that finish afterwards are discarded.
pub struct FramePlayer {
    inner: Rc<PlayerInner>,
}

impl fmt::Debug for FramePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePlayer")
            .field("phase", &self.phase())
            .field("load", &self.load_status())
            .field("frame", &self.frame_index())
            .finish()
    }
}

impl FramePlayer {
    /// Validate `config`, request every frame from `loader` and start loading.
    #[tracing::instrument(skip_all, fields(frames = config.sequence.frame_count))]
    pub fn mount(
        host: &Host,
        canvas: &CanvasElement,
        loader: &dyn FrameLoader,
        config: PlayerConfig,
    ) -> ReelResult<Self> {
        config.validate()?;
        let beats = config.beat_sequencer()?;

        let drawer = match canvas.context_2d() {
            Some(surface) => Some(FrameDrawer::new(surface, config.background_rgba8())),
            None => {
                warn!("canvas has no 2d context; player will not paint");
                None
            }
        };

        let preload = Preload::start(&config.sequence, loader);
        let initial = preload.status();
        let stall_ms = config.preload.timeout_ms;

        let inner = Rc::new(PlayerInner {
            host: host.clone(),
            config,
            beats,
            preload,
            drawer: RefCell::new(drawer),
            phase: Signal::new(Phase::loading(initial)),
            live: RefCell::new(None),
            load_sub: RefCell::new(None),
            stall_timer: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let load_sub = inner.preload.on_status(move |status| {
            if let Some(inner) = weak.upgrade() {
                inner.on_load_status(*status);
            }
        });
        *inner.load_sub.borrow_mut() = Some(load_sub);

        if let Some(ms) = stall_ms {
            let weak = Rc::downgrade(&inner);
            let timer = host.events().set_timeout(ms, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_stall();
                }
            });
            *inner.stall_timer.borrow_mut() = Some(timer);
        }

        info!(total = initial.total, "frame sequence loading");
        // Loaders may resolve synchronously inside `start`.
        inner.on_load_status(inner.preload.status());

        Ok(Self { inner })
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    /// Phase changes, including the final `Unmounted`.
    pub fn phase_signal(&self) -> Signal<Phase> {
        self.inner.phase.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    pub fn load_status(&self) -> LoadStatus {
        self.inner.preload.status()
    }

    /// Width of the loading bar, `loaded / total`.
    pub fn loading_fraction(&self) -> f64 {
        self.load_status().fraction()
    }

    /// Unsmoothed scroll progress of the configured binding.
    pub fn progress(&self) -> f64 {
        self.inner.raw_progress()
    }

    /// Spring-smoothed progress. Equals [`FramePlayer::progress`] until ready.
    pub fn smoothed_progress(&self) -> f64 {
        self.inner.smoothed_progress()
    }

    /// Frame selected by the smoothed progress.
    pub fn frame_index(&self) -> FrameIndex {
        self.inner.current_index()
    }

    /// Frame currently painted on the canvas.
    pub fn frame_on_canvas(&self) -> Option<FrameIndex> {
        self.inner
            .drawer
            .borrow()
            .as_ref()
            .and_then(FrameDrawer::on_surface)
    }

    /// `true` when the canvas offered no 2D context.
    pub fn is_inert(&self) -> bool {
        self.inner.drawer.borrow().is_none()
    }

    pub fn beat_frames(&self) -> Vec<BeatFrame> {
        self.inner.beats.sample(self.smoothed_progress())
    }

    pub fn scroll_indicator_opacity(&self) -> f64 {
        self.inner.beats.indicator_opacity(self.smoothed_progress())
    }

    pub fn beats(&self) -> &BeatSequencer {
        &self.inner.beats
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.inner.config
    }

    /// Unmount now. Equivalent to dropping the player.
    pub fn teardown(self) {
        drop(self);
    }
}

impl Drop for FramePlayer {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

#[cfg(test)]
#[path = "../tests/unit/player/player.rs"]
mod tests;
