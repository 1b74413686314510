use crate::assets::loader::FrameLoader;
use crate::config::PlayerConfig;
use crate::foundation::core::Viewport;
use crate::foundation::error::{ReelError, ReelResult};
use crate::host::Host;
use crate::host::event_loop::FRAME_MS;
use crate::host::page::ElementBox;
use crate::player::FramePlayer;
use crate::render::surface::CanvasElement;
use crate::scroll::progress::ScrollBinding;

/// Headless page with one mounted player, driven frame by frame.
///
/// The page is `scroll_length_vh` viewport heights tall. With a scoped binding the container spans
/// the whole page.
#[derive(Debug)]
pub struct ScrollSession {
    host: Host,
    canvas: CanvasElement,
    player: FramePlayer,
}

impl ScrollSession {
    /// Build the host page and canvas, then mount a player requesting frames from `loader`.
    pub fn new(
        viewport: Viewport,
        config: PlayerConfig,
        loader: impl FnOnce(&Host) -> Box<dyn FrameLoader>,
    ) -> ReelResult<Self> {
        let height = page_height(viewport, config.scroll_length_vh);
        let host = Host::new(viewport, height);
        if let ScrollBinding::Scoped { container } = &config.binding {
            host.page().attach_element(container.clone(), ElementBox { top: 0.0, height });
        }
        let canvas = CanvasElement::new();
        let loader = loader(&host);
        let player = FramePlayer::mount(&host, &canvas, loader.as_ref(), config)?;
        Ok(Self {
            host,
            canvas,
            player,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn canvas(&self) -> &CanvasElement {
        &self.canvas
    }

    pub fn player(&self) -> &FramePlayer {
        &self.player
    }

    /// Run tasks and animation frames until the player is ready.
    ///
    /// Fails if `max_frames` pass first. Pending timers fire as virtual time advances.
    pub fn wait_until_ready(&self, max_frames: usize) -> ReelResult<usize> {
        let events = self.host.events();
        events.run_until_idle();
        for n in 0..=max_frames {
            if self.player.is_ready() {
                return Ok(n);
            }
            if n < max_frames {
                events.tick(FRAME_MS);
            }
        }
        let status = self.player.load_status();
        Err(ReelError::validation(format!(
            "frame sequence not ready after {max_frames} frames ({} of {} loaded, {} failed)",
            status.loaded, status.total, status.failed
        )))
    }

    /// Scroll the page so the configured binding reads `progress`.
    pub fn scroll_to_progress(&self, progress: f64) {
        let page = self.host.page();
        match &self.player.config().binding {
            ScrollBinding::WholePage => page.scroll_to_progress(progress),
            ScrollBinding::Scoped { container } => {
                let layout = page.layout();
                let Some(el) = layout.elements.get(container) else {
                    return;
                };
                let range = (el.height - f64::from(layout.viewport.height)).max(0.0);
                page.scroll_to(el.top + progress.clamp(0.0, 1.0) * range);
            }
        }
    }

    /// Tick until the spring settles. Returns the number of frames, or an error after
    /// `max_frames`.
    pub fn settle(&self, max_frames: usize) -> ReelResult<usize> {
        self.host
            .events()
            .run_frames_until_quiet(max_frames)
            .ok_or_else(|| {
                ReelError::validation(format!("progress did not settle within {max_frames} frames"))
            })
    }

    /// Resize the viewport, keeping the page `scroll_length_vh` tall.
    pub fn resize(&self, viewport: Viewport) {
        let page = self.host.page();
        let height = page_height(viewport, self.player.config().scroll_length_vh);
        page.set_scroll_height(height);
        if let ScrollBinding::Scoped { container } = &self.player.config().binding {
            page.attach_element(container.clone(), ElementBox { top: 0.0, height });
        }
        page.resize(viewport);
    }

    /// Current canvas contents.
    pub fn snapshot(&self) -> Option<image::RgbaImage> {
        self.canvas.snapshot()
    }
}

fn page_height(viewport: Viewport, scroll_length_vh: f64) -> f64 {
    f64::from(viewport.height) * scroll_length_vh / 100.0
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;
