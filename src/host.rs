//! Host environment the player is embedded in: a cooperative event loop and a scrollable page.

pub(crate) mod event_loop;
pub(crate) mod page;

use crate::foundation::core::Viewport;
use event_loop::EventLoop;
use page::Page;

/// Event loop plus page, as seen by an embedded component.
#[derive(Clone, Debug)]
pub struct Host {
    events: EventLoop,
    page: Page,
}

impl Host {
    /// Create a host with a fresh event loop and a page of `scroll_height` pixels.
    pub fn new(viewport: Viewport, scroll_height: f64) -> Self {
        Self {
            events: EventLoop::new(),
            page: Page::new(viewport, scroll_height),
        }
    }

    /// The host event loop.
    pub fn events(&self) -> &EventLoop {
        &self.events
    }

    /// The host page.
    pub fn page(&self) -> &Page {
        &self.page
    }
}
