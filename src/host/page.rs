use std::collections::BTreeMap;
use std::fmt;

use crate::foundation::core::Viewport;
use crate::foundation::signal::{Signal, Subscription};

/// Vertical placement of a page element in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementBox {
    /// Distance from the document top to the element's start, in pixels.
    pub top: f64,
    /// Element height in pixels.
    pub height: f64,
}

/// Snapshot of everything scroll tracking needs.
#[derive(Clone, Debug, PartialEq)]
pub struct PageLayout {
    /// Current viewport.
    pub viewport: Viewport,
    /// Vertical scroll offset in pixels.
    pub scroll_y: f64,
    /// Total document height in pixels.
    pub scroll_height: f64,
    /// Positioned elements, keyed by id.
    pub elements: BTreeMap<String, ElementBox>,
}

impl PageLayout {
    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - f64::from(self.viewport.height)).max(0.0)
    }
}

/// Scrollable host page.
///
/// Scroll, resize and layout changes publish a new [`PageLayout`]; resizes additionally emit a
/// dedicated resize event.
#[derive(Clone)]
pub struct Page {
    layout: Signal<PageLayout>,
    resize: Signal<Viewport>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = self.layout.get();
        f.debug_struct("Page")
            .field("viewport", &layout.viewport)
            .field("scroll_y", &layout.scroll_y)
            .field("scroll_height", &layout.scroll_height)
            .finish()
    }
}

impl Page {
    /// Create a page scrolled to the top.
    pub fn new(viewport: Viewport, scroll_height: f64) -> Self {
        Self {
            layout: Signal::new(PageLayout {
                viewport,
                scroll_y: 0.0,
                scroll_height: scroll_height.max(0.0),
                elements: BTreeMap::new(),
            }),
            resize: Signal::new(viewport),
        }
    }

    /// Current layout snapshot.
    pub fn layout(&self) -> PageLayout {
        self.layout.get()
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.layout.get().viewport
    }

    /// Listen for layout changes (scroll, resize, element moves).
    pub fn on_layout(&self, f: impl Fn(&PageLayout) + 'static) -> Subscription {
        self.layout.subscribe(f)
    }

    /// Listen for viewport resizes.
    pub fn on_resize(&self, f: impl Fn(&Viewport) + 'static) -> Subscription {
        self.resize.subscribe(f)
    }

    /// Scroll to `y`, clamped to the scrollable range.
    pub fn scroll_to(&self, y: f64) {
        let mut layout = self.layout.get();
        let y = if y.is_finite() { y } else { 0.0 };
        layout.scroll_y = y.clamp(0.0, layout.max_scroll());
        self.layout.set_if_changed(layout);
    }

    /// Scroll to a fraction of the whole-page scroll range.
    pub fn scroll_to_progress(&self, progress: f64) {
        let max = self.layout.get().max_scroll();
        self.scroll_to(progress.clamp(0.0, 1.0) * max);
    }

    /// Change the document height, re-clamping the scroll offset.
    pub fn set_scroll_height(&self, scroll_height: f64) {
        let mut layout = self.layout.get();
        layout.scroll_height = scroll_height.max(0.0);
        layout.scroll_y = layout.scroll_y.clamp(0.0, layout.max_scroll());
        self.layout.set_if_changed(layout);
    }

    /// Resize the viewport and emit a resize event.
    pub fn resize(&self, viewport: Viewport) {
        let mut layout = self.layout.get();
        layout.viewport = viewport;
        layout.scroll_y = layout.scroll_y.clamp(0.0, layout.max_scroll());
        self.layout.set_if_changed(layout);
        self.resize.set(viewport);
    }

    /// Place (or move) an element.
    pub fn attach_element(&self, id: impl Into<String>, bounds: ElementBox) {
        let mut layout = self.layout.get();
        layout.elements.insert(id.into(), bounds);
        self.layout.set_if_changed(layout);
    }

    /// Remove an element.
    pub fn detach_element(&self, id: &str) {
        let mut layout = self.layout.get();
        if layout.elements.remove(id).is_some() {
            self.layout.set(layout);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/page.rs"]
mod tests;
