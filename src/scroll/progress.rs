use std::fmt;

use crate::foundation::signal::{Signal, Subscription};
use crate::host::page::{Page, PageLayout};

/// What the scroll progress is measured against.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ScrollBinding {
    /// The whole document: `0` at the top, `1` at the bottom.
    #[default]
    WholePage,
    /// A container element: `0` when its top reaches the viewport top, `1` when its bottom
    /// reaches the viewport bottom.
    Scoped { container: String },
}

impl ScrollBinding {
    /// Progress for `layout`, always in `[0, 1]`.
    pub fn progress(&self, layout: &PageLayout) -> f64 {
        match self {
            Self::WholePage => whole_page_progress(layout),
            Self::Scoped { container } => scoped_progress(layout, container),
        }
    }
}

/// `scroll_y / (scroll_height - viewport_height)`, clamped. A page that cannot scroll is at `0`.
pub fn whole_page_progress(layout: &PageLayout) -> f64 {
    let range = layout.scroll_height - f64::from(layout.viewport.height);
    ratio(layout.scroll_y, range, 0.0)
}

/// Progress through the element `container`. Unknown elements read as `0`.
///
/// An element no taller than the viewport has no scroll range; it reads `1` once its top has
/// reached the viewport top and `0` before that.
pub fn scoped_progress(layout: &PageLayout, container: &str) -> f64 {
    let Some(el) = layout.elements.get(container) else {
        return 0.0;
    };
    let travelled = layout.scroll_y - el.top;
    let range = el.height - f64::from(layout.viewport.height);
    let degenerate = if travelled >= 0.0 { 1.0 } else { 0.0 };
    ratio(travelled, range, degenerate)
}

fn ratio(travelled: f64, range: f64, degenerate: f64) -> f64 {
    if range.is_nan() || range <= 0.0 || range.is_infinite() {
        return degenerate;
    }
    let p = travelled / range;
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// Live scroll progress of one binding.
///
/// Recomputed on every layout change of the page; listeners fire only when the value moves.
pub struct ProgressTracker {
    binding: ScrollBinding,
    progress: Signal<f64>,
    _layout: Subscription,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("binding", &self.binding)
            .field("progress", &self.progress.get())
            .finish()
    }
}

impl ProgressTracker {
    pub fn bind(page: &Page, binding: &ScrollBinding) -> Self {
        let progress = Signal::new(binding.progress(&page.layout()));
        let out = progress.clone();
        let b = binding.clone();
        let sub = page.on_layout(move |layout| {
            out.set_if_changed(b.progress(layout));
        });
        Self {
            binding: binding.clone(),
            progress,
            _layout: sub,
        }
    }

    pub fn binding(&self) -> &ScrollBinding {
        &self.binding
    }

    /// Current progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress.get()
    }

    pub fn signal(&self) -> &Signal<f64> {
        &self.progress
    }

    pub fn on_change(&self, f: impl Fn(&f64) + 'static) -> Subscription {
        self.progress.subscribe(f)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/progress.rs"]
mod tests;
