use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{FrameIndex, Rect, Rgba8, Size, Viewport};
use crate::foundation::error::ReelResult;
use crate::render::surface::{CanvasSurface, image_paint};

const PAINT_CACHE_CAPACITY: usize = 8;

/// Result of a [`FrameDrawer::draw`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOutcome {
    /// The frame was painted into this rectangle.
    Drawn(Rect),
    /// The frame is already on the surface; nothing was painted.
    Unchanged,
    /// The frame has no decoded image; the surface keeps its previous contents.
    Missing,
    /// The surface has no area (or the image none); nothing was painted.
    Skipped,
}

/// Paints sequence frames onto one canvas surface.
///
/// Tracks the frame currently on the surface so repeated draws of the same index are skipped,
/// and keeps a few recently used paints to avoid re-uploading pixels while scrubbing back and
/// forth.
pub struct FrameDrawer {
    surface: Rc<RefCell<CanvasSurface>>,
    background: Rgba8,
    paints: HashMap<FrameIndex, vello_cpu::Image>,
    lru: VecDeque<FrameIndex>,
    on_surface: Option<FrameIndex>,
}

impl fmt::Debug for FrameDrawer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDrawer")
            .field("background", &self.background)
            .field("cached_paints", &self.paints.len())
            .field("on_surface", &self.on_surface)
            .finish()
    }
}

impl FrameDrawer {
    pub fn new(surface: Rc<RefCell<CanvasSurface>>, background: Rgba8) -> Self {
        Self {
            surface,
            background,
            paints: HashMap::new(),
            lru: VecDeque::new(),
            on_surface: None,
        }
    }

    /// Frame currently shown, if any.
    pub fn on_surface(&self) -> Option<FrameIndex> {
        self.on_surface
    }

    /// Resize the surface. The next draw always paints.
    pub fn resize(&mut self, viewport: Viewport) -> ReelResult<()> {
        self.surface.borrow_mut().resize(viewport)?;
        self.on_surface = None;
        Ok(())
    }

    /// Paint frame `index` unless it is already showing.
    pub fn draw(&mut self, index: FrameIndex, image: Option<&DecodedImage>) -> ReelResult<DrawOutcome> {
        if self.on_surface == Some(index) {
            return Ok(DrawOutcome::Unchanged);
        }
        let Some(image) = image else {
            trace!(frame = index.0, "frame not decoded yet; draw skipped");
            return Ok(DrawOutcome::Missing);
        };

        let paint = self.paint_for(index, image)?;
        let size = Size::new(f64::from(image.width), f64::from(image.height));
        let dest = self
            .surface
            .borrow_mut()
            .draw_image(index, &paint, size, self.background)?;

        Ok(match dest {
            Some(rect) => {
                self.on_surface = Some(index);
                DrawOutcome::Drawn(rect)
            }
            None => DrawOutcome::Skipped,
        })
    }

    fn paint_for(&mut self, index: FrameIndex, image: &DecodedImage) -> ReelResult<vello_cpu::Image> {
        if let Some(paint) = self.paints.get(&index).cloned() {
            self.touch(index);
            return Ok(paint);
        }
        let paint = image_paint(image.rgba8_premul.as_slice(), image.width, image.height)?;
        self.paints.insert(index, paint.clone());
        self.touch(index);
        while self.lru.len() > PAINT_CACHE_CAPACITY {
            if let Some(old) = self.lru.pop_front() {
                self.paints.remove(&old);
            }
        }
        Ok(paint)
    }

    fn touch(&mut self, index: FrameIndex) {
        if let Some(pos) = self.lru.iter().position(|i| *i == index) {
            self.lru.remove(pos);
        }
        self.lru.push_back(index);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/draw.rs"]
mod tests;
