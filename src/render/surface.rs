use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::core::{Affine, FrameIndex, Rect, Rgba8, Size, Viewport};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::fit::contain_rect;

/// Counters kept by a [`CanvasSurface`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    /// Completed frame draws.
    pub draws: u64,
    /// Backing-store reallocations.
    pub resizes: u64,
    /// Frame painted by the most recent draw.
    pub last_frame: Option<FrameIndex>,
}

/// 2D drawing surface of a canvas, backed by a `vello_cpu` pixmap.
///
/// Resizing reallocates the backing store and clears it, like assigning a canvas's width.
pub struct CanvasSurface {
    viewport: Viewport,
    pixmap: Option<vello_cpu::Pixmap>,
    stats: SurfaceStats,
}

impl fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("viewport", &self.viewport)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSurface {
    /// A zero-sized surface. Nothing paints until it is resized.
    pub fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            pixmap: None,
            stats: SurfaceStats::default(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    /// Reallocate to `viewport` pixels. Contents are cleared to transparent.
    pub fn resize(&mut self, viewport: Viewport) -> ReelResult<()> {
        let width: u16 = viewport
            .width
            .try_into()
            .map_err(|_| ReelError::render("canvas width exceeds u16"))?;
        let height: u16 = viewport
            .height
            .try_into()
            .map_err(|_| ReelError::render("canvas height exceeds u16"))?;

        self.viewport = viewport;
        self.pixmap = (!viewport.is_empty()).then(|| vello_cpu::Pixmap::new(width, height));
        self.stats.resizes += 1;
        Ok(())
    }

    /// Fill with `background`, then paint `paint` (of `image_size` pixels) contain-fit and
    /// centered. Returns the destination rectangle, or `None` if nothing could be painted.
    pub fn draw_image(
        &mut self,
        frame: FrameIndex,
        paint: &vello_cpu::Image,
        image_size: Size,
        background: Rgba8,
    ) -> ReelResult<Option<Rect>> {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return Ok(None);
        };
        let Some(dest) = contain_rect(self.viewport.size(), image_size) else {
            return Ok(None);
        };
        let (w, h) = (pixmap.width(), pixmap.height());

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            background.a,
        ));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        let scale = dest.width() / image_size.width;
        let placement = Affine::translate((dest.x0, dest.y0)) * Affine::scale(scale);
        ctx.set_transform(affine_to_cpu(placement));
        ctx.set_paint(paint.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            image_size.width,
            image_size.height,
        ));

        ctx.flush();
        ctx.render_to_pixmap(pixmap);

        self.stats.draws += 1;
        self.stats.last_frame = Some(frame);
        Ok(Some(dest))
    }

    /// Premultiplied RGBA8 contents, empty for a zero-sized surface.
    pub fn data(&self) -> &[u8] {
        self.pixmap
            .as_ref()
            .map(|p| p.data_as_u8_slice())
            .unwrap_or(&[])
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        let i = (y as usize * self.viewport.width as usize + x as usize) * 4;
        let px = self.data().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the contents.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        if self.pixmap.is_none() {
            return None;
        }
        let mut rgba = self.data().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba);
        image::RgbaImage::from_raw(self.viewport.width, self.viewport.height, rgba)
    }
}

/// Build a paint from premultiplied RGBA8 pixels.
pub fn image_paint(rgba8_premul: &[u8], width: u32, height: u32) -> ReelResult<vello_cpu::Image> {
    let pixmap = premul_bytes_to_pixmap(rgba8_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ReelError::render("frame byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

/// A canvas element. Hosts without 2D support produce one whose context is unavailable.
#[derive(Clone, Debug)]
pub struct CanvasElement {
    surface: Option<Rc<RefCell<CanvasSurface>>>,
}

impl Default for CanvasElement {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasElement {
    pub fn new() -> Self {
        Self {
            surface: Some(Rc::new(RefCell::new(CanvasSurface::new()))),
        }
    }

    /// A canvas whose 2D context cannot be obtained.
    pub fn unsupported() -> Self {
        Self { surface: None }
    }

    /// The 2D drawing context, if the host provides one.
    pub fn context_2d(&self) -> Option<Rc<RefCell<CanvasSurface>>> {
        self.surface.clone()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.surface.as_ref().map(|s| s.borrow().viewport())
    }

    pub fn stats(&self) -> Option<SurfaceStats> {
        self.surface.as_ref().map(|s| s.borrow().stats())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.surface.as_ref().and_then(|s| s.borrow().pixel(x, y))
    }

    /// Straight-alpha snapshot of the current contents.
    pub fn snapshot(&self) -> Option<image::RgbaImage> {
        self.surface.as_ref().and_then(|s| s.borrow().to_rgba_image())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
