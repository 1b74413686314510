use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, Rect, Size, Vec2};

/// 1-based index into an image sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    /// First frame of every sequence.
    pub const FIRST: Self = Self(1);

    /// Create a validated index for a sequence of `frame_count` frames.
    pub fn new(index: u32, frame_count: u32) -> ReelResult<Self> {
        if index == 0 || index > frame_count {
            return Err(ReelError::validation(format!(
                "frame index {index} outside 1..={frame_count}"
            )));
        }
        Ok(Self(index))
    }

    /// Map progress to a frame: `round(1 + progress * (frame_count - 1))`, clamped to
    /// `[1, frame_count]`.
    ///
    /// Ties round away from zero, so `0.5` over 162 frames (`81.5`) selects frame 82. Values
    /// outside `[0, 1]` (spring overshoot) clamp to the ends; non-finite input maps to frame 1.
    pub fn from_progress(progress: f64, frame_count: u32) -> Self {
        if frame_count <= 1 {
            return Self::FIRST;
        }
        let p = if progress.is_finite() { progress } else { 0.0 };
        let last = f64::from(frame_count);
        let raw = 1.0 + p * (last - 1.0);
        Self(raw.round().clamp(1.0, last) as u32)
    }

    /// Zero-based slot for table lookups.
    pub fn slot(self) -> usize {
        self.0.saturating_sub(1) as usize
    }
}

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Viewport (and canvas) dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Construct a viewport.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Dimensions as a `kurbo` size.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB channels.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Premultiplied channel bytes, as stored in raster surfaces.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
