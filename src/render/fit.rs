use crate::foundation::core::{Rect, Size};

/// Largest rectangle with the aspect ratio of `image` that fits inside `surface`, centered.
///
/// One dimension matches the surface exactly; the other leaves equal bands on both sides.
/// Returns `None` when either size is empty or not finite.
pub fn contain_rect(surface: Size, image: Size) -> Option<Rect> {
    let valid = |s: Size| s.width.is_finite() && s.height.is_finite() && s.width > 0.0 && s.height > 0.0;
    if !valid(surface) || !valid(image) {
        return None;
    }
    let scale = (surface.width / image.width).min(surface.height / image.height);
    let w = image.width * scale;
    let h = image.height * scale;
    let x = (surface.width - w) / 2.0;
    let y = (surface.height - h) / 2.0;
    Some(Rect::new(x, y, x + w, y + h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
