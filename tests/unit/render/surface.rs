use super::*;
use crate::assets::decode::DecodedImage;

const BG: Rgba8 = Rgba8::opaque(5, 5, 5);

fn assert_px_near(actual: Option<[u8; 4]>, expected: [u8; 4]) {
    let actual = actual.expect("pixel in bounds");
    for (a, e) in actual.iter().zip(expected) {
        assert!(a.abs_diff(e) <= 1, "{actual:?} != {expected:?}");
    }
}

fn red(w: u32, h: u32) -> (vello_cpu::Image, Size) {
    let img = DecodedImage::solid(w, h, [255, 0, 0, 255]);
    let paint = image_paint(&img.rgba8_premul, w, h).unwrap();
    (paint, Size::new(f64::from(w), f64::from(h)))
}

#[test]
fn unsized_surface_paints_nothing() {
    let mut s = CanvasSurface::new();
    let (paint, size) = red(4, 4);
    assert_eq!(s.draw_image(FrameIndex(1), &paint, size, BG).unwrap(), None);
    assert!(s.data().is_empty());
    assert!(s.to_rgba_image().is_none());
    assert_eq!(s.stats().draws, 0);
}

#[test]
fn draw_fills_background_and_centers_image() {
    let mut s = CanvasSurface::new();
    s.resize(Viewport::new(200, 200)).unwrap();
    let (paint, size) = red(100, 50);
    let dest = s
        .draw_image(FrameIndex(7), &paint, size, BG)
        .unwrap()
        .unwrap();
    assert_eq!(dest, Rect::new(0.0, 50.0, 200.0, 150.0));

    assert_px_near(s.pixel(100, 100), [255, 0, 0, 255]);
    assert_px_near(s.pixel(100, 10), [5, 5, 5, 255]);
    assert_px_near(s.pixel(100, 190), [5, 5, 5, 255]);
    assert_eq!(s.pixel(200, 0), None);

    let stats = s.stats();
    assert_eq!(stats.draws, 1);
    assert_eq!(stats.last_frame, Some(FrameIndex(7)));
}

#[test]
fn resize_clears_and_counts() {
    let mut s = CanvasSurface::new();
    s.resize(Viewport::new(10, 10)).unwrap();
    let (paint, size) = red(10, 10);
    s.draw_image(FrameIndex(1), &paint, size, BG).unwrap();
    s.resize(Viewport::new(20, 10)).unwrap();
    assert_eq!(s.pixel(5, 5), Some([0, 0, 0, 0]));
    assert_eq!(s.stats().resizes, 2);
    assert_eq!(s.data().len(), 20 * 10 * 4);
}

#[test]
fn oversized_canvas_is_rejected() {
    let mut s = CanvasSurface::new();
    let err = s.resize(Viewport::new(70_000, 10)).unwrap_err();
    assert!(err.to_string().starts_with("render error:"));
}

#[test]
fn snapshot_is_straight_alpha() {
    let mut s = CanvasSurface::new();
    s.resize(Viewport::new(4, 4)).unwrap();
    let (paint, size) = red(4, 4);
    s.draw_image(FrameIndex(1), &paint, size, BG).unwrap();
    let img = s.to_rgba_image().unwrap();
    assert_eq!(img.dimensions(), (4, 4));
    assert_px_near(Some(img.get_pixel(2, 2).0), [255, 0, 0, 255]);
}

#[test]
fn image_paint_checks_length() {
    assert!(image_paint(&[0u8; 12], 2, 2).is_err());
}

#[test]
fn unsupported_canvas_has_no_context() {
    let canvas = CanvasElement::unsupported();
    assert!(canvas.context_2d().is_none());
    assert!(canvas.snapshot().is_none());
    assert!(CanvasElement::new().context_2d().is_some());
}
