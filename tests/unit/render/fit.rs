use super::*;

#[test]
fn wide_image_in_wide_canvas_fills_exactly() {
    let r = contain_rect(Size::new(1920.0, 1080.0), Size::new(1280.0, 720.0)).unwrap();
    assert_eq!(r, Rect::new(0.0, 0.0, 1920.0, 1080.0));
}

#[test]
fn square_image_is_pillarboxed() {
    let r = contain_rect(Size::new(1920.0, 1080.0), Size::new(1000.0, 1000.0)).unwrap();
    assert_eq!(r, Rect::new(420.0, 0.0, 1500.0, 1080.0));
}

#[test]
fn wide_image_in_tall_canvas_is_letterboxed() {
    let r = contain_rect(Size::new(390.0, 844.0), Size::new(1920.0, 1080.0)).unwrap();
    assert!((r.width() - 390.0).abs() < 1e-9);
    assert!((r.height() - 219.375).abs() < 1e-9);
    assert!((r.y0 - (844.0 - 219.375) / 2.0).abs() < 1e-9);
    assert_eq!(r.x0, 0.0);
}

#[test]
fn degenerate_sizes_yield_none() {
    assert!(contain_rect(Size::new(0.0, 100.0), Size::new(10.0, 10.0)).is_none());
    assert!(contain_rect(Size::new(100.0, 100.0), Size::new(10.0, 0.0)).is_none());
    assert!(contain_rect(Size::new(f64::NAN, 100.0), Size::new(10.0, 10.0)).is_none());
}
