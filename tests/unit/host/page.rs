use std::cell::Cell;
use std::rc::Rc;

use super::*;

fn page() -> Page {
    Page::new(Viewport::new(1920, 1080), 4320.0)
}

#[test]
fn scroll_clamps_to_range() {
    let p = page();
    p.scroll_to(-50.0);
    assert_eq!(p.layout().scroll_y, 0.0);
    p.scroll_to(1e9);
    assert_eq!(p.layout().scroll_y, 4320.0 - 1080.0);
    p.scroll_to(f64::NAN);
    assert_eq!(p.layout().scroll_y, 0.0);
}

#[test]
fn scroll_to_progress_uses_whole_range() {
    let p = page();
    p.scroll_to_progress(0.5);
    assert_eq!(p.layout().scroll_y, (4320.0 - 1080.0) / 2.0);
}

#[test]
fn resize_emits_event_and_reclamps() {
    let p = page();
    p.scroll_to(3240.0);
    let resized = Rc::new(Cell::new(0));
    let r = Rc::clone(&resized);
    let _sub = p.on_resize(move |vp| {
        assert_eq!(*vp, Viewport::new(800, 2000));
        r.set(r.get() + 1);
    });

    p.resize(Viewport::new(800, 2000));
    assert_eq!(resized.get(), 1);
    assert_eq!(p.layout().scroll_y, 4320.0 - 2000.0);
}

#[test]
fn unchanged_scroll_does_not_notify() {
    let p = page();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    let _sub = p.on_layout(move |_| h.set(h.get() + 1));

    p.scroll_to(100.0);
    p.scroll_to(100.0);
    assert_eq!(hits.get(), 1);
}

#[test]
fn elements_attach_and_detach() {
    let p = page();
    p.attach_element(
        "hero",
        ElementBox {
            top: 500.0,
            height: 4320.0,
        },
    );
    assert!(p.layout().elements.contains_key("hero"));
    p.detach_element("hero");
    p.detach_element("hero");
    assert!(p.layout().elements.is_empty());
}
