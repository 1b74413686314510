use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::Viewport;
use crate::host::page::ElementBox;

fn page() -> Page {
    Page::new(Viewport::new(1920, 1080), 4320.0)
}

#[test]
fn whole_page_spans_scroll_range() {
    let p = page();
    let tracker = ProgressTracker::bind(&p, &ScrollBinding::WholePage);
    assert_eq!(tracker.progress(), 0.0);

    p.scroll_to(810.0);
    assert!((tracker.progress() - 0.25).abs() < 1e-12);

    p.scroll_to(3240.0);
    assert_eq!(tracker.progress(), 1.0);
}

#[test]
fn whole_page_without_scroll_range_is_zero() {
    let p = Page::new(Viewport::new(800, 600), 600.0);
    assert_eq!(whole_page_progress(&p.layout()), 0.0);
    let p = Page::new(Viewport::new(800, 600), 100.0);
    assert_eq!(whole_page_progress(&p.layout()), 0.0);
}

#[test]
fn scoped_tracks_container_only() {
    let p = Page::new(Viewport::new(1000, 500), 5000.0);
    p.attach_element(
        "hero",
        ElementBox {
            top: 1000.0,
            height: 2500.0,
        },
    );
    let binding = ScrollBinding::Scoped {
        container: "hero".to_owned(),
    };
    let tracker = ProgressTracker::bind(&p, &binding);

    p.scroll_to(500.0);
    assert_eq!(tracker.progress(), 0.0);
    p.scroll_to(1000.0);
    assert_eq!(tracker.progress(), 0.0);
    p.scroll_to(2000.0);
    assert!((tracker.progress() - 0.5).abs() < 1e-12);
    p.scroll_to(3000.0);
    assert_eq!(tracker.progress(), 1.0);
    p.scroll_to(4500.0);
    assert_eq!(tracker.progress(), 1.0);
}

#[test]
fn scoped_short_container_steps() {
    let mut layout = page().layout();
    layout.elements.insert(
        "hero".to_owned(),
        ElementBox {
            top: 200.0,
            height: 300.0,
        },
    );
    layout.scroll_y = 100.0;
    assert_eq!(scoped_progress(&layout, "hero"), 0.0);
    layout.scroll_y = 200.0;
    assert_eq!(scoped_progress(&layout, "hero"), 1.0);
}

#[test]
fn scoped_missing_element_is_zero() {
    let mut layout = page().layout();
    layout.scroll_y = 900.0;
    assert_eq!(scoped_progress(&layout, "nowhere"), 0.0);
}

#[test]
fn listeners_fire_only_on_change() {
    let p = page();
    let tracker = ProgressTracker::bind(&p, &ScrollBinding::WholePage);
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    let _sub = tracker.on_change(move |_| h.set(h.get() + 1));

    p.attach_element(
        "unrelated",
        ElementBox {
            top: 0.0,
            height: 10.0,
        },
    );
    assert_eq!(hits.get(), 0);
    p.scroll_to(100.0);
    assert_eq!(hits.get(), 1);
}

#[test]
fn dropping_tracker_detaches_from_page() {
    let p = page();
    let tracker = ProgressTracker::bind(&p, &ScrollBinding::WholePage);
    drop(tracker);
    p.scroll_to(500.0);
}

#[test]
fn binding_json_shapes() {
    let b: ScrollBinding = serde_json::from_str(r#"{"mode":"whole-page"}"#).unwrap();
    assert_eq!(b, ScrollBinding::WholePage);
    let b: ScrollBinding =
        serde_json::from_str(r#"{"mode":"scoped","container":"hero"}"#).unwrap();
    assert_eq!(
        b,
        ScrollBinding::Scoped {
            container: "hero".to_owned()
        }
    );
    assert!(serde_json::from_str::<ScrollBinding>(r#"{"mode":"sideways"}"#).is_err());
}
