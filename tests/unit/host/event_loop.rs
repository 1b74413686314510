use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;

#[test]
fn tasks_run_in_order_including_nested() {
    let ev = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let (l1, ev2) = (Rc::clone(&log), ev.clone());
    ev.spawn_local(move || {
        l1.borrow_mut().push(1);
        let l3 = Rc::clone(&l1);
        ev2.spawn_local(move || l3.borrow_mut().push(3));
    });
    let l2 = Rc::clone(&log);
    ev.spawn_local(move || l2.borrow_mut().push(2));

    assert_eq!(ev.run_until_idle(), 3);
    assert_eq!(*log.borrow(), vec![1, 2, 3]);
}

#[test]
fn animation_frame_requested_during_tick_runs_next_tick() {
    let ev = EventLoop::new();
    let count = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<AnimationFrame>>> = Rc::new(RefCell::new(None));

    let (c, ev2, slot2) = (Rc::clone(&count), ev.clone(), Rc::clone(&slot));
    *slot.borrow_mut() = Some(ev.request_animation_frame(move |_| {
        c.set(c.get() + 1);
        let c2 = Rc::clone(&c);
        *slot2.borrow_mut() = Some(ev2.request_animation_frame(move |_| c2.set(c2.get() + 1)));
    }));

    ev.tick(FRAME_MS);
    assert_eq!(count.get(), 1);
    assert_eq!(ev.pending_frames(), 1);
    ev.tick(FRAME_MS);
    assert_eq!(count.get(), 2);
    assert_eq!(ev.pending_frames(), 0);
}

#[test]
fn dropping_handles_cancels_frames_and_timers() {
    let ev = EventLoop::new();
    let fired = Rc::new(Cell::new(false));

    let f1 = Rc::clone(&fired);
    let frame = ev.request_animation_frame(move |_| f1.set(true));
    let f2 = Rc::clone(&fired);
    let timer = ev.set_timeout(10, move || f2.set(true));
    assert_eq!(ev.pending_frames(), 1);
    assert_eq!(ev.pending_timers(), 1);

    drop(frame);
    drop(timer);
    ev.tick(50.0);
    assert!(!fired.get());
    assert_eq!(ev.pending_frames(), 0);
    assert_eq!(ev.pending_timers(), 0);
}

#[test]
fn timers_fire_once_due() {
    let ev = EventLoop::new();
    let fired = Rc::new(Cell::new(0));
    let f = Rc::clone(&fired);
    let _timer = ev.set_timeout(40, move || f.set(f.get() + 1));

    ev.tick(FRAME_MS);
    ev.tick(FRAME_MS);
    assert_eq!(fired.get(), 0);
    ev.tick(FRAME_MS);
    assert_eq!(fired.get(), 1);
    ev.tick(100.0);
    assert_eq!(fired.get(), 1);
    assert!((ev.now_ms() - (3.0 * FRAME_MS + 100.0)).abs() < 1e-9);
}

#[test]
fn run_frames_until_quiet_reports_budget_exhaustion() {
    let ev = EventLoop::new();
    assert_eq!(ev.run_frames_until_quiet(5), Some(0));

    fn forever(ev: EventLoop, keep: Rc<RefCell<Option<AnimationFrame>>>) {
        let (ev2, keep2) = (ev.clone(), Rc::clone(&keep));
        *keep.borrow_mut() = Some(ev.request_animation_frame(move |_| forever(ev2, keep2)));
    }
    let keep = Rc::new(RefCell::new(None));
    forever(ev.clone(), Rc::clone(&keep));
    assert_eq!(ev.run_frames_until_quiet(5), None);
    keep.borrow_mut().take();
    assert_eq!(ev.pending_frames(), 0);
}
