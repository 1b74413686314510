use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::animation::spring::{Spring, SpringConfig};
use crate::foundation::signal::{Signal, Subscription};
use crate::host::event_loop::{AnimationFrame, EventLoop, FRAME_MS};

struct SmoothedInner {
    events: EventLoop,
    spring: RefCell<Spring>,
    output: Signal<f64>,
    frame: RefCell<Option<AnimationFrame>>,
    last_ts: Cell<Option<f64>>,
}

impl SmoothedInner {
    fn retarget(self: &Rc<Self>, target: f64) {
        let snapped = {
            let mut spring = self.spring.borrow_mut();
            spring.set_target(target);
            // Inside the rest band no frame would be scheduled, so land on the target now.
            if self.frame.borrow().is_none() && spring.is_at_rest() {
                let target = spring.target();
                spring.jump(target);
                Some(target)
            } else {
                None
            }
        };
        match snapped {
            Some(position) => {
                self.output.set_if_changed(position);
            }
            None => self.schedule(),
        }
    }

    fn schedule(self: &Rc<Self>) {
        if self.frame.borrow().is_some() || self.spring.borrow().is_at_rest() {
            return;
        }
        let weak = Rc::downgrade(self);
        let handle = self.events.request_animation_frame(move |ts| {
            if let Some(inner) = weak.upgrade() {
                inner.on_frame(ts);
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn on_frame(self: &Rc<Self>, ts: f64) {
        // Already fired; releasing it only clears bookkeeping.
        drop(self.frame.borrow_mut().take());

        let dt_ms = match self.last_ts.get() {
            Some(prev) if ts > prev => ts - prev,
            _ => FRAME_MS,
        };
        self.last_ts.set(Some(ts));

        let (position, at_rest) = {
            let mut spring = self.spring.borrow_mut();
            let at_rest = spring.step(dt_ms / 1000.0);
            (spring.position(), at_rest)
        };
        self.output.set_if_changed(position);

        if at_rest {
            self.last_ts.set(None);
        } else {
            self.schedule();
        }
    }
}

/// Spring-smoothed copy of a progress signal.
///
/// Every source change retargets the spring; the spring advances once per animation frame until it
/// settles, and the output signal carries its position. Dropping the value cancels any pending
/// frame.
pub struct SmoothedProgress {
    inner: Rc<SmoothedInner>,
    _source: Subscription,
}

impl fmt::Debug for SmoothedProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spring = self.inner.spring.borrow();
        f.debug_struct("SmoothedProgress")
            .field("position", &spring.position())
            .field("target", &spring.target())
            .field("animating", &self.is_animating())
            .finish()
    }
}

impl SmoothedProgress {
    /// Follow `source`, starting at rest on its current value.
    pub fn follow(source: &Signal<f64>, cfg: SpringConfig, events: &EventLoop) -> Self {
        let start = source.get();
        let inner = Rc::new(SmoothedInner {
            events: events.clone(),
            spring: RefCell::new(Spring::new(cfg, start)),
            output: Signal::new(start),
            frame: RefCell::new(None),
            last_ts: Cell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let sub = source.subscribe(move |target| {
            if let Some(inner) = weak.upgrade() {
                inner.retarget(*target);
            }
        });

        Self {
            inner,
            _source: sub,
        }
    }

    /// Smoothed value.
    pub fn value(&self) -> f64 {
        self.inner.output.get()
    }

    /// Value the spring is chasing.
    pub fn target(&self) -> f64 {
        self.inner.spring.borrow().target()
    }

    /// `true` while an animation frame is pending.
    pub fn is_animating(&self) -> bool {
        self.inner.frame.borrow().is_some()
    }

    pub fn signal(&self) -> &Signal<f64> {
        &self.inner.output
    }

    pub fn on_change(&self, f: impl Fn(&f64) + 'static) -> Subscription {
        self.inner.output.subscribe(f)
    }
}

impl Drop for SmoothedProgress {
    fn drop(&mut self) {
        drop(self.inner.frame.borrow_mut().take());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/smoothed.rs"]
mod tests;
