use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::foundation::signal::Subscription;

/// Nominal animation frame duration (60 Hz).
pub const FRAME_MS: f64 = 1000.0 / 60.0;

type Task = Box<dyn FnOnce()>;

struct Pending<A> {
    id: u64,
    callback: RefCell<Option<Box<dyn FnOnce(A)>>>,
}

struct TimerEntry {
    due_ms: f64,
    pending: Rc<Pending<()>>,
}

struct LoopInner {
    now_ms: Cell<f64>,
    next_id: Cell<u64>,
    tasks: RefCell<VecDeque<Task>>,
    frames: RefCell<Vec<Rc<Pending<f64>>>>,
    timers: RefCell<Vec<TimerEntry>>,
}

impl LoopInner {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

/// Single-threaded cooperative event loop with a virtual clock.
///
/// Nothing here blocks: tasks, animation-frame callbacks and timers are queued and only run when
/// the embedder calls [`EventLoop::run_until_idle`] or [`EventLoop::tick`]. Cloning yields another
/// handle to the same loop.
#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<LoopInner>,
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("now_ms", &self.inner.now_ms.get())
            .field("tasks", &self.pending_tasks())
            .field("frames", &self.pending_frames())
            .field("timers", &self.pending_timers())
            .finish()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a requested animation frame. Dropping it cancels the request.
pub type AnimationFrame = Subscription;

/// Handle for a pending timeout. Dropping it cancels the timeout.
pub type Timeout = Subscription;

impl EventLoop {
    /// Create an idle loop at time zero.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(LoopInner {
                now_ms: Cell::new(0.0),
                next_id: Cell::new(0),
                tasks: RefCell::new(VecDeque::new()),
                frames: RefCell::new(Vec::new()),
                timers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Virtual clock in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.inner.now_ms.get()
    }

    /// Queue a task to run on the next drain.
    pub fn spawn_local(&self, task: impl FnOnce() + 'static) {
        self.inner.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Run queued tasks, including ones queued while draining. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.tasks.borrow_mut().pop_front();
            let Some(task) = next else { break };
            task();
            ran += 1;
        }
        ran
    }

    /// Request `callback` on the next animation frame; it receives the frame timestamp in ms.
    pub fn request_animation_frame(&self, callback: impl FnOnce(f64) + 'static) -> AnimationFrame {
        let pending = Rc::new(Pending {
            id: self.inner.next_id(),
            callback: RefCell::new(Some(Box::new(callback) as Box<dyn FnOnce(f64)>)),
        });
        self.inner.frames.borrow_mut().push(Rc::clone(&pending));

        let weak: Weak<LoopInner> = Rc::downgrade(&self.inner);
        let id = pending.id;
        Subscription::new(move || {
            pending.callback.borrow_mut().take();
            if let Some(inner) = weak.upgrade() {
                inner.frames.borrow_mut().retain(|p| p.id != id);
            }
        })
    }

    /// Run `callback` once `delay_ms` of virtual time has elapsed.
    pub fn set_timeout(&self, delay_ms: u64, callback: impl FnOnce() + 'static) -> Timeout {
        let pending = Rc::new(Pending {
            id: self.inner.next_id(),
            callback: RefCell::new(Some(
                Box::new(move |()| callback()) as Box<dyn FnOnce(())>
            )),
        });
        self.inner.timers.borrow_mut().push(TimerEntry {
            due_ms: self.now_ms() + delay_ms as f64,
            pending: Rc::clone(&pending),
        });

        let weak: Weak<LoopInner> = Rc::downgrade(&self.inner);
        let id = pending.id;
        Subscription::new(move || {
            pending.callback.borrow_mut().take();
            if let Some(inner) = weak.upgrade() {
                inner.timers.borrow_mut().retain(|t| t.pending.id != id);
            }
        })
    }

    /// Advance the clock by `frame_ms` and run one animation frame.
    ///
    /// Order: due timers, then the animation-frame callbacks registered before this tick, then
    /// queued tasks. Callbacks that request another frame land on the next tick.
    pub fn tick(&self, frame_ms: f64) {
        let now = self.now_ms() + frame_ms.max(0.0);
        self.inner.now_ms.set(now);

        let due: Vec<Rc<Pending<()>>> = {
            let mut timers = self.inner.timers.borrow_mut();
            let (due, keep): (Vec<TimerEntry>, Vec<TimerEntry>) =
                timers.drain(..).partition(|t| t.due_ms <= now);
            *timers = keep;
            due.into_iter().map(|t| t.pending).collect()
        };
        for pending in due {
            let callback = pending.callback.borrow_mut().take();
            if let Some(callback) = callback {
                callback(());
            }
        }

        let frames = std::mem::take(&mut *self.inner.frames.borrow_mut());
        for pending in frames {
            let callback = pending.callback.borrow_mut().take();
            if let Some(callback) = callback {
                callback(now);
            }
        }

        self.run_until_idle();
    }

    /// Tick at the nominal frame rate until no animation frames or tasks are pending.
    ///
    /// Timers do not keep the loop busy; a far-off timeout does not block quiescence.
    /// Returns the number of ticks, or `None` if `max_frames` elapsed first.
    pub fn run_frames_until_quiet(&self, max_frames: usize) -> Option<usize> {
        self.run_until_idle();
        for n in 0..max_frames {
            if self.pending_frames() == 0 && self.pending_tasks() == 0 {
                return Some(n);
            }
            self.tick(FRAME_MS);
        }
        (self.pending_frames() == 0 && self.pending_tasks() == 0).then_some(max_frames)
    }

    /// Number of queued tasks.
    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Number of live animation-frame requests.
    pub fn pending_frames(&self) -> usize {
        self.inner.frames.borrow().len()
    }

    /// Number of live timers.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/event_loop.rs"]
mod tests;
