//! Single-threaded observable values.
//!
//! A [`Signal`] holds a value and a list of listeners. Every `set` notifies the listeners that are
//! attached at the start of the notification pass; a listener whose [`Subscription`] is dropped
//! mid-pass is skipped for the rest of it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

struct ListenerSlot<T> {
    id: u64,
    active: Cell<bool>,
    callback: Box<dyn Fn(&T)>,
}

struct SignalInner<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<Rc<ListenerSlot<T>>>>,
    next_id: Cell<u64>,
}

/// Shared observable value. Cloning yields another handle to the same value.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.inner.value.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Create a signal holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Store `value` and notify every listener.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value.clone();
        self.notify(&value);
    }

    /// Store `value` without notifying anyone.
    pub fn replace_quiet(&self, value: T) -> T {
        std::mem::replace(&mut *self.inner.value.borrow_mut(), value)
    }

    /// Attach a listener. It stays attached until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let slot = Rc::new(ListenerSlot {
            id,
            active: Cell::new(true),
            callback: Box::new(callback),
        });
        self.inner.listeners.borrow_mut().push(Rc::clone(&slot));

        let weak: Weak<SignalInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            slot.active.set(false);
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|l| l.id != id);
            }
        })
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self, value: &T) {
        // Snapshot so listeners may subscribe/unsubscribe while being notified.
        let snapshot: Vec<Rc<ListenerSlot<T>>> =
            self.inner.listeners.borrow().iter().cloned().collect();
        for slot in snapshot {
            if slot.active.get() {
                (slot.callback)(value);
            }
        }
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Store `value` and notify only if it differs from the current value.
    ///
    /// Returns `true` when listeners were notified.
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.inner.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }
}

/// RAII handle for an event-loop registration (signal listener, animation frame, timer).
///
/// Dropping the handle releases the registration.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription that releases nothing.
    pub fn empty() -> Self {
        Self { release: None }
    }

    /// Release now. Equivalent to dropping.
    pub fn release(mut self) {
        if let Some(f) = self.release.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.release.take() {
            f();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/signal.rs"]
mod tests;
