// SPDX-License-Identifier: MIT OR Apache-2.0
//! Synchronous multicast notification.
//!
//! A [`Subject`] pushes each published value to its live observers in
//! subscription order. A failing observer is told about its own failure and
//! delivery carries on with the rest.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Error raised by an observer while handling a value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Observer failed: {0}")]
pub struct ObserverError(pub String);

impl ObserverError {
    /// Create an error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Receives values from a [`Subject`]
pub trait Observer<T> {
    /// Handle the next value
    fn on_next(&self, value: &T) -> Result<(), ObserverError>;

    /// Called with the error this observer returned from [`Observer::on_next`]
    fn on_error(&self, _error: &ObserverError) {}

    /// Called once when this observer's subscription is disposed
    fn on_completed(&self) {}
}

struct FnObserver<F>(F);

impl<T, F> Observer<T> for FnObserver<F>
where
    F: Fn(&T) -> Result<(), ObserverError>,
{
    fn on_next(&self, value: &T) -> Result<(), ObserverError> {
        (self.0)(value)
    }
}

struct Slot<T> {
    id: u64,
    observer: Rc<dyn Observer<T>>,
}

struct Observers<T> {
    next_id: Cell<u64>,
    slots: RefCell<Vec<Slot<T>>>,
}

impl<T> Observers<T> {
    fn is_live(&self, id: u64) -> bool {
        self.slots.borrow().iter().any(|slot| slot.id == id)
    }

    fn detach(&self, id: u64) -> Option<Rc<dyn Observer<T>>> {
        let mut slots = self.slots.borrow_mut();
        let position = slots.iter().position(|slot| slot.id == id)?;
        Some(slots.remove(position).observer)
    }
}

/// A multicast channel for one kind of change
pub struct Subject<T: 'static> {
    inner: Rc<Observers<T>>,
}

impl<T: 'static> Subject<T> {
    /// Create a subject with no observers
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Observers {
                next_id: Cell::new(0),
                slots: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Add an observer; it stays subscribed until the handle is disposed or dropped
    pub fn subscribe(&self, observer: impl Observer<T> + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.slots.borrow_mut().push(Slot {
            id,
            observer: Rc::new(observer),
        });

        let observers: Weak<Observers<T>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                let Some(observers) = observers.upgrade() else {
                    return;
                };
                // The slot borrow ends before the completion callback runs.
                let detached = observers.detach(id);
                if let Some(observer) = detached {
                    observer.on_completed();
                }
            })),
        }
    }

    /// Add a closure as an observer
    pub fn subscribe_fn<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T) -> Result<(), ObserverError> + 'static,
    {
        self.subscribe(FnObserver(handler))
    }

    /// Deliver `value` to every live observer.
    ///
    /// Observers added during delivery see the next value, not this one.
    /// Observers removed during delivery are skipped.
    pub fn publish(&self, value: &T) {
        let snapshot: Vec<(u64, Rc<dyn Observer<T>>)> = self
            .inner
            .slots
            .borrow()
            .iter()
            .map(|slot| (slot.id, Rc::clone(&slot.observer)))
            .collect();

        for (id, observer) in snapshot {
            if !self.inner.is_live(id) {
                continue;
            }
            if let Err(error) = observer.on_next(value) {
                tracing::warn!(subscriber = id, %error, "observer failed");
                observer.on_error(&error);
            }
        }
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Handle returned by [`Subject::subscribe`].
///
/// Disposing or dropping it removes the observer and sends it a completion
/// signal.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now
    pub fn dispose(mut self) {
        self.cancel_now();
    }

    /// Keep the observer subscribed for as long as the subject lives
    pub fn forget(mut self) {
        self.cancel = None;
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
