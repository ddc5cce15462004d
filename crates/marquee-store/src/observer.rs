use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Receives a signal after every completed watchlist mutation.
///
/// The signal carries no payload; observers re-query the store.
pub trait WatchlistObserver {
    /// Called after an `add`, `remove` or `clear` completes.
    fn watchlist_changed(&self);
}

impl<F: Fn()> WatchlistObserver for F {
    fn watchlist_changed(&self) {
        self();
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered registry of observers.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Rc<dyn WatchlistObserver>)>>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.borrow().len())
            .finish()
    }
}

impl Observers {
    pub(crate) fn subscribe(&self, observer: Rc<dyn WatchlistObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));
        self.entries.borrow_mut().push((id, observer));
        id
    }

    /// Returns `true` if `id` was subscribed.
    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Notifies every observer in subscription order.
    ///
    /// The registry is snapshotted first so an observer may subscribe or
    /// unsubscribe from inside its callback.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<Rc<dyn WatchlistObserver>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in snapshot {
            observer.watchlist_changed();
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_in_subscription_order() {
        // Arrange
        let observers = Observers::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let second = Rc::clone(&log);
        observers.subscribe(Rc::new(move || first.borrow_mut().push(1)));
        observers.subscribe(Rc::new(move || second.borrow_mut().push(2)));

        // Act
        observers.notify();

        // Assert
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_observer() {
        // Arrange
        let observers = Observers::default();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let kept = observers.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        let dropped = observers.subscribe(Rc::new(|| {}));

        // Act
        let removed = observers.unsubscribe(dropped);
        let removed_again = observers.unsubscribe(dropped);
        observers.notify();

        // Assert
        assert!(removed);
        assert!(!removed_again);
        assert_ne!(kept, dropped);
        assert_eq!(observers.len(), 1);
        assert_eq!(calls.get(), 1);
    }
}
