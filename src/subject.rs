//! Subject slots - explicit subscribe/unsubscribe to host objects
//!
//! A `SubjectSlot` keeps a non-owning reference to the object it listens to.
//! Binding a new subject unsubscribes from the previous one first. The slot
//! does not unsubscribe on drop; owners clear it when they are disabled.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one listener across all observable objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn next() -> Self {
        ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Listener registry embedded in observable objects
#[derive(Debug, Default)]
pub struct Listeners {
    ids: Vec<ListenerId>,
}

impl Listeners {
    pub fn add(&mut self, id: ListenerId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: ListenerId) {
        self.ids.retain(|&l| l != id);
    }

    #[cfg(test)]
    pub fn contains(&self, id: ListenerId) -> bool {
        self.ids.contains(&id)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ListenerId> + '_ {
        self.ids.iter().copied()
    }
}

/// Host objects that push change notifications
pub trait Observable {
    fn listeners(&self) -> &Listeners;

    fn listeners_mut(&mut self) -> &mut Listeners;
}

/// Weak, re-bindable subscription to one observable object
#[derive(Debug)]
pub struct SubjectSlot<T> {
    listener: ListenerId,
    subject: Option<Weak<RefCell<T>>>,
}

impl<T: Observable> Default for SubjectSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Observable> SubjectSlot<T> {
    pub fn new() -> Self {
        Self {
            listener: ListenerId::next(),
            subject: None,
        }
    }

    /// The id notifications for this slot are addressed to
    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    /// Bind to `subject`, or unbind with `None`
    pub fn set_subject(&mut self, subject: Option<&Rc<RefCell<T>>>) {
        let unchanged = match (&self.subject, subject) {
            (Some(current), Some(new)) => Weak::ptr_eq(current, &Rc::downgrade(new)),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        // a stale subject has already dropped its listener list
        if let Some(previous) = self.subject.take().and_then(|w| w.upgrade()) {
            previous.borrow_mut().listeners_mut().remove(self.listener);
        }
        if let Some(subject) = subject {
            subject.borrow_mut().listeners_mut().add(self.listener);
            self.subject = Some(Rc::downgrade(subject));
        }
    }

    /// The bound subject, or `None` when unbound or already deleted
    pub fn subject(&self) -> Option<Rc<RefCell<T>>> {
        self.subject.as_ref().and_then(Weak::upgrade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Knob {
        listeners: Listeners,
    }

    impl Observable for Knob {
        fn listeners(&self) -> &Listeners {
            &self.listeners
        }

        fn listeners_mut(&mut self) -> &mut Listeners {
            &mut self.listeners
        }
    }

    #[test]
    fn test_rebinding_unsubscribes_previous_subject() {
        let first = Rc::new(RefCell::new(Knob::default()));
        let second = Rc::new(RefCell::new(Knob::default()));
        let mut slot = SubjectSlot::new();

        slot.set_subject(Some(&first));
        assert!(first.borrow().listeners().contains(slot.listener()));

        slot.set_subject(Some(&second));
        assert!(first.borrow().listeners().is_empty());
        assert!(second.borrow().listeners().contains(slot.listener()));
        assert!(slot.subject().is_some_and(|s| Rc::ptr_eq(&s, &second)));

        slot.set_subject(None);
        assert!(second.borrow().listeners().is_empty());
        assert!(slot.subject().is_none());
    }

    #[test]
    fn test_deleted_subject_reads_as_absent() {
        let knob = Rc::new(RefCell::new(Knob::default()));
        let mut slot = SubjectSlot::new();
        slot.set_subject(Some(&knob));

        drop(knob);

        assert!(slot.subject().is_none());
        slot.set_subject(None);
    }

    #[test]
    fn test_binding_same_subject_twice_keeps_one_listener() {
        let knob = Rc::new(RefCell::new(Knob::default()));
        let mut slot = SubjectSlot::new();
        slot.set_subject(Some(&knob));
        slot.set_subject(Some(&knob));

        assert_eq!(knob.borrow().listeners().iter().count(), 1);
    }
}
