//! # Events
//!
//! The evented capability: objects own an [`Emitter`] and expose it through
//! the [`Evented`] trait, which provides `emit` and `on`.
//!
//! ```rust
//! use stateful_core::*;
//!
//! struct Ping;
//! impl EventObject for Ping {
//!     fn event_type(&self) -> &str {
//!         "net:ping"
//!     }
//! }
//!
//! let emitter = Emitter::new();
//! let handle = emitter.on("net:*", |ev| assert_eq!(ev.event_type(), "net:ping"));
//! assert_eq!(emitter.emit(&Ping), 1);
//! handle.destroy();
//! assert_eq!(emitter.emit(&Ping), 0);
//! ```
//!
//! Delivery is synchronous and in registration order. Listeners may
//! subscribe, unsubscribe or emit from inside a callback: a listener added
//! during an emission only sees later emissions, and one removed before its
//! turn is skipped.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    pub struct ListenerKey;
}

/// Anything that can travel through an [`Emitter`].
pub trait EventObject: Any + 'static {
    fn event_type(&self) -> &str;
}

impl dyn EventObject {
    /// Typed view of an event, if it is an `E`.
    pub fn downcast_ref<E: EventObject>(&self) -> Option<&E> {
        let any: &dyn Any = self;
        any.downcast_ref::<E>()
    }

    pub fn is<E: EventObject>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }
}

pub type Listener = Rc<dyn Fn(&dyn EventObject)>;

struct Subscription {
    pattern: String,
    callback: Listener,
}

#[derive(Default)]
struct Listeners {
    table: SlotMap<ListenerKey, Subscription>,
    order: Vec<ListenerKey>,
}

impl Listeners {
    fn remove(&mut self, key: ListenerKey) -> bool {
        if self.table.remove(key).is_some() {
            self.order.retain(|k| *k != key);
            true
        } else {
            false
        }
    }
}

/// Listener registry for one evented object.
#[derive(Default)]
pub struct Emitter {
    inner: Rc<RefCell<Listeners>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to every event whose type matches `pattern`.
    /// `*` in the pattern matches any run of characters.
    pub fn on(&self, pattern: &str, listener: impl Fn(&dyn EventObject) + 'static) -> Handle {
        let key = {
            let mut l = self.inner.borrow_mut();
            let key = l.table.insert(Subscription {
                pattern: pattern.to_owned(),
                callback: Rc::new(listener),
            });
            l.order.push(key);
            key
        };
        log::trace!("emitter: listener {key:?} on '{pattern}'");
        Handle {
            listeners: Rc::downgrade(&self.inner),
            key,
            destroyed: Cell::new(false),
        }
    }

    /// Delivers `event` to matching listeners and returns how many ran.
    pub fn emit(&self, event: &dyn EventObject) -> usize {
        let ty = event.event_type();
        let due: SmallVec<[ListenerKey; 8]> = {
            let l = self.inner.borrow();
            l.order
                .iter()
                .copied()
                .filter(|k| l.table.get(*k).is_some_and(|s| glob_match(&s.pattern, ty)))
                .collect()
        };

        let mut delivered = 0;
        for key in due {
            // Re-resolve each time; an earlier listener may have removed this one.
            let callback = self.inner.borrow().table.get(key).map(|s| s.callback.clone());
            if let Some(callback) = callback {
                callback(event);
                delivered += 1;
            }
        }
        log::trace!("emitter: '{ty}' delivered to {delivered} listener(s)");
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().table.len()
    }

    /// Drops every subscription. Outstanding handles become no-ops.
    pub fn clear(&self) {
        let mut l = self.inner.borrow_mut();
        l.table.clear();
        l.order.clear();
    }
}

/// Returned by [`Emitter::on`]; call [`Handle::destroy`] to unsubscribe.
///
/// Dropping a handle leaves the subscription in place.
pub struct Handle {
    listeners: Weak<RefCell<Listeners>>,
    key: ListenerKey,
    destroyed: Cell<bool>,
}

impl Handle {
    /// Removes the subscription. Runs at most once (safe to call multiple times).
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        if !listeners.borrow_mut().remove(self.key) {
            log::warn!("emitter: listener {:?} was already removed", self.key);
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

/// Wildcard match where `*` stands for any (possibly empty) run of characters.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == text;
    }
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

/// The evented capability. Implementors only supply their [`Emitter`].
pub trait Evented {
    fn emitter(&self) -> &Emitter;

    fn emit(&self, event: &dyn EventObject) -> usize {
        self.emitter().emit(event)
    }

    fn on(&self, pattern: &str, listener: impl Fn(&dyn EventObject) + 'static) -> Handle
    where
        Self: Sized,
    {
        self.emitter().on(pattern, listener)
    }
}
