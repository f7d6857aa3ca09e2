//! Identity-keyed private store.
//!
//! Maps the address of a stateful object's shared allocation to its current
//! [`State`]. Each entry carries a `Weak` to the owner, never an `Rc`, so the
//! store can't keep an object alive. A dead entry also pins its allocation
//! (weak counts keep the block reserved), so a new object can never inherit a
//! stale entry by landing on the same address.
//!
//! Nothing here is public: the only way in is through the `Stateful`
//! accessor and mutator of the owning object.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::state::State;

thread_local! {
    static STORE: RefCell<Store> = RefCell::new(Store::default());
}

/// Dead entries are swept once the table has doubled since the last sweep.
const MIN_SWEEP: usize = 32;

#[derive(Default)]
struct Store {
    entries: HashMap<usize, Entry>,
    swept_at: usize,
}

impl Store {
    fn sweep_due(&self) -> bool {
        self.entries.len() >= (self.swept_at * 2).max(MIN_SWEEP)
    }

    fn sweep(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live());
        self.swept_at = self.entries.len();
        log::trace!("store: evicted {} dead entries", before - self.swept_at);
    }
}

// The key is only an address; an embedded field shares it with its container.
// Checking the owner's concrete type is what turns it into an identity.
struct Entry {
    owner: Weak<dyn Any>,
    state: State,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }

    fn owned_by<T: Any>(&self) -> bool {
        self.owner.upgrade().is_some_and(|o| o.is::<T>())
    }
}

fn identity<T>(object: &T) -> usize {
    object as *const T as *const () as usize
}

/// Current state of `object`, or `None` if it was never initialized.
pub(crate) fn get<T: Any>(object: &T) -> Option<State> {
    STORE.with(|s| {
        s.borrow()
            .entries
            .get(&identity(object))
            .filter(|e| e.owned_by::<T>())
            .map(|e| e.state.clone())
    })
}

/// Shared handle to `object` plus its state, for callers that only hold `&T`.
pub(crate) fn lookup<T: Any>(object: &T) -> Option<(Rc<T>, State)> {
    STORE.with(|s| {
        let store = s.borrow();
        let entry = store.entries.get(&identity(object))?;
        let owner = entry.owner.upgrade()?.downcast::<T>().ok()?;
        Some((owner, entry.state.clone()))
    })
}

/// Creates or replaces the entry for `owner`.
pub(crate) fn set<T: Any>(owner: &Rc<T>, state: State) {
    let key = identity(&**owner);
    STORE.with(|s| {
        let mut store = s.borrow_mut();
        if let Some(entry) = store.entries.get_mut(&key).filter(|e| e.owned_by::<T>()) {
            log::trace!("store: replace entry {key:#x}");
            entry.state = state;
            return;
        }

        if store.sweep_due() {
            store.sweep();
        }
        let any: Rc<dyn Any> = owner.clone();
        store.entries.insert(
            key,
            Entry {
                owner: Rc::downgrade(&any),
                state,
            },
        );
        log::trace!("store: new entry {key:#x}");
    });
}

/// Number of entries whose owner is still alive.
#[cfg(test)]
pub(crate) fn live_entries() -> usize {
    STORE.with(|s| s.borrow().entries.values().filter(|e| e.is_live()).count())
}

/// Number of entries held, dead or alive.
#[cfg(test)]
pub(crate) fn raw_entries() -> usize {
    STORE.with(|s| s.borrow().entries.len())
}
