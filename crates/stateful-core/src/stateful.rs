use std::rc::Rc;

use serde_json::{Map, Value};

use crate::compose::Capability;
use crate::error::StateError;
use crate::evented::{EventObject, Evented, Handle};
use crate::state::{State, StatefulOptions, partial};
use crate::store;

pub const STATE_CHANGED: &str = "state:changed";

/// Emitted once per `set_state` call, after the new state has been stored.
pub struct StateChanged<T: 'static> {
    pub state: State,
    pub target: Rc<T>,
}

impl<T: 'static> EventObject for StateChanged<T> {
    fn event_type(&self) -> &str {
        STATE_CHANGED
    }
}

/// Private, observable state for an evented object.
///
/// Implement it with an empty body and create instances through
/// [`stateful`] (or a descriptor extended from it) so the initializer seeds
/// the private store.
pub trait Stateful: Evented + Sized + 'static {
    /// Current state snapshot.
    ///
    /// # Panics
    ///
    /// If the object was not created through a stateful descriptor.
    fn state(&self) -> State {
        match self.try_state() {
            Ok(state) => state,
            Err(err) => panic!("state(): {err}"),
        }
    }

    fn try_state(&self) -> Result<State, StateError> {
        store::get(self).ok_or(StateError::Uninitialized)
    }

    /// Deep-merges `partial` into the current state, stores the result, then
    /// synchronously emits [`StateChanged`].
    ///
    /// # Panics
    ///
    /// If the object was not created through a stateful descriptor.
    fn set_state(&self, partial: Map<String, Value>) {
        if let Err(err) = apply(self, partial) {
            panic!("set_state(): {err}");
        }
    }

    /// Like [`Stateful::set_state`] but takes any JSON value, rejecting
    /// roots that aren't a mapping.
    fn try_set_state(&self, update: Value) -> Result<(), StateError> {
        apply(self, partial(update)?)
    }

    /// Typed subscription to [`STATE_CHANGED`].
    fn on_state_changed(&self, listener: impl Fn(&StateChanged<Self>) + 'static) -> Handle {
        self.on(STATE_CHANGED, move |ev| {
            if let Some(ev) = ev.downcast_ref::<StateChanged<Self>>() {
                listener(ev);
            }
        })
    }
}

fn apply<T: Stateful>(object: &T, partial: Map<String, Value>) -> Result<(), StateError> {
    let (target, old) = store::lookup(object).ok_or(StateError::Uninitialized)?;
    let state = old.merged(partial);
    store::set(&target, state.clone());
    // The store borrow is released here; listeners may read or write state.
    object.emit(&StateChanged { state, target });
    Ok(())
}

/// Descriptor for stateful objects: `Evented > Stateful`, with an
/// initializer that seeds empty state (plus any `options.state`).
pub fn stateful<T: Stateful>() -> Capability<T, StatefulOptions> {
    Capability::new("Evented")
        .extend("Stateful")
        .init(|instance: &Rc<T>, options: &StatefulOptions| {
            let state = match &options.state {
                Some(seed) => State::empty().merged(seed.clone()),
                None => State::empty(),
            };
            store::set(instance, state);
        })
}
