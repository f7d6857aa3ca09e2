pub use crate::compose::Capability;
pub use crate::error::StateError;
pub use crate::evented::{Emitter, EventObject, Evented, Handle};
pub use crate::state::{State, StatefulOptions, partial};
pub use crate::stateful::{STATE_CHANGED, StateChanged, Stateful, stateful};
