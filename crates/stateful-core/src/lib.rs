//! # Private state, merges, and change events
//!
//! `stateful-core` gives composed objects private state that outside code
//! can read but never write directly. There are three main pieces:
//!
//! - [`Capability`] — a descriptor of layered capabilities plus ordered
//!   construction-time initializers.
//! - [`Evented`] — `emit` / `on` over an [`Emitter`] owned by the object.
//! - [`Stateful`] — `state()` and `set_state(partial)`, backed by a
//!   private, identity-keyed store.
//!
//! ## Composing a stateful object
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use serde_json::json;
//! use stateful_core::*;
//!
//! struct Toggle {
//!     events: Emitter,
//! }
//! impl Evented for Toggle {
//!     fn emitter(&self) -> &Emitter {
//!         &self.events
//!     }
//! }
//! impl Stateful for Toggle {}
//!
//! let toggle = stateful::<Toggle>().create_default(Toggle { events: Emitter::new() });
//! assert!(toggle.state().is_empty());
//!
//! let seen = Rc::new(Cell::new(false));
//! toggle.on_state_changed({
//!     let seen = seen.clone();
//!     move |ev| seen.set(ev.state.get("on") == Some(&json!(true)))
//! });
//!
//! toggle.try_set_state(json!({ "on": true })).unwrap();
//! assert!(seen.get());
//! ```
//!
//! ## Merging
//!
//! `set_state` deep-merges: nested mappings are merged key by key, anything
//! else (numbers, strings, arrays, `null`) replaces the old value outright.
//! Previously returned [`State`] snapshots never change.
//!
//! ## Identity and lifetime
//!
//! State lives in a per-thread side table keyed by the address of the
//! instance's `Rc` allocation. The table only holds `Weak` references, so
//! dropping the last `Rc` is all it takes to end an object's state.
//!
//! ## Known limitations
//!
//! Everything here is `!Send`: one thread owns a set of stateful objects,
//! as in a UI event loop. Panics raised by listeners propagate out of
//! `set_state`; by then the new state is already stored.

pub mod compose;
pub mod error;
pub mod evented;
pub mod merge;
pub mod prelude;
pub mod state;
pub mod stateful;
mod store;

pub use compose::*;
pub use error::*;
pub use evented::*;
pub use merge::*;
pub use state::*;
pub use stateful::*;
