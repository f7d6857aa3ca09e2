use thiserror::Error;

/// Failures surfaced by the fallible state accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The object never went through a stateful initializer, so the private
    /// store has no entry for it.
    #[error("object has no private state; it was not created through a stateful capability")]
    Uninitialized,
    /// A partial update whose root is not a mapping of fields.
    #[error("partial state must be a tree of fields, found {found}")]
    NotATree { found: &'static str },
}
