//! # Capability descriptors
//!
//! A [`Capability`] names the behaviors layered onto a type and the ordered
//! initializers that run when an instance is created. Behavior itself lives
//! in traits (`Evented`, `Stateful`) implemented for the instance type; the
//! descriptor is what guarantees their setup has run before anyone else can
//! touch the instance.
//!
//! ```rust
//! use std::rc::Rc;
//! use stateful_core::*;
//!
//! struct Widget {
//!     events: Emitter,
//! }
//! impl Evented for Widget {
//!     fn emitter(&self) -> &Emitter {
//!         &self.events
//!     }
//! }
//! impl Stateful for Widget {}
//!
//! let factory = stateful::<Widget>().extend("Widget").init(|w, _| {
//!     w.set_state(partial(serde_json::json!({ "ready": true })).unwrap());
//! });
//! let w: Rc<Widget> = factory.create_default(Widget { events: Emitter::new() });
//! assert_eq!(w.state().get("ready"), Some(&serde_json::json!(true)));
//! assert_eq!(factory.names(), &["Evented", "Stateful", "Widget"]);
//! ```

use std::rc::Rc;

use smallvec::SmallVec;

pub type Initializer<T, O> = Rc<dyn Fn(&Rc<T>, &O)>;

/// Descriptor of a composed type: capability names plus initializers.
///
/// `extend` and `init` never modify `self`; they return a new descriptor, so
/// a base can be shared and specialised in several directions.
pub struct Capability<T: 'static, O: 'static = ()> {
    names: SmallVec<[&'static str; 4]>,
    initializers: Vec<Initializer<T, O>>,
}

impl<T: 'static, O: 'static> Clone for Capability<T, O> {
    fn clone(&self) -> Self {
        Self {
            names: self.names.clone(),
            initializers: self.initializers.clone(),
        }
    }
}

impl<T: 'static, O: 'static> Capability<T, O> {
    /// Base descriptor with a single name and no initializers.
    pub fn new(name: &'static str) -> Self {
        let mut names = SmallVec::new();
        names.push(name);
        Self {
            names,
            initializers: Vec::new(),
        }
    }

    /// Layers another named capability on top of this one.
    pub fn extend(&self, name: &'static str) -> Self {
        let mut next = self.clone();
        if next.names.contains(&name) {
            log::warn!("capability '{name}' layered twice");
        }
        next.names.push(name);
        log::debug!("capability: {}", next.names.join(" > "));
        next
    }

    /// Registers `f` to run at construction, after every initializer
    /// registered before it.
    pub fn init(&self, f: impl Fn(&Rc<T>, &O) + 'static) -> Self {
        let mut next = self.clone();
        next.initializers.push(Rc::new(f));
        next
    }

    /// Wraps `value` and runs the initializers in registration order.
    pub fn create(&self, value: T, options: O) -> Rc<T> {
        let instance = Rc::new(value);
        log::debug!(
            "create {} ({} initializer(s))",
            self.names.last().copied().unwrap_or("?"),
            self.initializers.len()
        );
        for init in &self.initializers {
            init(&instance, &options);
        }
        instance
    }

    pub fn create_default(&self, value: T) -> Rc<T>
    where
        O: Default,
    {
        self.create(value, O::default())
    }

    /// Capability names, base first.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn has(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn initializers_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let cap = {
            let (a, b) = (log.clone(), log.clone());
            Capability::<u8>::new("Base")
                .init(move |_, _| a.borrow_mut().push("first"))
                .extend("Child")
                .init(move |_, _| b.borrow_mut().push("second"))
        };
        cap.create(0, ());
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn extend_does_not_touch_the_base() {
        let base = Capability::<u8>::new("Base");
        let child = base.extend("Child").init(|_, _| {});
        assert_eq!(base.names(), &["Base"]);
        assert_eq!(child.names(), &["Base", "Child"]);
        assert!(child.has("Child"));
        assert!(!base.has("Child"));
    }

    #[test]
    fn initializers_see_options() {
        let seen = Rc::new(RefCell::new(0u32));
        let cap = {
            let seen = seen.clone();
            Capability::<(), u32>::new("Base").init(move |_, opt| *seen.borrow_mut() = *opt)
        };
        cap.create((), 7);
        assert_eq!(*seen.borrow(), 7);
    }

    #[test]
    fn each_create_runs_initializers_again() {
        let count = Rc::new(RefCell::new(0));
        let cap = {
            let count = count.clone();
            Capability::<()>::new("Base").init(move |_, _| *count.borrow_mut() += 1)
        };
        let a = cap.create_default(());
        let b = cap.create_default(());
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(*count.borrow(), 2);
    }
}
