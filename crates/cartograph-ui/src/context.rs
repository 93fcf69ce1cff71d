//! Values shared from an ancestor widget to its descendants.
//!
//! A [`Context`] is a chain of type-keyed scopes. The scene owns the root
//! scope; a widget that wants to share something builds a child scope with
//! [`Context::child`], provides values into it, and hands it to its children
//! during `mount` / `commit`. Lookups walk towards the root, so the nearest
//! provider wins.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

pub struct Context<'a> {
    parent: Option<&'a Context<'a>>,
    values: HashMap<TypeId, Rc<dyn Any>>,
}

impl Context<'static> {
    /// A scope with no parent.
    pub fn root() -> Self {
        Self { parent: None, values: HashMap::new() }
    }
}

impl<'a> Context<'a> {
    /// A new, empty scope whose lookups fall back to `self`.
    pub fn child(&self) -> Context<'_> {
        Context { parent: Some(self), values: HashMap::new() }
    }

    /// Provide `value` to this scope, shadowing any ancestor's value of the same type.
    pub fn provide<T: 'static>(&mut self, value: T) -> &mut Self {
        self.provide_rc(Rc::new(value))
    }

    /// Like [`provide`](Self::provide), for a value that is already shared.
    pub fn provide_rc<T: 'static>(&mut self, value: Rc<T>) -> &mut Self {
        self.values.insert(TypeId::of::<T>(), value);
        self
    }

    /// The nearest value of type `T`, if any scope up the chain provides one.
    pub fn get<T: 'static>(&self) -> Option<Rc<T>> {
        match self.values.get(&TypeId::of::<T>()) {
            Some(value) => value.clone().downcast::<T>().ok(),
            None => self.parent.and_then(|p| p.get::<T>()),
        }
    }

    /// `true` if `T` is provided anywhere up the chain.
    pub fn has<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
            || self.parent.is_some_and(|p| p.has::<T>())
    }
}
