use crate::object::Object;
use gc::{Finalize, Gc, GcCell, Trace};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default, Trace, Finalize)]
struct EnvironmentCore {
    store: HashMap<Rc<str>, Gc<Object>>,
    outer: Option<Environment>,
}

/// A scope in the chain of lexical scopes.
///
/// Cloning an `Environment` shares the scope rather than copying it. A
/// closure holds such a clone, which keeps the scope it was defined in alive
/// for as long as the closure exists. A scope that only stays reachable
/// through closures stored inside itself is reclaimed by the collector.
#[derive(Clone, Trace, Finalize)]
pub struct Environment {
    environment: Gc<GcCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore::default())),
        }
    }

    pub fn new_enclosed(outer: &Environment) -> Environment {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: Some(outer.clone()),
            })),
        }
    }

    /// Looks `key` up in this scope, then in each enclosing scope in turn.
    pub fn get(&self, key: &str) -> Option<Gc<Object>> {
        let mut current = self.clone();
        loop {
            let env = current.environment.borrow();
            if let Some(value) = env.store.get(key) {
                return Some(value.clone());
            }
            let outer = env.outer.clone()?;
            drop(env);
            current = outer;
        }
    }

    /// Binds `key` in this scope only, shadowing any outer binding.
    pub fn set(&self, key: Rc<str>, value: Gc<Object>) {
        self.environment.borrow_mut().store.insert(key, value);
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Gc::ptr_eq(&self.environment, &other.environment)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env = self.environment.borrow();
        let mut names: Vec<&str> = env.store.keys().map(|name| name.as_ref()).collect();
        names.sort_unstable();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("outer", &env.outer)
            .finish()
    }
}
