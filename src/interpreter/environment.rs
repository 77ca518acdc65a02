use super::error::RuntimeErrorKind;
use super::native::NativeClock;
use super::value::{LoxValue, NativeFunction};
use crate::string::{Ident, IdentName};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A handle to one scope in the chain. Clones share the same scope.
#[derive(Clone)]
pub struct Environment {
    inner: Rc<RefCell<Scope>>,
}

struct Scope {
    values: HashMap<IdentName, LoxValue>,
    parent: Option<Environment>,
}

impl Environment {
    /// An empty root scope.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    /// A root scope holding the native functions.
    pub fn with_natives() -> Self {
        let globals = Self::new();
        let natives: [Rc<dyn NativeFunction>; 1] = [Rc::new(NativeClock)];
        for native in natives {
            globals.define(native.get_name(), LoxValue::NativeFunction(native));
        }
        globals
    }

    fn with_parent(parent: Option<Environment>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Scope {
                values: HashMap::new(),
                parent,
            })),
        }
    }

    pub fn new_scope(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    /// Binds `name` in this scope, replacing any earlier binding here.
    pub fn define(&self, name: &str, value: LoxValue) {
        self.inner.borrow_mut().values.insert(name.into(), value);
    }

    /// Looks `name` up from this scope outward.
    pub fn get(&self, name: &Ident) -> Result<LoxValue, RuntimeErrorKind> {
        let mut current = self.clone();
        loop {
            let next = {
                let scope = current.inner.borrow();
                if let Some(value) = scope.values.get(&name.name) {
                    return Ok(value.clone());
                }
                scope.parent.clone()
            };
            match next {
                Some(parent) => current = parent,
                None => return Err(RuntimeErrorKind::UndefinedVariable(name.name.clone())),
            }
        }
    }

    /// Overwrites the nearest existing binding of `name`. Never creates one.
    pub fn assign(&self, name: &Ident, value: LoxValue) -> Result<(), RuntimeErrorKind> {
        let mut current = self.clone();
        loop {
            let next = {
                let mut scope = current.inner.borrow_mut();
                if let Some(slot) = scope.values.get_mut(&name.name) {
                    *slot = value;
                    return Ok(());
                }
                scope.parent.clone()
            };
            match next {
                Some(parent) => current = parent,
                None => return Err(RuntimeErrorKind::UndefinedVariable(name.name.clone())),
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = self.inner.borrow();
        let mut names: Vec<&str> = scope.values.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Ident {
        Ident::new(name, 1)
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let outer = Environment::new();
        outer.define("x", LoxValue::Number(1.0));
        let inner = outer.new_scope();
        inner.define("x", LoxValue::Number(2.0));

        assert!(matches!(inner.get(&ident("x")), Ok(LoxValue::Number(v)) if v == 2.0));
        assert!(matches!(outer.get(&ident("x")), Ok(LoxValue::Number(v)) if v == 1.0));
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let outer = Environment::new();
        outer.define("x", LoxValue::Number(1.0));
        let inner = outer.new_scope();
        inner
            .assign(&ident("x"), LoxValue::Number(3.0))
            .expect("x is bound in the parent");

        assert!(matches!(outer.get(&ident("x")), Ok(LoxValue::Number(v)) if v == 3.0));
    }

    #[test]
    fn assign_never_creates_a_binding() {
        let env = Environment::new();
        assert_eq!(
            env.assign(&ident("y"), LoxValue::Nil),
            Err(RuntimeErrorKind::UndefinedVariable("y".into()))
        );
        assert!(env.get(&ident("y")).is_err());
    }

    #[test]
    fn redefinition_replaces() {
        let env = Environment::new();
        env.define("a", LoxValue::Number(1.0));
        env.define("a", LoxValue::Bool(true));
        assert!(matches!(env.get(&ident("a")), Ok(LoxValue::Bool(true))));
    }

    #[test]
    fn natives_are_bound_in_root() {
        let env = Environment::with_natives();
        assert!(matches!(
            env.new_scope().get(&ident("clock")),
            Ok(LoxValue::NativeFunction(_))
        ));
    }
}
