//! Lexically nested variable environments.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ctx::Symbol;
use crate::value::Value;

/// One link in the scope chain, mapping names to values.
///
/// Each block scope gets its own environment whose parent is the enclosing
/// scope; the chain ends at the globals.  Children hold the only strong
/// reference to their parent, so the chain is acyclic and a scope's frame is
/// dropped with the last child that can see it.
#[derive(Debug)]
pub struct Env {
    parent: Option<Rc<Env>>,
    bindings: RefCell<HashMap<Symbol, Value>>,
}

impl Env {
    pub fn new() -> Rc<Env> {
        Self::with_parent(None)
    }

    pub fn with_parent(parent: Option<Rc<Env>>) -> Rc<Env> {
        Rc::new(Env {
            parent,
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Binds `sym` in *this* environment, shadowing any enclosing binding.
    /// Redefinition in the same scope overwrites.
    pub fn define(&self, sym: &Symbol, val: Value) {
        self.bindings.borrow_mut().insert(sym.clone(), val);
    }

    /// Overwrites the nearest existing binding for `sym`, walking the chain
    /// outward.  Never creates a binding.
    pub fn assign(&self, sym: &Symbol, val: Value) -> Result<(), ()> {
        if self.bindings.borrow().contains_key(sym) {
            self.bindings.borrow_mut().insert(sym.clone(), val);
            Ok(())
        } else if let Some(parent) = self.parent.as_ref() {
            parent.assign(sym, val)
        } else {
            Err(())
        }
    }

    /// Looks `sym` up, walking the chain from the innermost scope outward.
    pub fn get(&self, sym: &Symbol) -> Option<Value> {
        match self.bindings.borrow().get(sym) {
            Some(v) => Some(v.clone()),
            None => self.parent.as_ref().and_then(|p| p.get(sym)),
        }
    }
}
