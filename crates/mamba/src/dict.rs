use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

/// A mutable, insertion-ordered name to value mapping.
///
/// Every namespace in the language — a module, a class body, an instance, a function's
/// locals — is backed by one of these. Cloning an `AttributeDict` clones the handle, not
/// the contents: every clone observes the same mutations, which is what lets a class's
/// `Value::Class` and an instance's `Value::Object` both see edits made through either
/// one.
#[derive(Debug, Clone, Default)]
pub struct AttributeDict(Rc<RefCell<Vec<(String, Value)>>>);

impl AttributeDict {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        Self(Rc::new(RefCell::new(pairs)))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0
            .borrow()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().iter().any(|(k, _)| k == name)
    }

    pub fn set(&self, name: &str, value: Value) {
        let mut entries = self.0.borrow_mut();
        if let Some(slot) = entries.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value;
        } else {
            entries.push((name.to_string(), value));
        }
    }

    /// Removes `name`. Returns `false` if it was not present.
    pub fn delete(&self, name: &str) -> bool {
        let mut entries = self.0.borrow_mut();
        if let Some(pos) = entries.iter().position(|(k, _)| k == name) {
            entries.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn iter(&self) -> Vec<(String, Value)> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Copies every pair of `other` into `self`, overwriting on name collision.
    pub fn extend_from(&self, other: &AttributeDict) {
        for (k, v) in other.iter() {
            self.set(&k, v);
        }
    }
}
