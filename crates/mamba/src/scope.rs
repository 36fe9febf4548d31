use crate::dict::AttributeDict;
use crate::value::Value;

/// Which dict a name write targets: the innermost function-local dict, or the
/// enclosing module dict. At module top level `local` and `module` are the same
/// `AttributeDict`, so the distinction only matters inside a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Local,
    Module,
}

/// The name-resolution triple in effect during evaluation of one statement or
/// expression: the innermost writable dict, the enclosing module dict, and the
/// read-only built-in registry, plus which of the first two writes currently target.
#[derive(Debug, Clone)]
pub struct Scope {
    pub local: AttributeDict,
    pub module: AttributeDict,
    pub builtin: AttributeDict,
    pub active: ScopeKind,
}

impl Scope {
    /// A fresh module-top-level scope: `local` and `module` alias the same dict.
    pub fn module_scope(module_dict: AttributeDict, builtin: AttributeDict) -> Self {
        Scope {
            local: module_dict.clone(),
            module: module_dict,
            builtin,
            active: ScopeKind::Module,
        }
    }

    /// A fresh function-call scope: a brand new local dict, sharing this scope's
    /// module dict and builtins.
    pub fn function_scope(&self, locals: AttributeDict) -> Self {
        Scope {
            local: locals,
            module: self.module.clone(),
            builtin: self.builtin.clone(),
            active: ScopeKind::Local,
        }
    }

    /// A class-body scope: writes land in the class's own dict, reads still fall
    /// through to the enclosing module and builtins.
    pub fn class_body_scope(&self, class_dict: AttributeDict) -> Self {
        Scope {
            local: class_dict,
            module: self.module.clone(),
            builtin: self.builtin.clone(),
            active: ScopeKind::Local,
        }
    }

    /// The dict that `bind`/`unbind` write to.
    fn writable(&self) -> &AttributeDict {
        match self.active {
            ScopeKind::Local => &self.local,
            ScopeKind::Module => &self.module,
        }
    }

    pub fn bind(&self, name: &str, value: Value) {
        self.writable().set(name, value);
    }

    /// Copies every pair of `dict` into the active writable dict (glob import).
    pub fn bind_all(&self, dict: &AttributeDict) {
        self.writable().extend_from(dict);
    }

    /// Deletes `name` from the active writable dict. Returns `false` if absent.
    pub fn unbind(&self, name: &str) -> bool {
        self.writable().delete(name)
    }

    /// `local` -> `module` -> `builtin`, first hit wins.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.local
            .get(name)
            .or_else(|| self.module.get(name))
            .or_else(|| self.builtin.get(name))
    }
}
