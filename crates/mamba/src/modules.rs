//! Module file discovery, caching, and evaluation.
//!
//! A module is identified by the literal path written in the `import` statement,
//! resolved relative to the importing script's own directory and canonicalized so that
//! two different `import` spellings of the same file share one cached [`Value::Module`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rustpython_parser::ast::Mod;
use rustpython_parser::{Mode, parse};

use crate::builtins;
use crate::dict::AttributeDict;
use crate::scope::Scope;
use crate::signal::Signal;
use crate::state::Interpreter;
use crate::value::{ModuleData, Value};
use std::rc::Rc;

#[derive(Default)]
pub struct ModuleTable {
    by_path: HashMap<PathBuf, Value>,
}

impl ModuleTable {
    pub fn new() -> Self {
        ModuleTable::default()
    }
}

pub fn new_module(name: &str, path: &str, dict: AttributeDict) -> Value {
    Value::Module(Rc::new(ModuleData {
        name: name.to_string(),
        path: path.to_string(),
        dict,
    }))
}

fn module_file_path(base: &Path, import_name: &str) -> PathBuf {
    let relative = import_name.replace('.', "/");
    base.with_file_name(format!("{relative}.py"))
}

impl Interpreter {
    /// Loads (or returns the cached) module named by `import_name`, relative to the
    /// currently executing source file.
    pub(crate) fn load_module(&mut self, import_name: &str) -> Result<Value, Value> {
        let base = Path::new(&self.source_path);
        let file_path = module_file_path(base, import_name);
        let canonical = file_path
            .canonicalize()
            .unwrap_or_else(|_| file_path.clone());

        if let Some(module) = self.modules.by_path.get(&canonical) {
            return Ok(module.clone());
        }

        let source = std::fs::read_to_string(&file_path).map_err(|err| {
            builtins::runtime_error(format!(
                "no module named '{import_name}' ({}: {err})",
                file_path.display()
            ))
        })?;

        let parsed = parse(&source, Mode::Module, &file_path.to_string_lossy())
            .map_err(|err| builtins::syntax_error(format!("{import_name}: {err}")))?;
        let Mod::Module(module) = parsed else {
            return Err(builtins::syntax_error(format!("{import_name}: expected a module")));
        };

        let module_dict = AttributeDict::new();
        let module_value = new_module(import_name, &file_path.to_string_lossy(), module_dict.clone());
        // Insert before evaluating so a module that imports itself (directly or via a
        // cycle) observes a partially-populated module rather than recursing forever.
        self.modules.by_path.insert(canonical, module_value.clone());

        let previous_path = std::mem::replace(&mut self.source_path, file_path.to_string_lossy().into_owned());
        self.frames
            .push(import_name, Scope::module_scope(module_dict, self.builtins.clone()));
        let result = self.eval_block(&module.body);
        self.frames.unwind_to(self.frames.depth() - 1);
        self.source_path = previous_path;

        match result {
            Signal::Normal(_) | Signal::Return(_) => Ok(module_value),
            Signal::Raise(exc) => Err(exc),
            Signal::Break | Signal::Continue => {
                Err(builtins::syntax_error("'break'/'continue' outside loop"))
            }
        }
    }
}
