use rustpython_parser::ast::Stmt;

use crate::builtins;
use crate::dict::AttributeDict;
use crate::frame::FrameStack;
use crate::modules::ModuleTable;
use crate::scope::Scope;
use crate::signal::Signal;
use crate::value::Value;

/// The single mutable evaluator. Owns the frame stack, the module cache, and the
/// built-in registry; everything in `expr.rs`/`stmt.rs`/`call.rs`/`modules.rs` is an
/// `impl Interpreter` method split across those files by concern.
pub struct Interpreter {
    pub(crate) frames: FrameStack,
    pub(crate) modules: ModuleTable,
    pub(crate) current_module: Value,
    pub(crate) builtins: AttributeDict,
    pub(crate) current_exception: Value,
    pub(crate) source_path: String,
    pub(crate) trace: bool,
}

impl Interpreter {
    pub fn new(source_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let module_dict = AttributeDict::new();
        let module = crate::modules::new_module("__main__", &source_path, module_dict.clone());
        let builtins = builtins::registry();
        let mut frames = FrameStack::new();
        frames.push("<module>", Scope::module_scope(module_dict, builtins.clone()));

        Interpreter {
            frames,
            modules: ModuleTable::new(),
            current_module: module,
            builtins,
            current_exception: Value::None,
            source_path,
            trace: std::env::var_os("TRACE").is_some(),
        }
    }

    pub(crate) fn scope(&self) -> &Scope {
        &self.frames.top().scope
    }

    /// Reads a name out of the interpreter's current scope. Meant for embedding and
    /// tests, which need to observe variables a script assigned rather than only its
    /// printed output or exit status.
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.scope().lookup(name)
    }

    /// Runs a module body to completion. `Ok` on normal completion or an explicit
    /// `return` reaching module scope (Python tolerates this at the top level);
    /// `Err` carries the unhandled exception value.
    pub fn run_module(&mut self, body: &[Stmt]) -> Result<(), Value> {
        match self.eval_block(body) {
            Signal::Normal(_) | Signal::Return(_) => Ok(()),
            Signal::Raise(exc) => Err(exc),
            Signal::Break | Signal::Continue => {
                Err(builtins::syntax_error("'break'/'continue' outside loop"))
            }
        }
    }

    pub(crate) fn trace_stmt(&self, stmt: &Stmt) {
        if self.trace {
            eprintln!("*** Evaluating: {stmt:?}");
        }
    }

    /// The exception's own message text, with no class-name prefix — what `raise`
    /// prints to standard output at the moment it fires (see `stmt.rs`'s
    /// `raise_signal`). Falls back to the class name only for an exception carrying no
    /// `message` attribute at all (e.g. one a host-level helper forgot to set).
    pub(crate) fn exception_message(&self, exc: &Value) -> String {
        match exc.get_attr("message") {
            Some(message) => message.stringify(),
            None => match exc.class_of() {
                Some(crate::value::Value::Class(c)) => c.name.clone(),
                _ => exc.type_name().to_string(),
            },
        }
    }

    pub fn describe_exception(&self, exc: &Value) -> String {
        let class_name = match exc.class_of() {
            Some(crate::value::Value::Class(c)) => c.name.clone(),
            _ => exc.type_name().to_string(),
        };
        let message = self.exception_message(exc);
        if message.is_empty() || message == class_name {
            class_name
        } else {
            format!("{class_name}: {message}")
        }
    }

    /// The crate's default exception handler: prints a diagnostic to standard error.
    /// Scenario 3 of the testable end-to-end properties depends on the *raise-time*
    /// print happening separately (see `stmt.rs`'s `raise` handling) — this only fires
    /// once, for whatever reaches all the way back out to `run_module` unhandled.
    pub fn report_unhandled(&self, exc: &Value) {
        eprintln!(
            "Traceback (most recent call last):\n{}",
            self.describe_exception(exc)
        );
    }
}
