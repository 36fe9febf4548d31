//! mamba - a tree-walking interpreter for a small, Python-like scripting language
//!
//! mamba evaluates an AST produced by `rustpython_parser` directly; it performs no
//! lexing or parsing of its own. The core concern of this crate is the statement and
//! expression evaluator and its non-local control-flow machinery (`return`, `break`,
//! `continue`, `raise`/`try`/`except`/`finally`), plus the object/scope model that
//! control-flow correctness depends on.
//!
//! # Quick Start
//!
//! ```no_run
//! use mamba::interpret;
//!
//! let status = interpret("script.py", "print(1 + 2)");
//! std::process::exit(status);
//! ```
//!
//! # Supported language features
//!
//! ## Types
//! - `None`, `bool`, `int` (arbitrary precision), `float`, `str`
//! - `list`, `tuple`, `slice`
//! - `class` / instance objects with multiple inheritance
//! - functions (no closures: free variables resolve against the call-time scope)
//!
//! ## Control flow
//! - `if`/`elif`/`else`
//! - `while`/`else`
//! - `try`/`except`/`else`/`finally`, `raise`, bare re-raise
//! - `return`, `break`, `continue`
//!
//! ## Not supported
//! - `for` loops, `with`, `global`/`nonlocal`, lambdas, generators, comprehensions
//! - keyword arguments, default arguments, `*args`/`**kwargs`
//! - bytecode compilation or a JIT

mod builtins;
mod call;
mod dict;
mod error;
mod expr;
mod frame;
mod modules;
mod ops;
mod scope;
mod signal;
mod state;
mod stmt;
mod value;

pub use dict::AttributeDict;
pub use error::{Error, Result};
pub use scope::{Scope, ScopeKind};
pub use state::Interpreter;
pub use value::Value;

use rustpython_parser::ast::Mod;
use rustpython_parser::{Mode, parse};

/// Parses `code` (attributed to `path` for diagnostics) and runs it to completion.
///
/// Returns the process exit status: `0` on success, non-zero if the program raised
/// an exception that reached module scope unhandled, or if the source could not be
/// parsed.
pub fn interpret(path: &str, code: &str) -> i32 {
    let module = match parse(code, Mode::Module, path) {
        Ok(Mod::Module(m)) => m,
        Ok(_) => {
            eprintln!("mamba: {path}: expected a module");
            return 1;
        }
        Err(err) => {
            eprintln!("mamba: {path}: syntax error: {err}");
            return 1;
        }
    };

    let mut interp = Interpreter::new(path);
    match interp.run_module(&module.body) {
        Ok(()) => 0,
        Err(exc) => {
            interp.report_unhandled(&exc);
            1
        }
    }
}

/// Parses and runs `code` in a fresh [`Interpreter`], returning it on success so the
/// caller can inspect module-level names it bound via [`Interpreter::get_global`].
/// Used by embedders and by this crate's own integration tests, which need to observe
/// variables a script assigned rather than only its printed output or exit status.
pub fn run(path: &str, code: &str) -> Result<Interpreter> {
    let module = match parse(code, Mode::Module, path) {
        Ok(Mod::Module(m)) => m,
        Ok(_) => return Err(Error::Parse(format!("{path}: expected a module"))),
        Err(err) => return Err(Error::Parse(format!("{path}: {err}"))),
    };
    let mut interp = Interpreter::new(path);
    interp
        .run_module(&module.body)
        .map_err(|exc| Error::Unhandled(interp.describe_exception(&exc)))?;
    Ok(interp)
}
