//! The statement evaluator and non-local control-flow core.
//!
//! Every statement-evaluating method returns a [`Signal`]. `while`, `try`, and
//! function calls (in `call.rs`) are the only places that intercept one; everywhere
//! else a non-`Normal` signal is propagated to the caller unchanged.

use std::rc::Rc;

use rustpython_parser::ast::{Expr, Stmt};

use crate::builtins;
use crate::dict::AttributeDict;
use crate::expr::normalize_index;
use crate::signal::Signal;
use crate::state::Interpreter;
use crate::value::{ClassData, FunctionData, Value};

impl Interpreter {
    /// Evaluates a sequence of statements. Stops at the first non-`Normal` signal.
    pub(crate) fn eval_block(&mut self, body: &[Stmt]) -> Signal {
        let mut last = Value::None;
        for stmt in body {
            match self.eval_stmt(stmt) {
                Signal::Normal(v) => last = v,
                other => return other,
            }
        }
        Signal::Normal(last)
    }

    fn raise_signal(&mut self, exc: Value) -> Signal {
        // The exception's own message prints to standard output at raise time, in
        // addition to whatever eventually handles (or fails to handle) it.
        println!("{}", self.exception_message(&exc));
        self.current_exception = exc.clone();
        Signal::Raise(exc)
    }

    pub(crate) fn eval_stmt(&mut self, stmt: &Stmt) -> Signal {
        self.trace_stmt(stmt);
        match stmt {
            Stmt::Expr(e) => match self.eval_expr(&e.value) {
                Ok(v) => Signal::Normal(v),
                Err(exc) => self.raise_signal(exc),
            },

            Stmt::Assign(assign) => {
                let value = match self.eval_expr(&assign.value) {
                    Ok(v) => v,
                    Err(exc) => return self.raise_signal(exc),
                };
                for target in &assign.targets {
                    if let Err(exc) = self.assign_target(target, value.clone()) {
                        return self.raise_signal(exc);
                    }
                }
                Signal::unit()
            }

            Stmt::AugAssign(aug) => {
                let current = match self.eval_expr(&aug.target) {
                    Ok(v) => v,
                    Err(exc) => return self.raise_signal(exc),
                };
                let rhs = match self.eval_expr(&aug.value) {
                    Ok(v) => v,
                    Err(exc) => return self.raise_signal(exc),
                };
                let result = match crate::ops::binop(&aug.op, &current, &rhs) {
                    Ok(v) => v,
                    Err(exc) => return self.raise_signal(exc),
                };
                if let Err(exc) = self.assign_target(&aug.target, result) {
                    return self.raise_signal(exc);
                }
                Signal::unit()
            }

            Stmt::If(if_stmt) => match self.eval_expr(&if_stmt.test) {
                Ok(test) => {
                    if test.is_truthy() {
                        self.eval_block(&if_stmt.body)
                    } else {
                        self.eval_block(&if_stmt.orelse)
                    }
                }
                Err(exc) => self.raise_signal(exc),
            },

            Stmt::While(while_stmt) => self.eval_while(while_stmt),

            Stmt::Try(try_stmt) => self.eval_try(try_stmt),

            Stmt::Raise(raise_stmt) => self.eval_raise(raise_stmt),

            Stmt::Return(ret) => {
                let value = match &ret.value {
                    Some(e) => match self.eval_expr(e) {
                        Ok(v) => v,
                        Err(exc) => return self.raise_signal(exc),
                    },
                    None => Value::None,
                };
                Signal::Return(value)
            }

            Stmt::Break(_) => Signal::Break,
            Stmt::Continue(_) => Signal::Continue,
            Stmt::Pass(_) => Signal::unit(),

            Stmt::Assert(assert_stmt) => {
                let test = match self.eval_expr(&assert_stmt.test) {
                    Ok(v) => v,
                    Err(exc) => return self.raise_signal(exc),
                };
                if test.is_truthy() {
                    return Signal::unit();
                }
                let message = match &assert_stmt.msg {
                    Some(e) => match self.eval_expr(e) {
                        Ok(v) => v.stringify(),
                        Err(exc) => return self.raise_signal(exc),
                    },
                    None => String::new(),
                };
                self.raise_signal(builtins::assertion_error(message))
            }

            Stmt::Delete(del) => {
                for target in &del.targets {
                    let Expr::Name(name) = target else {
                        return self.raise_signal(builtins::syntax_error("invalid del target"));
                    };
                    if !self.scope().unbind(name.id.as_str()) {
                        return self
                            .raise_signal(builtins::name_error(format!("name '{}' is not defined", name.id)));
                    }
                }
                Signal::unit()
            }

            Stmt::FunctionDef(def) => {
                let params = def
                    .args
                    .args
                    .iter()
                    .map(|a| a.def.arg.to_string())
                    .collect::<Vec<_>>();
                let func = Value::Function(Rc::new(FunctionData {
                    name: def.name.to_string(),
                    params,
                    body: def.body.clone(),
                }));
                self.scope().bind(def.name.as_str(), func);
                Signal::unit()
            }

            Stmt::ClassDef(def) => self.eval_class_def(def),

            Stmt::Import(import) => {
                for alias in &import.names {
                    let module = match self.load_module(alias.name.as_str()) {
                        Ok(m) => m,
                        Err(exc) => return self.raise_signal(exc),
                    };
                    let bind_name = alias
                        .asname
                        .as_ref()
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| alias.name.to_string());
                    self.scope().bind(&bind_name, module);
                }
                Signal::unit()
            }

            Stmt::ImportFrom(import) => {
                let Some(module_name) = &import.module else {
                    return self.raise_signal(builtins::not_implemented_error("relative imports"));
                };
                let module = match self.load_module(module_name.as_str()) {
                    Ok(m) => m,
                    Err(exc) => return self.raise_signal(exc),
                };
                let is_glob = import.names.len() == 1 && import.names[0].name.as_str() == "*";
                if !is_glob {
                    return self.raise_signal(builtins::not_implemented_error(
                        "selective 'from ... import name' (only 'import *' is supported)",
                    ));
                }
                let Value::Module(m) = &module else {
                    return self.raise_signal(builtins::system_error("loaded module was not a module value"));
                };
                self.scope().bind_all(&m.dict);
                Signal::unit()
            }

            Stmt::For(_) | Stmt::With(_) | Stmt::Global(_) | Stmt::Nonlocal(_) => {
                self.raise_signal(builtins::not_implemented_error(format!(
                    "statement {:?}",
                    std::mem::discriminant(stmt)
                )))
            }

            other => self.raise_signal(builtins::not_implemented_error(format!(
                "statement {:?}",
                std::mem::discriminant(other)
            ))),
        }
    }

    fn eval_while(&mut self, while_stmt: &rustpython_parser::ast::StmtWhile) -> Signal {
        let depth = self.frames.depth();
        loop {
            let test = match self.eval_expr(&while_stmt.test) {
                Ok(v) => v,
                Err(exc) => {
                    self.frames.unwind_to(depth);
                    return self.raise_signal(exc);
                }
            };
            if !test.is_truthy() {
                let result = self.eval_block(&while_stmt.orelse);
                self.frames.unwind_to(depth);
                return result;
            }
            match self.eval_block(&while_stmt.body) {
                Signal::Normal(_) | Signal::Continue => continue,
                Signal::Break => {
                    self.frames.unwind_to(depth);
                    return Signal::unit();
                }
                other @ (Signal::Return(_) | Signal::Raise(_)) => {
                    self.frames.unwind_to(depth);
                    return other;
                }
            }
        }
    }

    fn eval_raise(&mut self, raise_stmt: &rustpython_parser::ast::StmtRaise) -> Signal {
        let Some(exc_expr) = &raise_stmt.exc else {
            return match &self.current_exception {
                Value::None => self.raise_signal(builtins::runtime_error("No active exception to reraise")),
                exc => {
                    let exc = exc.clone();
                    self.raise_signal(exc)
                }
            };
        };
        let exc = match self.eval_expr(exc_expr) {
            Ok(v) => v,
            Err(exc) => return self.raise_signal(exc),
        };
        let base_exception = self.builtins.get("BaseException");
        let is_exception = base_exception
            .as_ref()
            .is_some_and(|base| exc.class_of().is_some_and(|c| c.is_subclass(base)));
        if !is_exception {
            return self.raise_signal(builtins::type_error(format!(
                "exceptions must derive from BaseException, got '{}'",
                exc.type_name()
            )));
        }
        self.raise_signal(exc)
    }

    fn eval_try(&mut self, try_stmt: &rustpython_parser::ast::StmtTry) -> Signal {
        let depth = self.frames.depth();
        let body_signal = self.eval_block(&try_stmt.body);
        self.frames.unwind_to(depth);

        let pending = match body_signal {
            Signal::Normal(v) => {
                if try_stmt.orelse.is_empty() {
                    Signal::Normal(v)
                } else {
                    let result = self.eval_block(&try_stmt.orelse);
                    self.frames.unwind_to(depth);
                    result
                }
            }
            Signal::Raise(exc) => self.dispatch_except(&try_stmt.handlers, exc, depth),
            other => other,
        };

        if try_stmt.finalbody.is_empty() {
            return pending;
        }
        let finally_signal = self.eval_block(&try_stmt.finalbody);
        self.frames.unwind_to(depth);
        match finally_signal {
            Signal::Normal(_) => pending,
            other => other,
        }
    }

    fn dispatch_except(
        &mut self,
        handlers: &[rustpython_parser::ast::ExceptHandler],
        exc: Value,
        depth: usize,
    ) -> Signal {
        for handler in handlers {
            let rustpython_parser::ast::ExceptHandler::ExceptHandler(handler) = handler;
            let matches = match &handler.type_ {
                None => true,
                Some(type_expr) => match self.eval_expr(type_expr) {
                    Ok(class) => exc.class_of().is_some_and(|c| c.is_subclass(&class)),
                    Err(err) => return self.raise_signal(err),
                },
            };
            if !matches {
                continue;
            }
            if let Some(name) = &handler.name {
                self.scope().bind(name.as_str(), exc.clone());
            }
            let previous_exception = std::mem::replace(&mut self.current_exception, exc.clone());
            let result = self.eval_block(&handler.body);
            self.frames.unwind_to(depth);
            self.current_exception = previous_exception;
            return result;
        }
        Signal::Raise(exc)
    }

    fn eval_class_def(&mut self, def: &rustpython_parser::ast::StmtClassDef) -> Signal {
        let mut bases = Vec::with_capacity(def.bases.len());
        for base_expr in &def.bases {
            match self.eval_expr(base_expr) {
                Ok(v) => bases.push(v),
                Err(exc) => return self.raise_signal(exc),
            }
        }

        let class_dict = AttributeDict::new();
        let scope = self.scope().class_body_scope(class_dict.clone());
        self.frames.push(def.name.to_string(), scope);
        let depth = self.frames.depth();
        let body_signal = self.eval_block(&def.body);
        self.frames.unwind_to(depth - 1);

        if let Signal::Raise(exc) = body_signal {
            return Signal::Raise(exc);
        }

        let class = Value::Class(Rc::new(ClassData {
            name: def.name.to_string(),
            bases,
            dict: class_dict,
        }));
        self.scope().bind(def.name.as_str(), class);
        Signal::unit()
    }

    fn assign_target(&mut self, target: &Expr, value: Value) -> Result<(), Value> {
        match target {
            Expr::Name(name) => {
                self.scope().bind(name.id.as_str(), value);
                Ok(())
            }
            Expr::Attribute(attr) => {
                let receiver = self.eval_expr(&attr.value)?;
                if !receiver.set_attr(attr.attr.as_str(), value) {
                    return Err(builtins::attribute_error(format!(
                        "'{}' object has no attribute '{}'",
                        receiver.type_name(),
                        attr.attr
                    )));
                }
                Ok(())
            }
            Expr::Subscript(sub) => {
                let container = self.eval_expr(&sub.value)?;
                let index = self.eval_expr(&sub.slice)?;
                match (&container, &index) {
                    (Value::List(items), Value::Int(i)) => {
                        let mut items = items.borrow_mut();
                        let len = items.len();
                        let idx = normalize_index(i, len)
                            .ok_or_else(|| builtins::index_error("list assignment index out of range"))?;
                        items[idx] = value;
                        Ok(())
                    }
                    _ => Err(builtins::type_error(format!(
                        "'{}' object does not support item assignment",
                        container.type_name()
                    ))),
                }
            }
            _ => Err(builtins::syntax_error("invalid assignment target")),
        }
    }
}
