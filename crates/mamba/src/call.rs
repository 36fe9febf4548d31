//! Uniform invocation across user functions, built-ins, and class instantiation.

use std::rc::Rc;

use crate::builtins;
use crate::dict::AttributeDict;
use crate::signal::Signal;
use crate::state::Interpreter;
use crate::value::{ObjectData, Value};

impl Interpreter {
    /// Calls `callee` with already-evaluated `args`. `args[0]` is the receiver for a
    /// bound method call (prepended by the caller in `expr.rs` for `Object` receivers,
    /// never for `Module` receivers — this asymmetry is intentional, see `SPEC_FULL.md`
    /// §4.4).
    pub(crate) fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, Value> {
        match callee {
            Value::Class(_) => self.instantiate(callee, args),
            Value::BuiltinFn(name) => builtins::call(name, args),
            Value::Function(func) => {
                if func.params.len() != args.len() {
                    return Err(builtins::type_error(format!(
                        "{}() takes exactly {} arguments ({} given)",
                        func.name,
                        func.params.len(),
                        args.len()
                    )));
                }

                let locals = AttributeDict::new();
                for (param, value) in func.params.iter().zip(args) {
                    locals.set(param, value);
                }

                let scope = self.scope().function_scope(locals);
                let depth = self.frames.depth();
                self.frames.push(func.name.clone(), scope);
                let result = self.eval_block(&func.body);
                self.frames.unwind_to(depth);

                match result {
                    Signal::Normal(_) => Ok(Value::None),
                    Signal::Return(v) => Ok(v),
                    Signal::Raise(exc) => Err(exc),
                    Signal::Break | Signal::Continue => Err(builtins::syntax_error(
                        "'break'/'continue' not allowed inside a function body",
                    )),
                }
            }
            other => Err(builtins::system_error(format!(
                "don't know how to call a value of type '{}'",
                other.type_name()
            ))),
        }
    }

    fn instantiate(&mut self, class: &Value, args: Vec<Value>) -> Result<Value, Value> {
        let instance = Value::Object(Rc::new(ObjectData {
            class: class.clone(),
            dict: AttributeDict::new(),
        }));

        match class.get_attr(builtins::INIT_METHOD) {
            Some(init) => {
                let mut call_args = Vec::with_capacity(args.len() + 1);
                call_args.push(instance.clone());
                call_args.extend(args);
                self.call_value(&init, call_args)?;
            }
            None if builtins::is_builtin_exception_class(class) => {
                builtins::init_exception_instance(&instance, &args);
            }
            None => {}
        }

        Ok(instance)
    }
}
