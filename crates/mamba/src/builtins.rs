//! The built-in function registry and the canonical exception class hierarchy.
//!
//! Every name here is resolved through [`Scope::lookup`](crate::scope::Scope::lookup)'s
//! final, read-only tier. Exception classes are ordinary [`Value::Class`] values so
//! that scripted code can `isinstance`/`except` against them exactly like a
//! user-defined class; the only thing distinguishing them is that they're seeded here
//! instead of by a `class` statement.

use std::rc::Rc;

use num_bigint::BigInt;

use crate::dict::AttributeDict;
use crate::value::{ClassData, Value};

/// Name of the function a class constructor call dispatches to, if present.
pub const INIT_METHOD: &str = "__init__";

fn exception_class(name: &str, base: Option<&Value>) -> Value {
    Value::Class(Rc::new(ClassData {
        name: name.to_string(),
        bases: base.cloned().into_iter().collect(),
        dict: AttributeDict::new(),
    }))
}

/// Builds an instance of `class` carrying a single positional `args` tuple, mirroring
/// `BaseException.__init__(self, *args)`. `message` becomes `args[0]` when non-empty.
fn exception_instance(class: &Value, message: impl Into<String>) -> Value {
    use crate::value::ObjectData;
    let dict = AttributeDict::new();
    let message = message.into();
    dict.set("args", Value::Tuple(Rc::from(vec![Value::str(message.clone())])));
    dict.set("message", Value::str(message));
    Value::Object(Rc::new(ObjectData {
        class: class.clone(),
        dict,
    }))
}

thread_local! {
    // The canonical exception classes, built exactly once per thread. Every raise
    // helper below and every `Interpreter::new` pull class *values* from this same
    // cache (an `AttributeDict` is a shared handle, and `Value::Class` wraps a shared
    // `Rc`), so `except TypeError` always compares against the identical `Rc` that
    // `type_error()` constructed the exception's class from.
    static CLASSES: AttributeDict = build_classes();
}

fn build_classes() -> AttributeDict {
    let dict = AttributeDict::new();

    let base_exception = exception_class("BaseException", None);
    let exception = exception_class("Exception", Some(&base_exception));
    let type_error = exception_class("TypeError", Some(&exception));
    let name_error = exception_class("NameError", Some(&exception));
    let attribute_error = exception_class("AttributeError", Some(&exception));
    let index_error = exception_class("IndexError", Some(&exception));
    let assertion_error = exception_class("AssertionError", Some(&exception));
    let runtime_error = exception_class("RuntimeError", Some(&exception));
    let not_implemented_error = exception_class("NotImplementedError", Some(&runtime_error));
    let system_error = exception_class("SystemError", Some(&exception));
    let syntax_error = exception_class("SyntaxError", Some(&exception));
    let zero_division_error = exception_class("ZeroDivisionError", Some(&runtime_error));

    for (name, class) in [
        ("BaseException", base_exception),
        ("Exception", exception),
        ("TypeError", type_error),
        ("NameError", name_error),
        ("AttributeError", attribute_error),
        ("IndexError", index_error),
        ("AssertionError", assertion_error),
        ("RuntimeError", runtime_error),
        ("NotImplementedError", not_implemented_error),
        ("SystemError", system_error),
        ("SyntaxError", syntax_error),
        ("ZeroDivisionError", zero_division_error),
    ] {
        dict.set(name, class);
    }

    dict
}

/// The full built-in registry: exception classes plus free functions. Returned as a
/// fresh [`AttributeDict`] each time `Interpreter::new` is called; the class values it
/// holds are the same shared `Rc`s every raise helper in this module uses.
pub fn registry() -> AttributeDict {
    let dict = AttributeDict::new();
    CLASSES.with(|classes| dict.extend_from(classes));

    for name in [
        "len", "str", "repr", "int", "float", "bool", "list", "tuple", "print", "abs", "min",
        "max", "sum", "pow", "isinstance", "type",
    ] {
        dict.set(name, Value::BuiltinFn(name));
    }

    dict
}

/// Looks a canonical exception class up by name. Used by the operator/evaluator
/// modules, which need to construct exceptions without holding a reference to the
/// live interpreter's own registry.
fn lookup_class(name: &str) -> Value {
    CLASSES.with(|classes| classes.get(name).expect("builtin exception class must be registered"))
}

/// Is `class` one of the canonical exception classes (or a descendant of one) with no
/// scripted `__init__` of its own? The call dispatcher uses this to give `raise
/// TypeError("x")` the same `BaseException.__init__(self, *args)` behavior a real
/// `TypeError` class body would define, without needing one.
pub fn is_builtin_exception_class(class: &Value) -> bool {
    let base_exception = lookup_class("BaseException");
    class.is_subclass(&base_exception)
}

/// `BaseException.__init__(self, *args)`: stores `args` as a tuple and, when
/// non-empty, the first positional argument's text form as `message`. Applied by the
/// call dispatcher when instantiating a built-in exception class that has no
/// user-defined `__init__` to run instead.
pub fn init_exception_instance(instance: &Value, args: &[Value]) {
    let message = args.first().map(|v| v.stringify()).unwrap_or_default();
    instance.set_attr("args", Value::Tuple(Rc::from(args.to_vec())));
    instance.set_attr("message", Value::str(message));
}

pub fn type_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("TypeError"), message)
}

pub fn name_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("NameError"), message)
}

pub fn attribute_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("AttributeError"), message)
}

pub fn index_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("IndexError"), message)
}

pub fn assertion_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("AssertionError"), message)
}

pub fn runtime_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("RuntimeError"), message)
}

pub fn not_implemented_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("NotImplementedError"), message)
}

pub fn system_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("SystemError"), message)
}

pub fn syntax_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("SyntaxError"), message)
}

pub fn zero_division_error(message: impl Into<String>) -> Value {
    exception_instance(&lookup_class("ZeroDivisionError"), message)
}

/// Calls a built-in function by name with pre-evaluated arguments.
pub fn call(name: &str, args: Vec<Value>) -> Result<Value, Value> {
    match name {
        "len" => builtin_len(args),
        "str" => Ok(Value::str(arg(&args, 0, name)?.stringify())),
        "repr" => Ok(Value::str(arg(&args, 0, name)?.repr())),
        "int" => builtin_int(args),
        "float" => builtin_float(args),
        "bool" => Ok(Value::Bool(arg(&args, 0, name)?.is_truthy())),
        "list" => builtin_list(args),
        "tuple" => builtin_tuple(args),
        "print" => builtin_print(args),
        "abs" => builtin_abs(args),
        "min" => builtin_minmax(args, true),
        "max" => builtin_minmax(args, false),
        "sum" => builtin_sum(args),
        "pow" => builtin_pow(args),
        "isinstance" => builtin_isinstance(args),
        "type" => builtin_type(args),
        _ => Err(name_error(format!("name '{name}' is not defined"))),
    }
}

fn arg<'a>(args: &'a [Value], idx: usize, func: &str) -> Result<&'a Value, Value> {
    args.get(idx)
        .ok_or_else(|| type_error(format!("{func}() missing required argument")))
}

fn check_arity(func: &str, args: &[Value], expected: usize) -> Result<(), Value> {
    if args.len() != expected {
        Err(type_error(format!(
            "{func}() takes exactly {expected} argument{} ({} given)",
            if expected == 1 { "" } else { "s" },
            args.len()
        )))
    } else {
        Ok(())
    }
}

fn builtin_len(args: Vec<Value>) -> Result<Value, Value> {
    check_arity("len", &args, 1)?;
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(l) => l.borrow().len(),
        Value::Tuple(t) => t.len(),
        other => return Err(type_error(format!("object of type '{}' has no len()", other.type_name()))),
    };
    Ok(Value::int(n as i64))
}

fn builtin_int(args: Vec<Value>) -> Result<Value, Value> {
    check_arity("int", &args, 1)?;
    match &args[0] {
        Value::Int(i) => Ok(Value::Int(i.clone())),
        Value::Float(f) => Ok(Value::Int(BigInt::from(*f as i64))),
        Value::Bool(b) => Ok(Value::int(*b as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<BigInt>()
            .map(Value::Int)
            .map_err(|_| type_error(format!("invalid literal for int(): '{s}'"))),
        other => Err(type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn builtin_float(args: Vec<Value>) -> Result<Value, Value> {
    check_arity("float", &args, 1)?;
    match &args[0] {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) => Ok(Value::Float(crate::ops::bigint_to_f64(i))),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| type_error(format!("could not convert string to float: '{s}'"))),
        other => Err(type_error(format!(
            "float() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn builtin_list(args: Vec<Value>) -> Result<Value, Value> {
    if args.is_empty() {
        return Ok(Value::list(Vec::new()));
    }
    check_arity("list", &args, 1)?;
    match &args[0] {
        Value::List(l) => Ok(Value::list(l.borrow().clone())),
        Value::Tuple(t) => Ok(Value::list(t.to_vec())),
        Value::Str(s) => Ok(Value::list(s.chars().map(|c| Value::str(c.to_string())).collect())),
        other => Err(type_error(format!("'{}' object is not iterable", other.type_name()))),
    }
}

fn builtin_tuple(args: Vec<Value>) -> Result<Value, Value> {
    if args.is_empty() {
        return Ok(Value::Tuple(Rc::from(Vec::new())));
    }
    check_arity("tuple", &args, 1)?;
    match &args[0] {
        Value::List(l) => Ok(Value::Tuple(Rc::from(l.borrow().clone()))),
        Value::Tuple(t) => Ok(Value::Tuple(t.clone())),
        Value::Str(s) => Ok(Value::Tuple(Rc::from(
            s.chars().map(|c| Value::str(c.to_string())).collect::<Vec<_>>(),
        ))),
        other => Err(type_error(format!("'{}' object is not iterable", other.type_name()))),
    }
}

fn builtin_print(args: Vec<Value>) -> Result<Value, Value> {
    let line = args.iter().map(Value::stringify).collect::<Vec<_>>().join(" ");
    println!("{line}");
    Ok(Value::None)
}

fn builtin_abs(args: Vec<Value>) -> Result<Value, Value> {
    check_arity("abs", &args, 1)?;
    match &args[0] {
        Value::Int(i) => Ok(Value::Int(i.abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(type_error(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
    }
}

fn builtin_minmax(args: Vec<Value>, want_min: bool) -> Result<Value, Value> {
    let items: Vec<Value> = match args.len() {
        0 => return Err(type_error("min()/max() expected at least 1 argument, got 0")),
        1 => match &args[0] {
            Value::List(l) => l.borrow().clone(),
            Value::Tuple(t) => t.to_vec(),
            other => return Err(type_error(format!("'{}' object is not iterable", other.type_name()))),
        },
        _ => args,
    };
    if items.is_empty() {
        return Err(if want_min {
            runtime_error("min() arg is an empty sequence")
        } else {
            runtime_error("max() arg is an empty sequence")
        });
    }
    let mut best = items[0].clone();
    for item in &items[1..] {
        let replace = if want_min {
            crate::ops::cmpop(&rustpython_parser::ast::CmpOp::Lt, item, &best)?
        } else {
            crate::ops::cmpop(&rustpython_parser::ast::CmpOp::Gt, item, &best)?
        };
        if replace {
            best = item.clone();
        }
    }
    Ok(best)
}

fn builtin_sum(args: Vec<Value>) -> Result<Value, Value> {
    if args.is_empty() || args.len() > 2 {
        return Err(type_error("sum() takes 1 or 2 arguments"));
    }
    let items: Vec<Value> = match &args[0] {
        Value::List(l) => l.borrow().clone(),
        Value::Tuple(t) => t.to_vec(),
        other => return Err(type_error(format!("'{}' object is not iterable", other.type_name()))),
    };
    let mut total = args.get(1).cloned().unwrap_or_else(|| Value::int(0));
    for item in items {
        total = crate::ops::binop(&rustpython_parser::ast::Operator::Add, &total, &item)?;
    }
    Ok(total)
}

fn builtin_pow(args: Vec<Value>) -> Result<Value, Value> {
    if args.len() < 2 || args.len() > 3 {
        return Err(type_error("pow() takes 2 or 3 arguments"));
    }
    let result = crate::ops::binop(&rustpython_parser::ast::Operator::Pow, &args[0], &args[1])?;
    if let Some(modulus) = args.get(2) {
        crate::ops::binop(&rustpython_parser::ast::Operator::Mod, &result, modulus)
    } else {
        Ok(result)
    }
}

fn builtin_isinstance(args: Vec<Value>) -> Result<Value, Value> {
    check_arity("isinstance", &args, 2)?;
    let class = args[0].class_of();
    let Value::Class(_) = &args[1] else {
        return Err(type_error("isinstance() arg 2 must be a type"));
    };
    Ok(Value::Bool(class.is_some_and(|c| c.is_subclass(&args[1]))))
}

fn builtin_type(args: Vec<Value>) -> Result<Value, Value> {
    check_arity("type", &args, 1)?;
    match args[0].class_of() {
        Some(class) => Ok(class),
        None => Ok(Value::str(args[0].type_name())),
    }
}
