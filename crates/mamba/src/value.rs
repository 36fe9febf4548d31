use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::dict::AttributeDict;

/// A user-defined class: its name, its bases (left-to-right, most specific first),
/// and its own attribute dict (method and class-variable bodies).
#[derive(Debug)]
pub struct ClassData {
    pub name: String,
    pub bases: Vec<Value>,
    pub dict: AttributeDict,
}

/// An instance of a user-defined class.
#[derive(Debug)]
pub struct ObjectData {
    pub class: Value,
    pub dict: AttributeDict,
}

/// A user-defined function. No closure environment is captured: free variables are
/// resolved against whatever scope is active when the function is *called*, not where
/// it was defined.
#[derive(Debug)]
pub struct FunctionData {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<rustpython_parser::ast::Stmt>,
}

/// A loaded module: its path name and its own attribute dict.
#[derive(Debug)]
pub struct ModuleData {
    pub name: String,
    pub path: String,
    pub dict: AttributeDict,
}

/// The tagged universe of runtime values.
///
/// `List`, `Class`, `Object`, and `Module` carry shared, mutable handles: two `Value`s
/// that wrap the same `Rc` alias each other's mutations. Everything else is copied by
/// value on `clone`.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Str(Rc<str>),
    Tuple(Rc<[Value]>),
    List(Rc<RefCell<Vec<Value>>>),
    Slice(Box<Value>, Box<Value>, Box<Value>),
    Class(Rc<ClassData>),
    Object(Rc<ObjectData>),
    Function(Rc<FunctionData>),
    BuiltinFn(&'static str),
    Module(Rc<ModuleData>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(Rc::from(s.into()))
    }

    pub fn int(i: i64) -> Value {
        Value::Int(BigInt::from(i))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Slice(..) => "slice",
            Value::Class(_) => "type",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::BuiltinFn(_) => "builtin_function",
            Value::Module(_) => "module",
        }
    }

    /// Truthiness used by `if`, `while`, `and`, `or`, `not`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != BigInt::from(0),
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::List(l) => !l.borrow().is_empty(),
            _ => true,
        }
    }

    /// Best-effort human-readable text, used by `print`/`str()`/error messages.
    pub fn stringify(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(b) => {
                if *b {
                    "True".to_string()
                } else {
                    "False".to_string()
                }
            }
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => s.to_string(),
            Value::Tuple(items) => format_sequence(items, "(", ")", true),
            Value::List(items) => format_sequence(&items.borrow(), "[", "]", false),
            Value::Slice(start, stop, step) => format!(
                "slice({}, {}, {})",
                start.stringify(),
                stop.stringify(),
                step.stringify()
            ),
            Value::Class(c) => format!("<class '{}'>", c.name),
            Value::Object(o) => format!("<{} object>", class_name(&o.class)),
            Value::Function(f) => format!("<function {}>", f.name),
            Value::BuiltinFn(name) => format!("<built-in function {name}>"),
            Value::Module(m) => format!("<module '{}'>", m.name),
        }
    }

    /// Like `stringify`, but quotes strings — used inside container display and by the
    /// `repr()` builtin.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("{s:?}"),
            other => other.stringify(),
        }
    }

    /// The instance's own class, for attribute-lookup fallback and `is_subclass`.
    pub fn class_of(&self) -> Option<Value> {
        match self {
            Value::Object(o) => Some(o.class.clone()),
            _ => None,
        }
    }

    /// Reads an attribute: instance dict, then the class chain (left-to-right,
    /// depth-first over bases), first match wins.
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(o) => o.dict.get(name).or_else(|| o.class.get_attr(name)),
            Value::Class(c) => c
                .dict
                .get(name)
                .or_else(|| c.bases.iter().find_map(|base| base.get_attr(name))),
            Value::Module(m) => m.dict.get(name),
            _ => None,
        }
    }

    /// Writes an attribute. Returns `false` for values that carry no attribute dict
    /// (`Int`, `Float`, `Str`, `Bool`, `None`, `Tuple`, `Slice`, `Function`,
    /// `BuiltinFn`); the caller turns that into an `AttributeError`.
    pub fn set_attr(&self, name: &str, value: Value) -> bool {
        match self {
            Value::Object(o) => {
                o.dict.set(name, value);
                true
            }
            Value::Class(c) => {
                c.dict.set(name, value);
                true
            }
            Value::Module(m) => {
                m.dict.set(name, value);
                true
            }
            _ => false,
        }
    }

    /// Is `self` (a class) `base` or a descendant of it, searched left-to-right
    /// depth-first over `bases`? Reflexive.
    pub fn is_subclass(&self, base: &Value) -> bool {
        let (Value::Class(a), Value::Class(b)) = (self, base) else {
            return false;
        };
        if Rc::ptr_eq(a, b) {
            return true;
        }
        a.bases.iter().any(|parent| parent.is_subclass(base))
    }
}

fn class_name(class: &Value) -> String {
    match class {
        Value::Class(c) => c.name.clone(),
        other => other.type_name().to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f == f.trunc() {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

fn format_sequence(items: &[Value], open: &str, close: &str, single_trailing_comma: bool) -> String {
    let mut out = String::from(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&item.repr());
    }
    if single_trailing_comma && items.len() == 1 {
        out.push(',');
    }
    out.push_str(close);
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                crate::ops::bigint_to_f64(a) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::List(a), Value::List(b)) => *a.borrow() == *b.borrow(),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltinFn(a), Value::BuiltinFn(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::int(0).is_truthy());
        assert!(Value::int(1).is_truthy());
        assert!(!Value::str("").is_truthy());
        assert!(Value::str("x").is_truthy());
        assert!(!Value::list(vec![]).is_truthy());
        assert!(Value::list(vec![Value::None]).is_truthy());
    }

    #[test]
    fn int_float_equality_promotes() {
        assert_eq!(Value::int(2), Value::Float(2.0));
        assert_ne!(Value::int(2), Value::Float(2.5));
    }

    #[test]
    fn list_aliasing_is_shared() {
        let a = Value::list(vec![Value::int(1)]);
        let b = a.clone();
        if let Value::List(items) = &a {
            items.borrow_mut().push(Value::int(2));
        }
        assert_eq!(a, b);
    }

    #[test]
    fn stringify_quotes_strings_only_in_repr() {
        assert_eq!(Value::str("hi").stringify(), "hi");
        assert_eq!(Value::str("hi").repr(), "\"hi\"");
        assert_eq!(Value::Bool(true).stringify(), "True");
        assert_eq!(Value::None.stringify(), "None");
    }

    #[test]
    fn class_and_instance_attribute_lookup_falls_back_to_class() {
        let base = ClassData {
            name: "Base".to_string(),
            bases: vec![],
            dict: AttributeDict::new(),
        };
        base.dict.set("greeting", Value::str("hi"));
        let class = Value::Class(Rc::new(base));
        let instance = Value::Object(Rc::new(ObjectData {
            class: class.clone(),
            dict: AttributeDict::new(),
        }));
        assert_eq!(instance.get_attr("greeting"), Some(Value::str("hi")));
        assert!(instance.set_attr("greeting", Value::str("bye")));
        assert_eq!(instance.get_attr("greeting"), Some(Value::str("bye")));
        // writing on the instance must not disturb the class's own copy
        assert_eq!(class.get_attr("greeting"), Some(Value::str("hi")));
    }

    #[test]
    fn subclass_is_reflexive_and_left_to_right_depth_first() {
        let root = Value::Class(Rc::new(ClassData {
            name: "Root".to_string(),
            bases: vec![],
            dict: AttributeDict::new(),
        }));
        let child = Value::Class(Rc::new(ClassData {
            name: "Child".to_string(),
            bases: vec![root.clone()],
            dict: AttributeDict::new(),
        }));
        assert!(child.is_subclass(&child));
        assert!(child.is_subclass(&root));
        assert!(!root.is_subclass(&child));
    }
}
