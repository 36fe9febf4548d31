//! The expression evaluator: reduces an expression AST node to a [`Value`], or an
//! `Err(Value)` carrying a raised exception that the caller must propagate unchanged.

use std::rc::Rc;

use num_bigint::BigInt;
use rustpython_parser::ast::{Constant, Expr};

use crate::builtins;
use crate::ops;
use crate::state::Interpreter;
use crate::value::Value;

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, Value> {
        match expr {
            Expr::Constant(c) => self.eval_constant(&c.value),

            Expr::Name(name) => {
                let id = name.id.as_str();
                match id {
                    "True" => Ok(Value::Bool(true)),
                    "False" => Ok(Value::Bool(false)),
                    "None" => Ok(Value::None),
                    _ => self
                        .scope()
                        .lookup(id)
                        .ok_or_else(|| builtins::name_error(format!("name '{id}' is not defined"))),
                }
            }

            Expr::List(list) => {
                let items = self.eval_all(&list.elts)?;
                Ok(Value::list(items))
            }

            Expr::Tuple(tuple) => {
                let items = self.eval_all(&tuple.elts)?;
                Ok(Value::Tuple(Rc::from(items)))
            }

            Expr::Slice(slice) => {
                let start = self.eval_optional(slice.lower.as_deref())?;
                let stop = self.eval_optional(slice.upper.as_deref())?;
                let step = self.eval_optional(slice.step.as_deref())?;
                Ok(Value::Slice(Box::new(start), Box::new(stop), Box::new(step)))
            }

            Expr::BinOp(binop) => {
                let left = self.eval_expr(&binop.left)?;
                let right = self.eval_expr(&binop.right)?;
                ops::binop(&binop.op, &left, &right)
            }

            Expr::UnaryOp(unary) => {
                let operand = self.eval_expr(&unary.operand)?;
                ops::unaryop(&unary.op, &operand)
            }

            Expr::BoolOp(boolop) => {
                let first = self.eval_expr(&boolop.values[0])?;
                let mut current = first;
                for operand in &boolop.values[1..] {
                    let short_circuit = match boolop.op {
                        rustpython_parser::ast::BoolOp::And => !current.is_truthy(),
                        rustpython_parser::ast::BoolOp::Or => current.is_truthy(),
                    };
                    if short_circuit {
                        return Ok(current);
                    }
                    current = self.eval_expr(operand)?;
                }
                Ok(current)
            }

            Expr::Compare(cmp) => {
                let mut left = self.eval_expr(&cmp.left)?;
                for (op, right_expr) in cmp.ops.iter().zip(cmp.comparators.iter()) {
                    let right = self.eval_expr(right_expr)?;
                    if !ops::cmpop(op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }

            Expr::IfExp(ifexp) => {
                if self.eval_expr(&ifexp.test)?.is_truthy() {
                    self.eval_expr(&ifexp.body)
                } else {
                    self.eval_expr(&ifexp.orelse)
                }
            }

            Expr::NamedExpr(named) => {
                let value = self.eval_expr(&named.value)?;
                let Expr::Name(name) = named.target.as_ref() else {
                    return Err(builtins::system_error("cannot assign to this expression"));
                };
                self.scope().bind(name.id.as_str(), value.clone());
                Ok(value)
            }

            Expr::Call(call) => self.eval_call(call),

            Expr::Attribute(attr) => {
                let target = self.eval_expr(&attr.value)?;
                target.get_attr(attr.attr.as_str()).ok_or_else(|| {
                    builtins::attribute_error(format!(
                        "'{}' object has no attribute '{}'",
                        target.type_name(),
                        attr.attr
                    ))
                })
            }

            Expr::Subscript(sub) => {
                let target = self.eval_expr(&sub.value)?;
                let index = self.eval_expr(&sub.slice)?;
                self.subscript(&target, &index)
            }

            Expr::Starred(_) => Err(builtins::not_implemented_error("starred expressions")),
            Expr::Lambda(_) => Err(builtins::not_implemented_error("lambda expressions")),
            Expr::Yield(_) | Expr::YieldFrom(_) => Err(builtins::not_implemented_error("generators")),
            Expr::Await(_) => Err(builtins::not_implemented_error("await")),
            Expr::ListComp(_) | Expr::SetComp(_) | Expr::DictComp(_) | Expr::GeneratorExp(_) => {
                Err(builtins::not_implemented_error("comprehensions"))
            }
            Expr::Dict(_) | Expr::Set(_) => Err(builtins::not_implemented_error("dict/set literals")),

            other => Err(builtins::not_implemented_error(format!(
                "expression node {:?}",
                std::mem::discriminant(other)
            ))),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, Value> {
        exprs.iter().map(|e| self.eval_expr(e)).collect()
    }

    fn eval_optional(&mut self, expr: Option<&Expr>) -> Result<Value, Value> {
        match expr {
            Some(e) => self.eval_expr(e),
            None => Ok(Value::None),
        }
    }

    fn eval_constant(&self, constant: &Constant) -> Result<Value, Value> {
        match constant {
            Constant::None => Ok(Value::None),
            Constant::Bool(b) => Ok(Value::Bool(*b)),
            Constant::Int(i) => Ok(Value::Int(BigInt::from(i.clone()))),
            Constant::Float(f) => Ok(Value::Float(*f)),
            Constant::Str(s) => Ok(Value::str(s.clone())),
            Constant::Tuple(items) => {
                let values: Result<Vec<Value>, Value> =
                    items.iter().map(|c| self.eval_constant(c)).collect();
                Ok(Value::Tuple(Rc::from(values?)))
            }
            Constant::Bytes(_) => Err(builtins::not_implemented_error("bytes literals")),
            Constant::Complex { .. } => Err(builtins::not_implemented_error("complex numbers")),
            Constant::Ellipsis => Err(builtins::not_implemented_error("ellipsis")),
        }
    }

    fn eval_call(&mut self, call: &rustpython_parser::ast::ExprCall) -> Result<Value, Value> {
        let mut args = Vec::with_capacity(call.args.len() + 1);
        let callee = match call.func.as_ref() {
            Expr::Attribute(attr) => {
                let receiver = self.eval_expr(&attr.value)?;
                let method = receiver.get_attr(attr.attr.as_str()).ok_or_else(|| {
                    builtins::attribute_error(format!(
                        "'{}' object has no attribute '{}'",
                        receiver.type_name(),
                        attr.attr
                    ))
                })?;
                if !matches!(receiver, Value::Module(_)) {
                    args.push(receiver);
                }
                method
            }
            other => self.eval_expr(other)?,
        };

        for arg_expr in &call.args {
            args.push(self.eval_expr(arg_expr)?);
        }
        if !call.keywords.is_empty() {
            return Err(builtins::not_implemented_error("keyword arguments"));
        }

        self.call_value(&callee, args)
    }

    fn subscript(&self, target: &Value, index: &Value) -> Result<Value, Value> {
        match (target, index) {
            (Value::List(items), Value::Int(i)) => {
                let items = items.borrow();
                let idx = normalize_index(i, items.len())
                    .ok_or_else(|| builtins::index_error("list index out of range"))?;
                Ok(items[idx].clone())
            }
            (Value::Tuple(items), Value::Int(i)) => {
                let idx = normalize_index(i, items.len())
                    .ok_or_else(|| builtins::index_error("tuple index out of range"))?;
                Ok(items[idx].clone())
            }
            (Value::Str(s), Value::Int(i)) => {
                let chars: Vec<char> = s.chars().collect();
                let idx = normalize_index(i, chars.len())
                    .ok_or_else(|| builtins::index_error("string index out of range"))?;
                Ok(Value::str(chars[idx].to_string()))
            }
            (Value::List(items), Value::Slice(start, stop, step)) => {
                Ok(Value::list(slice_values(&items.borrow(), start, stop, step)?))
            }
            (Value::Tuple(items), Value::Slice(start, stop, step)) => {
                Ok(Value::Tuple(Rc::from(slice_values(items, start, stop, step)?)))
            }
            _ => Err(builtins::type_error(format!(
                "'{}' object is not subscriptable with '{}'",
                target.type_name(),
                index.type_name()
            ))),
        }
    }
}

/// Negative-index normalization shared by subscript reads and in-place writes.
pub(crate) fn normalize_index(i: &BigInt, len: usize) -> Option<usize> {
    use num_traits::ToPrimitive;
    let i = i.to_i64()?;
    let resolved = if i < 0 { i + len as i64 } else { i };
    if resolved < 0 || resolved as usize >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

fn slice_values(
    items: &[Value],
    start: &Value,
    stop: &Value,
    step: &Value,
) -> Result<Vec<Value>, Value> {
    use num_traits::ToPrimitive;
    let len = items.len() as i64;
    let step = match step {
        Value::None => 1,
        Value::Int(i) => i.to_i64().unwrap_or(1),
        _ => return Err(builtins::type_error("slice step must be an integer")),
    };
    if step == 0 {
        return Err(builtins::type_error("slice step cannot be zero"));
    }
    let clamp = |v: i64| v.clamp(0, len);
    let as_index = |v: &Value, default: i64| -> Result<i64, Value> {
        match v {
            Value::None => Ok(default),
            Value::Int(i) => {
                let raw = i.to_i64().unwrap_or(default);
                Ok(if raw < 0 { raw + len } else { raw })
            }
            _ => Err(builtins::type_error("slice indices must be integers")),
        }
    };

    let mut out = Vec::new();
    if step > 0 {
        let start = clamp(as_index(start, 0)?);
        let stop = clamp(as_index(stop, len)?);
        let mut i = start;
        while i < stop {
            out.push(items[i as usize].clone());
            i += step;
        }
    } else {
        let start = as_index(start, len - 1)?.clamp(-1, len - 1);
        let stop = as_index(stop, -1)?.clamp(-1, len - 1);
        let mut i = start;
        while i > stop {
            out.push(items[i as usize].clone());
            i += step;
        }
    }
    Ok(out)
}
