use mamba::Value;
use pretty_assertions::assert_eq;

fn run(code: &str) -> mamba::Interpreter {
    mamba::run("<test>", code).unwrap()
}

#[test]
fn basic_arithmetic() {
    let interp = run("x = 1 + 2");
    assert_eq!(interp.get_global("x"), Some(Value::int(3)));
}

#[test]
fn division_promotes_to_float_floor_div_stays_int() {
    let interp = run(
        r#"
a = 1 / 2
b = 1 // 2
"#,
    );
    assert_eq!(interp.get_global("a"), Some(Value::Float(0.5)));
    assert_eq!(interp.get_global("b"), Some(Value::int(0)));
}

#[test]
fn recursive_function_call() {
    let interp = run(
        r#"
def fib(n):
    if n <= 1:
        return n
    return fib(n - 1) + fib(n - 2)

result = fib(10)
"#,
    );
    assert_eq!(interp.get_global("result"), Some(Value::int(55)));
}

#[test]
fn scope_isolation_between_function_and_module() {
    let interp = run(
        r#"
x = 1

def f():
    x = 2
    return x

y = f()
"#,
    );
    assert_eq!(interp.get_global("x"), Some(Value::int(1)));
    assert_eq!(interp.get_global("y"), Some(Value::int(2)));
}

#[test]
fn while_break_stops_the_loop() {
    let interp = run(
        r#"
i = 0
seen = []
while i < 10:
    if i == 3:
        break
    seen = seen + [i]
    i = i + 1
"#,
    );
    assert_eq!(
        interp.get_global("seen"),
        Some(Value::list(vec![Value::int(0), Value::int(1), Value::int(2)]))
    );
    assert_eq!(interp.get_global("i"), Some(Value::int(3)));
}

#[test]
fn while_else_runs_when_loop_completes_normally() {
    let interp = run(
        r#"
i = 0
completed = False
while i < 3:
    i = i + 1
else:
    completed = True
"#,
    );
    assert_eq!(interp.get_global("completed"), Some(Value::Bool(true)));
}

#[test]
fn try_except_catches_matching_class() {
    let interp = run(
        r#"
caught = False
try:
    raise TypeError("bad")
except TypeError as e:
    caught = True
    msg = str(e)
"#,
    );
    assert_eq!(interp.get_global("caught"), Some(Value::Bool(true)));
}

#[test]
fn finally_runs_on_every_exit_path() {
    // `state` is a list, so mutations through it are visible to the caller even
    // though functions don't close over or write back to outer scopes otherwise.
    let interp = run(
        r#"
state = ["", ""]

def f(state):
    try:
        state[0] = "body"
        return 1
    finally:
        state[1] = "finally"

f(state)
"#,
    );
    assert_eq!(
        interp.get_global("state"),
        Some(Value::list(vec![Value::str("body"), Value::str("finally")]))
    );
}

#[test]
fn finally_replaces_pending_signal_when_it_raises() {
    let interp = run(
        r#"
def f():
    try:
        raise RuntimeError("stub")
    finally:
        return 99

result = f()
"#,
    );
    // The try block's raise is masked by the finally's own return.
    assert_eq!(interp.get_global("result"), Some(Value::int(99)));
}

#[test]
fn unhandled_exception_propagates_to_reraise() {
    let result = mamba::run(
        "<test>",
        r#"
try:
    raise RuntimeError("boom")
except TypeError:
    pass
"#,
    );
    assert!(result.is_err());
}

#[test]
fn reraise_with_no_active_exception_is_runtime_error() {
    let result = mamba::run("<test>", "raise");
    assert!(result.is_err());
}

#[test]
fn class_instantiation_runs_init_and_supports_attributes() {
    let interp = run(
        r#"
class Point:
    def __init__(self, x, y):
        self.x = x
        self.y = y

    def sum(self):
        return self.x + self.y

p = Point(3, 4)
total = p.sum()
"#,
    );
    assert_eq!(interp.get_global("total"), Some(Value::int(7)));
}

#[test]
fn multiple_inheritance_resolves_left_to_right() {
    let interp = run(
        r#"
class A:
    def greet(self):
        return "A"

class B:
    def greet(self):
        return "B"

class C(A, B):
    pass

value = C().greet()
"#,
    );
    assert_eq!(interp.get_global("value"), Some(Value::str("A")));
}

#[test]
fn list_indexing_supports_negative_indices_and_slices() {
    let interp = run(
        r#"
nums = [10, 20, 30, 40]
first = nums[0]
last = nums[-1]
middle = nums[1:3]
"#,
    );
    assert_eq!(interp.get_global("first"), Some(Value::int(10)));
    assert_eq!(interp.get_global("last"), Some(Value::int(40)));
    assert_eq!(
        interp.get_global("middle"),
        Some(Value::list(vec![Value::int(20), Value::int(30)]))
    );
}

#[test]
fn and_or_short_circuit() {
    // If either right-hand operand were evaluated it would raise, so a clean `run`
    // demonstrates the left operand alone decided the result.
    let interp = run(
        r#"
def explode():
    raise RuntimeError("should not run")

a = False and explode()
b = True or explode()
"#,
    );
    assert_eq!(interp.get_global("a"), Some(Value::Bool(false)));
    assert_eq!(interp.get_global("b"), Some(Value::Bool(true)));
}
