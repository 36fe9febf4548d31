use crate::value::Value;

/// The result of evaluating one statement (or a block of them).
///
/// This realizes the language's non-local control flow (`return`/`break`/`continue`/
/// `raise`) as a sum-type propagated out of every evaluator call, rather than as stored
/// one-shot continuations — an equivalent, idiomatic-Rust strategy for the same
/// semantics, provided every construct that can intercept a signal (`while`, `try`, a
/// function call) does so explicitly. See the crate-level design notes for why this
/// also sidesteps the handler-restoration bug classic to interpreters that store
/// break/continue handlers in shared mutable state.
#[derive(Debug, Clone)]
pub enum Signal {
    /// Execution reached the end of a block without `return`/`break`/`continue`/`raise`.
    /// Carries the value of the last expression statement, mirroring how `eval_body`
    /// tracks a "last value" for REPL-style top-level evaluation.
    Normal(Value),
    Return(Value),
    Break,
    Continue,
    Raise(Value),
}

impl Signal {
    pub fn unit() -> Signal {
        Signal::Normal(Value::None)
    }

    pub fn is_raise(&self) -> bool {
        matches!(self, Signal::Raise(_))
    }
}
