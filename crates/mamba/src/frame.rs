use crate::scope::Scope;

/// One activation record: a human-readable name (the function, or `<module>`) and the
/// scope active while that activation is executing.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub scope: Scope,
}

/// The call stack. `while`/`try`/function calls snapshot `depth()` on entry and always
/// restore to that depth on every exit path (normal, break, return, or an in-flight
/// raise) so that an unwind never leaves stale frames behind.
#[derive(Debug, Default)]
pub struct FrameStack(Vec<Frame>);

impl FrameStack {
    pub fn new() -> Self {
        FrameStack(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, scope: Scope) {
        self.0.push(Frame {
            name: name.into(),
            scope,
        });
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Truncates the stack back down to `depth`. A no-op if already at or below it.
    pub fn unwind_to(&mut self, depth: usize) {
        self.0.truncate(depth);
    }

    pub fn top(&self) -> &Frame {
        self.0.last().expect("frame stack must never be empty while evaluating")
    }

    pub fn top_mut(&mut self) -> &mut Frame {
        self.0.last_mut().expect("frame stack must never be empty while evaluating")
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|f| f.name.clone()).collect()
    }
}
