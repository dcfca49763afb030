//! Circular reference detection for class resolution.

use crate::error::{DiError, DiResult};

const MAX_DEPTH: usize = 1024;

/// Names currently being resolved on the active call chain.
///
/// Entering a name that is already on the stack is a cycle; the error carries
/// the full path including the repeated name, e.g. `["a", "b", "a"]`.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    stack: Vec<String>,
}

impl ResolutionStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn enter(&mut self, name: &str) -> DiResult<()> {
        // Circular detection BEFORE pushing the new name
        if self.stack.iter().any(|n| n == name) {
            let mut path = self.stack.clone();
            path.push(name.to_string());
            return Err(DiError::Circular(path));
        }

        if self.stack.len() >= MAX_DEPTH {
            return Err(DiError::DepthExceeded(self.stack.len()));
        }

        self.stack.push(name.to_string());
        Ok(())
    }

    /// Runs `f` with `name` pushed on the stack, popping it afterwards.
    pub(crate) fn guarded<T, F>(&mut self, name: &str, f: F) -> DiResult<T>
    where
        F: FnOnce(&mut Self) -> DiResult<T>,
    {
        self.enter(name)?;
        let result = f(self);
        let last = self.stack.pop();
        debug_assert_eq!(last.as_deref(), Some(name));
        result
    }
}
