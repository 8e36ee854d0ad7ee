//! System instructions, either fixed text or computed from context.

use crate::types::ContextVariables;

/// Produces an agent's system instructions for the current context.
///
/// Resolved on every completion request, so the text can track context
/// changes made by tools earlier in the run.
pub trait Instructions: Send + Sync {
    fn resolve(&self, context_variables: &ContextVariables) -> String;
}

/// Literal instructions.
#[derive(Debug, Clone)]
pub struct StaticInstructions(pub String);

impl Instructions for StaticInstructions {
    fn resolve(&self, _context_variables: &ContextVariables) -> String {
        self.0.clone()
    }
}

/// Instructions computed by a function of the context.
pub struct DynamicInstructions<F>(pub F);

impl<F> Instructions for DynamicInstructions<F>
where
    F: Fn(&ContextVariables) -> String + Send + Sync,
{
    fn resolve(&self, context_variables: &ContextVariables) -> String {
        (self.0)(context_variables)
    }
}
