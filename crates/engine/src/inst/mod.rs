//! Instruction vocabulary and execution semantics.
//!
//! An [`Instruction`] is one indivisible unit of simulated work belonging to a
//! process. The vocabulary is a closed sum type; each variant carries its own
//! execution semantics against the owning core's [`ExecContext`]. Executing an
//! instruction always advances the owning process's cursor by exactly one
//! (the cursor lives on the process, see [`crate::proc::Process::execute`]).

use crate::core::ExecContext;

/// One unit of simulated work.
///
/// Variants are executed against the context of the core the owning process
/// is resident on. New instruction kinds slot in as further variants with
/// their own `execute` arms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Emit a literal text message to the core's output log.
    EmitText {
        /// The message to record.
        message: String,
    },
}

impl Instruction {
    /// Executes this instruction against a core execution context.
    pub fn execute(&self, ctx: &mut ExecContext) {
        match self {
            Self::EmitText { message } => ctx.record(message),
        }
    }
}
