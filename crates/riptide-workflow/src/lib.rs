//! Declarative browser workflow interpreter for RipTide (§4.8,
//! component K): a typed `Workflow` model, a sandboxed expression
//! evaluator for `if`/`loop` conditions, static validation, and the
//! sequential step-execution engine itself.

pub mod engine;
pub mod expr;
pub mod model;
pub mod validate;

pub use engine::WorkflowEngine;
pub use expr::ExprError;
pub use model::{
    InteractAction, Step, StepOutcome, WaitCondition, Workflow, WorkflowOptions, WorkflowResult,
    WorkflowStatus,
};
pub use validate::validate;
