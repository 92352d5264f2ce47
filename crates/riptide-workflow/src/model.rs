//! Declarative workflow types (§4.8, component K).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

fn default_max_iterations() -> u64 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOptions {
    pub timeout_ms: u64,
    #[serde(default)]
    pub continue_on_error: bool,
    #[serde(default)]
    pub session_ttl_ms: Option<u64>,
}

impl WorkflowOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractAction {
    Click,
    Fill,
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitCondition {
    Networkidle,
    Timeout,
    Selector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    Fetch {
        url: String,
        #[serde(default = "default_true")]
        use_cache: bool,
        /// Variable to store the fetched body text under, if any.
        #[serde(default)]
        store_as: Option<String>,
    },
    Interact {
        selector: String,
        action: InteractAction,
        #[serde(default)]
        value: Option<String>,
    },
    Extract {
        /// Variable to store the resulting `DistillationResult` JSON
        /// under.
        store_as: String,
        #[serde(default)]
        policy_hint: Option<String>,
    },
    Wait {
        condition: WaitCondition,
        #[serde(default)]
        selector: Option<String>,
        timeout_ms: u64,
    },
    Screenshot {
        path: String,
    },
    SetVariable {
        name: String,
        #[serde(default)]
        value: Option<Value>,
        #[serde(default)]
        from_eval: Option<String>,
    },
    If {
        condition: String,
        #[serde(default)]
        then: Vec<Step>,
        #[serde(default)]
        r#else: Vec<Step>,
    },
    Loop {
        #[serde(default)]
        over: Option<String>,
        #[serde(default)]
        times: Option<u64>,
        #[serde(default = "default_max_iterations")]
        max_iterations: u64,
        #[serde(default)]
        break_if: Option<String>,
        steps: Vec<Step>,
    },
}

fn default_true() -> bool {
    true
}

impl Step {
    pub fn type_name(&self) -> &'static str {
        match self {
            Step::Fetch { .. } => "fetch",
            Step::Interact { .. } => "interact",
            Step::Extract { .. } => "extract",
            Step::Wait { .. } => "wait",
            Step::Screenshot { .. } => "screenshot",
            Step::SetVariable { .. } => "setVariable",
            Step::If { .. } => "if",
            Step::Loop { .. } => "loop",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub options: WorkflowOptions,
    #[serde(default)]
    pub variables: HashMap<String, Value>,
    pub steps: Vec<Step>,
}

/// Terminal status of a workflow run (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Completed,
    Failed,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step_type: String,
    pub succeeded: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub status: WorkflowStatus,
    pub variables: HashMap<String, Value>,
    pub steps: Vec<StepOutcome>,
}
