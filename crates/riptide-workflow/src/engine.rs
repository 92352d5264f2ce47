//! Interprets a `Workflow` against a live browser session (§4.8,
//! component K): fetch/interact/extract/wait/screenshot/setVariable/
//! if/loop, backed by placeholder substitution and the sandboxed
//! expression evaluator in [`crate::expr`].

use crate::expr;
use crate::model::{InteractAction, Step, WaitCondition, Workflow, WorkflowResult, WorkflowStatus};
use crate::StepOutcome;
use riptide_extraction::Distiller;
use riptide_types::ports::{BrowserPage, WaitUntil};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Replaces every `{{identifier}}` occurrence in `text` with the
/// string form of the matching variable (§4.8: "`{{name}}` placeholders
/// in string fields are substituted before each step runs"). Unknown
/// placeholders are left untouched.
fn substitute(text: &str, variables: &HashMap<String, Value>) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if text[i..].starts_with("{{") {
            if let Some(end) = text[i + 2..].find("}}") {
                let name = text[i + 2..i + 2 + end].trim();
                if let Some(value) = variables.get(name) {
                    out.push_str(&value_to_display(value));
                    i += 2 + end + 2;
                    continue;
                }
            }
        }
        let ch = text[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct WorkflowEngine;

impl WorkflowEngine {
    pub fn new() -> Self {
        Self
    }

    /// `execute(workflow)` (§4.8). The browser session is always closed
    /// on exit, whichever status the run ends with.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        page: &dyn BrowserPage,
        distiller: &Distiller,
    ) -> WorkflowResult {
        let mut variables = workflow.variables.clone();
        let mut outcomes = Vec::new();

        let run = Self::run_steps(
            &workflow.steps,
            &mut variables,
            &mut outcomes,
            page,
            distiller,
            workflow.options.continue_on_error,
        );

        let status = match tokio::time::timeout(workflow.options.timeout(), run).await {
            Ok(Ok(())) => WorkflowStatus::Completed,
            Ok(Err(())) => WorkflowStatus::Failed,
            Err(_) => {
                warn!(workflow = %workflow.name, "workflow execution timed out");
                WorkflowStatus::Timeout
            }
        };

        if let Err(err) = page.close().await {
            warn!(workflow = %workflow.name, error = %err, "failed to close browser session");
        }

        WorkflowResult {
            status,
            variables,
            steps: outcomes,
        }
    }

    /// Runs `steps` in order. Returns `Err(())` once a step fails and
    /// `continueOnError` is false, aborting the remaining steps (and,
    /// by propagation, any enclosing `if`/`loop` body).
    fn run_steps<'a>(
        steps: &'a [Step],
        variables: &'a mut HashMap<String, Value>,
        outcomes: &'a mut Vec<StepOutcome>,
        page: &'a dyn BrowserPage,
        distiller: &'a Distiller,
        continue_on_error: bool,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), ()>> + 'a>> {
        Box::pin(async move {
            for step in steps {
                let result = Self::run_step(step, variables, outcomes, page, distiller, continue_on_error).await;
                let succeeded = result.is_ok();
                outcomes.push(StepOutcome {
                    step_type: step.type_name().to_string(),
                    succeeded,
                    error: result.as_ref().err().cloned(),
                });
                if result.is_err() && !continue_on_error {
                    return Err(());
                }
            }
            Ok(())
        })
    }

    async fn run_step(
        step: &Step,
        variables: &mut HashMap<String, Value>,
        outcomes: &mut Vec<StepOutcome>,
        page: &dyn BrowserPage,
        distiller: &Distiller,
        continue_on_error: bool,
    ) -> Result<(), String> {
        match step {
            Step::Fetch { url, store_as, .. } => {
                let url = substitute(url, variables);
                page.goto(&url, WaitUntil::Load)
                    .await
                    .map_err(|e| e.to_string())?;
                if let Some(name) = store_as {
                    let html = page.content().await.map_err(|e| e.to_string())?;
                    variables.insert(name.clone(), Value::String(html));
                }
                Ok(())
            }
            Step::Interact {
                selector,
                action,
                value,
            } => {
                let selector = substitute(selector, variables);
                let locator = page.locator(&selector);
                match action {
                    InteractAction::Click => locator.click().await.map_err(|e| e.to_string()),
                    InteractAction::Fill => {
                        let value = value.as_deref().unwrap_or_default();
                        let value = substitute(value, variables);
                        locator.fill(&value).await.map_err(|e| e.to_string())
                    }
                    InteractAction::Type => {
                        let value = value.as_deref().unwrap_or_default();
                        let value = substitute(value, variables);
                        locator.type_text(&value).await.map_err(|e| e.to_string())
                    }
                }
            }
            Step::Extract { store_as, policy_hint } => {
                let html = page.content().await.map_err(|e| e.to_string())?;
                let url = page.url();
                let result = distiller
                    .distill(&html, &url, policy_hint.as_deref())
                    .await
                    .map_err(|e| e.to_string())?;
                let value = serde_json::to_value(&result).map_err(|e| e.to_string())?;
                variables.insert(store_as.clone(), value);
                Ok(())
            }
            Step::Wait {
                condition,
                selector,
                timeout_ms,
            } => {
                let timeout = Duration::from_millis(*timeout_ms);
                match condition {
                    WaitCondition::Timeout => {
                        page.wait_for_timeout(timeout).await.map_err(|e| e.to_string())
                    }
                    WaitCondition::Networkidle => {
                        // Best-effort approximation: the port has no
                        // dedicated network-idle primitive, so this
                        // condition degrades to a short settle delay.
                        page.wait_for_timeout(timeout.min(Duration::from_secs(2)))
                            .await
                            .map_err(|e| e.to_string())
                    }
                    WaitCondition::Selector => {
                        let selector = selector.as_deref().ok_or("wait.selector is required")?;
                        let selector = substitute(selector, variables);
                        page.wait_for_selector(&selector, true, timeout)
                            .await
                            .map(|_| ())
                            .map_err(|e| e.to_string())
                    }
                }
            }
            Step::Screenshot { path } => {
                // The BrowserPage port exposes no screenshot capability;
                // this is recorded as a best-effort no-op rather than a
                // hard failure.
                debug!(path, "screenshot step requested; unsupported by this browser page, skipping");
                Ok(())
            }
            Step::SetVariable {
                name,
                value,
                from_eval,
            } => {
                let resolved = if let Some(expression) = from_eval {
                    expr::eval(expression, variables).map_err(|e| e.to_string())?
                } else {
                    value.clone().unwrap_or(Value::Null)
                };
                variables.insert(name.clone(), resolved);
                Ok(())
            }
            Step::If {
                condition,
                then,
                r#else,
            } => {
                let branch = if expr::eval_bool(condition, variables).map_err(|e| e.to_string())? {
                    then
                } else {
                    r#else
                };
                Self::run_steps(branch, variables, outcomes, page, distiller, continue_on_error)
                    .await
                    .map_err(|()| "branch aborted".to_string())
            }
            Step::Loop {
                over,
                times,
                max_iterations,
                break_if,
                steps,
            } => {
                let iterations: Vec<Option<Value>> = if let Some(var_name) = over {
                    let items = variables
                        .get(var_name)
                        .and_then(|v| v.as_array())
                        .cloned()
                        .unwrap_or_default();
                    items.into_iter().map(Some).collect()
                } else {
                    let n = times.unwrap_or(0);
                    (0..n).map(|_| None).collect()
                };

                let cap = (*max_iterations) as usize;
                for (index, item) in iterations.into_iter().take(cap).enumerate() {
                    variables.insert("__index".to_string(), Value::from(index as u64));
                    if let Some(item) = item {
                        variables.insert("__item".to_string(), item);
                    }

                    Self::run_steps(steps, variables, outcomes, page, distiller, continue_on_error)
                        .await
                        .map_err(|()| "loop body aborted".to_string())?;

                    if let Some(expression) = break_if {
                        if expr::eval_bool(expression, variables).map_err(|e| e.to_string())? {
                            break;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkflowOptions;
    use async_trait::async_trait;
    use riptide_extraction::extractors::FallbackExtractor;
    use riptide_types::ports::Locator;
    use std::sync::Arc;

    #[derive(Debug)]
    struct NoopLocator;

    #[async_trait]
    impl Locator for NoopLocator {
        async fn is_visible(&self, _timeout: Duration) -> anyhow::Result<bool> {
            Ok(true)
        }
        async fn click(&self) -> anyhow::Result<()> {
            Ok(())
        }
        async fn fill(&self, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn type_text(&self, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FakePage;

    #[async_trait]
    impl BrowserPage for FakePage {
        fn url(&self) -> String {
            "https://example.com".to_string()
        }
        async fn content(&self) -> anyhow::Result<String> {
            Ok("<html><body><article><p>hello world</p></article></body></html>".to_string())
        }
        async fn goto(&self, _url: &str, _wait_until: WaitUntil) -> anyhow::Result<()> {
            Ok(())
        }
        async fn evaluate(&self, _expr: &str) -> anyhow::Result<Value> {
            Ok(Value::Null)
        }
        async fn wait_for_timeout(&self, duration: Duration) -> anyhow::Result<()> {
            tokio::time::sleep(duration).await;
            Ok(())
        }
        async fn wait_for_selector(
            &self,
            _selector: &str,
            _present: bool,
            _timeout: Duration,
        ) -> anyhow::Result<bool> {
            Ok(true)
        }
        fn locator(&self, _selector: &str) -> Box<dyn Locator> {
            Box::new(NoopLocator)
        }
        async fn close(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn options(timeout_ms: u64, continue_on_error: bool) -> WorkflowOptions {
        WorkflowOptions {
            timeout_ms,
            continue_on_error,
            session_ttl_ms: None,
        }
    }

    #[test]
    fn substitutes_known_placeholders_and_leaves_unknown_ones() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), Value::from("Jane"));
        let out = substitute("hello {{name}}, id={{missing}}", &vars);
        assert_eq!(out, "hello Jane, id={{missing}}");
    }

    #[tokio::test]
    async fn loop_over_array_binds_item_and_index() {
        let workflow = Workflow {
            name: "loop-demo".to_string(),
            options: options(5_000, false),
            variables: {
                let mut v = HashMap::new();
                v.insert("items".to_string(), serde_json::json!(["a", "b", "c"]));
                v.insert("seen".to_string(), Value::from(0));
                v
            },
            steps: vec![Step::Loop {
                over: Some("items".to_string()),
                times: None,
                max_iterations: 50,
                break_if: None,
                steps: vec![Step::SetVariable {
                    name: "seen".to_string(),
                    value: None,
                    from_eval: Some("__index + 1".to_string()),
                }],
            }],
        };

        let page = FakePage;
        let distiller = Distiller::new(vec![Arc::new(FallbackExtractor::new())]);
        let engine = WorkflowEngine::new();
        let result = engine.execute(&workflow, &page, &distiller).await;

        assert_eq!(result.status, WorkflowStatus::Completed);
        assert_eq!(result.variables.get("seen"), Some(&Value::from(3)));
    }

    #[tokio::test]
    async fn if_step_branches_on_condition() {
        let workflow = Workflow {
            name: "if-demo".to_string(),
            options: options(5_000, false),
            variables: {
                let mut v = HashMap::new();
                v.insert("flag".to_string(), Value::Bool(true));
                v
            },
            steps: vec![Step::If {
                condition: "flag".to_string(),
                then: vec![Step::SetVariable {
                    name: "branch".to_string(),
                    value: Some(Value::from("then")),
                    from_eval: None,
                }],
                r#else: vec![Step::SetVariable {
                    name: "branch".to_string(),
                    value: Some(Value::from("else")),
                    from_eval: None,
                }],
            }],
        };

        let page = FakePage;
        let distiller = Distiller::new(vec![Arc::new(FallbackExtractor::new())]);
        let engine = WorkflowEngine::new();
        let result = engine.execute(&workflow, &page, &distiller).await;
        assert_eq!(result.variables.get("branch"), Some(&Value::from("then")));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_reported_when_steps_outrun_the_budget() {
        let workflow = Workflow {
            name: "slow".to_string(),
            options: options(10, false),
            variables: HashMap::new(),
            steps: vec![Step::Wait {
                condition: WaitCondition::Timeout,
                selector: None,
                timeout_ms: 2_000,
            }],
        };
        let page = FakePage;
        let distiller = Distiller::new(vec![Arc::new(FallbackExtractor::new())]);
        let engine = WorkflowEngine::new();
        let result = engine.execute(&workflow, &page, &distiller).await;
        assert_eq!(result.status, WorkflowStatus::Timeout);
    }
}
