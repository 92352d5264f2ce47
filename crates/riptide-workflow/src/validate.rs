//! Static validation of a `Workflow` (§4.8 "Validation").

use crate::model::{Step, Workflow};

/// Runs every static check and returns all failures, not just the
/// first (§4.8).
pub fn validate(workflow: &Workflow) -> Vec<String> {
    let mut errors = Vec::new();

    if workflow.name.trim().is_empty() {
        errors.push("workflow name must not be empty".to_string());
    }
    if workflow.options.timeout_ms == 0 {
        errors.push("options.timeout_ms must be positive".to_string());
    }
    if workflow.steps.is_empty() {
        errors.push("workflow must have at least one step".to_string());
    }

    for (index, step) in workflow.steps.iter().enumerate() {
        validate_step(step, &format!("steps[{index}]"), &mut errors);
    }

    errors
}

fn validate_step(step: &Step, path: &str, errors: &mut Vec<String>) {
    match step {
        Step::Fetch { url, .. } => {
            if url.trim().is_empty() {
                errors.push(format!("{path} (fetch): url must not be empty"));
            }
        }
        Step::Interact { selector, .. } => {
            if selector.trim().is_empty() {
                errors.push(format!("{path} (interact): selector must not be empty"));
            }
        }
        Step::Extract { store_as, .. } => {
            if store_as.trim().is_empty() {
                errors.push(format!("{path} (extract): store_as must not be empty"));
            }
        }
        Step::Wait {
            condition,
            selector,
            timeout_ms,
        } => {
            use crate::model::WaitCondition;
            if *timeout_ms == 0 {
                errors.push(format!("{path} (wait): timeout_ms must be positive"));
            }
            if matches!(condition, WaitCondition::Selector) && selector.is_none() {
                errors.push(format!(
                    "{path} (wait): selector is required when condition == 'selector'"
                ));
            }
        }
        Step::Screenshot { path: file_path } => {
            if file_path.trim().is_empty() {
                errors.push(format!("{path} (screenshot): path must not be empty"));
            }
        }
        Step::SetVariable {
            name,
            value,
            from_eval,
        } => {
            if name.trim().is_empty() {
                errors.push(format!("{path} (setVariable): name must not be empty"));
            }
            if value.is_none() && from_eval.is_none() {
                errors.push(format!(
                    "{path} (setVariable): one of value or from_eval is required"
                ));
            }
        }
        Step::If {
            condition,
            then,
            r#else,
        } => {
            if condition.trim().is_empty() {
                errors.push(format!("{path} (if): condition must not be empty"));
            }
            for (i, inner) in then.iter().enumerate() {
                validate_step(inner, &format!("{path}.then[{i}]"), errors);
            }
            for (i, inner) in r#else.iter().enumerate() {
                validate_step(inner, &format!("{path}.else[{i}]"), errors);
            }
        }
        Step::Loop {
            over,
            times,
            max_iterations,
            steps,
            ..
        } => {
            if over.is_none() && times.is_none() {
                errors.push(format!("{path} (loop): one of over or times is required"));
            }
            if *max_iterations == 0 {
                errors.push(format!("{path} (loop): max_iterations must be positive"));
            }
            if steps.is_empty() {
                errors.push(format!("{path} (loop): steps must not be empty"));
            }
            for (i, inner) in steps.iter().enumerate() {
                validate_step(inner, &format!("{path}.steps[{i}]"), errors);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InteractAction, WaitCondition, WorkflowOptions};
    use std::collections::HashMap;

    fn base_options() -> WorkflowOptions {
        WorkflowOptions {
            timeout_ms: 30_000,
            continue_on_error: false,
            session_ttl_ms: None,
        }
    }

    #[test]
    fn valid_workflow_has_no_errors() {
        let workflow = Workflow {
            name: "demo".to_string(),
            options: base_options(),
            variables: HashMap::new(),
            steps: vec![Step::Interact {
                selector: "#submit".to_string(),
                action: InteractAction::Click,
                value: None,
            }],
        };
        assert!(validate(&workflow).is_empty());
    }

    #[test]
    fn reports_all_errors_not_just_the_first() {
        let workflow = Workflow {
            name: String::new(),
            options: WorkflowOptions {
                timeout_ms: 0,
                continue_on_error: false,
                session_ttl_ms: None,
            },
            variables: HashMap::new(),
            steps: vec![Step::Wait {
                condition: WaitCondition::Selector,
                selector: None,
                timeout_ms: 0,
            }],
        };
        let errors = validate(&workflow);
        assert!(errors.len() >= 4, "expected multiple accumulated errors, got {errors:?}");
    }

    #[test]
    fn validates_nested_if_and_loop_bodies() {
        let workflow = Workflow {
            name: "nested".to_string(),
            options: base_options(),
            variables: HashMap::new(),
            steps: vec![Step::If {
                condition: "x == 1".to_string(),
                then: vec![Step::Fetch {
                    url: String::new(),
                    use_cache: true,
                    store_as: None,
                }],
                r#else: vec![],
            }],
        };
        let errors = validate(&workflow);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("then[0]"));
    }
}
