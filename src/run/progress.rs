use crate::catalog::TemplateDefinition;
use crate::run::state::{RunRecord, RunStatus};
use serde::{Deserialize, Serialize};

/// Caller-facing summary of where a run stands. Derived, never stored as the
/// source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub run_id: String,
    pub template_id: String,
    pub status: RunStatus,
    pub current_step_index: usize,
    pub step_count: usize,
    #[serde(default)]
    pub current_step_id: Option<String>,
    #[serde(default)]
    pub current_step_title: Option<String>,
    pub bound_keys: Vec<String>,
    pub summary: String,
    pub updated_at: i64,
}

impl ProgressSnapshot {
    pub fn from_run(run: &RunRecord, template: &TemplateDefinition) -> Self {
        let current_step = template.steps.get(run.current_step_index);
        let summary = match run.status {
            RunStatus::InProgress => match current_step {
                Some(step) => format!(
                    "step {} of {}: {}",
                    run.current_step_index + 1,
                    template.steps.len(),
                    step.title
                ),
                None => "in progress".to_string(),
            },
            RunStatus::Completed => "completed".to_string(),
            RunStatus::Abandoned => "abandoned".to_string(),
        };
        Self {
            run_id: run.run_id.to_string(),
            template_id: run.template_id.to_string(),
            status: run.status,
            current_step_index: run.current_step_index,
            step_count: template.steps.len(),
            current_step_id: current_step.map(|step| step.id.to_string()),
            current_step_title: current_step.map(|step| step.title.clone()),
            bound_keys: run.values.keys().map(str::to_string).collect(),
            summary,
            updated_at: run.updated_at,
        }
    }
}
