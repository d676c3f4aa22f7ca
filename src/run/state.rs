use crate::binder::ValueBag;
use crate::shared::ids::{RunId, TemplateId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl RunStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (RunStatus::InProgress, RunStatus::Completed)
                | (RunStatus::InProgress, RunStatus::Abandoned)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Abandoned)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::InProgress => write!(f, "in_progress"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// One in-progress or finished instantiation of a template. Owned by exactly
/// one logical caller; the engine never shares a record across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub run_id: RunId,
    pub template_id: TemplateId,
    /// 0-based. Equals the step count exactly when the run completed.
    pub current_step_index: usize,
    #[serde(default)]
    pub values: ValueBag,
    pub status: RunStatus,
    pub started_at: i64,
    pub updated_at: i64,
}

impl RunRecord {
    pub fn new(run_id: RunId, template_id: TemplateId, now: i64) -> Self {
        Self {
            run_id,
            template_id,
            current_step_index: 0,
            values: ValueBag::new(),
            status: RunStatus::InProgress,
            started_at: now,
            updated_at: now,
        }
    }
}
