use crate::binder::ValueBag;
use crate::exec::types::OutputPayload;
use crate::run::EngineError;
use crate::shared::ids::{ExecutionId, TemplateId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (ExecutionStatus::Pending, ExecutionStatus::Running)
                | (ExecutionStatus::Pending, ExecutionStatus::Failed)
                | (ExecutionStatus::Running, ExecutionStatus::Completed)
                | (ExecutionStatus::Running, ExecutionStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Pending => write!(f, "pending"),
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One automation run. Logs are append-only and terminal fields are written
/// exactly once; after that the record is immutable and every mutator
/// reports the attempt as not applied instead of corrupting state. Late
/// events from an orphaned collaborator call land there harmlessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub execution_id: ExecutionId,
    pub workflow_id: TemplateId,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub variables: ValueBag,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub output: Option<OutputPayload>,
    #[serde(default)]
    pub error: Option<String>,
    pub started_at: i64,
    pub updated_at: i64,
}

impl ExecutionRecord {
    pub fn new(
        execution_id: ExecutionId,
        workflow_id: TemplateId,
        variables: ValueBag,
        now: i64,
    ) -> Self {
        Self {
            execution_id,
            workflow_id,
            status: ExecutionStatus::Pending,
            variables,
            logs: Vec::new(),
            output: None,
            error: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// New record with a generated execution id.
    pub fn start(
        workflow_id: TemplateId,
        variables: ValueBag,
        now: i64,
    ) -> Result<Self, EngineError> {
        let execution_id = ExecutionId::generate(now).map_err(EngineError::IdGeneration)?;
        Ok(Self::new(execution_id, workflow_id, variables, now))
    }

    pub fn mark_running(&mut self, now: i64) -> bool {
        if !self.status.can_transition_to(ExecutionStatus::Running) {
            return false;
        }
        self.status = ExecutionStatus::Running;
        self.updated_at = now;
        true
    }

    /// Append one log line in arrival order. Ignored once terminal.
    pub fn append_log(&mut self, line: impl Into<String>, now: i64) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.logs.push(line.into());
        self.updated_at = now;
        true
    }

    pub fn complete(&mut self, output: OutputPayload, now: i64) -> bool {
        if !self.status.can_transition_to(ExecutionStatus::Completed) {
            return false;
        }
        self.status = ExecutionStatus::Completed;
        self.output = Some(output);
        self.updated_at = now;
        true
    }

    /// Logs collected so far are preserved and stay visible to the caller.
    pub fn fail(&mut self, error: impl Into<String>, now: i64) -> bool {
        if !self.status.can_transition_to(ExecutionStatus::Failed) {
            return false;
        }
        self.status = ExecutionStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = now;
        true
    }
}
