use crate::run::state::RunStatus;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("template `{template_id}` has no steps; guided runs need a step sequence")]
    NotAGuidedTemplate { template_id: String },
    #[error("template `{template_id}` has no body to bind")]
    MissingBody { template_id: String },
    #[error("run belongs to template `{expected}`, not `{actual}`")]
    TemplateMismatch { expected: String, actual: String },
    #[error("run step index {index} is out of bounds for {step_count} steps")]
    StepIndexOutOfBounds { index: usize, step_count: usize },
    #[error("step `{step_id}` is missing required fields: {}", missing.join(", "))]
    StepValidation {
        step_id: String,
        missing: Vec<String>,
    },
    #[error("step `{step_id}` is not skippable")]
    StepNotSkippable { step_id: String },
    #[error("run is already at the first step")]
    AlreadyAtFirstStep,
    #[error("run is terminal with status `{status}`")]
    RunTerminal { status: RunStatus },
    #[error("run status transition `{from}` -> `{to}` is invalid")]
    InvalidStatusTransition { from: RunStatus, to: RunStatus },
    #[error("step `{step_id}` is waiting on generation for `{state_key}`")]
    GenerationPending { step_id: String, state_key: String },
    #[error("invalid state key `{key}`: {reason}")]
    InvalidStateKey { key: String, reason: String },
    #[error("id generation failed: {0}")]
    IdGeneration(String),
}
