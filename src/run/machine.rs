use crate::binder::{RenderContext, Value};
use crate::catalog::{AiGenerateSpec, StateKey, StepDefinition, TemplateDefinition};
use crate::run::artifact::{render_output, OutputRender};
use crate::run::error::EngineError;
use crate::run::state::{RunRecord, RunStatus};
use crate::shared::ids::RunId;
use crate::shared::logging::EngineLog;

/// Where an `advance` or `skip` landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Moved { step_index: usize },
    Completed,
}

/// Drives one run of a guided template through its steps.
///
/// Holds the run record exclusively; every transition either succeeds and
/// mutates the record, or fails and leaves index, values and status exactly
/// as they were. The template itself is read-only.
#[derive(Debug, Clone)]
pub struct StepMachine<'a> {
    template: &'a TemplateDefinition,
    run: RunRecord,
    engine_log: Option<EngineLog>,
}

impl<'a> StepMachine<'a> {
    pub fn start(template: &'a TemplateDefinition, now: i64) -> Result<Self, EngineError> {
        let run_id = RunId::generate(now).map_err(EngineError::IdGeneration)?;
        Self::start_with_run_id(template, run_id, now)
    }

    pub fn start_with_run_id(
        template: &'a TemplateDefinition,
        run_id: RunId,
        now: i64,
    ) -> Result<Self, EngineError> {
        if template.is_single_shot() {
            return Err(EngineError::NotAGuidedTemplate {
                template_id: template.id.to_string(),
            });
        }
        Ok(Self {
            run: RunRecord::new(run_id, template.id.clone(), now),
            template,
            engine_log: None,
        })
    }

    /// Reattach a persisted record to its template definition.
    pub fn resume(template: &'a TemplateDefinition, run: RunRecord) -> Result<Self, EngineError> {
        if run.template_id != template.id {
            return Err(EngineError::TemplateMismatch {
                expected: template.id.to_string(),
                actual: run.template_id.to_string(),
            });
        }
        if run.current_step_index > template.steps.len() {
            return Err(EngineError::StepIndexOutOfBounds {
                index: run.current_step_index,
                step_count: template.steps.len(),
            });
        }
        Ok(Self {
            template,
            run,
            engine_log: None,
        })
    }

    pub fn with_engine_log(mut self, engine_log: EngineLog) -> Self {
        self.engine_log = Some(engine_log);
        self
    }

    pub fn template(&self) -> &TemplateDefinition {
        self.template
    }

    pub fn run(&self) -> &RunRecord {
        &self.run
    }

    pub fn into_run(self) -> RunRecord {
        self.run
    }

    pub fn status(&self) -> RunStatus {
        self.run.status
    }

    /// None once the run has moved past the last step.
    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.template.steps.get(self.run.current_step_index)
    }

    /// Write a value into the bag. Keys only grow or overwrite; earlier
    /// steps' keys stay visible to every later step's templates.
    pub fn set_value(&mut self, key: &str, value: Value, now: i64) -> Result<(), EngineError> {
        self.ensure_active()?;
        let key = StateKey::parse(key).map_err(|reason| EngineError::InvalidStateKey {
            key: key.to_string(),
            reason,
        })?;
        self.run.values.insert(key, value);
        self.run.updated_at = now;
        Ok(())
    }

    pub fn set_values<I, S>(&mut self, entries: I, now: i64) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        for (key, value) in entries {
            self.set_value(key.as_ref(), value, now)?;
        }
        Ok(())
    }

    /// Required input components of the current step with no non-empty value
    /// in the bag.
    pub fn missing_required_keys(&self) -> Vec<String> {
        let Some(step) = self.current_step() else {
            return Vec::new();
        };
        step.components
            .iter()
            .filter(|component| component.required() && component.accepts_input())
            .filter(|component| !self.run.values.is_set(component.state_key().as_str()))
            .map(|component| component.state_key().to_string())
            .collect()
    }

    /// Auto-trigger generation components of the current step whose state key
    /// is still unset, in declaration order. `advance` stays blocked until
    /// this list is empty.
    pub fn pending_auto_generations(&self) -> Vec<AiGenerateSpec<'_>> {
        let Some(step) = self.current_step() else {
            return Vec::new();
        };
        if !step.ai_enhanced {
            return Vec::new();
        }
        step.ai_generate_specs()
            .into_iter()
            .filter(|spec| spec.auto_trigger && !self.run.values.is_set(spec.state_key.as_str()))
            .collect()
    }

    pub fn advance(&mut self, now: i64) -> Result<AdvanceOutcome, EngineError> {
        self.ensure_active()?;
        let step = self.current_step_or_bounds()?;
        let step_id = step.id.clone();

        if let Some(pending) = self.pending_auto_generations().first() {
            return Err(EngineError::GenerationPending {
                step_id: step_id.to_string(),
                state_key: pending.state_key.to_string(),
            });
        }

        let missing = self.missing_required_keys();
        if !missing.is_empty() {
            return Err(EngineError::StepValidation {
                step_id: step_id.to_string(),
                missing,
            });
        }

        self.log(now, format!("decision=advance step_id={step_id}"));
        self.move_forward(now)
    }

    /// Like `advance`, but only on skippable steps and without required-field
    /// or generation gating.
    pub fn skip(&mut self, now: i64) -> Result<AdvanceOutcome, EngineError> {
        self.ensure_active()?;
        let step = self.current_step_or_bounds()?;
        if !step.skippable {
            return Err(EngineError::StepNotSkippable {
                step_id: step.id.to_string(),
            });
        }
        let step_id = step.id.clone();
        self.log(now, format!("decision=skip step_id={step_id}"));
        self.move_forward(now)
    }

    /// Values bound for the step being left are kept, so returning later
    /// shows previously entered data.
    pub fn back(&mut self, now: i64) -> Result<(), EngineError> {
        self.ensure_active()?;
        if self.run.current_step_index == 0 {
            return Err(EngineError::AlreadyAtFirstStep);
        }
        self.run.current_step_index -= 1;
        self.run.updated_at = now;
        self.log(
            now,
            format!("decision=back step_index={}", self.run.current_step_index),
        );
        Ok(())
    }

    pub fn abandon(&mut self, now: i64) -> Result<(), EngineError> {
        self.ensure_active()?;
        self.transition_status(RunStatus::Abandoned, now)?;
        self.log(now, "decision=abandon".to_string());
        Ok(())
    }

    /// The bound output artifact, available once the run completed and the
    /// template declares an output spec.
    pub fn output_artifact(&self, ctx: &RenderContext) -> Option<OutputRender> {
        if self.run.status != RunStatus::Completed {
            return None;
        }
        self.template
            .output
            .as_ref()
            .map(|spec| render_output(spec, &self.run.values, ctx))
    }

    fn move_forward(&mut self, now: i64) -> Result<AdvanceOutcome, EngineError> {
        let next = self.run.current_step_index + 1;
        if next >= self.template.steps.len() {
            self.run.current_step_index = self.template.steps.len();
            self.transition_status(RunStatus::Completed, now)?;
            self.log(now, "transition=completed".to_string());
            return Ok(AdvanceOutcome::Completed);
        }
        self.run.current_step_index = next;
        self.run.updated_at = now;
        Ok(AdvanceOutcome::Moved { step_index: next })
    }

    fn transition_status(&mut self, next: RunStatus, now: i64) -> Result<(), EngineError> {
        if !self.run.status.can_transition_to(next) {
            return Err(EngineError::InvalidStatusTransition {
                from: self.run.status,
                to: next,
            });
        }
        self.run.status = next;
        self.run.updated_at = now;
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), EngineError> {
        if self.run.status.is_terminal() {
            return Err(EngineError::RunTerminal {
                status: self.run.status,
            });
        }
        Ok(())
    }

    fn current_step_or_bounds(&self) -> Result<&StepDefinition, EngineError> {
        self.current_step()
            .ok_or(EngineError::StepIndexOutOfBounds {
                index: self.run.current_step_index,
                step_count: self.template.steps.len(),
            })
    }

    fn log(&self, now: i64, message: String) {
        if let Some(engine_log) = &self.engine_log {
            engine_log.append(now, self.run.run_id.as_str(), message);
        }
    }
}
