use crate::binder::{bind, BindingWarning, RenderContext, RenderMode, Value, ValueBag};
use crate::catalog::GenerationFormat;
use crate::generate::json_extract::extract_first_json_span;
use crate::generate::types::{ChatMessage, ChatOptions, GenerationClient, GenerationError};
use crate::run::{EngineError, StepMachine};
use serde_json::{Map, Value as JsonValue};

/// A parsed generation response. The degraded raw-fallback case is a
/// distinct variant so consumers must branch on it consciously, while its
/// serialized form stays the `{ "raw": text }` wrapper downstream code
/// already handles.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Text(String),
    Json(JsonValue),
    RawFallback { raw: String },
}

impl GenerationOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, GenerationOutcome::RawFallback { .. })
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            GenerationOutcome::Text(text) => JsonValue::String(text.clone()),
            GenerationOutcome::Json(value) => value.clone(),
            GenerationOutcome::RawFallback { raw } => JsonValue::Object(Map::from_iter([(
                "raw".to_string(),
                JsonValue::String(raw.clone()),
            )])),
        }
    }

    /// Bag value form, written under the originating component's state key.
    pub fn into_value(self) -> Value {
        match self {
            GenerationOutcome::Text(text) => Value::text(text),
            other => Value::from_json(other.to_json()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub outcome: GenerationOutcome,
    pub warnings: Vec<BindingWarning>,
}

/// Bind a prompt template against the bag, invoke the provider, and parse
/// the response per the requested format.
///
/// Provider failures surface as recoverable errors; the caller's run state
/// is untouched and a retry is always legal. A JSON response that cannot be
/// parsed degrades to `RawFallback` instead of failing.
pub fn generate(
    client: &dyn GenerationClient,
    prompt_template: &str,
    values: &ValueBag,
    ctx: &RenderContext,
    format: GenerationFormat,
    options: &ChatOptions,
) -> Result<GenerationResult, GenerationError> {
    let bound = bind(prompt_template, values, RenderMode::HumanReadable, ctx);

    let mut messages = Vec::new();
    if let Some(system_prompt) = &options.system_prompt {
        messages.push(ChatMessage::system(system_prompt.clone()));
    }
    messages.push(ChatMessage::user(bound.text));

    let response = client.chat(&messages, options)?;
    if response.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let outcome = parse_response(&response, format);
    Ok(GenerationResult {
        outcome,
        warnings: bound.warnings,
    })
}

fn parse_response(response: &str, format: GenerationFormat) -> GenerationOutcome {
    match format {
        // Raw provider text, verbatim; no parsing.
        GenerationFormat::Markdown | GenerationFormat::Text => {
            GenerationOutcome::Text(response.to_string())
        }
        GenerationFormat::Json => match extract_first_json_span(response)
            .and_then(|span| serde_json::from_str::<JsonValue>(span).ok())
        {
            Some(value) => GenerationOutcome::Json(value),
            None => GenerationOutcome::RawFallback {
                raw: response.to_string(),
            },
        },
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AutoGenerationError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Run every pending auto-trigger generation on the machine's current step,
/// in component declaration order. Each outcome is merged into the bag
/// before the next component binds its prompt, so later components see
/// earlier results.
///
/// Returns the state keys written. On a provider failure the failing
/// component's key stays unset and everything written so far is kept; the
/// step remains in place for a retry or an explicit skip.
pub fn run_auto_generations(
    machine: &mut StepMachine<'_>,
    client: &dyn GenerationClient,
    ctx: &RenderContext,
    options: &ChatOptions,
    now: i64,
) -> Result<Vec<String>, AutoGenerationError> {
    let mut written = Vec::new();
    loop {
        let Some((state_key, prompt, format)) =
            machine.pending_auto_generations().first().map(|spec| {
                (
                    spec.state_key.clone(),
                    spec.prompt.to_string(),
                    spec.output_format,
                )
            })
        else {
            return Ok(written);
        };

        // An outcome that leaves its key unset-equivalent (e.g. an empty
        // array) would loop forever; stop once a key repeats and let the
        // caller observe the still-pending component.
        if written.iter().any(|key| key == state_key.as_str()) {
            return Ok(written);
        }

        let result = generate(
            client,
            &prompt,
            &machine.run().values,
            ctx,
            format,
            options,
        )?;
        machine.set_value(state_key.as_str(), result.outcome.into_value(), now)?;
        written.push(state_key.to_string());
    }
}
