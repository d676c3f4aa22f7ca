use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("automation launch failed: {0}")]
    Launch(String),
    #[error("automation rejected the prepared script: {0}")]
    RejectedScript(String),
}

/// Closed set of output shapes an execution may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTag {
    Table,
    Markdown,
    Json,
    Csv,
}

impl OutputTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "markdown" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output type `{other}`")),
        }
    }
}

impl std::fmt::Display for OutputTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal payload as emitted by the automation collaborator, tag still an
/// arbitrary string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutputPayload {
    #[serde(rename = "type")]
    pub output_type: String,
    pub title: String,
    pub data: JsonValue,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

/// Terminal payload after normalization into the closed tag set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPayload {
    #[serde(rename = "type")]
    pub output_type: OutputTag,
    pub title: String,
    pub data: JsonValue,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOutput {
    pub payload: OutputPayload,
    /// Set when the payload was downgraded to `json`; carries the reason.
    pub downgrade: Option<String>,
}

/// Validate a collaborator payload against the closed tag set. Unknown tags
/// and `table` payloads without `columns` downgrade to `json`; nothing is
/// rejected outright.
pub fn normalize_output(raw: RawOutputPayload) -> NormalizedOutput {
    let RawOutputPayload {
        output_type,
        title,
        data,
        columns,
    } = raw;

    match OutputTag::parse(&output_type) {
        Ok(OutputTag::Table) if columns.is_none() => NormalizedOutput {
            payload: OutputPayload {
                output_type: OutputTag::Json,
                title,
                data,
                columns: None,
            },
            downgrade: Some("table output without columns stored as json".to_string()),
        },
        Ok(tag) => NormalizedOutput {
            payload: OutputPayload {
                output_type: tag,
                title,
                data,
                columns,
            },
            downgrade: None,
        },
        Err(_) => NormalizedOutput {
            payload: OutputPayload {
                output_type: OutputTag::Json,
                title,
                data,
                columns,
            },
            downgrade: Some(format!(
                "unknown output type `{output_type}` stored as json"
            )),
        },
    }
}

/// One item of the ordered execution stream: any number of log lines, then
/// at most one terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    Log(String),
    Completed(RawOutputPayload),
    Failed(String),
}

/// External browser-automation sandbox. Accepts bound code text and yields
/// events in strict emission order; the engine never reorders or replays the
/// stream. Re-running the same script may legitimately produce different
/// events, since the pages it touches are live.
pub trait AutomationClient {
    fn execute(&self, code: &str) -> Result<mpsc::Receiver<ExecutionEvent>, AutomationError>;
}
