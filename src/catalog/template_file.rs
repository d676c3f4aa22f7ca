use crate::catalog::typed_fields::{Difficulty, SelectOption, StateKey};
use crate::shared::ids::{StepId, TemplateId};
use serde::{Deserialize, Serialize};

/// Requested shape of a generation response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFormat {
    #[default]
    Markdown,
    Json,
    Text,
}

impl GenerationFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Text => "text",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "markdown" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err("output format must be one of: markdown, json, text".to_string()),
        }
    }
}

impl std::fmt::Display for GenerationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of artifact a completed run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Profile,
    Source,
    Report,
}

impl OutputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Source => "source",
            Self::Report => "report",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Profile => "notebook/profile",
            Self::Source => "notebook/source",
            Self::Report => "notebook/report",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields every component variant carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEnvelope {
    pub state_key: StateKey,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub label: String,
}

impl FieldEnvelope {
    pub fn new(state_key: StateKey, required: bool, label: impl Into<String>) -> Self {
        Self {
            state_key,
            required,
            label: label.into(),
        }
    }
}

/// One form control on a step page. The engine only cares about the value
/// each component writes into the bag; presentation belongs to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldComponent {
    TextInput {
        #[serde(flatten)]
        field: FieldEnvelope,
        #[serde(default)]
        placeholder: Option<String>,
    },
    Textarea {
        #[serde(flatten)]
        field: FieldEnvelope,
        #[serde(default)]
        placeholder: Option<String>,
        #[serde(default)]
        rows: Option<u32>,
    },
    NumberInput {
        #[serde(flatten)]
        field: FieldEnvelope,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Slider {
        #[serde(flatten)]
        field: FieldEnvelope,
        min: f64,
        max: f64,
        #[serde(default)]
        step: Option<f64>,
    },
    Dropdown {
        #[serde(flatten)]
        field: FieldEnvelope,
        options: Vec<SelectOption>,
    },
    CardSelector {
        #[serde(flatten)]
        field: FieldEnvelope,
        options: Vec<SelectOption>,
    },
    CheckboxList {
        #[serde(flatten)]
        field: FieldEnvelope,
        options: Vec<SelectOption>,
        #[serde(default)]
        multi_select: bool,
    },
    TagInput {
        #[serde(flatten)]
        field: FieldEnvelope,
        #[serde(default)]
        suggestions: Vec<String>,
    },
    DatePicker {
        #[serde(flatten)]
        field: FieldEnvelope,
    },
    FileUpload {
        #[serde(flatten)]
        field: FieldEnvelope,
        #[serde(default)]
        accept: Option<String>,
    },
    UrlInput {
        #[serde(flatten)]
        field: FieldEnvelope,
        #[serde(default)]
        placeholder: Option<String>,
    },
    AiGenerate {
        #[serde(flatten)]
        field: FieldEnvelope,
        prompt: String,
        #[serde(default)]
        output_format: GenerationFormat,
        #[serde(default)]
        auto_trigger: bool,
    },
    AiSummary {
        #[serde(flatten)]
        field: FieldEnvelope,
        prompt: String,
    },
    InfoCard {
        #[serde(flatten)]
        field: FieldEnvelope,
        text: String,
    },
    ButtonGroup {
        #[serde(flatten)]
        field: FieldEnvelope,
        options: Vec<SelectOption>,
    },
    Celebration {
        #[serde(flatten)]
        field: FieldEnvelope,
        #[serde(default)]
        text: String,
    },
}

impl FieldComponent {
    pub fn field(&self) -> &FieldEnvelope {
        match self {
            Self::TextInput { field, .. }
            | Self::Textarea { field, .. }
            | Self::NumberInput { field, .. }
            | Self::Slider { field, .. }
            | Self::Dropdown { field, .. }
            | Self::CardSelector { field, .. }
            | Self::CheckboxList { field, .. }
            | Self::TagInput { field, .. }
            | Self::DatePicker { field }
            | Self::FileUpload { field, .. }
            | Self::UrlInput { field, .. }
            | Self::AiGenerate { field, .. }
            | Self::AiSummary { field, .. }
            | Self::InfoCard { field, .. }
            | Self::ButtonGroup { field, .. }
            | Self::Celebration { field, .. } => field,
        }
    }

    pub fn state_key(&self) -> &StateKey {
        &self.field().state_key
    }

    pub fn required(&self) -> bool {
        self.field().required
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::TextInput { .. } => "text_input",
            Self::Textarea { .. } => "textarea",
            Self::NumberInput { .. } => "number_input",
            Self::Slider { .. } => "slider",
            Self::Dropdown { .. } => "dropdown",
            Self::CardSelector { .. } => "card_selector",
            Self::CheckboxList { .. } => "checkbox_list",
            Self::TagInput { .. } => "tag_input",
            Self::DatePicker { .. } => "date_picker",
            Self::FileUpload { .. } => "file_upload",
            Self::UrlInput { .. } => "url_input",
            Self::AiGenerate { .. } => "ai_generate",
            Self::AiSummary { .. } => "ai_summary",
            Self::InfoCard { .. } => "info_card",
            Self::ButtonGroup { .. } => "button_group",
            Self::Celebration { .. } => "celebration",
        }
    }

    /// Informational components never hold user input; they are skipped by
    /// required-field validation even when misdeclared as required.
    pub fn accepts_input(&self) -> bool {
        !matches!(self, Self::InfoCard { .. } | Self::Celebration { .. })
    }
}

/// View over an `ai_generate` component used by the generation orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct AiGenerateSpec<'a> {
    pub state_key: &'a StateKey,
    pub prompt: &'a str,
    pub output_format: GenerationFormat,
    pub auto_trigger: bool,
}

/// One page of a guided form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: StepId,
    pub title: String,
    #[serde(default)]
    pub skippable: bool,
    #[serde(default)]
    pub ai_enhanced: bool,
    #[serde(default)]
    pub components: Vec<FieldComponent>,
}

impl StepDefinition {
    /// `ai_generate` components in declaration order.
    pub fn ai_generate_specs(&self) -> Vec<AiGenerateSpec<'_>> {
        self.components
            .iter()
            .filter_map(|component| match component {
                FieldComponent::AiGenerate {
                    field,
                    prompt,
                    output_format,
                    auto_trigger,
                } => Some(AiGenerateSpec {
                    state_key: &field.state_key,
                    prompt,
                    output_format: *output_format,
                    auto_trigger: *auto_trigger,
                }),
                _ => None,
            })
            .collect()
    }
}

/// Descriptive metadata; carries no behavioral invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

/// How a completed run's value bag becomes a persistable artifact. Both
/// `title` and `template` are bound against the final bag exactly like
/// step-level templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(rename = "type")]
    pub output_type: OutputKind,
    pub title: String,
    pub template: String,
}

/// Immutable definition of a guided workflow or single-shot prompt template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub metadata: TemplateMetadata,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub output: Option<OutputSpec>,
}

impl TemplateDefinition {
    /// Single-shot templates have no steps and interpolate `body` directly.
    pub fn is_single_shot(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|step| step.id.as_str() == step_id)
    }
}

/// On-disk container: one catalog file declares one or more templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub templates: Vec<TemplateDefinition>,
}
