use crate::shared::serde_ext::parse_via_string;
use serde::{Deserialize, Deserializer, Serialize};

/// Name under which a component's resolved value lands in the run's value
/// bag, and the identifier accepted inside `{{...}}` placeholders.
///
/// Keys starting with `_` are presentational: they never interpolate and are
/// excluded from the final output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        validate_placeholder_identifier("state key", trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_presentational(&self) -> bool {
        self.0.starts_with('_')
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::borrow::Borrow<str> for StateKey {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<'de> Deserialize<'de> for StateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_via_string(deserializer, "state key", Self::parse)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the exact charset the binder recognizes between
/// `{{` and `}}`.
pub fn validate_placeholder_identifier(kind: &str, value: &str) -> Result<(), String> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(format!("{kind} must be non-empty"));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(format!("{kind} must start with an ASCII letter or '_'"));
    }
    if chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Ok(());
    }
    Err(format!(
        "{kind} must use only ASCII letters, digits or '_'"
    ))
}

pub fn is_placeholder_identifier(value: &str) -> bool {
    validate_placeholder_identifier("identifier", value).is_ok()
}

/// One choice in a dropdown, card selector, checkbox list or button group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            description: None,
        }
    }
}

/// Descriptive difficulty rating. No behavioral invariants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}
