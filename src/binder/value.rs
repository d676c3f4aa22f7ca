use crate::binder::code_literal::{json_literal, quoted_string_literal};
use crate::catalog::StateKey;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single bound value: text, number, boolean or calendar date.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
    Date(NaiveDate),
}

impl Scalar {
    /// Natural string form: numbers and booleans verbatim, dates as ISO text.
    pub fn render_human(&self) -> String {
        match self {
            Scalar::Text(text) => text.clone(),
            Scalar::Number(number) => number.to_string(),
            Scalar::Bool(value) => value.to_string(),
            Scalar::Date(date) => date.format(DATE_FORMAT).to_string(),
        }
    }

    /// Literal form for script embedding: text and dates quoted and escaped,
    /// numbers and booleans bare.
    pub fn render_code(&self) -> String {
        match self {
            Scalar::Text(text) => quoted_string_literal(text),
            Scalar::Number(number) => number.to_string(),
            Scalar::Bool(value) => value.to_string(),
            Scalar::Date(date) => quoted_string_literal(&date.format(DATE_FORMAT).to_string()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Scalar::Text(text) => JsonValue::String(text.clone()),
            Scalar::Number(number) => JsonValue::Number(number.clone()),
            Scalar::Bool(value) => JsonValue::Bool(*value),
            Scalar::Date(date) => JsonValue::String(date.format(DATE_FORMAT).to_string()),
        }
    }

    fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Scalar::Text(String::new()),
            JsonValue::Bool(flag) => Scalar::Bool(flag),
            JsonValue::Number(number) => Scalar::Number(number),
            JsonValue::String(text) => Scalar::Text(text),
            // Nested structures inside a scalar slot degrade to their JSON
            // text rather than being dropped.
            other => Scalar::Text(json_literal(&other)),
        }
    }
}

/// A run-state value: scalar, list of scalars, or list of objects (e.g.
/// uploaded-file records). Rendering depends on the call site's mode, never
/// on implicit string coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    ScalarList(Vec<Scalar>),
    ObjectList(Vec<Map<String, JsonValue>>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Text(value.into()))
    }

    pub fn number(value: i64) -> Self {
        Value::Scalar(Scalar::Number(Number::from(value)))
    }

    /// Non-finite floats have no JSON representation and are rejected.
    pub fn float(value: f64) -> Option<Self> {
        Number::from_f64(value).map(|number| Value::Scalar(Scalar::Number(number)))
    }

    pub fn bool(value: bool) -> Self {
        Value::Scalar(Scalar::Bool(value))
    }

    pub fn date(value: NaiveDate) -> Self {
        Value::Scalar(Scalar::Date(value))
    }

    pub fn text_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::ScalarList(
            values
                .into_iter()
                .map(|value| Scalar::Text(value.into()))
                .collect(),
        )
    }

    /// An unset-equivalent value: empty text or an empty list. Required-field
    /// validation treats these as missing.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(Scalar::Text(text)) => text.trim().is_empty(),
            Value::Scalar(_) => false,
            Value::ScalarList(values) => values.is_empty(),
            Value::ObjectList(values) => values.is_empty(),
        }
    }

    pub fn render_human(&self) -> String {
        match self {
            Value::Scalar(scalar) => scalar.render_human(),
            Value::ScalarList(values) => values
                .iter()
                .map(Scalar::render_human)
                .collect::<Vec<_>>()
                .join(", "),
            Value::ObjectList(values) => json_literal(&JsonValue::Array(
                values
                    .iter()
                    .map(|map| JsonValue::Object(map.clone()))
                    .collect(),
            )),
        }
    }

    pub fn render_code(&self) -> String {
        match self {
            Value::Scalar(scalar) => scalar.render_code(),
            Value::ScalarList(values) => {
                let rendered = values
                    .iter()
                    .map(Scalar::render_code)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{rendered}]")
            }
            Value::ObjectList(values) => json_literal(&JsonValue::Array(
                values
                    .iter()
                    .map(|map| JsonValue::Object(map.clone()))
                    .collect(),
            )),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Scalar(scalar) => scalar.to_json(),
            Value::ScalarList(values) => {
                JsonValue::Array(values.iter().map(Scalar::to_json).collect())
            }
            Value::ObjectList(values) => JsonValue::Array(
                values
                    .iter()
                    .map(|map| JsonValue::Object(map.clone()))
                    .collect(),
            ),
        }
    }

    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => {
                let all_objects =
                    !items.is_empty() && items.iter().all(|item| item.is_object());
                if all_objects {
                    Value::ObjectList(
                        items
                            .into_iter()
                            .filter_map(|item| match item {
                                JsonValue::Object(map) => Some(map),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    Value::ScalarList(items.into_iter().map(Scalar::from_json).collect())
                }
            }
            JsonValue::Object(map) => Value::ObjectList(vec![map]),
            other => Value::Scalar(Scalar::from_json(other)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = JsonValue::deserialize(deserializer)?;
        Ok(Value::from_json(raw))
    }
}

/// The accumulated `state key -> value` map of one run. Keys only grow or
/// overwrite; nothing is removed until the run reaches a terminal state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueBag(BTreeMap<String, Value>);

impl ValueBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: StateKey, value: Value) {
        self.0.insert(key.as_str().to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Lookup as seen by the binder: presentational (`_`-prefixed) keys are
    /// invisible to interpolation.
    pub fn interpolation_value(&self, key: &str) -> Option<&Value> {
        if key.starts_with('_') {
            return None;
        }
        self.0.get(key)
    }

    /// A key counts as set once it holds a non-empty value.
    pub fn is_set(&self, key: &str) -> bool {
        self.0.get(key).map(|value| !value.is_empty()).unwrap_or(false)
    }

    pub fn merge(&mut self, other: ValueBag) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON view of the bag with presentational keys stripped; this is the
    /// shape handed to the persistence collaborator alongside the artifact.
    pub fn output_json(&self) -> Map<String, JsonValue> {
        self.0
            .iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect()
    }

    pub fn from_json_map(map: Map<String, JsonValue>) -> Result<Self, String> {
        let mut bag = Self::new();
        for (key, value) in map {
            let key = StateKey::parse(&key)?;
            bag.insert(key, Value::from_json(value));
        }
        Ok(bag)
    }
}
