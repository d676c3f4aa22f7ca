use serde::{Deserialize, Serialize};
use std::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed with status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("generation transport failed: {0}")]
    Transport(String),
    #[error("generation stream broke mid-response: {0}")]
    MalformedStream(String),
    #[error("generation response could not be decoded: {0}")]
    MalformedResponse(String),
    #[error("generation response was empty")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request knobs forwarded to the provider. Model identifiers are opaque
/// strings the engine merely passes through.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl ChatOptions {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// One incremental piece of a streamed response, in arrival order.
pub type TextChunk = String;

/// External AI text provider. The engine consumes this interface and never
/// implements reasoning of its own.
pub trait GenerationClient {
    fn chat(&self, messages: &[ChatMessage], options: &ChatOptions)
        -> Result<String, GenerationError>;

    /// Streaming variant: a lazy, single-pass, forward-only sequence of text
    /// chunks. Finite, not restartable; a mid-stream failure arrives as the
    /// final `Err` item. The default forwards the non-streaming response as
    /// one chunk.
    fn chat_stream(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<mpsc::Receiver<Result<TextChunk, GenerationError>>, GenerationError> {
        let text = self.chat(messages, options)?;
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(Ok(text));
        Ok(receiver)
    }
}
