use crate::generate::types::{
    ChatMessage, ChatOptions, ChatRole, GenerationClient, GenerationError, TextChunk,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::io::{BufRead, BufReader};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn role_str(role: ChatRole) -> &'static str {
    match role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

/// Chat-completions client over HTTP. The wire contract is the
/// OpenAI-compatible shape the product's providers all speak; the engine
/// forwards model identifiers opaquely.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl HttpGenerationClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_base = std::env::var("STEPWEAVE_GENERATION_API_BASE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            api_base,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    fn send(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
        stream: bool,
    ) -> Result<ureq::Response, GenerationError> {
        let wire_messages = messages
            .iter()
            .map(|message| WireMessage {
                role: role_str(message.role),
                content: &message.content,
            })
            .collect();
        let request = ChatCompletionRequest {
            model: &options.model,
            messages: wire_messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stream,
        };
        let body = serde_json::to_value(&request)
            .map_err(|err| GenerationError::MalformedResponse(err.to_string()))?;

        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        agent
            .post(&self.endpoint("chat/completions"))
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body)
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => GenerationError::Http {
                    status,
                    body: response.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(transport) => {
                    GenerationError::Transport(transport.to_string())
                }
            })
    }
}

impl GenerationClient for HttpGenerationClient {
    fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, GenerationError> {
        let response = self.send(messages, options, false)?;
        let parsed: ChatCompletionResponse = response
            .into_json()
            .map_err(|err| GenerationError::MalformedResponse(err.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(content)
    }

    /// Server-sent-event stream decoded on a reader thread; chunks are
    /// forwarded in arrival order and never buffered for reordering.
    fn chat_stream(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<mpsc::Receiver<Result<TextChunk, GenerationError>>, GenerationError> {
        let response = self.send(messages, options, true)?;
        let body = response.into_reader();
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let reader = BufReader::new(body);
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        let _ = sender.send(Err(GenerationError::MalformedStream(err.to_string())));
                        return;
                    }
                };
                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data.is_empty() {
                    continue;
                }
                if data == "[DONE]" {
                    return;
                }
                let event: JsonValue = match serde_json::from_str(data) {
                    Ok(event) => event,
                    Err(err) => {
                        let _ = sender.send(Err(GenerationError::MalformedStream(format!(
                            "invalid stream event: {err}"
                        ))));
                        return;
                    }
                };
                let chunk = event
                    .get("choices")
                    .and_then(JsonValue::as_array)
                    .and_then(|choices| choices.first())
                    .and_then(|choice| choice.get("delta"))
                    .and_then(|delta| delta.get("content"))
                    .and_then(JsonValue::as_str)
                    .unwrap_or_default();
                if !chunk.is_empty() && sender.send(Ok(chunk.to_string())).is_err() {
                    // Receiver dropped; the run was abandoned mid-stream.
                    return;
                }
            }
        });

        Ok(receiver)
    }
}
