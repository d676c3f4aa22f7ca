pub mod http;
pub mod json_extract;
pub mod orchestrator;
pub mod types;

pub use http::HttpGenerationClient;
pub use json_extract::extract_first_json_span;
pub use orchestrator::{
    generate, run_auto_generations, AutoGenerationError, GenerationOutcome, GenerationResult,
};
pub use types::{
    ChatMessage, ChatOptions, ChatRole, GenerationClient, GenerationError, TextChunk,
};
