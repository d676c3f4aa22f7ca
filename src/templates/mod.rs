pub mod builtin;

pub use builtin::{builtin_catalog, default_generation_system_prompt};
