pub mod prepare;
pub mod record;
pub mod runner;
pub mod types;

pub use prepare::prepare_execution;
pub use record::{ExecutionRecord, ExecutionStatus};
pub use runner::{drive_execution, DriveReport};
pub use types::{
    normalize_output, AutomationClient, AutomationError, ExecutionEvent, NormalizedOutput,
    OutputPayload, OutputTag, RawOutputPayload,
};
