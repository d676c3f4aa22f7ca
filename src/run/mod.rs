pub mod artifact;
pub mod error;
pub mod machine;
pub mod progress;
pub mod state;

pub use artifact::{render_output, Artifact, OutputRender};
pub use error::EngineError;
pub use machine::{AdvanceOutcome, StepMachine};
pub use progress::ProgressSnapshot;
pub use state::{RunRecord, RunStatus};
