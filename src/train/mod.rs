pub mod checkpoint;
pub mod config;
pub mod reporter;
pub mod trainer;

pub use config::{PretrainConfig, TrainerConfig};
pub use reporter::{select_reporter, StepReporter};
pub use trainer::{PretrainSummary, ReportEvent, Trainer};
