pub mod cli;
pub mod links;
pub mod logging;
pub mod manager;
pub mod publisher;
pub mod scheduler;

pub use cli::{handle_command, Pipeline, PipelineArgs, PipelineCommands};
pub use links::InternalLinkBuilder;
pub use manager::{CycleReport, PipelineManager};
pub use publisher::{HttpFetcher, MediaFetcher, Publisher};
pub use scheduler::{Cycle, CycleState, Scheduler};

pub mod prelude {
    pub use super::logging::{init_logging, Logger};
    pub use super::{Cycle, PipelineManager, Publisher, Scheduler};
    pub use ap_core::{Config, Error, PublishOutcome, Result};
}
