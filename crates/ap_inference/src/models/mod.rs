use std::sync::Arc;

use ap_core::config::ModelConfig;
use ap_core::{Error, Result, TextGenerator};

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

/// Builds the text model named on the command line.
pub fn create_model(kind: &str, config: &ModelConfig) -> Result<Arc<dyn TextGenerator>> {
    match kind.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAiModel::new(config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Config(format!(
            "Unknown model '{}'. Available models: openai, dummy",
            other
        ))),
    }
}
