use async_trait::async_trait;
use std::fmt;
use crate::Result;

/// One call to the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Returns the raw completion text for a prompt
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageSearch: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// False when the service has no credentials and must be skipped
    fn is_configured(&self) -> bool;

    /// Returns candidate image URLs for a query
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<String>>;
}
