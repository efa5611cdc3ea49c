use std::fmt;

use ap_core::{GenerationRequest, Result, TextGenerator};
use ap_content::INTERNAL_LINKS_PLACEHOLDER;

use crate::prompts::{PRODUCT_INSTRUCTION, TOPIC_INSTRUCTION};

/// Offline model with canned replies, for dry runs and tests.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextGenerator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let prompt = request.prompt.as_str();

        if prompt.starts_with(PRODUCT_INSTRUCTION) {
            return Ok("\"Insulated Waders\", \"Waterproof Headlamp\", \"Folding Camp Chair\"".to_string());
        }

        if prompt.starts_with(TOPIC_INSTRUCTION) {
            return Ok("Scouting Public Land Before Opening Day".to_string());
        }

        let topic = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Topic:"))
            .map(str::trim)
            .unwrap_or("The Outdoors");

        Ok(format!(
            "[TITLE] {topic}: A Practical Guide\n\
             [META] Everything you need to know about {lower}.\n\
             [BODY]\n\
             ## Why It Matters\n\
             Getting {lower} right makes every trip better.\n\n\
             ## Getting Started\n\
             Start small, plan ahead and keep notes after each outing.\n\n\
             ### Common Mistakes\n\
             Rushing the basics is the most common one.\n\n\
             {placeholder}\n\n\
             ## Final Thoughts\n\
             Practice is what turns advice into results.",
            topic = topic,
            lower = topic.to_lowercase(),
            placeholder = INTERNAL_LINKS_PLACEHOLDER,
        ))
    }
}
