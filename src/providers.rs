// Language model provider wiring
//
// Describes which model handle backs each named model id. The live set points
// at hosted gateway models; the test set points at deterministic mocks. No
// gateway calls happen here.

use std::collections::HashMap;

use crate::error::ApiError;

/// Gateway model for regular chat
const GATEWAY_CHAT_MODEL: &str = "xai/grok-2-vision-1212";
/// Gateway model for reasoning
const GATEWAY_REASONING_MODEL: &str = "xai/grok-3-mini";
/// Gateway model for titles and artifacts
const GATEWAY_TEXT_MODEL: &str = "xai/grok-2-1212";

/// Tag the reasoning middleware extracts from model output
pub const REASONING_TAG: &str = "think";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockModel {
    Chat,
    Reasoning,
    Title,
    Artifact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelBackend {
    Mock(MockModel),
    Gateway { model: String },
}

/// A named language model as the chat routes see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageModelHandle {
    pub backend: ModelBackend,
    /// Set when reasoning between `<tag>` markers is split out of the text
    pub reasoning_tag: Option<&'static str>,
}

impl LanguageModelHandle {
    pub fn mock(model: MockModel) -> Self {
        Self {
            backend: ModelBackend::Mock(model),
            reasoning_tag: None,
        }
    }

    pub fn gateway(model: &str) -> Self {
        Self {
            backend: ModelBackend::Gateway {
                model: model.to_string(),
            },
            reasoning_tag: None,
        }
    }

    #[must_use]
    pub fn with_reasoning(mut self, tag: &'static str) -> Self {
        self.reasoning_tag = Some(tag);
        self
    }
}

/// Lookup of language model handles by id
pub trait ModelProvider {
    fn language_model(&self, id: &str) -> Result<&LanguageModelHandle, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ProviderSet {
    models: HashMap<&'static str, LanguageModelHandle>,
}

impl ProviderSet {
    pub fn for_environment(is_test: bool) -> Self {
        if is_test {
            tracing::debug!("Using mock language models");
            Self::test()
        } else {
            Self::live()
        }
    }

    pub fn test() -> Self {
        let chat = LanguageModelHandle::mock(MockModel::Chat);
        let reasoning = LanguageModelHandle::mock(MockModel::Reasoning);

        let models = HashMap::from([
            ("chat-model", chat.clone()),
            ("chat-model-reasoning", reasoning.clone()),
            ("title-model", LanguageModelHandle::mock(MockModel::Title)),
            ("artifact-model", LanguageModelHandle::mock(MockModel::Artifact)),
            ("gpt-4.1-nano-2025-04-14", chat.clone()),
            ("gpt-4o", chat.clone()),
            ("gpt-4o-mini", chat),
            ("gpt-5-nano-2025-08-07", reasoning),
        ]);

        Self { models }
    }

    pub fn live() -> Self {
        let chat = LanguageModelHandle::gateway(GATEWAY_CHAT_MODEL);
        let reasoning =
            LanguageModelHandle::gateway(GATEWAY_REASONING_MODEL).with_reasoning(REASONING_TAG);

        // Catalog ids resolve here too even though the agent service runs them
        let models = HashMap::from([
            ("chat-model", chat.clone()),
            ("chat-model-reasoning", reasoning.clone()),
            ("title-model", LanguageModelHandle::gateway(GATEWAY_TEXT_MODEL)),
            ("artifact-model", LanguageModelHandle::gateway(GATEWAY_TEXT_MODEL)),
            ("gpt-4.1-nano-2025-04-14", chat.clone()),
            ("gpt-4o", chat.clone()),
            ("gpt-4o-mini", chat),
            ("gpt-5-nano-2025-08-07", reasoning),
        ]);

        Self { models }
    }

    /// Registered model ids, sorted
    pub fn model_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.models.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl ModelProvider for ProviderSet {
    fn language_model(&self, id: &str) -> Result<&LanguageModelHandle, ApiError> {
        self.models
            .get(id)
            .ok_or_else(|| ApiError::UnknownProviderModel(id.to_string()))
    }
}
