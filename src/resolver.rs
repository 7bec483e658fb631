// Model catalog and UI → backend model resolution

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ApiError;

/// Model preselected in the chat UI
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Backend model used when the default chat model has no mapping
const FALLBACK_BACKEND_MODEL: &str = "gpt-4o-mini";

/// A model offered in the chat UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatModel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CHAT_MODELS: &[ChatModel] = &[
    ChatModel {
        id: "gpt-4.1-nano-2025-04-14",
        name: "gpt-4.1-nano-2025-04-14",
        description: "Cost-efficient nano model tuned for general assistance.",
    },
    ChatModel {
        id: "gpt-4o",
        name: "gpt-4o",
        description: "Flagship multimodal model with strong reasoning capabilities.",
    },
    ChatModel {
        id: "gpt-4o-mini",
        name: "gpt-4o-mini",
        description: "Responsive mini model optimized for quick chat responses.",
    },
    ChatModel {
        id: "gpt-5-nano-2025-08-07",
        name: "gpt-5-nano-2025-08-07",
        description: "Experimental nano release with updated August 2025 weights.",
    },
];

/// UI model id → agent service model id. Extend as the agent service gains models.
static BACKEND_MODEL_MAPPING: Lazy<HashMap<String, String>> = Lazy::new(|| {
    [
        ("gpt-4.1-nano-2025-04-14", "gpt-4.1-nano-2025-04-14"),
        ("gpt-4o", "gpt-4o"),
        ("gpt-4o-mini", "gpt-4o-mini"),
        ("gpt-5-nano-2025-08-07", "gpt-5-nano-2025-08-07"),
    ]
    .into_iter()
    .map(|(ui, backend)| (ui.to_string(), backend.to_string()))
    .collect()
});

/// Backend model the agent service runs when the UI sends nothing
pub fn default_backend_model() -> &'static str {
    BACKEND_MODEL_MAPPING
        .get(DEFAULT_CHAT_MODEL)
        .map(String::as_str)
        .unwrap_or(FALLBACK_BACKEND_MODEL)
}

pub fn find_chat_model(id: &str) -> Option<&'static ChatModel> {
    CHAT_MODELS.iter().find(|model| model.id == id)
}

/// Exact-match resolver from UI model ids to backend ids.
///
/// Unlike a pass-through resolver, an unmapped id is an error: sending it to
/// the agent service would silently run the wrong model.
pub struct ModelResolver {
    mapping: Arc<HashMap<String, String>>,
}

impl ModelResolver {
    /// Resolver over the built-in mapping table
    pub fn new() -> Self {
        Self::with_mapping(BACKEND_MODEL_MAPPING.clone())
    }

    pub fn with_mapping(mapping: HashMap<String, String>) -> Self {
        Self {
            mapping: Arc::new(mapping),
        }
    }

    pub fn resolve(&self, ui_model: &str) -> Result<ModelResolution, ApiError> {
        match self.mapping.get(ui_model) {
            Some(backend_model) => {
                tracing::debug!("Model '{}' resolved to '{}'", ui_model, backend_model);
                Ok(ModelResolution {
                    ui_model: ui_model.to_string(),
                    backend_model: backend_model.clone(),
                })
            }
            None => {
                tracing::warn!("Model '{}' has no backend mapping", ui_model);
                Err(ApiError::UnmappedModel(ui_model.to_string()))
            }
        }
    }

    pub fn backend_model_for(&self, ui_model: &str) -> Result<String, ApiError> {
        self.resolve(ui_model).map(|r| r.backend_model)
    }

    /// Mapped UI model ids, sorted
    pub fn mapped_models(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.mapping.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for ModelResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ModelResolver {
    fn clone(&self) -> Self {
        Self {
            mapping: Arc::clone(&self.mapping),
        }
    }
}

/// Result of model resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResolution {
    /// What the UI sent
    pub ui_model: String,

    /// ID to send to the agent service
    pub backend_model: String,
}
