// Chat UI message models
//
// Shape consumed by the rendering layer: id, role, typed parts and
// a `metadata.createdAt` timestamp.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a UI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiRole {
    User,
    Assistant,
    System,
}

/// Execution state of a tool part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    /// Tool input is known, no result has been seen.
    InputAvailable,
    /// Tool ran and its output is attached.
    OutputAvailable,
}

/// A fragment of a UI message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiMessagePart {
    Text {
        text: String,
    },

    /// Tool invocation not bound to a statically declared tool.
    DynamicTool {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(rename = "toolName")]
        tool_name: String,
        state: ToolState,
        input: Value,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        output: Option<Value>,
    },
}

impl UiMessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        UiMessagePart::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// ISO-8601 timestamp
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// A message ready for the chat UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMessage {
    pub id: String,
    pub role: UiRole,
    pub parts: Vec<UiMessagePart>,
    pub metadata: MessageMetadata,
}

impl UiMessage {
    pub fn new(
        id: impl Into<String>,
        role: UiRole,
        parts: Vec<UiMessagePart>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            parts,
            metadata: MessageMetadata {
                created_at: created_at.into(),
            },
        }
    }

    /// All text parts concatenated, tool parts skipped.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                UiMessagePart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}
