// Converters module - agent history to chat UI format
//
// - content: normalization of free-form record content into display text
// - history_to_ui: agent history records → UI messages

pub mod content;
pub mod history_to_ui;

// Re-export main conversion functions
pub use content::{sanitize_text, stringify_history_content};
pub use history_to_ui::{convert_history_to_ui_messages, convert_history_value};
