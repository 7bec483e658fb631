// Data models for the agent history wire format and the chat UI

pub mod history;
pub mod ui;
