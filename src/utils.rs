// Small shared helpers

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::models::ui::{UiMessage, UiRole};

/// Fresh random (v4) identifier.
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as an RFC 3339 / ISO-8601 string in UTC.
pub fn iso_timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn most_recent_user_message(messages: &[UiMessage]) -> Option<&UiMessage> {
    messages.iter().rev().find(|m| m.role == UiRole::User)
}
