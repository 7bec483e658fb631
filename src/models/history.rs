// Agent microservice history models
//
// The history endpoint returns loosely-typed records. Decoding here is lenient:
// wrong-typed fields degrade to "absent" instead of failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ==================================================================================================
// Response Envelope
// ==================================================================================================

/// Body of `GET {base}/history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default, deserialize_with = "lenient_records")]
    pub messages: Vec<HistoryRecord>,
}

impl HistoryResponse {
    pub fn new(messages: Vec<HistoryMessage>) -> Self {
        Self::from_records(messages.into_iter().map(HistoryRecord::from).collect())
    }

    pub fn from_records(messages: Vec<HistoryRecord>) -> Self {
        Self { messages }
    }
}

/// One slot of the `messages` array.
///
/// Entries that are not objects keep their position so a tool round stops at them.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryRecord {
    Message(HistoryMessage),
    /// `null` entry
    Null,
    /// Number, string, boolean or nested array
    Malformed(Value),
}

impl HistoryRecord {
    pub fn as_message(&self) -> Option<&HistoryMessage> {
        match self {
            HistoryRecord::Message(message) => Some(message),
            HistoryRecord::Null | HistoryRecord::Malformed(_) => None,
        }
    }
}

impl From<HistoryMessage> for HistoryRecord {
    fn from(message: HistoryMessage) -> Self {
        HistoryRecord::Message(message)
    }
}

impl From<Value> for HistoryRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HistoryRecord::Null,
            Value::Object(_) => match serde_json::from_value(value.clone()) {
                Ok(message) => HistoryRecord::Message(message),
                Err(_) => HistoryRecord::Malformed(value),
            },
            other => HistoryRecord::Malformed(other),
        }
    }
}

impl<'de> Deserialize<'de> for HistoryRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(HistoryRecord::from)
    }
}

impl Serialize for HistoryRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            HistoryRecord::Message(message) => message.serialize(serializer),
            HistoryRecord::Null => serializer.serialize_unit(),
            HistoryRecord::Malformed(value) => value.serialize(serializer),
        }
    }
}

// ==================================================================================================
// History Records
// ==================================================================================================

/// Record kind as reported by the agent service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Human,
    Ai,
    Tool,
    System,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl From<&str> for MessageKind {
    fn from(value: &str) -> Self {
        match value {
            "human" => MessageKind::Human,
            "ai" => MessageKind::Ai,
            "tool" => MessageKind::Tool,
            "system" => MessageKind::System,
            _ => MessageKind::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for MessageKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(MessageKind::from).unwrap_or_default())
    }
}

/// One record of the agent conversation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    #[serde(rename = "type", default)]
    pub kind: MessageKind,

    #[serde(default)]
    pub content: HistoryContent,

    /// Raw tool call entries. Non-object entries are kept here but ignored by
    /// [`HistoryMessage::tool_calls`].
    #[serde(default, deserialize_with = "lenient_array")]
    pub tool_calls: Vec<Value>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub tool_call_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub run_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Value>,
}

impl HistoryMessage {
    pub fn new(kind: MessageKind, content: impl Into<HistoryContent>) -> Self {
        Self {
            kind,
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn human(content: impl Into<HistoryContent>) -> Self {
        Self::new(MessageKind::Human, content)
    }

    pub fn ai(content: impl Into<HistoryContent>) -> Self {
        Self::new(MessageKind::Ai, content)
    }

    pub fn system(content: impl Into<HistoryContent>) -> Self {
        Self::new(MessageKind::System, content)
    }

    /// Tool result record answering the call `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<HistoryContent>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(MessageKind::Tool, content)
        }
    }

    #[must_use]
    pub fn with_tool_calls(mut self, tool_calls: Vec<Value>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// Tool call entries that are JSON objects, in declaration order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.tool_calls.iter().filter_map(Value::as_object)
    }

    /// True when the raw tool call list is non-empty, whatever its entries look like.
    pub fn declares_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

// ==================================================================================================
// Content
// ==================================================================================================

/// Arbitrary record content, classified by shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HistoryContent {
    #[default]
    Empty,
    Text(String),
    Fragments(Vec<HistoryContent>),
    Record(Map<String, Value>),
    /// Numbers and booleans
    Scalar(Value),
}

impl From<Value> for HistoryContent {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HistoryContent::Empty,
            Value::String(text) => HistoryContent::Text(text),
            Value::Array(items) => {
                HistoryContent::Fragments(items.into_iter().map(HistoryContent::from).collect())
            }
            Value::Object(map) => HistoryContent::Record(map),
            scalar => HistoryContent::Scalar(scalar),
        }
    }
}

impl From<HistoryContent> for Value {
    fn from(content: HistoryContent) -> Self {
        match content {
            HistoryContent::Empty => Value::Null,
            HistoryContent::Text(text) => Value::String(text),
            HistoryContent::Fragments(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            HistoryContent::Record(map) => Value::Object(map),
            HistoryContent::Scalar(value) => value,
        }
    }
}

impl From<&str> for HistoryContent {
    fn from(text: &str) -> Self {
        HistoryContent::Text(text.to_string())
    }
}

impl From<String> for HistoryContent {
    fn from(text: String) -> Self {
        HistoryContent::Text(text)
    }
}

impl<'de> Deserialize<'de> for HistoryContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(HistoryContent::from)
    }
}

impl Serialize for HistoryContent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Value::from(self.clone()).serialize(serializer)
    }
}

// ==================================================================================================
// Lenient field decoders
// ==================================================================================================

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_array<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

/// A `messages` field that is not an array decodes as empty.
fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<HistoryRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    Ok(items.into_iter().map(HistoryRecord::from).collect())
}
