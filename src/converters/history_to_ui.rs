// Agent history to chat UI converter
//
// Single forward pass over the history. An assistant record that declares tool
// calls absorbs the tool results directly after it, plus at most one trailing
// plain assistant record, into one UI message. Every other record maps to
// exactly one single-text-part message. `null` entries are skipped and other
// non-object entries render as empty assistant messages.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::converters::content::{sanitize_text, stringify_history_content};
use crate::models::history::{HistoryMessage, HistoryRecord, HistoryResponse, MessageKind};
use crate::models::ui::{ToolState, UiMessage, UiMessagePart, UiRole};
use crate::utils::{generate_uuid, iso_timestamp_now};

/// Tool name used when a call does not carry one.
pub const DEFAULT_TOOL_NAME: &str = "tool";

// ==================================================================================================
// Tool Round Types
// ==================================================================================================

/// A tool call as declared by an assistant record.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallDescriptor {
    pub id: String,
    pub name: String,
    /// Passed through untouched, `null` when the call has no `args`.
    pub args: Value,
}

/// Position of the lookahead that follows a tool-bearing assistant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookaheadState {
    ScanningToolResults,
    ScanningTrailingText,
    Done,
}

/// What the lookahead collected for one tool round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolRound {
    /// Normalized tool output keyed by tool call id
    pub outputs: HashMap<String, String>,
    /// Sanitized text of the trailing assistant record, if one was absorbed
    pub final_text: Option<String>,
    /// Number of records absorbed after the tool-bearing record
    pub consumed: usize,
}

// ==================================================================================================
// Entry Points
// ==================================================================================================

/// Converts agent history into chat UI messages.
///
/// Absent history converts to an empty list. The output never holds more
/// messages than the input has records.
pub fn convert_history_to_ui_messages(history: Option<&HistoryResponse>) -> Vec<UiMessage> {
    let Some(history) = history else {
        return Vec::new();
    };

    let records = history.messages.as_slice();
    let mut messages = Vec::with_capacity(records.len());
    let mut index = 0;

    while index < records.len() {
        match &records[index] {
            HistoryRecord::Message(record) if is_assistant_with_tools(record) => {
                let (message, consumed) = convert_tool_round(record, records, index);
                messages.extend(message);
                index += 1 + consumed;
                continue;
            }
            HistoryRecord::Message(record) => messages.push(convert_plain_record(record)),
            HistoryRecord::Null => debug!("Skipping null history entry at {}", index),
            HistoryRecord::Malformed(_) => {
                messages.push(text_message(UiRole::Assistant, String::new()))
            }
        }
        index += 1;
    }

    debug!(
        "Converted {} history record(s) into {} UI message(s)",
        records.len(),
        messages.len()
    );

    messages
}

/// Lenient variant taking the raw response body. Anything that is not a
/// `{messages: [...]}` object converts to an empty list.
pub fn convert_history_value(value: &Value) -> Vec<UiMessage> {
    if !value.is_object() {
        debug!("History payload is not an object, ignoring");
        return Vec::new();
    }

    match HistoryResponse::deserialize(value) {
        Ok(history) => convert_history_to_ui_messages(Some(&history)),
        Err(e) => {
            debug!("History payload is not a history response, ignoring: {}", e);
            Vec::new()
        }
    }
}

// ==================================================================================================
// Tool Rounds
// ==================================================================================================

fn is_assistant_with_tools(record: &HistoryMessage) -> bool {
    record.kind == MessageKind::Ai && record.tool_calls().next().is_some()
}

/// Builds descriptors for the object entries of `record.tool_calls`.
pub fn describe_tool_calls(record: &HistoryMessage) -> Vec<ToolCallDescriptor> {
    record
        .tool_calls()
        .map(|call| ToolCallDescriptor {
            id: call
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(generate_uuid),
            name: call
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_TOOL_NAME)
                .to_string(),
            args: call.get("args").cloned().unwrap_or(Value::Null),
        })
        .collect()
}

/// Runs the lookahead that starts at `records[start]`.
///
/// Tool results are absorbed while they answer one of `known_ids`; the first
/// record that does not ends that phase. That record is then absorbed only if
/// it is a plain assistant record (no tool calls declared). Nothing past it is
/// examined. A non-object entry ends the round in either phase.
pub fn scan_tool_round(
    records: &[HistoryRecord],
    start: usize,
    known_ids: &HashSet<&str>,
) -> ToolRound {
    let mut round = ToolRound::default();
    let mut cursor = start;
    let mut state = LookaheadState::ScanningToolResults;

    while state != LookaheadState::Done {
        let Some(next) = records.get(cursor).and_then(HistoryRecord::as_message) else {
            break;
        };

        state = match state {
            LookaheadState::ScanningToolResults => match answered_call_id(next, known_ids) {
                Some(call_id) => {
                    round
                        .outputs
                        .insert(call_id.to_string(), stringify_history_content(&next.content));
                    cursor += 1;
                    LookaheadState::ScanningToolResults
                }
                None => {
                    if next.kind == MessageKind::Tool {
                        debug!(
                            "Tool result {:?} answers no call of this round, leaving it in place",
                            next.tool_call_id
                        );
                    }
                    LookaheadState::ScanningTrailingText
                }
            },
            LookaheadState::ScanningTrailingText => {
                if next.kind == MessageKind::Ai && !next.declares_tool_calls() {
                    round.final_text = Some(sanitize_text(&stringify_history_content(
                        &next.content,
                    )));
                    cursor += 1;
                }
                LookaheadState::Done
            }
            LookaheadState::Done => LookaheadState::Done,
        };
    }

    round.consumed = cursor - start;
    round
}

fn answered_call_id<'a>(record: &'a HistoryMessage, known_ids: &HashSet<&str>) -> Option<&'a str> {
    if record.kind != MessageKind::Tool {
        return None;
    }
    record
        .tool_call_id
        .as_deref()
        .filter(|id| known_ids.contains(id))
}

/// Converts the tool-bearing `record` found at `records[index]`. Returns the
/// message (if it has any parts) and how many following records it absorbed.
fn convert_tool_round(
    record: &HistoryMessage,
    records: &[HistoryRecord],
    index: usize,
) -> (Option<UiMessage>, usize) {
    let descriptors = describe_tool_calls(record);
    let known_ids: HashSet<&str> = descriptors.iter().map(|d| d.id.as_str()).collect();

    let round = scan_tool_round(records, index + 1, &known_ids);
    let initial_text = sanitize_text(&stringify_history_content(&record.content));

    let mut parts: Vec<UiMessagePart> = descriptors
        .into_iter()
        .map(|descriptor| {
            let output = round.outputs.get(&descriptor.id).cloned();
            UiMessagePart::DynamicTool {
                state: if output.is_some() {
                    ToolState::OutputAvailable
                } else {
                    ToolState::InputAvailable
                },
                tool_call_id: descriptor.id,
                tool_name: descriptor.name,
                input: descriptor.args,
                output: output.map(Value::String),
            }
        })
        .collect();

    if !initial_text.is_empty() {
        parts.push(UiMessagePart::text(initial_text.clone()));
    }

    if let Some(final_text) = round.final_text {
        if !final_text.is_empty() && final_text != initial_text {
            parts.push(UiMessagePart::text(final_text));
        }
    }

    if parts.is_empty() {
        debug!("Tool round at record {} produced no parts, skipping", index);
        return (None, round.consumed);
    }

    let message = UiMessage::new(
        generate_uuid(),
        UiRole::Assistant,
        parts,
        iso_timestamp_now(),
    );
    (Some(message), round.consumed)
}

// ==================================================================================================
// Plain Records
// ==================================================================================================

/// Maps a record kind to the UI role. Unrecognized kinds render as assistant.
pub fn role_for_kind(kind: MessageKind) -> UiRole {
    match kind {
        MessageKind::Human => UiRole::User,
        MessageKind::System => UiRole::System,
        MessageKind::Ai | MessageKind::Tool | MessageKind::Unknown => UiRole::Assistant,
    }
}

/// Plain records are not sanitized.
fn convert_plain_record(record: &HistoryMessage) -> UiMessage {
    text_message(
        role_for_kind(record.kind),
        stringify_history_content(&record.content),
    )
}

fn text_message(role: UiRole, text: String) -> UiMessage {
    UiMessage::new(
        generate_uuid(),
        role,
        vec![UiMessagePart::text(text)],
        iso_timestamp_now(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::content::FUNCTION_CALL_MARKER;
    use proptest::prelude::*;
    use serde_json::json;

    fn history(messages: Vec<HistoryMessage>) -> HistoryResponse {
        HistoryResponse::new(messages)
    }

    fn call(id: &str, name: &str, args: Value) -> Value {
        json!({"id": id, "name": name, "args": args})
    }

    fn convert(messages: Vec<HistoryMessage>) -> Vec<UiMessage> {
        convert_history_to_ui_messages(Some(&history(messages)))
    }

    fn slots(messages: Vec<HistoryMessage>) -> Vec<HistoryRecord> {
        messages.into_iter().map(HistoryRecord::from).collect()
    }

    fn convert_slots(records: Vec<HistoryRecord>) -> Vec<UiMessage> {
        convert_history_to_ui_messages(Some(&HistoryResponse::from_records(records)))
    }

    #[test]
    fn test_absent_and_empty_history() {
        assert!(convert_history_to_ui_messages(None).is_empty());
        assert!(convert(vec![]).is_empty());
    }

    #[test]
    fn test_plain_human_message() {
        let messages = convert(vec![HistoryMessage::human("hi")]);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, UiRole::User);
        assert_eq!(messages[0].parts, vec![UiMessagePart::text("hi")]);
    }

    #[test]
    fn test_role_mapping() {
        let messages = convert(vec![
            HistoryMessage::human("q"),
            HistoryMessage::ai("a"),
            HistoryMessage::system("s"),
            HistoryMessage::new(MessageKind::Unknown, "u"),
        ]);

        let roles: Vec<UiRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![UiRole::User, UiRole::Assistant, UiRole::System, UiRole::Assistant]
        );
    }

    #[test]
    fn test_tool_call_with_matching_result() {
        let messages = convert(vec![
            HistoryMessage::ai("").with_tool_calls(vec![call(
                "call_1",
                "get_weather",
                json!({"city": "Oslo"}),
            )]),
            HistoryMessage::tool_result("call_1", "Sunny, 21C"),
        ]);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, UiRole::Assistant);
        assert_eq!(
            messages[0].parts,
            vec![UiMessagePart::DynamicTool {
                tool_call_id: "call_1".to_string(),
                tool_name: "get_weather".to_string(),
                state: ToolState::OutputAvailable,
                input: json!({"city": "Oslo"}),
                output: Some(json!("Sunny, 21C")),
            }]
        );
    }

    #[test]
    fn test_tool_call_without_result() {
        let messages = convert(vec![HistoryMessage::ai("")
            .with_tool_calls(vec![call("call_1", "search", json!({"q": "x"}))])]);

        assert_eq!(messages.len(), 1);
        match &messages[0].parts[0] {
            UiMessagePart::DynamicTool { state, output, .. } => {
                assert_eq!(*state, ToolState::InputAvailable);
                assert!(output.is_none());
            }
            other => panic!("expected tool part, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_round_with_initial_and_final_text() {
        let messages = convert(vec![
            HistoryMessage::human("weather?"),
            HistoryMessage::ai("<has_function_call>Let me check.")
                .with_tool_calls(vec![call("c1", "weather", json!({}))]),
            HistoryMessage::tool_result("c1", "rain"),
            HistoryMessage::ai("It will rain."),
            HistoryMessage::human("thanks"),
        ]);

        assert_eq!(messages.len(), 3);
        let parts = &messages[1].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], UiMessagePart::text("Let me check."));
        assert_eq!(parts[2], UiMessagePart::text("It will rain."));
        assert_eq!(messages[2].text_content(), "thanks");
    }

    #[test]
    fn test_final_text_identical_to_initial_is_dropped() {
        let messages = convert(vec![
            HistoryMessage::ai("Same answer").with_tool_calls(vec![call("c1", "t", json!({}))]),
            HistoryMessage::tool_result("c1", "ok"),
            HistoryMessage::ai("Same answer"),
        ]);

        assert_eq!(messages.len(), 1);
        let texts: Vec<_> = messages[0]
            .parts
            .iter()
            .filter(|p| matches!(p, UiMessagePart::Text { .. }))
            .collect();
        assert_eq!(texts, vec![&UiMessagePart::text("Same answer")]);
    }

    #[test]
    fn test_final_text_equal_after_sanitizing_is_dropped() {
        let messages = convert(vec![
            HistoryMessage::ai("Done").with_tool_calls(vec![call("c1", "t", json!({}))]),
            HistoryMessage::tool_result("c1", "ok"),
            HistoryMessage::ai("Done<has_function_call>"),
        ]);

        assert_eq!(messages[0].text_content(), "Done");
    }

    #[test]
    fn test_multiple_tool_calls_keep_declaration_order() {
        let messages = convert(vec![
            HistoryMessage::ai("").with_tool_calls(vec![
                call("a", "first", json!({})),
                call("b", "second", json!({})),
            ]),
            HistoryMessage::tool_result("b", "B"),
            HistoryMessage::tool_result("a", "A"),
        ]);

        assert_eq!(messages.len(), 1);
        let outputs: Vec<(String, Option<Value>)> = messages[0]
            .parts
            .iter()
            .map(|p| match p {
                UiMessagePart::DynamicTool {
                    tool_name, output, ..
                } => (tool_name.clone(), output.clone()),
                other => panic!("unexpected part {:?}", other),
            })
            .collect();
        assert_eq!(
            outputs,
            vec![
                ("first".to_string(), Some(json!("A"))),
                ("second".to_string(), Some(json!("B")))
            ]
        );
    }

    #[test]
    fn test_result_after_unrelated_record_is_not_picked_up() {
        let messages = convert(vec![
            HistoryMessage::ai("").with_tool_calls(vec![call("c1", "t", json!({}))]),
            HistoryMessage::human("interrupt"),
            HistoryMessage::tool_result("c1", "late"),
        ]);

        assert_eq!(messages.len(), 3);
        assert!(matches!(
            messages[0].parts[0],
            UiMessagePart::DynamicTool {
                state: ToolState::InputAvailable,
                ..
            }
        ));
        assert_eq!(messages[1].role, UiRole::User);
        assert_eq!(messages[2].role, UiRole::Assistant);
        assert_eq!(messages[2].text_content(), "late");
    }

    #[test]
    fn test_unmatched_tool_result_is_reprocessed_as_plain() {
        let messages = convert(vec![
            HistoryMessage::ai("").with_tool_calls(vec![call("c1", "t", json!({}))]),
            HistoryMessage::tool_result("other", "<has_function_call>orphan"),
            HistoryMessage::ai("after"),
        ]);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, UiRole::Assistant);
        // plain records keep the marker
        assert_eq!(messages[1].text_content(), "<has_function_call>orphan");
        assert_eq!(messages[2].text_content(), "after");
    }

    #[test]
    fn test_trailing_assistant_with_tool_calls_starts_new_round() {
        let messages = convert(vec![
            HistoryMessage::ai("").with_tool_calls(vec![call("c1", "t", json!({}))]),
            HistoryMessage::tool_result("c1", "one"),
            HistoryMessage::ai("").with_tool_calls(vec![call("c2", "t", json!({}))]),
            HistoryMessage::tool_result("c2", "two"),
        ]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].parts.len(), 1);
        assert_eq!(messages[1].parts.len(), 1);
    }

    #[test]
    fn test_trailing_assistant_with_only_invalid_tool_calls_is_not_absorbed() {
        // declares a (non-object) tool call, so it is neither final text nor a tool round
        let messages = convert(vec![
            HistoryMessage::ai("").with_tool_calls(vec![call("c1", "t", json!({}))]),
            HistoryMessage::ai("<has_function_call>next").with_tool_calls(vec![json!(null)]),
        ]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text_content(), "<has_function_call>next");
    }

    #[test]
    fn test_missing_id_and_name_are_synthesized() {
        let messages = convert(vec![
            HistoryMessage::ai("").with_tool_calls(vec![json!({"args": {"x": 1}})])
        ]);

        match &messages[0].parts[0] {
            UiMessagePart::DynamicTool {
                tool_call_id,
                tool_name,
                input,
                ..
            } => {
                assert!(uuid::Uuid::parse_str(tool_call_id).is_ok());
                assert_eq!(tool_name, DEFAULT_TOOL_NAME);
                assert_eq!(input, &json!({"x": 1}));
            }
            other => panic!("expected tool part, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_args_become_null_input() {
        let descriptors = describe_tool_calls(
            &HistoryMessage::ai("").with_tool_calls(vec![json!({"id": "c", "name": "n"})]),
        );
        assert_eq!(descriptors[0].args, Value::Null);
    }

    #[test]
    fn test_non_ai_record_with_tool_calls_is_plain() {
        let messages = convert(vec![HistoryMessage::human("hello")
            .with_tool_calls(vec![call("c1", "t", json!({}))])]);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].parts, vec![UiMessagePart::text("hello")]);
    }

    #[test]
    fn test_plain_assistant_keeps_marker() {
        let messages = convert(vec![HistoryMessage::ai("<has_function_call>raw")]);
        assert_eq!(messages[0].text_content(), "<has_function_call>raw");
    }

    #[test]
    fn test_every_message_gets_fresh_id() {
        let messages = convert(vec![
            HistoryMessage::human("a"),
            HistoryMessage::human("a"),
            HistoryMessage::ai("b"),
        ]);
        let ids: HashSet<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_null_entry_ends_tool_round() {
        let messages = convert_slots(vec![
            HistoryMessage::ai("")
                .with_tool_calls(vec![json!({"id": "c1"})])
                .into(),
            HistoryRecord::Null,
            HistoryMessage::tool_result("c1", "late").into(),
        ]);

        assert_eq!(messages.len(), 2);
        assert!(matches!(
            messages[0].parts[0],
            UiMessagePart::DynamicTool {
                state: ToolState::InputAvailable,
                ..
            }
        ));
        assert_eq!(messages[1].role, UiRole::Assistant);
        assert_eq!(messages[1].text_content(), "late");
    }

    #[test]
    fn test_non_object_entry_ends_tool_round_and_renders_empty() {
        let messages = convert_slots(vec![
            HistoryMessage::ai("")
                .with_tool_calls(vec![json!({"id": "c1"})])
                .into(),
            HistoryRecord::Malformed(json!(3)),
            HistoryMessage::tool_result("c1", "late").into(),
        ]);

        assert_eq!(messages.len(), 3);
        assert!(matches!(
            messages[0].parts[0],
            UiMessagePart::DynamicTool {
                state: ToolState::InputAvailable,
                ..
            }
        ));
        assert_eq!(messages[1].role, UiRole::Assistant);
        assert_eq!(messages[1].parts, vec![UiMessagePart::text("")]);
        assert_eq!(messages[2].text_content(), "late");
    }

    #[test]
    fn test_non_object_entry_before_trailing_text() {
        let messages = convert_history_value(&json!({
            "messages": [
                {"type": "ai", "content": "", "tool_calls": [{"id": "c1", "name": "t"}]},
                {"type": "tool", "tool_call_id": "c1", "content": "ok"},
                null,
                {"type": "ai", "content": "Done."}
            ]
        }));

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].parts.len(), 1);
        assert_eq!(messages[1].text_content(), "Done.");
    }

    #[test]
    fn test_convert_history_value_malformed() {
        assert!(convert_history_value(&json!(null)).is_empty());
        assert!(convert_history_value(&json!("text")).is_empty());
        assert!(convert_history_value(&json!([[{"type": "human", "content": "hi"}]])).is_empty());
        assert!(convert_history_value(&json!({"messages": "nope"})).is_empty());
        assert!(convert_history_value(&json!({"messages": []})).is_empty());
    }

    #[test]
    fn test_convert_history_value_structured_content() {
        let messages = convert_history_value(&json!({
            "messages": [
                {"type": "human", "content": [{"type": "text", "text": "What is "}, "Rust?"]},
                {"type": "ai", "content": {"text": "A language."}}
            ]
        }));

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text_content(), "What is Rust?");
        assert_eq!(messages[1].text_content(), "A language.");
    }

    // ----------------------------------------------------------------------------------------------
    // Lookahead state machine
    // ----------------------------------------------------------------------------------------------

    #[test]
    fn test_scan_stops_at_first_mismatch() {
        let records = slots(vec![
            HistoryMessage::tool_result("a", "A"),
            HistoryMessage::tool_result("zz", "Z"),
            HistoryMessage::tool_result("b", "B"),
        ]);
        let known: HashSet<&str> = ["a", "b"].into_iter().collect();

        let round = scan_tool_round(&records, 0, &known);
        assert_eq!(round.consumed, 1);
        assert_eq!(round.outputs.len(), 1);
        assert_eq!(round.outputs.get("a").map(String::as_str), Some("A"));
        assert!(round.final_text.is_none());
    }

    #[test]
    fn test_scan_absorbs_trailing_text() {
        let records = slots(vec![
            HistoryMessage::tool_result("a", "A"),
            HistoryMessage::ai("final<has_function_call>"),
            HistoryMessage::ai("not absorbed"),
        ]);
        let known: HashSet<&str> = ["a"].into_iter().collect();

        let round = scan_tool_round(&records, 0, &known);
        assert_eq!(round.consumed, 2);
        assert_eq!(round.final_text.as_deref(), Some("final"));
    }

    #[test]
    fn test_scan_trailing_text_without_results() {
        let records = slots(vec![HistoryMessage::ai("right away")]);
        let round = scan_tool_round(&records, 0, &HashSet::new());

        assert_eq!(round.consumed, 1);
        assert!(round.outputs.is_empty());
        assert_eq!(round.final_text.as_deref(), Some("right away"));
    }

    #[test]
    fn test_scan_past_end() {
        let records = slots(vec![HistoryMessage::human("x")]);
        let round = scan_tool_round(&records, 1, &HashSet::new());
        assert_eq!(round, ToolRound::default());
    }

    #[test]
    fn test_scan_duplicate_result_last_wins() {
        let records = slots(vec![
            HistoryMessage::tool_result("a", "first"),
            HistoryMessage::tool_result("a", "second"),
        ]);
        let known: HashSet<&str> = ["a"].into_iter().collect();

        let round = scan_tool_round(&records, 0, &known);
        assert_eq!(round.consumed, 2);
        assert_eq!(round.outputs.get("a").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_scan_stops_at_non_object_slot() {
        let records = vec![
            HistoryMessage::tool_result("a", "A").into(),
            HistoryRecord::Malformed(json!("stray")),
            HistoryMessage::tool_result("b", "B").into(),
        ];
        let known: HashSet<&str> = ["a", "b"].into_iter().collect();

        let round = scan_tool_round(&records, 0, &known);
        assert_eq!(round.consumed, 1);
        assert!(!round.outputs.contains_key("b"));

        let round = scan_tool_round(&[HistoryRecord::Null], 0, &known);
        assert_eq!(round, ToolRound::default());
    }

    // ----------------------------------------------------------------------------------------------
    // Properties
    // ----------------------------------------------------------------------------------------------

    fn arb_record() -> impl Strategy<Value = HistoryMessage> {
        let kind = prop_oneof![
            Just(MessageKind::Human),
            Just(MessageKind::Ai),
            Just(MessageKind::Tool),
            Just(MessageKind::System),
            Just(MessageKind::Unknown),
        ];
        let text = prop_oneof![
            Just(String::new()),
            Just("hello".to_string()),
            Just(format!("{}thinking", FUNCTION_CALL_MARKER)),
            Just(format!("<has_{}function_call>", FUNCTION_CALL_MARKER)),
            "[a-z ]{0,8}",
        ];
        let ids = prop::sample::select(vec!["a", "b", "c"]);
        let calls = prop::collection::vec(ids.clone(), 0..3);

        (kind, text, calls, prop::option::of(ids)).prop_map(|(kind, text, calls, result_id)| {
            let mut record = HistoryMessage::new(kind, text);
            record.tool_calls = calls
                .into_iter()
                .map(|id| json!({"id": id, "name": format!("tool_{}", id), "args": {}}))
                .collect();
            record.tool_call_id = result_id.map(str::to_string);
            record
        })
    }

    fn arb_slot() -> impl Strategy<Value = HistoryRecord> {
        prop_oneof![
            8 => arb_record().prop_map(HistoryRecord::Message),
            1 => Just(HistoryRecord::Null),
            1 => Just(HistoryRecord::Malformed(json!(3))),
        ]
    }

    fn shape(messages: &[UiMessage]) -> Vec<(UiRole, Vec<UiMessagePart>)> {
        messages
            .iter()
            .map(|m| (m.role, m.parts.clone()))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_never_more_messages_than_records(records in prop::collection::vec(arb_slot(), 0..12)) {
            let count = records.len();
            let messages = convert_slots(records);
            prop_assert!(messages.len() <= count);
        }

        #[test]
        fn prop_conversion_is_stable(records in prop::collection::vec(arb_slot(), 0..12)) {
            let input = HistoryResponse::from_records(records);
            let first = convert_history_to_ui_messages(Some(&input));
            let second = convert_history_to_ui_messages(Some(&input));
            prop_assert_eq!(shape(&first), shape(&second));
        }

        #[test]
        fn prop_tool_messages_never_show_marker(records in prop::collection::vec(arb_slot(), 0..12)) {
            for message in convert_slots(records) {
                let has_tool = message
                    .parts
                    .iter()
                    .any(|p| matches!(p, UiMessagePart::DynamicTool { .. }));
                if !has_tool {
                    continue;
                }
                for part in &message.parts {
                    if let UiMessagePart::Text { text } = part {
                        prop_assert!(!text.contains(FUNCTION_CALL_MARKER));
                    }
                }
            }
        }
    }
}
