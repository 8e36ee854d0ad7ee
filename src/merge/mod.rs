//! Reassembles one assistant turn from streamed delta fragments.
//!
//! Fragments are raw JSON objects in the chat-completions delta shape. String
//! fields are appended, nested objects are merged recursively, and tool-call
//! entries are routed by their `index` into per-call slots. The merge is a
//! plain fold, `(accumulator, fragment) -> accumulator`, so it can be driven
//! from any stream or callback.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::SwarmError;
use crate::types::{Message, Role};

/// Highest tool-call index accepted from a stream.
pub const MAX_TOOL_CALL_INDEX: u64 = 255;

/// A fragment problem that was skipped while merging continued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeAnomaly {
    #[error("Error merging tool_calls: fragment is not an object: {0}")]
    NotAnObject(Value),
    #[error("Error merging tool_calls: missing index")]
    MissingIndex,
    #[error("Error merging tool_calls: invalid index {0}")]
    InvalidIndex(Value),
    #[error("Error merging tool_calls: index {0} out of range")]
    IndexOutOfRange(u64),
}

/// In-progress assistant turn.
#[derive(Debug, Clone)]
pub struct TurnAccumulator {
    message: Map<String, Value>,
    tool_calls: BTreeMap<usize, Map<String, Value>>,
}

impl TurnAccumulator {
    /// Start an empty assistant turn attributed to `sender`.
    pub fn new(sender: impl Into<String>) -> Self {
        let mut message = Map::new();
        message.insert("role".into(), Value::String(Role::Assistant.to_string()));
        message.insert("content".into(), Value::String(String::new()));
        message.insert("sender".into(), Value::String(sender.into()));
        Self {
            message,
            tool_calls: BTreeMap::new(),
        }
    }

    /// Fold one fragment into the accumulator and return it.
    pub fn fold(mut self, fragment: Value) -> Self {
        self.merge_chunk(fragment);
        self
    }

    /// Merge one fragment in place.
    ///
    /// Returns the anomalies that were skipped; they are also logged.
    pub fn merge_chunk(&mut self, fragment: Value) -> Vec<MergeAnomaly> {
        let mut anomalies = Vec::new();
        let mut delta = match fragment {
            Value::Object(delta) => delta,
            Value::Null => return anomalies,
            other => {
                anomalies.push(MergeAnomaly::NotAnObject(other));
                log_anomalies(&anomalies);
                return anomalies;
            }
        };

        if let Some(Value::String(role)) = delta.remove("role") {
            self.message.insert("role".into(), Value::String(role));
            if let Some(Value::String(sender)) = delta.remove("sender") {
                self.message.insert("sender".into(), Value::String(sender));
            }
        }
        delta.remove("role");
        delta.remove("sender");
        let tool_calls = delta.remove("tool_calls");

        merge_fields(&mut self.message, &delta);

        if let Some(Value::Array(entries)) = tool_calls {
            for entry in entries {
                if let Err(anomaly) = self.merge_tool_call(entry) {
                    anomalies.push(anomaly);
                }
            }
        }

        log_anomalies(&anomalies);
        anomalies
    }

    fn merge_tool_call(&mut self, entry: Value) -> Result<(), MergeAnomaly> {
        let Value::Object(mut entry) = entry else {
            return Err(MergeAnomaly::NotAnObject(entry));
        };
        let index = match entry.remove("index") {
            None | Some(Value::Null) => return Err(MergeAnomaly::MissingIndex),
            Some(raw) => raw.as_u64().ok_or(MergeAnomaly::InvalidIndex(raw))?,
        };
        if index > MAX_TOOL_CALL_INDEX {
            return Err(MergeAnomaly::IndexOutOfRange(index));
        }
        let slot = self
            .tool_calls
            .entry(index as usize)
            .or_insert_with(empty_tool_call_slot);
        merge_fields(slot, &entry);
        Ok(())
    }

    /// Accumulated text content so far.
    pub fn content(&self) -> &str {
        self.message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Number of tool-call slots opened so far.
    pub fn tool_call_count(&self) -> usize {
        self.tool_calls.len()
    }

    /// Finalize into a message; slots are flattened in index order and an
    /// empty accumulator yields no tool-call list.
    pub fn finish(self) -> Result<Message, SwarmError> {
        let mut message = self.message;
        let tool_calls = if self.tool_calls.is_empty() {
            Value::Null
        } else {
            Value::Array(self.tool_calls.into_values().map(Value::Object).collect())
        };
        message.insert("tool_calls".into(), tool_calls);
        Ok(serde_json::from_value(Value::Object(message))?)
    }
}

/// Merge `source` into `target`: strings append (the `type` key is replaced
/// instead), objects recurse, anything else is ignored.
pub fn merge_fields(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::String(text) if key == "type" => {
                target.insert(key.clone(), Value::String(text.clone()));
            }
            Value::String(text) => match target.get_mut(key) {
                Some(Value::String(existing)) => existing.push_str(text),
                _ => {
                    target.insert(key.clone(), Value::String(text.clone()));
                }
            },
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(slot) = slot {
                    merge_fields(slot, nested);
                }
            }
            _ => {}
        }
    }
}

fn empty_tool_call_slot() -> Map<String, Value> {
    let mut function = Map::new();
    function.insert("arguments".into(), Value::String(String::new()));
    function.insert("name".into(), Value::String(String::new()));
    let mut slot = Map::new();
    slot.insert("function".into(), Value::Object(function));
    slot.insert("id".into(), Value::String(String::new()));
    slot.insert("type".into(), Value::String(String::new()));
    slot
}

fn log_anomalies(anomalies: &[MergeAnomaly]) {
    for anomaly in anomalies {
        tracing::warn!(%anomaly, "skipping streamed tool-call fragment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCall;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fold_all(fragments: Vec<Value>) -> Message {
        fragments
            .into_iter()
            .fold(TurnAccumulator::new("Agent"), TurnAccumulator::fold)
            .finish()
            .unwrap()
    }

    #[test]
    fn content_fragments_concatenate() {
        let message = fold_all(vec![
            json!({ "role": "assistant" }),
            json!({ "content": "Hi" }),
            json!({ "content": " there" }),
        ]);
        assert_eq!(message.content.as_deref(), Some("Hi there"));
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.sender.as_deref(), Some("Agent"));
        assert!(message.tool_calls.is_none());
    }

    #[test]
    fn split_content_matches_whole_content() {
        let text = "The quick brown fox";
        let whole = fold_all(vec![json!({ "content": text })]);
        for split in 0..=text.len() {
            let (a, b) = text.split_at(split);
            let pieces = fold_all(vec![json!({ "content": a }), json!({ "content": b })]);
            assert_eq!(pieces, whole);
        }
    }

    #[test]
    fn role_and_sender_are_set_not_appended() {
        let message = fold_all(vec![
            json!({ "role": "assistant", "sender": "Sales", "content": "" }),
            json!({ "role": "assistant", "content": "ok" }),
        ]);
        assert_eq!(message.sender.as_deref(), Some("Sales"));
        assert_eq!(message.content.as_deref(), Some("ok"));
    }

    #[test]
    fn tool_calls_route_by_index_and_keep_type() {
        let message = fold_all(vec![
            json!({ "role": "assistant", "content": null }),
            json!({ "tool_calls": [{ "index": 0, "id": "call_a", "type": "function",
                "function": { "name": "get_weather", "arguments": "" } }] }),
            json!({ "tool_calls": [{ "index": 1, "id": "call_b", "type": "function",
                "function": { "name": "get_time", "arguments": "{}" } }] }),
            json!({ "tool_calls": [{ "index": 0, "type": "function",
                "function": { "arguments": "{\"city\":" } }] }),
            json!({ "tool_calls": [{ "index": 0, "function": { "arguments": "\"Oslo\"}" } }] }),
        ]);
        assert_eq!(
            message.tool_calls.unwrap(),
            vec![
                ToolCall::function("call_a", "get_weather", r#"{"city":"Oslo"}"#),
                ToolCall::function("call_b", "get_time", "{}"),
            ]
        );
    }

    #[test]
    fn out_of_order_indices_flatten_in_index_order() {
        let message = fold_all(vec![
            json!({ "tool_calls": [{ "index": 2, "id": "c", "type": "function",
                "function": { "name": "third" } }] }),
            json!({ "tool_calls": [{ "index": 0, "id": "a", "type": "function",
                "function": { "name": "first" } }] }),
        ]);
        let names: Vec<_> = message
            .tool_calls()
            .iter()
            .map(|call| call.function.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "third"]);
    }

    #[test]
    fn bad_indices_are_skipped_and_merge_continues() {
        let mut acc = TurnAccumulator::new("Agent");
        let anomalies = acc.merge_chunk(json!({ "tool_calls": [
            { "id": "lost", "function": { "name": "x" } },
            { "index": "zero", "id": "lost" },
            { "index": -1, "id": "lost" },
            { "index": 9000, "id": "lost" },
        ] }));
        assert_eq!(
            anomalies,
            vec![
                MergeAnomaly::MissingIndex,
                MergeAnomaly::InvalidIndex(json!("zero")),
                MergeAnomaly::InvalidIndex(json!(-1)),
                MergeAnomaly::IndexOutOfRange(9000),
            ]
        );
        assert_eq!(acc.tool_call_count(), 0);

        let anomalies = acc.merge_chunk(json!({ "tool_calls": [{ "index": 0, "id": "kept",
            "type": "function", "function": { "name": "ok", "arguments": "{}" } }] }));
        assert!(anomalies.is_empty());
        let message = acc.finish().unwrap();
        assert_eq!(message.tool_calls().len(), 1);
        assert_eq!(message.tool_calls()[0].id, "kept");
    }

    #[test]
    fn merge_fields_replaces_type_and_ignores_scalars() {
        let mut target = json!({ "type": "function", "id": "a", "n": 1 })
            .as_object()
            .cloned()
            .unwrap();
        let source = json!({ "type": "function", "id": "b", "n": 5, "flag": true, "new": "x" });
        merge_fields(&mut target, source.as_object().unwrap());
        assert_eq!(
            Value::Object(target),
            json!({ "type": "function", "id": "ab", "n": 1, "new": "x" })
        );
    }

    #[test]
    fn non_object_fragment_is_reported() {
        let mut acc = TurnAccumulator::new("Agent");
        let anomalies = acc.merge_chunk(json!("oops"));
        assert_eq!(anomalies, vec![MergeAnomaly::NotAnObject(json!("oops"))]);
        acc.merge_chunk(json!({ "content": "still fine" }));
        assert_eq!(acc.content(), "still fine");
    }
}
