//! Streaming run events.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::types::Response;

/// One item of a streamed run.
///
/// Each model turn produces `Start`, its raw deltas, then `End`; the run
/// concludes with exactly one `Response`.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Start,
    /// Raw delta fragment; assistant-origin deltas carry a `sender` key.
    Delta(Value),
    End,
    Response(Response),
}

impl StreamEvent {
    pub fn is_delim(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }

    pub fn as_delta(&self) -> Option<&Value> {
        match self {
            Self::Delta(delta) => Some(delta),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Response(response) => Some(response),
            _ => None,
        }
    }
}

impl Serialize for StreamEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Start => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("delim", "start")?;
                map.end()
            }
            Self::End => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("delim", "end")?;
                map.end()
            }
            Self::Delta(delta) => delta.serialize(serializer),
            Self::Response(response) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("response", response)?;
                map.end()
            }
        }
    }
}
