//! OpenAI Chat Completions API backend.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::SwarmConfig;
use crate::error::SwarmError;
use crate::types::Message;

use super::http::{
    bearer_headers, parse_sse_data, shared_client, status_to_error, SseData, SseLineBuffer,
};
use super::{Backend, CompletionRequest, FragmentStream};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions client for OpenAI and API-compatible servers.
pub struct OpenAiBackend {
    api_key: String,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Build from configuration; an API key is required.
    pub fn from_config(config: &SwarmConfig) -> Result<Self, SwarmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| SwarmError::Configuration("OPENAI_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key, config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request_body(&self, request: &CompletionRequest) -> Result<Value, SwarmError> {
        let mut body = serde_json::to_value(request)?;
        if let Some(Value::Array(messages)) = body.get_mut("messages") {
            for message in messages.iter_mut().filter_map(Value::as_object_mut) {
                message.remove("sender");
                message.remove("tool_name");
            }
        }
        Ok(body)
    }

    async fn post(&self, request: &CompletionRequest) -> Result<reqwest::Response, SwarmError> {
        let body = self.build_request_body(request)?;
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, stream = request.stream, "OpenAI chat completion");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }
        Ok(resp)
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Message, SwarmError> {
        let resp = self.post(request).await?;
        let data: OpenAiChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SwarmError::api(200, "No choices in OpenAI response"))?;
        Ok(choice.message)
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<FragmentStream, SwarmError> {
        let resp = self.post(request).await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer = SseLineBuffer::new();
            futures::pin_mut!(byte_stream);

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(SwarmError::Network(e));
                        break;
                    }
                };

                for line in buffer.push(&chunk) {
                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    match parse_sse_data(&line) {
                        Some(SseData::Done) => break 'read,
                        Some(SseData::Payload(data)) => match chunk_delta(data) {
                            Ok(Some(delta)) => yield Ok(delta),
                            Ok(None) => {}
                            Err(err) => {
                                yield Err(err);
                                break 'read;
                            }
                        },
                        None => {}
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Extract `choices[0].delta` from one stream chunk.
fn chunk_delta(data: &str) -> Result<Option<Value>, SwarmError> {
    let mut chunk: Value = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::warn!(error = %err, "skipping unparseable stream chunk");
            return Ok(None);
        }
    };
    if let Some(error) = chunk.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(SwarmError::api(200, message));
    }
    Ok(chunk
        .get_mut("choices")
        .and_then(|choices| choices.get_mut(0))
        .and_then(|choice| choice.get_mut("delta"))
        .map(Value::take))
}

// OpenAI API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_strips_local_message_fields() {
        let backend = OpenAiBackend::new("sk", Some("http://localhost:1234/v1/".into()));
        assert_eq!(backend.base_url(), "http://localhost:1234/v1");
        let mut assistant = Message::assistant("hello");
        assistant.sender = Some("Triage".into());
        let request = CompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![
                Message::system("sys"),
                assistant,
                Message::tool("call_1", "lookup", "42"),
            ],
            tools: None,
            tool_choice: None,
            parallel_tool_calls: None,
            stream: true,
        };
        let body = backend.build_request_body(&request).unwrap();
        assert_eq!(body["messages"][1], json!({ "role": "assistant", "content": "hello" }));
        assert_eq!(
            body["messages"][2],
            json!({ "role": "tool", "content": "42", "tool_call_id": "call_1" })
        );
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn chunk_delta_extracts_first_choice() {
        let delta = chunk_delta(r#"{"choices":[{"delta":{"content":"Hi"},"index":0}]}"#).unwrap();
        assert_eq!(delta, Some(json!({ "content": "Hi" })));
        assert_eq!(chunk_delta(r#"{"choices":[]}"#).unwrap(), None);
        assert_eq!(chunk_delta("not json").unwrap(), None);
        assert!(matches!(
            chunk_delta(r#"{"error":{"message":"overloaded"}}"#),
            Err(SwarmError::Api { ref message, .. }) if message == "overloaded"
        ));
    }

    #[test]
    fn from_config_requires_key() {
        assert!(matches!(
            OpenAiBackend::from_config(&SwarmConfig::default()),
            Err(SwarmError::Configuration(_))
        ));
        let config = SwarmConfig::default().with_api_key("sk-test");
        assert_eq!(OpenAiBackend::from_config(&config).unwrap().base_url(), DEFAULT_BASE_URL);
    }
}
