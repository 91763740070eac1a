//! Chat-completions HTTP oracle (OpenAI-compatible).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{ChatRole, ConversationEntry, FunctionSchema, Oracle, OracleError, OracleReply, OracleRequest};

pub const DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct ChatCompletionsOracle {
    config: OracleConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    arguments: String,
}

impl ChatCompletionsOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn body(&self, request: &OracleRequest) -> Value {
        let messages: Vec<ChatMessage<'_>> = request.messages.iter().map(to_message).collect();
        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
        });
        if let Some(function) = &request.function {
            body["functions"] = json!([function_json(function)]);
            body["function_call"] = json!("auto");
        }
        body
    }
}

fn to_message(entry: &ConversationEntry) -> ChatMessage<'_> {
    ChatMessage {
        role: entry.role.as_str(),
        content: &entry.content,
        name: match entry.role {
            ChatRole::Function => entry.name.as_deref().or(Some("unknown")),
            _ => entry.name.as_deref(),
        },
    }
}

fn function_json(function: &FunctionSchema) -> Value {
    let mut field = json!({
        "type": "string",
        "description": "A chess move in coordinate notation, e.g. e2e4 or e7e8q",
    });
    if let Some(choices) = &function.choices {
        field["enum"] = json!(choices);
    }
    let mut properties = serde_json::Map::new();
    properties.insert(function.field.clone(), field);
    json!({
        "name": function.name,
        "description": function.description,
        "parameters": {
            "type": "object",
            "properties": properties,
            "required": [function.field],
        },
    })
}

/// Map a decoded response onto the reply variants. A function call whose
/// arguments carry the expected field becomes `StructuredField`; anything
/// else falls back to text.
fn interpret(response: ChatResponse, field: Option<&str>) -> Result<OracleReply, OracleError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| OracleError::Decode("response has no choices".to_string()))?;

    if let Some(call) = message.function_call {
        let value = serde_json::from_str::<Value>(&call.arguments)
            .ok()
            .and_then(|args| {
                let key = field.unwrap_or("move");
                args.get(key).and_then(Value::as_str).map(|v| (key.to_string(), v.to_string()))
            });
        return Ok(match value {
            Some((name, value)) => OracleReply::StructuredField { name, value },
            None => OracleReply::PlainText(call.arguments),
        });
    }

    Ok(OracleReply::PlainText(message.content.unwrap_or_default()))
}

#[async_trait]
impl Oracle for ChatCompletionsOracle {
    async fn complete(&self, request: OracleRequest) -> Result<OracleReply, OracleError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OracleError::Unavailable("OPENAI_API_KEY is not set".to_string()))?;

        tracing::debug!(
            messages = request.messages.len(),
            constrained = request.function.is_some(),
            "Sending oracle request"
        );

        let resp = self
            .http
            .post(&self.config.url)
            .bearer_auth(api_key)
            .json(&self.body(&request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Unavailable(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "Oracle returned an error status");
            return Err(OracleError::Http { status, body });
        }

        let decoded: ChatResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout
            } else {
                OracleError::Decode(e.to_string())
            }
        })?;

        let field = request.function.as_ref().map(|f| f.field.as_str());
        interpret(decoded, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: Value) -> ChatResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_function_call_becomes_structured_field() {
        let r = response(json!({
            "choices": [{"message": {"content": null, "function_call": {"name": "get_next_move", "arguments": "{\"move\": \"e2e4\"}"}}}]
        }));
        assert_eq!(
            interpret(r, Some("move")).unwrap(),
            OracleReply::StructuredField {
                name: "move".into(),
                value: "e2e4".into()
            }
        );
    }

    #[test]
    fn test_content_becomes_plain_text() {
        let r = response(json!({"choices": [{"message": {"content": "I like e4."}}]}));
        assert_eq!(interpret(r, None).unwrap(), OracleReply::PlainText("I like e4.".into()));
    }

    #[test]
    fn test_malformed_arguments_fall_back_to_text() {
        let r = response(json!({
            "choices": [{"message": {"function_call": {"name": "get_next_move", "arguments": "e2e4"}}}]
        }));
        assert_eq!(interpret(r, Some("move")).unwrap(), OracleReply::PlainText("e2e4".into()));
    }

    #[test]
    fn test_empty_choices_is_decode_error() {
        let r = response(json!({"choices": []}));
        assert!(matches!(interpret(r, None), Err(OracleError::Decode(_))));
    }

    #[test]
    fn test_request_body_carries_enum() {
        let oracle = ChatCompletionsOracle::new(OracleConfig::default()).unwrap();
        let request = OracleRequest {
            messages: vec![ConversationEntry::system("hi")],
            function: Some(FunctionSchema {
                name: "get_next_move".into(),
                description: "Play a move".into(),
                field: "move".into(),
                choices: Some(vec!["e2e4".into(), "d2d4".into()]),
            }),
        };
        let body = oracle.body(&request);
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["function_call"], "auto");
        assert_eq!(
            body["functions"][0]["parameters"]["properties"]["move"]["enum"],
            json!(["e2e4", "d2d4"])
        );
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "hi"}));
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let oracle = ChatCompletionsOracle::new(OracleConfig::default()).unwrap();
        let request = OracleRequest {
            messages: vec![],
            function: None,
        };
        assert!(matches!(oracle.complete(request).await, Err(OracleError::Unavailable(_))));
    }
}
