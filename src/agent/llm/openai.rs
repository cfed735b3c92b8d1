//! OpenAI-compatible chat completions engine.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Error;
use crate::tools::ActionDescriptor;
use crate::Result;

use super::super::conversation::Conversation;
use super::super::message::{ActionInvocation, Message, Role};
use super::{ChatCompletion, Decision, DecisionEngine, Usage};

/// Chat completions client for OpenAI and compatible servers.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OpenAiClient {
    /// Create a new client.
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: 0.7,
            client: Client::new(),
        }
    }

    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            temperature: config.temperature,
            ..Self::new(&config.api_key, &config.base_url, &config.model)
        }
    }

    fn build_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, conversation: &Conversation, catalog: &[ActionDescriptor]) -> Value {
        let mut request = json!({
            "model": self.model,
            "messages": convert_messages(conversation),
            "temperature": self.temperature,
        });

        if !catalog.is_empty() {
            let tools: Vec<Value> = catalog
                .iter()
                .map(|d| json!({"type": "function", "function": d.to_function_schema()}))
                .collect();
            request["tools"] = json!(tools);
        }

        request
    }
}

/// Convert a conversation into chat completion messages.
///
/// Consecutive action results from the same round trip become one assistant
/// message carrying `tool_calls`, followed by one `tool` message per result.
pub fn convert_messages(conversation: &Conversation) -> Vec<Value> {
    let messages = conversation.messages();
    let mut out = Vec::with_capacity(messages.len());
    let mut i = 0;

    while i < messages.len() {
        let m = &messages[i];
        match (m.role, m.invocation.as_ref()) {
            (Role::ActionResult, Some(record)) => {
                let round = record.round;
                let batch: Vec<&Message> = messages[i..]
                    .iter()
                    .take_while(|m| {
                        m.role == Role::ActionResult
                            && m.invocation.as_ref().map(|r| r.round) == Some(round)
                    })
                    .collect();

                let calls: Vec<Value> = batch
                    .iter()
                    .filter_map(|m| m.invocation.as_ref())
                    .map(|r| {
                        let arguments = match r.arguments {
                            Value::String(ref raw) => raw.clone(),
                            ref other => other.to_string(),
                        };
                        json!({
                            "id": r.id,
                            "type": "function",
                            "function": {"name": r.name, "arguments": arguments}
                        })
                    })
                    .collect();
                out.push(json!({"role": "assistant", "content": null, "tool_calls": calls}));

                for m in &batch {
                    let id = m.invocation.as_ref().map(|r| r.id.as_str()).unwrap_or_default();
                    out.push(json!({"role": "tool", "tool_call_id": id, "content": m.content}));
                }
                i += batch.len();
            }
            _ => {
                let role = match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    // Results without a record are sent as plain text
                    Role::Agent | Role::ActionResult => "assistant",
                };
                out.push(json!({"role": role, "content": m.content}));
                i += 1;
            }
        }
    }

    out
}

/// Turn a chat completion into a decision.
pub fn parse_completion(completion: ChatCompletion) -> Result<(Decision, Usage)> {
    let usage = completion
        .usage
        .as_ref()
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens.unwrap_or(0),
            completion_tokens: u.completion_tokens.unwrap_or(0),
            total_tokens: u.total_tokens.unwrap_or(0),
        })
        .unwrap_or_default();

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse("No choices in response".to_string()))?;

    debug!("Finish reason: {:?}", choice.finish_reason);

    if choice.message.tool_calls.is_empty() {
        let content = choice.message.content.unwrap_or_default();
        return Ok((Decision::answer(content), usage));
    }

    if let Some(ref text) = choice.message.content {
        if !text.is_empty() {
            debug!("Dropping text sent alongside tool calls: {} chars", text.len());
        }
    }

    let invocations = choice
        .message
        .tool_calls
        .into_iter()
        .map(|tc| {
            // Undecodable arguments go to the registry as-is and fail validation there
            let arguments = if tc.function.arguments.trim().is_empty() {
                json!({})
            } else {
                serde_json::from_str(&tc.function.arguments).unwrap_or_else(|e| {
                    warn!("Tool call {} has invalid JSON arguments: {}", tc.id, e);
                    Value::String(tc.function.arguments.clone())
                })
            };
            ActionInvocation::with_id(tc.id, tc.function.name, arguments)
        })
        .collect();

    Ok((Decision::Invoke(invocations), usage))
}

#[async_trait]
impl DecisionEngine for OpenAiClient {
    async fn decide(
        &self,
        conversation: &Conversation,
        catalog: &[ActionDescriptor],
    ) -> Result<Decision> {
        let request = self.build_request(conversation, catalog);

        let response = self
            .client
            .post(self.build_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        let completion: ChatCompletion = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("Unexpected response shape: {e}")))?;

        let (decision, usage) = parse_completion(completion)?;
        debug!("Engine usage: {} total tokens", usage.total_tokens);
        Ok(decision)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
