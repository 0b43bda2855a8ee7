// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Google Gemini driver for the native Generative Language API.
//!
//! Uses the non-streaming `generateContent` endpoint.  Function calls and
//! function responses travel as `functionCall` / `functionResponse` parts.
//!
//! # Auth
//! API key via the `x-goog-api-key` header.
//!
//! # Endpoint pattern
//! `POST https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent`

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{GenerateRequest, ModelError, ModelReply, Part, Role, Turn, Usage};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    model: String,
    api_key: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(
        model: String,
        api_key: String,
        base_url: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        top_p: Option<f32>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            model,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            max_tokens: max_tokens.unwrap_or(16_384),
            temperature: temperature.unwrap_or(0.7),
            top_p: top_p.unwrap_or(0.95),
            client,
        })
    }

    fn request_body(&self, req: &GenerateRequest) -> Value {
        let contents: Vec<Value> = req.contents.iter().map(turn_to_gemini).collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.temperature,
                "topP": self.top_p,
                "maxOutputTokens": self.max_tokens,
            }
        });
        if let Some(system) = &req.system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        if !req.tools.is_empty() {
            let function_declarations: Vec<Value> = req
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": function_declarations }]);
        }
        body
    }
}

#[async_trait]
impl crate::ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "google"
    }
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, req: &GenerateRequest) -> Result<ModelReply, ModelError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        debug!(model = %self.model, turns = req.contents.len(), "sending Gemini request");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(req))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &text));
        }

        let v: Value =
            serde_json::from_str(&text).map_err(|e| ModelError::Decode(e.to_string()))?;
        Ok(parse_reply(&v))
    }
}

/// Convert a conversation turn into a Gemini `Content` object.
fn turn_to_gemini(turn: &Turn) -> Value {
    let role = match turn.role {
        Role::User => "user",
        Role::Model => "model",
    };
    let parts: Vec<Value> = turn
        .parts
        .iter()
        .map(|p| match p {
            Part::Text(t) => json!({ "text": t }),
            Part::FunctionCall { name, args } => json!({
                "functionCall": { "name": name, "args": args }
            }),
            Part::FunctionResponse { name, response } => json!({
                "functionResponse": { "name": name, "response": response }
            }),
        })
        .collect();
    json!({ "role": role, "parts": parts })
}

fn classify_error(status: u16, body: &str) -> ModelError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let api_status = parsed
        .as_ref()
        .and_then(|v| v["error"]["status"].as_str())
        .unwrap_or_default();
    let message = parsed
        .as_ref()
        .and_then(|v| v["error"]["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());

    if status == 429 || api_status == "RESOURCE_EXHAUSTED" {
        ModelError::RateLimited(message)
    } else {
        ModelError::Api { status, message }
    }
}

/// Extract the first candidate's parts.  Thought parts are dropped; a reply
/// without candidates (e.g. blocked prompt) yields no parts.
fn parse_reply(v: &Value) -> ModelReply {
    let candidate = &v["candidates"][0];
    let mut parts = Vec::new();

    if let Some(raw_parts) = candidate["content"]["parts"].as_array() {
        for part in raw_parts {
            if part.get("thought").and_then(Value::as_bool) == Some(true) {
                continue;
            }
            if let Some(fc) = part.get("functionCall") {
                let name = fc["name"].as_str().unwrap_or_default().to_string();
                let args = match &fc["args"] {
                    Value::Null => json!({}),
                    other => other.clone(),
                };
                parts.push(Part::FunctionCall { name, args });
            } else if let Some(text) = part["text"].as_str() {
                parts.push(Part::Text(text.to_string()));
            }
        }
    }

    let usage = v.get("usageMetadata").map(|meta| Usage {
        prompt_tokens: meta["promptTokenCount"].as_u64().unwrap_or(0) as u32,
        output_tokens: meta["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
    });

    ModelReply {
        parts,
        usage,
        finish_reason: candidate["finishReason"].as_str().map(str::to_string),
    }
}
