// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::{GenerateRequest, ModelError, ModelReply, Part, Role};

/// Deterministic offline provider.  Echoes the last user text back as the
/// model response and never requests tools.
#[derive(Default)]
pub struct MockProvider;

#[async_trait]
impl crate::ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, req: &GenerateRequest) -> Result<ModelReply, ModelError> {
        let reply = req
            .contents
            .iter()
            .rev()
            .filter(|t| t.role == Role::User)
            .find_map(|t| {
                t.parts.iter().find_map(|p| match p {
                    Part::Text(text) => Some(text.clone()),
                    _ => None,
                })
            })
            .unwrap_or_else(|| "[no input]".into());
        Ok(ModelReply::text(format!("MOCK: {reply}")))
    }
}

/// A pre-scripted mock provider.  Each call to `generate` pops the next
/// scripted result from the front of the queue.  This lets tests specify
/// exact replies, including function calls and failures, without network
/// access.
pub struct ScriptedMockProvider {
    scripts: Arc<Mutex<Vec<Result<ModelReply, ModelError>>>>,
    /// Returned for every call once the script is exhausted.
    repeat: Option<ModelReply>,
    calls: Arc<AtomicUsize>,
    /// Every request seen by this provider, in order.
    pub requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl ScriptedMockProvider {
    pub fn new(scripts: Vec<Result<ModelReply, ModelError>>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts)),
            repeat: None,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience: provider that returns a single text reply.
    pub fn always_text(reply: impl Into<String>) -> Self {
        Self::new(vec![Ok(ModelReply::text(reply))])
    }

    /// Convenience: provider that requests one tool then answers in text.
    pub fn call_then_text(
        tool_name: impl Into<String>,
        args: Value,
        final_text: impl Into<String>,
    ) -> Self {
        Self::new(vec![
            Ok(ModelReply::calls([(tool_name.into(), args)])),
            Ok(ModelReply::text(final_text)),
        ])
    }

    /// Provider that answers every call with the same reply, forever.
    pub fn repeating(reply: ModelReply) -> Self {
        let mut p = Self::new(Vec::new());
        p.repeat = Some(reply);
        p
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl crate::ModelProvider for ScriptedMockProvider {
    fn name(&self) -> &str {
        "scripted-mock"
    }
    fn model_name(&self) -> &str {
        "scripted-mock-model"
    }

    async fn generate(&self, req: &GenerateRequest) -> Result<ModelReply, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req.clone());

        let next = {
            let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
            if scripts.is_empty() {
                None
            } else {
                Some(scripts.remove(0))
            }
        };
        match next {
            Some(result) => result,
            None => Ok(self
                .repeat
                .clone()
                .unwrap_or_else(|| ModelReply::text("[no more scripts]"))),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ModelProvider, Turn};

    fn req(text: &str) -> GenerateRequest {
        GenerateRequest { contents: vec![Turn::user(text)], ..Default::default() }
    }

    #[tokio::test]
    async fn mock_echoes_last_user_message() {
        let reply = MockProvider.generate(&req("hi")).await.unwrap();
        assert_eq!(reply.joined_text(), "MOCK: hi");
    }

    #[tokio::test]
    async fn scripted_pops_in_order_then_falls_back() {
        let p = ScriptedMockProvider::call_then_text("get_jobs", json!({"company": "x"}), "done");
        let first = p.generate(&req("q")).await.unwrap();
        assert!(first.has_function_calls());
        let second = p.generate(&req("q")).await.unwrap();
        assert_eq!(second.joined_text(), "done");
        let third = p.generate(&req("q")).await.unwrap();
        assert_eq!(third.joined_text(), "[no more scripts]");
        assert_eq!(p.call_count(), 3);
    }

    #[tokio::test]
    async fn repeating_never_runs_out() {
        let p = ScriptedMockProvider::repeating(ModelReply::calls([("get_news", json!({}))]));
        for _ in 0..5 {
            assert!(p.generate(&req("q")).await.unwrap().has_function_calls());
        }
        assert_eq!(p.requests.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn scripted_errors_are_returned() {
        let p = ScriptedMockProvider::new(vec![Err(ModelError::RateLimited("q".into()))]);
        assert!(p.generate(&req("q")).await.unwrap_err().is_rate_limited());
    }
}
