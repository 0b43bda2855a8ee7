// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rivalscope_config::{AgentConfig, RetryConfig};
use rivalscope_model::{
    generate_with_backoff, Backoff, Conversation, GenerateRequest, ModelProvider, Part, Role,
    ToolDeclaration, Turn,
};
use rivalscope_tools::{ToolCallRecord, ToolRegistry};

use crate::{events::AgentEvent, prompts::system_prompt, AgentError};

/// Answer given when the model produced nothing usable within the turn.
pub const FALLBACK_RESPONSE: &str =
    "I apologize, but I encountered an issue generating the analysis. Please try again.";

/// Where a turn is in its request/execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingModel,
    ExecutingTools,
    Done,
}

/// Result of one completed user turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final answer shown to the user.
    pub text: String,
    /// Every tool call of the turn, in execution order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Model requests sent during the turn.
    pub round_trips: u32,
    pub state: LoopState,
    pub hit_ceiling: bool,
}

/// The orchestration agent.  Drives the model ↔ tool loop for one user turn
/// at a time; the conversation itself is owned by the caller.
pub struct Agent {
    model: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    backoff: Backoff,
    system_prompt: String,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
        retry: &RetryConfig,
    ) -> Self {
        let system_prompt = system_prompt(config.system_prompt.as_deref());
        Self { model, tools, config, backoff: Backoff::from_config(retry), system_prompt }
    }

    pub fn model(&self) -> &dyn ModelProvider {
        self.model.as_ref()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools
            .schemas()
            .into_iter()
            .map(|s| ToolDeclaration {
                name: s.name,
                description: s.description,
                parameters: s.parameters,
            })
            .collect()
    }

    /// Run one user turn to completion.
    ///
    /// Appends the query, the model's turns and the tool results to
    /// `conversation`.  On error the conversation is truncated back to its
    /// length before the call, so a failed turn leaves no trace.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        query: &str,
        events: Option<&mpsc::Sender<AgentEvent>>,
    ) -> Result<TurnOutcome, AgentError> {
        let checkpoint = conversation.len();
        match self.drive(conversation, query, events).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(error = %e, "turn failed, rolling back conversation");
                conversation.truncate(checkpoint);
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        conversation: &mut Conversation,
        query: &str,
        events: Option<&mpsc::Sender<AgentEvent>>,
    ) -> Result<TurnOutcome, AgentError> {
        info!(model = self.model.model_name(), "user query: {query}");
        conversation.push(Turn::user(query));

        let declarations = self.declarations();
        let ceiling = self.config.max_round_trips.max(1);
        let mut state = LoopState::AwaitingModel;
        let mut pending: Vec<(String, Value)> = Vec::new();
        let mut tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut round_trips = 0u32;
        let mut hit_ceiling = false;
        let mut text = String::new();

        loop {
            match state {
                LoopState::AwaitingModel => {
                    round_trips += 1;
                    emit(events, AgentEvent::ModelRequest { round: round_trips }).await;

                    let req = GenerateRequest {
                        system_instruction: Some(self.system_prompt.clone()),
                        contents: conversation.turns().to_vec(),
                        tools: declarations.clone(),
                    };
                    let reply = generate_with_backoff(
                        self.model.as_ref(),
                        &req,
                        &self.backoff,
                        |attempt, delay| {
                            if let Some(tx) = events {
                                let _ = tx.try_send(AgentEvent::RateLimited { attempt, delay });
                            }
                        },
                    )
                    .await?;

                    if reply.has_function_calls() {
                        if round_trips >= ceiling {
                            // The unanswered calls are not recorded so the
                            // conversation stays valid for the next turn.
                            warn!(round_trips, "round-trip ceiling reached with tools pending");
                            emit(events, AgentEvent::CeilingReached).await;
                            hit_ceiling = true;
                            text = FALLBACK_RESPONSE.to_string();
                            conversation.push(Turn::model(FALLBACK_RESPONSE));
                            state = LoopState::Done;
                            continue;
                        }
                        pending = reply
                            .function_calls()
                            .into_iter()
                            .map(|(name, args)| (name.to_string(), args.clone()))
                            .collect();
                        debug!(round = round_trips, calls = pending.len(), "model requested tools");
                        conversation.push(reply.into_turn());
                        state = LoopState::ExecutingTools;
                    } else {
                        let answer = reply.joined_text();
                        if answer.trim().is_empty() {
                            warn!(round = round_trips, "model returned an empty reply");
                            text = FALLBACK_RESPONSE.to_string();
                            conversation.push(Turn::model(FALLBACK_RESPONSE));
                        } else {
                            text = answer;
                            conversation.push(reply.into_turn());
                        }
                        state = LoopState::Done;
                    }
                }

                LoopState::ExecutingTools => {
                    let mut responses = Vec::with_capacity(pending.len());
                    for (name, args) in pending.drain(..) {
                        info!(round = round_trips, "function call: {name}({args})");
                        emit(
                            events,
                            AgentEvent::ToolCallStarted { name: name.clone(), args: args.clone() },
                        )
                        .await;

                        let payload = self.tools.dispatch(&name, &args).await;
                        emit(
                            events,
                            AgentEvent::ToolCallFinished {
                                name: name.clone(),
                                count: payload.count(),
                                is_error: payload.is_error(),
                            },
                        )
                        .await;

                        responses.push(Part::function_response(
                            name.clone(),
                            json!({ "result": payload.to_value() }),
                        ));
                        tool_calls.push(ToolCallRecord { name, arguments: args, result: payload });
                    }
                    // All results of one batch go back in a single user turn.
                    conversation.push(Turn { role: Role::User, parts: responses });
                    state = LoopState::AwaitingModel;
                }

                LoopState::Done => break,
            }
        }

        emit(events, AgentEvent::TextComplete(text.clone())).await;
        emit(events, AgentEvent::TurnComplete).await;
        info!(round_trips, tool_calls = tool_calls.len(), hit_ceiling, "turn complete");

        Ok(TurnOutcome { text, tool_calls, round_trips, state, hit_ceiling })
    }
}

async fn emit(events: Option<&mpsc::Sender<AgentEvent>>, event: AgentEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}
