// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::time::Duration;

use serde_json::Value;

/// Events emitted by the agent during a single turn.
/// Consumers (the CLI) subscribe to these to show progress while tools run.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// A request is about to be sent to the model (1-based).
    ModelRequest { round: u32 },
    /// The model requested a tool call
    ToolCallStarted { name: String, args: Value },
    /// A tool call finished; `count` is the number of records it returned
    ToolCallFinished { name: String, count: usize, is_error: bool },
    /// The model rate-limited us; the agent sleeps `delay` before retrying
    RateLimited { attempt: u32, delay: Duration },
    /// The final answer text of the turn
    TextComplete(String),
    /// The round-trip ceiling was hit while the model still wanted tools
    CeilingReached,
    /// The agent has finished processing the current user turn
    TurnComplete,
}
