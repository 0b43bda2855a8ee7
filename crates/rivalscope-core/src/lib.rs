// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod agent;
mod error;
mod events;
mod prompts;

pub use agent::{Agent, LoopState, TurnOutcome, FALLBACK_RESPONSE};
pub use error::AgentError;
pub use events::AgentEvent;
pub use prompts::system_prompt;
pub use rivalscope_model::Conversation;
