// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
pub mod builtin;
mod context;
mod payload;
mod registry;
mod tool;

pub use context::ToolContext;
pub use payload::{JobsResult, NewsResult, PatentsResult, ReposResult, ToolPayload};
pub use registry::{ToolRegistry, ToolSchema};
pub use tool::{Tool, ToolCallRecord};

use std::sync::Arc;

/// Registry with the four intelligence tools wired to `ctx`.
pub fn intelligence_registry(ctx: Arc<ToolContext>) -> ToolRegistry {
    let mut reg = ToolRegistry::new();
    reg.register(builtin::GetPatentsTool::new(ctx.clone()));
    reg.register(builtin::GetJobsTool::new(ctx.clone()));
    reg.register(builtin::GetNewsTool::new(ctx.clone()));
    reg.register(builtin::GetGithubTool::new(ctx));
    reg
}
