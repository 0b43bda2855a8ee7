// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod github;
mod jobs;
mod news;
mod patents;

pub use github::GetGithubTool;
pub use jobs::GetJobsTool;
pub use news::GetNewsTool;
pub use patents::GetPatentsTool;

use serde_json::{json, Value};

/// Parameter schema shared by the store-backed tools.
fn company_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "company": {
                "type": "string",
                "description": "Company name"
            }
        },
        "required": ["company"]
    })
}
