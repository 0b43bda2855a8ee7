// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Company-name resolution: a static alias table first, then a fixed list
//! of spelling variations probed against the source.  No fuzzy matching.

pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Candidate identifiers in probe order, deduplicated.
pub fn variations(name: &str) -> Vec<String> {
    let literal = name.trim().to_string();
    let lower = normalize(name);
    let candidates = [
        literal,
        lower.clone(),
        format!("{lower}s"),
        lower.strip_suffix('s').unwrap_or(&lower).to_string(),
        lower.replace(' ', "-"),
        lower.replace(' ', ""),
    ];

    let mut out: Vec<String> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !c.is_empty() && !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

pub fn github_alias(name: &str) -> Option<&'static str> {
    Some(match normalize(name).as_str() {
        "anthropic" => "anthropics",
        "openai" => "openai",
        "google" => "google",
        "deepmind" | "google deepmind" => "google-deepmind",
        "databricks" => "databricks",
        "cohere" => "cohere-ai",
        "hugging face" | "huggingface" => "huggingface",
        "meta" => "meta-llama",
        "stability" | "stability ai" => "Stability-AI",
        "microsoft" => "microsoft",
        "amazon" => "amzn",
        _ => return None,
    })
}

pub fn greenhouse_alias(name: &str) -> Option<&'static str> {
    Some(match normalize(name).as_str() {
        "anthropic" => "anthropic",
        "openai" => "openai",
        "google" => "google",
        _ => return None,
    })
}

/// Assignee search string for the patents index.  There is no existence
/// endpoint, so unknown names pass through normalised.
pub fn patent_assignee(name: &str) -> String {
    let norm = normalize(name);
    let alias = match norm.as_str() {
        "google" | "alphabet" => "Google LLC",
        "deepmind" | "google deepmind" => "DeepMind Technologies",
        "microsoft" => "Microsoft Technology Licensing",
        "meta" | "facebook" => "Meta Platforms",
        "amazon" => "Amazon Technologies",
        "ibm" => "International Business Machines",
        "openai" => "OpenAI",
        "anthropic" => "Anthropic",
        "nvidia" => "Nvidia",
        _ => return norm,
    };
    alias.to_string()
}
