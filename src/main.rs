// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands, ExportFormat, SourceArg};
use rivalscope_config::Config;
use rivalscope_core::{Agent, AgentEvent, Conversation, TurnOutcome};
use rivalscope_report::{parse_forecasts, parse_sections, Report};
use rivalscope_server::AppState;
use rivalscope_sources::{competitive_score, SourceClient};
use rivalscope_store::{persist_all, DocumentStore};
use rivalscope_tools::{intelligence_registry, ToolContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        cli::print_completions(*shell);
        return Ok(());
    }

    let config = rivalscope_config::load(cli.config.as_deref())?;
    debug!(provider = %config.model.provider, model = %config.model.name, "configuration loaded");

    match cli.command {
        Commands::Completions { .. } => Ok(()),
        Commands::ShowConfig => {
            println!("{}", toml::to_string_pretty(&config).context("serializing config")?);
            Ok(())
        }
        Commands::Ask { query, export } => {
            let export = match export.as_deref() {
                Some([format, path]) => Some((parse_format(format)?, path.clone())),
                Some(_) => bail!("--export takes a format and a path"),
                None => None,
            };
            let agent = build_agent(&config)?;
            let mut conversation = Conversation::new();
            let outcome = run_with_progress(&agent, &mut conversation, &query.join(" ")).await?;
            println!("{}", outcome.text);
            print_forecasts(&outcome.text);
            if let Some((format, path)) = export {
                let report = to_report(&outcome, &config.sources.default_company);
                write_report(&report, format, Path::new(&path))?;
            }
            Ok(())
        }
        Commands::Chat => run_chat(&config).await,
        Commands::Fetch { source, company, days_back, limit } => {
            let company = company.unwrap_or_else(|| config.sources.default_company.clone());
            fetch_cmd(&config, source, &company, days_back, limit).await
        }
        Commands::Score { company } => {
            let company = company.unwrap_or_else(|| config.sources.default_company.clone());
            let sources = SourceClient::new(&config.sources)?;
            let outcome = sources.fetch_jobs(&company).await?;
            let score = competitive_score(&outcome.records);
            println!("{}", serde_json::to_string_pretty(&score)?);
            Ok(())
        }
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server.bind.clone());
            let state = AppState {
                sources: SourceClient::new(&config.sources)?,
                store: rivalscope_store::open(&config.store),
                tools: config.tools.clone(),
                body_limit: config.server.body_limit,
            };
            rivalscope_server::serve(&addr, Arc::new(state)).await?;
            Ok(())
        }
    }
}

/// Wire the model, the store-backed tools and the loop together.
fn build_agent(config: &Config) -> anyhow::Result<Agent> {
    let model = rivalscope_model::from_config(&config.model).context("creating model provider")?;
    let sources = SourceClient::new(&config.sources).context("creating HTTP client")?;
    let store = rivalscope_store::open(&config.store);
    let ctx = Arc::new(ToolContext::new(sources, store, config.tools.clone()));
    let tools = Arc::new(intelligence_registry(ctx));
    Ok(Agent::new(Arc::from(model), tools, config.agent.clone(), &config.model.retry))
}

/// Run one turn while a background task prints progress to stderr.
async fn run_with_progress(
    agent: &Agent,
    conversation: &mut Conversation,
    query: &str,
) -> anyhow::Result<TurnOutcome> {
    let (tx, mut rx) = mpsc::channel::<AgentEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_progress(&event);
        }
    });

    let result = agent.run_turn(conversation, query, Some(&tx)).await;
    drop(tx);
    let _ = printer.await;
    Ok(result?)
}

fn print_progress(event: &AgentEvent) {
    match event {
        AgentEvent::ToolCallStarted { name, args } => {
            eprintln!("→ {name} {args}");
        }
        AgentEvent::ToolCallFinished { name, count, is_error } => {
            if *is_error {
                eprintln!("✗ {name} failed");
            } else {
                eprintln!("✓ {name}: {count} records");
            }
        }
        AgentEvent::RateLimited { attempt, delay } => {
            eprintln!("rate limited (attempt {attempt}), retrying in {}s", delay.as_secs());
        }
        AgentEvent::CeilingReached => {
            eprintln!("tool-call limit reached");
        }
        AgentEvent::ModelRequest { .. } | AgentEvent::TextComplete(_) | AgentEvent::TurnComplete => {}
    }
}

/// One line per 30/60/90-day forecast with its stated confidence.
fn print_forecasts(answer: &str) {
    let Some(predictions) = parse_sections(answer).predictions else {
        return;
    };
    for f in parse_forecasts(&predictions) {
        eprintln!("{} [{} confidence]", f.horizon, f.confidence.as_str());
    }
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let agent = build_agent(config)?;
    let mut conversation = Conversation::new();
    let mut last_report: Option<Report> = None;

    eprintln!(
        "rivalscope chat ({}). Commands: /clear, /export <md|html|json> <path>, /quit",
        agent.model().model_name()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        io::stderr().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut words = command.split_whitespace();
            match words.next() {
                Some("quit") | Some("exit") => break,
                Some("clear") => {
                    conversation.clear();
                    last_report = None;
                    eprintln!("history cleared");
                }
                Some("export") => match (words.next(), words.next(), last_report.as_ref()) {
                    (_, _, None) => eprintln!("nothing to export yet"),
                    (Some(format), Some(path), Some(report)) => {
                        match parse_format(format).and_then(|f| write_report(report, f, Path::new(path))) {
                            Ok(()) => eprintln!("exported to {path}"),
                            Err(e) => eprintln!("export failed: {e:#}"),
                        }
                    }
                    _ => eprintln!("usage: /export <md|html|json> <path>"),
                },
                _ => eprintln!("unknown command: /{command}"),
            }
            continue;
        }

        match run_with_progress(&agent, &mut conversation, line).await {
            Ok(outcome) => {
                println!("{}\n", outcome.text);
                print_forecasts(&outcome.text);
                last_report = Some(to_report(&outcome, &config.sources.default_company));
            }
            Err(e) => eprintln!("error: {e:#}"),
        }
    }
    Ok(())
}

/// The report is about the company the tools were asked about; a turn that
/// called no tools is filed under the configured default.
fn to_report(outcome: &TurnOutcome, default_company: &str) -> Report {
    let company = outcome
        .tool_calls
        .iter()
        .find_map(|c| c.arguments.get("company").and_then(|v| v.as_str()))
        .unwrap_or(default_company);
    Report::new(company, outcome.text.clone(), outcome.tool_calls.clone())
}

fn parse_format(raw: &str) -> anyhow::Result<ExportFormat> {
    ExportFormat::from_str(raw, true)
        .map_err(|_| anyhow::anyhow!("unknown export format {raw:?} (expected md, html or json)"))
}

fn write_report(report: &Report, format: ExportFormat, path: &Path) -> anyhow::Result<()> {
    let body = match format {
        ExportFormat::Md => report.to_markdown(),
        ExportFormat::Html => report.to_html(),
        ExportFormat::Json => report.to_json().context("serializing report")?,
    };
    std::fs::write(path, body).with_context(|| format!("writing report {}", path.display()))
}

async fn fetch_cmd(
    config: &Config,
    source: SourceArg,
    company: &str,
    days_back: Option<i64>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let sources = SourceClient::new(&config.sources)?;
    let store = rivalscope_store::open(&config.store);

    let json = match source {
        SourceArg::Jobs => {
            let outcome = sources.fetch_jobs(company).await?;
            store_records(store.as_ref(), company, &outcome.records).await;
            serde_json::to_string_pretty(&outcome)?
        }
        SourceArg::News => {
            let days = days_back.unwrap_or(config.sources.news_days_back);
            let outcome = sources.fetch_news(company, days).await?;
            store_records(store.as_ref(), company, &outcome.records).await;
            serde_json::to_string_pretty(&outcome)?
        }
        SourceArg::Github => {
            let outcome = sources.fetch_github(company).await?;
            store_records(store.as_ref(), company, &outcome.records).await;
            serde_json::to_string_pretty(&outcome)?
        }
        SourceArg::Patents => {
            let max = config.tools.max_patent_limit.max(1) as usize;
            let limit = limit.unwrap_or(config.tools.default_patent_limit as usize).clamp(1, max);
            let outcome = sources.fetch_patents(company, limit).await?;
            store_records(store.as_ref(), company, &outcome.records).await;
            serde_json::to_string_pretty(&outcome)?
        }
    };
    println!("{json}");
    Ok(())
}

async fn store_records<R: rivalscope_store::StoreRecord>(
    store: &dyn DocumentStore,
    company: &str,
    records: &[R],
) {
    let summary = persist_all(store, company, records).await;
    eprintln!("stored {} records ({} failed)", summary.written, summary.failed);
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
