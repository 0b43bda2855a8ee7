// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

/// Export format for a finished analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Markdown report
    Md,
    /// Self-contained HTML page
    Html,
    /// Full JSON payload including every tool result
    Json,
}

/// Live source to query with `rivalscope fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Patents,
    Jobs,
    News,
    Github,
}

#[derive(Parser, Debug)]
#[command(
    name = "rivalscope",
    about = "Competitive intelligence from patents, hiring, news and GitHub activity",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question and print the analysis
    Ask {
        /// The question, e.g. "What is Anthropic's strategy?"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Write the report after the answer: `--export md report.md`
        #[arg(long, num_args = 2, value_names = ["FORMAT", "PATH"])]
        export: Option<Vec<String>>,
    },
    /// Interactive session; history is kept until `/clear`
    Chat,
    /// Fetch one live source, store the records and print them as JSON
    Fetch {
        #[arg(value_enum)]
        source: SourceArg,

        /// Company to look up (defaults to `sources.default_company`)
        #[arg(long)]
        company: Option<String>,

        /// News window in days
        #[arg(long)]
        days_back: Option<i64>,

        /// Maximum number of patents
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Compute the hiring-based competitive threat score for a company
    Score {
        #[arg(long)]
        company: Option<String>,
    },
    /// Serve the HTTP fetch endpoints
    Serve {
        /// Listen address (defaults to `server.bind`)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Print the effective configuration and exit
    ShowConfig,
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "rivalscope", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_joins_words_and_parses_export() {
        let cli = Cli::parse_from([
            "rivalscope", "ask", "What", "is", "OpenAI", "doing?", "--export", "json", "out.json",
        ]);
        match cli.command {
            Commands::Ask { query, export } => {
                assert_eq!(query.join(" "), "What is OpenAI doing?");
                assert_eq!(export, Some(vec!["json".to_string(), "out.json".to_string()]));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["rivalscope", "fetch", "jobs", "--company", "openai", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Fetch { source: SourceArg::Jobs, company: Some(ref c), .. } if c == "openai"
        ));
    }

    #[test]
    fn export_format_is_case_insensitive() {
        assert_eq!(ExportFormat::from_str("HTML", true), Ok(ExportFormat::Html));
        assert!(ExportFormat::from_str("pdf", true).is_err());
    }
}
