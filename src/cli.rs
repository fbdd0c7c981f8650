//! Command-line interface argument parsing.

use budget_insight::FallbackMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Budget Insight - ask plain-language questions about budget spreadsheets
///
/// Examples:
///   budget-insight ask --data budget.csv "What is the total budget?"
///   budget-insight ask --data budget.json "Show the yearly trend" --format json
///   budget-insight chat --data budget.csv
///   budget-insight --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for budget-insight.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// How to answer questions that match no analysis
    #[arg(long, value_name = "MODE", global = true, env = "BUDGET_INSIGHT_FALLBACK")]
    pub fallback: Option<FallbackMode>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Generate a default budget-insight.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Answer a single question and exit
    Ask {
        /// Budget file to load (.csv or .json)
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// The question, e.g. "Which budgets did we miss?"
        question: String,

        /// Output format
        #[arg(long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Interactive session: one question per line, `:quit` to exit
    Chat {
        /// Budget file to load (.csv or .json)
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,
    },
}

/// Output format for answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Narrative text (default)
    #[default]
    Text,
    /// Full insight as JSON, including chart data
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Filter directive for tracing; `--verbose` beats the config file.
    pub fn log_filter(&self, configured: &str) -> String {
        if self.verbose {
            "debug".to_string()
        } else {
            configured.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let args = Args::try_parse_from([
            "budget-insight",
            "ask",
            "--data",
            "budget.csv",
            "What is the total?",
            "--format",
            "json",
        ])
        .unwrap();

        match args.command {
            Some(Command::Ask {
                data,
                question,
                format,
            }) => {
                assert_eq!(data, PathBuf::from("budget.csv"));
                assert_eq!(question, "What is the total?");
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("expected ask, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_chat_with_global_flags() {
        let args = Args::try_parse_from([
            "budget-insight",
            "chat",
            "-d",
            "budget.json",
            "--fallback",
            "sampled",
            "-v",
        ])
        .unwrap();

        assert!(matches!(args.command, Some(Command::Chat { .. })));
        assert_eq!(args.fallback, Some(FallbackMode::Sampled));
        assert_eq!(args.log_filter("warn"), "debug");
    }

    #[test]
    fn test_ask_requires_data() {
        assert!(Args::try_parse_from(["budget-insight", "ask", "total?"]).is_err());
    }

    #[test]
    fn test_init_config_without_command() {
        let args = Args::try_parse_from(["budget-insight", "--init-config"]).unwrap();
        assert!(args.init_config);
        assert!(args.command.is_none());
        assert_eq!(args.log_filter("warn"), "warn");
    }
}
