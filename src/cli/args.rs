//! Command line argument parsing for the sarissa-query tool using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// sarissa-query - tokenize query strings and run queries over small corpora
#[derive(Parser, Debug, Clone)]
#[command(name = "sarissa-query")]
#[command(about = "Tokenize query strings and evaluate queries over an in-memory index")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sarissa Contributors")]
#[command(long_about = None)]
pub struct SarissaQueryArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SarissaQueryArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the token stream of a query string
    Lex(LexArgs),

    /// Load documents into memory and run a query over them
    Search(SearchArgs),
}

/// Arguments for tokenizing a query
#[derive(Parser, Debug, Clone)]
pub struct LexArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Documents, one JSON object of field to text per line (JSONL)
    #[arg(short, long, value_name = "DOCUMENT_FILE")]
    pub docs: PathBuf,

    /// Query file (JSON). Document text is lower-cased when indexed, so
    /// term and pattern text should be lower-case too
    #[arg(long, value_name = "QUERY_FILE")]
    pub query: PathBuf,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Include a score explanation for every hit
    #[arg(long)]
    pub explain: bool,

    /// Only return documents holding a term that matches FIELD:PATTERN
    #[arg(long, value_name = "FIELD:PATTERN")]
    pub filter: Option<String>,

    /// Searcher configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_command() {
        let args = SarissaQueryArgs::try_parse_from(["sarissa-query", "lex", "title:foo*"]).unwrap();

        if let Command::Lex(lex_args) = args.command {
            assert_eq!(lex_args.query, "title:foo*");
        } else {
            panic!("Expected Lex command");
        }
    }

    #[test]
    fn test_search_command() {
        let args = SarissaQueryArgs::try_parse_from([
            "sarissa-query",
            "search",
            "--docs",
            "/tmp/docs.jsonl",
            "--query",
            "/tmp/query.json",
            "--limit",
            "3",
            "--explain",
            "--filter",
            "body:a*",
        ])
        .unwrap();

        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.docs, PathBuf::from("/tmp/docs.jsonl"));
            assert_eq!(search_args.query, PathBuf::from("/tmp/query.json"));
            assert_eq!(search_args.limit, 3);
            assert!(search_args.explain);
            assert_eq!(search_args.filter.as_deref(), Some("body:a*"));
            assert!(search_args.config.is_none());
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        // Default verbosity
        let args = SarissaQueryArgs::try_parse_from(["sarissa-query", "lex", "a"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        // Multiple verbose flags
        let args = SarissaQueryArgs::try_parse_from(["sarissa-query", "-vv", "lex", "a"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        // Quiet flag
        let args =
            SarissaQueryArgs::try_parse_from(["sarissa-query", "--quiet", "-vvv", "lex", "a"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            SarissaQueryArgs::try_parse_from(["sarissa-query", "--format", "json", "lex", "a"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(SarissaQueryArgs::try_parse_from(["sarissa-query", "--format", "yaml", "lex", "a"]).is_err());
    }
}
