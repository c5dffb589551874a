//! Output formatting for CLI commands.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::cli::args::{OutputFormat, SarissaQueryArgs};
use crate::error::Result;
use crate::index::DocId;
use crate::query_parser::TokenList;
use crate::search::Explanation;

/// Result of tokenizing a query string.
#[derive(Debug, Serialize)]
pub struct LexResult {
    pub query: String,
    pub tokens: TokenList,
}

/// One hit of a search.
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub doc: DocId,
    pub score: f32,
    pub fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

/// Result structure for search operations.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    /// The query as given.
    pub query: String,
    /// The query after rewriting.
    pub rewritten: String,
    pub hits: Vec<SearchHit>,
    pub total_hits: usize,
    pub max_score: f32,
    pub duration_ms: u64,
}

/// Plain-text rendering of a command result.
pub trait HumanOutput {
    fn render_human(&self) -> String;
}

impl HumanOutput for LexResult {
    fn render_human(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            let _ = writeln!(out, "{:<10} {}", token.kind().name(), token.text());
        }
        out
    }
}

impl HumanOutput for SearchResults {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Query: {}", self.query);
        if self.rewritten != self.query {
            let _ = writeln!(out, "Rewritten: {}", self.rewritten);
        }
        let _ = writeln!(out, "Search Results:");
        let _ = writeln!(out, "═══════════════");

        for (i, hit) in self.hits.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Result {}: doc {} (Score: {:.3})", i + 1, hit.doc, hit.score);
            let _ = writeln!(out, "─────────────");
            for (field_name, text) in &hit.fields {
                let _ = writeln!(out, "{field_name}: {text}");
            }
            if let Some(explanation) = &hit.explanation {
                let _ = write!(out, "{explanation}");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Total hits: {}", self.total_hits);
        let _ = writeln!(out, "Search time: {}ms", self.duration_ms);
        out
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(result: &T, args: &SarissaQueryArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", result.render_human());
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SarissaQueryArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}
