//! Command implementations for the sarissa-query tool.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::{debug, info};
use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SearchConfig;
use crate::error::{Result, SarissaError};
use crate::index::{MemoryIndex, Term};
use crate::query::{Query, WildcardFilter};
use crate::query_parser::tokenize;
use crate::search::{Collector, DocCollector, Filter, ScoreDoc, Searcher, TopDocsCollector};

/// Execute a CLI command.
pub fn execute_command(args: SarissaQueryArgs) -> Result<()> {
    match &args.command {
        Command::Lex(lex_args) => lex_query(lex_args, &args),
        Command::Search(search_args) => search_documents(search_args, &args),
    }
}

/// Tokenize a query string and print its tokens.
fn lex_query(args: &LexArgs, cli_args: &SarissaQueryArgs) -> Result<()> {
    let tokens = tokenize(&args.query)?;
    debug!("lexed {} tokens from {:?}", tokens.len(), args.query);
    output_result(
        &LexResult {
            query: args.query.clone(),
            tokens,
        },
        cli_args,
    )
}

/// Load documents, run the query and print the hits.
fn search_documents(args: &SearchArgs, cli_args: &SarissaQueryArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SearchConfig::from_file(path)?,
        None => SearchConfig::default(),
    };
    let (index, documents) = load_documents(&args.docs, &config.default_field)?;
    info!(
        "loaded {} documents ({} terms) from {}",
        documents.len(),
        index.term_count(),
        args.docs.display()
    );
    let query = load_query(&args.query)?;

    let start_time = Instant::now();
    let searcher = Searcher::new(&index).with_config(config.clone());
    let rewritten = searcher.rewrite(&query)?;

    let filter = args.filter.as_deref().map(parse_filter).transpose()?;
    if let Some(filter) = &filter {
        debug!("filtering with {filter}");
    }
    let mut collector = TopDocsCollector::new(args.limit);
    run(
        &searcher,
        &rewritten,
        filter.as_ref().map(|f| f as &dyn Filter),
        &mut collector,
    )?;
    let top_docs = collector.top_docs();

    let mut hits = Vec::with_capacity(top_docs.score_docs.len());
    for score_doc in &top_docs.score_docs {
        let explanation = if args.explain {
            Some(searcher.explain(&rewritten, score_doc.doc)?)
        } else {
            None
        };
        hits.push(SearchHit {
            doc: score_doc.doc,
            score: score_doc.score,
            fields: documents
                .get(score_doc.doc as usize)
                .cloned()
                .unwrap_or_default(),
            explanation,
        });
    }

    let default_field = Some(config.default_field.as_str());
    let results = SearchResults {
        query: query.to_string_with_field(default_field),
        rewritten: rewritten.to_string_with_field(default_field),
        hits,
        total_hits: top_docs.total_hits,
        max_score: top_docs.max_score,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    output_result(&results, cli_args)
}

/// Read a JSONL file into an index. Each line is either an object of field
/// to text or a bare string, which goes to `default_field`.
pub fn load_documents<P: AsRef<Path>>(
    path: P,
    default_field: &str,
) -> Result<(MemoryIndex, Vec<BTreeMap<String, String>>)> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open documents file {}", path.display()))?;

    let mut index = MemoryIndex::new();
    let mut documents = Vec::new();
    for (line_number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid JSON", path.display(), line_number + 1))?;
        let fields = document_fields(value, default_field).map_err(|e| {
            SarissaError::invalid_argument(format!("{}:{}: {e}", path.display(), line_number + 1))
        })?;
        index.add_document(fields.iter().map(|(f, t)| (f.as_str(), t.as_str())));
        documents.push(fields);
    }
    Ok((index, documents))
}

fn document_fields(value: Value, default_field: &str) -> Result<BTreeMap<String, String>> {
    match value {
        Value::String(text) => Ok(BTreeMap::from([(default_field.to_string(), text)])),
        Value::Object(object) => object
            .into_iter()
            .map(|(field, value)| match value {
                Value::String(text) => Ok((field, text)),
                other => Err(SarissaError::invalid_argument(format!(
                    "field {field} must be a string, got {other}"
                ))),
            })
            .collect(),
        other => Err(SarissaError::invalid_argument(format!(
            "expected an object or a string, got {other}"
        ))),
    }
}

/// Read a JSON query file.
pub fn load_query<P: AsRef<Path>>(path: P) -> Result<Query> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read query file {}", path.display()))?;
    Ok(serde_json::from_str(&json)?)
}

/// Parse `FIELD:PATTERN` into a wildcard filter.
pub fn parse_filter(filter: &str) -> Result<WildcardFilter> {
    match filter.split_once(':') {
        Some((field, pattern)) if !field.is_empty() && !pattern.is_empty() => {
            Ok(WildcardFilter::new(Term::new(field, pattern)))
        }
        _ => Err(SarissaError::invalid_argument(format!(
            "filter must look like FIELD:PATTERN, got {filter:?}"
        ))),
    }
}

/// Every document matching `query`, in document order.
pub fn matching_documents(
    searcher: &Searcher<'_>,
    query: &Query,
    filter: Option<&dyn Filter>,
) -> Result<Vec<ScoreDoc>> {
    let mut collector = DocCollector::new();
    run(searcher, query, filter, &mut collector)?;
    Ok(collector.into_hits())
}

fn run(
    searcher: &Searcher<'_>,
    query: &Query,
    filter: Option<&dyn Filter>,
    collector: &mut dyn Collector,
) -> Result<()> {
    match filter {
        Some(filter) => searcher.search_filtered(query, filter, collector),
        None => searcher.search(query, collector),
    }
}
