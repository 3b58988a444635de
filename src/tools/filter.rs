//! Filter tool implementation
//!
//! Implements the `filter(query, candidates)` tool: rank a candidate list
//! best-first and drop the non-matches.

use crate::cli::FilterArgs;
use crate::config::Config;
use crate::error::{validate_limit, validate_query, AppError};
use crate::search::{SearchEngine, SearchOptions};
use crate::server::{ContentItem, RpcResponse, ServerContext, ToolResult};
use crate::tools::format::format_result_lines;
use serde_json::Value;
use tracing::debug;

/// Handle filter tool call
pub async fn handle_filter(id: Option<Value>, args: Value, context: &ServerContext) -> RpcResponse {
    match handle_filter_impl(args, &context.config).await {
        Ok(content) => RpcResponse::from_tool_result(id, &content),
        Err(e) => RpcResponse::error(id, e.error_code(), &e.message()),
    }
}

async fn handle_filter_impl(args: Value, config: &Config) -> Result<ToolResult, AppError> {
    let filter_args: FilterArgs = serde_json::from_value(args)
        .map_err(|e| AppError::InvalidInput(format!("Invalid arguments: {}", e)))?;

    execute_filter(filter_args, config)
}

/// Options for one filter pass: the configured defaults with the
/// per-call arguments layered on top
pub fn effective_options(filter_args: &FilterArgs, config: &Config) -> SearchOptions {
    let mut options = config.search.clone();
    if filter_args.limit.is_some() {
        options.limit = filter_args.limit;
    }
    if let Some(backend) = filter_args.backend {
        options.backend = backend;
    }
    options.bidirectional |= filter_args.bidirectional;
    options
}

/// Shared implementation for filter (used by the server and the CLI)
pub fn execute_filter(filter_args: FilterArgs, config: &Config) -> Result<ToolResult, AppError> {
    validate_query(&filter_args.query)?;
    validate_limit(filter_args.limit)?;

    let options = effective_options(&filter_args, config);
    debug!(
        "Filter request: query {:?}, {} candidates, options {:?}",
        filter_args.query,
        filter_args.candidates.len(),
        options
    );

    let mut engine = SearchEngine::with_settings(config.weights.clone(), options);
    let results = engine.filter_strings(&filter_args.query, &filter_args.candidates);

    let text = if results.is_empty() {
        format!("No matches for '{}'", filter_args.query)
    } else {
        format_result_lines(&results, filter_args.highlight)
    };

    let entries: Vec<Value> = results
        .iter()
        .map(|r| {
            serde_json::json!({
                "candidate": r.item,
                "score": r.score,
                "positions": r.positions,
                "match_type": r.match_type,
                "reversed": r.reversed,
            })
        })
        .collect();

    let metadata = serde_json::json!({
        "query": filter_args.query,
        "total": filter_args.candidates.len(),
        "matched": entries.len(),
        "results": entries,
    });

    Ok(ToolResult::from_items(vec![ContentItem::with_metadata(text, metadata)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MatcherBackend;
    use serde_json::json;

    fn args(query: &str, candidates: &[&str]) -> FilterArgs {
        FilterArgs {
            query: query.to_string(),
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            file: None,
            limit: None,
            bidirectional: false,
            backend: None,
            highlight: false,
            json: false,
        }
    }

    fn candidates_of(result: &ToolResult) -> Vec<String> {
        result.content[0].metadata.as_ref().expect("metadata")["results"]
            .as_array()
            .expect("results array")
            .iter()
            .filter_map(|r| r["candidate"].as_str().map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn test_execute_filter_ranks_best_first() {
        let result = execute_filter(args("ab", &["xaxbx", "zzz", "abx"]), &Config::default()).unwrap();

        assert_eq!(candidates_of(&result), vec!["abx", "xaxbx"]);
        let meta = result.content[0].metadata.as_ref().unwrap();
        assert_eq!(meta["total"], json!(3));
        assert_eq!(meta["matched"], json!(2));

        let first_line = result.content[0].text.lines().next().unwrap();
        assert!(first_line.ends_with("\tabx"));
    }

    #[test]
    fn test_execute_filter_no_matches() {
        let result = execute_filter(args("qq", &["abc"]), &Config::default()).unwrap();
        assert_eq!(result.content[0].text, "No matches for 'qq'");
        assert!(candidates_of(&result).is_empty());
    }

    #[test]
    fn test_execute_filter_empty_query_keeps_order() {
        let result = execute_filter(args("", &["b", "a", "c"]), &Config::default()).unwrap();
        assert_eq!(candidates_of(&result), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_execute_filter_limit() {
        let mut filter_args = args("a", &["a", "ab", "abc"]);
        filter_args.limit = Some(2);

        let result = execute_filter(filter_args, &Config::default()).unwrap();
        assert_eq!(candidates_of(&result).len(), 2);
    }

    #[test]
    fn test_execute_filter_rejects_zero_limit() {
        let mut filter_args = args("a", &["a"]);
        filter_args.limit = Some(0);

        let err = execute_filter(filter_args, &Config::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_execute_filter_highlight() {
        let mut filter_args = args("car", &["car"]);
        filter_args.highlight = true;

        let result = execute_filter(filter_args, &Config::default()).unwrap();
        assert!(result.content[0].text.contains("\t**car**"));
    }

    #[test]
    fn test_effective_options_layering() {
        let mut config = Config::default();
        config.search.limit = Some(10);
        config.search.bidirectional = true;

        let mut filter_args = args("x", &[]);
        let options = effective_options(&filter_args, &config);
        assert_eq!(options.limit, Some(10));
        assert!(options.bidirectional);
        assert_eq!(options.backend, MatcherBackend::Native);

        filter_args.limit = Some(3);
        filter_args.backend = Some(MatcherBackend::Nucleo);
        let options = effective_options(&filter_args, &config);
        assert_eq!(options.limit, Some(3));
        assert_eq!(options.backend, MatcherBackend::Nucleo);
    }

    #[tokio::test]
    async fn test_handle_filter_roundtrip() {
        let context = ServerContext::new(Config::default());
        let resp = handle_filter(
            Some(json!(7)),
            json!({ "query": "car", "candidates": ["scary", "car", "carton"] }),
            &context,
        )
        .await;

        assert!(resp.error.is_none());
        let result = resp.result.expect("result present");
        let results = result["content"][0]["metadata"]["results"]
            .as_array()
            .expect("results");
        assert_eq!(results[0]["candidate"], json!("car"));
        assert_eq!(results[0]["match_type"], json!("full_word"));
    }

    #[tokio::test]
    async fn test_handle_filter_invalid_arguments() {
        let context = ServerContext::new(Config::default());
        let resp = handle_filter(Some(json!(8)), json!({ "candidates": "nope" }), &context).await;
        assert_eq!(resp.error.expect("error").code, "invalid_input");
    }
}
