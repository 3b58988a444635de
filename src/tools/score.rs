//! Match tool implementation
//!
//! Implements the `match(query, candidate)` tool: one candidate, one verdict.

use crate::cli::MatchArgs;
use crate::config::Config;
use crate::error::{validate_query, AppError};
use crate::search::{FuzzyMatcher, MatchType};
use crate::server::{ContentItem, RpcResponse, ServerContext, ToolResult};
use serde_json::Value;
use tracing::debug;

/// Handle match tool call
pub async fn handle_match(id: Option<Value>, args: Value, context: &ServerContext) -> RpcResponse {
    match handle_match_impl(args, &context.config).await {
        Ok(content) => RpcResponse::from_tool_result(id, &content),
        Err(e) => RpcResponse::error(id, e.error_code(), &e.message()),
    }
}

async fn handle_match_impl(args: Value, config: &Config) -> Result<ToolResult, AppError> {
    let match_args: MatchArgs = serde_json::from_value(args)
        .map_err(|e| AppError::InvalidInput(format!("Invalid arguments: {}", e)))?;

    execute_match(match_args, config)
}

/// Shared implementation for match (used by the server and the CLI)
pub fn execute_match(match_args: MatchArgs, config: &Config) -> Result<ToolResult, AppError> {
    validate_query(&match_args.query)?;

    let mut matcher = FuzzyMatcher::with_weights(config.weights.clone())
        .with_backend(config.search.backend)
        .with_unicode_normalization(config.search.normalize_unicode);

    let result = matcher.fuzzy_match(&match_args.candidate, &match_args.query);

    debug!(
        "Match {:?} against {:?}: {:?}",
        match_args.query,
        match_args.candidate,
        result.as_ref().map(|m| m.score)
    );

    let (text, metadata) = match result {
        Some(m) => (
            format!("match\t{}", m.score),
            serde_json::json!({
                "is_match": true,
                "score": m.score,
                "positions": m.positions,
                "match_type": m.match_type,
            }),
        ),
        None => (
            "no match".to_string(),
            serde_json::json!({
                "is_match": false,
                "score": 0,
                "positions": [],
                "match_type": Option::<MatchType>::None,
            }),
        ),
    };

    Ok(ToolResult::from_items(vec![ContentItem::with_metadata(text, metadata)]))
}
