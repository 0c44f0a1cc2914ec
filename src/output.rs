use crate::alert::Alert;
use crate::smartsearch::ProposedQuery;
use crate::streaming::SearchMatch;
use chrono::Utc;
use clap::ValueEnum;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Pretty,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            OutputFormat::Human => "human",
            OutputFormat::Json => "json",
            OutputFormat::Pretty => "pretty",
        };
        write!(f, "{}", value)
    }
}

#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub schema_version: &'static str,
    pub execution_id: String,
    pub tool: &'static str,
    pub timestamp: String,
    pub partial: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
    pub message: String,
    pub remediation: Option<String>,
}

impl From<&crate::error::SearchError> for ErrorResponse {
    fn from(err: &crate::error::SearchError) -> Self {
        ErrorResponse {
            code: err.error_code().to_string(),
            error: err.severity().to_string(),
            message: err.to_string(),
            remediation: err.remediation().map(|s| s.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct AlternativeQuery {
    pub description: String,
    pub query: String,
}

#[derive(Serialize)]
pub struct BranchResponse {
    pub seed: String,
    pub alternatives: Vec<AlternativeQuery>,
    /// More alternatives were available than `--limit` allowed.
    pub truncated: bool,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub query: String,
    pub pattern_type: String,
    pub branches: Vec<BranchResponse>,
    pub total_count: u64,
}

#[derive(Serialize)]
pub struct ParsedQuery {
    pub query: String,
    pub parse_tree: String,
}

#[derive(Serialize)]
pub struct ParseResponse {
    pub query: String,
    pub pattern_type: String,
    pub plan: Vec<ParsedQuery>,
}

#[derive(Serialize)]
pub struct RuleInfo {
    pub description: String,
    /// Whether the rule applies to the query given with `--query`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applies: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Serialize)]
pub struct RulesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub narrow: Vec<RuleInfo>,
    pub widen: Vec<RuleInfo>,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub match_id: String,
    #[serde(flatten)]
    pub result: SearchMatch,
}

impl From<SearchMatch> for MatchResponse {
    fn from(result: SearchMatch) -> Self {
        MatchResponse {
            match_id: match_id(&result.repository, &result.path, result.line_number),
            result,
        }
    }
}

#[derive(Serialize)]
pub struct ReplayResponse {
    pub query: String,
    pub results: Vec<MatchResponse>,
    pub total_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    pub errors: Vec<ErrorResponse>,
    pub proposed_queries: Vec<ProposedQuery>,
}

pub fn json_response<T>(data: T) -> JsonResponse<T> {
    json_response_with_partial(data, false)
}

pub fn json_response_with_partial<T>(data: T, partial: bool) -> JsonResponse<T> {
    JsonResponse {
        schema_version: SCHEMA_VERSION,
        execution_id: execution_id(),
        tool: "smartsearch",
        timestamp: Utc::now().to_rfc3339(),
        partial,
        data,
    }
}

pub fn execution_id() -> String {
    let timestamp = Utc::now().timestamp();
    let pid = std::process::id();
    format!("{:x}-{:x}", timestamp, pid)
}

/// Stable id for a match location.
pub fn match_id(repository: &str, path: &str, line_number: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repository.as_bytes());
    hasher.update(b":");
    hasher.update(path.as_bytes());
    hasher.update(b":");
    hasher.update(line_number.to_string().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}
