//! Shared output formatting for all response types.

use crate::error::SearchError;
use crate::output::{json_response_with_partial, OutputFormat};
use crate::smartsearch::ProposedQuery;
use crate::streaming::SearchMatch;
use serde::Serialize;

/// Render any serializable response in the JSON envelope.
pub fn render_json_response<T: Serialize>(
    data: &T,
    partial: bool,
    format: OutputFormat,
) -> Result<String, SearchError> {
    let payload = json_response_with_partial(data, partial);
    let rendered = if matches!(format, OutputFormat::Pretty) {
        serde_json::to_string_pretty(&payload)
    } else {
        serde_json::to_string(&payload)
    }?;
    Ok(rendered)
}

pub fn format_total_header(total: u64) -> String {
    format!("total: {}", total)
}

/// Footer for output cut short by cancellation.
pub fn format_partial_footer() -> &'static str {
    "partial: true"
}

/// `repository/path:line: preview`
pub fn format_match_line(m: &SearchMatch) -> String {
    format!(
        "{}/{}:{}: {}",
        m.repository,
        m.path,
        m.line_number,
        m.preview.trim_end()
    )
}

/// Numbered line for a generated query, with its description below.
pub fn format_alternative(index: usize, description: &str, query: &str) -> String {
    format!("{:>3}. {}\n     {}", index + 1, query, description)
}

pub fn format_proposed_query(p: &ProposedQuery) -> String {
    format!("Did you mean: {}  [{}]", p.query, p.description)
}

pub fn is_json_format(format: OutputFormat) -> bool {
    matches!(format, OutputFormat::Json | OutputFormat::Pretty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_match_line() {
        let m = SearchMatch::new("github.com/a/b", "src/lib.rs", 12, "fn parse() {\n");
        assert_eq!(format_match_line(&m), "github.com/a/b/src/lib.rs:12: fn parse() {");
    }

    #[test]
    fn test_format_alternative() {
        assert_eq!(
            format_alternative(0, "unquote patterns", "foo bar"),
            "  1. foo bar\n     unquote patterns"
        );
    }

    #[test]
    fn test_render_json_compact_vs_pretty() {
        let compact = render_json_response(&1, false, OutputFormat::Json).unwrap();
        assert!(!compact.contains('\n'));
        let pretty = render_json_response(&1, false, OutputFormat::Pretty).unwrap();
        assert!(pretty.contains('\n'));
    }
}
