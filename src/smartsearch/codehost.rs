//! Decomposition of code host URLs into `repo:`, `rev:` and `file:` filters.

use crate::query::fields::{FIELD_FILE, FIELD_REPO, FIELD_REV};
use crate::query::Parameter;
use url::Url;

/// Hosts whose URL layout is `<org>/<repo>/<blob|tree|commit>/<rev>/<path>`.
pub const CODE_HOST_DOMAINS: &[&str] = &["github.com", "gitlab.com"];

fn parse_code_host_url(value: &str) -> Option<(String, Vec<String>)> {
    let normalized = if value.starts_with("https://") {
        value.to_string()
    } else {
        format!("https://{}", value)
    };
    let url = Url::parse(&normalized).ok()?;
    let host = url.host_str()?;
    let domain = host.strip_prefix("www.").unwrap_or(host);
    if !CODE_HOST_DOMAINS.contains(&domain) {
        return None;
    }
    let segments = url
        .path()
        .trim_matches('/')
        .split('/')
        .map(str::to_string)
        .collect();
    Some((domain.to_string(), segments))
}

/// Filters equivalent to searching inside the code host location `value`,
/// each negated when `negated` is set. Returns None if `value` is not a URL
/// on a known code host or its path layout is not recognized.
///
/// ```text
/// github.com/org                    repo:^github\.com/org
/// github.com/org/repo               repo:^github\.com/org/repo$
/// github.com/org/repo/tree/rev      + rev:rev
/// github.com/org/repo/blob/rev/a/b  + rev:rev file:^a/b$
/// github.com/org/repo/tree/rev/a    + rev:rev file:^a
/// ```
pub fn code_host_filters(value: &str, negated: bool) -> Option<Vec<Parameter>> {
    let (domain, segments) = parse_code_host_url(value)?;
    let domain = regex::escape(&domain);

    let param = |field: &str, value: String| Parameter::new(field, value).negated(negated);

    match segments.len() {
        0 | 1 => Some(vec![param(
            FIELD_REPO,
            format!("^{}/{}", domain, segments.join("/")),
        )]),
        2 => Some(vec![param(
            FIELD_REPO,
            format!("^{}/{}$", domain, segments.join("/")),
        )]),
        4 if segments[2] == "tree" || segments[2] == "commit" => Some(vec![
            param(FIELD_REPO, format!("^{}/{}$", domain, segments[..2].join("/"))),
            param(FIELD_REV, segments[3].clone()),
        ]),
        n if n >= 5 => {
            let path = regex::escape(&segments[4..].join("/"));
            let file = match segments[2].as_str() {
                "blob" => format!("^{}$", path),
                "tree" => format!("^{}", path),
                _ => return None,
            };
            Some(vec![
                param(FIELD_REPO, format!("^{}/{}$", domain, segments[..2].join("/"))),
                param(FIELD_REV, segments[3].clone()),
                param(FIELD_FILE, file),
            ])
        }
        _ => None,
    }
}

/// Rewrite a `repo:` value that is a full GitHub URL into an anchored repo
/// name pattern. A trailing `.git` is dropped and an `@rev` suffix is kept.
pub fn rewrite_repo_url(value: &str) -> Option<String> {
    let (location, revision) = match value.split_once('@') {
        Some((location, revision)) => (location, Some(revision)),
        None => (value, None),
    };
    let rest = location
        .strip_prefix("https://")
        .or_else(|| location.strip_prefix("http://"))?;
    let url = Url::parse(&format!("https://{}", rest)).ok()?;
    let host = url.host_str()?;
    if host.strip_prefix("www.").unwrap_or(host) != "github.com" {
        return None;
    }

    let path = url.path().trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() != 2 || segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    let mut rewritten = format!("^github\\.com/{}$", regex::escape(path));
    if let Some(revision) = revision {
        rewritten.push('@');
        rewritten.push_str(revision);
    }
    Some(rewritten)
}
