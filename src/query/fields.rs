//! Recognized parameter fields and their aliases.

pub const FIELD_REPO: &str = "repo";
pub const FIELD_FILE: &str = "file";
pub const FIELD_LANG: &str = "lang";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_SELECT: &str = "select";
pub const FIELD_REV: &str = "rev";
pub const FIELD_CASE: &str = "case";
pub const FIELD_CONTENT: &str = "content";
pub const FIELD_COUNT: &str = "count";
pub const FIELD_TIMEOUT: &str = "timeout";
pub const FIELD_FORK: &str = "fork";
pub const FIELD_ARCHIVED: &str = "archived";
pub const FIELD_VISIBILITY: &str = "visibility";
pub const FIELD_CONTEXT: &str = "context";
pub const FIELD_PATTERN_TYPE: &str = "patterntype";
pub const FIELD_AUTHOR: &str = "author";
pub const FIELD_COMMITTER: &str = "committer";
pub const FIELD_BEFORE: &str = "before";
pub const FIELD_AFTER: &str = "after";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_REPO_HAS_FILE: &str = "repohasfile";

const ALL_FIELDS: &[&str] = &[
    FIELD_REPO,
    FIELD_FILE,
    FIELD_LANG,
    FIELD_TYPE,
    FIELD_SELECT,
    FIELD_REV,
    FIELD_CASE,
    FIELD_CONTENT,
    FIELD_COUNT,
    FIELD_TIMEOUT,
    FIELD_FORK,
    FIELD_ARCHIVED,
    FIELD_VISIBILITY,
    FIELD_CONTEXT,
    FIELD_PATTERN_TYPE,
    FIELD_AUTHOR,
    FIELD_COMMITTER,
    FIELD_BEFORE,
    FIELD_AFTER,
    FIELD_MESSAGE,
    FIELD_REPO_HAS_FILE,
];

/// Values accepted by `type:`.
pub const TYPE_VALUES: &[&str] = &["repo", "symbol", "file", "commit", "diff", "path"];

/// Map an alias to its canonical field name. Non-aliases pass through.
pub fn resolve_alias(field: &str) -> &str {
    match field {
        "r" => FIELD_REPO,
        "f" | "path" => FIELD_FILE,
        "l" | "language" => FIELD_LANG,
        "m" | "msg" => FIELD_MESSAGE,
        "revision" => FIELD_REV,
        "until" => FIELD_BEFORE,
        "since" => FIELD_AFTER,
        other => other,
    }
}

/// Whether `field` (any case, aliases allowed) is a recognized field.
pub fn is_known_field(field: &str) -> bool {
    let lower = field.to_ascii_lowercase();
    ALL_FIELDS.contains(&resolve_alias(&lower))
}
