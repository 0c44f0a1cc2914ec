//! Weighting of regular expression metasyntax in a pattern.
//!
//! A literal pattern like `my.config.yaml` is technically a regular
//! expression, but only weakly so: its two `.` are more likely dots than
//! wildcards. The weight counts operators that signal regexp intent.

use regex_syntax::ast::{parse::Parser, Ast};

/// Patterns whose weight reaches this are treated as regular expressions.
pub const METASYNTAX_THRESHOLD: usize = 2;

/// Strip non-capturing groups, which carry no weight of their own.
fn unwrap_non_capturing(ast: &Ast) -> &Ast {
    match ast {
        Ast::Group(group) if !group.is_capturing() => unwrap_non_capturing(&group.ast),
        other => other,
    }
}

/// Weighted count of significant metasyntax in `ast`.
///
/// - character classes, anchors, word boundaries and alternation: 1
/// - a quantifier on `.` or a capture group: 2, on anything else: 1
/// - a capture group around an alternation: 1
/// - literals, `.`, concatenation and empty expressions: 0
///
/// Each node adds its own weight to that of its children.
pub fn count_metasyntax(ast: &Ast) -> usize {
    match ast {
        Ast::Concat(concat) => concat.asts.iter().map(count_metasyntax).sum(),
        Ast::Alternation(alternation) => {
            1 + alternation.asts.iter().map(count_metasyntax).sum::<usize>()
        }
        Ast::Assertion(_) | Ast::ClassUnicode(_) | Ast::ClassPerl(_) | Ast::ClassBracketed(_) => {
            1
        }
        Ast::Group(group) => {
            let inner = count_metasyntax(&group.ast);
            let wraps_alternation = matches!(unwrap_non_capturing(&group.ast), Ast::Alternation(_));
            if group.is_capturing() && wraps_alternation {
                inner + 1
            } else {
                inner
            }
        }
        Ast::Repetition(repetition) => {
            let weight = match unwrap_non_capturing(&repetition.ast) {
                Ast::Dot(_) => 2,
                Ast::Group(group) if group.is_capturing() => 2,
                _ => 1,
            };
            weight + count_metasyntax(&repetition.ast)
        }
        _ => 0,
    }
}

/// Metasyntax weight of `pattern`, or None if it is not a valid regular
/// expression.
pub fn metasyntax_weight(pattern: &str) -> Option<usize> {
    let ast = Parser::new().parse(pattern).ok()?;
    Some(count_metasyntax(&ast))
}

/// Whether `pattern` is a valid regular expression with enough metasyntax to
/// be searched as one.
pub fn looks_like_regexp(pattern: &str) -> bool {
    metasyntax_weight(pattern).is_some_and(|weight| weight >= METASYNTAX_THRESHOLD)
        && regex::Regex::new(pattern).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_of_plain_literals() {
        assert_eq!(metasyntax_weight("foo"), Some(0));
        assert_eq!(metasyntax_weight("my.config.yaml"), Some(0));
        assert_eq!(metasyntax_weight("test.get(id)"), Some(0));
    }

    #[test]
    fn test_weight_of_quantifiers() {
        assert_eq!(metasyntax_weight("a+"), Some(1));
        assert_eq!(metasyntax_weight("foo.*bar"), Some(2));
        assert_eq!(metasyntax_weight("(ab)+"), Some(2));
        assert_eq!(metasyntax_weight("(?:.)*"), Some(2));
        assert_eq!(metasyntax_weight("(?:ab)*"), Some(1));
        assert_eq!(metasyntax_weight("[a-z]+"), Some(2));
    }

    #[test]
    fn test_weight_of_anchors_and_classes() {
        assert_eq!(metasyntax_weight("^foo$"), Some(2));
        assert_eq!(metasyntax_weight(r"\bfoo"), Some(1));
        assert_eq!(metasyntax_weight(r"\d\w"), Some(2));
    }

    #[test]
    fn test_weight_of_alternation() {
        assert_eq!(metasyntax_weight("a|b"), Some(1));
        assert_eq!(metasyntax_weight("(using|struct)"), Some(2));
        assert_eq!(metasyntax_weight("(?:using|struct)"), Some(1));
    }

    #[test]
    fn test_invalid_regexp_has_no_weight() {
        assert_eq!(metasyntax_weight("foo("), None);
        assert!(!looks_like_regexp("[a-"));
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(!looks_like_regexp("a+"));
        assert!(looks_like_regexp("a+b+"));
        assert!(looks_like_regexp("(using|struct)"));
        assert!(!looks_like_regexp("test.get(id)"));
    }
}
