//! Query model for code search queries.
//!
//! This module provides the structured representation that query rewriting
//! operates on:
//!
//! - Parse tree nodes: patterns, `field:value` parameters and operators
//! - A parser from query text, for standard and regexp pattern types
//! - A printer that renders trees back into parseable text
//! - Basic queries (top-level parameters plus one pattern expression) and
//!   plans (a union of basic queries)
//! - Pattern-tree visitors
//!
//! # Round trips
//!
//! Printing a tree with [`string_human`] and parsing the result yields the
//! same tree. Query rewrites rely on this to normalize their output.

// Module declarations
mod basic;
pub mod fields;
mod node;
mod parser;
mod printer;
mod visitor;

// Nodes
pub use node::{to_sexp, Annotation, Labels, Node, Operator, OperatorKind, Parameter, Pattern};

// Parsing
pub use parser::{new_operator, parse, scan_delimited, validate, ParseError, SearchType};

// Printing
pub use printer::{parameter_string, pattern_string, string_human};

// Basic queries and plans
pub use basic::{parse_basic, parse_plan, to_basic_query, to_plan, Basic};

// Visitors
pub use visitor::{map_concat, map_pattern, visit_patterns};
