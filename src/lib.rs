//! smartsearch - Alternative queries for code searches that find nothing.
//!
//! When a search returns no results, smartsearch rewrites the query with a
//! catalog of rules (unquote patterns, lift `go` into `lang:Go`, turn a
//! GitHub URL into `repo:`/`file:` filters, ...), runs the rewrites in a
//! fixed order of specificity and proposes the ones that found something.
//!
//! # Quick Start
//!
//! ```no_run
//! use smartsearch::query::{parse_basic, SearchType};
//! use smartsearch::smartsearch::{Generator, RULES_NARROW, RULES_WIDEN};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let seed = parse_basic(r#"go "parse error""#, SearchType::Standard)?;
//! for auto in Generator::new(seed, &RULES_NARROW, &RULES_WIDEN) {
//!     println!("{}: {}", auto.description, auto.query.string_human());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`query`] - Query parsing, printing and rewriting
//! - [`smartsearch`] - Rules, the generator and the smart search job
//! - [`streaming`] - Result streams and cancellation
//! - [`replay`] - Search jobs backed by a JSON fixture
//! - [`error`] - Error types
//! - [`output`] - Response types and formatting

pub mod alert;
pub mod error;
pub mod output;
pub mod output_common;
pub mod query;
pub mod replay;
pub mod smartsearch;
pub mod streaming;

pub use alert::Alert;
pub use error::SearchError;
pub use query::{parse_basic, parse_plan, Basic, SearchType};
pub use smartsearch::{Generator, SearchOutcome, SmartSearchJob};
