//! Filter query language for scan-report record tables.
//!
//! A filter is a boolean expression over the fields of a result record and
//! the packets/state it points at, e.g.
//!
//! ```text
//! state == "SN=1 TP=0" && (request.service == 16 || request.service == 39)
//! ```
//!
//! Operator precedence, loosest first: `||`, `&&`, `==`/`!=`, `( ... )`.
//! Keys are dotted paths into one of four namespaces: the flat record
//! itself, `request.*`, `response.*`, or `state.*`.
//!
//! The crate exposes three independent, synchronous entry points:
//!
//! - [`parse_filter`]: filter text -> [`FilterNode`] AST (or a typed
//!   [`FilterParseError`]),
//! - [`FilterNode::matches`]: AST x [`MatchContext`] -> keep/drop decision,
//! - [`suggest`]: partial input + cursor + [`OptionTree`] -> completion
//!   candidates for an autocomplete control.
//!
//! [`FilterSession`] wraps the parse step with the host-side recovery rule:
//! an invalid edit never replaces the last successfully parsed filter.

pub mod ast;
pub mod cursor;
pub mod error;
pub mod options;
pub mod parse;
pub mod session;
pub mod suggest;

pub use ast::{Comparison, FilterNode, MatchContext, MatchValue};
pub use cursor::StringConsumer;
pub use error::{FilterParseError, Result};
pub use options::{build_option_tree, OptionNode, OptionTree, MAX_OPTION_LEN};
pub use parse::parse_filter;
pub use session::{FilterSession, REPARSE_DEBOUNCE};
pub use suggest::suggest;
