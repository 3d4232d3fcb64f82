//! Host-side filter lifecycle: last-good AST retention.
//!
//! Interactive hosts re-parse the filter text whenever it settles (see
//! [`REPARSE_DEBOUNCE`]) and must never apply a broken filter: a failed
//! parse keeps the previously valid AST active and only flags the input as
//! invalid.

use crate::ast::{FilterNode, MatchContext};
use crate::error::FilterParseError;
use crate::parse::parse_filter;
use std::time::Duration;
use tracing::debug;

/// How long an interactive host should wait after the last keystroke
/// before re-parsing. Parsing itself is synchronous and linear in the
/// filter length; the debounce only avoids churn while typing.
pub const REPARSE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Current filter state of one record table.
#[derive(Debug, Default)]
pub struct FilterSession {
    pattern: String,
    active: Option<FilterNode>,
    invalid: bool,
}

impl FilterSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-parse a new filter pattern.
    ///
    /// On success the parsed AST becomes the active filter. On failure the
    /// previously active AST stays untouched, the session is flagged
    /// invalid, and the error is handed back for display.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<(), FilterParseError> {
        debug!(pattern, "parsing filter pattern");
        self.pattern = pattern.to_string();
        match parse_filter(pattern) {
            Ok(node) => {
                debug!(filter = %node, "filter parsing succeeded");
                self.active = Some(node);
                self.invalid = false;
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "filter parsing failed");
                self.invalid = true;
                Err(err)
            }
        }
    }

    /// Drop the active filter entirely (the "clear" button).
    pub fn clear(&mut self) {
        self.pattern.clear();
        self.active = None;
        self.invalid = false;
    }

    /// The filter text as last typed, valid or not.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// False while the typed text fails to parse.
    pub fn is_valid(&self) -> bool {
        !self.invalid
    }

    /// The active (last successfully parsed) filter, if any.
    pub fn active(&self) -> Option<&FilterNode> {
        self.active.as_ref()
    }

    /// Keep/drop decision for one record: records pass when no filter is
    /// active.
    pub fn keeps(&self, ctx: &MatchContext<'_>) -> bool {
        self.active.as_ref().map(|node| node.matches(ctx)).unwrap_or(true)
    }
}
