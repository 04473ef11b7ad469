//! Strategy contracts for the PromQL completion and lint services
//!
//! The host never talks to a strategy directly. It calls the composed
//! extension (see [`crate::lsp::registry`]), which forwards every request to
//! whichever strategy is installed at call time. Strategies are therefore
//! replaced as whole objects and never mutated in place.
//!
//! # Example
//!
//! ```rust,ignore
//! struct NoCompletion;
//!
//! #[async_trait::async_trait]
//! impl CompletionStrategy for NoCompletion {
//!     async fn promql(&self, _context: &CompletionContext) -> anyhow::Result<Option<CompletionResult>> {
//!         Ok(None)
//!     }
//!
//!     fn strategy_name(&self) -> &'static str {
//!         "none"
//!     }
//! }
//!
//! registry.set_completion_strategy(Arc::new(NoCompletion));
//! ```

use tower_lsp::lsp_types::{CompletionItem, Diagnostic};

use super::lint::LintConfiguration;
use crate::syntax::SyntaxNode;

/// Editing context supplied by the host with a completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    /// Full document text
    pub text: String,
    /// Cursor position as a byte offset into `text`
    pub offset: usize,
    /// Whether the user invoked completion explicitly rather than by typing
    pub explicit: bool,
}

impl CompletionContext {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
            explicit: false,
        }
    }

    pub fn explicit(mut self) -> Self {
        self.explicit = true;
        self
    }

    /// Identifier characters directly before the cursor, and the byte offset
    /// where they start
    pub fn word_before(&self) -> (usize, &str) {
        let end = self.offset.min(self.text.len());
        let end = (0..=end).rev().find(|i| self.text.is_char_boundary(*i)).unwrap_or(0);
        let before = &self.text[..end];
        let start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_' || *c == ':')
            .last()
            .map(|(i, _)| i)
            .unwrap_or(end);
        (start, &before[start..])
    }
}

/// Suggestions for a completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResult {
    /// Byte offset where the replaced text starts
    pub from: usize,
    pub items: Vec<CompletionItem>,
}

/// Completion service contract
#[async_trait::async_trait]
pub trait CompletionStrategy: Send + Sync {
    /// Produce completions for `context`, or `None` when there is nothing to
    /// suggest
    async fn promql(&self, context: &CompletionContext) -> anyhow::Result<Option<CompletionResult>>;

    /// Human-readable name for logging
    fn strategy_name(&self) -> &'static str;
}

/// Diagnostics service contract
#[async_trait::async_trait]
pub trait LintStrategy: Send + Sync {
    /// Lint a parsed document
    ///
    /// `source` is the text `tree` was parsed from.
    async fn promql(&self, tree: &SyntaxNode, source: &str) -> anyhow::Result<Vec<Diagnostic>>;

    /// Current configuration, inspected by the host-side lint integration
    fn configuration(&self) -> &LintConfiguration;

    /// Human-readable name for logging
    fn strategy_name(&self) -> &'static str;
}
