//! Default PromQL lint strategy: reports parser error nodes

use ropey::Rope;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity};
use tracing::trace;

use super::traits::LintStrategy;
use crate::syntax::tree::{span_to_range, SyntaxNode};

/// Severity attached to reported diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    #[default]
    Error,
    Warning,
}

impl From<LintSeverity> for DiagnosticSeverity {
    fn from(severity: LintSeverity) -> Self {
        match severity {
            LintSeverity::Error => DiagnosticSeverity::ERROR,
            LintSeverity::Warning => DiagnosticSeverity::WARNING,
        }
    }
}

/// Options accepted by [`new_lint_strategy`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LintConfiguration {
    /// When false the lint integration skips the strategy entirely
    pub enabled: bool,
    pub severity: LintSeverity,
}

impl Default for LintConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: LintSeverity::Error,
        }
    }
}

/// Build a lint strategy from an optional configuration
///
/// `None` yields [`DefaultLintStrategy::default`].
pub fn new_lint_strategy(conf: Option<LintConfiguration>) -> anyhow::Result<DefaultLintStrategy> {
    match conf {
        Some(conf) => Ok(DefaultLintStrategy { conf }),
        None => Ok(DefaultLintStrategy::default()),
    }
}

/// Reports one diagnostic per error node in the parsed tree
#[derive(Debug, Clone, Default)]
pub struct DefaultLintStrategy {
    conf: LintConfiguration,
}

#[async_trait::async_trait]
impl LintStrategy for DefaultLintStrategy {
    async fn promql(&self, tree: &SyntaxNode, source: &str) -> anyhow::Result<Vec<Diagnostic>> {
        let rope = Rope::from_str(source);
        let diagnostics: Vec<Diagnostic> = tree
            .find_all(SyntaxNode::is_error)
            .into_iter()
            .map(|node| Diagnostic {
                range: span_to_range(&rope, &node.span),
                severity: Some(self.conf.severity.into()),
                source: Some("promql".to_string()),
                message: "unexpected input".to_string(),
                ..Default::default()
            })
            .collect();

        trace!("Lint produced {} diagnostics", diagnostics.len());
        Ok(diagnostics)
    }

    fn configuration(&self) -> &LintConfiguration {
        &self.conf
    }

    fn strategy_name(&self) -> &'static str {
        "promql-syntax-errors"
    }
}
