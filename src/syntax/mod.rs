//! PromQL syntax definition
//!
//! Bundles the node classification table with the language-level data the
//! host editor needs (auto-closed brackets, line comment marker).

pub mod classification;
pub mod highlight;
pub mod tree;

use once_cell::sync::Lazy;

pub use classification::{promql_table, ClassificationTable, SemanticCategory, TableError};
pub use tree::SyntaxNode;

/// Editor-facing language configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageData {
    /// Characters the editor closes automatically
    pub close_brackets: Vec<char>,
    /// Marker starting a line comment
    pub line_comment: &'static str,
}

impl Default for LanguageData {
    fn default() -> Self {
        Self {
            close_brackets: vec!['(', '[', '{', '\'', '"', '`'],
            line_comment: "#",
        }
    }
}

/// Syntax definition handed to the host: language name, classification
/// table and language data
#[derive(Debug)]
pub struct SyntaxDefinition {
    pub language: &'static str,
    pub table: &'static ClassificationTable,
    pub language_data: LanguageData,
}

impl SyntaxDefinition {
    pub fn classify(&self, node_type: &str) -> Option<SemanticCategory> {
        self.table.classify(node_type)
    }
}

static PROMQL_SYNTAX: Lazy<SyntaxDefinition> = Lazy::new(|| SyntaxDefinition {
    language: "promql",
    table: promql_table(),
    language_data: LanguageData::default(),
});

pub fn promql_syntax() -> &'static SyntaxDefinition {
    &PROMQL_SYNTAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promql_language_data() {
        let syntax = promql_syntax();
        assert_eq!(syntax.language, "promql");
        assert_eq!(syntax.language_data.line_comment, "#");
        assert_eq!(syntax.language_data.close_brackets, vec!['(', '[', '{', '\'', '"', '`']);
    }

    #[test]
    fn test_syntax_uses_shared_table() {
        assert!(std::ptr::eq(promql_syntax().table, promql_table()));
        assert_eq!(promql_syntax().classify("Rate"), Some(SemanticCategory::FunctionName));
    }
}
