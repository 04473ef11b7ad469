//! Node-type classification for PromQL semantic highlighting
//!
//! The external grammar names every syntax-tree node kind (`NumberLiteral`,
//! `Rate`, `(`, ...). This module maps those names onto a small closed set of
//! [`SemanticCategory`] values. The mapping is declared once as a list of
//! space-separated groups, each group sharing a single category, and is
//! validated for disjointness when the table is built.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use thiserror::Error;
use tower_lsp::lsp_types::SemanticTokenType;

/// Highlighting class assigned to a grammar node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticCategory {
    Comment,
    LabelName,
    String,
    Number,
    FunctionName,
    /// Aggregation operators (`sum`, `topk`, ...)
    OperatorKeyword,
    /// Grouping and matching modifiers (`by`, `on`, `offset`, ...)
    Modifier,
    LogicOperator,
    /// Binary comparison, arithmetic and label-matching operators
    Operator,
    /// Unary sign
    ArithmeticOperator,
    Paren,
    SquareBracket,
    Brace,
    /// Error node emitted by the parser on unparseable input
    Invalid,
}

impl SemanticCategory {
    /// Every category, in legend order
    pub const ALL: [SemanticCategory; 14] = [
        SemanticCategory::Comment,
        SemanticCategory::LabelName,
        SemanticCategory::String,
        SemanticCategory::Number,
        SemanticCategory::FunctionName,
        SemanticCategory::OperatorKeyword,
        SemanticCategory::Modifier,
        SemanticCategory::LogicOperator,
        SemanticCategory::Operator,
        SemanticCategory::ArithmeticOperator,
        SemanticCategory::Paren,
        SemanticCategory::SquareBracket,
        SemanticCategory::Brace,
        SemanticCategory::Invalid,
    ];

    /// Stable tag name handed to the host's highlighter
    pub fn tag(&self) -> &'static str {
        match self {
            SemanticCategory::Comment => "comment",
            SemanticCategory::LabelName => "labelName",
            SemanticCategory::String => "string",
            SemanticCategory::Number => "number",
            SemanticCategory::FunctionName => "functionName",
            SemanticCategory::OperatorKeyword => "operatorKeyword",
            SemanticCategory::Modifier => "modifier",
            SemanticCategory::LogicOperator => "logicOperator",
            SemanticCategory::Operator => "operator",
            SemanticCategory::ArithmeticOperator => "arithmeticOperator",
            SemanticCategory::Paren => "paren",
            SemanticCategory::SquareBracket => "squareBracket",
            SemanticCategory::Brace => "brace",
            SemanticCategory::Invalid => "invalid",
        }
    }

    /// Parse a tag name back into a category
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }

    /// Closest LSP semantic token type, for hosts speaking the LSP
    pub fn token_type(&self) -> SemanticTokenType {
        match self {
            SemanticCategory::Comment => SemanticTokenType::COMMENT,
            SemanticCategory::LabelName => SemanticTokenType::PROPERTY,
            SemanticCategory::String => SemanticTokenType::STRING,
            SemanticCategory::Number => SemanticTokenType::NUMBER,
            SemanticCategory::FunctionName => SemanticTokenType::FUNCTION,
            SemanticCategory::OperatorKeyword => SemanticTokenType::KEYWORD,
            SemanticCategory::Modifier => SemanticTokenType::MODIFIER,
            SemanticCategory::LogicOperator => SemanticTokenType::new("logicOperator"),
            SemanticCategory::Operator => SemanticTokenType::OPERATOR,
            SemanticCategory::ArithmeticOperator => SemanticTokenType::new("arithmeticOperator"),
            SemanticCategory::Paren => SemanticTokenType::new("paren"),
            SemanticCategory::SquareBracket => SemanticTokenType::new("squareBracket"),
            SemanticCategory::Brace => SemanticTokenType::new("brace"),
            SemanticCategory::Invalid => SemanticTokenType::new("invalid"),
        }
    }

    /// Index of this category in [`SemanticCategory::ALL`], which is also its
    /// token-type index in the semantic tokens legend
    pub fn legend_index(&self) -> u32 {
        Self::ALL.iter().position(|c| c == self).unwrap_or_default() as u32
    }
}

impl fmt::Display for SemanticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Errors raised while building a [`ClassificationTable`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("node type '{name}' is declared for both '{first}' and '{second}'")]
    DuplicateNodeType {
        name: String,
        first: SemanticCategory,
        second: SemanticCategory,
    },

    #[error("empty node group declared for '{0}'")]
    EmptyGroup(SemanticCategory),
}

/// One declared group: node types sharing a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    pub node_types: Vec<String>,
    pub category: SemanticCategory,
}

/// Immutable mapping from node-type names to highlighting categories
#[derive(Debug, Clone)]
pub struct ClassificationTable {
    groups: Vec<NodeGroup>,
    lookup: HashMap<String, SemanticCategory>,
}

impl ClassificationTable {
    /// Build a table from `(space-separated node types, category)` pairs
    ///
    /// Fails if a group is empty or a node type appears in more than one group.
    pub fn from_groups(declaration: &[(&str, SemanticCategory)]) -> Result<Self, TableError> {
        let mut groups = Vec::with_capacity(declaration.len());
        let mut lookup = HashMap::new();

        for &(names, category) in declaration {
            let node_types: Vec<String> = names.split_whitespace().map(str::to_string).collect();
            if node_types.is_empty() {
                return Err(TableError::EmptyGroup(category));
            }

            for name in &node_types {
                if let Some(first) = lookup.insert(name.clone(), category) {
                    return Err(TableError::DuplicateNodeType {
                        name: name.clone(),
                        first,
                        second: category,
                    });
                }
            }

            groups.push(NodeGroup { node_types, category });
        }

        Ok(Self { groups, lookup })
    }

    /// Category for `node_type`, or `None` when the node type is unstyled
    pub fn classify(&self, node_type: &str) -> Option<SemanticCategory> {
        self.lookup.get(node_type).copied()
    }

    pub fn groups(&self) -> &[NodeGroup] {
        &self.groups
    }

    /// Number of distinct node types in the table
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

/// Node groups of the PromQL grammar
pub const PROMQL_STYLE_GROUPS: &[(&str, SemanticCategory)] = &[
    ("LineComment", SemanticCategory::Comment),
    ("LabelName", SemanticCategory::LabelName),
    ("StringLiteral", SemanticCategory::String),
    ("NumberLiteral Duration", SemanticCategory::Number),
    (
        "Abs Absent AbsentOverTime AvgOverTime Ceil Changes ClampMax ClampMin CountOverTime \
         DaysInMonth DayOfMonth DayOfWeek Delta Deriv Exp Floor HistogramQuantile HoltWinters \
         Hour Idelta Increase Irate LabelReplace LabelJoin Ln Log10 Log2 MaxOverTime MinOverTime \
         Minute Month PredictLinear QuantileOverTime Rate Resets Round Scalar Sort SortDesc Sqrt \
         StddevOverTime StdvarOverTime SumOverTime Time Timestamp Vector Year",
        SemanticCategory::FunctionName,
    ),
    (
        "Avg Bottomk Count Count_values Group Max Min Quantile Stddev Stdvar Sum Topk",
        SemanticCategory::OperatorKeyword,
    ),
    (
        "By Without Bool On Ignoring GroupLeft GroupRight Offset",
        SemanticCategory::Modifier,
    ),
    ("And Unless Or", SemanticCategory::LogicOperator),
    (
        "Sub Add Mul Mod Div Eql Neq Lte Lss Gte Gtr EqlRegex EqlSingle NeqRegex Pow",
        SemanticCategory::Operator,
    ),
    ("UnaryOp", SemanticCategory::ArithmeticOperator),
    ("( )", SemanticCategory::Paren),
    ("[ ]", SemanticCategory::SquareBracket),
    ("{ }", SemanticCategory::Brace),
    ("⚠", SemanticCategory::Invalid),
];

static PROMQL_TABLE: Lazy<ClassificationTable> = Lazy::new(|| {
    ClassificationTable::from_groups(PROMQL_STYLE_GROUPS)
        .expect("PromQL style groups must be disjoint")
});

/// The process-wide PromQL classification table
pub fn promql_table() -> &'static ClassificationTable {
    &PROMQL_TABLE
}
