//! Parsed syntax tree as handed over by the external PromQL parser
//!
//! Only the parts the language-support layer reads are modelled: the node
//! kind name, its byte span in the source and its ordered children.

use std::ops::Range;

use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range as LspRange};

/// Node kind emitted by the parser for unparseable input
pub const ERROR_NODE: &str = "⚠";

/// A node of a parsed PromQL document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: String,
    pub span: Range<usize>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn leaf(kind: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind: kind.into(),
            span,
            children: Vec::new(),
        }
    }

    pub fn branch(kind: impl Into<String>, span: Range<usize>, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind: kind.into(),
            span,
            children,
        }
    }

    /// Root node of an empty document
    pub fn empty_document() -> Self {
        Self::leaf("PromQL", 0..0)
    }

    pub fn is_error(&self) -> bool {
        self.kind == ERROR_NODE
    }

    /// Visit this node and its descendants in source (pre-)order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SyntaxNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// All descendants (and self) for which `predicate` holds, in source order
    pub fn find_all(&self, predicate: impl Fn(&SyntaxNode) -> bool) -> Vec<&SyntaxNode> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if predicate(node) {
                found.push(node);
            }
        });
        found
    }
}

/// Convert a byte offset into an LSP position (UTF-16 columns)
///
/// Offsets past the end of the text clamp to the end of the document. Lines
/// break on `\n`, `\r\n` and `\r` only (ropey is built with `cr_lines`
/// instead of Unicode line breaks), as in the LSP.
pub fn byte_to_position(rope: &Rope, byte: usize) -> Position {
    let byte = byte.min(rope.len_bytes());
    let char_idx = rope.byte_to_char(byte);
    let line = rope.char_to_line(char_idx);
    let line_start = rope.line_to_char(line);
    let utf16_col = rope.char_to_utf16_cu(char_idx) - rope.char_to_utf16_cu(line_start);
    Position::new(line as u32, utf16_col as u32)
}

/// Convert a byte span into an LSP range
pub fn span_to_range(rope: &Rope, span: &Range<usize>) -> LspRange {
    LspRange::new(byte_to_position(rope, span.start), byte_to_position(rope, span.end))
}
