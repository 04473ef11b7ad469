//! Highlight spans and LSP semantic tokens from a classified syntax tree

use std::ops::Range;

use ropey::Rope;
use tower_lsp::lsp_types::{SemanticToken, SemanticTokensLegend};
use tracing::{debug, trace};

use super::classification::{ClassificationTable, SemanticCategory};
use super::tree::{byte_to_position, SyntaxNode};

/// A classified region of the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub span: Range<usize>,
    pub category: SemanticCategory,
}

/// Classify every node of `root` in source order
///
/// Unmapped node types produce no span. A classified node's descendants are
/// still visited, so a styled child inside a styled parent (for instance a
/// token wrapped by an error node) yields its own, nested span.
pub fn classify_tree(table: &ClassificationTable, root: &SyntaxNode) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    root.walk(&mut |node| {
        if let Some(category) = table.classify(&node.kind) {
            spans.push(HighlightSpan {
                span: node.span.clone(),
                category,
            });
        }
    });
    trace!("Classified {} spans", spans.len());
    spans
}

/// Legend matching the token-type indices emitted by [`to_semantic_tokens`]
pub fn semantic_tokens_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: SemanticCategory::ALL.iter().map(|c| c.token_type()).collect(),
        token_modifiers: vec![],
    }
}

/// Flatten possibly nested spans into disjoint spans ordered by start
///
/// The innermost span wins where spans nest; the uncovered remainder of an
/// enclosing span is kept as separate pieces. Among spans with identical
/// bounds the later one wins.
pub fn flatten_spans(spans: &[HighlightSpan]) -> Vec<HighlightSpan> {
    let mut sorted: Vec<&HighlightSpan> =
        spans.iter().filter(|s| s.span.end > s.span.start).collect();
    sorted.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then(b.span.end.cmp(&a.span.end))
    });

    let mut flat = Vec::with_capacity(sorted.len());
    let mut emit = |from: usize, to: usize, category: SemanticCategory| {
        if to > from {
            flat.push(HighlightSpan {
                span: from..to,
                category,
            });
        }
    };

    // Open spans, innermost last
    let mut open: Vec<(usize, SemanticCategory)> = Vec::new();
    let mut cursor = 0usize;

    for span in sorted {
        while let Some(&(end, category)) = open.last() {
            if end > span.span.start {
                break;
            }
            emit(cursor, end, category);
            cursor = cursor.max(end);
            open.pop();
        }
        if let Some(&(_, category)) = open.last() {
            emit(cursor, span.span.start, category);
        }
        cursor = cursor.max(span.span.start);
        open.push((span.span.end, span.category));
    }

    while let Some((end, category)) = open.pop() {
        emit(cursor, end, category);
        cursor = cursor.max(end);
    }

    flat
}

/// Delta-encode highlight spans as LSP semantic tokens
///
/// Spans are flattened first so no two tokens overlap; zero-length spans are
/// skipped and multi-line spans are split into one token per line.
pub fn to_semantic_tokens(spans: &[HighlightSpan], rope: &Rope) -> Vec<SemanticToken> {
    debug!("Converting {} highlight spans to semantic tokens", spans.len());

    let mut pieces = Vec::new();
    for span in flatten_spans(spans) {
        let start = byte_to_position(rope, span.span.start);
        let end = byte_to_position(rope, span.span.end);

        if start.line == end.line {
            pieces.push((
                start.line,
                start.character,
                end.character - start.character,
                span.category,
            ));
            continue;
        }

        for line in start.line..=end.line {
            let first = if line == start.line { start.character } else { 0 };
            let last = if line == end.line {
                end.character
            } else {
                line_length_utf16(rope, line as usize)
            };
            if last > first {
                pieces.push((line, first, last - first, span.category));
            }
        }
    }

    let mut tokens = Vec::with_capacity(pieces.len());
    let mut prev_line = 0u32;
    let mut prev_char = 0u32;

    for (line, character, length, category) in pieces {
        let delta_line = line - prev_line;
        let delta_start = if delta_line == 0 { character - prev_char } else { character };

        tokens.push(SemanticToken {
            delta_line,
            delta_start,
            length,
            token_type: category.legend_index(),
            token_modifiers_bitset: 0,
        });

        prev_line = line;
        prev_char = character;
    }

    trace!("Generated {} semantic tokens", tokens.len());
    tokens
}

// Line length in UTF-16 units, excluding the line break
fn line_length_utf16(rope: &Rope, line: usize) -> u32 {
    let text = rope.line(line).to_string();
    text.trim_end_matches(['\n', '\r']).encode_utf16().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::classification::promql_table;
    use indoc::indoc;

    fn query_tree() -> SyntaxNode {
        // sum(rate(x[5m])) # c
        SyntaxNode::branch(
            "PromQL",
            0..20,
            vec![
                SyntaxNode::branch(
                    "AggregateExpr",
                    0..16,
                    vec![
                        SyntaxNode::leaf("Sum", 0..3),
                        SyntaxNode::leaf("(", 3..4),
                        SyntaxNode::branch(
                            "FunctionCall",
                            4..15,
                            vec![
                                SyntaxNode::leaf("Rate", 4..8),
                                SyntaxNode::leaf("(", 8..9),
                                SyntaxNode::leaf("Identifier", 9..10),
                                SyntaxNode::leaf("[", 10..11),
                                SyntaxNode::leaf("Duration", 11..13),
                                SyntaxNode::leaf("]", 13..14),
                                SyntaxNode::leaf(")", 14..15),
                            ],
                        ),
                        SyntaxNode::leaf(")", 15..16),
                    ],
                ),
                SyntaxNode::leaf("LineComment", 17..20),
            ],
        )
    }

    #[test]
    fn test_classify_tree_keeps_source_order() {
        let categories: Vec<_> = classify_tree(promql_table(), &query_tree())
            .into_iter()
            .map(|s| s.category)
            .collect();

        assert_eq!(
            categories,
            vec![
                SemanticCategory::OperatorKeyword,
                SemanticCategory::Paren,
                SemanticCategory::FunctionName,
                SemanticCategory::Paren,
                SemanticCategory::SquareBracket,
                SemanticCategory::Number,
                SemanticCategory::SquareBracket,
                SemanticCategory::Paren,
                SemanticCategory::Paren,
                SemanticCategory::Comment,
            ]
        );
    }

    #[test]
    fn test_semantic_tokens_are_delta_encoded() {
        let source = indoc! {"
            sum(x)
              # c
        "};
        let rope = Rope::from_str(source);
        let spans = vec![
            HighlightSpan {
                span: 9..12,
                category: SemanticCategory::Comment,
            },
            HighlightSpan {
                span: 0..3,
                category: SemanticCategory::OperatorKeyword,
            },
            HighlightSpan {
                span: 3..4,
                category: SemanticCategory::Paren,
            },
        ];

        let tokens = to_semantic_tokens(&spans, &rope);
        assert_eq!(tokens.len(), 3);

        assert_eq!((tokens[0].delta_line, tokens[0].delta_start, tokens[0].length), (0, 0, 3));
        assert_eq!(tokens[0].token_type, SemanticCategory::OperatorKeyword.legend_index());

        assert_eq!((tokens[1].delta_line, tokens[1].delta_start, tokens[1].length), (0, 3, 1));
        assert_eq!((tokens[2].delta_line, tokens[2].delta_start, tokens[2].length), (1, 2, 3));
        assert_eq!(tokens[2].token_type, SemanticCategory::Comment.legend_index());
    }

    #[test]
    fn test_multiline_span_is_split_per_line() {
        let rope = Rope::from_str("\"ab\ncd\"");
        let spans = vec![HighlightSpan {
            span: 0..7,
            category: SemanticCategory::String,
        }];

        let tokens = to_semantic_tokens(&spans, &rope);
        assert_eq!(tokens.len(), 2);
        assert_eq!((tokens[0].delta_line, tokens[0].delta_start, tokens[0].length), (0, 0, 3));
        assert_eq!((tokens[1].delta_line, tokens[1].delta_start, tokens[1].length), (1, 0, 3));
    }

    #[test]
    fn test_empty_spans_are_skipped() {
        let rope = Rope::from_str("");
        let spans = vec![HighlightSpan {
            span: 0..0,
            category: SemanticCategory::Invalid,
        }];
        assert!(to_semantic_tokens(&spans, &rope).is_empty());
    }

    fn decode(tokens: &[SemanticToken]) -> Vec<(u32, u32, u32, u32)> {
        let mut line = 0;
        let mut character = 0;
        tokens
            .iter()
            .map(|t| {
                if t.delta_line > 0 {
                    character = 0;
                }
                line += t.delta_line;
                character += t.delta_start;
                (line, character, t.length, t.token_type)
            })
            .collect()
    }

    fn assert_no_overlap(tokens: &[SemanticToken]) {
        let decoded = decode(tokens);
        for pair in decoded.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if prev.0 == next.0 {
                assert!(
                    next.1 >= prev.1 + prev.2,
                    "token at col {} starts inside previous token ending at {}",
                    next.1,
                    prev.1 + prev.2
                );
            }
        }
    }

    #[test]
    fn test_error_node_wrapping_styled_token() {
        // "sum!!" recovered as an error node around the aggregation keyword
        let tree = SyntaxNode::branch(
            "PromQL",
            0..5,
            vec![SyntaxNode::branch(
                "⚠",
                0..5,
                vec![SyntaxNode::leaf("Sum", 0..3)],
            )],
        );
        let rope = Rope::from_str("sum!!");

        let tokens = to_semantic_tokens(&classify_tree(promql_table(), &tree), &rope);
        assert_no_overlap(&tokens);
        assert_eq!(
            decode(&tokens),
            vec![
                (0, 0, 3, SemanticCategory::OperatorKeyword.legend_index()),
                (0, 3, 2, SemanticCategory::Invalid.legend_index()),
            ]
        );
    }

    #[test]
    fn test_nested_span_splits_enclosing_span() {
        let spans = vec![
            HighlightSpan {
                span: 0..7,
                category: SemanticCategory::Invalid,
            },
            HighlightSpan {
                span: 2..5,
                category: SemanticCategory::Number,
            },
        ];

        assert_eq!(
            flatten_spans(&spans),
            vec![
                HighlightSpan {
                    span: 0..2,
                    category: SemanticCategory::Invalid,
                },
                HighlightSpan {
                    span: 2..5,
                    category: SemanticCategory::Number,
                },
                HighlightSpan {
                    span: 5..7,
                    category: SemanticCategory::Invalid,
                },
            ]
        );
    }

    #[test]
    fn test_identical_bounds_keep_innermost() {
        let tree = SyntaxNode::branch("⚠", 0..3, vec![SyntaxNode::leaf("Sum", 0..3)]);
        let flat = flatten_spans(&classify_tree(promql_table(), &tree));
        assert_eq!(
            flat,
            vec![HighlightSpan {
                span: 0..3,
                category: SemanticCategory::OperatorKeyword,
            }]
        );
    }

    #[test]
    fn test_query_tokens_do_not_overlap() {
        let rope = Rope::from_str("sum(rate(x[5m])) # c");
        let tokens = to_semantic_tokens(&classify_tree(promql_table(), &query_tree()), &rope);
        assert_eq!(tokens.len(), 10);
        assert_no_overlap(&tokens);
    }

    #[test]
    fn test_legend_covers_every_category() {
        let legend = semantic_tokens_legend();
        assert_eq!(legend.token_types.len(), SemanticCategory::ALL.len());
        for category in SemanticCategory::ALL {
            assert_eq!(legend.token_types[category.legend_index() as usize], category.token_type());
        }
    }
}
