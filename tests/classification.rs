//! Integration tests for node-type classification and highlight ordering

use promql_language_support::syntax::classification::{ClassificationTable, PROMQL_STYLE_GROUPS};
use promql_language_support::syntax::highlight::classify_tree;
use promql_language_support::syntax::{promql_syntax, promql_table, SemanticCategory, SyntaxNode};
use quickcheck::{QuickCheck, TestResult};

#[test]
fn test_concrete_scenario() {
    let table = promql_table();
    assert_eq!(table.classify("LineComment").map(|c| c.tag()), Some("comment"));
    assert_eq!(table.classify("StringLiteral").map(|c| c.tag()), Some("string"));
    assert_eq!(table.classify("FooBarUnknown"), None);
}

#[test]
fn test_every_declared_name_maps_to_its_group() {
    let table = promql_table();
    for (names, category) in PROMQL_STYLE_GROUPS {
        for name in names.split_whitespace() {
            assert_eq!(table.classify(name), Some(*category), "wrong category for {}", name);
        }
    }

    let declared: usize = PROMQL_STYLE_GROUPS
        .iter()
        .map(|(names, _)| names.split_whitespace().count())
        .sum();
    assert_eq!(table.len(), declared, "a node type is declared twice");
}

#[test]
fn test_rebuilt_table_matches_static_table() {
    let rebuilt = ClassificationTable::from_groups(PROMQL_STYLE_GROUPS).unwrap();
    assert_eq!(rebuilt.len(), promql_table().len());
    assert_eq!(rebuilt.groups(), promql_table().groups());
}

#[test]
fn test_undeclared_names_are_unstyled() {
    fn prop(name: String) -> TestResult {
        let declared = PROMQL_STYLE_GROUPS
            .iter()
            .any(|(names, _)| names.split_whitespace().any(|n| n == name));
        if declared {
            return TestResult::discard();
        }
        TestResult::from_bool(promql_table().classify(&name).is_none())
    }

    QuickCheck::new().tests(500).quickcheck(prop as fn(String) -> TestResult);
}

#[test]
fn test_one_node_per_group_in_tree_order() {
    let table = promql_table();
    let leaves: Vec<SyntaxNode> = PROMQL_STYLE_GROUPS
        .iter()
        .enumerate()
        .map(|(i, (names, _))| {
            let name = names.split_whitespace().next().unwrap();
            SyntaxNode::leaf(name, i..i + 1)
        })
        .collect();
    let root = SyntaxNode::branch("PromQL", 0..leaves.len(), leaves);

    let classified: Vec<SemanticCategory> =
        classify_tree(table, &root).into_iter().map(|s| s.category).collect();
    let expected: Vec<SemanticCategory> = PROMQL_STYLE_GROUPS.iter().map(|(_, c)| *c).collect();

    assert_eq!(classified, expected);
}

#[test]
fn test_unstyled_nodes_are_skipped() {
    let root = SyntaxNode::branch(
        "PromQL",
        0..9,
        vec![
            SyntaxNode::leaf("NumberLiteral", 0..1),
            SyntaxNode::leaf("BinaryExpr", 2..3),
            SyntaxNode::leaf("LineComment", 4..9),
        ],
    );

    let spans = classify_tree(promql_syntax().table, &root);
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].span, 0..1);
    assert_eq!(spans[0].category, SemanticCategory::Number);
    assert_eq!(spans[1].span, 4..9);
    assert_eq!(spans[1].category, SemanticCategory::Comment);
}
