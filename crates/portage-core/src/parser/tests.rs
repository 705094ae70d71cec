use pretty_assertions::assert_eq;

use super::*;
use crate::ast::PhpNode;

fn parse(source: &str) -> PhpNode {
    create_parser().parse(source).unwrap()
}

fn statements(node: PhpNode) -> Vec<PhpNode> {
    match node {
        PhpNode::Program(stmts) => stmts,
        other => panic!("expected Program, got {other:?}"),
    }
}

#[test]
fn test_missing_prelude_is_rejected() {
    let err = create_parser().parse("echo 'hi';").unwrap_err();
    assert!(matches!(err, ParseError::MissingPrelude));
}

#[test]
fn test_empty_input_is_rejected() {
    let err = create_parser().parse("   \n ").unwrap_err();
    assert!(matches!(err, ParseError::Empty));
}

#[test]
fn test_bom_is_stripped_before_prelude_check() {
    let source = "\u{FEFF}<?php echo 'ok';";
    assert_eq!(
        statements(parse(source)),
        vec![PhpNode::Echo {
            expressions: vec![PhpNode::String("ok".into())],
        }]
    );
}

#[test]
fn test_echo_statement() {
    let stmts = statements(parse("<?php echo \"Hello, World!\";"));
    assert_eq!(
        stmts,
        vec![PhpNode::Echo {
            expressions: vec![PhpNode::String("Hello, World!".into())],
        }]
    );
}

#[test]
fn test_assignment_statement() {
    let stmts = statements(parse("<?php $count = 42;"));
    assert_eq!(
        stmts,
        vec![PhpNode::Assign {
            left: Box::new(PhpNode::Variable("$count".into())),
            right: Box::new(PhpNode::Number("42".into())),
        }]
    );
}

#[test]
fn test_literals() {
    let stmts = statements(parse("<?php $a = true; $b = false; $c = null; $d = -3;"));
    assert_eq!(stmts.len(), 4);
    match &stmts[3] {
        PhpNode::Assign { right, .. } => {
            assert_eq!(**right, PhpNode::Number("-3".into()));
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn test_function_declaration() {
    let stmts = statements(parse(
        "<?php function greet($name) { echo 'Hello ' . $name; }",
    ));
    match &stmts[0] {
        PhpNode::Function {
            name,
            arguments,
            body,
        } => {
            assert_eq!(name, "greet");
            assert_eq!(arguments, &vec!["$name".to_string()]);
            assert_eq!(body.len(), 1);
        }
        other => panic!("expected Function, got {other:?}"),
    }
}

#[test]
fn test_if_else_chain() {
    let stmts = statements(parse(
        "<?php if ($x > 0) { echo 'pos'; } else if ($x < 0) { echo 'neg'; } else { echo 'zero'; }",
    ));
    match &stmts[0] {
        PhpNode::If { alternate, .. } => {
            let alt = alternate.as_ref().unwrap();
            assert_eq!(alt.len(), 1);
            assert!(matches!(alt[0], PhpNode::If { .. }));
        }
        other => panic!("expected If, got {other:?}"),
    }
}

#[test]
fn test_while_and_for_loops() {
    let stmts = statements(parse(
        "<?php while ($i < 10) { $i = $i + 1; } for ($j = 0; $j < 5; $j = $j + 1) { echo $j; }",
    ));
    assert!(matches!(stmts[0], PhpNode::While { .. }));
    match &stmts[1] {
        PhpNode::For { init, .. } => {
            assert!(matches!(**init, PhpNode::Assign { .. }));
        }
        other => panic!("expected For, got {other:?}"),
    }
}

#[test]
fn test_foreach_value_only() {
    let stmts = statements(parse("<?php foreach ($users as $user) { echo $user; }"));
    match &stmts[0] {
        PhpNode::Foreach { key, value, .. } => {
            assert_eq!(*key, None);
            assert_eq!(*value, Some("$user".to_string()));
        }
        other => panic!("expected Foreach, got {other:?}"),
    }
}

#[test]
fn test_foreach_key_value() {
    let stmts = statements(parse(
        "<?php foreach ($users as $id => $user) { echo $id; }",
    ));
    match &stmts[0] {
        PhpNode::Foreach { key, value, .. } => {
            assert_eq!(*key, Some("$id".to_string()));
            assert_eq!(*value, Some("$user".to_string()));
        }
        other => panic!("expected Foreach, got {other:?}"),
    }
}

#[test]
fn test_array_literals() {
    let stmts = statements(parse("<?php $a = array(1, 2); $b = [3, 4];"));
    for stmt in &stmts {
        match stmt {
            PhpNode::Assign { right, .. } => match &**right {
                PhpNode::Array { items } => assert_eq!(items.len(), 2),
                other => panic!("expected Array, got {other:?}"),
            },
            other => panic!("expected Assign, got {other:?}"),
        }
    }
}

#[test]
fn test_call_and_member_access() {
    let stmts = statements(parse("<?php strlen($s); $db->query(); $user->name;"));
    assert!(matches!(stmts[0], PhpNode::Call { .. }));
    match &stmts[1] {
        PhpNode::MethodCall { name, .. } => assert_eq!(name, "query"),
        other => panic!("expected MethodCall, got {other:?}"),
    }
    match &stmts[2] {
        PhpNode::PropertyLookup { offset, .. } => assert_eq!(offset, "name"),
        other => panic!("expected PropertyLookup, got {other:?}"),
    }
}

#[test]
fn test_operator_precedence() {
    let stmts = statements(parse("<?php $x = 1 + 2 * 3;"));
    match &stmts[0] {
        PhpNode::Assign { right, .. } => match &**right {
            PhpNode::Bin { op, right, .. } => {
                assert_eq!(op, "+");
                assert!(matches!(
                    **right,
                    PhpNode::Bin { ref op, .. } if op == "*"
                ));
            }
            other => panic!("expected Bin, got {other:?}"),
        },
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn test_string_concat_and_logical_operators() {
    let stmts = statements(parse("<?php $ok = $a && $b || $c; $s = 'x' . 'y';"));
    match &stmts[0] {
        PhpNode::Assign { right, .. } => {
            assert!(matches!(**right, PhpNode::Bin { ref op, .. } if op == "||"));
        }
        other => panic!("expected Assign, got {other:?}"),
    }
    match &stmts[1] {
        PhpNode::Assign { right, .. } => {
            assert!(matches!(**right, PhpNode::Bin { ref op, .. } if op == "."));
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}

#[test]
fn test_unsupported_construct_degrades_to_unknown() {
    let stmts = statements(parse(
        "<?php class Foo { } echo 'still here';",
    ));
    assert_eq!(
        stmts[0],
        PhpNode::Unknown {
            kind: "class".into()
        }
    );
    assert!(matches!(stmts[1], PhpNode::Echo { .. }));
}

#[test]
fn test_return_inside_function_body_degrades_not_fails() {
    let stmts = statements(parse(
        "<?php function f($a) { return $a; } echo 'after';",
    ));
    match &stmts[0] {
        PhpNode::Function { body, .. } => {
            assert_eq!(
                body[0],
                PhpNode::Unknown {
                    kind: "return".into()
                }
            );
        }
        other => panic!("expected Function, got {other:?}"),
    }
    assert!(matches!(stmts[1], PhpNode::Echo { .. }));
}

#[test]
fn test_garbage_input_is_a_parse_error() {
    let err = create_parser().parse("<?php @@@").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn test_comments_are_skipped() {
    let stmts = statements(parse(
        "<?php // line comment\n# hash comment\n/* block */ echo 'ok';",
    ));
    assert_eq!(stmts.len(), 1);
}
