//! Structural rewrite from the PHP tree to the JavaScript tree.
//!
//! `transform` is a pure function of its input: it never fails and never
//! mutates shared state. Node kinds the rewrite does not understand become
//! a visible `TODO: Handle <kind>` placeholder statement instead of
//! aborting the file, so output is always best-effort complete.

pub mod ops;


use tracing::warn;

use crate::ast::{
    js::DeclarationKind,
    php::strip_sigil,
    JsNode, PhpNode,
};

/// Transform one PHP node into the corresponding JavaScript node
pub fn transform(node: &PhpNode) -> JsNode {
    match node {
        PhpNode::Program(children) => {
            JsNode::Program(children.iter().map(transform).collect())
        }

        // echo maps onto console.log with the first expression
        PhpNode::Echo { expressions } => {
            let argument = expressions
                .first()
                .map(transform)
                .unwrap_or(JsNode::StringLiteral(String::new()));
            JsNode::ExpressionStatement(Box::new(JsNode::CallExpression {
                callee: Box::new(JsNode::Identifier("console.log".to_string())),
                arguments: vec![argument],
            }))
        }

        PhpNode::String(value) => JsNode::StringLiteral(value.clone()),
        PhpNode::Number(value) => JsNode::NumericLiteral(value.clone()),
        PhpNode::Boolean(value) => JsNode::BooleanLiteral(*value),
        PhpNode::Null => JsNode::NullLiteral,

        PhpNode::Variable(name) => JsNode::Identifier(strip_sigil(name)),

        PhpNode::Assign { left, right } => JsNode::AssignmentExpression {
            left: Box::new(transform(left)),
            right: Box::new(transform(right)),
        },

        PhpNode::Function {
            name,
            arguments,
            body,
        } => JsNode::FunctionDeclaration {
            name: name.clone(),
            params: arguments.iter().map(|a| strip_sigil(a)).collect(),
            body: body.iter().map(transform).collect(),
        },

        PhpNode::If {
            test,
            body,
            alternate,
        } => JsNode::IfStatement {
            test: Box::new(transform(test)),
            consequent: body.iter().map(transform).collect(),
            alternate: alternate
                .as_ref()
                .map(|stmts| stmts.iter().map(transform).collect()),
        },

        PhpNode::While { test, body } => JsNode::WhileStatement {
            test: Box::new(transform(test)),
            body: body.iter().map(transform).collect(),
        },

        PhpNode::For {
            init,
            test,
            update,
            body,
        } => JsNode::ForStatement {
            init: Box::new(transform(init)),
            test: Box::new(transform(test)),
            update: Box::new(transform(update)),
            body: body.iter().map(transform).collect(),
        },

        // Only the key (or a placeholder) is bound; the value binding is
        // intentionally not propagated into the loop body.
        PhpNode::Foreach {
            source, key, body, ..
        } => JsNode::ForOfStatement {
            kind: DeclarationKind::Const,
            binding: key
                .as_ref()
                .map(|k| strip_sigil(k))
                .unwrap_or_else(|| "item".to_string()),
            source: Box::new(transform(source)),
            body: body.iter().map(transform).collect(),
        },

        PhpNode::Array { items } => {
            JsNode::ArrayExpression(items.iter().map(transform).collect())
        }

        PhpNode::Call { what, arguments } => JsNode::CallExpression {
            callee: Box::new(transform(what)),
            arguments: arguments.iter().map(transform).collect(),
        },

        PhpNode::MethodCall { what, name } => JsNode::MemberExpression {
            object: Box::new(transform(what)),
            property: name.clone(),
        },

        PhpNode::PropertyLookup { what, offset } => JsNode::MemberExpression {
            object: Box::new(transform(what)),
            property: offset.clone(),
        },

        PhpNode::Bin { op, left, right } => {
            if ops::is_logical_operator(op) {
                JsNode::LogicalExpression {
                    op: ops::map_logical_operator(op),
                    left: Box::new(transform(left)),
                    right: Box::new(transform(right)),
                }
            } else {
                JsNode::BinaryExpression {
                    op: ops::map_binary_operator(op),
                    left: Box::new(transform(left)),
                    right: Box::new(transform(right)),
                }
            }
        }

        PhpNode::Unknown { kind } => placeholder(kind),
    }
}

/// Visible marker emitted for node kinds the rewrite has no mapping for
fn placeholder(kind: &str) -> JsNode {
    warn!("unhandled PHP AST node kind: {kind}");
    JsNode::ExpressionStatement(Box::new(JsNode::StringLiteral(format!(
        "TODO: Handle {kind}"
    ))))
}
