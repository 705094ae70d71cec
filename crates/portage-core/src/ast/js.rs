// JavaScript target tree. Produced exclusively by the transformer and
// consumed exclusively by the printer; nodes are never mutated after
// construction. Shapes follow the @babel/types vocabulary.

use serde::{Deserialize, Serialize};

/// Declaration keyword for variable declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Const,
    Let,
}

impl DeclarationKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Const => "const",
            DeclarationKind::Let => "let",
        }
    }
}

/// One node of the generated JavaScript tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsNode {
    /// Top-level statement sequence
    Program(Vec<JsNode>),

    /// expr;
    ExpressionStatement(Box<JsNode>),

    /// callee(args)
    CallExpression {
        callee: Box<JsNode>,
        arguments: Vec<JsNode>,
    },

    // Literals
    StringLiteral(String),
    NumericLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,

    Identifier(String),

    /// left = right
    AssignmentExpression {
        left: Box<JsNode>,
        right: Box<JsNode>,
    },

    /// function name(params) { body }
    FunctionDeclaration {
        name: String,
        params: Vec<String>,
        body: Vec<JsNode>,
    },

    /// if (test) { consequent } else { alternate }
    IfStatement {
        test: Box<JsNode>,
        consequent: Vec<JsNode>,
        alternate: Option<Vec<JsNode>>,
    },

    /// while (test) { body }
    WhileStatement {
        test: Box<JsNode>,
        body: Vec<JsNode>,
    },

    /// for (init; test; update) { body }
    ForStatement {
        init: Box<JsNode>,
        test: Box<JsNode>,
        update: Box<JsNode>,
        body: Vec<JsNode>,
    },

    /// for (const binding of source) { body }
    ForOfStatement {
        kind: DeclarationKind,
        binding: String,
        source: Box<JsNode>,
        body: Vec<JsNode>,
    },

    /// [elements]
    ArrayExpression(Vec<JsNode>),

    /// object.property (computed access is never produced)
    MemberExpression {
        object: Box<JsNode>,
        property: String,
    },

    /// left <op> right with an arithmetic/comparison operator
    BinaryExpression {
        op: &'static str,
        left: Box<JsNode>,
        right: Box<JsNode>,
    },

    /// left && right / left || right
    LogicalExpression {
        op: &'static str,
        left: Box<JsNode>,
        right: Box<JsNode>,
    },
}

impl JsNode {
    /// True for node variants that print as statements rather than
    /// expressions. The printer uses this to decide on semicolons.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            JsNode::Program(_)
                | JsNode::ExpressionStatement(_)
                | JsNode::FunctionDeclaration { .. }
                | JsNode::IfStatement { .. }
                | JsNode::WhileStatement { .. }
                | JsNode::ForStatement { .. }
                | JsNode::ForOfStatement { .. }
        )
    }
}
