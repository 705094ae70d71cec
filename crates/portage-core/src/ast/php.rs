// PHP source tree, covering the subset of the language the deterministic
// conversion path understands. Node kinds mirror the php-parser vocabulary
// (echo, bin, propertylookup, ...) so the transformer dispatch reads the
// same way the source grammar does.

use serde::{Deserialize, Serialize};

/// One node of the parsed PHP source tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhpNode {
    /// Top-level statement sequence
    Program(Vec<PhpNode>),

    /// echo expr;
    Echo { expressions: Vec<PhpNode> },

    // Literals
    String(String),
    Number(String),
    Boolean(bool),
    Null,

    /// $name — the sigil is kept here and stripped during transformation
    Variable(String),

    /// left = right
    Assign {
        left: Box<PhpNode>,
        right: Box<PhpNode>,
    },

    /// function name($a, $b) { body }
    Function {
        name: String,
        arguments: Vec<String>,
        body: Vec<PhpNode>,
    },

    /// if (test) { body } else { alternate }
    If {
        test: Box<PhpNode>,
        body: Vec<PhpNode>,
        alternate: Option<Vec<PhpNode>>,
    },

    /// while (test) { body }
    While {
        test: Box<PhpNode>,
        body: Vec<PhpNode>,
    },

    /// for (init; test; update) { body }
    For {
        init: Box<PhpNode>,
        test: Box<PhpNode>,
        update: Box<PhpNode>,
        body: Vec<PhpNode>,
    },

    /// foreach (source as $key => $value) { body }
    Foreach {
        source: Box<PhpNode>,
        key: Option<String>,
        value: Option<String>,
        body: Vec<PhpNode>,
    },

    /// array(a, b, c) or [a, b, c]
    Array { items: Vec<PhpNode> },

    /// what(arguments)
    Call {
        what: Box<PhpNode>,
        arguments: Vec<PhpNode>,
    },

    /// $obj->method(...)
    MethodCall {
        what: Box<PhpNode>,
        name: String,
    },

    /// $obj->prop
    PropertyLookup {
        what: Box<PhpNode>,
        offset: String,
    },

    /// left <op> right, both arithmetic/comparison and logical
    Bin {
        op: String,
        left: Box<PhpNode>,
        right: Box<PhpNode>,
    },

    /// A construct the parser recognised but cannot model. The transformer
    /// turns this into a visible placeholder rather than failing the file.
    Unknown { kind: String },
}

impl PhpNode {
    /// Short kind name, matching the php-parser vocabulary. Used by the
    /// placeholder policy and log messages.
    pub fn kind(&self) -> &str {
        match self {
            PhpNode::Program(_) => "program",
            PhpNode::Echo { .. } => "echo",
            PhpNode::String(_) => "string",
            PhpNode::Number(_) => "number",
            PhpNode::Boolean(_) => "boolean",
            PhpNode::Null => "null",
            PhpNode::Variable(_) => "variable",
            PhpNode::Assign { .. } => "assign",
            PhpNode::Function { .. } => "function",
            PhpNode::If { .. } => "if",
            PhpNode::While { .. } => "while",
            PhpNode::For { .. } => "for",
            PhpNode::Foreach { .. } => "foreach",
            PhpNode::Array { .. } => "array",
            PhpNode::Call { .. } => "call",
            PhpNode::MethodCall { .. } => "methodcall",
            PhpNode::PropertyLookup { .. } => "propertylookup",
            PhpNode::Bin { .. } => "bin",
            PhpNode::Unknown { kind } => kind,
        }
    }
}

/// Strip the `$` sigil from a PHP variable name
pub fn strip_sigil(name: &str) -> String {
    name.trim_start_matches('$').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_parser_vocabulary() {
        assert_eq!(PhpNode::Null.kind(), "null");
        assert_eq!(PhpNode::Variable("$x".into()).kind(), "variable");
        assert_eq!(
            PhpNode::Bin {
                op: ".".into(),
                left: Box::new(PhpNode::String("a".into())),
                right: Box::new(PhpNode::String("b".into())),
            }
            .kind(),
            "bin"
        );
        assert_eq!(
            PhpNode::Unknown {
                kind: "closure".into()
            }
            .kind(),
            "closure"
        );
    }

    #[test]
    fn test_strip_sigil() {
        assert_eq!(strip_sigil("$user"), "user");
        assert_eq!(strip_sigil("plain"), "plain");
    }
}
