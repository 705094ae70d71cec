// Parser module - the seam between raw PHP text and the source tree.
// The deterministic conversion path parses with the built-in subset parser;
// alternative front-ends plug in behind the same trait.

use crate::ast::PhpNode;

pub mod php;

#[cfg(test)]
mod tests;

/// Errors produced by the PHP front-end. Always scoped to a single file;
/// the orchestrator records them and keeps converting other files.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("PHP file must start with <?php")]
    MissingPrelude,

    #[error("Empty input")]
    Empty,

    #[error("Unexpected end of input while parsing {context}")]
    UnexpectedEof { context: &'static str },

    #[error("Unexpected token '{found}' at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),
}

/// Trait for all PHP parsers
pub trait PhpParser: Send + Sync {
    /// Parse source code into a PHP tree
    fn parse(&mut self, source: &str) -> Result<PhpNode, ParseError>;

    /// Get parser name for debugging
    fn name(&self) -> &'static str;
}

/// Create the default PHP parser
pub fn create_parser() -> Box<dyn PhpParser> {
    Box::new(php::SubsetParser::new())
}
