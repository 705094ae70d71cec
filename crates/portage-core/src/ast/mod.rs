// Syntax trees for both sides of the conversion.
// The PHP tree is produced by the parser, the JS tree by the transformer.

pub mod js;
pub mod php;

pub use js::JsNode;
pub use php::PhpNode;
