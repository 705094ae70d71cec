// Operator mapping tables between PHP and JavaScript.

use tracing::warn;

/// True when a PHP binary node should become a JS logical expression
pub fn is_logical_operator(op: &str) -> bool {
    matches!(op, "&&" | "||")
}

/// Map a PHP arithmetic/comparison operator to its JavaScript spelling.
/// PHP string concatenation (`.`) becomes JS addition. Unknown operators
/// default to `+` so the output stays syntactically valid.
pub fn map_binary_operator(op: &str) -> &'static str {
    match op {
        "+" => "+",
        "-" => "-",
        "*" => "*",
        "/" => "/",
        "%" => "%",
        "==" => "==",
        "===" => "===",
        "!=" => "!=",
        "!==" => "!==",
        "<" => "<",
        ">" => ">",
        "<=" => "<=",
        ">=" => ">=",
        "." => "+",
        other => {
            warn!("unmapped binary operator '{other}', defaulting to '+'");
            "+"
        }
    }
}

/// Map a PHP logical operator to its JavaScript spelling. Unknown operators
/// default to `&&`.
pub fn map_logical_operator(op: &str) -> &'static str {
    match op {
        "&&" => "&&",
        "||" => "||",
        other => {
            warn!("unmapped logical operator '{other}', defaulting to '&&'");
            "&&"
        }
    }
}
