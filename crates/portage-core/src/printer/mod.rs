//! Renders a JavaScript tree to source text.
//!
//! Total for any tree the transformer can produce: every `JsNode` variant
//! prints, expressions appearing at statement position are terminated with
//! a semicolon, and nested binary operands are parenthesized rather than
//! relying on precedence.


use crate::ast::JsNode;

const INDENT: &str = "  ";

/// Print a JavaScript tree as source text
pub fn print_js(node: &JsNode) -> String {
    let mut printer = Printer::default();
    printer.statement(node, 0);
    // Single expressions (no statement wrapper) come back without a newline
    let out = printer.out;
    out.strip_suffix('\n').map(str::to_string).unwrap_or(out)
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn statement(&mut self, node: &JsNode, depth: usize) {
        match node {
            JsNode::Program(statements) => {
                for stmt in statements {
                    self.statement(stmt, depth);
                }
            }

            JsNode::ExpressionStatement(expr) => {
                self.line(depth, &format!("{};", expression(expr)));
            }

            JsNode::FunctionDeclaration { name, params, body } => {
                self.line(depth, &format!("function {}({}) {{", name, params.join(", ")));
                self.block(body, depth);
                self.line(depth, "}");
            }

            JsNode::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.line(depth, &format!("if ({}) {{", expression(test)));
                self.block(consequent, depth);
                match alternate {
                    Some(stmts) => {
                        self.line(depth, "} else {");
                        self.block(stmts, depth);
                        self.line(depth, "}");
                    }
                    None => self.line(depth, "}"),
                }
            }

            JsNode::WhileStatement { test, body } => {
                self.line(depth, &format!("while ({}) {{", expression(test)));
                self.block(body, depth);
                self.line(depth, "}");
            }

            JsNode::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.line(
                    depth,
                    &format!(
                        "for ({}; {}; {}) {{",
                        expression(init),
                        expression(test),
                        expression(update)
                    ),
                );
                self.block(body, depth);
                self.line(depth, "}");
            }

            JsNode::ForOfStatement {
                kind,
                binding,
                source,
                body,
            } => {
                self.line(
                    depth,
                    &format!(
                        "for ({} {} of {}) {{",
                        kind.keyword(),
                        binding,
                        expression(source)
                    ),
                );
                self.block(body, depth);
                self.line(depth, "}");
            }

            // Expressions at statement position become expression statements
            expr => self.line(depth, &format!("{};", expression(expr))),
        }
    }

    fn block(&mut self, statements: &[JsNode], depth: usize) {
        for stmt in statements {
            self.statement(stmt, depth + 1);
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn expression(node: &JsNode) -> String {
    match node {
        JsNode::StringLiteral(value) => format!("'{}'", escape_string(value)),
        JsNode::NumericLiteral(value) => value.clone(),
        JsNode::BooleanLiteral(value) => value.to_string(),
        JsNode::NullLiteral => "null".to_string(),
        JsNode::Identifier(name) => name.clone(),

        JsNode::CallExpression { callee, arguments } => {
            let args: Vec<String> = arguments.iter().map(expression).collect();
            format!("{}({})", expression(callee), args.join(", "))
        }

        JsNode::AssignmentExpression { left, right } => {
            format!("{} = {}", expression(left), expression(right))
        }

        JsNode::ArrayExpression(elements) => {
            let items: Vec<String> = elements.iter().map(expression).collect();
            format!("[{}]", items.join(", "))
        }

        JsNode::MemberExpression { object, property } => {
            format!("{}.{}", expression(object), property)
        }

        JsNode::BinaryExpression { op, left, right }
        | JsNode::LogicalExpression { op, left, right } => {
            format!("{} {} {}", operand(left), op, operand(right))
        }

        // Statement nodes never appear in expression position in trees the
        // transformer builds; render a best-effort fallback anyway.
        other => {
            let mut printer = Printer::default();
            printer.statement(other, 0);
            printer.out.trim_end().to_string()
        }
    }
}

/// Parenthesize nested binary/logical operands instead of encoding operator
/// precedence in the printer
fn operand(node: &JsNode) -> String {
    match node {
        JsNode::BinaryExpression { .. } | JsNode::LogicalExpression { .. } => {
            format!("({})", expression(node))
        }
        _ => expression(node),
    }
}

fn escape_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
