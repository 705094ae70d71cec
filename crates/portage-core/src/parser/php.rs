// Hand-rolled recursive-descent parser for the PHP subset the deterministic
// conversion path understands. Constructs outside the subset become
// `PhpNode::Unknown` so a single unsupported statement degrades that
// statement, not the whole file.

use crate::ast::PhpNode;

use super::{ParseError, PhpParser};

/// PHP subset parser used by the fallback conversion path
pub struct SubsetParser;

impl SubsetParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SubsetParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PhpParser for SubsetParser {
    fn parse(&mut self, source: &str) -> Result<PhpNode, ParseError> {
        // Strip BOM and surrounding whitespace before the prelude check
        let cleaned = source.trim_start_matches('\u{FEFF}').trim();
        if cleaned.is_empty() {
            return Err(ParseError::Empty);
        }
        let body = cleaned
            .strip_prefix("<?php")
            .ok_or(ParseError::MissingPrelude)?;
        let body = body.strip_suffix("?>").unwrap_or(body);

        let tokens = lex(body)?;
        let mut cursor = Cursor { tokens, pos: 0 };

        let mut statements = Vec::new();
        while !cursor.at_end() {
            statements.push(cursor.statement()?);
        }
        Ok(PhpNode::Program(statements))
    }

    fn name(&self) -> &'static str {
        "php-subset"
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Variable(String),
    Ident(String),
    Number(String),
    Str(String),
    Op(&'static str),
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Semi,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Variable(name) => name.clone(),
            Token::Ident(name) => name.clone(),
            Token::Number(value) => value.clone(),
            Token::Str(_) => "string literal".to_string(),
            Token::Op(op) => (*op).to_string(),
            Token::OpenParen => "(".to_string(),
            Token::CloseParen => ")".to_string(),
            Token::OpenBrace => "{".to_string(),
            Token::CloseBrace => "}".to_string(),
            Token::OpenBracket => "[".to_string(),
            Token::CloseBracket => "]".to_string(),
            Token::Comma => ",".to_string(),
            Token::Semi => ";".to_string(),
        }
    }
}

fn lex(input: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Comments: //, #, /* */
        if c == '/' && bytes.get(i + 1) == Some(&b'/') || c == '#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if c == '/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            continue;
        }

        let start = i;

        if c == '$' {
            i += 1;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push((Token::Variable(input[start..i].to_string()), start));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            i += 1;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push((Token::Ident(input[start..i].to_string()), start));
            continue;
        }

        if c.is_ascii_digit() {
            i += 1;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            tokens.push((Token::Number(input[start..i].to_string()), start));
            continue;
        }

        if c == '\'' || c == '"' {
            let quote = c;
            i += 1;
            let mut value = String::new();
            let mut closed = false;
            while i < bytes.len() {
                let ch = bytes[i] as char;
                if ch == '\\' && i + 1 < bytes.len() {
                    let escaped = bytes[i + 1] as char;
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                    i += 2;
                    continue;
                }
                if ch == quote {
                    closed = true;
                    i += 1;
                    break;
                }
                value.push(ch);
                i += 1;
            }
            if !closed {
                return Err(ParseError::UnexpectedEof {
                    context: "string literal",
                });
            }
            tokens.push((Token::Str(value), start));
            continue;
        }

        // Multi-character operators first
        let rest = &input[i..];
        let multi = ["===", "!==", "==", "!=", "<=", ">=", "&&", "||", "=>", "->"];
        if let Some(&op) = multi.iter().find(|op| rest.starts_with(**op)) {
            tokens.push((Token::Op(op), start));
            i += op.len();
            continue;
        }

        let token = match c {
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            '{' => Token::OpenBrace,
            '}' => Token::CloseBrace,
            '[' => Token::OpenBracket,
            ']' => Token::CloseBracket,
            ',' => Token::Comma,
            ';' => Token::Semi,
            '=' => Token::Op("="),
            '<' => Token::Op("<"),
            '>' => Token::Op(">"),
            '+' => Token::Op("+"),
            '-' => Token::Op("-"),
            '*' => Token::Op("*"),
            '/' => Token::Op("/"),
            '%' => Token::Op("%"),
            '.' => Token::Op("."),
            '!' => Token::Op("!"),
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: other.to_string(),
                    offset: start,
                })
            }
        };
        tokens.push((token, start));
        i += 1;
    }

    Ok(tokens)
}

/// Constructs the subset parser recognises by keyword but cannot model.
/// They are skipped over and surface as `Unknown` nodes.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "class", "interface", "trait", "namespace", "use", "require", "require_once", "include",
    "include_once", "return", "switch", "try", "throw", "do", "global", "static", "abstract",
    "final", "public", "private", "protected", "new",
];

struct Cursor {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Cursor {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, o)| *o)
            .unwrap_or(0)
    }

    fn error_here(&self, context: &'static str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                found: token.describe(),
                offset: self.offset(),
            },
            None => ParseError::UnexpectedEof { context },
        }
    }

    fn expect(&mut self, expected: &Token, context: &'static str) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_here(context))
        }
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if matches!(self.peek(), Some(Token::Op(o)) if *o == op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_semi(&mut self) {
        while self.peek() == Some(&Token::Semi) {
            self.pos += 1;
        }
    }

    fn statement(&mut self) -> Result<PhpNode, ParseError> {
        if let Some(Token::Ident(word)) = self.peek() {
            let word = word.clone();
            match word.as_str() {
                "echo" => return self.echo_statement(),
                "function" => return self.function_statement(),
                "if" => return self.if_statement(),
                "while" => return self.while_statement(),
                "for" => return self.for_statement(),
                "foreach" => return self.foreach_statement(),
                kw if UNSUPPORTED_KEYWORDS.contains(&kw) => {
                    self.skip_construct();
                    return Ok(PhpNode::Unknown { kind: word });
                }
                _ => {}
            }
        }

        let expr = self.expression()?;
        self.eat_semi();
        Ok(expr)
    }

    fn echo_statement(&mut self) -> Result<PhpNode, ParseError> {
        self.advance(); // echo
        let mut expressions = vec![self.expression()?];
        while self.peek() == Some(&Token::Comma) {
            self.advance();
            expressions.push(self.expression()?);
        }
        self.eat_semi();
        Ok(PhpNode::Echo { expressions })
    }

    fn function_statement(&mut self) -> Result<PhpNode, ParseError> {
        self.advance(); // function
        let name = match self.advance() {
            Some(Token::Ident(name)) => name,
            _ => {
                self.pos -= 1;
                return Err(self.error_here("function name"));
            }
        };

        self.expect(&Token::OpenParen, "function parameters")?;
        let mut arguments = Vec::new();
        while self.peek() != Some(&Token::CloseParen) {
            match self.advance() {
                Some(Token::Variable(param)) => arguments.push(param),
                Some(Token::Comma) => {}
                _ => {
                    self.pos -= 1;
                    return Err(self.error_here("function parameters"));
                }
            }
        }
        self.expect(&Token::CloseParen, "function parameters")?;

        let body = self.block()?;
        Ok(PhpNode::Function {
            name,
            arguments,
            body,
        })
    }

    fn if_statement(&mut self) -> Result<PhpNode, ParseError> {
        self.advance(); // if
        self.expect(&Token::OpenParen, "if condition")?;
        let test = self.expression()?;
        self.expect(&Token::CloseParen, "if condition")?;
        let body = self.block()?;

        let alternate = if matches!(self.peek(), Some(Token::Ident(w)) if w == "elseif") {
            // elseif chains nest as a single-statement alternate
            Some(vec![self.if_statement()?])
        } else if matches!(self.peek(), Some(Token::Ident(w)) if w == "else") {
            self.advance();
            if matches!(self.peek(), Some(Token::Ident(w)) if w == "if") {
                Some(vec![self.if_statement()?])
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };

        Ok(PhpNode::If {
            test: Box::new(test),
            body,
            alternate,
        })
    }

    fn while_statement(&mut self) -> Result<PhpNode, ParseError> {
        self.advance(); // while
        self.expect(&Token::OpenParen, "while condition")?;
        let test = self.expression()?;
        self.expect(&Token::CloseParen, "while condition")?;
        let body = self.block()?;
        Ok(PhpNode::While {
            test: Box::new(test),
            body,
        })
    }

    fn for_statement(&mut self) -> Result<PhpNode, ParseError> {
        self.advance(); // for
        self.expect(&Token::OpenParen, "for clauses")?;
        let init = self.expression()?;
        self.expect(&Token::Semi, "for clauses")?;
        let test = self.expression()?;
        self.expect(&Token::Semi, "for clauses")?;
        let update = self.expression()?;
        self.expect(&Token::CloseParen, "for clauses")?;
        let body = self.block()?;
        Ok(PhpNode::For {
            init: Box::new(init),
            test: Box::new(test),
            update: Box::new(update),
            body,
        })
    }

    fn foreach_statement(&mut self) -> Result<PhpNode, ParseError> {
        self.advance(); // foreach
        self.expect(&Token::OpenParen, "foreach clause")?;
        let source = self.expression()?;

        if !matches!(self.peek(), Some(Token::Ident(w)) if w == "as") {
            return Err(self.error_here("foreach clause"));
        }
        self.advance(); // as

        let first = match self.advance() {
            Some(Token::Variable(name)) => name,
            _ => {
                self.pos -= 1;
                return Err(self.error_here("foreach binding"));
            }
        };

        let (key, value) = if self.eat_op("=>") {
            let second = match self.advance() {
                Some(Token::Variable(name)) => name,
                _ => {
                    self.pos -= 1;
                    return Err(self.error_here("foreach binding"));
                }
            };
            (Some(first), Some(second))
        } else {
            (None, Some(first))
        };

        self.expect(&Token::CloseParen, "foreach clause")?;
        let body = self.block()?;
        Ok(PhpNode::Foreach {
            source: Box::new(source),
            key,
            value,
            body,
        })
    }

    fn block(&mut self) -> Result<Vec<PhpNode>, ParseError> {
        self.expect(&Token::OpenBrace, "block")?;
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                Some(Token::CloseBrace) => {
                    self.advance();
                    return Ok(statements);
                }
                Some(_) => statements.push(self.statement()?),
                None => return Err(ParseError::UnexpectedEof { context: "block" }),
            }
        }
    }

    /// Skip past a construct the subset does not model: consume through the
    /// next top-level semicolon, or a balanced brace block if one opens first.
    fn skip_construct(&mut self) {
        self.advance(); // the keyword itself
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::OpenBrace => depth += 1,
                Token::CloseBrace => {
                    if depth == 0 {
                        // Closing brace of the enclosing block; leave it
                        return;
                    }
                    self.advance();
                    if depth == 1 {
                        return;
                    }
                    depth -= 1;
                    continue;
                }
                Token::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    // Expression grammar, lowest precedence first

    fn expression(&mut self) -> Result<PhpNode, ParseError> {
        let left = self.logical_or()?;
        if self.eat_op("=") {
            let right = self.expression()?; // right-associative
            return Ok(PhpNode::Assign {
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn logical_or(&mut self) -> Result<PhpNode, ParseError> {
        let mut left = self.logical_and()?;
        while self.eat_op("||") {
            let right = self.logical_and()?;
            left = bin("||", left, right);
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> Result<PhpNode, ParseError> {
        let mut left = self.equality()?;
        while self.eat_op("&&") {
            let right = self.equality()?;
            left = bin("&&", left, right);
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<PhpNode, ParseError> {
        let mut left = self.comparison()?;
        loop {
            let op = ["===", "!==", "==", "!="]
                .into_iter()
                .find(|&op| self.eat_op(op));
            match op {
                Some(op) => {
                    let right = self.comparison()?;
                    left = bin(op, left, right);
                }
                None => return Ok(left),
            }
        }
    }

    fn comparison(&mut self) -> Result<PhpNode, ParseError> {
        let mut left = self.additive()?;
        loop {
            let op = ["<=", ">=", "<", ">"].into_iter().find(|&op| self.eat_op(op));
            match op {
                Some(op) => {
                    let right = self.additive()?;
                    left = bin(op, left, right);
                }
                None => return Ok(left),
            }
        }
    }

    fn additive(&mut self) -> Result<PhpNode, ParseError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = ["+", "-", "."].into_iter().find(|&op| self.eat_op(op));
            match op {
                Some(op) => {
                    let right = self.multiplicative()?;
                    left = bin(op, left, right);
                }
                None => return Ok(left),
            }
        }
    }

    fn multiplicative(&mut self) -> Result<PhpNode, ParseError> {
        let mut left = self.unary()?;
        loop {
            let op = ["*", "/", "%"].into_iter().find(|&op| self.eat_op(op));
            match op {
                Some(op) => {
                    let right = self.unary()?;
                    left = bin(op, left, right);
                }
                None => return Ok(left),
            }
        }
    }

    fn unary(&mut self) -> Result<PhpNode, ParseError> {
        if self.eat_op("-") {
            // Fold unary minus into numeric literals; anything else is
            // outside the subset
            return match self.unary()? {
                PhpNode::Number(value) => Ok(PhpNode::Number(format!("-{value}"))),
                _ => Ok(PhpNode::Unknown {
                    kind: "unary".to_string(),
                }),
            };
        }
        if self.eat_op("!") {
            let _operand = self.unary()?;
            return Ok(PhpNode::Unknown {
                kind: "unary".to_string(),
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<PhpNode, ParseError> {
        let mut node = self.primary()?;
        loop {
            match self.peek() {
                Some(Token::OpenParen) => {
                    self.advance();
                    let arguments = self.argument_list()?;
                    node = PhpNode::Call {
                        what: Box::new(node),
                        arguments,
                    };
                }
                Some(Token::Op("->")) => {
                    self.advance();
                    let name = match self.advance() {
                        Some(Token::Ident(name)) => name,
                        _ => {
                            self.pos -= 1;
                            return Err(self.error_here("member name"));
                        }
                    };
                    if self.peek() == Some(&Token::OpenParen) {
                        self.advance();
                        // Method-call arguments are parsed for validity but
                        // carry no mapping on the target side
                        let _arguments = self.argument_list()?;
                        node = PhpNode::MethodCall {
                            what: Box::new(node),
                            name,
                        };
                    } else {
                        node = PhpNode::PropertyLookup {
                            what: Box::new(node),
                            offset: name,
                        };
                    }
                }
                Some(Token::OpenBracket) => {
                    self.advance();
                    let _index = self.expression()?;
                    self.expect(&Token::CloseBracket, "array index")?;
                    node = PhpNode::Unknown {
                        kind: "offsetlookup".to_string(),
                    };
                }
                _ => return Ok(node),
            }
        }
    }

    fn argument_list(&mut self) -> Result<Vec<PhpNode>, ParseError> {
        let mut arguments = Vec::new();
        if self.peek() == Some(&Token::CloseParen) {
            self.advance();
            return Ok(arguments);
        }
        loop {
            arguments.push(self.expression()?);
            match self.advance() {
                Some(Token::Comma) => {}
                Some(Token::CloseParen) => return Ok(arguments),
                _ => {
                    self.pos -= 1;
                    return Err(self.error_here("argument list"));
                }
            }
        }
    }

    fn primary(&mut self) -> Result<PhpNode, ParseError> {
        match self.peek().cloned() {
            Some(Token::Variable(name)) => {
                self.advance();
                Ok(PhpNode::Variable(name))
            }
            Some(Token::Number(value)) => {
                self.advance();
                Ok(PhpNode::Number(value))
            }
            Some(Token::Str(value)) => {
                self.advance();
                Ok(PhpNode::String(value))
            }
            Some(Token::OpenBracket) => {
                self.advance();
                self.array_items(Token::CloseBracket)
            }
            Some(Token::OpenParen) => {
                self.advance();
                let inner = self.expression()?;
                self.expect(&Token::CloseParen, "parenthesized expression")?;
                Ok(inner)
            }
            Some(Token::Ident(word)) => {
                self.advance();
                match word.as_str() {
                    "true" | "TRUE" | "True" => Ok(PhpNode::Boolean(true)),
                    "false" | "FALSE" | "False" => Ok(PhpNode::Boolean(false)),
                    "null" | "NULL" | "Null" => Ok(PhpNode::Null),
                    "array" if self.peek() == Some(&Token::OpenParen) => {
                        self.advance();
                        self.array_items(Token::CloseParen)
                    }
                    // Bare names (function references, constants) read as
                    // sigil-less variables
                    _ => Ok(PhpNode::Variable(word)),
                }
            }
            _ => Err(self.error_here("expression")),
        }
    }

    fn array_items(&mut self, terminator: Token) -> Result<PhpNode, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(&terminator) {
                self.advance();
                return Ok(PhpNode::Array { items });
            }
            items.push(self.expression()?);
            if self.peek() == Some(&Token::Comma) {
                self.advance();
            }
        }
    }
}

fn bin(op: &str, left: PhpNode, right: PhpNode) -> PhpNode {
    PhpNode::Bin {
        op: op.to_string(),
        left: Box::new(left),
        right: Box::new(right),
    }
}
