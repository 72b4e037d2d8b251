//! Context system for conditional keybindings
//!
//! Rules carry an optional `when` expression that is evaluated against a
//! snapshot of named context keys supplied by the host, e.g.
//! `editorFocus && !readonly || panel == 'terminal'`.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use super::config::KeymapError;

/// A value stored under a context key
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl ContextValue {
    /// Truthiness used when a key appears bare in an expression
    pub fn is_truthy(&self) -> bool {
        match self {
            ContextValue::Bool(b) => *b,
            ContextValue::Number(n) => *n != 0.0,
            ContextValue::Str(s) => !s.is_empty(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            ContextValue::Number(n) => Some(*n),
            ContextValue::Str(s) => s.parse().ok(),
            ContextValue::Bool(_) => None,
        }
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Number(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Str(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Str(value)
    }
}

/// Answers named lookups for `when` expressions
pub trait ContextLookup {
    fn get(&self, key: &str) -> Option<ContextValue>;
}

/// Plain map of context keys, the usual way a host hands context to the engine
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ContextSnapshot {
    values: HashMap<String, ContextValue>,
}

impl ContextSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<ContextValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<ContextValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Overlay another snapshot's keys onto this one
    pub fn merge(&mut self, other: ContextSnapshot) {
        self.values.extend(other.values);
    }
}

impl ContextLookup for ContextSnapshot {
    fn get(&self, key: &str) -> Option<ContextValue> {
        self.values.get(key).cloned()
    }
}

/// Comparison operators usable after a context key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Parsed `when` expression
#[derive(Debug, Clone, PartialEq)]
pub enum WhenExpr {
    True,
    False,
    /// Bare key: true when the key is present and truthy
    Has(String),
    Compare {
        key: String,
        op: CompareOp,
        value: String,
    },
    Not(Box<WhenExpr>),
    And(Vec<WhenExpr>),
    Or(Vec<WhenExpr>),
}

impl WhenExpr {
    /// Parse an expression string
    pub fn parse(input: &str) -> Result<WhenExpr, KeymapError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            source: input,
        };
        let expr = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Parse a list of expressions that must all hold
    pub fn parse_all<S: AsRef<str>>(items: &[S]) -> Result<WhenExpr, KeymapError> {
        let exprs = items
            .iter()
            .map(|s| WhenExpr::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match exprs.len() {
            0 => WhenExpr::True,
            1 => exprs.into_iter().next().unwrap_or(WhenExpr::True),
            _ => WhenExpr::And(exprs),
        })
    }

    /// Evaluate this expression against the current context
    pub fn evaluate(&self, ctx: &dyn ContextLookup) -> bool {
        match self {
            WhenExpr::True => true,
            WhenExpr::False => false,
            WhenExpr::Has(key) => ctx.get(key).is_some_and(|v| v.is_truthy()),
            WhenExpr::Compare { key, op, value } => compare(ctx.get(key), *op, value),
            WhenExpr::Not(inner) => !inner.evaluate(ctx),
            WhenExpr::And(items) => items.iter().all(|e| e.evaluate(ctx)),
            WhenExpr::Or(items) => items.iter().any(|e| e.evaluate(ctx)),
        }
    }
}

fn compare(actual: Option<ContextValue>, op: CompareOp, literal: &str) -> bool {
    match op {
        CompareOp::Eq => values_equal(actual.as_ref(), literal),
        CompareOp::Ne => !values_equal(actual.as_ref(), literal),
        _ => {
            let (Some(lhs), Ok(rhs)) = (actual.and_then(|v| v.as_number()), literal.parse::<f64>())
            else {
                return false;
            };
            match op {
                CompareOp::Lt => lhs < rhs,
                CompareOp::Le => lhs <= rhs,
                CompareOp::Gt => lhs > rhs,
                CompareOp::Ge => lhs >= rhs,
                CompareOp::Eq | CompareOp::Ne => false,
            }
        }
    }
}

fn values_equal(actual: Option<&ContextValue>, literal: &str) -> bool {
    match actual {
        None => false,
        Some(ContextValue::Bool(b)) => match literal {
            "true" => *b,
            "false" => !*b,
            _ => false,
        },
        Some(ContextValue::Number(n)) => literal.parse::<f64>().is_ok_and(|l| l == *n),
        Some(ContextValue::Str(s)) => s == literal,
    }
}

impl fmt::Display for WhenExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhenExpr::True => write!(f, "true"),
            WhenExpr::False => write!(f, "false"),
            WhenExpr::Has(key) => write!(f, "{}", key),
            WhenExpr::Compare { key, op, value } => {
                if value.parse::<f64>().is_ok() || value == "true" || value == "false" {
                    write!(f, "{} {} {}", key, op.as_str(), value)
                } else {
                    write!(f, "{} {} '{}'", key, op.as_str(), value)
                }
            }
            WhenExpr::Not(inner) => match inner.as_ref() {
                WhenExpr::And(_) | WhenExpr::Or(_) | WhenExpr::Compare { .. } => {
                    write!(f, "!({})", inner)
                }
                _ => write!(f, "!{}", inner),
            },
            WhenExpr::And(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|e| match e {
                        WhenExpr::Or(_) => format!("({})", e),
                        _ => e.to_string(),
                    })
                    .collect();
                write!(f, "{}", parts.join(" && "))
            }
            WhenExpr::Or(items) => {
                let parts: Vec<String> = items.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", parts.join(" || "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(String),
    And,
    Or,
    Not,
    Op(CompareOp),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, KeymapError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '&' if next == Some('&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '=' if next == Some('=') => {
                tokens.push(Token::Op(CompareOp::Eq));
                i += 2;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Op(CompareOp::Ne));
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '<' | '>' => {
                let op = match (c, next == Some('=')) {
                    ('<', true) => CompareOp::Le,
                    ('<', false) => CompareOp::Lt,
                    (_, true) => CompareOp::Ge,
                    (_, false) => CompareOp::Gt,
                };
                tokens.push(Token::Op(op));
                i += if next == Some('=') { 2 } else { 1 };
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == quote)
                    .map(|p| start + p)
                    .ok_or_else(|| {
                        KeymapError::InvalidCondition(format!("unterminated string in '{}'", input))
                    })?;
                tokens.push(Token::Literal(chars[start..end].iter().collect()));
                i = end + 1;
            }
            c if is_ident_char(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(KeymapError::InvalidCondition(format!(
                    "unexpected '{}' in '{}'",
                    other, input
                )))
            }
        }
    }

    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | ':' | '/')
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, what: &str) -> KeymapError {
        KeymapError::InvalidCondition(format!("{} in '{}'", what, self.source))
    }

    fn parse_or(&mut self) -> Result<WhenExpr, KeymapError> {
        let mut items = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            items.push(self.parse_and()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            WhenExpr::Or(items)
        })
    }

    fn parse_and(&mut self) -> Result<WhenExpr, KeymapError> {
        let mut items = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            items.push(self.parse_unary()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            WhenExpr::And(items)
        })
    }

    fn parse_unary(&mut self) -> Result<WhenExpr, KeymapError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(WhenExpr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<WhenExpr, KeymapError> {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.error("missing ')'")),
                }
            }
            Some(Token::Ident(word)) if word == "true" => Ok(WhenExpr::True),
            Some(Token::Ident(word)) if word == "false" => Ok(WhenExpr::False),
            Some(Token::Ident(key)) => {
                let Some(Token::Op(op)) = self.peek().cloned() else {
                    return Ok(WhenExpr::Has(key));
                };
                self.pos += 1;
                match self.advance() {
                    Some(Token::Ident(value)) | Some(Token::Literal(value)) => {
                        Ok(WhenExpr::Compare { key, op, value })
                    }
                    _ => Err(self.error("expected a value after comparison")),
                }
            }
            Some(_) => Err(self.error("unexpected token")),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}
