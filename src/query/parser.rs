//! Boolean query parser.
//!
//! Queries are built from words, the case-sensitive keywords `AND` and
//! `OR`, and parentheses; `AND` binds tighter than `OR`:
//!
//! ```text
//! expr   := term (OR term)*
//! term   := factor (AND factor)*
//! factor := WORD | '(' expr ')'
//! ```
//!
//! Words are lowercased alphabetic runs, so `and`/`or` in lowercase are
//! ordinary search terms. Any character that is not whitespace,
//! alphabetic, or a parenthesis is a lex error.

use std::collections::HashMap;

use crate::error::{LancetError, Result};

/// A parsed boolean query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A single lowercased search term.
    Term(String),
    /// Both sides must match; scores multiply.
    And(Box<Expr>, Box<Expr>),
    /// Either side may match; scores add.
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Collect leaf term texts left to right, duplicates preserved.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms = Vec::new();
        self.collect_terms(&mut terms);
        terms
    }

    fn collect_terms<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Term(term) => out.push(term),
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_terms(out);
                right.collect_terms(out);
            }
        }
    }

    /// Fold the tree bottom-up against per-term scores for one
    /// candidate document. A term absent from `scores` contributes 0.0,
    /// so an AND with a non-matching side scores zero for the whole
    /// conjunction.
    pub fn score(&self, scores: &HashMap<String, f64>) -> f64 {
        match self {
            Expr::Term(term) => scores.get(term).copied().unwrap_or(0.0),
            Expr::And(left, right) => left.score(scores) * right.score(scores),
            Expr::Or(left, right) => left.score(scores) + right.score(scores),
        }
    }
}

/// Parse a query string into an expression tree.
pub fn parse_query(input: &str) -> Result<Expr> {
    let mut parser = Parser::new(input)?;
    let expr = parser.expr()?;
    if parser.current != Token::End {
        return Err(LancetError::query(
            "Unexpected input after end of query expression",
        ));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    And,
    Or,
    OpenParen,
    CloseParen,
    End,
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if self.pos >= self.bytes.len() {
            return Ok(Token::End);
        }

        let byte = self.bytes[self.pos];
        if byte.is_ascii_alphabetic() {
            let start = self.pos;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_alphabetic() {
                self.pos += 1;
            }
            let word = &self.bytes[start..self.pos];
            return Ok(match word {
                b"AND" => Token::And,
                b"OR" => Token::Or,
                _ => Token::Word(String::from_utf8_lossy(word).to_lowercase()),
            });
        }

        self.pos += 1;
        match byte {
            b'(' => Ok(Token::OpenParen),
            b')' => Ok(Token::CloseParen),
            _ => Err(LancetError::query(format!(
                "Unexpected character '{}' in query",
                byte as char
            ))),
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut node = self.term()?;
        while self.current == Token::Or {
            self.advance()?;
            let right = self.term()?;
            node = Expr::Or(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut node = self.factor()?;
        while self.current == Token::And {
            self.advance()?;
            let right = self.factor()?;
            node = Expr::And(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<Expr> {
        match self.current.clone() {
            Token::Word(word) => {
                self.advance()?;
                Ok(Expr::Term(word))
            }
            Token::OpenParen => {
                self.advance()?;
                let inner = self.expr()?;
                if self.current != Token::CloseParen {
                    return Err(LancetError::query("Expected ')' in query"));
                }
                self.advance()?;
                Ok(inner)
            }
            _ => Err(LancetError::query("Expected a term or '(' in query")),
        }
    }
}
