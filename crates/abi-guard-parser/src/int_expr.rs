//! A small recursive-descent evaluator for the C integer constant
//! expressions that appear as enumerator initializers (`FOO = 1 << 3`).
//!
//! Deliberately narrow: only the operators C enumerators actually use
//! (unary +/-/~, the arithmetic/shift/bitwise binary operators, and
//! parenthesization) are supported. Anything else yields `None`, matching
//! the "couldn't evaluate, leave `value` as null" behavior the rest of the
//! enum extractor expects. `/` and `//` are both accepted and both floor
//! toward negative infinity, and `%`'s sign follows the divisor, matching
//! Python's integer semantics rather than Rust's default truncating ones.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexical::normalize_ws;

static INT_SUFFIX_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(0[xX][0-9A-Fa-f]+)([uUlL]+)\b").unwrap());
static INT_SUFFIX_DEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([0-9]+)([uUlL]+)\b").unwrap());

#[must_use]
pub fn sanitize_c_int_expr(expr: &str) -> String {
    let compact = normalize_ws(expr);
    let compact = INT_SUFFIX_HEX.replace_all(&compact, "$1").to_string();
    INT_SUFFIX_DEC.replace_all(&compact, "$1").to_string()
}

struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Plus,
    Minus,
    Tilde,
    Star,
    Slash,
    Percent,
    Shl,
    Shr,
    Pipe,
    Amp,
    Caret,
    LParen,
    RParen,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            src,
        }
    }

    fn tokenize(mut self) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(&(idx, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
                continue;
            }
            match ch {
                '+' => {
                    self.chars.next();
                    tokens.push(Token::Plus);
                }
                '-' => {
                    self.chars.next();
                    tokens.push(Token::Minus);
                }
                '~' => {
                    self.chars.next();
                    tokens.push(Token::Tilde);
                }
                '*' => {
                    self.chars.next();
                    tokens.push(Token::Star);
                }
                '/' => {
                    self.chars.next();
                    if self.chars.peek().map(|(_, c)| *c) == Some('/') {
                        self.chars.next();
                    }
                    tokens.push(Token::Slash);
                }
                '%' => {
                    self.chars.next();
                    tokens.push(Token::Percent);
                }
                '|' => {
                    self.chars.next();
                    tokens.push(Token::Pipe);
                }
                '&' => {
                    self.chars.next();
                    tokens.push(Token::Amp);
                }
                '^' => {
                    self.chars.next();
                    tokens.push(Token::Caret);
                }
                '(' => {
                    self.chars.next();
                    tokens.push(Token::LParen);
                }
                ')' => {
                    self.chars.next();
                    tokens.push(Token::RParen);
                }
                '<' => {
                    self.chars.next();
                    if self.chars.peek().map(|(_, c)| *c) == Some('<') {
                        self.chars.next();
                        tokens.push(Token::Shl);
                    } else {
                        return None;
                    }
                }
                '>' => {
                    self.chars.next();
                    if self.chars.peek().map(|(_, c)| *c) == Some('>') {
                        self.chars.next();
                        tokens.push(Token::Shr);
                    } else {
                        return None;
                    }
                }
                c if c.is_ascii_digit() => {
                    let start = idx;
                    let mut end = idx + c.len_utf8();
                    self.chars.next();
                    let is_hex = c == '0'
                        && self.chars.peek().map(|(_, c)| c.to_ascii_lowercase()) == Some('x');
                    if is_hex {
                        let (_, xc) = self.chars.next().unwrap();
                        end += xc.len_utf8();
                        while let Some(&(i, c)) = self.chars.peek() {
                            if c.is_ascii_hexdigit() {
                                end = i + c.len_utf8();
                                self.chars.next();
                            } else {
                                break;
                            }
                        }
                        let value = i64::from_str_radix(&self.src[start + 2..end], 16).ok()?;
                        tokens.push(Token::Int(value));
                    } else {
                        while let Some(&(i, c)) = self.chars.peek() {
                            if c.is_ascii_digit() {
                                end = i + c.len_utf8();
                                self.chars.next();
                            } else {
                                break;
                            }
                        }
                        let value = self.src[start..end].parse::<i64>().ok()?;
                        tokens.push(Token::Int(value));
                    }
                }
                _ => return None,
            }
        }
        Some(tokens)
    }
}

/// Python-style floor division: rounds toward negative infinity, not zero.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Python-style modulo: the result's sign follows the divisor.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    /// expr := bitor
    fn parse_expr(&mut self) -> Option<i64> {
        self.parse_bitor()
    }

    fn parse_bitor(&mut self) -> Option<i64> {
        let mut left = self.parse_bitxor()?;
        while matches!(self.peek(), Some(Token::Pipe)) {
            self.next();
            let right = self.parse_bitxor()?;
            left |= right;
        }
        Some(left)
    }

    fn parse_bitxor(&mut self) -> Option<i64> {
        let mut left = self.parse_bitand()?;
        while matches!(self.peek(), Some(Token::Caret)) {
            self.next();
            let right = self.parse_bitand()?;
            left ^= right;
        }
        Some(left)
    }

    fn parse_bitand(&mut self) -> Option<i64> {
        let mut left = self.parse_shift()?;
        while matches!(self.peek(), Some(Token::Amp)) {
            self.next();
            let right = self.parse_shift()?;
            left &= right;
        }
        Some(left)
    }

    fn parse_shift(&mut self) -> Option<i64> {
        let mut left = self.parse_additive()?;
        loop {
            match self.peek() {
                Some(Token::Shl) => {
                    self.next();
                    left <<= self.parse_additive()?;
                }
                Some(Token::Shr) => {
                    self.next();
                    left >>= self.parse_additive()?;
                }
                _ => break,
            }
        }
        Some(left)
    }

    fn parse_additive(&mut self) -> Option<i64> {
        let mut left = self.parse_multiplicative()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    left += self.parse_multiplicative()?;
                }
                Some(Token::Minus) => {
                    self.next();
                    left -= self.parse_multiplicative()?;
                }
                _ => break,
            }
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<i64> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    left *= self.parse_unary()?;
                }
                Some(Token::Slash) => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    if rhs == 0 {
                        return None;
                    }
                    left = floor_div(left, rhs);
                }
                Some(Token::Percent) => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    if rhs == 0 {
                        return None;
                    }
                    left = floor_mod(left, rhs);
                }
                _ => break,
            }
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<i64> {
        match self.peek() {
            Some(Token::Plus) => {
                self.next();
                self.parse_unary()
            }
            Some(Token::Minus) => {
                self.next();
                Some(-self.parse_unary()?)
            }
            Some(Token::Tilde) => {
                self.next();
                Some(!self.parse_unary()?)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Option<i64> {
        match self.next()? {
            Token::Int(value) => Some(value),
            Token::LParen => {
                let value = self.parse_expr()?;
                match self.next() {
                    Some(Token::RParen) => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Evaluate a C integer constant expression, returning `None` if it uses
/// anything outside the supported operator set or doesn't parse cleanly.
#[must_use]
pub fn eval_c_int_expr(expr: &str) -> Option<i64> {
    let sanitized = sanitize_c_int_expr(expr);
    let tokens = Tokenizer::new(&sanitized).tokenize()?;
    if tokens.is_empty() {
        return None;
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return None;
    }
    Some(value)
}
