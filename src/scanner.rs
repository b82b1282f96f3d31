//! Lexical analyzer

use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;

use crate::ctx::Context;
use crate::diag::{Diagnostic, Position};
use crate::token::Token;

/// Turns source text into a sequence of tokens.
///
/// Tokens are pulled one at a time with [`Scanner::get_token`]; once input
/// is exhausted every further pull yields [`Token::Eof`]. Lexical errors are
/// returned as diagnostics and leave the scanner in a usable state, so the
/// caller can keep pulling.
pub struct Scanner<'s> {
    input: Peekable<Chars<'s>>,
    line: Position,
    ctx: Rc<Context>,

    // Buffer used when scanning longer tokens.  Allocated here to reuse memory.
    buf: String,
}

impl<'s> Scanner<'s> {
    /// Creates a new scanner operating on `source`.
    pub fn new(source: &'s str, ctx: Rc<Context>) -> Scanner<'s> {
        Scanner {
            input: source.chars().peekable(),
            line: 1,
            ctx,
            buf: String::new(),
        }
    }

    /// Scans the next token and returns it together with the line of its
    /// first character.
    pub fn get_token(&mut self) -> Result<(Position, Token), Diagnostic> {
        loop {
            let pos = self.line;
            let token = match self.input.next() {
                None => Token::Eof,
                Some(ch) => match ch {
                    '\n' => {
                        self.line += 1;
                        continue;
                    }
                    ' ' | '\t' | '\r' => continue,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    '{' => Token::LeftBrace,
                    '}' => Token::RightBrace,
                    ',' => Token::Comma,
                    '.' => Token::Dot,
                    ';' => Token::Semicolon,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => {
                        if self.input.peek() == Some(&'/') {
                            self.skip_comment();
                            continue;
                        }
                        Token::Slash
                    }
                    '!' => self.one_or_two('=', Token::BangEqual, Token::Bang),
                    '=' => self.one_or_two('=', Token::EqualEqual, Token::Equal),
                    '<' => self.one_or_two('=', Token::LessEqual, Token::Less),
                    '>' => self.one_or_two('=', Token::GreaterEqual, Token::Greater),
                    '"' => self.scan_string()?,
                    '0'..='9' => self.scan_number(ch)?,
                    'a'..='z' | 'A'..='Z' | '_' => self.scan_identifier(ch),
                    _ => {
                        return Err(Diagnostic::lexical(
                            pos,
                            format!("Unexpected character '{}'.", ch),
                        ));
                    }
                },
            };
            return Ok((pos, token));
        }
    }

    /// Emits `compound` when the next character is `next`, `single` otherwise.
    fn one_or_two(&mut self, next: char, compound: Token, single: Token) -> Token {
        if self.input.peek() == Some(&next) {
            self.input.next();
            compound
        } else {
            single
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.input.peek() {
            if *ch == '\n' {
                break;
            }
            self.input.next();
        }
    }

    /// Scans a string literal.  The opening quote has been consumed; the
    /// token's literal is the content between the quotes.
    fn scan_string(&mut self) -> Result<Token, Diagnostic> {
        self.buf.clear();
        loop {
            match self.input.next() {
                None => return Err(Diagnostic::lexical(self.line, "Unterminated string.")),
                Some('"') => return Ok(Token::Str(self.buf.clone())),
                Some(ch) => {
                    if ch == '\n' {
                        self.line += 1;
                    }
                    self.buf.push(ch);
                }
            }
        }
    }

    fn scan_number(&mut self, first_digit: char) -> Result<Token, Diagnostic> {
        self.buf.clear();
        self.buf.push(first_digit);
        while let Some(ch) = self.input.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            self.buf.push(*ch);
            self.input.next();
        }

        // Consume a '.' only when a digit follows, so `1.foo` scans as a
        // number, a dot and an identifier.
        if self.input.peek() == Some(&'.') {
            let mut ahead = self.input.clone();
            ahead.next();
            if ahead.next().map_or(false, |ch| ch.is_ascii_digit()) {
                self.buf.push('.');
                self.input.next();
                while let Some(ch) = self.input.peek() {
                    if !ch.is_ascii_digit() {
                        break;
                    }
                    self.buf.push(*ch);
                    self.input.next();
                }
            }
        }

        let n = self.buf.parse::<f64>().map_err(|_| {
            Diagnostic::lexical(self.line, format!("Invalid number literal '{}'.", self.buf))
        })?;
        Ok(Token::Number(n))
    }

    fn scan_identifier(&mut self, first_char: char) -> Token {
        self.buf.clear();
        self.buf.push(first_char);
        while let Some(ch) = self.input.peek() {
            if !(ch.is_ascii_alphanumeric() || *ch == '_') {
                break;
            }
            self.buf.push(*ch);
            self.input.next();
        }

        let sym = self.ctx.symbol(&self.buf);
        if let Some(token) = self.ctx.keyword(&sym) {
            token
        } else {
            Token::Identifier(sym)
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.get_token() {
            Ok((_, Token::Eof)) => None,
            Ok((_, t)) => Some(Ok(t)),
            Err(e) => Some(Err(e)),
        }
    }
}
