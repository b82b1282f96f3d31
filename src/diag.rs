//! Source positions and compile-time diagnostics.
//!
//! The scanner and the parser both report through [`Diagnostic`]; a single
//! run can accumulate many of them before the driver gives up on the
//! program.

use std::fmt;

use thiserror::Error;

use crate::token::Token;

/// Line number (starting at one).
pub type Position = u32;

/// Where in its line a diagnostic points.
#[derive(Debug, PartialEq, Clone)]
pub enum Locus {
    /// Lexical errors point at the line as a whole.
    Line,
    /// Syntactic errors point at the offending token's lexeme.
    Token(String),
    /// Syntactic errors raised once input is exhausted.
    Eof,
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locus::Line => Ok(()),
            Locus::Token(lexeme) => write!(f, " at '{}'", lexeme),
            Locus::Eof => write!(f, " at end"),
        }
    }
}

/// A single lexical or syntactic error.
#[derive(Debug, PartialEq, Clone, Error)]
#[error("[line {pos}] Error{locus}: {message}")]
pub struct Diagnostic {
    pub pos: Position,
    pub locus: Locus,
    pub message: String,
}

impl Diagnostic {
    /// A lexical error, attributed to its line only.
    pub fn lexical(pos: Position, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            pos,
            locus: Locus::Line,
            message: message.into(),
        }
    }

    /// A syntactic error, attributed to the token the parser was looking at.
    pub fn at_token(pos: Position, token: &Token, message: impl Into<String>) -> Diagnostic {
        let locus = match token {
            Token::Eof => Locus::Eof,
            _ => Locus::Token(token.to_string()),
        };
        Diagnostic {
            pos,
            locus,
            message: message.into(),
        }
    }
}
