//! Recursive-descent parser with panic-mode recovery.

use std::mem;
use std::rc::Rc;

use crate::ast::{Expr, Stmt};
use crate::ctx::Context;
use crate::diag::{Diagnostic, Position};
use crate::scanner::Scanner;
use crate::token::Token;

/// Turns the scanner's token stream into a list of statements.
///
/// The parser looks one token ahead and pulls straight from the scanner.
/// Errors do not stop it: each diagnostic is recorded, the token stream is
/// resynchronized at the next statement boundary and parsing resumes, so a
/// single run can report many errors.
pub struct Parser<'s> {
    scanner: Scanner<'s>,
    current: Token,
    current_pos: Position,
    previous: Token,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str, ctx: Rc<Context>) -> Parser<'s> {
        let mut parser = Parser {
            scanner: Scanner::new(source, ctx),
            current: Token::Eof, // we haven't scanned anything yet
            current_pos: 1,
            previous: Token::Eof,
            diagnostics: vec![],
        };
        parser.advance();
        parser
    }

    /// Parses a whole program.
    ///
    /// Returns the statement list only when no diagnostic was reported.
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, Vec<Diagnostic>> {
        let mut prg = vec![];
        while self.current != Token::Eof {
            if let Some(stmt) = self.declaration() {
                prg.push(stmt);
            }
        }
        if self.diagnostics.is_empty() {
            Ok(prg)
        } else {
            Err(mem::take(&mut self.diagnostics))
        }
    }

    /// Parses a single expression.
    #[allow(dead_code)]
    pub fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        self.expression()
    }

    /// Parses one declaration, absorbing any syntax error so the caller can
    /// carry on with the next statement.
    fn declaration(&mut self) -> Option<Stmt> {
        let result = match self.current {
            Token::Var => self.var_decl(),
            _ => self.statement(),
        };
        match result {
            Ok(stmt) => Some(stmt),
            Err(d) => {
                self.diagnostics.push(d);
                self.synchronize();
                None
            }
        }
    }

    /// Parses a variable declaration.
    /// Current token is `var`.
    fn var_decl(&mut self) -> Result<Stmt, Diagnostic> {
        self.advance();
        let name = match self.current.clone() {
            Token::Identifier(sym) => {
                self.advance();
                sym
            }
            _ => return Err(self.error_at_current("Expect variable name.")),
        };
        let init = match self.current {
            Token::Equal => {
                self.advance();
                self.expression()?
            }
            _ => Expr::Nil,
        };
        self.consume(Token::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::VarDecl(name, Box::new(init)))
    }

    fn statement(&mut self) -> Result<Stmt, Diagnostic> {
        match self.current {
            Token::Print => {
                let pos = self.current_pos;
                self.advance();
                let expr = Box::new(self.expression()?);
                self.consume(Token::Semicolon, "Expect ';' after value.")?;
                Ok(Stmt::Print(pos, expr))
            }
            Token::LeftBrace => self.block(),
            _ => {
                let expr = Box::new(self.expression()?);
                self.consume(Token::Semicolon, "Expect ';' after expression.")?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    /// Parses a block.
    /// Current token is `{`.
    fn block(&mut self) -> Result<Stmt, Diagnostic> {
        self.advance();
        let mut stmts = vec![];
        loop {
            match self.current {
                Token::RightBrace => {
                    self.advance();
                    break;
                }
                Token::Eof => {
                    return Err(self.error_at_current("Expect '}' after block."));
                }
                _ => {
                    if let Some(stmt) = self.declaration() {
                        stmts.push(stmt);
                    }
                }
            }
        }
        Ok(Stmt::Block(stmts))
    }

    fn expression(&mut self) -> Result<Expr, Diagnostic> {
        self.assignment()
    }

    /// Assignment is right-associative.  The left side is parsed as an
    /// ordinary expression and reinterpreted as a target when an `=`
    /// follows; a left side that is not a plain variable is reported at the
    /// `=` but keeps the already-built expression, so parsing continues.
    fn assignment(&mut self) -> Result<Expr, Diagnostic> {
        let lhs = self.equality()?;
        if self.current != Token::Equal {
            return Ok(lhs);
        }
        let equals_pos = self.current_pos;
        self.advance();
        let rhs = self.assignment()?;
        match lhs {
            Expr::Var(pos, sym) => Ok(Expr::Assign(pos, sym, Box::new(rhs))),
            lhs => {
                self.diagnostics.push(Diagnostic::at_token(
                    equals_pos,
                    &Token::Equal,
                    "Invalid assignment target.",
                ));
                Ok(lhs)
            }
        }
    }

    fn equality(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.comparison()?;
        loop {
            match self.current {
                Token::EqualEqual => {
                    self.advance();
                    expr = Expr::Equal(Box::new(expr), Box::new(self.comparison()?));
                }
                Token::BangEqual => {
                    self.advance();
                    expr = Expr::NotEqual(Box::new(expr), Box::new(self.comparison()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.term()?;
        loop {
            let pos = self.current_pos;
            match self.current {
                Token::Less => {
                    self.advance();
                    expr = Expr::Less(pos, Box::new(expr), Box::new(self.term()?));
                }
                Token::LessEqual => {
                    self.advance();
                    expr = Expr::LessEqual(pos, Box::new(expr), Box::new(self.term()?));
                }
                Token::Greater => {
                    self.advance();
                    expr = Expr::Greater(pos, Box::new(expr), Box::new(self.term()?));
                }
                Token::GreaterEqual => {
                    self.advance();
                    expr = Expr::GreaterEqual(pos, Box::new(expr), Box::new(self.term()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.factor()?;
        loop {
            let pos = self.current_pos;
            match self.current {
                Token::Plus => {
                    self.advance();
                    expr = Expr::Add(pos, Box::new(expr), Box::new(self.factor()?));
                }
                Token::Minus => {
                    self.advance();
                    expr = Expr::Sub(pos, Box::new(expr), Box::new(self.factor()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.unary()?;
        loop {
            let pos = self.current_pos;
            match self.current {
                Token::Star => {
                    self.advance();
                    expr = Expr::Mul(pos, Box::new(expr), Box::new(self.unary()?));
                }
                Token::Slash => {
                    self.advance();
                    expr = Expr::Div(pos, Box::new(expr), Box::new(self.unary()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, Diagnostic> {
        match self.current {
            Token::Minus => {
                let pos = self.current_pos;
                self.advance();
                Ok(Expr::UnaryMinus(pos, Box::new(self.unary()?)))
            }
            Token::Bang => {
                self.advance();
                Ok(Expr::Not(Box::new(self.unary()?)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, Diagnostic> {
        match self.current.clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            Token::Nil => {
                self.advance();
                Ok(Expr::Nil)
            }
            Token::Identifier(sym) => {
                let expr = Expr::Var(self.current_pos, sym);
                self.advance();
                Ok(expr)
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(Token::RightParen, "Expect ')' after expression.")?;
                Ok(Expr::Group(Box::new(expr)))
            }
            _ => Err(self.error_at_current("Expect expression.")),
        }
    }

    /// Makes the next token current.  Lexical errors are recorded and the
    /// offending characters skipped, so the token stream never runs dry
    /// before `Eof`.
    fn advance(&mut self) {
        loop {
            match self.scanner.get_token() {
                Ok((pos, token)) => {
                    self.previous = mem::replace(&mut self.current, token);
                    self.current_pos = pos;
                    return;
                }
                Err(d) => self.diagnostics.push(d),
            }
        }
    }

    fn consume(&mut self, expected: Token, message: &str) -> Result<(), Diagnostic> {
        if self.current == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn error_at_current(&self, message: &str) -> Diagnostic {
        Diagnostic::at_token(self.current_pos, &self.current, message)
    }

    /// Panic-mode recovery: discard tokens until just past a statement
    /// boundary, so the caller can resume with the next declaration.
    fn synchronize(&mut self) {
        self.advance();
        while self.current != Token::Eof {
            if self.previous == Token::Semicolon {
                return;
            }
            match self.current {
                Token::Class
                | Token::Fun
                | Token::Var
                | Token::For
                | Token::If
                | Token::While
                | Token::Print
                | Token::Return => return,
                _ => self.advance(),
            }
        }
    }
}
