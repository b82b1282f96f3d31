//! API to control the interpreter.

use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ctx::Context;
use crate::diag::Diagnostic;
use crate::eval::{Evaluator, RuntimeError};
use crate::parser::Parser;

/// Tree-walk interpreter.
///
/// Global state persists across [`Interpreter::run`] calls, so a session
/// can be built up fragment by fragment (this is what the REPL does):
///
/// ```
/// # use jlox::interpreter::{Interpreter, LoxError};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// interp.run("var greeting = \"hello\";")?;
/// interp.run("print greeting + \", world\";")?;
///
/// assert_eq!(output, b"hello, world\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    evaluator: Evaluator<'t, W>,
}

/// Errors the interpreter can raise.
///
/// `Display` renders the diagnostics the way the driver is expected to show
/// them on the error stream.
#[derive(Debug)]
pub enum LoxError {
    /// One or more lexical or syntactic errors; evaluation was not
    /// attempted.
    Syntax(Vec<Diagnostic>),

    /// Error occurring during evaluation.
    Runtime(RuntimeError),
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxError::Syntax(diags) => {
                let mut sep = "";
                for d in diags {
                    write!(f, "{}{}", sep, d)?;
                    sep = "\n";
                }
                Ok(())
            }
            LoxError::Runtime(e) => write!(f, "{}", e),
        }
    }
}

impl Error for LoxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoxError::Syntax(_) => None,
            LoxError::Runtime(e) => Some(e),
        }
    }
}

impl From<Vec<Diagnostic>> for LoxError {
    fn from(diags: Vec<Diagnostic>) -> LoxError {
        LoxError::Syntax(diags)
    }
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> LoxError {
        LoxError::Runtime(e)
    }
}

impl<W: Write> Interpreter<'_, W> {
    pub fn new(output: &mut W) -> Interpreter<'_, W> {
        Interpreter {
            ctx: Context::new(),
            evaluator: Evaluator::new(output),
        }
    }

    /// Runs `source` as a program fragment.
    ///
    /// Evaluation only starts when scanning and parsing reported no
    /// diagnostic, so a broken program has no partial side effects.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let mut parser = Parser::new(source, self.ctx.clone());
        let prg = parser.parse_program()?;
        self.evaluator.eval_program(&prg)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(input: &str) -> Result<String, LoxError> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        interp.run(input)?;
        let output = String::from_utf8(raw_output).expect("cannot convert output to string");
        Ok(output)
    }

    #[test]
    fn print_expr() -> Result<(), LoxError> {
        assert_eq!(interpret("print 3*2;")?, "6\n");
        Ok(())
    }

    #[test]
    fn grouped_arithmetic_and_equality() -> Result<(), LoxError> {
        assert_eq!(interpret("print (1 + 2) * 3 == 9;")?, "true\n");
        Ok(())
    }

    #[test]
    fn string_concatenation() -> Result<(), LoxError> {
        assert_eq!(interpret("print \"foo\" + \"bar\";")?, "foobar\n");
        Ok(())
    }

    #[test]
    fn uninitialized_var_is_nil() -> Result<(), LoxError> {
        assert_eq!(interpret("var x; print x;")?, "nil\n");
        Ok(())
    }

    #[test]
    fn init_set_get_var() -> Result<(), LoxError> {
        assert_eq!(interpret("var foo=42; foo=24; print foo;")?, "24\n");
        Ok(())
    }

    #[test]
    fn block_with_shadowed_var() -> Result<(), LoxError> {
        assert_eq!(
            interpret("var a = \"first\"; print a; { var a = \"second\"; print a; } print a;")?,
            "first\nsecond\nfirst\n"
        );
        Ok(())
    }

    #[test]
    fn block_accessing_var_in_parent_scope() -> Result<(), LoxError> {
        assert_eq!(interpret("var foo=42; { print foo; } ")?, "42\n");
        Ok(())
    }

    #[test]
    fn inc_var_declared_in_outer_block() -> Result<(), LoxError> {
        assert_eq!(
            interpret("var foo = 2; { foo = foo + 1; } print foo; ")?,
            "3\n"
        );
        Ok(())
    }

    #[test]
    fn assignment_in_inner_block_mutates_the_outer_binding() -> Result<(), LoxError> {
        assert_eq!(
            interpret("{ var a = \"outer\"; { a = \"modified\"; } print a; }")?,
            "modified\n"
        );
        Ok(())
    }

    #[test]
    fn var_from_parent_scope_shadowed_and_reset() -> Result<(), LoxError> {
        assert_eq!(
            interpret("var foo=42; { var foo = 1; foo = 1 + foo; print foo; } print foo;")?,
            "2\n42\n"
        );
        Ok(())
    }

    #[test]
    fn adding_a_string_and_a_number_fails() {
        match interpret("print \"a\" + 1;") {
            Err(e @ LoxError::Runtime(_)) => assert_eq!(
                e.to_string(),
                "Operands must be two numbers or two strings.\n[line 1]"
            ),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn runtime_errors_name_the_offending_line() {
        match interpret("var a;\na + 1;") {
            Err(e @ LoxError::Runtime(_)) => {
                assert_eq!(e.to_string(), "Operands must be numbers.\n[line 2]")
            }
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn missing_expression_is_a_syntax_error() {
        match interpret("1 + ;") {
            Err(e @ LoxError::Syntax(_)) => {
                assert_eq!(e.to_string(), "[line 1] Error at ';': Expect expression.")
            }
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn all_syntax_errors_are_rendered() {
        match interpret("1 + ;\nvar = 2;") {
            Err(e @ LoxError::Syntax(_)) => assert_eq!(
                e.to_string(),
                "[line 1] Error at ';': Expect expression.\n\
                 [line 2] Error at '=': Expect variable name."
            ),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn parse_errors_suppress_evaluation() {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        assert!(interp.run("print 1; 1 + ;").is_err());
        assert!(raw_output.is_empty());
    }

    #[test]
    fn runtime_error_halts_the_program_but_keeps_prior_output() {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        let err = interp.run("print 1; print -\"x\"; print 2;").unwrap_err();
        assert_eq!(err.to_string(), "Operand must be a number.\n[line 1]");
        assert_eq!(raw_output, b"1\n");
    }

    #[test]
    fn state_persists_across_fragments() -> Result<(), LoxError> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        interp.run("var counter = 1;")?;
        interp.run("counter = counter + 1;")?;
        interp.run("print counter;")?;
        assert_eq!(raw_output, b"2\n");
        Ok(())
    }

    #[test]
    fn a_failed_fragment_does_not_poison_the_session() {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        assert!(interp.run("var a = ;").is_err());
        interp.run("var a = 1; print a;").expect("clean fragment failed");
        assert!(interp.run("print nothing;").is_err());
        interp.run("print a;").expect("session state was lost");
        assert_eq!(raw_output, b"1\n1\n");
    }
}
