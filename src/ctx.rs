//! Identifier interning and the reserved-word table.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::token::Token;

/// An immutable identifier string that is guaranteed to be unique and so can
/// be compared by address rather than content.
#[derive(Debug, Hash, Clone)]
pub struct Symbol(Rc<String>);

impl Symbol {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

/// Mostly read-only state shared across one interpreter session: the symbol
/// table and the mapping from reserved words to their tokens.
///
/// Every identifier flowing through the pipeline is interned here, so the
/// scanner, the parser and the evaluator must share one context.
#[derive(Debug)]
pub struct Context {
    symbols: RefCell<HashSet<Symbol>>,
    keywords: HashMap<Symbol, Token>,
}

impl Context {
    /// Creates a new context with the reserved words pre-interned.
    ///
    /// Returns an Rc because the context is shared between various data
    /// structures.
    pub fn new() -> Rc<Self> {
        let mut symbols = HashSet::new();
        let mut keywords = HashMap::new();
        for (name, token) in KEYWORDS.iter().cloned() {
            let sym = Symbol(Rc::new(name.to_string()));
            symbols.insert(sym.clone());
            keywords.insert(sym, token);
        }

        Rc::new(Context {
            symbols: RefCell::new(symbols),
            keywords,
        })
    }

    /// Interns the given string if needed and returns its associated symbol.
    pub fn symbol(&self, name: &str) -> Symbol {
        let mut symbols = self.symbols.borrow_mut();
        if let Some(sym) = symbols.get(name) {
            sym.clone()
        } else {
            let sym = Symbol(Rc::new(name.to_string()));
            symbols.insert(sym.clone());
            sym
        }
    }

    /// Returns the token associated with the given symbol if it is a
    /// reserved word.
    pub fn keyword(&self, sym: &Symbol) -> Option<Token> {
        self.keywords.get(sym).cloned()
    }
}

const KEYWORDS: [(&str, Token); 16] = [
    ("and", Token::And),
    ("class", Token::Class),
    ("else", Token::Else),
    ("false", Token::False),
    ("for", Token::For),
    ("fun", Token::Fun),
    ("if", Token::If),
    ("nil", Token::Nil),
    ("or", Token::Or),
    ("print", Token::Print),
    ("return", Token::Return),
    ("super", Token::Super),
    ("this", Token::This),
    ("true", Token::True),
    ("var", Token::Var),
    ("while", Token::While),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_from_string() {
        let ctx = Context::new();
        let sym = ctx.symbol("foo");
        assert_eq!(sym.name(), "foo");
    }

    #[test]
    fn symbols_with_same_name_are_equal() {
        let ctx = Context::new();
        let sym1 = ctx.symbol("foo");
        let sym2 = ctx.symbol("foo");
        assert_eq!(sym1, sym2);
    }

    #[test]
    fn symbols_with_different_names_are_different() {
        let ctx = Context::new();
        let sym1 = ctx.symbol("foo");
        let sym2 = ctx.symbol("bar");
        assert_ne!(sym1, sym2);
    }

    #[test]
    fn reserved_words_map_to_keyword_tokens() {
        let ctx = Context::new();
        assert_eq!(ctx.keyword(&ctx.symbol("var")), Some(Token::Var));
        assert_eq!(ctx.keyword(&ctx.symbol("print")), Some(Token::Print));
        assert_eq!(ctx.keyword(&ctx.symbol("super")), Some(Token::Super));
    }

    #[test]
    fn plain_identifiers_are_not_keywords() {
        let ctx = Context::new();
        assert_eq!(ctx.keyword(&ctx.symbol("variable")), None);
    }
}
