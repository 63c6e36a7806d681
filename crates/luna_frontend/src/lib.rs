#[macro_use]
extern crate macro_rules_attribute;

mod dump;
mod lexer;
mod parser;

pub mod ast;
pub mod token;

pub use lexer::{transition, Action, Lexer, LexerError, LexerErrorKind, State};
pub use parser::{ParseError, ParseResult, Parser, SyntaxError, TokenWindow};

use ast::SyntaxTree;
use token::Token;

derive_alias! {
    #[derive(Node!)] = #[derive(Debug, Clone, PartialEq, Eq)];
    #[derive(NodeCopy!)] = #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)];
}

pub fn lex(source: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new(source).collect()
}

pub fn parse(module_name: &str, source: &str) -> ParseResult<SyntaxTree> {
    Parser::new(module_name, Lexer::new(source)).parse()
}
