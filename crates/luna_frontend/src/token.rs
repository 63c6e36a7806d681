use std::fmt;
use std::rc::Rc;

use luna_diagnostic::{AsLocation, Location};

use crate::{Node, NodeCopy};

/// A lexeme together with the full text of the line it was found on.
#[derive(Node!)]
pub struct Token {
    pub kind: TokenKind,
    /// String bodies are stored without their quotes.
    pub text: String,

    pub line: Rc<str>,
    pub line_number: usize,
    /// Character offset of the token's first source character in `line`.
    pub column: usize,
    /// Number of source characters the token spans, quotes included.
    pub width: usize,
}

impl AsLocation for Token {
    fn as_location(&self) -> Location {
        Location {
            line: Rc::clone(&self.line),
            line_number: self.line_number,
            column: self.column,
            width: self.width,
        }
    }
}

#[derive(NodeCopy!)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Number,
    String,

    OpenParen,
    CloseParen,
    Colon,
    Dot,
    Comma,
    Equals,

    Plus,
    Minus,
    Asterisk,
    Slash,
    LessThan,
    GreaterThan,

    NewLine,
    Indentation,
    EndOfInput,
}

impl TokenKind {
    pub fn is_end_of_statement(self) -> bool {
        matches!(self, TokenKind::NewLine | TokenKind::EndOfInput)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(keyword) => write!(f, "Keyword '{}'", keyword.as_str()),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(NodeCopy!)]
pub enum Keyword {
    Type,
    Fun,
    Static,
    Let,
    Var,
    Return,
    If,
    Else,
}

impl Keyword {
    pub fn lookup(s: &str) -> Option<Self> {
        let keyword = match s {
            "type" => Keyword::Type,
            "fun" => Keyword::Fun,
            "static" => Keyword::Static,
            "let" => Keyword::Let,
            "var" => Keyword::Var,
            "return" => Keyword::Return,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            _ => return None,
        };

        Some(keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Type => "type",
            Keyword::Fun => "fun",
            Keyword::Static => "static",
            Keyword::Let => "let",
            Keyword::Var => "var",
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
        }
    }
}
