
mod expr;

use std::collections::VecDeque;

use luna_diagnostic::{Diagnostic, IntoDiagnostic, Snippet};

use crate::ast::*;
use crate::lexer::{Lexer, LexerError};
use crate::token::{Keyword, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexerError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub token: Token,
}

impl SyntaxError {
    fn expected(expected: impl std::fmt::Display, found: &Token) -> Self {
        Self {
            message: format!("Expected {expected}, but found {}", found.kind),
            token: found.clone(),
        }
    }
}

impl IntoDiagnostic for SyntaxError {
    fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error()
            .with_message(self.message)
            .with_snippet(Snippet::primary("", &self.token))
    }
}

impl IntoDiagnostic for ParseError {
    fn into_diagnostic(self) -> Diagnostic {
        match self {
            ParseError::Lex(error) => error.into_diagnostic(),
            ParseError::Syntax(error) => error.into_diagnostic(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

const LOOKAHEAD: usize = 3;

/// The parser's view of the token stream: the current token plus two more.
///
/// Tokens are pulled from the lexer only when looked at. The final
/// `EndOfInput` token is never consumed, so the window is never empty.
pub struct TokenWindow<'a> {
    lexer: Lexer<'a>,
    window: VecDeque<Token>,
}

impl<'a> TokenWindow<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            window: VecDeque::with_capacity(LOOKAHEAD),
        }
    }

    /// `offset` 0 is the current token. Looking past the end gives the
    /// `EndOfInput` token.
    ///
    /// # Panics
    /// If the lexer finished without handing out `EndOfInput`.
    pub fn peek(&mut self, offset: usize) -> ParseResult<&Token> {
        while self.window.len() <= offset {
            match self.lexer.next_token()? {
                Some(token) => self.window.push_back(token),
                None => break,
            }
        }

        let index = offset.min(self.window.len().saturating_sub(1));
        match self.window.get(index) {
            Some(token) => Ok(token),
            None => unreachable!("the lexer always ends with an `EndOfInput` token"),
        }
    }

    pub fn peek_kind(&mut self, offset: usize) -> ParseResult<TokenKind> {
        self.peek(offset).map(|token| token.kind)
    }

    pub fn current(&mut self) -> ParseResult<&Token> {
        self.peek(0)
    }

    pub fn advance(&mut self) -> ParseResult<Token> {
        let token = self.current()?.clone();

        if token.kind != TokenKind::EndOfInput {
            self.window.pop_front();
        }

        Ok(token)
    }
}

pub struct Parser<'a> {
    module_name: String,
    tokens: TokenWindow<'a>,
    nesting_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(module_name: impl Into<String>, lexer: Lexer<'a>) -> Self {
        Self {
            module_name: module_name.into(),
            tokens: TokenWindow::new(lexer),
            nesting_depth: 0,
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(mut self) -> ParseResult<SyntaxTree> {
        let mut types = vec![];

        loop {
            if self.eat_blank_line()? {
                continue;
            }

            match self.tokens.peek_kind(0)? {
                TokenKind::Keyword(Keyword::Type) => types.push(self.parse_type_decl()?),
                TokenKind::EndOfInput => break,
                _ => {
                    let expected = format!("token {}", TokenKind::Keyword(Keyword::Type));
                    return Err(self.error_expected(expected)?);
                }
            }
        }

        tracing::debug!(module = %self.module_name, types = types.len(), "parsed module");

        Ok(SyntaxTree {
            module_name: self.module_name,
            types,
        })
    }

    fn parse_type_decl(&mut self) -> ParseResult<TypeDeclaration> {
        self.expect(TokenKind::Keyword(Keyword::Type))?;
        let name = self.expect(TokenKind::Identifier)?;
        self.expect_end_of_line()?;

        let functions = self.parse_block(Self::parse_function_decl)?;

        Ok(TypeDeclaration { name, functions })
    }

    fn parse_function_decl(&mut self) -> ParseResult<FunctionDeclaration> {
        let is_static = self.eat(TokenKind::Keyword(Keyword::Static))?;
        self.expect(TokenKind::Keyword(Keyword::Fun))?;

        let name = self.expect(TokenKind::Identifier)?;

        self.expect(TokenKind::OpenParen)?;
        let mut args = vec![];
        if self.tokens.peek_kind(0)? != TokenKind::CloseParen {
            loop {
                let name = self.expect(TokenKind::Identifier)?;
                self.expect(TokenKind::Colon)?;
                let ty = self.expect(TokenKind::Identifier)?;
                args.push(ArgDeclaration { name, ty });

                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseParen)?;

        let return_type = if self.eat(TokenKind::Colon)? {
            Some(self.expect(TokenKind::Identifier)?)
        } else {
            None
        };

        self.expect_end_of_line()?;

        let statements = self.parse_block(Self::parse_statement)?;

        Ok(FunctionDeclaration {
            name,
            is_static,
            args,
            return_type,
            statements,
        })
    }

    /// Parses the lines indented exactly one level deeper than the current
    /// block. Anything else ends the block.
    fn parse_block<T>(
        &mut self,
        mut parse_line: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        self.nesting_depth += 1;

        let mut items = vec![];
        loop {
            if self.eat_blank_line()? {
                continue;
            }

            if !self.at_indentation()? {
                break;
            }

            self.tokens.advance()?;
            items.push(parse_line(self)?);
        }

        self.nesting_depth = match self.nesting_depth.checked_sub(1) {
            Some(depth) => depth,
            None => return Err(self.error("Unbalanced block nesting")?),
        };

        Ok(items)
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.tokens.peek_kind(0)? {
            TokenKind::Keyword(keyword @ (Keyword::Let | Keyword::Var)) => {
                self.tokens.advance()?;

                let name = self.expect(TokenKind::Identifier)?;
                let initializer = if self.eat(TokenKind::Equals)? {
                    Some(self.parse_expr()?)
                } else {
                    None
                };

                self.expect_end_of_line()?;

                Ok(Stmt::Declaration {
                    is_mutable: keyword == Keyword::Var,
                    name,
                    initializer,
                })
            }

            TokenKind::Keyword(Keyword::Return) => {
                let keyword = self.tokens.advance()?;

                let value = if self.tokens.peek_kind(0)?.is_end_of_statement() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };

                self.expect_end_of_line()?;

                Ok(Stmt::Return { keyword, value })
            }

            TokenKind::Keyword(Keyword::If) => self.parse_if(),

            TokenKind::Identifier => {
                let chain = self.parse_chain()?;

                let value = if self.eat(TokenKind::Equals)? {
                    Some(self.parse_expr()?)
                } else {
                    None
                };

                self.expect_end_of_line()?;

                Ok(Stmt::ExprOrAssign { chain, value })
            }

            _ => Err(self.error_expected("a statement")?),
        }
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::Keyword(Keyword::If))?;
        let condition = self.parse_expr()?;
        self.expect_end_of_line()?;

        let then_branch = self.parse_block(Self::parse_statement)?;

        // `else` sits on its own line, at the same depth as the `if`
        let has_else = self.at_indentation_of(self.nesting_depth)?
            && self.tokens.peek_kind(1)? == TokenKind::Keyword(Keyword::Else);

        let else_branch = if has_else {
            self.tokens.advance()?;
            self.tokens.advance()?;

            if self.tokens.peek_kind(0)? == TokenKind::Keyword(Keyword::If) {
                vec![self.parse_if()?]
            } else {
                self.expect_end_of_line()?;
                self.parse_block(Self::parse_statement)?
            }
        } else {
            vec![]
        };

        Ok(Stmt::If {
            keyword,
            condition,
            then_branch,
            else_branch,
        })
    }

    /// Consumes an empty line, with or without indentation.
    fn eat_blank_line(&mut self) -> ParseResult<bool> {
        match self.tokens.peek_kind(0)? {
            TokenKind::NewLine => {
                self.tokens.advance()?;
                Ok(true)
            }

            TokenKind::Indentation if self.tokens.peek_kind(1)?.is_end_of_statement() => {
                self.tokens.advance()?;
                self.eat(TokenKind::NewLine)?;
                Ok(true)
            }

            _ => Ok(false),
        }
    }

    fn at_indentation(&mut self) -> ParseResult<bool> {
        self.at_indentation_of(self.nesting_depth)
    }

    fn at_indentation_of(&mut self, depth: usize) -> ParseResult<bool> {
        let token = self.tokens.current()?;
        Ok(token.kind == TokenKind::Indentation && token.text.len() == 2 * depth)
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.tokens.peek_kind(0)? == kind {
            self.tokens.advance()
        } else {
            Err(self.error_expected(format!("token {kind}"))?)
        }
    }

    fn expect_end_of_line(&mut self) -> ParseResult<()> {
        match self.tokens.peek_kind(0)? {
            TokenKind::NewLine => {
                self.tokens.advance()?;
                Ok(())
            }
            TokenKind::EndOfInput => Ok(()),
            _ => Err(self.error_expected(format!("token {}", TokenKind::NewLine))?),
        }
    }

    fn eat(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if self.tokens.peek_kind(0)? == kind {
            self.tokens.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Builds the error for the current token. The outer `Result` carries any
    /// lexer error hit while looking at it.
    fn error_expected(&mut self, expected: impl std::fmt::Display) -> ParseResult<ParseError> {
        let found = self.tokens.current()?;
        Ok(SyntaxError::expected(expected, found).into())
    }

    fn error(&mut self, message: &str) -> ParseResult<ParseError> {
        let token = self.tokens.current()?.clone();
        Ok(SyntaxError {
            message: message.to_owned(),
            token,
        }
        .into())
    }
}
