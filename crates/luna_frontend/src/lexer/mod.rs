
use std::collections::VecDeque;
use std::mem;
use std::rc::Rc;
use std::str::Chars;

use luna_diagnostic::{Diagnostic, IntoDiagnostic, Location, Snippet};
use luna_utils::peek::Peek;

use crate::token::{Keyword, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct LexerError {
    pub kind: LexerErrorKind,

    pub line: Rc<str>,
    pub line_number: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexerErrorKind {
    #[error("Unexpected character {0:?}")]
    UnexpectedChar(char),

    #[error("Unterminated string literal")]
    UnterminatedString,
}

impl IntoDiagnostic for LexerError {
    fn into_diagnostic(self) -> Diagnostic {
        let label = match self.kind {
            LexerErrorKind::UnexpectedChar(_) => "unexpected character",
            LexerErrorKind::UnterminatedString => "string literal starts here",
        };

        Diagnostic::error()
            .with_message(self.kind.to_string())
            .with_snippet(Snippet::primary(
                label,
                Location {
                    line: self.line,
                    line_number: self.line_number,
                    column: self.column,
                    width: 1,
                },
            ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Begin,
    Identifier,
    Number,
    String,
    Indentation,
    CarriageReturn,
}

/// What the lexer does with the character it was given.
///
/// The `Complete` variants end the current token. Only `Complete` leaves the
/// character unconsumed, so it is fed again in the next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Accumulate,
    AccumulateAndComplete(TokenKind),
    Discard,
    DiscardAndComplete(TokenKind),
    Complete(TokenKind),
    EndOfInput,
}

/// The lexer's state machine. `None` stands for the end of input.
pub fn transition(
    state: State,
    ch: Option<char>,
    at_line_start: bool,
) -> Result<(State, Action), LexerErrorKind> {
    use Action::*;

    let next = match (state, ch) {
        (State::Begin, None) => (State::Begin, EndOfInput),

        (State::Begin, Some(' ')) if at_line_start => (State::Indentation, Accumulate),
        (State::Begin, Some(' ')) => (State::Begin, Discard),

        (State::Begin, Some('\n')) => (State::Begin, AccumulateAndComplete(TokenKind::NewLine)),
        (State::Begin, Some('\r')) => (State::CarriageReturn, Accumulate),

        (State::Begin, Some('"')) => (State::String, Discard),
        (State::Begin, Some(ch)) if is_identifier_start(ch) => (State::Identifier, Accumulate),
        (State::Begin, Some(ch)) if ch.is_ascii_digit() => (State::Number, Accumulate),

        (State::Begin, Some(ch)) => match single_char_token(ch) {
            Some(kind) => (State::Begin, AccumulateAndComplete(kind)),
            None => return Err(LexerErrorKind::UnexpectedChar(ch)),
        },

        (State::Identifier, Some(ch)) if is_identifier(ch) => (State::Identifier, Accumulate),
        (State::Identifier, _) => (State::Begin, Complete(TokenKind::Identifier)),

        (State::Number, Some(ch)) if ch.is_ascii_digit() => (State::Number, Accumulate),
        (State::Number, _) => (State::Begin, Complete(TokenKind::Number)),

        (State::String, Some('"')) => (State::Begin, DiscardAndComplete(TokenKind::String)),
        (State::String, None) => return Err(LexerErrorKind::UnterminatedString),
        (State::String, Some(_)) => (State::String, Accumulate),

        (State::Indentation, Some(' ')) => (State::Indentation, Accumulate),
        (State::Indentation, _) => (State::Begin, Complete(TokenKind::Indentation)),

        (State::CarriageReturn, Some('\n')) => {
            (State::Begin, AccumulateAndComplete(TokenKind::NewLine))
        }
        (State::CarriageReturn, _) => (State::Begin, Complete(TokenKind::NewLine)),
    };

    Ok(next)
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '(' => TokenKind::OpenParen,
        ')' => TokenKind::CloseParen,
        ':' => TokenKind::Colon,
        '.' => TokenKind::Dot,
        ',' => TokenKind::Comma,
        '=' => TokenKind::Equals,

        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Asterisk,
        '/' => TokenKind::Slash,
        '<' => TokenKind::LessThan,
        '>' => TokenKind::GreaterThan,

        _ => return None,
    };

    Some(kind)
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

/// A token whose line hasn't been fully read yet.
struct LineToken {
    kind: TokenKind,
    text: String,
    column: usize,
    width: usize,
}

/// Pull-based lexer. Tokens are released a whole line at a time so that each
/// of them can carry the text of its line.
pub struct Lexer<'a> {
    chars: Chars<'a>,

    state: State,
    lexeme: String,
    token_start: usize,

    column: usize,
    line_number: usize,
    line_text: String,
    line_tokens: Vec<LineToken>,

    ready: VecDeque<Token>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars(),

            state: State::Begin,
            lexeme: String::new(),
            token_start: 0,

            column: 0,
            line_number: 1,
            line_text: String::new(),
            line_tokens: vec![],

            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Returns `None` once the `EndOfInput` token has been handed out.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        loop {
            if let Some(token) = self.ready.pop_front() {
                return Ok(Some(token));
            }

            if self.finished {
                return Ok(None);
            }

            self.lex_line()?;
        }
    }

    fn lex_line(&mut self) -> Result<(), LexerError> {
        loop {
            let ch = self.chars.peek();

            if self.state == State::Begin {
                self.token_start = self.column;
            }

            let (state, action) = match transition(self.state, ch, self.column == 0) {
                Ok(next) => next,
                Err(kind) => return Err(self.error(kind)),
            };
            self.state = state;

            let completed = match action {
                Action::Accumulate => {
                    self.accumulate();
                    continue;
                }
                Action::Discard => {
                    self.bump();
                    continue;
                }

                Action::AccumulateAndComplete(kind) => {
                    self.accumulate();
                    kind
                }
                Action::DiscardAndComplete(kind) => {
                    self.bump();
                    kind
                }
                Action::Complete(kind) => kind,

                Action::EndOfInput => {
                    self.push_token(TokenKind::EndOfInput);
                    self.finish_line();
                    self.finished = true;
                    return Ok(());
                }
            };

            self.push_token(completed);

            if completed == TokenKind::NewLine {
                self.finish_line();
                return Ok(());
            }
        }
    }

    /// Line breaks inside a string belong to the line the string started on,
    /// so only terminators are left out of the line text.
    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;

        if self.state == State::String || !matches!(ch, '\n' | '\r') {
            self.line_text.push(ch);
            self.column += 1;
        }

        Some(ch)
    }

    fn accumulate(&mut self) {
        if let Some(ch) = self.bump() {
            self.lexeme.push(ch);
        }
    }

    fn push_token(&mut self, kind: TokenKind) {
        let text = mem::take(&mut self.lexeme);

        let kind = match kind {
            TokenKind::Identifier => {
                Keyword::lookup(&text).map_or(TokenKind::Identifier, TokenKind::Keyword)
            }
            other => other,
        };

        self.line_tokens.push(LineToken {
            kind,
            text,
            column: self.token_start,
            width: self.column - self.token_start,
        });
    }

    fn finish_line(&mut self) {
        let line: Rc<str> = Rc::from(mem::take(&mut self.line_text));

        tracing::trace!(
            line_number = self.line_number,
            tokens = self.line_tokens.len(),
            "lexed line"
        );

        for token in self.line_tokens.drain(..) {
            self.ready.push_back(Token {
                kind: token.kind,
                text: token.text,

                line: Rc::clone(&line),
                line_number: self.line_number,
                column: token.column,
                width: token.width,
            });
        }

        self.line_number += 1 + line_breaks(&line);
        self.column = 0;
    }

    fn error(&mut self, kind: LexerErrorKind) -> LexerError {
        let column = match kind {
            LexerErrorKind::UnexpectedChar(_) => self.column,
            LexerErrorKind::UnterminatedString => self.token_start,
        };

        // read the rest of the line so the error can show it
        while !matches!(self.chars.peek(), None | Some('\n' | '\r')) {
            self.bump();
        }

        self.finished = true;
        self.ready.clear();
        self.line_tokens.clear();

        LexerError {
            kind,
            line: Rc::from(mem::take(&mut self.line_text)),
            line_number: self.line_number,
            column,
        }
    }
}

/// Counts `\n`, `\r\n` and `\r` as one break each.
fn line_breaks(text: &str) -> usize {
    let mut chars = text.chars().peekable();
    let mut breaks = 0;

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => breaks += 1,
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                breaks += 1;
            }
            _ => {}
        }
    }

    breaks
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
