use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::BitOr;
use std::str::Chars;

use brine_idl_schema::BUILTIN_TYPES;
use lazy_static::lazy_static;
use serde::Serialize;

use crate::error::IdlError;

lazy_static! {
    /// Words that lex as [`TokenKind::Keyword`] rather than [`TokenKind::Identifier`].
    pub static ref KEYWORDS: HashSet<&'static str> = [
        // meta
        "option", "include", "root",
        // definitions
        "namespace", "type", "enum", "rpc",
    ]
    .into_iter()
    .chain(BUILTIN_TYPES)
    .collect();

    static ref BRACES: HashMap<char, TokenKind> = [
        ('{', TokenKind::BlockStart),
        ('}', TokenKind::BlockEnd),
        ('(', TokenKind::ArgListStart),
        (')', TokenKind::ArgListEnd),
        ('<', TokenKind::TypeArgListStart),
        ('>', TokenKind::TypeArgListEnd),
    ]
    .into_iter()
    .collect();
}

/// Token categories. Each kind is a distinct bit so kinds compose into a [`TokenMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u16)]
pub enum TokenKind {
    #[serde(rename = "whitespace")]
    Space            = 1 << 0,
    EndOfLine        = 1 << 1,
    EndOfFile        = 1 << 2,
    BlockStart       = 1 << 3,
    BlockEnd         = 1 << 4,
    ArgListStart     = 1 << 5,
    ArgListEnd       = 1 << 6,
    ArgListSep       = 1 << 7,
    TypeArgListStart = 1 << 8,
    TypeArgListEnd   = 1 << 9,
    Comment          = 1 << 10,
    Identifier       = 1 << 11,
    Keyword          = 1 << 12,
    #[serde(rename = "value-string")]
    StringValue      = 1 << 13,
    #[serde(rename = "value-number")]
    NumberValue      = 1 << 14,
}

/// A set of [`TokenKind`]s, used to elide categories from the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenMask(u16);

impl TokenMask {
    pub const NONE: TokenMask = TokenMask(0);

    pub const fn of(kind: TokenKind) -> TokenMask {
        TokenMask(kind as u16)
    }

    pub const fn with(self, kind: TokenKind) -> TokenMask {
        TokenMask(self.0 | kind as u16)
    }

    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & kind as u16 != 0
    }
}

/// Layout tokens the parser never looks at.
pub const PARSER_IGNORES: TokenMask = TokenMask::of(TokenKind::Space)
    .with(TokenKind::EndOfLine)
    .with(TokenKind::Comment);

impl From<TokenKind> for TokenMask {
    fn from(kind: TokenKind) -> Self {
        TokenMask::of(kind)
    }
}

impl BitOr<TokenKind> for TokenKind {
    type Output = TokenMask;

    fn bitor(self, rhs: TokenKind) -> TokenMask {
        TokenMask::of(self).with(rhs)
    }
}

impl BitOr<TokenKind> for TokenMask {
    type Output = TokenMask;

    fn bitor(self, rhs: TokenKind) -> TokenMask {
        self.with(rhs)
    }
}

/// Source position. `line` and `col` count from zero; `Display` shows them from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Pos {
    pub byte: usize,
    pub line: usize,
    pub col:  usize,
}

impl Pos {
    pub const fn new(byte: usize, line: usize, col: usize) -> Self {
        Self { byte, line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.col + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind:  TokenKind,
    /// Literal text. String literals are unquoted and unescaped.
    pub value: String,
    /// Position of the token's first character.
    pub pos:   Pos,
    /// Number of source bytes covered.
    pub len:   usize,
}

impl Token {
    /// The exact source text this token was lexed from.
    pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.pos.byte..self.pos.byte + self.len]
    }
}

/// Splits `text` into tokens, dropping the kinds in `ignore`.
///
/// Every input character belongs to exactly one token, whitespace and line breaks included,
/// and the stream ends with an [`TokenKind::EndOfFile`] token unless it is ignored. That token
/// sits at `text.len()` with a length of zero, so token lengths always sum to the input length.
pub fn tokenize_schema(text: &str, ignore: TokenMask) -> Result<Vec<Token>, IdlError> {
    let mut lexer = Lexer::new(text, ignore);
    let mut state = State::Start;
    while let Some(next) = lexer.step(state)? {
        state = next;
    }

    lexer.emit(TokenKind::EndOfFile);
    Ok(lexer.tokens)
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

fn is_new_line(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn is_space(c: char) -> bool {
    !is_new_line(c) && c.is_whitespace()
}

fn is_brace(c: char) -> bool {
    "{}()<>[]".contains(c)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-'
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Lexer states. Each transition consumes at most one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Brace,
    Separator,
    CommentOpen,
    CommentSecond,
    CommentBody,
    StringOpen,
    StringBody,
    StringEscape,
    StringClose,
    NewLine,
    NewLineCrLf,
    Space,
    Number,
    FractionStart,
    Fraction,
    Identifier,
}

struct Lexer<'a> {
    chars:  Chars<'a>,
    head:   Option<char>,
    pos:    Pos,
    start:  Pos,
    buffer: String,
    ignore: TokenMask,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, ignore: TokenMask) -> Self {
        let mut chars = text.chars();
        let head = chars.next();
        Self {
            chars,
            head,
            pos: Pos::default(),
            start: Pos::default(),
            buffer: String::new(),
            ignore,
            tokens: Vec::new(),
        }
    }

    fn step(&mut self, state: State) -> Result<Option<State>, IdlError> {
        use State::*;

        let next = match (state, self.head) {
            (Start, None) => {
                self.start = self.pos;
                return Ok(None);
            }
            (Start, Some(c)) => {
                self.start = self.pos;
                match c {
                    c if is_brace(c) => Brace,
                    ',' => Separator,
                    '/' => CommentOpen,
                    '"' => StringOpen,
                    c if is_new_line(c) => NewLine,
                    c if is_space(c) => Space,
                    c if c.is_ascii_digit() => Number,
                    c if is_ident_start(c) => Identifier,
                    c => return Err(self.fail(format!("unexpected character `{}`", c.escape_debug()))),
                }
            }

            (Brace, Some(c)) => {
                let kind = match BRACES.get(&c) {
                    Some(kind) => *kind,
                    None => return Err(self.fail(format!("invalid brace `{}`", c))),
                };
                self.bump();
                self.emit(kind);
                Start
            }

            (Separator, Some(_)) => {
                self.bump();
                self.emit(TokenKind::ArgListSep);
                Start
            }

            (CommentOpen, Some(_)) => {
                self.bump();
                CommentSecond
            }
            (CommentSecond, Some('/')) => {
                self.bump();
                CommentBody
            }
            (CommentSecond, _) => return Err(self.fail("stray `/`, comments start with `//`")),
            (CommentBody, Some(c)) if !is_new_line(c) => {
                self.bump();
                CommentBody
            }
            (CommentBody, _) => {
                self.emit(TokenKind::Comment);
                Start
            }

            (StringOpen, Some(_)) => {
                self.skip();
                StringBody
            }
            (StringBody | StringEscape, None) => {
                return Err(self.fail("unterminated string at end of file"))
            }
            (StringBody, Some('"')) => StringClose,
            (StringBody, Some('\\')) => {
                self.skip();
                StringEscape
            }
            (StringBody, Some(c)) => {
                self.bump();
                if c == '\n' {
                    self.mark_new_line();
                }
                StringBody
            }
            (StringEscape, Some(c)) => {
                self.skip();
                self.buffer.push(match c {
                    'r' => '\r',
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                StringBody
            }
            (StringClose, Some(_)) => {
                self.skip();
                self.emit(TokenKind::StringValue);
                Start
            }

            (NewLine, Some('\r')) => {
                self.bump();
                NewLineCrLf
            }
            (NewLine, Some(_)) | (NewLineCrLf, Some('\n')) => {
                self.bump();
                self.emit(TokenKind::EndOfLine);
                self.mark_new_line();
                Start
            }
            (NewLineCrLf, _) => return Err(self.fail("stray \\r, malformed line endings")),

            (Space, Some(c)) if is_space(c) => {
                self.bump();
                Space
            }
            (Space, _) => {
                self.emit(TokenKind::Space);
                Start
            }

            (Number, Some(c)) if c.is_ascii_digit() => {
                self.bump();
                Number
            }
            (Number, Some('.')) => {
                self.bump();
                FractionStart
            }
            (Number, _) => {
                self.emit(TokenKind::NumberValue);
                Start
            }
            (FractionStart, Some(c)) if c.is_ascii_digit() => {
                self.bump();
                Fraction
            }
            (FractionStart | Fraction, Some('.')) => {
                return Err(self.fail("multiple decimal separators in number literal"))
            }
            (FractionStart, _) => return Err(self.fail("digits expected after decimal separator")),
            (Fraction, Some(c)) if c.is_ascii_digit() => {
                self.bump();
                Fraction
            }
            (Fraction, _) => {
                self.emit(TokenKind::NumberValue);
                Start
            }

            (Identifier, Some(c)) if is_ident(c) => {
                self.bump();
                Identifier
            }
            (Identifier, _) => {
                let kind = if is_keyword(&self.buffer) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                self.emit(kind);
                Start
            }

            // Every state above except Start is entered with a character in `head`.
            (state, None) => return Err(self.fail(format!("unexpected end of file in {:?}", state))),
        };

        Ok(Some(next))
    }

    /// Consumes the head character into the token buffer.
    fn bump(&mut self) {
        if let Some(c) = self.skip() {
            self.buffer.push(c);
        }
    }

    /// Consumes the head character without buffering it.
    fn skip(&mut self) -> Option<char> {
        let c = self.head?;
        self.pos.byte += c.len_utf8();
        self.pos.col += 1;
        self.head = self.chars.next();
        Some(c)
    }

    fn mark_new_line(&mut self) {
        self.pos.line += 1;
        self.pos.col = 0;
    }

    fn emit(&mut self, kind: TokenKind) {
        let value = std::mem::take(&mut self.buffer);
        if self.ignore.contains(kind) {
            return;
        }

        self.tokens.push(Token {
            kind,
            value,
            pos: self.start,
            len: self.pos.byte - self.start.byte,
        });
    }

    fn fail(&self, msg: impl Into<String>) -> IdlError {
        IdlError::LexError {
            msg: msg.into(),
            pos: self.pos,
        }
    }
}
