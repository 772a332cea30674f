//! Pull-based lexer for Squirrel source text.
//!
//! Produces tokens with byte spans and a flag telling whether a line break
//! precedes the token (Squirrel statements may end at a newline). `/** */`
//! comments are kept aside for the documentation reader; all other comments
//! (`//`, `#`, `/* */`) are dropped.

use crate::{errors::AstError, nodes::Location};

#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    Identifier(String),
    Keyword(&'static str),
    Integer(i64),
    Float(f64),
    String(String),
    Punct(&'static str),
    Eof,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub start: u32,
    pub end: u32,
    pub newline_before: bool,
}

impl Token {
    #[must_use]
    pub fn is_punct(&self, punct: &str) -> bool {
        matches!(self.kind, TokenKind::Punct(p) if p == punct)
    }

    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.kind, TokenKind::Keyword(k) if k == keyword)
    }
}

/// Raw `/** ... */` comment with its byte span.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RawDocComment {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

const KEYWORDS: &[&str] = &[
    "local",
    "const",
    "function",
    "class",
    "extends",
    "constructor",
    "static",
    "enum",
    "return",
    "yield",
    "if",
    "else",
    "while",
    "do",
    "for",
    "foreach",
    "in",
    "try",
    "catch",
    "throw",
    "break",
    "continue",
    "this",
    "base",
    "true",
    "false",
    "null",
    "typeof",
    "clone",
    "delete",
    "resume",
    "instanceof",
];

/// Longest operators first so that prefix matching picks them.
const PUNCTS: &[&str] = &[
    "...", "<=>", ">>>", "<-", "::", "+=", "-=", "*=", "/=", "%=", "==", "!=", "<=", ">=", "&&",
    "||", "++", "--", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", ".", ":", "?", "=",
    "+", "-", "*", "/", "%", "<", ">", "!", "~", "&", "|", "^", "@",
];

/// Byte offset to line/column conversion.
#[derive(Clone, Debug, Default)]
pub struct LineIndex {
    starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| to_offset(index + 1)),
        );
        Self {
            starts,
            len: to_offset(source.len()),
        }
    }

    /// 1-based `(line, column)` of a byte offset.
    #[must_use]
    pub fn position(&self, offset: u32) -> (u32, u32) {
        let line = self.starts.partition_point(|start| *start <= offset).max(1);
        let column = offset - self.starts[line - 1] + 1;
        (to_offset(line), column)
    }

    #[must_use]
    pub fn location(&self, start: u32, end: u32) -> Location {
        let (start_line, start_column) = self.position(start);
        let (end_line, end_column) = self.position(end);
        Location::new(start, end, start_line, start_column, end_line, end_column)
    }

    /// Byte offset of a 1-based line and column, `None` past the line's end.
    #[must_use]
    pub fn offset(&self, line: u32, column: u32) -> Option<u32> {
        let index = usize::try_from(line.checked_sub(1)?).ok()?;
        let start = *self.starts.get(index)?;
        let end = self.starts.get(index + 1).copied().unwrap_or(self.len + 1);
        let offset = start.checked_add(column.checked_sub(1)?)?;
        (offset < end).then_some(offset)
    }
}

pub(crate) fn to_offset(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

pub struct Lexer<'a> {
    source: &'a str,
    cursor: usize,
    newline: bool,
    lines: LineIndex,
    doc_comments: Vec<RawDocComment>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            newline: false,
            lines: LineIndex::new(source),
            doc_comments: Vec::new(),
        }
    }

    /// Lexes the whole input, ending with an `Eof` token.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::Lex`] on unterminated strings or comments and on
    /// characters that start no token.
    pub fn tokenize(mut self) -> Result<(Vec<Token>, Vec<RawDocComment>), AstError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok((tokens, self.doc_comments));
            }
        }
    }

    /// Pulls the next token from the stream.
    ///
    /// # Errors
    ///
    /// See [`Lexer::tokenize`].
    pub fn next_token(&mut self) -> Result<Token, AstError> {
        self.newline = false;
        self.skip_trivia()?;
        let newline_before = self.newline;
        let start = self.cursor;
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(ch) if ch.is_ascii_digit() => self.lex_number()?,
            Some(ch) if is_ident_start(ch) => self.lex_word(),
            Some('"') => {
                self.bump();
                TokenKind::String(self.lex_string(start, false)?)
            }
            Some('@') if self.peek_at(1) == Some('"') => {
                self.bump();
                self.bump();
                TokenKind::String(self.lex_string(start, true)?)
            }
            Some('\'') => self.lex_char(start)?,
            Some(_) => self.lex_punct(start)?,
        };
        Ok(Token {
            kind,
            start: to_offset(start),
            end: to_offset(self.cursor),
            newline_before,
        })
    }

    fn peek(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.cursor..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cursor += ch.len_utf8();
        if ch == '\n' {
            self.newline = true;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>, start: usize) -> AstError {
        AstError::Lex {
            message: message.into(),
            location: self.lines.location(to_offset(start), to_offset(self.cursor)),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), AstError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) | (Some('#'), _) => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => self.block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn block_comment(&mut self) -> Result<(), AstError> {
        let start = self.cursor;
        let rest = &self.source[start..];
        let is_doc = rest.starts_with("/**") && !rest.starts_with("/**/");
        self.bump();
        self.bump();
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some('*'), Some('/')) => {
                    self.bump();
                    self.bump();
                    break;
                }
                (Some(_), _) => {
                    self.bump();
                }
                (None, _) => return Err(self.error("unterminated block comment", start)),
            }
        }
        if is_doc {
            self.doc_comments.push(RawDocComment {
                start: to_offset(start),
                end: to_offset(self.cursor),
                text: self.source[start..self.cursor].to_string(),
            });
        }
        Ok(())
    }

    fn lex_word(&mut self) -> TokenKind {
        let start = self.cursor;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        let word = &self.source[start..self.cursor];
        match KEYWORDS.iter().find(|keyword| **keyword == word) {
            Some(keyword) => TokenKind::Keyword(*keyword),
            None => TokenKind::Identifier(word.to_string()),
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind, AstError> {
        let start = self.cursor;
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            while self.peek().is_some_and(|ch| ch.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits = &self.source[start + 2..self.cursor];
            return i64::from_str_radix(digits, 16)
                .map(TokenKind::Integer)
                .map_err(|_| self.error("invalid hexadecimal literal", start));
        }

        let mut is_float = false;
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|ch| ch.is_ascii_digit()) {
            is_float = true;
            self.bump();
            while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.peek_at(1 + sign).is_some_and(|ch| ch.is_ascii_digit()) {
                is_float = true;
                for _ in 0..=sign {
                    self.bump();
                }
                while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                    self.bump();
                }
            }
        }

        let text = &self.source[start..self.cursor];
        if is_float {
            text.parse()
                .map(TokenKind::Float)
                .map_err(|_| self.error("invalid float literal", start))
        } else {
            text.parse()
                .map(TokenKind::Integer)
                .map_err(|_| self.error("integer literal out of range", start))
        }
    }

    /// Reads up to and including the closing quote; the opening one is consumed.
    fn lex_string(&mut self, start: usize, verbatim: bool) -> Result<String, AstError> {
        let mut value = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(self.error("unterminated string literal", start));
            };
            match ch {
                '"' if verbatim && self.peek() == Some('"') => {
                    self.bump();
                    value.push('"');
                }
                '"' => return Ok(value),
                '\n' if !verbatim => {
                    return Err(self.error("newline in string literal", start));
                }
                '\\' if !verbatim => value.push(self.escape(start)?),
                other => value.push(other),
            }
        }
    }

    fn escape(&mut self, start: usize) -> Result<char, AstError> {
        let escaped = match self.bump() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('a') => '\u{7}',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('v') => '\u{b}',
            Some('x') => {
                let digits_start = self.cursor;
                while self.cursor - digits_start < 4
                    && self.peek().is_some_and(|c| c.is_ascii_hexdigit())
                {
                    self.bump();
                }
                u32::from_str_radix(&self.source[digits_start..self.cursor], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("invalid hexadecimal escape", start))?
            }
            Some(ch @ ('\\' | '"' | '\'')) => ch,
            Some(other) => return Err(self.error(format!("unknown escape `\\{other}`"), start)),
            None => return Err(self.error("unterminated string literal", start)),
        };
        Ok(escaped)
    }

    /// `'a'` is an integer in Squirrel.
    fn lex_char(&mut self, start: usize) -> Result<TokenKind, AstError> {
        self.bump();
        let value = match self.bump() {
            Some('\\') => self.escape(start)?,
            Some('\'') | None => return Err(self.error("empty character literal", start)),
            Some(ch) => ch,
        };
        if self.bump() != Some('\'') {
            return Err(self.error("unterminated character literal", start));
        }
        Ok(TokenKind::Integer(i64::from(u32::from(value))))
    }

    fn lex_punct(&mut self, start: usize) -> Result<TokenKind, AstError> {
        let rest = &self.source[self.cursor..];
        match PUNCTS.iter().find(|punct| rest.starts_with(**punct)) {
            Some(punct) => {
                self.cursor += punct.len();
                Ok(TokenKind::Punct(*punct))
            }
            None => {
                self.bump();
                Err(self.error(
                    format!("unexpected character `{}`", &self.source[start..self.cursor]),
                    start,
                ))
            }
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}
