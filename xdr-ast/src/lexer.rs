//! A hand-written scanner over the IDL source text.
//!
//! Shaped after the teacher's byte-cursor `Parser`: a single forward-only
//! cursor, small `peek`/`bump` primitives, and a zero-sized error type that
//! logs at construction so a breakpoint on the constructor catches every
//! failure site.

#[cfg(test)]
mod tests;

use crate::token::{keyword, Token, TokenKind};
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// Scans `src` into a flat token stream, terminated by a single `Eof` token.
///
/// Identifiers, keywords and numeric literals are restricted to ASCII,
/// matching the IDL grammar; this keeps every byte index below one byte per
/// character, so the cursor can advance by `char.len_utf8()` without special
/// casing.
pub struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            line: 1,
        }
    }

    /// Scans the entire input and returns the token stream, or the first
    /// lexical error encountered.
    pub fn tokenize(src: &'a str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Self::new(src);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let item = self.chars.next();
        if let Some((_, '\n')) = item {
            self.line += 1;
        }
        item
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.peek() {
                        Some(&(_, '/')) => {
                            self.bump();
                            self.bump();
                            while !matches!(self.peek(), None | Some('\n')) {
                                self.bump();
                            }
                        }
                        Some(&(_, '*')) => {
                            self.bump();
                            self.bump();
                            loop {
                                match self.bump() {
                                    None => break,
                                    Some((_, '*')) if self.peek() == Some('/') => {
                                        self.bump();
                                        break;
                                    }
                                    _ => {}
                                }
                            }
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let line = self.line;
        let Some((start, c)) = self.bump() else {
            return Ok(Token::new(TokenKind::Eof, line));
        };

        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '<' => TokenKind::LAngle,
            '>' => TokenKind::RAngle,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Eq,
            '*' => TokenKind::Star,
            ':' => TokenKind::Colon,
            '-' if self.peek().is_some_and(|d| d.is_ascii_digit()) => {
                return self.number(start, line);
            }
            c if c.is_ascii_digit() => return self.number(start, line),
            c if c.is_ascii_alphabetic() || c == '_' => return Ok(self.ident(start, line)),
            other => {
                return Err(LexError::new(line, format!("unexpected character '{other}'")))
            }
        };

        Ok(Token::new(kind, line))
    }

    fn take_while(&mut self, start: usize, mut keep: impl FnMut(char) -> bool) -> &'a str {
        let mut end = start + 1;
        while let Some(c) = self.peek() {
            if keep(c) {
                self.bump();
                end += c.len_utf8();
            } else {
                break;
            }
        }
        &self.src[start..end]
    }

    fn ident(&mut self, start: usize, line: u32) -> Token {
        let text = self.take_while(start, |c| c.is_ascii_alphanumeric() || c == '_');
        let kind = keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        Token::new(kind, line)
    }

    fn number(&mut self, start: usize, line: u32) -> Result<Token, LexError> {
        let negative = self.src[start..].starts_with('-');
        let hex = !negative
            && self.src[start..].starts_with('0')
            && matches!(self.peek(), Some('x') | Some('X'));

        let text = if hex {
            // `keep` also accepts the 'x'/'X' marker right after the leading
            // zero, so it is consumed and counted by the same loop as the
            // hex digits that follow it.
            self.take_while(start, |c| c.is_ascii_hexdigit() || c == 'x' || c == 'X')
        } else {
            self.take_while(start, |c| c.is_ascii_digit())
        };

        let value = if hex {
            i64::from_str_radix(&text[2..], 16)
        } else {
            text.parse::<i64>()
        }
        .map_err(|_| LexError::new(line, format!("malformed numeric literal '{text}'")))?;

        Ok(Token::new(
            TokenKind::Int {
                value,
                text: text.to_string(),
            },
            line,
        ))
    }
}

/// A lexical error, tagged with the source line it occurred on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub line: u32,
    pub message: String,
}

impl LexError {
    pub fn new(line: u32, message: String) -> Self {
        tracing::debug!(line, %message, "lex error");
        Self { line, message }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for LexError {}
