//! Lexer for VRML97 source text.
//!
//! Produces span-based tokens without storing text; text is sliced from the
//! source only when needed. Whitespace (commas included) and comments are
//! dropped.
//!
//! ## Strings
//!
//! A quoted string may run across lines. It is split into one token per line
//! so every token stays on a single line: the first piece keeps the string
//! kind, following pieces become `ContinuationString`.
//!
//! ## Error handling
//!
//! Consecutive characters no rule accepts are coalesced into a single
//! `Garbage` token.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    /// Separates node and field in ROUTE statements.
    #[token(".")]
    Period,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    QuotedString,

    /// Opening quote with no closing quote before end of input.
    #[regex(r#""(?:[^"\\]|\\.)*"#, allow_greedy = true)]
    UnterminatedString,

    /// Later line of a string that started on a previous line.
    ContinuationString,

    /// Anything that starts like a number. Lexical validity is checked by the
    /// field value that consumes it.
    #[regex(
        r"[+\-]?\.?[0-9][^\x00-\x20\x22\x23\x27\x2c\x5b\x5c\x5d\x7b\x7d\x7f]*",
        allow_greedy = true
    )]
    Number,

    /// Node, field and type names as well as keywords.
    #[regex(
        r"[^\x00-\x20\x22\x23\x27\x2b\x2c\x2d\x2e\x30-\x39\x5b\x5c\x5d\x7b\x7d\x7f][^\x00-\x20\x22\x23\x27\x2c\x2e\x5b\x5c\x5d\x7b\x7d\x7f]*",
        allow_greedy = true
    )]
    Id,

    #[regex(r"#[^\n]*", allow_greedy = true)]
    Comment,

    #[regex(r"[ \t\r\n,]+")]
    Whitespace,

    /// Consecutive unrecognized characters.
    Garbage,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Comment | Self::Whitespace)
    }

    pub fn is_string(self) -> bool {
        matches!(
            self,
            Self::QuotedString | Self::UnterminatedString | Self::ContinuationString
        )
    }

    /// Single punctuation tokens that can never start a node.
    pub fn is_special(self) -> bool {
        !matches!(self, Self::Id)
    }
}

/// Zero-copy token: kind, byte span and zero-based line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Token {
    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span()]
    }
}

/// Tokenizes a whole source.
pub fn lex(source: &str) -> Vec<Token> {
    lex_region(source, 0..source.len(), 0)
}

/// Tokenizes `source[range]`, which must start at the beginning of line
/// `first_line`. Spans are absolute.
pub fn lex_region(source: &str, range: Range<usize>, first_line: usize) -> Vec<Token> {
    let base = range.start;
    let text = &source[range];
    let mut tokens = Vec::new();
    let mut lines = LineCounter::new(text, first_line);
    let mut lexer = TokenKind::lexer(text);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                let span = lexer.span();
                if let Some(start) = error_start.take() {
                    let line = lines.line_at(start);
                    tokens.push(Token {
                        kind: TokenKind::Garbage,
                        start: base + start,
                        end: base + span.start,
                        line,
                    });
                }

                if kind.is_trivia() {
                    continue;
                }

                let line = lines.line_at(span.start);
                if kind.is_string() {
                    split_string(text, base, span, line, kind, &mut tokens);
                } else {
                    tokens.push(Token {
                        kind,
                        start: base + span.start,
                        end: base + span.end,
                        line,
                    });
                }
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    let line = lines.line_at(start);
                    tokens.push(Token {
                        kind: TokenKind::Garbage,
                        start: base + start,
                        end: base + text.len(),
                        line,
                    });
                }
                break;
            }
        }
    }

    tokens
}

/// Splits a string token at line breaks.
fn split_string(
    text: &str,
    base: usize,
    span: Range<usize>,
    line: usize,
    kind: TokenKind,
    tokens: &mut Vec<Token>,
) {
    let mut piece_start = span.start;
    let mut piece_line = line;
    let mut piece_kind = kind;

    for (offset, byte) in text.as_bytes()[span.clone()].iter().enumerate() {
        if *byte != b'\n' {
            continue;
        }
        let newline = span.start + offset;
        let piece_end = if newline > piece_start && text.as_bytes()[newline - 1] == b'\r' {
            newline - 1
        } else {
            newline
        };
        tokens.push(Token {
            kind: piece_kind,
            start: base + piece_start,
            end: base + piece_end,
            line: piece_line,
        });
        piece_start = newline + 1;
        piece_line += 1;
        piece_kind = TokenKind::ContinuationString;
    }

    tokens.push(Token {
        kind: piece_kind,
        start: base + piece_start,
        end: base + span.end,
        line: piece_line,
    });
}

/// Incremental line lookup for monotonically increasing offsets.
struct LineCounter<'s> {
    text: &'s [u8],
    scanned: usize,
    line: usize,
}

impl<'s> LineCounter<'s> {
    fn new(text: &'s str, first_line: usize) -> Self {
        Self {
            text: text.as_bytes(),
            scanned: 0,
            line: first_line,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        if offset > self.scanned {
            self.line += self.text[self.scanned..offset]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            self.scanned = offset;
        }
        self.line
    }
}
