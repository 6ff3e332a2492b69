//! Random-access token stream with checkpoint/rewind and text splicing.

use std::ops::Range;

use super::lexer::{Token, TokenKind, lex, lex_region};
use crate::TokenError;

/// Header every VRML97 file starts with.
pub const HEADER: &str = "#VRML V2.0 utf8";

#[derive(Debug, Clone)]
pub struct TokenStream {
    source: String,
    tokens: Vec<Token>,
    line_starts: Vec<usize>,
    pos: usize,
}

impl TokenStream {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let tokens = lex(&source);
        let line_starts = line_starts(&source);
        Self {
            source,
            tokens,
            line_starts,
            pos: 0,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, pos: usize) -> Option<&Token> {
        self.tokens.get(pos)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether line 0 carries the VRML97 header.
    pub fn has_header(&self) -> bool {
        self.source.starts_with(HEADER)
    }

    // ------------------------------------------------------------------
    // Checkpoints
    // ------------------------------------------------------------------

    /// Current position; pass to [`set_state`](Self::set_state) to rewind.
    pub fn state(&self) -> usize {
        self.pos
    }

    pub fn set_state(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Returns the current position and advances past it.
    pub fn next_token(&mut self) -> Option<usize> {
        if self.at_end() {
            return None;
        }
        let pos = self.pos;
        self.pos += 1;
        Some(pos)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn peek_kind(&self, pos: usize) -> Option<TokenKind> {
        self.tokens.get(pos).map(|t| t.kind)
    }

    /// Token text, or `""` past the end.
    pub fn text(&self, pos: usize) -> &str {
        self.tokens.get(pos).map_or("", |t| t.text(&self.source))
    }

    pub fn line(&self, pos: usize) -> Option<usize> {
        self.tokens.get(pos).map(|t| t.line)
    }

    pub fn byte_range(&self, pos: usize) -> Option<Range<usize>> {
        self.tokens.get(pos).map(Token::span)
    }

    /// Byte range covered by tokens `span.start..span.end`.
    ///
    /// Empty token spans map to an empty range at the next token (or at the
    /// end of the source).
    pub fn byte_range_of(&self, span: Range<usize>) -> Range<usize> {
        let at = |pos: usize| {
            self.tokens
                .get(pos)
                .map_or(self.source.len(), |t| t.start)
        };
        if span.start >= span.end {
            let offset = at(span.start);
            return offset..offset;
        }
        let start = at(span.start);
        let end = self
            .tokens
            .get(span.end - 1)
            .map_or(self.source.len(), |t| t.end);
        start..end.max(start)
    }

    fn is(&self, pos: usize, kind: TokenKind) -> bool {
        self.peek_kind(pos) == Some(kind)
    }

    pub fn is_left_bracket(&self, pos: usize) -> bool {
        self.is(pos, TokenKind::LeftBracket)
    }

    pub fn is_right_bracket(&self, pos: usize) -> bool {
        self.is(pos, TokenKind::RightBracket)
    }

    pub fn is_left_brace(&self, pos: usize) -> bool {
        self.is(pos, TokenKind::LeftBrace)
    }

    pub fn is_right_brace(&self, pos: usize) -> bool {
        self.is(pos, TokenKind::RightBrace)
    }

    pub fn is_number(&self, pos: usize) -> bool {
        self.is(pos, TokenKind::Number)
    }

    pub fn is_quoted_string(&self, pos: usize) -> bool {
        matches!(
            self.peek_kind(pos),
            Some(TokenKind::QuotedString | TokenKind::UnterminatedString)
        )
    }

    pub fn is_continuation(&self, pos: usize) -> bool {
        self.is(pos, TokenKind::ContinuationString)
    }

    pub fn is_id(&self, pos: usize) -> bool {
        self.is(pos, TokenKind::Id)
    }

    /// Whether the token is the identifier `word`.
    pub fn is_word(&self, pos: usize, word: &str) -> bool {
        self.is_id(pos) && self.text(pos) == word
    }

    pub fn int_value(&self, pos: usize) -> Result<i32, TokenError> {
        let text = self.number_text(pos)?;
        parse_int(text).ok_or_else(|| TokenError::NotANumber {
            text: text.to_owned(),
        })
    }

    pub fn float_value(&self, pos: usize) -> Result<f64, TokenError> {
        let text = self.number_text(pos)?;
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| TokenError::NotANumber {
                text: text.to_owned(),
            })
    }

    fn number_text(&self, pos: usize) -> Result<&str, TokenError> {
        let token = self.tokens.get(pos).ok_or(TokenError::OutOfRange {
            pos,
            len: self.tokens.len(),
        })?;
        let text = token.text(&self.source);
        if token.kind != TokenKind::Number {
            return Err(TokenError::NotANumber {
                text: text.to_owned(),
            });
        }
        Ok(text)
    }

    // ------------------------------------------------------------------
    // Scanning
    // ------------------------------------------------------------------

    /// Advances past `offset_count` numeric tokens and returns the position
    /// of the next numeric token, leaving the stream there.
    pub fn skip_to_number(&mut self, offset_count: usize) -> Option<usize> {
        let mut remaining = offset_count;
        while self.pos < self.tokens.len() {
            if self.tokens[self.pos].kind == TokenKind::Number {
                if remaining == 0 {
                    return Some(self.pos);
                }
                remaining -= 1;
            }
            self.pos += 1;
        }
        None
    }

    /// Advances to the next numeric token.
    pub fn skip_non_numbers(&mut self) -> Option<usize> {
        self.skip_to_number(0)
    }

    // ------------------------------------------------------------------
    // Splicing
    // ------------------------------------------------------------------

    /// Inserts `text` immediately before token `pos` (or at the end of the
    /// source when `pos == len()`). Returns the change in token count.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<isize, TokenError> {
        let at = match self.tokens.get(pos) {
            Some(token) => token.start,
            None if pos == self.tokens.len() => self.source.len(),
            None => {
                return Err(TokenError::OutOfRange {
                    pos,
                    len: self.tokens.len(),
                });
            }
        };
        Ok(self.splice(at..at, text))
    }

    /// Replaces token `pos` with `text`. Returns the change in token count.
    pub fn replace(&mut self, pos: usize, text: &str) -> Result<isize, TokenError> {
        self.replace_range(pos..pos + 1, text)
    }

    /// Replaces tokens `range` (and the trivia between them) with `text`.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> Result<isize, TokenError> {
        if range.start > range.end || range.end > self.tokens.len() {
            return Err(TokenError::OutOfRange {
                pos: range.end,
                len: self.tokens.len(),
            });
        }
        let bytes = self.byte_range_of(range);
        Ok(self.splice(bytes, text))
    }

    /// Rewrites `bytes` of the source and re-tokenizes the touched lines.
    fn splice(&mut self, bytes: Range<usize>, text: &str) -> isize {
        let old_count = self.tokens.len() as isize;
        let first_line = self.line_of_byte(bytes.start);
        let last_old_line = self.line_of_byte(bytes.end);
        let removed_newlines = self.source[bytes.clone()].matches('\n').count();
        let added_newlines = text.matches('\n').count();
        let byte_delta = text.len() as isize - (bytes.end - bytes.start) as isize;

        let first_tok = self.tokens.partition_point(|t| t.line < first_line);
        let end_tok = self.tokens.partition_point(|t| t.line <= last_old_line);
        let touches_strings = text.contains('"')
            || self.tokens[first_tok..end_tok]
                .iter()
                .any(|t| t.kind.is_string())
            || self
                .tokens
                .get(end_tok)
                .is_some_and(|t| t.kind == TokenKind::ContinuationString);

        self.source.replace_range(bytes, text);
        self.line_starts = line_starts(&self.source);

        if touches_strings {
            log::trace!("token stream: full re-lex after splice");
            self.tokens = lex(&self.source);
        } else {
            let last_new_line = last_old_line + added_newlines - removed_newlines;
            let region_start = self.line_starts[first_line];
            let region_end = self
                .line_starts
                .get(last_new_line + 1)
                .copied()
                .unwrap_or(self.source.len());
            let fresh = lex_region(&self.source, region_start..region_end, first_line);
            let line_delta = added_newlines as isize - removed_newlines as isize;
            for token in &mut self.tokens[end_tok..] {
                token.start = token.start.saturating_add_signed(byte_delta);
                token.end = token.end.saturating_add_signed(byte_delta);
                token.line = token.line.saturating_add_signed(line_delta);
            }
            self.tokens.splice(first_tok..end_tok, fresh);
            log::trace!(
                "token stream: re-lexed lines {first_line}..={last_new_line}, {} tokens",
                self.tokens.len()
            );
        }

        self.pos = self.pos.min(self.tokens.len());
        self.tokens.len() as isize - old_count
    }

    // ------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_text(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.source.len(), |next| next - 1);
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    fn line_of_byte(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&s| s <= offset).saturating_sub(1)
    }
}

fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// Decimal with optional sign, or `0x` hexadecimal.
pub(crate) fn parse_int(text: &str) -> Option<i32> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let hex = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"));
    let magnitude = match hex {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<i64>().ok()?
        }
    };
    let value = if negative { -magnitude } else { magnitude };
    match i32::try_from(value) {
        Ok(value) => Some(value),
        // Hex literals up to 0xFFFFFFFF spell the 32-bit pattern.
        Err(_) if hex.is_some() => u32::try_from(value).ok().map(|v| v as i32),
        Err(_) => None,
    }
}
