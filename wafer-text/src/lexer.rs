// wafer - wafer-text
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The text-format lexer: whitespace/comment skipping, parenthesis and
//! identifier tokens, string and number literals, and mnemonic
//! normalization.
//!
//! WAT keywords (instruction mnemonics, type names, and the small set of
//! structural reserved words) and number literals share one character
//! class — `idchar` — so both are scanned the same way: read the
//! maximal run of `idchar` bytes starting here, then classify the result
//! by its first byte. This replaces the original toolkit's per-byte-
//! position dispatch trie (`keywords-inl.cc`, one `switch` per
//! discriminating character of every known spelling) with an equivalent
//! but much smaller match over the already-scanned slice; `rustc` lays
//! out a `match` over string literals as a comparably efficient decision
//! tree, so nothing is lost by not hand-discriminating byte positions.

use alloc::vec::Vec;

use wafer_error::{kinds, Result};

use crate::token::{ReservedWord, Span, Token, TokenKind};

/// Scans one `&str` of WAT source into a sequence of [`Token`]s.
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0 }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek(0)?;
        self.pos += 1;
        Some(byte)
    }

    /// Skips whitespace, `;;` line comments, and nestable `(; ... ;)`
    /// block comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek(0) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.pos += 1;
                }
                Some(b';') if self.peek(1) == Some(b';') => {
                    self.pos += 2;
                    while !matches!(self.peek(0), Some(b'\n') | None) {
                        self.pos += 1;
                    }
                }
                Some(b'(') if self.peek(1) == Some(b';') => {
                    let start = self.pos;
                    self.pos += 2;
                    let mut depth = 1u32;
                    while depth > 0 {
                        match (self.peek(0), self.peek(1)) {
                            (Some(b'('), Some(b';')) => {
                                depth += 1;
                                self.pos += 2;
                            }
                            (Some(b';'), Some(b')')) => {
                                depth -= 1;
                                self.pos += 2;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => return Err(kinds::unexpected_eof(start as u64, 2)),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Lexes and returns the next token. Returns [`TokenKind::Eof`]
    /// (never an error) once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        self.skip_trivia()?;
        let start = self.pos;

        let Some(byte) = self.peek(0) else {
            return Ok(Token { kind: TokenKind::Eof, span: Span::new(start as u32, start as u32) });
        };

        let kind = match byte {
            b'(' => {
                self.pos += 1;
                TokenKind::LParen
            }
            b')' => {
                self.pos += 1;
                TokenKind::RParen
            }
            b'$' => {
                self.pos += 1;
                let id_start = self.pos;
                while self.peek(0).is_some_and(is_idchar) {
                    self.pos += 1;
                }
                TokenKind::Id(&self.src[id_start..self.pos])
            }
            b'"' => {
                self.pos += 1;
                TokenKind::Str(self.lex_string(start)?)
            }
            b if is_idchar(b) => {
                while self.peek(0).is_some_and(is_idchar) {
                    self.pos += 1;
                }
                let word = &self.src[start..self.pos];
                self.classify_word(word)
            }
            other => return Err(kinds::invalid_character(start as u64, other)),
        };

        Ok(Token { kind, span: Span::new(start as u32, self.pos as u32) })
    }

    fn classify_word(&self, word: &'a str) -> TokenKind<'a> {
        if is_number_start(word) {
            return TokenKind::Number(word);
        }
        if let Some(reserved) = ReservedWord::from_str(word) {
            return TokenKind::Reserved(reserved);
        }
        TokenKind::Keyword(normalize_mnemonic(word))
    }

    /// Lexes a string literal's body (the opening `"` has already been
    /// consumed) up to and including the closing `"`, resolving
    /// backslash escapes: `\n`, `\t`, `\\`, `\'`, `\"`, `\u{XXXX}`
    /// (encoded as UTF-8), and the raw-byte form `\XX` (two hex digits).
    fn lex_string(&mut self, token_start: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            match self.advance() {
                None => return Err(kinds::unexpected_eof(token_start as u64, 1)),
                Some(b'"') => return Ok(out),
                Some(b'\\') => match self.advance() {
                    Some(b'n') => out.push(b'\n'),
                    Some(b't') => out.push(b'\t'),
                    Some(b'r') => out.push(b'\r'),
                    Some(b'\\') => out.push(b'\\'),
                    Some(b'\'') => out.push(b'\''),
                    Some(b'"') => out.push(b'"'),
                    Some(b'u') => {
                        if self.advance() != Some(b'{') {
                            return Err(kinds::invalid_escape(self.pos as u64));
                        }
                        let digits_start = self.pos;
                        while self.peek(0).is_some_and(|b| b.is_ascii_hexdigit()) {
                            self.pos += 1;
                        }
                        let hex = &self.src[digits_start..self.pos];
                        if self.advance() != Some(b'}') || hex.is_empty() {
                            return Err(kinds::invalid_escape(digits_start as u64));
                        }
                        let code = u32::from_str_radix(hex, 16).map_err(|_| kinds::invalid_escape(digits_start as u64))?;
                        let ch = char::from_u32(code).ok_or_else(|| kinds::invalid_escape(digits_start as u64))?;
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    Some(hi) if hi.is_ascii_hexdigit() => {
                        let lo = self.advance().filter(u8::is_ascii_hexdigit).ok_or_else(|| kinds::invalid_escape(self.pos as u64))?;
                        out.push(hex_digit(hi) * 16 + hex_digit(lo));
                    }
                    _ => return Err(kinds::invalid_escape((self.pos - 1) as u64)),
                },
                Some(other) => out.push(other),
            }
        }
    }
}

fn hex_digit(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => 0,
    }
}

/// The WAT `idchar` class: everything a keyword, mnemonic, or number may
/// be made of. `$` and `"` are handled as their own token-starting bytes
/// before this check runs, so they are excluded here.
fn is_idchar(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'/'
                | b':'
                | b'<'
                | b'='
                | b'>'
                | b'?'
                | b'@'
                | b'\\'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// A scanned `idchar` run is a number, not a keyword, if — after an
/// optional leading sign — it begins with a digit (`+1`, `-.5`, `123`)
/// or spells one of the `inf`/`nan`/`nan:0x...` special float values,
/// matching the grammar's disjoint `num`/`keyword` productions.
fn is_number_start(word: &str) -> bool {
    let rest = word.strip_prefix(['+', '-']).unwrap_or(word);
    if rest.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return true;
    }
    rest.starts_with("inf") || rest.starts_with("nan")
}

/// Maps a handful of pre-2.0 legacy mnemonic spellings (the `/`-separated
/// sign/type-suffix order used before the 2017 instruction rename, plus
/// the two renamed memory-size instructions) to their current spelling.
/// Anything not in this table is returned unchanged — it is already
/// modern, or it is not a recognized mnemonic at all, which is fine: this
/// crate only lexes, it does not validate that a keyword names a real
/// instruction.
fn normalize_mnemonic(word: &str) -> &str {
    match word {
        "grow_memory" => "memory.grow",
        "current_memory" => "memory.size",
        "i32.wrap/i64" => "i32.wrap_i64",
        "i64.extend_s/i32" => "i64.extend_i32_s",
        "i64.extend_u/i32" => "i64.extend_i32_u",
        "i32.trunc_s/f32" => "i32.trunc_f32_s",
        "i32.trunc_u/f32" => "i32.trunc_f32_u",
        "i32.trunc_s/f64" => "i32.trunc_f64_s",
        "i32.trunc_u/f64" => "i32.trunc_f64_u",
        "i64.trunc_s/f32" => "i64.trunc_f32_s",
        "i64.trunc_u/f32" => "i64.trunc_f32_u",
        "i64.trunc_s/f64" => "i64.trunc_f64_s",
        "i64.trunc_u/f64" => "i64.trunc_f64_u",
        "anyref" => "externref",
        _ => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<TokenKind<'_>> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            let eof = tok.kind.is_eof();
            out.push(tok.kind);
            if eof {
                return out;
            }
        }
    }

    #[test]
    fn lexes_a_minimal_function() {
        let toks = tokens("(func $add (param i32 i32) (result i32))");
        assert_eq!(
            toks,
            alloc::vec![
                TokenKind::LParen,
                TokenKind::Reserved(ReservedWord::Func),
                TokenKind::Id("add"),
                TokenKind::LParen,
                TokenKind::Reserved(ReservedWord::Param),
                TokenKind::Keyword("i32"),
                TokenKind::Keyword("i32"),
                TokenKind::RParen,
                TokenKind::LParen,
                TokenKind::Reserved(ReservedWord::Result),
                TokenKind::Keyword("i32"),
                TokenKind::RParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_line_and_nested_block_comments() {
        let toks = tokens("(; outer (; inner ;) still outer ;) ;; trailing\n(module)");
        assert_eq!(
            toks,
            alloc::vec![
                TokenKind::LParen,
                TokenKind::Reserved(ReservedWord::Module),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn normalizes_legacy_mnemonics() {
        assert_eq!(tokens("i32.wrap/i64"), alloc::vec![TokenKind::Keyword("i32.wrap_i64"), TokenKind::Eof]);
        assert_eq!(tokens("grow_memory"), alloc::vec![TokenKind::Keyword("memory.grow"), TokenKind::Eof]);
        assert_eq!(tokens("anyref"), alloc::vec![TokenKind::Keyword("externref"), TokenKind::Eof]);
    }

    #[test]
    fn lexes_numbers_including_signed_and_hex() {
        assert_eq!(tokens("42"), alloc::vec![TokenKind::Number("42"), TokenKind::Eof]);
        assert_eq!(tokens("-0x1p3"), alloc::vec![TokenKind::Number("-0x1p3"), TokenKind::Eof]);
        assert_eq!(tokens("+nan:0x1"), alloc::vec![TokenKind::Number("+nan:0x1"), TokenKind::Eof]);
    }

    #[test]
    fn resolves_string_escapes() {
        let toks = tokens(r#""a\n\"b\41""#);
        assert_eq!(toks, alloc::vec![TokenKind::Str(alloc::vec![b'a', b'\n', b'"', b'b', 0x41]), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lexer = Lexer::new("\"abc");
        assert_eq!(lexer.next_token().unwrap_err().code, wafer_error::codes::UNEXPECTED_EOF);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let mut lexer = Lexer::new("(; never closed");
        assert_eq!(lexer.next_token().unwrap_err().code, wafer_error::codes::UNEXPECTED_EOF);
    }
}
