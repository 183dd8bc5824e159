//! `TokenStream` — the lexer (§4.A).
//!
//! Single-pass, forward-only, one token of lookahead via an explicit
//! `reuse` flag. Grounded on the teacher's `reader.rs` + `scanner.rs`
//! cursor/position discipline, reduced to the much smaller token set this
//! spec calls for (no directives/anchors/tags/simple-key roll-back).

use crate::error::{Error, Mark, Result};
use crate::token::{Token, TokenData};

/// Recognized null literals (§4.A plain-scalar rule).
const NULL_LITERALS: [&str; 4] = ["~", "null", "Null", "NULL"];

pub struct TokenStream {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    /// Leading-space count of the line currently being scanned. Updated
    /// every time scanning crosses into a new content line.
    current_indent: usize,
    /// True only for the single dispatch call that sees the first
    /// non-space character of a line (gates `MultilineListFlag`).
    first_on_line: bool,
    current: Token,
    reuse: bool,
}

impl TokenStream {
    pub fn new(input: &str) -> Self {
        TokenStream {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
            current_indent: 0,
            first_on_line: true,
            current: Token {
                data: TokenData::EndOfFile,
                start_mark: Mark::default(),
                end_mark: Mark::default(),
            },
            reuse: false,
        }
    }

    /// The indent (leading-space count) of the line the most recently
    /// scanned content belongs to. The sole signal the decoder uses to
    /// close block structures.
    pub fn current_indent(&self) -> usize {
        self.current_indent
    }

    /// Causes the next call to [`Self::next`] to return the current token
    /// again instead of scanning forward.
    pub fn reuse_current(&mut self) {
        self.reuse = true;
    }

    pub fn next(&mut self) -> Result<Token> {
        if self.reuse {
            self.reuse = false;
            return Ok(self.current.clone());
        }
        self.current = self.scan_token()?;
        Ok(self.current.clone())
    }

    fn mark(&self) -> Mark {
        Mark {
            index: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn is_structural_whitespace(c: char) -> bool {
        c == ' ' || c == '\t'
    }

    /// Consumes indentation and fully blank/comment-only lines, landing
    /// the cursor at either the first real content character of a line,
    /// or EOF. Sets `current_indent` and `first_on_line`.
    fn skip_to_content(&mut self) -> Result<()> {
        loop {
            let line_start_mark = self.mark();
            let mut spaces = 0usize;
            while let Some(c) = self.peek() {
                if c == ' ' {
                    self.advance();
                    spaces += 1;
                } else if c == '\t' {
                    return Err(Error::MalformedScalar {
                        reason: "tab character in indentation".to_string(),
                        mark: line_start_mark,
                    });
                } else {
                    break;
                }
            }
            match self.peek() {
                None => {
                    self.current_indent = spaces;
                    self.first_on_line = true;
                    return Ok(());
                }
                Some('\n') => {
                    // Blank line: absorb it and keep looking.
                    self.advance();
                    continue;
                }
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some(_) => {
                    self.current_indent = spaces;
                    self.first_on_line = true;
                    return Ok(());
                }
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if Self::is_structural_whitespace(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token> {
        loop {
            if self.first_on_line {
                self.skip_to_content()?;
            } else {
                self.skip_inline_whitespace();
                if self.peek() == Some('#') {
                    self.skip_comment();
                }
            }

            let start = self.mark();
            let Some(c) = self.peek() else {
                return Ok(Token {
                    data: TokenData::EndOfFile,
                    start_mark: start,
                    end_mark: start,
                });
            };

            if c == '\n' {
                self.advance();
                self.first_on_line = true;
                return Ok(Token {
                    data: TokenData::LineSeparator,
                    start_mark: start,
                    end_mark: self.mark(),
                });
            }

            let was_first_on_line = self.first_on_line;
            self.first_on_line = false;

            if was_first_on_line
                && c == '-'
                && matches!(self.peek_at(1), Some(' ') | Some('\t') | Some('\n') | None)
            {
                self.advance();
                self.skip_inline_whitespace();
                return Ok(Token {
                    data: TokenData::MultilineListFlag,
                    start_mark: start,
                    end_mark: self.mark(),
                });
            }

            match c {
                '{' => {
                    self.advance();
                    return Ok(self.simple(TokenData::FlowMapBegin, start));
                }
                '}' => {
                    self.advance();
                    return Ok(self.simple(TokenData::FlowMapEnd, start));
                }
                '[' => {
                    self.advance();
                    return Ok(self.simple(TokenData::FlowSequenceBegin, start));
                }
                ']' => {
                    self.advance();
                    return Ok(self.simple(TokenData::FlowSequenceEnd, start));
                }
                ',' => {
                    self.advance();
                    return Ok(self.simple(TokenData::Comma, start));
                }
                '\'' => return self.scan_single_quoted(start),
                '"' => return self.scan_double_quoted(start),
                ':' if matches!(
                    self.peek_at(1),
                    Some(' ') | Some('\t') | Some('\n') | Some(',') | Some(']') | Some('}') | None
                ) =>
                {
                    self.advance();
                    return Ok(self.simple(TokenData::Colon, start));
                }
                '|' | '>' => {
                    return Err(Error::UnsupportedFeature("block scalar"));
                }
                _ => return self.scan_plain(start),
            }
        }
    }

    fn simple(&self, data: TokenData, start: Mark) -> Token {
        Token {
            data,
            start_mark: start,
            end_mark: self.mark(),
        }
    }

    fn scan_plain(&mut self, start: Mark) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.peek() {
                None | Some('\n') | Some(',') | Some(']') | Some('}') => break,
                Some(':')
                    if matches!(
                        self.peek_at(1),
                        Some(' ') | Some('\t') | Some('\n') | Some(',') | Some(']')
                            | Some('}')
                            | None
                    ) =>
                {
                    break
                }
                Some('#') if text.ends_with(' ') || text.ends_with('\t') => {
                    // The trailing whitespace already in `text` is trimmed
                    // by the final `trim_end_matches` below.
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        let trimmed = text.trim_end_matches([' ', '\t']).to_string();
        let end = self.mark();
        let data = if NULL_LITERALS.contains(&trimmed.as_str()) || trimmed.is_empty() {
            TokenData::StringNull
        } else {
            TokenData::String(trimmed)
        };
        Ok(Token {
            data,
            start_mark: start,
            end_mark: end,
        })
    }

    /// Folds a run of line breaks starting at the cursor (cursor is on the
    /// first `\n`) the YAML way: a single break becomes a space, multiple
    /// breaks become `count - 1` literal newlines. Leading indentation on
    /// each continued line is consumed and discarded.
    fn fold_newlines(&mut self) -> String {
        let mut count = 0usize;
        while self.peek() == Some('\n') {
            self.advance();
            count += 1;
            while matches!(self.peek(), Some(' ') | Some('\t')) {
                self.advance();
            }
        }
        if count <= 1 {
            " ".to_string()
        } else {
            "\n".repeat(count - 1)
        }
    }

    fn scan_single_quoted(&mut self, start: Mark) -> Result<Token> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(Error::MalformedScalar {
                        reason: "unterminated single-quoted scalar".to_string(),
                        mark: start,
                    })
                }
                Some('\'') => {
                    if self.peek_at(1) == Some('\'') {
                        self.advance();
                        self.advance();
                        text.push('\'');
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some('\n') => {
                    text.push_str(&self.fold_newlines());
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token {
            data: TokenData::StringSingle(text),
            start_mark: start,
            end_mark: self.mark(),
        })
    }

    fn scan_double_quoted(&mut self, start: Mark) -> Result<Token> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(Error::MalformedScalar {
                        reason: "unterminated double-quoted scalar".to_string(),
                        mark: start,
                    })
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\n') => {
                    text.push_str(&self.fold_newlines());
                }
                Some('\\') => {
                    let escape_mark = self.mark();
                    self.advance();
                    let Some(esc) = self.peek() else {
                        return Err(Error::MalformedScalar {
                            reason: "unterminated escape".to_string(),
                            mark: escape_mark,
                        });
                    };
                    match esc {
                        '\\' => {
                            self.advance();
                            text.push('\\');
                        }
                        '"' => {
                            self.advance();
                            text.push('"');
                        }
                        'n' => {
                            self.advance();
                            text.push('\n');
                        }
                        't' => {
                            self.advance();
                            text.push('\t');
                        }
                        'r' => {
                            self.advance();
                            text.push('\r');
                        }
                        '0' => {
                            self.advance();
                            text.push('\0');
                        }
                        'b' => {
                            self.advance();
                            text.push('\u{8}');
                        }
                        'f' => {
                            self.advance();
                            text.push('\u{c}');
                        }
                        '/' => {
                            self.advance();
                            text.push('/');
                        }
                        '\n' => {
                            // Line continuation: consume the newline and
                            // following leading spaces, emit nothing.
                            self.advance();
                            while matches!(self.peek(), Some(' ') | Some('\t')) {
                                self.advance();
                            }
                        }
                        'x' => {
                            self.advance();
                            let value = self.read_hex(2, escape_mark)?;
                            text.push(
                                char::from_u32(value).ok_or_else(|| Error::MalformedScalar {
                                    reason: "invalid \\x escape".to_string(),
                                    mark: escape_mark,
                                })?,
                            );
                        }
                        'u' => {
                            self.advance();
                            let value = self.read_hex(4, escape_mark)?;
                            text.push(
                                char::from_u32(value).ok_or_else(|| Error::MalformedScalar {
                                    reason: "invalid \\u escape".to_string(),
                                    mark: escape_mark,
                                })?,
                            );
                        }
                        other => {
                            return Err(Error::MalformedScalar {
                                reason: format!("unknown escape \\{other}"),
                                mark: escape_mark,
                            })
                        }
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token {
            data: TokenData::StringDouble(text),
            start_mark: start,
            end_mark: self.mark(),
        })
    }

    fn read_hex(&mut self, digits: usize, mark: Mark) -> Result<u32> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let Some(c) = self.peek() else {
                return Err(Error::MalformedScalar {
                    reason: "truncated hex escape".to_string(),
                    mark,
                });
            };
            let d = c.to_digit(16).ok_or(Error::MalformedScalar {
                reason: format!("invalid hex digit '{c}' in escape"),
                mark,
            })?;
            value = value * 16 + d;
            self.advance();
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<TokenData> {
        let mut stream = TokenStream::new(input);
        let mut out = Vec::new();
        loop {
            let tok = stream.next().unwrap();
            let done = matches!(tok.data, TokenData::EndOfFile);
            out.push(tok.data);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_simple_mapping() {
        let toks = tokens("a: 1\nb: 2\n");
        assert_eq!(
            toks,
            vec![
                TokenData::String("a".into()),
                TokenData::Colon,
                TokenData::String("1".into()),
                TokenData::LineSeparator,
                TokenData::String("b".into()),
                TokenData::Colon,
                TokenData::String("2".into()),
                TokenData::LineSeparator,
                TokenData::EndOfFile,
            ]
        );
    }

    #[test]
    fn recognizes_null_literals() {
        assert_eq!(tokens("~")[0], TokenData::StringNull);
        assert_eq!(tokens("null")[0], TokenData::StringNull);
        assert_eq!(tokens("Null")[0], TokenData::StringNull);
    }

    #[test]
    fn quoted_null_stays_string() {
        let toks = tokens("\"null\"");
        assert_eq!(toks[0], TokenData::StringDouble("null".into()));
        let toks = tokens("'null'");
        assert_eq!(toks[0], TokenData::StringSingle("null".into()));
    }

    #[test]
    fn reuse_returns_same_token() {
        let mut stream = TokenStream::new("a: 1");
        let first = stream.next().unwrap();
        stream.reuse_current();
        let again = stream.next().unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn comment_is_discarded() {
        let toks = tokens("a: 1 # trailing comment\n");
        assert_eq!(
            toks,
            vec![
                TokenData::String("a".into()),
                TokenData::Colon,
                TokenData::String("1".into()),
                TokenData::LineSeparator,
                TokenData::EndOfFile,
            ]
        );
    }

    #[test]
    fn tab_in_indent_fails() {
        let mut stream = TokenStream::new("\ta: 1\n");
        assert!(stream.next().is_err());
    }

    #[test]
    fn double_quote_escapes() {
        let toks = tokens("\"a\\nb\\t\\x41\\u0042\"");
        assert_eq!(toks[0], TokenData::StringDouble("a\nb\tAB".into()));
    }

    #[test]
    fn single_quote_doubled_quote_escape() {
        let toks = tokens("'it''s'");
        assert_eq!(toks[0], TokenData::StringSingle("it's".into()));
    }

    #[test]
    fn block_sequence_flag_only_at_line_start() {
        let toks = tokens("- a\n");
        assert_eq!(toks[0], TokenData::MultilineListFlag);
        let toks = tokens("price: -5\n");
        assert_eq!(toks[2], TokenData::String("-5".into()));
    }
}
