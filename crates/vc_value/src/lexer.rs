use alloc::string::String;
use core::fmt;
use core::iter::FusedIterator;

use crate::{LexError, LexErrorKind, Number};

// -----------------------------------------------------------------------------
// Token

/// A single JSON token, with strings already unescaped.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Colon,
    Comma,
    String(String),
    Number(Number),
    True,
    False,
    Null,
}

/// The payload-free shape of a [`Token`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Colon,
    Comma,
    String,
    Number,
    True,
    False,
    Null,
}

impl Token {
    pub const fn kind(&self) -> TokenKind {
        match self {
            Token::BeginObject => TokenKind::BeginObject,
            Token::EndObject => TokenKind::EndObject,
            Token::BeginArray => TokenKind::BeginArray,
            Token::EndArray => TokenKind::EndArray,
            Token::Colon => TokenKind::Colon,
            Token::Comma => TokenKind::Comma,
            Token::String(_) => TokenKind::String,
            Token::Number(_) => TokenKind::Number,
            Token::True => TokenKind::True,
            Token::False => TokenKind::False,
            Token::Null => TokenKind::Null,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::BeginObject => "`{`",
            TokenKind::EndObject => "`}`",
            TokenKind::BeginArray => "`[`",
            TokenKind::EndArray => "`]`",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::String => "a string",
            TokenKind::Number => "a number",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
        })
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

// -----------------------------------------------------------------------------
// Lexer

/// Splits JSON text into [`Token`]s, lazily.
///
/// The lexer stops for good after the end of input or after the first
/// error; it cannot be restarted.
///
/// ```
/// use vc_value::{Lexer, Token};
///
/// let tokens: Vec<Token> = Lexer::new(r#"[true, "a\n"]"#)
///     .map(|t| t.map(|s| s.token))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(tokens[3], Token::String("a\n".into()));
/// ```
pub struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            finished: false,
        }
    }

    /// Current byte offset.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[cold]
    fn error(&self, kind: LexErrorKind, offset: usize) -> LexError {
        LexError {
            kind,
            offset,
            found: self.text.get(offset..).and_then(|rest| rest.chars().next()),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, LexError> {
        self.skip_whitespace();
        let offset = self.pos;
        let Some(byte) = self.peek() else {
            return Ok(None);
        };

        let token = match byte {
            b'{' => self.punct(Token::BeginObject),
            b'}' => self.punct(Token::EndObject),
            b'[' => self.punct(Token::BeginArray),
            b']' => self.punct(Token::EndArray),
            b':' => self.punct(Token::Colon),
            b',' => self.punct(Token::Comma),
            b'"' => Token::String(self.lex_string()?),
            b'-' | b'0'..=b'9' => Token::Number(self.lex_number()?),
            b't' => self.lex_literal("true", Token::True)?,
            b'f' => self.lex_literal("false", Token::False)?,
            b'n' => self.lex_literal("null", Token::Null)?,
            _ => return Err(self.error(LexErrorKind::UnexpectedCharacter, offset)),
        };

        Ok(Some(Spanned { token, offset }))
    }

    #[inline]
    fn punct(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn lex_literal(&mut self, word: &str, token: Token) -> Result<Token, LexError> {
        if self.bytes[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(token)
        } else {
            Err(self.error(LexErrorKind::InvalidLiteral, self.pos))
        }
    }

    // ---------------------------------------------------------------------
    // Strings

    fn lex_string(&mut self) -> Result<String, LexError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();

        loop {
            // Copy the longest run that needs no decoding. It always ends
            // on an ASCII byte, so the slice is on char boundaries.
            let run = self.pos;
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            out.push_str(&self.text[run..self.pos]);

            match self.peek() {
                None => return Err(self.error(LexErrorKind::UnterminatedString, start)),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => self.lex_escape(&mut out)?,
                Some(_) => return Err(self.error(LexErrorKind::ControlCharacter, self.pos)),
            }
        }
    }

    fn lex_escape(&mut self, out: &mut String) -> Result<(), LexError> {
        let backslash = self.pos;
        self.pos += 1;
        let decoded = match self.peek() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\u{8}',
            Some(b'f') => '\u{c}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => {
                self.pos += 1;
                return self.lex_unicode_escape(backslash, out);
            }
            _ => return Err(self.error(LexErrorKind::InvalidEscape, self.pos)),
        };
        self.pos += 1;
        out.push(decoded);
        Ok(())
    }

    fn lex_unicode_escape(&mut self, backslash: usize, out: &mut String) -> Result<(), LexError> {
        let high = self.read_hex4()?;

        let code = match high {
            0xD800..=0xDBFF => {
                if self.bytes.get(self.pos..self.pos + 2) != Some(&b"\\u"[..]) {
                    return Err(self.error(LexErrorKind::LoneSurrogate, backslash));
                }
                self.pos += 2;
                let low = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error(LexErrorKind::LoneSurrogate, backslash));
                }
                0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(self.error(LexErrorKind::LoneSurrogate, backslash)),
            _ => u32::from(high),
        };

        match char::from_u32(code) {
            Some(c) => {
                out.push(c);
                Ok(())
            }
            None => Err(self.error(LexErrorKind::InvalidUnicodeEscape, backslash)),
        }
    }

    fn read_hex4(&mut self) -> Result<u16, LexError> {
        let mut value = 0u16;
        for _ in 0..4 {
            let digit = match self.peek() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => return Err(self.error(LexErrorKind::InvalidUnicodeEscape, self.pos)),
            };
            value = (value << 4) | u16::from(digit);
            self.pos += 1;
        }
        Ok(value)
    }

    // ---------------------------------------------------------------------
    // Numbers

    /// Returns the number of digits consumed.
    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
        self.pos - start
    }

    fn lex_number(&mut self) -> Result<Number, LexError> {
        let start = self.pos;
        let mut integral = true;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(self.error(LexErrorKind::LeadingZero, start));
                }
            }
            Some(b'1'..=b'9') => {
                self.eat_digits();
            }
            _ => return Err(self.error(LexErrorKind::MissingDigits, self.pos)),
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            integral = false;
            if self.eat_digits() == 0 {
                return Err(self.error(LexErrorKind::MissingDigits, self.pos));
            }
        }

        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            integral = false;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if self.eat_digits() == 0 {
                return Err(self.error(LexErrorKind::MissingDigits, self.pos));
            }
        }

        let literal = &self.text[start..self.pos];

        if integral {
            let exact = if literal.starts_with('-') {
                literal.parse::<i64>().ok().map(Number::from_i64)
            } else {
                literal.parse::<u64>().ok().map(Number::from_u64)
            };
            // Integers beyond 64 bits fall back to a float.
            if let Some(number) = exact {
                return Ok(number);
            }
        }

        literal
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| self.error(LexErrorKind::NumberOutOfRange, start))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Lexer<'_> {}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token};
    use crate::{LexError, LexErrorKind, Number};
    use alloc::vec::Vec;

    fn tokens(text: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(text).map(|t| t.map(|s| s.token)).collect()
    }

    fn lex_error(text: &str) -> LexError {
        tokens(text).unwrap_err()
    }

    #[test]
    fn punctuation_and_literals() {
        assert_eq!(
            tokens(" { } [ ] : , true false null ").unwrap(),
            [
                Token::BeginObject,
                Token::EndObject,
                Token::BeginArray,
                Token::EndArray,
                Token::Colon,
                Token::Comma,
                Token::True,
                Token::False,
                Token::Null,
            ]
        );
    }

    #[test]
    fn offsets_are_bytes() {
        let spans: Vec<usize> = Lexer::new("[\"é\", 1]").map(|t| t.unwrap().offset).collect();
        assert_eq!(spans, [0, 1, 5, 7, 8]);
    }

    #[test]
    fn full_escape_set() {
        let decoded = tokens(r#""\"\\\/\b\f\n\r\tAé""#).unwrap();
        assert_eq!(decoded, [Token::String("\"\\/\u{8}\u{c}\n\r\tAé".into())]);
    }

    #[test]
    fn surrogate_pairs() {
        assert_eq!(tokens(r#""\ud83d\ude00""#).unwrap(), [Token::String("😀".into())]);
        assert_eq!(lex_error(r#""\ud83d""#).kind, LexErrorKind::LoneSurrogate);
        assert_eq!(lex_error(r#""\ude00""#).kind, LexErrorKind::LoneSurrogate);
        assert_eq!(lex_error(r#""\ud83dA""#).kind, LexErrorKind::LoneSurrogate);
    }

    #[test]
    fn string_errors() {
        let e = lex_error(r#"  "abc"#);
        assert_eq!((e.kind, e.offset, e.found), (LexErrorKind::UnterminatedString, 2, Some('"')));

        let e = lex_error(r#""a\qb""#);
        assert_eq!((e.kind, e.offset, e.found), (LexErrorKind::InvalidEscape, 3, Some('q')));

        assert_eq!(lex_error("\"a\nb\"").kind, LexErrorKind::ControlCharacter);
        assert_eq!(lex_error(r#""\u12G4""#).kind, LexErrorKind::InvalidUnicodeEscape);
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("0 -7 42 1.5 -0.25 1e3 18446744073709551615").unwrap(),
            [
                Token::Number(Number::from_u64(0)),
                Token::Number(Number::from_i64(-7)),
                Token::Number(Number::from_u64(42)),
                Token::Number(Number::from_f64(1.5).unwrap()),
                Token::Number(Number::from_f64(-0.25).unwrap()),
                Token::Number(Number::from_f64(1000.0).unwrap()),
                Token::Number(Number::from_u64(u64::MAX)),
            ]
        );
    }

    #[test]
    fn oversized_integer_becomes_float() {
        let tokens = tokens("18446744073709551616").unwrap();
        let [Token::Number(n)] = tokens.as_slice() else {
            panic!("expected one number");
        };
        assert!(n.is_f64());
        assert_eq!(n.as_f64(), 18446744073709551616.0);
    }

    #[test]
    fn malformed_numbers() {
        let e = lex_error("012");
        assert_eq!((e.kind, e.offset), (LexErrorKind::LeadingZero, 0));
        assert_eq!(lex_error("-").kind, LexErrorKind::MissingDigits);
        assert_eq!(lex_error("-x").found, Some('x'));
        assert_eq!(lex_error("1.").kind, LexErrorKind::MissingDigits);
        assert_eq!(lex_error("1.e5").kind, LexErrorKind::MissingDigits);
        assert_eq!(lex_error("2e+").kind, LexErrorKind::MissingDigits);
        assert_eq!(lex_error("1e400").kind, LexErrorKind::NumberOutOfRange);
        assert_eq!(lex_error("+1").kind, LexErrorKind::UnexpectedCharacter);
    }

    #[test]
    fn bad_literal_and_fusing() {
        let mut lexer = Lexer::new("[nul]");
        assert!(lexer.next().unwrap().is_ok());
        let e = lexer.next().unwrap().unwrap_err();
        assert_eq!((e.kind, e.offset, e.found), (LexErrorKind::InvalidLiteral, 1, Some('n')));
        assert!(lexer.next().is_none());
    }
}
