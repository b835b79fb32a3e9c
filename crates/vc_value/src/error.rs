use core::fmt;

use bitflags::bitflags;
use thiserror::Error;

use crate::TokenKind;

// -----------------------------------------------------------------------------
// LexError

/// What went wrong while reading a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedCharacter,
    UnterminatedString,
    /// A raw control character (below U+0020) inside a string.
    ControlCharacter,
    InvalidEscape,
    InvalidUnicodeEscape,
    /// A `\uXXXX` surrogate without its other half.
    LoneSurrogate,
    LeadingZero,
    /// No digit after a sign, a decimal point or an exponent marker.
    MissingDigits,
    /// A word starting like `true`, `false` or `null` that is none of them.
    InvalidLiteral,
    /// A float literal too large for `f64`.
    NumberOutOfRange,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LexErrorKind::UnexpectedCharacter => "unexpected character",
            LexErrorKind::UnterminatedString => "unterminated string",
            LexErrorKind::ControlCharacter => "control character in string",
            LexErrorKind::InvalidEscape => "invalid escape sequence",
            LexErrorKind::InvalidUnicodeEscape => "invalid unicode escape",
            LexErrorKind::LoneSurrogate => "unpaired surrogate in unicode escape",
            LexErrorKind::LeadingZero => "number with leading zero",
            LexErrorKind::MissingDigits => "number with missing digits",
            LexErrorKind::InvalidLiteral => "invalid literal",
            LexErrorKind::NumberOutOfRange => "number out of range",
        })
    }
}

/// A malformed token.
///
/// `offset` is the byte offset in the input. `found` is the character at
/// that offset, or `None` at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at byte {offset}, found {}", FoundChar(.found))]
pub struct LexError {
    pub kind: LexErrorKind,
    pub offset: usize,
    pub found: Option<char>,
}

struct FoundChar<'a>(&'a Option<char>);

impl fmt::Display for FoundChar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(c) => write!(f, "{c:?}"),
            None => f.write_str("end of input"),
        }
    }
}

// -----------------------------------------------------------------------------
// ParseError

bitflags! {
    /// The set of tokens the parser would have accepted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Expected: u8 {
        const VALUE        = 1 << 0;
        const STRING_KEY   = 1 << 1;
        const COLON        = 1 << 2;
        const COMMA        = 1 << 3;
        const END_OBJECT   = 1 << 4;
        const END_ARRAY    = 1 << 5;
        const END_OF_INPUT = 1 << 6;
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Expected, &str); 7] = [
            (Expected::VALUE, "a value"),
            (Expected::STRING_KEY, "a string key"),
            (Expected::COLON, "`:`"),
            (Expected::COMMA, "`,`"),
            (Expected::END_OBJECT, "`}`"),
            (Expected::END_ARRAY, "`]`"),
            (Expected::END_OF_INPUT, "end of input"),
        ];

        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" or ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// What the parser saw instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Token(TokenKind),
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Token(kind) => fmt::Display::fmt(kind, f),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// A structural violation: well-formed tokens in an invalid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} at byte {offset}, found {found}")]
pub struct ParseError {
    pub offset: usize,
    pub expected: Expected,
    pub found: Found,
}

// -----------------------------------------------------------------------------
// DepthExceededError

/// Nesting went deeper than the configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("nesting depth exceeds the limit of {limit} at byte {offset}")]
pub struct DepthExceededError {
    pub limit: usize,
    pub offset: usize,
}

// -----------------------------------------------------------------------------
// TextError

/// Any failure turning text into a [`JsonValue`](crate::JsonValue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    DepthExceeded(#[from] DepthExceededError),
}

impl TextError {
    /// Byte offset of the failure.
    pub const fn offset(&self) -> usize {
        match self {
            TextError::Lex(e) => e.offset,
            TextError::Parse(e) => e.offset,
            TextError::DepthExceeded(e) => e.offset,
        }
    }
}
