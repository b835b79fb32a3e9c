use alloc::vec::Vec;

use crate::{DepthExceededError, Expected, Found, JsonMap, JsonValue, LexError, Lexer};
use crate::{ParseError, Spanned, TextError, Token};

/// Nesting limit used by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parses a complete JSON document with the default depth limit.
///
/// ```
/// use vc_value::{JsonValue, parse};
///
/// assert_eq!(parse("[1, null]").unwrap(), JsonValue::Array(vec![1.into(), JsonValue::Null]));
/// assert!(parse("[1,]").is_err());
/// ```
#[inline]
pub fn parse(text: &str) -> Result<JsonValue, TextError> {
    Parser::new(text).parse_document()
}

/// Parses a complete JSON document, failing once containers nest deeper
/// than `max_depth`.
#[inline]
pub fn parse_with_depth(text: &str, max_depth: usize) -> Result<JsonValue, TextError> {
    Parser::with_max_depth(text, max_depth).parse_document()
}

// -----------------------------------------------------------------------------
// Parser

/// Recursive-descent parser over a [`Lexer`].
///
/// Recursion depth is the nesting depth of the document, and is bounded
/// by `max_depth`. Each open object or array counts as one level.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Spanned>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    #[inline]
    pub const fn new(text: &'a str) -> Self {
        Self::with_max_depth(text, DEFAULT_MAX_DEPTH)
    }

    pub const fn with_max_depth(text: &'a str, max_depth: usize) -> Self {
        Self {
            lexer: Lexer::new(text),
            peeked: None,
            depth: 0,
            max_depth,
        }
    }

    /// Parses one value and requires that nothing but whitespace follows.
    pub fn parse_document(mut self) -> Result<JsonValue, TextError> {
        let value = self.parse_value()?;
        match self.next_token()? {
            None => Ok(value),
            Some(spanned) => Err(unexpected(spanned, Expected::END_OF_INPUT)),
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, LexError> {
        match self.peeked.take() {
            Some(spanned) => Ok(Some(spanned)),
            None => self.lexer.next().transpose(),
        }
    }

    /// Consumes the next token if it is `token`.
    fn eat(&mut self, token: &Token) -> Result<bool, LexError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next().transpose()?;
        }
        match &self.peeked {
            Some(spanned) if spanned.token == *token => {
                self.peeked = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    #[cold]
    fn unexpected_end(&self, expected: Expected) -> TextError {
        TextError::Parse(ParseError {
            offset: self.lexer.offset(),
            expected,
            found: Found::EndOfInput,
        })
    }

    fn enter(&mut self, offset: usize) -> Result<(), TextError> {
        if self.depth >= self.max_depth {
            return Err(TextError::DepthExceeded(DepthExceededError {
                limit: self.max_depth,
                offset,
            }));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<JsonValue, TextError> {
        let Some(Spanned { token, offset }) = self.next_token()? else {
            return Err(self.unexpected_end(Expected::VALUE));
        };

        match token {
            Token::BeginObject => self.parse_object(offset),
            Token::BeginArray => self.parse_array(offset),
            Token::String(s) => Ok(JsonValue::String(s)),
            Token::Number(n) => Ok(JsonValue::Number(n)),
            Token::True => Ok(JsonValue::Bool(true)),
            Token::False => Ok(JsonValue::Bool(false)),
            Token::Null => Ok(JsonValue::Null),
            token => Err(unexpected(Spanned { token, offset }, Expected::VALUE)),
        }
    }

    fn parse_array(&mut self, offset: usize) -> Result<JsonValue, TextError> {
        self.enter(offset)?;
        let mut items = Vec::new();

        if !self.eat(&Token::EndArray)? {
            loop {
                items.push(self.parse_value()?);
                match self.next_token()? {
                    Some(Spanned {
                        token: Token::Comma,
                        ..
                    }) => {}
                    Some(Spanned {
                        token: Token::EndArray,
                        ..
                    }) => break,
                    Some(other) => return Err(unexpected(other, Expected::COMMA | Expected::END_ARRAY)),
                    None => return Err(self.unexpected_end(Expected::COMMA | Expected::END_ARRAY)),
                }
            }
        }

        self.depth -= 1;
        Ok(JsonValue::Array(items))
    }

    fn parse_object(&mut self, offset: usize) -> Result<JsonValue, TextError> {
        self.enter(offset)?;
        let mut map = JsonMap::new();

        if !self.eat(&Token::EndObject)? {
            loop {
                let key = match self.next_token()? {
                    Some(Spanned {
                        token: Token::String(key),
                        ..
                    }) => key,
                    Some(other) => return Err(unexpected(other, Expected::STRING_KEY)),
                    None => return Err(self.unexpected_end(Expected::STRING_KEY)),
                };

                match self.next_token()? {
                    Some(Spanned {
                        token: Token::Colon,
                        ..
                    }) => {}
                    Some(other) => return Err(unexpected(other, Expected::COLON)),
                    None => return Err(self.unexpected_end(Expected::COLON)),
                }

                let value = self.parse_value()?;
                map.insert(key, value);

                match self.next_token()? {
                    Some(Spanned {
                        token: Token::Comma,
                        ..
                    }) => {}
                    Some(Spanned {
                        token: Token::EndObject,
                        ..
                    }) => break,
                    Some(other) => return Err(unexpected(other, Expected::COMMA | Expected::END_OBJECT)),
                    None => return Err(self.unexpected_end(Expected::COMMA | Expected::END_OBJECT)),
                }
            }
        }

        self.depth -= 1;
        Ok(JsonValue::Object(map))
    }
}

#[cold]
fn unexpected(spanned: Spanned, expected: Expected) -> TextError {
    TextError::Parse(ParseError {
        offset: spanned.offset,
        expected,
        found: Found::Token(spanned.token.kind()),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse, parse_with_depth};
    use crate::{DepthExceededError, Expected, Found, JsonValue, LexErrorKind, TextError, TokenKind};
    use alloc::string::String;
    use alloc::vec;

    fn parse_error(text: &str) -> (usize, Expected, Found) {
        match parse(text) {
            Err(TextError::Parse(e)) => (e.offset, e.expected, e.found),
            other => panic!("expected a parse error for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn nested_document() {
        let value = parse(r#" {"a": [1, -2.5, "x"], "b": {"c": null, "d": true}} "#).unwrap();
        let a = value.get("a").and_then(JsonValue::as_array).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a[1].as_f64(), Some(-2.5));
        assert_eq!(value.get("b").and_then(|b| b.get("d")), Some(&JsonValue::Bool(true)));
        assert_eq!(parse("[]").unwrap(), JsonValue::Array(vec![]));
        assert_eq!(parse("{}").unwrap().as_object().map(|m| m.len()), Some(0));
    }

    #[test]
    fn duplicate_keys_overwrite_in_place() {
        let value = parse(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.keys().collect::<vec::Vec<_>>(), ["a", "b"]);
        assert_eq!(map.get("a"), Some(&JsonValue::from(3)));
    }

    #[test]
    fn structural_errors() {
        assert_eq!(
            parse_error(r#"{"a" 1}"#),
            (5, Expected::COLON, Found::Token(TokenKind::Number))
        );
        assert_eq!(
            parse_error("[1,]"),
            (3, Expected::VALUE, Found::Token(TokenKind::EndArray))
        );
        assert_eq!(
            parse_error(r#"{"a":1,}"#),
            (7, Expected::STRING_KEY, Found::Token(TokenKind::EndObject))
        );
        assert_eq!(
            parse_error("[1 2]"),
            (3, Expected::COMMA | Expected::END_ARRAY, Found::Token(TokenKind::Number))
        );
        assert_eq!(parse_error("[1"), (2, Expected::COMMA | Expected::END_ARRAY, Found::EndOfInput));
        assert_eq!(parse_error(""), (0, Expected::VALUE, Found::EndOfInput));
        assert_eq!(
            parse_error("{1:2}"),
            (1, Expected::STRING_KEY, Found::Token(TokenKind::Number))
        );
        assert_eq!(
            parse_error("1 2"),
            (2, Expected::END_OF_INPUT, Found::Token(TokenKind::Number))
        );
        assert_eq!(parse_error("]"), (0, Expected::VALUE, Found::Token(TokenKind::EndArray)));
    }

    #[test]
    fn lex_errors_pass_through() {
        match parse(r#"["ok", tru]"#) {
            Err(TextError::Lex(e)) => {
                assert_eq!(e.kind, LexErrorKind::InvalidLiteral);
                assert_eq!(e.offset, 7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn depth_guard() {
        let mut deep = String::new();
        for _ in 0..100_000 {
            deep.push('[');
        }
        for _ in 0..100_000 {
            deep.push(']');
        }

        assert_eq!(
            parse(&deep),
            Err(TextError::DepthExceeded(DepthExceededError { limit: 128, offset: 128 }))
        );

        assert!(parse_with_depth("[[[]]]", 3).is_ok());
        assert!(matches!(
            parse_with_depth(r#"[{"a":[]}]"#, 2),
            Err(TextError::DepthExceeded(DepthExceededError { limit: 2, offset: 6 }))
        ));
    }

    #[test]
    fn error_messages() {
        let message = alloc::string::ToString::to_string(&parse("[1 2]").unwrap_err());
        assert_eq!(message, "expected `,` or `]` at byte 3, found a number");
    }
}
