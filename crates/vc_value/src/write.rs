//! Compact and pretty JSON output.
//!
//! [`JsonValue`] implements [`Display`](fmt::Display): `{}` writes compact
//! text and `{:#}` writes pretty text indented by two spaces.
//!
//! ```
//! use vc_value::parse;
//!
//! let value = parse(r#"{"a":[1,2.0]}"#).unwrap();
//! assert_eq!(format!("{value}"), r#"{"a":[1,2.0]}"#);
//! assert_eq!(format!("{value:#}"), "{\n  \"a\": [\n    1,\n    2.0\n  ]\n}");
//! ```

use alloc::string::String;
use core::fmt::{self, Write};

use crate::JsonValue;

const INDENT: &str = "  ";

/// Writes `value` as compact JSON.
#[inline]
pub fn write_compact<W: Write>(out: &mut W, value: &JsonValue) -> fmt::Result {
    write_value(out, value, None)
}

/// Writes `value` as indented JSON.
#[inline]
pub fn write_pretty<W: Write>(out: &mut W, value: &JsonValue) -> fmt::Result {
    write_value(out, value, Some(0))
}

/// Writes `text` as a quoted JSON string literal.
///
/// `"`, `\` and control characters are escaped. Everything else,
/// including non-ASCII, is written as is.
pub fn write_escaped<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    out.write_char('"')?;
    let mut run = 0;
    for (i, byte) in text.bytes().enumerate() {
        let escape = match byte {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0C => "\\f",
            0x00..=0x1F => "",
            _ => continue,
        };
        out.write_str(&text[run..i])?;
        if escape.is_empty() {
            write!(out, "\\u{byte:04x}")?;
        } else {
            out.write_str(escape)?;
        }
        run = i + 1;
    }
    out.write_str(&text[run..])?;
    out.write_char('"')
}

/// `indent` is `None` for compact output, or the current level.
fn write_value<W: Write>(out: &mut W, value: &JsonValue, indent: Option<usize>) -> fmt::Result {
    match value {
        JsonValue::Null => out.write_str("null"),
        JsonValue::Bool(b) => out.write_str(if *b { "true" } else { "false" }),
        JsonValue::Number(n) => write!(out, "{n}"),
        JsonValue::String(s) => write_escaped(out, s),
        JsonValue::Array(items) => {
            if items.is_empty() {
                return out.write_str("[]");
            }
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                newline(out, indent.map(|n| n + 1))?;
                write_value(out, item, indent.map(|n| n + 1))?;
            }
            newline(out, indent)?;
            out.write_char(']')
        }
        JsonValue::Object(map) => {
            if map.is_empty() {
                return out.write_str("{}");
            }
            out.write_char('{')?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                newline(out, indent.map(|n| n + 1))?;
                write_escaped(out, key)?;
                out.write_str(if indent.is_some() { ": " } else { ":" })?;
                write_value(out, item, indent.map(|n| n + 1))?;
            }
            newline(out, indent)?;
            out.write_char('}')
        }
    }
}

fn newline<W: Write>(out: &mut W, indent: Option<usize>) -> fmt::Result {
    if let Some(level) = indent {
        out.write_char('\n')?;
        for _ in 0..level {
            out.write_str(INDENT)?;
        }
    }
    Ok(())
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write_pretty(f, self)
        } else {
            write_compact(f, self)
        }
    }
}

impl JsonValue {
    /// Same as `format!("{self:#}")`.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = write_pretty(&mut out, self);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::write_escaped;
    use crate::{JsonMap, JsonValue, Number, parse};
    use alloc::string::{String, ToString};
    use alloc::vec;

    fn escaped(text: &str) -> String {
        let mut out = String::new();
        write_escaped(&mut out, text).unwrap();
        out
    }

    #[test]
    fn escapes() {
        assert_eq!(escaped("plain"), "\"plain\"");
        assert_eq!(escaped("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(escaped("\n\r\t\u{8}\u{c}"), r#""\n\r\t\b\f""#);
        assert_eq!(escaped("\u{1}x\u{1f}"), r#""\u0001x\u001f""#);
        assert_eq!(escaped("é/😀"), "\"é/😀\"");
    }

    #[test]
    fn numbers_keep_their_kind() {
        let value = JsonValue::Array(vec![
            JsonValue::from(1u8),
            JsonValue::from(-3i64),
            JsonValue::from_f64(1.0).unwrap(),
            JsonValue::from_f64(0.1).unwrap(),
            JsonValue::from_f64(1e300).unwrap(),
            JsonValue::Number(Number::from_u64(u64::MAX)),
        ]);
        let text = value.to_string();
        assert_eq!(text, "[1,-3,1.0,0.1,1e300,18446744073709551615]");
        assert_eq!(parse(&text).unwrap(), value);
    }

    #[test]
    fn compact_and_pretty() {
        let mut map = JsonMap::new();
        map.insert("name", JsonValue::from("Chef"));
        map.insert("tags", JsonValue::Array(vec![]));
        map.insert("inner", JsonValue::Object(JsonMap::new()));
        let value = JsonValue::Object(map);

        assert_eq!(value.to_string(), r#"{"name":"Chef","tags":[],"inner":{}}"#);
        assert_eq!(
            value.to_pretty_string(),
            "{\n  \"name\": \"Chef\",\n  \"tags\": [],\n  \"inner\": {}\n}"
        );
    }

    #[test]
    fn text_round_trip() {
        let text = r#"{"k":["a\u0000b",{"x":null,"y":false}],"z":-0.5}"#;
        let value = parse(text).unwrap();
        assert_eq!(value.to_string(), text);
        assert_eq!(parse(&value.to_pretty_string()).unwrap(), value);
    }
}
