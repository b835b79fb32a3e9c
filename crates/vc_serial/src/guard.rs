//! Precondition checks for public entry points.
//!
//! Each check returns [`JsonError::Argument`] instead of panicking, so a bad
//! argument is an ordinary error for the caller.

use alloc::format;

use crate::{JsonError, TYPE_TAG};

/// Fails if `value` is empty.
#[inline]
pub fn not_empty(name: &'static str, value: &str) -> Result<(), JsonError> {
    if value.is_empty() {
        return Err(JsonError::argument(name, "must not be empty"));
    }
    Ok(())
}

/// Fails unless `value > min`.
#[inline]
pub fn bigger_than(name: &'static str, value: usize, min: usize) -> Result<(), JsonError> {
    if value <= min {
        return Err(JsonError::argument(
            name,
            format!("must be bigger than {min}, got {value}"),
        ));
    }
    Ok(())
}

/// Fails if `value` is the reserved type tag key.
#[inline]
pub fn not_reserved(name: &'static str, value: &str) -> Result<(), JsonError> {
    if value == TYPE_TAG {
        return Err(JsonError::argument(
            name,
            format!("`{TYPE_TAG}` is reserved for type extension"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{bigger_than, not_empty, not_reserved};
    use crate::JsonError;

    #[test]
    fn checks() {
        assert!(not_empty("name", "Knife").is_ok());
        assert!(matches!(
            not_empty("name", ""),
            Err(JsonError::Argument { name: "name", .. })
        ));

        assert!(bigger_than("max_depth", 1, 0).is_ok());
        let e = bigger_than("max_depth", 0, 0).unwrap_err();
        assert_eq!(
            alloc::string::ToString::to_string(&e),
            "invalid argument `max_depth`: must be bigger than 0, got 0"
        );

        assert!(not_reserved("member", "type").is_ok());
        assert!(not_reserved("member", "$type").is_err());
    }
}
