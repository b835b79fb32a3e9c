use alloc::borrow::Cow;
use alloc::string::String;

use thiserror::Error;
use vc_value::{JsonKind, TextError};

/// Every way a serialization or deserialization call can fail.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum JsonError {
    /// Malformed text, a structural violation or excessive nesting.
    #[error(transparent)]
    Text(#[from] TextError),

    #[error("no type is registered under the name `{name}`")]
    UnknownType { name: String },

    #[error("type extension is enabled but the object has no `$type` member")]
    MissingTypeTag,

    #[error("no target type: none was given and type extension is disabled")]
    AmbiguousTarget,

    /// `member` is a path such as `$.owner.tags[2]`.
    #[error("cannot assign a JSON {json_kind} to `{member}` of type `{target_type}`")]
    Coercion {
        member: String,
        json_kind: JsonKind,
        target_type: Cow<'static, str>,
    },

    #[error("cycle detected while serializing `{type_name}`")]
    CycleDetected { type_name: &'static str },

    #[error("invalid argument `{name}`: {reason}")]
    Argument {
        name: &'static str,
        reason: Cow<'static, str>,
    },

    #[error("cannot write {value} as JSON")]
    NonFiniteNumber { value: f64 },
}

impl JsonError {
    #[inline]
    pub(crate) fn argument(name: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        JsonError::Argument {
            name,
            reason: reason.into(),
        }
    }
}
