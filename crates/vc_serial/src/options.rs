use alloc::sync::Arc;
use core::fmt;

use vc_value::DEFAULT_MAX_DEPTH;

use crate::{JsonError, TypeRegistry, guard};

/// The reserved member carrying an object's registered type name.
///
/// Ordinary members can never use this name.
pub const TYPE_TAG: &str = "$type";

// -----------------------------------------------------------------------------
// JsonOptions

/// Settings for one serialize or deserialize call.
///
/// Options are immutable once built and are passed to every call by
/// reference. Two calls with different settings never affect each other.
///
/// ```
/// use vc_serial::JsonOptions;
///
/// let options = JsonOptions::new().with_type_extension(false).with_pretty(true);
/// assert!(!options.type_extension());
/// assert_eq!(options.max_depth(), 128);
/// ```
#[derive(Clone)]
pub struct JsonOptions {
    type_extension: bool,
    max_depth: usize,
    pretty: bool,
    registry: Arc<TypeRegistry>,
}

impl JsonOptions {
    /// Type extension on, compact output, the global registry.
    pub fn new() -> Self {
        Self {
            type_extension: true,
            max_depth: DEFAULT_MAX_DEPTH,
            pretty: false,
            registry: TypeRegistry::global().clone(),
        }
    }

    /// Emit and honor the [`TYPE_TAG`] member.
    #[inline]
    pub fn with_type_extension(mut self, enabled: bool) -> Self {
        self.type_extension = enabled;
        self
    }

    /// Nesting limit of arrays and objects, for reading and writing.
    /// Must be at least 1.
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[inline]
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[inline]
    pub fn type_extension(&self) -> bool {
        self.type_extension
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub(crate) fn validate(&self) -> Result<(), JsonError> {
        guard::bigger_than("max_depth", self.max_depth, 0)
    }
}

impl Default for JsonOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JsonOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonOptions")
            .field("type_extension", &self.type_extension)
            .field("max_depth", &self.max_depth)
            .field("pretty", &self.pretty)
            .field("registry", &self.registry)
            .finish()
    }
}
