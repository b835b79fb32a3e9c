use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use vc_value::FixedHashState;

use super::type_id_map::TypeIdMap;
use crate::{Describe, DescribeStrategy, JsonError, Object, PublicMembers, TypeDescriptor, TypeInfo, guard};

// -----------------------------------------------------------------------------
// Tables

struct Tables {
    descriptors: TypeIdMap<Arc<TypeDescriptor>>,
    names: HashMap<&'static str, &'static TypeInfo, FixedHashState>,
}

impl Tables {
    const fn new() -> Self {
        Self {
            descriptors: TypeIdMap::new(),
            names: HashMap::with_hasher(FixedHashState),
        }
    }

    // `false` if `name` already maps to another type.
    fn try_add_name(&mut self, name: &'static str, info: &'static TypeInfo) -> bool {
        match self.names.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(info);
                true
            }
            Entry::Occupied(entry) => entry.get().type_id() == info.type_id(),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// The store of type descriptors and wire names.
///
/// Descriptors are produced on demand by the registry's
/// [`DescribeStrategy`] and cached by [`TypeId`]. Wire names map to the
/// [`TypeInfo`] used to construct instances when reading a type tag.
///
/// The registry is shared by reference between concurrent calls. Lookups
/// take a read lock; a descriptor is built outside any lock and inserted
/// under a short write lock.
///
/// # Example
///
/// ```
/// use vc_serial::{AttributePolicy, Describe, TypeRegistry};
///
/// #[derive(Describe, Default)]
/// struct Spoon {
///     #[json(rename = "Size")]
///     pub size: u8,
///     #[json(skip)]
///     pub cache: u8,
/// }
///
/// let registry = TypeRegistry::with_strategy(AttributePolicy::opt_out());
/// let descriptor = registry.describe::<Spoon>().unwrap();
///
/// assert_eq!(descriptor.type_name(), "Spoon");
/// assert_eq!(descriptor.members().len(), 1);
/// assert_eq!(descriptor.members()[0].name(), "Size");
/// ```
pub struct TypeRegistry {
    strategy: Box<dyn DescribeStrategy>,
    tables: RwLock<Tables>,
}

impl TypeRegistry {
    /// An empty registry using [`PublicMembers`].
    #[inline]
    pub fn new() -> Self {
        Self::with_strategy(PublicMembers)
    }

    /// An empty registry using `strategy` for every descriptor it builds.
    pub fn with_strategy(strategy: impl DescribeStrategy) -> Self {
        Self {
            strategy: Box::new(strategy),
            tables: RwLock::new(Tables::new()),
        }
    }

    /// The process-wide registry used by [`JsonOptions::new`].
    ///
    /// Created on first use with [`PublicMembers`]. With the
    /// `auto_register` feature, types marked `#[json(auto_register)]` are
    /// registered at that point.
    ///
    /// [`JsonOptions::new`]: crate::JsonOptions::new
    pub fn global() -> &'static Arc<TypeRegistry> {
        static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let registry = TypeRegistry::new();
            registry.auto_register();
            Arc::new(registry)
        })
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The descriptor of `T`, building and caching it on first use.
    ///
    /// The type's wire name is registered as well, unless it is already
    /// taken by another type.
    #[inline]
    pub fn describe<T: Describe>(&self) -> Result<Arc<TypeDescriptor>, JsonError> {
        self.describe_info(T::type_info())
    }

    /// The descriptor of the runtime type of `object`.
    #[inline]
    pub fn describe_object(&self, object: &dyn Object) -> Result<Arc<TypeDescriptor>, JsonError> {
        self.describe_info(object.object_info())
    }

    /// See [`describe`](Self::describe).
    pub fn describe_info(&self, info: &'static TypeInfo) -> Result<Arc<TypeDescriptor>, JsonError> {
        if let Some(descriptor) = self.read().descriptors.get(&info.type_id()) {
            return Ok(Arc::clone(descriptor));
        }

        let descriptor = Arc::new(self.strategy.describe(info)?);

        let mut tables = self.write();
        // Another thread may have inserted one in the meantime; keep it.
        let descriptor = Arc::clone(
            tables
                .descriptors
                .get_or_insert_with(info.type_id(), || descriptor),
        );
        if !tables.try_add_name(info.type_name(), info) {
            log::debug!(
                "type name `{}` is already taken, `{}` cannot be resolved by name",
                info.type_name(),
                info.type_path(),
            );
        }
        log::debug!(
            "described `{}` with {} members",
            info.type_path(),
            descriptor.len()
        );
        Ok(descriptor)
    }

    /// Describes `T` and registers its wire name.
    ///
    /// Returns `Ok(false)` if the name already maps to another type.
    pub fn register<T: Describe>(&self) -> Result<bool, JsonError> {
        let info = T::type_info();
        self.describe_info(info)?;
        Ok(self.read().names.get(info.type_name()).is_some_and(|i| i.type_id() == info.type_id()))
    }

    /// Associates `name` with `info` for type-tag lookups.
    ///
    /// Returns `Ok(false)`, leaving the registry unchanged, if `name`
    /// already maps to a different type.
    pub fn register_type_name(&self, name: &'static str, info: &'static TypeInfo) -> Result<bool, JsonError> {
        guard::not_empty("name", name)?;
        let added = self.write().try_add_name(name, info);
        if !added {
            log::warn!(
                "type name `{name}` is already registered for another type, `{}` was not added",
                info.type_path()
            );
        }
        Ok(added)
    }

    /// Stores a descriptor built elsewhere, replacing any cached one for
    /// the same type.
    ///
    /// The descriptor is stored in every case. The result tells whether the
    /// type was new: `false` means an earlier descriptor was replaced.
    pub fn register_descriptor(&self, descriptor: TypeDescriptor) -> bool {
        let info = descriptor.type_info();
        let mut tables = self.write();
        let was_new = tables
            .descriptors
            .insert(info.type_id(), Arc::new(descriptor))
            .is_none();
        tables.try_add_name(info.type_name(), info);
        if !was_new {
            log::debug!("replaced the descriptor of `{}`", info.type_path());
        }
        was_new
    }

    /// The type registered under the wire name `name`.
    pub fn resolve_by_name(&self, name: &str) -> Result<&'static TypeInfo, JsonError> {
        self.read()
            .names
            .get(name)
            .copied()
            .ok_or_else(|| JsonError::UnknownType {
                name: name.to_string(),
            })
    }

    /// The cached descriptor for `type_id`, without building one.
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.read().descriptors.get(&type_id).cloned()
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.read().descriptors.contains(&type_id)
    }

    #[inline]
    pub fn contains_name(&self, name: &str) -> bool {
        self.read().names.contains_key(name)
    }

    /// Number of cached descriptors.
    #[inline]
    pub fn len(&self) -> usize {
        self.read().descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot of every cached descriptor, in no particular order.
    pub fn descriptors(&self) -> Vec<Arc<TypeDescriptor>> {
        self.read().descriptors.values().cloned().collect()
    }

    /// Drops every descriptor and wire name.
    pub fn clear(&self) {
        let mut tables = self.write();
        tables.descriptors.clear();
        tables.names.clear();
    }

    /// Registers every type marked `#[json(auto_register)]`.
    ///
    /// Returns how many types were found. Always `0` without the
    /// `auto_register` feature, or on platforms `inventory` does not
    /// support.
    pub fn auto_register(&self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register::{__AutoRegisterFunc, inventory};

            let mut count = 0;
            for func in inventory::iter::<__AutoRegisterFunc> {
                let info = (func.0)();
                match self.describe_info(info) {
                    Ok(_) => count += 1,
                    Err(err) => log::warn!("cannot register `{}`: {err}", info.type_path()),
                }
            }
            count
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.read();
        let mut names: Vec<_> = tables.names.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry")
            .field("descriptors", &tables.descriptors.len())
            .field("names", &names)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
