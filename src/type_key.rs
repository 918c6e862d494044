use core::{
    any::{type_name, TypeId},
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

/// Identity token of a `'static` type.
///
/// Two keys compare equal only if they were produced for exactly the same type.
/// There is no notion of subtyping or conversion.
///
/// [`TypeKey::NONE`] is reserved for "no type" and is never equal to a key of any real type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: Option<TypeId>,
    name: &'static str,
}

impl TypeKey {
    /// Key reported by an empty box or an invalid variant.
    pub const NONE: TypeKey = TypeKey {
        id: None,
        name: "<none>",
    };

    /// Returns the key of type `T`.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::TypeKey;
    /// assert_eq!(TypeKey::of::<u32>(), TypeKey::of::<u32>());
    /// assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<i32>());
    /// assert_ne!(TypeKey::of::<()>(), TypeKey::NONE);
    /// ```
    #[inline]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        TypeKey {
            id: Some(TypeId::of::<T>()),
            name: type_name::<T>(),
        }
    }

    /// Returns `true` for [`TypeKey::NONE`].
    #[inline]
    pub fn is_none(&self) -> bool {
        self.id.is_none()
    }

    /// Human readable name of the type.
    /// Only meant for diagnostics, it takes no part in comparisons.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl PartialOrd for TypeKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
