use core::{fmt, marker::PhantomData, mem};

use crate::{
    alternatives::{Alternatives, CloneAlternatives, Index, Member},
    macros::trace_event,
    storage::InlineStorage,
    TypeKey, TypeMismatch,
};

// Tag of a variant that holds no live value.
const INVALID: usize = usize::MAX;

/// Tagged union over the closed list of alternatives `L`.
///
/// `L` is a tuple of types, e.g. `Variant<(i32, String)>`.
/// The active alternative lives inline, in storage sized and aligned for the largest alternative.
/// No heap allocation is ever performed by the variant itself.
///
/// Methods that name an alternative take the type and an inferred position,
/// e.g. `variant.get::<String, _>()`. Naming a type that is not in `L` does not compile.
///
/// # Example
///
/// ```
/// # use anyvar::Variant;
/// let mut v: Variant<(i32, String)> = Variant::default();
/// assert_eq!(v.get::<i32, _>(), Ok(&0));
///
/// v.emplace(String::from("hi"));
/// assert_eq!(v.get::<String, _>().unwrap(), "hi");
/// assert!(v.get::<i32, _>().is_err());
/// ```
pub struct Variant<L: Alternatives> {
    tag: usize,
    storage: InlineStorage<L::Storage>,
    marker: PhantomData<L>,
}

impl<L: Alternatives> Drop for Variant<L> {
    #[inline]
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<L> Default for Variant<L>
where
    L: Alternatives,
    L::First: Member<L, Index<0>> + Default,
{
    /// Holds the default value of the first alternative.
    #[inline]
    fn default() -> Self {
        Variant::new::<L::First, Index<0>>(L::First::default())
    }
}

impl<L: CloneAlternatives> Clone for Variant<L> {
    /// Clones the active alternative into a new variant.
    /// Clone of an invalid variant is invalid.
    fn clone(&self) -> Self {
        let mut cloned = Variant::invalid();

        if let Some(index) = self.index() {
            // Safety: Active alternative is `index`, `cloned.storage` is unoccupied.
            unsafe {
                L::clone_table().clone_at(index, &self.storage, &mut cloned.storage);
            }
            cloned.tag = index;
        }

        cloned
    }
}

impl<L: Alternatives> fmt::Debug for Variant<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("index", &self.index())
            .field("type", &self.type_key())
            .finish()
    }
}

impl<L: Alternatives> Variant<L> {
    /// Size of the inline storage, at least the size of the largest alternative.
    pub const STORAGE_SIZE: usize = InlineStorage::<L::Storage>::SIZE;

    /// Alignment of the inline storage, equal to the largest alignment among alternatives.
    pub const STORAGE_ALIGN: usize = InlineStorage::<L::Storage>::ALIGN;

    #[inline]
    const fn invalid() -> Self {
        Variant {
            tag: INVALID,
            storage: InlineStorage::new(),
            marker: PhantomData,
        }
    }

    /// Construct new [`Variant`] holding the given alternative.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::Variant;
    /// let v = Variant::<(u8, &'static str)>::new("hello");
    ///
    /// assert!(v.is::<&str, _>());
    /// assert_eq!(v.index(), Some(1));
    /// ```
    #[inline]
    pub fn new<T, I>(value: T) -> Self
    where
        T: Member<L, I>,
    {
        let mut variant = Variant::invalid();
        variant.write(value);
        variant
    }

    // Writes `value` into unoccupied storage and activates it.
    #[inline]
    fn write<T, I>(&mut self, value: T) -> &mut T
    where
        T: Member<L, I>,
    {
        debug_assert!(!self.valid());
        trace_event!(ty = %TypeKey::of::<T>(), index = T::POSITION, "constructed alternative");

        let slot = self.storage.as_mut::<T>().write(value);
        self.tag = T::POSITION;
        slot
    }

    // Drops the active alternative, if any, leaving the variant invalid.
    // Tag is cleared first, so a panicking drop never leaves the variant
    // pointing at a dropped value.
    #[inline]
    fn destroy(&mut self) {
        if let Some(index) = self.index() {
            self.tag = INVALID;
            trace_event!(ty = %L::dispatch().type_key(index), index, "destroyed alternative");

            // Safety: Alternative `index` was active.
            unsafe {
                L::dispatch().drop_in_place(index, &mut self.storage);
            }
        }
    }

    /// Returns `true` unless the variant was left without a live value.
    ///
    /// That only happens to the source of [`Variant::take`],
    /// or when dropping the old value in [`Variant::emplace`] panicked.
    #[inline]
    pub fn valid(&self) -> bool {
        self.tag != INVALID
    }

    /// Returns position of the active alternative in `L`.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        if self.valid() {
            debug_assert!(self.tag < L::dispatch().len());
            Some(self.tag)
        } else {
            None
        }
    }

    /// Returns the type key of the active alternative.
    /// Returns [`TypeKey::NONE`] if the variant is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::{TypeKey, Variant};
    /// let v = Variant::<(u8, u16)>::new(7u16);
    ///
    /// assert_eq!(v.type_key(), TypeKey::of::<u16>());
    /// ```
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        match self.index() {
            Some(index) => L::dispatch().type_key(index),
            None => TypeKey::NONE,
        }
    }

    /// Returns `true` if the active alternative is `T`.
    ///
    /// Compares type identity, so in a list that repeats `T`
    /// any position holding `T` matches.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::{Index, Variant};
    /// let v = Variant::<(u8, u8)>::new::<u8, Index<1>>(7);
    ///
    /// assert!(v.is::<u8, Index<0>>());
    /// assert_eq!(v.get::<u8, Index<0>>(), Ok(&7));
    /// assert_eq!(v.index(), Some(1));
    /// ```
    #[inline]
    pub fn is<T, I>(&self) -> bool
    where
        T: Member<L, I>,
    {
        self.tag == T::POSITION || (self.valid() && self.type_key() == TypeKey::of::<T>())
    }

    /// Returns some reference to the active alternative if it is `T`.
    /// Otherwise returns none.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::Variant;
    /// let v = Variant::<(u8, u16)>::new(7u8);
    ///
    /// assert_eq!(v.try_get::<u8, _>(), Some(&7));
    /// assert_eq!(v.try_get::<u16, _>(), None);
    /// ```
    #[inline]
    pub fn try_get<T, I>(&self) -> Option<&T>
    where
        T: Member<L, I>,
    {
        if self.is::<T, I>() {
            // Safety: `T` is active. Every alternative starts at offset 0.
            Some(unsafe { self.storage.as_ref::<T>().assume_init_ref() })
        } else {
            None
        }
    }

    /// Returns some mutable reference to the active alternative if it is `T`.
    /// Otherwise returns none.
    #[inline]
    pub fn try_get_mut<T, I>(&mut self) -> Option<&mut T>
    where
        T: Member<L, I>,
    {
        if self.is::<T, I>() {
            // Safety: `T` is active. Every alternative starts at offset 0.
            Some(unsafe { self.storage.as_mut::<T>().assume_init_mut() })
        } else {
            None
        }
    }

    /// Returns reference to the active alternative if it is `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] if another alternative is active or the variant is invalid.
    #[inline]
    pub fn get<T, I>(&self) -> Result<&T, TypeMismatch>
    where
        T: Member<L, I>,
    {
        self.try_get::<T, I>()
            .ok_or_else(|| TypeMismatch::new::<T>(self.type_key()))
    }

    /// Returns mutable reference to the active alternative if it is `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] if another alternative is active or the variant is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::Variant;
    /// let mut v = Variant::<(u32, Vec<u32>)>::new(vec![1]);
    ///
    /// v.get_mut::<Vec<u32>, _>().unwrap().push(2);
    /// assert_eq!(v.get::<Vec<u32>, _>().unwrap(), &[1, 2]);
    /// assert!(v.get_mut::<u32, _>().is_err());
    /// ```
    #[inline]
    pub fn get_mut<T, I>(&mut self) -> Result<&mut T, TypeMismatch>
    where
        T: Member<L, I>,
    {
        if !self.is::<T, I>() {
            return Err(TypeMismatch::new::<T>(self.type_key()));
        }

        // Safety: `T` is active.
        Ok(unsafe { self.storage.as_mut::<T>().assume_init_mut() })
    }

    /// Replaces the active alternative with `value`.
    /// Returns mutable reference to the new value.
    ///
    /// The old value is dropped before the new one is written.
    /// If dropping it panics, the variant is left invalid.
    #[inline]
    pub fn emplace<T, I>(&mut self, value: T) -> &mut T
    where
        T: Member<L, I>,
    {
        self.destroy();
        self.write(value)
    }

    /// Replaces the active alternative with value produced by `f`.
    ///
    /// The value is produced before the old one is touched,
    /// so if `f` panics the variant is left unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::Variant;
    /// let mut v: Variant<(i32, String)> = Variant::default();
    ///
    /// v.emplace_with(|| "abc".repeat(2));
    /// assert_eq!(v.get::<String, _>().unwrap(), "abcabc");
    /// ```
    #[inline]
    pub fn emplace_with<T, I, F>(&mut self, f: F) -> &mut T
    where
        T: Member<L, I>,
        F: FnOnce() -> T,
    {
        let value = f();
        self.emplace(value)
    }

    /// Moves the active alternative into a new variant, leaving this one invalid.
    /// The value is moved bitwise, nothing is cloned or dropped.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::Variant;
    /// let mut v = Variant::<(i32, String)>::new(String::from("moved"));
    /// let w = v.take();
    ///
    /// assert!(!v.valid());
    /// assert_eq!(w.get::<String, _>().unwrap(), "moved");
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        Variant {
            tag: mem::replace(&mut self.tag, INVALID),
            storage: mem::replace(&mut self.storage, InlineStorage::new()),
            marker: PhantomData,
        }
    }

    /// Returns the active alternative if it is `T`.
    /// Otherwise return self back.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::Variant;
    /// let v = Variant::<(i32, String)>::new(5i32);
    ///
    /// let v = v.into_inner::<String, _>().unwrap_err();
    /// assert_eq!(v.into_inner::<i32, _>().unwrap(), 5);
    /// ```
    #[inline]
    pub fn into_inner<T, I>(mut self) -> Result<T, Self>
    where
        T: Member<L, I>,
    {
        if !self.is::<T, I>() {
            return Err(self);
        }

        self.tag = INVALID;

        // Safety: `T` was active, tag is cleared so drop won't touch it again.
        Ok(unsafe { self.storage.as_ref::<T>().assume_init_read() })
    }
}
