use core::{fmt, marker::PhantomData, mem, ptr::NonNull};

use alloc::boxed::Box;

use crate::{macros::trace_event, TypeKey, TypeMismatch};

unsafe fn drop_boxed<T>(ptr: NonNull<u8>) {
    // Safety: It was created from `Box<T>`.
    drop(unsafe { Box::from_raw(ptr.cast::<T>().as_ptr()) });
}

unsafe fn clone_boxed<T: Clone>(ptr: NonNull<u8>) -> NonNull<u8> {
    // Safety: It was created from `Box<T>` and is still alive.
    let value: &T = unsafe { ptr.cast::<T>().as_ref() };
    into_raw(Box::new(value.clone()))
}

fn into_raw<T>(boxed: Box<T>) -> NonNull<u8> {
    // Safety: `Box::into_raw` never returns null.
    unsafe { NonNull::new_unchecked(Box::into_raw(boxed)) }.cast()
}

// Virtual table to operate on the heap holder.
struct VTable {
    type_key: fn() -> TypeKey,
    drop: unsafe fn(NonNull<u8>),
    clone: unsafe fn(NonNull<u8>) -> NonNull<u8>,
}

impl VTable {
    #[inline(always)]
    fn of<T: Clone + 'static>() -> &'static VTable {
        const {
            &VTable {
                type_key: TypeKey::of::<T>,
                drop: drop_boxed::<T>,
                clone: clone_boxed::<T>,
            }
        }
    }
}

// Heap allocated value together with the table of its type.
struct RawHolder {
    vtable: &'static VTable,
    ptr: NonNull<u8>,
}

impl RawHolder {
    #[inline]
    fn from_box<T: Clone + 'static>(boxed: Box<T>) -> Self {
        trace_event!(ty = %TypeKey::of::<T>(), "allocated holder");

        RawHolder {
            vtable: VTable::of::<T>(),
            ptr: into_raw(boxed),
        }
    }

    #[inline]
    fn type_key(&self) -> TypeKey {
        (self.vtable.type_key)()
    }

    /// # Safety
    ///
    /// Holder must store a value of type `T`.
    #[inline]
    unsafe fn into_box<T>(self) -> Box<T> {
        trace_event!(ty = %self.type_key(), "released holder");
        unsafe { Box::from_raw(self.ptr.cast::<T>().as_ptr()) }
    }

    #[inline]
    fn release(self) {
        trace_event!(ty = %self.type_key(), "released holder");

        // Safety: `vtable` was created for the type stored behind `ptr`
        // and the holder is consumed, so it is dropped only once.
        unsafe { (self.vtable.drop)(self.ptr) }
    }
}

impl Clone for RawHolder {
    #[inline]
    fn clone(&self) -> Self {
        trace_event!(ty = %self.type_key(), "cloned holder");

        RawHolder {
            vtable: self.vtable,
            // Safety: `vtable` was created for the type stored behind `ptr`.
            ptr: unsafe { (self.vtable.clone)(self.ptr) },
        }
    }
}

/// Heap-allocated type-erased value with value semantics.
/// Cloning deep-copies the stored value.
/// Stored types may not implement `Send` and `Sync`.
/// For thread-safe version see [`AnyBox`].
pub struct LocalAnyBox {
    raw: Option<RawHolder>,
    unsend: PhantomData<*mut u8>,
}

impl Drop for LocalAnyBox {
    #[inline(always)]
    fn drop(&mut self) {
        self.reset();
    }
}

impl Clone for LocalAnyBox {
    #[inline]
    fn clone(&self) -> Self {
        LocalAnyBox {
            raw: self.raw.clone(),
            unsend: PhantomData,
        }
    }
}

impl Default for LocalAnyBox {
    #[inline(always)]
    fn default() -> Self {
        LocalAnyBox::empty()
    }
}

impl fmt::Debug for LocalAnyBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAnyBox")
            .field("type", &self.type_key())
            .finish()
    }
}

impl From<AnyBox> for LocalAnyBox {
    #[inline(always)]
    fn from(value: AnyBox) -> Self {
        value.inner
    }
}

impl LocalAnyBox {
    /// Construct new empty [`LocalAnyBox`].
    /// No allocation is performed.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::{LocalAnyBox, TypeKey};
    /// let a = LocalAnyBox::empty();
    ///
    /// assert!(!a.has_value());
    /// assert_eq!(a.type_key(), TypeKey::NONE);
    /// ```
    #[inline]
    pub const fn empty() -> Self {
        LocalAnyBox {
            raw: None,
            unsend: PhantomData,
        }
    }

    /// Construct new [`LocalAnyBox`] with the given value.
    ///
    /// Type of value may not implement `Send` or `Sync`.
    /// But [`LocalAnyBox`] itself does not implement `Send` and `Sync`.
    /// For `Send` and `Sync` container see [`AnyBox`].
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// use std::rc::Rc;
    ///
    /// let a = LocalAnyBox::new(Rc::new(42u32));
    ///
    /// assert_eq!(**a.try_get::<Rc<u32>>().unwrap(), 42);
    /// ```
    #[inline]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + 'static,
    {
        LocalAnyBox::from_box(Box::new(value))
    }

    /// Construct new [`LocalAnyBox`] from the given boxed value.
    /// The allocation is reused, no additional allocation is performed.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let boxed = Box::new([1u32; 42]);
    ///
    /// let a = LocalAnyBox::from_box(boxed);
    ///
    /// assert_eq!(a.try_get::<[u32; 42]>().unwrap(), &[1u32; 42]);
    /// ```
    #[inline]
    pub fn from_box<T>(boxed: Box<T>) -> Self
    where
        T: Clone + 'static,
    {
        LocalAnyBox {
            raw: Some(RawHolder::from_box(boxed)),
            unsend: PhantomData,
        }
    }

    /// Construct new [`LocalAnyBox`] with value produced by `f`.
    ///
    /// Memory is allocated first and the value is written straight into it.
    /// If `f` panics the allocation is released.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let a = LocalAnyBox::new_with(|| vec![7u8; 3]);
    ///
    /// assert_eq!(a.try_get::<Vec<u8>>().unwrap(), &[7, 7, 7]);
    /// ```
    #[inline]
    pub fn new_with<T, F>(f: F) -> Self
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let mut uninit = Box::<T>::new_uninit();
        uninit.write(f());

        // Safety: Value was written above.
        LocalAnyBox::from_box(unsafe { uninit.assume_init() })
    }

    /// Returns `true` if the box holds a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.raw.is_some()
    }

    /// Returns the type key of the stored value.
    /// Returns [`TypeKey::NONE`] if the box is empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::{LocalAnyBox, TypeKey};
    /// let a = LocalAnyBox::new(42u32);
    ///
    /// assert_eq!(a.type_key(), TypeKey::of::<u32>());
    /// ```
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        match &self.raw {
            Some(raw) => raw.type_key(),
            None => TypeKey::NONE,
        }
    }

    /// Returns `true` if the stored value is of type `T`.
    /// Always `false` for empty box.
    #[inline]
    pub fn is<T>(&self) -> bool
    where
        T: 'static,
    {
        self.type_key() == TypeKey::of::<T>()
    }

    /// Releases the stored value.
    /// Does nothing if the box is already empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let mut a = LocalAnyBox::new(42u32);
    ///
    /// a.reset();
    /// assert!(!a.has_value());
    ///
    /// a.reset();
    /// assert!(!a.has_value());
    /// ```
    #[inline]
    pub fn reset(&mut self) {
        if let Some(raw) = self.raw.take() {
            raw.release();
        }
    }

    /// Replaces the stored value with `value`.
    /// Returns mutable reference to the new value.
    ///
    /// The box holds the new value even if dropping the old one panics.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let mut a = LocalAnyBox::new(42u32);
    ///
    /// a.emplace(String::from("hello")).push('!');
    /// assert_eq!(a.try_get::<String>().unwrap(), "hello!");
    /// assert!(!a.is::<u32>());
    /// ```
    #[inline]
    pub fn emplace<T>(&mut self, value: T) -> &mut T
    where
        T: Clone + 'static,
    {
        let raw = RawHolder::from_box(Box::new(value));
        let ptr = raw.ptr;

        // New holder is owned by the box before the old value is dropped.
        if let Some(old) = self.raw.replace(raw) {
            old.release();
        }

        // Safety: `ptr` points to the `T` just stored and is borrowed through `self`.
        unsafe { &mut *ptr.cast::<T>().as_ptr() }
    }

    /// Moves the stored value into a new box, leaving this one empty.
    /// Only ownership of the allocation is transferred.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let mut a = LocalAnyBox::new(42u32);
    /// let b = a.take();
    ///
    /// assert!(!a.has_value());
    /// assert_eq!(b.try_get::<u32>(), Some(&42));
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        LocalAnyBox {
            raw: self.raw.take(),
            unsend: PhantomData,
        }
    }

    /// Swaps stored values of two boxes without touching the values themselves.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.raw, &mut other.raw);
    }

    /// Returns some reference to the stored value if it is of type `T`.
    /// Otherwise returns none.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let a = LocalAnyBox::new(42u32);
    ///
    /// assert_eq!(a.try_get::<u32>(), Some(&42));
    /// assert_eq!(a.try_get::<u64>(), None);
    /// assert_eq!(LocalAnyBox::empty().try_get::<u32>(), None);
    /// ```
    #[inline]
    pub fn try_get<T>(&self) -> Option<&T>
    where
        T: 'static,
    {
        match &self.raw {
            // Safety: Type is checked.
            Some(raw) if raw.type_key() == TypeKey::of::<T>() => {
                Some(unsafe { raw.ptr.cast::<T>().as_ref() })
            }
            _ => None,
        }
    }

    /// Returns some mutable reference to the stored value if it is of type `T`.
    /// Otherwise returns none.
    #[inline]
    pub fn try_get_mut<T>(&mut self) -> Option<&mut T>
    where
        T: 'static,
    {
        match &mut self.raw {
            // Safety: Type is checked.
            Some(raw) if raw.type_key() == TypeKey::of::<T>() => {
                Some(unsafe { raw.ptr.cast::<T>().as_mut() })
            }
            _ => None,
        }
    }

    /// Returns reference to the stored value if it is of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] if the box is empty or holds another type.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let a = LocalAnyBox::new(12i32);
    ///
    /// assert_eq!(a.get::<i32>(), Ok(&12));
    /// assert!(a.get::<String>().is_err());
    /// ```
    #[inline]
    pub fn get<T>(&self) -> Result<&T, TypeMismatch>
    where
        T: 'static,
    {
        self.try_get::<T>()
            .ok_or_else(|| TypeMismatch::new::<T>(self.type_key()))
    }

    /// Returns mutable reference to the stored value if it is of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] if the box is empty or holds another type.
    #[inline]
    pub fn get_mut<T>(&mut self) -> Result<&mut T, TypeMismatch>
    where
        T: 'static,
    {
        let found = self.type_key();
        self.try_get_mut::<T>()
            .ok_or_else(|| TypeMismatch::new::<T>(found))
    }

    /// Moves the stored value out if it is of type `T`, leaving the box empty.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] if the box is empty or holds another type.
    /// The box is left untouched in that case.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let mut a = LocalAnyBox::new(String::from("hi"));
    ///
    /// assert!(a.take_value::<u32>().is_err());
    /// assert!(a.has_value());
    ///
    /// assert_eq!(a.take_value::<String>().unwrap(), "hi");
    /// assert!(!a.has_value());
    /// ```
    #[inline]
    pub fn take_value<T>(&mut self) -> Result<T, TypeMismatch>
    where
        T: 'static,
    {
        match self.raw.take() {
            Some(raw) if raw.type_key() == TypeKey::of::<T>() => {
                // Safety: Type is checked.
                Ok(*unsafe { raw.into_box::<T>() })
            }
            raw => {
                self.raw = raw;
                Err(TypeMismatch::new::<T>(self.type_key()))
            }
        }
    }

    /// Returns the stored value if it is of type `T`.
    /// Otherwise return self back.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::LocalAnyBox;
    /// let a = LocalAnyBox::new(42u32);
    ///
    /// let Ok(a) = a.downcast::<u32>() else {
    ///    panic!();
    /// };
    /// assert_eq!(a, 42);
    /// ```
    #[inline]
    pub fn downcast<T>(mut self) -> Result<T, LocalAnyBox>
    where
        T: 'static,
    {
        match self.take_value::<T>() {
            Ok(value) => Ok(value),
            Err(_) => Err(self),
        }
    }
}

/// Heap-allocated type-erased value with value semantics.
/// Cloning deep-copies the stored value.
/// Requires `Send` and `Sync`.
/// For thread-local version see [`LocalAnyBox`].
#[derive(Clone, Default)]
pub struct AnyBox {
    inner: LocalAnyBox,
}

// Safety: Only `Send + Sync` values are ever stored.
unsafe impl Send for AnyBox {}
unsafe impl Sync for AnyBox {}

impl fmt::Debug for AnyBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyBox")
            .field("type", &self.type_key())
            .finish()
    }
}

impl AnyBox {
    /// Construct new empty [`AnyBox`].
    /// No allocation is performed.
    #[inline]
    pub const fn empty() -> Self {
        AnyBox {
            inner: LocalAnyBox::empty(),
        }
    }

    /// Construct new [`AnyBox`] with the given value.
    ///
    /// Type of value must implement both `Send` and `Sync`.
    /// And [`AnyBox`] itself implement `Send` and `Sync`.
    /// For types that do not implement `Send` or `Sync`, use [`LocalAnyBox`].
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::AnyBox;
    /// let a = AnyBox::new(12i32);
    ///
    /// assert_eq!(a.get::<i32>(), Ok(&12));
    /// ```
    #[inline]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        AnyBox {
            inner: LocalAnyBox::new(value),
        }
    }

    /// Construct new [`AnyBox`] from the given boxed value.
    /// The allocation is reused, no additional allocation is performed.
    #[inline]
    pub fn from_box<T>(boxed: Box<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        AnyBox {
            inner: LocalAnyBox::from_box(boxed),
        }
    }

    /// Construct new [`AnyBox`] with value produced by `f`.
    ///
    /// Memory is allocated first and the value is written straight into it.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::AnyBox;
    /// let a = AnyBox::new_with(|| String::from("built in place"));
    ///
    /// assert_eq!(a.get::<String>().unwrap(), "built in place");
    /// ```
    #[inline]
    pub fn new_with<T, F>(f: F) -> Self
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        AnyBox {
            inner: LocalAnyBox::new_with(f),
        }
    }

    /// Returns `true` if the box holds a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.inner.has_value()
    }

    /// Returns the type key of the stored value.
    /// Returns [`TypeKey::NONE`] if the box is empty.
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.inner.type_key()
    }

    /// Returns `true` if the stored value is of type `T`.
    /// Always `false` for empty box.
    #[inline]
    pub fn is<T>(&self) -> bool
    where
        T: 'static,
    {
        self.inner.is::<T>()
    }

    /// Releases the stored value.
    /// Does nothing if the box is already empty.
    #[inline]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Replaces the stored value with `value`.
    /// Returns mutable reference to the new value.
    #[inline]
    pub fn emplace<T>(&mut self, value: T) -> &mut T
    where
        T: Clone + Send + Sync + 'static,
    {
        self.inner.emplace(value)
    }

    /// Moves the stored value into a new box, leaving this one empty.
    /// Only ownership of the allocation is transferred.
    ///
    /// # Example
    ///
    /// ```
    /// # use anyvar::AnyBox;
    /// let mut a = AnyBox::new(vec![1u8, 2, 3]);
    /// let b = a.take();
    ///
    /// assert!(!a.has_value());
    /// assert_eq!(b.get::<Vec<u8>>().unwrap(), &[1, 2, 3]);
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        AnyBox {
            inner: self.inner.take(),
        }
    }

    /// Swaps stored values of two boxes without touching the values themselves.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        self.inner.swap(&mut other.inner);
    }

    /// Returns some reference to the stored value if it is of type `T`.
    /// Otherwise returns none.
    #[inline]
    pub fn try_get<T>(&self) -> Option<&T>
    where
        T: 'static,
    {
        self.inner.try_get()
    }

    /// Returns some mutable reference to the stored value if it is of type `T`.
    /// Otherwise returns none.
    #[inline]
    pub fn try_get_mut<T>(&mut self) -> Option<&mut T>
    where
        T: 'static,
    {
        self.inner.try_get_mut()
    }

    /// Returns reference to the stored value if it is of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] if the box is empty or holds another type.
    #[inline]
    pub fn get<T>(&self) -> Result<&T, TypeMismatch>
    where
        T: 'static,
    {
        self.inner.get()
    }

    /// Returns mutable reference to the stored value if it is of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] if the box is empty or holds another type.
    #[inline]
    pub fn get_mut<T>(&mut self) -> Result<&mut T, TypeMismatch>
    where
        T: 'static,
    {
        self.inner.get_mut()
    }

    /// Moves the stored value out if it is of type `T`, leaving the box empty.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] if the box is empty or holds another type.
    /// The box is left untouched in that case.
    #[inline]
    pub fn take_value<T>(&mut self) -> Result<T, TypeMismatch>
    where
        T: 'static,
    {
        self.inner.take_value()
    }

    /// Returns the stored value if it is of type `T`.
    /// Otherwise return self back.
    #[inline]
    pub fn downcast<T>(self) -> Result<T, AnyBox>
    where
        T: 'static,
    {
        match self.inner.downcast() {
            Ok(value) => Ok(value),
            Err(inner) => Err(AnyBox { inner }),
        }
    }
}
