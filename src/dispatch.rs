//! Per-position tables of operations on the alternatives of a [`Variant`].
//!
//! Every alternative list gets its tables built once, as promoted constants,
//! so an operation on the active alternative is a single indexed call
//! instead of a chain of type comparisons.
//!
//! # Safety Invariant
//!
//! Entry `i` of a table is always instantiated with the `i`th alternative type
//! of the list the table was built for. Tables are only built by the
//! [`Alternatives`] implementations in this crate, which uphold it.
//!
//! [`Variant`]: crate::Variant
//! [`Alternatives`]: crate::Alternatives

use crate::{storage::InlineStorage, TypeKey};

unsafe fn drop_alternative<T, S>(storage: &mut InlineStorage<S>) {
    // Safety: It was initialized as `T`.
    unsafe {
        storage.as_mut::<T>().assume_init_drop();
    }
}

unsafe fn clone_alternative<T: Clone, S>(src: &InlineStorage<S>, dst: &mut InlineStorage<S>) {
    // Safety: It was initialized as `T`.
    let value: &T = unsafe { src.as_ref::<T>().assume_init_ref() };
    dst.as_mut::<T>().write(value.clone());
}

/// Operations every alternative supports.
#[doc(hidden)]
pub struct Entry<S> {
    type_key: fn() -> TypeKey,
    drop: unsafe fn(&mut InlineStorage<S>),
}

impl<S> Entry<S> {
    pub(crate) const fn of<T: 'static>() -> Self {
        Entry {
            type_key: TypeKey::of::<T>,
            drop: drop_alternative::<T, S>,
        }
    }
}

/// Destroy and identity operations, indexed by alternative position.
#[doc(hidden)]
pub struct DispatchTable<S: 'static> {
    pub(crate) entries: &'static [Entry<S>],
}

impl<S: 'static> DispatchTable<S> {
    /// Number of alternatives.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn type_key(&self, index: usize) -> TypeKey {
        (self.entries[index].type_key)()
    }

    /// Drops the alternative at `index` that lives in `storage`.
    ///
    /// # Safety
    ///
    /// `storage` must hold a live value of the alternative at `index`.
    /// The value must not be used afterwards.
    #[inline]
    pub(crate) unsafe fn drop_in_place(&self, index: usize, storage: &mut InlineStorage<S>) {
        unsafe { (self.entries[index].drop)(storage) }
    }
}

pub(crate) type CloneFn<S> = unsafe fn(&InlineStorage<S>, &mut InlineStorage<S>);

pub(crate) const fn clone_fn<T: Clone, S>() -> CloneFn<S> {
    clone_alternative::<T, S>
}

/// Clone operations, indexed by alternative position.
/// Only exists for lists where every alternative is `Clone`.
#[doc(hidden)]
pub struct CloneTable<S: 'static> {
    pub(crate) entries: &'static [CloneFn<S>],
}

impl<S: 'static> CloneTable<S> {
    /// Clones the alternative at `index` from `src` into uninitialized `dst`.
    ///
    /// # Safety
    ///
    /// `src` must hold a live value of the alternative at `index`.
    /// Any value in `dst` is overwritten without being dropped.
    #[inline]
    pub(crate) unsafe fn clone_at(
        &self,
        index: usize,
        src: &InlineStorage<S>,
        dst: &mut InlineStorage<S>,
    ) {
        unsafe { (self.entries[index])(src, dst) }
    }
}
