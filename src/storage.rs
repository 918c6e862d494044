use core::mem::{align_of, size_of, MaybeUninit};

/// Uninitialized storage with the size and alignment of the layout type `S`.
///
/// `S` is never constructed, it only dictates the memory footprint.
/// Values of any type that fits are written into and read from the slot by pointer cast.
#[repr(transparent)]
pub(crate) struct InlineStorage<S> {
    slot: MaybeUninit<S>,
}

impl<S> InlineStorage<S> {
    pub const SIZE: usize = size_of::<S>();
    pub const ALIGN: usize = align_of::<S>();

    /// Construct new storage without initializing any value in it.
    #[inline]
    pub const fn new() -> Self {
        InlineStorage {
            slot: MaybeUninit::uninit(),
        }
    }

    /// Returns `true` if the type `T` fits into the storage.
    pub const fn fits<T>() -> bool {
        size_of::<T>() <= Self::SIZE && align_of::<T>() <= Self::ALIGN
    }

    /// Returns reference to the potentially uninitialized value.
    ///
    /// The caller is responsible to ensure that the type is correct and the value is initialized before accessing it.
    #[inline]
    pub fn as_ref<T>(&self) -> &MaybeUninit<T> {
        // This can't be const, because then it'll be checked in branches that are not taken.
        assert!(Self::fits::<T>());

        // Safety: This cast is safe due to the size and alignment constraints.
        unsafe { &*self.slot.as_ptr().cast() }
    }

    /// Returns mutable reference to the potentially uninitialized value.
    ///
    /// The caller is responsible to ensure that the type is correct and the value is initialized before accessing it.
    #[inline]
    pub fn as_mut<T>(&mut self) -> &mut MaybeUninit<T> {
        assert!(Self::fits::<T>());

        // Safety: This cast is safe due to the size and alignment constraints.
        unsafe { &mut *self.slot.as_mut_ptr().cast() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits() {
        type Storage = InlineStorage<[u64; 2]>;

        assert!(Storage::fits::<u8>());
        assert!(Storage::fits::<u64>());
        assert!(Storage::fits::<(u64, u32)>());
        assert!(!Storage::fits::<[u64; 3]>());
        assert!(!InlineStorage::<[u8; 16]>::fits::<u16>());
    }

    #[test]
    fn test_write_read() {
        let mut storage = InlineStorage::<[u32; 4]>::new();
        storage.as_mut::<[u16; 3]>().write([1, 2, 3]);

        let value = unsafe { storage.as_ref::<[u16; 3]>().assume_init_read() };
        assert_eq!(value, [1, 2, 3]);
    }

    #[test]
    #[should_panic]
    fn test_too_large() {
        let storage = InlineStorage::<u32>::new();
        let _ = storage.as_ref::<u64>();
    }
}
