//! Closed lists of alternative types.
//!
//! A list is a tuple of 1 to 8 `'static` types, e.g. `(i32, String)`.
//! Membership of a type in a list is proven at compile time by [`Member`],
//! which also yields the position of the type in the list.
//! A repeated type has one position per occurrence and must be named with an explicit [`Index`].

use core::mem::ManuallyDrop;

use crate::dispatch::{clone_fn, CloneTable, DispatchTable, Entry};

/// Position of an alternative in its list.
///
/// Only used as a type-level marker that lets the compiler find the position of
/// a type in a list. At call sites it is always inferred with `_`.
pub struct Index<const N: usize>;

/// Closed list of alternative types.
///
/// # Safety
///
/// `Storage` must be large and aligned enough for every alternative,
/// and entry `i` of the tables must be built for the `i`th alternative.
/// Implemented by this crate for tuples, there is no need to implement it manually.
pub unsafe trait Alternatives: 'static {
    /// First alternative, the one a default variant holds.
    type First: 'static;

    /// Layout type with size and alignment of the largest alternative.
    #[doc(hidden)]
    type Storage: 'static;

    /// Number of alternatives in the list.
    const COUNT: usize;

    #[doc(hidden)]
    fn dispatch() -> &'static DispatchTable<Self::Storage>;
}

/// List in which every alternative implements `Clone`.
///
/// # Safety
///
/// Entry `i` of the table must be built for the `i`th alternative.
pub unsafe trait CloneAlternatives: Alternatives {
    #[doc(hidden)]
    fn clone_table() -> &'static CloneTable<Self::Storage>;
}

/// Proof that `Self` is the alternative at position `I` of the list `L`.
///
/// # Safety
///
/// `POSITION` must be the position of `Self` in `L`.
pub unsafe trait Member<L: Alternatives, I>: Sized + 'static {
    /// Position of this type in the list.
    const POSITION: usize;
}

macro_rules! impl_alternatives {
    ($count:literal, $slots:ident [$first:ident $(, $rest:ident)*] { $($ty:ident => $idx:tt),+ }) => {
        /// Storage layout of the alternatives.
        #[doc(hidden)]
        #[allow(dead_code, non_snake_case)]
        #[repr(C)]
        pub union $slots<$first, $($rest),*> {
            $($ty: ManuallyDrop<$ty>,)+
        }

        unsafe impl<$first: 'static, $($rest: 'static),*> Alternatives for ($first, $($rest,)*) {
            type First = $first;
            type Storage = $slots<$first, $($rest),*>;
            const COUNT: usize = $count;

            #[inline]
            fn dispatch() -> &'static DispatchTable<Self::Storage> {
                const {
                    &DispatchTable {
                        entries: &[$(Entry::<Self::Storage>::of::<$ty>()),+],
                    }
                }
            }
        }

        unsafe impl<$first: Clone + 'static, $($rest: Clone + 'static),*> CloneAlternatives for ($first, $($rest,)*) {
            #[inline]
            fn clone_table() -> &'static CloneTable<Self::Storage> {
                const {
                    &CloneTable {
                        entries: &[$(clone_fn::<$ty, Self::Storage>()),+],
                    }
                }
            }
        }

        impl_member!(@each [$first $(, $rest)*] $($ty => $idx),+);
    };
}

macro_rules! impl_member {
    (@each $params:tt $($ty:ident => $idx:tt),+) => {
        $(impl_member!(@one $params $ty $idx);)+
    };
    (@one [$($param:ident),+] $ty:ident $idx:tt) => {
        unsafe impl<$($param: 'static),+> Member<($($param,)+), Index<$idx>> for $ty {
            const POSITION: usize = $idx;
        }
    };
}

impl_alternatives!(1, Slots1 [A] { A => 0 });
impl_alternatives!(2, Slots2 [A, B] { A => 0, B => 1 });
impl_alternatives!(3, Slots3 [A, B, C] { A => 0, B => 1, C => 2 });
impl_alternatives!(4, Slots4 [A, B, C, D] { A => 0, B => 1, C => 2, D => 3 });
impl_alternatives!(5, Slots5 [A, B, C, D, E] { A => 0, B => 1, C => 2, D => 3, E => 4 });
impl_alternatives!(6, Slots6 [A, B, C, D, E, F] { A => 0, B => 1, C => 2, D => 3, E => 4, F => 5 });
impl_alternatives!(7, Slots7 [A, B, C, D, E, F, G] { A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6 });
impl_alternatives!(8, Slots8 [A, B, C, D, E, F, G, H] { A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7 });
