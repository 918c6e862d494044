//! This crate provides two containers for values whose type is picked at runtime.
//!
//! `AnyBox` is a heap-allocated type-erased value with value semantics:
//! cloning the box deep-copies the value, and the value is recovered only by naming its exact type.
//! It stores any value of any type that implements `Clone`, `Send`, `Sync` and is `'static`.
//! `LocalAnyBox` is relaxed version of `AnyBox` that doesn't require `Send`, `Sync` bounds.
//!
//! `Variant` is a tagged union over a closed list of alternative types.
//! The active alternative is stored inline, without heap allocation,
//! and every type named in its methods is checked against the list at compile time.
//!
//! ## Usage
//!
//! ```
//! use anyvar::{AnyBox, TypeKey, Variant};
//!
//! let mut a = AnyBox::new(12i32);
//!
//! // Exact type gives the value back.
//! assert_eq!(a.get::<i32>(), Ok(&12));
//!
//! // Any other type is a mismatch.
//! assert!(a.get::<String>().is_err());
//! assert_eq!(a.try_get::<String>(), None);
//!
//! // Moving out leaves the box empty.
//! let b = a.take();
//! assert!(!a.has_value());
//! assert_eq!(a.type_key(), TypeKey::NONE);
//! assert_eq!(b.type_key(), TypeKey::of::<i32>());
//!
//!
//! // Default variant holds default value of the first alternative.
//! let mut v: Variant<(i32, String)> = Variant::default();
//! assert_eq!(v.get::<i32, _>(), Ok(&0));
//!
//! v.emplace(String::from("hi"));
//! assert_eq!(v.get::<String, _>().unwrap(), "hi");
//! assert!(v.get::<i32, _>().is_err());
//! ```

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod alternatives;
mod any_box;
mod dispatch;
mod error;
mod macros;
mod storage;
mod type_key;
mod variant;

pub use self::{
    alternatives::{Alternatives, CloneAlternatives, Index, Member},
    any_box::{AnyBox, LocalAnyBox},
    error::TypeMismatch,
    type_key::TypeKey,
    variant::Variant,
};
