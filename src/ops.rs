//! Operation bundles: the only place key/value-specific behavior lives.
//!
//! A table never hashes, copies, compares or releases keys and values on its
//! own; it calls into a `KeyOps` and a `ValueOps` bundle. `&self` on every
//! method is the bundle's context, so configurable behavior (a seed, a
//! collation, instrumentation counters) is just state on the bundle.
//!
//! Contract callers must uphold:
//! - `hash_key` is pure: the same logical key always hashes the same.
//! - `key_eq` is an equivalence relation and `key_eq(a, b)` implies
//!   `hash_key(a) == hash_key(b)`.
//! - `clone_*`/`free_*` pair up: a clone is independently releasable and
//!   `free_*` releases exactly what the matching clone produced.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use hashbrown::hash_map::DefaultHashBuilder;

use crate::string_ops::fmix32;

pub trait KeyOps {
    /// Borrowed form used for lookups.
    type Key: ?Sized;
    /// Owned clone stored inside the table.
    type Owned: Borrow<Self::Key>;

    fn hash_key(&self, key: &Self::Key) -> u32;
    fn clone_key(&self, key: &Self::Key) -> Self::Owned;
    fn free_key(&self, key: Self::Owned) {
        drop(key);
    }
    fn key_eq(&self, a: &Self::Key, b: &Self::Key) -> bool;
}

pub trait ValueOps {
    type Value: ?Sized;
    type Owned: Borrow<Self::Value>;

    fn clone_value(&self, value: &Self::Value) -> Self::Owned;
    fn free_value(&self, value: Self::Owned) {
        drop(value);
    }
    fn value_eq(&self, a: &Self::Value, b: &Self::Value) -> bool;
}

impl<B: KeyOps + ?Sized> KeyOps for &B {
    type Key = B::Key;
    type Owned = B::Owned;

    #[inline]
    fn hash_key(&self, key: &Self::Key) -> u32 {
        (**self).hash_key(key)
    }
    #[inline]
    fn clone_key(&self, key: &Self::Key) -> Self::Owned {
        (**self).clone_key(key)
    }
    #[inline]
    fn free_key(&self, key: Self::Owned) {
        (**self).free_key(key)
    }
    #[inline]
    fn key_eq(&self, a: &Self::Key, b: &Self::Key) -> bool {
        (**self).key_eq(a, b)
    }
}

impl<B: ValueOps + ?Sized> ValueOps for &B {
    type Value = B::Value;
    type Owned = B::Owned;

    #[inline]
    fn clone_value(&self, value: &Self::Value) -> Self::Owned {
        (**self).clone_value(value)
    }
    #[inline]
    fn free_value(&self, value: Self::Owned) {
        (**self).free_value(value)
    }
    #[inline]
    fn value_eq(&self, a: &Self::Value, b: &Self::Value) -> bool {
        (**self).value_eq(a, b)
    }
}

/// Bundle for any `T: Hash + Eq + Clone`, usable as key and value ops.
///
/// The 64-bit output of `S` is folded to 32 bits and finalized with
/// [`fmix32`] so the low bits used for bucket selection stay well mixed.
pub struct StdOps<T: ?Sized, S = DefaultHashBuilder> {
    hasher: S,
    _pd: PhantomData<fn(&T)>,
}

impl<T: ?Sized> StdOps<T> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<T: ?Sized> Default for StdOps<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, S: Clone> Clone for StdOps<T, S> {
    fn clone(&self) -> Self {
        Self::with_hasher(self.hasher.clone())
    }
}

impl<T: ?Sized, S> StdOps<T, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            _pd: PhantomData,
        }
    }
}

impl<T, S> KeyOps for StdOps<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher,
{
    type Key = T;
    type Owned = T;

    fn hash_key(&self, key: &T) -> u32 {
        let h = self.hasher.hash_one(key);
        fmix32((h ^ (h >> 32)) as u32)
    }

    fn clone_key(&self, key: &T) -> T {
        key.clone()
    }

    fn key_eq(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

impl<T, S> ValueOps for StdOps<T, S>
where
    T: PartialEq + Clone,
{
    type Value = T;
    type Owned = T;

    fn clone_value(&self, value: &T) -> T {
        value.clone()
    }

    fn value_eq(&self, a: &T, b: &T) -> bool {
        a == b
    }
}
