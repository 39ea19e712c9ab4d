//! chained-hash: separate-chaining hash tables whose key and value behavior
//! comes entirely from caller-supplied operation bundles.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one hash table engine (bucket indexing, collision resolution,
//!   growth with full rehash, clone/free ownership) with two bucket
//!   representations that share the exact same contract.
//! - Layers:
//!   - `KeyOps` / `ValueOps`: bundles that hash, clone, free and compare.
//!     The table holds no type-specific logic of its own.
//!   - `GrowVec<T>`: index-addressed growable array of handles; it never
//!     owns what the handles point at.
//!   - `ListTable<KO, VO>`: each bucket is a singly linked chain, newest
//!     entry at the head.
//!   - `VecTable<KO, VO>`: each bucket is a `GrowVec` of node handles in
//!     insertion order, allocated the first time the bucket is used.
//!
//! Ownership
//! - `put` stores clones made by the bundles; the caller keeps its own key
//!   and value. Overwriting an existing key clones the new value and frees
//!   the old one; the stored key is untouched.
//! - Dropping a table (or calling `destroy`) frees every stored key and
//!   value through the bundles, so clone and free calls always balance.
//!
//! Lookup and growth
//! - Bucket index is `hash % capacity`. Every node caches its 32-bit hash;
//!   a lookup compares cached hashes first and only then asks `key_eq`.
//! - After an insertion that leaves `len > capacity * growth_factor`, the
//!   bucket count doubles and every node is placed again from its cached
//!   hash. `KeyOps::hash_key` is never called during growth.
//! - Growth is all-or-nothing. If the new bucket storage cannot be
//!   allocated, the insertion still succeeds, the table keeps its old
//!   capacity, and the outcome is reported as `Growth::Skipped`.
//!
//! Failure policy
//! - Bucket arrays and growable-array storage are allocated fallibly and
//!   surface as `TableError`/`VecError`; nothing in the crate aborts the
//!   process. Missing keys are `None`, not errors.
//! - Per-entry nodes live in a `slotmap::SlotMap` arena, which follows the
//!   global allocator's usual out-of-memory handling.
//!
//! Constraints
//! - Single-threaded: tables are `!Send`/`!Sync`. Share one behind a lock.
//! - No deletion of individual entries and no iteration order guarantees.
//! - Bundles must not call back into the table that invoked them; debug
//!   builds panic if they do.

pub mod error;
pub mod list_table;
pub mod ops;
mod reentrancy;
pub mod string_ops;
pub mod table;
pub mod vec_table;
pub mod vector;

#[cfg(test)]
mod table_proptest;

pub use error::{Result, TableError, VecError};
pub use list_table::ListTable;
pub use ops::{KeyOps, StdOps, ValueOps};
pub use string_ops::{StringOps, STRING_OPS};
pub use table::{ChainedTable, Growth, Put, TableConfig};
pub use vec_table::VecTable;
pub use vector::GrowVec;
