//! Pieces shared by both bucket strategies: configuration, put outcomes, the
//! growth driver and the common `ChainedTable` surface.

use std::io::{self, Write};

use log::{debug, warn};

use crate::error::{table_oom, Result, TableError};
use crate::ops::{KeyOps, ValueOps};

/// Bucket count a list-bucket table starts with.
pub const LIST_INITIAL_CAPACITY: usize = 32;
/// Bucket count a vector-bucket table starts with.
pub const VEC_INITIAL_CAPACITY: usize = 1024;
/// Bucket count multiplier applied on growth.
pub const CAPACITY_MULTIPLIER: usize = 2;
/// Average entries per bucket tolerated before growing.
pub const GROWTH_FACTOR: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub growth_factor: usize,
    /// Initial capacity of each lazily created per-bucket array (vector
    /// buckets only).
    pub bucket_capacity: usize,
    /// Growth never produces more buckets than this.
    pub max_capacity: usize,
}

impl TableConfig {
    pub const fn list() -> Self {
        Self {
            initial_capacity: LIST_INITIAL_CAPACITY,
            growth_factor: GROWTH_FACTOR,
            bucket_capacity: crate::vector::DEFAULT_CAPACITY,
            max_capacity: usize::MAX,
        }
    }

    pub const fn vector() -> Self {
        Self {
            initial_capacity: VEC_INITIAL_CAPACITY,
            ..Self::list()
        }
    }

    pub const fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub const fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    pub const fn with_bucket_capacity(mut self, capacity: usize) -> Self {
        self.bucket_capacity = capacity;
        self
    }

    pub const fn with_max_capacity(mut self, capacity: usize) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        if self.growth_factor == 0 {
            return Err(TableError::ZeroGrowthFactor);
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::list()
    }
}

/// What a growth check after an insertion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Growth {
    NotNeeded,
    Grew { from: usize, to: usize },
    /// The table keeps serving at its previous capacity.
    Skipped(TableError),
}

/// Result of a successful `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Put {
    /// The key existed; its value was replaced. Size unchanged.
    Replaced,
    /// A new entry was created.
    Inserted { growth: Growth },
}

impl Put {
    pub fn is_insert(&self) -> bool {
        matches!(self, Put::Inserted { .. })
    }

    pub fn grew(&self) -> bool {
        matches!(
            self,
            Put::Inserted {
                growth: Growth::Grew { .. }
            }
        )
    }
}

#[inline]
pub(crate) fn bucket_index(hash: u32, capacity: usize) -> usize {
    hash as usize % capacity
}

/// Allocate `n` buckets, reporting allocator refusal instead of aborting.
pub(crate) fn alloc_buckets<T>(n: usize, empty: impl FnMut() -> T) -> Result<Vec<T>> {
    let bytes = n.checked_mul(core::mem::size_of::<T>());
    if bytes.map_or(true, |b| b > isize::MAX as usize) {
        return Err(TableError::CapacityOverflow { capacity: n });
    }
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(n).map_err(|e| table_oom(n, e))?;
    buckets.resize_with(n, empty);
    Ok(buckets)
}

/// Runs after every insertion: doubles the bucket count through `rehash`
/// when `len` exceeds `capacity * growth_factor`. `rehash` must either
/// install the new buckets or leave the table untouched.
pub(crate) fn grow_if_needed(
    kind: &str,
    len: usize,
    capacity: usize,
    config: &TableConfig,
    rehash: impl FnOnce(usize) -> Result<()>,
) -> Growth {
    let limit = capacity.saturating_mul(config.growth_factor);
    if len <= limit {
        return Growth::NotNeeded;
    }
    let target = capacity
        .checked_mul(CAPACITY_MULTIPLIER)
        .ok_or(TableError::CapacityOverflow { capacity })
        .and_then(|to| {
            if to > config.max_capacity {
                Err(TableError::CapacityLimit {
                    capacity: to,
                    limit: config.max_capacity,
                })
            } else {
                Ok(to)
            }
        });
    match target.and_then(|to| rehash(to).map(|()| to)) {
        Ok(to) => {
            debug!("{kind} table grew from {capacity} to {to} buckets ({len} entries)");
            Growth::Grew { from: capacity, to }
        }
        Err(e) => {
            warn!("{kind} table not resized, staying at {capacity} buckets: {e}");
            Growth::Skipped(e)
        }
    }
}

pub(crate) fn write_header<W: Write + ?Sized>(
    out: &mut W,
    capacity: usize,
    len: usize,
) -> io::Result<()> {
    writeln!(out, "Hash Capacity: {capacity}")?;
    writeln!(out, "Hash Size: {len}")?;
    writeln!(out, "Hash Buckets:")
}

pub(crate) fn write_entry<W, K, V, FK, FV>(
    out: &mut W,
    hash: u32,
    key: &K,
    value: &V,
    print_key: &mut FK,
    print_val: &mut FV,
) -> io::Result<()>
where
    W: Write + ?Sized,
    K: ?Sized,
    V: ?Sized,
    FK: FnMut(&mut W, &K) -> io::Result<()>,
    FV: FnMut(&mut W, &V) -> io::Result<()>,
{
    write!(out, "\t\thash={hash}, key=")?;
    print_key(out, key)?;
    write!(out, ", value=")?;
    print_val(out, value)?;
    writeln!(out)
}

/// Surface shared by [`ListTable`](crate::ListTable) and
/// [`VecTable`](crate::VecTable), for code generic over the bucket strategy.
///
/// Tables are single-threaded; wrap one in a lock to share it.
pub trait ChainedTable: Sized {
    type K: KeyOps;
    type V: ValueOps;

    fn default_config() -> TableConfig;

    fn with_config(config: TableConfig, key_ops: Self::K, value_ops: Self::V) -> Result<Self>;

    fn new(key_ops: Self::K, value_ops: Self::V) -> Result<Self> {
        Self::with_config(Self::default_config(), key_ops, value_ops)
    }

    /// Release every entry through the bundles. Dropping does the same.
    fn destroy(self) {
        drop(self);
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn get(&self, key: &<Self::K as KeyOps>::Key) -> Option<&<Self::V as ValueOps>::Value>;

    fn contains(&self, key: &<Self::K as KeyOps>::Key) -> bool;

    fn put(
        &mut self,
        key: &<Self::K as KeyOps>::Key,
        value: &<Self::V as ValueOps>::Value,
    ) -> Result<Put>;

    fn collision_count(&self) -> usize;

    fn debug_print<W, FK, FV>(&self, out: &mut W, print_key: FK, print_val: FV) -> io::Result<()>
    where
        W: Write + ?Sized,
        FK: FnMut(&mut W, &<Self::K as KeyOps>::Key) -> io::Result<()>,
        FV: FnMut(&mut W, &<Self::V as ValueOps>::Value) -> io::Result<()>;
}
