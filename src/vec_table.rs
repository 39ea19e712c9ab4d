//! VecTable: separate chaining with growable-array buckets.
//!
//! Nodes live in a generational arena; each bucket is a lazily created
//! [`GrowVec`] of node handles kept in insertion order. Growth copies the
//! handles into freshly allocated bucket arrays and only swaps them in once
//! every handle has been placed, so an allocation failure halfway through
//! leaves the table exactly as it was.

use core::borrow::Borrow;
use core::mem;
use std::io::{self, Write};

use log::trace;
use slotmap::{DefaultKey, SlotMap};

use crate::error::{Result, VecError};
use crate::ops::{KeyOps, ValueOps};
use crate::reentrancy::BusyMark;
use crate::table::{
    alloc_buckets, bucket_index, grow_if_needed, write_entry, write_header, ChainedTable, Put,
    TableConfig,
};
use crate::vector::GrowVec;

struct Node<KO: KeyOps, VO: ValueOps> {
    hash: u32,
    key: KO::Owned,
    value: VO::Owned,
}

impl<KO: KeyOps, VO: ValueOps> Node<KO, VO> {
    fn key(&self) -> &KO::Key {
        self.key.borrow()
    }

    fn value(&self) -> &VO::Value {
        self.value.borrow()
    }
}

type Bucket = Option<GrowVec<DefaultKey>>;

fn append_to(slot: &mut Bucket, handle: DefaultKey, capacity: usize) -> Result<(), VecError> {
    match slot {
        Some(bucket) => bucket.append(handle),
        None => {
            let mut bucket = GrowVec::new(capacity)?;
            bucket.append(handle)?;
            *slot = Some(bucket);
            Ok(())
        }
    }
}

struct Buckets<KO: KeyOps, VO: ValueOps> {
    slots: Vec<Bucket>,
    nodes: SlotMap<DefaultKey, Node<KO, VO>>,
    bucket_capacity: usize,
}

impl<KO: KeyOps, VO: ValueOps> Buckets<KO, VO> {
    fn bucket(&self, idx: usize) -> impl Iterator<Item = &Node<KO, VO>> + '_ {
        self.slots[idx]
            .iter()
            .flat_map(|b| b.iter())
            .filter_map(move |&k| self.nodes.get(k))
    }

    fn find(&self, ops: &KO, hash: u32, key: &KO::Key) -> Option<DefaultKey> {
        let bucket = self.slots[bucket_index(hash, self.slots.len())].as_ref()?;
        bucket.iter().copied().find(|&k| {
            self.nodes
                .get(k)
                .map(|n| n.hash == hash && ops.key_eq(n.key(), key))
                .unwrap_or(false)
        })
    }

    /// Append a new node to its bucket. If the bucket array cannot take it,
    /// the node is released through the bundles and the table is unchanged.
    fn append(&mut self, key_ops: &KO, value_ops: &VO, node: Node<KO, VO>) -> Result<()> {
        let idx = bucket_index(node.hash, self.slots.len());
        let fresh = self.slots[idx].is_none();
        let k = self.nodes.insert(node);
        if let Err(e) = append_to(&mut self.slots[idx], k, self.bucket_capacity) {
            if let Some(node) = self.nodes.remove(k) {
                key_ops.free_key(node.key);
                value_ops.free_value(node.value);
            }
            return Err(e.into());
        }
        if fresh {
            trace!("vector table allocated bucket {idx}");
        }
        Ok(())
    }

    /// Place every handle into `capacity` new buckets; the old bucket arrays
    /// are dropped (their handles moved, not the nodes) only on success.
    fn rehash(&mut self, capacity: usize) -> Result<()> {
        let mut slots: Vec<Bucket> = alloc_buckets(capacity, || None)?;
        for bucket in self.slots.iter().flatten() {
            for &k in bucket {
                let Some(node) = self.nodes.get(k) else {
                    continue;
                };
                let idx = bucket_index(node.hash, capacity);
                append_to(&mut slots[idx], k, self.bucket_capacity)?;
            }
        }
        self.slots = slots;
        Ok(())
    }
}

pub struct VecTable<KO: KeyOps, VO: ValueOps> {
    key_ops: KO,
    value_ops: VO,
    buckets: Buckets<KO, VO>,
    config: TableConfig,
    busy: BusyMark,
}

impl<KO: KeyOps, VO: ValueOps> VecTable<KO, VO> {
    /// Empty table with [`VEC_INITIAL_CAPACITY`](crate::table::VEC_INITIAL_CAPACITY) buckets.
    pub fn new(key_ops: KO, value_ops: VO) -> Result<Self> {
        Self::with_config(TableConfig::vector(), key_ops, value_ops)
    }

    pub fn with_config(config: TableConfig, key_ops: KO, value_ops: VO) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            key_ops,
            value_ops,
            buckets: Buckets {
                slots: alloc_buckets(config.initial_capacity, || None)?,
                nodes: SlotMap::with_key(),
                bucket_capacity: config.bucket_capacity,
            },
            config,
            busy: BusyMark::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.buckets.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buckets.slots.len()
    }

    pub fn key_ops(&self) -> &KO {
        &self.key_ops
    }

    pub fn value_ops(&self) -> &VO {
        &self.value_ops
    }

    pub fn get(&self, key: &KO::Key) -> Option<&VO::Value> {
        let _g = self.busy.enter("get");
        let hash = self.key_ops.hash_key(key);
        let k = self.buckets.find(&self.key_ops, hash, key)?;
        self.buckets.nodes.get(k).map(Node::value)
    }

    pub fn contains(&self, key: &KO::Key) -> bool {
        let _g = self.busy.enter("contains");
        let hash = self.key_ops.hash_key(key);
        self.buckets.find(&self.key_ops, hash, key).is_some()
    }

    /// Insert a clone of `key` -> `value`, or replace the value of an
    /// existing equal key.
    ///
    /// Fails only if a new per-bucket array cannot be allocated or grown; the
    /// table is then unchanged and the clones made for the attempt have been
    /// released. The entry node itself comes from a `SlotMap` arena, which
    /// aborts on out-of-memory rather than returning an error.
    pub fn put(&mut self, key: &KO::Key, value: &VO::Value) -> Result<Put> {
        let _g = self.busy.enter("put");
        let hash = self.key_ops.hash_key(key);

        if let Some(k) = self.buckets.find(&self.key_ops, hash, key) {
            if let Some(node) = self.buckets.nodes.get_mut(k) {
                let fresh = self.value_ops.clone_value(value);
                let old = mem::replace(&mut node.value, fresh);
                self.value_ops.free_value(old);
                return Ok(Put::Replaced);
            }
        }

        let node = Node {
            hash,
            key: self.key_ops.clone_key(key),
            value: self.value_ops.clone_value(value),
        };
        self.buckets.append(&self.key_ops, &self.value_ops, node)?;

        let buckets = &mut self.buckets;
        let growth = grow_if_needed(
            "vector",
            buckets.nodes.len(),
            buckets.slots.len(),
            &self.config,
            |to| buckets.rehash(to),
        );
        Ok(Put::Inserted { growth })
    }

    pub fn collision_count(&self) -> usize {
        let _g = self.busy.enter("collision_count");
        self.buckets
            .slots
            .iter()
            .flatten()
            .map(|b| b.len().saturating_sub(1))
            .sum()
    }

    /// All entries, bucket by bucket, each bucket in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&KO::Key, &VO::Value)> + '_ {
        (0..self.buckets.slots.len())
            .flat_map(move |i| self.buckets.bucket(i))
            .map(|n| (n.key(), n.value()))
    }

    pub fn debug_print<W, FK, FV>(
        &self,
        out: &mut W,
        mut print_key: FK,
        mut print_val: FV,
    ) -> io::Result<()>
    where
        W: Write + ?Sized,
        FK: FnMut(&mut W, &KO::Key) -> io::Result<()>,
        FV: FnMut(&mut W, &VO::Value) -> io::Result<()>,
    {
        let _g = self.busy.enter("debug_print");
        write_header(out, self.capacity(), self.len())?;
        for i in 0..self.buckets.slots.len() {
            writeln!(out, "\tbucket[{i}]:")?;
            for node in self.buckets.bucket(i) {
                write_entry(
                    out,
                    node.hash,
                    node.key(),
                    node.value(),
                    &mut print_key,
                    &mut print_val,
                )?;
            }
        }
        Ok(())
    }

    pub fn destroy(self) {
        drop(self);
    }
}

impl<KO: KeyOps, VO: ValueOps> Drop for VecTable<KO, VO> {
    fn drop(&mut self) {
        let _g = self.busy.enter("destroy");
        for bucket in mem::take(&mut self.buckets.slots).into_iter().flatten() {
            for &k in &bucket {
                if let Some(node) = self.buckets.nodes.remove(k) {
                    self.key_ops.free_key(node.key);
                    self.value_ops.free_value(node.value);
                }
            }
        }
    }
}

impl<KO: KeyOps, VO: ValueOps> ChainedTable for VecTable<KO, VO> {
    type K = KO;
    type V = VO;

    fn default_config() -> TableConfig {
        TableConfig::vector()
    }

    fn with_config(config: TableConfig, key_ops: KO, value_ops: VO) -> Result<Self> {
        VecTable::with_config(config, key_ops, value_ops)
    }

    fn len(&self) -> usize {
        VecTable::len(self)
    }

    fn capacity(&self) -> usize {
        VecTable::capacity(self)
    }

    fn get(&self, key: &KO::Key) -> Option<&VO::Value> {
        VecTable::get(self, key)
    }

    fn contains(&self, key: &KO::Key) -> bool {
        VecTable::contains(self, key)
    }

    fn put(&mut self, key: &KO::Key, value: &VO::Value) -> Result<Put> {
        VecTable::put(self, key, value)
    }

    fn collision_count(&self) -> usize {
        VecTable::collision_count(self)
    }

    fn debug_print<W, FK, FV>(&self, out: &mut W, print_key: FK, print_val: FV) -> io::Result<()>
    where
        W: Write + ?Sized,
        FK: FnMut(&mut W, &KO::Key) -> io::Result<()>,
        FV: FnMut(&mut W, &VO::Value) -> io::Result<()>,
    {
        VecTable::debug_print(self, out, print_key, print_val)
    }
}
