//! ListTable: separate chaining with singly linked buckets.
//!
//! Nodes live in a generational arena and link to the next node of their
//! bucket by key; each bucket slot holds the head of its chain. New entries
//! are pushed at the head, so a chain reads newest-first. Growth relinks the
//! existing nodes into a larger head array: keys and values are never copied
//! or re-cloned, and the cached hash is reused.

use core::borrow::Borrow;
use core::mem;
use std::io::{self, Write};

use slotmap::{DefaultKey, SlotMap};

use crate::error::Result;
use crate::ops::{KeyOps, ValueOps};
use crate::reentrancy::BusyMark;
use crate::table::{
    alloc_buckets, bucket_index, grow_if_needed, write_entry, write_header, ChainedTable, Put,
    TableConfig,
};

struct Node<KO: KeyOps, VO: ValueOps> {
    hash: u32,
    key: KO::Owned,
    value: VO::Owned,
    next: Option<DefaultKey>,
}

impl<KO: KeyOps, VO: ValueOps> Node<KO, VO> {
    fn key(&self) -> &KO::Key {
        self.key.borrow()
    }

    fn value(&self) -> &VO::Value {
        self.value.borrow()
    }
}

struct Chains<KO: KeyOps, VO: ValueOps> {
    heads: Vec<Option<DefaultKey>>,
    nodes: SlotMap<DefaultKey, Node<KO, VO>>,
}

impl<KO: KeyOps, VO: ValueOps> Chains<KO, VO> {
    fn chain(&self, head: Option<DefaultKey>) -> impl Iterator<Item = &Node<KO, VO>> + '_ {
        let mut cur = head;
        core::iter::from_fn(move || {
            let node = self.nodes.get(cur?)?;
            cur = node.next;
            Some(node)
        })
    }

    fn bucket(&self, idx: usize) -> impl Iterator<Item = &Node<KO, VO>> + '_ {
        self.chain(self.heads[idx])
    }

    fn find(&self, ops: &KO, hash: u32, key: &KO::Key) -> Option<DefaultKey> {
        let mut cur = self.heads[bucket_index(hash, self.heads.len())];
        while let Some(k) = cur {
            let node = self.nodes.get(k)?;
            if node.hash == hash && ops.key_eq(node.key(), key) {
                return Some(k);
            }
            cur = node.next;
        }
        None
    }

    fn push_front(&mut self, hash: u32, key: KO::Owned, value: VO::Owned) {
        let idx = bucket_index(hash, self.heads.len());
        let next = self.heads[idx];
        let k = self.nodes.insert(Node {
            hash,
            key,
            value,
            next,
        });
        self.heads[idx] = Some(k);
    }

    /// Relink every node into `capacity` fresh heads. Only the head array is
    /// allocated, and before anything moves.
    fn rehash(&mut self, capacity: usize) -> Result<()> {
        let mut heads = alloc_buckets(capacity, || None)?;
        for head in mem::take(&mut self.heads) {
            let mut cur = head;
            while let Some(k) = cur {
                let Some(node) = self.nodes.get_mut(k) else {
                    break;
                };
                cur = node.next;
                let idx = bucket_index(node.hash, capacity);
                node.next = heads[idx];
                heads[idx] = Some(k);
            }
        }
        self.heads = heads;
        Ok(())
    }
}

pub struct ListTable<KO: KeyOps, VO: ValueOps> {
    key_ops: KO,
    value_ops: VO,
    chains: Chains<KO, VO>,
    config: TableConfig,
    busy: BusyMark,
}

impl<KO: KeyOps, VO: ValueOps> ListTable<KO, VO> {
    /// Empty table with [`LIST_INITIAL_CAPACITY`](crate::table::LIST_INITIAL_CAPACITY) buckets.
    pub fn new(key_ops: KO, value_ops: VO) -> Result<Self> {
        Self::with_config(TableConfig::list(), key_ops, value_ops)
    }

    pub fn with_config(config: TableConfig, key_ops: KO, value_ops: VO) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            key_ops,
            value_ops,
            chains: Chains {
                heads: alloc_buckets(config.initial_capacity, || None)?,
                nodes: SlotMap::with_key(),
            },
            config,
            busy: BusyMark::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.chains.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.nodes.is_empty()
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.chains.heads.len()
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
        let k = self.chains.find(&self.key_ops, hash, key)?;
        self.chains.nodes.get(k).map(Node::value)
    }

    pub fn contains(&self, key: &KO::Key) -> bool {
        let _g = self.busy.enter("contains");
        let hash = self.key_ops.hash_key(key);
        self.chains.find(&self.key_ops, hash, key).is_some()
    }

    /// Insert a clone of `key` -> `value`, or replace the value of an
    /// existing equal key. Only insertions can trigger growth.
    ///
    /// The entry node comes from a `SlotMap` arena, which aborts on
    /// out-of-memory rather than returning an error.
    pub fn put(&mut self, key: &KO::Key, value: &VO::Value) -> Result<Put> {
        let _g = self.busy.enter("put");
        let hash = self.key_ops.hash_key(key);

        if let Some(k) = self.chains.find(&self.key_ops, hash, key) {
            if let Some(node) = self.chains.nodes.get_mut(k) {
                let fresh = self.value_ops.clone_value(value);
                let old = mem::replace(&mut node.value, fresh);
                self.value_ops.free_value(old);
                return Ok(Put::Replaced);
            }
        }

        let owned_key = self.key_ops.clone_key(key);
        let owned_value = self.value_ops.clone_value(value);
        self.chains.push_front(hash, owned_key, owned_value);

        let chains = &mut self.chains;
        let growth = grow_if_needed(
            "list",
            chains.nodes.len(),
            chains.heads.len(),
            &self.config,
            |to| chains.rehash(to),
        );
        Ok(Put::Inserted { growth })
    }

    /// Sum over buckets of `entries - 1`; empty buckets contribute nothing.
    pub fn collision_count(&self) -> usize {
        let _g = self.busy.enter("collision_count");
        (0..self.chains.heads.len())
            .map(|i| self.chains.bucket(i).count().saturating_sub(1))
            .sum()
    }

    /// All entries, bucket by bucket. No particular order is promised.
    pub fn iter(&self) -> impl Iterator<Item = (&KO::Key, &VO::Value)> + '_ {
        self.chains
            .heads
            .iter()
            .flat_map(move |&head| self.chains.chain(head))
            .map(|n| (n.key(), n.value()))
    }

    /// Human-readable dump of every bucket, for inspection only.
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
        for i in 0..self.chains.heads.len() {
            writeln!(out, "\tbucket[{i}]:")?;
            for node in self.chains.bucket(i) {
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

    /// Release every key and value through the bundles.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<KO: KeyOps, VO: ValueOps> Drop for ListTable<KO, VO> {
    fn drop(&mut self) {
        let _g = self.busy.enter("destroy");
        for head in mem::take(&mut self.chains.heads) {
            let mut cur = head;
            while let Some(k) = cur {
                let Some(node) = self.chains.nodes.remove(k) else {
                    break;
                };
                cur = node.next;
                self.key_ops.free_key(node.key);
                self.value_ops.free_value(node.value);
            }
        }
    }
}

impl<KO: KeyOps, VO: ValueOps> ChainedTable for ListTable<KO, VO> {
    type K = KO;
    type V = VO;

    fn default_config() -> TableConfig {
        TableConfig::list()
    }

    fn with_config(config: TableConfig, key_ops: KO, value_ops: VO) -> Result<Self> {
        ListTable::with_config(config, key_ops, value_ops)
    }

    fn len(&self) -> usize {
        ListTable::len(self)
    }

    fn capacity(&self) -> usize {
        ListTable::capacity(self)
    }

    fn get(&self, key: &KO::Key) -> Option<&VO::Value> {
        ListTable::get(self, key)
    }

    fn contains(&self, key: &KO::Key) -> bool {
        ListTable::contains(self, key)
    }

    fn put(&mut self, key: &KO::Key, value: &VO::Value) -> Result<Put> {
        ListTable::put(self, key, value)
    }

    fn collision_count(&self) -> usize {
        ListTable::collision_count(self)
    }

    fn debug_print<W, FK, FV>(&self, out: &mut W, print_key: FK, print_val: FV) -> io::Result<()>
    where
        W: Write + ?Sized,
        FK: FnMut(&mut W, &KO::Key) -> io::Result<()>,
        FV: FnMut(&mut W, &VO::Value) -> io::Result<()>,
    {
        ListTable::debug_print(self, out, print_key, print_val)
    }
}
