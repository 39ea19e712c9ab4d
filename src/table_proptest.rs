// Property tests for both table variants, kept inside the crate so they can
// inspect internals through the shared `ChainedTable` surface.

use crate::ops::{KeyOps, ValueOps};
use crate::string_ops::STRING_OPS;
use crate::table::{ChainedTable, Growth, Put, TableConfig};
use crate::{ListTable, VecTable};
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

// Text keys whose hash is squeezed into `spread` distinct values so that
// chains get long; clone/free calls are tallied.
#[derive(Clone)]
struct Squeezed {
    spread: u32,
    live: Rc<Cell<isize>>,
}

impl KeyOps for Squeezed {
    type Key = str;
    type Owned = String;

    fn hash_key(&self, key: &str) -> u32 {
        STRING_OPS.hash_key(key) % self.spread
    }
    fn clone_key(&self, key: &str) -> String {
        self.live.set(self.live.get() + 1);
        key.to_owned()
    }
    fn free_key(&self, key: String) {
        self.live.set(self.live.get() - 1);
        drop(key);
    }
    fn key_eq(&self, a: &str, b: &str) -> bool {
        a == b
    }
}

impl ValueOps for Squeezed {
    type Value = i32;
    type Owned = i32;

    fn clone_value(&self, value: &i32) -> i32 {
        self.live.set(self.live.get() + 1);
        *value
    }
    fn free_value(&self, _value: i32) {
        self.live.set(self.live.get() - 1);
    }
    fn value_eq(&self, a: &i32, b: &i32) -> bool {
        a == b
    }
}

#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Get(usize),
    Contains(String),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Get),
            1 => "[a-z]{0,6}".prop_map(Op::Contains),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Model check against std::collections::HashMap:
// - get returns the most recent value put for a key, None otherwise.
// - contains agrees with the model; len equals the number of distinct keys.
// - Put reports Replaced exactly when the key was present.
// - capacity only changes through a reported Growth::Grew that doubles it.
// - collision_count never exceeds len - 1.
// - after drop, every clone has been freed.
fn run_model<T>(
    table: T,
    pool: &[String],
    ops: Vec<Op>,
    live: &Cell<isize>,
) -> Result<(), TestCaseError>
where
    T: ChainedTable<K = Squeezed, V = Squeezed>,
{
    let mut sut = table;
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = &pool[i];
                let before = sut.capacity();
                let existed = model.insert(k.clone(), v).is_some();
                match sut.put(k.as_str(), &v).expect("put") {
                    Put::Replaced => prop_assert!(existed),
                    Put::Inserted { growth } => {
                        prop_assert!(!existed);
                        match growth {
                            Growth::NotNeeded => prop_assert_eq!(sut.capacity(), before),
                            Growth::Grew { from, to } => {
                                prop_assert_eq!(from, before);
                                prop_assert_eq!(to, before * 2);
                                prop_assert_eq!(sut.capacity(), to);
                            }
                            Growth::Skipped(e) => prop_assert!(false, "unexpected skip: {e}"),
                        }
                    }
                }
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()).copied(), model.get(k).copied());
            }
            Op::Contains(k) => {
                prop_assert_eq!(sut.contains(k.as_str()), model.contains_key(&k));
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.len() <= sut.capacity());
        prop_assert!(sut.collision_count() <= sut.len().saturating_sub(1));
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k.as_str()), Some(v));
    }
    prop_assert_eq!(live.get() as usize, 2 * model.len());
    sut.destroy();
    prop_assert_eq!(live.get(), 0);
    Ok(())
}

fn small(initial: usize) -> TableConfig {
    TableConfig::list()
        .with_initial_capacity(initial)
        .with_bucket_capacity(1)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_list_table_matches_model(
        (pool, ops) in arb_scenario(),
        initial in 1usize..8,
        spread in 1u32..64,
    ) {
        let live = Rc::new(Cell::new(0));
        let ops_bundle = Squeezed { spread, live: live.clone() };
        let t = ListTable::with_config(small(initial), ops_bundle.clone(), ops_bundle).unwrap();
        run_model(t, &pool, ops, &live)?;
    }

    #[test]
    fn prop_vec_table_matches_model(
        (pool, ops) in arb_scenario(),
        initial in 1usize..8,
        spread in 1u32..64,
    ) {
        let live = Rc::new(Cell::new(0));
        let ops_bundle = Squeezed { spread, live: live.clone() };
        let t = VecTable::with_config(small(initial), ops_bundle.clone(), ops_bundle).unwrap();
        run_model(t, &pool, ops, &live)?;
    }
}
