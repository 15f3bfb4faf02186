/*
 * @file proptests.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Property tests against simple reference models.
 */

use crate::{CompressedRecordArray,BitSetArray,LruCache,IntegerSet};
use crate::values::IntValues;
use proptest::prelude::*;
use std::collections::{BTreeSet,VecDeque,HashMap};

/** Values with a mix of small steps and arbitrary jumps */
fn field_strategy() -> impl Strategy<Value = i32> {
    prop_oneof![
        3 => -40i32..40,
        1 => any::<i32>(),
        1 => prop_oneof![Just(i32::MIN), Just(i32::MAX), Just(0)],
    ]
}

fn records_strategy() -> impl Strategy<Value = (u32, usize, Vec<Vec<i32>>)> {
    (0u32..10, 1usize..=20).prop_flat_map(|(log2, width)| {
        (Just(log2), Just(width),
         prop::collection::vec(prop::collection::vec(field_strategy(), width), 0..300))
    })
}

#[derive(Clone, Debug)]
enum Op {
    Get(u64),
    Put(u64, i32),
    Remove(u64),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = 0u64..40;
    let op = prop_oneof![
        40 => key.clone().prop_map(Op::Get),
        50 => (key.clone(), 0i32..1000).prop_map(|(k, v)| Op::Put(k, v)),
        10 => key.prop_map(Op::Remove),
    ];
    prop::collection::vec(op, 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_record_round_trip((log2, width, records) in records_strategy()) {
        let mut array = CompressedRecordArray::new(log2, width).unwrap();
        for record in &records { array.add(record); }
        array.close();
        prop_assert_eq!(array.len(), records.len());

        let mut out = vec![0; width];
        for (i, record) in records.iter().enumerate() {
            array.get(i, &mut out);
            prop_assert_eq!(&out, record, "record {}", i);
        }
        /* Random access in reverse order too */
        for i in (0..records.len()).rev().step_by(7) {
            array.get(i, &mut out);
            prop_assert_eq!(&out, &records[i]);
        }
    }

    #[test]
    fn prop_bitset_union(
        a in prop::collection::vec(0u32..300, 0..40),
        b in prop::collection::vec(0u32..300, 0..40),
    ) {
        let mut sets = BitSetArray::new();
        for &bit in &a { sets.set(0, bit); sets.set(0, bit); }
        for &bit in &b { sets.set(1, bit); }

        let oracle_a : BTreeSet<u32> = a.iter().copied().collect();
        let oracle_b : BTreeSet<u32> = b.iter().copied().collect();
        prop_assert_eq!(sets.elements(0).collect::<BTreeSet<_>>(), oracle_a.clone());

        sets.or(0, 1);
        let members : Vec<u32> = sets.elements(0).collect();
        prop_assert!(members.windows(2).all(|w| w[0] < w[1]), "not strictly increasing: {:?}", members);
        let union : Vec<u32> = oracle_a.union(&oracle_b).copied().collect();
        prop_assert_eq!(&members, &union);
        prop_assert_eq!(sets.cardinality(0), union.len());
        prop_assert_eq!(sets.elements(1).collect::<BTreeSet<_>>(), oracle_b);
    }

    #[test]
    fn prop_lru_equivalence(max_size in 1usize..16, ops in ops_strategy()) {
        let mut cache = LruCache::<IntValues>::new(max_size).unwrap();
        /* Front is most recently used */
        let mut order : VecDeque<u64> = VecDeque::new();
        let mut values : HashMap<u64, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Get(key) => {
                    let expected = values.get(&key).copied();
                    if expected.is_some() {
                        order.retain(|&k| k != key);
                        order.push_front(key);
                    }
                    prop_assert_eq!(cache.get(key), expected);
                }
                Op::Put(key, value) => {
                    if values.insert(key, value).is_none() {
                        if order.len() >= max_size {
                            if let Some(evicted) = order.pop_back() { values.remove(&evicted); }
                        }
                        order.push_front(key);
                    }
                    cache.put(key, value);
                }
                Op::Remove(key) => {
                    order.retain(|&k| k != key);
                    prop_assert_eq!(cache.remove(key), values.remove(&key));
                }
            }
            prop_assert!(cache.len() <= max_size);
        }
        prop_assert_eq!(cache.keys_by_recency().collect::<Vec<_>>(), order.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_integer_set(keys in prop::collection::vec(any::<u64>(), 0..500)) {
        let mut set = IntegerSet::new();
        let mut oracle = BTreeSet::new();
        for &key in &keys {
            prop_assert_eq!(set.put(key), oracle.insert(key));
        }
        prop_assert_eq!(set.keys().collect::<BTreeSet<_>>(), oracle);
    }
}
