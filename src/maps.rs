/*
 * @file maps.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Unbounded maps and sets over a SlotTable.
 */

use crate::table::{SlotTable,TableOptions};
use crate::values::{ValueArray,IntValues,ObjectValues,NoValues};

/**
 * Map from `u64` keys to the values of `A`, with no eviction.
 *
 * These are purpose-built indexes for dump analysis, not general
 * collections: keys are always `u64` and iteration order is slot order.
 */
#[derive(Clone,Debug)]
pub struct SlotMap<A:ValueArray> {
    table: SlotTable,
    values: A,
}

impl <A:ValueArray> Default for SlotMap<A> {
    fn default() -> Self { Self::new() }
}

impl <A:ValueArray> SlotMap<A> {
    /** Create an empty map with default options. */
    pub fn new() -> Self {
        Self::with_options(&TableOptions::default())
    }

    /** Create an empty map. */
    pub fn with_options(options:&TableOptions) -> Self {
        let table = SlotTable::new(options);
        let values = A::allocate(table.capacity());
        SlotMap { table, values }
    }

    /** Number of keys. */
    pub fn len(&self) -> usize { self.table.len() }

    /** True if there are no keys. */
    pub fn is_empty(&self) -> bool { self.table.is_empty() }

    pub fn contains_key(&self, key:u64) -> bool { self.table.get_index(key).is_some() }

    /** Value for `key`, if any. */
    pub fn get(&self, key:u64) -> Option<A::Value> {
        self.values.get(self.table.get_index(key)?)
    }

    /** Insert or overwrite the value for `key`, returning the old value. */
    pub fn put(&mut self, key:u64, value:A::Value) -> Option<A::Value> {
        A::validate(&value);
        if let Some(slot) = self.table.get_index(key) {
            let old = self.values.take(slot);
            self.values.set(slot, value);
            return old;
        }
        if let Some(rehash) = self.table.check_rehash() {
            self.values.relocate(&rehash);
        }
        let slot = self.table.put_index(key);
        self.values.set(slot, value);
        None
    }

    /** Remove `key`, returning its value. */
    pub fn remove(&mut self, key:u64) -> Option<A::Value> {
        let slot = self.table.remove_index(key)?;
        self.values.take(slot)
    }

    /** All keys, in slot order. */
    pub fn keys(&self) -> impl Iterator<Item=u64> + '_ {
        self.table.occupied_slots().map(|(_,key)| key)
    }

    /** All `(key, value)` pairs, in slot order. */
    pub fn iter(&self) -> impl Iterator<Item=(u64,A::Value)> + '_ {
        self.table.occupied_slots()
            .filter_map(move |(slot,key)| self.values.get(slot).map(|v| (key,v)))
    }

    /** Remove everything, keeping the capacity. */
    pub fn clear(&mut self) {
        self.table.clear();
        self.values = A::allocate(self.table.capacity());
    }

    /** Approximate heap usage, in bytes. */
    pub fn memory_usage(&self) -> usize {
        self.table.memory_usage() + self.values.memory_usage()
    }
}

/** Map from `u64` to `i32`.  `-1` is reserved to mean "absent"; storing it panics. */
pub type IntegerMap = SlotMap<IntValues>;

/** Map from `u64` to arbitrary cloneable values. */
pub type ObjectMap<T> = SlotMap<ObjectValues<T>>;

/** Set of `u64` keys: a [`SlotTable`] with no value array. */
#[derive(Clone,Debug,Default)]
pub struct IntegerSet {
    map: SlotMap<NoValues>,
}

impl IntegerSet {
    pub fn new() -> Self { Self::default() }

    pub fn with_options(options:&TableOptions) -> Self {
        IntegerSet { map: SlotMap::with_options(options) }
    }

    /** Add `key`.  Returns true if it was not already present. */
    pub fn put(&mut self, key:u64) -> bool { self.map.put(key, ()).is_none() }

    /** Remove `key`.  Returns true if it was present. */
    pub fn remove(&mut self, key:u64) -> bool { self.map.remove(key).is_some() }

    pub fn contains(&self, key:u64) -> bool { self.map.contains_key(key) }
    pub fn len(&self) -> usize { self.map.len() }
    pub fn is_empty(&self) -> bool { self.map.is_empty() }
    pub fn keys(&self) -> impl Iterator<Item=u64> + '_ { self.map.keys() }
    pub fn clear(&mut self) { self.map.clear() }
    pub fn memory_usage(&self) -> usize { self.map.memory_usage() }
}

#[cfg(test)]
mod tests {
    use crate::maps::{IntegerMap,ObjectMap,IntegerSet};
    use rand::{Rng,thread_rng};
    use std::collections::{HashMap,HashSet};
    use std::panic::{catch_unwind,AssertUnwindSafe};

    #[test]
    fn test_integer_map() {
        let mut map = IntegerMap::new();
        assert!(map.is_empty());
        assert_eq!(map.put(7, 70), None);
        assert_eq!(map.put(7, 71), Some(70));
        assert_eq!(map.get(7), Some(71));
        assert_eq!(map.get(8), None);
        assert_eq!(map.remove(7), Some(71));
        assert_eq!(map.remove(7), None);
        assert!(map.is_empty());
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn test_integer_map_sentinel() {
        let mut map = IntegerMap::new();
        map.put(1, -1);
    }

    #[test]
    fn test_rejected_put_keeps_old_value() {
        let mut map = IntegerMap::new();
        map.put(7, 70);
        assert!(catch_unwind(AssertUnwindSafe(|| map.put(7, -1))).is_err());
        assert!(catch_unwind(AssertUnwindSafe(|| map.put(8, -1))).is_err());
        assert_eq!(map.get(7), Some(70));
        assert!(!map.contains_key(8));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_random_against_hashmap() {
        let mut rng = thread_rng();
        let mut map : ObjectMap<Vec<u8>> = ObjectMap::new();
        let mut model = HashMap::new();
        for _ in 0..20000 {
            let key = rng.gen_range(0..3000u64);
            if rng.gen_bool(0.7) {
                let value = vec![rng.gen::<u8>(); rng.gen_range(0..4)];
                assert_eq!(map.put(key, value.clone()), model.insert(key, value));
            } else {
                assert_eq!(map.remove(key), model.remove(&key));
            }
        }
        assert_eq!(map.len(), model.len());
        for (key,value) in map.iter() {
            assert_eq!(model.get(&key), Some(&value));
        }
        let keys : HashSet<u64> = map.keys().collect();
        assert_eq!(keys, model.keys().copied().collect());
        map.clear();
        assert_eq!(map.len(), 0);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn test_integer_set() {
        let mut set = IntegerSet::new();
        let before = set.memory_usage();
        for key in 0..1000u64 { assert!(set.put(key * 17)); }
        assert!(!set.put(17));
        assert_eq!(set.len(), 1000);
        assert!(set.contains(17 * 999));
        assert!(!set.contains(18));
        assert!(set.remove(0));
        assert!(!set.remove(0));
        assert_eq!(set.keys().filter(|k| k % 17 != 0).count(), 0);
        assert!(set.memory_usage() > before);
    }
}
