/*
 * @file table.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Open-addressing hash table from u64 keys to stable slot numbers.
 *
 * The table only stores keys; owners keep their values (and anything
 * else) in arrays indexed by slot.  Deleted slots become tombstones so
 * probe chains stay intact.  Slots only move on a rehash, which the
 * owner asks for explicitly and then applies to its own arrays.
 */

use rand::RngCore;
use rand::rngs::OsRng;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;
use std::mem::size_of;
use tracing::debug;

/** A key for the SipHash13 hash function. */
pub type HasherKey = [u8; 16];

/** Smallest table, in slots. */
pub const MIN_CAPACITY : usize = 8;

/** Rehash when used slots (live + tombstones) would exceed 3/4 */
const LOAD_NUM : usize = 3;
const LOAD_DEN : usize = 4;

/** Marker for "no slot" in slot-indexed `u32` arrays. */
pub(crate) const NIL : u32 = u32::MAX;

/** State of one slot. */
#[derive(Copy,Clone,PartialEq,Eq,Debug)]
#[repr(u8)]
pub enum SlotState {
    Empty,
    Occupied,
    /** Tombstone left by a removal */
    Deleted,
}

/**
 * Options to create a [`SlotTable`] and the maps and caches built on it.
 *
 * Implements `Default`.
 */
#[derive(Copy,Clone,PartialEq,Eq,Debug)]
pub struct TableOptions {
    /**
     * Number of keys to make room for up front.
     *
     * Default: 16.
     */
    pub initial_capacity: usize,

    /**
     * Optional hash key.  If omitted, a fresh random key is drawn
     * from the OS for each table.
     *
     * Default: `None`.
     */
    pub key_gen: Option<HasherKey>,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions { initial_capacity: 16, key_gen: None }
    }
}

/** Either use the given hash key or draw a fresh one */
fn choose_key(key_gen:Option<HasherKey>) -> HasherKey {
    key_gen.unwrap_or_else(|| {
        let mut key = [0u8; 16];
        OsRng.fill_bytes(&mut key);
        key
    })
}

/** Slots needed to hold `keys` keys under the load limit */
fn capacity_for(keys:usize) -> usize {
    (keys * LOAD_DEN / LOAD_NUM + 1).next_power_of_two().max(MIN_CAPACITY)
}

/**
 * Outcome of [`SlotTable::check_rehash`]: the new capacity and where
 * each old slot went.  Owners rebuild their slot-indexed arrays from it.
 */
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Rehash {
    capacity: usize,
    /** Old slot -> new slot, or NIL if the old slot was not occupied */
    moved_to: Vec<u32>,
}

impl Rehash {
    /** Capacity of the rebuilt table. */
    pub fn capacity(&self) -> usize { self.capacity }

    /** Where the entry in old slot `old` now lives, if there was one. */
    pub fn new_slot(&self, old:usize) -> Option<usize> {
        match self.moved_to.get(old) {
            Some(&s) if s != NIL => Some(s as usize),
            _ => None,
        }
    }

    /** Translate a slot link, keeping NIL as NIL */
    pub(crate) fn translate(&self, old:u32) -> u32 {
        if old == NIL { NIL } else { self.moved_to[old as usize] }
    }

    /** `(old, new)` for every entry that survived. */
    pub fn moves(&self) -> impl Iterator<Item=(usize,usize)> + '_ {
        self.moved_to.iter().enumerate()
            .filter(|&(_,&s)| s != NIL)
            .map(|(old,&s)| (old, s as usize))
    }
}

/** Slot-indexed open-addressing hash table over `u64` keys. */
#[derive(Clone,Debug)]
pub struct SlotTable {
    keys: Vec<u64>,
    state: Vec<SlotState>,
    occupied: usize,
    deleted: usize,
    hash_key: HasherKey,
}

impl SlotTable {
    /** Create a table sized for `options.initial_capacity` keys. */
    pub fn new(options:&TableOptions) -> Self {
        let capacity = capacity_for(options.initial_capacity);
        SlotTable {
            keys: vec![0; capacity],
            state: vec![SlotState::Empty; capacity],
            occupied: 0,
            deleted: 0,
            hash_key: choose_key(options.key_gen),
        }
    }

    /** Number of slots. */
    pub fn capacity(&self) -> usize { self.keys.len() }

    /** Number of live keys. */
    pub fn len(&self) -> usize { self.occupied }

    /** True if there are no live keys. */
    pub fn is_empty(&self) -> bool { self.occupied == 0 }

    /** Number of tombstones. */
    pub fn deleted_slots(&self) -> usize { self.deleted }

    /** Live keys plus tombstones: the slots that lengthen probes. */
    pub fn slots_in_use(&self) -> usize { self.occupied + self.deleted }

    /** State of slot `slot`. */
    pub fn state(&self, slot:usize) -> SlotState { self.state[slot] }

    /** Is slot `slot` holding a live key? */
    pub fn is_occupied(&self, slot:usize) -> bool { self.state[slot] == SlotState::Occupied }

    /** The key stored in an occupied slot. */
    pub fn key_at(&self, slot:usize) -> u64 {
        debug_assert!(self.is_occupied(slot));
        self.keys[slot]
    }

    /** Live `(slot, key)` pairs in slot order. */
    pub fn occupied_slots(&self) -> impl Iterator<Item=(usize,u64)> + '_ {
        self.state.iter().enumerate()
            .filter(|&(_,&st)| st == SlotState::Occupied)
            .map(move |(slot,_)| (slot, self.keys[slot]))
    }

    /** Home slot of `key` for a table of `capacity` slots */
    fn home(hash_key:&HasherKey, key:u64, capacity:usize) -> usize {
        let mut h = SipHasher13::new_with_key(hash_key);
        h.write_u64(key);
        (h.finish() as usize) & (capacity - 1)
    }

    /** Slot holding `key`, if present. */
    pub fn get_index(&self, key:u64) -> Option<usize> {
        let mask = self.capacity() - 1;
        let mut slot = Self::home(&self.hash_key, key, self.capacity());
        for _ in 0..self.capacity() {
            match self.state[slot] {
                SlotState::Empty => return None,
                SlotState::Occupied if self.keys[slot] == key => return Some(slot),
                _ => slot = (slot + 1) & mask,
            }
        }
        None
    }

    /**
     * Slot for `key`, inserting it if absent.  A new key takes the first
     * tombstone on its probe path, if any.
     *
     * Owners call [`check_rehash`](Self::check_rehash) first so that the
     * table always has a free slot.
     */
    pub fn put_index(&mut self, key:u64) -> usize {
        let mask = self.capacity() - 1;
        let mut slot = Self::home(&self.hash_key, key, self.capacity());
        let mut tombstone = None;
        for _ in 0..self.capacity() {
            match self.state[slot] {
                SlotState::Empty => return self.occupy(tombstone.unwrap_or(slot), key),
                SlotState::Occupied if self.keys[slot] == key => return slot,
                SlotState::Deleted if tombstone.is_none() => tombstone = Some(slot),
                _ => {},
            }
            slot = (slot + 1) & mask;
        }
        /* No empty slot at all: only legal if we passed a tombstone */
        match tombstone {
            Some(target) => self.occupy(target, key),
            None => panic!("SlotTable is full ({} slots); check_rehash() was not called", self.capacity()),
        }
    }

    /** Store `key` in an empty or tombstoned slot */
    fn occupy(&mut self, slot:usize, key:u64) -> usize {
        if self.state[slot] == SlotState::Deleted { self.deleted -= 1; }
        self.keys[slot] = key;
        self.state[slot] = SlotState::Occupied;
        self.occupied += 1;
        slot
    }

    /** Remove `key`, returning the slot it occupied. */
    pub fn remove_index(&mut self, key:u64) -> Option<usize> {
        let slot = self.get_index(key)?;
        self.remove_slot(slot);
        Some(slot)
    }

    /** Tombstone an occupied slot. */
    pub fn remove_slot(&mut self, slot:usize) {
        assert!(self.is_occupied(slot), "slot {} is not occupied", slot);
        self.state[slot] = SlotState::Deleted;
        self.occupied -= 1;
        self.deleted += 1;
    }

    /** Forget every key, keeping the capacity. */
    pub fn clear(&mut self) {
        self.state.fill(SlotState::Empty);
        self.occupied = 0;
        self.deleted = 0;
    }

    /**
     * Make room for one more key.
     *
     * If one more key would take the used slots past 3/4 of capacity, the
     * table is rebuilt: at double the size if live keys alone fill more
     * than half of it, otherwise at the same size just to drop tombstones.
     * Returns how slots moved, so the owner can rebuild its own arrays.
     */
    pub fn check_rehash(&mut self) -> Option<Rehash> {
        let capacity = self.capacity();
        if (self.slots_in_use() + 1) * LOAD_DEN <= capacity * LOAD_NUM {
            return None;
        }
        let new_capacity = if (self.occupied + 1) * 2 > capacity { capacity * 2 } else { capacity };
        Some(self.rebuild(new_capacity))
    }

    /** Reinsert every live key into a table of `new_capacity` slots */
    fn rebuild(&mut self, new_capacity:usize) -> Rehash {
        debug_assert!(new_capacity.is_power_of_two() && new_capacity > self.occupied);
        let mask = new_capacity - 1;
        let mut keys = vec![0u64; new_capacity];
        let mut state = vec![SlotState::Empty; new_capacity];
        let mut moved_to = vec![NIL; self.capacity()];

        for (old,key) in self.occupied_slots() {
            let mut slot = Self::home(&self.hash_key, key, new_capacity);
            while state[slot] != SlotState::Empty { slot = (slot + 1) & mask; }
            keys[slot] = key;
            state[slot] = SlotState::Occupied;
            moved_to[old] = slot as u32;
        }

        debug!(old_capacity = self.capacity(), new_capacity, live = self.occupied,
            purged = self.deleted, "rehashed slot table");
        self.keys = keys;
        self.state = state;
        self.deleted = 0;
        Rehash { capacity: new_capacity, moved_to }
    }

    /** Approximate heap usage, in bytes. */
    pub fn memory_usage(&self) -> usize {
        self.keys.capacity() * size_of::<u64>() + self.state.capacity() * size_of::<SlotState>()
    }
}

#[cfg(test)]
mod tests {
    use crate::table::{SlotTable,TableOptions,SlotState,MIN_CAPACITY};
    use rand::{Rng,thread_rng};
    use std::collections::HashMap;

    fn fixed_options() -> TableOptions {
        TableOptions { initial_capacity: 4, key_gen: Some([7u8; 16]) }
    }

    #[test]
    fn test_put_get_remove() {
        let mut table = SlotTable::new(&fixed_options());
        assert_eq!(table.capacity(), MIN_CAPACITY);
        assert!(table.check_rehash().is_none());
        let slot = table.put_index(42);
        assert_eq!(table.put_index(42), slot);
        assert_eq!(table.get_index(42), Some(slot));
        assert_eq!(table.get_index(43), None);
        assert_eq!(table.remove_index(42), Some(slot));
        assert_eq!(table.state(slot), SlotState::Deleted);
        assert_eq!((table.len(), table.deleted_slots()), (0, 1));
        assert_eq!(table.remove_index(42), None);

        /* The tombstone is reused */
        let again = table.put_index(42);
        assert_eq!(again, slot);
        assert_eq!((table.len(), table.deleted_slots()), (1, 0));
    }

    #[test]
    fn test_random_against_hashmap() {
        let mut rng = thread_rng();
        let mut table = SlotTable::new(&TableOptions::default());
        /* key -> slot, rebuilt through rehashes */
        let mut model : HashMap<u64,usize> = HashMap::new();
        for _ in 0..20000 {
            let key = rng.gen_range(0..2000u64);
            if rng.gen_bool(0.6) {
                if let Some(rehash) = table.check_rehash() {
                    for slot in model.values_mut() {
                        *slot = rehash.new_slot(*slot).unwrap();
                    }
                    assert_eq!(rehash.moves().count(), model.len());
                }
                let slot = table.put_index(key);
                if let Some(&old) = model.get(&key) { assert_eq!(old, slot); }
                model.insert(key, slot);
            } else {
                assert_eq!(table.remove_index(key), model.remove(&key));
            }
            assert!(table.slots_in_use() < table.capacity());
        }
        assert_eq!(table.len(), model.len());
        for (&key,&slot) in &model {
            assert_eq!(table.get_index(key), Some(slot));
            assert_eq!(table.key_at(slot), key);
        }
    }

    #[test]
    fn test_rehash_purges_tombstones_in_place() {
        let mut table = SlotTable::new(&fixed_options());
        for key in 0..6 {
            assert!(table.check_rehash().is_none());
            table.put_index(key);
        }
        for key in 0..5 { table.remove_index(key); }
        assert_eq!((table.len(), table.slots_in_use()), (1, 6));
        let capacity = table.capacity();
        let rehash = table.check_rehash().unwrap();
        assert_eq!(rehash.capacity(), capacity);
        assert_eq!(rehash.moves().count(), 1);
        assert_eq!(table.deleted_slots(), 0);
        assert_eq!(table.get_index(5), rehash.new_slot(rehash.moves().next().unwrap().0));
    }

    #[test]
    fn test_rehash_grows() {
        let mut table = SlotTable::new(&fixed_options());
        let mut grew = false;
        for key in 0..100 {
            if let Some(rehash) = table.check_rehash() {
                grew |= rehash.capacity() > MIN_CAPACITY;
            }
            table.put_index(key);
        }
        assert!(grew);
        assert!(table.capacity() >= 128);
        for key in 0..100 { assert!(table.get_index(key).is_some()); }
    }
}
