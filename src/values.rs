/*
 * @file values.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Slot-indexed value arrays that ride alongside a SlotTable.
 */

use crate::table::Rehash;
use std::mem::size_of;

/**
 * A value array indexed by [`SlotTable`](crate::table::SlotTable) slot.
 *
 * Maps and caches are generic over this trait, so the hot path is
 * monomorphized per value type.  The array is always exactly as long as
 * the table has slots; on a rehash the owner calls
 * [`relocate`](ValueArray::relocate) to move values to their new slots.
 */
pub trait ValueArray {
    /** Type of values stored. */
    type Value;

    /** Allocate an array of `capacity` absent values. */
    fn allocate(capacity:usize) -> Self where Self: Sized;

    /** Number of slots. */
    fn capacity(&self) -> usize;

    /** Value at `slot`, if one is stored there. */
    fn get(&self, slot:usize) -> Option<Self::Value>;

    /**
     * Panic if `value` cannot be stored.  Owners call this before they
     * change any state, so a rejected value leaves them untouched.
     */
    fn validate(_value:&Self::Value) {}

    /** Store `value` at `slot`. */
    fn set(&mut self, slot:usize, value:Self::Value);

    /** Remove and return the value at `slot`. */
    fn take(&mut self, slot:usize) -> Option<Self::Value>;

    /** Approximate heap usage, in bytes. */
    fn memory_usage(&self) -> usize;

    /** Rebuild the array for the table layout described by `rehash`. */
    fn relocate(&mut self, rehash:&Rehash) where Self: Sized {
        let mut fresh = Self::allocate(rehash.capacity());
        for (old,new) in rehash.moves() {
            if let Some(value) = self.take(old) {
                fresh.set(new, value);
            }
        }
        *self = fresh;
    }
}

/** Reserved `i32` meaning "no value" in an [`IntValues`] slot. */
pub const ABSENT : i32 = -1;

/**
 * `i32` values packed in a plain `Vec<i32>`, with [`ABSENT`] marking empty
 * slots.  Storing `-1` as a real value is a contract violation.
 */
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct IntValues(Vec<i32>);

impl ValueArray for IntValues {
    type Value = i32;

    fn allocate(capacity:usize) -> Self { IntValues(vec![ABSENT; capacity]) }

    fn capacity(&self) -> usize { self.0.len() }

    fn get(&self, slot:usize) -> Option<i32> {
        match self.0[slot] {
            ABSENT => None,
            v => Some(v)
        }
    }

    fn validate(value:&i32) {
        assert!(*value != ABSENT, "{} is reserved to mean \"absent\" and cannot be stored", ABSENT);
    }

    fn set(&mut self, slot:usize, value:i32) {
        Self::validate(&value);
        self.0[slot] = value;
    }

    fn take(&mut self, slot:usize) -> Option<i32> {
        let v = std::mem::replace(&mut self.0[slot], ABSENT);
        if v == ABSENT { None } else { Some(v) }
    }

    fn memory_usage(&self) -> usize { self.0.capacity() * size_of::<i32>() }
}

/** Arbitrary values, one `Option<T>` per slot. */
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct ObjectValues<T>(Vec<Option<T>>);

impl <T> Default for ObjectValues<T> {
    fn default() -> Self { ObjectValues(Vec::new()) }
}

impl <T:Clone> ValueArray for ObjectValues<T> {
    type Value = T;

    fn allocate(capacity:usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        ObjectValues(slots)
    }

    fn capacity(&self) -> usize { self.0.len() }
    fn get(&self, slot:usize) -> Option<T> { self.0[slot].clone() }
    fn set(&mut self, slot:usize, value:T) { self.0[slot] = Some(value); }
    fn take(&mut self, slot:usize) -> Option<T> { self.0[slot].take() }

    /** Counts the slot array only, not heap memory owned by the values. */
    fn memory_usage(&self) -> usize { self.0.capacity() * size_of::<Option<T>>() }
}

/**
 * No values at all: a set only needs the table's keys.  Every slot reads
 * as `Some(())` so presence is decided by the table alone.
 */
#[derive(Copy,Clone,Debug,Default,PartialEq,Eq)]
pub struct NoValues(usize);

impl ValueArray for NoValues {
    type Value = ();
    fn allocate(capacity:usize) -> Self { NoValues(capacity) }
    fn capacity(&self) -> usize { self.0 }
    fn get(&self, _slot:usize) -> Option<()> { Some(()) }
    fn set(&mut self, _slot:usize, _value:()) {}
    fn take(&mut self, _slot:usize) -> Option<()> { Some(()) }
    fn memory_usage(&self) -> usize { 0 }
    fn relocate(&mut self, rehash:&Rehash) { self.0 = rehash.capacity(); }
}
