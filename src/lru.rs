/*
 * @file lru.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Bounded LRU caches built from a SlotTable and parallel link arrays.
 */

use crate::error::{Error,Result};
use crate::table::{SlotTable,TableOptions,Rehash,NIL};
use crate::values::{ValueArray,IntValues,ObjectValues};
use parking_lot::Mutex;
use std::mem::size_of;
use tracing::trace;

/**
 * Unsynchronized LRU cache from `u64` keys to the values of `A`.
 *
 * Entries live in the slots of a [`SlotTable`].  The `next` and `prev`
 * arrays, indexed by the same slots, thread the live entries into a doubly
 * linked list from `head` (most recently used) to `tail` (least recently
 * used).  Both ends are `NIL` exactly when the cache is empty.
 *
 * A `get` hit moves the entry to the head.  A `put` on a key that is
 * already present overwrites the value but leaves the entry where it is.
 * A `put` on a new key when the cache is full evicts exactly one entry,
 * the tail.
 */
#[derive(Clone,Debug)]
pub struct LruCache<A:ValueArray> {
    table: SlotTable,
    next: Vec<u32>,
    prev: Vec<u32>,
    head: u32,
    tail: u32,
    max_size: usize,
    values: A,
}

impl <A:ValueArray> LruCache<A> {
    /** Create a cache holding at most `max_size` entries. */
    pub fn new(max_size:usize) -> Result<Self> {
        Self::with_options(max_size, &TableOptions::default())
    }

    /**
     * Create a cache holding at most `max_size` entries, with explicit
     * table options.  The table never needs room for more than `max_size`
     * keys, so `initial_capacity` is clamped to it.
     */
    pub fn with_options(max_size:usize, options:&TableOptions) -> Result<Self> {
        if max_size == 0 { return Err(Error::ZeroCapacity); }
        let options = TableOptions {
            initial_capacity: options.initial_capacity.min(max_size),
            ..*options
        };
        let table = SlotTable::new(&options);
        let capacity = table.capacity();
        Ok(LruCache {
            table,
            next: vec![NIL; capacity],
            prev: vec![NIL; capacity],
            head: NIL,
            tail: NIL,
            max_size,
            values: A::allocate(capacity),
        })
    }

    /** Number of entries. */
    pub fn len(&self) -> usize { self.table.len() }

    /** True if the cache holds nothing. */
    pub fn is_empty(&self) -> bool { self.head == NIL }

    /** Maximum number of entries. */
    pub fn max_size(&self) -> usize { self.max_size }

    /** Is `key` cached?  Does not count as a use. */
    pub fn contains_key(&self, key:u64) -> bool {
        self.table.get_index(key).is_some()
    }

    /** Detach `slot` from the list, patching its neighbours and the ends */
    fn unlink(&mut self, slot:usize) {
        let (p,n) = (self.prev[slot], self.next[slot]);
        if p == NIL { self.head = n; } else { self.next[p as usize] = n; }
        if n == NIL { self.tail = p; } else { self.prev[n as usize] = p; }
        self.prev[slot] = NIL;
        self.next[slot] = NIL;
    }

    /** Attach a detached `slot` at the head */
    fn link_front(&mut self, slot:usize) {
        self.prev[slot] = NIL;
        self.next[slot] = self.head;
        if self.head == NIL {
            self.tail = slot as u32;
        } else {
            self.prev[self.head as usize] = slot as u32;
        }
        self.head = slot as u32;
    }

    /**
     * Look up `key` and, on a hit, move it to the head of the recency
     * list.  Returns its slot.
     */
    pub fn get_index_and_promote(&mut self, key:u64) -> Option<usize> {
        let slot = self.table.get_index(key)?;
        if self.head != slot as u32 {
            self.unlink(slot);
            self.link_front(slot);
        }
        Some(slot)
    }

    /**
     * Slot for `key`.  An existing key keeps its place in the recency
     * list.  A new key goes to the head, after evicting the tail if the
     * cache is full.
     */
    pub fn put_index_and_promote(&mut self, key:u64) -> usize {
        if let Some(slot) = self.table.get_index(key) {
            return slot;
        }
        if self.len() >= self.max_size {
            self.evict();
        }
        if let Some(rehash) = self.table.check_rehash() {
            self.relocate(&rehash);
        }
        let slot = self.table.put_index(key);
        self.link_front(slot);
        slot
    }

    /** Drop the least recently used entry */
    fn evict(&mut self) {
        debug_assert!(self.tail != NIL);
        let slot = self.tail as usize;
        let key = self.table.key_at(slot);
        self.unlink(slot);
        self.table.remove_slot(slot);
        self.values.take(slot);
        trace!(key, slot, "evicted least recently used entry");
    }

    /** Rebuild the link and value arrays after the table moved its slots */
    fn relocate(&mut self, rehash:&Rehash) {
        let mut next = vec![NIL; rehash.capacity()];
        let mut prev = vec![NIL; rehash.capacity()];
        for (old,new) in rehash.moves() {
            next[new] = rehash.translate(self.next[old]);
            prev[new] = rehash.translate(self.prev[old]);
        }
        self.next = next;
        self.prev = prev;
        self.head = rehash.translate(self.head);
        self.tail = rehash.translate(self.tail);
        self.values.relocate(rehash);
    }

    /** Look up `key`, marking it most recently used. */
    pub fn get(&mut self, key:u64) -> Option<A::Value> {
        let slot = self.get_index_and_promote(key)?;
        self.values.get(slot)
    }

    /** Insert or overwrite the value for `key`. */
    pub fn put(&mut self, key:u64, value:A::Value) {
        A::validate(&value);
        let slot = self.put_index_and_promote(key);
        self.values.set(slot, value);
    }

    /** Remove `key`, returning its value. */
    pub fn remove(&mut self, key:u64) -> Option<A::Value> {
        let slot = self.table.remove_index(key)?;
        self.unlink(slot);
        self.values.take(slot)
    }

    /** Keys from most to least recently used. */
    pub fn keys_by_recency(&self) -> impl Iterator<Item=u64> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            if cursor == NIL { return None; }
            let slot = cursor as usize;
            cursor = self.next[slot];
            Some(self.table.key_at(slot))
        })
    }

    /** Remove every entry, keeping the allocated capacity. */
    pub fn clear(&mut self) {
        self.table.clear();
        self.next.fill(NIL);
        self.prev.fill(NIL);
        self.head = NIL;
        self.tail = NIL;
        self.values = A::allocate(self.table.capacity());
    }

    /** Approximate heap usage, in bytes. */
    pub fn memory_usage(&self) -> usize {
        self.table.memory_usage()
            + (self.next.capacity() + self.prev.capacity()) * size_of::<u32>()
            + self.values.memory_usage()
    }
}

/**
 * An [`LruCache`] behind one coarse lock, so it can be shared between
 * threads.  Every operation holds the lock for its whole duration.
 */
#[derive(Debug)]
pub struct SyncLruCache<A:ValueArray> {
    inner: Mutex<LruCache<A>>,
}

impl <A:ValueArray> SyncLruCache<A> {
    /** Create a cache holding at most `max_size` entries. */
    pub fn new(max_size:usize) -> Result<Self> {
        Ok(SyncLruCache { inner: Mutex::new(LruCache::new(max_size)?) })
    }

    /** Create a cache with explicit table options. */
    pub fn with_options(max_size:usize, options:&TableOptions) -> Result<Self> {
        Ok(SyncLruCache { inner: Mutex::new(LruCache::with_options(max_size, options)?) })
    }

    pub fn get(&self, key:u64) -> Option<A::Value> { self.inner.lock().get(key) }
    pub fn put(&self, key:u64, value:A::Value) { self.inner.lock().put(key, value) }
    pub fn remove(&self, key:u64) -> Option<A::Value> { self.inner.lock().remove(key) }
    pub fn contains_key(&self, key:u64) -> bool { self.inner.lock().contains_key(key) }
    pub fn len(&self) -> usize { self.inner.lock().len() }
    pub fn is_empty(&self) -> bool { self.inner.lock().is_empty() }
    pub fn max_size(&self) -> usize { self.inner.lock().max_size() }
    pub fn clear(&self) { self.inner.lock().clear() }
    pub fn memory_usage(&self) -> usize { self.inner.lock().memory_usage() }

    /** Snapshot of the keys, most recently used first. */
    pub fn keys_by_recency(&self) -> Vec<u64> {
        self.inner.lock().keys_by_recency().collect()
    }

    /** Unwrap the cache from its lock. */
    pub fn into_inner(self) -> LruCache<A> { self.inner.into_inner() }
}

/**
 * Thread-safe LRU cache of `i32` values.  `-1` is reserved to mean
 * "absent"; storing it panics.
 */
pub type IntegerLruCache = SyncLruCache<IntValues>;

/** Thread-safe LRU cache of arbitrary cloneable values. */
pub type ObjectLruCache<T> = SyncLruCache<ObjectValues<T>>;
