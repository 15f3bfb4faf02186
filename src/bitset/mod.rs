/*
 * @file mod.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Array of small sparse bit sets, one per slot.  Most slots hold zero
 * or one bit, so those are packed straight into a root table of `i32`s;
 * bigger sets live in a side table and climb through progressively
 * heavier representations as they fill.
 */

mod intervals;
mod members;

pub use members::Elements;
use members::Members;
use std::cmp::max;
use std::mem::{replace,size_of};

/** Largest bit that can be stored. */
pub const MAX_BIT : u32 = i32::MAX as u32;

/** Root entries with this bit set hold a single member in the low 31 bits */
const SINGLE_FLAG : i32 = i32::MIN;

/** Decoded root table entry */
enum Root {
    Empty,
    Single(u32),
    /** Index into the side table */
    Set(usize),
}

impl Root {
    fn decode(root:i32) -> Root {
        if root == 0 { Root::Empty }
        else if root < 0 { Root::Single((root & !SINGLE_FLAG) as u32) }
        else { Root::Set(root as usize - 1) }
    }
}

/**
 * An array of independently growable bit sets.
 *
 * Slot `i` starts out empty; [`set`](Self::set) grows the array as
 * needed.  Not thread-safe: one owner mutates it.
 */
#[derive(Clone,Debug,Default)]
pub struct BitSetArray {
    /** 0 = empty, negative = one packed member, positive = 1 + side table index */
    roots: Vec<i32>,
    /** Sets with two or more members */
    sets: Vec<Members>,
}

impl BitSetArray {
    /** Create an empty array. */
    pub fn new() -> Self {
        Self::default()
    }

    /** Create an array with `slots` empty slots preallocated. */
    pub fn with_capacity(slots:usize) -> Self {
        BitSetArray { roots: vec![0; slots], sets: Vec::new() }
    }

    /** Number of slots currently addressable without growing. */
    pub fn size(&self) -> usize { self.roots.len() }

    /** Grow the root table by half, or to fit `index` if that is more */
    fn grow_to_fit(&mut self, index:usize) {
        if index >= self.roots.len() {
            let new_len = max(index + 1, self.roots.len() + self.roots.len() / 2);
            self.roots.resize(new_len, 0);
        }
    }

    fn root(&self, index:usize) -> Root {
        self.roots.get(index).map_or(Root::Empty, |&r| Root::decode(r))
    }

    /** Store a multi-member set and return its root entry */
    fn push_set(&mut self, members:Members) -> i32 {
        assert!(self.sets.len() < i32::MAX as usize, "BitSetArray side table is full");
        self.sets.push(members);
        self.sets.len() as i32
    }

    /** Set `bit` in the set at slot `index`.  Setting a present bit does nothing. */
    pub fn set(&mut self, index:usize, bit:u32) {
        assert!(bit <= MAX_BIT, "bit {} is out of range (max {})", bit, MAX_BIT);
        self.grow_to_fit(index);
        match self.root(index) {
            Root::Empty => self.roots[index] = SINGLE_FLAG | bit as i32,
            Root::Single(a) => if a != bit {
                let root = self.push_set(Members::Single(a).with(bit));
                self.roots[index] = root;
            },
            Root::Set(s) => {
                let members = replace(&mut self.sets[s], Members::Empty);
                self.sets[s] = members.with(bit);
            },
        }
    }

    /**
     * Union the set at `from` into the set at `to`.  The `from` set is
     * left unchanged.
     */
    pub fn or(&mut self, to:usize, from:usize) {
        if to == from { return; }
        let from_set = match self.root(from) {
            Root::Empty => return,
            Root::Single(bit) => return self.set(to, bit),
            Root::Set(s) => s,
        };
        self.grow_to_fit(to);
        match self.root(to) {
            Root::Empty => {
                let copy = self.sets[from_set].clone();
                let root = self.push_set(copy);
                self.roots[to] = root;
            },
            Root::Single(bit) => {
                let merged = Members::Single(bit).union(&self.sets[from_set]);
                let root = self.push_set(merged);
                self.roots[to] = root;
            },
            Root::Set(s) => {
                let members = replace(&mut self.sets[s], Members::Empty);
                self.sets[s] = members.union(&self.sets[from_set]);
            },
        }
    }

    /** Is `bit` set in slot `index`?  Slots past the end are empty. */
    pub fn contains(&self, index:usize, bit:u32) -> bool {
        match self.root(index) {
            Root::Empty => false,
            Root::Single(a) => a == bit,
            Root::Set(s) => self.sets[s].contains(bit),
        }
    }

    /** Number of bits set in slot `index`. */
    pub fn cardinality(&self, index:usize) -> usize {
        match self.root(index) {
            Root::Empty => 0,
            Root::Single(_) => 1,
            Root::Set(s) => self.sets[s].cardinality(),
        }
    }

    /** The bits of slot `index`, in increasing order. */
    pub fn elements(&self, index:usize) -> Elements<'_> {
        match self.root(index) {
            Root::Empty => Elements::empty(),
            Root::Single(a) => Elements::single(a),
            Root::Set(s) => self.sets[s].iter(),
        }
    }

    /** Approximate heap usage, in bytes, from allocated capacities. */
    pub fn memory_usage(&self) -> usize {
        self.roots.capacity() * size_of::<i32>()
            + self.sets.capacity() * size_of::<Members>()
            + self.sets.iter().map(|m| m.heap_usage()).sum::<usize>()
    }
}
