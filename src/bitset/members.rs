/*
 * @file members.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Representations of one bit set, from empty up to run-length intervals.
 * A set only ever moves up this ladder.
 */

use crate::bitset::intervals::{Intervals,Run};
use std::cmp::min;
use std::mem::size_of;
use std::slice;
use tracing::trace;

/** Largest sorted-array representation; one more bit switches to intervals. */
pub(crate) const SMALL_CAPACITY : usize = 16;

/** Allocation of a freshly promoted sorted array */
const SMALL_INITIAL : usize = 4;

/** One bit set. */
#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) enum Members {
    Empty,
    Single(u32),
    Two([u32; 2]),
    Three([u32; 3]),
    /** 4 to 16 sorted bits */
    Small(Vec<u32>),
    Intervals(Intervals),
}

impl Members {
    /** Position on the promotion ladder */
    pub(super) fn rank(&self) -> u8 {
        match self {
            Members::Empty => 0,
            Members::Single(_) => 1,
            Members::Two(_) => 2,
            Members::Three(_) => 3,
            Members::Small(_) => 4,
            Members::Intervals(_) => 5,
        }
    }

    /** Add `bit`, promoting to the next representation if this one is full. */
    pub fn with(self, bit:u32) -> Members {
        match self {
            Members::Empty => Members::Single(bit),
            Members::Single(a) => {
                if bit == a { self }
                else if bit < a { Members::Two([bit,a]) }
                else { Members::Two([a,bit]) }
            },
            Members::Two(m) => {
                if m.contains(&bit) { return self; }
                let mut three = [m[0], m[1], bit];
                three.sort_unstable();
                Members::Three(three)
            },
            Members::Three(m) => {
                if m.contains(&bit) { return self; }
                let mut small = Vec::with_capacity(SMALL_INITIAL);
                small.extend_from_slice(&m);
                let pos = small.partition_point(|&x| x < bit);
                small.insert(pos, bit);
                Members::Small(small)
            },
            Members::Small(mut small) => match small.binary_search(&bit) {
                Ok(_) => Members::Small(small),
                Err(pos) if small.len() < SMALL_CAPACITY => {
                    if small.len() == small.capacity() {
                        let grow = min(small.capacity(), SMALL_CAPACITY - small.len());
                        small.reserve_exact(grow);
                    }
                    small.insert(pos, bit);
                    Members::Small(small)
                },
                Err(_) => {
                    let mut intervals = Intervals::from_sorted(&small);
                    intervals.insert(bit);
                    trace!(runs = intervals.runs().len(), "bit set promoted to intervals");
                    Members::Intervals(intervals)
                },
            },
            Members::Intervals(mut intervals) => {
                intervals.insert(bit);
                Members::Intervals(intervals)
            },
        }
    }

    /**
     * self | other.  Smaller-or-equal representations are merged in bit by
     * bit; a larger one is cloned and this one merged into the clone, so
     * the work is linear in the smaller side.
     */
    pub fn union(self, other:&Members) -> Members {
        match (self, other) {
            (Members::Intervals(mut a), Members::Intervals(b)) => {
                a.union_with(b);
                Members::Intervals(a)
            },
            (me, other) if other.rank() > me.rank() => {
                let mut ret = other.clone();
                for bit in me.iter() { ret = ret.with(bit); }
                ret
            },
            (mut me, other) => {
                for bit in other.iter() { me = me.with(bit); }
                me
            },
        }
    }

    pub fn contains(&self, bit:u32) -> bool {
        match self {
            Members::Empty => false,
            Members::Single(a) => *a == bit,
            Members::Two(m) => m.contains(&bit),
            Members::Three(m) => m.contains(&bit),
            Members::Small(small) => small.binary_search(&bit).is_ok(),
            Members::Intervals(intervals) => intervals.contains(bit),
        }
    }

    pub fn cardinality(&self) -> usize {
        match self {
            Members::Empty => 0,
            Members::Single(_) => 1,
            Members::Two(_) => 2,
            Members::Three(_) => 3,
            Members::Small(small) => small.len(),
            Members::Intervals(intervals) => intervals.cardinality(),
        }
    }

    /** Bits in increasing order */
    pub fn iter(&self) -> Elements<'_> {
        match self {
            Members::Empty => Elements::empty(),
            Members::Single(a) => Elements::single(*a),
            Members::Two(m) => Elements::from_slice(m),
            Members::Three(m) => Elements::from_slice(m),
            Members::Small(small) => Elements::from_slice(small),
            Members::Intervals(intervals) => Elements {
                inner: Inner::Runs { runs: intervals.runs().iter(), next: 0, end: 0 }
            },
        }
    }

    /** Heap bytes owned by this representation */
    pub fn heap_usage(&self) -> usize {
        match self {
            Members::Small(small) => small.capacity() * size_of::<u32>(),
            Members::Intervals(intervals) => intervals.memory_usage(),
            _ => 0,
        }
    }
}

/**
 * Iterator over the bits of one set, in increasing order.
 *
 * Iterating an empty slot needs no allocation.
 */
#[derive(Clone,Debug)]
pub struct Elements<'a> {
    inner: Inner<'a>,
}

#[derive(Clone,Debug)]
enum Inner<'a> {
    Slice(slice::Iter<'a, u32>),
    Single(Option<u32>),
    Runs { runs: slice::Iter<'a, Run>, next: u32, end: u32 },
}

impl <'a> Elements<'a> {
    /** An iterator over nothing. */
    pub fn empty() -> Elements<'a> {
        Elements { inner: Inner::Single(None) }
    }

    pub(crate) fn single(bit:u32) -> Elements<'a> {
        Elements { inner: Inner::Single(Some(bit)) }
    }

    fn from_slice(bits:&'a [u32]) -> Elements<'a> {
        Elements { inner: Inner::Slice(bits.iter()) }
    }
}

impl <'a> Iterator for Elements<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match &mut self.inner {
            Inner::Slice(iter) => iter.next().copied(),
            Inner::Single(bit) => bit.take(),
            Inner::Runs { runs, next, end } => {
                while *next == *end {
                    let &(start,length) = runs.next()?;
                    *next = start;
                    *end = start + length;
                }
                *next += 1;
                Some(*next - 1)
            },
        }
    }
}
