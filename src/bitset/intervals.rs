/*
 * @file intervals.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Run-length form of a bit set: sorted, disjoint, non-adjacent
 * (start, length) runs.
 */

use std::cmp::max;
use std::mem::size_of;

/** A run of set bits: `start .. start+length` */
pub(crate) type Run = (u32, u32);

/** Sorted, non-overlapping, non-adjacent runs. */
#[derive(Clone,Debug,PartialEq,Eq,Default)]
pub(crate) struct Intervals {
    runs: Vec<Run>,
}

impl Intervals {
    /** Build from a sorted, deduplicated slice of bits */
    pub fn from_sorted(bits:&[u32]) -> Intervals {
        let mut runs : Vec<Run> = Vec::with_capacity(bits.len());
        for &bit in bits {
            match runs.last_mut() {
                Some((start,length)) if *start + *length == bit => *length += 1,
                _ => runs.push((bit,1)),
            }
        }
        let mut ret = Intervals { runs };
        ret.maybe_shrink();
        ret
    }

    pub fn runs(&self) -> &[Run] { &self.runs }

    /** Number of set bits */
    pub fn cardinality(&self) -> usize {
        self.runs.iter().map(|&(_,length)| length as usize).sum()
    }

    /** Index of the first run starting after `bit` */
    fn position(&self, bit:u32) -> usize {
        self.runs.partition_point(|&(start,_)| start <= bit)
    }

    pub fn contains(&self, bit:u32) -> bool {
        let p = self.position(bit);
        p > 0 && {
            let (start,length) = self.runs[p-1];
            bit < start + length
        }
    }

    /**
     * Add a bit, extending or joining neighbouring runs.  Returns false
     * if it was already present.
     */
    pub fn insert(&mut self, bit:u32) -> bool {
        let p = self.position(bit);
        let joins_prev = if p > 0 {
            let (start,length) = self.runs[p-1];
            if bit < start + length { return false; }
            start + length == bit
        } else { false };
        let joins_next = p < self.runs.len() && self.runs[p].0 == bit + 1;

        match (joins_prev, joins_next) {
            (true, true) => {
                let (_,next_length) = self.runs.remove(p);
                self.runs[p-1].1 += 1 + next_length;
                self.maybe_shrink();
            },
            (true, false) => self.runs[p-1].1 += 1,
            (false, true) => {
                self.runs[p].0 -= 1;
                self.runs[p].1 += 1;
            },
            (false, false) => self.runs.insert(p, (bit,1)),
        }
        true
    }

    /** self |= other, in one linear merge of the two run lists */
    pub fn union_with(&mut self, other:&Intervals) {
        if other.runs.is_empty() { return; }
        let (a, b) = (&self.runs, &other.runs);
        let mut merged : Vec<Run> = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let run = if j == b.len() || (i < a.len() && a[i].0 <= b[j].0) {
                i += 1; a[i-1]
            } else {
                j += 1; b[j-1]
            };
            match merged.last_mut() {
                Some((start,length)) if run.0 <= *start + *length => {
                    *length = max(*start + *length, run.0 + run.1) - *start;
                },
                _ => merged.push(run),
            }
        }
        self.runs = merged;
        self.maybe_shrink();
    }

    /** Halve the allocation when less than a third of it is in use */
    fn maybe_shrink(&mut self) {
        let capacity = self.runs.capacity();
        if self.runs.len() * 3 < capacity {
            self.runs.shrink_to(max(capacity / 2, self.runs.len()));
        }
    }

    /** Heap bytes */
    pub fn memory_usage(&self) -> usize {
        self.runs.capacity() * size_of::<Run>()
    }
}

#[cfg(test)]
mod tests {
    use crate::bitset::intervals::Intervals;
    use rand::{Rng,thread_rng};
    use std::collections::BTreeSet;

    fn check_invariant(iv:&Intervals) {
        for w in iv.runs().windows(2) {
            let (s0,l0) = w[0];
            assert!(l0 > 0);
            assert!(s0 + l0 < w[1].0, "runs {:?} and {:?} touch", w[0], w[1]);
        }
    }

    #[test]
    fn test_insert_joins_runs() {
        let mut iv = Intervals::from_sorted(&[1,2,3,7,8]);
        assert_eq!(iv.runs(), &[(1,3),(7,2)]);
        assert!(iv.insert(5));
        assert_eq!(iv.runs(), &[(1,3),(5,1),(7,2)]);
        assert!(iv.insert(4));
        assert_eq!(iv.runs(), &[(1,5),(7,2)]);
        assert!(iv.insert(6));
        assert_eq!(iv.runs(), &[(1,8)]);
        assert!(!iv.insert(6));
        assert!(iv.insert(0));
        assert_eq!(iv.runs(), &[(0,9)]);
        assert_eq!(iv.cardinality(), 9);
    }

    #[test]
    fn test_random_inserts() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let mut iv = Intervals::default();
            let mut oracle = BTreeSet::new();
            for _ in 0..300 {
                let bit = rng.gen_range(0..400);
                assert_eq!(iv.insert(bit), oracle.insert(bit));
            }
            check_invariant(&iv);
            assert_eq!(iv.cardinality(), oracle.len());
            for bit in 0..410 { assert_eq!(iv.contains(bit), oracle.contains(&bit)); }
        }
    }

    #[test]
    fn test_union() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let a : BTreeSet<u32> = (0..rng.gen_range(0..200)).map(|_| rng.gen_range(0..300)).collect();
            let b : BTreeSet<u32> = (0..rng.gen_range(0..200)).map(|_| rng.gen_range(0..300)).collect();
            let mut ia = Intervals::from_sorted(&a.iter().copied().collect::<Vec<_>>());
            let ib = Intervals::from_sorted(&b.iter().copied().collect::<Vec<_>>());
            ia.union_with(&ib);
            check_invariant(&ia);
            let both : BTreeSet<u32> = a.union(&b).copied().collect();
            assert_eq!(ia.cardinality(), both.len());
            for bit in 0..310 { assert_eq!(ia.contains(bit), both.contains(&bit)); }
        }
    }

    #[test]
    fn test_shrinks_when_runs_collapse() {
        let bits : Vec<u32> = (0..64).map(|i| 2*i).collect();
        let mut iv = Intervals::from_sorted(&bits);
        let before = iv.runs.capacity();
        for i in 0..63 { iv.insert(2*i + 1); }
        assert_eq!(iv.runs(), &[(0,127)]);
        assert!(iv.runs.capacity() < before);
    }
}
