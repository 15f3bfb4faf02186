/*!
 * Compact in-memory indexes for dump analysis.
 *
 * When analyzing a process or core dump that may itself be gigabytes in
 * size, the analyzer has to track millions of small facts (addresses,
 * block offsets, mark bits) without paying an allocation per fact.  This
 * crate provides the array-backed structures used for that:
 *
 * * [`CompressedRecordArray`]: an append-then-read array of fixed-width
 *   `i32` records, compressed in blocks.
 * * [`BitSetArray`]: an array of sparse bit-sets whose representation grows
 *   with their cardinality.
 * * [`IntegerLruCache`] and [`ObjectLruCache`]: bounded caches with
 *   least-recently-used eviction, plus the unbounded [`IntegerMap`],
 *   [`ObjectMap`] and [`IntegerSet`].
 *
 * # Compressed record arrays
 *
 * Records are appended with [`add`](CompressedRecordArray::add) and sealed
 * with [`close`](CompressedRecordArray::close); after that, any record can be
 * read back with [`get`](CompressedRecordArray::get).  Records are grouped
 * into blocks of 2<sup>`block_size_log2`</sup>.  The first record of each
 * block is stored verbatim as variable-byte integers; later records store
 * the per-field difference from their predecessor.  Each field of each
 * block gets a 4-bit header choosing a Golomb-Rice parameter (2, 7 or 8) or
 * a variable-byte code according to the largest difference seen, and
 * noting whether all differences were positive or all equal.  A field
 * whose differences are all equal costs nothing after the second record.
 *
 * Blocks start on 32-bit word boundaries, and a block index maps each
 * block to its bit offset, so reading a record costs at most one block's
 * worth of decoding.
 *
 * Differences are taken with wrapping 32-bit arithmetic, so every `i32`
 * sequence round-trips exactly, including swings between `i32::MIN` and
 * `i32::MAX`.
 *
 * # Bit-set arrays
 *
 * A [`BitSetArray`] holds one sparse set of bits per index.  Each set starts
 * empty and is promoted as it grows: a single member is packed into the
 * root table itself, then come inline forms for two and three members, a
 * sorted array of up to 16, and finally a sorted list of intervals.  Sets are
 * never demoted.  [`or`](BitSetArray::or) unions one set into another.
 *
 * # Caches and maps
 *
 * The caches and maps are built on a slot-indexed open-addressing hash
 * table ([`SlotTable`]) that maps `u64` keys to small slot numbers.  Values
 * live in a parallel array indexed by slot ([`ValueArray`]), and the LRU
 * caches thread their entries into a doubly linked list through two more
 * parallel arrays.  There are no per-entry allocations.
 *
 * [`IntegerLruCache`] and [`ObjectLruCache`] are guarded by a single lock per
 * instance.  The unsynchronized core is available as [`LruCache`].  Note
 * that `put` on a key that is already cached updates its value without
 * making it most-recently-used; only `get` does that.
 *
 * `IntegerLruCache` and `IntegerMap` reserve `-1` to mean "absent".
 * Storing `-1` panics.
 *
 * # Failure
 *
 * Misusing these structures is a bug in the caller and panics with a
 * message naming the offending value: adding to a closed record array,
 * reading an open one, reading past the end, setting a bit above
 * [`MAX_BIT`](bitset::MAX_BIT) or storing a reserved value.  Invalid
 * construction parameters are reported as [`Error`].  Growth and eviction
 * are handled internally and never fail.
 *
 * # Logging
 *
 * Events are reported through [`tracing`]: closing a record array and
 * rehashing a table at `debug` level, per-block flushes, evictions and
 * bit-set promotions at `trace` level.  The crate never installs a
 * subscriber.
 */

pub mod bitstream;
pub mod bitset;
pub mod table;
pub mod values;
mod error;
mod record_array;
mod lru;
mod maps;

#[cfg(feature="cffi")]
pub mod cffi;

#[cfg(test)]
mod proptests;

pub use error::{Error,Result};
pub use record_array::{CompressedRecordArray,RecordArrayOptions,MAX_BLOCK_SIZE_LOG2};
pub use bitset::BitSetArray;
pub use table::{SlotTable,TableOptions,HasherKey};
pub use values::ValueArray;
pub use lru::{LruCache,SyncLruCache,IntegerLruCache,ObjectLruCache};
pub use maps::{SlotMap,IntegerMap,ObjectMap,IntegerSet};
