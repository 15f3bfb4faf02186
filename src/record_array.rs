/*
 * @file record_array.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Block-compressed array of fixed-width integer records.
 *
 * Records are appended, then the array is closed and becomes randomly
 * readable.  Each block of 2^k records is delta-coded field by field:
 * the first record verbatim, the rest as differences from the record
 * before.  A 4-bit header per field picks the cheapest code for the
 * block, and each block starts on a word boundary so that it can be
 * found from a small index.
 */

use crate::bitstream::{BitStream,BitReader};
use crate::error::{Error,Result};
use smallvec::{SmallVec,smallvec};
use std::mem::size_of;
use tracing::{debug,trace};

/** Largest supported block size exponent. */
pub const MAX_BLOCK_SIZE_LOG2 : u32 = 16;

/** Record widths up to this many fields decode without heap allocation. */
const INLINE_FIELDS : usize = 32;

/** Decoder scratch, one entry per field */
type FieldScratch<T> = SmallVec<[T; INLINE_FIELDS]>;

/** Header bits per field: all-positive, all-same-delta, 2-bit code selector */
const HEADER_BITS_PER_FIELD : usize = 4;

/**
 * Options to create a [`CompressedRecordArray`].
 *
 * Implements `Default`, which gives single-field records in blocks of 32.
 */
#[derive(Copy,Clone,PartialEq,Eq,Debug)]
pub struct RecordArrayOptions {
    /**
     * Number of `i32` fields per record.  Every record in the array
     * has exactly this many.
     *
     * Default: 1.
     */
    pub record_size: usize,

    /**
     * Records per block, as a power of two.  Larger blocks compress
     * better but a single read decodes up to a whole block.
     *
     * Default: 5 (32 records).
     */
    pub block_size_log2: u32,

    /**
     * Bits of compressed storage to reserve up front.
     *
     * Default: 0.
     */
    pub initial_capacity_bits: usize,
}

impl Default for RecordArrayOptions {
    fn default() -> Self {
        RecordArrayOptions {
            record_size: 1,
            block_size_log2: 5,
            initial_capacity_bits: 0,
        }
    }
}

/** Code used for the deltas of one field within one block */
#[derive(Copy,Clone,PartialEq,Eq,Debug,Default)]
#[repr(u8)]
enum Coding {
    #[default]
    Rice2 = 0,
    Rice7 = 1,
    Rice8 = 2,
    VariableByte = 3,
}

impl Coding {
    /** Pick a code from the largest delta magnitude in the block */
    fn for_max_delta(max:u32) -> Coding {
        if max < 24        { Coding::Rice2 }
        else if max < 384  { Coding::Rice7 }
        else if max < 2048 { Coding::Rice8 }
        else               { Coding::VariableByte }
    }

    fn from_bits(bits:u32) -> Coding {
        match bits & 3 {
            0 => Coding::Rice2,
            1 => Coding::Rice7,
            2 => Coding::Rice8,
            _ => Coding::VariableByte,
        }
    }

    fn write(self, stream:&mut BitStream, magnitude:u32) {
        match self {
            Coding::Rice2 => stream.write_golomb_rice(magnitude, 2),
            Coding::Rice7 => stream.write_golomb_rice(magnitude, 7),
            Coding::Rice8 => stream.write_golomb_rice(magnitude, 8),
            Coding::VariableByte => stream.write_variable_byte(magnitude),
        }
    }

    fn read(self, reader:&mut BitReader) -> u32 {
        match self {
            Coding::Rice2 => reader.read_golomb_rice(2),
            Coding::Rice7 => reader.read_golomb_rice(7),
            Coding::Rice8 => reader.read_golomb_rice(8),
            Coding::VariableByte => reader.read_variable_byte(),
        }
    }
}

/** Per-field, per-block header */
#[derive(Copy,Clone,PartialEq,Eq,Debug,Default)]
struct FieldHeader {
    /** No delta in the block (including the first value) is negative; sign bits omitted */
    all_positive: bool,
    /** Every delta after the first record is the same; only record 1 stores it */
    all_same: bool,
    coding: Coding,
}

impl FieldHeader {
    fn write(&self, stream:&mut BitStream) {
        stream.write_bits(self.all_positive as u32, 1);
        stream.write_bits(self.all_same as u32, 1);
        stream.write_bits(self.coding as u32, 2);
    }

    fn read(reader:&mut BitReader) -> FieldHeader {
        let all_positive = reader.read_bits(1) != 0;
        let all_same = reader.read_bits(1) != 0;
        let coding = Coding::from_bits(reader.read_bits(2));
        FieldHeader { all_positive, all_same, coding }
    }

    /** Write a delta: optional sign bit, then magnitude */
    fn write_delta(&self, stream:&mut BitStream, delta:i32, first:bool) {
        if !self.all_positive { stream.write_bits((delta < 0) as u32, 1); }
        let magnitude = delta.unsigned_abs();
        if first { stream.write_variable_byte(magnitude); }
        else     { self.coding.write(stream, magnitude); }
    }

    fn read_delta(&self, reader:&mut BitReader, first:bool) -> i32 {
        let negative = !self.all_positive && reader.read_bits(1) != 0;
        let magnitude = if first { reader.read_variable_byte() } else { self.coding.read(reader) };
        /* i32::MIN has magnitude 2^31, which wraps back to itself */
        let value = magnitude as i32;
        if negative { value.wrapping_neg() } else { value }
    }
}

/**
 * Append-only, block-compressed array of `i32` records.
 *
 * Lifecycle: [`add`](Self::add) records, [`close`](Self::close) once, then
 * [`get`](Self::get) any record by number.  Adding after close, or reading
 * before it, is a bug in the caller and panics.
 *
 * Deltas are computed with wrapping arithmetic, so any sequence of `i32`
 * values round-trips exactly, including swings between `i32::MIN` and
 * `i32::MAX`.
 */
#[derive(Clone,Debug)]
pub struct CompressedRecordArray {
    record_size: usize,
    block_size_log2: u32,

    /** Compressed blocks, word-aligned */
    stream: BitStream,

    /** Block number -> starting bit of its header */
    block_index: Vec<usize>,

    /** Records of the block being filled, row-major */
    pending: Vec<i32>,
    pending_records: usize,

    /** Scratch: headers of the block being flushed */
    headers: Vec<FieldHeader>,

    len: usize,
    closed: bool,
}

impl CompressedRecordArray {
    /** Create an array of `record_size`-field records in blocks of `2^block_size_log2`. */
    pub fn new(block_size_log2:u32, record_size:usize) -> Result<Self> {
        Self::with_options(&RecordArrayOptions {
            record_size,
            block_size_log2,
            ..RecordArrayOptions::default()
        })
    }

    /** Create an array from options. */
    pub fn with_options(options:&RecordArrayOptions) -> Result<Self> {
        if options.block_size_log2 > MAX_BLOCK_SIZE_LOG2 {
            return Err(Error::InvalidBlockSize { log2: options.block_size_log2, max: MAX_BLOCK_SIZE_LOG2 });
        }
        if options.record_size == 0 {
            return Err(Error::InvalidRecordSize(options.record_size));
        }
        Ok(CompressedRecordArray {
            record_size: options.record_size,
            block_size_log2: options.block_size_log2,
            stream: BitStream::with_capacity(options.initial_capacity_bits),
            block_index: Vec::new(),
            pending: Vec::new(),
            pending_records: 0,
            headers: vec![FieldHeader::default(); options.record_size],
            len: 0,
            closed: false,
        })
    }

    /** Number of records added. */
    pub fn len(&self) -> usize { self.len }

    /** True if no records have been added. */
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /** Fields per record. */
    pub fn record_size(&self) -> usize { self.record_size }

    /** Records per block. */
    pub fn block_size(&self) -> usize { 1 << self.block_size_log2 }

    /** Number of blocks flushed so far.  Includes the trailing partial block after close. */
    pub fn block_count(&self) -> usize { self.block_index.len() }

    /** Has [`close`](Self::close) been called? */
    pub fn is_closed(&self) -> bool { self.closed }

    /** Approximate heap usage, in bytes, from allocated capacities. */
    pub fn memory_usage(&self) -> usize {
        self.stream.memory_usage()
            + self.block_index.capacity() * size_of::<usize>()
            + self.pending.capacity() * size_of::<i32>()
            + self.headers.capacity() * size_of::<FieldHeader>()
    }

    /**
     * Append a record.
     *
     * Panics if the array is closed or `record` is not `record_size` wide.
     */
    pub fn add(&mut self, record:&[i32]) {
        assert!(!self.closed, "add() called on a closed CompressedRecordArray");
        assert_eq!(record.len(), self.record_size,
            "record has {} fields, expected {}", record.len(), self.record_size);

        if self.pending.capacity() == 0 {
            self.pending.reserve_exact(self.block_size() * self.record_size);
        }
        self.pending.extend_from_slice(record);
        self.pending_records += 1;
        self.len += 1;
        if self.pending_records == self.block_size() {
            self.flush_block();
        }
    }

    /**
     * Finish writing.  Flushes the trailing partial block and makes the
     * array readable.  Calling it again does nothing.
     */
    pub fn close(&mut self) {
        if self.closed { return; }
        if self.pending_records > 0 {
            self.flush_block();
        }
        self.stream.rewind();

        /* The write-side buffers are dead now */
        self.pending = Vec::new();
        self.headers = Vec::new();
        self.block_index.shrink_to_fit();
        self.closed = true;

        debug!(records = self.len, blocks = self.block_index.len(),
            bytes = (self.stream.len_bits() + 7) / 8, "closed compressed record array");
    }

    /** Compress the pending records as one block */
    fn flush_block(&mut self) {
        let n = self.pending_records;
        let rs = self.record_size;
        let records = &self.pending;
        let stream = &mut self.stream;
        self.block_index.push(stream.index());

        /* Choose a header for each field */
        for (f, header) in self.headers.iter_mut().enumerate() {
            let mut last = 0i32;
            let mut all_positive = true;
            let mut all_same = true;
            let mut step = None;
            let mut max_delta = 0u32;
            for k in 0..n {
                let value = records[k*rs + f];
                let delta = value.wrapping_sub(last);
                last = value;
                if delta < 0 { all_positive = false; }
                if k == 0 { continue; }
                max_delta = max_delta.max(delta.unsigned_abs());
                match step {
                    None => step = Some(delta),
                    Some(s) => if s != delta { all_same = false; }
                }
            }
            *header = FieldHeader { all_positive, all_same, coding: Coding::for_max_delta(max_delta) };
            header.write(stream);
        }

        /* Payload, record by record */
        for k in 0..n {
            for (f, header) in self.headers.iter().enumerate() {
                let value = records[k*rs + f];
                if k == 0 {
                    header.write_delta(stream, value, true);
                } else if k == 1 || !header.all_same {
                    let delta = value.wrapping_sub(records[(k-1)*rs + f]);
                    header.write_delta(stream, delta, false);
                }
            }
        }
        stream.next_word();

        trace!(block = self.block_index.len() - 1, records = n,
            same_delta_fields = self.headers.iter().filter(|h| h.all_same).count(),
            "flushed record block");

        self.pending.clear();
        self.pending_records = 0;
    }

    /**
     * Decode record `record_number` into `out`.
     *
     * Panics if the array is not closed, the record number is out of
     * range, or `out` is not `record_size` wide.  See [`try_get`](Self::try_get)
     * for a checked version.
     */
    pub fn get(&self, record_number:usize, out:&mut [i32]) {
        if let Err(err) = self.try_get(record_number, out) {
            panic!("CompressedRecordArray::get: {}", err);
        }
    }

    /**
     * Decode record `record_number` into `out`, reporting misuse as an error.
     *
     * Decodes from the start of the record's block, so the cost is at most
     * one block's worth of records.  Does not allocate for records of up
     * to 32 fields.
     */
    pub fn try_get(&self, record_number:usize, out:&mut [i32]) -> Result<()> {
        if !self.closed { return Err(Error::NotClosed); }
        if record_number >= self.len {
            return Err(Error::RecordOutOfBounds { index: record_number, len: self.len });
        }
        if out.len() != self.record_size {
            return Err(Error::RecordWidth { expected: self.record_size, actual: out.len() });
        }

        let block = record_number >> self.block_size_log2;
        let within = record_number & (self.block_size() - 1);
        let mut reader = self.stream.reader_at(self.block_index[block]);

        let headers = self.read_headers(&mut reader);
        debug_assert_eq!(reader.index() - self.block_index[block], HEADER_BITS_PER_FIELD * self.record_size);
        let mut steps : FieldScratch<i32> = smallvec![0; self.record_size];

        for k in 0..=within {
            for f in 0..self.record_size {
                let header = &headers[f];
                if k == 0 {
                    out[f] = header.read_delta(&mut reader, true);
                } else if k >= 2 && header.all_same {
                    out[f] = out[f].wrapping_add(steps[f]);
                } else {
                    let delta = header.read_delta(&mut reader, false);
                    if k == 1 { steps[f] = delta; }
                    out[f] = out[f].wrapping_add(delta);
                }
            }
        }
        Ok(())
    }

    /** Decode the field headers at the start of a block */
    fn read_headers(&self, reader:&mut BitReader) -> FieldScratch<FieldHeader> {
        (0..self.record_size).map(|_| FieldHeader::read(reader)).collect()
    }
}
