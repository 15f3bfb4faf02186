/*
 * @file bitstream.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Bit-addressable stream of 32-bit words, with fixed-width,
 * Golomb-Rice and variable-byte codes.
 */

use std::cmp::max;

type Word = u32;
const WORD_BITS : usize = Word::BITS as usize;

/** Mask of the low `nbits` bits */
#[inline(always)]
fn low_mask(nbits:u32) -> Word {
    if nbits >= Word::BITS { !0 } else { (1 << nbits) - 1 }
}

/**
 * Append-only bit stream.
 *
 * Bits are packed most-significant-first into 32-bit words.  The stream
 * starts in write mode; [`rewind`](BitStream::rewind) switches it to read
 * mode for good.  Readers that only have `&self` can use
 * [`reader_at`](BitStream::reader_at) to get an independent cursor.
 */
#[derive(Clone,Debug,Default)]
pub struct BitStream {
    words: Vec<Word>,
    /** Cursor, in bits */
    index: usize,
    /** One past the last bit written */
    end: usize,
    rewound: bool,
}

impl BitStream {
    /** Create an empty stream in write mode. */
    pub fn new() -> Self {
        Self::default()
    }

    /** Create an empty stream with room for `bits` bits. */
    pub fn with_capacity(bits:usize) -> Self {
        BitStream { words: Vec::with_capacity((bits + WORD_BITS - 1) / WORD_BITS), ..Self::default() }
    }

    /** Current cursor position, in bits. */
    pub fn index(&self) -> usize { self.index }

    /** Move the cursor. */
    pub fn set_index(&mut self, pos:usize) {
        assert!(pos <= max(self.end, self.index),
            "bit position {} is past the end of the stream ({} bits)", pos, self.end);
        self.index = pos;
    }

    /** Number of bits written so far. */
    pub fn len_bits(&self) -> usize { self.end }

    /** Has the stream been rewound for reading? */
    pub fn is_rewound(&self) -> bool { self.rewound }

    /**
     * Advance the cursor to the next word boundary.  A no-op if the
     * cursor is already aligned.
     */
    pub fn next_word(&mut self) {
        self.index = (self.index + WORD_BITS - 1) / WORD_BITS * WORD_BITS;
        if !self.rewound { self.end = max(self.end, self.index); }
    }

    /** Finish writing: switch to read mode and move the cursor to the start. */
    pub fn rewind(&mut self) {
        self.rewound = true;
        self.index = 0;
        self.words.shrink_to_fit();
    }

    /** Approximate heap usage, in bytes. */
    pub fn memory_usage(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<Word>()
    }

    /** Make sure the word holding bit `end_bit - 1` exists */
    fn reserve_to(&mut self, end_bit:usize) {
        let need = (end_bit + WORD_BITS - 1) / WORD_BITS;
        if need > self.words.len() {
            self.words.resize(need, 0);
        }
    }

    /** Write the low `nbits` bits of `value`, `nbits <= 32` */
    pub fn write_bits(&mut self, value:u32, nbits:u32) {
        assert!(!self.rewound, "write to a bit stream that has been rewound");
        debug_assert!(nbits <= Word::BITS);
        if nbits == 0 { return; }

        let value = value & low_mask(nbits);
        self.reserve_to(self.index + nbits as usize);
        let word = self.index / WORD_BITS;
        let free = (WORD_BITS - self.index % WORD_BITS) as u32;
        if nbits <= free {
            self.words[word] |= value << (free - nbits);
        } else {
            let spill = nbits - free;
            self.words[word]   |= value >> spill;
            self.words[word+1] |= value << (Word::BITS - spill);
        }
        self.index += nbits as usize;
        self.end = max(self.end, self.index);
    }

    /** Golomb-Rice code: unary quotient, then `param` remainder bits */
    pub fn write_golomb_rice(&mut self, value:u32, param:u32) {
        debug_assert!(param < Word::BITS);
        let mut q = value >> param;
        while q >= Word::BITS - 1 {
            self.write_bits(!0, Word::BITS - 1);
            q -= Word::BITS - 1;
        }
        /* q ones followed by a zero */
        self.write_bits(low_mask(q) << 1, q + 1);
        self.write_bits(value, param);
    }

    /** Variable-byte code: 7 bits per byte, low groups first, high bit = more */
    pub fn write_variable_byte(&mut self, mut value:u32) {
        loop {
            let byte = value & 0x7f;
            value >>= 7;
            if value == 0 {
                self.write_bits(byte, 8);
                return;
            }
            self.write_bits(byte | 0x80, 8);
        }
    }

    /** Independent reader positioned at bit `pos`. */
    pub fn reader_at(&self, pos:usize) -> BitReader<'_> {
        assert!(self.rewound, "read from a bit stream that is still being written");
        assert!(pos <= self.end, "bit position {} is past the end of the stream ({} bits)", pos, self.end);
        BitReader { words: &self.words, index: pos, end: self.end }
    }

    /** Run `f` on a reader at our cursor, then adopt its position */
    fn with_reader<T>(&mut self, f: impl FnOnce(&mut BitReader) -> T) -> T {
        let mut reader = self.reader_at(self.index);
        let ret = f(&mut reader);
        let pos = reader.index;
        self.index = pos;
        ret
    }

    /** Read `nbits <= 32` bits at the cursor. */
    pub fn read_bits(&mut self, nbits:u32) -> u32 {
        self.with_reader(|r| r.read_bits(nbits))
    }

    /** Read a Golomb-Rice code at the cursor. */
    pub fn read_golomb_rice(&mut self, param:u32) -> u32 {
        self.with_reader(|r| r.read_golomb_rice(param))
    }

    /** Read a variable-byte code at the cursor. */
    pub fn read_variable_byte(&mut self) -> u32 {
        self.with_reader(|r| r.read_variable_byte())
    }
}

/** Borrowed read cursor over a rewound [`BitStream`]. */
#[derive(Clone,Debug)]
pub struct BitReader<'a> {
    words: &'a [Word],
    index: usize,
    end: usize,
}

impl <'a> BitReader<'a> {
    /** Current position, in bits. */
    pub fn index(&self) -> usize { self.index }

    /** Move the cursor. */
    pub fn set_index(&mut self, pos:usize) {
        assert!(pos <= self.end, "bit position {} is past the end of the stream ({} bits)", pos, self.end);
        self.index = pos;
    }

    /** Advance to the next word boundary. */
    pub fn next_word(&mut self) {
        self.index = (self.index + WORD_BITS - 1) / WORD_BITS * WORD_BITS;
    }

    /** Read `nbits <= 32` bits. */
    pub fn read_bits(&mut self, nbits:u32) -> u32 {
        debug_assert!(nbits <= Word::BITS);
        if nbits == 0 { return 0; }
        assert!(self.index + nbits as usize <= self.end,
            "read of {} bits at position {} runs past the end of the stream ({} bits)",
            nbits, self.index, self.end);

        let word = self.index / WORD_BITS;
        let free = (WORD_BITS - self.index % WORD_BITS) as u32;
        let ret = if nbits <= free {
            (self.words[word] >> (free - nbits)) & low_mask(nbits)
        } else {
            let spill = nbits - free;
            let hi = self.words[word] & low_mask(free);
            (hi << spill) | (self.words[word+1] >> (Word::BITS - spill))
        };
        self.index += nbits as usize;
        ret
    }

    /** Read a Golomb-Rice code with remainder width `param`. */
    pub fn read_golomb_rice(&mut self, param:u32) -> u32 {
        let mut q = 0u32;
        while self.read_bits(1) == 1 { q += 1; }
        (q << param) | self.read_bits(param)
    }

    /** Read a variable-byte code. */
    pub fn read_variable_byte(&mut self) -> u32 {
        let mut ret = 0u32;
        let mut shift = 0;
        loop {
            let byte = self.read_bits(8);
            ret |= (byte & 0x7f) << shift;
            if byte & 0x80 == 0 { return ret; }
            shift += 7;
            assert!(shift < Word::BITS, "variable-byte code at bit {} is too long", self.index);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bitstream::BitStream;
    use rand::{Rng,thread_rng};

    #[test]
    fn test_fixed_width() {
        let mut rng = thread_rng();
        let mut stream = BitStream::new();
        let mut written = Vec::new();
        for _ in 0..1000 {
            let nbits = rng.gen_range(0..=32u32);
            let value = if nbits == 32 { rng.gen::<u32>() } else { rng.gen::<u32>() & ((1<<nbits)-1) };
            stream.write_bits(value, nbits);
            written.push((value,nbits));
        }
        stream.rewind();
        for (value,nbits) in written {
            assert_eq!(stream.read_bits(nbits), value);
        }
        assert_eq!(stream.index(), stream.len_bits());
    }

    #[test]
    fn test_codes() {
        let mut rng = thread_rng();
        let mut stream = BitStream::new();
        let mut written = Vec::new();
        for _ in 0..1000 {
            let value = match rng.gen_range(0..3) {
                0 => rng.gen_range(0..24),
                1 => rng.gen_range(0..5000),
                _ => rng.gen::<u32>(),
            };
            let param = [2,7,8][rng.gen_range(0..3)];
            let rice = value < 1<<16;
            if rice { stream.write_golomb_rice(value, param); }
            stream.write_variable_byte(value);
            written.push((value,param,rice));
        }
        stream.rewind();
        for (value,param,rice) in written {
            if rice { assert_eq!(stream.read_golomb_rice(param), value); }
            assert_eq!(stream.read_variable_byte(), value);
        }
    }

    #[test]
    fn test_variable_byte_lengths() {
        let mut stream = BitStream::new();
        stream.write_variable_byte(127);
        assert_eq!(stream.index(), 8);
        stream.write_variable_byte(128);
        assert_eq!(stream.index(), 24);
        stream.write_variable_byte(u32::MAX);
        assert_eq!(stream.index(), 64);
    }

    #[test]
    fn test_word_alignment_and_seek() {
        let mut stream = BitStream::new();
        stream.write_bits(0b101, 3);
        stream.next_word();
        assert_eq!(stream.index(), 32);
        let second = stream.index();
        stream.write_golomb_rice(23, 2);
        stream.next_word();
        stream.next_word();
        assert_eq!(stream.index(), 64);
        stream.rewind();

        let mut reader = stream.reader_at(second);
        assert_eq!(reader.read_golomb_rice(2), 23);
        reader.set_index(0);
        assert_eq!(reader.read_bits(3), 0b101);
        assert_eq!(stream.index(), 0);
    }

    #[test]
    #[should_panic(expected = "rewound")]
    fn test_write_after_rewind() {
        let mut stream = BitStream::new();
        stream.write_bits(1, 1);
        stream.rewind();
        stream.write_bits(1, 1);
    }

    #[test]
    #[should_panic(expected = "past the end")]
    fn test_read_past_end() {
        let mut stream = BitStream::new();
        stream.write_bits(7, 3);
        stream.rewind();
        stream.read_bits(4);
    }
}
