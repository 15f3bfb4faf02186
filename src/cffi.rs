/*
 * @file cffi.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * C foreign function interface.
 * Failures come back as null pointers or `false`; nothing here panics on
 * bad input from C.
 */

use crate::{CompressedRecordArray,BitSetArray,IntegerLruCache,IntegerMap};
use crate::bitset::MAX_BIT;
use crate::values::ABSENT;
use core::ptr::NonNull;
use core::slice::{from_raw_parts,from_raw_parts_mut};

/****************************************************************************
 * Compressed record arrays
 ****************************************************************************/

#[no_mangle]
/// Create a record array.  Returns null if the parameters are invalid.
pub extern fn didx_record_array_new(block_size_log2: u32, record_size: usize) -> *mut CompressedRecordArray {
    match CompressedRecordArray::new(block_size_log2, record_size) {
        Ok(array) => Box::into_raw(Box::new(array)),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
/// Append a record of `len` values.  Returns false if the array is closed
/// or `len` is not its record size.
pub unsafe extern fn didx_record_array_add(mut ptr: NonNull<CompressedRecordArray>,
        record: *const i32, len: usize) -> bool {
    let array = ptr.as_mut();
    if array.is_closed() || len != array.record_size() || record.is_null() { return false; }
    array.add(from_raw_parts(record, len));
    true
}

#[no_mangle]
/// Seal a record array for reading.
pub unsafe extern fn didx_record_array_close(mut ptr: NonNull<CompressedRecordArray>) {
    ptr.as_mut().close();
}

#[no_mangle]
/// Number of records in the array.
pub unsafe extern fn didx_record_array_len(ptr: NonNull<CompressedRecordArray>) -> usize {
    ptr.as_ref().len()
}

#[no_mangle]
/// Read record `record_number` into `output`, which holds `len` values.
/// Returns false if the array is open, the record doesn't exist or `len` is wrong.
pub unsafe extern fn didx_record_array_get(ptr: NonNull<CompressedRecordArray>,
        record_number: usize, output: *mut i32, len: usize) -> bool {
    if output.is_null() { return false; }
    ptr.as_ref().try_get(record_number, from_raw_parts_mut(output, len)).is_ok()
}

#[no_mangle]
/// Free a record array
pub unsafe extern fn didx_record_array_free(ptr: *mut CompressedRecordArray) {
    if !ptr.is_null() { drop(Box::from_raw(ptr)); }
}

/****************************************************************************
 * Bit-set arrays
 ****************************************************************************/

#[no_mangle]
/// Create an empty bit-set array
pub extern fn didx_bitset_array_new() -> *mut BitSetArray {
    Box::into_raw(Box::new(BitSetArray::new()))
}

#[no_mangle]
/// Set `bit` in set `index`.  Returns false if `bit` is out of range.
pub unsafe extern fn didx_bitset_array_set(mut ptr: NonNull<BitSetArray>, index: usize, bit: u32) -> bool {
    if bit > MAX_BIT { return false; }
    ptr.as_mut().set(index, bit);
    true
}

#[no_mangle]
/// Union set `from` into set `to`
pub unsafe extern fn didx_bitset_array_or(mut ptr: NonNull<BitSetArray>, to: usize, from: usize) {
    ptr.as_mut().or(to, from);
}

#[no_mangle]
/// Is `bit` in set `index`?
pub unsafe extern fn didx_bitset_array_contains(ptr: NonNull<BitSetArray>, index: usize, bit: u32) -> bool {
    ptr.as_ref().contains(index, bit)
}

#[no_mangle]
/// Number of bits in set `index`
pub unsafe extern fn didx_bitset_array_cardinality(ptr: NonNull<BitSetArray>, index: usize) -> usize {
    ptr.as_ref().cardinality(index)
}

#[no_mangle]
/// Free a bit-set array
pub unsafe extern fn didx_bitset_array_free(ptr: *mut BitSetArray) {
    if !ptr.is_null() { drop(Box::from_raw(ptr)); }
}

/****************************************************************************
 * u64 -> i32 LRU caches
 ****************************************************************************/

#[no_mangle]
/// Create an LRU cache of at most `max_size` entries.  Returns null if `max_size` is 0.
pub extern fn didx_lru_u64_i32_new(max_size: usize) -> *mut IntegerLruCache {
    match IntegerLruCache::new(max_size) {
        Ok(cache) => Box::into_raw(Box::new(cache)),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
/// Look up a key, marking it most recently used.  Return true if it is cached.
pub unsafe extern fn didx_lru_u64_i32_get(ptr: NonNull<IntegerLruCache>, key: u64, output: *mut i32) -> bool {
    ptr.as_ref().get(key).map_or(false, |v| {
        if !output.is_null() { *output = v; }
        true
    })
}

#[no_mangle]
/// Insert or update a key.  Returns false if `value` is the reserved -1.
pub unsafe extern fn didx_lru_u64_i32_put(ptr: NonNull<IntegerLruCache>, key: u64, value: i32) -> bool {
    if value == ABSENT { return false; }
    ptr.as_ref().put(key, value);
    true
}

#[no_mangle]
/// Remove a key.  Return true if it was cached.
pub unsafe extern fn didx_lru_u64_i32_remove(ptr: NonNull<IntegerLruCache>, key: u64) -> bool {
    ptr.as_ref().remove(key).is_some()
}

#[no_mangle]
/// Number of cached entries
pub unsafe extern fn didx_lru_u64_i32_len(ptr: NonNull<IntegerLruCache>) -> usize {
    ptr.as_ref().len()
}

#[no_mangle]
/// Free an LRU cache
pub unsafe extern fn didx_lru_u64_i32_free(ptr: *mut IntegerLruCache) {
    if !ptr.is_null() { drop(Box::from_raw(ptr)); }
}

/****************************************************************************
 * u64 -> i32 maps
 ****************************************************************************/

#[no_mangle]
/// Create an empty map
pub extern fn didx_map_u64_i32_new() -> *mut IntegerMap {
    Box::into_raw(Box::new(IntegerMap::new()))
}

#[no_mangle]
/// Look up a key.  Return true if the map contains it.
pub unsafe extern fn didx_map_u64_i32_get(ptr: NonNull<IntegerMap>, key: u64, output: *mut i32) -> bool {
    ptr.as_ref().get(key).map_or(false, |v| {
        if !output.is_null() { *output = v; }
        true
    })
}

#[no_mangle]
/// Insert or update a key.  Returns false if `value` is the reserved -1.
pub unsafe extern fn didx_map_u64_i32_put(mut ptr: NonNull<IntegerMap>, key: u64, value: i32) -> bool {
    if value == ABSENT { return false; }
    ptr.as_mut().put(key, value);
    true
}

#[no_mangle]
/// Remove a key.  Return true if it was present.
pub unsafe extern fn didx_map_u64_i32_remove(mut ptr: NonNull<IntegerMap>, key: u64) -> bool {
    ptr.as_mut().remove(key).is_some()
}

#[no_mangle]
/// Number of keys in the map
pub unsafe extern fn didx_map_u64_i32_len(ptr: NonNull<IntegerMap>) -> usize {
    ptr.as_ref().len()
}

#[no_mangle]
/// Free a map
pub unsafe extern fn didx_map_u64_i32_free(ptr: *mut IntegerMap) {
    if !ptr.is_null() { drop(Box::from_raw(ptr)); }
}
