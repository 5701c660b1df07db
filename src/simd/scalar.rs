//! Portable element-by-element kernels.
//!
//! These run on the scalar tier and below the vector crossover of the SSE
//! tier, and they are the reference every vector kernel must match byte for
//! byte. They take slices, never read outside them and never fail: where two
//! buffers are expected to have related lengths, extra bytes in the longer
//! one are ignored.

use super::lookup::NibbleLookupTable;
use super::ops::{
    map_bytes, map_bytes_inplace, score_bytes, zip_bytes, zip_bytes_inplace, AddConst, And,
    AndConst, AnyOf, ByteValue, ByteValueGreater, Invmask, Lookup, MaskedEq, Or, OrConst,
    PackedNibbleSets, SubFromConst, UnpackedNibbleSets, Xor, XorConst,
};

/// Set every byte of `dst` to `val`.
pub fn memset8(dst: &mut [u8], val: u8) {
    dst.fill(val);
}

/// First `pos >= start` with `a[pos] != b[pos]`, or `a.len()`.
pub fn first_unequal8(a: &[u8], b: &[u8], start: usize) -> usize {
    let end = a.len();
    (start..end.min(b.len()))
        .find(|&pos| a[pos] != b[pos])
        .unwrap_or(end)
}

/// First `pos >= start` with `arg[pos] > val`, or `arg.len()`.
pub fn first_greater8(arg: &[u8], val: u8, start: usize) -> usize {
    (start..arg.len()).find(|&pos| arg[pos] > val).unwrap_or(arg.len())
}

/// First `pos >= start` with `arg[pos] <= val`, or `arg.len()`.
pub fn first_leq8(arg: &[u8], val: u8, start: usize) -> usize {
    (start..arg.len()).find(|&pos| arg[pos] <= val).unwrap_or(arg.len())
}

/// `dst[i] = src[i] + val`, wrapping.
pub fn add_const8(dst: &mut [u8], src: &[u8], val: u8) {
    map_bytes(AddConst(val), dst, src);
}

/// `main[i] += val`, wrapping.
pub fn add_const8_inplace(main: &mut [u8], val: u8) {
    map_bytes_inplace(AddConst(val), main);
}

/// `dst[i] = val - src[i]`, wrapping.
pub fn subtract_from_const8(dst: &mut [u8], src: &[u8], val: u8) {
    map_bytes(SubFromConst(val), dst, src);
}

/// `main[i] = val - main[i]`, wrapping.
pub fn subtract_from_const8_inplace(main: &mut [u8], val: u8) {
    map_bytes_inplace(SubFromConst(val), main);
}

pub fn and(dst: &mut [u8], src1: &[u8], src2: &[u8]) {
    zip_bytes(And, dst, src1, src2);
}

pub fn and_inplace(main: &mut [u8], arg: &[u8]) {
    zip_bytes_inplace(And, main, arg);
}

pub fn or(dst: &mut [u8], src1: &[u8], src2: &[u8]) {
    zip_bytes(Or, dst, src1, src2);
}

pub fn or_inplace(main: &mut [u8], arg: &[u8]) {
    zip_bytes_inplace(Or, main, arg);
}

pub fn xor(dst: &mut [u8], src1: &[u8], src2: &[u8]) {
    zip_bytes(Xor, dst, src1, src2);
}

pub fn xor_inplace(main: &mut [u8], arg: &[u8]) {
    zip_bytes_inplace(Xor, main, arg);
}

/// `dst[i] = src[i] & !mask[i]`
pub fn invmask(dst: &mut [u8], src: &[u8], mask: &[u8]) {
    zip_bytes(Invmask, dst, src, mask);
}

/// `main[i] &= !mask[i]`
pub fn invmask_inplace(main: &mut [u8], mask: &[u8]) {
    zip_bytes_inplace(Invmask, main, mask);
}

pub fn and_const8(dst: &mut [u8], src: &[u8], val: u8) {
    map_bytes(AndConst(val), dst, src);
}

pub fn and_const8_inplace(main: &mut [u8], val: u8) {
    map_bytes_inplace(AndConst(val), main);
}

pub fn or_const8(dst: &mut [u8], src: &[u8], val: u8) {
    map_bytes(OrConst(val), dst, src);
}

pub fn or_const8_inplace(main: &mut [u8], val: u8) {
    map_bytes_inplace(OrConst(val), main);
}

pub fn xor_const8(dst: &mut [u8], src: &[u8], val: u8) {
    map_bytes(XorConst(val), dst, src);
}

pub fn xor_const8_inplace(main: &mut [u8], val: u8) {
    map_bytes_inplace(XorConst(val), main);
}

/// `dst[i] = table[src[i] & 15]` if `src[i] < 128`, else 0.
pub fn unpacked_nibble_lookup(dst: &mut [u8], src: &[u8], table: &NibbleLookupTable) {
    map_bytes(Lookup(table), dst, src);
}

pub fn unpacked_nibble_lookup_inplace(main: &mut [u8], table: &NibbleLookupTable) {
    map_bytes_inplace(Lookup(table), main);
}

/// `dst[2i] = table[src[i] & 15]`, `dst[2i + 1] = table[src[i] >> 4]`.
pub fn packed_nibble_lookup(dst: &mut [u8], src: &[u8], table: &NibbleLookupTable) {
    for (pair, &b) in dst.chunks_mut(2).zip(src) {
        pair[0] = table.get(b & 15);
        if let Some(hi) = pair.get_mut(1) {
            *hi = table.get(b >> 4);
        }
    }
}

/// Number of set bits.
pub fn popcnt(src: &[u8]) -> usize {
    src.iter().map(|b| b.count_ones() as usize).sum()
}

/// Number of bytes with `(b & mask) == val`.
pub fn mask_then_count_byte(src: &[u8], mask: u8, val: u8) -> usize {
    score_bytes(MaskedEq { mask, val }, src)[0] as usize
}

pub fn count2_bytes(src: &[u8], val1: u8, val2: u8) -> usize {
    score_bytes(AnyOf([val1, val2]), src)[0] as usize
}

pub fn count3_bytes(src: &[u8], val1: u8, val2: u8, val3: u8) -> usize {
    score_bytes(AnyOf([val1, val2, val3]), src)[0] as usize
}

/// Sum of `table[b & 15] + table[b >> 4]` over all bytes.
pub fn count_nibbles_in_set(src: &[u8], table: &NibbleLookupTable) -> usize {
    score_bytes(PackedNibbleSets([table]), src)[0] as usize
}

pub fn count_nibbles_in_two_sets(
    src: &[u8],
    table1: &NibbleLookupTable,
    table2: &NibbleLookupTable,
) -> (usize, usize) {
    let [c1, c2] = score_bytes(PackedNibbleSets([table1, table2]), src);
    (c1 as usize, c2 as usize)
}

/// Sum of the byte-shuffle lookup of every byte.
pub fn count_unpacked_nibbles_in_set(src: &[u8], table: &NibbleLookupTable) -> usize {
    score_bytes(UnpackedNibbleSets([table]), src)[0] as usize
}

pub fn count_unpacked_nibbles_in_two_sets(
    src: &[u8],
    table1: &NibbleLookupTable,
    table2: &NibbleLookupTable,
) -> (usize, usize) {
    let [c1, c2] = score_bytes(UnpackedNibbleSets([table1, table2]), src);
    (c1 as usize, c2 as usize)
}

pub fn accumulate8(src: &[u8]) -> u64 {
    score_bytes(ByteValue, src)[0]
}

pub fn accumulate8_greater(src: &[u8], val: u8) -> u64 {
    score_bytes(ByteValueGreater(val), src)[0]
}

/// `dst[i] = src[n - 1 - i]`
pub fn reverse8(dst: &mut [u8], src: &[u8]) {
    for (d, &s) in dst.iter_mut().zip(src.iter().rev()) {
        *d = s;
    }
}

pub fn reverse8_inplace(main: &mut [u8]) {
    main.reverse();
}

/// `dst[2i] = even[i]`, `dst[2i + 1] = odd[i]`.
pub fn interleave8(dst: &mut [u8], even: &[u8], odd: &[u8]) {
    for (i, d) in dst.iter_mut().enumerate() {
        let half = i >> 1;
        let src = if i & 1 == 0 { even } else { odd };
        if let Some(&b) = src.get(half) {
            *d = b;
        }
    }
}

/// Pack bit `bit_idx` of every source byte into `dst`, least significant
/// bit first. Unused high bits of the last written byte are zero.
pub fn bit_from_every_byte(dst: &mut [u8], src: &[u8], bit_idx: u32) {
    let bit_idx = bit_idx & 7;
    for (d, chunk) in dst.iter_mut().zip(src.chunks(8)) {
        *d = chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &b)| acc | (((b >> bit_idx) & 1) << i));
    }
}

pub fn repeat_u16(dst: &mut [u16], val: u16) {
    dst.fill(val);
}

pub fn repeat_u32(dst: &mut [u32], val: u32) {
    dst.fill(val);
}

pub fn index_u16(main: &[u16], val: u16) -> Option<usize> {
    main.iter().position(|&x| x == val)
}

pub fn reverse_u16(dst: &mut [u16], src: &[u16]) {
    for (d, &s) in dst.iter_mut().zip(src.iter().rev()) {
        *d = s;
    }
}

/// First element whose exponent bits are all set (NaN or an infinity).
pub fn find_nan_or_inf64(data: &[f64]) -> Option<usize> {
    data.iter().position(|x| !x.is_finite())
}
