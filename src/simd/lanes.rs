//! Generic SSE drivers: main loop, odd tail and overlap masking.
//!
//! Every driver is monomorphized per operation. Drivers ending in `_safe`
//! touch exactly `[0, len)` and need `len >= 16`; drivers ending in
//! `_unsafe` process `ceil(len / 16)` whole vectors and may read or write up
//! to 15 bytes past `len`.

use super::lookup::NibbleLookupTable;
use super::ops::{
    AddConst, And, AndConst, AnyOf, ByteMap, ByteScore, ByteValue, ByteValueGreater, ByteZip,
    Invmask, Lookup, MaskedEq, Or, OrConst, PackedNibbleSets, SubFromConst, UnpackedNibbleSets,
    Xor, XorConst,
};
use super::raw::{load_vec, store_vec};
use crate::system::BYTES_PER_VEC;
use std::arch::x86_64::*;

const VEC: usize = BYTES_PER_VEC;

/// Load at offset `rem` (1..=15) keeps only the last `rem` lanes.
static TAIL_MASK: [u8; 32] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Load at offset `16 - valid` keeps only the first `valid` lanes.
static HEAD_MASK: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

//==============================================================================
// VECTOR FORMS OF THE OPERATIONS
//==============================================================================

pub(crate) trait VecMap: ByteMap {
    unsafe fn map_vec(&self, v: __m128i) -> __m128i;
}

pub(crate) trait VecZip: ByteZip {
    unsafe fn zip_vec(&self, a: __m128i, b: __m128i) -> __m128i;
}

pub(crate) trait VecScore<const N: usize>: ByteScore<N> {
    /// Upper bound of any single lane of `score_vec`
    fn max_lane(&self) -> u8;
    unsafe fn score_vec(&self, v: __m128i) -> [__m128i; N];
}

impl VecMap for AddConst {
    #[inline(always)]
    unsafe fn map_vec(&self, v: __m128i) -> __m128i {
        unsafe { _mm_add_epi8(v, _mm_set1_epi8(self.0 as i8)) }
    }
}

impl VecMap for SubFromConst {
    #[inline(always)]
    unsafe fn map_vec(&self, v: __m128i) -> __m128i {
        unsafe { _mm_sub_epi8(_mm_set1_epi8(self.0 as i8), v) }
    }
}

impl VecMap for AndConst {
    #[inline(always)]
    unsafe fn map_vec(&self, v: __m128i) -> __m128i {
        unsafe { _mm_and_si128(v, _mm_set1_epi8(self.0 as i8)) }
    }
}

impl VecMap for OrConst {
    #[inline(always)]
    unsafe fn map_vec(&self, v: __m128i) -> __m128i {
        unsafe { _mm_or_si128(v, _mm_set1_epi8(self.0 as i8)) }
    }
}

impl VecMap for XorConst {
    #[inline(always)]
    unsafe fn map_vec(&self, v: __m128i) -> __m128i {
        unsafe { _mm_xor_si128(v, _mm_set1_epi8(self.0 as i8)) }
    }
}

impl VecMap for Lookup<'_> {
    #[inline(always)]
    unsafe fn map_vec(&self, v: __m128i) -> __m128i {
        unsafe { _mm_shuffle_epi8(self.0.load(), v) }
    }
}

impl VecZip for And {
    #[inline(always)]
    unsafe fn zip_vec(&self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_and_si128(a, b) }
    }
}

impl VecZip for Or {
    #[inline(always)]
    unsafe fn zip_vec(&self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_or_si128(a, b) }
    }
}

impl VecZip for Xor {
    #[inline(always)]
    unsafe fn zip_vec(&self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_xor_si128(a, b) }
    }
}

impl VecZip for Invmask {
    #[inline(always)]
    unsafe fn zip_vec(&self, a: __m128i, b: __m128i) -> __m128i {
        // andnot complements its first operand
        unsafe { _mm_andnot_si128(b, a) }
    }
}

#[inline(always)]
unsafe fn ones_where(mask: __m128i) -> __m128i {
    unsafe { _mm_and_si128(mask, _mm_set1_epi8(1)) }
}

impl VecScore<1> for MaskedEq {
    fn max_lane(&self) -> u8 {
        1
    }

    #[inline(always)]
    unsafe fn score_vec(&self, v: __m128i) -> [__m128i; 1] {
        unsafe {
            let masked = _mm_and_si128(v, _mm_set1_epi8(self.mask as i8));
            [ones_where(_mm_cmpeq_epi8(masked, _mm_set1_epi8(self.val as i8)))]
        }
    }
}

impl<const K: usize> VecScore<1> for AnyOf<K> {
    fn max_lane(&self) -> u8 {
        1
    }

    #[inline(always)]
    unsafe fn score_vec(&self, v: __m128i) -> [__m128i; 1] {
        unsafe {
            let mut hit = _mm_setzero_si128();
            for &target in self.0.iter() {
                hit = _mm_or_si128(hit, _mm_cmpeq_epi8(v, _mm_set1_epi8(target as i8)));
            }
            [ones_where(hit)]
        }
    }
}

#[inline]
fn table_max(tables: &[&NibbleLookupTable]) -> u8 {
    tables.iter().map(|t| t.max_entry()).max().unwrap_or(0)
}

impl<const N: usize> VecScore<N> for PackedNibbleSets<'_, N> {
    fn max_lane(&self) -> u8 {
        table_max(&self.0).saturating_mul(2)
    }

    #[inline(always)]
    unsafe fn score_vec(&self, v: __m128i) -> [__m128i; N] {
        unsafe {
            let low_mask = _mm_set1_epi8(0x0f);
            let lo = _mm_and_si128(v, low_mask);
            let hi = _mm_and_si128(_mm_srli_epi16(v, 4), low_mask);
            let mut out = [_mm_setzero_si128(); N];
            for (o, t) in out.iter_mut().zip(self.0.iter()) {
                let table = t.load();
                *o = _mm_add_epi8(_mm_shuffle_epi8(table, lo), _mm_shuffle_epi8(table, hi));
            }
            out
        }
    }
}

impl<const N: usize> VecScore<N> for UnpackedNibbleSets<'_, N> {
    fn max_lane(&self) -> u8 {
        table_max(&self.0)
    }

    #[inline(always)]
    unsafe fn score_vec(&self, v: __m128i) -> [__m128i; N] {
        unsafe {
            let mut out = [_mm_setzero_si128(); N];
            for (o, t) in out.iter_mut().zip(self.0.iter()) {
                *o = _mm_shuffle_epi8(t.load(), v);
            }
            out
        }
    }
}

impl VecScore<1> for ByteValue {
    fn max_lane(&self) -> u8 {
        u8::MAX
    }

    #[inline(always)]
    unsafe fn score_vec(&self, v: __m128i) -> [__m128i; 1] {
        [v]
    }
}

impl VecScore<1> for ByteValueGreater {
    fn max_lane(&self) -> u8 {
        u8::MAX
    }

    #[inline(always)]
    unsafe fn score_vec(&self, v: __m128i) -> [__m128i; 1] {
        unsafe {
            // saturating v - val is zero exactly where v <= val
            let excess = _mm_subs_epu8(v, _mm_set1_epi8(self.0 as i8));
            let not_greater = _mm_cmpeq_epi8(excess, _mm_setzero_si128());
            [_mm_andnot_si128(not_greater, v)]
        }
    }
}

//==============================================================================
// MAP / ZIP DRIVERS
//==============================================================================

/// `dst[i] = op(src[i])` for `i < len`, `len >= 16`. `dst == src` is allowed.
#[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
pub(crate) unsafe fn map_safe<M: VecMap>(op: M, dst: *mut u8, src: *const u8, len: usize) {
    debug_assert!(len >= VEC);
    unsafe {
        let tail_off = len - VEC;
        let tail = op.map_vec(load_vec(src, tail_off));
        let mut off = 0;
        while off < tail_off {
            store_vec(dst, off, op.map_vec(load_vec(src, off)));
            off += VEC;
        }
        store_vec(dst, tail_off, tail);
    }
}

/// `dst[i] = op(src[i])` over `ceil(len / 16)` whole vectors.
#[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
pub(crate) unsafe fn map_unsafe<M: VecMap>(op: M, dst: *mut u8, src: *const u8, len: usize) {
    let mut off = 0;
    while off < len {
        unsafe { store_vec(dst, off, op.map_vec(load_vec(src, off))) };
        off += VEC;
    }
}

/// `dst[i] = op(a[i], b[i])` for `i < len`, `len >= 16`. `dst == a` is allowed.
#[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
pub(crate) unsafe fn zip_safe<Z: VecZip>(
    op: Z,
    dst: *mut u8,
    a: *const u8,
    b: *const u8,
    len: usize,
) {
    debug_assert!(len >= VEC);
    unsafe {
        let tail_off = len - VEC;
        let tail = op.zip_vec(load_vec(a, tail_off), load_vec(b, tail_off));
        let mut off = 0;
        while off < tail_off {
            store_vec(dst, off, op.zip_vec(load_vec(a, off), load_vec(b, off)));
            off += VEC;
        }
        store_vec(dst, tail_off, tail);
    }
}

/// `dst[i] = op(a[i], b[i])` over `ceil(len / 16)` whole vectors.
#[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
pub(crate) unsafe fn zip_unsafe<Z: VecZip>(
    op: Z,
    dst: *mut u8,
    a: *const u8,
    b: *const u8,
    len: usize,
) {
    let mut off = 0;
    while off < len {
        unsafe { store_vec(dst, off, op.zip_vec(load_vec(a, off), load_vec(b, off))) };
        off += VEC;
    }
}

//==============================================================================
// SCORE DRIVERS
//==============================================================================

/// Per-lane 8-bit accumulators, flushed into 64-bit lanes with `psadbw`
/// before any lane can overflow.
struct ScoreAcc<const N: usize> {
    acc8: [__m128i; N],
    acc64: [__m128i; N],
    pending: usize,
    flush_every: usize,
}

impl<const N: usize> ScoreAcc<N> {
    #[inline(always)]
    unsafe fn new(max_lane: u8) -> Self {
        unsafe {
            Self {
                acc8: [_mm_setzero_si128(); N],
                acc64: [_mm_setzero_si128(); N],
                pending: 0,
                flush_every: (u8::MAX / max_lane.max(1)) as usize,
            }
        }
    }

    #[inline(always)]
    unsafe fn add(&mut self, scores: [__m128i; N]) {
        unsafe {
            for (acc, s) in self.acc8.iter_mut().zip(scores) {
                *acc = _mm_add_epi8(*acc, s);
            }
            self.pending += 1;
            if self.pending == self.flush_every {
                self.flush();
            }
        }
    }

    #[inline(always)]
    unsafe fn flush(&mut self) {
        unsafe {
            let zero = _mm_setzero_si128();
            for (wide, narrow) in self.acc64.iter_mut().zip(self.acc8.iter_mut()) {
                *wide = _mm_add_epi64(*wide, _mm_sad_epu8(*narrow, zero));
                *narrow = zero;
            }
        }
        self.pending = 0;
    }

    #[inline(always)]
    unsafe fn finish(mut self) -> [u64; N] {
        unsafe {
            self.flush();
            let mut totals = [0u64; N];
            for (t, wide) in totals.iter_mut().zip(self.acc64) {
                let lo = _mm_cvtsi128_si64(wide) as u64;
                let hi = _mm_extract_epi64(wide, 1) as u64;
                *t = lo + hi;
            }
            totals
        }
    }
}

/// Score totals over `[0, len)`, `len >= 16`.
#[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
pub(crate) unsafe fn score_safe<S: VecScore<N>, const N: usize>(
    op: S,
    src: *const u8,
    len: usize,
) -> [u64; N] {
    debug_assert!(len >= VEC);
    unsafe {
        let mut acc = ScoreAcc::<N>::new(op.max_lane());
        let full = len & !(VEC - 1);
        let mut off = 0;
        while off < full {
            acc.add(op.score_vec(load_vec(src, off)));
            off += VEC;
        }
        let rem = len - full;
        if rem != 0 {
            let mask = load_vec(TAIL_MASK.as_ptr(), rem);
            let mut scores = op.score_vec(load_vec(src, len - VEC));
            for s in scores.iter_mut() {
                *s = _mm_and_si128(*s, mask);
            }
            acc.add(scores);
        }
        acc.finish()
    }
}

/// Score totals over `ceil(len / 16)` whole vectors, ignoring lanes past `len`.
#[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
pub(crate) unsafe fn score_unsafe<S: VecScore<N>, const N: usize>(
    op: S,
    src: *const u8,
    len: usize,
) -> [u64; N] {
    if len == 0 {
        return [0; N];
    }
    unsafe {
        let mut acc = ScoreAcc::<N>::new(op.max_lane());
        let last_off = (len - 1) & !(VEC - 1);
        let mut off = 0;
        while off < last_off {
            acc.add(op.score_vec(load_vec(src, off)));
            off += VEC;
        }
        let valid = len - last_off;
        let mask = load_vec(HEAD_MASK.as_ptr(), VEC - valid);
        let mut scores = op.score_vec(load_vec(src, last_off));
        for s in scores.iter_mut() {
            *s = _mm_and_si128(*s, mask);
        }
        acc.add(scores);
        acc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::ops::{map_bytes, score_bytes, zip_bytes};

    fn sse_available() -> bool {
        is_x86_feature_detected!("sse4.2") && is_x86_feature_detected!("ssse3")
    }

    fn pattern(len: usize, seed: u8) -> Vec<u8> {
        (0..len)
            .map(|i| (i as u8).wrapping_mul(37).wrapping_add(seed))
            .collect()
    }

    #[test]
    fn test_map_safe_matches_scalar() {
        if !sse_available() {
            return;
        }
        for len in 16..80 {
            let src = pattern(len, 3);
            let mut expected = vec![0u8; len];
            map_bytes(SubFromConst(7), &mut expected, &src);

            let mut dst = vec![0u8; len];
            unsafe { map_safe(SubFromConst(7), dst.as_mut_ptr(), src.as_ptr(), len) };
            assert_eq!(dst, expected, "len {}", len);

            let mut main = src.clone();
            let p = main.as_mut_ptr();
            unsafe { map_safe(SubFromConst(7), p, p, len) };
            assert_eq!(main, expected, "inplace len {}", len);
        }
    }

    #[test]
    fn test_zip_unsafe_stays_in_capacity() {
        if !sse_available() {
            return;
        }
        for len in 0..50 {
            let cap = len + VEC;
            let a = pattern(cap, 1);
            let b = pattern(cap, 90);
            let mut dst = vec![0u8; cap];
            unsafe { zip_unsafe(Invmask, dst.as_mut_ptr(), a.as_ptr(), b.as_ptr(), len) };
            let mut expected = vec![0u8; len];
            zip_bytes(Invmask, &mut expected, &a[..len], &b[..len]);
            assert_eq!(&dst[..len], &expected[..]);
        }
    }

    #[test]
    fn test_score_flush_boundaries() {
        if !sse_available() {
            return;
        }
        // 255 * 16 bytes of 0xff forces a flush on every iteration
        let src = vec![0xffu8; 255 * 16 + 5];
        let got = unsafe { score_safe(ByteValue, src.as_ptr(), src.len()) };
        assert_eq!(got, score_bytes(ByteValue, &src));

        let ones = vec![1u8; 300 * 16 + 9];
        let any = AnyOf([1u8]);
        let got = unsafe { score_safe(any, ones.as_ptr(), ones.len()) };
        assert_eq!(got[0], ones.len() as u64);
    }

    #[test]
    fn test_score_unsafe_masks_overread() {
        if !sse_available() {
            return;
        }
        let mut buf = vec![0u8; 64];
        for len in 0..40 {
            for (i, b) in buf.iter_mut().enumerate() {
                *b = if i < len { 5 } else { 7 };
            }
            let got = unsafe { score_unsafe(AnyOf([7u8]), buf.as_ptr(), len) };
            assert_eq!(got, [0], "len {}", len);
            let got = unsafe { score_unsafe(ByteValue, buf.as_ptr(), len) };
            assert_eq!(got, [5 * len as u64], "len {}", len);
        }
    }

    #[test]
    fn test_lookup_map_matches_shuffle() {
        if !sse_available() {
            return;
        }
        let table = NibbleLookupTable::new(*b"0123456789ABCDEF");
        let src: Vec<u8> = (0..=255).collect();
        let mut dst = vec![0u8; 256];
        unsafe { map_safe(Lookup(&table), dst.as_mut_ptr(), src.as_ptr(), 256) };
        let mut expected = vec![0u8; 256];
        map_bytes(Lookup(&table), &mut expected, &src);
        assert_eq!(dst, expected);
    }
}
