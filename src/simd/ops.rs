//! Per-byte operations shared by the scalar and vector drivers.
//!
//! Each operation is a small `Copy` value implementing one of three scalar
//! shapes. The x86 drivers in `lanes` extend the same types with their
//! vector form, so a kernel family is one operation type plus a driver.

use super::lookup::NibbleLookupTable;

/// `dst[i] = f(src[i])`
pub(crate) trait ByteMap: Copy {
    fn map(&self, b: u8) -> u8;
}

/// `dst[i] = f(a[i], b[i])`
pub(crate) trait ByteZip: Copy {
    fn zip(&self, a: u8, b: u8) -> u8;
}

/// Sum of per-byte scores, one running total per output.
///
/// A single byte never scores more than 255 per output.
pub(crate) trait ByteScore<const N: usize>: Copy {
    fn score(&self, b: u8) -> [u8; N];
}

//==============================================================================
// MAPS
//==============================================================================

#[derive(Clone, Copy)]
pub(crate) struct AddConst(pub u8);

impl ByteMap for AddConst {
    #[inline(always)]
    fn map(&self, b: u8) -> u8 {
        b.wrapping_add(self.0)
    }
}

#[derive(Clone, Copy)]
pub(crate) struct SubFromConst(pub u8);

impl ByteMap for SubFromConst {
    #[inline(always)]
    fn map(&self, b: u8) -> u8 {
        self.0.wrapping_sub(b)
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AndConst(pub u8);

impl ByteMap for AndConst {
    #[inline(always)]
    fn map(&self, b: u8) -> u8 {
        b & self.0
    }
}

#[derive(Clone, Copy)]
pub(crate) struct OrConst(pub u8);

impl ByteMap for OrConst {
    #[inline(always)]
    fn map(&self, b: u8) -> u8 {
        b | self.0
    }
}

#[derive(Clone, Copy)]
pub(crate) struct XorConst(pub u8);

impl ByteMap for XorConst {
    #[inline(always)]
    fn map(&self, b: u8) -> u8 {
        b ^ self.0
    }
}

/// Byte-shuffle table lookup
#[derive(Clone, Copy)]
pub(crate) struct Lookup<'a>(pub &'a NibbleLookupTable);

impl ByteMap for Lookup<'_> {
    #[inline(always)]
    fn map(&self, b: u8) -> u8 {
        self.0.lookup(b)
    }
}

//==============================================================================
// ZIPS
//==============================================================================

#[derive(Clone, Copy)]
pub(crate) struct And;

impl ByteZip for And {
    #[inline(always)]
    fn zip(&self, a: u8, b: u8) -> u8 {
        a & b
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Or;

impl ByteZip for Or {
    #[inline(always)]
    fn zip(&self, a: u8, b: u8) -> u8 {
        a | b
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Xor;

impl ByteZip for Xor {
    #[inline(always)]
    fn zip(&self, a: u8, b: u8) -> u8 {
        a ^ b
    }
}

/// `a & !b`
#[derive(Clone, Copy)]
pub(crate) struct Invmask;

impl ByteZip for Invmask {
    #[inline(always)]
    fn zip(&self, a: u8, b: u8) -> u8 {
        a & !b
    }
}

//==============================================================================
// SCORES
//==============================================================================

/// 1 when `(b & mask) == val`
#[derive(Clone, Copy)]
pub(crate) struct MaskedEq {
    pub mask: u8,
    pub val: u8,
}

impl ByteScore<1> for MaskedEq {
    #[inline(always)]
    fn score(&self, b: u8) -> [u8; 1] {
        [((b & self.mask) == self.val) as u8]
    }
}

/// 1 when `b` equals any of the targets
#[derive(Clone, Copy)]
pub(crate) struct AnyOf<const K: usize>(pub [u8; K]);

impl<const K: usize> ByteScore<1> for AnyOf<K> {
    #[inline(always)]
    fn score(&self, b: u8) -> [u8; 1] {
        [self.0.contains(&b) as u8]
    }
}

/// `t[b & 15] + t[b >> 4]` per table, wrapping
#[derive(Clone, Copy)]
pub(crate) struct PackedNibbleSets<'a, const N: usize>(pub [&'a NibbleLookupTable; N]);

impl<const N: usize> ByteScore<N> for PackedNibbleSets<'_, N> {
    #[inline(always)]
    fn score(&self, b: u8) -> [u8; N] {
        let mut out = [0u8; N];
        for (o, t) in out.iter_mut().zip(self.0.iter()) {
            *o = t.get(b & 15).wrapping_add(t.get(b >> 4));
        }
        out
    }
}

/// Byte-shuffle lookup per table
#[derive(Clone, Copy)]
pub(crate) struct UnpackedNibbleSets<'a, const N: usize>(pub [&'a NibbleLookupTable; N]);

impl<const N: usize> ByteScore<N> for UnpackedNibbleSets<'_, N> {
    #[inline(always)]
    fn score(&self, b: u8) -> [u8; N] {
        let mut out = [0u8; N];
        for (o, t) in out.iter_mut().zip(self.0.iter()) {
            *o = t.lookup(b);
        }
        out
    }
}

/// The byte itself
#[derive(Clone, Copy)]
pub(crate) struct ByteValue;

impl ByteScore<1> for ByteValue {
    #[inline(always)]
    fn score(&self, b: u8) -> [u8; 1] {
        [b]
    }
}

/// The byte when it exceeds the threshold, else zero
#[derive(Clone, Copy)]
pub(crate) struct ByteValueGreater(pub u8);

impl ByteScore<1> for ByteValueGreater {
    #[inline(always)]
    fn score(&self, b: u8) -> [u8; 1] {
        [if b > self.0 { b } else { 0 }]
    }
}

//==============================================================================
// SCALAR DRIVERS
//==============================================================================

#[inline]
pub(crate) fn map_bytes<M: ByteMap>(op: M, dst: &mut [u8], src: &[u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = op.map(s);
    }
}

#[inline]
pub(crate) fn map_bytes_inplace<M: ByteMap>(op: M, main: &mut [u8]) {
    for b in main.iter_mut() {
        *b = op.map(*b);
    }
}

#[inline]
pub(crate) fn zip_bytes<Z: ByteZip>(op: Z, dst: &mut [u8], a: &[u8], b: &[u8]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = op.zip(x, y);
    }
}

#[inline]
pub(crate) fn zip_bytes_inplace<Z: ByteZip>(op: Z, main: &mut [u8], arg: &[u8]) {
    for (m, &y) in main.iter_mut().zip(arg) {
        *m = op.zip(*m, y);
    }
}

#[inline]
pub(crate) fn score_bytes<S: ByteScore<N>, const N: usize>(op: S, src: &[u8]) -> [u64; N] {
    let mut totals = [0u64; N];
    for &b in src {
        for (t, s) in totals.iter_mut().zip(op.score(b)) {
            *t += s as u64;
        }
    }
    totals
}
