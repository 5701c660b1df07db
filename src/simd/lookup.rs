//! 16-entry byte lookup table for the nibble kernels.

use std::fmt;

/// Number of copies of the 16-entry table kept in a [`NibbleLookupTable`].
/// One copy fills exactly one 16-byte vector.
pub const NIBBLE_LOOKUP_DUP: usize = 1;

/// Immutable 16-entry table, aligned for a direct vector load.
///
/// Build it once and share it; every lookup kernel takes it by reference.
///
/// ```rust
/// use bytekern::simd::NibbleLookupTable;
///
/// let table = NibbleLookupTable::new(*b"0123456789abcdef");
/// assert_eq!(table.get(10), b'a');
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C, align(16))]
pub struct NibbleLookupTable {
    shuffle: [[u8; 16]; NIBBLE_LOOKUP_DUP],
}

impl NibbleLookupTable {
    /// Create a table from its 16 entries
    pub const fn new(table: [u8; 16]) -> Self {
        Self {
            shuffle: [table; NIBBLE_LOOKUP_DUP],
        }
    }

    /// Entry for `nibble`. Only nibbles 0..=15 are meaningful; larger values
    /// are masked to their low four bits.
    #[inline]
    pub fn get(&self, nibble: u8) -> u8 {
        self.shuffle[0][(nibble & 15) as usize]
    }

    /// The 16 entries
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.shuffle[0]
    }

    /// Byte-shuffle lookup: `table[b & 15]` for `b < 128`, zero otherwise.
    #[inline]
    pub(crate) fn lookup(&self, b: u8) -> u8 {
        if b & 0x80 != 0 {
            0
        } else {
            self.shuffle[0][(b & 15) as usize]
        }
    }

    /// Largest entry, used to bound per-lane accumulation
    pub(crate) fn max_entry(&self) -> u8 {
        self.shuffle[0].iter().copied().max().unwrap_or(0)
    }

    #[cfg(target_arch = "x86_64")]
    #[inline(always)]
    pub(crate) unsafe fn load(&self) -> std::arch::x86_64::__m128i {
        // SAFETY: the struct is 16-byte aligned and holds at least 16 bytes.
        unsafe {
            std::arch::x86_64::_mm_load_si128(
                self.shuffle.as_ptr() as *const std::arch::x86_64::__m128i
            )
        }
    }
}

impl From<[u8; 16]> for NibbleLookupTable {
    fn from(table: [u8; 16]) -> Self {
        Self::new(table)
    }
}

impl fmt::Debug for NibbleLookupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NibbleLookupTable").field(&self.shuffle[0]).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get() {
        let table = NibbleLookupTable::new(*b"ACGTNNNNNNNNNNNN");
        assert_eq!(table.get(0), b'A');
        assert_eq!(table.get(3), b'T');
        assert_eq!(table.get(15), b'N');
        assert_eq!(table.get(16 + 1), b'C');
    }

    #[test]
    fn test_shuffle_semantics() {
        let table = NibbleLookupTable::from([7u8; 16]);
        assert_eq!(table.lookup(0x7f), 7);
        assert_eq!(table.lookup(0x80), 0);
        assert_eq!(table.lookup(0xff), 0);
    }

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::align_of::<NibbleLookupTable>(), 16);
        assert_eq!(std::mem::size_of::<NibbleLookupTable>(), 16 * NIBBLE_LOOKUP_DUP);

        let mut entries = [0u8; 16];
        entries[4] = 9;
        let table = NibbleLookupTable::new(entries);
        assert_eq!(table.as_bytes(), &entries);
        assert_eq!(table.max_entry(), 9);
    }
}
