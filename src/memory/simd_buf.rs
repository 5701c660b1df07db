//! SimdBuf: byte buffer with the trailing slack the unsafe kernels need
//!
//! Every `*_unsafe` kernel in [`crate::simd`] may read and write up to
//! `bytes_per_vec() - 1` bytes past the logical end of its buffers. A
//! `SimdBuf` always owns at least `len + bytes_per_vec()` bytes, so any
//! sub-range `buf[a..b]` handed to an unsafe kernel has its slack inside the
//! same allocation. Growth goes through `realloc`, which can often extend
//! in place instead of copying.
//!
//! Every byte of the capacity is initialized memory (zero on allocation,
//! unspecified after kernels scribble over the slack), so reading the slack
//! through the raw pointers is always sound.
//!
//! # Examples
//!
//! ```rust
//! use bytekern::memory::SimdBuf;
//! use bytekern::simd::memset8_unsafe;
//!
//! let mut buf = SimdBuf::allocate(5);
//! assert!(buf.capacity() >= 5 + 16);
//! unsafe { memset8_unsafe(buf.as_mut_ptr(), buf.len(), 7) };
//! assert_eq!(&buf[..], &[7, 7, 7, 7, 7]);
//! ```

use crate::simd::round_up_pow2;
use crate::system::BYTES_PER_VEC;
use std::alloc::{self, Layout};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

/// Alignment of every SimdBuf allocation.
const BUF_ALIGN: usize = BYTES_PER_VEC;

/// Growable byte buffer whose capacity always covers `len + BYTES_PER_VEC`.
pub struct SimdBuf {
    ptr: NonNull<u8>,
    len: usize,
    cap: usize,
}

#[inline]
fn layout_for(cap: usize) -> Layout {
    match Layout::from_size_align(cap, BUF_ALIGN) {
        Ok(layout) => layout,
        Err(_) => capacity_overflow(),
    }
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

/// Smallest capacity that leaves a full vector of slack after `len` bytes.
#[inline]
fn min_capacity(len: usize) -> usize {
    match len.checked_add(BYTES_PER_VEC) {
        Some(cap) => cap,
        None => capacity_overflow(),
    }
}

/// Capacity chosen when a resize has to reallocate: 1/8 headroom, rounded to
/// the vector width.
#[inline]
fn grown_capacity(min_cap: usize) -> usize {
    match min_cap.checked_add(min_cap / 8) {
        Some(cap) if cap <= isize::MAX as usize - BUF_ALIGN => round_up_pow2(cap, BUF_ALIGN),
        _ => capacity_overflow(),
    }
}

fn alloc_zeroed(cap: usize) -> NonNull<u8> {
    let layout = layout_for(cap);
    // SAFETY: cap >= BYTES_PER_VEC, so the layout is never zero-sized.
    let raw = unsafe { alloc::alloc_zeroed(layout) };
    match NonNull::new(raw) {
        Some(ptr) => ptr,
        None => alloc::handle_alloc_error(layout),
    }
}

impl SimdBuf {
    /// Allocate a zero-filled buffer of `len` bytes with capacity
    /// `len + bytes_per_vec()`.
    pub fn allocate(len: usize) -> Self {
        let cap = min_capacity(len);
        Self {
            ptr: alloc_zeroed(cap),
            len,
            cap,
        }
    }

    /// Allocate a buffer holding a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut buf = Self::allocate(data.len());
        buf.as_mut_slice().copy_from_slice(data);
        buf
    }

    /// Logical length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the logical length is zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total bytes owned, always at least `len() + bytes_per_vec()`
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Bytes owned past the logical end
    #[inline]
    pub fn slack(&self) -> usize {
        self.cap - self.len
    }

    /// Pointer to the first byte; valid for reads of `capacity()` bytes.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Pointer to the first byte; valid for reads and writes of
    /// `capacity()` bytes.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// The logical contents
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: len <= cap and every byte of the allocation is initialized.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The logical contents, mutably
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: len <= cap and every byte of the allocation is initialized.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Change the length, keeping the first `min(old, new)` bytes.
    ///
    /// Shrinking never reallocates. Growing past the current slack
    /// reallocates to `round_up_pow2(min_cap + min_cap / 8, 16)` with
    /// `min_cap = new_len + 16`. Bytes exposed by growth have unspecified
    /// values.
    pub fn resize(&mut self, new_len: usize) {
        let min_cap = min_capacity(new_len);
        if min_cap > self.cap {
            self.realloc(grown_capacity(min_cap));
        }
        self.len = new_len;
    }

    /// Change the length without preserving contents.
    ///
    /// Uses the same capacity policy as [`SimdBuf::resize`] but skips the
    /// copy when a new allocation is needed.
    pub fn remake(&mut self, new_len: usize) {
        let min_cap = min_capacity(new_len);
        if min_cap > self.cap {
            let new_cap = grown_capacity(min_cap);
            let new_ptr = alloc_zeroed(new_cap);
            // SAFETY: ptr was allocated with layout_for(cap).
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout_for(self.cap)) };
            self.ptr = new_ptr;
            self.cap = new_cap;
        }
        self.len = new_len;
    }

    /// Ensure slack for the current length. Every constructor already
    /// guarantees it, so this only reallocates if that ever stops holding.
    pub fn xcap(&mut self) {
        self.resize(self.len);
    }

    fn realloc(&mut self, new_cap: usize) {
        let old_layout = layout_for(self.cap);
        let new_layout = layout_for(new_cap);
        // SAFETY: ptr came from this allocator with old_layout, and new_cap
        // is non-zero and fits isize.
        let raw = unsafe { alloc::realloc(self.ptr.as_ptr(), old_layout, new_layout.size()) };
        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(new_layout),
        };
        if new_cap > self.cap {
            // SAFETY: [cap, new_cap) lies inside the new allocation.
            unsafe { ptr::write_bytes(ptr.as_ptr().add(self.cap), 0, new_cap - self.cap) };
        }
        self.ptr = ptr;
        self.cap = new_cap;
    }
}

impl Drop for SimdBuf {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with layout_for(cap).
        unsafe { alloc::dealloc(self.ptr.as_ptr(), layout_for(self.cap)) };
    }
}

impl Deref for SimdBuf {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl DerefMut for SimdBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl fmt::Debug for SimdBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimdBuf")
            .field("len", &self.len)
            .field("cap", &self.cap)
            .field("data", &self.as_slice())
            .finish()
    }
}

impl PartialEq for SimdBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for SimdBuf {}

impl Clone for SimdBuf {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }
}

impl From<&[u8]> for SimdBuf {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}

// Safety: SimdBuf uniquely owns its allocation, like Vec<u8>
unsafe impl Send for SimdBuf {}

// Safety: shared access only hands out &[u8] and *const u8
unsafe impl Sync for SimdBuf {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate() {
        for len in [0, 1, 15, 16, 17, 100] {
            let buf = SimdBuf::allocate(len);
            assert_eq!(buf.len(), len);
            assert!(buf.capacity() >= len + BYTES_PER_VEC);
            assert!(buf.iter().all(|&b| b == 0));
            assert_eq!(buf.as_ptr() as usize % BUF_ALIGN, 0);
        }
        assert!(SimdBuf::allocate(0).is_empty());
    }

    #[test]
    fn test_slack_is_readable() {
        let buf = SimdBuf::allocate(3);
        let slack = unsafe { slice::from_raw_parts(buf.as_ptr(), buf.capacity()) };
        assert!(slack.iter().all(|&b| b == 0));
        assert_eq!(buf.slack(), buf.capacity() - 3);
    }

    #[test]
    fn test_resize_preserves_contents() {
        let mut buf = SimdBuf::from_slice(b"hello world");
        buf.resize(1000);
        assert_eq!(buf.len(), 1000);
        assert_eq!(&buf[..11], b"hello world");
        assert!(buf.capacity() >= 1000 + BYTES_PER_VEC);

        buf.resize(5);
        assert_eq!(&buf[..], b"hello");
    }

    #[test]
    fn test_growth_policy() {
        let mut buf = SimdBuf::allocate(10);
        let old_cap = buf.capacity();
        buf.resize(100);
        let min_cap = 100 + BYTES_PER_VEC;
        assert!(old_cap < min_cap);
        assert_eq!(buf.capacity(), round_up_pow2(min_cap + min_cap / 8, BYTES_PER_VEC));
    }

    #[test]
    fn test_shrink_keeps_capacity() {
        let mut buf = SimdBuf::allocate(500);
        let cap = buf.capacity();
        buf.resize(3);
        assert_eq!(buf.capacity(), cap);
        buf.remake(400);
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn test_remake() {
        let mut buf = SimdBuf::from_slice(&[9; 20]);
        buf.remake(300);
        assert_eq!(buf.len(), 300);
        assert!(buf.capacity() >= 300 + BYTES_PER_VEC);
        buf.remake(0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_xcap() {
        let mut buf = SimdBuf::from_slice(&[1, 2, 3]);
        let cap = buf.capacity();
        buf.xcap();
        assert_eq!(buf.capacity(), cap);
        assert_eq!(&buf[..], &[1, 2, 3]);
    }

    #[test]
    fn test_equality_and_debug() {
        let a = SimdBuf::from_slice(&[1, 2, 3]);
        let mut b = a.clone();
        assert_eq!(a, b);
        b[0] = 4;
        assert_ne!(a, b);

        let debug_str = format!("{:?}", a);
        assert!(debug_str.contains("SimdBuf"));
        assert!(debug_str.contains("[1, 2, 3]"));
    }

    #[test]
    fn test_deref() {
        let mut buf = SimdBuf::from(&b"abc"[..]);
        buf.as_mut_slice().reverse();
        assert_eq!(&*buf, b"cba");
        assert_eq!(buf.iter().count(), 3);
    }

    #[test]
    fn test_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<SimdBuf>();
        assert_sync::<SimdBuf>();
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn test_capacity_overflow() {
        let _ = SimdBuf::allocate(usize::MAX);
    }
}
