//! Floating-point scans.

use super::scalar;

const F64_PER_VEC: usize = 2;

/// Position of the first NaN or infinity in `data`.
///
/// ```rust
/// use bytekern::simd::find_nan_or_inf64;
///
/// assert_eq!(find_nan_or_inf64(&[1.0, -0.0, f64::NEG_INFINITY]), Some(2));
/// assert_eq!(find_nan_or_inf64(&[f64::MAX, f64::MIN_POSITIVE]), None);
/// ```
pub fn find_nan_or_inf64(data: &[f64]) -> Option<usize> {
    if data.len() < 16 {
        return scalar::find_nan_or_inf64(data);
    }
    simd_dispatch!(
        sse42 => sse::find_nan_or_inf64(data.as_ptr(), data.len()),
        _ => scalar::find_nan_or_inf64(data)
    )
}

#[cfg(target_arch = "x86_64")]
mod sse {
    use super::F64_PER_VEC;
    use crate::simd::raw::load_vec;
    use std::arch::x86_64::*;

    const EXPONENT_MASK: i64 = 0x7ff << 52;

    /// `len >= 2`; the last pair overlaps the one before it when `len` is odd.
    #[target_feature(enable = "sse2,ssse3,sse4.1,sse4.2")]
    pub(super) unsafe fn find_nan_or_inf64(data: *const f64, len: usize) -> Option<usize> {
        unsafe {
            let base = data.cast::<u8>();
            let exp = _mm_set1_epi64x(EXPONENT_MASK);
            let last = len - F64_PER_VEC;
            let mut elem = 0;
            loop {
                let at = elem.min(last);
                let v = _mm_and_si128(load_vec(base, 8 * at), exp);
                let hit = _mm_movemask_pd(_mm_castsi128_pd(_mm_cmpeq_epi64(v, exp)));
                if hit != 0 {
                    return Some(at + hit.trailing_zeros() as usize);
                }
                if at == last {
                    return None;
                }
                elem += F64_PER_VEC;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_position() {
        for len in 0..40 {
            let mut data: Vec<f64> = (0..len).map(|i| i as f64 * 1.5 - 10.0).collect();
            assert_eq!(find_nan_or_inf64(&data), None);
            for pos in 0..len {
                for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                    let saved = data[pos];
                    data[pos] = bad;
                    assert_eq!(find_nan_or_inf64(&data), Some(pos), "len {} pos {}", len, pos);
                    data[pos] = saved;
                }
            }
        }
    }

    #[test]
    fn test_first_of_several() {
        let mut data = vec![0.0f64; 100];
        data[77] = f64::NAN;
        data[31] = f64::INFINITY;
        assert_eq!(find_nan_or_inf64(&data), Some(31));
    }
}
