//! Integer averaging helpers shared by the sampler.

/// Right-shift that replaces division by `count` when `count` is a power of
/// two greater than one. Returns 0 for every other count, including 1.
#[inline]
pub fn shift_for(count: u8) -> u8 {
    if count > 1 && count.is_power_of_two() {
        count.trailing_zeros() as u8
    } else {
        0
    }
}

/// `sum / 2^shift`, rounded to nearest with halves rounding up. `shift > 0`.
#[inline]
pub fn shift_round_nearest(sum: u32, shift: u8) -> u32 {
    debug_assert!(shift > 0);
    (sum + (1 << (shift - 1))) >> shift
}

/// `sum / count`, rounded to nearest with halves rounding up. `count > 0`.
#[inline]
pub fn div_round_nearest(sum: u32, count: u32) -> u32 {
    debug_assert!(count > 0);
    (sum + (count >> 1)) / count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_only_for_powers_of_two() {
        assert_eq!(shift_for(1), 0);
        assert_eq!(shift_for(2), 1);
        assert_eq!(shift_for(3), 0);
        assert_eq!(shift_for(16), 4);
        assert_eq!(shift_for(48), 0);
        assert_eq!(shift_for(64), 6);
    }

    #[test]
    fn rounding_halves_up() {
        // 5/2 = 2.5 -> 3 on both paths
        assert_eq!(shift_round_nearest(5, 1), 3);
        assert_eq!(div_round_nearest(5, 2), 3);
        // 7/3 = 2.33 -> 2, 8/3 = 2.67 -> 3
        assert_eq!(div_round_nearest(7, 3), 2);
        assert_eq!(div_round_nearest(8, 3), 3);
        assert_eq!(shift_round_nearest(4 * 1023, 2), 1023);
    }
}
