//! Zig-zag sign mapping: a bijection between `i8` residuals and `u8`
//! symbols that places small magnitudes, positive or negative, near zero.
//!
//! `0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...`

/// Map a signed residual to its unsigned zig-zag symbol.
///
/// Branch-free bit-trick form (`original_source/Shared/zigzag.h`'s
/// `zigzag_num_neg_to_offset`): shift the value up by one bit to make
/// room for the sign, then XOR with the sign bit smeared across all
/// eight bits so that negative values get complemented.
pub fn zigzag(value: i8) -> u8 {
    let unsigned = value as u8;
    let high7 = unsigned.wrapping_shl(1);
    let low1 = unsigned >> 7;
    let mask = 0u8.wrapping_sub(low1);
    high7 ^ mask
}

/// Inverse of [`zigzag`]: recover the signed residual from its symbol.
pub fn unzigzag(value: u8) -> i8 {
    let high7 = value >> 1;
    let low1 = value & 0x1;
    let mask = 0u8.wrapping_sub(low1);
    (high7 ^ mask) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The branching definition from `zigzag.h`'s
    /// `pixelpack_num_neg_to_offset`, kept only in tests as a
    /// cross-check against the branch-free form actually shipped.
    fn zigzag_branching(value: i32) -> u32 {
        if value == 0 {
            0
        } else if value < 0 {
            (value * -2) as u32 - 1
        } else {
            value as u32 * 2
        }
    }

    #[test]
    fn matches_known_small_values() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(-2), 3);
        assert_eq!(zigzag(2), 4);
        assert_eq!(zigzag(-3), 5);
        assert_eq!(zigzag(3), 6);
    }

    #[test]
    fn agrees_with_branching_reference() {
        for v in i8::MIN..=i8::MAX {
            let expected = zigzag_branching(v as i32) as u8;
            assert_eq!(zigzag(v), expected, "mismatch for {v}");
            if v == i8::MAX {
                break;
            }
        }
    }

    #[test]
    fn is_total_bijection_on_0_255() {
        let mut seen = [false; 256];
        for v in i8::MIN..=i8::MAX {
            let z = zigzag(v);
            assert!(!seen[z as usize], "collision at zigzag({v}) = {z}");
            seen[z as usize] = true;
            if v == i8::MAX {
                break;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn round_trips_every_byte() {
        for n in 0u8..=255 {
            let restored = zigzag(unzigzag(n));
            assert_eq!(restored, n, "round trip failed for {n}");
        }
    }

    #[test]
    fn round_trips_every_signed_value() {
        for v in i8::MIN..=i8::MAX {
            assert_eq!(unzigzag(zigzag(v)), v);
            if v == i8::MAX {
                break;
            }
        }
    }
}
