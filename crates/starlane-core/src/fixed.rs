use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits. Used for research
/// points and species trait modifiers so that fractional carry is identical
/// on every platform.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for initialization and config.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Convert a whole-number count into Fixed64, saturating at the type's range.
#[inline]
pub fn from_count(v: u64) -> Fixed64 {
    Fixed64::saturating_from_num(v)
}

/// Floor a Fixed64 to a non-negative integer. Negative values clamp to 0.
#[inline]
pub fn floor_to_u64(v: Fixed64) -> u64 {
    if v <= Fixed64::ZERO {
        0
    } else {
        v.floor().to_num::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
    }

    #[test]
    fn one_point_seven_five_is_exact() {
        let m = f64_to_fixed64(1.75);
        assert_eq!(fixed64_to_f64(m * m), 3.0625);
    }

    #[test]
    fn floor_clamps_negative() {
        assert_eq!(floor_to_u64(f64_to_fixed64(-3.5)), 0);
        assert_eq!(floor_to_u64(f64_to_fixed64(7.9)), 7);
    }

    #[test]
    fn from_count_saturates() {
        assert_eq!(from_count(u64::MAX), Fixed64::MAX);
        assert_eq!(from_count(12), Fixed64::from_num(12));
    }
}
