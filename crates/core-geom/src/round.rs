//! The one non-canonical-rounding rule the engine is contractually required
//! to preserve exactly (spec §9 "Non-canonical integer rounding on diagonal
//! splits"): round `p / d` to nearest using `((r % d) << 1) >= d`, where `r`
//! is the remainder of `p / d`. This differs from banker's rounding and from
//! `f64::round` at exact half boundaries in ways that are part of the
//! observable contract, because the resulting one-unit perturbation is what
//! gets logged to undo (spec §4.2a). Do not replace this with a library
//! round.

/// Round `numerator / denominator` to the nearest integer using the engine's
/// half-denominator rule, computing the intermediate product in `i128` so a
/// caller forming `numerator` as `y_offset * width` cannot overflow `i64`
/// before the divide (spec §7.3).
///
/// `denominator` must be strictly positive; both operands are expected to be
/// non-negative, matching every call site in this workspace (diagonal
/// geometry only ever divides a non-negative offset by a tile's width or
/// height).
pub fn round_div(numerator: i128, denominator: i64) -> i64 {
    debug_assert!(denominator > 0, "round_div denominator must be positive");
    debug_assert!(numerator >= 0, "round_div numerator must be non-negative");

    let d = denominator as i128;
    let q = numerator / d;
    let r = numerator % d;

    let rounded = if (r << 1) >= d { q + 1 } else { q };

    rounded as i64
}

/// Widen a product that the caller intends to feed into [`round_div`],
/// keeping the overflow-avoidance step visible at call sites (spec §7.3).
pub fn mul_wide(a: i64, b: i64) -> i128 {
    (a as i128) * (b as i128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_half_rounds_up() {
        // 5 / 2 = 2.5 -> rule rounds up to 3.
        assert_eq!(round_div(5, 2), 3);
    }

    #[test]
    fn below_half_rounds_down() {
        // 9 / 4 = 2.25 -> rounds down to 2.
        assert_eq!(round_div(9, 4), 2);
    }

    #[test]
    fn above_half_rounds_up() {
        // 11 / 4 = 2.75 -> rounds up to 3.
        assert_eq!(round_div(11, 4), 3);
    }

    #[test]
    fn exact_division_is_unaffected() {
        assert_eq!(round_div(12, 4), 3);
    }

    #[test]
    fn wide_product_does_not_overflow_i64() {
        let a = i64::MAX / 2;
        let wide = mul_wide(a, 3);
        assert_eq!(wide, (a as i128) * 3);
    }
}
