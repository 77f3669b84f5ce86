//! Fixed-width integer helpers.
//!
//! Integer payloads are kept as a 64-bit pattern already truncated to the
//! kind's width: sign-extended for signed kinds, zero-extended otherwise.

/// Truncate `bits` to `width` bits, then re-extend according to `signed`.
#[inline]
#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    reason = "two's complement reinterpretation is the point"
)]
pub(crate) const fn normalize(bits: u64, width: u32, signed: bool) -> u64 {
    if width >= 64 {
        return bits;
    }
    let shift = 64 - width;
    if signed {
        (((bits << shift) as i64) >> shift) as u64
    } else {
        (bits << shift) >> shift
    }
}

/// Mathematical value of a normalized pattern.
#[inline]
#[allow(
    clippy::cast_possible_wrap,
    reason = "signed patterns are stored sign-extended"
)]
pub(crate) fn to_i128(bits: u64, signed: bool) -> i128 {
    if signed {
        i128::from(bits as i64)
    } else {
        i128::from(bits)
    }
}
