use num_traits::{PrimInt, Unsigned};

/// Distance between two coordinates on an axis that wraps around.
///
/// > min(|a - b|, len - |a - b|)
///
/// Both coordinates must be lower than `len`.
#[inline]
pub fn toroidal_distance<Integral>(a: Integral, b: Integral, len: Integral) -> Integral
where
    Integral: PrimInt + Unsigned,
{
    debug_assert!(a < len && b < len);
    let direct = if a > b { a - b } else { b - a };
    direct.min(len - direct)
}

/// `log2(n)` when `n` is a power of 2, `None` otherwise.
#[inline]
pub fn pow_2_order<Integral>(n: Integral) -> Option<usize>
where
    Integral: PrimInt + Unsigned,
{
    if n.count_ones() == 1 {
        Some(n.trailing_zeros() as usize)
    } else {
        None
    }
}
