use crate::{
    dithering::threshold::ThresholdMap,
    error::{DitherError, Result},
    texture::Texture,
};

/// Deepest matrix generated, 2048x2048.
pub const MAX_DEPTH: i32 = 10;

/// Bayer matrix of side `2^(depth + 1)` normalized to [0, 1).
///
/// Every entry is a distinct multiple of `1 / 4^(depth + 1)`, so comparing a
/// rising brightness against the tiled matrix reveals one more pixel per step.
pub fn generate(depth: i32) -> Result<ThresholdMap> {
    if depth < 0 {
        return Err(DitherError::configuration(format!(
            "bayer depth must not be negative, got {}",
            depth
        )));
    }
    if depth > MAX_DEPTH {
        return Err(DitherError::configuration(format!(
            "bayer depth is too high! Max depth = {}, got {}",
            MAX_DEPTH, depth
        )));
    }
    let depth = depth as u32;
    let side = 1u32 << (depth + 1);
    let coeff = 4u32.pow(depth + 1) as f32;

    let values = ranks(depth).into_iter().map(|v| v as f32 / coeff).collect();
    log::debug!("generated {}x{} bayer matrix", side, side);
    ThresholdMap::new(Texture::from_vec(side, side, values)?)
}

/// Un-normalized matrix, row-major.
///
/// From the previous matrix `M` of side `s`, assembled by quadrants:
///
/// ```text
/// | 4M     | 4M + 2 |
/// | 4M + 3 | 4M + 1 |
/// ```
fn ranks(depth: u32) -> Vec<u32> {
    if depth == 0 {
        return vec![0, 2, 3, 1];
    }

    let prev = ranks(depth - 1);
    let prev_side = 1usize << depth;
    let side = prev_side * 2;

    let mut matrix = Vec::with_capacity(side * side);
    // top half
    for row in prev.chunks_exact(prev_side) {
        matrix.extend(row.iter().map(|v| v * 4));
        matrix.extend(row.iter().map(|v| v * 4 + 2));
    }
    // bottom half, from the top half: left block + 3, right block - 1
    for y in 0..prev_side {
        let top_row = y * side;
        for x in 0..side {
            let value = matrix[top_row + x];
            matrix.push(if x < prev_side { value + 3 } else { value - 1 });
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::texture::TextureRef;

    #[test]
    fn test_base_matrix() {
        let map = generate(0).unwrap();
        assert_eq!(map.side(), 2);
        assert_eq!(map.values(), &[0.0, 0.5, 0.75, 0.25]);
    }

    #[test]
    fn test_depth_1_layout() {
        assert_eq!(
            ranks(1),
            vec![0, 8, 2, 10, 12, 4, 14, 6, 3, 11, 1, 9, 15, 7, 13, 5]
        );
    }

    #[test]
    fn test_side_distinct_and_range() {
        for depth in 0..=5 {
            let map = generate(depth).unwrap();
            let side = 1usize << (depth + 1);
            assert_eq!(map.side(), side);
            assert_eq!(map.texture().shape(), (side, side));

            let levels = 4f32.powi(depth + 1);
            let max = 1.0 - 1.0 / levels;
            assert!(map.values().iter().all(|v| (0.0..=max).contains(v)));

            let unique = map.values().iter().map(|v| v.to_bits()).unique().count();
            assert_eq!(unique, side * side, "depth {} has repeated values", depth);
        }
    }

    #[test]
    fn test_ranks_are_permutation() {
        let ranks = ranks(3);
        let sorted = ranks.iter().copied().sorted().collect_vec();
        assert_eq!(sorted, (0..256).collect_vec());
    }

    #[test]
    fn test_negative_depth_rejected() {
        let err = generate(-1).unwrap_err();
        assert!(matches!(err, DitherError::Configuration(_)));
    }

    #[test]
    fn test_too_deep_rejected() {
        assert!(generate(MAX_DEPTH + 1).is_err());
    }
}
