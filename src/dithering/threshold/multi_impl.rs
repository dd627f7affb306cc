use bitpunker_macros::simd_targets;
use rayon::prelude::*;

/// `tiled` holds `side_mask + 1` rows of `width` thresholds, row `y` of the
/// image uses tiled row `y & side_mask`.
#[simd_targets]
pub fn scalar(in_buf: &[f32], width: usize, out_buf: &mut [u8], tiled: &[f32], side_mask: usize) {
    in_buf
        .chunks_exact(width)
        .zip(out_buf.chunks_exact_mut(width))
        .enumerate()
        .for_each(|(y, (in_row, out_row))| {
            let tiled_start = (y & side_mask) * width;
            threshold_row(in_row, &tiled[tiled_start..tiled_start + width], out_row);
        });
}

#[simd_targets]
pub fn scalar_par(
    in_buf: &[f32],
    width: usize,
    out_buf: &mut [u8],
    tiled: &[f32],
    side_mask: usize,
) {
    out_buf
        .par_chunks_exact_mut(width)
        .zip(in_buf.par_chunks_exact(width))
        .enumerate()
        .for_each(|(y, (out_row, in_row))| {
            let tiled_start = (y & side_mask) * width;
            threshold_row(in_row, &tiled[tiled_start..tiled_start + width], out_row);
        });
}

#[inline(always)]
fn threshold_row(in_row: &[f32], tiled_row: &[f32], out_row: &mut [u8]) {
    out_row
        .iter_mut()
        .zip(in_row.iter().zip(tiled_row))
        .for_each(|(bit, (brightness, threshold))| *bit = (*brightness > *threshold) as u8);
}
