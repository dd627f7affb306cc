/// (row offset, column offset, weight) of one diffusion target.
///
/// Row offsets are never negative and same-row targets are always to the
/// right, so error only flows to pixels not yet visited in raster order.
pub type KernelEntry = (usize, isize, f64);

pub const SIMPLE: [KernelEntry; 2] = [(1, 0, 0.5), (0, 1, 0.5)];

pub const FLOYD_STEINBERG: [KernelEntry; 4] = [
    (0, 1, 7.0 / 16.0),
    (1, -1, 3.0 / 16.0),
    (1, 0, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Only 6/8 of the error is diffused.
pub const ATKINSON: [KernelEntry; 6] = [
    (0, 1, 0.125),
    (0, 2, 0.125),
    (1, -1, 0.125),
    (1, 0, 0.125),
    (1, 1, 0.125),
    (2, 0, 0.125),
];

pub const JARVIS_JUDICE_NINKE: [KernelEntry; 12] = [
    (0, 1, 7.0 / 48.0),
    (0, 2, 5.0 / 48.0),
    (1, -2, 3.0 / 48.0),
    (1, -1, 5.0 / 48.0),
    (1, 0, 7.0 / 48.0),
    (1, 1, 5.0 / 48.0),
    (1, 2, 3.0 / 48.0),
    (2, -2, 1.0 / 48.0),
    (2, -1, 3.0 / 48.0),
    (2, 0, 5.0 / 48.0),
    (2, 1, 3.0 / 48.0),
    (2, 2, 1.0 / 48.0),
];
