//! Blue noise threshold maps built with the void-and-cluster method.
//!
//! A binary `pattern` and an `energy` field of the same shape are owned by
//! [BlueNoiseGenerator]. Every set cell spreads `exp(-d² / 2^(sigma²))` of
//! energy over the whole field, with `d` measured on a torus so the final
//! map tiles seamlessly. The densest set cell is the one with most energy
//! ("tightest cluster"), the emptiest unset cell the one with least
//! ("largest void").
//!
//! Generation runs in three phases:
//!
//! 1. seed ~10% of the cells at random;
//! 2. move the tightest cluster into the largest void until both are the
//!    same cell, giving the prototype pattern;
//! 3. rank every cell: remove the prototype cells one cluster at a time,
//!    then refill voids up to half the cells, then fill the remaining
//!    cells picking the highest energy unset cell while subtracting their
//!    contribution.
//!
//! Ranks are spread over 0..=255 for a flat histogram.

use aligned_vec::{AVec, CACHELINE_ALIGN};
use bitpunker_macros::simd_targets;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    dithering::threshold::ThresholdMap,
    error::{DitherError, Result},
    texture::Texture,
    utils::num::toroidal_distance,
};

/// Depth 3 is a 256x256 map.
pub const MAX_DEPTH: i32 = 3;
pub const DEFAULT_SIGMA: f64 = 1.9;

/// Side of the map generated for a depth: 32, 64, 128 or 256.
pub fn side_for_depth(depth: i32) -> Result<usize> {
    if !(0..=MAX_DEPTH).contains(&depth) {
        return Err(DitherError::configuration(format!(
            "blue noise depth must be between 0 and {}, got {}",
            MAX_DEPTH, depth
        )));
    }
    Ok(1 << (depth + 5))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Search {
    Min,
    Max,
}

pub struct BlueNoiseGenerator {
    side: usize,
    sigma: f64,
    /// energy spread by a set cell at every wrapped (row, column) offset
    kernel: Vec<f64>,
    pattern: Vec<bool>,
    energy: AVec<f64>,
    rng: StdRng,
}

impl BlueNoiseGenerator {
    /// Validates the parameters, nothing is allocated when they are wrong.
    pub fn new(depth: i32, sigma: f64, seed: u64) -> Result<Self> {
        let side = side_for_depth(depth)?;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(DitherError::configuration(format!(
                "blue noise sigma must be a positive number, got {}",
                sigma
            )));
        }

        let divisor = 2f64.powf(sigma * sigma);
        let total = side * side;
        let mut kernel = Vec::with_capacity(total);
        for dy in 0..side {
            let dy = toroidal_distance(dy, 0, side);
            for dx in 0..side {
                let dx = toroidal_distance(dx, 0, side);
                let distance_sq = (dy * dy + dx * dx) as f64;
                kernel.push((-distance_sq / divisor).exp());
            }
        }

        Ok(Self {
            side,
            sigma,
            kernel,
            pattern: vec![false; total],
            energy: AVec::from_iter(CACHELINE_ALIGN, std::iter::repeat_n(0.0, total)),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    #[inline]
    fn total(&self) -> usize {
        self.side * self.side
    }

    /// Run every phase and normalize the result into a threshold map.
    pub fn generate(self) -> Result<ThresholdMap> {
        ThresholdMap::from_levels(&self.generate_levels()?)
    }

    /// Run every phase, returning the 8-bit levels (the persisted form).
    pub fn generate_levels(mut self) -> Result<Texture<u8>> {
        log::info!(
            "generating {}x{} blue noise map, sigma {}",
            self.side,
            self.side,
            self.sigma
        );
        let initial = self.initial_pattern();
        self.distribute_samples();
        let ranks = self.rank_pattern(initial);
        let side = self.side as u32;
        Texture::from_vec(side, side, levels_from_ranks(&ranks))
    }

    /// Set or clear a cell and update the whole energy field.
    fn toggle(&mut self, idx: usize, set: bool, sign: f64) {
        self.pattern[idx] = set;
        let (row, col) = (idx / self.side, idx % self.side);
        spread_energy(&mut self.energy, &self.kernel, self.side, row, col, sign);
    }

    /// First cell in raster order holding `value` with the lowest (or
    /// highest) energy.
    fn find(&self, value: bool, search: Search) -> Option<usize> {
        let mut found = None;
        let mut best = match search {
            Search::Min => f64::INFINITY,
            Search::Max => f64::NEG_INFINITY,
        };
        for (idx, (&set, &energy)) in self.pattern.iter().zip(self.energy.iter()).enumerate() {
            if set != value {
                continue;
            }
            let better = match search {
                Search::Min => energy < best,
                Search::Max => energy > best,
            };
            if better || found.is_none() {
                best = energy;
                found = Some(idx);
            }
        }
        found
    }

    fn tightest_cluster(&self) -> Option<usize> {
        self.find(true, Search::Max)
    }

    fn largest_void(&self) -> Option<usize> {
        self.find(false, Search::Min)
    }

    /// Seed a tenth of the cells at unique random positions.
    fn initial_pattern(&mut self) -> usize {
        let total = self.total();
        let samples = total / 10;
        for _ in 0..samples {
            let mut idx = self.rng.random_range(0..total);
            while self.pattern[idx] {
                idx = self.rng.random_range(0..total);
            }
            self.toggle(idx, true, 1.0);
        }
        log::debug!("seeded {} of {} cells", samples, total);
        samples
    }

    /// Move the tightest cluster to the largest void until removing a cell
    /// leaves the largest void at the same spot.
    fn distribute_samples(&mut self) {
        // swap budget, a converging run only needs a fraction of it
        let max_swaps = self.total();
        for swaps in 0..max_swaps {
            let Some(cluster) = self.tightest_cluster() else {
                return;
            };
            self.toggle(cluster, false, -1.0);

            let Some(void) = self.largest_void() else {
                return;
            };
            if void == cluster {
                self.toggle(cluster, true, 1.0);
                log::debug!("prototype pattern stable after {} swaps", swaps);
                return;
            }
            self.toggle(void, true, 1.0);

            if swaps % 256 == 255 {
                log::trace!("{} swaps", swaps + 1);
            }
        }
        log::warn!(
            "prototype pattern did not settle after {} swaps, keeping the last one",
            max_swaps
        );
    }

    /// Give every cell a distinct rank in `0..total`.
    fn rank_pattern(&mut self, initial: usize) -> Vec<u32> {
        let total = self.total();
        let half = total / 2;
        let mut ranks = vec![0u32; total];
        let report = (total / 16).max(1);

        // remove the prototype points, densest first
        let mut rank = initial;
        while rank > 0 {
            let Some(cluster) = self.tightest_cluster() else {
                break;
            };
            self.toggle(cluster, false, -1.0);
            rank -= 1;
            ranks[cluster] = rank as u32;
        }
        log::debug!("ranked {} prototype points", initial);

        // fill the largest voids up to half the cells
        let mut rank = 0;
        while rank < half {
            let Some(void) = self.largest_void() else {
                break;
            };
            self.toggle(void, true, 1.0);
            ranks[void] = rank as u32;
            rank += 1;
            if rank % report == 0 {
                log::trace!("ranked {} of {} cells", rank, total);
            }
        }
        log::debug!("ranked lower half");

        // dense half: the roles of voids and clusters are inverted
        while rank < total {
            let Some(void) = self.find(false, Search::Max) else {
                break;
            };
            self.toggle(void, true, -1.0);
            ranks[void] = rank as u32;
            rank += 1;
            if rank % report == 0 {
                log::trace!("ranked {} of {} cells", rank, total);
            }
        }
        log::debug!("ranked upper half");

        ranks
    }
}

/// Add `sign * kernel` centered on (row, col) to every cell of the field.
///
/// Kernel rows are rotated so both halves of every energy row are
/// contiguous slices.
#[simd_targets]
fn spread_energy(energy: &mut [f64], kernel: &[f64], side: usize, row: usize, col: usize, sign: f64) {
    let mask = side - 1;
    for (y, energy_row) in energy.chunks_exact_mut(side).enumerate() {
        let offset = (y + side - row) & mask;
        let kernel_row = &kernel[offset * side..(offset + 1) * side];
        let (before, after) = energy_row.split_at_mut(col);
        before
            .iter_mut()
            .zip(&kernel_row[side - col..])
            .for_each(|(e, k)| *e += sign * k);
        after
            .iter_mut()
            .zip(&kernel_row[..side - col])
            .for_each(|(e, k)| *e += sign * k);
    }
}

/// floor(256 * (rank + 0.5) / total) for every cell
fn levels_from_ranks(ranks: &[u32]) -> Vec<u8> {
    let coeff = 256.0 / ranks.len() as f64;
    ranks
        .iter()
        .map(|rank| (coeff * (*rank as f64 + 0.5)) as u8)
        .collect()
}
