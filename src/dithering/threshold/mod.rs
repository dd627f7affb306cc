pub mod bayer;
pub mod blue_noise;
mod multi_impl;
pub mod store;

use std::fmt::Display;

use crate::{
    error::{DitherError, Result},
    texture::{BinaryField, BrightnessField, Shape, Texture, TextureMutSlice, TextureRef, TextureSlice},
    transform::traits::TextureTransform,
    utils::{self, num::pow_2_order},
};

/// Square table of thresholds in [0, 1], tiled over the image by ordered
/// dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdMap {
    /// threshold values, row-major
    texture: Texture<f32>,
    /// log2 of the map side.
    ///
    /// > a 2x2 bayer matrix is order 1, a 32x32 blue noise map order 5.
    order: usize,
    /// bits of the side set to 1.
    ///
    /// Used for faster % computations on power of 2s.
    ///
    /// > x % 2^k === x & (2^k - 1)
    side_mask: usize,
}

impl ThresholdMap {
    /// Wrap threshold values. The texture must be square with a power of 2 side.
    pub fn new(texture: Texture<f32>) -> Result<Self> {
        let (width, height) = texture.shape();
        let order = match pow_2_order(width) {
            Some(order) if width == height => order,
            _ => {
                return Err(DitherError::invalid_state(format!(
                    "threshold map must be square with a power of 2 side, got {}x{}",
                    width, height
                )));
            }
        };
        Ok(Self {
            texture,
            order,
            side_mask: width - 1,
        })
    }

    /// Map from 8-bit levels, `level / 255`.
    pub fn from_levels(levels: &Texture<u8>) -> Result<Self> {
        let values = levels.as_ref().iter().map(|v| *v as f32 / 255.0).collect();
        Self::new(Texture::from_vec(levels.width(), levels.height(), values)?)
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side_mask + 1
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn values(&self) -> &[f32] {
        self.texture.as_ref()
    }

    pub fn texture(&self) -> &Texture<f32> {
        &self.texture
    }

    /// Get the idx in the map corresponding to a pixel coordinate of a
    /// (possibly much larger) image.
    #[inline(always)]
    pub fn tiled_idx(&self, x: usize, y: usize) -> usize {
        ((y & self.side_mask) << self.order) + (x & self.side_mask)
    }

    /// Threshold applied to the image pixel (x, y)
    #[inline]
    pub fn threshold(&self, x: usize, y: usize) -> f32 {
        self.values()[self.tiled_idx(x, y)]
    }

    /// Equivalent to 1.0 - threshold
    pub fn complement(&self) -> Vec<f32> {
        self.values().iter().map(|v| 1.0 - *v).collect()
    }
}

/// Strategy for running ordered dithering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedStrategy {
    /// Simple scalar implementation
    Scalar,
    /// Rows processed in parallel
    ScalarPar,
}

impl OrderedStrategy {
    /// Detect best-fit strategy
    pub fn auto(shape: Shape) -> Self {
        let (width, height) = shape;
        if rayon::current_num_threads() == 1 || width * height < 64 * 64 {
            return Self::Scalar;
        }
        Self::ScalarPar
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderedStrategy::Scalar => "scalar",
            OrderedStrategy::ScalarPar => "scalar-par",
        }
    }
}

impl Display for OrderedStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered dithering: a pixel is set when its brightness is above the
/// threshold the tiled map holds for it (or above `1 - threshold` when
/// inverted).
pub struct OrderedTransform<'m> {
    map: &'m ThresholdMap,
    invert: bool,
    strategy: Option<OrderedStrategy>,
    /// thresholds of `map.side()` image rows, precomputed on prepare
    tiled: Vec<f32>,
    tiled_width: usize,
}

impl<'m> OrderedTransform<'m> {
    pub fn new(map: &'m ThresholdMap, invert: bool) -> Self {
        Self {
            map,
            invert,
            strategy: None,
            tiled: Vec::new(),
            tiled_width: 0,
        }
    }

    /// Force a strategy instead of picking one from the image shape
    pub fn with_strategy(mut self, strategy: OrderedStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    fn precompute(&mut self, width: usize) {
        let values = if self.invert {
            self.map.complement()
        } else {
            self.map.values().to_vec()
        };
        let side = self.map.side();
        let side_mask = side - 1;
        let order = self.map.order();
        self.tiled = utils::transform::precompute_tiled_rows(side, width, |x, y, _| {
            values[(y << order) + (x & side_mask)]
        });
        self.tiled_width = width;
    }
}

impl TextureTransform for OrderedTransform<'_> {
    type Input = f32;
    type Output = u8;

    fn apply<'i, 'o>(
        &mut self,
        input: TextureSlice<'i, Self::Input>,
        mut output: TextureMutSlice<'o, Self::Output>,
    ) -> (
        TextureSlice<'i, Self::Input>,
        TextureMutSlice<'o, Self::Output>,
    ) {
        let (width, _) = input.shape();
        if self.tiled_width != width {
            self.precompute(width);
        }
        let strategy = self
            .strategy
            .unwrap_or_else(|| OrderedStrategy::auto(input.shape()));

        match strategy {
            OrderedStrategy::Scalar => multi_impl::scalar(
                input.as_ref(),
                width,
                output.as_mut(),
                &self.tiled,
                self.map.side_mask,
            ),
            OrderedStrategy::ScalarPar => multi_impl::scalar_par(
                input.as_ref(),
                width,
                output.as_mut(),
                &self.tiled,
                self.map.side_mask,
            ),
        }
        (input, output)
    }

    fn prepare(&mut self, in_shape: Shape, _: Shape) {
        if self.strategy.is_none() {
            log::debug!(
                "ordered dithering {}x{} with {} strategy",
                in_shape.0,
                in_shape.1,
                OrderedStrategy::auto(in_shape)
            );
        }
        self.precompute(in_shape.0);
    }
}

/// Dither a brightness field against a tiled threshold map.
pub fn dither_ordered(
    brightness: &BrightnessField,
    map: &ThresholdMap,
    invert: bool,
) -> BinaryField {
    OrderedTransform::new(map, invert).run(brightness)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_map() -> ThresholdMap {
        ThresholdMap::new(Texture::from_slice(2, 2, &[0.0, 0.5, 0.75, 0.25])).unwrap()
    }

    fn uniform(size: u32, value: f32) -> BrightnessField {
        Texture::filled(size, size, value)
    }

    fn ones(bits: &BinaryField) -> usize {
        bits.as_ref().iter().filter(|b| **b == 1).count()
    }

    #[test]
    fn test_map_rejects_non_square() {
        let texture = Texture::from_slice(4, 2, &[0.0; 8]);
        assert!(ThresholdMap::new(texture).is_err());
    }

    #[test]
    fn test_map_rejects_non_pow_2() {
        let texture = Texture::from_slice(3, 3, &[0.0; 9]);
        assert!(ThresholdMap::new(texture).is_err());
    }

    #[test]
    fn test_tiled_idx_wraps() {
        let map = base_map();
        assert_eq!(map.side(), 2);
        assert_eq!(map.order(), 1);
        assert_eq!(map.threshold(0, 0), 0.0);
        assert_eq!(map.threshold(3, 0), 0.5);
        assert_eq!(map.threshold(2, 5), 0.75);
        assert_eq!(map.threshold(5, 7), 0.25);
    }

    #[test]
    fn test_ordered_compares_strictly() {
        let map = base_map();
        // 0.5 is not above the 0.5 threshold
        let bits = dither_ordered(&uniform(2, 0.5), &map, false);
        assert_eq!(bits.as_ref(), &[1, 0, 0, 1]);
    }

    #[test]
    fn test_ordered_invert_uses_complement() {
        let map = base_map();
        // complements are 1.0, 0.5, 0.25, 0.75
        let bits = dither_ordered(&uniform(2, 0.6), &map, true);
        assert_eq!(bits.as_ref(), &[0, 1, 1, 0]);
    }

    #[test]
    fn test_ordered_tiles_over_odd_shapes() {
        let map = base_map();
        let field = Texture::filled(5, 3, 0.6f32);
        let bits = dither_ordered(&field, &map, false);
        for y in 0..3 {
            for x in 0..5 {
                let expected = (0.6 > map.threshold(x, y)) as u8;
                assert_eq!(bits.get(x, y), expected, "pixel {} {}", x, y);
            }
        }
    }

    #[test]
    fn test_ordered_fraction_tracks_brightness() {
        let map = bayer::generate(2).unwrap();
        let cells = map.side() * map.side();
        for step in 0..=10 {
            let value = step as f32 / 10.0;
            let bits = dither_ordered(&uniform(64, value), &map, false);
            let fraction = ones(&bits) as f32 / (64.0 * 64.0);
            assert!(
                (fraction - value).abs() <= 1.0 / cells as f32,
                "brightness {} gave {} set",
                value,
                fraction
            );
        }
    }

    #[test]
    fn test_strategies_match() {
        let map = bayer::generate(3).unwrap();
        let values: Vec<f32> = (0..100 * 70).map(|i| (i % 97) as f32 / 96.0).collect();
        let field = Texture::from_vec(100, 70, values).unwrap();

        let scalar = OrderedTransform::new(&map, false)
            .with_strategy(OrderedStrategy::Scalar)
            .run(&field);
        let par = OrderedTransform::new(&map, false)
            .with_strategy(OrderedStrategy::ScalarPar)
            .run(&field);
        assert_eq!(scalar, par);
    }

    #[test]
    fn test_transform_reused_for_other_width() {
        let map = base_map();
        let mut transform = OrderedTransform::new(&map, false);
        let narrow = transform.run(&Texture::filled(2, 2, 0.6f32));
        let wide = transform.run(&Texture::filled(4, 1, 0.6f32));
        assert_eq!(narrow.as_ref(), &[1, 1, 0, 1]);
        assert_eq!(wide.as_ref(), &[1, 1, 1, 1]);
    }
}
