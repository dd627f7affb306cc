use image::ImageBuffer;

use crate::error::{DitherError, Result};

/// (width, height)
pub type Shape = (usize, usize);

/// Per-pixel brightness in the [0, 1] range.
pub type BrightnessField = Texture<f32>;

/// Dithered output, one `0` or `1` per pixel.
pub type BinaryField = Texture<u8>;

/// Trait defining ops available on Textures with
/// lendable inner buffer
pub trait TextureRef: AsRef<[Self::Inner]> {
    type Inner;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    #[inline]
    fn shape(&self) -> Shape {
        (self.width() as usize, self.height() as usize)
    }

    /// Row-major index of a pixel coordinate
    #[inline(always)]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width() as usize + x
    }
}

/// Texture with owned buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture<T> {
    width: u32,
    height: u32,
    buffer: Vec<T>,
}

impl<T> AsRef<[T]> for Texture<T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        &self.buffer
    }
}

impl<T> AsMut<[T]> for Texture<T> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        &mut self.buffer
    }
}

impl<T> TextureRef for Texture<T> {
    type Inner = T;

    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }
}

impl<T> Texture<T> {
    /// Wrap an existing row-major buffer.
    ///
    /// Fails with [DitherError::InvalidState] when the buffer length does not
    /// match the shape or when the shape is empty.
    pub fn from_vec(width: u32, height: u32, buffer: Vec<T>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DitherError::invalid_state(format!(
                "texture has an empty shape {}x{}",
                width, height
            )));
        }
        if buffer.len() != width as usize * height as usize {
            return Err(DitherError::invalid_state(format!(
                "buffer of {} values does not match a {}x{} texture",
                buffer.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            buffer,
        })
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.buffer.chunks_exact(self.width as usize)
    }

    pub fn as_texture_slice(&self) -> TextureSlice<'_, T> {
        TextureSlice {
            width: self.width,
            height: self.height,
            buffer: &self.buffer,
        }
    }

    pub fn as_texture_mut_slice(&mut self) -> TextureMutSlice<'_, T> {
        TextureMutSlice {
            width: self.width,
            height: self.height,
            buffer: &mut self.buffer,
        }
    }
}

impl<T: Copy> Texture<T> {
    /// Value at pixel coordinate.
    ///
    /// # Panics
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.buffer[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.idx(x, y);
        self.buffer[idx] = value;
    }
}

impl<T: Clone> Texture<T> {
    /// # Panics
    /// This function will panic if the slice does not match the shape.
    pub fn from_slice(width: u32, height: u32, slice: &[T]) -> Self {
        assert_eq!(
            slice.len(),
            (width * height) as usize,
            "buffers don't match sizes"
        );
        Texture {
            width,
            height,
            buffer: slice.to_owned(),
        }
    }

    /// Texture with every pixel set to `value`
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            buffer: vec![value; (width * height) as usize],
        }
    }
}

impl<T: Default + Copy> Texture<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, T::default())
    }

    pub fn with_shape(shape: Shape) -> Self {
        Self::new(shape.0 as u32, shape.1 as u32)
    }
}

impl<T: image::Primitive> From<ImageBuffer<image::Luma<T>, Vec<T>>> for Texture<T> {
    fn from(value: ImageBuffer<image::Luma<T>, Vec<T>>) -> Self {
        let (width, height) = value.dimensions();
        Texture {
            width,
            height,
            buffer: value.into_raw(),
        }
    }
}

/// Texture with borrowed internal buffer
#[derive(Debug, Copy, Clone)]
pub struct TextureSlice<'a, T> {
    width: u32,
    height: u32,
    buffer: &'a [T],
}

impl<T> AsRef<[T]> for TextureSlice<'_, T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.buffer
    }
}

impl<T> TextureRef for TextureSlice<'_, T> {
    type Inner = T;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[derive(Debug)]
pub struct TextureMutSlice<'a, T> {
    width: u32,
    height: u32,
    buffer: &'a mut [T],
}

impl<T> AsRef<[T]> for TextureMutSlice<'_, T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.buffer
    }
}

impl<T> AsMut<[T]> for TextureMutSlice<'_, T> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.buffer
    }
}

impl<T> TextureRef for TextureMutSlice<'_, T> {
    type Inner = T;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

pub mod prelude {
    pub use super::{
        BinaryField, BrightnessField, Shape, Texture, TextureMutSlice, TextureRef, TextureSlice,
    };
}
