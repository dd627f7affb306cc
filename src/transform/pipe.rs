use crate::texture::{Shape, Texture, TextureMutSlice, TextureRef, TextureSlice};
use crate::transform::traits::TextureTransform;

/// Extension trait that enables pipeline chaining
pub trait PipeableTransform: TextureTransform + Sized {
    /// Chain this transform with another, creating a pipeline
    ///
    /// The intermediate buffer between the two transforms is allocated automatically.
    ///
    /// # Example
    /// ```ignore
    /// // 8-bit levels -> brightness -> dithered bits
    /// let mut pipeline = brightness.pipe(ordered, (800, 600));
    /// pipeline.apply(levels.as_texture_slice(), bits.as_texture_mut_slice());
    /// ```
    fn pipe<T>(self, next: T, shape: Shape) -> Pipeline<Self::Input, Self::Output, T::Output, Self, T>
    where
        T: TextureTransform<Input = Self::Output>,
        Self::Output: Default + Copy,
    {
        Pipeline::with_buffer(self, next, Texture::with_shape(shape))
    }
}

// Blanket implementation: all TextureTransforms are automatically pipeable
impl<T: TextureTransform> PipeableTransform for T {}

/// A pipeline that chains two transforms: A -> B -> C
///
/// The intermediate buffer B is owned by this struct and reused across invocations.
///
/// Exposes only A -> C, hiding the intermediate type B.
pub struct Pipeline<A, B, C, T1, T2>
where
    T1: TextureTransform<Input = A, Output = B>,
    T2: TextureTransform<Input = B, Output = C>,
{
    t1: T1,
    t2: T2,
    b: Texture<B>,
}

impl<A, B, C, T1, T2> Pipeline<A, B, C, T1, T2>
where
    T1: TextureTransform<Input = A, Output = B>,
    T2: TextureTransform<Input = B, Output = C>,
{
    /// Create a new transform pipeline with a pre-allocated intermediate buffer
    pub fn with_buffer(t1: T1, t2: T2, intermediate: Texture<B>) -> Self {
        Self {
            t1,
            t2,
            b: intermediate,
        }
    }

    /// Intermediate texture as left by the last [TextureTransform::apply]
    pub fn intermediate(&self) -> &Texture<B> {
        &self.b
    }
}

impl<A, B, C, T1, T2> TextureTransform for Pipeline<A, B, C, T1, T2>
where
    T1: TextureTransform<Input = A, Output = B>,
    T2: TextureTransform<Input = B, Output = C>,
{
    type Input = A;
    type Output = C;

    #[inline(always)]
    fn apply<'i, 'o>(
        &mut self,
        input: TextureSlice<'i, A>,
        output: TextureMutSlice<'o, C>,
    ) -> (TextureSlice<'i, A>, TextureMutSlice<'o, C>) {
        let (input, _) = self.t1.apply(input, self.b.as_texture_mut_slice());
        let (_, output) = self.t2.apply(self.b.as_texture_slice(), output);
        (input, output)
    }

    #[inline(always)]
    fn prepare(&mut self, in_shape: Shape, out_shape: Shape) {
        let b_shape = self.b.shape();
        self.t1.prepare(in_shape, b_shape);
        self.t2.prepare(b_shape, out_shape);
    }
}
