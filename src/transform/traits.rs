use crate::texture::{Shape, Texture, TextureMutSlice, TextureRef, TextureSlice};

/// Core trait for transforming one texture into another of the same shape.
///
/// Uses associated types for Input/Output to ensure type safety when chaining.
/// Lifetimes are method-local, so the same transform can be applied to
/// many images.
pub trait TextureTransform: Sized {
    type Input;
    type Output;

    /// Apply the transform from input texture to output texture
    fn apply<'i, 'o>(
        &mut self,
        input: TextureSlice<'i, Self::Input>,
        output: TextureMutSlice<'o, Self::Output>,
    ) -> (
        TextureSlice<'i, Self::Input>,
        TextureMutSlice<'o, Self::Output>,
    );

    /// Preparation step that can inspect data shape before transformation
    fn prepare(&mut self, in_shape: Shape, out_shape: Shape);

    /// Prepare, allocate an output of the input's shape and apply.
    fn run(&mut self, input: &Texture<Self::Input>) -> Texture<Self::Output>
    where
        Self::Output: Default + Copy,
    {
        let mut output = Texture::with_shape(input.shape());
        self.prepare(input.shape(), output.shape());
        self.apply(input.as_texture_slice(), output.as_texture_mut_slice());
        output
    }
}
