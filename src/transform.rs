pub mod brightness;
pub mod pipe;
pub mod traits;

pub mod prelude {
    pub use super::brightness::{Brightness, BrightnessTransform};
    pub use super::pipe::{PipeableTransform, Pipeline};
    pub use super::traits::TextureTransform;
}
