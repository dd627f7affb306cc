pub mod image;
pub mod iterator;
pub(crate) mod num;
pub(crate) mod transform;
