/// Image loading for asciitile: file on disk → immutable [`PixelBuffer`](at_core::PixelBuffer).

pub mod image;

pub use crate::image::{ImageSource, load_image};
