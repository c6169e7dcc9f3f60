use image::{imageops::FilterType, GrayImage, Luma};
use rand::Rng;
use thiserror::Error;

pub const GRID_SIDE: u32 = 28;
pub const GRID_LEN: usize = (GRID_SIDE * GRID_SIDE) as usize;

#[derive(Error, Debug)]
pub enum PixelGridError {
    #[error("Expected 784 pixels, got {0}")]
    InvalidLength(usize),
    #[error("Failed to decode canvas image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Canvas image is empty")]
    EmptyImage,
}

/// 28x28 grayscale intensities, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    pixels: Vec<u8>,
}

impl PixelGrid {
    pub fn from_pixels(pixels: Vec<u8>) -> Result<Self, PixelGridError> {
        if pixels.len() != GRID_LEN {
            return Err(PixelGridError::InvalidLength(pixels.len()));
        }
        Ok(Self { pixels })
    }

    pub fn filled(value: u8) -> Self {
        Self {
            pixels: vec![value; GRID_LEN],
        }
    }

    pub fn black() -> Self {
        Self::filled(0)
    }

    pub fn white() -> Self {
        Self::filled(u8::MAX)
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let pixels = (0..GRID_LEN).map(|_| rng.random::<u8>()).collect();
        Self { pixels }
    }

    /// Decodes a snapshot of the drawing canvas (white strokes on black) and
    /// downsamples its red channel to the grid size.
    pub fn from_canvas_png(bytes: &[u8]) -> Result<Self, PixelGridError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(PixelGridError::EmptyImage);
        }

        let stroke: GrayImage =
            GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                Luma([rgba.get_pixel(x, y)[0]])
            });
        let resized =
            image::imageops::resize(&stroke, GRID_SIDE, GRID_SIDE, FilterType::CatmullRom);

        Self::from_pixels(resized.into_raw())
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Flattened request payload. Values stay in `0.0..=255.0`.
    pub fn to_payload(&self) -> Vec<f32> {
        self.pixels.iter().map(|&p| f32::from(p)).collect()
    }
}
