use image::{DynamicImage, GrayImage, Luma};

use crate::{
    error::{Result, RoiError},
    traits::RoiCodec,
    types::{Roi, RoiPixel},
};

/// Binary mask codec: ROI pixels are painted `foreground`, everything else `background`.
///
/// Decoding treats any value other than `background` as foreground, so masks
/// produced by other tools (anti-aliased edges, arbitrary marker colours) still
/// load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryMaskCodec {
    pub foreground: u8,
    pub background: u8,
}

impl Default for BinaryMaskCodec {
    fn default() -> Self {
        Self {
            foreground: 255,
            background: 0,
        }
    }
}

impl BinaryMaskCodec {
    pub fn new(foreground: u8, background: u8) -> Result<Self> {
        let codec = Self {
            foreground,
            background,
        };
        codec.check()?;
        Ok(codec)
    }

    fn check(&self) -> Result<()> {
        if self.foreground == self.background {
            return Err(RoiError::Codec(format!(
                "foreground and background share the value {}",
                self.foreground
            )));
        }
        Ok(())
    }
}

impl RoiCodec for BinaryMaskCodec {
    fn encode(&self, roi: &Roi) -> Result<GrayImage> {
        self.check()?;

        let mut image = GrayImage::from_pixel(roi.width(), roi.height(), Luma([self.background]));
        for pixel in roi.pixels() {
            image.put_pixel(pixel.x, pixel.y, Luma([self.foreground]));
        }
        Ok(image)
    }

    fn decode(&self, image: &GrayImage, name: &str) -> Result<Roi> {
        // enumerate_pixels walks rows top to bottom, so pixels come out row-major
        let pixels = image
            .enumerate_pixels()
            .filter(|(_, _, value)| value[0] != self.background)
            .map(|(x, y, _)| RoiPixel::new(x, y));

        Roi::new(name, image.width(), image.height(), pixels)
    }

    /// Classifies cells at full precision before narrowing to 8 bits.
    ///
    /// A cell is background when it is fully transparent or when every colour
    /// channel equals `background`; anything else, however faint, is foreground.
    fn decode_image(&self, image: &DynamicImage, name: &str) -> Result<Roi> {
        if let DynamicImage::ImageLuma8(gray) = image {
            return self.decode(gray, name);
        }

        let background = u16::from(self.background) * 257;
        let rgba = image.to_rgba16();
        let mask = GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            if a == 0 || [r, g, b].iter().all(|&c| c == background) {
                Luma([self.background])
            } else {
                Luma([self.foreground])
            }
        });
        self.decode(&mask, name)
    }
}
