use image::{DynamicImage, GrayImage};
use crate::{error::Result, types::Roi};

/// Trait for converting between sparse ROIs and dense raster masks
pub trait RoiCodec: Send + Sync {
    /// Render the ROI as a `width x height` mask
    fn encode(&self, roi: &Roi) -> Result<GrayImage>;

    /// Rebuild an ROI named `name` from a mask; the extent comes from the image
    fn decode(&self, image: &GrayImage, name: &str) -> Result<Roi>;

    /// Decode an image of any colour type or bit depth
    fn decode_image(&self, image: &DynamicImage, name: &str) -> Result<Roi> {
        self.decode(&image.to_luma8(), name)
    }
}
