use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoiError};

/// A single foreground coordinate of a region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RoiPixel {
    pub x: u32,
    pub y: u32,
}

impl RoiPixel {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for RoiPixel {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for RoiPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A named sparse set of pixel coordinates inside a `width x height` extent.
///
/// Every pixel satisfies `x < width` and `y < height`; [`Roi::new`] refuses to
/// build an ROI otherwise. Once built an ROI is never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoiDocument", into = "RoiDocument")]
pub struct Roi {
    name: String,
    width: u32,
    height: u32,
    pixels: Vec<RoiPixel>,
}

impl Roi {
    /// Build an ROI, validating its name, extent and every pixel.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        pixels: impl IntoIterator<Item = RoiPixel>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        if width == 0 || height == 0 {
            return Err(RoiError::InvalidDimensions { width, height });
        }

        let pixels: Vec<RoiPixel> = pixels.into_iter().collect();
        if let Some(pixel) = pixels.iter().find(|p| p.x >= width || p.y >= height) {
            return Err(RoiError::OutOfRange {
                name,
                x: pixel.x,
                y: pixel.y,
                width,
                height,
            });
        }

        Ok(Self {
            name,
            width,
            height,
            pixels,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Foreground pixels in insertion order
    pub fn pixels(&self) -> &[RoiPixel] {
        &self.pixels
    }

    /// Number of foreground pixels
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Total number of cells in the extent
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.pixels.iter().any(|p| p.x == x && p.y == y)
    }

    /// Same extent and pixels under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Result<Self> {
        Self::new(name, self.width, self.height, self.pixels.iter().copied())
    }
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    let reserved = name.is_empty() || name == "." || name == "..";
    if reserved || name.contains(['/', '\\']) {
        return Err(RoiError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Serialized form of an [`Roi`].
///
/// Deserializing an [`Roi`] goes through this document and then [`Roi::new`],
/// so invalid documents are rejected rather than producing an invalid ROI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoiDocument {
    #[schemars(length(min = 1))]
    pub name: String,
    #[schemars(range(min = 1))]
    pub width: u32,
    #[schemars(range(min = 1))]
    pub height: u32,
    #[serde(default)]
    pub pixels: Vec<RoiPixel>,
}

impl RoiDocument {
    /// Get the JSON schema of the document
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RoiDocument)
    }
}

impl TryFrom<RoiDocument> for Roi {
    type Error = RoiError;

    fn try_from(doc: RoiDocument) -> Result<Self> {
        Roi::new(doc.name, doc.width, doc.height, doc.pixels)
    }
}

impl From<Roi> for RoiDocument {
    fn from(roi: Roi) -> Self {
        Self {
            name: roi.name,
            width: roi.width,
            height: roi.height,
            pixels: roi.pixels,
        }
    }
}
