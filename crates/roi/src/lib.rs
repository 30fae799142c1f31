//! # ROI Store
//!
//! Named regions of interest (sparse pixel sets inside a rectangular extent),
//! persisted as one binary PNG mask per region in a flat directory and indexed
//! by name.
//!
//! ## Layers
//!
//! - [`Roi`] / [`RoiPixel`]: validated value types
//! - [`RoiCodec`] / [`BinaryMaskCodec`]: sparse pixels <-> dense mask image
//! - [`RoiStore`]: list, load, save and delete mask files in one directory
//! - [`RoiIndex`]: in-memory name lookup on top of a store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roi::{Roi, RoiIndex, RoiPixel};
//!
//! let mut index = RoiIndex::new("data/rois");
//! index.load_all()?;
//!
//! let line = Roi::new("line", 10, 10, (1..5).map(|x| RoiPixel::new(x, 6)))?;
//! index.add(line)?;
//!
//! if let Some(roi) = index.get("line") {
//!     println!("{}: {} pixels", roi.name(), roi.len());
//! }
//! # Ok::<(), roi::RoiError>(())
//! ```

pub mod codec;
pub mod error;
pub mod index;
pub mod io;
pub mod store;
pub mod traits;
pub mod types;

pub use codec::BinaryMaskCodec;
pub use error::{Result, RoiError};
pub use index::RoiIndex;
pub use store::{RoiStore, ROI_FILE_EXTENSION};
pub use traits::RoiCodec;
pub use types::{Roi, RoiDocument, RoiPixel};
