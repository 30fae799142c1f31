//! Directory-scoped persistence of ROIs as one PNG mask per region.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use image::{ImageFormat, ImageReader};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::{
    codec::BinaryMaskCodec,
    error::{Result, RoiError},
    traits::RoiCodec,
    types::{validate_name, Roi},
};

/// Extension of every ROI file; the file stem is the ROI name.
///
/// Matched case-sensitively: files are always written as `<name>.png` and
/// looked up the same way, so a `NAME.PNG` file could be listed but never loaded.
pub const ROI_FILE_EXTENSION: &str = "png";

/// Reads and writes ROI mask files inside a single flat directory.
pub struct RoiStore {
    directory: PathBuf,
    codec: Box<dyn RoiCodec>,
}

impl RoiStore {
    /// Create a store over `directory` using the default white-on-black mask codec
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_codec(directory, BinaryMaskCodec::default())
    }

    /// Create a store with a custom codec
    pub fn with_codec<C>(directory: impl Into<PathBuf>, codec: C) -> Self
    where
        C: RoiCodec + 'static,
    {
        Self {
            directory: directory.into(),
            codec: Box::new(codec),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub(crate) fn set_directory(&mut self, directory: PathBuf) {
        self.directory = directory;
    }

    pub fn codec(&self) -> &dyn RoiCodec {
        self.codec.as_ref()
    }

    /// Location of the file backing the ROI called `name`.
    ///
    /// Names that could leave the directory (`..`, separators) are rejected
    /// with [`RoiError::InvalidName`].
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.directory.join(format!("{name}.{ROI_FILE_EXTENSION}")))
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    /// Names of all ROI files in the directory, sorted ascending.
    ///
    /// An existing directory without any ROI file is reported as
    /// [`RoiError::NoRoiFiles`] rather than an empty list.
    #[instrument(skip_all, fields(dir = %self.directory.display()))]
    pub fn list_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ROI_FILE_EXTENSION) {
                continue;
            }

            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) if validate_name(stem).is_ok() => names.push(stem.to_string()),
                _ => warn!(path = %path.display(), "Skipping ROI file with unusable name"),
            }
        }

        if names.is_empty() {
            return Err(RoiError::NoRoiFiles {
                directory: self.directory.clone(),
            });
        }

        names.sort();
        debug!(count = names.len(), "Listed ROI files");
        Ok(names)
    }

    /// Load the ROI called `name`, or `None` when it has no file.
    #[instrument(skip(self), fields(dir = %self.directory.display()))]
    pub fn load_one(&self, name: &str) -> Result<Option<Roi>> {
        let path = self.path_for(name)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "ROI file not found");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        // decode() consumes the reader, closing the file before the codec runs
        let image = ImageReader::with_format(BufReader::new(file), ImageFormat::Png).decode()?;

        let roi = self.codec.decode_image(&image, name)?;
        debug!(
            width = roi.width(),
            height = roi.height(),
            pixels = roi.len(),
            "Loaded ROI"
        );
        Ok(Some(roi))
    }

    /// Load every ROI in the directory, in name order.
    #[instrument(skip_all, fields(dir = %self.directory.display()))]
    pub fn load_all(&self) -> Result<Vec<Roi>> {
        let names = self.list_names()?;
        let mut rois = Vec::with_capacity(names.len());

        for name in &names {
            match self.load_one(name)? {
                Some(roi) => rois.push(roi),
                None => warn!(name = %name, "ROI file disappeared while loading directory"),
            }
        }

        info!(count = rois.len(), "Loaded ROI directory");
        Ok(rois)
    }

    /// Write `roi` to `<directory>/<name>.png`, replacing any existing file.
    ///
    /// The mask is written to a temporary file in the same directory and renamed
    /// into place, so readers see either the old file or the complete new one.
    #[instrument(skip_all, fields(dir = %self.directory.display(), name = %roi.name()))]
    pub fn save(&self, roi: &Roi) -> Result<PathBuf> {
        let image = self.codec.encode(roi)?;
        let target = self.path_for(roi.name())?;

        let mut temp = NamedTempFile::new_in(&self.directory)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            image.write_to(&mut writer, ImageFormat::Png)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|err| RoiError::Io(err.error))?;

        debug!(path = %target.display(), pixels = roi.len(), "Saved ROI");
        Ok(target)
    }

    /// Delete the file of the ROI called `name`.
    ///
    /// Returns `false` when there was no such file.
    #[instrument(skip(self), fields(dir = %self.directory.display()))]
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted ROI file");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "ROI file already absent");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}
