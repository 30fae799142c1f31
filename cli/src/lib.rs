use roi::{BinaryMaskCodec, Roi, RoiError, RoiIndex, RoiStore};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;


#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ImageError(#[from] image::ImageError),
    #[error(transparent)]
    RoiError(#[from] RoiError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
    #[error("Cannot derive an ROI name from {}", .0.display())]
    UnnamedImage(PathBuf),
}


/// Where ROI masks live and how they are painted
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RoiConfig {
    /// Directory holding one `<name>.png` mask per ROI
    pub directory: PathBuf,
    /// Mask value for ROI pixels
    #[serde(default = "default_foreground")]
    pub foreground: u8,
    /// Mask value for everything else
    #[serde(default)]
    pub background: u8,
}

fn default_foreground() -> u8 {
    255
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            foreground: default_foreground(),
            background: 0,
        }
    }
}

impl RoiConfig {
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Load RoiConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load RoiConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load RoiConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load RoiConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load the config file if given, then apply a `--dir` override
    pub fn resolve(config_path: Option<&Path>, dir: Option<PathBuf>) -> Result<Self, CliError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(dir) = dir {
            config.directory = dir;
        }
        Ok(config)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Save RoiConfig, picking the format from the file extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let content = match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Convert RoiConfig to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert RoiConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn codec(&self) -> Result<BinaryMaskCodec, CliError> {
        Ok(BinaryMaskCodec::new(self.foreground, self.background)?)
    }

    /// Build a store over the configured directory
    pub fn store(&self) -> Result<RoiStore, CliError> {
        Ok(RoiStore::with_codec(&self.directory, self.codec()?))
    }

    /// Build an index over the configured directory; nothing is loaded yet
    pub fn index(&self) -> Result<RoiIndex, CliError> {
        Ok(RoiIndex::with_store(self.store()?))
    }
}

/// Add `roi` to the configured directory, returning how many ROIs are now indexed.
///
/// A directory without any ROI file yet is accepted: the new ROI becomes its first file.
pub fn add_roi(config: &RoiConfig, roi: Roi) -> Result<usize, CliError> {
    let mut index = config.index()?;
    match index.load_all() {
        Ok(_) | Err(RoiError::NoRoiFiles { .. }) => {}
        Err(err) => return Err(err.into()),
    }
    index.add(roi)?;
    Ok(index.len())
}

/// Decode any image file as a mask and save it as an ROI.
///
/// The ROI is named `name`, or the image's file stem when `name` is `None`.
pub fn import_image(
    config: &RoiConfig,
    image_path: &Path,
    name: Option<String>,
) -> Result<(Roi, PathBuf), CliError> {
    let name = match name {
        Some(name) => name,
        None => image_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .ok_or_else(|| CliError::UnnamedImage(image_path.to_path_buf()))?,
    };

    let store = config.store()?;
    let roi = store.codec().decode_image(&image::open(image_path)?, &name)?;
    let path = store.save(&roi)?;
    Ok((roi, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi::RoiPixel;

    #[test]
    fn test_toml_defaults() {
        let config = RoiConfig::from_toml(r#"directory = "test_files/Rois""#).unwrap();
        assert_eq!(config.directory, PathBuf::from("test_files/Rois"));
        assert_eq!(config.foreground, 255);
        assert_eq!(config.background, 0);
    }

    #[test]
    fn test_json_overrides_sentinels() {
        let config =
            RoiConfig::from_json(r#"{"directory": "/data/rois", "foreground": 0, "background": 255}"#)
                .unwrap();
        assert_eq!(config.codec().unwrap(), BinaryMaskCodec::new(0, 255).unwrap());
    }

    #[test]
    fn test_file_round_trip_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let config = RoiConfig {
            directory: dir.path().join("rois"),
            foreground: 200,
            background: 10,
        };

        for file in ["roi.toml", "roi.json"] {
            let path = dir.path().join(file);
            config.to_file(&path).unwrap();
            assert_eq!(RoiConfig::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            RoiConfig::from_file("settings.yaml"),
            Err(CliError::UnsupportedFileFormat)
        ));
        assert!(matches!(
            RoiConfig::default().to_file("settings.ini"),
            Err(CliError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_equal_sentinels_fail_when_building_store() {
        let config = RoiConfig {
            foreground: 3,
            background: 3,
            ..RoiConfig::default()
        };
        assert!(matches!(config.store(), Err(CliError::RoiError(roi::RoiError::Codec(_)))));
    }

    #[test]
    fn test_index_uses_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let index = RoiConfig::with_directory(dir.path()).index().unwrap();
        assert_eq!(index.directory(), dir.path());
        assert!(index.is_empty());
    }

    #[test]
    fn test_resolve_dir_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roi.toml");
        std::fs::write(&path, "directory = \"from_file\"\nforeground = 42\n").unwrap();

        let from_file = RoiConfig::resolve(Some(&path), None).unwrap();
        assert_eq!(from_file.directory, PathBuf::from("from_file"));

        let overridden = RoiConfig::resolve(Some(&path), Some(PathBuf::from("elsewhere"))).unwrap();
        assert_eq!(overridden.directory, PathBuf::from("elsewhere"));
        assert_eq!(overridden.foreground, 42);
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        assert_eq!(RoiConfig::resolve(None, None).unwrap(), RoiConfig::default());
        assert_eq!(
            RoiConfig::resolve(None, Some(PathBuf::from("rois"))).unwrap(),
            RoiConfig::with_directory("rois")
        );
    }

    #[test]
    fn test_add_roi_into_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = RoiConfig::with_directory(dir.path());
        let line = Roi::new("addtestfile", 10, 10, (1..=4).map(|x| RoiPixel::new(x, 6))).unwrap();

        assert_eq!(add_roi(&config, line.clone()).unwrap(), 1);
        assert_eq!(config.store().unwrap().load_one("addtestfile").unwrap(), Some(line));
    }

    #[test]
    fn test_add_roi_refuses_existing_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = RoiConfig::with_directory(dir.path());
        let roi = Roi::new("image1", 6, 6, [RoiPixel::new(1, 1)]).unwrap();

        add_roi(&config, roi.clone()).unwrap();
        assert!(matches!(
            add_roi(&config, roi),
            Err(CliError::RoiError(RoiError::DuplicateName(_)))
        ));
    }

    #[test]
    fn test_add_roi_propagates_other_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = RoiConfig::with_directory(dir.path().join("missing"));
        let roi = Roi::new("image1", 6, 6, Vec::new()).unwrap();

        assert!(matches!(add_roi(&config, roi), Err(CliError::RoiError(RoiError::Io(_)))));
    }

    #[test]
    fn test_import_image_names_roi_after_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("painted.png");
        let mut rgb = image::RgbImage::new(3, 2);
        rgb.put_pixel(2, 1, image::Rgb([0, 0, 1]));
        rgb.save(&source).unwrap();

        let rois = dir.path().join("rois");
        std::fs::create_dir(&rois).unwrap();
        let config = RoiConfig::with_directory(&rois);

        let (roi, path) = import_image(&config, &source, None).unwrap();
        assert_eq!(roi.name(), "painted");
        assert_eq!(roi.pixels(), &[RoiPixel::new(2, 1)]);
        assert_eq!(path, rois.join("painted.png"));

        let (renamed, _) = import_image(&config, &source, Some("custom".to_string())).unwrap();
        assert_eq!(renamed.name(), "custom");
        assert_eq!(config.store().unwrap().list_names().unwrap(), vec!["custom", "painted"]);
    }

    #[test]
    fn test_import_image_rejects_unsafe_names() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("mask.png");
        image::GrayImage::new(2, 2).save(&source).unwrap();

        let config = RoiConfig::with_directory(dir.path());
        assert!(matches!(
            import_image(&config, &source, Some("../escape".to_string())),
            Err(CliError::RoiError(RoiError::InvalidName(_)))
        ));
    }
}
