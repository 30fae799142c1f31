use std::path::Path;

use crate::{error::Result, types::Roi};

impl Roi {
    /// Serialize to a pretty-printed JSON document
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the JSON document to file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Parse and validate an ROI from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load an ROI from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::RoiError, fixtures, types::Roi};

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("add.json");
        let roi = fixtures::add_roi();

        roi.save_json(&path).unwrap();
        assert_eq!(Roi::from_json_file(&path).unwrap(), roi);
    }

    #[test]
    fn test_out_of_range_document_is_serialization_error() {
        let json = r#"{"name":"bad","width":2,"height":2,"pixels":[{"x":0,"y":2}]}"#;
        let err = Roi::from_json_str(json).unwrap_err();

        assert!(matches!(err, RoiError::Serialization(_)));
        assert!(err.to_string().contains("outside"), "{}", err);
    }

    #[test]
    fn test_pixels_default_to_empty() {
        let roi = Roi::from_json_str(r#"{"name":"blank","width":3,"height":1}"#).unwrap();
        assert!(roi.is_empty());
    }
}
