//! Image formats accepted for soil analysis uploads.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raster formats the classifier accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Error returned when an extension is not a known image format.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported image extension: {0:?}")]
pub struct ImageFormatError(pub String);

impl ImageFormat {
    /// MIME type used when serving the stored image back.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Lower-cased extension (with the dot) of a file name, if any.
    ///
    /// ```
    /// use soilscan_domain::media::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::extension_of("field.JPG").as_deref(), Some(".jpg"));
    /// assert_eq!(ImageFormat::extension_of("no_extension"), None);
    /// ```
    pub fn extension_of(file_name: &str) -> Option<String> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        })
    }
}

impl FromStr for ImageFormat {
    type Err = ImageFormatError;

    /// Parse a dotted or bare extension, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ext = s.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(ImageFormatError(s.to_owned())),
        }
    }
}
