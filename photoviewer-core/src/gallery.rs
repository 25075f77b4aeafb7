//! Gallery data: the ordered image list the viewer navigates, plus the
//! thumbnail helpers the grid needs.

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use crate::config::ViewerConfig;

/// Edge length (in vw) a thumbnail box's width + height are normalised to, halved.
pub const THUMB_FRAME_VW: f64 = 18.0;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("malformed gallery data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image {index} has an empty filename")]
    EmptyPath { index: usize },
    #[error("image {index} ({path}) has invalid dimensions {width}x{height}")]
    InvalidDimensions {
        index: usize,
        path: String,
        width: u32,
        height: u32,
    },
}

/// One full-size image. Its position in the gallery is its identity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ImageDescriptor {
    #[serde(rename = "filename")]
    pub source_path: String,
    #[serde(deserialize_with = "dimension")]
    pub width: u32,
    #[serde(deserialize_with = "dimension")]
    pub height: u32,
}

impl ImageDescriptor {
    pub fn new(source_path: impl Into<String>, width: u32, height: u32) -> Self {
        Self { source_path: source_path.into(), width, height }
    }

    pub fn thumbnail_path(&self) -> String {
        thumbnail_path(&self.source_path)
    }

    /// Thumbnail box size in vw units, keeping the aspect ratio.
    pub fn thumb_box_vw(&self) -> (f64, f64) {
        thumb_box_vw(self.width, self.height)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Gallery {
    pub name: Option<String>,
    images: Vec<ImageDescriptor>,
}

/// Wire shape of the embedded gallery document.
#[derive(Deserialize)]
struct GalleryDocument {
    #[serde(default)]
    name: Option<String>,
    images: Vec<ImageDescriptor>,
    #[serde(default)]
    viewer: ViewerConfig,
}

impl Gallery {
    pub fn new(name: Option<String>, images: Vec<ImageDescriptor>) -> Result<Self, GalleryError> {
        for (index, img) in images.iter().enumerate() {
            if img.source_path.trim().is_empty() {
                return Err(GalleryError::EmptyPath { index });
            }
            if img.width == 0 || img.height == 0 {
                return Err(GalleryError::InvalidDimensions {
                    index,
                    path: img.source_path.clone(),
                    width: img.width,
                    height: img.height,
                });
            }
        }
        let name = name.filter(|n| !n.trim().is_empty());
        Ok(Self { name, images })
    }

    /// Parse the gallery document together with its optional viewer settings.
    pub fn from_json(json: &str) -> Result<(Self, ViewerConfig), GalleryError> {
        let doc: GalleryDocument = serde_json::from_str(json)?;
        let gallery = Self::new(doc.name, doc.images)?;
        log::info!(
            "Loaded gallery {:?} with {} images",
            gallery.name.as_deref().unwrap_or("(untitled)"),
            gallery.len()
        );
        Ok((gallery, doc.viewer))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageDescriptor> {
        self.images.get(index)
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }
}

/// `images/<rest>` -> `thumbnails/thumb_<rest>`, matching the first
/// `images/` case-insensitively. Paths without it are returned unchanged.
pub fn thumbnail_path(source_path: &str) -> String {
    const NEEDLE: &str = "images/";
    let lower = source_path.to_ascii_lowercase();
    match lower.find(NEEDLE) {
        Some(pos) => {
            let rest = &source_path[pos + NEEDLE.len()..];
            format!("{}thumbnails/thumb_{}", &source_path[..pos], rest)
        }
        None => source_path.to_string(),
    }
}

/// Width and height (vw) of a thumbnail box: `w + h` always sums to `2 * THUMB_FRAME_VW`.
pub fn thumb_box_vw(width: u32, height: u32) -> (f64, f64) {
    let (w, h) = (width as f64, height as f64);
    let sum = w + h;
    if sum <= 0.0 {
        return (THUMB_FRAME_VW, THUMB_FRAME_VW);
    }
    let factor = sum / (THUMB_FRAME_VW * 2.0);
    (w / factor, h / factor)
}

/// Accepts `4000` as well as `"4000"`; the page generator emits either.
fn dimension<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n,
        Raw::Float(f) if f >= 0.0 => f.trunc() as u64,
        Raw::Float(f) => return Err(serde::de::Error::custom(format!("negative dimension {f}"))),
        Raw::Text(s) => {
            // parseInt semantics: leading digits only ("1200px" -> 1200)
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits
                .parse::<u64>()
                .map_err(|_| serde::de::Error::custom(format!("non-numeric dimension {s:?}")))?
        }
    };
    u32::try_from(value).map_err(|_| serde::de::Error::custom(format!("dimension {value} too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_path_substitution() {
        assert_eq!(thumbnail_path("images/img_001.jpg"), "thumbnails/thumb_img_001.jpg");
        assert_eq!(thumbnail_path("gallery/Images/a/b.jpg"), "gallery/thumbnails/thumb_a/b.jpg");
    }

    #[test]
    fn test_thumbnail_path_without_images_dir() {
        assert_eq!(thumbnail_path("photos/x.jpg"), "photos/x.jpg");
    }

    #[test]
    fn test_thumb_box_keeps_aspect() {
        let (w, h) = thumb_box_vw(3000, 2000);
        assert!((w + h - 36.0).abs() < 1e-9);
        assert!((w / h - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_from_json_accepts_string_dimensions() {
        let json = r#"{
            "name": "Holiday",
            "images": [
                {"filename": "images/a.jpg", "width": "4000", "height": 3000},
                {"filename": "images/b.jpg", "width": 1200, "height": "1600"}
            ]
        }"#;
        let (gallery, config) = Gallery::from_json(json).unwrap();
        assert_eq!(gallery.name.as_deref(), Some("Holiday"));
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.get(0).unwrap().width, 4000);
        assert_eq!(gallery.get(1).unwrap().height, 1600);
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_from_json_reads_viewer_config() {
        let json = r#"{"images": [], "viewer": {"transition_ms": 500}}"#;
        let (gallery, config) = Gallery::from_json(json).unwrap();
        assert!(gallery.is_empty());
        assert!(gallery.name.is_none());
        assert_eq!(config.transition_ms, 500);
        assert_eq!(config.zoom_transition_ms, 200);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let json = r#"{"images": [{"filename": "images/a.jpg", "width": 0, "height": 10}]}"#;
        let err = Gallery::from_json(json).unwrap_err();
        assert!(matches!(err, GalleryError::InvalidDimensions { index: 0, .. }));
    }

    #[test]
    fn test_non_numeric_dimension_rejected() {
        let json = r#"{"images": [{"filename": "images/a.jpg", "width": "wide", "height": 10}]}"#;
        assert!(matches!(Gallery::from_json(json), Err(GalleryError::Json(_))));
    }

    #[test]
    fn test_empty_path_rejected() {
        let images = vec![ImageDescriptor::new("  ", 10, 10)];
        assert!(matches!(Gallery::new(None, images), Err(GalleryError::EmptyPath { index: 0 })));
    }
}
