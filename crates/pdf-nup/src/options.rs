use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Composition settings, re-supplied on every composition
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Settings {
    /// Source pages per output sheet (1, 2, 4, 6 or 8)
    pub pages_per_sheet: u32,
    /// Rotation applied to every tile
    pub rotation: Rotation,
    /// Cell border stroke width in points, 0 disables borders
    pub border_width: f32,
    /// Output paper size, fixed or auto-selected
    pub paper_size: PaperMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pages_per_sheet: 1,
            rotation: Rotation::None,
            border_width: 0.0,
            paper_size: PaperMode::Auto,
        }
    }
}

impl Settings {
    /// Pages-per-sheet values with a dedicated grid shape
    pub const SUPPORTED_PAGES_PER_SHEET: [u32; 5] = [1, 2, 4, 6, 8];

    /// Load settings from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings: Settings = serde_json::from_slice(&bytes)
            .map_err(|e| ComposeError::Config(format!("Failed to parse config: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ComposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the settings.
    ///
    /// An unrecognized `pages_per_sheet` is not an error: it resolves to a
    /// single tile per sheet.
    pub fn validate(&self) -> Result<()> {
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return Err(ComposeError::Config(format!(
                "Border width must be a non-negative number of points, got {}",
                self.border_width
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    // Rotation travels as its angle in degrees
    impl Serialize for Rotation {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_i32(self.degrees())
        }
    }

    impl<'de> Deserialize<'de> for Rotation {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let degrees = i32::deserialize(deserializer)?;
            Rotation::from_degrees(degrees).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "Unsupported rotation {degrees}, expected 0, 90, 180 or 270"
                ))
            })
        }
    }
}
