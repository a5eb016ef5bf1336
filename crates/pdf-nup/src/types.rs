use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to load source PDF: {0}")]
    SourceLoad(lopdf::Error),
    #[error("Source PDF has no pages")]
    EmptyDocument,
    #[error("Failed to compose pages: {0}")]
    Composition(#[from] lopdf::Error),
    #[error("Failed to write PDF: {0}")]
    Serialization(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ComposeError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Orientation {
    /// Portrait: height > width (canonical for every known size)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes known to the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PaperSize {
    Letter,
    Legal,
    A4,
    A3,
    Tabloid,
}

impl PaperSize {
    /// Every known size, in the order auto selection evaluates them
    pub const ALL: [PaperSize; 5] = [
        PaperSize::Letter,
        PaperSize::Legal,
        PaperSize::A4,
        PaperSize::A3,
        PaperSize::Tabloid,
    ];

    /// Portrait dimensions in points
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Legal => (612.0, 1008.0),
            PaperSize::A4 => (595.0, 842.0),
            PaperSize::A3 => (842.0, 1191.0),
            PaperSize::Tabloid => (792.0, 1224.0),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_pt();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// How the output paper is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PaperMode {
    /// Score every known size in both orientations and keep the best
    #[default]
    Auto,
    Letter,
    Legal,
    A4,
    A3,
    Tabloid,
}

impl PaperMode {
    /// The fixed size for this mode, `None` for auto
    pub fn fixed_size(self) -> Option<PaperSize> {
        match self {
            PaperMode::Auto => None,
            PaperMode::Letter => Some(PaperSize::Letter),
            PaperMode::Legal => Some(PaperSize::Legal),
            PaperMode::A4 => Some(PaperSize::A4),
            PaperMode::A3 => Some(PaperSize::A3),
            PaperMode::Tabloid => Some(PaperSize::Tabloid),
        }
    }
}

/// Rotation applied to every tile, counter-clockwise in PDF user space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Degrees90,
    Degrees180,
    Degrees270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Degrees90 => 90,
            Rotation::Degrees180 => 180,
            Rotation::Degrees270 => 270,
        }
    }

    /// Parse one of the supported angles
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Degrees90),
            180 => Some(Rotation::Degrees180),
            270 => Some(Rotation::Degrees270),
            _ => None,
        }
    }

    /// Exact (cos, sin) of the angle, avoiding float noise at quarter turns
    pub fn cos_sin(self) -> (f32, f32) {
        match self {
            Rotation::None => (1.0, 0.0),
            Rotation::Degrees90 => (0.0, 1.0),
            Rotation::Degrees180 => (-1.0, 0.0),
            Rotation::Degrees270 => (0.0, -1.0),
        }
    }
}

/// Statistics about a composition
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionStatistics {
    /// Total number of source pages
    pub source_pages: usize,
    /// Grid cells per output sheet
    pub tiles_per_sheet: usize,
    /// Number of output sheets
    pub output_sheets: usize,
    /// Cells left empty on the final sheet
    pub blank_cells: usize,
}
