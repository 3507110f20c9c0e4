//! Configuration for lab report extraction.

/// Default height, in page units, assumed for each line of a multi-line text box.
pub const DEFAULT_LINE_HEIGHT: f32 = 10.0;

/// Default gap kept between a label's region and the next label below it.
pub const DEFAULT_VERTICAL_PADDING: f32 = 10.0;

/// Default slack applied to both vertical edges of a label's region.
pub const DEFAULT_VERTICAL_TOLERANCE: f32 = 5.0;

/// Geometry parameters used by the extraction pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Vertical distance between consecutive lines of one text box.
    pub line_height: f32,

    /// Added to the next label's top to form the lower edge of a region.
    pub vertical_padding: f32,

    /// Jitter absorbed at the top and bottom edges of a region.
    pub vertical_tolerance: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            line_height: DEFAULT_LINE_HEIGHT,
            vertical_padding: DEFAULT_VERTICAL_PADDING,
            vertical_tolerance: DEFAULT_VERTICAL_TOLERANCE,
        }
    }

    /// Set the per-line height used to split multi-line boxes.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    /// Set the padding between a region and the next label.
    pub fn with_vertical_padding(mut self, padding: f32) -> Self {
        self.vertical_padding = padding;
        self
    }

    /// Set the tolerance at region edges.
    pub fn with_vertical_tolerance(mut self, tolerance: f32) -> Self {
        self.vertical_tolerance = tolerance;
        self
    }
}
