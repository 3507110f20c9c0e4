//! Positioned text input for the parser.
//!
//! Layout extraction itself (turning a PDF into text boxes) happens outside this
//! crate. It reaches the parser through the [`LayoutSource`] trait as pages of
//! [`TextBox`]es. Each box may span several lines; [`TextBox::lines`] splits it
//! into one entry per line with an approximate per-line position.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::BoundingBox;

/// One line of normalized text with its position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedFragment {
    /// Normalized text content
    pub text: String,
    /// Position of the line on the page
    pub bbox: BoundingBox,
}

impl PositionedFragment {
    /// Create a fragment from already normalized text.
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// A horizontal text box as produced by layout extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Raw text, possibly spanning several lines
    pub text: String,
    /// Bounding box of the whole text box
    pub bbox: BoundingBox,
}

impl TextBox {
    /// Create a new text box.
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }

    /// Split into `(line_index, raw_line, line_bbox)` triples.
    ///
    /// The top edge of line `i` is lowered by `i * line_height`. Empty lines
    /// are still yielded so that the index keeps counting through them.
    ///
    /// # Examples
    ///
    /// ```
    /// use labtool::geometry::BoundingBox;
    /// use labtool::layout::TextBox;
    ///
    /// let tb = TextBox::new("5.5\nmmol/L", BoundingBox::new(300.0, 680.0, 340.0, 700.0));
    /// let lines: Vec<_> = tb.lines(10.0).collect();
    /// assert_eq!(lines[1].1, "mmol/L");
    /// assert_eq!(lines[1].2.top, 690.0);
    /// ```
    pub fn lines(&self, line_height: f32) -> impl Iterator<Item = (usize, &str, BoundingBox)> + '_ {
        self.text.split('\n').enumerate().map(move |(index, line)| {
            let bbox = self.bbox.with_top_lowered(index as f32 * line_height);
            (index, line, bbox)
        })
    }
}

/// All text boxes found on one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Text boxes in extraction order
    pub boxes: Vec<TextBox>,
}

impl Page {
    /// Create a page from its text boxes.
    pub fn new(boxes: Vec<TextBox>) -> Self {
        Self { boxes }
    }
}

/// Supplier of positioned text pages for one document.
///
/// Failures of the underlying extraction surface synchronously as errors.
pub trait LayoutSource {
    /// Return every page of the document in page order.
    fn pages(&self) -> Result<Vec<Page>>;
}

impl LayoutSource for Vec<Page> {
    fn pages(&self) -> Result<Vec<Page>> {
        Ok(self.clone())
    }
}

/// Layout source backed by a JSON document: an array of pages, each an object
/// with a `boxes` array of `{ "text", "bbox": { "left", "bottom", "right", "top" } }`.
#[derive(Debug, Clone)]
pub struct JsonLayout {
    pages: Vec<Page>,
}

impl JsonLayout {
    /// Parse layout JSON from a string.
    pub fn from_str(json: &str) -> Result<Self> {
        let pages: Vec<Page> = serde_json::from_str(json)?;
        Self::validated(pages)
    }

    /// Parse layout JSON from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let pages: Vec<Page> = serde_json::from_reader(reader)?;
        Self::validated(pages)
    }

    /// Open and parse a layout JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    fn validated(pages: Vec<Page>) -> Result<Self> {
        for page in &pages {
            for text_box in &page.boxes {
                text_box.bbox.validate()?;
            }
        }
        log::debug!("Loaded layout with {} pages", pages.len());
        Ok(Self { pages })
    }
}

impl LayoutSource for JsonLayout {
    fn pages(&self) -> Result<Vec<Page>> {
        Ok(self.pages.clone())
    }
}
