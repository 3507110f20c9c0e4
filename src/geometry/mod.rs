//! Geometric primitives for page layout.
//!
//! Boxes use page coordinates with the origin at the bottom-left corner, so a
//! larger `top` is higher on the page.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An axis-aligned box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X coordinate of the left edge
    pub left: f32,
    /// Y coordinate of the bottom edge
    pub bottom: f32,
    /// X coordinate of the right edge
    pub right: f32,
    /// Y coordinate of the top edge
    pub top: f32,
}

impl BoundingBox {
    /// Create a new box from its four edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use labtool::geometry::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(10.0, 20.0, 110.0, 32.0);
    /// assert_eq!(bbox.width(), 100.0);
    /// assert_eq!(bbox.height(), 12.0);
    /// ```
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Create a box, rejecting inverted or non-finite edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use labtool::geometry::BoundingBox;
    ///
    /// assert!(BoundingBox::try_new(0.0, 0.0, 10.0, 10.0).is_ok());
    /// assert!(BoundingBox::try_new(10.0, 0.0, 0.0, 10.0).is_err());
    /// ```
    pub fn try_new(left: f32, bottom: f32, right: f32, top: f32) -> Result<Self> {
        let bbox = Self::new(left, bottom, right, top);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check that every edge is finite and that `left <= right`, `bottom <= top`.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.left, self.bottom, self.right, self.top]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.left > self.right || self.bottom > self.top {
            return Err(Error::InvalidBoundingBox(format!(
                "({}, {}, {}, {})",
                self.left, self.bottom, self.right, self.top
            )));
        }
        Ok(())
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Copy of this box with only the top edge moved down by `dy`.
    ///
    /// Used to give each line of a multi-line text box its own approximate
    /// position. The bottom edge is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use labtool::geometry::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(0.0, 100.0, 50.0, 140.0);
    /// let line = bbox.with_top_lowered(20.0);
    /// assert_eq!(line.top, 120.0);
    /// assert_eq!(line.bottom, 100.0);
    /// ```
    pub fn with_top_lowered(&self, dy: f32) -> Self {
        Self {
            top: self.top - dy,
            ..*self
        }
    }
}
