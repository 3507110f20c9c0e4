//! Reading order over positioned fragments.
//!
//! Lab reports are laid out as one or more columns of label rows. Sorting by
//! descending top edge (higher on the page first) and then by ascending left
//! edge approximates the order in which a person reads them. Both the label
//! stream and the candidate-data stream are sorted this way before association,
//! and the association engine refuses streams that are not.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::geometry::BoundingBox;
use crate::layout::PositionedFragment;
use crate::utils::safe_float_cmp;

/// Anything that occupies a box on the page.
pub trait Positioned {
    /// The item's bounding box.
    fn bbox(&self) -> &BoundingBox;
}

impl Positioned for BoundingBox {
    fn bbox(&self) -> &BoundingBox {
        self
    }
}

impl Positioned for PositionedFragment {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}

/// Compare two items in reading order: top descending, then left ascending.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use labtool::geometry::BoundingBox;
/// use labtool::ordering::reading_order;
///
/// let upper = BoundingBox::new(300.0, 690.0, 320.0, 700.0);
/// let lower = BoundingBox::new(10.0, 670.0, 90.0, 680.0);
/// assert_eq!(reading_order(&upper, &lower), Ordering::Less);
/// ```
pub fn reading_order<P: Positioned + ?Sized>(a: &P, b: &P) -> Ordering {
    let (a, b) = (a.bbox(), b.bbox());
    safe_float_cmp(b.top, a.top).then_with(|| safe_float_cmp(a.left, b.left))
}

/// Sort items in place into reading order.
///
/// The sort is stable, so items sharing a position keep their input order.
pub fn sort_reading_order<P: Positioned>(items: &mut [P]) {
    items.sort_by(|a, b| reading_order(a, b));
}

/// Index of the first item that sorts strictly before its predecessor.
pub fn first_out_of_order<P: Positioned>(items: &[P]) -> Option<usize> {
    items
        .windows(2)
        .position(|pair| reading_order(&pair[0], &pair[1]) == Ordering::Greater)
        .map(|i| i + 1)
}

/// Whether the items are already in reading order.
pub fn is_reading_ordered<P: Positioned>(items: &[P]) -> bool {
    first_out_of_order(items).is_none()
}

/// Fail with [`Error::UnorderedStream`] unless the items are in reading order.
pub fn ensure_reading_ordered<P: Positioned>(items: &[P], stream: &'static str) -> Result<()> {
    match first_out_of_order(items) {
        Some(position) => Err(Error::UnorderedStream { stream, position }),
        None => Ok(()),
    }
}
