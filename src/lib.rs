// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # labtool
//!
//! Turns laboratory reports, given as positioned text on a page, into named
//! fields with typed values, units and reference ranges.
//!
//! ## Core Features
//!
//! - **Normalization**: stable spacing, quoting and ASCII folding of every line
//! - **Classification**: standalone `Label: value` lines, instrument-coded field
//!   labels and candidate data
//! - **Reading Order**: top-to-bottom, left-to-right ordering of fragments
//! - **Datum Parsing**: values, pending placeholders, units, one- and two-sided
//!   reference intervals, with text as the fallback
//! - **Association**: geometric regions per label, greedy consumption of the
//!   candidate stream, dual-field and trailing-trim rules
//! - **Record Building**: canonical name mapping and first-wins deduplication
//!
//! ## Quick Start
//!
//! ```
//! use labtool::geometry::BoundingBox;
//! use labtool::layout::{Page, TextBox};
//! use labtool::LabReportParser;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = Page::new(vec![
//!     TextBox::new("Pacient: JOAN GARCIA", BoundingBox::new(10.0, 790.0, 200.0, 800.0)),
//!     TextBox::new("Srm-Io sodi;c.subst.", BoundingBox::new(10.0, 690.0, 200.0, 700.0)),
//!     TextBox::new("140", BoundingBox::new(300.0, 690.0, 320.0, 700.0)),
//!     TextBox::new("mmol/L", BoundingBox::new(350.0, 690.0, 390.0, 700.0)),
//!     TextBox::new("[ 135 - 145 ]", BoundingBox::new(420.0, 690.0, 480.0, 700.0)),
//! ]);
//!
//! let parser = LabReportParser::new();
//! let record = parser.parse_pages(&[page])?;
//!
//! let sodi = record.get("Serum/Sodi").unwrap();
//! sodi.encode(|key, value| println!("{key} = {value:?}"));
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;
pub mod vocabulary;

// Layout input
pub mod geometry;
pub mod layout;
pub mod ordering;

// Text cleanup and classification
pub mod classify;
pub mod text;

// Data parsing and association
pub mod association;
pub mod datum;
pub mod record;

// Pipeline orchestration
pub mod pipeline;

// Re-exports
pub use association::{AssociationEngine, PageAssociation};
pub use config::ExtractionConfig;
pub use datum::{Comparator, Datum, EncodedValue};
pub use error::{Error, Result};
pub use layout::{JsonLayout, LayoutSource, Page, PositionedFragment, TextBox};
pub use pipeline::LabReportParser;
pub use record::{Field, Record};
pub use vocabulary::Vocabulary;

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than all other values.
    /// This ensures that sorting operations never panic due to NaN comparisons.
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater, // NaN > all numbers
            (false, true) => Ordering::Less,    // all numbers < NaN
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_safe_float_cmp_normal() {
            assert_eq!(safe_float_cmp(1.0, 2.0), Ordering::Less);
            assert_eq!(safe_float_cmp(2.0, 1.0), Ordering::Greater);
            assert_eq!(safe_float_cmp(1.5, 1.5), Ordering::Equal);
        }

        #[test]
        fn test_safe_float_cmp_nan() {
            assert_eq!(safe_float_cmp(f32::NAN, f32::NAN), Ordering::Equal);
            assert_eq!(safe_float_cmp(f32::NAN, 0.0), Ordering::Greater);
            assert_eq!(safe_float_cmp(0.0, f32::NAN), Ordering::Less);
        }
    }
}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
