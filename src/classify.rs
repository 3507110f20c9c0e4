//! Line classification.
//!
//! Each normalized line is one of:
//! - a standalone field, `Label: value`, parsed on the spot
//! - a regular field label, `<instrument prefix>-...`, whose data sits in
//!   separate fragments to its right and below
//! - a candidate datum, anything else

use crate::datum::Datum;
use crate::record::Field;
use crate::text::normalize_line;
use crate::vocabulary::Vocabulary;

/// Kind of a normalized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `Label: value` on one line
    Standalone,
    /// Instrument-coded field label
    RegularField,
    /// Value, unit, range or free text
    Candidate,
}

/// Decides the kind of each line against a vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> Classifier<'a> {
    /// Create a classifier over the given vocabulary.
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// True iff the content starts with a known standalone label and a colon.
    ///
    /// # Examples
    ///
    /// ```
    /// use labtool::classify::Classifier;
    /// use labtool::vocabulary::Vocabulary;
    ///
    /// let classifier = Classifier::new(Vocabulary::builtin());
    /// assert!(classifier.is_standalone("Edat: 54 anys"));
    /// assert!(!classifier.is_standalone("Edat 54 anys"));
    /// ```
    pub fn is_standalone(&self, content: &str) -> bool {
        self.vocabulary
            .standalone_labels()
            .any(|label| content.strip_prefix(label).is_some_and(|rest| rest.starts_with(':')))
    }

    /// True iff the content starts with a known instrument prefix and a dash.
    pub fn is_regular_field(&self, content: &str) -> bool {
        self.vocabulary
            .field_prefixes()
            .any(|prefix| content.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('-')))
    }

    /// Classify a normalized line. Standalone wins over regular.
    pub fn classify(&self, content: &str) -> LineKind {
        if self.is_standalone(content) {
            LineKind::Standalone
        } else if self.is_regular_field(content) {
            LineKind::RegularField
        } else {
            LineKind::Candidate
        }
    }

    /// Parse a standalone line into a field holding a single value.
    ///
    /// The line must contain exactly one colon; anything else is malformed and
    /// yields `None`. The label is mapped to its canonical name.
    pub fn parse_standalone(&self, content: &str) -> Option<Field> {
        let mut parts = content.split(':');
        let (label, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(label), Some(value), None) => (label, value),
            _ => {
                log::debug!("Dropping malformed standalone field: {:?}", content);
                return None;
            },
        };

        let label = normalize_line(label);
        let name = self.vocabulary.canonical_name(&label);

        let mut field = Field::new(name);
        field.push(Datum::value(normalize_line(value)));
        Some(field)
    }
}
