//! Lab report extraction pipeline.
//!
//! ```text
//! LayoutSource
//!     ↓
//! Page[] (text boxes)
//!     ↓
//! [split + normalize] (one fragment per line)
//!     ↓
//! [Classifier] → standalone fields (into the record right away)
//!              → field labels
//!              → candidate data
//!     ↓
//! [ordering] (labels and data sorted top-down, left-right)
//!     ↓
//! [AssociationEngine] (data claimed per label)
//!     ↓
//! Record (first field per canonical name wins)
//! ```
//!
//! Pages are processed strictly in order and each page's candidate stream is
//! private to that page.

use crate::association::{AssociationEngine, PageAssociation};
use crate::classify::{Classifier, LineKind};
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::layout::{LayoutSource, Page, PositionedFragment};
use crate::ordering::sort_reading_order;
use crate::record::Record;
use crate::text::normalize_line;
use crate::vocabulary::Vocabulary;

/// Labels and candidate data of one page, in reading order.
#[derive(Debug, Clone, Default)]
pub struct ScannedPage {
    /// Regular field labels
    pub labels: Vec<PositionedFragment>,
    /// Everything that is neither a label nor a standalone field
    pub data: Vec<PositionedFragment>,
}

/// The lab report parser - orchestrates the full flow.
#[derive(Debug, Clone)]
pub struct LabReportParser {
    config: ExtractionConfig,
    vocabulary: Vocabulary,
}

impl LabReportParser {
    /// Create a parser with default geometry and the built-in vocabulary.
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default(), Vocabulary::builtin().clone())
    }

    /// Create a parser with custom geometry and vocabulary.
    pub fn with_config(config: ExtractionConfig, vocabulary: Vocabulary) -> Self {
        Self { config, vocabulary }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Get the vocabulary in use.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Pull every page from a layout source and parse the document.
    pub fn parse_source(&self, source: &dyn LayoutSource) -> Result<Record> {
        let pages = source.pages()?;
        self.parse_pages(&pages)
    }

    /// Parse a document given as pages of text boxes.
    pub fn parse_pages(&self, pages: &[Page]) -> Result<Record> {
        let mut record = Record::new();
        for (page_number, page) in pages.iter().enumerate() {
            log::debug!("Processing page {}", page_number);
            self.process_page(page, &mut record)?;
        }
        log::debug!("Parsed {} fields from {} pages", record.len(), pages.len());
        Ok(record)
    }

    /// Parse one page into `record` and return the page's association details.
    pub fn process_page(&self, page: &Page, record: &mut Record) -> Result<PageAssociation> {
        let scanned = self.scan_page(page, record);
        log::debug!(
            "Page has {} labels and {} candidate fragments",
            scanned.labels.len(),
            scanned.data.len()
        );

        if scanned.labels.is_empty() && !scanned.data.is_empty() {
            log::warn!(
                "Page has {} candidate fragments but no field labels; its data is ignored",
                scanned.data.len()
            );
        }

        let engine = AssociationEngine::new(&self.vocabulary, &self.config);
        let association = engine.associate_page(&scanned.labels, scanned.data)?;

        for result in &association.fields {
            // Still associated above so the stream advances, but only the
            // first field per name is kept
            record.insert_if_absent(result.field.clone());
        }

        Ok(association)
    }

    /// Split a page into line fragments and classify them.
    ///
    /// Standalone fields go straight into `record`. Labels and candidate data
    /// are returned sorted in reading order.
    pub fn scan_page(&self, page: &Page, record: &mut Record) -> ScannedPage {
        let classifier = Classifier::new(&self.vocabulary);
        let mut scanned = ScannedPage::default();

        for text_box in &page.boxes {
            for (_, raw, bbox) in text_box.lines(self.config.line_height) {
                let content = normalize_line(raw);
                if content.is_empty() {
                    continue;
                }

                match classifier.classify(&content) {
                    LineKind::Standalone => {
                        if let Some(field) = classifier.parse_standalone(&content) {
                            record.insert_if_absent(field);
                        }
                    },
                    LineKind::RegularField => {
                        scanned.labels.push(PositionedFragment::new(content, bbox));
                    },
                    LineKind::Candidate => {
                        scanned.data.push(PositionedFragment::new(content, bbox));
                    },
                }
            }
        }

        sort_reading_order(&mut scanned.labels);
        sort_reading_order(&mut scanned.data);
        scanned
    }
}

impl Default for LabReportParser {
    fn default() -> Self {
        Self::new()
    }
}
