//! Field/value association.
//!
//! Given the sorted field labels of a page and the sorted stream of candidate
//! data fragments, decide which fragments belong to which label.
//!
//! # Algorithm
//!
//! For each label, in reading order:
//!
//! 1. **Region**: the label's left edge and top edge bound the region on the
//!    left and above. Below, it stops `vertical_padding` above the next label's
//!    top; the last label's region runs to the bottom of the page.
//! 2. **Filter**: unconsumed fragments at or right of the label's left edge
//!    whose top lies inside the region (with `vertical_tolerance` slack on both
//!    edges) are the candidates, in stream order.
//! 3. **Lead pass**: candidates are parsed greedily up to and including the
//!    first `Value`. This is the field's reading.
//! 4. **Trailing pass**: a second greedy pass with the same stopping rule
//!    carries the reading's unit and reference range and is attached.
//! 5. **Trim**: when the trailing pass stopped on a `Value` and candidates
//!    remain after it, that closing item is released instead of attached. It
//!    stays in the stream and is seen again by the next label.
//! 6. **Dual fields** print a sibling measurement on the same rows, so steps
//!    3 to 5 are replaced by a split on readings. The units printed right
//!    before the first `Value` give the row layout (unit-first or
//!    value-first). The field keeps everything up to the start of the second
//!    reading; the second reading, through the start of a third, is
//!    *skipped*: consumed but attached to no field.
//! 7. **Commit**: attached and skipped fragments are marked consumed.
//!
//! Consumption is tracked on a [`DataStream`]: the sorted fragments never move,
//! a bitmap records which ones have been claimed. Every fragment is therefore
//! claimed at most once, and consumed plus leftover always covers the stream.

use crate::config::ExtractionConfig;
use crate::datum::{parse_datum_with, Datum};
use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::layout::PositionedFragment;
use crate::ordering::ensure_reading_ordered;
use crate::record::Field;
use crate::vocabulary::Vocabulary;

/// Sorted candidate fragments of one page plus their consumption state.
#[derive(Debug, Clone)]
pub struct DataStream {
    fragments: Vec<PositionedFragment>,
    consumed: Vec<bool>,
}

impl DataStream {
    /// Wrap fragments that are already in reading order.
    pub fn new(fragments: Vec<PositionedFragment>) -> Result<Self> {
        ensure_reading_ordered(&fragments, "data")?;
        let consumed = vec![false; fragments.len()];
        Ok(Self {
            fragments,
            consumed,
        })
    }

    /// Total number of fragments, consumed or not.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the stream has no fragments at all.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// All fragments in stream order.
    pub fn fragments(&self) -> &[PositionedFragment] {
        &self.fragments
    }

    /// Whether the fragment at `index` has been claimed.
    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed[index]
    }

    /// Unclaimed fragments with their stream index.
    pub fn remaining(&self) -> impl Iterator<Item = (usize, &PositionedFragment)> {
        self.fragments
            .iter()
            .enumerate()
            .filter(move |(i, _)| !self.consumed[*i])
    }

    /// Indices of fragments nobody claimed.
    pub fn leftover_indices(&self) -> Vec<usize> {
        self.remaining().map(|(i, _)| i).collect()
    }

    /// Number of claimed fragments.
    pub fn consumed_count(&self) -> usize {
        self.consumed.iter().filter(|c| **c).count()
    }

    fn consume(&mut self, indices: impl IntoIterator<Item = usize>) {
        for index in indices {
            debug_assert!(!self.consumed[index], "fragment {} consumed twice", index);
            self.consumed[index] = true;
        }
    }
}

/// Page area attributed to one field label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Box of the label that owns the region
    pub label: BoundingBox,
    /// Lower edge; `None` extends to the bottom of the page
    pub bottom: Option<f32>,
    /// Slack applied at the top and bottom edges
    pub tolerance: f32,
}

impl Region {
    /// Region for `label`, bounded by the next label in reading order if any.
    pub fn for_label(
        label: &BoundingBox,
        next_label: Option<&BoundingBox>,
        config: &ExtractionConfig,
    ) -> Self {
        Self {
            label: *label,
            bottom: next_label.map(|next| next.top + config.vertical_padding),
            tolerance: config.vertical_tolerance,
        }
    }

    /// Whether a fragment box falls inside the region.
    pub fn contains(&self, bbox: &BoundingBox) -> bool {
        if *bbox == self.label {
            return false;
        }
        if bbox.left < self.label.left {
            return false;
        }
        if bbox.top - self.label.top > self.tolerance {
            return false;
        }
        match self.bottom {
            Some(bottom) => bottom - bbox.top <= self.tolerance,
            None => true,
        }
    }
}

/// How one label's candidates were split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claim {
    /// Attached to the field, in stream order
    pub related: Vec<(usize, Datum)>,
    /// Consumed for the sibling measurement of a dual field
    pub skipped: Vec<(usize, Datum)>,
    /// First item left in the stream for the next label, if any
    pub released: Option<usize>,
}

impl Claim {
    /// Stream indices this claim consumes.
    pub fn consumed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.related
            .iter()
            .chain(self.skipped.iter())
            .map(|(index, _)| *index)
    }
}

/// Length of the greedy run that ends with the first `Value`, inclusive.
fn reading_len(items: &[(usize, Datum)]) -> usize {
    items
        .iter()
        .position(|(_, datum)| datum.is_value())
        .map_or(items.len(), |i| i + 1)
}

/// Number of `Unit` items printed right before the `Value` at `value_at`.
fn units_before(items: &[(usize, Datum)], value_at: usize) -> usize {
    items[..value_at]
        .iter()
        .rev()
        .take_while(|(_, datum)| datum.is_unit())
        .count()
}

/// First item of the reading whose `Value` sits at `value_at`: up to `units`
/// units printed before it, never reaching back to `floor`.
fn reading_start(items: &[(usize, Datum)], value_at: usize, units: usize, floor: usize) -> usize {
    let mut start = value_at;
    while start > floor && value_at - start < units && items[start - 1].1.is_unit() {
        start -= 1;
    }
    start
}

/// Split a label's parsed candidates into attached, skipped and released items.
///
/// `candidates` must be in stream order.
pub fn claim_candidates(mut candidates: Vec<(usize, Datum)>, dual: bool) -> Claim {
    if dual {
        return claim_dual(candidates);
    }

    let total = candidates.len();
    let lead = reading_len(&candidates);
    let trailing = reading_len(&candidates[lead..]);

    candidates.truncate(lead + trailing);
    let mut released = None;
    if candidates.len() < total {
        released = candidates.pop().map(|(index, _)| index);
    }

    Claim {
        related: candidates,
        skipped: Vec::new(),
        released,
    }
}

fn claim_dual(mut candidates: Vec<(usize, Datum)>) -> Claim {
    let values: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, (_, datum))| datum.is_value())
        .map(|(position, _)| position)
        .collect();

    // Without a sibling reading the field keeps everything
    let (first, second) = match (values.first(), values.get(1)) {
        (Some(&first), Some(&second)) => (first, second),
        _ => {
            return Claim {
                related: candidates,
                ..Claim::default()
            }
        },
    };

    let units = units_before(&candidates, first);
    let sibling_start = reading_start(&candidates, second, units, first + 1);
    let sibling_end = values.get(2).map_or(candidates.len(), |&third| {
        reading_start(&candidates, third, units, second + 1)
    });
    let released = candidates.get(sibling_end).map(|(index, _)| *index);

    let mut skipped = candidates.split_off(sibling_start);
    skipped.truncate(sibling_end - sibling_start);

    Claim {
        related: candidates,
        skipped,
        released,
    }
}

/// Outcome of associating one label.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssociation {
    /// Index of the label in the sorted label stream
    pub label_index: usize,
    /// Field built from the attached data, under its canonical name
    pub field: Field,
    /// Stream indices attached to the field
    pub related: Vec<usize>,
    /// Stream indices consumed but not attached
    pub skipped: Vec<usize>,
}

/// Association result for one page.
#[derive(Debug, Clone)]
pub struct PageAssociation {
    /// Per-label results in label order
    pub fields: Vec<FieldAssociation>,
    /// Candidate stream with its final consumption state
    pub stream: DataStream,
}

impl PageAssociation {
    /// Whether consumed and leftover fragments exactly cover the stream with
    /// no fragment claimed twice.
    pub fn is_partition(&self) -> bool {
        let mut seen = vec![false; self.stream.len()];
        let claimed = self
            .fields
            .iter()
            .flat_map(|f| f.related.iter().chain(f.skipped.iter()));
        for &index in claimed.chain(self.stream.leftover_indices().iter()) {
            if index >= seen.len() || seen[index] {
                return false;
            }
            seen[index] = true;
        }
        seen.iter().all(|s| *s)
    }
}

/// Assigns candidate data to field labels, one page at a time.
#[derive(Debug, Clone, Copy)]
pub struct AssociationEngine<'a> {
    vocabulary: &'a Vocabulary,
    config: &'a ExtractionConfig,
}

impl<'a> AssociationEngine<'a> {
    /// Create an engine over the given vocabulary and geometry.
    pub fn new(vocabulary: &'a Vocabulary, config: &'a ExtractionConfig) -> Self {
        Self { vocabulary, config }
    }

    /// Associate every label of a page with its data.
    ///
    /// Both `labels` and `data` must already be in reading order; otherwise
    /// this fails with [`crate::Error::UnorderedStream`].
    pub fn associate_page(
        &self,
        labels: &[PositionedFragment],
        data: Vec<PositionedFragment>,
    ) -> Result<PageAssociation> {
        ensure_reading_ordered(labels, "labels")?;
        let mut stream = DataStream::new(data)?;

        let mut fields = Vec::with_capacity(labels.len());
        for (label_index, label) in labels.iter().enumerate() {
            let next = labels.get(label_index + 1).map(|l| &l.bbox);
            let region = Region::for_label(&label.bbox, next, self.config);
            fields.push(self.associate_label(label_index, label, &region, &mut stream));
        }

        log::debug!(
            "Associated {} labels, consumed {}/{} candidate fragments",
            labels.len(),
            stream.consumed_count(),
            stream.len()
        );

        Ok(PageAssociation { fields, stream })
    }

    fn associate_label(
        &self,
        label_index: usize,
        label: &PositionedFragment,
        region: &Region,
        stream: &mut DataStream,
    ) -> FieldAssociation {
        let name = self.vocabulary.canonical_name(&label.text);
        let dual = self.vocabulary.is_dual_field(name);

        let candidates: Vec<(usize, Datum)> = stream
            .remaining()
            .filter(|(_, fragment)| region.contains(&fragment.bbox))
            .map(|(index, fragment)| (index, parse_datum_with(&fragment.text, self.vocabulary)))
            .collect();

        log::trace!("{}: {} candidate fragments", name, candidates.len());

        let claim = claim_candidates(candidates, dual);
        if let Some(index) = claim.released {
            log::trace!(
                "{}: released trailing fragment {:?}",
                name,
                stream.fragments()[index].text
            );
        }
        stream.consume(claim.consumed_indices().collect::<Vec<_>>());

        let mut field = Field::new(name);
        let related = claim.related.iter().map(|(index, _)| *index).collect();
        let skipped = claim.skipped.iter().map(|(index, _)| *index).collect();
        for (_, datum) in claim.related {
            field.push(datum);
        }

        FieldAssociation {
            label_index,
            field,
            related,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn frag(text: &str, left: f32, top: f32) -> PositionedFragment {
        PositionedFragment::new(text, BoundingBox::new(left, top - 8.0, left + 30.0, top))
    }

    fn items(data: &[Datum]) -> Vec<(usize, Datum)> {
        data.iter().cloned().enumerate().collect()
    }

    fn indices(items: &[(usize, Datum)]) -> Vec<usize> {
        items.iter().map(|(i, _)| *i).collect()
    }

    #[test]
    fn test_region_bounds() {
        let config = ExtractionConfig::default();
        let label = BoundingBox::new(10.0, 692.0, 200.0, 700.0);
        let next = BoundingBox::new(10.0, 672.0, 200.0, 680.0);
        let region = Region::for_label(&label, Some(&next), &config);
        assert_eq!(region.bottom, Some(690.0));

        // Same row, to the right
        assert!(region.contains(&BoundingBox::new(300.0, 692.0, 320.0, 700.0)));
        // Within tolerance above and below
        assert!(region.contains(&BoundingBox::new(300.0, 697.0, 320.0, 705.0)));
        assert!(region.contains(&BoundingBox::new(300.0, 677.0, 320.0, 685.0)));
        // Outside tolerance
        assert!(!region.contains(&BoundingBox::new(300.0, 698.0, 320.0, 706.0)));
        assert!(!region.contains(&BoundingBox::new(300.0, 676.0, 320.0, 684.0)));
        // Left of the label
        assert!(!region.contains(&BoundingBox::new(5.0, 692.0, 9.0, 700.0)));
        // The label itself
        assert!(!region.contains(&label));
    }

    #[test]
    fn test_last_region_is_unbounded_below() {
        let config = ExtractionConfig::default();
        let label = BoundingBox::new(10.0, 692.0, 200.0, 700.0);
        let region = Region::for_label(&label, None, &config);
        assert!(region.contains(&BoundingBox::new(300.0, 0.0, 320.0, 8.0)));
    }

    #[test]
    fn test_claim_value_unit_range() {
        let claim = claim_candidates(
            items(&[
                Datum::value("140"),
                Datum::unit("mmol/L"),
                Datum::TwoSidedInterval {
                    min: 135.0,
                    max: 145.0,
                },
            ]),
            false,
        );
        assert_eq!(indices(&claim.related), [0, 1, 2]);
        assert!(claim.skipped.is_empty());
        assert_eq!(claim.released, None);
    }

    #[test]
    fn test_claim_releases_next_reading_value() {
        let claim = claim_candidates(
            items(&[
                Datum::text("Resultat"),
                Datum::value("140"),
                Datum::unit("mmol/L"),
                Datum::value("4.1"),
                Datum::unit("mmol/L"),
            ]),
            false,
        );
        assert_eq!(indices(&claim.related), [0, 1, 2]);
        assert_eq!(claim.released, Some(3));
        assert_eq!(claim.consumed_indices().collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn test_claim_keeps_closing_value_when_candidates_are_exhausted() {
        let claim = claim_candidates(
            items(&[Datum::value("1"), Datum::unit("g/L"), Datum::value("2")]),
            false,
        );
        assert_eq!(indices(&claim.related), [0, 1, 2]);
        assert_eq!(claim.released, None);
    }

    #[test]
    fn test_claim_without_value() {
        let claim = claim_candidates(items(&[Datum::text("Negatiu"), Datum::unit("CU")]), false);
        assert_eq!(indices(&claim.related), [0, 1]);
        assert_eq!(claim.released, None);

        let empty = claim_candidates(Vec::new(), false);
        assert!(empty.related.is_empty());
        assert_eq!(empty.released, None);
    }

    #[test]
    fn test_claim_dual_field_skips_second_group() {
        let claim = claim_candidates(
            items(&[
                Datum::unit("mmol/L"),
                Datum::value("5.1"),
                Datum::unit("mg/dL"),
                Datum::value("197"),
            ]),
            true,
        );
        assert_eq!(indices(&claim.related), [0, 1]);
        assert_eq!(indices(&claim.skipped), [2, 3]);
        assert_eq!(claim.released, None);
    }

    #[test]
    fn test_claim_dual_field_value_first_rows() {
        let range = |min, max| Datum::TwoSidedInterval { min, max };
        let claim = claim_candidates(
            items(&[
                Datum::value("5.1"),
                Datum::unit("mmol/L"),
                range(3.9, 5.5),
                Datum::value("92"),
                Datum::unit("mg/dL"),
                range(70.0, 100.0),
            ]),
            true,
        );
        assert_eq!(indices(&claim.related), [0, 1, 2]);
        assert_eq!(indices(&claim.skipped), [3, 4, 5]);
        assert_eq!(claim.released, None);
    }

    #[test]
    fn test_claim_dual_field_leaves_third_reading() {
        let claim = claim_candidates(
            items(&[
                Datum::unit("mmol/L"),
                Datum::value("5.1"),
                Datum::unit("mg/dL"),
                Datum::value("92"),
                Datum::unit("mmol/L"),
                Datum::value("4.2"),
            ]),
            true,
        );
        assert_eq!(indices(&claim.related), [0, 1]);
        assert_eq!(indices(&claim.skipped), [2, 3]);
        assert_eq!(claim.released, Some(4));
        assert_eq!(claim.consumed_indices().collect::<Vec<_>>(), [0, 1, 2, 3]);
    }

    #[test]
    fn test_claim_dual_field_single_reading() {
        let claim = claim_candidates(
            items(&[
                Datum::value("5.6"),
                Datum::unit("mmol/L"),
                Datum::OneSidedInterval {
                    comparator: crate::datum::Comparator::Lt,
                    limit: 5.2,
                },
            ]),
            true,
        );
        assert_eq!(indices(&claim.related), [0, 1, 2]);
        assert!(claim.skipped.is_empty());
        assert_eq!(claim.released, None);
    }

    #[test]
    fn test_claim_dual_field_adjacent_values() {
        let claim = claim_candidates(
            items(&[Datum::value("5.1"), Datum::value("197"), Datum::unit("mg/dL")]),
            true,
        );
        assert_eq!(indices(&claim.related), [0]);
        assert_eq!(indices(&claim.skipped), [1, 2]);
    }

    #[test]
    fn test_associate_two_rows() {
        let vocab = Vocabulary::builtin();
        let config = ExtractionConfig::default();
        let engine = AssociationEngine::new(vocab, &config);

        let labels = vec![
            frag("Srm-Io sodi;c.subst.", 10.0, 700.0),
            frag("Srm-Io potassi;c.subst.", 10.0, 680.0),
        ];
        let data = vec![
            frag("140", 300.0, 700.0),
            frag("mmol/L", 350.0, 700.0),
            frag("[ 135 - 145 ]", 420.0, 700.0),
            frag("4.1", 300.0, 680.0),
            frag("mmol/L", 350.0, 680.0),
            frag("[ 3.5 - 5.1 ]", 420.0, 680.0),
        ];

        let page = engine.associate_page(&labels, data).unwrap();
        assert!(page.is_partition());
        assert_eq!(page.fields.len(), 2);

        let sodi = &page.fields[0].field;
        assert_eq!(sodi.name, "Serum/Sodi");
        assert_eq!(
            sodi.data,
            vec![
                Datum::value("140"),
                Datum::unit("mmol/L"),
                Datum::TwoSidedInterval {
                    min: 135.0,
                    max: 145.0
                },
            ]
        );

        let potassi = &page.fields[1].field;
        assert_eq!(potassi.name, "Serum/Potassi");
        assert_eq!(potassi.data[0], Datum::value("4.1"));
        assert!(page.stream.leftover_indices().is_empty());
    }

    #[test]
    fn test_associate_rejects_unsorted_labels() {
        let config = ExtractionConfig::default();
        let engine = AssociationEngine::new(Vocabulary::builtin(), &config);
        let labels = vec![
            frag("Srm-Urea;c.subst.", 10.0, 600.0),
            frag("Srm-Urat;c.subst.", 10.0, 700.0),
        ];
        let err = engine.associate_page(&labels, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::UnorderedStream { stream: "labels", position: 1 }));
    }

    #[test]
    fn test_associate_rejects_unsorted_data() {
        let config = ExtractionConfig::default();
        let engine = AssociationEngine::new(Vocabulary::builtin(), &config);
        let labels = vec![frag("Srm-Urea;c.subst.", 10.0, 700.0)];
        let data = vec![frag("g/L", 350.0, 700.0), frag("5.0", 300.0, 700.0)];
        let err = engine.associate_page(&labels, data).unwrap_err();
        assert!(matches!(err, Error::UnorderedStream { stream: "data", position: 1 }));
    }

    #[test]
    fn test_data_stream_consumption() {
        let fragments = vec![frag("a", 0.0, 10.0), frag("b", 10.0, 10.0)];
        let mut stream = DataStream::new(fragments).unwrap();
        assert_eq!(stream.len(), 2);
        stream.consume([1]);
        assert!(stream.is_consumed(1));
        assert!(!stream.is_consumed(0));
        assert_eq!(stream.leftover_indices(), [0]);
        assert_eq!(stream.consumed_count(), 1);
    }
}
