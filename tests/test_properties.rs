//! Property tests for association and parsing invariants.

use labtool::datum::parse_datum;
use labtool::geometry::BoundingBox;
use labtool::ordering::{is_reading_ordered, sort_reading_order};
use labtool::text::normalize_line;
use labtool::{AssociationEngine, ExtractionConfig, PositionedFragment, Vocabulary};
use proptest::prelude::*;

const LABELS: &[&str] = &[
    "Srm-Glucosa;c.subst.",
    "Srm-Io sodi;c.subst.",
    "Srm-Io potassi;c.subst.",
    "San-Hemoglobina;c.massa",
    "Pla-Fibrinogen;c.massa(coagul.;Clauss)",
    "Pla-Fibrinogen;c.massa(coagul.;derivat)",
    "Srm-Desconegut;c.subst.",
];

const DATA: &[&str] = &[
    "140",
    "* 5.1",
    "<0.5",
    "Pendent",
    "----",
    "mmol/L",
    "g/L",
    "%",
    "1",
    "[ 3.5 - 5.1 ]",
    "[ < 200 ]",
    "Valor desitjable > 1.0",
    "Negatiu",
    "Hemolitzada",
];

fn fragment(
    pool: &'static [&'static str],
    columns: u32,
) -> impl Strategy<Value = PositionedFragment> {
    (prop::sample::select(pool), 0..columns, 0u32..60).prop_map(|(text, column, row)| {
        let left = column as f32 * 15.0;
        let top = 800.0 - row as f32 * 6.0;
        PositionedFragment::new(text, BoundingBox::new(left, top - 8.0, left + 40.0, top))
    })
}

fn sorted(
    strategy: impl Strategy<Value = Vec<PositionedFragment>>,
) -> impl Strategy<Value = Vec<PositionedFragment>> {
    strategy.prop_map(|mut fragments| {
        sort_reading_order(&mut fragments);
        fragments
    })
}

const NORMALIZE_INPUT: &str = "[ \ta-zA-Z0-9;().'\"\\-àéèíòóú]{0,40}";

proptest! {
    #[test]
    fn prop_association_partitions_the_stream(
        labels in sorted(prop::collection::vec(fragment(LABELS, 4), 0..12)),
        data in sorted(prop::collection::vec(fragment(DATA, 40), 0..60)),
    ) {
        let config = ExtractionConfig::default();
        let engine = AssociationEngine::new(Vocabulary::builtin(), &config);
        let page = engine.associate_page(&labels, data).unwrap();

        prop_assert!(page.is_partition());
        prop_assert_eq!(page.fields.len(), labels.len());
        prop_assert_eq!(
            page.stream.consumed_count() + page.stream.leftover_indices().len(),
            page.stream.len()
        );
    }

    #[test]
    fn prop_attached_data_keeps_reading_order(
        labels in sorted(prop::collection::vec(fragment(LABELS, 4), 1..12)),
        data in sorted(prop::collection::vec(fragment(DATA, 40), 0..60)),
    ) {
        let config = ExtractionConfig::default();
        let engine = AssociationEngine::new(Vocabulary::builtin(), &config);
        let page = engine.associate_page(&labels, data).unwrap();

        for association in &page.fields {
            prop_assert!(association.related.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(association.skipped.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(association.field.data.len(), association.related.len());

            let label = &labels[association.label_index].bbox;
            for &index in association.related.iter().chain(&association.skipped) {
                let bbox = &page.stream.fragments()[index].bbox;
                prop_assert!(bbox.left >= label.left);
                prop_assert!(bbox.top - label.top <= config.vertical_tolerance);
            }
        }
    }

    #[test]
    fn prop_sorting_yields_reading_order(
        mut fragments in prop::collection::vec(fragment(DATA, 40), 0..60),
    ) {
        sort_reading_order(&mut fragments);
        prop_assert!(is_reading_ordered(&fragments));
    }

    #[test]
    fn prop_parse_datum_never_panics(content in "\\PC*") {
        let _ = parse_datum(&content);
    }

    #[test]
    fn prop_normalize_leaves_single_inner_blanks(raw in NORMALIZE_INPUT) {
        let line = normalize_line(&raw);
        prop_assert!(!line.contains("  "));
        prop_assert!(!line.contains('\t'));
        prop_assert_eq!(line.trim(), line.as_str());
    }
}
