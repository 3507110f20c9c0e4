//! End-to-end tests: pages of text boxes in, encoded record out.

use std::io::Write;

use labtool::geometry::BoundingBox;
use labtool::layout::{JsonLayout, Page, TextBox};
use labtool::{Datum, EncodedValue, LabReportParser, Record};

fn text_box(text: &str, left: f32, top: f32) -> TextBox {
    let lines = text.split('\n').count() as f32;
    TextBox::new(text, BoundingBox::new(left, top - lines * 10.0, left + 120.0, top))
}

fn encoded(record: &Record, name: &str) -> Vec<(String, EncodedValue)> {
    let mut pairs = Vec::new();
    record
        .get(name)
        .unwrap_or_else(|| panic!("missing field {name}"))
        .encode(|key, value| pairs.push((key.to_string(), value.clone())));
    pairs
}

fn text(value: &str) -> EncodedValue {
    EncodedValue::Text(Some(value.to_string()))
}

/// Two pages with a repeated header and one test repeated on the second page.
fn sample_report() -> Vec<Page> {
    let first = Page::new(vec![
        text_box(
            "Pacient:  JOAN  GARCIA\nNHC: 1001\nData obtenció mostra: 12/03/2024",
            10.0,
            800.0,
        ),
        text_box("Srm-Io  sodi ; c.subst.\nSrm-Io potassi;c.subst.", 10.0, 700.0),
        text_box("140\n4.1", 300.0, 700.0),
        text_box("mmol/L\nmmol/L", 370.0, 700.0),
        text_box("[ 135 - 145 ]\n[ 3.5 - 5.1 ]", 440.0, 700.0),
    ]);
    let second = Page::new(vec![
        text_box("Pacient: JOAN GARCIA\nNHC: 1001", 10.0, 800.0),
        text_box("Srm-Io sodi;c.subst.", 10.0, 700.0),
        text_box("138", 300.0, 700.0),
        text_box("mmol/L", 370.0, 700.0),
        text_box("Srm-Colesterol;c.subst.", 10.0, 680.0),
        text_box("5.2", 300.0, 680.0),
        text_box("mmol/L", 370.0, 680.0),
        text_box("[ < 5.2 ]", 440.0, 680.0),
    ]);
    vec![first, second]
}

#[test]
fn test_multi_page_report() {
    let parser = LabReportParser::new();
    let record = parser.parse_pages(&sample_report()).unwrap();

    let names: Vec<&str> = record.names().collect();
    assert_eq!(
        names,
        [
            "Pacient/Nom",
            "Pacient/NHC",
            "Peticio/Data",
            "Serum/Sodi",
            "Serum/Potassi",
            "Serum/Colesterol",
        ]
    );

    assert_eq!(record.get("Pacient/Nom").unwrap().data, vec![Datum::value("JOAN GARCIA")]);
    assert_eq!(record.get("Peticio/Data").unwrap().data, vec![Datum::value("12/03/2024")]);

    // First page wins for the repeated sodium reading
    assert_eq!(
        encoded(&record, "Serum/Sodi"),
        vec![
            ("value".to_string(), text("140")),
            ("unit".to_string(), text("mmol/L")),
            ("refvalue.ge".to_string(), EncodedValue::Number(135.0)),
            ("refvalue.lt".to_string(), EncodedValue::Number(145.0)),
        ]
    );
    assert_eq!(
        encoded(&record, "Serum/Potassi"),
        vec![
            ("value".to_string(), text("4.1")),
            ("unit".to_string(), text("mmol/L")),
            ("refvalue.ge".to_string(), EncodedValue::Number(3.5)),
            ("refvalue.lt".to_string(), EncodedValue::Number(5.1)),
        ]
    );
    assert_eq!(
        encoded(&record, "Serum/Colesterol"),
        vec![
            ("value".to_string(), text("5.2")),
            ("unit".to_string(), text("mmol/L")),
            ("refvalue.lt".to_string(), EncodedValue::Number(5.2)),
        ]
    );
}

#[test]
fn test_json_layout_file_round_trip() {
    let pages = sample_report();
    let json = serde_json::to_string(&pages).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();

    let layout = JsonLayout::open(file.path()).unwrap();
    let parser = LabReportParser::new();
    let from_file = parser.parse_source(&layout).unwrap();
    let in_memory = parser.parse_pages(&pages).unwrap();

    assert_eq!(from_file, in_memory);
    assert_eq!(from_file.len(), 6);
}

#[test]
fn test_empty_document() {
    let parser = LabReportParser::new();
    assert!(parser.parse_pages(&[]).unwrap().is_empty());
    assert!(parser.parse_pages(&[Page::default()]).unwrap().is_empty());
}

#[test]
fn test_malformed_standalone_is_dropped() {
    let parser = LabReportParser::new();
    let page = Page::new(vec![
        text_box("Observacions: hora: 08:30", 10.0, 800.0),
        text_box("Sexe: Home", 10.0, 780.0),
    ]);
    let record = parser.parse_pages(&[page]).unwrap();

    assert!(!record.contains("Peticio/Observacions"));
    assert_eq!(record.get("Pacient/Sexe").unwrap().data, vec![Datum::value("Home")]);
}

#[test]
fn test_labels_without_data() {
    let parser = LabReportParser::new();
    let page = Page::new(vec![text_box("Srm-Urea;c.subst.\nSrm-Urat;c.subst.", 10.0, 700.0)]);
    let record = parser.parse_pages(&[page]).unwrap();

    assert_eq!(record.len(), 2);
    for field in record.fields() {
        assert!(field.data.is_empty());
        assert!(field.value().is_none());
    }
}

#[test]
fn test_unmatched_data_is_ignored() {
    let parser = LabReportParser::new();
    let page = Page::new(vec![
        text_box("Informe de laboratori", 10.0, 820.0),
        text_box("Srm-Urea;c.subst.", 10.0, 700.0),
        text_box("5.0", 300.0, 700.0),
    ]);
    let mut record = Record::new();
    let association = parser.process_page(&page, &mut record).unwrap();

    assert_eq!(record.get("Serum/Urea").unwrap().data, vec![Datum::value("5.0")]);
    assert_eq!(association.stream.leftover_indices(), [0]);
    assert!(association.is_partition());
}
