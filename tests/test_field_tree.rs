//! Field discovery over realistic and broken field trees.

mod common;

use common::{value_of, PdfBuilder};
use pdf_acroform::{
    fill_fields, read_fields, AcroFormReader, Error, FieldKind, Object, ObjectRef, ParserOptions, PdfDocument,
};

fn form(fields: &str, objects: &[(u32, &str)]) -> Vec<u8> {
    let mut builder = PdfBuilder::new()
        .object(1, "<< /Type /Catalog /AcroForm 2 0 R >>")
        .object(2, &format!("<< /Fields {} >>", fields));
    for (num, body) in objects {
        builder = builder.object(*num, body);
    }
    builder.trailer("/Root 1 0 R").build()
}

#[test]
fn test_hierarchical_names_and_inherited_type() {
    let data = form(
        "[3 0 R]",
        &[
            (3, "<< /T (applicant) /FT /Tx /Kids [4 0 R 5 0 R] >>"),
            (4, "<< /T (first) /Parent 3 0 R /V (Ann) >>"),
            (5, "<< /T (address) /Parent 3 0 R /Kids [6 0 R] >>"),
            (6, "<< /T (zip) /Parent 5 0 R /V (90210) >>"),
        ],
    );
    let fields = read_fields(&data).unwrap();
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["applicant.first", "applicant.address.zip"]);
    assert!(fields.iter().all(|f| f.kind == FieldKind::Text));
    assert_eq!(fields[1].value.as_deref(), Some("90210"));

    let out = fill_fields(&data, [("Applicant.Address.Zip", "10001")]).unwrap();
    assert_eq!(value_of(&out, "applicant.address.zip").as_deref(), Some("10001"));
    assert_eq!(value_of(&out, "applicant.first").as_deref(), Some("Ann"));
}

#[test]
fn test_radio_group_with_widget_kids() {
    let data = form(
        "[3 0 R]",
        &[
            (3, "<< /FT /Btn /Ff 49152 /T (Payment) /V /Off /Kids [4 0 R 5 0 R] >>"),
            (4, "<< /Type /Annot /Subtype /Widget /Parent 3 0 R /AS /Off /AP << /N << /Off 9 0 R /Card 9 0 R >> >> >>"),
            (5, "<< /Type /Annot /Subtype /Widget /Parent 3 0 R /AS /Off /AP << /N << /Cash 9 0 R /Off 9 0 R >> >> >>"),
        ],
    );
    let fields = read_fields(&data).unwrap();
    assert_eq!(fields.len(), 1);
    let payment = &fields[0];
    assert_eq!(payment.kind, FieldKind::Radio);
    assert_eq!(payment.on_value.as_deref(), Some("Card"));
    assert_eq!(payment.widgets, vec![ObjectRef::new(4, 0), ObjectRef::new(5, 0)]);
    assert_eq!(payment.object_number, 3);

    let out = fill_fields(&data, [("Payment", "1")]).unwrap();
    assert_eq!(value_of(&out, "Payment").as_deref(), Some("Card"));

    let doc = PdfDocument::parse(&out).unwrap();
    let first = doc.load_dictionary(ObjectRef::new(4, 0)).unwrap();
    let second = doc.load_dictionary(ObjectRef::new(5, 0)).unwrap();
    assert_eq!(first.get("AS").and_then(Object::as_name), Some("Card"));
    assert_eq!(second.get("AS").and_then(Object::as_name), Some("Off"));
}

#[test]
fn test_radio_flag_bit_15_alone() {
    let data = form(
        "[3 0 R 4 0 R]",
        &[
            (3, "<< /FT /Btn /Ff 16384 /T (Size) /V /Off /AP << /N << /Large 9 0 R /Off 9 0 R >> >> >>"),
            (4, "<< /FT /Btn /Ff 2 /T (Gift) >>"),
        ],
    );
    let fields = read_fields(&data).unwrap();
    assert_eq!(fields[0].kind, FieldKind::Radio);
    assert_eq!(fields[0].on_value.as_deref(), Some("Large"));
    assert_eq!(fields[1].kind, FieldKind::Checkbox);

    let out = fill_fields(&data, [("Size", "1")]).unwrap();
    assert_eq!(value_of(&out, "Size").as_deref(), Some("Large"));
}

#[test]
fn test_checkbox_with_single_widget_kid() {
    let data = form(
        "[3 0 R]",
        &[
            (3, "<< /FT /Btn /T (Agree) /V /Off /Kids [4 0 R] >>"),
            (4, "<< /Subtype /Widget /Parent 3 0 R /AS /Off /AP << /N << /On 9 0 R /Off 9 0 R >> >> >>"),
        ],
    );
    let fields = read_fields(&data).unwrap();
    assert_eq!(fields[0].kind, FieldKind::Checkbox);
    assert_eq!(fields[0].on_value.as_deref(), Some("On"));

    let out = fill_fields(&data, [("Agree", "true")]).unwrap();
    assert_eq!(value_of(&out, "Agree").as_deref(), Some("On"));
}

#[test]
fn test_checkbox_without_appearance_defaults_to_yes() {
    let data = form("[3 0 R]", &[(3, "<< /FT /Btn /T (Plain) >>")]);
    let fields = read_fields(&data).unwrap();
    assert_eq!(fields[0].on_value.as_deref(), Some("Yes"));
    assert_eq!(fields[0].value, None);
}

#[test]
fn test_choice_and_unknown_kinds() {
    let data = form(
        "[3 0 R 4 0 R]",
        &[
            (3, "<< /FT /Ch /T (Colors) /V [(Red) (Blue)] /Opt [(Red) (Green) (Blue)] >>"),
            (4, "<< /FT /Sig /T (Signature) >>"),
        ],
    );
    let fields = read_fields(&data).unwrap();
    assert_eq!(fields[0].kind, FieldKind::Choice);
    assert_eq!(fields[0].value.as_deref(), Some("Red, Blue"));
    assert_eq!(fields[1].kind, FieldKind::Unknown);

    let out = fill_fields(&data, [("Colors", "Green"), ("Signature", "x")]).unwrap();
    assert_eq!(value_of(&out, "Colors").as_deref(), Some("Green"));
    let doc = PdfDocument::parse(&out).unwrap();
    assert!(doc.load_dictionary(ObjectRef::new(4, 0)).unwrap().get("V").is_none());
}

#[test]
fn test_cycle_in_kids_is_skipped() {
    let data = form(
        "[3 0 R 6 0 R]",
        &[
            (3, "<< /T (loop) /Kids [4 0 R] >>"),
            (4, "<< /T (inner) /Kids [3 0 R 5 0 R] >>"),
            (5, "<< /T (leaf) /FT /Tx /V (ok) >>"),
            (6, "<< /T (after) /FT /Tx >>"),
        ],
    );
    let fields = read_fields(&data).unwrap();
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["loop.inner.leaf", "after"]);
}

#[test]
fn test_dangling_reference_skips_branch() {
    let data = form("[3 0 R 40 0 R 4 0 R]", &[(3, "<< /T (a) /FT /Tx >>"), (4, "<< /T (b) /FT /Tx >>")]);
    let names: Vec<_> = read_fields(&data).unwrap().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_depth_limit() {
    let data = form(
        "[3 0 R]",
        &[
            (3, "<< /T (a) /Kids [4 0 R] >>"),
            (4, "<< /T (b) /Kids [5 0 R] >>"),
            (5, "<< /T (c) /FT /Tx >>"),
        ],
    );
    let doc = PdfDocument::parse_with_options(
        &data,
        ParserOptions {
            max_field_depth: 2,
            ..ParserOptions::default()
        },
    )
    .unwrap();
    assert!(AcroFormReader::new(&doc).read_fields().unwrap().is_empty());

    let doc = PdfDocument::parse(&data).unwrap();
    assert_eq!(AcroFormReader::new(&doc).read_fields().unwrap().len(), 1);
}

#[test]
fn test_acroform_object_number() {
    let data = form("[]", &[]);
    let doc = PdfDocument::parse(&data).unwrap();
    assert_eq!(AcroFormReader::new(&doc).acroform_object_number().unwrap(), 2);

    let inline = PdfBuilder::new()
        .object(1, "<< /Type /Catalog /AcroForm << /Fields [] >> >>")
        .trailer("/Root 1 0 R")
        .build();
    let doc = PdfDocument::parse(&inline).unwrap();
    assert_eq!(AcroFormReader::new(&doc).acroform_object_number().unwrap(), 0);
    assert!(AcroFormReader::new(&doc).read_fields().unwrap().is_empty());
}

#[test]
fn test_missing_root_is_parse_error() {
    let data = PdfBuilder::new().object(1, "<< /Type /Catalog >>").build();
    let err = read_fields(&data).unwrap_err();
    assert!(matches!(err, Error::ParseError { .. }), "{:?}", err);
    assert!(err.offset().is_some());
}

#[test]
fn test_missing_acroform_is_parse_error() {
    let data = PdfBuilder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .trailer("/Root 1 0 R")
        .build();
    let err = read_fields(&data).unwrap_err();
    assert!(matches!(err, Error::ParseError { .. }), "{:?}", err);
    // Filling a form-less document fails the same way
    assert!(matches!(fill_fields(&data, [("x", "y")]), Err(Error::ParseError { .. })));
}

#[test]
fn test_missing_fields_is_parse_error() {
    let data = PdfBuilder::new()
        .object(1, "<< /Type /Catalog /AcroForm 2 0 R >>")
        .object(2, "<< /DA (/Helv 0 Tf 0 g) >>")
        .trailer("/Root 1 0 R")
        .build();
    let err = read_fields(&data).unwrap_err();
    let offset = err.offset().unwrap();
    assert!(matches!(err, Error::ParseError { .. }));
    assert_eq!(&data[offset..offset + 7], b"2 0 obj");
}

#[test]
fn test_not_a_pdf() {
    assert!(read_fields(b"hello world").is_err());
    assert!(read_fields(b"%PDF-1.4\nno xref here\n").is_err());
}
