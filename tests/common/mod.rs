//! Shared helpers for integration tests.
//!
//! PDFs are assembled in memory with correct xref offsets, so no binary fixtures are
//! needed.

#![allow(dead_code)]

use pdf_acroform::{AcroFormField, PdfDocument};

#[path = "../../src/test_support.rs"]
mod test_support;

pub use test_support::PdfBuilder;

/// One page with a text field `Name` and a checkbox `IsVeteran` (on-state `Yes`).
pub fn veteran_form() -> Vec<u8> {
    PdfBuilder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R /AcroForm 5 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(3, "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Annots [6 0 R 7 0 R] >>")
        .object(4, "<< /Length 0 >>\nstream\n\nendstream")
        .object(5, "<< /Fields [6 0 R 7 0 R] /DA (/Helv 0 Tf 0 g) >>")
        .object(
            6,
            "<< /Type /Annot /Subtype /Widget /FT /Tx /T (Name) /V (Old Name) /Rect [50 700 300 720] /P 3 0 R /AP << /N 4 0 R >> >>",
        )
        .object(
            7,
            "<< /Type /Annot /Subtype /Widget /FT /Btn /T (IsVeteran) /V /Off /AS /Off /Rect [50 650 70 670] /P 3 0 R /AP << /N << /Yes 4 0 R /Off 4 0 R >> >> >>",
        )
        .trailer("/Root 1 0 R /ID [<00112233> <44556677>]")
        .build()
}

pub fn fields(data: &[u8]) -> Vec<AcroFormField> {
    pdf_acroform::read_fields(data).expect("form should read")
}

/// Value of the field with the given fully-qualified name.
pub fn value_of(data: &[u8], name: &str) -> Option<String> {
    fields(data)
        .into_iter()
        .find(|f| f.name == name)
        .and_then(|f| f.value)
}

pub fn startxref(data: &[u8]) -> usize {
    PdfDocument::parse(data).expect("document should parse").startxref()
}
