//! # PDF AcroForm
//!
//! Read and fill the interactive form fields (AcroForm) of a PDF without rewriting it.
//!
//! ## Core Features
//!
//! - **Low-level parsing**: classic cross-reference tables with `/Prev` chains,
//!   indirect object loading, reference resolution
//! - **Field discovery**: walks the `/Fields` tree, inherits `/FT` and `/Ff`, and
//!   reports every terminal field with its fully-qualified name, kind and value
//! - **Filling**: appends an incremental update so the original bytes (and any
//!   signatures over them) stay intact
//! - **Data binding**: JSON field maps from domain records to field values
//! - **FDF export** of the current field values
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_acroform::{AcroFormReader, AcroFormWriter, PdfDocument};
//!
//! let template = std::fs::read("template.pdf")?;
//! let doc = PdfDocument::parse(&template)?;
//! for field in AcroFormReader::new(&doc).read_fields()? {
//!     println!("{} ({}) = {:?}", field.name, field.kind, field.value);
//! }
//!
//! let filled = AcroFormWriter::new().fill_fields(&template, [("Name", "Doe, John E.")])?;
//! std::fs::write("filled.pdf", filled)?;
//! # Ok::<(), pdf_acroform::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! bytes ──► lexer ──► parser ──► xref ──► PdfDocument
//!                                              │
//!                      AcroFormReader ◄────────┤
//!                            │                 │
//!                     AcroFormWriter ──► IncrementalUpdate ──► bytes + update
//! ```

// Error handling
pub mod error;

// Core PDF parsing
pub mod document;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod parser_config;
pub mod xref;

// Text strings
pub mod encoding;

// Forms
pub mod fdf;
pub mod field_map;
pub mod forms;

// Writing
pub mod writer;

#[cfg(test)]
mod test_support;

// Re-exports
pub use document::PdfDocument;
pub use error::{Error, Result};
pub use fdf::FdfWriter;
pub use field_map::FieldMap;
pub use forms::{AcroFormField, AcroFormReader, AcroFormWriter, FieldFlags, FieldKind};
pub use object::{Dictionary, Object, ObjectRef};
pub use parser_config::ParserOptions;

/// Read all terminal fields of a PDF.
///
/// Shorthand for [`PdfDocument::parse`] followed by [`AcroFormReader::read_fields`].
pub fn read_fields(data: &[u8]) -> Result<Vec<AcroFormField>> {
    let doc = PdfDocument::parse(data)?;
    AcroFormReader::new(&doc).read_fields()
}

/// Fill fields with default options. See [`AcroFormWriter::fill_fields`].
pub fn fill_fields<I, K, V>(data: &[u8], values: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    AcroFormWriter::new().fill_fields(data, values)
}
