//! Interactive form (AcroForm) reading and filling.
//!
//! - [`AcroFormReader`] walks the field tree of a parsed document
//! - [`AcroFormWriter`] fills fields by appending an incremental update

pub mod field;
pub mod reader;
pub mod writer;

pub use field::{AcroFormField, FieldFlags, FieldKind};
pub use reader::AcroFormReader;
pub use writer::AcroFormWriter;
