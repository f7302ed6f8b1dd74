//! PDF document model.
//!
//! A [`PdfDocument`] borrows the complete file bytes, locates the newest
//! cross-reference section through `startxref`, and loads indirect objects on demand.
//! Nothing is cached, so a document can be shared across threads.

use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use crate::parser::{nom_error_at, parse_indirect_header, parse_object_at};
use crate::parser_config::ParserOptions;
use crate::xref::{find_xref_offset, parse_xref, CrossRefTable};
use std::borrow::Cow;

/// How far into the file the `%PDF-` header may appear.
const HEADER_WINDOW: usize = 1024;

/// PDF document.
///
/// Provides access to the version, trailer and catalog of a PDF held in memory,
/// plus object loading and one-level reference resolution.
///
/// # Example
///
/// ```no_run
/// use pdf_acroform::document::PdfDocument;
///
/// let bytes = std::fs::read("form.pdf")?;
/// let doc = PdfDocument::parse(&bytes)?;
/// println!("PDF version: {}.{}", doc.version().0, doc.version().1);
/// println!("Objects: {}", doc.xref().len());
/// # Ok::<(), pdf_acroform::error::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PdfDocument<'a> {
    data: &'a [u8],
    version: (u8, u8),
    xref: CrossRefTable,
    options: ParserOptions,
}

impl<'a> PdfDocument<'a> {
    /// Parse a document with default (lenient) options.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        Self::parse_with_options(data, ParserOptions::default())
    }

    /// Parse a document with custom options.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHeader`] without a `%PDF-M.m` header in the first 1024 bytes
    /// - [`Error::InvalidXref`] if `startxref` is missing or does not point at `xref`
    /// - [`Error::Unsupported`] for cross-reference streams
    /// - [`Error::ParseError`] for malformed xref or trailer syntax
    pub fn parse_with_options(data: &'a [u8], options: ParserOptions) -> Result<Self> {
        let version = parse_header(data)?;
        let startxref = find_xref_offset(data, options.startxref_window)?;
        log::debug!("PDF {}.{}, startxref {}", version.0, version.1, startxref);

        let xref = parse_xref(data, startxref, &options)?;
        log::debug!("Loaded {} xref entries, /Size {}", xref.len(), xref.size());

        Ok(Self {
            data,
            version,
            xref,
            options,
        })
    }

    /// PDF version from the header (major, minor).
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Merged cross-reference table.
    pub fn xref(&self) -> &CrossRefTable {
        &self.xref
    }

    /// Merged trailer dictionary.
    pub fn trailer(&self) -> &Dictionary {
        self.xref.trailer()
    }

    /// Offset of the newest xref section (the file's `startxref` value).
    pub fn startxref(&self) -> usize {
        self.xref.offset()
    }

    /// Options this document was parsed with.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Byte offset of an in-use object whose generation matches.
    pub fn offset_of(&self, obj_ref: ObjectRef) -> Option<usize> {
        self.xref
            .get(obj_ref.id)
            .filter(|entry| entry.in_use && entry.generation == obj_ref.gen)
            .and_then(|entry| usize::try_from(entry.offset).ok())
    }

    /// Load an indirect object.
    ///
    /// The `N G obj` header at the recorded offset must name the requested object.
    /// A dictionary that opens a stream is returned without its stream data.
    ///
    /// # Errors
    ///
    /// - [`Error::ObjectNotFound`] if the xref has no in-use entry for the reference
    /// - [`Error::ParseError`] if the offset does not hold that object or its body is
    ///   malformed
    pub fn load_object(&self, obj_ref: ObjectRef) -> Result<Object> {
        let offset = self
            .offset_of(obj_ref)
            .ok_or(Error::ObjectNotFound(obj_ref.id, obj_ref.gen))?;
        let slice = self
            .data
            .get(offset..)
            .ok_or_else(|| Error::parse(offset, format!("offset of {} is past end of file", obj_ref)))?;

        let (rest, header) = parse_indirect_header(slice)
            .map_err(|e| nom_error_at(self.data, offset, e, self.options.max_nesting, "object header"))?;
        if header.id != obj_ref.id {
            return Err(Error::parse(
                offset,
                format!("expected object {} but found {}", obj_ref.id, header.id),
            ));
        }

        let body_at = self.data.len() - rest.len();
        let (obj, _) = parse_object_at(self.data, body_at, self.options.max_nesting)?;
        Ok(obj)
    }

    /// Load an indirect object that must be a dictionary.
    pub fn load_dictionary(&self, obj_ref: ObjectRef) -> Result<Dictionary> {
        self.load_object(obj_ref)?.into_dict()
    }

    /// Resolve one level of indirection.
    ///
    /// Direct objects are borrowed back unchanged.
    pub fn resolve<'o>(&self, obj: &'o Object) -> Result<Cow<'o, Object>> {
        match obj {
            Object::Reference(r) => self.load_object(*r).map(Cow::Owned),
            other => Ok(Cow::Borrowed(other)),
        }
    }

    /// Reference to the document catalog from the trailer's `/Root`.
    ///
    /// # Errors
    ///
    /// [`Error::ParseError`] at the `startxref` offset if `/Root` is absent or not a
    /// reference.
    pub fn root_ref(&self) -> Result<ObjectRef> {
        self.trailer()
            .get("Root")
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::parse(self.startxref(), "trailer has no /Root reference"))
    }

    /// Load the document catalog.
    ///
    /// # Errors
    ///
    /// [`Error::ParseError`] if `/Root` is missing or does not lead to a dictionary.
    pub fn catalog(&self) -> Result<Dictionary> {
        let root = self.root_ref()?;
        let at = self.offset_of(root).unwrap_or_else(|| self.startxref());
        match self.load_object(root) {
            Ok(Object::Dictionary(dict)) => Ok(dict),
            Ok(other) => Err(Error::parse(at, format!("catalog is a {}, not a dictionary", other.type_name()))),
            Err(Error::ObjectNotFound(..)) => Err(Error::parse(at, format!("catalog {} is not in the xref", root))),
            Err(e) => Err(e),
        }
    }
}

/// Parse the `%PDF-M.m` header.
///
/// The header may be preceded by junk, as long as it starts within the first 1024
/// bytes.
///
/// ```
/// # use pdf_acroform::document::parse_header;
/// assert_eq!(parse_header(b"%PDF-1.7\n").unwrap(), (1, 7));
/// assert_eq!(parse_header(b"\xEF\xBB\xBFjunk%PDF-2.0\n").unwrap(), (2, 0));
/// assert!(parse_header(b"hello").is_err());
/// ```
pub fn parse_header(data: &[u8]) -> Result<(u8, u8)> {
    const MAGIC: &[u8] = b"%PDF-";

    let window = &data[..data.len().min(HEADER_WINDOW)];
    let pos = window
        .windows(MAGIC.len())
        .position(|w| w == MAGIC)
        .ok_or_else(|| Error::InvalidHeader("no '%PDF-' in the first 1024 bytes".to_string()))?;

    match data.get(pos + MAGIC.len()..pos + MAGIC.len() + 3) {
        Some(&[major, b'.', minor]) if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok((major - b'0', minor - b'0'))
        },
        _ => Err(Error::InvalidHeader(format!("malformed version after '%PDF-' at byte {}", pos))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_pdf;

    fn sample() -> Vec<u8> {
        build_pdf(
            &[
                (1, "<< /Type /Catalog /AcroForm 2 0 R >>"),
                (2, "<< /Fields [] >>"),
                (3, "[1 2 3]"),
            ],
            "/Root 1 0 R",
        )
    }

    #[test]
    fn test_parse_and_catalog() {
        let data = sample();
        let doc = PdfDocument::parse(&data).unwrap();
        assert_eq!(doc.version(), (1, 7));
        let catalog = doc.catalog().unwrap();
        assert_eq!(catalog.get("Type").and_then(Object::as_name), Some("Catalog"));
        assert_eq!(doc.xref().size(), 4);
    }

    #[test]
    fn test_load_object_checks_header() {
        let data = sample();
        let doc = PdfDocument::parse(&data).unwrap();
        let arr = doc.load_object(ObjectRef::new(3, 0)).unwrap();
        assert_eq!(arr.as_array().map(Vec::len), Some(3));
        assert!(matches!(
            doc.load_object(ObjectRef::new(9, 0)),
            Err(Error::ObjectNotFound(9, 0))
        ));
        assert!(doc.load_object(ObjectRef::new(3, 1)).is_err());
    }

    #[test]
    fn test_offset_of_points_at_object_header() {
        let data = sample();
        let doc = PdfDocument::parse(&data).unwrap();
        let offset = doc.offset_of(ObjectRef::new(2, 0)).unwrap();
        assert!(data[offset..].starts_with(b"2 0 obj"));
        assert_eq!(doc.offset_of(ObjectRef::new(0, 65535)), None);
    }

    #[test]
    fn test_resolve_one_level() {
        let data = sample();
        let doc = PdfDocument::parse(&data).unwrap();
        let direct = Object::Number(5.0);
        assert!(matches!(doc.resolve(&direct).unwrap(), Cow::Borrowed(_)));
        let binding = Object::Reference(ObjectRef::new(2, 0));
        let resolved = doc.resolve(&binding).unwrap();
        assert!(resolved.as_dict().unwrap().contains_key("Fields"));
    }

    #[test]
    fn test_missing_root_reports_startxref() {
        let data = build_pdf(&[(1, "<< /Type /Catalog >>")], "");
        let doc = PdfDocument::parse(&data).unwrap();
        let err = doc.catalog().unwrap_err();
        assert_eq!(err.offset(), Some(doc.startxref()));
    }

    #[test]
    fn test_wrong_object_at_offset() {
        let mut data = sample();
        // Rewrite "3 0 obj" as "4 0 obj" in place; offsets stay valid
        let pos = data.windows(7).position(|w| w == b"3 0 obj").unwrap();
        data[pos] = b'4';
        let doc = PdfDocument::parse(&data).unwrap();
        let err = doc.load_object(ObjectRef::new(3, 0)).unwrap_err();
        assert_eq!(err.offset(), Some(pos));
    }

    #[test]
    fn test_missing_startxref() {
        let err = PdfDocument::parse(b"%PDF-1.4\n1 0 obj << >> endobj\n").unwrap_err();
        assert!(matches!(err, Error::InvalidXref { .. }));
    }

    #[test]
    fn test_bad_header() {
        assert!(matches!(PdfDocument::parse(b"GIF89a"), Err(Error::InvalidHeader(_))));
        assert!(parse_header(b"%PDF-x.y").is_err());
    }

    #[test]
    fn test_document_is_sync() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<PdfDocument<'static>>();
    }
}
