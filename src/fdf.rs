//! FDF (Forms Data Format) export.
//!
//! Writes the values of a form's fields as an FDF file (ISO 32000-1:2008 Section
//! 12.7.7). Dotted field names are folded back into a `/T` + `/Kids` hierarchy:
//!
//! ```text
//! %FDF-1.2
//! 1 0 obj
//! << /FDF << /Fields [<< /T (applicant) /Kids [<< /T (name) /V <FEFF...> >>] >>] >> >>
//! endobj
//! trailer
//! << /Root 1 0 R >>
//! %%EOF
//! ```

use crate::encoding::encode_text_string;
use crate::error::Result;
use crate::forms::field::{AcroFormField, FieldKind};
use crate::object::{Dictionary, Object, ObjectRef, PdfString};
use crate::writer::ObjectSerializer;
use std::path::Path;

/// One node of the exported field hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct FdfField {
    /// Partial name (`/T`)
    pub partial_name: String,
    /// Value (`/V`), if the field has one
    pub value: Option<Object>,
    /// Child nodes
    pub kids: Vec<FdfField>,
}

impl FdfField {
    fn new(partial_name: &str) -> Self {
        Self {
            partial_name: partial_name.to_string(),
            value: None,
            kids: Vec::new(),
        }
    }

    fn to_object(&self) -> Object {
        let mut dict = Dictionary::new();
        dict.insert("T".to_string(), Object::String(text_string(&self.partial_name)));
        if let Some(value) = &self.value {
            dict.insert("V".to_string(), value.clone());
        }
        if !self.kids.is_empty() {
            let kids = self.kids.iter().map(FdfField::to_object).collect();
            dict.insert("Kids".to_string(), Object::Array(kids));
        }
        Object::Dictionary(dict)
    }
}

/// ASCII text as a literal string, anything else as UTF-16BE hex.
fn text_string(text: &str) -> PdfString {
    if text.is_ascii() {
        PdfString::literal(text.as_bytes().to_vec())
    } else {
        PdfString::hex(encode_text_string(text))
    }
}

/// FDF value of a field: text as UTF-16BE hex, button states as names.
fn fdf_value(field: &AcroFormField) -> Option<Object> {
    let value = field.value.as_ref()?;
    Some(match field.kind {
        FieldKind::Checkbox | FieldKind::Radio => Object::Name(value.clone()),
        _ => Object::String(PdfString::hex(encode_text_string(value))),
    })
}

/// FDF file writer.
///
/// # Example
///
/// ```no_run
/// use pdf_acroform::{AcroFormReader, FdfWriter, PdfDocument};
///
/// let data = std::fs::read("filled.pdf")?;
/// let doc = PdfDocument::parse(&data)?;
/// let fields = AcroFormReader::new(&doc).read_fields()?;
/// FdfWriter::from_fields(&fields).write_to_file("filled.fdf")?;
/// # Ok::<(), pdf_acroform::error::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct FdfWriter {
    fields: Vec<FdfField>,
}

impl FdfWriter {
    /// Create an empty FDF writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the hierarchy from fields read out of a form.
    pub fn from_fields(fields: &[AcroFormField]) -> Self {
        let mut writer = Self::new();
        for field in fields {
            writer.add_field(&field.name, fdf_value(field));
        }
        writer
    }

    /// Add a value under a fully-qualified dotted name.
    ///
    /// Intermediate nodes are shared between names with a common prefix.
    pub fn add_field(&mut self, name: &str, value: Option<Object>) {
        let mut level = &mut self.fields;
        let mut parts = name.split('.').peekable();
        while let Some(part) = parts.next() {
            let index = match level.iter().position(|node| node.partial_name == part) {
                Some(i) => i,
                None => {
                    level.push(FdfField::new(part));
                    level.len() - 1
                },
            };
            if parts.peek().is_none() {
                level[index].value = value;
                return;
            }
            level = &mut level[index].kids;
        }
    }

    /// Top-level nodes.
    pub fn fields(&self) -> &[FdfField] {
        &self.fields
    }

    /// Generate the FDF file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let fields = self.fields.iter().map(FdfField::to_object).collect();
        let mut inner = Dictionary::new();
        inner.insert("Fields".to_string(), Object::Array(fields));
        let mut catalog = Dictionary::new();
        catalog.insert("FDF".to_string(), Object::Dictionary(inner));

        let serializer = ObjectSerializer::new();
        let mut output = b"%FDF-1.2\n%\xE2\xE3\xCF\xD3\n".to_vec();
        output.extend_from_slice(
            &serializer.serialize_indirect(ObjectRef::new(1, 0), &Object::Dictionary(catalog)),
        );
        output.extend_from_slice(b"trailer\n<< /Root 1 0 R >>\n%%EOF\n");
        output
    }

    /// Write the FDF file to disk.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::decode_text_string;
    use crate::parser::parse_object;

    fn field(name: &str, kind: FieldKind, value: Option<&str>) -> AcroFormField {
        AcroFormField {
            name: name.to_string(),
            kind,
            object_number: 5,
            generation: 0,
            value: value.map(str::to_string),
            on_value: None,
            widgets: Vec::new(),
        }
    }

    fn fields_array(bytes: &[u8]) -> Vec<Object> {
        let start = bytes.windows(5).position(|w| w == b"obj\n<").unwrap() + 4;
        let (_, catalog) = parse_object(&bytes[start..]).unwrap();
        let fdf = catalog.as_dict().unwrap()["FDF"].as_dict().unwrap().clone();
        fdf["Fields"].as_array().unwrap().clone()
    }

    #[test]
    fn test_dotted_names_fold_into_kids() {
        let writer = FdfWriter::from_fields(&[
            field("applicant.name", FieldKind::Text, Some("Ann")),
            field("applicant.veteran", FieldKind::Checkbox, Some("Yes")),
            field("date", FieldKind::Text, None),
        ]);
        assert_eq!(writer.fields().len(), 2);
        assert_eq!(writer.fields()[0].kids.len(), 2);
        assert!(writer.fields()[0].value.is_none());
        assert!(writer.fields()[1].value.is_none());
    }

    #[test]
    fn test_to_bytes_structure() {
        let bytes = FdfWriter::from_fields(&[
            field("a.b", FieldKind::Text, Some("Hi")),
            field("c", FieldKind::Radio, Some("Choice2")),
        ])
        .to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        assert!(text.starts_with("%FDF-1.2\n"));
        assert!(text.contains("1 0 obj\n"));
        assert!(text.ends_with("trailer\n<< /Root 1 0 R >>\n%%EOF\n"));

        let fields = fields_array(&bytes);
        assert_eq!(fields.len(), 2);
        let a = fields[0].as_dict().unwrap();
        assert_eq!(a["T"].as_string().unwrap().bytes, b"a");
        let b = a["Kids"].as_array().unwrap()[0].as_dict().unwrap().clone();
        assert_eq!(b["V"].as_string().unwrap().bytes, vec![0xFE, 0xFF, 0, b'H', 0, b'i']);
        assert_eq!(fields[1].as_dict().unwrap()["V"].as_name(), Some("Choice2"));
    }

    #[test]
    fn test_non_ascii_partial_name() {
        let mut writer = FdfWriter::new();
        writer.add_field("Caf\u{e9}.men\u{fc}", None);
        let fields = fields_array(&writer.to_bytes());

        let cafe = fields[0].as_dict().unwrap();
        let t = cafe["T"].as_string().unwrap();
        assert!(t.is_hex());
        assert_eq!(decode_text_string(&t.bytes), "Caf\u{e9}");
        let menu = cafe["Kids"].as_array().unwrap()[0].as_dict().unwrap().clone();
        assert_eq!(decode_text_string(&menu["T"].as_string().unwrap().bytes), "men\u{fc}");
    }

    #[test]
    fn test_empty_form() {
        let bytes = FdfWriter::new().to_bytes();
        assert!(fields_array(&bytes).is_empty());
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fdf");
        FdfWriter::from_fields(&[field("x", FieldKind::Text, Some("1"))])
            .write_to_file(&path)
            .unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%FDF-1.2"));
    }
}
