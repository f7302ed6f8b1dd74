//! PDF object serialization.
//!
//! Serializes PDF objects to their byte representation according to
//! PDF specification ISO 32000-1:2008. Dictionary keys are written in their stored
//! order and strings keep the syntax they were read in.

use crate::object::{Dictionary, Object, ObjectRef, PdfString, StringFormat};
use std::io::Write;

/// Serializer for PDF objects.
///
/// Converts PDF Object types to their byte representation following
/// the PDF specification syntax rules. Output is single-line with one space
/// between tokens: `<< /T (x) /Kids [4 0 R] >>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Create a new object serializer.
    pub fn new() -> Self {
        Self
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        // io::Write for Vec<u8> never returns Err
        let _ = self.write_object(&mut buf, obj);
        buf
    }

    /// Serialize an object to a string (lossy for non-UTF-8 output).
    pub fn serialize_to_string(&self, obj: &Object) -> String {
        String::from_utf8_lossy(&self.serialize(obj)).into_owned()
    }

    /// Serialize an indirect object definition: `id gen obj ... endobj`.
    pub fn serialize_indirect(&self, obj_ref: ObjectRef, obj: &Object) -> Vec<u8> {
        let mut buf = format!("{} {} obj\n", obj_ref.id, obj_ref.gen).into_bytes();
        buf.extend(self.serialize(obj));
        buf.extend_from_slice(b"\nendobj\n");
        buf
    }

    /// Write an object to a buffer.
    pub fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> std::io::Result<()> {
        match obj {
            Object::Null => write!(w, "null"),
            Object::Boolean(b) => write!(w, "{}", if *b { "true" } else { "false" }),
            Object::Number(n) => self.write_number(w, *n),
            Object::String(s) => self.write_string(w, s),
            Object::Name(n) => self.write_name(w, n),
            Object::Array(arr) => self.write_array(w, arr),
            Object::Dictionary(dict) => self.write_dictionary(w, dict),
            Object::Reference(r) => write!(w, "{} {} R", r.id, r.gen),
        }
    }

    /// Write a number: integral values without a fraction, reals with trailing
    /// zeros trimmed.
    fn write_number<W: Write>(&self, w: &mut W, value: f64) -> std::io::Result<()> {
        if !value.is_finite() {
            return write!(w, "0");
        }
        if value.fract() == 0.0 && value.abs() < 1e15 {
            write!(w, "{}", value as i64)
        } else {
            let formatted = format!("{:.6}", value);
            let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
            write!(w, "{}", if trimmed == "-0" { "0" } else { trimmed })
        }
    }

    /// Write a PDF string in its recorded syntax.
    fn write_string<W: Write>(&self, w: &mut W, s: &PdfString) -> std::io::Result<()> {
        match s.format {
            StringFormat::Literal => {
                write!(w, "(")?;
                for &byte in &s.bytes {
                    match byte {
                        b'(' => write!(w, "\\(")?,
                        b')' => write!(w, "\\)")?,
                        b'\\' => write!(w, "\\\\")?,
                        // A raw CR would be read back as LF
                        b'\r' => write!(w, "\\r")?,
                        _ => w.write_all(&[byte])?,
                    }
                }
                write!(w, ")")
            },
            StringFormat::Hex => {
                write!(w, "<")?;
                for byte in &s.bytes {
                    write!(w, "{:02X}", byte)?;
                }
                write!(w, ">")
            },
        }
    }

    /// Write a PDF name.
    ///
    /// Names start with `/` and escape special characters with `#xx`. Each `char`
    /// of the stored name is one raw byte.
    fn write_name<W: Write>(&self, w: &mut W, name: &str) -> std::io::Result<()> {
        write!(w, "/")?;
        for ch in name.chars() {
            let byte = u32::from(ch).min(0xFF) as u8;
            match byte {
                b'!'
                | b'"'
                | b'$'
                | b'&'
                | b'\''
                | b'*'..=b'.'
                | b'0'..=b'9'
                | b':'
                | b';'
                | b'='
                | b'?'
                | b'@'
                | b'A'..=b'Z'
                | b'\\'
                | b'^'..=b'z'
                | b'|'
                | b'~' => {
                    w.write_all(&[byte])?;
                },
                _ => {
                    write!(w, "#{:02X}", byte)?;
                },
            }
        }
        Ok(())
    }

    /// Write a PDF array.
    fn write_array<W: Write>(&self, w: &mut W, arr: &[Object]) -> std::io::Result<()> {
        write!(w, "[")?;
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            self.write_object(w, obj)?;
        }
        write!(w, "]")
    }

    /// Write a PDF dictionary in key insertion order.
    fn write_dictionary<W: Write>(&self, w: &mut W, dict: &Dictionary) -> std::io::Result<()> {
        write!(w, "<<")?;
        for (key, value) in dict {
            write!(w, " ")?;
            self.write_name(w, key)?;
            write!(w, " ")?;
            self.write_object(w, value)?;
        }
        write!(w, " >>")
    }
}
