//! AcroForm field extraction.
//!
//! Walks the interactive form field tree (ISO 32000-1:2008, Section 12.7) from
//! `/Root /AcroForm /Fields` down to the terminal fields and reports each one with
//! its fully-qualified name, classification, value and on-state.
//!
//! Missing `/AcroForm` or `/Fields` fails the whole read. Anything wrong inside the
//! tree (a dangling reference, a cycle, a branch deeper than the configured limit)
//! only drops that branch.

use crate::document::PdfDocument;
use crate::encoding::decode_text_string;
use crate::error::{Error, Result};
use crate::forms::field::{AcroFormField, FieldFlags, FieldKind};
use crate::object::{Dictionary, Object, ObjectRef};
use std::borrow::Cow;
use std::collections::HashSet;

/// On-state assumed when a button has no appearance states besides `/Off`.
const DEFAULT_ON_VALUE: &str = "Yes";

/// Reads the field list of a parsed document.
///
/// # Example
///
/// ```no_run
/// use pdf_acroform::document::PdfDocument;
/// use pdf_acroform::forms::AcroFormReader;
///
/// let bytes = std::fs::read("form.pdf")?;
/// let doc = PdfDocument::parse(&bytes)?;
/// for field in AcroFormReader::new(&doc).read_fields()? {
///     println!("{} ({}) = {:?}", field.name, field.kind, field.value);
/// }
/// # Ok::<(), pdf_acroform::error::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AcroFormReader<'d, 'a> {
    doc: &'d PdfDocument<'a>,
}

/// Attributes passed from a field node to its kids.
struct Inherited<'p> {
    name: &'p str,
    field_type: Option<String>,
    flags: FieldFlags,
}

/// State of one `read_fields` call.
struct Walk<'d, 'a> {
    doc: &'d PdfDocument<'a>,
    visited: HashSet<u32>,
    max_depth: usize,
    fields: Vec<AcroFormField>,
}

impl<'d, 'a> AcroFormReader<'d, 'a> {
    /// Create a reader over a parsed document.
    pub fn new(doc: &'d PdfDocument<'a>) -> Self {
        Self { doc }
    }

    /// Offset used for errors about the catalog's contents.
    fn catalog_offset(&self) -> usize {
        self.doc
            .root_ref()
            .ok()
            .and_then(|r| self.doc.offset_of(r))
            .unwrap_or_else(|| self.doc.startxref())
    }

    /// The AcroForm dictionary and its reference (`None` when inline).
    ///
    /// # Errors
    ///
    /// [`Error::ParseError`] at the catalog's offset if the catalog has no usable
    /// `/AcroForm`.
    pub fn acroform(&self) -> Result<(Option<ObjectRef>, Dictionary)> {
        let catalog = self.doc.catalog()?;
        let at = self.catalog_offset();

        match catalog.get("AcroForm") {
            Some(Object::Reference(r)) => match self.doc.load_object(*r) {
                Ok(Object::Dictionary(dict)) => Ok((Some(*r), dict)),
                Ok(other) => Err(Error::parse(at, format!("/AcroForm is a {}", other.type_name()))),
                Err(e) => Err(Error::parse(at, format!("/AcroForm {} cannot be loaded: {}", r, e))),
            },
            Some(Object::Dictionary(dict)) => Ok((None, dict.clone())),
            Some(other) => Err(Error::parse(at, format!("/AcroForm is a {}", other.type_name()))),
            None => Err(Error::parse(at, "catalog has no /AcroForm")),
        }
    }

    /// Object number of the AcroForm dictionary, or 0 if it is inline.
    pub fn acroform_object_number(&self) -> Result<u32> {
        Ok(self.acroform()?.0.map_or(0, |r| r.id))
    }

    /// Read every terminal field in tree order.
    ///
    /// # Errors
    ///
    /// [`Error::ParseError`] if `/Root`, `/AcroForm` or `/Fields` is missing.
    pub fn read_fields(&self) -> Result<Vec<AcroFormField>> {
        let (acroform_ref, acroform) = self.acroform()?;
        let at = acroform_ref
            .and_then(|r| self.doc.offset_of(r))
            .unwrap_or_else(|| self.catalog_offset());

        let fields_obj = acroform
            .get("Fields")
            .ok_or_else(|| Error::parse(at, "/AcroForm has no /Fields"))?;
        let fields = self
            .doc
            .resolve(fields_obj)
            .map_err(|e| Error::parse(at, format!("/Fields cannot be loaded: {}", e)))?;
        let roots = fields
            .as_array()
            .ok_or_else(|| Error::parse(at, format!("/Fields is a {}", fields.type_name())))?;

        let mut walk = Walk {
            doc: self.doc,
            visited: HashSet::new(),
            max_depth: self.doc.options().max_field_depth,
            fields: Vec::new(),
        };
        let top = Inherited {
            name: "",
            field_type: None,
            flags: FieldFlags::empty(),
        };
        for node in roots {
            walk.visit(node, &top, 0);
        }

        log::debug!("Read {} form fields", walk.fields.len());
        Ok(walk.fields)
    }
}

impl Walk<'_, '_> {
    fn visit(&mut self, node: &Object, parent: &Inherited<'_>, depth: usize) {
        if depth >= self.max_depth {
            log::warn!("Field tree deeper than {} under '{}', skipping branch", self.max_depth, parent.name);
            return;
        }

        let (obj_ref, dict): (Option<ObjectRef>, Cow<'_, Dictionary>) = match node {
            Object::Reference(r) => {
                if !self.visited.insert(r.id) {
                    log::warn!("Field {} already visited (cycle), skipping", r);
                    return;
                }
                match self.doc.load_dictionary(*r) {
                    Ok(dict) => (Some(*r), Cow::Owned(dict)),
                    Err(e) => {
                        log::warn!("Skipping field {}: {}", r, e);
                        return;
                    },
                }
            },
            Object::Dictionary(dict) => (None, Cow::Borrowed(dict)),
            other => {
                log::warn!("Skipping field node of type {}", other.type_name());
                return;
            },
        };

        let partial = self.partial_name(&dict);
        let name = join_name(parent.name, &partial);
        let field_type = dict
            .get("FT")
            .and_then(|ft| self.doc.resolve(ft).ok())
            .and_then(|ft| ft.as_name().map(str::to_string))
            .or_else(|| parent.field_type.clone());
        let flags = dict
            .get("Ff")
            .and_then(|ff| self.doc.resolve(ff).ok())
            .and_then(|ff| ff.as_integer())
            .map_or(parent.flags, FieldFlags::from_ff);

        let kids = self.kids(&dict);
        let mut widgets = Vec::new();
        let mut appearance_source: Option<Dictionary> = None;

        if let Some(first) = kids.first() {
            let first_dict = self.peek_dictionary(first);
            let widget_kids = first_dict
                .as_ref()
                .is_some_and(|d| d.get("Subtype").and_then(Object::as_name) == Some("Widget") && !d.contains_key("T"));

            if !widget_kids {
                let inherited = Inherited {
                    name: &name,
                    field_type,
                    flags,
                };
                for kid in &kids {
                    self.visit(kid, &inherited, depth + 1);
                }
                return;
            }

            log::debug!("'{}' has {} widget kids, treating as terminal", name, kids.len());
            widgets = kids.iter().filter_map(Object::as_reference).collect();
            appearance_source = first_dict;
        }

        if name.is_empty() {
            log::warn!("Skipping terminal field without a name ({:?})", obj_ref);
            return;
        }

        let kind = FieldKind::classify(field_type.as_deref(), flags);
        let value = dict.get("V").and_then(|v| self.decode_value(v));
        let on_value = kind.is_button().then(|| {
            self.on_state(&dict)
                .or_else(|| appearance_source.as_ref().and_then(|w| self.on_state(w)))
                .unwrap_or_else(|| DEFAULT_ON_VALUE.to_string())
        });

        self.fields.push(AcroFormField {
            name,
            kind,
            object_number: obj_ref.map_or(0, |r| r.id),
            generation: obj_ref.map_or(0, |r| r.gen),
            value,
            on_value,
            widgets,
        });
    }

    /// Decoded `/T`, empty when absent.
    fn partial_name(&self, dict: &Dictionary) -> String {
        let Some(t) = dict.get("T") else {
            return String::new();
        };
        match self.doc.resolve(t).as_deref() {
            Ok(Object::String(s)) => decode_text_string(&s.bytes),
            Ok(Object::Name(n)) => n.clone(),
            _ => String::new(),
        }
    }

    /// `/Kids` resolved one level, empty when absent or unusable.
    fn kids(&self, dict: &Dictionary) -> Vec<Object> {
        let Some(kids) = dict.get("Kids") else {
            return Vec::new();
        };
        match self.doc.resolve(kids) {
            Ok(resolved) => match resolved.into_owned() {
                Object::Array(items) => items,
                other => {
                    log::warn!("/Kids is a {}, ignoring", other.type_name());
                    Vec::new()
                },
            },
            Err(e) => {
                log::warn!("/Kids cannot be loaded: {}", e);
                Vec::new()
            },
        }
    }

    /// Load a kid without marking it visited.
    fn peek_dictionary(&self, node: &Object) -> Option<Dictionary> {
        match self.doc.resolve(node).ok()?.into_owned() {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// First non-`Off` state under `/AP /N`.
    fn on_state(&self, dict: &Dictionary) -> Option<String> {
        let ap = self.doc.resolve(dict.get("AP")?).ok()?;
        let normal = self.doc.resolve(ap.as_dict()?.get("N")?).ok()?;
        let states = normal.as_dict()?;
        states.keys().find(|k| k.as_str() != "Off").cloned()
    }

    fn decode_value(&self, value: &Object) -> Option<String> {
        let value = self.doc.resolve(value).ok()?;
        match &*value {
            Object::Array(items) => {
                let parts: Vec<String> = items.iter().filter_map(|item| self.decode_value(item)).collect();
                Some(parts.join(", "))
            },
            other => decode_scalar(other),
        }
    }
}

fn decode_scalar(value: &Object) -> Option<String> {
    match value {
        Object::String(s) => Some(decode_text_string(&s.bytes)),
        Object::Name(n) => Some(n.clone()),
        Object::Boolean(b) => Some(b.to_string()),
        Object::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
        Object::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Join a parent name and a partial name with `.`, skipping empty segments.
fn join_name(parent: &str, partial: &str) -> String {
    match (parent.is_empty(), partial.is_empty()) {
        (true, _) => partial.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}.{}", parent, partial),
    }
}
