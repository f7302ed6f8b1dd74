//! AcroForm filling through incremental updates.
//!
//! The input bytes are never modified. Every changed field dictionary is appended as
//! a new body under its existing object number and generation, followed by a new xref
//! section and a trailer whose `/Prev` chains to the input's own xref.

use crate::document::PdfDocument;
use crate::encoding::encode_text_string;
use crate::error::Result;
use crate::forms::field::{AcroFormField, FieldKind};
use crate::forms::reader::AcroFormReader;
use crate::object::{Dictionary, Object, ObjectRef, PdfString};
use crate::parser_config::ParserOptions;
use crate::writer::IncrementalUpdate;
use std::collections::{HashMap, HashSet};

/// Values that switch a checkbox or radio button on. Matching is case-sensitive.
pub const TRUTHY_VALUES: [&str; 4] = ["1", "true", "True", "yes"];

/// Appearance state of an unchecked button.
const OFF: &str = "Off";

/// Whether a fill value turns a button on.
///
/// ```
/// # use pdf_acroform::forms::writer::is_truthy;
/// assert!(is_truthy("1"));
/// assert!(is_truthy("True"));
/// assert!(!is_truthy("YES"));
/// assert!(!is_truthy("Off"));
/// ```
pub fn is_truthy(value: &str) -> bool {
    TRUTHY_VALUES.contains(&value)
}

/// Fills form fields by appending an incremental update.
///
/// # Example
///
/// ```no_run
/// use pdf_acroform::forms::AcroFormWriter;
///
/// let template = std::fs::read("template.pdf")?;
/// let filled = AcroFormWriter::new().fill_fields(
///     &template,
///     [("Name", "Doe, John E."), ("IsVeteran", "1")],
/// )?;
/// std::fs::write("filled.pdf", filled)?;
/// # Ok::<(), pdf_acroform::error::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct AcroFormWriter {
    options: ParserOptions,
}

impl AcroFormWriter {
    /// Create a writer with default parser options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer that parses its input with custom options.
    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Fill fields and return the updated file.
    ///
    /// Names are matched case-insensitively against fully-qualified field names.
    /// Unknown names, inline fields and fields of unknown type are skipped. When
    /// nothing is left to update, the input is returned unchanged.
    ///
    /// # Errors
    ///
    /// Structural failures while reading the input (see [`PdfDocument::parse`] and
    /// [`AcroFormReader::read_fields`]).
    pub fn fill_fields<I, K, V>(&self, input: &[u8], values: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let requested: HashMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_lowercase(), v.as_ref().to_string()))
            .collect();
        if requested.is_empty() {
            return Ok(input.to_vec());
        }

        let doc = PdfDocument::parse_with_options(input, self.options)?;
        let reader = AcroFormReader::new(&doc);
        let fields = reader.read_fields()?;
        let (acroform_ref, acroform) = reader.acroform()?;

        let mut update = IncrementalUpdate::new(input);
        let mut matched = HashSet::new();

        for field in &fields {
            let key = field.name.to_lowercase();
            let Some(value) = requested.get(&key) else {
                continue;
            };
            matched.insert(key);

            let Some(field_ref) = field.object_ref() else {
                log::warn!("Field '{}' is inline and cannot be updated", field.name);
                continue;
            };
            if field.kind == FieldKind::Unknown {
                log::warn!("Field '{}' has an unknown type, not updating", field.name);
                continue;
            }
            if let Err(e) = self.update_field(&doc, &mut update, field, field_ref, value) {
                log::warn!("Skipping field '{}': {}", field.name, e);
            }
        }

        for name in requested.keys().filter(|k| !matched.contains(*k)) {
            log::warn!("No field named '{}'", name);
        }

        if update.is_empty() {
            log::info!("No fields updated, returning input unchanged");
            return Ok(input.to_vec());
        }

        if let Some(acroform_ref) = acroform_ref {
            let mut acroform = acroform;
            acroform.insert("NeedAppearances".to_string(), Object::Boolean(true));
            update.add_object(acroform_ref, &Object::Dictionary(acroform));
        }

        let count = update.len();
        let output = update.finish(doc.trailer(), doc.xref().size(), doc.startxref());
        log::info!(
            "Filled {} of {} requested fields ({} objects, {} -> {} bytes)",
            matched.len(),
            requested.len(),
            count,
            input.len(),
            output.len()
        );
        Ok(output)
    }

    fn update_field(
        &self,
        doc: &PdfDocument<'_>,
        update: &mut IncrementalUpdate,
        field: &AcroFormField,
        field_ref: ObjectRef,
        value: &str,
    ) -> Result<()> {
        let original = doc.load_dictionary(field_ref)?;
        let button = field.kind.is_button();

        let mut dict: Dictionary = original
            .into_iter()
            .filter(|(key, _)| key != "V" && key != "AS" && (button || key != "AP"))
            .collect();

        if button {
            let state = if is_truthy(value) {
                field.on_value.clone().unwrap_or_else(|| "Yes".to_string())
            } else {
                OFF.to_string()
            };
            dict.insert("V".to_string(), Object::Name(state.clone()));
            dict.insert("AS".to_string(), Object::Name(state.clone()));
            update.add_object(field_ref, &Object::Dictionary(dict));

            for widget in field.widgets.iter().filter(|w| **w != field_ref) {
                match doc.load_dictionary(*widget) {
                    Ok(widget_dict) => update.add_object(*widget, &Object::Dictionary(widget_state(doc, widget_dict, &state))),
                    Err(e) => log::warn!("Widget {} of '{}' not updated: {}", widget, field.name, e),
                }
            }
            log::debug!("'{}' -> /{}", field.name, state);
        } else {
            let encoded = PdfString::hex(encode_text_string(value));
            dict.insert("V".to_string(), Object::String(encoded));
            update.add_object(field_ref, &Object::Dictionary(dict));
            log::debug!("'{}' -> {:?}", field.name, value);
        }

        Ok(())
    }
}

/// Copy of a widget with `/AS` set to `state` when it has that appearance, else `/Off`.
fn widget_state(doc: &PdfDocument<'_>, mut widget: Dictionary, state: &str) -> Dictionary {
    let has_state = widget
        .get("AP")
        .and_then(|ap| doc.resolve(ap).ok())
        .and_then(|ap| ap.as_dict().and_then(|d| d.get("N")).cloned())
        .and_then(|n| doc.resolve(&n).ok().map(|n| n.into_owned()))
        .and_then(|n| n.as_dict().map(|states| states.contains_key(state)))
        .unwrap_or(false);

    let new_state = if has_state { state } else { OFF };
    widget.insert("AS".to_string(), Object::Name(new_state.to_string()));
    widget
}
