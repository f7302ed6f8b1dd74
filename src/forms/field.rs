//! Form field model produced by the AcroForm reader.

use crate::object::ObjectRef;
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Field flags (`/Ff`) consulted when classifying button fields.
    ///
    /// Either radio marker classifies a button as a radio group. Producers that
    /// count bits from 1 set bit 15 (`1 << 14`); ISO 32000-1 Table 226 places the
    /// flag at bit 16 (`1 << 15`). Most radio groups carry both (`/Ff 49152`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u32 {
        /// Radio marker at bit 15
        const RADIO = 1 << 14;
        /// Radio marker at bit 16 (ISO 32000-1 numbering)
        const RADIO_ISO = 1 << 15;
    }
}

impl FieldFlags {
    /// Flags from a raw `/Ff` value. Unknown bits are kept.
    pub fn from_ff(ff: i64) -> Self {
        Self::from_bits_retain(ff as u32)
    }

    /// Whether either radio marker is set.
    pub fn is_radio(self) -> bool {
        self.intersects(FieldFlags::RADIO | FieldFlags::RADIO_ISO)
    }
}

/// Field classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// `/FT /Tx`
    Text,
    /// `/FT /Btn` without the radio flag
    Checkbox,
    /// `/FT /Btn` with the radio flag
    Radio,
    /// `/FT /Ch`
    Choice,
    /// Absent or unrecognized `/FT`
    Unknown,
}

impl FieldKind {
    /// Classify a field from its (possibly inherited) `/FT` and `/Ff`.
    ///
    /// ```
    /// # use pdf_acroform::forms::{FieldFlags, FieldKind};
    /// assert_eq!(FieldKind::classify(Some("Btn"), FieldFlags::from_ff(16384)), FieldKind::Radio);
    /// assert_eq!(FieldKind::classify(Some("Btn"), FieldFlags::from_ff(49152)), FieldKind::Radio);
    /// assert_eq!(FieldKind::classify(Some("Btn"), FieldFlags::empty()), FieldKind::Checkbox);
    /// assert_eq!(FieldKind::classify(Some("Sig"), FieldFlags::empty()), FieldKind::Unknown);
    /// ```
    pub fn classify(field_type: Option<&str>, flags: FieldFlags) -> Self {
        match field_type {
            Some("Tx") => FieldKind::Text,
            Some("Ch") => FieldKind::Choice,
            Some("Btn") if flags.is_radio() => FieldKind::Radio,
            Some("Btn") => FieldKind::Checkbox,
            _ => FieldKind::Unknown,
        }
    }

    /// Checkbox and radio fields take named states instead of text.
    pub fn is_button(self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Choice => "choice",
            FieldKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A terminal form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcroFormField {
    /// Fully-qualified dotted name
    pub name: String,
    /// Classification
    pub kind: FieldKind,
    /// Object number of the field dictionary (0 for inline fields)
    pub object_number: u32,
    /// Generation of the field dictionary
    pub generation: u16,
    /// Decoded `/V`
    pub value: Option<String>,
    /// Appearance state meaning "checked" (button fields only)
    pub on_value: Option<String>,
    /// Widget annotations listed in the field's `/Kids`
    pub widgets: Vec<ObjectRef>,
}

impl AcroFormField {
    /// Whether the field is an indirect object the writer can replace.
    pub fn is_addressable(&self) -> bool {
        self.object_number != 0
    }

    /// Reference to the field dictionary, if it is an indirect object.
    pub fn object_ref(&self) -> Option<ObjectRef> {
        self.is_addressable()
            .then(|| ObjectRef::new(self.object_number, self.generation))
    }
}
