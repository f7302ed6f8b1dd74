//! Incremental update assembly.
//!
//! An incremental update leaves the original bytes untouched and appends:
//!
//! ```text
//! <original bytes>
//! 12 0 obj ... endobj          % replacement objects
//! xref
//! 12 1                         % contiguous subsections
//! 0000001234 00000 n\r\n
//! trailer
//! << /Size .. /Prev <old startxref> /Root .. /Info .. /ID .. >>
//! startxref
//! <offset of the new xref>
//! %%EOF
//! ```

use crate::object::{Dictionary, Object, ObjectRef};
use crate::writer::object_serializer::ObjectSerializer;

/// Trailer keys carried over from the previous trailer.
const COPIED_TRAILER_KEYS: [&str; 3] = ["Root", "Info", "ID"];

/// Builder for one incremental update section.
#[derive(Debug)]
pub struct IncrementalUpdate {
    out: Vec<u8>,
    entries: Vec<(ObjectRef, usize)>,
    serializer: ObjectSerializer,
}

impl IncrementalUpdate {
    /// Start an update on top of `original`.
    ///
    /// If the original does not end in CR or LF, a single `\n` is appended so the
    /// first new object starts on its own line.
    pub fn new(original: &[u8]) -> Self {
        let mut out = Vec::with_capacity(original.len() + 4096);
        out.extend_from_slice(original);
        if !matches!(original.last(), Some(b'\n' | b'\r')) {
            out.push(b'\n');
        }
        Self {
            out,
            entries: Vec::new(),
            serializer: ObjectSerializer::new(),
        }
    }

    /// Append a replacement body for `obj_ref` at the current write position.
    ///
    /// Writing the same object number twice keeps only the later xref entry.
    pub fn add_object(&mut self, obj_ref: ObjectRef, obj: &Object) {
        let offset = self.out.len();
        self.out.extend_from_slice(&self.serializer.serialize_indirect(obj_ref, obj));
        self.entries.retain(|(existing, _)| existing.id != obj_ref.id);
        self.entries.push((obj_ref, offset));
        log::debug!("Appended {} at {}", obj_ref, offset);
    }

    /// Number of objects appended so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no object has been appended.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the xref section and trailer and return the complete file.
    ///
    /// * `previous_trailer` - trailer of the file being updated (`/Root`, `/Info` and
    ///   `/ID` are copied)
    /// * `size` - the previous `/Size` watermark
    /// * `prev_startxref` - offset of the previous xref section, written as `/Prev`
    pub fn finish(mut self, previous_trailer: &Dictionary, size: u32, prev_startxref: usize) -> Vec<u8> {
        self.entries.sort_by_key(|(r, _)| r.id);

        let xref_offset = self.out.len();
        self.out.extend_from_slice(b"xref\n");
        for run in contiguous_runs(&self.entries) {
            let start = run[0].0.id;
            self.out.extend_from_slice(format!("{} {}\n", start, run.len()).as_bytes());
            for (obj_ref, offset) in run {
                self.out
                    .extend_from_slice(format!("{:010} {:05} n\r\n", offset, obj_ref.gen).as_bytes());
            }
        }

        let highest = self.entries.last().map_or(0, |(r, _)| r.id.saturating_add(1));
        let mut trailer = Dictionary::new();
        trailer.insert("Size".to_string(), Object::from(i64::from(size.max(highest))));
        trailer.insert("Prev".to_string(), Object::from(prev_startxref as i64));
        for key in COPIED_TRAILER_KEYS {
            if let Some(value) = previous_trailer.get(key) {
                trailer.insert(key.to_string(), value.clone());
            }
        }

        self.out.extend_from_slice(b"trailer\n");
        self.out
            .extend_from_slice(&self.serializer.serialize(&Object::Dictionary(trailer)));
        self.out
            .extend_from_slice(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes());

        log::debug!(
            "Incremental update: {} objects, xref at {}, /Prev {}",
            self.entries.len(),
            xref_offset,
            prev_startxref
        );
        self.out
    }
}

/// Split entries sorted by object number into runs of consecutive numbers.
fn contiguous_runs(entries: &[(ObjectRef, usize)]) -> Vec<&[(ObjectRef, usize)]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=entries.len() {
        if i == entries.len() || entries[i].0.id != entries[i - 1].0.id + 1 {
            if start < i {
                runs.push(&entries[start..i]);
            }
            start = i;
        }
    }
    runs
}
