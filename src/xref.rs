//! Cross-reference table parser.
//!
//! The xref table maps object numbers to byte offsets in the PDF file, enabling random
//! access to PDF objects. Only classic `xref` tables are read; a cross-reference stream
//! at the `startxref` offset is reported as [`Error::Unsupported`].
//!
//! Incrementally updated files carry several sections chained through `/Prev`. They
//! are merged into one table in which the newest section wins for each object number.

use crate::error::{Error, Result};
use crate::lexer::{skip_ws, token, Token};
use crate::object::{Dictionary, Object};
use crate::parser::{parse_indirect_header, parse_object_at};
use crate::parser_config::ParserOptions;
use std::collections::{BTreeMap, HashSet};

/// Upper bound on entries in one subsection.
const MAX_SUBSECTION_COUNT: u32 = 1_000_000;

/// Cross-reference table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    /// Byte offset of the object (next free object number for free entries)
    pub offset: u64,
    /// Generation number
    pub generation: u16,
    /// Whether the object is in use (`n`) or free (`f`)
    pub in_use: bool,
}

impl XRefEntry {
    /// Create a new entry.
    pub fn new(offset: u64, generation: u16, in_use: bool) -> Self {
        Self {
            offset,
            generation,
            in_use,
        }
    }

    /// Placeholder for an entry that could not be read.
    pub fn free() -> Self {
        Self::new(0, 65535, false)
    }
}

/// Cross-reference table that maps object numbers to their locations.
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: BTreeMap<u32, XRefEntry>,
    trailer: Dictionary,
    offset: usize,
}

impl CrossRefTable {
    /// Create a new empty cross-reference table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any existing entry for the same object number.
    pub fn add_entry(&mut self, object_number: u32, entry: XRefEntry) {
        self.entries.insert(object_number, entry);
    }

    /// Get an entry by object number.
    pub fn get(&self, object_number: u32) -> Option<&XRefEntry> {
        self.entries.get(&object_number)
    }

    /// Check if an object exists in the xref table.
    pub fn contains(&self, object_number: u32) -> bool {
        self.entries.contains_key(&object_number)
    }

    /// Get the number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merged trailer dictionary (newest section first).
    pub fn trailer(&self) -> &Dictionary {
        &self.trailer
    }

    /// Byte offset of the newest xref section, i.e. the file's `startxref` value.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Next free object number: the larger of `/Size` and the highest entry + 1.
    pub fn size(&self) -> u32 {
        let declared = self
            .trailer
            .get("Size")
            .and_then(Object::as_integer)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);
        let observed = self.entries.keys().next_back().map_or(0, |n| n.saturating_add(1));
        declared.max(observed)
    }

    /// Merge an older section into this one.
    ///
    /// Existing entries win. Trailer keys missing here are filled from the older
    /// trailer, except `/Prev`.
    pub fn merge_from(&mut self, older: CrossRefTable) {
        for (num, entry) in older.entries {
            self.entries.entry(num).or_insert(entry);
        }
        for (key, value) in older.trailer {
            if key != "Prev" && !self.trailer.contains_key(&key) {
                self.trailer.insert(key, value);
            }
        }
    }
}

/// Find the byte offset recorded after the last `startxref` keyword.
///
/// Only the final `window` bytes of `data` are searched.
///
/// # Errors
///
/// Returns [`Error::InvalidXref`] if the keyword is missing or not followed by an
/// unsigned integer.
pub fn find_xref_offset(data: &[u8], window: usize) -> Result<usize> {
    const KEYWORD: &[u8] = b"startxref";

    let start = data.len().saturating_sub(window);
    let tail = &data[start..];
    let pos = tail
        .windows(KEYWORD.len())
        .rposition(|w| w == KEYWORD)
        .map(|p| start + p)
        .ok_or(Error::InvalidXref { offset: data.len() })?;

    let after = pos + KEYWORD.len();
    match token(&data[after..]) {
        Ok((_, Token::Integer(n))) if n >= 0 => Ok(n as usize),
        _ => Err(Error::InvalidXref { offset: after }),
    }
}

/// Parse the xref section at `offset` and every older section reachable through
/// `/Prev`.
///
/// # Errors
///
/// - [`Error::InvalidXref`] if `offset` does not hold an `xref` keyword
/// - [`Error::Unsupported`] if it holds a cross-reference stream
/// - [`Error::ParseError`] for malformed subsections or trailers, a `/Prev` loop, or a
///   chain longer than `options.max_xref_chain`
pub fn parse_xref(data: &[u8], offset: usize, options: &ParserOptions) -> Result<CrossRefTable> {
    let mut table = parse_section(data, offset, options)?;
    table.offset = offset;

    let mut visited = HashSet::from([offset]);
    let mut next = prev_offset(&table.trailer, offset)?;

    while let Some(prev) = next {
        if !visited.insert(prev) {
            return Err(Error::parse(prev, "xref /Prev chain loops"));
        }
        if visited.len() > options.max_xref_chain {
            return Err(Error::parse(
                prev,
                format!("xref /Prev chain longer than {}", options.max_xref_chain),
            ));
        }
        log::debug!("Following /Prev to xref section at {}", prev);

        let older = parse_section(data, prev, options)?;
        next = prev_offset(&older.trailer, prev)?;
        table.merge_from(older);
    }

    Ok(table)
}

fn prev_offset(trailer: &Dictionary, section_offset: usize) -> Result<Option<usize>> {
    match trailer.get("Prev") {
        None => Ok(None),
        Some(obj) => match obj.as_integer() {
            Some(n) if n >= 0 => Ok(Some(n as usize)),
            _ => Err(Error::parse(section_offset, "trailer /Prev is not a byte offset")),
        },
    }
}

/// Offset of the first non-whitespace byte at or after `pos`.
fn skip_ws_at(data: &[u8], pos: usize) -> usize {
    match skip_ws(&data[pos.min(data.len())..]) {
        Ok((rest, _)) => data.len() - rest.len(),
        Err(_) => pos,
    }
}

/// End of the line starting at `pos` (exclusive, before the EOL bytes).
fn line_end(data: &[u8], pos: usize) -> usize {
    data[pos..]
        .iter()
        .position(|&c| c == b'\r' || c == b'\n')
        .map_or(data.len(), |p| pos + p)
}

fn read_unsigned(data: &[u8], pos: usize) -> Option<(u64, usize)> {
    match token(&data[pos..]) {
        Ok((rest, Token::Integer(n))) if n >= 0 => Some((n as u64, data.len() - rest.len())),
        _ => None,
    }
}

/// Parse one `xref ... trailer << ... >>` section.
fn parse_section(data: &[u8], offset: usize, options: &ParserOptions) -> Result<CrossRefTable> {
    if offset >= data.len() {
        return Err(Error::InvalidXref { offset });
    }
    let mut pos = skip_ws_at(data, offset);

    if !data[pos..].starts_with(b"xref") {
        if parse_indirect_header(&data[pos..]).is_ok() {
            return Err(Error::Unsupported(format!(
                "cross-reference stream at byte {}",
                offset
            )));
        }
        return Err(Error::InvalidXref { offset });
    }
    pos += 4;
    log::debug!("Parsing xref section at {}", offset);

    let mut table = CrossRefTable::new();

    loop {
        pos = skip_ws_at(data, pos);
        if pos >= data.len() {
            return Err(Error::parse(pos, "xref section has no trailer"));
        }
        if data[pos..].starts_with(b"trailer") {
            pos += 7;
            break;
        }

        let (start, after_start) =
            read_unsigned(data, pos).ok_or_else(|| Error::parse(pos, "bad xref subsection header"))?;
        let (count, after_count) = read_unsigned(data, after_start)
            .ok_or_else(|| Error::parse(after_start, "bad xref subsection count"))?;
        let start = u32::try_from(start).map_err(|_| Error::parse(pos, "xref object number overflow"))?;
        let count = u32::try_from(count)
            .ok()
            .filter(|c| *c <= MAX_SUBSECTION_COUNT)
            .ok_or_else(|| Error::parse(after_start, "xref subsection count exceeds limit"))?;
        pos = after_count;

        for i in 0..count {
            pos = skip_ws_at(data, pos);
            if pos >= data.len() || data[pos..].starts_with(b"trailer") {
                log::warn!("Expected {} xref entries at {} but found only {}", count, offset, i);
                break;
            }
            let end = line_end(data, pos);
            let object_number = start.saturating_add(i);

            match parse_entry(&data[pos..end]) {
                Some(entry) => table.add_entry(object_number, entry),
                None if options.strict => {
                    return Err(Error::parse(pos, format!("malformed xref entry for object {}", object_number)));
                },
                None => {
                    log::warn!(
                        "Malformed xref entry for object {} at {}: {:?}",
                        object_number,
                        pos,
                        String::from_utf8_lossy(&data[pos..end])
                    );
                    table.add_entry(object_number, XRefEntry::free());
                },
            }
            pos = end;
        }
    }

    let trailer_pos = skip_ws_at(data, pos);
    let (trailer, _) = parse_object_at(data, trailer_pos, options.max_nesting)?;
    table.trailer = match trailer {
        Object::Dictionary(dict) => dict,
        other => {
            return Err(Error::parse(
                trailer_pos,
                format!("trailer is a {}, not a dictionary", other.type_name()),
            ))
        },
    };

    Ok(table)
}

/// Parse `nnnnnnnnnn ggggg n` (extra trailing fields are ignored).
fn parse_entry(line: &[u8]) -> Option<XRefEntry> {
    let text = std::str::from_utf8(line).ok()?;
    let mut parts = text.split_ascii_whitespace();
    let offset: u64 = parts.next()?.parse().ok()?;
    let generation: u16 = parts.next()?.parse().ok()?;
    let in_use = match parts.next()?.as_bytes().first()? {
        b'n' | b'N' => true,
        b'f' | b'F' => false,
        _ => return None,
    };
    Some(XRefEntry::new(offset, generation, in_use))
}
