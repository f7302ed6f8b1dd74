//! PDF object parser.
//!
//! Combines lexer tokens into complete objects by recursive descent:
//! 1. Read a token
//! 2. Decide from the token what kind of object starts here
//! 3. For arrays and dictionaries, recurse into the contents
//!
//! Nesting is bounded by a depth limit so adversarial input cannot exhaust the
//! stack. A dictionary followed by `stream` yields just the dictionary; stream bodies
//! are never read.

use crate::error::{Error, Result};
use crate::lexer::{token, Token};
use crate::object::{Dictionary, Object, ObjectRef, PdfString};
use nom::error::ErrorKind;
use nom::IResult;

/// Default maximum nesting depth for arrays and dictionaries.
pub const DEFAULT_MAX_NESTING: usize = 100;

/// Decode escape sequences in PDF literal strings.
///
/// Handles the escapes from ISO 32000-1:2008, Section 7.3.4.2:
///
/// - `\n`, `\r`, `\t`, `\b`, `\f`
/// - `\(`, `\)`, `\\`
/// - `\ddd` octal with 1 to 3 digits (high-order overflow ignored)
/// - `\<EOL>` line continuation (removed)
///
/// An unescaped CR or CRLF inside the string reads as a single LF. Unknown escapes
/// drop the backslash.
///
/// ```
/// # use pdf_acroform::parser::decode_literal_string_escapes;
/// assert_eq!(decode_literal_string_escapes(b"Section \\247 71.01"), b"Section \xa7 71.01");
/// assert_eq!(decode_literal_string_escapes(b"a\r\nb"), b"a\nb");
/// ```
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        match raw[i] {
            b'\\' if i + 1 < raw.len() => {
                i += 1;
                match raw[i] {
                    b'n' => result.push(b'\n'),
                    b'r' => result.push(b'\r'),
                    b't' => result.push(b'\t'),
                    b'b' => result.push(0x08),
                    b'f' => result.push(0x0C),
                    b'\n' => {},
                    b'\r' => {
                        if raw.get(i + 1) == Some(&b'\n') {
                            i += 1;
                        }
                    },
                    b'0'..=b'7' => {
                        let mut value = 0u32;
                        let mut len = 0;
                        while len < 3 && i + len < raw.len() && (b'0'..=b'7').contains(&raw[i + len]) {
                            value = value * 8 + u32::from(raw[i + len] - b'0');
                            len += 1;
                        }
                        result.push((value & 0xFF) as u8);
                        i += len;
                        continue;
                    },
                    // \( \) \\ and any unknown escape: keep the character, drop the backslash
                    other => result.push(other),
                }
                i += 1;
            },
            b'\r' => {
                result.push(b'\n');
                i += 1;
                if raw.get(i) == Some(&b'\n') {
                    i += 1;
                }
            },
            c => {
                result.push(c);
                i += 1;
            },
        }
    }

    result
}

/// Decode a hex string body into bytes.
///
/// Whitespace is ignored. An odd number of digits is completed with a trailing `0`.
///
/// # Errors
///
/// Returns [`Error::ParseError`] at offset 0 of the body if a non-hex, non-whitespace
/// byte is found. The lexer never produces such bodies.
pub fn decode_hex(hex_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut digits = Vec::with_capacity(hex_bytes.len());
    for (pos, &c) in hex_bytes.iter().enumerate() {
        if crate::lexer::is_whitespace(c) {
            continue;
        }
        match (c as char).to_digit(16) {
            Some(d) => digits.push(d as u8),
            None => return Err(Error::parse(pos, format!("invalid hex digit {:?}", c as char))),
        }
    }
    if digits.len() % 2 == 1 {
        digits.push(0);
    }

    Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

fn fail(input: &[u8], kind: ErrorKind) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Error(nom::error::Error::new(input, kind))
}

/// Parse a PDF object from input bytes with the default nesting limit.
///
/// ```
/// use pdf_acroform::parser::parse_object;
///
/// let (_, obj) = parse_object(b"[ 1 2 /Name 3 0 R ]").unwrap();
/// assert_eq!(obj.as_array().map(Vec::len), Some(4));
/// ```
pub fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    parse_object_with_limit(input, DEFAULT_MAX_NESTING)
}

/// Parse a PDF object, allowing at most `max_nesting` levels of arrays and dictionaries.
///
/// Exceeding the limit fails with nom's `ErrorKind::TooLarge`.
pub fn parse_object_with_limit(input: &[u8], max_nesting: usize) -> IResult<&[u8], Object> {
    parse_value(input, 0, max_nesting)
}

fn parse_value(input: &[u8], depth: usize, max_nesting: usize) -> IResult<&[u8], Object> {
    let start = input;
    let (input, tok) = token(input)?;

    match tok {
        Token::Null => Ok((input, Object::Null)),
        Token::True => Ok((input, Object::Boolean(true))),
        Token::False => Ok((input, Object::Boolean(false))),

        Token::Integer(id) => {
            // "id gen R" is a reference; anything else leaves a plain number
            if let Ok((after_gen, Token::Integer(gen))) = token(input) {
                if let Ok((after_r, Token::R)) = token(after_gen) {
                    if let (Ok(id), Ok(gen)) = (u32::try_from(id), u16::try_from(gen)) {
                        return Ok((after_r, Object::Reference(ObjectRef::new(id, gen))));
                    }
                }
            }
            Ok((input, Object::Number(id as f64)))
        },

        Token::Real(r) => Ok((input, Object::Number(r))),

        Token::LiteralString(raw) => {
            Ok((input, Object::String(PdfString::literal(decode_literal_string_escapes(raw)))))
        },

        Token::HexString(raw) => match decode_hex(raw) {
            Ok(bytes) => Ok((input, Object::String(PdfString::hex(bytes)))),
            Err(_) => Err(nom::Err::Failure(nom::error::Error::new(start, ErrorKind::HexDigit))),
        },

        Token::Name(name) => Ok((input, Object::Name(name))),

        Token::ArrayStart => {
            if depth >= max_nesting {
                return Err(nom::Err::Failure(nom::error::Error::new(start, ErrorKind::TooLarge)));
            }
            parse_array(input, depth + 1, max_nesting)
        },

        Token::DictStart => {
            if depth >= max_nesting {
                return Err(nom::Err::Failure(nom::error::Error::new(start, ErrorKind::TooLarge)));
            }
            let (rest, dict) = parse_dictionary(input, depth + 1, max_nesting)?;
            Ok((rest, Object::Dictionary(dict)))
        },

        _ => Err(fail(start, ErrorKind::Tag)),
    }
}

/// Parse array contents after `[` up to and including `]`.
fn parse_array(input: &[u8], depth: usize, max_nesting: usize) -> IResult<&[u8], Object> {
    let mut items = Vec::new();
    let mut remaining = input;

    loop {
        let (after, tok) = token(remaining)?;
        if tok == Token::ArrayEnd {
            return Ok((after, Object::Array(items)));
        }
        let (after, item) = parse_value(remaining, depth, max_nesting)?;
        items.push(item);
        remaining = after;
    }
}

/// Parse dictionary contents after `<<` up to and including `>>`.
///
/// A repeated key keeps its first position and takes the last value.
fn parse_dictionary(input: &[u8], depth: usize, max_nesting: usize) -> IResult<&[u8], Dictionary> {
    let mut dict = Dictionary::new();
    let mut remaining = input;

    loop {
        let (after, tok) = token(remaining)?;
        match tok {
            Token::DictEnd => return Ok((after, dict)),
            Token::Name(key) => {
                let (after, value) = parse_value(after, depth, max_nesting)?;
                dict.insert(key, value);
                remaining = after;
            },
            _ => return Err(fail(remaining, ErrorKind::Tag)),
        }
    }
}

/// Parse an indirect object header `N G obj`.
pub fn parse_indirect_header(input: &[u8]) -> IResult<&[u8], ObjectRef> {
    let (rest, id) = token(input)?;
    let (rest, gen) = token(rest)?;
    let (rest, kw) = token(rest)?;
    match (id, gen, kw) {
        (Token::Integer(id), Token::Integer(gen), Token::ObjStart) => {
            match (u32::try_from(id), u16::try_from(gen)) {
                (Ok(id), Ok(gen)) => Ok((rest, ObjectRef::new(id, gen))),
                _ => Err(fail(input, ErrorKind::Digit)),
            }
        },
        _ => Err(fail(input, ErrorKind::Tag)),
    }
}

/// Turn a nom failure on `data[base..]` into a crate error with an absolute offset.
pub(crate) fn nom_error_at(
    data: &[u8],
    base: usize,
    err: nom::Err<nom::error::Error<&[u8]>>,
    max_nesting: usize,
    what: &str,
) -> Error {
    match err {
        nom::Err::Incomplete(_) => Error::UnexpectedEof,
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            if e.code == ErrorKind::TooLarge {
                return Error::RecursionLimitExceeded(max_nesting);
            }
            let slice_len = data.len().saturating_sub(base);
            let offset = base + slice_len.saturating_sub(e.input.len());
            Error::parse(offset, format!("malformed {} ({:?})", what, e.code))
        },
    }
}

/// Parse one object starting at `data[offset..]`.
///
/// Returns the object and the absolute offset just past it.
pub(crate) fn parse_object_at(data: &[u8], offset: usize, max_nesting: usize) -> Result<(Object, usize)> {
    let slice = data.get(offset..).ok_or(Error::UnexpectedEof)?;
    match parse_object_with_limit(slice, max_nesting) {
        Ok((rest, obj)) => Ok((obj, data.len() - rest.len())),
        Err(e) => Err(nom_error_at(data, offset, e, max_nesting, "object")),
    }
}
