//! PDF lexer (tokenizer).
//!
//! Splits raw PDF bytes into tokens: numbers, literal and hex strings, names,
//! delimiters and bare keywords. Whitespace (space, \t, \r, \n, \0, \f) and comments
//! (`%` to end of line) between tokens are skipped.
//!
//! Literal and hex string bodies are returned raw; the parser decodes them. Name
//! `#XX` escapes are decoded here.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1},
    character::complete::{char, digit0, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0_count,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

/// Token types recognized by the PDF lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Integer number (e.g., 42, -123)
    Integer(i64),

    /// Real (floating-point) number (e.g., 3.14, -2.5, .5)
    Real(f64),

    /// Literal string body, escapes not yet decoded
    LiteralString(&'a [u8]),

    /// Hex string body, whitespace not yet removed
    HexString(&'a [u8]),

    /// Name with `#XX` escapes decoded, one char per byte
    Name(String),

    /// `true`
    True,

    /// `false`
    False,

    /// `null`
    Null,

    /// `[`
    ArrayStart,

    /// `]`
    ArrayEnd,

    /// `<<`
    DictStart,

    /// `>>`
    DictEnd,

    /// `obj`
    ObjStart,

    /// `endobj`
    ObjEnd,

    /// `stream`
    StreamStart,

    /// `R` (used in "10 0 R")
    R,

    /// Any other bare word (`xref`, `trailer`, `startxref`, `endstream`, ...)
    Keyword(&'a [u8]),
}

/// PDF whitespace: space, tab, CR, LF, NUL, form feed.
#[inline]
pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C)
}

/// PDF delimiter characters.
#[inline]
pub fn is_delimiter(c: u8) -> bool {
    matches!(c, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// Regular characters make up names, numbers and keywords.
#[inline]
pub fn is_regular(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value((), preceded(char('%'), take_till(|c| c == b'\r' || c == b'\n')))(input)
}

/// Skip any run of whitespace and comments. Never fails.
pub fn skip_ws(input: &[u8]) -> IResult<&[u8], ()> {
    value((), many0_count(alt((value((), take_while1(is_whitespace)), comment))))(input)
}

fn digit_error(input: &[u8]) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
}

/// Parse an integer or real number.
///
/// Accepts a leading sign and reals with an empty integer or fraction part
/// (`.5`, `5.`, `-.002`). Integers too large for i64 become reals.
fn parse_number(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (rest, text) = recognize(tuple((
        opt(one_of("+-")),
        digit0,
        opt(pair(char('.'), digit0)),
    )))(input)?;

    if !text.iter().any(u8::is_ascii_digit) {
        return Err(digit_error(input));
    }
    // A number glued to a regular character ("12abc") is not a number.
    if rest.first().is_some_and(|&c| is_regular(c)) {
        return Err(digit_error(input));
    }

    let text = std::str::from_utf8(text).map_err(|_| digit_error(input))?;
    if !text.contains('.') {
        if let Ok(i) = text.parse::<i64>() {
            return Ok((rest, Token::Integer(i)));
        }
    }

    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(u) => ("-", u),
        None => ("", text.trim_start_matches('+')),
    };
    let mut normalized = String::with_capacity(text.len() + 2);
    normalized.push_str(sign);
    if unsigned.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(unsigned);
    if normalized.ends_with('.') {
        normalized.push('0');
    }
    let num: f64 = normalized.parse().map_err(|_| digit_error(input))?;
    Ok((rest, Token::Real(num)))
}

/// Parse a literal string enclosed in balanced parentheses.
///
/// Escapes are skipped over (so `\)` does not close the string) but left in the
/// returned body.
fn parse_literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (body, _) = char('(')(input)?;
    let mut depth = 1usize;
    let mut pos = 0;

    while pos < body.len() {
        match body[pos] {
            b'\\' => pos += 2,
            b'(' => {
                depth += 1;
                pos += 1;
            },
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&body[pos + 1..], Token::LiteralString(&body[..pos])));
                }
                pos += 1;
            },
            _ => pos += 1,
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Eof)))
}

/// Parse a hexadecimal string enclosed in single angle brackets.
fn parse_hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.starts_with(b"<<") {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    delimited(
        char('<'),
        map(
            take_while(|c: u8| c.is_ascii_hexdigit() || is_whitespace(c)),
            Token::HexString,
        ),
        char('>'),
    )(input)
}

/// Decode `#XX` escape sequences in a raw name.
///
/// Each resulting byte becomes one `char` (Latin-1), so the name can be written back
/// byte-for-byte. Malformed escapes are kept literally.
///
/// ```
/// # use pdf_acroform::lexer::decode_name_escapes;
/// assert_eq!(decode_name_escapes(b"A#20B#23C"), "A B#C");
/// assert_eq!(decode_name_escapes(b"Off"), "Off");
/// assert_eq!(decode_name_escapes(b"A#"), "A#");
/// ```
pub fn decode_name_escapes(raw: &[u8]) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            let hi = (raw[i + 1] as char).to_digit(16);
            let lo = (raw[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                result.push(char::from((hi * 16 + lo) as u8));
                i += 3;
                continue;
            }
        }
        result.push(char::from(raw[i]));
        i += 1;
    }

    result
}

fn parse_name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    preceded(
        char('/'),
        map(take_while(is_regular), |raw: &[u8]| Token::Name(decode_name_escapes(raw))),
    )(input)
}

fn parse_delimiter(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    alt((
        value(Token::DictStart, tag(b"<<")),
        value(Token::DictEnd, tag(b">>")),
        value(Token::ArrayStart, tag(b"[")),
        value(Token::ArrayEnd, tag(b"]")),
    ))(input)
}

/// Bare words are matched whole, so `Rect` never lexes as `R` + `ect`.
fn parse_keyword(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    map(take_while1(is_regular), |word: &[u8]| match word {
        b"true" => Token::True,
        b"false" => Token::False,
        b"null" => Token::Null,
        b"obj" => Token::ObjStart,
        b"endobj" => Token::ObjEnd,
        b"stream" => Token::StreamStart,
        b"R" => Token::R,
        other => Token::Keyword(other),
    })(input)
}

/// Parse a single PDF token after skipping whitespace and comments.
///
/// # Errors
///
/// Returns `Err` if the input does not start with a valid token, including at end
/// of input.
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (input, _) = skip_ws(input)?;

    alt((
        parse_delimiter, // << and >> before hex strings
        parse_name,
        parse_number,
        parse_literal_string,
        parse_hex_string,
        parse_keyword,
    ))(input)
}
