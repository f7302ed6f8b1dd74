//! In-memory PDF fixtures.
//!
//! Compiled into the library's unit tests and, through `#[path]`, into the
//! integration tests' `common` module, so both build fixtures the same way.

#![allow(dead_code)]

/// Builds a single-revision PDF with a classic xref table.
///
/// Object numbers that are never added get free xref entries.
#[derive(Debug, Default)]
pub struct PdfBuilder {
    objects: Vec<(u32, String)>,
    trailer: String,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `N 0 obj <body> endobj`.
    pub fn object(mut self, num: u32, body: &str) -> Self {
        self.objects.push((num, body.to_string()));
        self
    }

    /// Extra trailer entries after `/Size`.
    pub fn trailer(mut self, extra: &str) -> Self {
        self.trailer = extra.to_string();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let max = self.objects.iter().map(|(num, _)| *num).max().unwrap_or(0);
        let mut offsets = vec![None; max as usize + 1];

        for (num, body) in &self.objects {
            offsets[*num as usize] = Some(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", num, body).as_bytes());
        }

        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", max + 1).as_bytes());
        for offset in &offsets {
            match offset {
                Some(off) => out.extend_from_slice(format!("{:010} 00000 n\r\n", off).as_bytes()),
                None => out.extend_from_slice(b"0000000000 65535 f\r\n"),
            }
        }
        out.extend_from_slice(
            format!("trailer\n<< /Size {} {} >>\nstartxref\n{}\n%%EOF\n", max + 1, self.trailer, xref_at)
                .as_bytes(),
        );
        out
    }
}

/// Build a PDF from `(object number, body)` pairs in one call.
pub fn build_pdf(objects: &[(u32, &str)], trailer_extra: &str) -> Vec<u8> {
    objects
        .iter()
        .fold(PdfBuilder::new(), |builder, (num, body)| builder.object(*num, body))
        .trailer(trailer_extra)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).position(|w| w == needle).unwrap()
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = PdfBuilder::new()
            .object(1, "<< /Type /Catalog >>")
            .object(3, "(three)")
            .trailer("/Root 1 0 R")
            .build();
        let xref_at = find(&pdf, b"xref\n0 4\n");
        let first_entry = xref_at + b"xref\n0 4\n".len();
        let entry = |num: usize| &pdf[first_entry + 20 * num..first_entry + 20 * (num + 1)];

        assert_eq!(entry(0), b"0000000000 65535 f\r\n");
        assert_eq!(entry(2), b"0000000000 65535 f\r\n");
        for num in [1, 3] {
            let offset: usize = std::str::from_utf8(&entry(num)[..10]).unwrap().parse().unwrap();
            assert!(pdf[offset..].starts_with(format!("{} 0 obj\n", num).as_bytes()));
        }
        let tail = format!("trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n", xref_at);
        assert!(pdf.ends_with(tail.as_bytes()));
    }

    #[test]
    fn test_build_pdf_matches_builder() {
        let objects = [(1, "<< /Type /Catalog >>"), (2, "<< /T (a) >>")];
        let built = PdfBuilder::new().object(1, objects[0].1).object(2, objects[1].1).trailer("/Root 1 0 R").build();
        assert_eq!(build_pdf(&objects, "/Root 1 0 R"), built);
    }
}
