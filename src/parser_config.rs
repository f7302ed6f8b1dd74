/// Parser options for controlling error handling and resource limits.
///
/// These options trade strict PDF compliance for broader compatibility with
/// malformed files, and bound the work done on adversarial input.
///
/// # Example
///
/// ```
/// use pdf_acroform::parser_config::ParserOptions;
///
/// // Lenient mode - tolerate malformed xref lines (default)
/// let lenient = ParserOptions::lenient();
///
/// // Strict mode - reject them
/// let strict = ParserOptions::strict();
///
/// // Custom configuration
/// let custom = ParserOptions {
///     max_field_depth: 16,
///     ..ParserOptions::default()
/// };
/// assert!(!custom.strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Fail on a malformed cross-reference entry (true) or treat it as free (false)
    pub strict: bool,

    /// Maximum array/dictionary nesting depth inside one object
    ///
    /// PDF Spec: ISO 32000-1:2008, Section H.1 - Implementation Limits
    pub max_nesting: usize,

    /// Maximum number of xref sections followed through `/Prev`
    pub max_xref_chain: usize,

    /// Maximum depth of the `/Kids` field tree
    pub max_field_depth: usize,

    /// Number of trailing bytes searched for `startxref`
    pub startxref_window: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl ParserOptions {
    /// Strict mode: a malformed xref entry is a parse error.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::lenient()
        }
    }

    /// Lenient mode: malformed xref entries are logged and treated as free.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            max_nesting: 100,
            max_xref_chain: 64,
            max_field_depth: 64,
            startxref_window: 2048,
        }
    }
}
