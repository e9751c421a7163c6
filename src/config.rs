//! Syntax configuration flags (SPEC_FULL.md §6.1).
//!
//! Mirrors the teacher's small `Default`-deriving options struct threaded
//! through a pipeline (`FormatterConfig` in the example this project is
//! based on), generalized to the five boolean flags this format needs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxConfig {
    /// `name = value` (tolerant of surrounding spaces) instead of
    /// whitespace-separated `name value`.
    pub equals_sign: bool,
    /// A leaf must be terminated by `;`; bare newlines no longer terminate it.
    pub semicolon: bool,
    /// Recognize `// ... \n` as comment trivia.
    pub slash_slash_comments: bool,
    /// Recognize `/* ... */` as comment trivia.
    pub slash_star_comments: bool,
    /// Save via the locked in-place path instead of atomic temp+rename.
    pub rewrite_in_place: bool,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            equals_sign: false,
            semicolon: false,
            slash_slash_comments: false,
            slash_star_comments: false,
            rewrite_in_place: false,
        }
    }
}

impl SyntaxConfig {
    pub fn c_style_comments(mut self, enabled: bool) -> Self {
        self.slash_slash_comments = enabled;
        self.slash_star_comments = enabled;
        self
    }
}
