//! Source locations for error reporting

use serde::Serialize;
use std::fmt;

/// Identifier used when the owning document has no URI.
pub const UNKNOWN_DOCUMENT: &str = "[unknown]";

/// Where a definition was declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DefinitionLocation {
    /// Structural path of the declaring node (e.g. `/xs:schema/xs:element[2]`)
    pub path: String,

    /// Owning document identifier (URI, file path or `[unknown]`)
    pub document: String,

    /// Line number (1-indexed)
    pub line: u32,
}

impl DefinitionLocation {
    /// Create a new location
    #[must_use]
    pub fn new(path: impl Into<String>, document: impl Into<String>, line: u32) -> Self {
        Self {
            path: path.into(),
            document: document.into(),
            line,
        }
    }
}

impl fmt::Display for DefinitionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} on line {}", self.path, self.document, self.line)
    }
}
