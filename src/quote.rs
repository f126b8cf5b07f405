//! The quote record shared by every ingestor and the compositor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable `(body, author)` pair.
///
/// Ingestors only build quotes whose body and author are both non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    body: String,
    author: String,
}

impl Quote {
    pub fn new(body: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            author: author.into(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

/// Canonical form: `"<body>" - <author>`.
impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" - {}", self.body, self.author)
    }
}
