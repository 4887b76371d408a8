//! Formatting options
//!
//! The option surface mirrors the knobs exposed by the formatter API:
//! line width, indentation style, and document-only mode. Options are
//! validated at the API boundary; invalid values fail fast instead of
//! producing garbled output.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the formatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Line length the printer will wrap on.
    pub print_width: usize,

    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,

    /// Number of spaces per indentation level.
    pub tab_width: usize,

    /// Only format the document environment, leaving everything before
    /// `\begin{document}` untouched. Falls back to full-document
    /// formatting when the marker is absent.
    pub document_only: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            print_width: 80,
            use_tabs: false,
            tab_width: 2,
            document_only: false,
        }
    }
}

impl FormatOptions {
    /// Reject configurations that cannot produce sensible output.
    pub fn validate(&self) -> Result<()> {
        if self.print_width == 0 {
            return Err(Error::InvalidOptions(
                "print_width must be greater than zero".to_string(),
            ));
        }
        if self.tab_width == 0 {
            return Err(Error::InvalidOptions(
                "tab_width must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
