//! # unlatex
//!
//! A fault-tolerant LaTeX parser and formatter.
//!
//! Any byte sequence parses into a tree; malformed input degrades into
//! literal text nodes instead of failing. The tree serializes to JSON
//! and pretty-prints back to normalized LaTeX.
//!
//! ```
//! let root = unlatex::parse(r"\textbf{Hello} world");
//! let json = unlatex::jparse(r"\textbf{Hello} world").unwrap();
//! let formatted = unlatex::format("a   b\n\n\nc").unwrap();
//! assert_eq!(formatted, "a b\n\nc\n");
//! # let _ = (root, json);
//! ```

pub mod error;
pub mod latex;

pub use error::{Error, Result};
pub use latex::ast::{Argument, Node};
pub use latex::options::FormatOptions;
pub use latex::signatures::SignatureTable;
pub use latex::visit::{walk, Action, Visitor};

use latex::printer::PrintContext;
use latex::signatures::default_table;

/// Parse `source` into an AST using the default macro signatures.
///
/// Parsing is total: it never fails, for any input.
pub fn parse(source: &str) -> Node {
    latex::parser::parse(source)
}

/// Parse `source` with a caller-provided signature table.
pub fn parse_with(source: &str, table: &SignatureTable) -> Node {
    latex::parser::parse_with(source, table)
}

/// Parse `source` and serialize the AST to pretty-printed JSON.
pub fn jparse(source: &str) -> Result<String> {
    latex::ast::to_json(&parse(source)).map_err(|e| Error::Serialize(e.to_string()))
}

/// Format `source` with default options (80 columns, two-space
/// indentation).
pub fn format(source: &str) -> Result<String> {
    format_with_opts(source, &FormatOptions::default())
}

/// Format `source` with explicit options.
pub fn format_with_opts(source: &str, options: &FormatOptions) -> Result<String> {
    options.validate()?;
    let root = parse(source);
    let ctx = PrintContext::new(options, source);
    Ok(latex::printer::print(&root, source, &ctx, default_table()))
}
