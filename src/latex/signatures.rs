//! Macro and environment signatures
//!
//! The parser decides how many argument groups a control sequence
//! consumes by looking its name up in a [`SignatureTable`]. The table
//! is an explicit immutable value injected into the parser rather than
//! ambient global state, so tests can run against a custom table and
//! callers can extend the default with their own macro packages.
//!
//! Unknown macros are simply absent from the table and parse with zero
//! arguments; a following group becomes a sibling, not an argument.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// One argument slot of a macro signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSpec {
    /// A brace group (or single token) that must follow.
    Mandatory,
    /// A bracketed argument that may follow.
    Optional,
}

/// How the content of a macro's arguments is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgParseMode {
    #[default]
    Standard,
    /// Mandatory group content is captured raw (`\url`, `\lstinline`).
    Verbatim,
    /// Parsed like standard content; recorded so tooling can tell math
    /// arguments apart (`\ensuremath`).
    Math,
}

/// Layout hint for the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakMode {
    #[default]
    None,
    /// Blank line before the macro (`\item`).
    Before,
    /// Line breaks before and after (`\section`, preamble macros).
    Around,
    /// Line break after the macro (`\\` inside environments).
    After,
}

/// A macro or environment signature.
#[derive(Debug, Clone, Default)]
pub struct MacroSignature {
    pub args: Vec<ArgSpec>,
    pub mode: ArgParseMode,
    pub break_mode: BreakMode,
}

impl MacroSignature {
    pub fn new(args: &[ArgSpec]) -> Self {
        Self {
            args: args.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: ArgParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_break(mut self, break_mode: BreakMode) -> Self {
        self.break_mode = break_mode;
        self
    }
}

/// Immutable lookup table mapping names to signatures, plus the name
/// classes that select environment parsing modes.
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    macros: HashMap<String, MacroSignature>,
    verbatim_environments: HashSet<String>,
    math_environments: HashSet<String>,
}

impl SignatureTable {
    /// An empty table: every macro parses with zero arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table covering common LaTeX.
    pub fn standard() -> Self {
        use ArgSpec::{Mandatory as M, Optional as O};

        let mut table = Self::empty();

        // Preamble
        for name in ["documentclass", "usepackage"] {
            table.insert(name, MacroSignature::new(&[O, M]).with_break(BreakMode::Around));
        }
        for name in ["title", "author", "date", "bibliographystyle", "bibliography"] {
            table.insert(name, MacroSignature::new(&[M]).with_break(BreakMode::Around));
        }
        table.insert("newcommand", MacroSignature::new(&[M, O, O, M]));
        table.insert("renewcommand", MacroSignature::new(&[M, O, O, M]));
        table.insert("providecommand", MacroSignature::new(&[M, O, O, M]));
        table.insert("newenvironment", MacroSignature::new(&[M, O, O, M, M]));
        table.insert("setlength", MacroSignature::new(&[M, M]));

        // Sectioning (starred forms keep the star in the name)
        for name in [
            "part", "chapter", "section", "subsection", "subsubsection", "paragraph",
            "subparagraph",
        ] {
            let sig = MacroSignature::new(&[O, M]).with_break(BreakMode::Around);
            table.insert(name, sig.clone());
            table.insert(&format!("{name}*"), sig);
        }
        for name in ["maketitle", "tableofcontents", "newpage", "clearpage", "appendix"] {
            table.insert(name, MacroSignature::new(&[]).with_break(BreakMode::Around));
        }

        // Text commands
        for name in [
            "emph", "textbf", "textit", "texttt", "textsc", "textrm", "textsf", "underline",
            "mbox", "text", "caption", "footnote", "label", "ref", "eqref", "pageref", "cite",
            "input", "include", "hspace", "vspace", "phantom",
        ] {
            table.insert(name, MacroSignature::new(&[M]));
        }
        table.insert("textcolor", MacroSignature::new(&[M, M]));
        table.insert("color", MacroSignature::new(&[M]));
        table.insert("includegraphics", MacroSignature::new(&[O, M]));
        table.insert("item", MacroSignature::new(&[O]).with_break(BreakMode::Before));
        table.insert("\\", MacroSignature::new(&[O]).with_break(BreakMode::After));

        // Verbatim-argument macros
        for name in ["url", "path", "lstinline"] {
            table.insert(name, MacroSignature::new(&[M]).with_mode(ArgParseMode::Verbatim));
        }

        // Math commands with arguments
        for name in ["frac", "tfrac", "dfrac", "binom", "overset", "underset", "stackrel"] {
            table.insert(name, MacroSignature::new(&[M, M]));
        }
        table.insert("sqrt", MacroSignature::new(&[O, M]));
        for name in ["hat", "bar", "vec", "dot", "ddot", "tilde", "overline", "boldsymbol"] {
            table.insert(name, MacroSignature::new(&[M]));
        }
        table.insert("ensuremath", MacroSignature::new(&[M]).with_mode(ArgParseMode::Math));

        // Environment name classes
        for env in ["verbatim", "verbatim*", "lstlisting", "minted", "alltt", "comment"] {
            table.verbatim_environments.insert(env.to_string());
        }
        for env in [
            "math", "displaymath", "equation", "align", "gather", "multline", "flalign",
            "alignat", "eqnarray",
        ] {
            table.math_environments.insert(env.to_string());
            table.math_environments.insert(format!("{env}*"));
        }

        // Environments with arguments
        table.insert("tabular", MacroSignature::new(&[O, M]));
        table.insert("tabular*", MacroSignature::new(&[O, M, M]));
        table.insert("array", MacroSignature::new(&[O, M]));
        for env in ["figure", "table", "figure*", "table*"] {
            table.insert(env, MacroSignature::new(&[O]));
        }
        table.insert("minipage", MacroSignature::new(&[O, M]));
        table.insert("thebibliography", MacroSignature::new(&[M]));

        table
    }

    pub fn insert(&mut self, name: &str, signature: MacroSignature) {
        self.macros.insert(name.to_string(), signature);
    }

    /// Look up the signature for a macro or environment name.
    pub fn get(&self, name: &str) -> Option<&MacroSignature> {
        self.macros.get(name)
    }

    /// Layout hint for a macro, `BreakMode::None` when unknown.
    pub fn break_mode(&self, name: &str) -> BreakMode {
        self.get(name).map(|sig| sig.break_mode).unwrap_or_default()
    }

    /// Whether an environment's body is captured raw.
    pub fn is_verbatim_environment(&self, name: &str) -> bool {
        self.verbatim_environments.contains(name)
    }

    /// Whether an environment's body is math.
    pub fn is_math_environment(&self, name: &str) -> bool {
        self.math_environments.contains(name)
    }

    /// Register a verbatim environment name.
    pub fn add_verbatim_environment(&mut self, name: &str) {
        self.verbatim_environments.insert(name.to_string());
    }

    /// Register a math environment name.
    pub fn add_math_environment(&mut self, name: &str) {
        self.math_environments.insert(name.to_string());
    }
}

/// The process-wide default table, built once on first use.
pub fn default_table() -> &'static SignatureTable {
    static TABLE: Lazy<SignatureTable> = Lazy::new(SignatureTable::standard);
    &TABLE
}
