//! Pretty-printer for LaTeX trees
//!
//! Printing happens in two stages. The emitter walks the AST and
//! produces a flat stream of pieces: atoms (unbreakable text), the
//! joins between them (glue, space, break opportunity), hard line
//! breaks, indentation changes, and raw verbatim text. The writer then
//! fills lines greedily against the configured width.
//!
//! Break policy (deterministic):
//!
//! - soft breaks exist at inter-word whitespace and between a macro's
//!   argument groups; a break is taken only when the next atom would
//!   overflow the width (greedy first-fit)
//! - no break between a macro name and its first argument, inside a
//!   control sequence name, inside inline math, or inside `\verb`
//! - environments put `\begin`/`\end` on their own lines and indent
//!   the body one level; display math is a block with an indented body
//! - paragraph breaks render as exactly one blank line
//! - verbatim bodies pass through byte-for-byte, never re-indented
//!
//! An atom longer than the width overflows its line; that is the only
//! case where output lines exceed the budget.
//!
//! Because every decision is a function of the (whitespace-normalized)
//! tree, and the output re-parses to that same tree, formatting is
//! idempotent.

use super::ast::{Argument, Node};
use super::options::FormatOptions;
use super::signatures::{BreakMode, SignatureTable};
use once_cell::sync::Lazy;
use regex::Regex;

/// Configuration carried through a single print call.
#[derive(Debug, Clone)]
pub struct PrintContext {
    pub print_width: usize,
    pub use_tabs: bool,
    pub tab_width: usize,
    /// Offset where formatting starts; everything before it is emitted
    /// verbatim from the original source.
    pub range_start: usize,
    pub range_end: usize,
}

impl PrintContext {
    /// Build a context for `source`, resolving document-only mode to a
    /// range start. A missing `\begin{document}` silently degrades to
    /// full-document formatting.
    pub fn new(options: &FormatOptions, source: &str) -> Self {
        let range_start = if options.document_only {
            document_body_offset(source).unwrap_or(0)
        } else {
            0
        };
        Self {
            print_width: options.print_width,
            use_tabs: options.use_tabs,
            tab_width: options.tab_width,
            range_start,
            range_end: source.len(),
        }
    }
}

static DOCUMENT_BEGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\begin\{document\}").unwrap());

/// Byte offset of the literal `\begin{document}`, if present.
pub fn document_body_offset(source: &str) -> Option<usize> {
    DOCUMENT_BEGIN.find(source).map(|m| m.start())
}

/// Render a tree back to text.
///
/// In partial mode (`range_start > 0`) the bytes before the first
/// top-level node at or past the range start are copied verbatim from
/// `source` and only the remaining nodes are formatted.
pub fn print(root: &Node, source: &str, ctx: &PrintContext, table: &SignatureTable) -> String {
    let nodes: &[Node] = match root.children() {
        Some(children) => children,
        None => std::slice::from_ref(root),
    };

    if ctx.range_start > 0 {
        let cut = nodes.iter().find_map(|node| {
            node.position()
                .map(|p| p.start.offset)
                .filter(|start| *start >= ctx.range_start)
        });
        if let Some(cut) = cut {
            let idx = nodes
                .iter()
                .position(|node| {
                    node.position()
                        .map(|p| p.start.offset >= ctx.range_start)
                        .unwrap_or(false)
                })
                .unwrap_or(nodes.len());
            let mut out = source[..cut].to_string();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&render(&nodes[idx..], ctx, table));
            return out;
        }
        // No node starts inside the range: format everything
    }

    render(nodes, ctx, table)
}

fn render(nodes: &[Node], ctx: &PrintContext, table: &SignatureTable) -> String {
    let mut emitter = Emitter::new(table);
    emitter.emit_nodes(nodes);
    let mut writer = Writer::new(ctx);
    for piece in emitter.pieces {
        writer.write(piece);
    }
    writer.finish()
}

/// How an atom attaches to the text before it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Join {
    /// Directly attached, unbreakable.
    Glue,
    /// Separated by a space; a break may replace the space.
    Space,
    /// Separated by a space, unbreakable (end-of-line comments).
    SpaceFixed,
    /// Directly attached, but a break may be inserted (between macro
    /// arguments).
    Break,
}

#[derive(Debug)]
enum Piece {
    Atom { text: String, join: Join },
    /// At least this many newlines here (1 = line break, 2 = blank
    /// line).
    Hard(usize),
    Indent,
    Dedent,
    /// Verbatim text, written without wrapping or indentation.
    Raw(String),
}

struct Emitter<'a> {
    pieces: Vec<Piece>,
    table: &'a SignatureTable,
    pending_space: bool,
    line_open: bool,
}

impl<'a> Emitter<'a> {
    fn new(table: &'a SignatureTable) -> Self {
        Self {
            pieces: Vec::new(),
            table,
            pending_space: false,
            line_open: false,
        }
    }

    fn atom(&mut self, text: String) {
        let join = if self.pending_space {
            Join::Space
        } else {
            Join::Glue
        };
        self.atom_join(text, join);
    }

    fn atom_join(&mut self, text: String, join: Join) {
        self.pending_space = false;
        self.line_open = true;
        self.pieces.push(Piece::Atom { text, join });
    }

    fn space(&mut self) {
        self.pending_space = true;
    }

    fn hard(&mut self, newlines: usize) {
        self.pending_space = false;
        self.line_open = false;
        if let Some(Piece::Hard(n)) = self.pieces.last_mut() {
            *n = (*n).max(newlines);
        } else {
            self.pieces.push(Piece::Hard(newlines));
        }
    }

    fn emit_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.emit_node(node);
        }
    }

    fn emit_node(&mut self, node: &Node) {
        match node {
            Node::Root { content, .. } => self.emit_nodes(content),
            Node::String { content, .. } => self.atom(content.clone()),
            Node::Whitespace { .. } => self.space(),
            Node::Parbreak { .. } => self.hard(2),
            Node::Comment {
                content,
                sameline,
                leading_whitespace,
                ..
            } => {
                if *sameline && self.line_open {
                    let join = if *leading_whitespace {
                        Join::SpaceFixed
                    } else {
                        Join::Glue
                    };
                    self.atom_join(format!("%{content}"), join);
                } else {
                    self.hard(1);
                    self.atom(format!("%{content}"));
                }
                self.hard(1);
            }
            Node::Macro { content, args, .. } => self.emit_macro(content, args),
            Node::Group { content, .. } => {
                self.atom("{".to_string());
                self.emit_nodes(content);
                self.atom("}".to_string());
            }
            Node::InlineMath { content, .. } => {
                if needs_structure(content) {
                    self.atom("$".to_string());
                    self.emit_nodes(content);
                    self.atom("$".to_string());
                } else {
                    self.atom(format!("${}$", self.flat(content)));
                }
            }
            Node::DisplayMath { content, .. } => {
                self.hard(1);
                self.atom("\\[".to_string());
                self.hard(1);
                self.pieces.push(Piece::Indent);
                self.emit_nodes(content);
                self.hard(1);
                self.pieces.push(Piece::Dedent);
                self.atom("\\]".to_string());
                self.hard(1);
            }
            Node::Environment {
                env, args, content, ..
            }
            | Node::MathEnv {
                env, args, content, ..
            } => self.emit_environment(env, args, content),
            Node::Verbatim { env, content, .. } => {
                self.hard(1);
                self.atom(format!("\\begin{{{env}}}"));
                self.hard(1);
                self.pieces
                    .push(Piece::Raw(trim_verbatim_body(content).to_string()));
                self.hard(1);
                self.atom(format!("\\end{{{env}}}"));
                self.hard(1);
            }
            Node::Verb {
                env,
                escape,
                content,
                ..
            } => self.atom(format!("\\{env}{escape}{content}{escape}")),
        }
    }

    fn emit_macro(&mut self, name: &str, args: &[Argument]) {
        let break_mode = self.table.break_mode(name);
        match break_mode {
            BreakMode::Before => self.hard(2),
            BreakMode::Around => self.hard(1),
            _ => {}
        }

        if args.iter().any(|arg| needs_structure(&arg.content)) {
            // Comments or verbatim material inside an argument cannot
            // be flattened onto one line
            self.atom(format!("\\{name}"));
            for (i, arg) in args.iter().enumerate() {
                let open_join = if i == 0 { Join::Glue } else { Join::Break };
                self.atom_join(arg.open_mark.clone(), open_join);
                self.emit_nodes(&arg.content);
                self.atom(arg.close_mark.clone());
            }
        } else {
            let mut head = format!("\\{name}");
            if let Some(first) = args.first() {
                head.push_str(&self.flat_arg(first));
            }
            self.atom(head);
            for arg in args.iter().skip(1) {
                let text = self.flat_arg(arg);
                self.atom_join(text, Join::Break);
            }
        }

        match break_mode {
            BreakMode::Around | BreakMode::After => self.hard(1),
            _ => {}
        }
    }

    fn emit_environment(&mut self, env: &str, args: &[Argument], content: &[Node]) {
        self.hard(1);
        let mut begin = format!("\\begin{{{env}}}");
        for arg in args {
            begin.push_str(&self.flat_arg(arg));
        }
        self.atom(begin);
        self.hard(1);
        self.pieces.push(Piece::Indent);
        self.emit_nodes(content);
        self.hard(1);
        self.pieces.push(Piece::Dedent);
        self.atom(format!("\\end{{{env}}}"));
        self.hard(1);
    }

    fn flat_arg(&self, arg: &Argument) -> String {
        format!(
            "{}{}{}",
            arg.open_mark,
            self.flat(&arg.content),
            arg.close_mark
        )
    }

    /// Single-line rendering for atomic contexts (inline math, macro
    /// arguments).
    fn flat(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Root { content, .. } => out.push_str(&self.flat(content)),
                Node::String { content, .. } => out.push_str(content),
                Node::Whitespace { .. } | Node::Parbreak { .. } => out.push(' '),
                // Guarded by needs_structure; kept as a safe fallback
                Node::Comment { content, .. } => {
                    out.push('%');
                    out.push_str(content);
                    out.push('\n');
                }
                Node::Macro { content, args, .. } => {
                    out.push('\\');
                    out.push_str(content);
                    for arg in args {
                        out.push_str(&self.flat_arg(arg));
                    }
                }
                Node::Group { content, .. } => {
                    out.push('{');
                    out.push_str(&self.flat(content));
                    out.push('}');
                }
                Node::InlineMath { content, .. } => {
                    out.push('$');
                    out.push_str(&self.flat(content));
                    out.push('$');
                }
                Node::DisplayMath { content, .. } => {
                    out.push_str("\\[");
                    out.push_str(&self.flat(content));
                    out.push_str("\\]");
                }
                Node::Environment {
                    env, args, content, ..
                }
                | Node::MathEnv {
                    env, args, content, ..
                } => {
                    out.push_str(&format!("\\begin{{{env}}}"));
                    for arg in args {
                        out.push_str(&self.flat_arg(arg));
                    }
                    out.push_str(&self.flat(content));
                    out.push_str(&format!("\\end{{{env}}}"));
                }
                Node::Verbatim { env, content, .. } => {
                    out.push_str(&format!("\\begin{{{env}}}{content}\\end{{{env}}}"));
                }
                Node::Verb {
                    env,
                    escape,
                    content,
                    ..
                } => {
                    out.push_str(&format!("\\{env}{escape}{content}{escape}"));
                }
            }
        }
        out
    }
}

/// Trim the newlines the block layout re-inserts around a verbatim
/// body, plus any indentation left before the `\end` marker, so that
/// capturing the printed body yields the same body again.
fn trim_verbatim_body(content: &str) -> &str {
    let body = content.strip_prefix('\n').unwrap_or(content);
    if let Some(stripped) = body.strip_suffix('\n') {
        return stripped;
    }
    match body.rfind('\n') {
        Some(idx) if body[idx + 1..].bytes().all(|b| b == b' ' || b == b'\t') => &body[..idx],
        None if body.bytes().all(|b| b == b' ' || b == b'\t') => "",
        _ => body,
    }
}

/// Content that cannot be flattened onto a single line.
fn needs_structure(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Comment { .. } | Node::Verbatim { .. } | Node::Parbreak { .. } => true,
        Node::Group { content, .. }
        | Node::InlineMath { content, .. }
        | Node::DisplayMath { content, .. }
        | Node::Environment { content, .. }
        | Node::MathEnv { content, .. }
        | Node::Root { content, .. } => needs_structure(content),
        Node::Macro { args, .. } => args.iter().any(|arg| needs_structure(&arg.content)),
        _ => false,
    })
}

struct Writer<'a> {
    ctx: &'a PrintContext,
    out: String,
    column: usize,
    level: usize,
    pending: usize,
    started: bool,
    /// Set at block boundaries (indent/dedent) so a paragraph break
    /// next to `\begin`/`\end` collapses to a single newline.
    suppress_blank: bool,
}

impl<'a> Writer<'a> {
    fn new(ctx: &'a PrintContext) -> Self {
        Self {
            ctx,
            out: String::new(),
            column: 0,
            level: 0,
            pending: 0,
            started: false,
            suppress_blank: false,
        }
    }

    fn indent_string(&self) -> String {
        if self.ctx.use_tabs {
            "\t".repeat(self.level)
        } else {
            " ".repeat(self.level * self.ctx.tab_width)
        }
    }

    fn indent_width(&self) -> usize {
        if self.ctx.use_tabs {
            self.level
        } else {
            self.level * self.ctx.tab_width
        }
    }

    fn write(&mut self, piece: Piece) {
        match piece {
            Piece::Atom { text, join } => self.write_atom(&text, join),
            Piece::Hard(n) => self.pending = self.pending.max(n),
            Piece::Indent => {
                self.level += 1;
                self.suppress_blank = true;
            }
            Piece::Dedent => {
                self.level = self.level.saturating_sub(1);
                self.suppress_blank = true;
            }
            Piece::Raw(text) => {
                if !text.is_empty() {
                    self.write_raw(&text);
                }
            }
        }
    }

    fn start_line(&mut self, text: &str, width: usize) {
        let indent = self.indent_string();
        self.out.push_str(&indent);
        self.out.push_str(text);
        self.column = self.indent_width() + width;
        self.started = true;
        self.suppress_blank = false;
    }

    fn write_atom(&mut self, text: &str, join: Join) {
        let width = text.chars().count();

        if !self.started {
            // Leading breaks are suppressed at the start of output
            self.pending = 0;
            self.start_line(text, width);
            return;
        }

        if self.pending > 0 {
            let newlines = if self.suppress_blank {
                self.pending.min(1)
            } else {
                self.pending.min(2)
            };
            for _ in 0..newlines {
                self.out.push('\n');
            }
            self.pending = 0;
            self.start_line(text, width);
            return;
        }

        let sep = matches!(join, Join::Space | Join::SpaceFixed) as usize;
        let breakable = matches!(join, Join::Space | Join::Break);
        let overflows = self.column + sep + width > self.ctx.print_width;

        if breakable && overflows && self.column > self.indent_width() {
            self.out.push('\n');
            self.start_line(text, width);
        } else {
            if sep == 1 {
                self.out.push(' ');
                self.column += 1;
            }
            self.out.push_str(text);
            self.column += width;
            self.suppress_blank = false;
        }
    }

    fn write_raw(&mut self, text: &str) {
        if self.started {
            for _ in 0..self.pending.max(1) {
                self.out.push('\n');
            }
        }
        self.pending = 0;
        self.out.push_str(text);
        self.column = text
            .rsplit('\n')
            .next()
            .map(|tail| tail.chars().count())
            .unwrap_or(0);
        self.started = true;
        self.suppress_blank = false;
    }

    fn finish(mut self) -> String {
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::parser::parse;
    use crate::latex::signatures::default_table;

    fn fmt(source: &str) -> String {
        fmt_opts(source, &FormatOptions::default())
    }

    fn fmt_opts(source: &str, options: &FormatOptions) -> String {
        let root = parse(source);
        let ctx = PrintContext::new(options, source);
        print(&root, source, &ctx, default_table())
    }

    #[test]
    fn test_plain_paragraph() {
        assert_eq!(fmt("hello   world"), "hello world\n");
    }

    #[test]
    fn test_paragraph_break_is_one_blank_line() {
        assert_eq!(fmt("a\n\n\n\nb"), "a\n\nb\n");
    }

    #[test]
    fn test_wrap_at_width() {
        let options = FormatOptions {
            print_width: 10,
            ..FormatOptions::default()
        };
        let out = fmt_opts(&"word ".repeat(50), &options);
        assert!(out.lines().all(|line| line.chars().count() <= 10));
        assert!(out.lines().count() > 1);
    }

    #[test]
    fn test_overlong_atom_overflows() {
        let options = FormatOptions {
            print_width: 5,
            ..FormatOptions::default()
        };
        assert_eq!(fmt_opts("extraordinarily", &options), "extraordinarily\n");
    }

    #[test]
    fn test_macro_glued_to_first_argument() {
        let options = FormatOptions {
            print_width: 12,
            ..FormatOptions::default()
        };
        let out = fmt_opts(r"pad pad \textbf{bold}", &options);
        // The break lands before the macro, never inside \textbf{bold}
        assert!(out.contains("\\textbf{bold}"));
    }

    #[test]
    fn test_environment_layout() {
        let out = fmt("\\begin{itemize}\\item a\\item b\\end{itemize}");
        assert_eq!(
            out,
            "\\begin{itemize}\n  \\item a\n\n  \\item b\n\\end{itemize}\n"
        );
    }

    #[test]
    fn test_tabs_for_indentation() {
        let options = FormatOptions {
            use_tabs: true,
            ..FormatOptions::default()
        };
        let out = fmt_opts("\\begin{itemize}\\item a\\end{itemize}", &options);
        assert_eq!(out, "\\begin{itemize}\n\t\\item a\n\\end{itemize}\n");
    }

    #[test]
    fn test_display_math_block() {
        assert_eq!(fmt("$$x$$"), "\\[\n  x\n\\]\n");
        assert_eq!(fmt("\\[x\\]"), "\\[\n  x\n\\]\n");
    }

    #[test]
    fn test_inline_math_is_atomic() {
        assert_eq!(fmt("$e^2$ is math"), "$e^2$ is math\n");
    }

    #[test]
    fn test_comment_preserved_at_end_of_line() {
        assert_eq!(fmt("a % comment\nb"), "a % comment\nb\n");
    }

    #[test]
    fn test_own_line_comment() {
        assert_eq!(fmt("% top\ntext"), "% top\ntext\n");
    }

    #[test]
    fn test_verbatim_body_untouched() {
        let out = fmt("\\begin{verbatim}\n  raw   {stuff\n\\end{verbatim}");
        assert_eq!(out, "\\begin{verbatim}\n  raw   {stuff\n\\end{verbatim}\n");
    }

    #[test]
    fn test_verbatim_in_indented_context_is_stable() {
        let source = "\\begin{figure}\n\\begin{verbatim}\ncode {\n\\end{verbatim}\n\\end{figure}";
        let once = fmt(source);
        assert_eq!(fmt(&once), once);
        // The body stays at column zero; no whitespace-only line is
        // introduced before \end
        assert!(once.contains("\ncode {\n"));
        assert!(!once.lines().any(|l| !l.is_empty() && l.trim().is_empty()));
    }

    #[test]
    fn test_empty_verbatim_in_indented_context_is_stable() {
        let source = "\\begin{figure}\n\\begin{verbatim}\n\\end{verbatim}\n\\end{figure}";
        let once = fmt(source);
        assert_eq!(fmt(&once), once);
    }

    #[test]
    fn test_parbreak_in_argument_is_preserved() {
        let out = fmt("\\footnote{First paragraph.\n\nSecond paragraph.}");
        assert_eq!(out, "\\footnote{First paragraph.\n\nSecond paragraph.}\n");
    }

    #[test]
    fn test_section_breaks_around() {
        let out = fmt(r"\section*{Math}Below");
        assert_eq!(out, "\\section*{Math}\nBelow\n");
    }

    #[test]
    fn test_document_only_preserves_preamble() {
        let source = "\\usepackage{a}   \\usepackage{b}\n\\begin{document}\nx    y\n\\end{document}";
        let options = FormatOptions {
            document_only: true,
            ..FormatOptions::default()
        };
        let out = fmt_opts(source, &options);
        let marker = out.find("\\begin{document}").unwrap();
        // Bytes before the marker are identical to the input
        assert_eq!(&out[..marker], &source[..source.find("\\begin{document}").unwrap()]);
        assert!(out.contains("x y"));
    }

    #[test]
    fn test_document_only_without_marker_formats_everything() {
        let source = "a    b";
        let options = FormatOptions {
            document_only: true,
            ..FormatOptions::default()
        };
        assert_eq!(fmt_opts(source, &options), fmt(source));
    }

    #[test]
    fn test_idempotent_on_mixed_document() {
        let source = r"\section*{Really Cool Math}Below you'll find some really cool math.

Check it out!\begin{enumerate}
    \item[(a)] Hi there
\item$e^2$ is math mode! \[x\]
\end{enumerate}";
        let once = fmt(source);
        let twice = fmt(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fmt(""), "");
    }
}
