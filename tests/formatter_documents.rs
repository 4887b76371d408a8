//! End-to-end formatting tests on whole documents
//!
//! These exercise the full pipeline (lex, parse, print) and pin down
//! the observable contract: normalized whitespace, stable second
//! passes, width discipline, and untouched verbatim regions.

use unlatex::{format, format_with_opts, FormatOptions};

fn fmt(source: &str) -> String {
    format(source).expect("default options are valid")
}

fn assert_idempotent(source: &str) {
    let once = fmt(source);
    let twice = fmt(&once);
    assert_eq!(once, twice, "second pass changed output for {source:?}");
}

#[test]
fn test_whitespace_normalization() {
    assert_eq!(fmt("It's   a\ttest"), "It's a test\n");
}

#[test]
fn test_paragraphs_separated_by_one_blank_line() {
    assert_eq!(fmt("one\n\n\n\n\ntwo\n\nthree"), "one\n\ntwo\n\nthree\n");
}

#[test]
fn test_output_ends_with_single_newline() {
    assert_eq!(fmt("x\n\n\n"), "x\n");
    assert_eq!(fmt(""), "");
}

#[test]
fn test_long_paragraph_wraps_within_width() {
    let source = "Lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor incididunt ut labore et dolore magna aliqua".repeat(3);
    let out = fmt(&source);
    for line in out.lines() {
        assert!(
            line.chars().count() <= 80,
            "line exceeds width: {line:?}"
        );
    }
}

#[test]
fn test_narrow_width_option() {
    let options = FormatOptions {
        print_width: 20,
        ..FormatOptions::default()
    };
    let out = format_with_opts("alpha beta gamma delta epsilon zeta", &options).unwrap();
    assert_eq!(out, "alpha beta gamma\ndelta epsilon zeta\n");
}

#[test]
fn test_sectioned_document() {
    let source = r"\section{One}Text under one.\section{Two}Text under two.";
    let out = fmt(source);
    assert_eq!(
        out,
        "\\section{One}\nText under one.\n\\section{Two}\nText under two.\n"
    );
}

#[test]
fn test_itemize_document() {
    let source = "\\begin{itemize}  \\item First one \\item Second one \\end{itemize}";
    let out = fmt(source);
    assert_eq!(
        out,
        "\\begin{itemize}\n  \\item First one\n\n  \\item Second one\n\\end{itemize}\n"
    );
}

#[test]
fn test_nested_environments_indent_twice() {
    let source =
        "\\begin{figure}\\begin{minipage}{3cm}content\\end{minipage}\\end{figure}";
    let out = fmt(source);
    assert_eq!(
        out,
        "\\begin{figure}\n  \\begin{minipage}{3cm}\n    content\n  \\end{minipage}\n\\end{figure}\n"
    );
}

#[test]
fn test_display_math_variants_normalize() {
    assert_eq!(fmt("$$ x+y $$"), "\\[\n  x+y\n\\]\n");
    assert_eq!(fmt("\\[ x+y \\]"), "\\[\n  x+y\n\\]\n");
}

#[test]
fn test_verbatim_survives_formatting() {
    let source = "before\n\\begin{verbatim}\n  keep   this\n\t{and this\n\\end{verbatim}\nafter";
    let out = fmt(source);
    assert!(out.contains("  keep   this\n\t{and this"));
    assert_idempotent(source);
}

#[test]
fn test_verbatim_inside_environment_is_idempotent() {
    let source =
        "\\begin{figure}\n\\begin{lstlisting}\nlet x = 1;\n\\end{lstlisting}\n\\end{figure}";
    let once = fmt(source);
    let twice = fmt(&once);
    let thrice = fmt(&twice);
    assert_eq!(once, twice);
    assert_eq!(twice, thrice);
    assert!(once.contains("\nlet x = 1;\n"));
}

#[test]
fn test_argument_keeps_paragraph_break() {
    let out = fmt("\\footnote{First paragraph.\n\nSecond paragraph.}");
    assert!(out.contains("First paragraph.\n\nSecond paragraph."));
    assert_eq!(fmt(&out), out);
}

#[test]
fn test_verb_survives_formatting() {
    let out = fmt(r"Use \verb|x  =  {1}| here");
    assert!(out.contains(r"\verb|x  =  {1}|"));
}

#[test]
fn test_comments_keep_their_line_attachment() {
    let source = "code % trailing\n% standalone\nmore";
    let out = fmt(source);
    assert_eq!(out, "code % trailing\n% standalone\nmore\n");
}

#[test]
fn test_document_only_keeps_preamble_bytes() {
    let source = "\\documentclass{article}\n\n\n\\usepackage{amsmath}   % keep  weird   spacing\n\\begin{document}\nHello    world\n\\end{document}\n";
    let options = FormatOptions {
        document_only: true,
        ..FormatOptions::default()
    };
    let out = format_with_opts(source, &options).unwrap();
    let cut = source.find("\\begin{document}").unwrap();
    assert!(out.starts_with(&source[..cut]));
    assert!(out.contains("Hello world"));
}

#[test]
fn test_document_only_falls_back_without_marker() {
    let options = FormatOptions {
        document_only: true,
        ..FormatOptions::default()
    };
    let out = format_with_opts("a    b", &options).unwrap();
    assert_eq!(out, "a b\n");
}

#[test]
fn test_malformed_input_formats_without_panic() {
    for source in [
        "{never closed",
        "stray } brace",
        "\\begin{itemize} open forever",
        "$ lonely dollar",
        "\\verb|cut off",
        "\\end{phantom}",
    ] {
        let out = fmt(source);
        assert!(!out.is_empty(), "source: {source:?}");
        assert_idempotent(source);
    }
}

#[test]
fn test_idempotence_on_realistic_document() {
    let source = r"\documentclass[12pt]{article}
\usepackage{amsmath}
\title{A Note}
\author{Someone}

\begin{document}
\maketitle

\section{Introduction}
We consider the classic identity $e^{i\pi} + 1 = 0$ and, more
generally,
\[
  \sum_{n=1}^{\infty} \frac{1}{n^2} = \frac{\pi^2}{6}.
\]

\begin{enumerate}
  \item[(a)] First observation % inline note
  \item Second observation
\end{enumerate}

\begin{verbatim}
  raw $ code { here
\end{verbatim}

Final remark.
\end{document}";
    assert_idempotent(source);
}

#[test]
fn test_idempotence_with_tabs() {
    let options = FormatOptions {
        use_tabs: true,
        ..FormatOptions::default()
    };
    let source = "\\begin{itemize}\\item a\\item b\\end{itemize}";
    let once = format_with_opts(source, &options).unwrap();
    let twice = format_with_opts(&once, &options).unwrap();
    assert_eq!(once, twice);
    assert!(once.contains("\n\t\\item"));
}
