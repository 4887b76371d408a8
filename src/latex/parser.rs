//! Recursive-descent parser for LaTeX token streams
//!
//! The parser is total: any input produces a best-effort tree, never an
//! error. This is a formatting tool for partially-written documents, so
//! every malformed construct has a defined degradation instead of a
//! failure:
//!
//! - an unmatched `{` is implicitly closed at end of input
//! - a stray `}` becomes literal text
//! - an unterminated environment or math run ends at end of input
//! - a macro missing arguments keeps however many were present
//! - an unknown macro parses with zero arguments, leaving a following
//!   group as a sibling
//!
//! Group matching uses a depth counter through recursion, not brace
//! search. Argument consumption is driven by the injected
//! [`SignatureTable`]; verbatim constructs (`\verb`, verbatim
//! environments, `\url`-style arguments) are captured raw from the
//! source and the token cursor is re-synchronized afterwards.

use super::ast::{Argument, Node};
use super::lexer::tokenize;
use super::position::{SourceLocator, SourceSpan};
use super::signatures::{default_table, ArgParseMode, ArgSpec, MacroSignature, SignatureTable};
use super::token::Token;
use logos::Span;

/// Parse source with the default signature table. Never fails.
pub fn parse(source: &str) -> Node {
    parse_with(source, default_table())
}

/// Parse source with an explicit signature table. Never fails.
pub fn parse_with(source: &str, table: &SignatureTable) -> Node {
    Parser::new(source, table).parse_document()
}

/// What ends the current content sequence.
#[derive(Debug, Clone, PartialEq)]
enum Terminator {
    EndOfInput,
    /// `}` closing a group or brace-delimited argument.
    GroupClose,
    /// `]` closing an optional argument.
    OptionalClose,
    /// `\end{name}` for the named environment (left unconsumed for the
    /// caller to pair up).
    EnvEnd(String),
    /// `$` closing inline math.
    InlineMath,
    /// `\)` closing inline math.
    InlineMathParen,
    /// `$$` closing display math.
    DisplayMathDollar,
    /// `\]` closing display math.
    DisplayMathBracket,
}

/// Result of skipping whitespace ahead of an expected argument.
#[derive(Debug, PartialEq)]
enum Gap {
    None,
    Skipped,
    /// A blank line: arguments never cross a paragraph break.
    Parbreak,
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
    table: &'s SignatureTable,
    locator: SourceLocator,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str, table: &'s SignatureTable) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            table,
            locator: SourceLocator::new(source),
        }
    }

    fn parse_document(mut self) -> Node {
        let content = self.parse_content(&Terminator::EndOfInput);
        Node::Root {
            content,
            position: Some(self.locator.span(0..self.source.len())),
        }
    }

    /// Byte offset of the next unconsumed token (end of input if none).
    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len())
    }

    /// End offset of the last consumed token.
    fn last_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].1.end
        }
    }

    fn span_from(&self, start: usize) -> Option<SourceSpan> {
        let end = self.last_end().max(start);
        Some(self.locator.span(start..end))
    }

    fn span_to(&self, start: usize, end: usize) -> Option<SourceSpan> {
        Some(self.locator.span(start..end))
    }

    fn parse_content(&mut self, term: &Terminator) -> Vec<Node> {
        let mut nodes = Vec::new();

        loop {
            let Some((token, span)) = self.tokens.get(self.pos).cloned() else {
                // End of input implicitly closes every open construct
                return nodes;
            };

            // Closing delimiters for the active terminator
            match (&token, term) {
                (Token::EndGroup, Terminator::GroupClose)
                | (Token::CloseBracket, Terminator::OptionalClose)
                | (Token::MathShift, Terminator::InlineMath)
                | (Token::DoubleMathShift, Terminator::DisplayMathDollar) => {
                    self.pos += 1;
                    return nodes;
                }
                (Token::ControlSymbol(s), Terminator::InlineMathParen) if s == ")" => {
                    self.pos += 1;
                    return nodes;
                }
                (Token::ControlSymbol(s), Terminator::DisplayMathBracket) if s == "]" => {
                    self.pos += 1;
                    return nodes;
                }
                (Token::DoubleMathShift, Terminator::InlineMath) => {
                    // `$a$$b$`: the first `$` of `$$` closes the inline
                    // math; re-split so the second can open the next one
                    self.tokens[self.pos] = (Token::MathShift, span.start + 1..span.end);
                    return nodes;
                }
                _ => {}
            }

            if let Token::ControlWord(word) = &token {
                if word == "end" {
                    if let Some((name, after)) = self.peek_env_name(self.pos + 1) {
                        if matches!(term, Terminator::EnvEnd(expected) if *expected == name) {
                            // Leave for the environment parser to consume
                            return nodes;
                        }
                        // Stray \end: keep it as a plain macro
                        self.pos = after;
                        nodes.push(Node::Macro {
                            content: "end".to_string(),
                            args: vec![Argument::new("{", "}", vec![Node::text(&name)])],
                            position: self.span_from(span.start),
                        });
                        continue;
                    }
                }
            }

            match token {
                Token::Whitespace | Token::Newline => {
                    nodes.push(self.parse_whitespace_run());
                }
                Token::Comment(text) => {
                    self.pos += 1;
                    let (sameline, leading_whitespace) = self.comment_flags(span.start);
                    nodes.push(Node::Comment {
                        content: text,
                        sameline,
                        leading_whitespace,
                        position: self.span_from(span.start),
                    });
                }
                Token::Text(text) => {
                    self.pos += 1;
                    nodes.push(Node::String {
                        content: text,
                        position: self.span_from(span.start),
                    });
                }
                Token::AlignTab => {
                    self.pos += 1;
                    nodes.push(Node::String {
                        content: "&".to_string(),
                        position: self.span_from(span.start),
                    });
                }
                Token::OpenBracket => {
                    self.pos += 1;
                    nodes.push(Node::String {
                        content: "[".to_string(),
                        position: self.span_from(span.start),
                    });
                }
                Token::CloseBracket => {
                    self.pos += 1;
                    nodes.push(Node::String {
                        content: "]".to_string(),
                        position: self.span_from(span.start),
                    });
                }
                Token::BeginGroup => {
                    self.pos += 1;
                    let content = self.parse_content(&Terminator::GroupClose);
                    nodes.push(Node::Group {
                        content,
                        position: self.span_from(span.start),
                    });
                }
                Token::EndGroup => {
                    // Unmatched close brace degrades to literal text
                    self.pos += 1;
                    nodes.push(Node::String {
                        content: "}".to_string(),
                        position: self.span_from(span.start),
                    });
                }
                Token::MathShift => {
                    if *term == Terminator::DisplayMathDollar {
                        // A lone `$` inside `$$...$$` is literal
                        self.pos += 1;
                        nodes.push(Node::String {
                            content: "$".to_string(),
                            position: self.span_from(span.start),
                        });
                    } else {
                        self.pos += 1;
                        let content = self.parse_content(&Terminator::InlineMath);
                        nodes.push(Node::InlineMath {
                            content,
                            position: self.span_from(span.start),
                        });
                    }
                }
                Token::DoubleMathShift => {
                    self.pos += 1;
                    let content = self.parse_content(&Terminator::DisplayMathDollar);
                    nodes.push(Node::DisplayMath {
                        content,
                        position: self.span_from(span.start),
                    });
                }
                Token::ControlSymbol(sym) => {
                    self.pos += 1;
                    nodes.push(self.parse_control_symbol(&sym, span.start));
                }
                Token::ControlWord(word) => {
                    self.pos += 1;
                    nodes.push(self.parse_control_word(&word, span.start));
                }
            }
        }
    }

    fn parse_control_symbol(&mut self, sym: &str, start: usize) -> Node {
        match sym {
            "[" => {
                let content = self.parse_content(&Terminator::DisplayMathBracket);
                Node::DisplayMath {
                    content,
                    position: self.span_from(start),
                }
            }
            "(" => {
                let content = self.parse_content(&Terminator::InlineMathParen);
                Node::InlineMath {
                    content,
                    position: self.span_from(start),
                }
            }
            _ => {
                // Unmatched `\]`/`\)` fall through here and round-trip
                // as argument-less macros
                let signature = self.table.get(sym).cloned().unwrap_or_default();
                let args = self.gobble_args(&signature);
                Node::Macro {
                    content: sym.to_string(),
                    args,
                    position: self.span_from(start),
                }
            }
        }
    }

    fn parse_control_word(&mut self, word: &str, start: usize) -> Node {
        match word {
            "begin" => self.parse_environment(start),
            "verb" | "verb*" => self.parse_verb(word, start),
            _ => {
                let signature = self.table.get(word).cloned().unwrap_or_default();
                let args = self.gobble_args(&signature);
                Node::Macro {
                    content: word.to_string(),
                    args,
                    position: self.span_from(start),
                }
            }
        }
    }

    /// Parse `\begin{name}...` after the `\begin` token was consumed.
    fn parse_environment(&mut self, start: usize) -> Node {
        let Some((name, after)) = self.peek_env_name(self.pos) else {
            // `\begin` without a name group degrades to a macro
            return Node::Macro {
                content: "begin".to_string(),
                args: vec![],
                position: self.span_from(start),
            };
        };
        self.pos = after;

        if self.table.is_verbatim_environment(&name) {
            return self.parse_verbatim_environment(&name, start);
        }

        let signature = self.table.get(&name).cloned().unwrap_or_default();
        let args = self.gobble_args(&signature);
        let content = self.parse_content(&Terminator::EnvEnd(name.clone()));
        self.consume_env_end(&name);

        let position = self.span_from(start);
        if self.table.is_math_environment(&name) {
            Node::MathEnv {
                env: name,
                args,
                content,
                position,
            }
        } else {
            Node::Environment {
                env: name,
                args,
                content,
                position,
            }
        }
    }

    /// Capture the raw body of a verbatim environment up to the literal
    /// `\end{name}` (or end of input).
    fn parse_verbatim_environment(&mut self, name: &str, start: usize) -> Node {
        let marker = format!("\\end{{{name}}}");
        let body_start = self.offset();

        let (content, body_end) = match self.source[body_start..].find(&marker) {
            Some(rel) => (
                self.source[body_start..body_start + rel].to_string(),
                body_start + rel,
            ),
            None => (self.source[body_start..].to_string(), self.source.len()),
        };

        self.seek_to(body_end);
        self.consume_env_end(name);

        Node::Verbatim {
            env: name.to_string(),
            content,
            position: self.span_from(start),
        }
    }

    /// Parse `\verb|...|` after the `\verb`/`\verb*` token was consumed.
    fn parse_verb(&mut self, name: &str, start: usize) -> Node {
        let delim_start = self.last_end();
        let delim = match self.source[delim_start..].chars().next() {
            Some(c) if c != '\n' && c != ' ' && c != '\t' => c,
            // No usable delimiter: degrade to a plain macro
            _ => {
                return Node::Macro {
                    content: name.to_string(),
                    args: vec![],
                    position: self.span_from(start),
                }
            }
        };
        let body_start = delim_start + delim.len_utf8();

        let (content, end) = match self.source[body_start..].find(delim) {
            Some(rel) => (
                self.source[body_start..body_start + rel].to_string(),
                body_start + rel + delim.len_utf8(),
            ),
            // Unterminated \verb runs to end of input
            None => (self.source[body_start..].to_string(), self.source.len()),
        };

        self.seek_to(end);

        Node::Verb {
            env: name.to_string(),
            escape: delim.to_string(),
            content,
            position: self.span_to(start, end),
        }
    }

    /// Advance the token cursor to `target`. A token straddling the
    /// boundary (possible after raw captures) keeps its tail as text.
    fn seek_to(&mut self, target: usize) {
        while self.pos < self.tokens.len() {
            let span = self.tokens[self.pos].1.clone();
            if span.end <= target {
                self.pos += 1;
                continue;
            }
            if span.start >= target {
                break;
            }
            let tail = self.source[target..span.end].to_string();
            self.tokens[self.pos] = (Token::Text(tail), target..span.end);
            break;
        }
    }

    /// Consume a whitespace run; a blank line makes it a paragraph
    /// break.
    fn parse_whitespace_run(&mut self) -> Node {
        let start = self.offset();
        let mut newlines = 0;
        while let Some((token, _)) = self.tokens.get(self.pos) {
            match token {
                Token::Whitespace => self.pos += 1,
                Token::Newline => {
                    newlines += 1;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let position = self.span_from(start);
        if newlines >= 2 {
            Node::Parbreak { position }
        } else {
            Node::Whitespace { position }
        }
    }

    /// Whether source content precedes a comment on its line, and
    /// whether the comment is directly preceded by horizontal
    /// whitespace.
    fn comment_flags(&self, offset: usize) -> (bool, bool) {
        let bytes = self.source.as_bytes();
        let mut i = offset;
        let mut leading_whitespace = false;
        while i > 0 && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') {
            i -= 1;
            leading_whitespace = true;
        }
        let sameline = i > 0 && bytes[i - 1] != b'\n';
        (sameline, leading_whitespace)
    }

    /// Look ahead (without consuming) for `{name}` starting at `pos`,
    /// tolerating whitespace before and inside the braces. Returns the
    /// name and the position after the closing brace.
    fn peek_env_name(&self, mut pos: usize) -> Option<(String, usize)> {
        while matches!(
            self.tokens.get(pos),
            Some((Token::Whitespace | Token::Newline, _))
        ) {
            pos += 1;
        }
        match self.tokens.get(pos) {
            Some((Token::BeginGroup, _)) => pos += 1,
            _ => return None,
        }
        let mut name = String::new();
        loop {
            match self.tokens.get(pos) {
                Some((Token::EndGroup, _)) => {
                    pos += 1;
                    break;
                }
                Some((Token::Text(text), _)) => {
                    name.push_str(text);
                    pos += 1;
                }
                Some((Token::Whitespace, _)) => pos += 1,
                _ => return None,
            }
        }
        if name.is_empty() {
            None
        } else {
            Some((name, pos))
        }
    }

    /// Consume `\end{name}` if it is next (it is, when `parse_content`
    /// stopped on it; it is not at end of input).
    fn consume_env_end(&mut self, name: &str) {
        if let Some((Token::ControlWord(word), _)) = self.tokens.get(self.pos) {
            if word == "end" {
                if let Some((found, after)) = self.peek_env_name(self.pos + 1) {
                    if found == name {
                        self.pos = after;
                    }
                }
            }
        }
    }

    /// Skip whitespace ahead of an expected argument. The caller
    /// restores the position if no argument follows.
    fn skip_gap(&mut self) -> Gap {
        let mut newlines = 0;
        let mut skipped = false;
        while let Some((token, _)) = self.tokens.get(self.pos) {
            match token {
                Token::Whitespace => {
                    self.pos += 1;
                    skipped = true;
                }
                Token::Newline => {
                    newlines += 1;
                    self.pos += 1;
                    skipped = true;
                }
                _ => break,
            }
        }
        if newlines >= 2 {
            Gap::Parbreak
        } else if skipped {
            Gap::Skipped
        } else {
            Gap::None
        }
    }

    /// Consume arguments per signature. Missing arguments stop the
    /// gobble; whatever was present is kept.
    fn gobble_args(&mut self, signature: &MacroSignature) -> Vec<Argument> {
        let mut args = Vec::new();

        for spec in &signature.args {
            let save = self.pos;
            if self.skip_gap() == Gap::Parbreak {
                self.pos = save;
                break;
            }

            match spec {
                ArgSpec::Optional => {
                    if matches!(self.tokens.get(self.pos), Some((Token::OpenBracket, _))) {
                        let start = self.offset();
                        self.pos += 1;
                        let content = self.parse_content(&Terminator::OptionalClose);
                        args.push(Argument {
                            open_mark: "[".to_string(),
                            close_mark: "]".to_string(),
                            content,
                            position: self.span_from(start),
                        });
                    } else {
                        // Absent optional arguments are not recorded
                        self.pos = save;
                    }
                }
                ArgSpec::Mandatory => {
                    if !self.gobble_mandatory(signature.mode, &mut args) {
                        self.pos = save;
                        break;
                    }
                }
            }
        }

        args
    }

    /// Consume one mandatory argument: a brace group, or a single
    /// token (`\frac12`, `\frac\alpha\beta`). Returns false when
    /// nothing usable follows.
    fn gobble_mandatory(&mut self, mode: ArgParseMode, args: &mut Vec<Argument>) -> bool {
        let Some((token, span)) = self.tokens.get(self.pos).cloned() else {
            return false;
        };

        match token {
            Token::BeginGroup => {
                let start = span.start;
                self.pos += 1;
                let content = if mode == ArgParseMode::Verbatim {
                    self.capture_balanced_braces()
                } else {
                    self.parse_content(&Terminator::GroupClose)
                };
                args.push(Argument {
                    open_mark: "{".to_string(),
                    close_mark: "}".to_string(),
                    content,
                    position: self.span_from(start),
                });
                true
            }
            Token::Text(text) => {
                // TeX takes a single character as the argument
                let ch = text.chars().next().expect("text tokens are non-empty");
                let ch_len = ch.len_utf8();
                let arg_span = span.start..span.start + ch_len;
                if text.len() > ch_len {
                    self.tokens[self.pos] =
                        (Token::Text(text[ch_len..].to_string()), span.start + ch_len..span.end);
                } else {
                    self.pos += 1;
                }
                args.push(Argument {
                    open_mark: String::new(),
                    close_mark: String::new(),
                    content: vec![Node::String {
                        content: ch.to_string(),
                        position: Some(self.locator.span(arg_span)),
                    }],
                    position: Some(self.locator.span(span.start..span.start + ch_len)),
                });
                true
            }
            Token::ControlWord(word) => {
                self.pos += 1;
                args.push(Argument {
                    open_mark: String::new(),
                    close_mark: String::new(),
                    content: vec![Node::Macro {
                        content: word,
                        args: vec![],
                        position: Some(self.locator.span(span.clone())),
                    }],
                    position: Some(self.locator.span(span)),
                });
                true
            }
            Token::ControlSymbol(sym) => {
                self.pos += 1;
                args.push(Argument {
                    open_mark: String::new(),
                    close_mark: String::new(),
                    content: vec![Node::Macro {
                        content: sym,
                        args: vec![],
                        position: Some(self.locator.span(span.clone())),
                    }],
                    position: Some(self.locator.span(span)),
                });
                true
            }
            _ => false,
        }
    }

    /// Raw capture for verbatim-mode arguments: everything up to the
    /// brace balancing the already-consumed `{`.
    fn capture_balanced_braces(&mut self) -> Vec<Node> {
        let start = self.offset();
        let bytes = self.source.as_bytes();
        let mut depth = 1usize;
        let mut end = self.source.len();
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = i;
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        let content = self.source[start..end].to_string();
        // Past the closing brace, if one was found
        self.seek_to((end + 1).min(self.source.len()));
        if content.is_empty() {
            vec![]
        } else {
            vec![Node::String {
                content,
                position: self.span_to(start, end),
            }]
        }
    }
}
