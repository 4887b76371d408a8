//! Token definitions for LaTeX source
//!
//! All tokens are defined with the logos derive macro. The set follows
//! TeX's surface syntax: control words and control symbols, group
//! braces, math shifts, brackets (plain characters except where an
//! optional argument is expected), the alignment tab, comments, and
//! catch-all text runs.
//!
//! Lexing is total by construction: any byte sequence the patterns
//! below do not recognize is recovered as a text token by the lexer
//! (see [`lexer::tokenize`](super::lexer::tokenize)), so tokenization
//! never fails.

use logos::Logos;

/// All tokens produced from LaTeX source.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// A control word: backslash followed by letters, with an optional
    /// trailing star (`\section*`). The payload excludes the backslash.
    #[regex(r"\\[a-zA-Z@]+\*?", |lex| lex.slice()[1..].to_string())]
    ControlWord(String),

    /// A control symbol: backslash followed by a single non-letter
    /// (`\%`, `\\`, `\[`). The payload excludes the backslash.
    #[regex(r"\\[^a-zA-Z@]", |lex| lex.slice()[1..].to_string())]
    ControlSymbol(String),

    #[token("{")]
    BeginGroup,

    #[token("}")]
    EndGroup,

    /// `$$` - display math shift. Matched before the single `$` by
    /// longest-match.
    #[token("$$")]
    DoubleMathShift,

    /// `$` - inline math shift.
    #[token("$")]
    MathShift,

    /// `[` - plain text except immediately after a macro that accepts
    /// an optional argument.
    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    /// `&` - alignment tab inside tabular-like environments.
    #[token("&")]
    AlignTab,

    /// An unescaped `%` up to (not including) the end of line. The
    /// payload excludes the `%`.
    #[regex(r"%[^\n]*", |lex| lex.slice()[1..].to_string())]
    Comment(String),

    #[token("\n")]
    Newline,

    /// Horizontal whitespace (spaces, tabs, carriage returns).
    #[regex(r"[ \t\r]+")]
    Whitespace,

    /// A run of ordinary characters.
    #[regex(r"[^\\\{\}\$%&\[\]\s]+", |lex| lex.slice().to_string())]
    Text(String),
}

impl Token {
    /// Whether this token is whitespace (including newlines).
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Newline)
    }

    /// Whether this token starts a control sequence.
    pub fn is_control_sequence(&self) -> bool {
        matches!(self, Token::ControlWord(_) | Token::ControlSymbol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn lex_ok(source: &str) -> Vec<Token> {
        Token::lexer(source).map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_control_word() {
        assert_eq!(
            lex_ok(r"\section"),
            vec![Token::ControlWord("section".to_string())]
        );
    }

    #[test]
    fn test_starred_control_word() {
        assert_eq!(
            lex_ok(r"\section*"),
            vec![Token::ControlWord("section*".to_string())]
        );
    }

    #[test]
    fn test_control_symbols() {
        assert_eq!(
            lex_ok(r"\%\\"),
            vec![
                Token::ControlSymbol("%".to_string()),
                Token::ControlSymbol("\\".to_string()),
            ]
        );
    }

    #[test]
    fn test_escaped_percent_is_not_a_comment() {
        assert_eq!(
            lex_ok(r"\%x"),
            vec![
                Token::ControlSymbol("%".to_string()),
                Token::Text("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(
            lex_ok("% a comment\nx"),
            vec![
                Token::Comment(" a comment".to_string()),
                Token::Newline,
                Token::Text("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_double_math_shift_wins_over_single() {
        assert_eq!(
            lex_ok("$$x$$"),
            vec![
                Token::DoubleMathShift,
                Token::Text("x".to_string()),
                Token::DoubleMathShift,
            ]
        );
    }

    #[test]
    fn test_groups_and_words() {
        assert_eq!(
            lex_ok("{ab c}"),
            vec![
                Token::BeginGroup,
                Token::Text("ab".to_string()),
                Token::Whitespace,
                Token::Text("c".to_string()),
                Token::EndGroup,
            ]
        );
    }

    #[test]
    fn test_text_keeps_punctuation() {
        assert_eq!(lex_ok("a.b,c!"), vec![Token::Text("a.b,c!".to_string())]);
    }
}
