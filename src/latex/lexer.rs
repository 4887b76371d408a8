//! Base tokenization for LaTeX source
//!
//! This module provides the raw tokenization using the logos lexer,
//! returning tokens paired with their byte spans. This is the entry
//! point where source strings become token streams.
//!
//! Tokenization is total: slices the token patterns reject (a lone
//! trailing backslash, invalid UTF-8 boundaries never occur in `&str`)
//! are recovered as [`Token::Text`] so that any input produces a token
//! stream covering every byte of the source.

use super::token::Token;
use logos::Logos;

/// Tokenize source code with location information.
///
/// Returns tokens paired with their byte spans. Concatenating the
/// source slices of all spans reproduces the input exactly; the parser
/// relies on this to support verbatim capture and range formatting.
pub fn tokenize(source: &str) -> Vec<(Token, logos::Span)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            // Unrecognized input degrades to literal text
            Err(()) => tokens.push((Token::Text(lexer.slice().to_string()), lexer.span())),
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizes() {
        let tokens = tokenize("hello world");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].0, Token::Text("hello".to_string()));
        assert_eq!(tokens[1].0, Token::Whitespace);
        assert_eq!(tokens[2].0, Token::Text("world".to_string()));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize(""), vec![]);
    }

    #[test]
    fn test_spans_cover_source() {
        let source = r"\frac{1}{2} % half";
        let tokens = tokenize(source);
        let mut end = 0;
        for (_, span) in &tokens {
            assert_eq!(span.start, end, "spans must be contiguous");
            end = span.end;
        }
        assert_eq!(end, source.len());
    }

    #[test]
    fn test_trailing_backslash_degrades_to_text() {
        let tokens = tokenize("a\\");
        assert_eq!(tokens[0].0, Token::Text("a".to_string()));
        assert_eq!(tokens[1].0, Token::Text("\\".to_string()));
    }

    #[test]
    fn test_macro_with_arguments() {
        let tokens = tokenize(r"\frac{1}{2}");
        let kinds: Vec<&Token> = tokens.iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                &Token::ControlWord("frac".to_string()),
                &Token::BeginGroup,
                &Token::Text("1".to_string()),
                &Token::EndGroup,
                &Token::BeginGroup,
                &Token::Text("2".to_string()),
                &Token::EndGroup,
            ]
        );
    }
}
