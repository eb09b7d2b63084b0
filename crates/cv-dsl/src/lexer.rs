use logos::Logos;
use std::fmt;

/// Token type for the Clairvoyant DSL.
///
/// Keywords (`project`, `component`, `template`, `system`, `extends`,
/// `components`, `entities`, `true`, `false`) are plain `Token::Word`s and
/// are recognized by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left brace `{`.
    LBrace,
    /// Right brace `}`.
    RBrace,
    /// Left bracket `[`.
    LBracket,
    /// Right bracket `]`.
    RBracket,
    /// Colon `:`.
    Colon,
    /// Comma separator `,`.
    Comma,
    /// Quoted string literal, escapes already processed.
    Str(String),
    /// Numeric literal, kept as written in the source.
    Number(String),
    /// Bare word (identifier or keyword).
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token, converted to an owned `Token` after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Str,

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Word,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex source code into a sequence of `(Token, Span)` pairs.
///
/// Lexing continues past errors so every bad character is reported.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::LBrace => Token::LBrace,
                    RawToken::RBrace => Token::RBrace,
                    RawToken::LBracket => Token::LBracket,
                    RawToken::RBracket => Token::RBracket,
                    RawToken::Colon => Token::Colon,
                    RawToken::Comma => Token::Comma,
                    RawToken::Str => {
                        let slice = lexer.slice();
                        Token::Str(unescape(&slice[1..slice.len() - 1]))
                    }
                    RawToken::Number => Token::Number(lexer.slice().to_string()),
                    RawToken::Word => Token::Word(lexer.slice().to_string()),
                };
                tokens.push((token, span));
            }
            Err(()) => {
                let text = &source[span.clone()];
                let message = if text.starts_with(['"', '\'']) {
                    "unterminated string literal".to_string()
                } else {
                    format!("unexpected character: {text:?}")
                };
                errors.push(LexError { span, message });
            }
        }
    }

    (tokens, errors)
}

/// Process escape sequences in a string literal.
///
/// Supports `\\`, `\'`, `\"`, `\n`, `\r` and `\t`. Unknown sequences are
/// kept as-is.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty(), "errors: {errors:?}");
        tokens.into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn lex_component_header() {
        let types: Vec<_> = tokens("component Health { hp: 10 }")
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(types, vec!["component", "Health", "{", "hp", ":", "10", "}"]);
    }

    #[test]
    fn numbers_keep_literal_text() {
        assert_eq!(
            tokens("-1.50 3e8 007"),
            vec![
                Token::Number("-1.50".into()),
                Token::Number("3e8".into()),
                Token::Number("007".into()),
            ]
        );
    }

    #[test]
    fn both_quote_styles() {
        assert_eq!(
            tokens(r#"'it\'s' "say \"hi\"""#),
            vec![Token::Str("it's".into()), Token::Str("say \"hi\"".into())]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokens("// header\nproject Demo // trailing\n"),
            vec![Token::Word("project".into()), Token::Word("Demo".into())]
        );
    }

    #[test]
    fn lex_preserves_spans() {
        let (tokens, _) = lex("system  Move");
        assert_eq!(tokens[0].1, 0..6);
        assert_eq!(tokens[1].1, 8..12);
    }

    #[test]
    fn unexpected_character_reported() {
        let (tokens, errors) = lex("project # Demo");
        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 8..9);
        assert!(errors[0].message.contains("unexpected character"));
    }

    #[test]
    fn unterminated_string_reported() {
        let (_, errors) = lex("project \"Demo");
        assert!(!errors.is_empty());
        assert_eq!(errors[0].message, "unterminated string literal");
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape(r"a\nb\tc\rd"), "a\nb\tc\rd");
        assert_eq!(unescape(r"path\\file"), "path\\file");
        assert_eq!(unescape(r"\x"), "\\x");
        assert_eq!(unescape("trail\\"), "trail\\");
    }
}
