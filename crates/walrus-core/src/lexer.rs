//! Lexer for the walrus language.
//!
//! Uses the `logos` crate for matching and tracks line/column positions on
//! top of the byte ranges it reports.

use logos::Logos;

use crate::error::LexError;
use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};

/// The result of lexing a whole source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Tokenized {
    /// Tokens in source order, always terminated by [`TokenKind::Eof`]
    pub tokens: Vec<Token>,
    /// Physical source lines, for diagnostics
    pub lines: Vec<String>,
}

/// Tokenize `source` in one go.
pub fn tokenize(source: &str) -> Result<Tokenized, LexError> {
    let tokens = Lexer::new(source).tokenize()?;
    let lines = source.lines().map(str::to_string).collect();
    Ok(Tokenized { tokens, lines })
}

/// Lexer for the walrus language.
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, TokenKind>,
    cursor: Position,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            cursor: Position::default(),
            finished: false,
        }
    }

    /// Advance the cursor to `offset` and return the position there.
    fn position_at(&mut self, offset: usize) -> Position {
        if offset > self.cursor.offset {
            self.cursor.advance(&self.source[self.cursor.offset..offset]);
        }
        self.cursor
    }

    /// Get the next token, or `None` once end of file has been produced.
    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        if self.finished {
            return None;
        }

        let Some(result) = self.inner.next() else {
            self.finished = true;
            let end = self.position_at(self.source.len());
            return Some(Ok(Token::new(TokenKind::Eof, "", Span::new(end, end))));
        };

        let range = self.inner.span();
        let start = self.position_at(range.start);
        let end = self.position_at(range.end);
        let span = Span::new(start, end);
        let slice = self.inner.slice();

        let token = match result {
            Ok(TokenKind::UnterminatedComment) => {
                self.finished = true;
                return Some(Err(LexError::UnterminatedComment { span }));
            }
            Ok(TokenKind::Identifier) => {
                let kind = TokenKind::keyword(slice).unwrap_or(TokenKind::Identifier);
                Token::new(kind, slice, span)
            }
            Ok(kind @ (TokenKind::String | TokenKind::Char)) => {
                Token::new(kind, &slice[1..slice.len() - 1], span)
            }
            Ok(kind) => Token::new(kind, slice, span),
            Err(()) => {
                self.finished = true;
                let character = slice.chars().next().unwrap_or_default();
                return Some(Err(LexError::UnexpectedCharacter {
                    character,
                    line: start.line,
                    span,
                }));
            }
        };

        Some(Ok(token))
    }

    /// Tokenize the entire source.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token?);
        }
        tracing::trace!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn render(source: &str) -> String {
        tokenize(source)
            .unwrap()
            .tokens
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_string_plus_number() {
        insta::assert_snapshot!(render(r#""abc" + 1"#), @"String(abc) Plus Number(1) Eof");
    }

    #[test]
    fn test_positions_are_monotonic() {
        let tokens = tokenize("let x := 1;\n  x = x + 2;").unwrap().tokens;
        for pair in tokens.windows(2) {
            assert!(pair[0].span.start.offset <= pair[1].span.start.offset);
            assert!(pair[0].span.end.offset <= pair[1].span.start.offset);
        }
        let second_x = &tokens[5];
        assert_eq!(second_x.text, "x");
        assert_eq!(second_x.span.start.line, 2);
        assert_eq!(second_x.span.start.column, 3);
    }

    #[test]
    fn test_keywords() {
        let kinds = kinds("let const fn if elf els foreach while for in struct static pub priv readonly ret");
        assert!(kinds.contains(&TokenKind::Let));
        assert!(kinds.contains(&TokenKind::Const));
        assert!(kinds.contains(&TokenKind::Fn));
        assert!(kinds.contains(&TokenKind::Elf));
        assert!(kinds.contains(&TokenKind::Els));
        assert!(kinds.contains(&TokenKind::Foreach));
        assert!(kinds.contains(&TokenKind::Readonly));
        assert!(kinds.contains(&TokenKind::Ret));
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::AccessModifier).count(), 2);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(kinds("letter iffy"), vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_longest_operator_wins() {
        insta::assert_snapshot!(render("a := b += c -> d .. e == f"), @"Identifier(a) Walrus Identifier(b) PlusAssign Identifier(c) Arrow Identifier(d) DotDot Identifier(e) Equals Identifier(f) Eof");
    }

    #[test]
    fn test_range_between_numbers() {
        insta::assert_snapshot!(render("0..10 1.5"), @"Number(0) DotDot Number(10) Number(1.5) Eof");
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "a // line\n/* block\n comment */ b";
        let tokens = tokenize(source).unwrap().tokens;
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text, "b");
        assert_eq!(tokens[1].span.start.line, 3);
    }

    #[test]
    fn test_char_literal() {
        let tokens = tokenize("'x'").unwrap().tokens;
        assert_eq!(tokens[0].kind, TokenKind::Char);
        assert_eq!(tokens[0].text, "x");
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("let a := 1;\nlet b := #;").unwrap_err();
        match err {
            LexError::UnexpectedCharacter { character, line, span } => {
                assert_eq!(character, '#');
                assert_eq!(line, 2);
                assert_eq!(span.start.column, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = tokenize("a /* never closed").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { .. }));
    }

    #[test]
    fn test_lines_are_kept() {
        let tokenized = tokenize("a;\nb;").unwrap();
        assert_eq!(tokenized.lines, vec!["a;".to_string(), "b;".to_string()]);
    }
}
