//! Token kinds and the reserved-word table.

use std::fmt;

use logos::Logos;
use serde::Serialize;

use crate::span::Span;

/// Token kinds for the walrus language.
///
/// Keywords carry no logos pattern: the lexer matches them as identifiers
/// and then consults [`TokenKind::keyword`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Literals
    /// `[0-9]+(\.[0-9]+)?`, with the fraction consumed by a callback.
    #[regex(r"[0-9]+", fraction)]
    Number,

    #[regex(r#""[^"]*""#)]
    String,

    #[regex(r"'[^']'")]
    Char,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // Delimiters
    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    // Operators
    #[token("==")]
    Equals,

    #[token("!=")]
    NotEquals,

    #[token("=")]
    Assign,

    #[token(":=")]
    Walrus,

    #[token("!")]
    Not,

    #[token("<=")]
    LessEquals,

    #[token("<")]
    Less,

    #[token(">=")]
    GreaterEquals,

    #[token(">")]
    Greater,

    #[token("||")]
    Or,

    #[token("&&")]
    And,

    #[token("..")]
    DotDot,

    #[token(".")]
    Dot,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token("->")]
    Arrow,

    #[token("?")]
    Question,

    #[token(",")]
    Comma,

    #[token("++")]
    PlusPlus,

    #[token("--")]
    MinusMinus,

    #[token("+=")]
    PlusAssign,

    #[token("-=")]
    MinusAssign,

    #[token("*=")]
    StarAssign,

    #[token("/=")]
    SlashAssign,

    #[token("%=")]
    PercentAssign,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("/")]
    Slash,

    #[token("*")]
    Star,

    #[token("%")]
    Percent,

    // Keywords
    Let,
    Const,
    New,
    Import,
    From,
    Fn,
    If,
    Elf,
    Els,
    Foreach,
    While,
    For,
    Export,
    Typeof,
    In,
    Null,
    True,
    False,
    Struct,
    Static,
    /// `pub` or `priv`
    AccessModifier,
    Readonly,
    Ret,

    /// Emitted by the block comment callback only when `*/` is missing.
    #[token("/*", block_comment)]
    UnterminatedComment,

    // End of file
    Eof,
}

/// Extends an integer match over `.digits`, leaving `..` alone.
fn fraction(lexer: &mut logos::Lexer<TokenKind>) {
    let rest = lexer.remainder();
    if let Some(after_dot) = rest.strip_prefix('.') {
        let digits = after_dot.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 {
            lexer.bump(1 + digits);
        }
    }
}

/// Skips a closed `/* ... */` comment, emits an error token otherwise.
fn block_comment(lexer: &mut logos::Lexer<TokenKind>) -> logos::Filter<()> {
    match lexer.remainder().find("*/") {
        Some(end) => {
            lexer.bump(end + 2);
            logos::Filter::Skip
        }
        None => {
            lexer.bump(lexer.remainder().len());
            logos::Filter::Emit(())
        }
    }
}

impl TokenKind {
    /// Look up a reserved word.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "new" => TokenKind::New,
            "import" => TokenKind::Import,
            "from" => TokenKind::From,
            "fn" => TokenKind::Fn,
            "if" => TokenKind::If,
            "elf" => TokenKind::Elf,
            "els" => TokenKind::Els,
            "foreach" => TokenKind::Foreach,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "export" => TokenKind::Export,
            "typeof" => TokenKind::Typeof,
            "in" => TokenKind::In,
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "struct" => TokenKind::Struct,
            "static" => TokenKind::Static,
            "pub" | "priv" => TokenKind::AccessModifier,
            "readonly" => TokenKind::Readonly,
            "ret" => TokenKind::Ret,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::New
                | TokenKind::Import
                | TokenKind::From
                | TokenKind::Fn
                | TokenKind::If
                | TokenKind::Elf
                | TokenKind::Els
                | TokenKind::Foreach
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Export
                | TokenKind::Typeof
                | TokenKind::In
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Struct
                | TokenKind::Static
                | TokenKind::AccessModifier
                | TokenKind::Readonly
                | TokenKind::Ret
        )
    }

    /// Fixed source text of punctuation and operators.
    pub fn symbol(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Equals => "==",
            TokenKind::NotEquals => "!=",
            TokenKind::Assign => "=",
            TokenKind::Walrus => ":=",
            TokenKind::Not => "!",
            TokenKind::LessEquals => "<=",
            TokenKind::Less => "<",
            TokenKind::GreaterEquals => ">=",
            TokenKind::Greater => ">",
            TokenKind::Or => "||",
            TokenKind::And => "&&",
            TokenKind::DotDot => "..",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Arrow => "->",
            TokenKind::Question => "?",
            TokenKind::Comma => ",",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::StarAssign => "*=",
            TokenKind::SlashAssign => "/=",
            TokenKind::PercentAssign => "%=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Slash => "/",
            TokenKind::Star => "*",
            TokenKind::Percent => "%",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol() {
            return write!(f, "`{}`", symbol);
        }
        match self {
            TokenKind::Number => write!(f, "number"),
            TokenKind::String => write!(f, "string"),
            TokenKind::Char => write!(f, "character"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::AccessModifier => write!(f, "access modifier"),
            TokenKind::UnterminatedComment => write!(f, "unterminated comment"),
            TokenKind::Eof => write!(f, "end of file"),
            keyword => write!(f, "keyword `{}`", format!("{:?}", keyword).to_lowercase()),
        }
    }
}

/// A token with its kind, text, and source span.
///
/// For strings and characters `text` holds the contents without quotes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Number | TokenKind::Identifier | TokenKind::String | TokenKind::Char => {
                write!(f, "{:?}({})", self.kind, self.text)
            }
            kind => write!(f, "{:?}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table() {
        assert_eq!(TokenKind::keyword("elf"), Some(TokenKind::Elf));
        assert_eq!(TokenKind::keyword("pub"), Some(TokenKind::AccessModifier));
        assert_eq!(TokenKind::keyword("priv"), Some(TokenKind::AccessModifier));
        assert_eq!(TokenKind::keyword("ret"), Some(TokenKind::Ret));
        assert_eq!(TokenKind::keyword("return"), None);
        assert!(TokenKind::Readonly.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::Walrus.to_string(), "`:=`");
        assert_eq!(TokenKind::Foreach.to_string(), "keyword `foreach`");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
