pub mod lexer;
pub mod parser;

pub use parser::normalize;

/// Token categories recognized by the notation lexer.
///
/// The grammar is deliberately small: numeric literals, letters-only
/// identifiers, the arithmetic operators, postfix `!`, parentheses, and the
/// two punctuation characters (`,`, `_`) that participate in the `log` call
/// forms. Anything else lexes as [`TokenKind::Unknown`] and is passed through
/// by the rewriter untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    /// Numeric literal: digits, optional fraction, optional `[eE][+-]?digits`.
    Number,
    /// Letters-only identifier (`x`, `sin`, `log`).
    Ident,
    Plus,
    Minus,
    Star,
    Slash,
    /// Exponentiation, spelled either `^` or `**`. Always emitted as `**`.
    Pow,
    /// Postfix factorial.
    Bang,
    LParen,
    RParen,
    Comma,
    Underscore,
    /// Any character outside the grammar.
    Unknown,
}
