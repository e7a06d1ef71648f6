use crate::TokenKind;

/// A single token together with its byte span in the original input.
///
/// Spans are what let the rewriter splice canonicalized expressions back into
/// the surrounding text: everything between two recognized expressions is
/// copied from the input verbatim, so unparseable fragments survive
/// byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// A lexer for informal math notation.
///
/// ## Overview
///
/// The lexer performs **character-level scanning** of the captured text,
/// producing a stream of [`Token`]s. It handles:
///
/// - **Numbers**: `123`, `1.5`, `1.`, `2e10`, `3.1E-4`
/// - **Identifiers**: letters-only runs (`x`, `sin`, `log`)
/// - **Operators**: `+ - * / ^ **` and postfix `!`
/// - **Punctuation**: `( ) , _`
/// - **Everything else**: single-character [`TokenKind::Unknown`] tokens
///
/// Whitespace is skipped between tokens and never appears inside one; the
/// rewriter recovers any whitespace it needs to preserve from the byte spans.
///
/// ## UTF-8 Handling
///
/// The lexer is fully UTF-8 aware. Position tracking uses byte offsets but
/// always advances by whole characters, so spans are valid slice boundaries.
/// Non-ASCII characters are not part of the grammar and lex as `Unknown`.
///
/// ## Examples
///
/// ```
/// use evalkey_notation::TokenKind;
/// use evalkey_notation::lexer::Lexer;
///
/// let tokens: Vec<_> = Lexer::new("log3(2 + 1)").collect();
/// assert_eq!(tokens[0].kind, TokenKind::Ident); // log
/// assert_eq!(tokens[1].kind, TokenKind::Number); // 3
/// assert_eq!(tokens[1].start, 3); // adjacency is visible in the spans
/// ```
pub struct Lexer<'a> {
    /// The input source text being lexed.
    input: &'a str,
    /// Current byte position in the input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new `Lexer` for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                self.position += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        // Whitespace separates tokens but is never a token itself.
        self.eat_while(char::is_whitespace);

        let start = self.position;
        let c = self.bump_char()?;

        let kind = match c {
            '0'..='9' => {
                self.eat_while(|c| c.is_ascii_digit());
                if self.peek_char() == Some('.') {
                    // Fractional part; the digits after the dot are optional,
                    // so `1.` is a complete literal.
                    self.bump_char();
                    self.eat_while(|c| c.is_ascii_digit());
                }
                // Exponent suffix only counts if at least one digit follows.
                let before_exp = self.position;
                if matches!(self.peek_char(), Some('e' | 'E')) {
                    self.bump_char();
                    if matches!(self.peek_char(), Some('+' | '-')) {
                        self.bump_char();
                    }
                    if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                        self.eat_while(|c| c.is_ascii_digit());
                    } else {
                        self.position = before_exp;
                    }
                }
                TokenKind::Number
            }
            c if c.is_ascii_alphabetic() => {
                self.eat_while(|c| c.is_ascii_alphabetic());
                TokenKind::Ident
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => {
                if self.peek_char() == Some('*') {
                    self.bump_char();
                    TokenKind::Pow
                } else {
                    TokenKind::Star
                }
            }
            '/' => TokenKind::Slash,
            '^' => TokenKind::Pow,
            '!' => TokenKind::Bang,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '_' => TokenKind::Underscore,
            _ => TokenKind::Unknown,
        };

        Some(Token {
            kind,
            text: &self.input[start..self.position],
            start,
            end: self.position,
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
