use crate::TokenKind;
use crate::lexer::{Lexer, Token};

/// Rewrites informal math notation into the canonical operator form.
///
/// ## Overview
///
/// `normalize` scans the input for expressions of the recognized grammar and
/// replaces each one with its canonical re-serialization:
///
/// - `^` becomes `**` (both spellings are accepted)
/// - postfix `!` becomes `factorial(...)`
/// - `log_b(x)` and `logB(x)` become `log(x,b)` (argument first, base second)
/// - ordinary calls like `sin(x)` keep their shape, argument normalized
/// - all whitespace inside a recognized expression is removed
///
/// Anything the grammar does not cover is left byte-for-byte unchanged,
/// including whitespace between two separate recognized expressions. The
/// function is total: there is no error case, and running it twice yields the
/// same string as running it once.
///
/// ## Examples
///
/// ```
/// use evalkey_notation::normalize;
///
/// assert_eq!(normalize("9 ^ 5"), "9**5");
/// assert_eq!(normalize("log3(2 + 1)"), "log(2+1,3)");
/// assert_eq!(normalize("-log(1+2)!"), "-factorial(log(1+2))");
/// assert_eq!(normalize("hello world"), "hello world");
/// ```
pub fn normalize(input: &str) -> String {
    let tokens: Vec<Token> = Lexer::new(input).collect();
    let mut out = String::with_capacity(input.len());
    // Byte offset up to which the input has been copied into `out`.
    let mut copied = 0;
    let mut i = 0;

    while i < tokens.len() {
        let mut rewriter = Rewriter {
            tokens: &tokens,
            pos: i,
        };
        match rewriter.expression() {
            Some(rendered) => {
                // The gap before the match (whitespace, unparseable bytes)
                // passes through verbatim.
                out.push_str(&input[copied..tokens[i].start]);
                out.push_str(&rendered);
                copied = tokens[rewriter.pos - 1].end;
                i = rewriter.pos;
            }
            None => i += 1,
        }
    }

    out.push_str(&input[copied..]);
    out
}

/// Precedence-climbing parser that emits canonical text instead of values.
///
/// Binding strength, loosest to tightest: `+ -` < `* /` < `**` < unary sign
/// < postfix `!` < atoms. Each level consumes as much as it can and rewinds
/// to before a trailing operator whose operand fails to parse, so a partial
/// tail like the `+` in `1+` never poisons an otherwise valid prefix.
struct Rewriter<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'a> Rewriter<'_, 'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        let token = self.peek()?;
        if token.kind == kind {
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    /// Addition and subtraction, left-associative.
    fn expression(&mut self) -> Option<String> {
        let mut lhs = self.term()?;
        loop {
            let save = self.pos;
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Plus) => "+",
                Some(TokenKind::Minus) => "-",
                _ => break,
            };
            self.pos += 1;
            match self.term() {
                Some(rhs) => {
                    lhs.push_str(op);
                    lhs.push_str(&rhs);
                }
                None => {
                    self.pos = save;
                    break;
                }
            }
        }
        Some(lhs)
    }

    /// Multiplication and division, left-associative.
    fn term(&mut self) -> Option<String> {
        let mut lhs = self.power()?;
        loop {
            let save = self.pos;
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Star) => "*",
                Some(TokenKind::Slash) => "/",
                _ => break,
            };
            self.pos += 1;
            match self.power() {
                Some(rhs) => {
                    lhs.push_str(op);
                    lhs.push_str(&rhs);
                }
                None => {
                    self.pos = save;
                    break;
                }
            }
        }
        Some(lhs)
    }

    /// Exponentiation. Both `^` and `**` are accepted; `**` is emitted.
    fn power(&mut self) -> Option<String> {
        let mut lhs = self.unary()?;
        loop {
            let save = self.pos;
            if self.eat(TokenKind::Pow).is_none() {
                break;
            }
            match self.unary() {
                Some(rhs) => {
                    lhs.push_str("**");
                    lhs.push_str(&rhs);
                }
                None => {
                    self.pos = save;
                    break;
                }
            }
        }
        Some(lhs)
    }

    /// Prefix sign. Binds looser than factorial: `-5!` is `-(5!)`.
    fn unary(&mut self) -> Option<String> {
        let save = self.pos;
        let sign = match self.peek().map(|t| t.kind) {
            Some(TokenKind::Plus) => Some("+"),
            Some(TokenKind::Minus) => Some("-"),
            _ => None,
        };
        if let Some(sign) = sign {
            self.pos += 1;
            match self.unary() {
                Some(operand) => return Some(format!("{sign}{operand}")),
                None => {
                    self.pos = save;
                    return None;
                }
            }
        }
        self.postfix()
    }

    /// Postfix factorial, applied innermost-first: `5!!` nests.
    fn postfix(&mut self) -> Option<String> {
        let mut operand = self.atom()?;
        while self.eat(TokenKind::Bang).is_some() {
            operand = format!("factorial({operand})");
        }
        Some(operand)
    }

    fn atom(&mut self) -> Option<String> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Number => {
                self.pos += 1;
                Some(token.text.to_string())
            }
            TokenKind::LParen => self.paren_group(),
            TokenKind::Ident => Some(self.call_or_ident(token)),
            _ => None,
        }
    }

    /// `( expr )`, parentheses preserved in the output.
    fn paren_group(&mut self) -> Option<String> {
        let save = self.pos;
        self.eat(TokenKind::LParen)?;
        if let Some(inner) = self.expression()
            && self.eat(TokenKind::RParen).is_some()
        {
            return Some(format!("({inner})"));
        }
        self.pos = save;
        None
    }

    /// Function-call forms, tried in priority order: indexed log, suffixed
    /// log, generic call. Falls back to a bare identifier.
    fn call_or_ident(&mut self, ident: Token<'a>) -> String {
        if ident.text == "log" {
            if let Some(rewritten) = self.indexed_log(ident) {
                return rewritten;
            }
            if let Some(rewritten) = self.suffixed_log(ident) {
                return rewritten;
            }
        }

        let save = self.pos;
        self.pos += 1; // the identifier
        if self.eat(TokenKind::LParen).is_some() {
            if let Some(arg) = self.expression()
                && self.eat(TokenKind::RParen).is_some()
            {
                return format!("{}({arg})", ident.text);
            }
            self.pos = save + 1;
        }
        ident.text.to_string()
    }

    /// `log_<base>(arg)` where the base is a parenthesized expression or a
    /// bare number/identifier. The underscore must be glued to `log`; that is
    /// what makes it the `log_` token rather than a stray underscore.
    fn indexed_log(&mut self, ident: Token<'a>) -> Option<String> {
        let save = self.pos;
        let underscore = self.tokens.get(self.pos + 1)?;
        if underscore.kind != TokenKind::Underscore || underscore.start != ident.end {
            return None;
        }
        self.pos += 2;

        let base = match self.log_base() {
            Some(base) => base,
            None => {
                self.pos = save;
                return None;
            }
        };
        match self.paren_arg() {
            Some(arg) => Some(format!("log({arg},{base})")),
            None => {
                self.pos = save;
                None
            }
        }
    }

    fn log_base(&mut self) -> Option<String> {
        if let Some(group) = self.paren_group() {
            return Some(group);
        }
        let token = self.peek()?;
        match token.kind {
            TokenKind::Number | TokenKind::Ident => {
                self.pos += 1;
                Some(token.text.to_string())
            }
            _ => None,
        }
    }

    /// `log<number>(arg)`, e.g. `log3(2+1)`. The base literal must be glued
    /// to `log`; `log 3(x)` is not a call.
    fn suffixed_log(&mut self, ident: Token<'a>) -> Option<String> {
        let save = self.pos;
        let base = self.tokens.get(self.pos + 1)?;
        if base.kind != TokenKind::Number || base.start != ident.end {
            return None;
        }
        self.pos += 2;

        match self.paren_arg() {
            Some(arg) => Some(format!("log({arg},{})", base.text)),
            None => {
                self.pos = save;
                None
            }
        }
    }

    /// A mandatory parenthesized argument; rewinding is the caller's job.
    fn paren_arg(&mut self) -> Option<String> {
        self.eat(TokenKind::LParen)?;
        let arg = self.expression()?;
        self.eat(TokenKind::RParen)?;
        Some(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_removed_inside_expression() {
        assert_eq!(normalize("1 +  \t 2  + \n 3  + x  +\ny+  z"), "1+2+3+x+y+z");
    }

    #[test]
    fn test_exponent_spellings() {
        assert_eq!(normalize("9 ^ 5"), "9**5");
        assert_eq!(normalize("9 ** 5"), "9**5");
    }

    #[test]
    fn test_indexed_log() {
        assert_eq!(normalize("log_123(456)"), "log(456,123)");
        assert_eq!(normalize("log_abc(xyz)"), "log(xyz,abc)");
        assert_eq!(normalize("log_(1+2+3)((x+y)*z)"), "log((x+y)*z,(1+2+3))");
        assert_eq!(normalize("log_(1+2+3)((x + y) * z)"), "log((x+y)*z,(1+2+3))");
    }

    #[test]
    fn test_suffixed_log() {
        assert_eq!(normalize("log3(2 + 1)"), "log(2+1,3)");
        assert_eq!(normalize("log1.5(9 ^ 5)"), "log(9**5,1.5)");
    }

    #[test]
    fn test_suffixed_log_requires_adjacency() {
        // With a space the number is no longer a base suffix; each piece
        // normalizes on its own and the gap survives.
        assert_eq!(normalize("log 3(2+1)"), "log 3(2+1)");
    }

    #[test]
    fn test_factorial() {
        assert_eq!(normalize("5!"), "factorial(5)");
        assert_eq!(normalize("x!"), "factorial(x)");
        assert_eq!(normalize("(1+2)!"), "factorial((1+2))");
        assert_eq!(normalize("5!!"), "factorial(factorial(5))");
    }

    #[test]
    fn test_factorial_binds_tighter_than_sign() {
        assert_eq!(normalize("-log(1+2)!"), "-factorial(log(1+2))");
        assert_eq!(normalize("-5!"), "-factorial(5)");
    }

    #[test]
    fn test_generic_call_passes_through_normalized() {
        assert_eq!(normalize("sin( x + 1 )"), "sin(x+1)");
        assert_eq!(normalize("f(g(2 ^ 2))"), "f(g(2**2))");
    }

    #[test]
    fn test_unrecognized_text_unchanged() {
        assert_eq!(normalize("hello world"), "hello world");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("??"), "??");
    }

    #[test]
    fn test_partial_tail_does_not_poison_prefix() {
        assert_eq!(normalize("1 + 2 +"), "1+2 +");
        assert_eq!(normalize("1+*2"), "1+*2");
    }

    #[test]
    fn test_gap_between_matches_preserved() {
        // Two separate matches; the whitespace between them is a gap, not
        // part of either expression.
        assert_eq!(normalize("5! hello"), "factorial(5) hello");
    }

    #[test]
    fn test_unary_stacking() {
        assert_eq!(normalize("- - 5"), "--5");
        assert_eq!(normalize("2 ^ -3"), "2**-3");
    }

    #[test]
    fn test_idempotence_on_rewritten_forms() {
        for input in [
            "log_(1+2+3)((x + y) * z)",
            "log1.5(9 ^ 5)",
            "-log(1+2)!",
            "5!!",
            "1 + 2 * 3 ^ 4",
            "hello world",
            "f(x, y)",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_call_with_comma_args_is_not_a_call_but_survives() {
        // The grammar's calls take a single expression; a comma list falls
        // back to pass-through with the pieces normalized individually.
        assert_eq!(normalize("f(x, y)"), "f(x, y)");
        assert_eq!(normalize("log(456,123)"), "log(456,123)");
    }
}
