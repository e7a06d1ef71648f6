use crate::backend::{BackendError, MathBackend, Number};
use evalkey_notation::TokenKind;
use evalkey_notation::lexer::{Lexer, Token};

/// Built-in numeric evaluator over the canonical grammar.
///
/// Accepts exactly what the notation rewriter emits: numbers, `+ - * / **`,
/// unary sign, parentheses, `factorial(n)`, `log(x)` / `log(x, base)`, a
/// handful of named functions, the constants `e` and `pi`, and implicit
/// multiplication by adjacency (`2x`, `3(4+1)`). Integer arithmetic stays
/// integer while it is exact and promotes to float on overflow or inexact
/// division.
///
/// Operator semantics follow the conventional rules rather than the
/// rewriter's surface grammar: `**` is right-associative and binds tighter
/// than unary sign, so `-2**2` is `-4`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinBackend;

impl BuiltinBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MathBackend for BuiltinBackend {
    fn evaluate(&self, expr: &str) -> Result<Number, BackendError> {
        let tokens: Vec<Token> = Lexer::new(expr).collect();
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            end: expr.len(),
        };
        let value = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(parse_error(
                token.start,
                format!("unexpected `{}`", token.text),
            ));
        }
        if let Number::Float(x) = value {
            if !x.is_finite() {
                return Err(BackendError::Domain("result is not a finite number".into()));
            }
        }
        Ok(value)
    }
}

fn parse_error(at: usize, message: impl Into<String>) -> BackendError {
    BackendError::Parse {
        at,
        message: message.into(),
    }
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    /// Byte length of the input, for positioning end-of-input errors.
    end: usize,
}

impl<'a> Parser<'_, 'a> {
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

    fn here(&self) -> usize {
        self.peek().map_or(self.end, |t| t.start)
    }

    /// Addition and subtraction.
    fn expression(&mut self) -> Result<Number, BackendError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::Plus) => {
                    self.pos += 1;
                    lhs = add(lhs, self.term()?);
                }
                Some(TokenKind::Minus) => {
                    self.pos += 1;
                    lhs = sub(lhs, self.term()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    /// Multiplication and division, explicit or by adjacency.
    fn term(&mut self) -> Result<Number, BackendError> {
        let mut lhs = self.factor()?;
        loop {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::Star) => {
                    self.pos += 1;
                    lhs = mul(lhs, self.factor()?);
                }
                Some(TokenKind::Slash) => {
                    self.pos += 1;
                    lhs = div(lhs, self.factor()?)?;
                }
                // Implicit multiplication: `2x`, `3(4+1)`, `(1+1)(2+2)`.
                Some(TokenKind::Number | TokenKind::Ident | TokenKind::LParen) => {
                    lhs = mul(lhs, self.factor()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    /// Unary sign. Binds looser than `**`: `-2**2` is `-(2**2)`.
    fn factor(&mut self) -> Result<Number, BackendError> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Plus) => {
                self.pos += 1;
                self.factor()
            }
            Some(TokenKind::Minus) => {
                self.pos += 1;
                Ok(neg(self.factor()?))
            }
            _ => self.power(),
        }
    }

    /// Exponentiation, right-associative; the exponent may carry a sign.
    fn power(&mut self) -> Result<Number, BackendError> {
        let base = self.atom()?;
        if self.eat(TokenKind::Pow).is_some() {
            let exponent = self.factor()?;
            return Ok(pow(base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, BackendError> {
        let Some(token) = self.peek() else {
            return Err(parse_error(self.end, "expected an expression"));
        };
        match token.kind {
            TokenKind::Number => {
                self.pos += 1;
                literal(token)
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.expression()?;
                if self.eat(TokenKind::RParen).is_none() {
                    return Err(parse_error(self.here(), "expected `)`"));
                }
                Ok(inner)
            }
            TokenKind::Ident => {
                self.pos += 1;
                if self.eat(TokenKind::LParen).is_some() {
                    let args = self.arguments()?;
                    apply(token.text, &args, token.start)
                } else {
                    constant(token)
                }
            }
            _ => Err(parse_error(
                token.start,
                format!("unexpected `{}`", token.text),
            )),
        }
    }

    /// Comma-separated argument list; the closing paren is consumed here.
    fn arguments(&mut self) -> Result<Vec<Number>, BackendError> {
        let mut args = vec![self.expression()?];
        while self.eat(TokenKind::Comma).is_some() {
            args.push(self.expression()?);
        }
        if self.eat(TokenKind::RParen).is_none() {
            return Err(parse_error(self.here(), "expected `)` after arguments"));
        }
        Ok(args)
    }
}

fn literal(token: Token) -> Result<Number, BackendError> {
    let text = token.text;
    if text.contains(['.', 'e', 'E']) {
        return text
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|e| parse_error(token.start, format!("invalid number: {e}")));
    }
    match text.parse::<i64>() {
        Ok(n) => Ok(Number::Int(n)),
        // Too many digits for i64; fall back to the float reading.
        Err(_) => text
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|e| parse_error(token.start, format!("invalid number: {e}"))),
    }
}

fn constant(token: Token) -> Result<Number, BackendError> {
    match token.text {
        "e" => Ok(Number::Float(std::f64::consts::E)),
        "pi" => Ok(Number::Float(std::f64::consts::PI)),
        name => Err(BackendError::Domain(format!("unknown identifier `{name}`"))),
    }
}

fn apply(name: &str, args: &[Number], at: usize) -> Result<Number, BackendError> {
    let unary = |f: fn(f64) -> f64| -> Result<Number, BackendError> {
        match args {
            [x] => Ok(Number::Float(f(x.as_f64()))),
            _ => Err(BackendError::Domain(format!(
                "`{name}` takes exactly 1 argument"
            ))),
        }
    };

    match name {
        "factorial" => match args {
            [n] => factorial(*n),
            _ => Err(BackendError::Domain(
                "`factorial` takes exactly 1 argument".into(),
            )),
        },
        "log" => match args {
            [x] => checked_ln(*x),
            [x, base] => log_base(*x, *base),
            _ => Err(BackendError::Domain("`log` takes 1 or 2 arguments".into())),
        },
        "abs" => match args {
            [Number::Int(n)] => Ok(Number::Int(n.saturating_abs())),
            [Number::Float(x)] => Ok(Number::Float(x.abs())),
            _ => Err(BackendError::Domain("`abs` takes exactly 1 argument".into())),
        },
        "sqrt" => match args {
            [x] if x.as_f64() < 0.0 => Err(BackendError::Domain(
                "square root of a negative number".into(),
            )),
            _ => unary(f64::sqrt),
        },
        "exp" => unary(f64::exp),
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        _ => Err(parse_error(at, format!("unknown function `{name}`"))),
    }
}

fn checked_ln(x: Number) -> Result<Number, BackendError> {
    if x.as_f64() <= 0.0 {
        return Err(BackendError::Domain("log of a non-positive number".into()));
    }
    Ok(Number::Float(x.as_f64().ln()))
}

fn log_base(x: Number, base: Number) -> Result<Number, BackendError> {
    if x.as_f64() <= 0.0 {
        return Err(BackendError::Domain("log of a non-positive number".into()));
    }
    let b = base.as_f64();
    if b <= 0.0 || b == 1.0 {
        return Err(BackendError::Domain(format!("invalid log base {b}")));
    }
    Ok(Number::Float(x.as_f64().ln() / b.ln()))
}

fn factorial(n: Number) -> Result<Number, BackendError> {
    let (value, was_int) = match n {
        Number::Int(n) => (n as f64, true),
        Number::Float(x) => (x, false),
    };
    if value < 0.0 || value.fract() != 0.0 {
        return Err(BackendError::Domain(
            "factorial is only defined for non-negative integers".into(),
        ));
    }
    // Exact in i64 up to 20!; beyond that the product continues in float.
    if was_int && value <= 20.0 {
        let mut product: i64 = 1;
        for k in 2..=(value as i64) {
            product *= k;
        }
        return Ok(Number::Int(product));
    }
    let mut product = 1.0f64;
    let mut k = 2.0;
    while k <= value {
        product *= k;
        k += 1.0;
    }
    Ok(Number::Float(product))
}

fn add(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => a
            .checked_add(b)
            .map(Number::Int)
            .unwrap_or(Number::Float(a as f64 + b as f64)),
        _ => Number::Float(a.as_f64() + b.as_f64()),
    }
}

fn sub(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => a
            .checked_sub(b)
            .map(Number::Int)
            .unwrap_or(Number::Float(a as f64 - b as f64)),
        _ => Number::Float(a.as_f64() - b.as_f64()),
    }
}

fn mul(a: Number, b: Number) -> Number {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => a
            .checked_mul(b)
            .map(Number::Int)
            .unwrap_or(Number::Float(a as f64 * b as f64)),
        _ => Number::Float(a.as_f64() * b.as_f64()),
    }
}

fn div(a: Number, b: Number) -> Result<Number, BackendError> {
    if b.as_f64() == 0.0 {
        return Err(BackendError::Domain("division by zero".into()));
    }
    match (a, b) {
        // Integer division stays integer only when it is exact.
        (Number::Int(a), Number::Int(b)) if a % b == 0 => Ok(Number::Int(a / b)),
        _ => Ok(Number::Float(a.as_f64() / b.as_f64())),
    }
}

fn neg(n: Number) -> Number {
    match n {
        Number::Int(n) => n
            .checked_neg()
            .map(Number::Int)
            .unwrap_or(Number::Float(-(n as f64))),
        Number::Float(x) => Number::Float(-x),
    }
}

fn pow(base: Number, exponent: Number) -> Number {
    if let (Number::Int(b), Number::Int(e)) = (base, exponent) {
        if (0..=u32::MAX as i64).contains(&e) {
            if let Some(n) = b.checked_pow(e as u32) {
                return Number::Int(n);
            }
        }
    }
    Number::Float(base.as_f64().powf(exponent.as_f64()))
}
