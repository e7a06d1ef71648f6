//! The stock transformer chain.
//!
//! Two transformers cover the common case end to end: `math` turns captured
//! text into a number (notation rewrite, then the math backend), and
//! `formatting` turns a number back into text. Registered in that order with
//! omitted priorities, so math is attempted first and the dispatcher's
//! restart lets formatting pick up its output.

use crate::backend::{MathBackend, Number};
use evalkey_notation::normalize;
use evalkey_pipeline::{Pipeline, TransformError, Transformer, TypeTag, Value};
use std::sync::Arc;

/// Registers the default transformers against `pipeline`.
pub fn install(pipeline: &Pipeline, backend: Arc<dyn MathBackend>) {
    pipeline.register(math(backend));
    pipeline.register(formatting());
}

/// Text-gated: canonicalize the notation, then ask the backend.
pub fn math(backend: Arc<dyn MathBackend>) -> Transformer {
    Transformer::new("math", move |value| {
        let text = value
            .as_text()
            .ok_or_else(|| TransformError::failed("expected text input"))?;
        let canonical = normalize(text);
        match backend.evaluate(&canonical) {
            Ok(Number::Int(n)) => Ok(Value::Int(n)),
            Ok(Number::Float(x)) => Ok(Value::Float(x)),
            Err(error) => Err(TransformError::failed(error)),
        }
    })
    .requires(TypeTag::Text)
}

/// Number-gated: render integers plainly and floats to 14 significant
/// digits.
pub fn formatting() -> Transformer {
    Transformer::new("formatting", |value| match value {
        Value::Int(n) => Ok(Value::Text(n.to_string())),
        Value::Float(x) => Ok(Value::Text(format_float(*x))),
        Value::Text(_) => Err(TransformError::failed("already text")),
    })
    .requires(TypeTag::Number)
}

/// Renders a float with 14 significant digits, the shape of C's `%.14g`:
/// trailing zeros trimmed, scientific notation once the exponent leaves
/// `-4..14`.
pub fn format_float(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return x.to_string();
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let formatted = format!("{:.13e}", x.abs());
    let (mantissa, exp) = formatted
        .split_once('e')
        .expect("float exponent formatting always contains `e`");
    let exp: i32 = exp.parse().expect("float exponent is a valid integer");

    if !(-4..14).contains(&exp) {
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        return format!("{sign}{mantissa}e{exp:+03}");
    }

    // All 14 significant digits, with the decimal point re-placed.
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    if exp >= 0 {
        let (int_part, frac_part) = digits.split_at(exp as usize + 1);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{frac_part}")
        }
    } else {
        let zeros = "0".repeat((-exp - 1) as usize);
        let frac = digits.trim_end_matches('0');
        format!("{sign}0.{zeros}{frac}")
    }
}
