use crate::backend::{BackendError, BuiltinBackend, MathBackend, Number};

fn eval(expr: &str) -> Result<Number, BackendError> {
    BuiltinBackend::new().evaluate(expr)
}

fn eval_f64(expr: &str) -> f64 {
    eval(expr).unwrap().as_f64()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval("1+1"), Ok(Number::Int(2)));
    assert_eq!(eval("2*3+4"), Ok(Number::Int(10)));
    assert_eq!(eval("2*(3+4)"), Ok(Number::Int(14)));
    assert_eq!(eval("9**5"), Ok(Number::Int(59049)));
}

#[test]
fn test_division_exactness() {
    assert_eq!(eval("4/2"), Ok(Number::Int(2)));
    assert_eq!(eval("1/2"), Ok(Number::Float(0.5)));
    assert!(matches!(eval("1/0"), Err(BackendError::Domain(_))));
}

#[test]
fn test_unary_and_pow_precedence() {
    // `**` binds tighter than unary sign and is right-associative.
    assert_eq!(eval("-2**2"), Ok(Number::Int(-4)));
    assert_eq!(eval("(-2)**2"), Ok(Number::Int(4)));
    assert_eq!(eval("2**-3"), Ok(Number::Float(0.125)));
    assert_eq!(eval("2**3**2"), Ok(Number::Int(512)));
}

#[test]
fn test_overflow_promotes_to_float() {
    match eval("10**30") {
        Ok(Number::Float(x)) => assert_close(x / 1e30, 1.0),
        other => panic!("expected float, got {other:?}"),
    }
    match eval("9223372036854775807 + 1") {
        Ok(Number::Float(_)) => {}
        other => panic!("expected float, got {other:?}"),
    }
}

#[test]
fn test_factorial() {
    assert_eq!(eval("factorial(0)"), Ok(Number::Int(1)));
    assert_eq!(eval("factorial(5)"), Ok(Number::Int(120)));
    assert_eq!(eval("factorial(20)"), Ok(Number::Int(2432902008176640000)));
    // 21! no longer fits in i64 and continues in float.
    match eval("factorial(21)") {
        Ok(Number::Float(x)) => assert_close(x / 5.109094217170944e19, 1.0),
        other => panic!("expected float, got {other:?}"),
    }
    assert!(matches!(eval("factorial(-1)"), Err(BackendError::Domain(_))));
    assert!(matches!(eval("factorial(1.5)"), Err(BackendError::Domain(_))));
}

#[test]
fn test_log_forms() {
    assert_close(eval_f64("log(e)"), 1.0);
    assert_close(eval_f64("log(8, 2)"), 3.0);
    assert_close(eval_f64("log(9**5, 3)"), 10.0);
    assert!(matches!(eval("log(0)"), Err(BackendError::Domain(_))));
    assert!(matches!(eval("log(2, 1)"), Err(BackendError::Domain(_))));
}

#[test]
fn test_named_functions_and_constants() {
    assert_close(eval_f64("sqrt(2)"), std::f64::consts::SQRT_2);
    assert_close(eval_f64("exp(1)"), std::f64::consts::E);
    assert_close(eval_f64("sin(0)"), 0.0);
    assert_close(eval_f64("cos(0)"), 1.0);
    assert_close(eval_f64("2pi"), 2.0 * std::f64::consts::PI);
    assert_eq!(eval("abs(-3)"), Ok(Number::Int(3)));
    assert!(matches!(eval("sqrt(-1)"), Err(BackendError::Domain(_))));
}

#[test]
fn test_implicit_multiplication() {
    assert_eq!(eval("2(3+4)"), Ok(Number::Int(14)));
    assert_eq!(eval("(1+1)(2+2)"), Ok(Number::Int(8)));
    // `2x**2` is 2*(x**2); with e for x that is 2e^2.
    assert_close(eval_f64("2e**2"), 2.0 * std::f64::consts::E.powi(2));
}

#[test]
fn test_rejects_what_it_cannot_evaluate() {
    assert!(matches!(eval(""), Err(BackendError::Parse { .. })));
    assert!(matches!(eval("1+"), Err(BackendError::Parse { .. })));
    assert!(matches!(eval("1)"), Err(BackendError::Parse { .. })));
    assert!(matches!(eval("(1"), Err(BackendError::Parse { .. })));
    assert!(matches!(eval("hello"), Err(BackendError::Domain(_))));
    assert!(matches!(eval("spin(1)"), Err(BackendError::Parse { .. })));
}

#[test]
fn test_error_positions_point_into_the_input() {
    match eval("1+)") {
        Err(BackendError::Parse { at, .. }) => assert_eq!(at, 2),
        other => panic!("expected parse error, got {other:?}"),
    }
}
