use crate::{Pipeline, Registry, TransformError, Transformer, TypeTag, Value};
use std::sync::Arc;

fn ok(name: &str) -> Transformer {
    let tag = format!("<{name}>");
    Transformer::new(name, move |_| Ok(Value::Text(tag.clone())))
}

fn fail(name: &str) -> Transformer {
    Transformer::new(name, |_| Err(TransformError::failed("nope")))
}

#[test]
fn test_default_priority_descends_from_zero() {
    let mut registry = Registry::new();
    assert_eq!(registry.register(ok("a")), 0);
    assert_eq!(registry.register(ok("b")), -1);
    assert_eq!(registry.register(ok("c")), -2);
}

#[test]
fn test_default_priority_continues_below_explicit_lowest() {
    let mut registry = Registry::new();
    registry.register(ok("high").priority(10));
    registry.register(ok("low").priority(-7));
    assert_eq!(registry.register(ok("later")), -8);
}

#[test]
fn test_entries_sorted_descending_stable_on_ties() {
    let mut registry = Registry::new();
    registry.register(fail("first-five").priority(5));
    registry.register(fail("ten").priority(10));
    registry.register(fail("second-five").priority(5));
    let order: Vec<_> = registry.entries().map(|e| (e.name().to_string(), e.priority())).collect();
    assert_eq!(
        order,
        vec![
            ("ten".to_string(), 10),
            ("first-five".to_string(), 5),
            ("second-five".to_string(), 5),
        ]
    );
}

#[test]
fn test_registration_during_run_is_invisible_to_that_run() {
    // A transformer that registers another transformer into the same
    // pipeline mid-run. The snapshot discipline means the current run must
    // not see it, while the next run must.
    let pipeline = Arc::new(Pipeline::new());
    let handle = Arc::clone(&pipeline);
    pipeline.register(Transformer::new("self-extending", move |v| {
        handle.register(Transformer::new("late", |_| Ok(Value::Int(999))).priority(100));
        match v {
            Value::Text(t) => Ok(Value::Text(format!("{t}+first"))),
            _ => Err(TransformError::failed("text only")),
        }
    }));

    let first = pipeline.evaluate(Value::Text("x".into())).unwrap();
    assert_eq!(first, Value::Text("x+first".into()));

    // The late registration is live now, outranks everything, and its
    // non-text output keeps the original transformer from re-running.
    let second = pipeline.evaluate(Value::Text("x".into())).unwrap();
    assert_eq!(second, Value::Int(999));
}

#[test]
fn test_type_gate_records_mismatch_without_invoking() {
    let pipeline = Pipeline::new();
    pipeline.register(
        Transformer::new("ints-only", |_| panic!("must not be invoked")).requires(TypeTag::Int),
    );
    let err = pipeline.evaluate(Value::Text("hi".into())).unwrap_err();
    assert_eq!(
        err.failures["ints-only"],
        TransformError::TypeMismatch {
            expected: TypeTag::Int,
            actual: TypeTag::Text,
        }
    );
}

#[test]
fn test_empty_registry_returns_input_unchanged() {
    let pipeline = Pipeline::new();
    let input = Value::Text("untouched".into());
    assert_eq!(pipeline.evaluate(input.clone()), Ok(input));
}
