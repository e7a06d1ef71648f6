use evalkey_notation::normalize;
use expect_test::expect;

/// Renders a battery of inputs as `input => output` lines so the whole
/// rewrite surface is reviewable in one golden block.
fn transcript(inputs: &[&str]) -> String {
    inputs
        .iter()
        .map(|input| format!("{input:?} => {:?}\n", normalize(input)))
        .collect()
}

#[test]
fn golden_rewrites() {
    let actual = transcript(&[
        "1 +  \t 2  + \n 3  + x  +\ny+  z",
        "log_123(456)",
        "log_abc(xyz)",
        "log_(1+2+3)((x + y) * z)",
        "log3(2 + 1)",
        "log1.5(9 ^ 5)",
        "5!",
        "x!",
        "(1+2)!",
        "-log(1+2)!",
        "sin( x )",
        "2x",
        "hello world",
    ]);
    expect![[r#"
        "1 +  \t 2  + \n 3  + x  +\ny+  z" => "1+2+3+x+y+z"
        "log_123(456)" => "log(456,123)"
        "log_abc(xyz)" => "log(xyz,abc)"
        "log_(1+2+3)((x + y) * z)" => "log((x+y)*z,(1+2+3))"
        "log3(2 + 1)" => "log(2+1,3)"
        "log1.5(9 ^ 5)" => "log(9**5,1.5)"
        "5!" => "factorial(5)"
        "x!" => "factorial(x)"
        "(1+2)!" => "factorial((1+2))"
        "-log(1+2)!" => "-factorial(log(1+2))"
        "sin( x )" => "sin(x)"
        "2x" => "2x"
        "hello world" => "hello world"
    "#]]
    .assert_eq(&actual);
}

#[test]
fn normalize_is_idempotent() {
    let inputs = [
        "1 +  \t 2  + \n 3  + x  +\ny+  z",
        "log_(1+2+3)((x + y) * z)",
        "log1.5(9 ^ 5)",
        "-log(1+2)!",
        "5!!",
        "f(x, y)",
        "1+*2",
        "?? not math ??",
    ];
    for input in inputs {
        let once = normalize(input);
        assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
    }
}
