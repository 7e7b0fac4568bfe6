//! End-to-end behaviour of the interpreter, from source text to objects.

use gc::Gc;

use monkey_lang_core::parse;
use monkey_lang_interpreter::environment::Environment;
use monkey_lang_interpreter::evaluator::eval_program;
use monkey_lang_interpreter::object::Object;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn run(source: &str) -> Gc<Object> {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "{}: {:?}", source, errors);
    eval_program(&program, &Environment::new())
}

#[test]
fn immediately_invoked_function() {
    assert_eq!(run("fn(x) { x; }(5)"), Object::integer(5));
}

#[test]
fn closures_outlive_the_call_that_made_them() {
    assert_eq!(
        run("let newAdder = fn(x) { fn(y) { x + y; }; }; let addTwo = newAdder(2); addTwo(3);"),
        Object::integer(5)
    );
    assert_eq!(
        run("let outer = fn(a, b) { fn() { a * b } }; let f = outer(6, 7); f()"),
        Object::integer(42)
    );
}

#[test]
fn len_of_strings_arrays_and_integers() {
    assert_eq!(run("len(\"abc\")"), Object::integer(3));
    assert_eq!(run("len([1,2,3])"), Object::integer(3));
    assert!(matches!(run("len(5)").as_ref(), Object::Error(_)));
}

#[test]
fn out_of_range_index_is_the_null_singleton() {
    let sources = [
        "[1,2,3][5]",
        "[1,2,3][-1]",
        "if (false) { 10 }",
        "{\"name\": \"a\"}[\"missing\"]",
    ];
    for source in sources {
        assert!(Gc::ptr_eq(&run(source), &Object::null()), "{}", source);
    }
    assert_eq!(run("{\"name\": \"a\"}[\"name\"]"), Object::string("a".to_owned()));
}

#[test]
fn shadowing_leaves_the_outer_binding_alone() {
    let environment = Environment::new();
    let (program, _) = parse("let x = 5; let f = fn() { let x = 10; x; }; f();");
    assert_eq!(eval_program(&program, &environment), Object::integer(10));

    let (lookup, _) = parse("x");
    assert_eq!(eval_program(&lookup, &environment), Object::integer(5));
}

const ROUND_TRIP_SAMPLES: &[&str] = &[
    "let x = 5; let y = x * (2 + 3); y;",
    "let f = fn(a, b) { if (a > b) { return a; } else { b } }; f(1, 2);",
    "let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } }; fib(10)",
    "[1, 2 * 3, -4][1 + 1]",
    "let h = {\"one\": 1, 2: \"two\", true: [3]}; h[true][0] + h[\"one\"] * 10",
    "!(1 < 2) == !true",
    "let add = fn(x) { fn(y) { x + y } }; add(1)(2) * -(3 - 10)",
    "rest(push([1, 2], 3))",
    "\"con\" + \"cat\"",
    "5 + true",
];

#[test]
fn printed_programs_evaluate_the_same() {
    for source in ROUND_TRIP_SAMPLES {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "{}: {:?}", source, errors);
        let printed = program.to_string();
        let (reparsed, errors) = parse(&printed);
        assert!(errors.is_empty(), "{}: {:?}", printed, errors);

        assert_eq!(
            eval_program(&reparsed, &Environment::new()),
            eval_program(&program, &Environment::new()),
            "{}",
            printed
        );
    }
}

// `i64::MIN` has no literal form: `-9223372036854775808` is negation of an
// out-of-range literal.
fn integer() -> impl Strategy<Value = i64> {
    (i64::MIN + 1)..=i64::MAX
}

proptest! {
    #[test]
    fn addition_commutes(a in integer(), b in integer()) {
        prop_assert_eq!(
            run(&format!("({}) + ({})", a, b)),
            run(&format!("({}) + ({})", b, a))
        );
    }

    #[test]
    fn adding_zero_is_identity_under_multiplication(a in integer(), b in integer()) {
        prop_assert_eq!(
            run(&format!("({}) * (({}) + 0)", a, b)),
            run(&format!("({}) * ({})", a, b))
        );
    }

    #[test]
    fn integer_literals_evaluate_to_themselves(a in integer()) {
        prop_assert_eq!(run(&format!("{}", a)), Object::integer(a));
    }
}
