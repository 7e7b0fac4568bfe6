use gc::Gc;

use crate::object::{BuiltinFn, BuiltinFunction, EvaluationError, Object};

/// Every host function reachable from Monkey code. Consulted only after the
/// environment chain has no binding for a name.
pub const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("len", builtin_len),
    ("first", builtin_first),
    ("last", builtin_last),
    ("rest", builtin_rest),
    ("push", builtin_push),
    ("puts", builtin_puts),
];

pub fn lookup(name: &str) -> Option<BuiltinFunction> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|&(name, func)| BuiltinFunction { name, func })
}

fn check_argument_count(expected: usize, args: &[Gc<Object>]) -> Result<(), EvaluationError> {
    if args.len() != expected {
        return Err(EvaluationError::WrongArgumentCount {
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn unsupported(function: &'static str, got: &Object) -> EvaluationError {
    EvaluationError::UnsupportedArgument {
        function,
        got: got.object_type(),
    }
}

fn builtin_len(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(1, &args)?;
    match args[0].as_ref() {
        Object::String(s) => Ok(Object::integer(s.chars().count() as i64)),
        Object::Array(arr) => Ok(Object::integer(arr.len() as i64)),
        other => Err(unsupported("len", other)),
    }
}

fn builtin_first(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(1, &args)?;
    match args[0].as_ref() {
        Object::Array(arr) => Ok(arr.first().cloned().unwrap_or_else(Object::null)),
        other => Err(unsupported("first", other)),
    }
}

fn builtin_last(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(1, &args)?;
    match args[0].as_ref() {
        Object::Array(arr) => Ok(arr.last().cloned().unwrap_or_else(Object::null)),
        other => Err(unsupported("last", other)),
    }
}

fn builtin_rest(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(1, &args)?;
    match args[0].as_ref() {
        Object::Array(arr) if arr.is_empty() => Ok(Object::null()),
        Object::Array(arr) => Ok(Object::array(arr[1..].to_owned())),
        other => Err(unsupported("rest", other)),
    }
}

// Arrays are values: the argument is copied, never modified.
fn builtin_push(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(2, &args)?;
    match args[0].as_ref() {
        Object::Array(arr) => {
            let mut new_arr = arr.clone();
            new_arr.push(args[1].clone());
            Ok(Object::array(new_arr))
        }
        other => Err(unsupported("push", other)),
    }
}

fn builtin_puts(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    for arg in &args {
        println!("{}", arg);
    }
    Ok(Object::null())
}
