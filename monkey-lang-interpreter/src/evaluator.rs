use std::collections::BTreeMap;
use gc::Gc;

use crate::builtins;
use crate::environment::Environment;
use crate::object::{object_to_key, EvaluationError, Object};
use monkey_lang_core::ast;
use monkey_lang_core::ast::{Expression, InfixOperationKind, PrefixOperationKind};

/// Why evaluation of the current statement chain stopped early.
#[derive(Debug, PartialEq)]
enum QuickReturn {
    Return(Gc<Object>),
    Error(EvaluationError),
}

impl From<EvaluationError> for QuickReturn {
    fn from(value: EvaluationError) -> Self {
        QuickReturn::Error(value)
    }
}

type Evaluated = Result<Gc<Object>, QuickReturn>;

fn settle(result: Evaluated) -> Gc<Object> {
    match result {
        Ok(object) | Err(QuickReturn::Return(object)) => object,
        Err(QuickReturn::Error(error)) => Object::error(error),
    }
}

/// Evaluates each statement in order against `environment`, which may be
/// reused across calls to keep bindings alive between programs.
///
/// The result is the value of the last statement, the value of the first
/// top-level `return`, or an [`Object::Error`] if evaluation failed.
pub fn eval_program(program: &ast::Program, environment: &Environment) -> Gc<Object> {
    let mut output = Object::null();
    for statement in &program.statements {
        match run_statement(statement, environment) {
            Ok(object) => output = object,
            stopped => return settle(stopped),
        }
    }
    output
}

/// Evaluates a single statement the same way [`eval_program`] would.
pub fn eval_statement(statement: &ast::Statement, environment: &Environment) -> Gc<Object> {
    settle(run_statement(statement, environment))
}

fn run_statement(statement: &ast::Statement, environment: &Environment) -> Evaluated {
    match statement {
        ast::Statement::Expression(expression) => eval_expression(expression, environment),
        ast::Statement::Return(statement) => eval_return_statement(statement, environment),
        ast::Statement::Let(statement) => eval_let_statement(statement, environment),
    }
}

fn eval_let_statement(statement: &ast::LetStatement, environment: &Environment) -> Evaluated {
    let value = eval_expression(&statement.value, environment)?;
    environment.set(statement.identifier.name.clone(), value.clone());
    Ok(value)
}

fn eval_return_statement(
    statement: &ast::ReturnStatement,
    environment: &Environment,
) -> Evaluated {
    let value = eval_expression(&statement.value, environment)?;
    Err(QuickReturn::Return(value))
}

fn eval_block_statement(block: &ast::BlockStatement, environment: &Environment) -> Evaluated {
    let mut result = Object::null();
    for statement in &block.statements {
        result = run_statement(statement, environment)?;
    }
    Ok(result)
}

fn eval_expression(expression: &Expression, environment: &Environment) -> Evaluated {
    match expression {
        Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
        Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
        Expression::StringLiteral(value) => Ok(Object::string(value.clone())),
        Expression::ArrayLiteral(array) => {
            Ok(Object::array(eval_expressions(array, environment)?))
        }
        Expression::HashLiteral(literal) => eval_hash_literal(literal, environment),
        Expression::Identifier(identifier) => eval_identifier(identifier, environment),
        Expression::PrefixOperation(kind, right) => {
            let right = eval_expression(right, environment)?;
            Ok(eval_prefix_operation(*kind, right)?)
        }
        Expression::InfixOperation(kind, left, right) => {
            let left = eval_expression(left, environment)?;
            let right = eval_expression(right, environment)?;
            Ok(eval_infix_operation(*kind, left, right)?)
        }
        Expression::IfExpression {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, environment)?;
            if condition.is_truthy() {
                eval_block_statement(consequence, environment)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, environment)
            } else {
                Ok(Object::null())
            }
        }
        Expression::FunctionLiteral(literal) => {
            Ok(Object::function(literal.clone(), environment.clone()))
        }
        Expression::CallExpression {
            function,
            arguments,
        } => {
            let function = eval_expression(function, environment)?;
            let arguments = eval_expressions(arguments, environment)?;
            Ok(apply_function(&function, arguments)?)
        }
        Expression::IndexExpression { left, index } => {
            let left = eval_expression(left, environment)?;
            let index = eval_expression(index, environment)?;
            Ok(eval_index_expression(left, index)?)
        }
    }
}

// Environment first, built-ins second: a `let len = ...` hides the built-in.
fn eval_identifier(identifier: &ast::Identifier, environment: &Environment) -> Evaluated {
    if let Some(object) = environment.get(&identifier.name) {
        return match object.as_ref() {
            Object::Error(error) => Err(QuickReturn::Error(error.clone())),
            _ => Ok(object),
        };
    }
    builtins::lookup(&identifier.name)
        .map(Object::builtin_function)
        .ok_or_else(|| EvaluationError::UnknownIdentifier(identifier.name.clone()).into())
}

fn eval_expressions(
    expressions: &[Expression],
    environment: &Environment,
) -> Result<Vec<Gc<Object>>, QuickReturn> {
    let mut result = Vec::with_capacity(expressions.len());
    for expression in expressions {
        result.push(eval_expression(expression, environment)?);
    }
    Ok(result)
}

fn eval_hash_literal(
    literal: &[(Expression, Expression)],
    environment: &Environment,
) -> Evaluated {
    let mut hashmap = BTreeMap::new();
    for (key, value) in literal {
        let key = eval_expression(key, environment)?;
        let hashed_key = object_to_key(&key)?;
        let value = eval_expression(value, environment)?;
        hashmap.insert(hashed_key, (key, value));
    }
    Ok(Object::hash(hashmap))
}

/// Calls a user function or a built-in with already evaluated arguments.
pub fn apply_function(
    function: &Gc<Object>,
    arguments: Vec<Gc<Object>>,
) -> Result<Gc<Object>, EvaluationError> {
    match function.as_ref() {
        Object::Function(function) => {
            let parameters = function.parameters();
            if parameters.len() != arguments.len() {
                return Err(EvaluationError::WrongArgumentCount {
                    expected: parameters.len(),
                    actual: arguments.len(),
                });
            }
            tracing::trace!(arity = parameters.len(), "applying function");

            let call_environment = Environment::new_enclosed(&function.env);
            for (parameter, argument) in parameters.iter().zip(arguments) {
                call_environment.set(parameter.name.clone(), argument);
            }
            match eval_block_statement(function.body(), &call_environment) {
                Ok(object) | Err(QuickReturn::Return(object)) => Ok(object),
                Err(QuickReturn::Error(error)) => Err(error),
            }
        }
        Object::BuiltinFunction(builtin) => {
            tracing::trace!(
                name = builtin.name,
                arguments = arguments.len(),
                "calling builtin"
            );
            (builtin.func)(arguments)
        }
        other => Err(EvaluationError::CallNonFunction(other.object_type())),
    }
}

fn eval_index_expression(
    left: Gc<Object>,
    index: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (left.as_ref(), index.as_ref()) {
        (Object::Array(array), Object::Integer(index)) => Ok(usize::try_from(*index)
            .ok()
            .and_then(|index| array.get(index))
            .cloned()
            .unwrap_or_else(Object::null)),
        (Object::Array(_), other) => Err(EvaluationError::IndexingWithNonInteger(
            other.object_type(),
        )),
        (Object::Hash(hash), _) => {
            let hashed_index = object_to_key(&index)?;
            Ok(hash
                .get(&hashed_index)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(Object::null))
        }
        (other, _) => Err(EvaluationError::IndexNotSupported(other.object_type())),
    }
}

fn eval_prefix_operation(
    kind: PrefixOperationKind,
    right: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (kind, right.as_ref()) {
        (PrefixOperationKind::Bang, object) => Ok(Object::boolean(!object.is_truthy())),
        (PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        (PrefixOperationKind::Minus, other) => Err(EvaluationError::UnknownPrefixOperator {
            right: other.object_type(),
            operation: kind,
        }),
    }
}

fn eval_infix_operation(
    kind: InfixOperationKind,
    left: Gc<Object>,
    right: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(left), Object::Integer(right)) => {
            eval_integer_infix_operation(kind, *left, *right)
        }
        (Object::String(l), Object::String(r)) => match kind {
            InfixOperationKind::Plus => Ok(Object::string(format!("{}{}", l, r))),
            InfixOperationKind::Equal => Ok(Object::boolean(l == r)),
            InfixOperationKind::NotEqual => Ok(Object::boolean(l != r)),
            _ => Err(unknown_infix_operator(kind, &left, &right)),
        },
        (Object::Boolean(_), Object::Boolean(_)) | (Object::Null, Object::Null) => match kind {
            InfixOperationKind::Equal => Ok(Object::boolean(left == right)),
            InfixOperationKind::NotEqual => Ok(Object::boolean(left != right)),
            _ => Err(unknown_infix_operator(kind, &left, &right)),
        },
        (l, r) if l.object_type() != r.object_type() => Err(EvaluationError::TypeMismatch {
            left: l.object_type(),
            right: r.object_type(),
            operation: kind,
        }),
        _ => Err(unknown_infix_operator(kind, &left, &right)),
    }
}

fn unknown_infix_operator(
    kind: InfixOperationKind,
    left: &Object,
    right: &Object,
) -> EvaluationError {
    EvaluationError::UnknownInfixOperator {
        left: left.object_type(),
        right: right.object_type(),
        operation: kind,
    }
}

// Arithmetic wraps on overflow instead of aborting the host.
fn eval_integer_infix_operation(
    kind: InfixOperationKind,
    left: i64,
    right: i64,
) -> Result<Gc<Object>, EvaluationError> {
    match kind {
        InfixOperationKind::Plus => Ok(Object::integer(left.wrapping_add(right))),
        InfixOperationKind::Minus => Ok(Object::integer(left.wrapping_sub(right))),
        InfixOperationKind::Multiply => Ok(Object::integer(left.wrapping_mul(right))),
        InfixOperationKind::Divide if right == 0 => Err(EvaluationError::DivisionByZero),
        InfixOperationKind::Divide => Ok(Object::integer(left.wrapping_div(right))),
        InfixOperationKind::LessThan => Ok(Object::boolean(left < right)),
        InfixOperationKind::GreaterThan => Ok(Object::boolean(left > right)),
        InfixOperationKind::Equal => Ok(Object::boolean(left == right)),
        InfixOperationKind::NotEqual => Ok(Object::boolean(left != right)),
    }
}
