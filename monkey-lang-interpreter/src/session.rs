use gc::Gc;

use monkey_lang_core::parser::ParseError;
use thiserror::Error;

use crate::environment::Environment;
use crate::evaluator;
use crate::object::{EvaluationError, Object};

#[derive(Debug, PartialEq, Clone, Error)]
pub enum SessionError {
    #[error("{}", join(.0))]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl From<Vec<ParseError>> for SessionError {
    fn from(errors: Vec<ParseError>) -> Self {
        SessionError::Parse(errors)
    }
}

fn join(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ParseError::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Evaluates successive snippets of source against one top-level
/// environment, so bindings made by one run are visible to the next.
#[derive(Debug, Default)]
pub struct Session {
    environment: Environment,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Parses and evaluates `source`. A snippet with syntax errors is not
    /// evaluated at all and leaves the environment untouched.
    pub fn run(&mut self, source: &str) -> Result<Gc<Object>, SessionError> {
        let (program, errors) = monkey_lang_core::parse(source);
        tracing::debug!(
            statements = program.statements.len(),
            parse_errors = errors.len(),
            "session run"
        );
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let result = evaluator::eval_program(&program, &self.environment);
        match result.as_ref() {
            Object::Error(error) => Err(error.clone().into()),
            _ => Ok(result),
        }
    }
}
