use std::collections::BTreeMap;
use std::fmt::Display;
use std::rc::Rc;

use crate::environment::Environment;
use gc::{Finalize, Gc, Trace};
use monkey_lang_core::ast;

use thiserror::Error;

#[derive(Debug, PartialEq, Clone, Trace, Finalize)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<Gc<Object>>),
    Hash(BTreeMap<HashKey, (Gc<Object>, Gc<Object>)>),
    Function(Function),
    BuiltinFunction(BuiltinFunction),
    Error(#[unsafe_ignore_trace] EvaluationError),
    Null,
}

thread_local! {
    static NULL: Gc<Object> = Gc::new(Object::Null);
    static TRUE: Gc<Object> = Gc::new(Object::Boolean(true));
    static FALSE: Gc<Object> = Gc::new(Object::Boolean(false));
}

impl Object {
    pub fn null() -> Gc<Object> {
        NULL.with(|x| x.clone())
    }
    pub fn boolean(value: bool) -> Gc<Object> {
        if value {
            TRUE.with(|x| x.clone())
        } else {
            FALSE.with(|x| x.clone())
        }
    }
    pub fn integer(value: i64) -> Gc<Object> {
        Gc::new(Object::Integer(value))
    }
    pub fn string(value: String) -> Gc<Object> {
        Gc::new(Object::String(value))
    }
    pub fn array(array: Vec<Gc<Object>>) -> Gc<Object> {
        Gc::new(Object::Array(array))
    }
    pub fn hash(hash: BTreeMap<HashKey, (Gc<Object>, Gc<Object>)>) -> Gc<Object> {
        Gc::new(Object::Hash(hash))
    }
    pub fn function(literal: Rc<ast::FunctionLiteral>, env: Environment) -> Gc<Object> {
        Gc::new(Object::Function(Function { literal, env }))
    }
    pub fn builtin_function(func: BuiltinFunction) -> Gc<Object> {
        Gc::new(Object::BuiltinFunction(func))
    }
    pub fn error(error: EvaluationError) -> Gc<Object> {
        Gc::new(Object::Error(error))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::BuiltinFunction(_) => ObjectType::Builtin,
            Object::Error(_) => ObjectType::Error,
            Object::Null => ObjectType::Null,
        }
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Null,
    Array,
    Hash,
    Function,
    Builtin,
    Error,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Null => "NULL",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Key of a hash entry. The variant doubles as the type tag, so equal values
/// of different types never collide.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Trace, Finalize)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

pub fn object_to_key(object: &Gc<Object>) -> Result<HashKey, EvaluationError> {
    match object.as_ref() {
        Object::Integer(value) => Ok(HashKey::Integer(*value)),
        Object::Boolean(value) => Ok(HashKey::Boolean(*value)),
        Object::String(value) => Ok(HashKey::String(value.clone())),
        other => Err(EvaluationError::InvalidHashKey(other.object_type())),
    }
}

/// A closure: the literal it was created from plus the environment that was
/// active at that point.
#[derive(Clone, Trace, Finalize)]
pub struct Function {
    #[unsafe_ignore_trace]
    pub literal: Rc<ast::FunctionLiteral>,
    pub env: Environment,
}

impl Function {
    pub fn parameters(&self) -> &[ast::Identifier] {
        &self.literal.parameters
    }

    pub fn body(&self) -> &ast::BlockStatement {
        &self.literal.body
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.literal, &other.literal) && self.env == other.env
    }
}

// The captured environment usually contains this function again, so it is
// left out.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("literal", &self.literal.to_string())
            .finish()
    }
}

pub type BuiltinFn = fn(Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError>;

#[derive(Clone, Trace, Finalize)]
pub struct BuiltinFunction {
    #[unsafe_ignore_trace]
    pub name: &'static str,
    #[unsafe_ignore_trace]
    pub func: BuiltinFn,
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum EvaluationError {
    #[error("type mismatch: {left} {operation} {right}")]
    TypeMismatch {
        left: ObjectType,
        right: ObjectType,
        operation: ast::InfixOperationKind,
    },
    #[error("unknown operator: {left} {operation} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        right: ObjectType,
        operation: ast::InfixOperationKind,
    },
    #[error("unknown operator: {operation}{right}")]
    UnknownPrefixOperator {
        right: ObjectType,
        operation: ast::PrefixOperationKind,
    },
    #[error("identifier not found: {0}")]
    UnknownIdentifier(Rc<str>),
    #[error("not a function: {0}")]
    CallNonFunction(ObjectType),
    #[error("wrong number of arguments: want={expected}, got={actual}")]
    WrongArgumentCount { expected: usize, actual: usize },
    #[error("argument to `{function}` not supported, got {got}")]
    UnsupportedArgument {
        function: &'static str,
        got: ObjectType,
    },
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("array index must be INTEGER, got {0}")]
    IndexingWithNonInteger(ObjectType),
    #[error("unusable as hash key: {0}")]
    InvalidHashKey(ObjectType),
    #[error("division by zero")]
    DivisionByZero,
}

/// The user-facing rendering of a value.
impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::Array(array) => {
                write!(f, "[")?;
                for (i, element) in array.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Object::Hash(hash) => {
                write!(f, "{{")?;
                for (i, (key, value)) in hash.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Object::Function(function) => write!(f, "{}", function.literal),
            Object::BuiltinFunction(_) => write!(f, "builtin function"),
            Object::Error(error) => write!(f, "ERROR: {}", error),
        }
    }
}
