//! Tree-walking evaluator for Monkey programs parsed by `monkey_lang_core`.

pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod object;
pub mod session;

pub use session::{Session, SessionError};
