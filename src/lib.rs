extern crate itertools;

#[macro_use]
extern crate serde_derive;
extern crate serde;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate proptest;
#[cfg(test)]
extern crate rmp_serde;

use std::result;

pub mod query;
pub mod print;
pub mod conn;

pub use query::{Name, Var, RolePlayer, Value, Property, Pattern, MatchQuery};
pub use query::{name, var, role, match_query};
pub use conn::{Conn, Interpreter, InterpreterConfig, ProcessInterpreter, Response};

/// The one error type used throughout the crate. Interpreter failures
/// carry the interpreter's error stream verbatim; everything else
/// (spawn failures, timeouts) carries a descriptive message.
// No Display impl: it would collide with the blanket From<S: ToString>.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Error(String);

impl Error {
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl<S: ToString> From<S> for Error {
    fn from(other: S) -> Error {
        Error(other.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;
