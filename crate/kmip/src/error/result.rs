use std::fmt::Display;

use super::KmipError;

pub type KmipResult<T> = Result<T, KmipError>;

/// Attach context to an error, the way `anyhow::Context` does, without
/// pulling the whole anyhow machinery into the protocol crate.
pub trait KmipResultHelper<T> {
    fn context(self, context: &str) -> KmipResult<T>;
    fn with_context<D: Display, O: FnOnce() -> D>(self, op: O) -> KmipResult<T>;
}

impl<T, E: std::error::Error> KmipResultHelper<T> for Result<T, E> {
    fn context(self, context: &str) -> KmipResult<T> {
        self.map_err(|e| KmipError::Default(format!("{context}: {e}")))
    }

    fn with_context<D: Display, O: FnOnce() -> D>(self, op: O) -> KmipResult<T> {
        self.map_err(|e| KmipError::Default(format!("{}: {e}", op())))
    }
}

impl<T> KmipResultHelper<T> for Option<T> {
    fn context(self, context: &str) -> KmipResult<T> {
        self.ok_or_else(|| KmipError::Default(context.to_owned()))
    }

    fn with_context<D: Display, O: FnOnce() -> D>(self, op: O) -> KmipResult<T> {
        self.ok_or_else(|| KmipError::Default(op().to_string()))
    }
}
