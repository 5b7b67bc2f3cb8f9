//! Logging helpers for startup and resolver failures.
//!
//! `ResultExt::log` records an error together with the caller location and
//! hands the `Result` back untouched, so it composes with `?`.

use std::fmt::Display;
use tracing::error;

/// Extension trait for logging errors with context.
pub trait ResultExt<T, E> {
    /// Log the error with `context` if this is an `Err` variant.
    ///
    /// ```ignore
    /// use graph_gateway::ResultExt;
    ///
    /// let type_defs = std::fs::read_to_string("app/schema.graphql")
    ///     .log("Failed to read type definitions")?;
    /// ```
    fn log<S: ToString>(self, context: S) -> Result<T, E>;
}

impl<T, E: Display> ResultExt<T, E> for Result<T, E> {
    #[track_caller]
    fn log<S: ToString>(self, context: S) -> Result<T, E> {
        if let Err(ref e) = self {
            let caller = std::panic::Location::caller();
            error!(
                target: "graph_gateway",
                error = %e,
                file = %format!("{}:{}", caller.file(), caller.line()),
                "{}",
                context.to_string()
            );
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_passes_ok_through() {
        let result: Result<u16, &str> = Ok(4000);
        assert_eq!(result.log("binding listener").unwrap(), 4000);
    }

    #[test]
    fn test_log_passes_err_through() {
        let result: Result<u16, &str> = Err("address in use");
        let logged = result.log("binding listener");
        assert_eq!(logged.unwrap_err(), "address in use");
    }
}
