//! Shared error-code interface.
//!
//! Every error enum in the Centaur crates implements [`ErrorCode`] so that
//! logs and the remote UI can report failures with a stable,
//! machine-readable identifier.
//!
//! # Code Format
//!
//! - UPPER_SNAKE_CASE
//! - Prefixed with the owning area (`ENGINE_`, `PLUGIN_`, `SQUARE_`)
//! - Stable once published
//!
//! # Example
//!
//! ```
//! use centaur_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LedError {
//!     Busy,
//!     Disconnected,
//! }
//!
//! impl ErrorCode for LedError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Busy => "LED_BUSY",
//!             Self::Disconnected => "LED_DISCONNECTED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! assert_eq!(LedError::Busy.code(), "LED_BUSY");
//! assert!(!LedError::Disconnected.is_recoverable());
//! ```

/// Machine-readable error identification.
pub trait ErrorCode {
    /// Stable UPPER_SNAKE_CASE code, prefixed with the owning area.
    fn code(&self) -> &'static str;

    /// Whether trying again later may succeed.
    ///
    /// Engine faults are typically recoverable (a fresh process may work);
    /// misuse such as calling session operations without a session is not.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, UPPER_SNAKE_CASE, and carries
/// the expected prefix.
///
/// # Panics
///
/// Panics with a descriptive message when any check fails. Intended for
/// tests that walk every variant of an error enum.
///
/// # Example
///
/// ```
/// use centaur_types::{assert_error_code, ErrorCode};
///
/// struct Timeout;
///
/// impl ErrorCode for Timeout {
///     fn code(&self) -> &'static str { "ENGINE_TIMEOUT" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Timeout, "ENGINE_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Runs [`assert_error_code`] over a list of variants.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
