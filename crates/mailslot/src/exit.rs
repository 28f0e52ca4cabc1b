use std::fmt;

use mailslot_remote::RemoteError;

// The front-end contract is binary: 0 on success, 1 with a one-line
// diagnostic on any open/select/send/read failure.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn remote_error(context: &str, err: RemoteError) -> CliError {
    CliError::new(FAILURE, format!("{context}: {err}"))
}
