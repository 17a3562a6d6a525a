//! CLI command implementations.

pub mod auth;
pub mod business;
pub mod content;
pub mod listings;
pub mod whisper;

use std::str::FromStr;

use crate::CliError;

/// Parse a record ID given on the command line.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, CliError> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::InvalidArgument(format!("{what} ID must be a UUID, got {raw:?}")))
}
