/*!
Errors that can happen during the application's runtime
*/

use std::io::Error as IoError;

use jdeser::error::stream::StreamError;
use thiserror::Error;

/// Errors that can happen during the application's runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Invalid options!\n{0}")]
    InvalidOptions(String),
    #[error("Unable to read {1}: {0}")]
    CannotRead(IoError, String),
    #[error("{0} is not a valid payload: {1}")]
    InvalidInput(String, String),
    #[error("Unable to decode {0}: {1}")]
    Decode(String, StreamError),
    #[error("Unable to write output: {0}")]
    Output(#[from] IoError),
    #[error("{0} of {1} payloads could not be decoded")]
    PartialFailure(usize, usize),
}
