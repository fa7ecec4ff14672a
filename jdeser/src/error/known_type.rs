/*!
 Errors that can happen when interpreting the contents of well-known JDK classes.
*/

use thiserror::Error;

use crate::error::stream::StreamError;

/// Errors that can happen when interpreting a [`DecodedObject`](crate::util::objectstream::models::DecodedObject)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KnownTypeError {
    #[error("{0} did not write any annotation data")]
    MissingBlockData(String),
    #[error("{0} annotation ended before all of its elements")]
    MissingValue(String),
    #[error("{0} wrote a negative element count: {1}")]
    InvalidCount(String, i32),
    #[error("{0} does not declare the expected field `{1}`")]
    MissingField(String, String),
    #[error("Date or time is out of range: {0}")]
    InvalidDate(String),
    #[error("Failed to read annotation block data: {0}")]
    Stream(#[from] StreamError),
}
