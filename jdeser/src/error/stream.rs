/*!
 Errors that can happen when decoding a Java object serialization stream.
*/

use thiserror::Error;

use crate::util::objectstream::models::Handle;

/// Errors that can happen when decoding a serialization stream
///
/// Every variant is fatal for the session that produced it; offsets are measured
/// from the start of the buffer handed to the reader, including any transport byte.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Invalid stream magic {:02x} {:02x}, expected ac ed", found[0], found[1])]
    Framing { found: [u8; 2] },
    #[error("Needed {needed} bytes at offset {offset:#x} but only {remaining} remain!")]
    OutOfData {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("Illegal type tag {tag:#04x} at offset {offset:#x}")]
    IllegalTag { tag: u8, offset: usize },
    #[error("Illegal field type code {code:#04x} at offset {offset:#x}")]
    IllegalFieldType { code: u8, offset: usize },
    #[error("Illegal flags {flags:#04x} on class descriptor {class_name}")]
    IllegalFlags { flags: u8, class_name: String },
    #[error("Handle {handle} at offset {offset:#x} does not resolve to a usable object")]
    UnresolvedReference { handle: Handle, offset: usize },
    #[error("Malformed stream at offset {offset:#x}: {reason}")]
    StructuralViolation { offset: usize, reason: String },
    #[error("Nesting deeper than {limit} levels at offset {offset:#x}")]
    DepthExceeded { limit: usize, offset: usize },
}
