/*!
 Reading payloads from disk or stdin and undoing any text encoding they were captured in.
*/

use std::{
    fmt::Display,
    fs::File,
    io::{stdin, Read},
};

use base64::{prelude::BASE64_STANDARD, Engine};
use jdeser::util::objectstream::constants::{RMI_CALL, RMI_DGC_ACK, STREAM_MAGIC};
use tracing::debug;

use crate::app::error::RuntimeError;

/// Path that reads the payload from stdin
pub const STDIN_PATH: &str = "-";

/// How a payload was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Guess from the payload's contents
    Auto,
    /// The stream bytes as written
    Raw,
    /// Hex digits, optionally separated by whitespace
    Hex,
    /// Standard base64, optionally wrapped across lines
    Base64,
}

impl InputFormat {
    /// Given user's input, return a variant if the input matches one
    pub fn from_cli(format: &str) -> Option<Self> {
        match format.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "raw" => Some(Self::Raw),
            "hex" => Some(Self::Hex),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }

    /// Pick a concrete format for a payload read with [`InputFormat::Auto`]
    ///
    /// A payload that starts with the stream magic, or with an RMI transport byte and then the
    /// magic, is raw. Text made only of hex digits and whitespace is hex. Anything else is
    /// assumed to be base64.
    pub fn sniff(bytes: &[u8]) -> Self {
        let magic = STREAM_MAGIC.to_be_bytes();
        let is_raw = match bytes {
            [first, second, ..] if [*first, *second] == magic => true,
            [transport, first, second, ..] => {
                (RMI_CALL..=RMI_DGC_ACK).contains(transport) && [*first, *second] == magic
            }
            _ => false,
        };
        if is_raw {
            return Self::Raw;
        }

        let mut text = bytes
            .iter()
            .filter(|byte| !byte.is_ascii_whitespace())
            .peekable();
        if text.peek().is_some() && text.all(u8::is_ascii_hexdigit) {
            Self::Hex
        } else {
            Self::Base64
        }
    }

    /// Turn the captured bytes into stream bytes
    pub fn decode(&self, source: &str, bytes: Vec<u8>) -> Result<Vec<u8>, RuntimeError> {
        let format = match self {
            InputFormat::Auto => {
                let sniffed = Self::sniff(&bytes);
                debug!("Treating {source} as {sniffed}");
                sniffed
            }
            other => *other,
        };

        let invalid = |why: String| RuntimeError::InvalidInput(source.to_string(), why);
        match format {
            InputFormat::Auto | InputFormat::Raw => Ok(bytes),
            InputFormat::Hex => hex::decode(strip_whitespace(&bytes))
                .map_err(|why| invalid(format!("bad hex: {why}"))),
            InputFormat::Base64 => BASE64_STANDARD
                .decode(strip_whitespace(&bytes))
                .map_err(|why| invalid(format!("bad base64: {why}"))),
        }
    }
}

impl Display for InputFormat {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Auto => write!(fmt, "auto"),
            InputFormat::Raw => write!(fmt, "raw"),
            InputFormat::Hex => write!(fmt, "hex"),
            InputFormat::Base64 => write!(fmt, "base64"),
        }
    }
}

fn strip_whitespace(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect()
}

/// Read the captured bytes at `path`, or stdin for [`STDIN_PATH`]
pub fn read_input(path: &str) -> Result<Vec<u8>, RuntimeError> {
    let mut bytes = vec![];
    let result = if path == STDIN_PATH {
        stdin().lock().read_to_end(&mut bytes)
    } else {
        File::open(path).and_then(|mut file| file.read_to_end(&mut bytes))
    };
    result.map_err(|why| RuntimeError::CannotRead(why, path.to_string()))?;
    Ok(bytes)
}
