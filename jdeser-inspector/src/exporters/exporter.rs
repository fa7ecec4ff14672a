use std::io::Write;

use jdeser::{
    known_types::KnownType,
    util::objectstream::{
        handles::HandleTable,
        models::{ClassChain, Content, DecodedArray, DecodedObject, Value},
    },
};

use crate::app::{error::RuntimeError, runtime::DecodedPayload};

/// Defines behavior for rendering decoded payloads and writing them out
pub trait Exporter<'a> {
    /// Create a new exporter that writes to `out`
    fn new(out: &'a mut dyn Write) -> Self
    where
        Self: Sized;
    /// Render one payload and write it
    fn export(&mut self, decoded: &DecodedPayload) -> Result<(), RuntimeError>;
}

/// Defines behavior for formatting decoded stream elements to the desired output format
pub(super) trait Writer {
    type Output;

    /// Format a top level content element
    fn format_content(&self, content: &Content, handles: &HandleTable) -> Self::Output;
    /// Format a field value, array element, or annotation value
    fn format_value(&self, value: &Value, handles: &HandleTable) -> Self::Output;
    /// Format an object, interpreting well-known classes
    fn format_object(&self, object: &DecodedObject, handles: &HandleTable) -> Self::Output;
    /// Format an array and its elements
    fn format_array(&self, array: &DecodedArray, handles: &HandleTable) -> Self::Output;
    /// Format a class descriptor and its superclasses
    fn format_class_chain(&self, chain: &ClassChain) -> Self::Output;
    /// Format the value recovered from a well-known class
    fn format_known(&self, known: &KnownType, handles: &HandleTable) -> Self::Output;
    /// Format opaque block data
    fn format_block_data(&self, bytes: &[u8]) -> Self::Output;
    fn write_to_file(out: &mut dyn Write, text: &str) -> Result<(), RuntimeError> {
        out.write_all(text.as_bytes())?;
        Ok(())
    }
}
