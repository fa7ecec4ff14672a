/*!
 Contains logic to decode a Java object serialization stream.

 Logic referenced from the stream grammar in the
 [Java Object Serialization Specification, chapter 6](https://docs.oracle.com/javase/8/docs/platform/serialization/spec/protocol.html).
*/

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::{
    error::stream::StreamError,
    util::objectstream::{
        constants::{
            ARRAY_SIGIL, SC_SERIALIZABLE, STREAM_MAGIC, STREAM_VERSION, TC_ARRAY,
            TC_BLOCKDATA, TC_BLOCKDATALONG, TC_CLASS, TC_CLASSDESC, TC_ENDBLOCKDATA, TC_ENUM,
            TC_LONGSTRING, TC_NULL, TC_OBJECT, TC_PROXYCLASSDESC, TC_REFERENCE, TC_STRING,
        },
        cursor::ByteCursor,
        handles::{HandleEntry, HandleTable},
        models::{
            ClassChain, ClassData, ClassDescriptor, ClassFlags, Content, DecodedArray,
            DecodedClass, DecodedEnum, DecodedObject, DescriptorKind, Diagnostic,
            FieldDescriptor, FieldType, FieldValue, Handle, JavaString, Value, PROXY_CLASS_NAME,
        },
        registry::ClassRegistry,
    },
};

/// Unicode replacement character, emitted for malformed modified UTF-8
const REPLACEMENT: u16 = 0xFFFD;

/// Settings for a single decode session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// How deeply objects, class descriptors, and annotation blocks may nest before decoding is aborted
    pub max_depth: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Contains logic and data used to decode a Java object serialization stream
///
/// Each reader is one decode session: the handle table and class descriptor registry it builds
/// are private to it, so independent buffers can be decoded on independent readers in parallel.
#[derive(Debug)]
pub struct StreamReader<'a> {
    /// The stream we want to decode
    cursor: ByteCursor<'a>,
    /// Every handle assigned so far, in order
    handles: HandleTable,
    /// Completed class descriptors, used to resolve back-references to classes
    registry: ClassRegistry,
    /// Descriptors whose annotations or superclass are still being read, innermost last
    pending: Vec<Arc<ClassDescriptor>>,
    /// Non-fatal observations, such as a version mismatch
    diagnostics: Vec<Diagnostic>,
    options: DecoderOptions,
    /// Current nesting depth
    depth: usize,
    /// Set once the magic and version have been read
    header_read: bool,
}

impl<'a> From<&'a [u8]> for StreamReader<'a> {
    fn from(stream: &'a [u8]) -> Self {
        Self::new(stream)
    }
}

impl<'a> StreamReader<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self::with_options(stream, DecoderOptions::default())
    }

    pub fn with_options(stream: &'a [u8], options: DecoderOptions) -> Self {
        Self {
            cursor: ByteCursor::new(stream),
            handles: HandleTable::new(),
            registry: ClassRegistry::new(),
            pending: vec![],
            diagnostics: vec![],
            options,
            depth: 0,
            header_read: false,
        }
    }

    /// Handles assigned so far; used to resolve [`Value::Reference`]s in the output
    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    /// Class descriptors read so far
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Non-fatal problems found while decoding
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Offset of the next unread byte
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Decode the next content element of the stream
    ///
    /// The first call validates the stream header; each later call continues with the next element.
    ///
    /// ```txt
    /// AC ED 00 05 74 00 03 61 62 63 -> Value(String(JavaString { handle: 0x7e0000, value: "abc", raw: None }))
    /// ```
    pub fn parse(&mut self) -> Result<Content, StreamError> {
        if !self.header_read {
            self.validate_header()?;
        }
        self.read_content()
    }

    /// Decode every remaining content element, i.e. all of the objects in an RMI call
    pub fn parse_all(&mut self) -> Result<Vec<Content>, StreamError> {
        if !self.header_read {
            self.validate_header()?;
        }
        let mut out_v = vec![];
        while !self.cursor.is_empty() {
            out_v.push(self.read_content()?);
        }
        Ok(out_v)
    }

    /// Strip an optional transport byte, then check the stream magic and version
    pub(crate) fn validate_header(&mut self) -> Result<(), StreamError> {
        let [magic_lead, _] = STREAM_MAGIC.to_be_bytes();

        let first = self.cursor.peek()?;
        if first != magic_lead {
            self.cursor.read_u8()?;
            warn!("Discarding transport byte {first:#04x} before stream magic");
            self.diagnostics.push(Diagnostic::TransportEnvelope(first));
        }

        let magic = self.cursor.take(2)?;
        if magic != STREAM_MAGIC.to_be_bytes().as_slice() {
            return Err(StreamError::Framing {
                found: [magic[0], magic[1]],
            });
        }

        let version = self.cursor.read_u16()?;
        if version != STREAM_VERSION {
            warn!("Stream version {version:#06x} does not match {STREAM_VERSION:#06x}");
            self.diagnostics.push(Diagnostic::VersionMismatch(version));
        }

        self.header_read = true;
        Ok(())
    }

    /// Enter a nested element, failing if the stream nests too deeply
    fn descend(&mut self) -> Result<(), StreamError> {
        if self.depth >= self.options.max_depth {
            return Err(StreamError::DepthExceeded {
                limit: self.options.max_depth,
                offset: self.cursor.offset(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn structural(&self, offset: usize, reason: impl Into<String>) -> StreamError {
        StreamError::StructuralViolation {
            offset,
            reason: reason.into(),
        }
    }

    /// Consume a type tag, failing if it is not the expected one
    fn expect_tag(&mut self, expected: u8) -> Result<(), StreamError> {
        let offset = self.cursor.offset();
        match self.cursor.read_u8()? {
            tag if tag == expected => Ok(()),
            tag => Err(StreamError::IllegalTag { tag, offset }),
        }
    }

    /// Read any content element: a value, a class descriptor, or block data
    fn read_content(&mut self) -> Result<Content, StreamError> {
        let tag = self.cursor.peek()?;
        trace!(offset = self.cursor.offset(), "Reading content element {tag:#04x}");
        match tag {
            TC_CLASSDESC | TC_PROXYCLASSDESC => {
                Ok(Content::ClassDescriptor(self.read_new_class_desc()?))
            }
            TC_BLOCKDATA => Ok(Content::BlockData(self.read_block_data()?)),
            TC_BLOCKDATALONG => Ok(Content::BlockData(self.read_long_block_data()?)),
            _ => self.read_value().map(Content::Value),
        }
    }

    /// Read any element that can be the value of an object field or array element
    fn read_value(&mut self) -> Result<Value, StreamError> {
        self.descend()?;
        let value = self.read_value_element();
        self.ascend();
        value
    }

    fn read_value_element(&mut self) -> Result<Value, StreamError> {
        let offset = self.cursor.offset();
        match self.cursor.peek()? {
            TC_OBJECT => Ok(Value::Object(Box::new(self.read_new_object()?))),
            TC_CLASS => Ok(Value::Class(self.read_new_class()?)),
            TC_ARRAY => Ok(Value::Array(self.read_new_array()?)),
            TC_STRING | TC_LONGSTRING => Ok(Value::String(self.read_new_string()?)),
            TC_ENUM => Ok(Value::Enum(self.read_new_enum()?)),
            TC_REFERENCE => Ok(Value::Reference(self.read_prev_object()?)),
            TC_NULL => {
                self.read_null()?;
                Ok(Value::Null)
            }
            tag => Err(StreamError::IllegalTag { tag, offset }),
        }
    }

    /// Read a `null` reference
    fn read_null(&mut self) -> Result<(), StreamError> {
        self.expect_tag(TC_NULL)
    }

    /// Read a handle that refers back to an element already in the stream
    fn read_prev_object(&mut self) -> Result<Handle, StreamError> {
        let offset = self.cursor.offset();
        self.expect_tag(TC_REFERENCE)?;
        let handle = Handle(self.cursor.read_u32()?);
        if self.handles.get(handle).is_none() {
            return Err(StreamError::UnresolvedReference { handle, offset });
        }
        trace!(offset, "Back-reference to {handle}");
        Ok(handle)
    }

    /// Read block data with a 1-byte length
    fn read_block_data(&mut self) -> Result<Vec<u8>, StreamError> {
        self.expect_tag(TC_BLOCKDATA)?;
        let length = self.cursor.read_u8()?;
        Ok(self.cursor.take(usize::from(length))?.to_vec())
    }

    /// Read block data with a 4-byte length
    fn read_long_block_data(&mut self) -> Result<Vec<u8>, StreamError> {
        self.expect_tag(TC_BLOCKDATALONG)?;
        let offset = self.cursor.offset();
        let length = self.cursor.read_i32()?;
        let length = usize::try_from(length)
            .map_err(|_| self.structural(offset, format!("negative block data length {length}")))?;
        Ok(self.cursor.take(length)?.to_vec())
    }

    /// Read content elements until the end of an annotation block
    fn read_annotations(&mut self) -> Result<Vec<Content>, StreamError> {
        self.descend()?;
        let mut contents = vec![];
        while self.cursor.peek()? != TC_ENDBLOCKDATA {
            contents.push(self.read_content()?);
        }
        self.expect_tag(TC_ENDBLOCKDATA)?;
        self.ascend();
        Ok(contents)
    }

    /// Read a string with a 2-byte length
    fn read_utf(&mut self) -> Result<String, StreamError> {
        Ok(decode_modified_utf8(self.read_utf_bytes()?))
    }

    fn read_utf_bytes(&mut self) -> Result<&'a [u8], StreamError> {
        let length = self.cursor.read_u16()?;
        self.cursor.take(usize::from(length))
    }

    /// Read the bytes of a string with an 8-byte length
    fn read_long_utf_bytes(&mut self) -> Result<&'a [u8], StreamError> {
        let length = self.cursor.read_u64()?;
        // A length that does not fit in memory can never be satisfied by the buffer either
        let length = usize::try_from(length).unwrap_or(usize::MAX);
        self.cursor.take(length)
    }

    /// Read a new string and assign it a handle
    fn read_new_string(&mut self) -> Result<JavaString, StreamError> {
        let offset = self.cursor.offset();
        let bytes = match self.cursor.read_u8()? {
            TC_STRING => self.read_utf_bytes()?,
            TC_LONGSTRING => self.read_long_utf_bytes()?,
            tag => return Err(StreamError::IllegalTag { tag, offset }),
        };
        let (value, raw) = match decode_modified_utf8_exact(bytes) {
            Some(value) => (value, None),
            None => {
                debug!(offset, "String is not valid modified UTF-8, keeping its raw bytes");
                (decode_modified_utf8(bytes), Some(bytes.to_vec()))
            }
        };
        let handle = self.handles.assign(HandleEntry::String(value.clone()));
        Ok(JavaString { handle, value, raw })
    }

    /// Read a string that may be new or a reference to one already in the stream
    fn read_string_or_reference(&mut self) -> Result<String, StreamError> {
        let offset = self.cursor.offset();
        match self.cursor.peek()? {
            TC_STRING | TC_LONGSTRING => Ok(self.read_new_string()?.value),
            TC_REFERENCE => {
                let handle = self.read_prev_object()?;
                self.handles
                    .get_string(handle)
                    .map(str::to_string)
                    .ok_or(StreamError::UnresolvedReference { handle, offset })
            }
            tag => Err(StreamError::IllegalTag { tag, offset }),
        }
    }

    /// Read the class name of an array or object field, which is never `null`
    fn read_type_string(&mut self) -> Result<String, StreamError> {
        self.read_string_or_reference()
    }

    /// Read a class descriptor position: a new descriptor, `null`, or a reference to a known descriptor
    fn read_class_desc(&mut self) -> Result<Option<ClassChain>, StreamError> {
        self.descend()?;
        let chain = self.read_class_desc_element();
        self.ascend();
        chain
    }

    fn read_class_desc_element(&mut self) -> Result<Option<ClassChain>, StreamError> {
        let offset = self.cursor.offset();
        match self.cursor.peek()? {
            TC_CLASSDESC | TC_PROXYCLASSDESC => self.read_new_class_desc().map(Some),
            TC_NULL => {
                self.read_null()?;
                Ok(None)
            }
            TC_REFERENCE => {
                let handle = self.read_prev_object()?;
                self.registry
                    .chain_from(handle)
                    .or_else(|| self.pending_chain(handle))
                    .map(Some)
                    .ok_or(StreamError::UnresolvedReference { handle, offset })
            }
            tag => Err(StreamError::IllegalTag { tag, offset }),
        }
    }

    /// Read a class descriptor that must be present
    fn read_required_class_desc(&mut self, what: &str) -> Result<ClassChain, StreamError> {
        let offset = self.cursor.offset();
        self.read_class_desc()?
            .ok_or_else(|| self.structural(offset, format!("{what} has a null class descriptor")))
    }

    /// Read a new class or proxy class descriptor
    fn read_new_class_desc(&mut self) -> Result<ClassChain, StreamError> {
        let offset = self.cursor.offset();
        match self.cursor.peek()? {
            TC_CLASSDESC => self.read_non_proxy_desc(),
            TC_PROXYCLASSDESC => self.read_proxy_desc(),
            tag => Err(StreamError::IllegalTag { tag, offset }),
        }
    }

    /// Read a class descriptor, its field table, and its superclass descriptors
    fn read_non_proxy_desc(&mut self) -> Result<ClassChain, StreamError> {
        self.expect_tag(TC_CLASSDESC)?;

        let name = self.read_utf()?;
        let handle = self
            .handles
            .assign(HandleEntry::ClassDescriptor(name.clone()));
        let serial_version_uid = self.cursor.read_i64()?;

        let flags = ClassFlags(self.cursor.read_u8()?);
        if !flags.is_valid() {
            return Err(StreamError::IllegalFlags {
                flags: flags.bits(),
                class_name: name,
            });
        }

        let fields = self.read_fields()?;
        let descriptor = ClassDescriptor {
            name,
            serial_version_uid,
            flags,
            fields,
            handle,
            annotations: vec![],
            super_class: None,
            kind: DescriptorKind::Class,
        };

        self.read_descriptor_tail(descriptor)
    }

    /// Read a dynamic proxy class descriptor, which lists interfaces instead of fields
    fn read_proxy_desc(&mut self) -> Result<ClassChain, StreamError> {
        self.expect_tag(TC_PROXYCLASSDESC)?;

        let handle = self
            .handles
            .assign(HandleEntry::ClassDescriptor(PROXY_CLASS_NAME.to_string()));

        let offset = self.cursor.offset();
        let count = self.cursor.read_i32()?;
        let count = usize::try_from(count)
            .map_err(|_| self.structural(offset, format!("negative interface count {count}")))?;

        let mut interfaces = Vec::with_capacity(count.min(self.cursor.remaining() / 2));
        for _ in 0..count {
            interfaces.push(self.read_utf()?);
        }

        let descriptor = ClassDescriptor {
            name: PROXY_CLASS_NAME.to_string(),
            serial_version_uid: 0,
            flags: ClassFlags(SC_SERIALIZABLE),
            fields: vec![],
            handle,
            annotations: vec![],
            super_class: None,
            kind: DescriptorKind::Proxy(interfaces),
        };

        self.read_descriptor_tail(descriptor)
    }

    /// Read a descriptor's class annotations and superclass, then register it
    ///
    /// While these are read the descriptor is pending, so annotations may refer back to it.
    fn read_descriptor_tail(
        &mut self,
        mut descriptor: ClassDescriptor,
    ) -> Result<ClassChain, StreamError> {
        self.pending.push(Arc::new(descriptor.clone()));
        descriptor.annotations = self.read_annotations()?;
        let offset = self.cursor.offset();
        let super_chain = self.read_class_desc()?;
        self.pending.pop();

        if super_chain
            .as_ref()
            .is_some_and(|chain| chain.iter().any(|class| class.handle == descriptor.handle))
        {
            return Err(self.structural(
                offset,
                format!("{} is its own superclass", descriptor.name),
            ));
        }

        Ok(self.register(descriptor, super_chain))
    }

    /// A leaf-only chain for a descriptor that is still being read
    ///
    /// The chain carries the name, flags, and fields, but no annotations or superclass yet.
    fn pending_chain(&self, handle: Handle) -> Option<ClassChain> {
        let descriptor = self
            .pending
            .iter()
            .rfind(|descriptor| descriptor.handle == handle)?;
        trace!("Back-reference to {handle} while its descriptor is incomplete");
        Some(ClassChain(vec![Arc::clone(descriptor)]))
    }

    /// Link a descriptor to its superclass chain and store it in the registry
    fn register(
        &mut self,
        mut descriptor: ClassDescriptor,
        super_chain: Option<ClassChain>,
    ) -> ClassChain {
        descriptor.super_class = super_chain
            .as_ref()
            .and_then(|chain| chain.leaf())
            .map(|parent| parent.handle);

        debug!(
            handle = %descriptor.handle,
            fields = descriptor.fields.len(),
            "Registered class descriptor {}",
            descriptor.name
        );

        let mut chain = vec![self.registry.register(descriptor)];
        if let Some(parents) = super_chain {
            chain.extend(parents.0);
        }
        ClassChain(chain)
    }

    /// Read the field table of a class descriptor
    fn read_fields(&mut self) -> Result<Vec<FieldDescriptor>, StreamError> {
        let count = usize::from(self.cursor.read_u16()?);
        // Each field takes at least 3 bytes: a type code and an empty name
        let mut fields = Vec::with_capacity(count.min(self.cursor.remaining() / 3));
        for _ in 0..count {
            fields.push(self.read_field_desc()?);
        }
        Ok(fields)
    }

    fn read_field_desc(&mut self) -> Result<FieldDescriptor, StreamError> {
        let offset = self.cursor.offset();
        let code = self.cursor.read_u8()?;
        let field_type =
            FieldType::from_byte(code).ok_or(StreamError::IllegalFieldType { code, offset })?;

        let name = self.read_utf()?;
        let class_name = if field_type.is_reference() {
            Some(self.read_type_string()?)
        } else {
            None
        };

        Ok(FieldDescriptor {
            field_type,
            name,
            class_name,
        })
    }

    /// Read a `java.lang.Class` instance
    fn read_new_class(&mut self) -> Result<DecodedClass, StreamError> {
        self.expect_tag(TC_CLASS)?;
        let chain = self.read_required_class_desc("class")?;
        let handle = self.handles.assign(HandleEntry::Class(
            chain.name().unwrap_or_default().to_string(),
        ));
        Ok(DecodedClass { handle, chain })
    }

    /// Read an enum constant: its class and the name of the constant
    fn read_new_enum(&mut self) -> Result<DecodedEnum, StreamError> {
        self.expect_tag(TC_ENUM)?;
        let chain = self.read_required_class_desc("enum constant")?;
        let class_name = chain.name().unwrap_or_default().to_string();
        let handle = self.handles.assign(HandleEntry::Enum(class_name.clone()));

        let constant = self.read_string_or_reference()?;
        self.handles
            .update(handle, HandleEntry::Enum(format!("{class_name}.{constant}")));

        Ok(DecodedEnum {
            handle,
            class_name,
            constant,
        })
    }

    /// Read an array and each of its elements
    fn read_new_array(&mut self) -> Result<DecodedArray, StreamError> {
        let offset = self.cursor.offset();
        self.expect_tag(TC_ARRAY)?;

        let chain = self.read_required_class_desc("array")?;
        if chain.len() != 1 {
            return Err(self.structural(
                offset,
                format!("array class descriptor chain has {} classes", chain.len()),
            ));
        }

        let class_name = chain.name().unwrap_or_default().to_string();
        let element_code = match class_name.as_bytes() {
            [ARRAY_SIGIL, code, ..] => *code,
            _ => {
                return Err(self.structural(
                    offset,
                    format!("array class name {class_name:?} does not start with ["),
                ))
            }
        };
        let element_type = FieldType::from_byte(element_code).ok_or(
            StreamError::IllegalFieldType {
                code: element_code,
                offset,
            },
        )?;

        let handle = self.handles.assign(HandleEntry::Array(class_name.clone()));

        let size_offset = self.cursor.offset();
        let size = self.cursor.read_i32()?;
        let size = usize::try_from(size)
            .map_err(|_| self.structural(size_offset, format!("negative array size {size}")))?;

        let mut elements = Vec::with_capacity(size.min(self.cursor.remaining()));
        for _ in 0..size {
            elements.push(self.read_field_value(element_type)?);
        }

        Ok(DecodedArray {
            handle,
            class_name,
            element_type,
            elements,
        })
    }

    /// Read an object and the data written by every class in its hierarchy
    fn read_new_object(&mut self) -> Result<DecodedObject, StreamError> {
        self.expect_tag(TC_OBJECT)?;
        let chain = self.read_required_class_desc("object")?;
        let handle = self.handles.assign(HandleEntry::Object(
            chain.name().unwrap_or_default().to_string(),
        ));
        let class_data = self.read_class_data(&chain)?;

        Ok(DecodedObject {
            handle,
            chain,
            class_data,
        })
    }

    /// Read the data for each class in a hierarchy; superclass data is always written first
    fn read_class_data(&mut self, chain: &ClassChain) -> Result<Vec<ClassData>, StreamError> {
        let mut out_v = Vec::with_capacity(chain.len());

        for class in chain.iter_base_first() {
            let offset = self.cursor.offset();

            let mut values = Vec::with_capacity(class.fields.len());
            if class.flags.is_serializable() {
                for field in &class.fields {
                    values.push(FieldValue {
                        name: field.name.clone(),
                        value: self.read_field_value(field.field_type)?,
                    });
                }
            }

            let annotations = if class.flags.has_object_annotation() {
                Some(self.read_annotations()?)
            } else if class.flags.is_externalizable() {
                // Without block data the layout is defined only by the class's readExternal
                return Err(self.structural(
                    offset,
                    format!(
                        "{} was written with externalizable protocol version 1",
                        class.name
                    ),
                ));
            } else {
                None
            };

            out_v.push(ClassData {
                class_name: class.name.clone(),
                descriptor: class.handle,
                values,
                annotations,
            });
        }

        Ok(out_v)
    }

    /// Read a single value of the given field type
    fn read_field_value(&mut self, field_type: FieldType) -> Result<Value, StreamError> {
        Ok(match field_type {
            FieldType::Byte => Value::Byte(self.cursor.read_i8()?),
            FieldType::Char => Value::Char(self.cursor.read_u16()?),
            FieldType::Double => Value::Double(self.cursor.read_f64()?),
            FieldType::Float => Value::Float(self.cursor.read_f32()?),
            FieldType::Integer => Value::Int(self.cursor.read_i32()?),
            FieldType::Long => Value::Long(self.cursor.read_i64()?),
            FieldType::Short => Value::Short(self.cursor.read_i16()?),
            FieldType::Boolean => Value::Boolean(self.cursor.read_u8()? != 0),
            FieldType::Array => self.read_array_field()?,
            FieldType::Object => self.read_object_field()?,
        })
    }

    /// An array field can only hold an array, `null`, or a reference
    fn read_array_field(&mut self) -> Result<Value, StreamError> {
        match self.cursor.peek()? {
            TC_NULL | TC_ARRAY | TC_REFERENCE => self.read_value(),
            tag => Err(StreamError::IllegalTag {
                tag,
                offset: self.cursor.offset(),
            }),
        }
    }

    /// An object field can hold any value, but never a bare class descriptor or block data
    fn read_object_field(&mut self) -> Result<Value, StreamError> {
        match self.cursor.peek()? {
            TC_OBJECT | TC_REFERENCE | TC_NULL | TC_STRING | TC_LONGSTRING | TC_CLASS
            | TC_ARRAY | TC_ENUM => self.read_value(),
            tag => Err(StreamError::IllegalTag {
                tag,
                offset: self.cursor.offset(),
            }),
        }
    }
}

/// Decode Java's modified UTF-8, where `NUL` takes two bytes and supplementary characters are
/// written as surrogate pairs. Malformed sequences become U+FFFD instead of failing the stream.
pub fn decode_modified_utf8(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&decode_units(bytes).0)
}

/// Decode Java's modified UTF-8, or `None` if any byte sequence is malformed or any surrogate
/// is unpaired, so that the text cannot represent the bytes exactly
pub fn decode_modified_utf8_exact(bytes: &[u8]) -> Option<String> {
    match decode_units(bytes) {
        (units, false) => String::from_utf16(&units).ok(),
        (_, true) => None,
    }
}

/// UTF-16 code units of a modified UTF-8 string, and whether any bytes were malformed
fn decode_units(bytes: &[u8]) -> (Vec<u16>, bool) {
    let mut malformed = false;
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        let first = u16::from(bytes[idx]);
        match bytes[idx] {
            0x00..=0x7F => {
                units.push(first);
                idx += 1;
            }
            0xC0..=0xDF => match continuation(bytes, idx + 1) {
                Some(second) => {
                    units.push(((first & 0x1F) << 6) | second);
                    idx += 2;
                }
                None => {
                    units.push(REPLACEMENT);
                    malformed = true;
                    idx += 1;
                }
            },
            0xE0..=0xEF => match (continuation(bytes, idx + 1), continuation(bytes, idx + 2)) {
                (Some(second), Some(third)) => {
                    units.push(((first & 0x0F) << 12) | (second << 6) | third);
                    idx += 3;
                }
                _ => {
                    units.push(REPLACEMENT);
                    malformed = true;
                    idx += 1;
                }
            },
            _ => {
                units.push(REPLACEMENT);
                malformed = true;
                idx += 1;
            }
        }
    }

    (units, malformed)
}

/// The low 6 bits of a continuation byte, if `idx` holds one
fn continuation(bytes: &[u8], idx: usize) -> Option<u16> {
    bytes
        .get(idx)
        .filter(|byte| *byte & 0xC0 == 0x80)
        .map(|byte| u16::from(byte & 0x3F))
}
