/*!
 Data structures produced when decoding a Java object serialization stream.
*/

use std::{
    fmt::{Display, Formatter, Result},
    sync::Arc,
};

use crate::util::objectstream::constants::{
    BASE_WIRE_HANDLE, RMI_CALL, RMI_DGC_ACK, RMI_PING, RMI_PING_ACK, RMI_RETURN_DATA,
    SC_BLOCK_DATA, SC_ENUM, SC_EXTERNALIZABLE, SC_SERIALIZABLE, SC_WRITE_METHOD,
};

/// Name given to dynamic proxy classes, which are written without a name of their own
pub const PROXY_CLASS_NAME: &str = "$Proxy";

/// Identity assigned to an element of the stream so that later elements can refer back to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(pub u32);

impl Handle {
    /// Position of this handle in the table of assigned handles, if it is not below the base
    pub fn index(&self) -> Option<usize> {
        self.0
            .checked_sub(BASE_WIRE_HANDLE)
            .and_then(|idx| usize::try_from(idx).ok())
    }
}

impl Display for Handle {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        write!(fmt, "{:#08x}", self.0)
    }
}

/// The type of a field declared in a class descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `B`, a signed 8-bit integer
    Byte,
    /// `C`, a UTF-16 code unit
    Char,
    /// `D`, a 64-bit IEEE-754 float
    Double,
    /// `F`, a 32-bit IEEE-754 float
    Float,
    /// `I`, a signed 32-bit integer
    Integer,
    /// `J`, a signed 64-bit integer
    Long,
    /// `S`, a signed 16-bit integer
    Short,
    /// `Z`, a single byte that is true when nonzero
    Boolean,
    /// `[`, an array of any type
    Array,
    /// `L`, an instance of any class, including strings
    Object,
}

impl FieldType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'B' => Some(Self::Byte),
            b'C' => Some(Self::Char),
            b'D' => Some(Self::Double),
            b'F' => Some(Self::Float),
            b'I' => Some(Self::Integer),
            b'J' => Some(Self::Long),
            b'S' => Some(Self::Short),
            b'Z' => Some(Self::Boolean),
            b'[' => Some(Self::Array),
            b'L' => Some(Self::Object),
            _ => None,
        }
    }

    /// The single character used for this type in field descriptors and array class names
    pub fn type_code(&self) -> char {
        match self {
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Double => 'D',
            Self::Float => 'F',
            Self::Integer => 'I',
            Self::Long => 'J',
            Self::Short => 'S',
            Self::Boolean => 'Z',
            Self::Array => '[',
            Self::Object => 'L',
        }
    }

    /// `true` for types whose class name is written after the field name
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }

    /// The Java keyword for primitive types, otherwise `None`
    pub fn primitive_name(&self) -> Option<&'static str> {
        match self {
            Self::Byte => Some("byte"),
            Self::Char => Some("char"),
            Self::Double => Some("double"),
            Self::Float => Some("float"),
            Self::Integer => Some("int"),
            Self::Long => Some("long"),
            Self::Short => Some("short"),
            Self::Boolean => Some("boolean"),
            Self::Array | Self::Object => None,
        }
    }
}

/// A field declared by a class descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field_type: FieldType,
    pub name: String,
    /// JVM type signature of array and object fields, i.e. `Ljava/lang/String;`
    pub class_name: Option<String>,
}

impl FieldDescriptor {
    /// The declared type as it would appear in Java source
    pub fn type_name(&self) -> String {
        match (self.field_type.primitive_name(), &self.class_name) {
            (Some(name), _) => name.to_string(),
            (None, Some(signature)) => signature_to_type_name(signature),
            (None, None) => "java.lang.Object".to_string(),
        }
    }
}

/// Convert a JVM type signature such as `[Ljava/lang/String;` into `java.lang.String[]`
pub fn signature_to_type_name(signature: &str) -> String {
    let dimensions = signature.bytes().take_while(|byte| *byte == b'[').count();
    let element = &signature[dimensions..];
    let base = match element.as_bytes().first().copied().and_then(FieldType::from_byte) {
        Some(FieldType::Object) => element
            .trim_start_matches('L')
            .trim_end_matches(';')
            .replace('/', "."),
        Some(primitive) => primitive
            .primitive_name()
            .map(str::to_string)
            .unwrap_or_else(|| element.to_string()),
        None => element.to_string(),
    };
    format!("{base}{}", "[]".repeat(dimensions))
}

/// The flags byte of a class descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassFlags(pub u8);

impl ClassFlags {
    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn has_write_method(&self) -> bool {
        self.0 & SC_WRITE_METHOD == SC_WRITE_METHOD
    }

    pub fn is_serializable(&self) -> bool {
        self.0 & SC_SERIALIZABLE == SC_SERIALIZABLE
    }

    pub fn is_externalizable(&self) -> bool {
        self.0 & SC_EXTERNALIZABLE == SC_EXTERNALIZABLE
    }

    pub fn has_block_data(&self) -> bool {
        self.0 & SC_BLOCK_DATA == SC_BLOCK_DATA
    }

    pub fn is_enum(&self) -> bool {
        self.0 & SC_ENUM == SC_ENUM
    }

    /// Determine whether this combination of flags can be written by `ObjectOutputStream`
    pub fn is_valid(&self) -> bool {
        if self.is_serializable() {
            !self.is_externalizable() && !self.has_block_data()
        } else if self.is_externalizable() {
            !self.has_write_method()
        } else {
            self.0 == 0
        }
    }

    /// Instances of the class carry a block of annotations after their field values
    pub fn has_object_annotation(&self) -> bool {
        (self.is_serializable() && self.has_write_method())
            || (self.is_externalizable() && self.has_block_data())
    }
}

impl Display for ClassFlags {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        let names: Vec<&str> = [
            (SC_WRITE_METHOD, "SC_WRITE_METHOD"),
            (SC_SERIALIZABLE, "SC_SERIALIZABLE"),
            (SC_EXTERNALIZABLE, "SC_EXTERNALIZABLE"),
            (SC_BLOCK_DATA, "SC_BLOCK_DATA"),
            (SC_ENUM, "SC_ENUM"),
        ]
        .iter()
        .filter(|(bit, _)| self.0 & bit == *bit)
        .map(|(_, name)| *name)
        .collect();

        if names.is_empty() {
            write!(fmt, "{:#04x}", self.0)
        } else {
            write!(fmt, "{:#04x} ({})", self.0, names.join(" | "))
        }
    }
}

/// Distinguishes ordinary class descriptors from dynamic proxy descriptors
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorKind {
    /// A named class with a field table
    Class,
    /// A `java.lang.reflect.Proxy` class, described only by the interfaces it implements
    Proxy(Vec<String>),
}

/// Metadata describing one class in the stream
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub name: String,
    pub serial_version_uid: i64,
    pub flags: ClassFlags,
    /// Fields in the order their values are written
    pub fields: Vec<FieldDescriptor>,
    pub handle: Handle,
    /// Content written by the class's `annotateClass` or `annotateProxyClass`, usually empty
    pub annotations: Vec<Content>,
    /// Handle of the superclass descriptor, if the class has a serializable superclass
    pub super_class: Option<Handle>,
    pub kind: DescriptorKind,
}

impl ClassDescriptor {
    pub fn is_proxy(&self) -> bool {
        matches!(self.kind, DescriptorKind::Proxy(_))
    }

    pub fn is_array(&self) -> bool {
        self.name.starts_with('[')
    }
}

/// A class descriptor followed by all of its serializable superclasses, most derived first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassChain(pub Vec<Arc<ClassDescriptor>>);

impl ClassChain {
    /// The most derived class
    pub fn leaf(&self) -> Option<&ClassDescriptor> {
        self.0.first().map(Arc::as_ref)
    }

    /// Name of the most derived class
    pub fn name(&self) -> Option<&str> {
        self.leaf().map(|class| class.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate from the most derived class to the most base class
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ClassDescriptor> {
        self.0.iter().map(Arc::as_ref)
    }

    /// Iterate from the most base class to the most derived class, the order class data is written in
    pub fn iter_base_first(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.iter().rev()
    }

    /// Determine if `name` is this class or one of its superclasses
    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|class| class.name == name)
    }
}

/// A string, decoded from Java's modified UTF-8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaString {
    pub handle: Handle,
    pub value: String,
    /// The bytes as written, kept only when `value` could not represent them exactly
    pub raw: Option<Vec<u8>>,
}

/// A `java.lang.Class` instance
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClass {
    pub handle: Handle,
    pub chain: ClassChain,
}

/// An array and its elements, in stream order
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArray {
    pub handle: Handle,
    /// Array class name, i.e. `[I` or `[Ljava.lang.String;`
    pub class_name: String,
    pub element_type: FieldType,
    pub elements: Vec<Value>,
}

/// An enum constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEnum {
    pub handle: Handle,
    pub class_name: String,
    pub constant: String,
}

/// The value of one declared field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

/// The data written by one class in an object's hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct ClassData {
    pub class_name: String,
    /// Handle of the class descriptor that declared these fields
    pub descriptor: Handle,
    pub values: Vec<FieldValue>,
    /// Content written by a custom `writeObject` or `writeExternal`; its layout is private to the class
    pub annotations: Option<Vec<Content>>,
}

/// An instance of a class along with the data written for each class in its hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedObject {
    pub handle: Handle,
    pub chain: ClassChain,
    /// Data for each class, most base class first
    pub class_data: Vec<ClassData>,
}

impl DecodedObject {
    /// Name of the object's most derived class
    pub fn class_name(&self) -> &str {
        self.chain.name().unwrap_or_default()
    }

    /// Every field value in the hierarchy, most base class first
    pub fn fields(&self) -> impl Iterator<Item = &FieldValue> {
        self.class_data.iter().flat_map(|data| data.values.iter())
    }

    /// Get a field by name; fields declared by subclasses hide fields with the same name in superclasses
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.class_data
            .iter()
            .rev()
            .flat_map(|data| data.values.iter())
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Get the data written by a specific class in the hierarchy
    pub fn class_data_for(&self, class_name: &str) -> Option<&ClassData> {
        self.class_data
            .iter()
            .find(|data| data.class_name == class_name)
    }
}

/// A value read for a field, an array element, or a content element
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Byte(i8),
    /// A UTF-16 code unit; may be half of a surrogate pair
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
    String(JavaString),
    Array(DecodedArray),
    Object(Box<DecodedObject>),
    Enum(DecodedEnum),
    Class(DecodedClass),
    /// A reference to something already read, resolved through the session's handle table
    Reference(Handle),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(string) => Some(&string.value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&DecodedObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Widen any integral primitive to an [`i64`]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(value) => Some(i64::from(*value)),
            Value::Char(value) => Some(i64::from(*value)),
            Value::Short(value) => Some(i64::from(*value)),
            Value::Int(value) => Some(i64::from(*value)),
            Value::Long(value) => Some(*value),
            _ => None,
        }
    }

    /// The handle of this value, if it was assigned one
    pub fn handle(&self) -> Option<Handle> {
        match self {
            Value::String(string) => Some(string.handle),
            Value::Array(array) => Some(array.handle),
            Value::Object(object) => Some(object.handle),
            Value::Enum(constant) => Some(constant.handle),
            Value::Class(class) => Some(class.handle),
            Value::Reference(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Render a primitive the way Java would print it; lone surrogates print as `\uXXXX`
    pub fn primitive_to_string(&self) -> Option<String> {
        Some(match self {
            Value::Byte(value) => value.to_string(),
            Value::Char(unit) => char::from_u32(u32::from(*unit))
                .map(String::from)
                .unwrap_or_else(|| format!("\\u{unit:04x}")),
            Value::Double(value) => format!("{value:?}"),
            Value::Float(value) => format!("{value:?}"),
            Value::Int(value) => value.to_string(),
            Value::Long(value) => value.to_string(),
            Value::Short(value) => value.to_string(),
            Value::Boolean(value) => value.to_string(),
            _ => return None,
        })
    }
}

/// A single element read from the stream after a type tag
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Objects, arrays, strings, enum constants, classes, `null`, and references
    Value(Value),
    /// A class descriptor written on its own, most derived class first
    ClassDescriptor(ClassChain),
    /// Opaque bytes written with `write`, `writeInt`, and similar calls
    BlockData(Vec<u8>),
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Content::Value(value)
    }
}

impl Content {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Content::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Non-fatal observations made while decoding a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// A transport byte preceded the stream magic and was discarded
    TransportEnvelope(u8),
    /// The stream declared a version other than the one this decoder targets
    VersionMismatch(u16),
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            Diagnostic::TransportEnvelope(byte) => {
                let kind = match byte {
                    &RMI_CALL => "RMI Call",
                    &RMI_RETURN_DATA => "RMI ReturnData",
                    &RMI_PING => "RMI Ping",
                    &RMI_PING_ACK => "RMI PingAck",
                    &RMI_DGC_ACK => "RMI DgcAck",
                    _ => "unknown transport byte",
                };
                write!(fmt, "Discarded {kind} ({byte:#04x}) before stream magic")
            }
            Diagnostic::VersionMismatch(version) => {
                write!(fmt, "Stream version {version:#06x} is not 0x0005")
            }
        }
    }
}
