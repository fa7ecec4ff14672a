/*!
 Byte values defined by the Java object serialization stream protocol.
*/

/// First two bytes of every stream
pub const STREAM_MAGIC: u16 = 0xACED;
/// The only stream version this decoder targets
pub const STREAM_VERSION: u16 = 0x0005;

/// A `null` reference
pub const TC_NULL: u8 = 0x70;
/// A reference to an object already written to the stream
pub const TC_REFERENCE: u8 = 0x71;
/// A new class descriptor
pub const TC_CLASSDESC: u8 = 0x72;
/// A new object
pub const TC_OBJECT: u8 = 0x73;
/// A new string with a 2-byte length
pub const TC_STRING: u8 = 0x74;
/// A new array
pub const TC_ARRAY: u8 = 0x75;
/// A reference to a class
pub const TC_CLASS: u8 = 0x76;
/// Block data with a 1-byte length
pub const TC_BLOCKDATA: u8 = 0x77;
/// End of an optional block of data for an object or class
pub const TC_ENDBLOCKDATA: u8 = 0x78;
/// Block data with a 4-byte length
pub const TC_BLOCKDATALONG: u8 = 0x7A;
/// A new string with an 8-byte length
pub const TC_LONGSTRING: u8 = 0x7C;
/// A new dynamic proxy class descriptor
pub const TC_PROXYCLASSDESC: u8 = 0x7D;
/// A new enum constant
pub const TC_ENUM: u8 = 0x7E;

/// The first handle assigned in every stream
pub const BASE_WIRE_HANDLE: u32 = 0x7E0000;

/// The class defines a `writeObject` method
pub const SC_WRITE_METHOD: u8 = 0x01;
/// The class implements `java.io.Serializable`
pub const SC_SERIALIZABLE: u8 = 0x02;
/// The class implements `java.io.Externalizable`
pub const SC_EXTERNALIZABLE: u8 = 0x04;
/// Externalizable data was written in block data mode
pub const SC_BLOCK_DATA: u8 = 0x08;
/// The class is an enum type
pub const SC_ENUM: u8 = 0x10;

/// Leading character of every array class name
pub const ARRAY_SIGIL: u8 = b'[';

/// Transport bytes that can precede the stream magic in RMI traffic
pub const RMI_CALL: u8 = 0x50;
pub const RMI_RETURN_DATA: u8 = 0x51;
pub const RMI_PING: u8 = 0x52;
pub const RMI_PING_ACK: u8 = 0x53;
pub const RMI_DGC_ACK: u8 = 0x54;
