use crate::util::objectstream::constants::{
    TC_CLASSDESC, TC_ENDBLOCKDATA, TC_NULL, TC_REFERENCE, TC_STRING,
};

/// Serial version id written by [`StreamBuilder::class_desc`]
pub(crate) const TEST_SERIAL_VERSION_UID: i64 = 0x0102_0304_0506_0708;

/// Assembles serialization streams for tests, one element at a time
pub(crate) struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    /// A stream that starts with the magic and version
    pub(crate) fn new() -> Self {
        Self {
            bytes: vec![0xAC, 0xED, 0x00, 0x05],
        }
    }

    pub(crate) fn byte(mut self, byte: u8) -> Self {
        self.bytes.push(byte);
        self
    }

    /// Append whitespace-separated hex
    pub(crate) fn hex(mut self, hex: &str) -> Self {
        let compact: String = hex.split_whitespace().collect();
        self.bytes.extend(hex::decode(compact).unwrap());
        self
    }

    pub(crate) fn int(mut self, value: i32) -> Self {
        self.bytes.extend(value.to_be_bytes());
        self
    }

    /// A 2-byte length followed by the string's bytes
    pub(crate) fn utf(mut self, value: &str) -> Self {
        self.bytes.extend((value.len() as u16).to_be_bytes());
        self.bytes.extend(value.as_bytes());
        self
    }

    /// A new string
    pub(crate) fn string(self, value: &str) -> Self {
        self.byte(TC_STRING).utf(value)
    }

    pub(crate) fn null(self) -> Self {
        self.byte(TC_NULL)
    }

    pub(crate) fn reference(self, handle: u32) -> Self {
        self.byte(TC_REFERENCE).hex(&format!("{handle:08x}"))
    }

    pub(crate) fn end_block(self) -> Self {
        self.byte(TC_ENDBLOCKDATA)
    }

    /// A class descriptor up to and including its empty class annotation;
    /// the superclass descriptor must be written next.
    ///
    /// Field class names are written as new strings, so each one takes a handle.
    pub(crate) fn class_desc(
        mut self,
        name: &str,
        flags: u8,
        fields: &[(u8, &str, Option<&str>)],
    ) -> Self {
        self = self.byte(TC_CLASSDESC).utf(name);
        self.bytes.extend(TEST_SERIAL_VERSION_UID.to_be_bytes());
        self.bytes.push(flags);
        self.bytes.extend((fields.len() as u16).to_be_bytes());
        for (code, field_name, class_name) in fields {
            self = self.byte(*code).utf(field_name);
            if let Some(class_name) = class_name {
                self = self.string(class_name);
            }
        }
        self.end_block()
    }

    pub(crate) fn build(self) -> Vec<u8> {
        self.bytes
    }
}
