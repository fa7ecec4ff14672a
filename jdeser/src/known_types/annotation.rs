/*!
 Reads the primitives and objects a custom `writeObject` or `writeExternal` wrote into a class's annotations.
*/

use crate::{
    error::{known_type::KnownTypeError, stream::StreamError},
    util::objectstream::{
        cursor::ByteCursor,
        models::{Content, DecodedObject, Value},
    },
};

/// Walks one class's annotation contents the way `ObjectInputStream` hands them to `readObject`
///
/// Consecutive block data segments read as a single run of bytes, since a writer may split
/// its primitives across segments at any point.
#[derive(Debug)]
pub struct AnnotationReader<'a> {
    class_name: &'a str,
    contents: &'a [Content],
    /// Index of the next content element that has not been buffered
    idx: usize,
    /// Bytes from the current run of block data
    block: Vec<u8>,
    /// Read position in `block`
    pos: usize,
}

impl<'a> AnnotationReader<'a> {
    pub fn new(class_name: &'a str, contents: &'a [Content]) -> Self {
        Self {
            class_name,
            contents,
            idx: 0,
            block: vec![],
            pos: 0,
        }
    }

    /// Build a reader over the annotations written by `class_name` in `object`'s hierarchy
    pub fn for_class(
        object: &'a DecodedObject,
        class_name: &'a str,
    ) -> Result<Self, KnownTypeError> {
        object
            .class_data_for(class_name)
            .and_then(|data| data.annotations.as_deref())
            .map(|contents| Self::new(class_name, contents))
            .ok_or_else(|| KnownTypeError::MissingBlockData(class_name.to_string()))
    }

    /// Move any block data segments waiting at the front of the contents into the buffer
    fn fill(&mut self) {
        while let Some(Content::BlockData(bytes)) = self.contents.get(self.idx) {
            self.block.extend_from_slice(bytes);
            self.idx += 1;
        }
    }

    fn read_block<T>(
        &mut self,
        read: impl FnOnce(&mut ByteCursor<'_>) -> Result<T, StreamError>,
    ) -> Result<T, KnownTypeError> {
        self.fill();
        let mut cursor = ByteCursor::new(&self.block[self.pos..]);
        let value = read(&mut cursor)?;
        self.pos += cursor.offset();
        Ok(value)
    }

    pub fn read_i8(&mut self) -> Result<i8, KnownTypeError> {
        self.read_block(|cursor| cursor.read_i8())
    }

    pub fn read_i32(&mut self) -> Result<i32, KnownTypeError> {
        self.read_block(|cursor| cursor.read_i32())
    }

    pub fn read_i64(&mut self) -> Result<i64, KnownTypeError> {
        self.read_block(|cursor| cursor.read_i64())
    }

    pub fn read_f32(&mut self) -> Result<f32, KnownTypeError> {
        self.read_block(|cursor| cursor.read_f32())
    }

    /// Read a non-negative element count
    pub fn read_count(&mut self) -> Result<usize, KnownTypeError> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| {
            KnownTypeError::InvalidCount(self.class_name.to_string(), count)
        })
    }

    /// Read the next object written between block data segments
    ///
    /// Unread bytes left in the current block data run are skipped.
    pub fn read_value(&mut self) -> Result<Value, KnownTypeError> {
        self.fill();
        match self.contents.get(self.idx) {
            Some(Content::Value(value)) => {
                self.idx += 1;
                self.block.clear();
                self.pos = 0;
                Ok(value.clone())
            }
            _ => Err(KnownTypeError::MissingValue(self.class_name.to_string())),
        }
    }

    /// Read `count` objects in a row
    pub fn read_values(&mut self, count: usize) -> Result<Vec<Value>, KnownTypeError> {
        let mut out_v = Vec::with_capacity(count.min(self.contents.len()));
        for _ in 0..count {
            out_v.push(self.read_value()?);
        }
        Ok(out_v)
    }
}
