/*!
 A forward-only reader over the bytes of a serialization stream.
*/

use crate::error::stream::StreamError;

/// Reads big-endian values from the front of a byte slice
#[derive(Debug)]
pub struct ByteCursor<'a> {
    /// The stream we want to decode
    stream: &'a [u8],
    /// The current index we are at in the stream
    idx: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self { stream, idx: 0 }
    }

    /// The offset of the next unread byte
    pub fn offset(&self) -> usize {
        self.idx
    }

    /// The number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.stream.len() - self.idx
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read exactly `n` bytes from the stream, consuming nothing if there are not enough
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], StreamError> {
        let range = self
            .idx
            .checked_add(n)
            .and_then(|end| self.stream.get(self.idx..end))
            .ok_or(StreamError::OutOfData {
                offset: self.idx,
                needed: n,
                remaining: self.remaining(),
            })?;
        self.idx += n;
        Ok(range)
    }

    /// Read the current byte without consuming it
    pub fn peek(&self) -> Result<u8, StreamError> {
        self.stream
            .get(self.idx)
            .copied()
            .ok_or(StreamError::OutOfData {
                offset: self.idx,
                needed: 1,
                remaining: 0,
            })
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], StreamError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, StreamError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, StreamError> {
        Ok(i8::from_be_bytes(self.take_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, StreamError> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, StreamError> {
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, StreamError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, StreamError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, StreamError> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, StreamError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, StreamError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, StreamError> {
        Ok(f64::from_bits(self.read_u64()?))
    }
}
