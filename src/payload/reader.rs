//! Bounds-checked little-endian cursor over a byte slice.

use crate::core::Point;
use crate::error::DecodeError;

/// Cursor that never reads past the end of its slice
///
/// `base` is the absolute offset of the slice in the payload so that
/// truncation errors point at the real byte position.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteReader<'a> {
    /// Reader over a whole buffer
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    /// Reader over a sub-slice starting at absolute offset `base`
    pub fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    /// Absolute offset of the next byte
    #[inline]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes left to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True when everything has been consumed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::Truncated {
                offset: self.offset(),
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Take the next `N` bytes as an array
    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.bytes(len).map(|_| ())
    }

    /// Sub-reader over the next `len` bytes
    pub fn sub_reader(&mut self, len: usize) -> Result<ByteReader<'a>, DecodeError> {
        let base = self.offset();
        let slice = self.bytes(len)?;
        Ok(ByteReader::with_base(slice, base))
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    #[inline]
    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    /// Q16.16 fixed-point coordinate pair
    #[inline]
    pub fn point(&mut self) -> Result<Point, DecodeError> {
        let x = self.i32()?;
        let y = self.i32()?;
        Ok(Point::from_fixed(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.u8().unwrap(), 0x01);
        assert_eq!(reader.u16().unwrap(), 0x0302);
        assert_eq!(reader.u32().unwrap(), 0x0706_0504);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncated_read_reports_offset() {
        let data = [0u8; 10];
        let mut reader = ByteReader::with_base(&data[..6], 100);
        reader.u32().unwrap();
        assert_eq!(
            reader.u32(),
            Err(DecodeError::Truncated {
                offset: 104,
                needed: 4,
                available: 2,
            })
        );
        // Failed reads do not advance
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_sub_reader_is_bounded() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = ByteReader::new(&data);
        reader.skip(1).unwrap();
        let mut sub = reader.sub_reader(2).unwrap();
        assert_eq!(sub.offset(), 1);
        assert_eq!(sub.u16().unwrap(), 0x0302);
        assert!(sub.u8().is_err());
        assert_eq!(reader.u8().unwrap(), 4);
    }

    #[test]
    fn test_fixed_point() {
        let mut data = Vec::new();
        data.extend_from_slice(&(3i32 << 16).to_le_bytes());
        data.extend_from_slice(&(-(1i32 << 15)).to_le_bytes());
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.point().unwrap(), Point::new(3.0, -0.5));
    }
}
