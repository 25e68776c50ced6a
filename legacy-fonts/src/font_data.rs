//! raw font bytes

use crate::read::{ByteOrder, ReadError, ReadScalar};

/// A reference to raw binary font data.
///
/// This is a wrapper around a byte slice, that provides convenience methods
/// for parsing and validating that data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FontData<'a> {
    bytes: &'a [u8],
}

/// A cursor for reading scalars sequentially out of [`FontData`].
///
/// The position never moves past the end of the data: a read or skip that
/// would do so fails and leaves the cursor where it was.
#[derive(Debug, Default, Clone)]
pub struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> FontData<'a> {
    /// Create a new `FontData` with these bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData { bytes }
    }

    /// The length of the data, in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the data has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The data from `pos` to the end.
    pub fn split_off(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(pos..).map(FontData::new)
    }

    /// Read a scalar at `offset` with the given byte order.
    pub fn read_at_with_order<T: ReadScalar>(
        &self,
        offset: usize,
        order: ByteOrder,
    ) -> Result<T, ReadError> {
        self.bytes
            .get(offset..)
            .and_then(|bytes| T::read(bytes, order))
            .ok_or(ReadError::Truncated)
    }

    /// Returns a cursor positioned at the start of the data.
    pub fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            data: *self,
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Cursor<'a> {
    /// Read a big-endian scalar and advance past it.
    pub fn read<T: ReadScalar>(&mut self) -> Result<T, ReadError> {
        self.read_with_order(ByteOrder::BigEndian)
    }

    pub fn read_with_order<T: ReadScalar>(&mut self, order: ByteOrder) -> Result<T, ReadError> {
        let value = self.data.read_at_with_order(self.pos, order)?;
        self.pos += T::RAW_BYTE_LEN;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        self.read()
    }

    pub fn read_u16(&mut self, order: ByteOrder) -> Result<u16, ReadError> {
        self.read_with_order(order)
    }

    pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32, ReadError> {
        self.read_with_order(order)
    }

    pub fn read_i16(&mut self, order: ByteOrder) -> Result<i16, ReadError> {
        self.read_with_order(order)
    }

    pub fn read_i32(&mut self, order: ByteOrder) -> Result<i32, ReadError> {
        self.read_with_order(order)
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        let bytes = self
            .pos
            .checked_add(n)
            .and_then(|end| self.data.bytes.get(self.pos..end))
            .ok_or(ReadError::Truncated)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Move to an absolute position.
    ///
    /// Seeking to exactly the end of the data is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<(), ReadError> {
        if pos > self.data.len() {
            return Err(ReadError::InvalidOffset(pos));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ReadError> {
        match self.pos.checked_add(n) {
            Some(pos) if pos <= self.data.len() => {
                self.pos = pos;
                Ok(())
            }
            _ => Err(ReadError::Truncated),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining_bytes(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// The unread portion of the data.
    pub fn remaining(&self) -> FontData<'a> {
        self.data.split_off(self.pos).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_bytes() == 0
    }
}

impl AsRef<[u8]> for FontData<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for FontData<'a> {
    fn from(src: &'a [u8]) -> FontData<'a> {
        FontData::new(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_reads_with_explicit_order() {
        let data = FontData::new(&[1, 0, 0, 1, 0xAA, 0xBB, 0xCC]);
        let mut cursor = data.cursor();
        assert_eq!(cursor.read_u16(ByteOrder::LittleEndian), Ok(1));
        assert_eq!(cursor.read_u16(ByteOrder::BigEndian), Ok(1));
        assert_eq!(cursor.read_bytes(2), Ok(&[0xAA, 0xBB][..]));
        assert_eq!(cursor.position(), 6);
        assert_eq!(cursor.read_u16(ByteOrder::BigEndian), Err(ReadError::Truncated));
        // failed reads don't move the cursor
        assert_eq!(cursor.position(), 6);
        assert_eq!(cursor.read_u8(), Ok(0xCC));
        assert!(cursor.is_empty());
    }

    #[test]
    fn seek_and_skip() {
        let data = FontData::new(&[0; 8]);
        let mut cursor = data.cursor();
        assert_eq!(cursor.seek(8), Ok(()));
        assert_eq!(cursor.seek(9), Err(ReadError::InvalidOffset(9)));
        assert_eq!(cursor.position(), 8);
        cursor.seek(2).unwrap();
        assert_eq!(cursor.skip(6), Ok(()));
        assert_eq!(cursor.skip(1), Err(ReadError::Truncated));
        assert_eq!(cursor.skip(usize::MAX), Err(ReadError::Truncated));
        assert_eq!(cursor.read_bytes(usize::MAX), Err(ReadError::Truncated));
    }

    #[test]
    fn reads_at_offsets() {
        let data = FontData::new(&[0, 1, 2, 3, 4, 5]);
        assert_eq!(data.read_at_with_order::<u16>(4, ByteOrder::BigEndian), Ok(0x0405));
        assert_eq!(data.read_at_with_order::<u16>(4, ByteOrder::LittleEndian), Ok(0x0504));
        assert_eq!(
            data.read_at_with_order::<u16>(5, ByteOrder::BigEndian),
            Err(ReadError::Truncated)
        );
        let mut cursor = data.cursor();
        cursor.skip(4).unwrap();
        assert_eq!(cursor.remaining().as_bytes(), &[4, 5]);
        assert!(data.split_off(7).is_none());
    }
}
