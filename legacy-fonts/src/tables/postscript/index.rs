//! Parsing for PostScript INDEX objects.
//!
//! See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=12>

use super::Error;
use crate::{font_data::Cursor, read::ReadError, FontData};

/// The largest subroutine INDEX we accept.
pub const MAX_SUBROUTINES: u32 = 40000;

/// A validated INDEX: an array of variable length objects.
///
/// All offsets are checked when the INDEX is read, so accessing an element
/// by position only fails when the position is out of range.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Index<'a> {
    count: u16,
    off_size: u8,
    offsets: &'a [u8],
    data: &'a [u8],
}

impl<'a> Index<'a> {
    /// Reads an INDEX at the start of `data`.
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        Self::read(&mut FontData::new(data).cursor())
    }

    /// Reads an INDEX at the cursor position and advances past it.
    ///
    /// An empty INDEX consumes exactly the two bytes of its count.
    pub fn read(cursor: &mut Cursor<'a>) -> Result<Self, Error> {
        let count = cursor.read::<u16>()?;
        if count == 0 {
            return Ok(Self::default());
        }
        let off_size = cursor.read::<u8>()?;
        if !(1..=4).contains(&off_size) {
            return Err(Error::InvalidIndexOffsetSize(off_size));
        }
        let offsets = cursor.read_bytes((count as usize + 1) * off_size as usize)?;
        let available = cursor.remaining_bytes();
        let mut prev = 0;
        for i in 0..=count as usize {
            let offset = read_offset(offsets, off_size, i)?;
            let in_order = if i == 0 { offset == 0 } else { offset > prev };
            if !in_order || offset > available {
                return Err(Error::InvalidOffset);
            }
            prev = offset;
        }
        let data = cursor.read_bytes(prev)?;
        Ok(Self {
            count,
            off_size,
            offsets,
            data,
        })
    }

    /// Returns the number of objects in the index.
    pub fn count(&self) -> u32 {
        self.count as u32
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Computes a bias that is added to a subroutine operator in a
    /// charstring.
    ///
    /// See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=25>
    pub fn subr_bias(&self) -> i32 {
        let count = self.count();
        if count < 1240 {
            107
        } else if count < 33900 {
            1131
        } else {
            32768
        }
    }

    /// Returns the total size in bytes of the index table.
    pub fn size_in_bytes(&self) -> usize {
        match self.count {
            // An empty CFF index contains only a 2 byte count field
            0 => 2,
            // 2 byte count + 1 byte off_size
            _ => 3 + self.offsets.len() + self.data.len(),
        }
    }

    /// Returns the data for the object at the given index.
    pub fn get(&self, index: usize) -> Result<&'a [u8], Error> {
        if index >= self.count as usize {
            return Err(ReadError::InvalidOffset(index).into());
        }
        let start = read_offset(self.offsets, self.off_size, index)?;
        let end = read_offset(self.offsets, self.off_size, index + 1)?;
        self.data
            .get(start..end)
            .ok_or_else(|| ReadError::InvalidOffset(index).into())
    }

    /// Returns an iterator over all objects in the index.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.count as usize).filter_map(move |i| self.get(i).ok())
    }
}

/// Reads an offset which is encoded as a variable sized integer.
fn read_offset(offsets: &[u8], off_size: u8, index: usize) -> Result<usize, Error> {
    // "Offsets in the offset array are relative to the byte that precedes
    // the object data. Therefore the first element of the offset array is
    // always 1."
    let start = index * off_size as usize;
    let bytes = offsets
        .get(start..start + off_size as usize)
        .ok_or(ReadError::Truncated)?;
    bytes
        .iter()
        .fold(0usize, |acc, byte| (acc << 8) | *byte as usize)
        .checked_sub(1)
        .ok_or(Error::ZeroOffsetInIndex)
}
