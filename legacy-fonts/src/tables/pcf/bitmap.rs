//! The bitmaps table.

use alloc::vec::Vec;

use super::{Error, TableFormat, MAX_GLYPHS};
use crate::{font_data::Cursor, read::ReadError};

/// The layout of the rows in a bitmap table, taken from its format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitmapFormat(u32);

impl BitmapFormat {
    /// Each row of a glyph is padded to a multiple of this many bytes.
    pub fn glyph_pad(self) -> usize {
        1 << (self.0 & 3)
    }

    pub fn is_msb_byte_first(self) -> bool {
        self.0 & (1 << 2) != 0
    }

    pub fn is_msb_bit_first(self) -> bool {
        self.0 & (1 << 3) != 0
    }

    /// The unit, in bytes, in which rows are stored.
    pub fn scan_unit(self) -> usize {
        1 << ((self.0 >> 4) & 3)
    }

    pub fn to_bits(self) -> u32 {
        self.0
    }
}

/// Glyph bitmaps: one offset per glyph into a shared block of pixel data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmaps<'a> {
    format: BitmapFormat,
    offsets: Vec<u32>,
    data: &'a [u8],
}

impl<'a> Bitmaps<'a> {
    pub fn format(&self) -> BitmapFormat {
        self.format
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the pixel data for the glyph at `index`.
    ///
    /// A glyph's data runs up to the start of the next glyph, or the end of
    /// the data block for the last glyph.
    pub fn glyph_bytes(&self, index: usize) -> Option<&'a [u8]> {
        let start = *self.offsets.get(index)? as usize;
        let end = self
            .offsets
            .get(index + 1)
            .map(|end| *end as usize)
            .unwrap_or(self.data.len());
        self.data.get(start..end)
    }
}

/// Parses a bitmaps table, positioned after the format word.
pub(super) fn parse<'a>(
    cursor: &mut Cursor<'a>,
    format: TableFormat,
) -> Result<Bitmaps<'a>, Error> {
    if format.kind_bits() != 0 {
        return Err(Error::InvalidFormat(format.to_bits()));
    }
    let order = format.byte_order();
    let count = cursor.read_u32(order)?;
    if count > MAX_GLYPHS {
        return Err(Error::Unsupported("too many bitmaps"));
    }
    let offsets = (0..count)
        .map(|_| cursor.read_u32(order))
        .collect::<Result<Vec<_>, _>>()?;
    let mut sizes = [0u32; 4];
    for size in sizes.iter_mut() {
        *size = cursor.read_u32(order)?;
    }
    let data = cursor.read_bytes(sizes[(format.to_bits() & 3) as usize] as usize)?;
    if let Some(bad) = offsets.iter().find(|offset| **offset as usize > data.len()) {
        return Err(ReadError::InvalidOffset(*bad as usize).into());
    }
    Ok(Bitmaps {
        format: BitmapFormat(format.to_bits()),
        offsets,
        data,
    })
}
