//! The BDF encodings table: maps two-byte codepoints to glyphs.

use alloc::vec::Vec;

use font_types::GlyphId;

use super::{Error, TableFormat};
use crate::{font_data::Cursor, read::ReadError};

/// Marks a cell in the encoding array that has no glyph.
pub const NO_GLYPH: u16 = 0xFFFF;

/// Maps codepoints in `[min_byte..=max_byte] × [min_char..=max_char]` to glyphs.
///
/// The high byte of a codepoint selects a row and the low byte a column.
/// Single byte encodings have `min_byte == max_byte == 0`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Encoding {
    min_char: u8,
    max_char: u8,
    min_byte: u8,
    max_byte: u8,
    default_char: u16,
    values: Vec<u16>,
}

impl Encoding {
    pub fn min_char(&self) -> u8 {
        self.min_char
    }

    pub fn max_char(&self) -> u8 {
        self.max_char
    }

    pub fn min_byte(&self) -> u8 {
        self.min_byte
    }

    pub fn max_byte(&self) -> u8 {
        self.max_byte
    }

    /// The glyph used for codepoints without a glyph of their own.
    pub fn default_char(&self) -> GlyphId {
        GlyphId::from(self.default_char)
    }

    /// The raw cell values, row by row.
    pub fn values(&self) -> &[u16] {
        &self.values
    }

    /// Returns `true` if codepoints have a meaningful high byte.
    pub fn is_two_byte(&self) -> bool {
        self.max_byte != 0
    }

    /// Returns the glyph for the codepoint, if the font maps it.
    pub fn get(&self, codepoint: u32) -> Option<GlyphId> {
        let index = self.cell_index(codepoint)?;
        match *self.values.get(index)? {
            NO_GLYPH => None,
            gid => Some(GlyphId::from(gid)),
        }
    }

    /// Returns the glyph for the codepoint, falling back to the default glyph.
    pub fn map(&self, codepoint: u32) -> GlyphId {
        self.get(codepoint).unwrap_or(self.default_char())
    }

    /// Iterates over every mapped `(codepoint, glyph)` pair in codepoint order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, GlyphId)> + '_ {
        let row_len = self.row_len();
        self.values
            .iter()
            .enumerate()
            .filter(|(_, gid)| **gid != NO_GLYPH)
            .map(move |(i, gid)| {
                let row = (i / row_len) as u32 + self.min_byte as u32;
                let col = (i % row_len) as u32 + self.min_char as u32;
                ((row << 8) | col, GlyphId::from(*gid))
            })
    }

    fn row_len(&self) -> usize {
        self.max_char as usize - self.min_char as usize + 1
    }

    fn cell_index(&self, codepoint: u32) -> Option<usize> {
        if codepoint > 0xFFFF {
            return None;
        }
        let (hi, lo) = ((codepoint >> 8) as u8, codepoint as u8);
        if !(self.min_byte..=self.max_byte).contains(&hi)
            || !(self.min_char..=self.max_char).contains(&lo)
        {
            return None;
        }
        Some((hi - self.min_byte) as usize * self.row_len() + (lo - self.min_char) as usize)
    }

    /// Drops references to glyphs the font does not have.
    ///
    /// Cells past the end become empty and an out of range default glyph is
    /// replaced by glyph 0.
    pub(super) fn clamp_to_glyph_count(&mut self, glyph_count: usize) {
        let mut dropped = 0usize;
        for value in self.values.iter_mut() {
            if *value != NO_GLYPH && *value as usize >= glyph_count {
                *value = NO_GLYPH;
                dropped += 1;
            }
        }
        if dropped != 0 {
            log::warn!("pcf: {dropped} encoding entries refer to missing glyphs");
        }
        if self.default_char as usize >= glyph_count {
            log::warn!(
                "pcf: default char {} is not a valid glyph, using 0",
                self.default_char
            );
            self.default_char = 0;
        }
    }
}

/// Parses an encodings table, positioned after the format word.
pub(super) fn parse(cursor: &mut Cursor, format: TableFormat) -> Result<Encoding, Error> {
    if format.kind_bits() != 0 {
        return Err(Error::InvalidFormat(format.to_bits()));
    }
    let order = format.byte_order();
    // the limits are bytes stored in 16 bit fields
    let min_char = cursor.read_u16(order)?;
    let max_char = cursor.read_u16(order)?;
    let min_byte = cursor.read_u16(order)?;
    let max_byte = cursor.read_u16(order)?;
    if min_char > max_char || max_char > 0xFF || min_byte > max_byte || max_byte > 0xFF {
        return Err(ReadError::MalformedData("invalid encoding limits").into());
    }
    let default_char = cursor.read_u16(order)?;
    let count = (max_byte - min_byte + 1) as usize * (max_char - min_char + 1) as usize;
    let values = (0..count)
        .map(|_| cursor.read_u16(order))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Encoding {
        min_char: min_char as u8,
        max_char: max_char as u8,
        min_byte: min_byte as u8,
        max_byte: max_byte as u8,
        default_char,
        values,
    })
}
