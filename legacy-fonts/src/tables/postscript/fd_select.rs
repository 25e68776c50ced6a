//! Parsing for CFF FDSelect tables.

use alloc::vec::Vec;

use types::GlyphId;

use super::Error;
use crate::{read::ReadError, FontData};

/// Maps each glyph of a CID font to the Font DICT holding its private data.
///
/// See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=28>
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FdSelect<'a> {
    /// One font DICT index per glyph.
    Format0(&'a [u8]),
    /// Runs of glyphs sharing a font DICT, each covering the glyphs up to the
    /// start of the next range or the sentinel.
    Format3 {
        ranges: Vec<FdRange>,
        sentinel: u16,
    },
}

/// A run of glyphs in a format 3 FDSelect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FdRange {
    pub first: u16,
    pub fd: u8,
}

impl<'a> FdSelect<'a> {
    /// Reads the FDSelect at `offset` for a font with `num_glyphs` glyphs.
    pub fn new(cff_data: &'a [u8], offset: usize, num_glyphs: u32) -> Result<Self, Error> {
        let data = FontData::new(cff_data)
            .split_off(offset)
            .ok_or(ReadError::InvalidOffset(offset))?;
        let mut cursor = data.cursor();
        let format = cursor.read::<u8>()?;
        match format {
            0 => Ok(Self::Format0(cursor.read_bytes(num_glyphs as usize)?)),
            3 => {
                let n_ranges = cursor.read::<u16>()?;
                let mut ranges = Vec::with_capacity(n_ranges as usize);
                for _ in 0..n_ranges {
                    let first = cursor.read::<u16>()?;
                    let fd = cursor.read::<u8>()?;
                    ranges.push(FdRange { first, fd });
                }
                let sentinel = cursor.read::<u16>()?;
                if sentinel as u32 != num_glyphs {
                    return Err(
                        ReadError::MalformedData("FDSelect sentinel is not the glyph count").into(),
                    );
                }
                if ranges.first().is_some_and(|range| range.first != 0)
                    || ranges.windows(2).any(|pair| pair[0].first >= pair[1].first)
                {
                    return Err(ReadError::MalformedData("FDSelect ranges are not sorted").into());
                }
                Ok(Self::Format3 { ranges, sentinel })
            }
            _ => Err(Error::Unsupported("FDSelect format other than 0 or 3")),
        }
    }

    /// Returns the associated font DICT index for the given glyph identifier.
    pub fn font_index(&self, glyph_id: GlyphId) -> Option<u16> {
        let gid = glyph_id.to_u32();
        match self {
            Self::Format0(fds) => fds.get(gid as usize).map(|fd| *fd as u16),
            Self::Format3 { ranges, sentinel } => {
                if gid >= *sentinel as u32 {
                    return None;
                }
                let ix = match ranges.binary_search_by(|range| (range.first as u32).cmp(&gid)) {
                    Ok(ix) => ix,
                    Err(ix) => ix.checked_sub(1)?,
                };
                Some(ranges.get(ix)?.fd as u16)
            }
        }
    }
}
