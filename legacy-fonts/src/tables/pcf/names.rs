//! The glyph names and scalable widths tables.

use alloc::vec::Vec;

use super::{Error, TableFormat, MAX_GLYPHS};
use crate::{font_data::Cursor, read::ReadError, string::Latin1String};

/// Parses a glyph names table, positioned after the format word.
pub(super) fn parse_glyph_names<'a>(
    cursor: &mut Cursor<'a>,
    format: TableFormat,
) -> Result<Vec<Latin1String<'a>>, Error> {
    let order = format.byte_order();
    let count = cursor.read_u32(order)?;
    if count > MAX_GLYPHS {
        return Err(Error::Unsupported("too many glyph names"));
    }
    let offsets = (0..count)
        .map(|_| cursor.read_u32(order))
        .collect::<Result<Vec<_>, _>>()?;
    let strings_len = cursor.read_u32(order)?;
    let strings = cursor.read_bytes(strings_len as usize)?;
    offsets
        .into_iter()
        .map(|offset| {
            Latin1String::from_c_str(strings, offset as usize)
                .ok_or_else(|| Error::from(ReadError::MalformedData("invalid glyph name")))
        })
        .collect()
}

/// Parses a scalable widths table, positioned after the format word.
pub(super) fn parse_scalable_widths(
    cursor: &mut Cursor,
    format: TableFormat,
) -> Result<Vec<u32>, Error> {
    let order = format.byte_order();
    let count = cursor.read_u32(order)?;
    if count > MAX_GLYPHS {
        return Err(Error::Unsupported("too many scalable widths"));
    }
    (0..count)
        .map(|_| cursor.read_u32(order).map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FontData;

    #[test]
    fn glyph_names() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&6u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        let strings = b"space\0A\0";
        bytes.extend_from_slice(&(strings.len() as u32).to_be_bytes());
        bytes.extend_from_slice(strings);
        let data = FontData::new(&bytes);
        let names = parse_glyph_names(&mut data.cursor(), TableFormat::new(0x4)).unwrap();
        assert_eq!(names, [Latin1String::new(b"A"), Latin1String::new(b"space")]);
    }

    #[test]
    fn glyph_name_out_of_bounds() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&10u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(b"A\0");
        let data = FontData::new(&bytes);
        assert!(parse_glyph_names(&mut data.cursor(), TableFormat::new(0)).is_err());
    }

    #[test]
    fn scalable_widths() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&500u32.to_le_bytes());
        bytes.extend_from_slice(&722u32.to_le_bytes());
        let data = FontData::new(&bytes);
        let widths = parse_scalable_widths(&mut data.cursor(), TableFormat::new(0)).unwrap();
        assert_eq!(widths, [500, 722]);
    }
}
