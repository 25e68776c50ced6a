//! Per-glyph metrics, shared by the metrics, ink metrics and accelerator tables.

use alloc::vec::Vec;

use super::{Error, TableFormat, MAX_GLYPHS};
use crate::{font_data::Cursor, read::ByteOrder};

/// The metrics of a single glyph, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metric {
    pub left_side_bearing: i16,
    pub right_side_bearing: i16,
    pub character_width: i16,
    pub character_ascent: i16,
    pub character_descent: i16,
    pub attributes: u16,
}

impl Metric {
    /// The width of the glyph's bitmap.
    pub fn width(&self) -> i32 {
        self.right_side_bearing as i32 - self.left_side_bearing as i32
    }

    /// The height of the glyph's bitmap.
    pub fn height(&self) -> i32 {
        self.character_ascent as i32 + self.character_descent as i32
    }

    pub(crate) fn read(
        cursor: &mut Cursor,
        compressed: bool,
        order: ByteOrder,
    ) -> Result<Self, Error> {
        if compressed {
            let bytes = cursor.read_bytes(5)?;
            let field = |i: usize| bytes[i] as i16 - 0x80;
            Ok(Metric {
                left_side_bearing: field(0),
                right_side_bearing: field(1),
                character_width: field(2),
                character_ascent: field(3),
                character_descent: field(4),
                attributes: 0,
            })
        } else {
            Ok(Metric {
                left_side_bearing: cursor.read_i16(order)?,
                right_side_bearing: cursor.read_i16(order)?,
                character_width: cursor.read_i16(order)?,
                character_ascent: cursor.read_i16(order)?,
                character_descent: cursor.read_i16(order)?,
                attributes: cursor.read_u16(order)?,
            })
        }
    }
}

/// Parses a metrics or ink metrics table, positioned after the format word.
pub(super) fn parse(cursor: &mut Cursor, format: TableFormat) -> Result<Vec<Metric>, Error> {
    let order = format.byte_order();
    let compressed = format.is_compressed_metrics();
    let count = if compressed {
        cursor.read_u16(order)? as u32
    } else {
        cursor.read_u32(order)?
    };
    if count > MAX_GLYPHS {
        return Err(Error::Unsupported("too many glyph metrics"));
    }
    (0..count)
        .map(|_| Metric::read(cursor, compressed, order))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FontData;

    #[test]
    fn compressed_cell_limits() {
        let data = FontData::new(&[0x00, 0xFF, 0x80, 0x81, 0x7F]);
        let metric = Metric::read(&mut data.cursor(), true, ByteOrder::BigEndian).unwrap();
        assert_eq!(metric.left_side_bearing, -128);
        assert_eq!(metric.right_side_bearing, 127);
        assert_eq!(metric.character_width, 0);
        assert_eq!(metric.character_ascent, 1);
        assert_eq!(metric.character_descent, -1);
        assert_eq!(metric.width(), 255);
    }

    #[test]
    fn uncompressed_little_endian() {
        let data = FontData::new(&[0xFE, 0xFF, 4, 0, 6, 0, 5, 0, 1, 0, 3, 0]);
        let metric = Metric::read(&mut data.cursor(), false, ByteOrder::LittleEndian).unwrap();
        assert_eq!(
            metric,
            Metric {
                left_side_bearing: -2,
                right_side_bearing: 4,
                character_width: 6,
                character_ascent: 5,
                character_descent: 1,
                attributes: 3,
            }
        );
        assert_eq!(metric.height(), 6);
    }

    #[test]
    fn too_many_metrics() {
        // uncompressed, little endian count of 65537
        let data = FontData::new(&[0x01, 0x00, 0x01, 0x00]);
        let err = parse(&mut data.cursor(), TableFormat::new(0)).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn truncated_table() {
        // compressed, big endian: claims two glyphs, has one
        let data = FontData::new(&[0, 2, 1, 2, 3, 4, 5]);
        let err = parse(&mut data.cursor(), TableFormat::new(0x104)).unwrap_err();
        assert!(matches!(err, Error::Read(_)));
    }
}
