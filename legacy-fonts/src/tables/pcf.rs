//! The [Portable Compiled Format](https://fontforge.org/docs/techref/pcf-format.html)
//! for X11 bitmap fonts.
//!
//! A PCF file starts with a table of contents listing a set of tables, each
//! of which carries its own format word. The low byte of the format word
//! describes byte and bit ordering; the high bits select a table variant.

mod accelerator;
mod bitmap;
mod encoding;
mod metrics;
mod names;
mod properties;

use alloc::{string::String, vec::Vec};

use font_types::GlyphId;

use crate::{
    font_data::{Cursor, FontData},
    read::{ByteOrder, ReadError},
    string::Latin1String,
};

pub use accelerator::Accelerator;
pub use bitmap::{BitmapFormat, Bitmaps};
pub use encoding::{Encoding, NO_GLYPH};
pub use metrics::Metric;
pub use properties::{Properties, Property};

/// The first four bytes of every PCF file.
pub const MAGIC: [u8; 4] = *b"\x01fcp";

/// The largest number of tables we accept in the table of contents.
pub const MAX_TABLES: u32 = 20;

/// The largest number of properties we accept.
pub const MAX_PROPERTIES: u32 = 512;

/// The largest number of glyphs we accept in any per-glyph table.
pub const MAX_GLYPHS: u32 = 65536;

/// The fixed units per em reported for bitmap fonts.
pub const UPEM: u16 = 1000;

const FORMAT_KIND_MASK: u32 = !0xFF;
const COMPRESSED_METRICS: u32 = 0x100;
const ACCEL_WITH_INK_BOUNDS: u32 = 0x100;
const MSB_BYTE_FIRST: u32 = 1 << 2;

/// An error that occurs when parsing a PCF font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    BadMagic,
    TooManyTables(u32),
    InvalidFormat(u32),
    Unsupported(&'static str),
    InconsistentTables(&'static str),
    Read(ReadError),
}

impl From<ReadError> for Error {
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BadMagic => write!(f, "not a PCF file"),
            Self::TooManyTables(count) => {
                write!(f, "table count {count} exceeds the limit of {MAX_TABLES}")
            }
            Self::InvalidFormat(format) => write!(f, "invalid table format 0x{format:08X}"),
            Self::Unsupported(what) => write!(f, "unsupported PCF data: {what}"),
            Self::InconsistentTables(what) => write!(f, "inconsistent PCF tables: {what}"),
            Self::Read(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The kinds of table that may appear in the table of contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TableKind {
    Properties = 1 << 0,
    Accelerators = 1 << 1,
    Metrics = 1 << 2,
    Bitmaps = 1 << 3,
    InkMetrics = 1 << 4,
    BdfEncodings = 1 << 5,
    ScalableWidths = 1 << 6,
    GlyphNames = 1 << 7,
    BdfAccelerators = 1 << 8,
}

impl TableKind {
    pub fn new(raw: u32) -> Option<Self> {
        Some(match raw {
            0x001 => Self::Properties,
            0x002 => Self::Accelerators,
            0x004 => Self::Metrics,
            0x008 => Self::Bitmaps,
            0x010 => Self::InkMetrics,
            0x020 => Self::BdfEncodings,
            0x040 => Self::ScalableWidths,
            0x080 => Self::GlyphNames,
            0x100 => Self::BdfAccelerators,
            _ => return None,
        })
    }
}

/// The format word at the start of each table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TableFormat(u32);

impl TableFormat {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// The byte order of the table payload.
    pub fn byte_order(self) -> ByteOrder {
        if self.0 & MSB_BYTE_FIRST != 0 {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    /// The variant selector, with the ordering bits masked off.
    pub fn kind_bits(self) -> u32 {
        self.0 & FORMAT_KIND_MASK
    }

    fn is_compressed_metrics(self) -> bool {
        self.kind_bits() == COMPRESSED_METRICS
    }

    fn has_ink_bounds(self) -> bool {
        self.kind_bits() == ACCEL_WITH_INK_BOUNDS
    }
}

/// An entry in the table of contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    pub kind: u32,
    pub format: u32,
    pub size: u32,
    pub offset: u32,
}

/// Reads the header and table of contents.
pub fn table_directory(data: FontData) -> Result<Vec<TableRecord>, Error> {
    let mut cursor = data.cursor();
    if cursor.read_bytes(4).map_err(|_| Error::BadMagic)? != MAGIC {
        return Err(Error::BadMagic);
    }
    let count = cursor.read_u32(ByteOrder::LittleEndian)?;
    if count > MAX_TABLES {
        return Err(Error::TooManyTables(count));
    }
    let directory_end = 8 + 16 * count;
    (0..count)
        .map(|_| {
            let le = ByteOrder::LittleEndian;
            let record = TableRecord {
                kind: cursor.read_u32(le)?,
                format: cursor.read_u32(le)?,
                size: cursor.read_u32(le)?,
                offset: cursor.read_u32(le)?,
            };
            if record.offset < directory_end {
                return Err(ReadError::InvalidOffset(record.offset as usize).into());
            }
            Ok(record)
        })
        .collect()
}

/// The bitmap of a single glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphBitmap<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Row padding and bit order of `data`.
    pub layout: BitmapFormat,
    pub pixel_format: PixelFormat,
}

/// The pixel format of glyph bitmaps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One bit per pixel.
    #[default]
    BlackAndWhite,
}

/// The ink box of a glyph, with y growing upwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphExtents {
    pub x_bearing: f32,
    pub y_bearing: f32,
    pub width: f32,
    pub height: f32,
}

/// Style information derived from the font properties.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    pub is_italic: bool,
    pub is_bold: bool,
    pub family_name: String,
    pub style_name: String,
}

/// The nominal size of a bitmap strike.
///
/// `size` is in points; the other fields are in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitmapSize {
    pub height: u16,
    pub width: u16,
    pub size: u16,
    pub x_ppem: u16,
    pub y_ppem: u16,
}

/// A parsed PCF font.
///
/// Glyph bitmaps, property strings and glyph names borrow from the input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PcfFont<'a> {
    properties: Properties<'a>,
    accelerator: Accelerator,
    metrics: Vec<Metric>,
    ink_metrics: Option<Vec<Metric>>,
    bitmaps: Bitmaps<'a>,
    encoding: Encoding,
    scalable_widths: Option<Vec<u32>>,
    glyph_names: Option<Vec<Latin1String<'a>>>,
}

impl<'a> PcfFont<'a> {
    /// Parses a font from the raw file contents.
    ///
    /// Gzipped input must first be passed through [`decompress`].
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        let data = FontData::new(data);
        let mut font = PcfFont::default();
        let mut accelerator = None;
        let mut bdf_accelerator = None;
        for record in table_directory(data)? {
            let Some(kind) = TableKind::new(record.kind) else {
                log::warn!("pcf: skipping unknown table kind 0x{:X}", record.kind);
                continue;
            };
            log::debug!(
                "pcf: {kind:?} table at {} (format 0x{:X})",
                record.offset,
                record.format
            );
            let mut cursor = table_cursor(data, record.offset)?;
            let format = TableFormat::new(cursor.read_u32(ByteOrder::LittleEndian)?);
            match kind {
                TableKind::Properties => font.properties = properties::parse(&mut cursor, format)?,
                TableKind::Accelerators => {
                    accelerator = Some(accelerator::parse(&mut cursor, format)?)
                }
                TableKind::BdfAccelerators => {
                    bdf_accelerator = Some(accelerator::parse(&mut cursor, format)?)
                }
                TableKind::Metrics => font.metrics = metrics::parse(&mut cursor, format)?,
                TableKind::InkMetrics => {
                    font.ink_metrics = Some(metrics::parse(&mut cursor, format)?)
                }
                TableKind::Bitmaps => font.bitmaps = bitmap::parse(&mut cursor, format)?,
                TableKind::BdfEncodings => font.encoding = encoding::parse(&mut cursor, format)?,
                TableKind::ScalableWidths => {
                    font.scalable_widths = Some(names::parse_scalable_widths(&mut cursor, format)?)
                }
                TableKind::GlyphNames => {
                    font.glyph_names = Some(names::parse_glyph_names(&mut cursor, format)?)
                }
            }
        }
        font.accelerator = bdf_accelerator
            .or(accelerator)
            .ok_or(Error::InconsistentTables("missing accelerator table"))?;
        font.validate()?;
        font.encoding.clamp_to_glyph_count(font.glyph_count());
        Ok(font)
    }

    fn validate(&self) -> Result<(), Error> {
        let glyph_count = self.bitmaps.len();
        if self.metrics.len() != glyph_count {
            return Err(Error::InconsistentTables(
                "metric count differs from bitmap count",
            ));
        }
        if matches!(&self.scalable_widths, Some(widths) if widths.len() != glyph_count) {
            return Err(Error::InconsistentTables(
                "scalable width count differs from bitmap count",
            ));
        }
        if matches!(&self.glyph_names, Some(names) if names.len() != glyph_count) {
            return Err(Error::InconsistentTables(
                "glyph name count differs from bitmap count",
            ));
        }
        if matches!(&self.ink_metrics, Some(ink) if ink.len() != glyph_count) {
            return Err(Error::InconsistentTables(
                "ink metric count differs from bitmap count",
            ));
        }
        Ok(())
    }

    pub fn glyph_count(&self) -> usize {
        self.metrics.len()
    }

    pub fn upem(&self) -> u16 {
        UPEM
    }

    pub fn properties(&self) -> &Properties<'a> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property<'a>> {
        self.properties.get(name)
    }

    pub fn accelerator(&self) -> &Accelerator {
        &self.accelerator
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn ink_metrics(&self) -> Option<&[Metric]> {
        self.ink_metrics.as_deref()
    }

    pub fn bitmaps(&self) -> &Bitmaps<'a> {
        &self.bitmaps
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn scalable_widths(&self) -> Option<&[u32]> {
        self.scalable_widths.as_deref()
    }

    pub fn glyph_names(&self) -> Option<&[Latin1String<'a>]> {
        self.glyph_names.as_deref()
    }

    pub fn glyph_name(&self, gid: GlyphId) -> Option<Latin1String<'a>> {
        self.glyph_names.as_ref()?.get(gid.to_u32() as usize).copied()
    }

    /// Returns the glyph the encoding assigns to `codepoint`, if any.
    pub fn nominal_glyph(&self, codepoint: u32) -> Option<GlyphId> {
        self.encoding.get(codepoint)
    }

    /// Iterates over all mapped `(codepoint, glyph)` pairs.
    pub fn charmap(&self) -> impl Iterator<Item = (u32, GlyphId)> + '_ {
        self.encoding.iter()
    }

    fn metric(&self, gid: GlyphId) -> Option<&Metric> {
        self.metrics.get(gid.to_u32() as usize)
    }

    pub fn horizontal_advance(&self, gid: GlyphId) -> f32 {
        self.metric(gid)
            .map(|metric| metric.character_width as f32)
            .unwrap_or_default()
    }

    /// The vertical advance, synthesized from the font ascent and descent.
    pub fn vertical_advance(&self, gid: GlyphId) -> f32 {
        self.metric(gid)
            .map(|metric| self.vertical_metrics(metric).advance as f32)
            .unwrap_or_default()
    }

    pub fn glyph_h_origin(&self, _gid: GlyphId) -> (i32, i32) {
        (0, 0)
    }

    pub fn glyph_v_origin(&self, gid: GlyphId) -> Option<(i32, i32)> {
        let metric = self.metric(gid)?;
        let vertical = self.vertical_metrics(metric);
        Some((
            (metric.left_side_bearing as i32).saturating_sub(vertical.bearing_x),
            (metric.character_ascent as i32).saturating_add(vertical.bearing_y),
        ))
    }

    /// The ink box of the glyph; the height is negative as y grows upwards.
    pub fn glyph_extents(&self, gid: GlyphId) -> Option<GlyphExtents> {
        let metric = self.metric(gid)?;
        Some(GlyphExtents {
            x_bearing: metric.left_side_bearing as f32,
            y_bearing: metric.character_ascent as f32,
            width: metric.width() as f32,
            height: -(metric.height() as f32),
        })
    }

    pub fn glyph_data(&self, gid: GlyphId) -> Option<GlyphBitmap<'a>> {
        let metric = self.metric(gid)?;
        let data = self.bitmaps.glyph_bytes(gid.to_u32() as usize)?;
        Some(GlyphBitmap {
            data,
            width: metric.width().max(0) as u32,
            height: metric.height().max(0) as u32,
            layout: self.bitmaps.format(),
            pixel_format: PixelFormat::BlackAndWhite,
        })
    }

    fn vertical_metrics(&self, metric: &Metric) -> VerticalMetrics {
        let mut advance = self
            .accelerator
            .font_ascent
            .saturating_add(self.accelerator.font_descent);
        let mut height = metric.height();
        if advance == 0 {
            let bearing_y = metric.character_ascent as i32;
            // compensate for glyphs entirely above or below the baseline
            if bearing_y < 0 {
                height = height.max(bearing_y);
            } else if bearing_y > 0 {
                height -= bearing_y;
            }
            advance = height * 12 / 10;
        }
        VerticalMetrics {
            bearing_x: metric.left_side_bearing as i32 - metric.character_width as i32 / 2,
            bearing_y: advance.saturating_sub(height) / 2,
            advance,
        }
    }

    /// Derives the style from the XLFD properties.
    pub fn style(&self) -> Style {
        let props = &self.properties;
        let first_char = |name: &str| {
            props
                .atom(name)
                .and_then(|atom| atom.as_bytes().first().copied())
                .map(|ch| ch.to_ascii_lowercase())
        };
        let dashed = |name: &str| {
            props
                .atom(name)
                .filter(|atom| !matches!(atom.as_bytes().first(), None | Some(b'N' | b'n')))
                .map(|atom| {
                    atom.chars()
                        .map(|ch| if ch == ' ' { '-' } else { ch })
                        .collect::<String>()
                })
        };
        let mut style = Style::default();
        let mut parts: Vec<String> = Vec::new();
        parts.extend(dashed("ADD_STYLE_NAME"));
        if first_char("WEIGHT_NAME") == Some(b'b') {
            style.is_bold = true;
            parts.push("Bold".into());
        }
        match first_char("SLANT") {
            Some(b'o') => {
                style.is_italic = true;
                parts.push("Oblique".into());
            }
            Some(b'i') => {
                style.is_italic = true;
                parts.push("Italic".into());
            }
            _ => {}
        }
        parts.extend(dashed("SETWIDTH_NAME"));
        style.style_name = if parts.is_empty() {
            "Regular".into()
        } else {
            parts.join(" ")
        };
        style.family_name = self.family_name().unwrap_or_default();
        style
    }

    /// The family name, prefixed by the foundry.
    ///
    /// Fonts at least as wide as they are tall get a " Wide" suffix.
    pub fn family_name(&self) -> Option<String> {
        let props = &self.properties;
        let family = props.atom("FAMILY_NAME")?;
        let mut name = String::new();
        if let Some(foundry) = props.atom("FOUNDRY").filter(|foundry| !foundry.is_empty()) {
            name.extend(foundry.chars());
            name.push(' ');
        }
        name.extend(family.chars());
        if let (Some(point_size), Some(average_width)) = (
            props.integer("POINT_SIZE"),
            props.integer("AVERAGE_WIDTH"),
        ) {
            if average_width >= point_size {
                name.push_str(" Wide");
            }
        }
        Some(name)
    }

    /// Returns `true` if codepoints in the encoding are Unicode scalar values.
    pub fn is_cmap_unicode(&self) -> bool {
        let (Some(registry), Some(encoding)) = (
            self.properties.atom("CHARSET_REGISTRY"),
            self.properties.atom("CHARSET_ENCODING"),
        ) else {
            return false;
        };
        let registry = registry.as_bytes();
        registry.eq_ignore_ascii_case(b"iso10646")
            || (registry.eq_ignore_ascii_case(b"iso8859") && encoding == "1")
            || (registry.eq_ignore_ascii_case(b"iso646.1991") && encoding == "IRV")
    }

    /// The width class from `RELATIVE_SETWIDTH`, in the OS/2 range 1..=9.
    pub fn stretch(&self) -> Option<u16> {
        let value = self.properties.integer("RELATIVE_SETWIDTH")?.saturating_add(5) / 10;
        (1..=9).contains(&value).then_some(value as u16)
    }

    /// Computes the strike size the way FreeType's PCF driver does.
    pub fn bitmap_size(&self) -> BitmapSize {
        let props = &self.properties;
        let clamp = |value: i64| value.unsigned_abs().min(0xFFFF) as u16;
        let mul_div = |a: u16, b: u16, c: u16| (a as u32 * b as u32 / c as u32) as u16;
        let mut size = BitmapSize {
            height: clamp(
                self.accelerator.font_ascent as i64 + self.accelerator.font_descent as i64,
            ),
            ..Default::default()
        };
        size.width = match props.integer("AVERAGE_WIDTH") {
            Some(width) => clamp((width as i64 + 5) / 10),
            None => mul_div(size.height, 2, 3),
        };
        // convert from 722.7 decipoints to 72 points per inch
        let point_size = props
            .integer("POINT_SIZE")
            .map(|ps| clamp((ps as i64).abs() * 7200 / 72270))
            .unwrap_or_default();
        size.size = point_size;
        let int_prop = |name: &str| {
            props
                .integer(name)
                .map(|value| clamp(value as i64))
                .unwrap_or_default()
        };
        size.y_ppem = int_prop("PIXEL_SIZE");
        let resolution_x = int_prop("RESOLUTION_X");
        let resolution_y = int_prop("RESOLUTION_Y");
        if size.y_ppem == 0 {
            size.y_ppem = point_size;
            if resolution_y != 0 {
                size.y_ppem = mul_div(size.y_ppem, resolution_y, 72);
            }
        }
        size.x_ppem = if resolution_x != 0 && resolution_y != 0 {
            mul_div(size.y_ppem, resolution_x, resolution_y)
        } else {
            size.y_ppem
        };
        size
    }
}

struct VerticalMetrics {
    bearing_x: i32,
    bearing_y: i32,
    advance: i32,
}

fn table_cursor(data: FontData, offset: u32) -> Result<Cursor, Error> {
    let mut cursor = data.cursor();
    cursor.seek(offset as usize)?;
    Ok(cursor)
}

/// Gunzips the input if it starts with the gzip magic number.
///
/// PCF fonts are commonly distributed as `.pcf.gz`.
#[cfg(feature = "gzip")]
pub fn decompress(data: &[u8]) -> std::io::Result<alloc::borrow::Cow<'_, [u8]>> {
    use std::io::Read;

    if !data.starts_with(&[0x1f, 0x8b]) {
        return Ok(alloc::borrow::Cow::Borrowed(data));
    }
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(alloc::borrow::Cow::Owned(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(records: &[TableRecord]) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&(records.len() as u32).to_le_bytes());
        for record in records {
            for field in [record.kind, record.format, record.size, record.offset] {
                bytes.extend_from_slice(&field.to_le_bytes());
            }
        }
        bytes
    }

    #[test]
    fn bad_magic() {
        assert_eq!(PcfFont::new(b"\x01fcq\0\0\0\0"), Err(Error::BadMagic));
        assert_eq!(PcfFont::new(b"\x01f"), Err(Error::BadMagic));
    }

    #[test]
    fn table_limit() {
        let unknown = |i: u32| TableRecord {
            kind: 0x1000,
            format: 0,
            size: 0,
            offset: 8 + 16 * 21 + i,
        };
        let records = (0..21).map(unknown).collect::<Vec<_>>();
        let bytes = header(&records);
        assert_eq!(PcfFont::new(&bytes), Err(Error::TooManyTables(21)));
        // twenty unknown tables parse, then fail for lack of an accelerator
        let mut bytes = header(&records[..20]);
        bytes.resize(8 + 16 * 21 + 21, 0);
        assert_eq!(table_directory(FontData::new(&bytes)).unwrap().len(), 20);
        assert_eq!(
            PcfFont::new(&bytes),
            Err(Error::InconsistentTables("missing accelerator table"))
        );
    }

    #[test]
    fn offset_inside_directory() {
        let record = TableRecord {
            kind: TableKind::Properties as u32,
            format: 0,
            size: 0,
            offset: 20,
        };
        let bytes = header(&[record]);
        assert_eq!(
            table_directory(FontData::new(&bytes)),
            Err(Error::Read(ReadError::InvalidOffset(20)))
        );
    }

    #[test]
    fn format_word() {
        let format = TableFormat::new(0x10E);
        assert_eq!(format.byte_order(), ByteOrder::BigEndian);
        assert_eq!(format.kind_bits(), 0x100);
        assert!(format.is_compressed_metrics());
        assert_eq!(TableFormat::new(0).byte_order(), ByteOrder::LittleEndian);
    }
}
