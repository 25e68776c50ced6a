//! Builders and fixtures for PCF bitmap fonts.

use crate::bytes::{ByteBuffer, Endian};

const PROPERTIES: u32 = 1 << 0;
const ACCELERATORS: u32 = 1 << 1;
const METRICS: u32 = 1 << 2;
const BITMAPS: u32 = 1 << 3;
const INK_METRICS: u32 = 1 << 4;
const BDF_ENCODINGS: u32 = 1 << 5;
const SWIDTHS: u32 = 1 << 6;
const GLYPH_NAMES: u32 = 1 << 7;
const BDF_ACCELERATORS: u32 = 1 << 8;

/// Marks a cell in an encoding table that has no glyph.
pub const NO_GLYPH: u16 = 0xFFFF;

/// The value of a font property.
#[derive(Clone, Copy, Debug)]
pub enum Prop<'a> {
    Atom(&'a str),
    Int(i32),
}

/// Glyph metrics as `[lsb, rsb, width, ascent, descent]`.
pub type Metric = [i16; 5];

/// Writes a PCF file from individual tables.
///
/// All tables share a byte order and store bitmaps with the most
/// significant bit first. The table of contents is written in the order
/// tables were added.
#[derive(Clone, Debug)]
pub struct PcfBuilder {
    endian: Endian,
    tables: Vec<(u32, u32, Vec<u8>)>,
}

impl PcfBuilder {
    pub fn new(endian: Endian) -> Self {
        Self {
            endian,
            tables: Vec::new(),
        }
    }

    fn buffer(&self) -> ByteBuffer {
        ByteBuffer::new(self.endian)
    }

    /// Format word bits for byte and bit order.
    fn order_bits(&self) -> u32 {
        match self.endian {
            Endian::Big => 0x4 | 0x8,
            Endian::Little => 0x8,
        }
    }

    /// Adds a table with an explicit format word.
    pub fn raw_table(mut self, kind: u32, format: u32, payload: Vec<u8>) -> Self {
        self.tables.push((kind, format, payload));
        self
    }

    pub fn properties(self, props: &[(&str, Prop)]) -> Self {
        let mut strings = Vec::new();
        let mut string_offset = |value: &str| {
            let offset = strings.len() as u32;
            strings.extend_from_slice(value.as_bytes());
            strings.push(0);
            offset
        };
        let mut buf = self.buffer().push(props.len() as u32);
        for (name, value) in props {
            buf = buf.push(string_offset(name));
            buf = match value {
                Prop::Atom(atom) => buf.push(1u8).push(string_offset(atom)),
                Prop::Int(value) => buf.push(0u8).push(*value),
            };
        }
        let buf = buf
            .align(4)
            .push(strings.len() as u32)
            .extend(strings.iter().copied());
        let format = self.order_bits();
        self.raw_table(PROPERTIES, format, buf.into_vec())
    }

    /// Adds an accelerator table.
    ///
    /// A BDF accelerator also carries ink bounds, which are set to the
    /// regular bounds.
    pub fn accelerator(
        self,
        bdf: bool,
        flags: [bool; 7],
        ascent: i32,
        descent: i32,
        min_bounds: Metric,
        max_bounds: Metric,
    ) -> Self {
        let mut buf = self
            .buffer()
            .extend(flags.iter().map(|flag| *flag as u8))
            .push(0u8)
            .push(ascent)
            .push(descent)
            .push(0i32);
        let bounds: &[Metric] = if bdf {
            &[min_bounds, max_bounds, min_bounds, max_bounds]
        } else {
            &[min_bounds, max_bounds]
        };
        for metric in bounds {
            buf = buf.extend(metric.iter().copied()).push(0u16);
        }
        let (kind, format) = if bdf {
            (BDF_ACCELERATORS, 0x100)
        } else {
            (ACCELERATORS, 0)
        };
        let format = format | self.order_bits();
        self.raw_table(kind, format, buf.into_vec())
    }

    fn metric_table(&self, metrics: &[Metric], compressed: bool) -> (u32, Vec<u8>) {
        if compressed {
            let mut buf = self.buffer().push(metrics.len() as u16);
            for metric in metrics {
                buf = buf.extend(metric.iter().map(|value| (value + 0x80) as u8));
            }
            (0x100 | self.order_bits(), buf.into_vec())
        } else {
            let mut buf = self.buffer().push(metrics.len() as u32);
            for metric in metrics {
                buf = buf.extend(metric.iter().copied()).push(0u16);
            }
            (self.order_bits(), buf.into_vec())
        }
    }

    pub fn metrics(self, metrics: &[Metric], compressed: bool) -> Self {
        let (format, payload) = self.metric_table(metrics, compressed);
        self.raw_table(METRICS, format, payload)
    }

    pub fn ink_metrics(self, metrics: &[Metric], compressed: bool) -> Self {
        let (format, payload) = self.metric_table(metrics, compressed);
        self.raw_table(INK_METRICS, format, payload)
    }

    /// Adds glyph bitmaps whose rows are padded to `1 << pad` bytes.
    pub fn bitmaps(self, glyphs: &[Vec<u8>], pad: u32) -> Self {
        let mut buf = self.buffer().push(glyphs.len() as u32);
        let mut offset = 0u32;
        for glyph in glyphs {
            buf = buf.push(offset);
            offset += glyph.len() as u32;
        }
        for i in 0..4 {
            buf = buf.push(if i == pad { offset } else { 0 });
        }
        for glyph in glyphs {
            buf = buf.extend(glyph.iter().copied());
        }
        let format = pad | self.order_bits();
        self.raw_table(BITMAPS, format, buf.into_vec())
    }

    /// Adds an encoding covering `chars` columns in each of `rows`.
    pub fn encoding(
        self,
        chars: (u16, u16),
        rows: (u16, u16),
        default_char: u16,
        values: &[u16],
    ) -> Self {
        let buf = self
            .buffer()
            .push(chars.0)
            .push(chars.1)
            .push(rows.0)
            .push(rows.1)
            .push(default_char)
            .extend(values.iter().copied());
        let format = self.order_bits();
        self.raw_table(BDF_ENCODINGS, format, buf.into_vec())
    }

    pub fn scalable_widths(self, widths: &[u32]) -> Self {
        let buf = self
            .buffer()
            .push(widths.len() as u32)
            .extend(widths.iter().copied());
        let format = self.order_bits();
        self.raw_table(SWIDTHS, format, buf.into_vec())
    }

    pub fn glyph_names(self, names: &[&str]) -> Self {
        let mut strings = Vec::new();
        let mut buf = self.buffer().push(names.len() as u32);
        for name in names {
            buf = buf.push(strings.len() as u32);
            strings.extend_from_slice(name.as_bytes());
            strings.push(0);
        }
        let buf = buf
            .push(strings.len() as u32)
            .extend(strings.iter().copied());
        let format = self.order_bits();
        self.raw_table(GLYPH_NAMES, format, buf.into_vec())
    }

    pub fn build(&self) -> Vec<u8> {
        let mut offset = 8 + 16 * self.tables.len() as u32;
        let mut toc = ByteBuffer::le()
            .extend(*b"\x01fcp")
            .push(self.tables.len() as u32);
        let mut body = ByteBuffer::le();
        for (kind, format, payload) in &self.tables {
            // format word + payload, padded to a 4 byte boundary
            let size = 4 + payload.len() as u32;
            toc = toc.push(*kind).push(*format).push(size).push(offset);
            body = body.push(*format).extend(payload.iter().copied()).align(4);
            offset = 8 + 16 * self.tables.len() as u32 + body.len() as u32;
        }
        let mut data = toc.into_vec();
        data.extend(body.into_vec());
        data
    }
}

/// A `width` × `height` bitmap with a one pixel frame, most significant bit
/// first, with rows padded to `1 << pad` bytes.
pub fn frame_bitmap(width: usize, height: usize, pad: u32) -> Vec<u8> {
    let pad = 1usize << pad;
    let row_len = width.div_ceil(8).div_ceil(pad) * pad;
    let mut data = vec![0u8; row_len * height];
    let mut set = |x: usize, y: usize| data[y * row_len + x / 8] |= 0x80 >> (x % 8);
    for y in 0..height {
        for x in 0..width {
            if y == 0 || y == height - 1 || x == 0 || x == width - 1 {
                set(x, y);
            }
        }
    }
    data
}

/// A 4x6 terminal font in the style of the X11 misc-fixed fonts.
///
/// Big endian with compressed metrics. Maps space, `A` and `B` to glyphs
/// 0-2 in a single byte encoding.
pub fn misc_fixed_4x6() -> Vec<u8> {
    let cell: Metric = [0, 4, 4, 5, 1];
    let blank = vec![0u8; 6];
    // rows of 'A' and 'B', top to bottom
    let a = vec![0x40, 0xA0, 0xE0, 0xA0, 0xA0, 0x00];
    let b = vec![0xC0, 0xA0, 0xC0, 0xA0, 0xC0, 0x00];
    let mut values = vec![NO_GLYPH; 0x42 - 0x20 + 1];
    values[0] = 0;
    values[0x41 - 0x20] = 1;
    values[0x42 - 0x20] = 2;
    PcfBuilder::new(Endian::Big)
        .properties(&[
            ("FOUNDRY", Prop::Atom("Misc")),
            ("FAMILY_NAME", Prop::Atom("Fixed")),
            ("WEIGHT_NAME", Prop::Atom("Medium")),
            ("SLANT", Prop::Atom("R")),
            ("SETWIDTH_NAME", Prop::Atom("Normal")),
            ("ADD_STYLE_NAME", Prop::Atom("")),
            ("PIXEL_SIZE", Prop::Int(6)),
            ("POINT_SIZE", Prop::Int(60)),
            ("RESOLUTION_X", Prop::Int(75)),
            ("RESOLUTION_Y", Prop::Int(75)),
            ("SPACING", Prop::Atom("C")),
            ("AVERAGE_WIDTH", Prop::Int(40)),
            ("CHARSET_REGISTRY", Prop::Atom("ISO10646")),
            ("CHARSET_ENCODING", Prop::Atom("1")),
            ("DEFAULT_CHAR", Prop::Int(0x20)),
        ])
        .accelerator(
            false,
            [true, true, true, true, true, false, false],
            5,
            1,
            cell,
            cell,
        )
        .metrics(&[cell, cell, cell], true)
        .bitmaps(&[blank, a, b], 0)
        .encoding((0x20, 0x42), (0, 0), 0, &values)
        .build()
}

/// A proportional font in the style of the X11 Adobe Times fonts.
///
/// Little endian, with uncompressed metrics and a BDF accelerator, ink
/// metrics, scalable widths and glyph names. Glyphs are `space`, `g` and
/// `A`, with `g` descending below the baseline.
pub fn times_24() -> Vec<u8> {
    let space: Metric = [0, 0, 6, 0, 0];
    let g: Metric = [1, 11, 12, 11, 6];
    let a: Metric = [0, 17, 17, 17, 0];
    let pad = 2;
    let mut values = vec![NO_GLYPH; 0x67 - 0x20 + 1];
    values[0] = 0;
    values[0x41 - 0x20] = 2;
    values[0x67 - 0x20] = 1;
    PcfBuilder::new(Endian::Little)
        .properties(&[
            ("FOUNDRY", Prop::Atom("Adobe")),
            ("FAMILY_NAME", Prop::Atom("Times")),
            ("WEIGHT_NAME", Prop::Atom("Medium")),
            ("SLANT", Prop::Atom("R")),
            ("SETWIDTH_NAME", Prop::Atom("Normal")),
            ("PIXEL_SIZE", Prop::Int(24)),
            ("POINT_SIZE", Prop::Int(240)),
            ("RESOLUTION_X", Prop::Int(75)),
            ("RESOLUTION_Y", Prop::Int(75)),
            ("SPACING", Prop::Atom("P")),
            ("AVERAGE_WIDTH", Prop::Int(124)),
            ("CHARSET_REGISTRY", Prop::Atom("ISO8859")),
            ("CHARSET_ENCODING", Prop::Atom("1")),
            ("COPYRIGHT", Prop::Atom("Copyright (c) 1984, 1987 Adobe Systems")),
        ])
        .accelerator(
            true,
            [false, false, false, false, false, false, false],
            22,
            6,
            [0, 0, 6, 0, 0],
            [1, 17, 17, 17, 6],
        )
        .metrics(&[space, g, a], false)
        .ink_metrics(&[space, g, a], false)
        .bitmaps(
            &[
                Vec::new(),
                frame_bitmap(10, 17, pad),
                frame_bitmap(17, 17, pad),
            ],
            pad,
        )
        .encoding((0x20, 0x67), (0, 0), 0, &values)
        .scalable_widths(&[250, 500, 722])
        .glyph_names(&["space", "g", "A"])
        .build()
}

/// A 16 pixel Korean font with a two byte KS C 5601 encoding.
///
/// Rows and columns both span `0xA1..=0xA2`; `0xA2A1` is unmapped.
pub fn hangul_16() -> Vec<u8> {
    let cell: Metric = [0, 16, 16, 14, 2];
    let pad = 1;
    let glyphs = vec![frame_bitmap(16, 16, pad); 4];
    PcfBuilder::new(Endian::Big)
        .properties(&[
            ("FOUNDRY", Prop::Atom("Daewoo")),
            ("FAMILY_NAME", Prop::Atom("Gothic")),
            ("WEIGHT_NAME", Prop::Atom("Medium")),
            ("SLANT", Prop::Atom("R")),
            ("PIXEL_SIZE", Prop::Int(16)),
            ("POINT_SIZE", Prop::Int(160)),
            ("RESOLUTION_X", Prop::Int(75)),
            ("RESOLUTION_Y", Prop::Int(75)),
            ("AVERAGE_WIDTH", Prop::Int(160)),
            ("CHARSET_REGISTRY", Prop::Atom("KSC5601.1987")),
            ("CHARSET_ENCODING", Prop::Atom("0")),
        ])
        .accelerator(
            false,
            [true, true, false, true, true, false, false],
            14,
            2,
            cell,
            cell,
        )
        .metrics(&[cell; 4], true)
        .bitmaps(&glyphs, pad)
        .encoding((0xA1, 0xA2), (0xA1, 0xA2), 0, &[1, 2, NO_GLYPH, 3])
        .build()
}
