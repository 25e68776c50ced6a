//! Parses each fixture, writes it back out through the test data builders
//! and checks that the rewritten font reads the same.

use font_test_data::{
    bytes::Endian,
    cff::{self as cff_data, CffBuilder, Program},
    pcf::{self as pcf_data, PcfBuilder, Prop},
};
use legacy_fonts::{
    parse_cff, parse_pcf,
    tables::{
        cff::CffFont,
        pcf::{Metric, PcfFont},
        postscript::{CommandSink, Encoding, StringId},
    },
    types::{Fixed, GlyphId},
};
use pretty_assertions::assert_eq;

fn builder_metric(metric: &Metric) -> pcf_data::Metric {
    [
        metric.left_side_bearing,
        metric.right_side_bearing,
        metric.character_width,
        metric.character_ascent,
        metric.character_descent,
    ]
}

/// Writes every table of the font with the builder.
///
/// Metrics are always uncompressed. The accelerator carries ink bounds
/// when the font has ink metrics.
fn rewrite_pcf(font: &PcfFont) -> Vec<u8> {
    let layout = font.bitmaps().format();
    let endian = if layout.is_msb_byte_first() {
        Endian::Big
    } else {
        Endian::Little
    };
    let owned_props = font
        .properties()
        .iter()
        .map(|(name, value)| {
            let atom = value.as_atom().map(|atom| atom.to_string());
            (name.to_string(), atom, value.as_integer().unwrap_or_default())
        })
        .collect::<Vec<_>>();
    let props = owned_props
        .iter()
        .map(|(name, atom, integer)| {
            let value = match atom {
                Some(atom) => Prop::Atom(atom),
                None => Prop::Int(*integer),
            };
            (name.as_str(), value)
        })
        .collect::<Vec<_>>();
    let accel = font.accelerator();
    let flags = [
        accel.no_overlap,
        accel.constant_metrics,
        accel.terminal_font,
        accel.constant_width,
        accel.ink_inside,
        accel.ink_metrics,
        accel.draw_right_to_left,
    ];
    let metrics = font.metrics().iter().map(builder_metric).collect::<Vec<_>>();
    let glyphs = (0..font.glyph_count())
        .map(|i| font.bitmaps().glyph_bytes(i).unwrap_or_default().to_vec())
        .collect::<Vec<_>>();
    let encoding = font.encoding();
    let mut builder = PcfBuilder::new(endian)
        .properties(&props)
        .accelerator(
            font.ink_metrics().is_some(),
            flags,
            accel.font_ascent,
            accel.font_descent,
            builder_metric(&accel.min_bounds),
            builder_metric(&accel.max_bounds),
        )
        .metrics(&metrics, false)
        .bitmaps(&glyphs, layout.glyph_pad().trailing_zeros())
        .encoding(
            (encoding.min_char().into(), encoding.max_char().into()),
            (encoding.min_byte().into(), encoding.max_byte().into()),
            encoding.default_char().to_u32() as u16,
            encoding.values(),
        );
    if let Some(ink) = font.ink_metrics() {
        let ink = ink.iter().map(builder_metric).collect::<Vec<_>>();
        builder = builder.ink_metrics(&ink, false);
    }
    if let Some(widths) = font.scalable_widths() {
        builder = builder.scalable_widths(widths);
    }
    if let Some(names) = font.glyph_names() {
        let names = names.iter().map(ToString::to_string).collect::<Vec<_>>();
        let names = names.iter().map(String::as_str).collect::<Vec<_>>();
        builder = builder.glyph_names(&names);
    }
    builder.build()
}

fn assert_same_pcf(expected: &PcfFont, actual: &PcfFont) {
    assert_eq!(expected.glyph_count(), actual.glyph_count());
    assert_eq!(
        expected.charmap().collect::<Vec<_>>(),
        actual.charmap().collect::<Vec<_>>()
    );
    assert_eq!(expected.encoding().default_char(), actual.encoding().default_char());
    assert_eq!(expected.properties(), actual.properties());
    assert_eq!(expected.accelerator(), actual.accelerator());
    assert_eq!(expected.style(), actual.style());
    assert_eq!(expected.bitmap_size(), actual.bitmap_size());
    assert_eq!(expected.scalable_widths(), actual.scalable_widths());
    let glyphs = |font: &PcfFont| {
        (0..font.glyph_count() as u32)
            .map(GlyphId::new)
            .map(|gid| {
                (
                    font.horizontal_advance(gid),
                    font.vertical_advance(gid),
                    font.glyph_extents(gid),
                    font.glyph_name(gid).map(|name| name.to_string()),
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(glyphs(expected), glyphs(actual));
    let bitmaps = |font: &PcfFont| {
        (0..font.glyph_count() as u32)
            .map(|gid| font.glyph_data(GlyphId::new(gid)).map(|bitmap| bitmap.data.to_vec()))
            .collect::<Vec<_>>()
    };
    assert_eq!(bitmaps(expected), bitmaps(actual));
}

#[test]
fn pcf_fixtures_rewrite() {
    let _ = env_logger::builder().is_test(true).try_init();
    for data in [
        pcf_data::misc_fixed_4x6(),
        pcf_data::times_24(),
        pcf_data::hangul_16(),
    ] {
        let font = parse_pcf(&data).unwrap();
        let rewritten = rewrite_pcf(&font);
        let reparsed = parse_pcf(&rewritten).unwrap();
        assert_same_pcf(&font, &reparsed);
        // a second pass writes the same bytes
        assert_eq!(rewrite_pcf(&reparsed), rewritten);
    }
}

/// Writes an outline back out as `rmoveto`, `rlineto` and `rrcurveto`
/// operators with 16.16 operands.
///
/// Subroutine calls and hints are gone from the result. Contours are closed
/// by the following move or `endchar`.
#[derive(Default)]
struct CharstringWriter {
    program: Program,
    x: Fixed,
    y: Fixed,
}

impl CharstringWriter {
    fn push(&mut self, points: &[(Fixed, Fixed)], op: u8) {
        let mut program = std::mem::take(&mut self.program);
        for &(x, y) in points {
            program = program
                .fixed((x - self.x).to_f64())
                .fixed((y - self.y).to_f64());
            self.x = x;
            self.y = y;
        }
        self.program = program.op(op);
    }

    /// Prefixes the advance, which is the nominal width of 0 plus the
    /// width operand.
    fn finish(self, advance: Fixed) -> Vec<u8> {
        Program::new()
            .fixed(advance.to_f64())
            .raw(&self.program.build())
            .op(14)
            .build()
    }
}

impl CommandSink for CharstringWriter {
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.push(&[(x, y)], 21);
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.push(&[(x, y)], 5);
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.push(&[(cx0, cy0), (cx1, cy1), (x, y)], 8);
    }

    fn close(&mut self) {}
}

/// DICT numbers are written as integers, which covers every fixture.
fn dict_int(value: Fixed) -> i32 {
    assert_eq!(value.fract(), Fixed::ZERO, "fractional DICT value {value}");
    value.to_i32()
}

/// Rebuilds the font with flattened charstrings, an explicit charset and,
/// for custom encodings, a format 0 encoding.
fn rewrite_cff(font: &CffFont) -> Vec<u8> {
    let mut builder = CffBuilder::new(&font.name().to_string());
    // custom strings keep their ids when added in order
    let mut sid = 391;
    while let Ok(string) = font.string(StringId::new(sid)) {
        builder = builder.string(&string.to_string());
        sid += 1;
    }
    let top = font.top_dict();
    let mut dict = Program::new();
    for (sid, op) in [
        (top.version, 0),
        (top.notice, 1),
        (top.full_name, 2),
        (top.family_name, 3),
        (top.weight, 4),
    ] {
        if sid != StringId::UNSET {
            dict = dict.int(sid.to_u16().into()).op(op);
        }
    }
    for (sid, op) in [(top.copyright, 0), (top.cid_font_name, 38)] {
        if sid != StringId::UNSET {
            dict = dict.int(sid.to_u16().into()).escaped(op);
        }
    }
    dict = dict
        .int(top.is_fixed_pitch as i32)
        .escaped(1)
        .int(dict_int(top.italic_angle))
        .escaped(2)
        .int(dict_int(top.underline_position))
        .escaped(3)
        .int(dict_int(top.underline_thickness))
        .escaped(4);
    if let Some(bbox) = top.font_bbox {
        dict = dict
            .int(dict_int(bbox.x_min))
            .int(dict_int(bbox.y_min))
            .int(dict_int(bbox.x_max))
            .int(dict_int(bbox.y_max))
            .op(5);
    }
    builder = builder.top_dict(dict);
    let mut charset = vec![0];
    for (_, sid) in font.charset().iter().skip(1) {
        charset.extend(sid.to_u16().to_be_bytes());
    }
    builder = builder.charset(charset);
    if matches!(font.encoding(), Encoding::Custom(_)) {
        let codes = (1..font.glyph_count() as u32)
            .map_while(|gid| {
                let name = font.glyph_name(GlyphId::new(gid))?;
                (0..=255u8).find(|&code| font.encoding().glyph_name(code) == Some(name))
            })
            .collect::<Vec<_>>();
        let mut encoding = vec![0, codes.len() as u8];
        encoding.extend(codes);
        builder = builder.encoding(encoding);
    }
    for gid in 0..font.glyph_count() as u32 {
        let mut writer = CharstringWriter::default();
        let advance = font.draw(GlyphId::new(gid), &mut writer).unwrap();
        builder = builder.glyph(writer.finish(advance));
    }
    if font.is_cid() {
        // the registry and ordering are not kept by the parser
        builder = builder.ros(0, 0, 0);
        for _ in 0..font.font_dict_count() {
            builder = builder.font_dict(Program::new(), vec![]);
        }
        let mut fd_select = vec![0];
        for gid in 0..font.glyph_count() as u32 {
            fd_select.push(font.fd_index(GlyphId::new(gid)).unwrap() as u8);
        }
        builder = builder.fd_select(fd_select);
    }
    builder.build()
}

fn assert_same_cff(expected: &CffFont, actual: &CffFont) {
    assert_eq!(expected.name(), actual.name());
    assert_eq!(expected.glyph_count(), actual.glyph_count());
    assert_eq!(expected.postscript_info(), actual.postscript_info());
    assert_eq!(expected.style(), actual.style());
    assert_eq!(expected.is_cid(), actual.is_cid());
    assert_eq!(expected.cid_font_name(), actual.cid_font_name());
    assert_eq!(expected.font_dict_count(), actual.font_dict_count());
    assert_eq!(expected.charset(), actual.charset());
    let codes = |font: &CffFont| {
        (0..=255u8)
            .map(|code| font.encoding().glyph_name(code).map(|name| name.to_string()))
            .collect::<Vec<_>>()
    };
    assert_eq!(codes(expected), codes(actual));
    let glyphs = |font: &CffFont| {
        (0..font.glyph_count() as u32)
            .map(GlyphId::new)
            .map(|gid| {
                (
                    font.load_glyph(gid).unwrap(),
                    font.glyph_name(gid).map(|name| name.to_string()),
                    font.fd_index(gid),
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(glyphs(expected), glyphs(actual));
}

#[test]
fn cff_fixtures_rewrite() {
    let _ = env_logger::builder().is_test(true).try_init();
    for data in [cff_data::cmr17(), cff_data::cid_font()] {
        let font = &parse_cff(&data).unwrap()[0];
        let rewritten = rewrite_cff(font);
        let reparsed = &parse_cff(&rewritten).unwrap()[0];
        assert_same_cff(font, reparsed);
        // flattened charstrings are stable
        assert_eq!(rewrite_cff(reparsed), rewritten);
    }
}
