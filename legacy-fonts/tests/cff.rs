use font_test_data::cff::{self as test_data, CffBuilder, Program};
use legacy_fonts::{
    parse_cff,
    tables::{
        cff::GlyphMetrics,
        postscript::{
            BoundsSink, CommandSink, Context, Error, Flow, Handler, Index, Interpreter, Opcode,
            StringId,
        },
    },
    types::{BoundingBox, Fixed, GlyphId},
};
use pretty_assertions::assert_eq;

#[derive(Clone, Debug, PartialEq)]
enum Command {
    MoveTo(i32, i32),
    LineTo(i32, i32),
    CurveTo(i32, i32, i32, i32, i32, i32),
    Close,
}

#[derive(Default)]
struct Recorder(Vec<Command>);

impl CommandSink for Recorder {
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.0.push(Command::MoveTo(x.to_i32(), y.to_i32()));
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.0.push(Command::LineTo(x.to_i32(), y.to_i32()));
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.0.push(Command::CurveTo(
            cx0.to_i32(),
            cy0.to_i32(),
            cx1.to_i32(),
            cy1.to_i32(),
            x.to_i32(),
            y.to_i32(),
        ));
    }

    fn close(&mut self) {
        self.0.push(Command::Close);
    }
}

fn bounds(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Option<BoundingBox<Fixed>> {
    Some(BoundingBox {
        x_min: Fixed::from_i32(x_min),
        y_min: Fixed::from_i32(y_min),
        x_max: Fixed::from_i32(x_max),
        y_max: Fixed::from_i32(y_max),
    })
}

#[test]
fn cmr17_metrics() {
    let _ = env_logger::builder().is_test(true).try_init();
    let data = test_data::cmr17();
    let font = &parse_cff(&data).unwrap()[0];
    let metrics = (0..font.glyph_count() as u32)
        .map(|gid| font.load_glyph(GlyphId::new(gid)).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        metrics,
        [
            GlyphMetrics {
                bounds: None,
                advance: Fixed::from_i32(500),
            },
            GlyphMetrics {
                bounds: bounds(20, 0, 630, 683),
                advance: Fixed::from_i32(750),
            },
            GlyphMetrics {
                bounds: bounds(50, 0, 550, 700),
                advance: Fixed::from_i32(766),
            },
            GlyphMetrics {
                bounds: bounds(20, 0, 320, 700),
                advance: Fixed::from_i32(500),
            },
        ]
    );
}

#[test]
fn cmr17_outlines() {
    let data = test_data::cmr17();
    let font = &parse_cff(&data).unwrap()[0];
    let mut recorder = Recorder::default();
    let advance = font.draw(GlyphId::new(2), &mut recorder).unwrap();
    assert_eq!(advance, Fixed::from_i32(766));
    assert_eq!(
        recorder.0,
        [
            Command::MoveTo(50, 0),
            Command::LineTo(150, 700),
            Command::LineTo(350, 700),
            Command::CurveTo(350, 600, 450, 600, 550, 500),
            Command::Close,
        ]
    );
}

#[test]
fn cmr17_names() {
    let data = test_data::cmr17();
    let font = &parse_cff(&data).unwrap()[0];
    let names = (0..font.glyph_count() as u32)
        .map(|gid| font.glyph_name(GlyphId::new(gid)).unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, [".notdef", "A", "B", "Aring.alt"]);
    assert_eq!(font.encoding().glyph_name(0xC5).unwrap(), "Aring.alt");
    assert_eq!(font.encoding().glyph_name(b'Z'), None);
    let notice = "Copyright (c) 1997 American Mathematical Society.";
    assert_eq!(font.string(StringId::new(394)).unwrap(), notice);
    assert_eq!(font.postscript_info().notice, notice);
    let style = font.style();
    assert_eq!(style.family_name, "CMR17");
    assert_eq!(style.style_name, "Regular");
}

#[test]
fn cid_widths_and_outlines() {
    let data = test_data::cid_font();
    let font = &parse_cff(&data).unwrap()[0];
    assert_eq!(font.glyph_count(), 6);
    assert_eq!(font.font_dict_count(), 2);
    let fds = (0..6)
        .map(|gid| font.fd_index(GlyphId::new(gid)).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(fds, [0, 0, 0, 0, 1, 1]);
    assert_eq!(font.fd_index(GlyphId::new(6)), None);
    let square = font.load_glyph(GlyphId::new(1)).unwrap();
    assert_eq!(square.advance, Fixed::from_i32(1000));
    assert_eq!(square.bounds, bounds(100, 100, 900, 900));
    // glyph 4 calls a subroutine local to the second font DICT
    let mut recorder = Recorder::default();
    let advance = font.draw(GlyphId::new(4), &mut recorder).unwrap();
    assert_eq!(advance, Fixed::from_i32(500));
    assert_eq!(
        recorder.0,
        [
            Command::MoveTo(50, 0),
            Command::LineTo(50, 500),
            Command::Close
        ]
    );
}

#[test]
fn font_without_custom_strings() {
    let data = CffBuilder::new("Single")
        .glyph(Program::new().op(14).build())
        .build();
    let fonts = parse_cff(&data).unwrap();
    assert_eq!(fonts.len(), 1);
    assert_eq!(fonts[0].name(), "Single");
    assert_eq!(
        fonts[0].string(StringId::new(391)),
        Err(Error::InvalidStringId(391))
    );
}

#[test]
fn font_sets_hold_one_font() {
    // header, then empty Name, Top DICT, String and Global Subr INDEXes
    let empty = [1, 0, 4, 1, 0, 0, 0, 0, 0, 0, 0, 0];
    assert_eq!(parse_cff(&empty).err(), Some(Error::InvalidFontCount(0)));
    let single = CffBuilder::new("Single")
        .glyph(Program::new().op(14).build())
        .build();
    assert_eq!(parse_cff(&single).unwrap().len(), 1);
    // the same font listed twice, sharing a Top DICT
    let top_dict = Program::new().int(0).op(17).build();
    let mut pair = vec![1, 0, 4, 1];
    pair.extend(test_data::make_index(&[&b"First"[..], &b"Second"[..]], 1));
    pair.extend(test_data::make_index(&[&top_dict, &top_dict], 1));
    pair.extend(test_data::make_index::<&[u8]>(&[], 1));
    pair.extend(test_data::make_index::<&[u8]>(&[], 1));
    assert_eq!(parse_cff(&pair).err(), Some(Error::InvalidFontCount(2)));
}

#[test]
fn bounds_sink_is_public() {
    let data = test_data::cmr17();
    let font = &parse_cff(&data).unwrap()[0];
    let mut sink = BoundsSink::new();
    font.draw(GlyphId::new(1), &mut sink).unwrap();
    assert_eq!(sink.bounds(), bounds(20, 0, 630, 683));
}

/// Sums the operands of a custom operator, to check that the interpreter
/// can drive handlers outside the crate.
struct Summer {
    total: i32,
}

impl<'a> Handler<'a> for Summer {
    fn context(&self) -> Context {
        Context::TopDict
    }

    fn run(&mut self, _op: Opcode, interp: &mut Interpreter<'a>) -> Result<Flow, Error> {
        for i in 0..interp.stack.len() {
            self.total += interp.stack.get_i32(i)?;
        }
        interp.stack.clear();
        Ok(Flow::Continue)
    }
}

#[test]
fn custom_dict_handler() {
    let program = Program::new().int(1).int(2).int(300).op(1).int(-4).op(2).build();
    let mut summer = Summer { total: 0 };
    Interpreter::new().run(&program, &mut summer).unwrap();
    assert_eq!(summer.total, 299);
    // the INDEX reader is shared with the handlers
    let index = test_data::make_index(&[&program], 1);
    assert_eq!(Index::new(&index).unwrap().count(), 1);
}
