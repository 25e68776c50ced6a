#![no_main]
use font_types::{Fixed, GlyphId};
use legacy_fonts::{parse_cff, tables::postscript::CommandSink};
use libfuzzer_sys::fuzz_target;

/// The sink for when you don't really care what gets drawn
struct NopSink;

impl CommandSink for NopSink {
    fn move_to(&mut self, _x: Fixed, _y: Fixed) {}

    fn line_to(&mut self, _x: Fixed, _y: Fixed) {}

    fn curve_to(
        &mut self,
        _cx0: Fixed,
        _cy0: Fixed,
        _cx1: Fixed,
        _cy1: Fixed,
        _x: Fixed,
        _y: Fixed,
    ) {
    }

    fn close(&mut self) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(fonts) = parse_cff(data) else {
        return;
    };
    for font in &fonts {
        // limit the work per input; charstrings are small
        for gid in 0..(font.glyph_count() as u32).min(1024) {
            let gid = GlyphId::new(gid);
            let _ = font.load_glyph(gid);
            let _ = font.draw(gid, &mut NopSink);
            let _ = font.glyph_name(gid);
        }
        for code in 0..=255u8 {
            let _ = font.encoding().glyph_name(code);
        }
        let _ = font.style();
    }
});
