#![no_main]
use legacy_fonts::{parse_pcf, tables::pcf::decompress, types::GlyphId};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(data) = decompress(data) else {
        return;
    };
    let Ok(font) = parse_pcf(&data) else {
        return;
    };
    for gid in 0..=font.glyph_count() as u32 {
        let gid = GlyphId::new(gid);
        let _ = font.glyph_data(gid);
        let _ = font.glyph_extents(gid);
        let _ = font.glyph_v_origin(gid);
        let _ = font.vertical_advance(gid);
        let _ = font.glyph_name(gid);
    }
    for (codepoint, _) in font.charmap() {
        let _ = font.nominal_glyph(codepoint);
    }
    let _ = font.style();
    let _ = font.bitmap_size();
    let _ = font.stretch();
});
