//! Corrupts single bytes of valid fonts and checks that parsing and every
//! query fails gracefully instead of panicking.

use font_test_data::{cff, pcf};
use legacy_fonts::{
    parse_cff, parse_pcf,
    tables::postscript::BoundsSink,
    types::GlyphId,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const MUTATIONS: usize = 500;

fn mutate(data: &[u8], rng: &mut StdRng) -> Vec<u8> {
    let mut data = data.to_vec();
    let pos = rng.gen_range(0..data.len());
    data[pos] = rng.gen();
    data
}

fn exercise_pcf(data: &[u8]) {
    let Ok(font) = parse_pcf(data) else {
        return;
    };
    for id in 0..font.glyph_count() as u32 + 1 {
        let gid = GlyphId::new(id);
        let _ = font.glyph_data(gid);
        let _ = font.glyph_extents(gid);
        let _ = font.glyph_v_origin(gid);
        let _ = font.glyph_name(gid);
        let _ = font.horizontal_advance(gid);
        let _ = font.vertical_advance(gid);
    }
    let _ = font.charmap().count();
    for codepoint in [0, 0x41, 0xA1A1, 0x1_0000] {
        let _ = font.nominal_glyph(codepoint);
    }
    let _ = font.style();
    let _ = font.bitmap_size();
    let _ = font.stretch();
    let _ = font.is_cmap_unicode();
}

fn exercise_cff(data: &[u8]) {
    let Ok(fonts) = parse_cff(data) else {
        return;
    };
    for font in &fonts {
        for id in 0..font.glyph_count() as u32 + 1 {
            let gid = GlyphId::new(id);
            let _ = font.load_glyph(gid);
            let _ = font.draw(gid, &mut BoundsSink::new());
            let _ = font.glyph_name(gid);
            let _ = font.fd_index(gid);
        }
        for code in 0..=255 {
            let _ = font.encoding().glyph_name(code);
        }
        let _ = font.style();
    }
}

#[test]
fn mutated_pcf_fonts() {
    let mut rng = StdRng::seed_from_u64(0x5043_4600);
    for data in [pcf::misc_fixed_4x6(), pcf::times_24(), pcf::hangul_16()] {
        for _ in 0..MUTATIONS {
            exercise_pcf(&mutate(&data, &mut rng));
        }
    }
}

#[test]
fn mutated_cff_fonts() {
    let mut rng = StdRng::seed_from_u64(0x4346_4600);
    for data in [cff::cmr17(), cff::cid_font()] {
        for _ in 0..MUTATIONS {
            exercise_cff(&mutate(&data, &mut rng));
        }
    }
}

#[test]
fn truncated_fonts() {
    for data in [pcf::misc_fixed_4x6(), pcf::times_24(), pcf::hangul_16()] {
        for len in 0..data.len() {
            exercise_pcf(&data[..len]);
        }
    }
    for data in [cff::cmr17(), cff::cid_font()] {
        for len in 0..data.len() {
            exercise_cff(&data[..len]);
        }
    }
}
