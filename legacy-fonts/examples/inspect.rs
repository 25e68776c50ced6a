//! Print a summary of a PCF or bare CFF font.
//!
//! The format is detected from the file contents; gzipped PCF files are
//! supported.

use legacy_fonts::{
    parse_cff, parse_pcf,
    tables::{
        cff::CffFont,
        pcf::{self, PcfFont},
    },
    types::GlyphId,
};

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = match flags::Args::from_env() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let bytes = std::fs::read(&args.input).map_err(Error::new)?;
    let bytes = pcf::decompress(&bytes).map_err(Error::new)?;
    if bytes.starts_with(&pcf::MAGIC) {
        let font = parse_pcf(&bytes).map_err(Error::new)?;
        print_pcf(&font, args.glyphs);
    } else {
        for font in parse_cff(&bytes).map_err(Error::new)? {
            print_cff(&font, args.glyphs);
        }
    }
    Ok(())
}

fn print_pcf(font: &PcfFont, glyphs: bool) {
    let style = font.style();
    let size = font.bitmap_size();
    println!("PCF {} {}", style.family_name, style.style_name);
    println!(
        "  {} glyphs, {}x{} px strike at {} pt ({}x{} ppem)",
        font.glyph_count(),
        size.width,
        size.height,
        size.size,
        size.x_ppem,
        size.y_ppem
    );
    println!("  unicode charmap: {}", font.is_cmap_unicode());
    for (name, value) in font.properties().iter() {
        println!("  {name}: {value:?}");
    }
    if glyphs {
        for (codepoint, gid) in font.charmap() {
            let name = font.glyph_name(gid);
            println!(
                "  0x{codepoint:04X} -> {} {} advance {}",
                gid,
                name.map(|name| name.to_string()).unwrap_or_default(),
                font.horizontal_advance(gid)
            );
        }
    }
}

fn print_cff(font: &CffFont, glyphs: bool) {
    let info = font.postscript_info();
    let style = font.style();
    println!("CFF {} ({} {})", font.name(), style.family_name, style.style_name);
    println!(
        "  {} glyphs, {} font DICTs{}",
        font.glyph_count(),
        font.font_dict_count(),
        if font.is_cid() { ", CID keyed" } else { "" }
    );
    for (label, value) in [
        ("version", &info.version),
        ("notice", &info.notice),
        ("weight", &info.weight),
    ] {
        if !value.is_empty() {
            println!("  {label}: {value}");
        }
    }
    if glyphs {
        for gid in 0..font.glyph_count() as u32 {
            let gid = GlyphId::new(gid);
            let name = font
                .glyph_name(gid)
                .map(|name| name.to_string())
                .unwrap_or_default();
            match font.load_glyph(gid) {
                Ok(metrics) => println!(
                    "  {gid} {name} advance {} bounds {:?}",
                    metrics.advance, metrics.bounds
                ),
                Err(e) => println!("  {gid} {name} error: {e}"),
            }
        }
    }
}

#[derive(Clone, Debug)]
struct Error(String);

impl Error {
    fn new(t: impl std::fmt::Display) -> Self {
        Self(t.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Error {}

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Print a summary of a legacy font file
        cmd args {
            required input: PathBuf
            /// Also print per glyph information
            optional -g, --glyphs
        }
    }
}
