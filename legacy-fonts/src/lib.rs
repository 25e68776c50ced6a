//! Reading legacy font formats
//!
//! This crate provides memory safe parsing of two font formats that predate
//! OpenType but are still commonly encountered:
//!
//! - [PCF], the compiled bitmap font format of the X Window System.
//! - Bare [CFF] font programs, as embedded in PDF files (`FontFile3` with
//!   subtype `Type1C`).
//!
//! Both parsers borrow from the input. Glyph bitmaps, strings and charstrings
//! are never copied.
//!
//! The CFF support is built on a PostScript [interpreter] that executes DICT
//! data and Type 2 charstrings through a [`Handler`] supplied by the caller.
//! The crate ships handlers for Top and Private DICTs and for charstrings;
//! the latter computes advance widths and bounding boxes, or forwards path
//! commands to a [`CommandSink`].
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use legacy_fonts::types::GlyphId;
//!
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let font = legacy_fonts::parse_pcf(&font_bytes).expect("failed to read font data");
//! let gid = font.nominal_glyph('A' as u32).unwrap_or(GlyphId::new(0));
//! println!(
//!     "{} glyphs, 'A' advances {} pixels",
//!     font.glyph_count(),
//!     font.horizontal_advance(gid)
//! );
//! ```
//!
//! [PCF]: https://fontforge.org/docs/techref/pcf-format.html
//! [CFF]: https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf
//! [interpreter]: tables::postscript::interpreter
//! [`Handler`]: tables::postscript::Handler
//! [`CommandSink`]: tables::postscript::CommandSink

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

extern crate alloc;

mod font_data;
mod read;
mod string;
pub mod tables;

pub use font_data::{Cursor, FontData};
pub use read::{ByteOrder, ReadError, ReadScalar};
pub use string::Latin1String;

/// Public re-export of the font-types crate.
pub extern crate font_types as types;

use alloc::vec::Vec;

use tables::{cff::CffFont, pcf::PcfFont, postscript};

/// Parses a PCF font.
///
/// Gzipped fonts must be decompressed first, with `tables::pcf::decompress`
/// from the `gzip` feature.
pub fn parse_pcf(data: &[u8]) -> Result<PcfFont<'_>, tables::pcf::Error> {
    PcfFont::new(data)
}

/// Parses every font in a bare CFF font set.
pub fn parse_cff(data: &[u8]) -> Result<Vec<CffFont<'_>>, postscript::Error> {
    tables::cff::parse(data)
}
