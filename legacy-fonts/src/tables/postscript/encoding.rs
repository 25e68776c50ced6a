//! CFF encodings.
//!
//! An encoding maps single byte character codes to glyphs. Fonts either use
//! one of the two predefined encodings or carry a custom one that is
//! decoded here into a table of glyph names.

use alloc::boxed::Box;

use types::GlyphId;

use super::{Charset, Error, Index, StringId};
use crate::{read::ReadError, string::Latin1String, FontData};

/// Character code to glyph name mapping of a CFF font.
///
/// See "Glyph Organization" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=18>
/// for an explanation of how charsets, encodings and glyphs are related.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Encoding<'a> {
    /// The predefined Standard encoding.
    Standard,
    /// The predefined Expert encoding.
    Expert,
    /// A font specific encoding holding the glyph name for each code.
    Custom(Box<[Option<Latin1String<'a>>; 256]>),
}

impl<'a> Encoding<'a> {
    /// Decodes the encoding selected by `encoding_offset`.
    ///
    /// Offsets 0 and 1 select the predefined Standard and Expert encodings.
    /// Custom encodings map codes to glyphs, so the charset and string
    /// INDEX of the font are needed to produce glyph names.
    pub fn new(
        cff_data: &'a [u8],
        encoding_offset: usize,
        charset: &Charset,
        strings: &Index<'a>,
    ) -> Result<Self, Error> {
        match encoding_offset {
            0 => return Ok(Self::Standard),
            1 => return Ok(Self::Expert),
            _ => {}
        }
        let data = FontData::new(cff_data)
            .split_off(encoding_offset)
            .ok_or(ReadError::InvalidOffset(encoding_offset))?;
        let mut cursor = data.cursor();
        let format = cursor.read::<u8>()?;
        let mut names = Box::new([None; 256]);
        let mut assign = |code: u8, gid: u32| -> Result<(), Error> {
            // codes for glyphs missing from the charset stay unmapped
            if let Some(sid) = charset.string_id(GlyphId::new(gid)) {
                names[code as usize] = Some(sid.resolve(strings)?);
            }
            Ok(())
        };
        match format & 0x7F {
            0 => {
                let n_codes = cursor.read::<u8>()?;
                for gid in 1..=n_codes as u32 {
                    assign(cursor.read::<u8>()?, gid)?;
                }
            }
            1 => {
                let n_ranges = cursor.read::<u8>()?;
                let mut gid = 1u32;
                for _ in 0..n_ranges {
                    let first = cursor.read::<u8>()?;
                    let n_left = cursor.read::<u8>()?;
                    for code in first..=first.saturating_add(n_left) {
                        assign(code, gid)?;
                        gid += 1;
                    }
                }
            }
            _ => return Err(Error::InvalidFormat(format)),
        }
        // Supplements name codes directly and override the main table.
        if format & 0x80 != 0 {
            let n_sups = cursor.read::<u8>()?;
            for _ in 0..n_sups {
                let code = cursor.read::<u8>()?;
                let sid = StringId::new(cursor.read::<u16>()?);
                names[code as usize] = Some(sid.resolve(strings)?);
            }
        }
        Ok(Self::Custom(names))
    }

    /// Returns the name of the glyph mapped to the given code, or `None`
    /// for unmapped codes.
    pub fn glyph_name(&self, code: u8) -> Option<Latin1String<'a>> {
        let sid = match self {
            Self::Standard => STANDARD_ENCODING[code as usize] as u16,
            Self::Expert => EXPERT_ENCODING[code as usize],
            Self::Custom(names) => return names[code as usize],
        };
        // SID 0 is .notdef which marks an unused code
        if sid == 0 {
            return None;
        }
        StringId::new(sid).standard_string().ok()
    }
}

/// This maps character codes to string ids for fonts using the standard
/// encoding.
///
/// See "Standard" encoding at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=37>
#[rustfmt::skip]
const STANDARD_ENCODING: [u8; 256] = [
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      1,   2,   3,   4,   5,   6,   7,   8,   9,  10,  11,  12,  13,  14,  15,  16,
     17,  18,  19,  20,  21,  22,  23,  24,  25,  26,  27,  28,  29,  30,  31,  32,
     33,  34,  35,  36,  37,  38,  39,  40,  41,  42,  43,  44,  45,  46,  47,  48,
     49,  50,  51,  52,  53,  54,  55,  56,  57,  58,  59,  60,  61,  62,  63,  64,
     65,  66,  67,  68,  69,  70,  71,  72,  73,  74,  75,  76,  77,  78,  79,  80,
     81,  82,  83,  84,  85,  86,  87,  88,  89,  90,  91,  92,  93,  94,  95,   0,
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0,  96,  97,  98,  99, 100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110,
      0, 111, 112, 113, 114,   0, 115, 116, 117, 118, 119, 120, 121, 122,   0, 123,
      0, 124, 125, 126, 127, 128, 129, 130, 131,   0, 132, 133,   0, 134, 135, 136,
    137,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0, 138,   0, 139,   0,   0,   0,   0, 140, 141, 142, 143,   0,   0,   0,   0,
      0, 144,   0,   0,   0, 145,   0,   0, 146, 147, 148, 149,   0,   0,   0,   0,
];

/// See "Expert" encoding at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=39>
#[rustfmt::skip]
const EXPERT_ENCODING: [u16; 256] = [
      0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,
      0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,
      1,  229,  230,    0,  231,  232,  233,  234,  235,  236,  237,  238,   13,   14,   15,   99,
    239,  240,  241,  242,  243,  244,  245,  246,  247,  248,   27,   28,  249,  250,  251,  252,
      0,  253,  254,  255,  256,  257,    0,    0,    0,  258,    0,    0,  259,  260,  261,  262,
      0,    0,  263,  264,  265,    0,  266,  109,  110,  267,  268,  269,    0,  270,  271,  272,
    273,  274,  275,  276,  277,  278,  279,  280,  281,  282,  283,  284,  285,  286,  287,  288,
    289,  290,  291,  292,  293,  294,  295,  296,  297,  298,  299,  300,  301,  302,  303,    0,
      0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,
      0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,    0,
      0,  304,  305,  306,    0,    0,  307,  308,  309,  310,  311,    0,  312,    0,    0,  313,
      0,    0,  314,  315,    0,    0,  316,  317,  318,    0,    0,    0,  158,  155,  163,  319,
    320,  321,  322,  323,  324,  325,    0,    0,  326,  150,  164,  169,  327,  328,  329,  330,
    331,  332,  333,  334,  335,  336,  337,  338,  339,  340,  341,  342,  343,  344,  345,  346,
    347,  348,  349,  350,  351,  352,  353,  354,  355,  356,  357,  358,  359,  360,  361,  362,
    363,  364,  365,  366,  367,  368,  369,  370,  371,  372,  373,  374,  375,  376,  377,  378,
];
