//! CFF charset support.

use alloc::vec::Vec;

use types::GlyphId;

use super::{Error, StringId};
use crate::{read::ReadError, FontData};

/// Character set for mapping from glyph to string identifiers.
///
/// The mapping is decoded eagerly so that it always holds exactly one entry
/// per glyph, with glyph 0 mapped to `.notdef` (SID 0).
///
/// See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=21>
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Charset {
    sids: Vec<StringId>,
}

impl Charset {
    /// Decodes the charset selected by `charset_offset` in a font with
    /// `num_glyphs` glyphs.
    ///
    /// Offsets 0, 1 and 2 select the predefined ISOAdobe, Expert and
    /// ExpertSubset charsets; anything else is an offset into `cff_data`.
    pub fn new(cff_data: &[u8], charset_offset: usize, num_glyphs: u32) -> Result<Self, Error> {
        let sids = match charset_offset {
            // The ISOAdobe charset is an identity mapping of gid->sid up
            // to 228 entries
            // <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=45>
            0 => predefined((0..=228).map(StringId::new), num_glyphs),
            1 => predefined(EXPERT_CHARSET.iter().copied().map(StringId::new), num_glyphs),
            2 => predefined(
                EXPERT_SUBSET_CHARSET.iter().copied().map(StringId::new),
                num_glyphs,
            ),
            _ => {
                let data = FontData::new(cff_data)
                    .split_off(charset_offset)
                    .ok_or(ReadError::InvalidOffset(charset_offset))?;
                custom(data, num_glyphs)?
            }
        };
        Ok(Self { sids })
    }

    /// Returns the number of glyphs covered by the charset.
    pub fn len(&self) -> usize {
        self.sids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sids.is_empty()
    }

    /// Returns the string identifier for the given glyph identifier.
    pub fn string_id(&self, glyph_id: GlyphId) -> Option<StringId> {
        self.sids.get(glyph_id.to_u32() as usize).copied()
    }

    /// Returns the glyph identifier for the given string identifier.
    pub fn glyph_id(&self, string_id: StringId) -> Option<GlyphId> {
        self.sids
            .iter()
            .position(|sid| *sid == string_id)
            .map(|gid| GlyphId::new(gid as u32))
    }

    /// Returns an iterator over all of the glyph and string identifier
    /// mappings.
    pub fn iter(&self) -> impl Iterator<Item = (GlyphId, StringId)> + '_ {
        self.sids
            .iter()
            .enumerate()
            .map(|(gid, sid)| (GlyphId::new(gid as u32), *sid))
    }
}

fn predefined(sids: impl Iterator<Item = StringId>, num_glyphs: u32) -> Vec<StringId> {
    let mut result: Vec<_> = sids.take(num_glyphs as usize).collect();
    if result.len() < num_glyphs as usize {
        log::warn!(
            "predefined charset covers {} of {num_glyphs} glyphs, mapping the rest to .notdef",
            result.len()
        );
        result.resize(num_glyphs as usize, StringId::new(0));
    }
    result
}

fn custom(data: FontData, num_glyphs: u32) -> Result<Vec<StringId>, Error> {
    let num_glyphs = num_glyphs as usize;
    let mut cursor = data.cursor();
    let format = cursor.read::<u8>()?;
    // The notdef glyph isn't explicitly mapped
    let mut sids = Vec::with_capacity(num_glyphs);
    if num_glyphs == 0 {
        return Ok(sids);
    }
    sids.push(StringId::new(0));
    match format {
        0 => {
            for _ in 1..num_glyphs {
                sids.push(StringId::new(cursor.read::<u16>()?));
            }
        }
        1 | 2 => {
            // Each range provides the string ids for `n_left + 1` glyphs
            // with the sequence of string ids starting at `first`.
            while sids.len() < num_glyphs {
                let first = cursor.read::<u16>()? as u32;
                let n_left = if format == 1 {
                    cursor.read::<u8>()? as u32
                } else {
                    cursor.read::<u16>()? as u32
                };
                let count = (n_left as usize + 1).min(num_glyphs - sids.len());
                for sid in first..first + count as u32 {
                    let sid = u16::try_from(sid)
                        .map_err(|_| ReadError::MalformedData("charset range overflows SIDs"))?;
                    sids.push(StringId::new(sid));
                }
            }
        }
        _ => return Err(Error::InvalidFormat(format)),
    }
    Ok(sids)
}

/// See "Expert" charset at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=47>
#[rustfmt::skip]
const EXPERT_CHARSET: &[u16] = &[
      0,    1,  229,  230,  231,  232,  233,  234,  235,  236,  237,  238,   13,   14,   15,   99,
    239,  240,  241,  242,  243,  244,  245,  246,  247,  248,   27,   28,  249,  250,  251,  252,
    253,  254,  255,  256,  257,  258,  259,  260,  261,  262,  263,  264,  265,  266,  109,  110,
    267,  268,  269,  270,  271,  272,  273,  274,  275,  276,  277,  278,  279,  280,  281,  282,
    283,  284,  285,  286,  287,  288,  289,  290,  291,  292,  293,  294,  295,  296,  297,  298,
    299,  300,  301,  302,  303,  304,  305,  306,  307,  308,  309,  310,  311,  312,  313,  314,
    315,  316,  317,  318,  158,  155,  163,  319,  320,  321,  322,  323,  324,  325,  326,  150,
    164,  169,  327,  328,  329,  330,  331,  332,  333,  334,  335,  336,  337,  338,  339,  340,
    341,  342,  343,  344,  345,  346,  347,  348,  349,  350,  351,  352,  353,  354,  355,  356,
    357,  358,  359,  360,  361,  362,  363,  364,  365,  366,  367,  368,  369,  370,  371,  372,
    373,  374,  375,  376,  377,  378,
];

/// See "Expert Subset" charset at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=49>
#[rustfmt::skip]
const EXPERT_SUBSET_CHARSET: &[u16] = &[
      0,    1,  231,  232,  235,  236,  237,  238,   13,   14,   15,   99,  239,  240,  241,  242,
    243,  244,  245,  246,  247,  248,   27,   28,  249,  250,  251,  253,  254,  255,  256,  257,
    258,  259,  260,  261,  262,  263,  264,  265,  266,  109,  110,  267,  268,  269,  270,  272,
    300,  301,  302,  305,  314,  315,  158,  155,  163,  320,  321,  322,  323,  324,  325,  326,
    150,  164,  169,  327,  328,  329,  330,  331,  332,  333,  334,  335,  336,  337,  338,  339,
    340,  341,  342,  343,  344,  345,  346
];
