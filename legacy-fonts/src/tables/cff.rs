//! Standalone [Compact Font Format](https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf)
//! font programs, as embedded in PDF files (`FontFile3/Type1C`).

use alloc::{string::String, vec, vec::Vec};
use core::ops::Range;

use font_types::{BoundingBox, Fixed, GlyphId};

use super::postscript::{
    charstring, BoundsSink, Charset, CommandSink, Encoding, Error, FdSelect, Index, Interpreter,
    PrivateDict, StringId, TopDict, MAX_SUBROUTINES,
};
use crate::{read::ReadError, string::Latin1String, FontData};

/// The largest number of fonts we accept in a single font set.
pub const MAX_FONTS: u32 = 65535;

/// Parses a CFF font set.
///
/// The Name and Top DICT INDEXes must both hold exactly one entry.
pub fn parse(data: &[u8]) -> Result<Vec<CffFont<'_>>, Error> {
    let mut cursor = FontData::new(data).cursor();
    let major = cursor.read::<u8>()?;
    if major != 1 {
        return Err(Error::BadMagic(major));
    }
    let _minor = cursor.read::<u8>()?;
    let header_size = cursor.read::<u8>()?;
    // the header also holds an absolute offset size that nothing uses
    cursor.seek((header_size as usize).max(4))?;
    let names = Index::read(&mut cursor)?;
    let top_dicts = Index::read(&mut cursor)?;
    if names.count() != top_dicts.count() {
        return Err(ReadError::MalformedData("Name and Top DICT INDEX counts differ").into());
    }
    if names.count() > MAX_FONTS {
        return Err(Error::Unsupported("more than 65535 fonts"));
    }
    if names.count() != 1 {
        return Err(Error::InvalidFontCount(names.count()));
    }
    let strings = Index::read(&mut cursor)?;
    let global_subrs = Index::read(&mut cursor)?;
    check_subr_count(&global_subrs)?;
    let shared = Shared {
        data,
        strings,
        global_subrs,
    };
    names
        .iter()
        .zip(top_dicts.iter())
        .map(|(name, top_dict)| CffFont::new(&shared, Latin1String::new(name), top_dict))
        .collect()
}

/// Structures shared by every font of a set.
struct Shared<'a> {
    data: &'a [u8],
    strings: Index<'a>,
    global_subrs: Index<'a>,
}

/// Human readable entries of the Top DICT.
///
/// Strings that are absent from the font are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PostScriptInfo {
    pub font_name: String,
    pub full_name: String,
    pub family_name: String,
    pub version: String,
    pub notice: String,
    pub copyright: String,
    pub weight: String,
    pub italic_angle: Fixed,
    pub is_fixed_pitch: bool,
    pub underline_position: Fixed,
    pub underline_thickness: Fixed,
}

/// Style information derived from the Top DICT and font name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    pub is_italic: bool,
    pub is_bold: bool,
    pub family_name: String,
    pub style_name: String,
}

/// The control box and advance width of a glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// `None` for glyphs without contours.
    pub bounds: Option<BoundingBox<Fixed>>,
    pub advance: Fixed,
}

/// Private DICT and local subroutines for one font DICT.
#[derive(Clone, Debug, Default)]
struct PrivateData<'a> {
    dict: PrivateDict,
    subrs: Option<Index<'a>>,
}

/// A single font of a CFF font set.
#[derive(Clone, Debug)]
pub struct CffFont<'a> {
    name: Latin1String<'a>,
    top_dict: TopDict,
    info: PostScriptInfo,
    cid_font_name: String,
    strings: Index<'a>,
    global_subrs: Index<'a>,
    charstrings: Index<'a>,
    charset: Charset,
    encoding: Encoding<'a>,
    /// One entry for a name keyed font, one per font DICT for a CID font.
    privates: Vec<PrivateData<'a>>,
    fd_select: Option<FdSelect<'a>>,
}

impl<'a> CffFont<'a> {
    fn new(
        shared: &Shared<'a>,
        name: Latin1String<'a>,
        top_dict_data: &'a [u8],
    ) -> Result<Self, Error> {
        let data = shared.data;
        let mut interp = Interpreter::new();
        let mut top_dict = TopDict::default();
        interp.run(top_dict_data, &mut top_dict)?;
        log::debug!("cff: font {name} (CID: {})", top_dict.is_cid);
        let charstrings_offset = top_dict
            .charstrings_offset
            .ok_or(Error::MissingCharstrings)?;
        let charstrings = Index::new(data_from(data, charstrings_offset)?)?;
        let num_glyphs = charstrings.count();
        let charset = Charset::new(data, top_dict.charset_offset, num_glyphs)?;
        let encoding = Encoding::new(data, top_dict.encoding_offset, &charset, &shared.strings)?;
        let (privates, fd_select) = if top_dict.is_cid {
            let fd_array_offset = top_dict.fd_array_offset.ok_or(Error::MissingPrivateDict)?;
            let fd_array = Index::new(data_from(data, fd_array_offset)?)?;
            let mut privates = Vec::with_capacity(fd_array.count() as usize);
            for font_dict_data in fd_array.iter() {
                let mut font_dict = TopDict::default();
                interp.run(font_dict_data, &mut font_dict)?;
                let range = font_dict
                    .private_dict_range
                    .ok_or(Error::MissingPrivateDict)?;
                privates.push(PrivateData::new(data, range, &mut interp)?);
            }
            let fd_select_offset = top_dict
                .fd_select_offset
                .ok_or(Error::Unsupported("CID font without FDSelect"))?;
            let fd_select = FdSelect::new(data, fd_select_offset, num_glyphs)?;
            for gid in 0..num_glyphs {
                match fd_select.font_index(GlyphId::new(gid)) {
                    Some(fd) if (fd as usize) < privates.len() => {}
                    fd => return Err(Error::InvalidFontIndex(fd.map_or(gid, u32::from))),
                }
            }
            log::debug!("cff: {} font DICTs", privates.len());
            (privates, Some(fd_select))
        } else {
            let range = top_dict
                .private_dict_range
                .clone()
                .ok_or(Error::MissingPrivateDict)?;
            (vec![PrivateData::new(data, range, &mut interp)?], None)
        };
        let strings = shared.strings;
        let string = |sid: StringId| -> Result<String, Error> {
            if sid == StringId::UNSET || sid == StringId::new(0) {
                return Ok(String::new());
            }
            Ok(sid.resolve(&strings)?.chars().collect())
        };
        let info = PostScriptInfo {
            font_name: name.chars().collect(),
            full_name: string(top_dict.full_name)?,
            family_name: string(top_dict.family_name)?,
            version: string(top_dict.version)?,
            notice: string(top_dict.notice)?,
            copyright: string(top_dict.copyright)?,
            weight: string(top_dict.weight)?,
            italic_angle: top_dict.italic_angle,
            is_fixed_pitch: top_dict.is_fixed_pitch,
            underline_position: top_dict.underline_position,
            underline_thickness: top_dict.underline_thickness,
        };
        let cid_font_name = string(top_dict.cid_font_name)?;
        Ok(Self {
            name,
            top_dict,
            info,
            cid_font_name,
            strings,
            global_subrs: shared.global_subrs,
            charstrings,
            charset,
            encoding,
            privates,
            fd_select,
        })
    }

    /// The name of the font from the Name INDEX.
    pub fn name(&self) -> Latin1String<'a> {
        self.name
    }

    pub fn postscript_name(&self) -> &str {
        &self.info.font_name
    }

    pub fn top_dict(&self) -> &TopDict {
        &self.top_dict
    }

    pub fn postscript_info(&self) -> &PostScriptInfo {
        &self.info
    }

    /// Resolves a string identifier against the standard strings and the
    /// string INDEX of the font set.
    pub fn string(&self, sid: StringId) -> Result<Latin1String<'a>, Error> {
        sid.resolve(&self.strings)
    }

    pub fn glyph_count(&self) -> usize {
        self.charstrings.count() as usize
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn encoding(&self) -> &Encoding<'a> {
        &self.encoding
    }

    /// Returns the name of the glyph from the charset.
    ///
    /// CID fonts map glyphs to CIDs rather than names, so this is always
    /// `None` for them.
    pub fn glyph_name(&self, gid: GlyphId) -> Option<Latin1String<'a>> {
        if self.is_cid() {
            return None;
        }
        self.charset.string_id(gid)?.resolve(&self.strings).ok()
    }

    pub fn is_cid(&self) -> bool {
        self.top_dict.is_cid
    }

    /// The `FontName` of a CID font, or an empty string.
    pub fn cid_font_name(&self) -> &str {
        &self.cid_font_name
    }

    /// Number of font DICTs; always 1 for name keyed fonts.
    pub fn font_dict_count(&self) -> usize {
        self.privates.len()
    }

    /// Returns the index of the font DICT used by the glyph.
    pub fn fd_index(&self, gid: GlyphId) -> Option<usize> {
        if gid.to_u32() >= self.charstrings.count() {
            return None;
        }
        match &self.fd_select {
            Some(fd_select) => fd_select.font_index(gid).map(usize::from),
            None => Some(0),
        }
    }

    /// Evaluates the charstring of the glyph, sending its outline to `sink`.
    ///
    /// Returns the advance width.
    pub fn draw(&self, gid: GlyphId, sink: &mut impl CommandSink) -> Result<Fixed, Error> {
        let charstring = self
            .charstrings
            .get(gid.to_u32() as usize)
            .map_err(|_| Error::InvalidGlyph(gid.to_u32()))?;
        let fd = self
            .fd_index(gid)
            .ok_or(Error::InvalidGlyph(gid.to_u32()))?;
        let private = self
            .privates
            .get(fd)
            .ok_or(Error::InvalidFontIndex(fd as u32))?;
        let mut interp = Interpreter::with_subroutines(self.global_subrs, private.subrs);
        charstring::evaluate(&mut interp, charstring, &private.dict, sink)
    }

    /// Computes the control box and advance width of the glyph.
    ///
    /// Glyphs outside the font have empty metrics.
    pub fn load_glyph(&self, gid: GlyphId) -> Result<GlyphMetrics, Error> {
        if gid.to_u32() >= self.charstrings.count() {
            return Ok(GlyphMetrics::default());
        }
        let mut sink = BoundsSink::new();
        let advance = self.draw(gid, &mut sink)?;
        Ok(GlyphMetrics {
            bounds: sink.bounds(),
            advance,
        })
    }

    /// Derives the family and style names and flags the way FreeType's CFF
    /// driver does.
    pub fn style(&self) -> Style {
        let info = &self.info;
        let mut family = if info.family_name.is_empty() {
            String::from(remove_subset_prefix(&info.font_name))
        } else {
            info.family_name.clone()
        };
        let mut style_name = None;
        if !family.is_empty() {
            if let Some(style) = style_from_full_name(&info.full_name, &family) {
                family = String::from(remove_style(&family, style));
                style_name = Some(String::from(style));
            }
        } else if !self.cid_font_name.is_empty() {
            family = self.cid_font_name.clone();
        }
        let style_name = style_name.unwrap_or_else(|| String::from("Regular"));
        let is_bold = matches!(info.weight.as_str(), "Bold" | "Black")
            || style_name.starts_with("Bold")
            || style_name.starts_with("Black");
        Style {
            is_italic: info.italic_angle != Fixed::ZERO,
            is_bold,
            family_name: family,
            style_name,
        }
    }
}

impl<'a> PrivateData<'a> {
    fn new(
        data: &'a [u8],
        range: Range<usize>,
        interp: &mut Interpreter<'a>,
    ) -> Result<Self, Error> {
        let mut private = Self::default();
        if range.is_empty() {
            return Ok(private);
        }
        let dict_data = data
            .get(range.clone())
            .ok_or(ReadError::InvalidOffset(range.start))?;
        interp.run(dict_data, &mut private.dict)?;
        // the local subrs offset is relative to the start of the Private DICT
        if let Some(subrs_offset) = private.dict.subrs_offset {
            let start = range
                .start
                .checked_add(subrs_offset)
                .ok_or(ReadError::InvalidOffset(subrs_offset))?;
            let subrs = Index::new(data_from(data, start)?)?;
            check_subr_count(&subrs)?;
            private.subrs = Some(subrs);
        }
        Ok(private)
    }
}

fn data_from(data: &[u8], offset: usize) -> Result<&[u8], ReadError> {
    data.get(offset..).ok_or(ReadError::InvalidOffset(offset))
}

fn check_subr_count(subrs: &Index) -> Result<(), Error> {
    if subrs.count() > MAX_SUBROUTINES {
        Err(Error::Unsupported("more than 40000 subroutines"))
    } else {
        Ok(())
    }
}

/// Strips all subset prefixes of the form `ABCDEF+`.
///
/// Usually there is only one, but names like `APCOOG+JFABTD+FuturaBQ-Bold`
/// occur in the wild.
fn remove_subset_prefix(mut name: &str) -> &str {
    while let Some((prefix, rest)) = name.split_at_checked(7) {
        let tag = prefix.as_bytes();
        if tag[6] != b'+' || !tag[..6].iter().all(u8::is_ascii_uppercase) {
            break;
        }
        name = rest;
    }
    name
}

/// If the full name starts with the family name, ignoring spaces and
/// hyphens, returns the rest of the full name.
fn style_from_full_name<'b>(full: &'b str, family: &str) -> Option<&'b str> {
    let (full_bytes, family) = (full.as_bytes(), family.as_bytes());
    let (mut i, mut j) = (0, 0);
    loop {
        match (full_bytes.get(i), family.get(j)) {
            (Some(a), Some(b)) if a == b => {
                i += 1;
                j += 1;
            }
            (Some(b' ' | b'-'), _) => i += 1,
            (_, Some(b' ' | b'-')) => j += 1,
            (Some(_), None) => return full.get(i..),
            _ => return None,
        }
    }
}

/// Removes a trailing style name, and the separators before it, from the
/// family name.
fn remove_style<'b>(family: &'b str, style: &str) -> &'b str {
    if family.len() > style.len() {
        if let Some(stripped) = family.strip_suffix(style) {
            let stripped = stripped.trim_end_matches([' ', '-', '_', '+']);
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    family
}
