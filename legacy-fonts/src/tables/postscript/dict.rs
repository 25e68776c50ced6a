//! Parsing for PostScript DICTs.
//!
//! DICT programs are run through the shared [`Interpreter`] with one of the
//! handlers in this module, which collect the entries we care about into a
//! plain record.

use core::ops::Range;

use font_types::{BoundingBox, Fixed};

use super::{
    interpreter::{Context, Flow, Handler, Interpreter, Opcode},
    Error, StringId,
};
use crate::{font_data::Cursor, read::ReadError};

/// PostScript DICT operator.
///
/// See "Table 9 Top DICT Operator Entries", "Table 10 CIDFont Operator
/// Extensions" and "Table 23 Private DICT Operators" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf>
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Operator {
    // Top DICT
    Version,
    Notice,
    Copyright,
    FullName,
    FamilyName,
    Weight,
    IsFixedPitch,
    ItalicAngle,
    UnderlinePosition,
    UnderlineThickness,
    PaintType,
    CharstringType,
    FontMatrix,
    UniqueId,
    FontBbox,
    StrokeWidth,
    Xuid,
    Charset,
    Encoding,
    CharstringsOffset,
    PrivateDictRange,
    SyntheticBase,
    PostScript,
    BaseFontName,
    BaseFontBlend,
    // CIDFont extensions
    Ros,
    CidFontVersion,
    CidFontRevision,
    CidFontType,
    CidCount,
    UidBase,
    FdArrayOffset,
    FdSelectOffset,
    FontName,
    // Private DICT
    BlueValues,
    OtherBlues,
    FamilyBlues,
    FamilyOtherBlues,
    BlueScale,
    BlueShift,
    BlueFuzz,
    StdHw,
    StdVw,
    StemSnapH,
    StemSnapV,
    ForceBold,
    LanguageGroup,
    ExpansionFactor,
    InitialRandomSeed,
    SubrsOffset,
    DefaultWidthX,
    NominalWidthX,
}

/// Opcodes of the DICT operators, keyed by (escaped, value).
const OPERATORS: &[((bool, u8), Operator)] = {
    use Operator::*;
    &[
        ((false, 0), Version),
        ((false, 1), Notice),
        ((false, 2), FullName),
        ((false, 3), FamilyName),
        ((false, 4), Weight),
        ((false, 5), FontBbox),
        ((false, 6), BlueValues),
        ((false, 7), OtherBlues),
        ((false, 8), FamilyBlues),
        ((false, 9), FamilyOtherBlues),
        ((false, 10), StdHw),
        ((false, 11), StdVw),
        ((false, 13), UniqueId),
        ((false, 14), Xuid),
        ((false, 15), Charset),
        ((false, 16), Encoding),
        ((false, 17), CharstringsOffset),
        ((false, 18), PrivateDictRange),
        ((false, 19), SubrsOffset),
        ((false, 20), DefaultWidthX),
        ((false, 21), NominalWidthX),
        ((true, 0), Copyright),
        ((true, 1), IsFixedPitch),
        ((true, 2), ItalicAngle),
        ((true, 3), UnderlinePosition),
        ((true, 4), UnderlineThickness),
        ((true, 5), PaintType),
        ((true, 6), CharstringType),
        ((true, 7), FontMatrix),
        ((true, 8), StrokeWidth),
        ((true, 9), BlueScale),
        ((true, 10), BlueShift),
        ((true, 11), BlueFuzz),
        ((true, 12), StemSnapH),
        ((true, 13), StemSnapV),
        ((true, 14), ForceBold),
        ((true, 17), LanguageGroup),
        ((true, 18), ExpansionFactor),
        ((true, 19), InitialRandomSeed),
        ((true, 20), SyntheticBase),
        ((true, 21), PostScript),
        ((true, 22), BaseFontName),
        ((true, 23), BaseFontBlend),
        ((true, 30), Ros),
        ((true, 31), CidFontVersion),
        ((true, 32), CidFontRevision),
        ((true, 33), CidFontType),
        ((true, 34), CidCount),
        ((true, 35), UidBase),
        ((true, 36), FdArrayOffset),
        ((true, 37), FdSelectOffset),
        ((true, 38), FontName),
    ]
};

impl Operator {
    pub fn new(op: Opcode) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(code, _)| *code == (op.is_escaped, op.value))
            .map(|(_, operator)| *operator)
    }

    /// The number of operands consumed, or `None` for array and delta
    /// operators which take the whole stack.
    fn operand_count(self) -> Option<usize> {
        use Operator::*;
        match self {
            FontBbox | Xuid | FontMatrix | BaseFontBlend | BlueValues | OtherBlues
            | FamilyBlues | FamilyOtherBlues | StemSnapH | StemSnapV => None,
            PrivateDictRange => Some(2),
            Ros => Some(3),
            _ => Some(1),
        }
    }

    fn is_private(self) -> bool {
        use Operator::*;
        matches!(
            self,
            BlueValues
                | OtherBlues
                | FamilyBlues
                | FamilyOtherBlues
                | StdHw
                | StdVw
                | SubrsOffset
                | DefaultWidthX
                | NominalWidthX
                | BlueScale
                | BlueShift
                | BlueFuzz
                | StemSnapH
                | StemSnapV
                | ForceBold
                | LanguageGroup
                | ExpansionFactor
                | InitialRandomSeed
        )
    }

    /// Pops the operands of this operator and returns the stack index of
    /// the first one.
    fn pop_operands(self, interp: &mut Interpreter) -> Result<usize, Error> {
        let count = self.operand_count().unwrap_or(interp.stack.len());
        interp.stack.pop_n(count)
    }
}

/// Entries of a Top DICT, or of a Font DICT in the FDArray of a CID font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopDict {
    pub version: StringId,
    pub notice: StringId,
    pub copyright: StringId,
    pub full_name: StringId,
    pub family_name: StringId,
    pub weight: StringId,
    pub is_fixed_pitch: bool,
    pub italic_angle: Fixed,
    pub underline_position: Fixed,
    pub underline_thickness: Fixed,
    pub font_bbox: Option<BoundingBox<Fixed>>,
    pub charset_offset: usize,
    pub encoding_offset: usize,
    pub charstrings_offset: Option<usize>,
    pub private_dict_range: Option<Range<usize>>,
    pub is_cid: bool,
    pub fd_array_offset: Option<usize>,
    pub fd_select_offset: Option<usize>,
    /// The `FontName` entry of a CID font.
    pub cid_font_name: StringId,
}

impl Default for TopDict {
    fn default() -> Self {
        Self {
            version: StringId::UNSET,
            notice: StringId::UNSET,
            copyright: StringId::UNSET,
            full_name: StringId::UNSET,
            family_name: StringId::UNSET,
            weight: StringId::UNSET,
            is_fixed_pitch: false,
            italic_angle: Fixed::ZERO,
            underline_position: Fixed::from_i32(-100),
            underline_thickness: Fixed::from_i32(50),
            font_bbox: None,
            charset_offset: 0,
            encoding_offset: 0,
            charstrings_offset: None,
            private_dict_range: None,
            is_cid: false,
            fd_array_offset: None,
            fd_select_offset: None,
            cid_font_name: StringId::UNSET,
        }
    }
}

impl<'a> Handler<'a> for TopDict {
    fn context(&self) -> Context {
        Context::TopDict
    }

    fn run(&mut self, op: Opcode, interp: &mut Interpreter<'a>) -> Result<Flow, Error> {
        let operator = Operator::new(op)
            .filter(|operator| !operator.is_private())
            .ok_or_else(|| op.invalid())?;
        let depth = interp.stack.len();
        let base = operator.pop_operands(interp)?;
        let stack = &interp.stack;
        let sid = || stack.get_i32(base).map(StringId::from);
        let offset = |ix| stack.get_i32(ix).and_then(to_offset);
        use Operator::*;
        match operator {
            Version => self.version = sid()?,
            Notice => self.notice = sid()?,
            Copyright => self.copyright = sid()?,
            FullName => self.full_name = sid()?,
            FamilyName => self.family_name = sid()?,
            Weight => self.weight = sid()?,
            FontName => self.cid_font_name = sid()?,
            IsFixedPitch => self.is_fixed_pitch = stack.get_fixed(base)? != Fixed::ZERO,
            ItalicAngle => self.italic_angle = stack.get_fixed(base)?,
            UnderlinePosition => self.underline_position = stack.get_fixed(base)?,
            UnderlineThickness => self.underline_thickness = stack.get_fixed(base)?,
            FontBbox if depth == 4 => {
                self.font_bbox = Some(BoundingBox {
                    x_min: stack.get_fixed(0)?,
                    y_min: stack.get_fixed(1)?,
                    x_max: stack.get_fixed(2)?,
                    y_max: stack.get_fixed(3)?,
                });
            }
            Charset => self.charset_offset = offset(base)?,
            Encoding => self.encoding_offset = offset(base)?,
            CharstringsOffset => self.charstrings_offset = Some(offset(base)?),
            PrivateDictRange => {
                let len = offset(base)?;
                let start = offset(base + 1)?;
                let end = start.checked_add(len).ok_or(Error::InvalidOffset)?;
                self.private_dict_range = Some(start..end);
            }
            CharstringType => {
                if stack.get_i32(base)? != 2 {
                    return Err(Error::Unsupported("charstring type other than 2"));
                }
            }
            Ros => self.is_cid = true,
            FdArrayOffset => self.fd_array_offset = Some(offset(base)?),
            FdSelectOffset => self.fd_select_offset = Some(offset(base)?),
            _ => {}
        }
        Ok(Flow::Continue)
    }
}

/// Entries of a Private DICT.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrivateDict {
    /// Offset of the local subroutines, relative to the start of the
    /// Private DICT.
    pub subrs_offset: Option<usize>,
    pub default_width_x: Fixed,
    pub nominal_width_x: Fixed,
}

impl<'a> Handler<'a> for PrivateDict {
    fn context(&self) -> Context {
        Context::PrivateDict
    }

    fn run(&mut self, op: Opcode, interp: &mut Interpreter<'a>) -> Result<Flow, Error> {
        let operator = Operator::new(op)
            .filter(|operator| operator.is_private())
            .ok_or_else(|| op.invalid())?;
        // a missing operand means the DICT was cut off
        let base = operator.pop_operands(interp).map_err(|err| match err {
            Error::StackUnderflow => Error::Read(ReadError::Truncated),
            err => err,
        })?;
        let stack = &interp.stack;
        match operator {
            Operator::SubrsOffset => {
                self.subrs_offset = Some(stack.get_i32(base).and_then(to_offset)?);
            }
            Operator::DefaultWidthX => self.default_width_x = stack.get_fixed(base)?,
            Operator::NominalWidthX => self.nominal_width_x = stack.get_fixed(base)?,
            _ => {}
        }
        Ok(Flow::Continue)
    }
}

fn to_offset(value: i32) -> Result<usize, Error> {
    usize::try_from(value).map_err(|_| Error::InvalidOffset)
}

#[inline]
pub(crate) fn parse_int(cursor: &mut Cursor, b0: u8) -> Result<i32, Error> {
    // Size   b0 range     Value range              Value calculation
    //--------------------------------------------------------------------------------
    // 1      32 to 246    -107 to +107             b0 - 139
    // 2      247 to 250   +108 to +1131            (b0 - 247) * 256 + b1 + 108
    // 2      251 to 254   -1131 to -108            -(b0 - 251) * 256 - b1 - 108
    // 3      28           -32768 to +32767         b1 << 8 | b2
    // 5      29           -(2^31) to +(2^31 - 1)   b1 << 24 | b2 << 16 | b3 << 8 | b4
    // <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=11>
    Ok(match b0 {
        32..=246 => b0 as i32 - 139,
        247..=250 => (b0 as i32 - 247) * 256 + cursor.read::<u8>()? as i32 + 108,
        251..=254 => -(b0 as i32 - 251) * 256 - cursor.read::<u8>()? as i32 - 108,
        28 => cursor.read::<i16>()? as i32,
        29 => cursor.read::<i32>()?,
        _ => {
            return Err(Error::InvalidNumber);
        }
    })
}

/// Parses the binary coded decimal that follows the real number prefix
/// byte 30.
///
/// Nine significant digits are kept and the result is rounded to the
/// nearest 16.16 value, saturating on overflow.
pub(crate) fn parse_real(cursor: &mut Cursor) -> Result<Fixed, Error> {
    let mut real = Real::default();
    for _ in 0..REAL_MAX_LEN {
        let byte = cursor.read::<u8>()?;
        for nibble in [byte >> 4, byte & 0xF] {
            if real.push(nibble)? {
                return Ok(real.value());
            }
        }
    }
    Err(Error::Unsupported("real number longer than 32 bytes"))
}

// Longest encoded real we accept, in bytes
const REAL_MAX_LEN: usize = 32;
const REAL_MAX_DIGITS: u32 = 9;
const REAL_MAX_EXPONENT: i32 = 1000;
const REAL_OVERFLOW: Fixed = Fixed::from_bits(i32::MAX);

/// A real number operand under construction.
#[derive(Default)]
struct Real {
    negative: bool,
    mantissa: i64,
    digits: u32,
    // power of ten applied to the mantissa by the digits themselves
    scale: i32,
    in_fraction: bool,
    exponent: Option<i32>,
    negative_exponent: bool,
}

impl Real {
    /// Consumes one nibble, returning true at the end of the number.
    ///
    /// Nibbles 0-9 are digits, a is the decimal point, b and c start a
    /// positive and negative exponent, e is the minus sign and f ends the
    /// number. d is reserved.
    /// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=11>
    fn push(&mut self, nibble: u8) -> Result<bool, Error> {
        match nibble {
            0x0..=0x9 => {
                let digit = nibble as i32;
                match &mut self.exponent {
                    Some(exponent) => {
                        *exponent = (*exponent * 10 + digit).min(REAL_MAX_EXPONENT);
                    }
                    None if self.digits < REAL_MAX_DIGITS => {
                        if self.mantissa != 0 || digit != 0 {
                            self.digits += 1;
                        }
                        self.mantissa = self.mantissa * 10 + digit as i64;
                        if self.in_fraction {
                            self.scale -= 1;
                        }
                    }
                    // insignificant digits only move the decimal point
                    None if !self.in_fraction => self.scale += 1,
                    None => {}
                }
            }
            0xA => self.in_fraction = true,
            0xB | 0xC => {
                self.exponent = Some(0);
                self.negative_exponent = nibble == 0xC;
            }
            0xE => self.negative = true,
            0xF => return Ok(true),
            _ => return Err(Error::InvalidNumber),
        }
        Ok(false)
    }

    fn value(&self) -> Fixed {
        if self.mantissa == 0 {
            return Fixed::ZERO;
        }
        let exponent = self.exponent.unwrap_or(0);
        let power = self.scale
            + if self.negative_exponent {
                -exponent
            } else {
                exponent
            };
        let bits = self.mantissa << 16;
        let magnitude = match power {
            0.. if power > 9 => return self.signed(REAL_OVERFLOW),
            0.. => bits.saturating_mul(10i64.pow(power as u32)),
            -18..=-1 => {
                let divisor = 10i64.pow(power.unsigned_abs());
                (bits + divisor / 2) / divisor
            }
            _ => 0,
        };
        self.signed(Fixed::from_bits(magnitude.min(i32::MAX as i64) as i32))
    }

    fn signed(&self, value: Fixed) -> Fixed {
        if self.negative {
            Fixed::from_bits(-value.to_bits())
        } else {
            value
        }
    }
}
