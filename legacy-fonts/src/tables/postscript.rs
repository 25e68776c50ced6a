//! PostScript (CFF) common tables.
//!
//! This holds the pieces shared by everything that reads Type 1C data: the
//! INDEX container, the operand stack and interpreter, the DICT and Type 2
//! charstring operator handlers and the charset, encoding and FDSelect
//! substructures.

pub mod charset;
pub mod charstring;
pub mod dict;
pub mod encoding;
pub mod fd_select;
mod index;
pub mod interpreter;
mod stack;
mod string;

use core::fmt;

use crate::read::ReadError;

pub use charset::Charset;
pub use charstring::{evaluate, BoundsSink, CommandSink};
pub use dict::{PrivateDict, TopDict};
pub use encoding::Encoding;
pub use fd_select::{FdRange, FdSelect};
pub use index::{Index, MAX_SUBROUTINES};
pub use interpreter::{Context, Flow, Handler, Interpreter, Opcode, NESTING_DEPTH_LIMIT};
pub use stack::{Number, Stack, MAX_STACK};
pub use string::{StringId, STANDARD_STRINGS};

/// Errors that are specific to PostScript processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The first header byte was not a supported major version.
    BadMagic(u8),
    /// The `off_size` field in an INDEX contained an invalid value.
    InvalidIndexOffsetSize(u8),
    /// An INDEX contained a zero offset.
    ZeroOffsetInIndex,
    /// An INDEX offset did not increase or pointed past the data.
    InvalidOffset,
    /// A charset, encoding or FDSelect used an unknown format.
    InvalidFormat(u8),
    /// A malformed operand.
    InvalidNumber,
    /// Valid data that exceeds our limits or uses an unsupported feature.
    Unsupported(&'static str),
    /// An operator that is not defined for the current context.
    InvalidOperator(u8, bool),
    StackOverflow,
    StackUnderflow,
    InvalidStackAccess(usize),
    ExpectedI32StackEntry(usize),
    CallStackOverflow,
    CallStackUnderflow,
    InvalidSubroutineIndex(i32),
    MissingSubroutines,
    InvalidStringId(u16),
    InvalidFontIndex(u32),
    /// A font set that does not hold exactly one font.
    InvalidFontCount(u32),
    InvalidGlyph(u32),
    MissingCharstrings,
    MissingPrivateDict,
    /// Underlying parsing error.
    Read(ReadError),
}

impl From<ReadError> for Error {
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic(major) => {
                write!(f, "unsupported CFF major version {major} (expected 1)")
            }
            Self::InvalidIndexOffsetSize(size) => {
                write!(f, "invalid offset size of {size} for INDEX (expected 1-4)")
            }
            Self::ZeroOffsetInIndex => {
                write!(f, "invalid offset of 0 in INDEX (must be >= 1)")
            }
            Self::InvalidOffset => write!(f, "INDEX offsets are not increasing or out of bounds"),
            Self::InvalidFormat(format) => write!(f, "invalid format {format}"),
            Self::InvalidNumber => write!(f, "number is in an invalid format"),
            Self::Unsupported(what) => write!(f, "unsupported CFF data: {what}"),
            Self::InvalidOperator(op, is_escaped) => {
                if *is_escaped {
                    write!(f, "invalid operator 12 {op} for this context")
                } else {
                    write!(f, "invalid operator {op} for this context")
                }
            }
            Self::StackOverflow => {
                write!(f, "attempted to push a value to a full stack")
            }
            Self::StackUnderflow => {
                write!(f, "attempted to pop a value from an empty stack")
            }
            Self::InvalidStackAccess(index) => {
                write!(f, "invalid stack access for index {index}")
            }
            Self::ExpectedI32StackEntry(index) => {
                write!(f, "attempted to read an integer at stack index {index}, but found a fixed point value")
            }
            Self::CallStackOverflow => write!(
                f,
                "exceeded subroutine nesting depth limit of {NESTING_DEPTH_LIMIT}"
            ),
            Self::CallStackUnderflow => write!(f, "return outside of a subroutine"),
            Self::InvalidSubroutineIndex(index) => {
                write!(f, "attempted to access an invalid subroutine at index {index}")
            }
            Self::MissingSubroutines => {
                write!(f, "encountered a callsubr operator without a local subroutine index")
            }
            Self::InvalidStringId(sid) => write!(f, "string id {sid} is out of range"),
            Self::InvalidFontIndex(index) => {
                write!(f, "font DICT index {index} is out of range")
            }
            Self::InvalidFontCount(count) => {
                write!(f, "expected a single font but the font set holds {count}")
            }
            Self::InvalidGlyph(gid) => write!(f, "glyph {gid} is not in the font"),
            Self::MissingCharstrings => write!(f, "the font has no CharStrings INDEX"),
            Self::MissingPrivateDict => write!(f, "the font has no Private DICT"),
            Self::Read(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
