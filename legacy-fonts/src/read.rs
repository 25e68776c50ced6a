//! Scalar decoding and the low-level read error

/// The byte order of multi-byte values in a table.
///
/// CFF data is always big-endian; each PCF table chooses its order in its
/// format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

/// A fixed-width integer that can be decoded from raw bytes in either order.
pub trait ReadScalar: Sized {
    /// The size of the encoded value, in bytes.
    const RAW_BYTE_LEN: usize;

    /// Decode a value from the front of `bytes`.
    ///
    /// Returns `None` if `bytes` is too short.
    fn read(bytes: &[u8], order: ByteOrder) -> Option<Self>;
}

macro_rules! impl_read_scalar {
    ($($ty:ty),*) => {
        $(
            impl ReadScalar for $ty {
                const RAW_BYTE_LEN: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn read(bytes: &[u8], order: ByteOrder) -> Option<Self> {
                    let raw = bytes.get(..Self::RAW_BYTE_LEN)?.try_into().ok()?;
                    Some(match order {
                        ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                        ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                    })
                }
            }
        )*
    };
}

impl_read_scalar!(u8, i8, u16, i16, u32, i32);

/// An error that occurs when reading font data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// A read would run past the end of the data.
    Truncated,
    /// A seek target lies outside of the data.
    InvalidOffset(usize),
    // i64 is flexible enough to store any value we might encounter
    InvalidFormat(i64),
    MalformedData(&'static str),
}

impl core::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadError::Truncated => write!(f, "Unexpected end of data"),
            ReadError::InvalidOffset(pos) => write!(f, "Offset {pos} is out of bounds"),
            ReadError::InvalidFormat(x) => write!(f, "Invalid format '{x}'"),
            ReadError::MalformedData(msg) => write!(f, "Malformed data: '{msg}'"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReadError {}
