//! A buffer for assembling binary test data in either byte order.

/// The byte order used when writing scalars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// A value that can be written to a [`ByteBuffer`].
pub trait Scalar: Copy {
    fn write_to(self, endian: Endian, out: &mut Vec<u8>);
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                fn write_to(self, endian: Endian, out: &mut Vec<u8>) {
                    match endian {
                        Endian::Big => out.extend_from_slice(&self.to_be_bytes()),
                        Endian::Little => out.extend_from_slice(&self.to_le_bytes()),
                    }
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32);

/// A convenience type for generating a buffer of bytes.
#[derive(Clone, Debug)]
pub struct ByteBuffer {
    endian: Endian,
    data: Vec<u8>,
}

impl ByteBuffer {
    /// Creates a buffer that writes big-endian scalars.
    pub fn be() -> Self {
        Self::new(Endian::Big)
    }

    /// Creates a buffer that writes little-endian scalars.
    pub fn le() -> Self {
        Self::new(Endian::Little)
    }

    pub fn new(endian: Endian) -> Self {
        Self {
            endian,
            data: Vec::new(),
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// The current length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return a reference to the contents of the buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        item.write_to(self.endian, &mut self.data);
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            item.write_to(self.endian, &mut self.data);
        }
        self
    }

    /// Pads with zeros up to a multiple of `alignment` bytes.
    pub fn align(mut self, alignment: usize) -> Self {
        while self.data.len() % alignment != 0 {
            self.data.push(0);
        }
        self
    }
}

impl std::ops::Deref for ByteBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_order() {
        let be = ByteBuffer::be().push(0x0102u16).push(-2i32);
        assert_eq!(be.data(), &[1, 2, 0xFF, 0xFF, 0xFF, 0xFE]);
        let le = ByteBuffer::le().push(0x0102u16).extend([1u8, 2]).align(8);
        assert_eq!(le.data(), &[2, 1, 1, 2, 0, 0, 0, 0]);
    }
}
