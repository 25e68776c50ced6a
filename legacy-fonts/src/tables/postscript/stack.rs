//! The argument stack shared by DICT and charstring programs.

use font_types::Fixed;

use super::Error;

/// Capacity of the argument stack.
///
/// This is the CFF2 limit, which also covers the 48 operand DICT and Type 2
/// charstring limits.
pub const MAX_STACK: usize = 513;

/// A DICT or charstring operand.
///
/// Operands are either integers or 16.16 fixed point values. The kind is
/// decided by the encoding when pushing, while the operator decides which
/// kind it wants when reading.
///
/// See "Table 6 Operand Types" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf>
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Number {
    I32(i32),
    Fixed(Fixed),
}

impl Number {
    fn to_fixed(self) -> Fixed {
        match self {
            Self::I32(value) => Fixed::from_i32(value),
            Self::Fixed(value) => value,
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Self::I32(0)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<Fixed> for Number {
    fn from(value: Fixed) -> Self {
        Self::Fixed(value)
    }
}

impl core::fmt::Display for Number {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I32(value) => value.fmt(f),
            Self::Fixed(value) => value.fmt(f),
        }
    }
}

/// Fixed capacity operand stack.
///
/// Entries below `top` are live. Entries removed with [`Stack::pop_n`] stay
/// in place so that handlers can read the operands of the operator they are
/// processing.
pub struct Stack {
    entries: [Number; MAX_STACK],
    top: usize,
    // high water mark for reads of popped operands
    filled: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            entries: [Number::I32(0); MAX_STACK],
            top: 0,
            filled: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn len(&self) -> usize {
        self.top
    }

    /// True when the stack holds an odd number of operands.
    ///
    /// The first stack clearing charstring operator uses this to detect a
    /// leading advance width.
    pub fn len_is_odd(&self) -> bool {
        self.top % 2 == 1
    }

    pub fn clear(&mut self) {
        self.top = 0;
        self.filled = 0;
    }

    pub fn push(&mut self, number: impl Into<Number>) -> Result<(), Error> {
        let slot = self
            .entries
            .get_mut(self.top)
            .ok_or(Error::StackOverflow)?;
        *slot = number.into();
        self.top += 1;
        self.filled = self.top;
        Ok(())
    }

    fn entry(&self, index: usize) -> Result<Number, Error> {
        if index < self.filled {
            Ok(self.entries[index])
        } else {
            Err(Error::InvalidStackAccess(index))
        }
    }

    /// Reads the operand at `index` as an integer.
    ///
    /// Fixed point operands are rejected rather than truncated, matching
    /// FreeType.
    pub fn get_i32(&self, index: usize) -> Result<i32, Error> {
        match self.entry(index)? {
            Number::I32(value) => Ok(value),
            Number::Fixed(_) => Err(Error::ExpectedI32StackEntry(index)),
        }
    }

    /// Reads the operand at `index` as a 16.16 value, converting integers.
    pub fn get_fixed(&self, index: usize) -> Result<Fixed, Error> {
        self.entry(index).map(Number::to_fixed)
    }

    /// Reads `N` consecutive operands starting at `first`.
    pub fn fixed_array<const N: usize>(&self, first: usize) -> Result<[Fixed; N], Error> {
        let end = first.checked_add(N).ok_or(Error::StackUnderflow)?;
        if end > self.top {
            return Err(Error::StackUnderflow);
        }
        let mut result = [Fixed::ZERO; N];
        for (dest, src) in result.iter_mut().zip(&self.entries[first..end]) {
            *dest = src.to_fixed();
        }
        Ok(result)
    }

    pub fn pop_i32(&mut self) -> Result<i32, Error> {
        let index = self.pop_n(1)?;
        self.get_i32(index)
    }

    /// Removes the top `count` operands, returning the index of the lowest
    /// one removed.
    pub fn pop_n(&mut self, count: usize) -> Result<usize, Error> {
        self.top = self.top.checked_sub(count).ok_or(Error::StackUnderflow)?;
        Ok(self.top)
    }

    /// The live operands, bottom first.
    pub fn number_values(&self) -> impl Iterator<Item = Number> + '_ {
        self.entries[..self.top].iter().copied()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
