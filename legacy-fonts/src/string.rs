//! Borrowed Latin-1 strings.

/// Reference to a Latin-1 encoded string.
///
/// Strings stored in PCF properties and glyph name tables as well as in
/// PostScript fonts are usually ASCII but are technically encoded in Latin-1.
/// This type wraps the raw string data to prevent attempts to decode as UTF-8.
///
/// This implements `PartialEq<&str>` to support easy comparison with UTF-8
/// strings.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Latin1String<'a> {
    chars: &'a [u8],
}

impl<'a> Latin1String<'a> {
    /// Creates a new Latin-1 encoded string reference from the given bytes,
    /// with each representing a character.
    pub const fn new(chars: &'a [u8]) -> Self {
        Self { chars }
    }

    /// Returns an iterator over the characters of the string.
    ///
    /// This simply converts each byte to `char`.
    pub fn chars(&self) -> impl Iterator<Item = char> + Clone + 'a {
        self.chars.iter().map(|b| *b as char)
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.chars
    }

    pub const fn len(&self) -> usize {
        self.chars.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Reads a NUL terminated string starting at `start` in `blob`.
    ///
    /// Returns `None` if `start` is out of bounds or the string is not
    /// terminated.
    pub(crate) fn from_c_str(blob: &'a [u8], start: usize) -> Option<Self> {
        let tail = blob.get(start..)?;
        let len = tail.iter().position(|b| *b == 0)?;
        Some(Self::new(&tail[..len]))
    }
}

// Consistent with the derived `Eq`/`Ord`/`Hash`, which compare the bytes.
impl core::borrow::Borrow<[u8]> for Latin1String<'_> {
    fn borrow(&self) -> &[u8] {
        self.chars
    }
}

impl PartialEq<&str> for Latin1String<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.chars().eq(other.chars())
    }
}

impl core::fmt::Display for Latin1String<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for ch in self.chars() {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Latin1String;

    #[test]
    fn lets_latin1() {
        let latin1 = Latin1String::new(&[223, 214, 209, 208]);
        let utf8 = "ßÖÑÐ";
        assert_ne!(latin1.as_bytes(), utf8.as_bytes());
        assert_eq!(latin1, utf8);
        assert_eq!(latin1.to_string(), utf8);
    }

    #[test]
    fn c_strings() {
        let blob = b"FOUNDRY\0Adobe\0dangling";
        assert_eq!(Latin1String::from_c_str(blob, 0).unwrap(), "FOUNDRY");
        assert_eq!(Latin1String::from_c_str(blob, 8).unwrap(), "Adobe");
        assert_eq!(Latin1String::from_c_str(blob, 7).unwrap(), "");
        assert!(Latin1String::from_c_str(blob, 14).is_none());
        assert!(Latin1String::from_c_str(blob, 100).is_none());
    }
}
