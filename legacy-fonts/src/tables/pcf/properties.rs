//! The properties table: named atoms and integers carried over from BDF.

use alloc::{collections::BTreeMap, vec::Vec};

use super::{Error, TableFormat, MAX_PROPERTIES};
use crate::{font_data::Cursor, read::ReadError, string::Latin1String};

/// The value of a font property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property<'a> {
    Atom(Latin1String<'a>),
    Integer(i32),
}

impl<'a> Property<'a> {
    pub fn as_atom(&self) -> Option<Latin1String<'a>> {
        match self {
            Property::Atom(atom) => Some(*atom),
            Property::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Property::Integer(value) => Some(*value),
            Property::Atom(_) => None,
        }
    }
}

/// The properties of a font, keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties<'a> {
    entries: BTreeMap<Latin1String<'a>, Property<'a>>,
}

impl<'a> Properties<'a> {
    pub fn get(&self, name: &str) -> Option<&Property<'a>> {
        self.entries.get(name.as_bytes())
    }

    /// Returns the property with the given name if it is an atom.
    pub fn atom(&self, name: &str) -> Option<Latin1String<'a>> {
        self.get(name).and_then(Property::as_atom)
    }

    /// Returns the property with the given name if it is an integer.
    pub fn integer(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(Property::as_integer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (Latin1String<'a>, Property<'a>)> + '_ {
        self.entries.iter().map(|(name, value)| (*name, *value))
    }
}

struct RawProperty {
    name_offset: u32,
    is_string: bool,
    value: u32,
}

/// Parses a properties table, positioned after the format word.
pub(super) fn parse<'a>(
    cursor: &mut Cursor<'a>,
    format: TableFormat,
) -> Result<Properties<'a>, Error> {
    let order = format.byte_order();
    let count = cursor.read_u32(order)?;
    if count > MAX_PROPERTIES {
        return Err(Error::Unsupported("too many properties"));
    }
    let raw = (0..count)
        .map(|_| {
            Ok(RawProperty {
                name_offset: cursor.read_u32(order)?,
                is_string: cursor.read_u8()? == 1,
                value: cursor.read_u32(order)?,
            })
        })
        .collect::<Result<Vec<_>, ReadError>>()?;
    if count & 3 != 0 {
        cursor.skip(4 - (count & 3) as usize)?;
    }
    let strings_len = cursor.read_u32(order)?;
    let strings = cursor.read_bytes(strings_len as usize)?;
    let string_at = |offset: u32| {
        Latin1String::from_c_str(strings, offset as usize)
            .ok_or(ReadError::MalformedData("invalid property string"))
    };
    let mut entries = BTreeMap::new();
    for prop in raw {
        let name = string_at(prop.name_offset)?;
        let value = if prop.is_string {
            Property::Atom(string_at(prop.value)?)
        } else {
            Property::Integer(prop.value as i32)
        };
        entries.insert(name, value);
    }
    Ok(Properties { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FontData;

    fn properties_table(props: &[(u32, bool, u32)], strings: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(props.len() as u32).to_le_bytes());
        for (name, is_string, value) in props {
            bytes.extend_from_slice(&name.to_le_bytes());
            bytes.push(*is_string as u8);
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        if props.len() & 3 != 0 {
            bytes.extend(std::iter::repeat(0).take(4 - (props.len() & 3)));
        }
        bytes.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        bytes.extend_from_slice(strings);
        bytes
    }

    #[test]
    fn atoms_and_integers() {
        let strings = b"FOUNDRY\0Misc\0POINT_SIZE\0";
        let bytes = properties_table(&[(0, true, 8), (13, false, (-120i32) as u32)], strings);
        let data = FontData::new(&bytes);
        let props = parse(&mut data.cursor(), TableFormat::new(0)).unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props.atom("FOUNDRY").unwrap(), "Misc");
        assert_eq!(props.integer("POINT_SIZE"), Some(-120));
        assert_eq!(props.atom("POINT_SIZE"), None);
        assert!(props.get("FAMILY_NAME").is_none());
    }

    #[test]
    fn unterminated_string() {
        let bytes = properties_table(&[(0, true, 8)], b"FOUNDRY\0Misc");
        let data = FontData::new(&bytes);
        assert!(matches!(
            parse(&mut data.cursor(), TableFormat::new(0)),
            Err(Error::Read(ReadError::MalformedData(_)))
        ));
    }

    #[test]
    fn property_limit() {
        let bytes = 513u32.to_le_bytes();
        let data = FontData::new(&bytes);
        assert!(matches!(
            parse(&mut data.cursor(), TableFormat::new(0)),
            Err(Error::Unsupported(_))
        ));
    }
}
