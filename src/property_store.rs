//! Serialized property store parsing.
//!
//! A property store is a sequence of storages ("sheets"), each tagged with a
//! format GUID and holding typed values keyed either by a numeric property id
//! or, for one special format, by a string name. Stores appear inside shell
//! items and in the property store extra data block.
//!
//! ```text
//! [Storage size u32]  0 ends the store
//! [Version "1SPS"]
//! [Format ID GUID]
//! [Value entries]
//!   [Value size u32]  0 ends the storage
//!   [Id u32 | Name size u32]
//!   [Reserved u8]
//!   [Name UTF-16]     named storages only
//!   [Type u16][Padding u16][Value]
//! ```

use crate::descriptions;
use crate::error::{LnkError, Result};
use crate::guid::Guid;
use crate::timestamp::FileTime;
use crate::utils::{decode_ansi, until_nul, ByteReader};
use std::fmt;

/// Storage version signature, "1SPS".
pub const STORAGE_VERSION: u32 = 0x5350_5331;

/// Format ID whose storages key values by string name
/// (D5CDD505-2E9C-101B-9397-08002B2CF9AE).
pub const STRING_NAMED_FORMAT_ID: Guid = Guid::from_bytes([
    0x05, 0xD5, 0xCD, 0xD5, 0x9C, 0x2E, 0x1B, 0x10, 0x93, 0x97, 0x08, 0x00, 0x2B, 0x2C, 0xF9, 0xAE,
]);

/// Size of a storage header: size, version and format ID.
pub const STORAGE_HEADER_SIZE: u32 = 24;

/// Smallest numeric entry: size, id, reserved byte, type and padding.
const MIN_ENTRY_SIZE: u32 = 13;

/// Property key within a storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PropertyKey {
    /// Numeric property id.
    Id(u32),
    /// String name, used by the string-named format.
    Name(String),
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Id(id) => write!(f, "{}", id),
            PropertyKey::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Typed property value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PropertyValue {
    /// VT_EMPTY.
    Empty,
    /// VT_NULL.
    Null,
    /// VT_I1.
    I1(i8),
    /// VT_I2.
    I2(i16),
    /// VT_I4 / VT_INT.
    I4(i32),
    /// VT_I8.
    I8(i64),
    /// VT_UI1.
    U1(u8),
    /// VT_UI2.
    U2(u16),
    /// VT_UI4 / VT_UINT.
    U4(u32),
    /// VT_UI8.
    U8(u64),
    /// VT_R4.
    R4(f32),
    /// VT_R8.
    R8(f64),
    /// VT_BOOL.
    Bool(bool),
    /// VT_BSTR, VT_LPSTR, VT_LPWSTR.
    String(String),
    /// VT_FILETIME.
    FileTime(FileTime),
    /// VT_CLSID.
    Guid(Guid),
    /// VT_BLOB.
    Blob(Vec<u8>),
    /// Any other type, kept as raw bytes.
    Unknown {
        /// VARTYPE tag.
        vartype: u16,
        /// Bytes following the type header.
        data: Vec<u8>,
    },
}

impl PropertyValue {
    /// VT_EMPTY.
    pub const VT_EMPTY: u16 = 0x0000;
    /// VT_NULL.
    pub const VT_NULL: u16 = 0x0001;
    /// VT_I2.
    pub const VT_I2: u16 = 0x0002;
    /// VT_I4.
    pub const VT_I4: u16 = 0x0003;
    /// VT_R4.
    pub const VT_R4: u16 = 0x0004;
    /// VT_R8.
    pub const VT_R8: u16 = 0x0005;
    /// VT_BSTR.
    pub const VT_BSTR: u16 = 0x0008;
    /// VT_BOOL.
    pub const VT_BOOL: u16 = 0x000B;
    /// VT_I1.
    pub const VT_I1: u16 = 0x0010;
    /// VT_UI1.
    pub const VT_UI1: u16 = 0x0011;
    /// VT_UI2.
    pub const VT_UI2: u16 = 0x0012;
    /// VT_UI4.
    pub const VT_UI4: u16 = 0x0013;
    /// VT_I8.
    pub const VT_I8: u16 = 0x0014;
    /// VT_UI8.
    pub const VT_UI8: u16 = 0x0015;
    /// VT_INT.
    pub const VT_INT: u16 = 0x0016;
    /// VT_UINT.
    pub const VT_UINT: u16 = 0x0017;
    /// VT_LPSTR.
    pub const VT_LPSTR: u16 = 0x001E;
    /// VT_LPWSTR.
    pub const VT_LPWSTR: u16 = 0x001F;
    /// VT_FILETIME.
    pub const VT_FILETIME: u16 = 0x0040;
    /// VT_BLOB.
    pub const VT_BLOB: u16 = 0x0041;
    /// VT_CLSID.
    pub const VT_CLSID: u16 = 0x0048;

    /// Parses a typed value (type tag, padding, payload).
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let vartype = reader.read_u16()?;
        reader.skip(2)?;

        let value = match vartype {
            Self::VT_EMPTY => PropertyValue::Empty,
            Self::VT_NULL => PropertyValue::Null,
            Self::VT_I1 => PropertyValue::I1(reader.read_u8()? as i8),
            Self::VT_I2 => PropertyValue::I2(reader.read_i16()?),
            Self::VT_I4 | Self::VT_INT => PropertyValue::I4(reader.read_i32()?),
            Self::VT_I8 => PropertyValue::I8(reader.read_i64()?),
            Self::VT_UI1 => PropertyValue::U1(reader.read_u8()?),
            Self::VT_UI2 => PropertyValue::U2(reader.read_u16()?),
            Self::VT_UI4 | Self::VT_UINT => PropertyValue::U4(reader.read_u32()?),
            Self::VT_UI8 => PropertyValue::U8(reader.read_u64()?),
            Self::VT_R4 => PropertyValue::R4(reader.read_f32()?),
            Self::VT_R8 => PropertyValue::R8(reader.read_f64()?),
            Self::VT_BOOL => PropertyValue::Bool(reader.read_u16()? != 0),
            Self::VT_BSTR => {
                let len = reader.read_u32()? as usize;
                PropertyValue::String(reader.read_fixed_utf16(len)?)
            }
            Self::VT_LPSTR => {
                let len = reader.read_u32()? as usize;
                let bytes = reader.read_bytes(len)?;
                PropertyValue::String(decode_ansi(until_nul(bytes), reader.encoding()))
            }
            Self::VT_LPWSTR => {
                let chars = reader.read_u32()? as usize;
                PropertyValue::String(reader.read_utf16(chars)?)
            }
            Self::VT_FILETIME => PropertyValue::FileTime(reader.read_filetime()?),
            Self::VT_BLOB => {
                let len = reader.read_u32()? as usize;
                PropertyValue::Blob(reader.read_bytes(len)?.to_vec())
            }
            Self::VT_CLSID => PropertyValue::Guid(reader.read_guid()?),
            other => PropertyValue::Unknown {
                vartype: other,
                data: reader.read_to_end().to_vec(),
            },
        };

        Ok(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Empty | PropertyValue::Null => Ok(()),
            PropertyValue::I1(v) => write!(f, "{}", v),
            PropertyValue::I2(v) => write!(f, "{}", v),
            PropertyValue::I4(v) => write!(f, "{}", v),
            PropertyValue::I8(v) => write!(f, "{}", v),
            PropertyValue::U1(v) => write!(f, "{}", v),
            PropertyValue::U2(v) => write!(f, "{}", v),
            PropertyValue::U4(v) => write!(f, "{}", v),
            PropertyValue::U8(v) => write!(f, "{}", v),
            PropertyValue::R4(v) => write!(f, "{}", v),
            PropertyValue::R8(v) => write!(f, "{}", v),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::FileTime(ft) => write!(f, "{}", ft),
            PropertyValue::Guid(guid) => write!(f, "{}", guid),
            PropertyValue::Blob(data) => write!(f, "{}", hex::encode(data)),
            PropertyValue::Unknown { vartype, data } => {
                write!(f, "Unknown type {:#06x}: {}", vartype, hex::encode(data))
            }
        }
    }
}

/// One key/value entry of a storage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Property {
    /// Property id or name.
    pub key: PropertyKey,
    /// Typed value.
    pub value: PropertyValue,
}

/// One storage ("sheet") of a property store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertySheet {
    /// Declared storage size.
    pub size: u32,
    /// Format identifier.
    pub format_id: Guid,
    /// Entries in file order.
    pub properties: Vec<Property>,
}

impl PropertySheet {
    /// Parses one storage. The reader must be bounded by the storage size.
    pub fn parse(storage: &mut ByteReader<'_>) -> Result<Self> {
        let size = storage.read_u32()?;
        let version = storage.read_u32()?;
        if version != STORAGE_VERSION {
            return Err(LnkError::invalid_signature(
                &STORAGE_VERSION.to_le_bytes(),
                &version.to_le_bytes(),
            ));
        }

        let format_id = storage.read_guid()?;
        let named = format_id == STRING_NAMED_FORMAT_ID;

        let mut properties = Vec::new();
        while storage.remaining() >= 4 {
            let value_size = storage.peek_u32()?;
            if value_size == 0 {
                storage.skip(4)?;
                break;
            }
            if value_size < MIN_ENTRY_SIZE {
                return Err(LnkError::format_error(format!(
                    "Property entry size {} below minimum {} at offset {:#x}",
                    value_size,
                    MIN_ENTRY_SIZE,
                    storage.position()
                )));
            }

            let mut entry = storage.sub_reader(value_size as usize)?;
            entry.skip(4)?;

            let key = if named {
                let name_size = entry.read_u32()? as usize;
                entry.skip(1)?;
                PropertyKey::Name(entry.read_fixed_utf16(name_size)?)
            } else {
                let id = entry.read_u32()?;
                entry.skip(1)?;
                PropertyKey::Id(id)
            };

            let value = PropertyValue::parse(&mut entry)?;
            properties.push(Property { key, value });
        }

        Ok(PropertySheet {
            size,
            format_id,
            properties,
        })
    }

    /// Value of a numeric property.
    pub fn get_id(&self, id: u32) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.key == PropertyKey::Id(id))
            .map(|p| &p.value)
    }

    /// Value of a named property.
    pub fn get_name(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| matches!(&p.key, PropertyKey::Name(n) if n == name))
            .map(|p| &p.value)
    }

    /// Canonical name of a key, e.g. `System.VolumeId`, when known.
    pub fn key_name(&self, key: &PropertyKey) -> Option<String> {
        match key {
            PropertyKey::Id(id) => descriptions::property_name(&self.format_id, *id).map(String::from),
            PropertyKey::Name(name) => Some(name.clone()),
        }
    }
}

/// A decoded property store.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyStore {
    /// Storages in file order.
    pub sheets: Vec<PropertySheet>,
}

impl PropertyStore {
    /// Parses a property store from `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::from_reader(&mut ByteReader::new(data))
    }

    /// Parses storages from the reader until a terminator or the end of input.
    ///
    /// A storage size below the storage header size ends the store.
    pub fn from_reader(reader: &mut ByteReader<'_>) -> Result<Self> {
        let mut sheets = Vec::new();

        while reader.remaining() >= 4 {
            let size = reader.peek_u32()?;
            if size < STORAGE_HEADER_SIZE {
                reader.skip(4)?;
                break;
            }

            let mut storage = reader.sub_reader(size as usize)?;
            sheets.push(PropertySheet::parse(&mut storage)?);
        }

        Ok(PropertyStore { sheets })
    }

    /// Returns true if no storage was decoded.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
