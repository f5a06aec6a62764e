//! Link info structure parsing.
//!
//! Link info records where the target lived when the shortcut was created:
//! a local volume (drive type, serial number, label, base path) and/or a
//! network share. Every offset inside it is relative to the start of the
//! link info structure, so each decoder here works on its own sub-slice.

use crate::descriptions;
use crate::error::Result;
use crate::utils::ByteReader;
use std::fmt;
use tracing::debug;

/// Header size of a link info structure without Unicode path offsets.
pub const LINK_INFO_HEADER_SIZE: u32 = 0x1C;

/// Minimum header size carrying the Unicode path offsets.
pub const LINK_INFO_UNICODE_HEADER_SIZE: u32 = 0x24;

/// Which location structures are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LocationFlags(pub u32);

impl LocationFlags {
    /// Volume ID and local base path are present.
    pub const VOLUME_ID_AND_LOCAL_BASE_PATH: u32 = 0x1;
    /// Common network relative link and path suffix are present.
    pub const COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX: u32 = 0x2;

    /// Returns true if the target is on a local volume.
    pub fn has_volume_id(&self) -> bool {
        self.0 & Self::VOLUME_ID_AND_LOCAL_BASE_PATH != 0
    }

    /// Returns true if the target is on a network share.
    pub fn has_network_link(&self) -> bool {
        self.0 & Self::COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX != 0
    }
}

impl fmt::Display for LocationFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.has_volume_id() {
            names.push("VolumeIdAndLocalBasePath");
        }
        if self.has_network_link() {
            names.push("CommonNetworkRelativeLinkAndPathSuffix");
        }
        write!(f, "{}", names.join(", "))
    }
}

/// Type of the drive holding the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DriveType {
    /// DRIVE_UNKNOWN.
    Unknown,
    /// DRIVE_NO_ROOT_DIR.
    NoRootDir,
    /// DRIVE_REMOVABLE.
    Removable,
    /// DRIVE_FIXED.
    Fixed,
    /// DRIVE_REMOTE.
    Remote,
    /// DRIVE_CDROM.
    CdRom,
    /// DRIVE_RAMDISK.
    RamDisk,
    /// Value outside the documented range.
    Other(u32),
}

impl DriveType {
    /// Maps the raw volume ID value.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => DriveType::Unknown,
            1 => DriveType::NoRootDir,
            2 => DriveType::Removable,
            3 => DriveType::Fixed,
            4 => DriveType::Remote,
            5 => DriveType::CdRom,
            6 => DriveType::RamDisk,
            other => DriveType::Other(other),
        }
    }

    /// Raw value.
    pub fn as_u32(&self) -> u32 {
        match self {
            DriveType::Unknown => 0,
            DriveType::NoRootDir => 1,
            DriveType::Removable => 2,
            DriveType::Fixed => 3,
            DriveType::Remote => 4,
            DriveType::CdRom => 5,
            DriveType::RamDisk => 6,
            DriveType::Other(value) => *value,
        }
    }
}

impl fmt::Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", descriptions::drive_type_description(self.as_u32()))
    }
}

/// Volume the target was stored on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VolumeInfo {
    /// Declared size of the volume ID structure.
    pub size: u32,
    /// Drive type.
    pub drive_type: DriveType,
    /// Volume serial number.
    pub serial_number: u32,
    /// Volume label (Unicode when stored that way).
    pub label: String,
}

impl VolumeInfo {
    /// Parses a volume ID from the start of `reader`.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let size = reader.peek_u32()?;
        let mut volume = reader.sub_reader(size as usize)?;
        volume.skip(4)?;

        let drive_type = DriveType::from_u32(volume.read_u32()?);
        let serial_number = volume.read_u32()?;
        let label_offset = volume.read_u32()?;

        let label = if label_offset == 0x14 {
            let unicode_offset = volume.read_u32()?;
            volume.seek(unicode_offset as usize)?;
            volume.read_utf16_nul()?
        } else {
            volume.seek(label_offset as usize)?;
            volume.read_ansi_nul()?
        };

        Ok(VolumeInfo {
            size,
            drive_type,
            serial_number,
            label,
        })
    }

    /// Serial number in the usual `XXXXXXXX` form.
    pub fn serial_number_hex(&self) -> String {
        format!("{:08X}", self.serial_number)
    }
}

/// Flags of the common network relative link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShareFlags(pub u32);

impl ShareFlags {
    /// The device name field is valid.
    pub const VALID_DEVICE: u32 = 0x1;
    /// The network provider type field is valid.
    pub const VALID_NET_TYPE: u32 = 0x2;

    /// Returns true if the device name is valid.
    pub fn valid_device(&self) -> bool {
        self.0 & Self::VALID_DEVICE != 0
    }

    /// Returns true if the provider type is valid.
    pub fn valid_net_type(&self) -> bool {
        self.0 & Self::VALID_NET_TYPE != 0
    }
}

impl fmt::Display for ShareFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.valid_device() {
            names.push("ValidDevice");
        }
        if self.valid_net_type() {
            names.push("ValidNetType");
        }
        write!(f, "{}", names.join(", "))
    }
}

/// Network provider type (WNNC_NET_* value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkProviderType(pub u32);

impl NetworkProviderType {
    /// Provider name, e.g. `WNNC_NET_LANMAN`.
    pub fn name(&self) -> Option<&'static str> {
        descriptions::network_provider_name(self.0)
    }
}

impl fmt::Display for NetworkProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// Network share the target was stored on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkShareInfo {
    /// Declared size of the structure.
    pub size: u32,
    /// Share flags.
    pub flags: ShareFlags,
    /// Share name, e.g. `\\server\share`.
    pub share_name: String,
    /// Mapped device, e.g. `Z:`, when valid.
    pub device_name: Option<String>,
    /// Provider type, when valid.
    pub provider_type: Option<NetworkProviderType>,
}

impl NetworkShareInfo {
    /// Parses a common network relative link from the start of `reader`.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let size = reader.peek_u32()?;
        let mut link = reader.sub_reader(size as usize)?;
        link.skip(4)?;

        let flags = ShareFlags(link.read_u32()?);
        let net_name_offset = link.read_u32()?;
        let device_name_offset = link.read_u32()?;
        let provider_raw = link.read_u32()?;

        let unicode_offsets = if net_name_offset > 0x14 {
            Some((link.read_u32()?, link.read_u32()?))
        } else {
            None
        };

        let share_name = match unicode_offsets {
            Some((net_unicode, _)) if net_unicode != 0 => {
                link.seek(net_unicode as usize)?;
                link.read_utf16_nul()?
            }
            _ => {
                link.seek(net_name_offset as usize)?;
                link.read_ansi_nul()?
            }
        };

        let device_name = if flags.valid_device() {
            match unicode_offsets {
                Some((_, device_unicode)) if device_unicode != 0 => {
                    link.seek(device_unicode as usize)?;
                    Some(link.read_utf16_nul()?)
                }
                _ => {
                    link.seek(device_name_offset as usize)?;
                    Some(link.read_ansi_nul()?)
                }
            }
        } else {
            None
        };

        let provider_type = flags
            .valid_net_type()
            .then_some(NetworkProviderType(provider_raw));

        Ok(NetworkShareInfo {
            size,
            flags,
            share_name,
            device_name,
            provider_type,
        })
    }
}

/// Link info structure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkInfo {
    /// Declared total size.
    pub size: u32,
    /// Header size (0x1C, or >= 0x24 with Unicode offsets).
    pub header_size: u32,
    /// Location flags.
    pub flags: LocationFlags,
    /// Local volume, when present.
    pub volume_info: Option<VolumeInfo>,
    /// Local base path in the ANSI code page.
    pub local_base_path: Option<String>,
    /// Local base path in UTF-16, when the header carries the offset.
    pub local_base_path_unicode: Option<String>,
    /// Network share, when present.
    pub network_share_info: Option<NetworkShareInfo>,
    /// Common path suffix in the ANSI code page.
    pub common_path_suffix: Option<String>,
    /// Common path suffix in UTF-16, when the header carries the offset.
    pub common_path_suffix_unicode: Option<String>,
}

impl LinkInfo {
    /// Parses a link info structure starting at the reader's cursor. The
    /// reader advances by the declared size.
    ///
    /// # Errors
    ///
    /// Returns an error if the declared size or any offset points past the
    /// end of the structure.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let size = reader.peek_u32()?;
        let mut info = reader.sub_reader(size as usize)?;
        info.skip(4)?;

        let header_size = info.read_u32()?;
        let flags = LocationFlags(info.read_u32()?);
        let volume_id_offset = info.read_u32()?;
        let local_base_path_offset = info.read_u32()?;
        let network_link_offset = info.read_u32()?;
        let common_path_suffix_offset = info.read_u32()?;

        let (local_unicode_offset, suffix_unicode_offset) =
            if header_size >= LINK_INFO_UNICODE_HEADER_SIZE {
                (info.read_u32()?, info.read_u32()?)
            } else {
                (0, 0)
            };

        debug!(
            size,
            header_size,
            flags = flags.0,
            "Parsing link info"
        );

        let mut volume_info = None;
        let mut local_base_path = None;
        let mut local_base_path_unicode = None;
        if flags.has_volume_id() {
            info.seek(volume_id_offset as usize)?;
            volume_info = Some(VolumeInfo::parse(&mut info)?);

            local_base_path = read_ansi_at(&mut info, local_base_path_offset)?;
            local_base_path_unicode = read_utf16_at(&mut info, local_unicode_offset)?;
        }

        let mut network_share_info = None;
        if flags.has_network_link() {
            info.seek(network_link_offset as usize)?;
            network_share_info = Some(NetworkShareInfo::parse(&mut info)?);
        }

        let common_path_suffix = read_ansi_at(&mut info, common_path_suffix_offset)?;
        let common_path_suffix_unicode = read_utf16_at(&mut info, suffix_unicode_offset)?;

        Ok(LinkInfo {
            size,
            header_size,
            flags,
            volume_info,
            local_base_path,
            local_base_path_unicode,
            network_share_info,
            common_path_suffix,
            common_path_suffix_unicode,
        })
    }

    /// Local base path, preferring the Unicode form.
    pub fn local_path(&self) -> Option<&str> {
        self.local_base_path_unicode
            .as_deref()
            .or(self.local_base_path.as_deref())
    }

    /// Common path suffix, preferring the Unicode form.
    pub fn common_path(&self) -> Option<&str> {
        self.common_path_suffix_unicode
            .as_deref()
            .or(self.common_path_suffix.as_deref())
    }

    /// Full target path: the local base path or the share name, joined with
    /// the common path suffix.
    pub fn target_path(&self) -> Option<String> {
        let base = self
            .local_path()
            .filter(|p| !p.is_empty())
            .or_else(|| {
                self.network_share_info
                    .as_ref()
                    .map(|share| share.share_name.as_str())
            })?;

        match self.common_path().filter(|s| !s.is_empty()) {
            Some(suffix) if base.ends_with('\\') => Some(format!("{}{}", base, suffix)),
            Some(suffix) => Some(format!("{}\\{}", base, suffix)),
            None => Some(base.to_string()),
        }
    }
}

/// Reads a NUL-terminated ANSI string at a structure offset; 0 means absent.
fn read_ansi_at(reader: &mut ByteReader<'_>, offset: u32) -> Result<Option<String>> {
    if offset == 0 {
        return Ok(None);
    }
    reader.seek(offset as usize)?;
    reader.read_ansi_nul().map(Some)
}

/// Reads a NUL-terminated UTF-16 string at a structure offset; 0 means absent.
fn read_utf16_at(reader: &mut ByteReader<'_>, offset: u32) -> Result<Option<String>> {
    if offset == 0 {
        return Ok(None);
    }
    reader.seek(offset as usize)?;
    reader.read_utf16_nul().map(Some)
}
