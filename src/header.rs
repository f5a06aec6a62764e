//! Shell link header parsing.
//!
//! The header is the first 76 bytes (0x4C) of every shortcut. Its flags
//! decide which of the optional structures follow it.

use crate::error::{LnkError, Result};
use crate::guid::Guid;
use crate::timestamp::FileTime;
use crate::utils::ByteReader;
use std::fmt;

/// Size of the shell link header in bytes; also its first field.
pub const HEADER_SIZE: usize = 0x4C;

/// On-disk bytes of the shell link class identifier
/// 00021401-0000-0000-C000-000000000046.
pub const LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

/// Link flags describing which structures are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataFlags(pub u32);

impl DataFlags {
    /// A target ID list follows the header.
    pub const HAS_TARGET_ID_LIST: u32 = 0x0000_0001;
    /// A link info structure is present.
    pub const HAS_LINK_INFO: u32 = 0x0000_0002;
    /// A name string is present.
    pub const HAS_NAME: u32 = 0x0000_0004;
    /// A relative path string is present.
    pub const HAS_RELATIVE_PATH: u32 = 0x0000_0008;
    /// A working directory string is present.
    pub const HAS_WORKING_DIR: u32 = 0x0000_0010;
    /// A command line arguments string is present.
    pub const HAS_ARGUMENTS: u32 = 0x0000_0020;
    /// An icon location string is present.
    pub const HAS_ICON_LOCATION: u32 = 0x0000_0040;
    /// String data is UTF-16.
    pub const IS_UNICODE: u32 = 0x0000_0080;
    /// Link info is ignored even if present.
    pub const FORCE_NO_LINK_INFO: u32 = 0x0000_0100;
    /// An environment variable block is present.
    pub const HAS_EXP_STRING: u32 = 0x0000_0200;
    /// Run a 16-bit target in a separate VM.
    pub const RUN_IN_SEPARATE_PROCESS: u32 = 0x0000_0400;
    /// A Darwin block is present.
    pub const HAS_DARWIN_ID: u32 = 0x0000_1000;
    /// Run the target as a different user.
    pub const RUN_AS_USER: u32 = 0x0000_2000;
    /// An icon environment block is present.
    pub const HAS_EXP_ICON: u32 = 0x0000_4000;
    /// The file system location is a representation of the shell namespace item.
    pub const NO_PIDL_ALIAS: u32 = 0x0000_8000;
    /// A shim block is present.
    pub const RUN_WITH_SHIM_LAYER: u32 = 0x0002_0000;
    /// The tracker block is ignored.
    pub const FORCE_NO_LINK_TRACK: u32 = 0x0004_0000;
    /// Target metadata is collected into the property store.
    pub const ENABLE_TARGET_METADATA: u32 = 0x0008_0000;
    /// The environment variable block is ignored.
    pub const DISABLE_LINK_PATH_TRACKING: u32 = 0x0010_0000;
    /// Special and known folder blocks are ignored.
    pub const DISABLE_KNOWN_FOLDER_TRACKING: u32 = 0x0020_0000;
    /// The unaliased known folder ID list is used.
    pub const DISABLE_KNOWN_FOLDER_ALIAS: u32 = 0x0040_0000;
    /// The target may itself be a link.
    pub const ALLOW_LINK_TO_LINK: u32 = 0x0080_0000;
    /// The unaliased form of the ID list is saved.
    pub const UNALIAS_ON_SAVE: u32 = 0x0100_0000;
    /// The target is resolved from the environment block path.
    pub const PREFER_ENVIRONMENT_PATH: u32 = 0x0200_0000;
    /// The local ID list is kept for UNC targets.
    pub const KEEP_LOCAL_ID_LIST_FOR_UNC_TARGET: u32 = 0x0400_0000;

    const NAMES: &'static [(u32, &'static str)] = &[
        (Self::HAS_TARGET_ID_LIST, "HasTargetIdList"),
        (Self::HAS_LINK_INFO, "HasLinkInfo"),
        (Self::HAS_NAME, "HasName"),
        (Self::HAS_RELATIVE_PATH, "HasRelativePath"),
        (Self::HAS_WORKING_DIR, "HasWorkingDir"),
        (Self::HAS_ARGUMENTS, "HasArguments"),
        (Self::HAS_ICON_LOCATION, "HasIconLocation"),
        (Self::IS_UNICODE, "IsUnicode"),
        (Self::FORCE_NO_LINK_INFO, "ForceNoLinkInfo"),
        (Self::HAS_EXP_STRING, "HasExpString"),
        (Self::RUN_IN_SEPARATE_PROCESS, "RunInSeparateProcess"),
        (Self::HAS_DARWIN_ID, "HasDarwinId"),
        (Self::RUN_AS_USER, "RunAsUser"),
        (Self::HAS_EXP_ICON, "HasExpIcon"),
        (Self::NO_PIDL_ALIAS, "NoPidlAlias"),
        (Self::RUN_WITH_SHIM_LAYER, "RunWithShimLayer"),
        (Self::FORCE_NO_LINK_TRACK, "ForceNoLinkTrack"),
        (Self::ENABLE_TARGET_METADATA, "EnableTargetMetadata"),
        (Self::DISABLE_LINK_PATH_TRACKING, "DisableLinkPathTracking"),
        (Self::DISABLE_KNOWN_FOLDER_TRACKING, "DisableKnownFolderTracking"),
        (Self::DISABLE_KNOWN_FOLDER_ALIAS, "DisableKnownFolderAlias"),
        (Self::ALLOW_LINK_TO_LINK, "AllowLinkToLink"),
        (Self::UNALIAS_ON_SAVE, "UnaliasOnSave"),
        (Self::PREFER_ENVIRONMENT_PATH, "PreferEnvironmentPath"),
        (Self::KEEP_LOCAL_ID_LIST_FOR_UNC_TARGET, "KeepLocalIdListForUncTarget"),
    ];

    /// Creates flags from a raw value.
    pub fn new(flags: u32) -> Self {
        Self(flags)
    }

    /// Returns true if `flag` is set.
    pub fn has_flag(&self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Returns true if a target ID list follows the header.
    pub fn has_target_id_list(&self) -> bool {
        self.has_flag(Self::HAS_TARGET_ID_LIST)
    }

    /// Returns true if a link info structure should be decoded.
    pub fn has_link_info(&self) -> bool {
        self.has_flag(Self::HAS_LINK_INFO) && !self.has_flag(Self::FORCE_NO_LINK_INFO)
    }

    /// Returns true if string data is UTF-16.
    pub fn is_unicode(&self) -> bool {
        self.has_flag(Self::IS_UNICODE)
    }

    /// Names of the set flags, in bit order.
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(bit, _)| self.has_flag(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for DataFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

/// Standard Windows file attribute bits of the link target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileAttributes(pub u32);

impl FileAttributes {
    /// Read-only.
    pub const READONLY: u32 = 0x0000_0001;
    /// Hidden.
    pub const HIDDEN: u32 = 0x0000_0002;
    /// System.
    pub const SYSTEM: u32 = 0x0000_0004;
    /// Directory.
    pub const DIRECTORY: u32 = 0x0000_0010;
    /// Archive.
    pub const ARCHIVE: u32 = 0x0000_0020;
    /// Device.
    pub const DEVICE: u32 = 0x0000_0040;
    /// Normal.
    pub const NORMAL: u32 = 0x0000_0080;
    /// Temporary.
    pub const TEMPORARY: u32 = 0x0000_0100;
    /// Sparse file.
    pub const SPARSE_FILE: u32 = 0x0000_0200;
    /// Reparse point.
    pub const REPARSE_POINT: u32 = 0x0000_0400;
    /// Compressed.
    pub const COMPRESSED: u32 = 0x0000_0800;
    /// Offline.
    pub const OFFLINE: u32 = 0x0000_1000;
    /// Not content indexed.
    pub const NOT_CONTENT_INDEXED: u32 = 0x0000_2000;
    /// Encrypted.
    pub const ENCRYPTED: u32 = 0x0000_4000;
    /// Integrity stream.
    pub const INTEGRITY_STREAM: u32 = 0x0000_8000;
    /// Virtual.
    pub const VIRTUAL: u32 = 0x0001_0000;
    /// No scrub data.
    pub const NO_SCRUB_DATA: u32 = 0x0002_0000;
    /// Recall on open.
    pub const RECALL_ON_OPEN: u32 = 0x0004_0000;
    /// Pinned.
    pub const PINNED: u32 = 0x0008_0000;
    /// Unpinned.
    pub const UNPINNED: u32 = 0x0010_0000;
    /// Recall on data access.
    pub const RECALL_ON_DATA_ACCESS: u32 = 0x0040_0000;

    const NAMES: &'static [(u32, &'static str)] = &[
        (Self::READONLY, "FILE_ATTRIBUTE_READONLY"),
        (Self::HIDDEN, "FILE_ATTRIBUTE_HIDDEN"),
        (Self::SYSTEM, "FILE_ATTRIBUTE_SYSTEM"),
        (Self::DIRECTORY, "FILE_ATTRIBUTE_DIRECTORY"),
        (Self::ARCHIVE, "FILE_ATTRIBUTE_ARCHIVE"),
        (Self::DEVICE, "FILE_ATTRIBUTE_DEVICE"),
        (Self::NORMAL, "FILE_ATTRIBUTE_NORMAL"),
        (Self::TEMPORARY, "FILE_ATTRIBUTE_TEMPORARY"),
        (Self::SPARSE_FILE, "FILE_ATTRIBUTE_SPARSE_FILE"),
        (Self::REPARSE_POINT, "FILE_ATTRIBUTE_REPARSE_POINT"),
        (Self::COMPRESSED, "FILE_ATTRIBUTE_COMPRESSED"),
        (Self::OFFLINE, "FILE_ATTRIBUTE_OFFLINE"),
        (Self::NOT_CONTENT_INDEXED, "FILE_ATTRIBUTE_NOT_CONTENT_INDEXED"),
        (Self::ENCRYPTED, "FILE_ATTRIBUTE_ENCRYPTED"),
        (Self::INTEGRITY_STREAM, "FILE_ATTRIBUTE_INTEGRITY_STREAM"),
        (Self::VIRTUAL, "FILE_ATTRIBUTE_VIRTUAL"),
        (Self::NO_SCRUB_DATA, "FILE_ATTRIBUTE_NO_SCRUB_DATA"),
        (Self::RECALL_ON_OPEN, "FILE_ATTRIBUTE_RECALL_ON_OPEN"),
        (Self::PINNED, "FILE_ATTRIBUTE_PINNED"),
        (Self::UNPINNED, "FILE_ATTRIBUTE_UNPINNED"),
        (Self::RECALL_ON_DATA_ACCESS, "FILE_ATTRIBUTE_RECALL_ON_DATA_ACCESS"),
    ];

    /// Creates attributes from a raw value.
    pub fn new(attributes: u32) -> Self {
        Self(attributes)
    }

    /// Returns true if `flag` is set.
    pub fn has_flag(&self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Returns true if the target is a directory.
    pub fn is_directory(&self) -> bool {
        self.has_flag(Self::DIRECTORY)
    }

    /// Names of the set attributes.
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(bit, _)| self.has_flag(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for FileAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

/// Expected window state of the launched application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ShowCommand {
    /// SW_SHOWNORMAL.
    Normal,
    /// SW_SHOWMAXIMIZED.
    Maximized,
    /// SW_SHOWMINNOACTIVE.
    MinNoActive,
    /// Any other value; consumers treat it as normal.
    Unknown(u32),
}

impl ShowCommand {
    /// Maps the raw header value.
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => ShowCommand::Normal,
            3 => ShowCommand::Maximized,
            7 => ShowCommand::MinNoActive,
            other => ShowCommand::Unknown(other),
        }
    }

    /// Raw header value.
    pub fn as_u32(&self) -> u32 {
        match self {
            ShowCommand::Normal => 1,
            ShowCommand::Maximized => 3,
            ShowCommand::MinNoActive => 7,
            ShowCommand::Unknown(value) => *value,
        }
    }

    /// Readable description of the window state.
    pub fn description(&self) -> &'static str {
        crate::descriptions::show_command_description(self.as_u32())
    }

    /// Windows constant name.
    pub fn name(&self) -> String {
        match self {
            ShowCommand::Normal => "SwNormal".to_string(),
            ShowCommand::Maximized => "SwShowmaximized".to_string(),
            ShowCommand::MinNoActive => "SwShowminnoactive".to_string(),
            ShowCommand::Unknown(value) => format!("Unknown ({})", value),
        }
    }
}

impl fmt::Display for ShowCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Keyboard shortcut: virtual key code plus modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HotKey {
    /// Virtual key code (low byte).
    pub key: u8,
    /// Modifier mask (high byte): Shift 1, Ctrl 2, Alt 4.
    pub modifiers: u8,
}

impl HotKey {
    /// Shift modifier.
    pub const SHIFT: u8 = 0x01;
    /// Control modifier.
    pub const CONTROL: u8 = 0x02;
    /// Alt modifier.
    pub const ALT: u8 = 0x04;

    /// Splits the raw 16-bit field.
    pub fn from_u16(value: u16) -> Self {
        Self {
            key: (value & 0xFF) as u8,
            modifiers: (value >> 8) as u8,
        }
    }

    /// Returns true if no key is assigned.
    pub fn is_empty(&self) -> bool {
        self.key == 0
    }

    /// Name of the key code, if it has one.
    pub fn key_name(&self) -> Option<String> {
        match self.key {
            0x00 => None,
            k @ 0x30..=0x39 | k @ 0x41..=0x5A => Some((k as char).to_string()),
            k @ 0x70..=0x87 => Some(format!("F{}", k - 0x6F)),
            0x90 => Some("NumLock".to_string()),
            0x91 => Some("ScrollLock".to_string()),
            k => Some(format!("{:#04x}", k)),
        }
    }
}

impl fmt::Display for HotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(key) = self.key_name() else {
            return write!(f, "No hotkey");
        };

        let mut parts = Vec::new();
        if self.modifiers & Self::CONTROL != 0 {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers & Self::ALT != 0 {
            parts.push("Alt".to_string());
        }
        if self.modifiers & Self::SHIFT != 0 {
            parts.push("Shift".to_string());
        }
        parts.push(key);
        write!(f, "{}", parts.join("+"))
    }
}

/// Shell link header.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShellLinkHeader {
    /// Header size, always 0x4C.
    pub header_size: u32,

    /// Class identifier, always 00021401-0000-0000-C000-000000000046.
    pub class_id: Guid,

    /// Flags selecting the optional structures.
    pub data_flags: DataFlags,

    /// Attributes of the target.
    pub file_attributes: FileAttributes,

    /// Target creation time.
    pub creation_time: FileTime,

    /// Target last access time.
    pub access_time: FileTime,

    /// Target last write time.
    pub write_time: FileTime,

    /// Low 32 bits of the target size.
    pub file_size: u32,

    /// Index of the icon within the icon location.
    pub icon_index: i32,

    /// Window state on launch.
    pub show_command: ShowCommand,

    /// Keyboard shortcut.
    pub hot_key: HotKey,
}

impl ShellLinkHeader {
    /// Parses the header from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is shorter than 76 bytes
    /// - Header size or class identifier do not match
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(LnkError::FileTooSmall {
                size: data.len(),
                minimum: HEADER_SIZE,
            });
        }

        let mut reader = ByteReader::new(&data[..HEADER_SIZE]);

        let header_size = reader.read_u32()?;
        if header_size as usize != HEADER_SIZE {
            return Err(LnkError::invalid_signature(
                &(HEADER_SIZE as u32).to_le_bytes(),
                &header_size.to_le_bytes(),
            ));
        }

        let class_id = reader.read_guid()?;
        if class_id.as_bytes() != &LINK_CLSID {
            return Err(LnkError::invalid_signature(&LINK_CLSID, class_id.as_bytes()));
        }

        let data_flags = DataFlags::new(reader.read_u32()?);
        let file_attributes = FileAttributes::new(reader.read_u32()?);
        let creation_time = reader.read_filetime()?;
        let access_time = reader.read_filetime()?;
        let write_time = reader.read_filetime()?;
        let file_size = reader.read_u32()?;
        let icon_index = reader.read_i32()?;
        let show_command = ShowCommand::from_u32(reader.read_u32()?);
        let hot_key = HotKey::from_u16(reader.read_u16()?);
        // Reserved: u16, u32, u32

        Ok(ShellLinkHeader {
            header_size,
            class_id,
            data_flags,
            file_attributes,
            creation_time,
            access_time,
            write_time,
            file_size,
            icon_index,
            show_command,
            hot_key,
        })
    }
}

impl fmt::Display for ShellLinkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Shell Link Header:\n\
             - Flags: {}\n\
             - Attributes: {}\n\
             - Created: {}\n\
             - Modified: {}\n\
             - Accessed: {}\n\
             - File Size: {} bytes\n\
             - Show Command: {}",
            self.data_flags,
            self.file_attributes,
            self.creation_time,
            self.write_time,
            self.access_time,
            self.file_size,
            self.show_command
        )
    }
}
