//! Shell link decoding.
//!
//! A shortcut file is laid out as:
//!
//! ```text
//! [Shell link header - 76 bytes]
//! [Target ID list]          when HasTargetIdList
//! [Link info]               when HasLinkInfo
//! [String data]             name, relative path, working dir, arguments, icon
//! [Extra data blocks]       until a terminal block
//! ```

use crate::error::{LnkError, Result};
use crate::extension::MftInformation;
use crate::extra_data::{decode_extra_data, ExtraData, ExtraDataBlock, TrackerBlock};
use crate::header::{DataFlags, ShellLinkHeader, HEADER_SIZE};
use crate::link_info::{LinkInfo, NetworkShareInfo, VolumeInfo};
use crate::property_store::PropertyStore;
use crate::shell_item::{absolute_path, decode_id_list, ShellItem};
use crate::utils::ByteReader;
use chrono::{DateTime, Utc};
use encoding_rs::{Encoding, WINDOWS_1252};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Decoder settings.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Code page for strings stored without the IsUnicode flag.
    pub ansi_encoding: &'static Encoding,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ansi_encoding: WINDOWS_1252,
        }
    }
}

impl ParseOptions {
    /// Options using the code page named by `label` (e.g. `"cp1251"`).
    ///
    /// # Errors
    ///
    /// Returns [`LnkError::InvalidFormat`] if the label is not a known encoding.
    pub fn with_encoding_label(label: &str) -> Result<Self> {
        let ansi_encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| LnkError::format_error(format!("Unknown code page label {:?}", label)))?;
        Ok(Self { ansi_encoding })
    }
}

/// Where a shortcut was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SourceInfo {
    /// Path of the .lnk file.
    pub path: PathBuf,
    /// Filesystem creation time of the .lnk file.
    pub created: Option<DateTime<Utc>>,
    /// Filesystem modification time of the .lnk file.
    pub modified: Option<DateTime<Utc>>,
    /// Filesystem access time of the .lnk file.
    pub accessed: Option<DateTime<Utc>>,
    /// Size of the .lnk file in bytes.
    pub size: u64,
}

impl SourceInfo {
    /// Captures path and metadata of an opened file.
    pub fn from_metadata(path: &Path, metadata: &std::fs::Metadata) -> Self {
        Self {
            path: path.to_path_buf(),
            created: metadata.created().ok().map(DateTime::<Utc>::from),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            accessed: metadata.accessed().ok().map(DateTime::<Utc>::from),
            size: metadata.len(),
        }
    }
}

/// A decoded shortcut.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Link {
    /// Fixed header.
    pub header: ShellLinkHeader,
    /// Volume and network location of the target.
    pub link_info: Option<LinkInfo>,
    /// Description.
    pub name: Option<String>,
    /// Target path relative to the .lnk file.
    pub relative_path: Option<String>,
    /// Working directory.
    pub working_directory: Option<String>,
    /// Command line arguments.
    pub arguments: Option<String>,
    /// Icon location.
    pub icon_location: Option<String>,
    /// Shell items of the target ID list.
    pub target_id_list: Vec<ShellItem>,
    /// Declared size of the target ID list.
    pub target_id_list_size: Option<u16>,
    /// Extra data blocks in file order.
    pub extra_data: Vec<ExtraDataBlock>,
    /// Provenance, when known.
    pub source: Option<SourceInfo>,
}

impl Link {
    /// Opens and decodes a shortcut file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid shortcut.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lnk_parser::Link;
    ///
    /// let link = Link::open("notepad.lnk").unwrap();
    /// println!("{:?}", link.target_path());
    /// ```
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, &ParseOptions::default())
    }

    /// Opens and decodes a shortcut file with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening shortcut");
        let file = File::open(path)?;
        let metadata = file.metadata()?;

        let file_size = metadata.len() as usize;
        if file_size < HEADER_SIZE {
            return Err(LnkError::FileTooSmall {
                size: file_size,
                minimum: HEADER_SIZE,
            });
        }

        // SAFETY: the file is opened read-only, its size has been checked to
        // be at least HEADER_SIZE, and the map is dropped before this
        // function returns.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(size = mmap.len(), "Memory mapped shortcut file");

        let link = Self::parse_with_options(&mmap, options)?;
        Ok(link.with_source(SourceInfo::from_metadata(path, &metadata)))
    }

    /// Decodes a shortcut from a byte buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with_options(data, &ParseOptions::default())
    }

    /// Alias for [`Link::parse`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(data)
    }

    /// Decodes a shortcut from a byte buffer with explicit options.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The buffer is shorter than the header
    /// - The header size or class identifier do not match
    /// - A structure selected by the data flags runs past the end of the buffer
    #[instrument(skip(data, options), fields(len = data.len()))]
    pub fn parse_with_options(data: &[u8], options: &ParseOptions) -> Result<Self> {
        let header = ShellLinkHeader::parse(data)?;
        let flags = header.data_flags;
        debug!(flags = flags.0, "Parsed shell link header");

        let mut reader = ByteReader::with_encoding(data, options.ansi_encoding);
        reader.seek(HEADER_SIZE)?;

        let (target_id_list_size, target_id_list) = if flags.has_target_id_list() {
            let (size, items) = decode_id_list(&mut reader)?;
            debug!(size, items = items.len(), "Decoded target ID list");
            (Some(size), items)
        } else {
            (None, Vec::new())
        };

        let link_info = if flags.has_link_info() {
            Some(LinkInfo::parse(&mut reader)?)
        } else if flags.has_flag(DataFlags::HAS_LINK_INFO) {
            // ForceNoLinkInfo: present on disk but ignored
            let size = reader.peek_u32()?;
            reader.skip(size as usize)?;
            debug!(size, "Skipped link info");
            None
        } else {
            None
        };

        let unicode = flags.is_unicode();
        let mut read_string = |flag| read_string_data(&mut reader, flags, flag, unicode);
        let name = read_string(DataFlags::HAS_NAME)?;
        let relative_path = read_string(DataFlags::HAS_RELATIVE_PATH)?;
        let working_directory = read_string(DataFlags::HAS_WORKING_DIR)?;
        let arguments = read_string(DataFlags::HAS_ARGUMENTS)?;
        let icon_location = read_string(DataFlags::HAS_ICON_LOCATION)?;

        let extra_data = decode_extra_data(&mut reader);
        debug!(blocks = extra_data.len(), "Decoded extra data");

        Ok(Link {
            header,
            link_info,
            name,
            relative_path,
            working_directory,
            arguments,
            icon_location,
            target_id_list,
            target_id_list_size,
            extra_data,
            source: None,
        })
    }

    /// Attaches provenance.
    pub fn with_source(mut self, source: SourceInfo) -> Self {
        self.source = Some(source);
        self
    }

    /// Local volume of the target.
    pub fn volume_info(&self) -> Option<&VolumeInfo> {
        self.link_info.as_ref()?.volume_info.as_ref()
    }

    /// Network share of the target.
    pub fn network_share_info(&self) -> Option<&NetworkShareInfo> {
        self.link_info.as_ref()?.network_share_info.as_ref()
    }

    /// Local base path, preferring the Unicode form.
    pub fn local_path(&self) -> Option<&str> {
        self.link_info.as_ref()?.local_path()
    }

    /// Common path suffix, preferring the Unicode form.
    pub fn common_path(&self) -> Option<&str> {
        self.link_info.as_ref()?.common_path()
    }

    /// Target path from the link info.
    pub fn target_path(&self) -> Option<String> {
        self.link_info.as_ref()?.target_path()
    }

    /// Target ID list rendered as a path.
    pub fn target_id_path(&self) -> Option<String> {
        if self.target_id_list.is_empty() {
            None
        } else {
            Some(absolute_path(&self.target_id_list))
        }
    }

    /// NTFS file reference of the target.
    ///
    /// Taken from the last target ID list item that records a non-zero MFT
    /// entry in its extension blocks.
    pub fn target_mft(&self) -> Option<MftInformation> {
        self.target_id_list
            .iter()
            .rev()
            .filter_map(|item| item.file_entry()?.mft())
            .find(|mft| mft.entry_number().is_some())
    }

    /// First block with the given signature.
    pub fn extra_data_block(&self, signature: u32) -> Option<&ExtraDataBlock> {
        self.extra_data.iter().find(|b| b.signature == signature)
    }

    /// Distributed link tracker data.
    pub fn tracker(&self) -> Option<&TrackerBlock> {
        self.extra_data.iter().find_map(|b| match &b.kind {
            ExtraData::Tracker(tracker) => Some(tracker),
            _ => None,
        })
    }

    /// Property stores from the extra data and from target ID list items.
    pub fn property_stores(&self) -> Vec<&PropertyStore> {
        let blocks = self.extra_data.iter().filter_map(|b| match &b.kind {
            ExtraData::PropertyStore(store) => Some(store),
            _ => None,
        });
        let items = self
            .target_id_list
            .iter()
            .filter_map(ShellItem::property_store);
        blocks.chain(items).collect()
    }

    /// Renders the link as pretty-printed JSON, with the derived
    /// `target_mft` alongside the decoded fields.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "target_mft".to_string(),
                serde_json::to_value(self.target_mft())?,
            );
        }
        serde_json::to_string_pretty(&value)
    }
}

/// Reads one string data entry when `flag` is set: a u16 character count
/// followed by the characters.
fn read_string_data(
    reader: &mut ByteReader<'_>,
    flags: DataFlags,
    flag: u32,
    unicode: bool,
) -> Result<Option<String>> {
    if !flags.has_flag(flag) {
        return Ok(None);
    }

    let count = reader.read_u16()? as usize;
    let text = if unicode {
        reader.read_utf16(count)?
    } else {
        reader.read_ansi(count)?
    };

    Ok(Some(text.trim_end_matches('\0').to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::LINK_CLSID;

    fn header(flags: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[0] = 0x4C;
        data[4..20].copy_from_slice(&LINK_CLSID);
        data[20..24].copy_from_slice(&flags.to_le_bytes());
        data[24..28].copy_from_slice(&0x20u32.to_le_bytes());
        data
    }

    #[test]
    fn test_minimal_header() {
        let link = Link::parse(&header(0)).unwrap();
        assert_eq!(link.header.data_flags.0, 0);
        assert_eq!(link.header.file_attributes.0, 0x20);
        assert!(link.link_info.is_none());
        assert!(link.name.is_none());
        assert!(link.target_id_list.is_empty());
        assert!(link.target_id_list_size.is_none());
        assert!(link.extra_data.is_empty());
        assert!(link.source.is_none());
    }

    #[test]
    fn test_ansi_name() {
        let mut data = header(DataFlags::HAS_NAME);
        data.extend_from_slice(&[5, 0]);
        data.extend_from_slice(b"test\0");

        let link = Link::parse(&data).unwrap();
        assert_eq!(link.name.as_deref(), Some("test"));
        assert!(link.relative_path.is_none());
        assert!(link.arguments.is_none());
        assert!(link.extra_data.is_empty());
    }

    #[test]
    fn test_unicode_strings_in_order() {
        let mut data = header(
            DataFlags::IS_UNICODE | DataFlags::HAS_WORKING_DIR | DataFlags::HAS_ARGUMENTS,
        );
        for text in ["C:\\Windows", "/c dir"] {
            data.extend_from_slice(&(text.len() as u16).to_le_bytes());
            for unit in text.encode_utf16() {
                data.extend_from_slice(&unit.to_le_bytes());
            }
        }

        let link = Link::parse(&data).unwrap();
        assert_eq!(link.working_directory.as_deref(), Some("C:\\Windows"));
        assert_eq!(link.arguments.as_deref(), Some("/c dir"));
        assert!(link.name.is_none());
    }

    #[test]
    fn test_ansi_code_page() {
        let mut data = header(DataFlags::HAS_ARGUMENTS);
        data.extend_from_slice(&[4, 0, 0xCF, 0xF0, 0xE8, 0xE2]);

        let options = ParseOptions::with_encoding_label("cp1251").unwrap();
        let link = Link::parse_with_options(&data, &options).unwrap();
        assert_eq!(link.arguments.as_deref(), Some("Прив"));

        let link = Link::parse(&data).unwrap();
        assert_eq!(link.arguments.as_deref(), Some("Ïðèâ"));
    }

    #[test]
    fn test_unknown_encoding_label() {
        assert!(ParseOptions::with_encoding_label("not-a-code-page").is_err());
    }

    #[test]
    fn test_truncated_id_list() {
        let data = header(DataFlags::HAS_TARGET_ID_LIST);
        let err = Link::parse(&data).unwrap_err();
        assert!(err.is_truncation());
    }

    #[test]
    fn test_truncated_string() {
        let mut data = header(DataFlags::HAS_NAME);
        data.extend_from_slice(&[10, 0, b'a']);
        assert!(matches!(
            Link::parse(&data),
            Err(LnkError::TruncatedData { .. })
        ));
    }

    #[test]
    fn test_bad_clsid() {
        let mut data = header(0);
        data[4] = 0;
        assert!(matches!(
            Link::parse(&data),
            Err(LnkError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(
            Link::parse(&[0x4C, 0, 0, 0]),
            Err(LnkError::FileTooSmall { size: 4, minimum: 76 })
        ));
    }

    #[test]
    fn test_forced_no_link_info_is_skipped() {
        let mut data = header(
            DataFlags::HAS_LINK_INFO | DataFlags::FORCE_NO_LINK_INFO | DataFlags::HAS_NAME,
        );
        let mut info = vec![0u8; 0x1C];
        info[0] = 0x1C;
        info[4] = 0x1C;
        data.extend_from_slice(&info);
        data.extend_from_slice(&[2, 0, b'o', b'k']);

        let link = Link::parse(&data).unwrap();
        assert!(link.link_info.is_none());
        assert_eq!(link.name.as_deref(), Some("ok"));
    }

    #[test]
    fn test_tracker_accessor() {
        let mut data = header(0);
        data.extend_from_slice(&[16, 0, 0, 0, 5, 0, 0, 160, 38, 0, 0, 0, 177, 0, 0, 0]);
        data.extend_from_slice(&[0, 0, 0, 0]);

        let link = Link::parse(&data).unwrap();
        assert!(link.tracker().is_none());
        assert!(link
            .extra_data_block(crate::extra_data::SPECIAL_FOLDER_SIGNATURE)
            .is_some());
        assert!(link.property_stores().is_empty());
    }
}
