//! Shell item (ID list) decoding.
//!
//! An ID list is a chain of length-prefixed shell items terminated by a
//! zero size. The first byte after the size is a class type indicator that
//! selects the item layout. Offsets in this module are from the start of the
//! item, size prefix included.
//!
//! ```text
//! [Size u16]          includes itself; 0 ends the list
//! [Type u8]
//! [Type specific data]
//! [Extension blocks]  optional, 0xBEEFxxxx
//! ```

use crate::descriptions;
use crate::error::{LnkError, Result};
use crate::extension::{
    decode_extension_blocks, find_extension_start, ExtensionBlock, FileEntryExtension,
    MftInformation,
};
use crate::guid::Guid;
use crate::header::FileAttributes;
use crate::property_store::PropertyStore;
use crate::timestamp::{DosDateTime, FileTime};
use crate::utils::{
    decode_ansi, find_bytes, read_u16_le, read_u32_le, read_utf16_string, until_nul,
    until_nul_utf16, ByteReader,
};
use encoding_rs::Encoding;
use std::fmt;
use tracing::{debug, trace, warn};

/// Property store version signature as it appears in item data.
const PROPERTY_STORE_SIGNATURE: &[u8] = b"1SPS";

/// Signature preceding an embedded GUID in property view items (0x23FEBBEE).
const PROPERTY_VIEW_GUID_SIGNATURE: &[u8] = &[0xEE, 0xBB, 0xFE, 0x23];

/// Delegate item signature.
const DELEGATE_SIGNATURE: &[u8] = b"CFSF";

type ItemDecoder = fn(&mut ByteReader<'_>) -> Result<ShellItemKind>;

/// Decoders as (type mask, type value, decoder), tried in order.
static DECODERS: &[(u8, u8, ItemDecoder)] = &[
    (0xFF, 0x1F, decode_root_folder),
    (0xFF, 0x2E, decode_users_property_view),
    (0xFF, 0x00, decode_property_view),
    (0xFF, 0x01, decode_control_panel_category),
    (0xFF, 0x61, decode_uri),
    (0xFF, 0x71, decode_control_panel),
    (0xFF, 0x74, decode_delegate),
    (0x70, 0x20, decode_drive),
    (0x70, 0x30, decode_file_entry),
    (0x70, 0x40, decode_network_location),
];

/// Root folder (0x1F).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RootFolder {
    /// Sort index.
    pub sort_index: u8,
    /// Shell folder identifier.
    pub guid: Guid,
    /// Property store found in the trailing data.
    pub property_store: Option<PropertyStore>,
    /// Extension blocks found in the trailing data.
    pub extensions: Vec<ExtensionBlock>,
}

impl RootFolder {
    /// Description of the sort index.
    pub fn sort_index_name(&self) -> &'static str {
        match self.sort_index {
            0x00 => "Internet Explorer",
            0x42 => "Libraries",
            0x44 => "Users",
            0x48 => "My Documents",
            0x50 => "My Computer",
            0x58 => "My Network Places",
            0x60 => "Recycle Bin",
            0x68 => "Internet Explorer",
            0x80 => "My Games",
            _ => "Unknown",
        }
    }
}

/// Users property view (0x2E).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UsersPropertyView {
    /// Folder identifier, for items without a property store.
    pub guid: Option<Guid>,
    /// Embedded property store.
    pub property_store: Option<PropertyStore>,
    /// Extension blocks after the store.
    pub extensions: Vec<ExtensionBlock>,
}

/// Property view (0x00).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PropertyView {
    /// Embedded identifier, when the item carries one.
    pub guid: Option<Guid>,
    /// Embedded property store.
    pub property_store: Option<PropertyStore>,
    /// Extension blocks.
    pub extensions: Vec<ExtensionBlock>,
}

/// File or directory entry (class 0x30).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileEntry {
    /// Class type indicator, e.g. 0x31 directory or 0x32 file.
    pub entry_type: u8,
    /// File size, zero for directories.
    pub file_size: u32,
    /// Last modification time (FAT).
    pub modified: DosDateTime,
    /// File attributes.
    pub attributes: FileAttributes,
    /// Primary (short) name.
    pub primary_name: String,
    /// Extension blocks.
    pub extensions: Vec<ExtensionBlock>,
}

impl FileEntry {
    /// Returns true for directory entries.
    pub fn is_directory(&self) -> bool {
        self.entry_type & 0x01 != 0
    }

    /// Returns true if the primary name is stored as UTF-16.
    pub fn is_unicode(&self) -> bool {
        self.entry_type & 0x04 != 0
    }

    /// The 0xBEEF0004 extension, if present.
    pub fn file_extension(&self) -> Option<&FileEntryExtension> {
        self.extensions.iter().find_map(|block| block.file_entry())
    }

    /// Long name from the extension block, falling back to the primary name.
    pub fn name(&self) -> &str {
        match self.file_extension() {
            Some(ext) if !ext.long_name.is_empty() => &ext.long_name,
            _ => &self.primary_name,
        }
    }

    /// Creation time from the extension block.
    pub fn created(&self) -> Option<DosDateTime> {
        self.file_extension().map(|ext| ext.created)
    }

    /// Last access time from the extension block.
    pub fn accessed(&self) -> Option<DosDateTime> {
        self.file_extension().map(|ext| ext.accessed)
    }

    /// MFT reference from the extension block.
    pub fn mft(&self) -> Option<MftInformation> {
        self.file_extension().and_then(|ext| ext.mft)
    }
}

/// Network location (class 0x40).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkLocation {
    /// Content flags.
    pub flags: u8,
    /// Location, e.g. a UNC path.
    pub location: String,
    /// Description, when flag 0x80 is set.
    pub description: Option<String>,
    /// Comments, when flag 0x40 is set.
    pub comments: Option<String>,
}

/// Compressed folder (zip) contents.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ZipContents {
    /// Folder name within the archive.
    pub name: String,
    /// Second name, when present.
    pub second_name: Option<String>,
}

/// Control panel item (0x71).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ControlPanel {
    /// Control panel item identifier.
    pub guid: Guid,
    /// Embedded property store.
    pub property_store: Option<PropertyStore>,
}

/// URI item (0x61).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Uri {
    /// Content flags; 0x80 marks UTF-16 strings.
    pub flags: u8,
    /// Size of the data block.
    pub data_size: u16,
    /// Last access time from the data block.
    pub accessed: Option<FileTime>,
    /// Host name from the data block.
    pub host: Option<String>,
    /// User name from the data block.
    pub user: Option<String>,
    /// URI string following the data block.
    pub uri: String,
}

/// Delegate item (0x74) wrapping a file entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Delegate {
    /// Size of the embedded item data.
    pub sub_item_size: u16,
    /// Embedded file entry.
    pub entry: FileEntry,
    /// Delegate item identifier.
    pub delegate_id: Option<Guid>,
    /// Item class identifier.
    pub class_id: Option<Guid>,
}

/// Item that did not match any known layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnknownItem {
    /// 32-bit value at offset 4, when the item is long enough.
    pub signature: Option<u32>,
    /// Item bytes after the size prefix.
    pub data: Vec<u8>,
}

/// Decoded shell item variants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ShellItemKind {
    /// 0x1F.
    RootFolder(RootFolder),
    /// 0x00.
    PropertyView(PropertyView),
    /// 0x01.
    ControlPanelCategory {
        /// Category id.
        category: u32,
    },
    /// Class 0x20.
    Drive {
        /// Drive string, e.g. `C:\`.
        name: String,
    },
    /// Class 0x30.
    FileEntry(FileEntry),
    /// Class 0x40.
    NetworkLocation(NetworkLocation),
    /// Compressed folder contents.
    ZipContents(ZipContents),
    /// 0x71.
    ControlPanel(ControlPanel),
    /// 0x2E.
    UsersPropertyView(UsersPropertyView),
    /// 0x61.
    Uri(Uri),
    /// 0x74.
    Delegate(Delegate),
    /// Unrecognized or undecodable item.
    Unknown(UnknownItem),
}

/// One shell item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShellItem {
    /// Declared size including the 2-byte prefix.
    pub size: u16,
    /// Class type indicator.
    pub item_type: u8,
    /// Decoded contents.
    pub kind: ShellItemKind,
}

impl ShellItem {
    /// Short description of the item type.
    pub fn friendly_name(&self) -> &'static str {
        match &self.kind {
            ShellItemKind::RootFolder(_) => "Root folder: GUID",
            ShellItemKind::PropertyView(_) => "Property view",
            ShellItemKind::ControlPanelCategory { .. } => "Control panel category",
            ShellItemKind::Drive { .. } => "Drive letter",
            ShellItemKind::FileEntry(entry) if entry.is_directory() => "Directory",
            ShellItemKind::FileEntry(_) => "File",
            ShellItemKind::NetworkLocation(_) => "Network location",
            ShellItemKind::ZipContents(_) => "Zip file contents",
            ShellItemKind::ControlPanel(_) => "Control panel",
            ShellItemKind::UsersPropertyView(_) => "Users property view",
            ShellItemKind::Uri(_) => "URI",
            ShellItemKind::Delegate(_) => "Delegate item",
            ShellItemKind::Unknown(_) => "Unknown",
        }
    }

    /// Best-effort display value, such as a name, path or folder identifier.
    pub fn value(&self) -> String {
        match &self.kind {
            ShellItemKind::RootFolder(root) => guid_value(&root.guid),
            ShellItemKind::PropertyView(view) => view
                .guid
                .as_ref()
                .map(guid_value)
                .unwrap_or_else(|| "Property view".to_string()),
            ShellItemKind::ControlPanelCategory { category } => {
                descriptions::control_panel_category_name(*category)
                    .map(String::from)
                    .unwrap_or_else(|| format!("Unknown category {}", category))
            }
            ShellItemKind::Drive { name } => name.clone(),
            ShellItemKind::FileEntry(entry) => entry.name().to_string(),
            ShellItemKind::NetworkLocation(network) => network.location.clone(),
            ShellItemKind::ZipContents(zip) => match &zip.second_name {
                Some(second) => format!("{}/{}", zip.name, second),
                None => zip.name.clone(),
            },
            ShellItemKind::ControlPanel(panel) => guid_value(&panel.guid),
            ShellItemKind::UsersPropertyView(view) => view
                .guid
                .as_ref()
                .map(guid_value)
                .unwrap_or_else(|| "Users property view".to_string()),
            ShellItemKind::Uri(uri) => match (&uri.host, uri.uri.is_empty()) {
                (Some(host), false) if !uri.uri.contains("://") => format!("{}://{}", uri.uri, host),
                (Some(host), true) => host.clone(),
                _ => uri.uri.clone(),
            },
            ShellItemKind::Delegate(delegate) => delegate.entry.name().to_string(),
            ShellItemKind::Unknown(unknown) => match unknown.signature {
                Some(sig) => format!("Unknown item {:#010x}", sig),
                None => "Unknown item".to_string(),
            },
        }
    }

    /// Extension blocks owned by the item.
    pub fn extensions(&self) -> &[ExtensionBlock] {
        match &self.kind {
            ShellItemKind::RootFolder(root) => &root.extensions,
            ShellItemKind::PropertyView(view) => &view.extensions,
            ShellItemKind::UsersPropertyView(view) => &view.extensions,
            ShellItemKind::FileEntry(entry) => &entry.extensions,
            ShellItemKind::Delegate(delegate) => &delegate.entry.extensions,
            _ => &[],
        }
    }

    /// Property store owned by the item.
    pub fn property_store(&self) -> Option<&PropertyStore> {
        match &self.kind {
            ShellItemKind::RootFolder(root) => root.property_store.as_ref(),
            ShellItemKind::PropertyView(view) => view.property_store.as_ref(),
            ShellItemKind::ControlPanel(panel) => panel.property_store.as_ref(),
            ShellItemKind::UsersPropertyView(view) => view.property_store.as_ref(),
            _ => None,
        }
    }

    /// File entry data for file entry and delegate items.
    pub fn file_entry(&self) -> Option<&FileEntry> {
        match &self.kind {
            ShellItemKind::FileEntry(entry) => Some(entry),
            ShellItemKind::Delegate(delegate) => Some(&delegate.entry),
            _ => None,
        }
    }
}

impl fmt::Display for ShellItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ==> {}", self.friendly_name(), self.value())
    }
}

fn guid_value(guid: &Guid) -> String {
    match descriptions::shell_folder_name(guid) {
        Some(name) => name.to_string(),
        None => guid.to_string(),
    }
}

/// Decodes an ID list: a u16 total size followed by that many bytes of items.
///
/// Returns the declared size and the items. A declared size larger than the
/// input is a fatal truncation.
pub fn decode_id_list(reader: &mut ByteReader<'_>) -> Result<(u16, Vec<ShellItem>)> {
    let size = reader.read_u16()?;
    let mut list = reader.sub_reader(size as usize)?;
    let items = decode_items(&mut list);

    if !list.is_empty() {
        warn!(
            "ID list declared {} bytes, {} left after the terminator",
            size,
            list.remaining()
        );
    }

    Ok((size, items))
}

/// Decodes shell items until a zero size or the end of the reader.
///
/// Never fails: undecodable items are kept as [`ShellItemKind::Unknown`].
pub fn decode_items(reader: &mut ByteReader<'_>) -> Vec<ShellItem> {
    let mut items = Vec::new();

    while reader.remaining() >= 2 {
        let size = match reader.peek_u16() {
            Ok(size) => size,
            Err(_) => break,
        };
        if size == 0 {
            reader.skip(2).ok();
            break;
        }

        let wanted = (size as usize).max(2);
        let take = wanted.min(reader.remaining());
        if take < wanted {
            debug!(
                "Shell item size {} exceeds remaining {} bytes",
                size,
                reader.remaining()
            );
        }

        let mut item = match reader.sub_reader(take) {
            Ok(item) => item,
            Err(_) => break,
        };
        items.push(decode_item(&mut item, size));

        if take < wanted {
            break;
        }
    }

    items
}

/// Decodes one item. The reader spans the item including its size prefix.
fn decode_item(item: &mut ByteReader<'_>, size: u16) -> ShellItem {
    let data = item.data();
    let Some(&item_type) = data.get(2) else {
        return ShellItem {
            size,
            item_type: 0,
            kind: unknown_item(data),
        };
    };

    let decoded = match DECODERS
        .iter()
        .find(|(mask, value, _)| item_type & mask == *value)
    {
        Some((_, _, decode)) => {
            trace!("Decoding shell item type {:#04x}, {} bytes", item_type, size);
            decode(item)
        }
        None if is_zip_contents(data) => decode_zip_contents(item),
        None => {
            debug!("Unknown shell item type {:#04x}", item_type);
            Ok(unknown_item(data))
        }
    };

    let kind = decoded.unwrap_or_else(|e| {
        debug!("Shell item type {:#04x} kept raw: {}", item_type, e);
        unknown_item(data)
    });

    ShellItem {
        size,
        item_type,
        kind,
    }
}

fn unknown_item(data: &[u8]) -> ShellItemKind {
    ShellItemKind::Unknown(UnknownItem {
        signature: read_u32_le(data, 4).ok(),
        data: data.get(2..).unwrap_or_default().to_vec(),
    })
}

/// Joins item values into a path, e.g. `My Computer\C:\Windows`.
///
/// No separator is added after a value that already ends in `\`, so a
/// drive item (`C:\`) does not produce a doubled backslash.
pub fn absolute_path(items: &[ShellItem]) -> String {
    let mut path = String::new();
    for item in items {
        let value = item.value();
        if !path.is_empty() && !path.ends_with('\\') {
            path.push('\\');
        }
        path.push_str(&value);
    }
    path
}

/// Searches `data` for a property store and decodes it.
///
/// Returns the store and the offset in `data` just past its terminator.
fn find_property_store(
    data: &[u8],
    encoding: &'static Encoding,
) -> Option<(PropertyStore, usize)> {
    let signature = find_bytes(data, PROPERTY_STORE_SIGNATURE)?;
    let start = signature.checked_sub(4)?;

    let mut reader = ByteReader::with_encoding(&data[start..], encoding);
    match PropertyStore::from_reader(&mut reader) {
        Ok(store) if !store.is_empty() => Some((store, start + reader.position())),
        Ok(_) => None,
        Err(e) => {
            debug!("Skipping property store in shell item: {}", e);
            None
        }
    }
}

/// Decodes the extension blocks of `data` that start at or after `from`.
fn find_extensions(data: &[u8], from: usize, encoding: &'static Encoding) -> Vec<ExtensionBlock> {
    match find_extension_start(data, from) {
        Some(start) => decode_extension_blocks(&data[start..], encoding),
        None => Vec::new(),
    }
}

/// Compressed folder items carry a date or "N/A" with a "/" at offset 37 or 45.
fn is_zip_contents(data: &[u8]) -> bool {
    data.get(37) == Some(&b'/') || data.get(45) == Some(&b'/')
}

fn decode_root_folder(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    item.seek(3)?;
    let sort_index = item.read_u8()?;
    let guid = item.read_guid()?;

    let encoding = item.encoding();
    let (property_store, extensions_from) = match find_property_store(item.rest(), encoding) {
        Some((store, end)) => (Some(store), item.position() + end),
        None => (None, item.position()),
    };
    Ok(ShellItemKind::RootFolder(RootFolder {
        sort_index,
        guid,
        property_store,
        extensions: find_extensions(item.data(), extensions_from, encoding),
    }))
}

fn decode_users_property_view(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    let data = item.data();
    let encoding = item.encoding();
    let (property_store, extensions_from) = match find_property_store(data, encoding) {
        Some((store, end)) => (Some(store), end),
        None => (None, 20),
    };

    // Items carrying a store use these bytes for its header
    let has_store = find_bytes(data, PROPERTY_STORE_SIGNATURE).is_some();
    let guid = if !has_store && data.len() >= 20 {
        item.seek(4)?;
        Some(item.read_guid()?)
    } else {
        None
    };

    Ok(ShellItemKind::UsersPropertyView(UsersPropertyView {
        guid,
        property_store,
        extensions: find_extensions(data, extensions_from, encoding),
    }))
}

fn decode_property_view(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    let data = item.data();
    if is_zip_contents(data) {
        match decode_zip_contents(item) {
            Ok(zip) => return Ok(zip),
            Err(e) => trace!("Property view is not zip contents: {}", e),
        }
    }

    let encoding = item.encoding();
    let payload = data.get(3..).unwrap_or_default();
    let (property_store, extensions_from) = match find_property_store(payload, encoding) {
        Some((store, end)) => (Some(store), 3 + end),
        None => (None, 3),
    };
    let extensions = find_extensions(data, extensions_from, encoding);

    let mut guid = None;
    if find_bytes(data, PROPERTY_VIEW_GUID_SIGNATURE).is_some()
        && data.len() >= 32
        && read_u16_le(data, 12)? == 16
    {
        guid = Some(Guid::from_slice(&data[14..30])?);
    }

    Ok(ShellItemKind::PropertyView(PropertyView {
        guid,
        property_store,
        extensions,
    }))
}

fn decode_control_panel_category(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    item.seek(8)?;
    Ok(ShellItemKind::ControlPanelCategory {
        category: item.read_u32()?,
    })
}

fn decode_drive(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    item.seek(3)?;
    Ok(ShellItemKind::Drive {
        name: item.read_ansi_nul()?,
    })
}

/// Decodes a file entry whose class type byte is at `base`.
///
/// Returns the entry and the offset just past the primary name.
fn parse_file_entry(item: &mut ByteReader<'_>, base: usize) -> Result<(FileEntry, usize)> {
    item.seek(base)?;
    let entry_type = item.read_u8()?;
    item.skip(1)?;
    let file_size = item.read_u32()?;
    let modified = item.read_dos_datetime()?;
    let attributes = FileAttributes::new(u32::from(item.read_u16()?));

    let primary_name = if entry_type & 0x04 != 0 {
        item.read_utf16_nul()?
    } else {
        let name = item.read_ansi_nul()?;
        item.align(2);
        name
    };
    let name_end = item.position();

    let extensions = find_extensions(item.data(), name_end, item.encoding());

    Ok((
        FileEntry {
            entry_type,
            file_size,
            modified,
            attributes,
            primary_name,
            extensions,
        },
        name_end,
    ))
}

fn decode_file_entry(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    let (entry, _) = parse_file_entry(item, 2)?;
    Ok(ShellItemKind::FileEntry(entry))
}

fn decode_network_location(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    item.seek(4)?;
    let flags = item.read_u8()?;
    let location = item.read_ansi_nul()?;

    let description = if flags & 0x80 != 0 {
        Some(item.read_ansi_nul()?)
    } else {
        None
    };
    let comments = if flags & 0x40 != 0 {
        Some(item.read_ansi_nul()?)
    } else {
        None
    };

    Ok(ShellItemKind::NetworkLocation(NetworkLocation {
        flags,
        location,
        description,
        comments,
    }))
}

fn decode_zip_contents(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    item.seek(84)?;
    let name_chars = item.read_u32()? as usize;
    let second_chars = item.read_u32()? as usize;

    let name = item.read_utf16(name_chars)?;
    let second_name = if second_chars > 0 {
        item.skip(2)?;
        Some(item.read_utf16(second_chars)?)
    } else {
        None
    };

    Ok(ShellItemKind::ZipContents(ZipContents { name, second_name }))
}

fn decode_control_panel(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    item.seek(14)?;
    let guid = item.read_guid()?;
    let property_store =
        find_property_store(item.rest(), item.encoding()).map(|(store, _)| store);

    Ok(ShellItemKind::ControlPanel(ControlPanel {
        guid,
        property_store,
    }))
}

/// Fields of the URI data block that precede its strings.
const URI_DATA_HEADER_SIZE: usize = 36;

fn decode_uri(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    item.seek(3)?;
    let flags = item.read_u8()?;
    let data_size = item.read_u16()?;
    let unicode = flags & 0x80 != 0;

    let mut block = item.sub_reader(data_size as usize)?;
    let mut accessed = None;
    let mut host = None;
    let mut user = None;
    if block.len() >= URI_DATA_HEADER_SIZE {
        block.seek(8)?;
        accessed = Some(block.read_filetime()?);
        block.seek(URI_DATA_HEADER_SIZE)?;
        host = read_sized_string(&mut block, unicode).ok();
        user = read_sized_string(&mut block, unicode).ok();
    }

    let uri = if item.is_empty() {
        String::new()
    } else if unicode {
        item.read_utf16_nul()?
    } else {
        item.read_ansi_nul()?
    };

    Ok(ShellItemKind::Uri(Uri {
        flags,
        data_size,
        accessed,
        host,
        user,
        uri,
    }))
}

/// Reads a u32 byte count followed by a string of that many bytes.
fn read_sized_string(reader: &mut ByteReader<'_>, unicode: bool) -> Result<String> {
    let offset = reader.position() as u32;
    let size = reader.read_u32()? as usize;
    let bytes = reader.read_bytes(size)?;
    if unicode {
        read_utf16_string(until_nul_utf16(bytes), offset)
    } else {
        Ok(decode_ansi(until_nul(bytes), reader.encoding()))
    }
}

fn decode_delegate(item: &mut ByteReader<'_>) -> Result<ShellItemKind> {
    item.seek(6)?;
    let signature = item.read_bytes(4)?;
    if signature != DELEGATE_SIGNATURE {
        return Err(LnkError::invalid_signature(DELEGATE_SIGNATURE, signature));
    }
    let sub_item_size = item.read_u16()?;

    let (entry, name_end) = parse_file_entry(item, 12)?;

    let data = item.data();
    let (delegate_id, class_id) = match find_extension_start(data, name_end) {
        Some(start) if start >= name_end + 32 => (
            Some(Guid::from_slice(&data[start - 32..start - 16])?),
            Some(Guid::from_slice(&data[start - 16..start])?),
        ),
        _ => (None, None),
    };

    Ok(ShellItemKind::Delegate(Delegate {
        sub_item_size,
        entry,
        delegate_id,
        class_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(item_type: u8, body: &[u8]) -> Vec<u8> {
        let mut data = ((body.len() + 3) as u16).to_le_bytes().to_vec();
        data.push(item_type);
        data.extend_from_slice(body);
        data
    }

    fn decode(data: &[u8]) -> Vec<ShellItem> {
        decode_items(&mut ByteReader::new(data))
    }

    const MY_COMPUTER: [u8; 20] = [
        20, 0, 31, 80, 224, 79, 208, 32, 234, 58, 105, 16, 162, 216, 8, 0, 43, 48, 48, 157,
    ];

    // Directory item "RegRipper2.8-master" with a version 9 extension block.
    const REGRIPPER: [u8; 116] = [
        116, 0, 49, 0, 0, 0, 0, 0, 123, 79, 195, 14, 16, 0, 82, 69, 71, 82, 73, 80, 126, 49, 46,
        56, 45, 77, 0, 0, 88, 0, 9, 0, 4, 0, 239, 190, 123, 79, 195, 14, 123, 79, 195, 14, 46, 0,
        0, 0, 225, 9, 0, 0, 0, 0, 15, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 38, 46, 73, 0,
        82, 0, 101, 0, 103, 0, 82, 0, 105, 0, 112, 0, 112, 0, 101, 0, 114, 0, 50, 0, 46, 0, 56, 0,
        45, 0, 109, 0, 97, 0, 115, 0, 116, 0, 101, 0, 114, 0, 0, 0, 28, 0,
    ];

    #[test]
    fn test_root_folder() {
        let items = decode(&MY_COMPUTER);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, 0x1F);
        match &items[0].kind {
            ShellItemKind::RootFolder(root) => {
                assert_eq!(root.sort_index, 0x50);
                assert_eq!(root.sort_index_name(), "My Computer");
                assert_eq!(root.guid.to_string(), "20d04fe0-3aea-1069-a2d8-08002b30309d");
                assert!(root.property_store.is_none());
            }
            other => panic!("unexpected item {:?}", other),
        }
        assert_eq!(items[0].value(), "My Computer");
        assert_eq!(items[0].friendly_name(), "Root folder: GUID");
    }

    #[test]
    fn test_directory_entry() {
        let items = decode(&REGRIPPER);
        let entry = items[0].file_entry().unwrap();
        assert!(entry.is_directory());
        assert!(!entry.is_unicode());
        assert_eq!(entry.primary_name, "REGRIP~1.8-M");
        assert!(entry.attributes.is_directory());
        assert_eq!(entry.modified.to_string(), "2019-11-27 01:54:06");

        assert_eq!(entry.name(), "RegRipper2.8-master");
        let mft = entry.mft().unwrap();
        assert_eq!(mft.entry_number(), Some(2529));
        assert_eq!(mft.sequence, 15);
        assert_eq!(items[0].extensions().len(), 1);
        assert_eq!(items[0].friendly_name(), "Directory");
    }

    #[test]
    fn test_drive_and_path() {
        let mut data = MY_COMPUTER.to_vec();
        let mut drive = item(0x2F, b"C:\\\0");
        drive.resize(25, 0);
        drive[0] = 25;
        data.extend_from_slice(&drive);
        data.extend_from_slice(&REGRIPPER);
        data.extend_from_slice(&[0, 0]);

        let items = decode(&data);
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].kind, ShellItemKind::Drive { name: "C:\\".to_string() });
        assert_eq!(absolute_path(&items), "My Computer\\C:\\RegRipper2.8-master");
    }

    #[test]
    fn test_network_location() {
        let mut body = vec![1, 0x81];
        body.extend_from_slice(b"\\\\vmware-host\\Shared Folders\0VMware Shared Folders\0");
        let items = decode(&item(0xC3, &body));
        match &items[0].kind {
            ShellItemKind::NetworkLocation(network) => {
                assert_eq!(network.location, "\\\\vmware-host\\Shared Folders");
                assert_eq!(network.description.as_deref(), Some("VMware Shared Folders"));
                assert_eq!(network.comments, None);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_uri() {
        let body = [
            3, 100, 0, 3, 39, 0, 0, 4, 0, 0, 0, 179, 12, 170, 178, 225, 1, 215, 1, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 21, 0, 0, 0, 16, 0, 0, 0, 102, 116, 112, 46, 100, 108,
            112, 116, 101, 115, 116, 46, 99, 111, 109, 0, 8, 0, 0, 0, 100, 108, 112, 117, 115, 101,
            114, 0, 28, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 102, 116, 112, 0, 0, 0,
        ];
        let items = decode(&item(0x61, &body));
        match &items[0].kind {
            ShellItemKind::Uri(uri) => {
                assert_eq!(uri.data_size, 100);
                assert_eq!(uri.host.as_deref(), Some("ftp.dlptest.com"));
                assert_eq!(uri.user.as_deref(), Some("dlpuser"));
                assert_eq!(uri.uri, "ftp");
                assert_eq!(
                    uri.accessed.unwrap().to_datetime().unwrap().timestamp(),
                    1_613_204_690
                );
            }
            other => panic!("unexpected item {:?}", other),
        }
        assert_eq!(items[0].value(), "ftp://ftp.dlptest.com");
    }

    #[test]
    fn test_control_panel_category() {
        let items = decode(&item(0x01, &[0, 132, 33, 222, 57, 0, 0, 0, 0, 0, 0]));
        assert_eq!(items[0].kind, ShellItemKind::ControlPanelCategory { category: 0 });
        assert_eq!(items[0].value(), "All Control Panel Items");
    }

    #[test]
    fn test_zip_contents() {
        let mut body = vec![0u8; 81];
        // "N/A" date marker
        body[33] = b'N';
        body[34] = b'/';
        body[35] = b'A';
        body.extend_from_slice(&3u32.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());
        for unit in "dir".encode_utf16() {
            body.extend_from_slice(&unit.to_le_bytes());
        }
        let data = item(0x00, &body);
        assert_eq!(data[37], b'/');

        let items = decode(&data);
        assert_eq!(
            items[0].kind,
            ShellItemKind::ZipContents(ZipContents {
                name: "dir".to_string(),
                second_name: None
            })
        );
    }

    #[test]
    fn test_delegate_item() {
        let mut data = vec![0u8, 0, 0x74, 0, 0, 0];
        data.extend_from_slice(b"CFSF");
        data.extend_from_slice(&18u16.to_le_bytes());
        // Embedded file entry at offset 12
        data.extend_from_slice(&[0x31, 0, 0, 0, 0, 0, 0, 0, 0, 0, 16, 0]);
        data.extend_from_slice(b"DIR\0");
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&[0x11; 16]);
        data.extend_from_slice(&[0x22; 16]);
        data.extend_from_slice(&REGRIPPER[28..]);
        let len = data.len() as u16;
        data[..2].copy_from_slice(&len.to_le_bytes());

        let items = decode(&data);
        match &items[0].kind {
            ShellItemKind::Delegate(delegate) => {
                assert_eq!(delegate.entry.primary_name, "DIR");
                assert_eq!(delegate.delegate_id, Some(Guid::from_bytes([0x11; 16])));
                assert_eq!(delegate.class_id, Some(Guid::from_bytes([0x22; 16])));
            }
            other => panic!("unexpected item {:?}", other),
        }
        assert_eq!(items[0].value(), "RegRipper2.8-master");
    }

    #[test]
    fn test_failed_decoder_becomes_unknown() {
        // Root folder too short to hold its GUID
        let items = decode(&[6, 0, 0x1F, 0x50, 1, 2]);
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0].kind, ShellItemKind::Unknown(_)));
    }

    #[test]
    fn test_unknown_type() {
        let items = decode(&item(0x99, &[1, 2, 3, 4, 5]));
        match &items[0].kind {
            ShellItemKind::Unknown(unknown) => {
                assert_eq!(unknown.data, vec![0x99, 1, 2, 3, 4, 5]);
                assert_eq!(unknown.signature, Some(u32::from_le_bytes([2, 3, 4, 5])));
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_tiny_item_is_unknown() {
        let items = decode(&[2, 0, 0, 0]);
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0].kind, ShellItemKind::Unknown(_)));
    }

    #[test]
    fn test_id_list_truncated() {
        let data = [40, 0, 20, 0];
        assert!(decode_id_list(&mut ByteReader::new(&data)).unwrap_err().is_truncation());
    }

    #[test]
    fn test_id_list_sizes_add_up() {
        let mut list = MY_COMPUTER.to_vec();
        list.extend_from_slice(&REGRIPPER);
        list.extend_from_slice(&[0, 0]);
        let mut data = (list.len() as u16).to_le_bytes().to_vec();
        data.extend_from_slice(&list);

        let mut reader = ByteReader::new(&data);
        let (size, items) = decode_id_list(&mut reader).unwrap();
        let total: usize = items.iter().map(|i| i.size as usize).sum::<usize>() + 2;
        assert_eq!(total, size as usize);
        assert!(reader.is_empty());
    }
}
