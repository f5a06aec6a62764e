//! Extra data blocks.
//!
//! The blocks follow the string data and run to the end of the file. Each
//! starts with a 32-bit size (including itself) and a 32-bit signature; a
//! size below 4 terminates the chain.
//!
//! ```text
//! [Block size u32]
//! [Signature u32]     0xA00000xx
//! [Block data]        size - 8 bytes
//! ...
//! [Terminal block]    size < 4
//! ```

use crate::descriptions;
use crate::error::Result;
use crate::guid::Guid;
use crate::property_store::PropertyStore;
use crate::shell_item::{decode_items, ShellItem};
use crate::utils::ByteReader;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, trace, warn};

/// EnvironmentVariableDataBlock.
pub const ENVIRONMENT_VARIABLE_SIGNATURE: u32 = 0xA000_0001;
/// ConsoleDataBlock.
pub const CONSOLE_SIGNATURE: u32 = 0xA000_0002;
/// TrackerDataBlock.
pub const TRACKER_SIGNATURE: u32 = 0xA000_0003;
/// ConsoleFEDataBlock.
pub const CONSOLE_FE_SIGNATURE: u32 = 0xA000_0004;
/// SpecialFolderDataBlock.
pub const SPECIAL_FOLDER_SIGNATURE: u32 = 0xA000_0005;
/// DarwinDataBlock.
pub const DARWIN_SIGNATURE: u32 = 0xA000_0006;
/// IconEnvironmentDataBlock.
pub const ICON_ENVIRONMENT_SIGNATURE: u32 = 0xA000_0007;
/// ShimDataBlock.
pub const SHIM_SIGNATURE: u32 = 0xA000_0008;
/// PropertyStoreDataBlock.
pub const PROPERTY_STORE_SIGNATURE: u32 = 0xA000_0009;
/// KnownFolderDataBlock.
pub const KNOWN_FOLDER_SIGNATURE: u32 = 0xA000_000B;
/// VistaAndAboveIDListDataBlock.
pub const VISTA_AND_ABOVE_ID_LIST_SIGNATURE: u32 = 0xA000_000C;

/// Size and signature fields.
pub const BLOCK_HEADER_SIZE: u32 = 8;

const ANSI_TARGET_SIZE: usize = 260;
const UNICODE_TARGET_SIZE: usize = 520;

type BlockDecoder = fn(&mut ByteReader<'_>) -> Result<ExtraData>;

/// Decoders keyed by signature. The reader spans the block body.
static DECODERS: &[(u32, BlockDecoder)] = &[
    (ENVIRONMENT_VARIABLE_SIGNATURE, decode_environment_variable),
    (CONSOLE_SIGNATURE, decode_console),
    (TRACKER_SIGNATURE, decode_tracker),
    (CONSOLE_FE_SIGNATURE, decode_console_fe),
    (SPECIAL_FOLDER_SIGNATURE, decode_special_folder),
    (DARWIN_SIGNATURE, decode_darwin),
    (ICON_ENVIRONMENT_SIGNATURE, decode_icon_environment),
    (SHIM_SIGNATURE, decode_shim),
    (PROPERTY_STORE_SIGNATURE, decode_property_store),
    (KNOWN_FOLDER_SIGNATURE, decode_known_folder),
    (VISTA_AND_ABOVE_ID_LIST_SIGNATURE, decode_vista_id_list),
];

/// A path stored twice: a 260-byte ANSI field and an optional 520-byte UTF-16 field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetStrings {
    /// ANSI form.
    pub ansi: String,
    /// Unicode form.
    pub unicode: Option<String>,
}

impl TargetStrings {
    /// Unicode form if non-empty, otherwise the ANSI form.
    pub fn value(&self) -> &str {
        match &self.unicode {
            Some(unicode) if !unicode.is_empty() => unicode,
            _ => &self.ansi,
        }
    }
}

/// Console window settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConsoleBlock {
    /// Text fill attributes.
    pub fill_attributes: u16,
    /// Popup fill attributes.
    pub popup_fill_attributes: u16,
    /// Screen buffer width.
    pub screen_buffer_size_x: i16,
    /// Screen buffer height.
    pub screen_buffer_size_y: i16,
    /// Window width.
    pub window_size_x: i16,
    /// Window height.
    pub window_size_y: i16,
    /// Window origin x.
    pub window_origin_x: i16,
    /// Window origin y.
    pub window_origin_y: i16,
    /// Font size; the high word is the height.
    pub font_size: u32,
    /// Font family and pitch.
    pub font_family: u32,
    /// Font weight.
    pub font_weight: u32,
    /// Font face name.
    pub face_name: String,
    /// Cursor size in percent.
    pub cursor_size: u32,
    /// Full screen mode.
    pub full_screen: bool,
    /// Quick edit mode.
    pub quick_edit: bool,
    /// Insert mode.
    pub insert_mode: bool,
    /// Automatic window positioning.
    pub auto_position: bool,
    /// History buffer size.
    pub history_buffer_size: u32,
    /// Number of history buffers.
    pub number_of_history_buffers: u32,
    /// Duplicate history entries are discarded.
    pub history_no_dup: bool,
    /// Color table.
    pub color_table: [u32; 16],
}

impl ConsoleBlock {
    /// Returns true for weights of 700 and above.
    pub fn is_bold(&self) -> bool {
        self.font_weight >= 700
    }

    /// Font height in pixels.
    pub fn font_height(&self) -> u16 {
        (self.font_size >> 16) as u16
    }

    /// Font family name.
    pub fn font_family_name(&self) -> &'static str {
        match self.font_family & 0xFFF0 {
            0x0000 => "Don't care",
            0x0010 => "Roman",
            0x0020 => "Swiss",
            0x0030 => "Modern",
            0x0040 => "Script",
            0x0050 => "Decorative",
            _ => "Unknown",
        }
    }
}

/// Distributed link tracker data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrackerBlock {
    /// Length of the tracker data.
    pub length: u32,
    /// Tracker data version.
    pub version: u32,
    /// NetBIOS name of the machine the target was last seen on.
    pub machine_id: String,
    /// Volume droid.
    pub volume_droid: Guid,
    /// File droid.
    pub file_droid: Guid,
    /// Birth volume droid.
    pub birth_volume_droid: Guid,
    /// Birth file droid.
    pub birth_file_droid: Guid,
}

impl TrackerBlock {
    /// MAC address embedded in the file droid.
    pub fn mac_address(&self) -> String {
        self.file_droid.mac_address()
    }

    /// Creation time embedded in the file droid.
    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.file_droid.uuid_timestamp()
    }

    /// MAC address embedded in the birth file droid.
    pub fn birth_mac_address(&self) -> String {
        self.birth_file_droid.mac_address()
    }

    /// Creation time embedded in the birth file droid.
    pub fn birth_creation_time(&self) -> Option<DateTime<Utc>> {
        self.birth_file_droid.uuid_timestamp()
    }
}

/// Block kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DamagedBlock {
    /// Signature read from the block.
    pub signature: u32,
    /// Why the block was not decoded.
    pub error: String,
    /// Block body.
    pub data: Vec<u8>,
}

/// Decoded block contents.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExtraData {
    /// Console window settings.
    Console(Box<ConsoleBlock>),
    /// Console code page.
    ConsoleFe {
        /// Code page.
        code_page: u32,
    },
    /// Darwin (Windows Installer) application identifier.
    Darwin(TargetStrings),
    /// Target path with environment variables.
    EnvironmentVariable(TargetStrings),
    /// Icon path with environment variables.
    IconEnvironment(TargetStrings),
    /// Known folder reference.
    KnownFolder {
        /// Known folder identifier.
        guid: Guid,
        /// Offset of the folder item in the ID list.
        offset: u32,
    },
    /// Serialized property store.
    PropertyStore(PropertyStore),
    /// Shim layer.
    Shim {
        /// Layer name.
        layer_name: String,
    },
    /// Special folder reference.
    SpecialFolder {
        /// CSIDL value.
        id: u32,
        /// Offset of the folder item in the ID list.
        offset: u32,
    },
    /// Distributed link tracker data.
    Tracker(TrackerBlock),
    /// Alternate ID list.
    VistaAndAboveIdList(Vec<ShellItem>),
    /// Unknown signature or undecodable body.
    Damaged(DamagedBlock),
}

/// One extra data block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtraDataBlock {
    /// Declared size including the size and signature fields.
    pub size: u32,
    /// Block signature.
    pub signature: u32,
    /// Decoded contents.
    pub kind: ExtraData,
}

impl ExtraDataBlock {
    /// Block type name.
    pub fn name(&self) -> &'static str {
        match self.kind {
            ExtraData::Console(_) => "Console data block",
            ExtraData::ConsoleFe { .. } => "Console FE data block",
            ExtraData::Darwin(_) => "Darwin data block",
            ExtraData::EnvironmentVariable(_) => "Environment variables data block",
            ExtraData::IconEnvironment(_) => "Icon environment data block",
            ExtraData::KnownFolder { .. } => "Known folder data block",
            ExtraData::PropertyStore(_) => "Property store data block",
            ExtraData::Shim { .. } => "Shim data block",
            ExtraData::SpecialFolder { .. } => "Special folder data block",
            ExtraData::Tracker(_) => "Tracker database block",
            ExtraData::VistaAndAboveIdList(_) => "Vista and above ID list data block",
            ExtraData::Damaged(_) => "Damaged data block",
        }
    }

    /// Returns true if the block was kept as raw bytes.
    pub fn is_damaged(&self) -> bool {
        matches!(self.kind, ExtraData::Damaged(_))
    }
}

impl fmt::Display for ExtraDataBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.name())?;
        match &self.kind {
            ExtraData::Console(console) => write!(
                f,
                "{} {}pt{}",
                console.face_name,
                console.font_height(),
                if console.is_bold() { " bold" } else { "" }
            ),
            ExtraData::ConsoleFe { code_page } => write!(f, "code page {}", code_page),
            ExtraData::Darwin(strings)
            | ExtraData::EnvironmentVariable(strings)
            | ExtraData::IconEnvironment(strings) => write!(f, "{}", strings.value()),
            ExtraData::KnownFolder { guid, .. } => match descriptions::known_folder_name(guid) {
                Some(name) => write!(f, "{} ({})", guid, name),
                None => write!(f, "{}", guid),
            },
            ExtraData::PropertyStore(store) => write!(f, "{} sheet(s)", store.sheets.len()),
            ExtraData::Shim { layer_name } => write!(f, "{}", layer_name),
            ExtraData::SpecialFolder { id, .. } => match descriptions::special_folder_name(*id) {
                Some(name) => write!(f, "{} ({})", id, name),
                None => write!(f, "{}", id),
            },
            ExtraData::Tracker(tracker) => write!(
                f,
                "{} {}",
                tracker.machine_id,
                tracker.mac_address()
            ),
            ExtraData::VistaAndAboveIdList(items) => write!(f, "{} item(s)", items.len()),
            ExtraData::Damaged(damaged) => write!(
                f,
                "signature {:#010x}, {} byte(s): {}",
                damaged.signature,
                damaged.data.len(),
                damaged.error
            ),
        }
    }
}

/// Decodes extra data blocks until the terminal block or the end of input.
///
/// Never fails. Unknown signatures and blocks that fail to decode are kept
/// as [`ExtraData::Damaged`]; the cursor always advances by the declared size.
pub fn decode_extra_data(reader: &mut ByteReader<'_>) -> Vec<ExtraDataBlock> {
    let mut blocks = Vec::new();

    while reader.remaining() >= 4 {
        let offset = reader.position();
        let Ok(size) = reader.read_u32() else { break };
        if size < 4 {
            break;
        }
        if size < BLOCK_HEADER_SIZE {
            debug!("Extra data block size {} at {:#x} cannot hold a signature", size, offset);
            break;
        }

        let Ok(signature) = reader.read_u32() else {
            blocks.push(damaged(size, 0, "missing signature".to_string(), reader.read_to_end()));
            break;
        };

        let body_size = (size - BLOCK_HEADER_SIZE) as usize;
        if body_size > reader.remaining() {
            debug!(
                "Extra data block {:#010x} at {:#x} declares {} bytes, {} remain",
                signature,
                offset,
                size,
                reader.remaining() + BLOCK_HEADER_SIZE as usize
            );
            let message = format!(
                "declared size {} exceeds remaining data",
                size
            );
            blocks.push(damaged(size, signature, message, reader.read_to_end()));
            break;
        }

        let Ok(mut body) = reader.sub_reader(body_size) else { break };
        blocks.push(decode_block(size, signature, &mut body));
    }

    if !reader.is_empty() {
        warn!(
            "{} byte(s) left after the terminal extra data block",
            reader.remaining()
        );
    }

    blocks
}

fn decode_block(size: u32, signature: u32, body: &mut ByteReader<'_>) -> ExtraDataBlock {
    let data = body.data();

    let kind = match DECODERS.iter().find(|(sig, _)| *sig == signature) {
        Some((_, decode)) => {
            trace!("Decoding extra data block {:#010x}, {} bytes", signature, size);
            decode(body).unwrap_or_else(|e| {
                debug!("Extra data block {:#010x} kept raw: {}", signature, e);
                ExtraData::Damaged(DamagedBlock {
                    signature,
                    error: e.to_string(),
                    data: data.to_vec(),
                })
            })
        }
        None => {
            debug!("Unknown extra data block signature {:#010x}", signature);
            ExtraData::Damaged(DamagedBlock {
                signature,
                error: "unknown signature".to_string(),
                data: data.to_vec(),
            })
        }
    };

    ExtraDataBlock {
        size,
        signature,
        kind,
    }
}

fn damaged(size: u32, signature: u32, error: String, data: &[u8]) -> ExtraDataBlock {
    ExtraDataBlock {
        size,
        signature,
        kind: ExtraData::Damaged(DamagedBlock {
            signature,
            error,
            data: data.to_vec(),
        }),
    }
}

fn read_target_strings(body: &mut ByteReader<'_>) -> Result<TargetStrings> {
    let ansi = body.read_fixed_ansi(ANSI_TARGET_SIZE)?;
    let unicode = if body.remaining() >= UNICODE_TARGET_SIZE {
        Some(body.read_fixed_utf16(UNICODE_TARGET_SIZE)?)
    } else {
        None
    };
    Ok(TargetStrings { ansi, unicode })
}

fn decode_environment_variable(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::EnvironmentVariable(read_target_strings(body)?))
}

fn decode_darwin(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::Darwin(read_target_strings(body)?))
}

fn decode_icon_environment(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::IconEnvironment(read_target_strings(body)?))
}

fn decode_console(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    let fill_attributes = body.read_u16()?;
    let popup_fill_attributes = body.read_u16()?;
    let screen_buffer_size_x = body.read_i16()?;
    let screen_buffer_size_y = body.read_i16()?;
    let window_size_x = body.read_i16()?;
    let window_size_y = body.read_i16()?;
    let window_origin_x = body.read_i16()?;
    let window_origin_y = body.read_i16()?;
    body.skip(8)?;
    let font_size = body.read_u32()?;
    let font_family = body.read_u32()?;
    let font_weight = body.read_u32()?;
    let face_name = body.read_fixed_utf16(64)?;
    let cursor_size = body.read_u32()?;
    let full_screen = body.read_u32()? != 0;
    let quick_edit = body.read_u32()? != 0;
    let insert_mode = body.read_u32()? != 0;
    let auto_position = body.read_u32()? != 0;
    let history_buffer_size = body.read_u32()?;
    let number_of_history_buffers = body.read_u32()?;
    let history_no_dup = body.read_u32()? != 0;

    let mut color_table = [0u32; 16];
    for color in color_table.iter_mut() {
        *color = body.read_u32()?;
    }

    Ok(ExtraData::Console(Box::new(ConsoleBlock {
        fill_attributes,
        popup_fill_attributes,
        screen_buffer_size_x,
        screen_buffer_size_y,
        window_size_x,
        window_size_y,
        window_origin_x,
        window_origin_y,
        font_size,
        font_family,
        font_weight,
        face_name,
        cursor_size,
        full_screen,
        quick_edit,
        insert_mode,
        auto_position,
        history_buffer_size,
        number_of_history_buffers,
        history_no_dup,
        color_table,
    })))
}

fn decode_console_fe(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::ConsoleFe {
        code_page: body.read_u32()?,
    })
}

fn decode_known_folder(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::KnownFolder {
        guid: body.read_guid()?,
        offset: body.read_u32()?,
    })
}

fn decode_special_folder(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::SpecialFolder {
        id: body.read_u32()?,
        offset: body.read_u32()?,
    })
}

fn decode_property_store(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::PropertyStore(PropertyStore::from_reader(body)?))
}

fn decode_shim(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    let len = body.remaining();
    Ok(ExtraData::Shim {
        layer_name: body.read_fixed_utf16(len)?,
    })
}

fn decode_tracker(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::Tracker(TrackerBlock {
        length: body.read_u32()?,
        version: body.read_u32()?,
        machine_id: body.read_fixed_ansi(16)?,
        volume_droid: body.read_guid()?,
        file_droid: body.read_guid()?,
        birth_volume_droid: body.read_guid()?,
        birth_file_droid: body.read_guid()?,
    }))
}

fn decode_vista_id_list(body: &mut ByteReader<'_>) -> Result<ExtraData> {
    Ok(ExtraData::VistaAndAboveIdList(decode_items(body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tracker_block() -> Vec<u8> {
        let mut data = vec![
            96, 0, 0, 0, 3, 0, 0, 160, 88, 0, 0, 0, 0, 0, 0, 0, 100, 101, 115, 107, 116, 111, 112,
            45, 101, 105, 115, 57, 51, 56, 110, 0, 104, 69, 141, 62, 17, 228, 24, 73, 143, 120,
            151, 205, 108, 179, 64, 197, 192, 88, 241, 9, 106, 90, 237, 17, 161, 13, 8, 0, 39, 110,
            180, 94,
        ];
        let droids = data[32..64].to_vec();
        data.extend_from_slice(&droids);
        data
    }

    fn decode(data: &[u8]) -> Vec<ExtraDataBlock> {
        decode_extra_data(&mut ByteReader::new(data))
    }

    #[test]
    fn test_tracker() {
        let blocks = decode(&tracker_block());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].size, 96);

        match &blocks[0].kind {
            ExtraData::Tracker(tracker) => {
                assert_eq!(tracker.length, 88);
                assert_eq!(tracker.version, 0);
                assert_eq!(tracker.machine_id, "desktop-eis938n");
                assert_eq!(
                    tracker.file_droid.to_string(),
                    "09f158c0-5a6a-11ed-a10d-0800276eb45e"
                );
                assert_eq!(tracker.mac_address(), "08:00:27:6e:b4:5e");
                assert_eq!(tracker.creation_time().unwrap().timestamp(), 1_667_364_699);
                assert_eq!(tracker.birth_file_droid, tracker.file_droid);
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_known_folder() {
        let data = [
            28, 0, 0, 0, 11, 0, 0, 160, 182, 99, 94, 144, 191, 193, 78, 73, 178, 156, 101, 183, 50,
            211, 210, 26, 177, 0, 0, 0,
        ];
        let blocks = decode(&data);
        match &blocks[0].kind {
            ExtraData::KnownFolder { guid, offset } => {
                assert_eq!(guid.to_string(), "905e63b6-c1bf-494e-b29c-65b732d3d21a");
                assert_eq!(descriptions::known_folder_name(guid), Some("ProgramFiles"));
                assert_eq!(*offset, 177);
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_special_folder() {
        let data = [16, 0, 0, 0, 5, 0, 0, 160, 38, 0, 0, 0, 177, 0, 0, 0];
        let blocks = decode(&data);
        assert_eq!(blocks[0].kind, ExtraData::SpecialFolder { id: 38, offset: 177 });
        assert_eq!(
            blocks[0].to_string(),
            "Special folder data block: 38 (Program Files)"
        );
    }

    #[test]
    fn test_property_store_block() {
        let data = [
            69, 0, 0, 0, 9, 0, 0, 160, 57, 0, 0, 0, 49, 83, 80, 83, 177, 22, 109, 68, 173, 141,
            112, 72, 167, 72, 64, 46, 164, 61, 120, 140, 29, 0, 0, 0, 104, 0, 0, 0, 0, 72, 0, 0, 0,
            144, 47, 84, 8, 0, 0, 0, 0, 0, 0, 80, 31, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let blocks = decode(&data);
        match &blocks[0].kind {
            ExtraData::PropertyStore(store) => {
                assert_eq!(store.sheets.len(), 1);
                assert_eq!(
                    store.sheets[0].get_id(104).unwrap().to_string(),
                    "08542f90-0000-0000-0000-501f00000000"
                );
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_shim() {
        let mut data = vec![62, 0, 0, 0, 8, 0, 0, 160];
        for unit in "gimme more lnks!".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        data.resize(62, 0);

        let blocks = decode(&data);
        assert_eq!(
            blocks[0].kind,
            ExtraData::Shim {
                layer_name: "gimme more lnks!".to_string()
            }
        );
    }

    #[test]
    fn test_environment_variable() {
        let mut data = vec![0x14, 0x03, 0, 0, 1, 0, 0, 160];
        let mut ansi = b"%windir%\\notepad.exe".to_vec();
        ansi.resize(260, 0);
        data.extend_from_slice(&ansi);
        let mut unicode: Vec<u8> = "%windir%\\notepad.exe"
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        unicode.resize(520, 0);
        data.extend_from_slice(&unicode);

        let blocks = decode(&data);
        match &blocks[0].kind {
            ExtraData::EnvironmentVariable(strings) => {
                assert_eq!(strings.ansi, "%windir%\\notepad.exe");
                assert_eq!(strings.unicode.as_deref(), Some("%windir%\\notepad.exe"));
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_console_fe_and_terminal() {
        let data = [12, 0, 0, 0, 4, 0, 0, 160, 0xE9, 0xFD, 0, 0, 0, 0, 0, 0];
        let mut reader = ByteReader::new(&data);
        let blocks = decode_extra_data(&mut reader);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, ExtraData::ConsoleFe { code_page: 65001 });
        assert!(reader.is_empty());
    }

    #[test]
    fn test_unknown_signature_then_known() {
        let mut data = vec![12, 0, 0, 0, 0xEF, 0xBE, 0xAD, 0xDE, 1, 2, 3, 4];
        data.extend_from_slice(&[16, 0, 0, 0, 5, 0, 0, 160, 38, 0, 0, 0, 177, 0, 0, 0]);
        data.extend_from_slice(&[0, 0, 0, 0]);

        let blocks = decode(&data);
        assert_eq!(blocks.len(), 2);
        match &blocks[0].kind {
            ExtraData::Damaged(damaged) => {
                assert_eq!(damaged.signature, 0xDEAD_BEEF);
                assert_eq!(damaged.data, vec![1, 2, 3, 4]);
            }
            other => panic!("unexpected block {:?}", other),
        }
        assert!(matches!(blocks[1].kind, ExtraData::SpecialFolder { id: 38, .. }));
    }

    #[test]
    fn test_bad_body_becomes_damaged() {
        // Known folder body too short for its GUID
        let data = [12, 0, 0, 0, 11, 0, 0, 160, 1, 2, 3, 4];
        let blocks = decode(&data);
        assert!(blocks[0].is_damaged());
        assert_eq!(blocks[0].signature, KNOWN_FOLDER_SIGNATURE);
    }

    #[test]
    fn test_overrunning_block_is_damaged() {
        let data = [200, 0, 0, 0, 3, 0, 0, 160, 1, 2, 3, 4];
        let blocks = decode(&data);
        assert_eq!(blocks.len(), 1);
        match &blocks[0].kind {
            ExtraData::Damaged(damaged) => assert_eq!(damaged.data, vec![1, 2, 3, 4]),
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_small_sizes_stop() {
        assert!(decode(&[3, 0, 0, 0, 1, 2, 3, 4]).is_empty());
        assert!(decode(&[6, 0, 0, 0, 1, 2, 3, 4]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_declared_sizes_cover_chain(bodies in proptest::collection::vec(
            (any::<u32>(), proptest::collection::vec(any::<u8>(), 0..64)),
            0..8,
        )) {
            let mut data = Vec::new();
            for (signature, body) in &bodies {
                // Keep the decoders away from known signatures
                let signature = signature & 0x0FFF_FFFF;
                data.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
                data.extend_from_slice(&signature.to_le_bytes());
                data.extend_from_slice(body);
            }
            data.extend_from_slice(&[0, 0, 0, 0]);

            let mut reader = ByteReader::new(&data);
            let blocks = decode_extra_data(&mut reader);
            prop_assert_eq!(blocks.len(), bodies.len());

            let total: usize = blocks.iter().map(|b| b.size as usize).sum::<usize>() + 4;
            prop_assert_eq!(total, data.len());
            prop_assert!(reader.is_empty());
        }
    }
}
