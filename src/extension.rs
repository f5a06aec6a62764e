//! Shell item extension blocks.
//!
//! File entry, root folder and delegate items may carry trailing extension
//! blocks. Each block starts with a 16-bit size, a 16-bit version and a
//! 32-bit signature of the form 0xBEEFxxxx.

use crate::descriptions;
use crate::error::Result;
use crate::guid::Guid;
use crate::timestamp::{DosDateTime, FileTime};
use crate::utils::{read_u16_le, ByteReader};
use encoding_rs::Encoding;
use std::fmt;
use tracing::{debug, trace};

/// Size of the common block header: size, version and signature.
pub const EXTENSION_HEADER_SIZE: usize = 8;

/// Folder identifier.
pub const BEEF0003: u32 = 0xBEEF_0003;
/// File entry extension (long name, FAT times, MFT reference).
pub const BEEF0004: u32 = 0xBEEF_0004;
/// File document type.
pub const BEEF001A: u32 = 0xBEEF_001A;
/// Two FILETIMEs.
pub const BEEF0025: u32 = 0xBEEF_0025;
/// Creation, modification and access FILETIMEs.
pub const BEEF0026: u32 = 0xBEEF_0026;

type ExtensionDecoder = fn(&mut ByteReader<'_>, u16) -> Result<Extension>;

/// Decoders keyed by signature. The reader is positioned after the header.
static DECODERS: &[(u32, ExtensionDecoder)] = &[
    (BEEF0004, decode_beef0004),
    (BEEF0003, decode_beef0003),
    (BEEF0025, decode_beef0025),
    (BEEF0026, decode_beef0026),
    (BEEF001A, decode_beef001a),
];

/// NTFS file reference: a 48-bit MFT entry and a 16-bit sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MftInformation {
    /// MFT entry number.
    pub entry: u64,
    /// Sequence number.
    pub sequence: u16,
}

impl MftInformation {
    /// Splits a packed little-endian file reference.
    pub fn from_packed(packed: u64) -> Self {
        MftInformation {
            entry: packed & 0x0000_FFFF_FFFF_FFFF,
            sequence: (packed >> 48) as u16,
        }
    }

    /// Packs the reference back into its on-disk form.
    pub fn packed(&self) -> u64 {
        (self.entry & 0x0000_FFFF_FFFF_FFFF) | (u64::from(self.sequence) << 48)
    }

    /// Entry number, or `None` when no entry was recorded (zero).
    pub fn entry_number(&self) -> Option<u64> {
        if self.entry > 0 {
            Some(self.entry)
        } else {
            None
        }
    }

    /// Sequence number, present only alongside an entry number.
    pub fn sequence_number(&self) -> Option<u16> {
        self.entry_number().map(|_| self.sequence)
    }
}

impl fmt::Display for MftInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry_number() {
            Some(entry) => write!(f, "{}/{}", entry, self.sequence),
            None => Ok(()),
        }
    }
}

/// Contents of a 0xBEEF0004 block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileEntryExtension {
    /// Creation time (FAT).
    pub created: DosDateTime,
    /// Last access time (FAT).
    pub accessed: DosDateTime,
    /// Windows version that wrote the item.
    pub identifier: u16,
    /// File reference, version 7 and later.
    pub mft: Option<MftInformation>,
    /// Long (Unicode) name.
    pub long_name: String,
    /// Localized name, when one was stored.
    pub localized_name: Option<String>,
    /// Offset of this block within its shell item.
    pub version_offset: u16,
}

impl FileEntryExtension {
    /// Name of the Windows release matching the identifier.
    pub fn windows_version(&self) -> &'static str {
        match self.identifier {
            0x14 => "Windows XP, 2003",
            0x26 => "Windows Vista",
            0x2A => "Windows 2008, 7, 8.0",
            0x2E => "Windows 8.1, 10, 11",
            _ => "Unknown",
        }
    }
}

/// Decoded body of an extension block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Extension {
    /// 0xBEEF0004: file entry extension.
    Beef0004(FileEntryExtension),
    /// 0xBEEF0003: folder identifier.
    Beef0003 {
        /// Folder GUID.
        guid: Guid,
    },
    /// 0xBEEF0025: two FILETIMEs.
    Beef0025 {
        /// First FILETIME.
        first: FileTime,
        /// Second FILETIME.
        second: FileTime,
    },
    /// 0xBEEF0026: FILETIME timestamps.
    Beef0026 {
        /// Creation time.
        created: FileTime,
        /// Modification time.
        modified: FileTime,
        /// Access time.
        accessed: FileTime,
    },
    /// 0xBEEF001A: file document type.
    Beef001A {
        /// Document type string.
        document_type: String,
    },
    /// Anything else, or a block that failed to decode.
    Unknown {
        /// Block bytes following the header.
        data: Vec<u8>,
    },
}

/// A single extension block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtensionBlock {
    /// Declared size including the header.
    pub size: u16,
    /// Block version.
    pub version: u16,
    /// Block signature.
    pub signature: u32,
    /// Decoded contents.
    pub kind: Extension,
}

impl ExtensionBlock {
    /// Decodes one block. The reader must span exactly the declared size.
    ///
    /// A body that fails to decode is kept as [`Extension::Unknown`].
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let size = reader.read_u16()?;
        let version = reader.read_u16()?;
        let signature = reader.read_u32()?;
        let body_start = reader.position();

        let kind = match DECODERS.iter().find(|(sig, _)| *sig == signature) {
            Some((_, decode)) => {
                trace!("Decoding extension block {:#010x} v{}", signature, version);
                match decode(reader, version) {
                    Ok(kind) => kind,
                    Err(e) => {
                        debug!(
                            "Extension block {:#010x} kept raw: {}",
                            signature, e
                        );
                        Extension::Unknown {
                            data: reader.data()[body_start..].to_vec(),
                        }
                    }
                }
            }
            None => Extension::Unknown {
                data: reader.read_to_end().to_vec(),
            },
        };

        Ok(ExtensionBlock {
            size,
            version,
            signature,
            kind,
        })
    }

    /// The 0xBEEF0004 contents, if this is such a block.
    pub fn file_entry(&self) -> Option<&FileEntryExtension> {
        match &self.kind {
            Extension::Beef0004(entry) => Some(entry),
            _ => None,
        }
    }

    /// Human readable name of the block type.
    pub fn name(&self) -> &'static str {
        match self.signature {
            BEEF0003 => "Beef0003",
            BEEF0004 => "Beef0004",
            BEEF001A => "Beef001a",
            BEEF0025 => "Beef0025",
            BEEF0026 => "Beef0026",
            _ => "Unknown extension block",
        }
    }
}

impl fmt::Display for ExtensionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Extension::Beef0004(entry) => {
                write!(f, "{}: {}", self.name(), entry.long_name)?;
                if let Some(mft) = entry.mft.filter(|m| m.entry_number().is_some()) {
                    write!(f, " (MFT {})", mft)?;
                }
                Ok(())
            }
            Extension::Beef0003 { guid } => match descriptions::shell_folder_name(guid) {
                Some(name) => write!(f, "{}: {} ({})", self.name(), guid, name),
                None => write!(f, "{}: {}", self.name(), guid),
            },
            Extension::Beef0025 { first, second } => {
                write!(f, "{}: {} / {}", self.name(), first, second)
            }
            Extension::Beef0026 {
                created,
                modified,
                accessed,
            } => write!(
                f,
                "{}: created {}, modified {}, accessed {}",
                self.name(),
                created,
                modified,
                accessed
            ),
            Extension::Beef001A { document_type } => write!(f, "{}: {}", self.name(), document_type),
            Extension::Unknown { data } => {
                write!(f, "{:#010x}: {} bytes", self.signature, data.len())
            }
        }
    }
}

/// Decodes consecutive extension blocks from `data`.
///
/// Stops at a zero size, at a size too small for the header, at a block
/// running past the end of `data`, or when fewer than two bytes remain.
pub fn decode_extension_blocks(data: &[u8], encoding: &'static Encoding) -> Vec<ExtensionBlock> {
    let mut reader = ByteReader::with_encoding(data, encoding);
    let mut blocks = Vec::new();

    while reader.remaining() >= 2 {
        let size = match reader.peek_u16() {
            Ok(size) => size as usize,
            Err(_) => break,
        };
        if size < EXTENSION_HEADER_SIZE {
            break;
        }
        if size > reader.remaining() {
            debug!(
                "Extension block size {} exceeds remaining {} bytes",
                size,
                reader.remaining()
            );
            break;
        }

        let mut block = match reader.sub_reader(size) {
            Ok(block) => block,
            Err(_) => break,
        };
        match ExtensionBlock::parse(&mut block) {
            Ok(block) => blocks.push(block),
            Err(e) => {
                debug!("Stopping extension block decode: {}", e);
                break;
            }
        }
    }

    blocks
}

/// Finds the start of the first extension block at or after `from`.
///
/// Blocks are located by their 0xBEEF signature suffix, six bytes in.
pub fn find_extension_start(data: &[u8], from: usize) -> Option<usize> {
    let search = data.get(from.checked_add(6)?..)?;
    search
        .windows(2)
        .position(|w| w == [0xEF, 0xBE])
        .map(|idx| from + idx)
}

fn decode_beef0004(reader: &mut ByteReader<'_>, version: u16) -> Result<Extension> {
    let block = reader.data();
    let version_offset = read_u16_le(block, block.len().saturating_sub(2))?;

    let created = reader.read_dos_datetime()?;
    let accessed = reader.read_dos_datetime()?;
    let identifier = reader.read_u16()?;

    let mut mft = None;
    if version >= 7 {
        reader.skip(2)?;
        mft = Some(MftInformation::from_packed(reader.read_u64()?));
        reader.skip(8)?;
    }

    let mut long_string_size = 0;
    if version >= 3 {
        long_string_size = reader.read_u16()?;
    }
    if version >= 9 {
        reader.skip(4)?;
    }
    if version >= 8 {
        reader.skip(4)?;
    }

    let mut long_name = String::new();
    let mut localized_name = None;
    if version >= 3 {
        long_name = reader.read_utf16_nul()?;
        if long_string_size > 0 {
            localized_name = Some(if version >= 7 {
                reader.read_utf16_nul()?
            } else {
                reader.read_ansi_nul()?
            });
        }
    }

    Ok(Extension::Beef0004(FileEntryExtension {
        created,
        accessed,
        identifier,
        mft,
        long_name,
        localized_name,
        version_offset,
    }))
}

fn decode_beef0003(reader: &mut ByteReader<'_>, _version: u16) -> Result<Extension> {
    Ok(Extension::Beef0003 {
        guid: reader.read_guid()?,
    })
}

fn decode_beef0025(reader: &mut ByteReader<'_>, _version: u16) -> Result<Extension> {
    reader.skip(4)?;
    Ok(Extension::Beef0025 {
        first: reader.read_filetime()?,
        second: reader.read_filetime()?,
    })
}

fn decode_beef0026(reader: &mut ByteReader<'_>, _version: u16) -> Result<Extension> {
    reader.skip(4)?;
    Ok(Extension::Beef0026 {
        created: reader.read_filetime()?,
        modified: reader.read_filetime()?,
        accessed: reader.read_filetime()?,
    })
}

fn decode_beef001a(reader: &mut ByteReader<'_>, _version: u16) -> Result<Extension> {
    reader.skip(2)?;
    Ok(Extension::Beef001A {
        document_type: reader.read_utf16_nul()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use proptest::prelude::*;

    const DOWNLOADS: [u8; 70] = [
        68, 0, 9, 0, 4, 0, 239, 190, 196, 78, 156, 189, 110, 82, 80, 173, 46, 0, 0, 0, 62, 128, 5,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 68, 0, 111, 0, 119, 0,
        110, 0, 108, 0, 111, 0, 97, 0, 100, 0, 115, 0, 0, 0, 24, 0, 0, 0,
    ];

    #[test]
    fn test_beef0004() {
        let blocks = decode_extension_blocks(&DOWNLOADS, WINDOWS_1252);
        assert_eq!(blocks.len(), 1);

        let block = &blocks[0];
        assert_eq!(block.size, 68);
        assert_eq!(block.version, 9);
        assert_eq!(block.signature, BEEF0004);

        let entry = block.file_entry().unwrap();
        assert_eq!(entry.long_name, "Downloads");
        assert_eq!(entry.localized_name, None);
        assert_eq!(entry.identifier, 0x2E);
        assert_eq!(entry.version_offset, 24);
        assert_eq!(
            entry.created.to_datetime().unwrap().timestamp(),
            1_559_691_896
        );
        assert_eq!(
            entry.accessed.to_datetime().unwrap().timestamp(),
            1_615_758_152
        );

        let mft = entry.mft.unwrap();
        assert_eq!(mft.entry_number(), Some(360_510));
        assert_eq!(mft.sequence, 0);
    }

    #[test]
    fn test_beef0026() {
        let data = [
            38, 0, 1, 0, 38, 0, 239, 190, 16, 0, 0, 0, 178, 163, 12, 39, 105, 130, 214, 1, 247, 34,
            66, 226, 189, 132, 214, 1, 198, 63, 64, 72, 190, 132, 214, 1, 20, 0, 0, 0,
        ];
        let blocks = decode_extension_blocks(&data, WINDOWS_1252);
        match &blocks[0].kind {
            Extension::Beef0026 {
                created,
                modified,
                accessed,
            } => {
                assert_eq!(created.to_datetime().unwrap().timestamp(), 1_599_189_119);
                assert_eq!(modified.to_datetime().unwrap().timestamp(), 1_599_445_413);
                assert_eq!(accessed.to_datetime().unwrap().timestamp(), 1_599_445_584);
            }
            other => panic!("unexpected extension {:?}", other),
        }
    }

    #[test]
    fn test_unknown_signature_kept_raw() {
        let data = [10, 0, 1, 0, 0x99, 0x00, 0xEF, 0xBE, 0xAA, 0xBB];
        let blocks = decode_extension_blocks(&data, WINDOWS_1252);
        assert_eq!(blocks[0].signature, 0xBEEF_0099);
        assert_eq!(
            blocks[0].kind,
            Extension::Unknown {
                data: vec![0xAA, 0xBB]
            }
        );
    }

    #[test]
    fn test_oversized_block_stops() {
        let data = [0xFF, 0x00, 9, 0, 4, 0, 239, 190];
        assert!(decode_extension_blocks(&data, WINDOWS_1252).is_empty());
    }

    #[test]
    fn test_find_extension_start() {
        let mut data = vec![0x41, 0x42, 0x00, 0x00];
        data.extend_from_slice(&DOWNLOADS);
        assert_eq!(find_extension_start(&data, 2), Some(4));
        assert_eq!(find_extension_start(&[0u8; 4], 0), None);
    }

    #[test]
    fn test_mft_zero_entry_is_absent() {
        let mft = MftInformation::from_packed(0x0005_0000_0000_0000);
        assert_eq!(mft.entry, 0);
        assert_eq!(mft.sequence, 5);
        assert_eq!(mft.entry_number(), None);
        assert_eq!(mft.sequence_number(), None);
        assert_eq!(mft.to_string(), "");
    }

    proptest! {
        #[test]
        fn prop_mft_packing_round_trip(entry in 0u64..(1 << 48), sequence in any::<u16>()) {
            let mft = MftInformation { entry, sequence };
            let unpacked = MftInformation::from_packed(mft.packed());
            prop_assert_eq!(unpacked, mft);
            prop_assert_eq!(unpacked.entry_number().is_some(), entry > 0);
        }
    }
}
