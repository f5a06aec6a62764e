//! # Windows Shortcut (.lnk) Parser
//!
//! A forensic decoder for Windows Shell Link files written in Rust.
//!
//! ## Features
//!
//! - **Complete structure coverage**: header, target ID list, link info, string data and every extra data block
//! - **Shell items**: root folders, drives, file entries with their extension blocks, network locations, URIs, zip contents, delegates and property views
//! - **Forgiving on damage**: unknown or corrupt sub-records are kept as raw bytes instead of failing the file
//! - **Code page aware**: ANSI strings decode with a configurable code page
//! - **Serde and Python**: optional `Serialize` derives and PyO3 bindings
//!
//! ## Architecture
//!
//! The decoder is built on several layers:
//!
//! 1. **Byte reader**: bounded little-endian cursor with string, GUID and timestamp reads
//! 2. **Header**: fixed 76-byte record selecting the optional structures
//! 3. **Shell items**: length-prefixed records of the target ID list, with "beef" extension blocks
//! 4. **Link info**: volume and network share of the target
//! 5. **Extra data**: signature-tagged blocks after the string data
//! 6. **Property stores**: serialized property sheets used by items and blocks
//!
//! ## Binary Layout
//!
//! ```text
//! [Shell Link Header - 76 bytes]
//!   - Header size: 0x4C
//!   - Class id: 00021401-0000-0000-C000-000000000046
//!   - Data flags, attributes, timestamps, size, icon, show command, hot key
//!
//! [Target ID List - optional]
//!   [List size u16]
//!   [Shell items - size u16 each, type byte, data]
//!   [Terminator u16 = 0]
//!
//! [Link Info - optional]
//!   [Size, header size, flags, offsets]
//!   [Volume ID / local base path]
//!   [Common network relative link]
//!   [Common path suffix]
//!
//! [String Data - optional]
//!   - Name, relative path, working dir, arguments, icon location
//!
//! [Extra Data]
//!   [Size u32, signature u32, data]...
//!   [Terminal block, size < 4]
//! ```
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```no_run
//! use lnk_parser::Link;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let link = Link::open("Notepad.lnk")?;
//!
//! println!("Target: {:?}", link.target_path());
//! println!("Arguments: {:?}", link.arguments);
//!
//! for item in &link.target_id_list {
//!     println!("  {}", item);
//! }
//!
//! if let Some(tracker) = link.tracker() {
//!     println!("Machine: {} ({})", tracker.machine_id, tracker.mac_address());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Decoding From Memory
//!
//! ```no_run
//! use lnk_parser::{Link, ParseOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("Notepad.lnk")?;
//! let options = ParseOptions::with_encoding_label("cp1251")?;
//! let link = Link::parse_with_options(&data, &options)?;
//!
//! for block in &link.extra_data {
//!     println!("{}", block);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod descriptions;
pub mod error;
pub mod extension;
pub mod extra_data;
pub mod guid;
pub mod header;
pub mod link_info;
pub mod lnk;
pub mod property_store;
pub mod shell_item;
pub mod timestamp;
pub mod utils;

// Python bindings (only compiled when python feature is enabled)
#[cfg(feature = "python")]
pub mod python;

// Re-export main types for convenience
pub use batch::{parse_files, BatchReport, BatchSummary};
pub use error::{LnkError, Result};
pub use extension::{Extension, ExtensionBlock, FileEntryExtension, MftInformation};
pub use extra_data::{ExtraData, ExtraDataBlock, TrackerBlock};
pub use guid::Guid;
pub use header::{DataFlags, FileAttributes, HotKey, ShellLinkHeader, ShowCommand};
pub use link_info::{DriveType, LinkInfo, NetworkShareInfo, VolumeInfo};
pub use lnk::{Link, ParseOptions, SourceInfo};
pub use property_store::{PropertyKey, PropertySheet, PropertyStore, PropertyValue};
pub use shell_item::{ShellItem, ShellItemKind};
pub use timestamp::{DosDateTime, FileTime};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
