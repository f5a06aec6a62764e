//! Error types for shortcut parsing operations.
//!
//! Only conditions that make the whole file undecodable are errors. Unknown
//! shell item types, unknown extra data signatures and corrupt sub-blocks are
//! absorbed by the decoders and surface as `Unknown` / `Damaged` values.

use std::io;
use thiserror::Error;

/// Result type alias for shortcut operations.
pub type Result<T> = std::result::Result<T, LnkError>;

/// Errors that can occur during shortcut parsing.
#[derive(Error, Debug)]
pub enum LnkError {
    /// I/O error occurred while reading the shortcut file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic signature in the header or a nested structure.
    #[error("Invalid signature: expected {}, found {}", hex::encode(expected), hex::encode(found))]
    InvalidSignature {
        /// Signature bytes required by the format.
        expected: Vec<u8>,
        /// Signature bytes actually present.
        found: Vec<u8>,
    },

    /// Structurally inconsistent data.
    #[error("Invalid shortcut format: {0}")]
    InvalidFormat(String),

    /// Fewer bytes available than a length field or fixed layout requires.
    #[error("Truncated data at offset {offset:#x}: expected {expected} bytes, got {actual} bytes")]
    TruncatedData {
        /// Offset of the read, relative to the structure being decoded.
        offset: u32,
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Invalid UTF-16 string data.
    #[error("Invalid UTF-16 string at offset {offset:#x}")]
    InvalidUtf16 {
        /// Offset of the string.
        offset: u32,
    },

    /// Buffer is too small to hold a shell link header.
    #[error("File too small: {size} bytes (minimum: {minimum} bytes)")]
    FileTooSmall {
        /// Size of the buffer.
        size: usize,
        /// Size of the fixed header.
        minimum: usize,
    },
}

impl LnkError {
    /// Creates an invalid signature error with context.
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected signature bytes
    /// * `found` - Actual signature bytes found
    pub fn invalid_signature(expected: &[u8], found: &[u8]) -> Self {
        Self::InvalidSignature {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// Creates a format error with detailed context.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use lnk_parser::error::LnkError;
    /// let offset = 0x1c;
    /// let err = LnkError::format_error(
    ///     format!("Volume ID offset {:#x} outside link info", offset)
    /// );
    /// ```
    pub fn format_error(message: String) -> Self {
        Self::InvalidFormat(message)
    }

    /// Creates a truncation error for a read of `expected` bytes at `offset`
    /// from a buffer of `len` bytes.
    pub fn truncated(offset: usize, expected: usize, len: usize) -> Self {
        Self::TruncatedData {
            offset: offset as u32,
            expected,
            actual: len.saturating_sub(offset),
        }
    }

    /// Returns true for errors caused by running out of input.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::TruncatedData { .. } | Self::FileTooSmall { .. })
    }
}
