//! Utility functions for binary parsing and string conversion.
//!
//! [`ByteReader`] is the cursor every decoder in the crate is built on. Nested
//! structures get their own reader over a bounded sub-slice, so offsets inside
//! them are always relative to the structure start.

use crate::error::{LnkError, Result};
use crate::guid::{Guid, GUID_SIZE};
use crate::timestamp::{DosDateTime, FileTime};
use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::{Encoding, UTF_16LE, WINDOWS_1252};

/// Reads an ASCII string from a byte slice, trimming null terminators.
///
/// Uses lossy conversion to handle any invalid UTF-8 bytes gracefully.
pub fn read_ascii_string(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .trim_end_matches('\0')
        .to_string()
}

/// Reads a UTF-16LE string from a byte slice, trimming null terminators.
///
/// Unpaired surrogates are replaced rather than rejected.
///
/// # Errors
///
/// Returns an error if the data length is not even (UTF-16 requires 2-byte units).
pub fn read_utf16_string(data: &[u8], offset: u32) -> Result<String> {
    if data.is_empty() {
        return Ok(String::new());
    }

    if data.len() % 2 != 0 {
        return Err(LnkError::InvalidUtf16 { offset });
    }

    let (decoded, _had_errors) = UTF_16LE.decode_without_bom_handling(data);
    Ok(decoded.trim_end_matches('\0').to_string())
}

/// Decodes a narrow string in the given code page, trimming null terminators.
pub fn decode_ansi(data: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _had_errors) = encoding.decode_without_bom_handling(data);
    decoded.trim_end_matches('\0').to_string()
}

/// Returns the bytes before the first NUL.
pub fn until_nul(data: &[u8]) -> &[u8] {
    match data.iter().position(|&b| b == 0) {
        Some(end) => &data[..end],
        None => data,
    }
}

/// Returns the bytes before the first UTF-16 NUL (an aligned zero pair).
pub fn until_nul_utf16(data: &[u8]) -> &[u8] {
    let end = data
        .chunks_exact(2)
        .position(|c| c == [0, 0])
        .map_or(data.len() - data.len() % 2, |units| units * 2);
    &data[..end]
}

/// Finds the first occurrence of `needle` in `data`.
pub fn find_bytes(data: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || data.len() < needle.len() {
        return None;
    }
    data.windows(needle.len()).position(|w| w == needle)
}

/// Reads a u32 from a byte slice at the given offset.
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    let mut bytes = slice_at(data, offset, 4)?;
    Ok(bytes.read_u32::<LittleEndian>()?)
}

/// Reads a u16 from a byte slice at the given offset.
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    let mut bytes = slice_at(data, offset, 2)?;
    Ok(bytes.read_u16::<LittleEndian>()?)
}

/// Returns `len` bytes at `offset`, or a truncation error.
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| LnkError::truncated(offset, len, data.len()))
}

/// Cursor over an immutable byte slice.
///
/// Every read advances by exactly the number of bytes requested or fails with
/// [`LnkError::TruncatedData`]; nothing is ever zero-filled.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    encoding: &'static Encoding,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader using the windows-1252 code page for ANSI strings.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_encoding(data, WINDOWS_1252)
    }

    /// Creates a reader decoding narrow strings with `encoding`.
    pub fn with_encoding(data: &'a [u8], encoding: &'static Encoding) -> Self {
        Self {
            data,
            pos: 0,
            encoding,
        }
    }

    /// Code page used for narrow strings.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Current offset from the start of this reader's slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of this reader's slice.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true when the cursor is at the end.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The whole underlying slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The bytes after the cursor, without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Moves the cursor to an absolute offset within the slice.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(LnkError::truncated(self.pos, pos - self.pos, self.data.len()));
        }
        self.pos = pos;
        Ok(())
    }

    /// Advances the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Skips padding up to the next multiple of `alignment`, stopping at the end.
    pub fn align(&mut self, alignment: usize) {
        let pad = (alignment - self.pos % alignment) % alignment;
        self.pos = (self.pos + pad).min(self.data.len());
    }

    /// Reads exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = slice_at(self.data, self.pos, n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Reads the remaining bytes.
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let rest = self.rest();
        self.pos = self.data.len();
        rest
    }

    /// Splits off a reader over the next `n` bytes and advances past them.
    ///
    /// The returned reader has its own zero-based cursor and cannot read
    /// beyond the `n` bytes.
    pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'a>> {
        let bytes = self.read_bytes(n)?;
        Ok(ByteReader::with_encoding(bytes, self.encoding))
    }

    /// Reads a u16 without advancing.
    pub fn peek_u16(&self) -> Result<u16> {
        read_u16_le(self.data, self.pos)
    }

    /// Reads a u32 without advancing.
    pub fn peek_u32(&self) -> Result<u32> {
        read_u32_le(self.data, self.pos)
    }

    /// Reads a u8.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut bytes = self.read_bytes(1)?;
        Ok(bytes.read_u8()?)
    }

    /// Reads a little-endian u16.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut bytes = self.read_bytes(2)?;
        Ok(bytes.read_u16::<LittleEndian>()?)
    }

    /// Reads a little-endian i16.
    pub fn read_i16(&mut self) -> Result<i16> {
        let mut bytes = self.read_bytes(2)?;
        Ok(bytes.read_i16::<LittleEndian>()?)
    }

    /// Reads a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut bytes = self.read_bytes(4)?;
        Ok(bytes.read_u32::<LittleEndian>()?)
    }

    /// Reads a little-endian i32.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut bytes = self.read_bytes(4)?;
        Ok(bytes.read_i32::<LittleEndian>()?)
    }

    /// Reads a little-endian u64.
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut bytes = self.read_bytes(8)?;
        Ok(bytes.read_u64::<LittleEndian>()?)
    }

    /// Reads a little-endian i64.
    pub fn read_i64(&mut self) -> Result<i64> {
        let mut bytes = self.read_bytes(8)?;
        Ok(bytes.read_i64::<LittleEndian>()?)
    }

    /// Reads a little-endian f32.
    pub fn read_f32(&mut self) -> Result<f32> {
        let mut bytes = self.read_bytes(4)?;
        Ok(bytes.read_f32::<LittleEndian>()?)
    }

    /// Reads a little-endian f64.
    pub fn read_f64(&mut self) -> Result<f64> {
        let mut bytes = self.read_bytes(8)?;
        Ok(bytes.read_f64::<LittleEndian>()?)
    }

    /// Reads a 16-byte GUID.
    pub fn read_guid(&mut self) -> Result<Guid> {
        Guid::from_slice(self.read_bytes(GUID_SIZE)?)
    }

    /// Reads a 64-bit FILETIME.
    pub fn read_filetime(&mut self) -> Result<FileTime> {
        Ok(FileTime::new(self.read_u64()?))
    }

    /// Reads a 32-bit FAT date and time.
    pub fn read_dos_datetime(&mut self) -> Result<DosDateTime> {
        Ok(DosDateTime::new(self.read_u32()?))
    }

    /// Reads `n` bytes as an ANSI string in the reader's code page.
    pub fn read_ansi(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_bytes(n)?;
        Ok(decode_ansi(bytes, self.encoding))
    }

    /// Reads `chars` UTF-16 code units.
    pub fn read_utf16(&mut self, chars: usize) -> Result<String> {
        let offset = self.pos as u32;
        let len = chars
            .checked_mul(2)
            .ok_or_else(|| LnkError::truncated(self.pos, usize::MAX, self.data.len()))?;
        let bytes = self.read_bytes(len)?;
        read_utf16_string(bytes, offset)
    }

    /// Reads a NUL-terminated ANSI string, consuming the terminator.
    ///
    /// An unterminated string runs to the end of the slice.
    pub fn read_ansi_nul(&mut self) -> Result<String> {
        let text = until_nul(self.rest());
        let consumed = (text.len() + 1).min(self.remaining());
        self.pos += consumed;
        Ok(decode_ansi(text, self.encoding))
    }

    /// Reads a NUL-terminated UTF-16 string, consuming the terminator.
    ///
    /// An unterminated string runs to the end of the slice.
    pub fn read_utf16_nul(&mut self) -> Result<String> {
        let offset = self.pos as u32;
        let text = until_nul_utf16(self.rest());
        let consumed = (text.len() + 2).min(self.remaining());
        self.pos += consumed;
        read_utf16_string(text, offset)
    }

    /// Decodes a fixed-size ANSI field, ignoring anything after the first NUL.
    pub fn read_fixed_ansi(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_bytes(n)?;
        Ok(decode_ansi(until_nul(bytes), self.encoding))
    }

    /// Decodes a fixed-size UTF-16 field, ignoring anything after the first NUL.
    pub fn read_fixed_utf16(&mut self, n: usize) -> Result<String> {
        let offset = self.pos as u32;
        let bytes = self.read_bytes(n)?;
        read_utf16_string(until_nul_utf16(bytes), offset)
    }
}
