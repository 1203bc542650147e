use crate::error::{Result, ShapeZipError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use super::{read_u16, read_u32};

/// Central directory file header signature ("PK\x01\x02")
pub const CENTRAL_ENTRY_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];

/// Fixed part of a central directory header, excluding name/extra/comment
pub const CENTRAL_ENTRY_SIZE: usize = 46;

/// Version needed to extract: 2.0 (deflate)
pub const VERSION_DEFLATE: u16 = 20;

/// Version needed to extract: 6.3 (zstd)
pub const VERSION_ZSTD: u16 = 63;

/// General purpose flag bit 11: file name is UTF-8
pub const FLAG_UTF8: u16 = 1 << 11;

/// Maximum entry name length in bytes
pub const MAX_NAME_LENGTH: usize = u16::MAX as usize;

/// Compression methods supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum CompressionMethod {
    Stored = 0,
    Deflate = 8,
    Zstd = 93,
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::Stored),
            8 => Ok(Self::Deflate),
            93 => Ok(Self::Zstd),
            _ => Err(ShapeZipError::InvalidCompression(value)),
        }
    }

    /// Minimum reader version required for this method
    pub fn version_needed(self) -> u16 {
        match self {
            Self::Stored | Self::Deflate => VERSION_DEFLATE,
            Self::Zstd => VERSION_ZSTD,
        }
    }
}

impl Default for CompressionMethod {
    fn default() -> Self {
        Self::Deflate
    }
}

/// Central directory entry metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralEntry {
    pub name: String,
    pub compression: CompressionMethod,
    pub flags: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    /// Offset of the entry's local header from the start of the container
    pub local_header_offset: u32,
}

impl CentralEntry {
    /// Serialized size including the name
    pub fn encoded_size(&self) -> usize {
        CENTRAL_ENTRY_SIZE + self.name.len()
    }

    /// Write entry to central directory
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let name_bytes = self.name.as_bytes();
        if name_bytes.len() > MAX_NAME_LENGTH {
            return Err(ShapeZipError::PathError(format!(
                "Name too long: {} bytes (max {})",
                name_bytes.len(),
                MAX_NAME_LENGTH
            )));
        }

        let version = self.compression.version_needed();

        writer.write_all(&CENTRAL_ENTRY_SIGNATURE)?;
        writer.write_all(&version.to_le_bytes())?; // version made by
        writer.write_all(&version.to_le_bytes())?; // version needed
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&(self.compression as u16).to_le_bytes())?;
        writer.write_all(&self.mod_time.to_le_bytes())?;
        writer.write_all(&self.mod_date.to_le_bytes())?;
        writer.write_all(&self.crc32.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        writer.write_all(&self.uncompressed_size.to_le_bytes())?;
        writer.write_all(&(name_bytes.len() as u16).to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?; // extra field length
        writer.write_all(&0u16.to_le_bytes())?; // comment length
        writer.write_all(&0u16.to_le_bytes())?; // disk number start
        writer.write_all(&0u16.to_le_bytes())?; // internal attributes
        writer.write_all(&0u32.to_le_bytes())?; // external attributes
        writer.write_all(&self.local_header_offset.to_le_bytes())?;
        writer.write_all(name_bytes)?;

        Ok(CENTRAL_ENTRY_SIZE + name_bytes.len())
    }

    /// Read entry from central directory
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig != CENTRAL_ENTRY_SIGNATURE {
            return Err(ShapeZipError::InvalidFormat(
                "Invalid central directory entry signature".to_string(),
            ));
        }

        let _version_made_by = read_u16(&mut reader)?;
        let _version_needed = read_u16(&mut reader)?;
        let flags = read_u16(&mut reader)?;
        let compression = CompressionMethod::from_u16(read_u16(&mut reader)?)?;
        let mod_time = read_u16(&mut reader)?;
        let mod_date = read_u16(&mut reader)?;
        let crc32 = read_u32(&mut reader)?;
        let compressed_size = read_u32(&mut reader)?;
        let uncompressed_size = read_u32(&mut reader)?;
        let name_len = read_u16(&mut reader)?;
        let extra_len = read_u16(&mut reader)?;
        let comment_len = read_u16(&mut reader)?;
        let _disk_start = read_u16(&mut reader)?;
        let _internal_attrs = read_u16(&mut reader)?;
        let _external_attrs = read_u32(&mut reader)?;
        let local_header_offset = read_u32(&mut reader)?;

        let mut name_buf = vec![0u8; name_len as usize];
        reader.read_exact(&mut name_buf)?;
        let name = String::from_utf8(name_buf)
            .map_err(|e| ShapeZipError::PathError(format!("Invalid UTF-8 in name: {}", e)))?;

        // Skip extra field and comment
        let mut skip = vec![0u8; extra_len as usize + comment_len as usize];
        reader.read_exact(&mut skip)?;

        Ok(Self {
            name,
            compression,
            flags,
            mod_time,
            mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            local_header_offset,
        })
    }
}
