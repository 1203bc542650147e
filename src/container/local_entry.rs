use crate::container::format::{CompressionMethod, MAX_NAME_LENGTH};
use crate::error::{Result, ShapeZipError};
use std::io::{Read, Write};

use super::{read_u16, read_u32};

/// Local file header signature ("PK\x03\x04")
pub const LOCAL_ENTRY_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Fixed part of a local header, excluding name and extra field
pub const LOCAL_ENTRY_SIZE: usize = 30;

/// Local File Header
///
/// Precedes each entry's (possibly compressed) data. Sizes and CRC are known
/// before the header is written, so no data descriptor follows the data.
///
/// Structure (30 bytes + name):
/// - Signature: "PK\x03\x04" (4 bytes)
/// - Version Needed: uint16
/// - Flags: uint16
/// - Compression Method: uint16
/// - Modified Time / Date: uint16 + uint16 (MS-DOS)
/// - CRC32: uint32
/// - Compressed Size: uint32
/// - Uncompressed Size: uint32
/// - Name Length: uint16
/// - Extra Length: uint16
/// - Name: variable (UTF-8)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntryHeader {
    pub compression: CompressionMethod,
    pub flags: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name: String,
    /// Length of the extra field that followed the name when read
    pub extra_len: u16,
}

impl LocalEntryHeader {
    /// Write local entry header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let name_bytes = self.name.as_bytes();
        if name_bytes.len() > MAX_NAME_LENGTH {
            return Err(ShapeZipError::PathError(format!(
                "Name too long: {} bytes (max {})",
                name_bytes.len(),
                MAX_NAME_LENGTH
            )));
        }

        writer.write_all(&LOCAL_ENTRY_SIGNATURE)?;
        writer.write_all(&self.compression.version_needed().to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&(self.compression as u16).to_le_bytes())?;
        writer.write_all(&self.mod_time.to_le_bytes())?;
        writer.write_all(&self.mod_date.to_le_bytes())?;
        writer.write_all(&self.crc32.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        writer.write_all(&self.uncompressed_size.to_le_bytes())?;
        writer.write_all(&(name_bytes.len() as u16).to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?; // extra field length
        writer.write_all(name_bytes)?;

        Ok(self.header_size())
    }

    /// Read local entry header from a reader, skipping any extra field
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig != LOCAL_ENTRY_SIGNATURE {
            return Err(ShapeZipError::InvalidFormat(
                "Invalid local entry signature".to_string(),
            ));
        }

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

        let mut name_buf = vec![0u8; name_len as usize];
        reader.read_exact(&mut name_buf)?;
        let name = String::from_utf8(name_buf)
            .map_err(|e| ShapeZipError::PathError(format!("Invalid UTF-8 in name: {}", e)))?;

        let mut extra = vec![0u8; extra_len as usize];
        reader.read_exact(&mut extra)?;

        Ok(Self {
            compression,
            flags,
            mod_time,
            mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            name,
            extra_len,
        })
    }

    /// Total size of this header as stored, including name and extra field
    pub fn header_size(&self) -> usize {
        LOCAL_ENTRY_SIZE + self.name.len() + self.extra_len as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_entry_roundtrip() {
        let entry = LocalEntryHeader {
            compression: CompressionMethod::Zstd,
            flags: 0,
            mod_time: 0,
            mod_date: 0x21,
            crc32: 0x12345678,
            compressed_size: 5000,
            uncompressed_size: 10000,
            name: "parcels.dbf".to_string(),
            extra_len: 0,
        };

        let mut buf = Vec::new();
        let written = entry.write_to(&mut buf).unwrap();

        assert_eq!(written, entry.header_size());
        assert_eq!(written, buf.len());

        let parsed = LocalEntryHeader::read_from(&buf[..]).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_signature_validation() {
        let mut buf = vec![0xFF, 0xFF, 0xFF, 0xFF];
        buf.extend_from_slice(&[0u8; 40]);

        let result = LocalEntryHeader::read_from(&buf[..]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid local entry signature"));
    }
}
