use crate::error::{Result, ShapeZipError};
use std::io::{Read, Write};

use super::{read_u16, read_u32};

/// End of central directory signature ("PK\x05\x06")
pub const END_RECORD_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// End record size in bytes, excluding the trailing comment
pub const END_RECORD_SIZE: usize = 22;

/// End of Central Directory Record
///
/// Located at the end of the container, optionally followed by a comment.
/// Readers locate the central directory from here.
///
/// Structure (22 bytes + comment):
/// - Signature: "PK\x05\x06" (4 bytes)
/// - Disk Number: uint16
/// - Central Directory Disk: uint16
/// - Entries On Disk: uint16
/// - Total Entries: uint16
/// - Central Directory Size: uint32
/// - Central Directory Offset: uint32
/// - Comment Length: uint16
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndRecord {
    pub entry_count: u16,
    pub central_directory_size: u32,
    pub central_directory_offset: u32,
    pub comment_len: u16,
}

impl EndRecord {
    pub fn new(entry_count: u16, central_directory_size: u32, central_directory_offset: u32) -> Self {
        Self {
            entry_count,
            central_directory_size,
            central_directory_offset,
            comment_len: 0,
        }
    }

    /// Write end record to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        writer.write_all(&END_RECORD_SIGNATURE)?;
        writer.write_all(&0u16.to_le_bytes())?; // this disk
        writer.write_all(&0u16.to_le_bytes())?; // central directory disk
        writer.write_all(&self.entry_count.to_le_bytes())?;
        writer.write_all(&self.entry_count.to_le_bytes())?;
        writer.write_all(&self.central_directory_size.to_le_bytes())?;
        writer.write_all(&self.central_directory_offset.to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?; // no comment

        Ok(END_RECORD_SIZE)
    }

    /// Read end record from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig != END_RECORD_SIGNATURE {
            return Err(ShapeZipError::InvalidFormat(
                "Invalid end record signature".to_string(),
            ));
        }

        let disk = read_u16(&mut reader)?;
        let cd_disk = read_u16(&mut reader)?;
        let entries_on_disk = read_u16(&mut reader)?;
        let entry_count = read_u16(&mut reader)?;
        let central_directory_size = read_u32(&mut reader)?;
        let central_directory_offset = read_u32(&mut reader)?;
        let comment_len = read_u16(&mut reader)?;

        if disk != 0 || cd_disk != 0 || entries_on_disk != entry_count {
            return Err(ShapeZipError::InvalidFormat(
                "Multi-disk containers are not supported".to_string(),
            ));
        }

        Ok(Self {
            entry_count,
            central_directory_size,
            central_directory_offset,
            comment_len,
        })
    }

    /// Find the end record by scanning backwards from the end of `data`.
    ///
    /// Returns the record and its offset.
    pub fn locate(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < END_RECORD_SIZE {
            return Err(ShapeZipError::InvalidFormat(format!(
                "Container too small: {} bytes",
                data.len()
            )));
        }

        let last = data.len() - END_RECORD_SIZE;
        let first = last.saturating_sub(u16::MAX as usize);

        for offset in (first..=last).rev() {
            if data[offset..offset + 4] != END_RECORD_SIGNATURE {
                continue;
            }
            match Self::read_from(&data[offset..]) {
                Ok(record)
                    if offset + END_RECORD_SIZE + record.comment_len as usize == data.len() =>
                {
                    return Ok((record, offset));
                }
                _ => continue,
            }
        }

        Err(ShapeZipError::InvalidFormat(
            "End of central directory record not found".to_string(),
        ))
    }

    /// Validate that the central directory fits before the end record
    pub fn validate_against_offset(&self, end_record_offset: usize) -> Result<()> {
        let cd_end = self.central_directory_offset as u64 + self.central_directory_size as u64;
        if cd_end != end_record_offset as u64 {
            return Err(ShapeZipError::InvalidFormat(format!(
                "Central directory ends at {}, end record at {}",
                cd_end, end_record_offset
            )));
        }
        Ok(())
    }
}
