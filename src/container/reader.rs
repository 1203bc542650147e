use crate::container::end_record::EndRecord;
use crate::container::format::{CentralEntry, CompressionMethod};
use crate::container::local_entry::LocalEntryHeader;
use crate::error::{Result, ShapeZipError};
use flate2::read::DeflateDecoder;
use std::collections::HashMap;
use std::io::{Cursor, Read};

/// In-memory ZIP container reader with O(1) entry lookup
pub struct ContainerReader {
    data: Vec<u8>,
    entries: HashMap<String, CentralEntry>,
    entry_list: Vec<String>,
}

impl ContainerReader {
    /// Parse the end record and central directory of `data`
    pub fn new(data: Vec<u8>) -> Result<Self> {
        let (end_record, end_offset) = EndRecord::locate(&data)?;
        end_record.validate_against_offset(end_offset)?;

        let cd_offset = end_record.central_directory_offset as usize;
        let mut cursor = Cursor::new(&data[cd_offset..end_offset]);

        let count = end_record.entry_count as usize;
        let mut entries = HashMap::with_capacity(count);
        let mut entry_list = Vec::with_capacity(count);

        for _ in 0..count {
            let entry = CentralEntry::read_from(&mut cursor)?;
            if entries.contains_key(&entry.name) {
                return Err(ShapeZipError::DuplicateEntry(entry.name));
            }
            entry_list.push(entry.name.clone());
            entries.insert(entry.name.clone(), entry);
        }

        Ok(Self {
            data,
            entries,
            entry_list,
        })
    }

    /// Number of entries in the container
    pub fn entry_count(&self) -> usize {
        self.entry_list.len()
    }

    /// Entry names in central directory order
    pub fn list_entries(&self) -> &[String] {
        &self.entry_list
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Get entry metadata without reading data
    pub fn get_entry(&self, name: &str) -> Option<&CentralEntry> {
        self.entries.get(name)
    }

    /// Read and decompress an entry, verifying its CRC
    pub fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ShapeZipError::EntryNotFound(name.to_string()))?;

        let header_offset = entry.local_header_offset as usize;
        if header_offset >= self.data.len() {
            return Err(ShapeZipError::InvalidFormat(format!(
                "Local header offset {} out of bounds for {}",
                header_offset, name
            )));
        }

        let local = LocalEntryHeader::read_from(&self.data[header_offset..])?;
        if local.name != entry.name {
            return Err(ShapeZipError::InvalidFormat(format!(
                "Local header name {:?} does not match central entry {:?}",
                local.name, entry.name
            )));
        }

        let start = header_offset + local.header_size();
        let end = start
            .checked_add(entry.compressed_size as usize)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                ShapeZipError::InvalidFormat(format!("Entry data for {} out of bounds", name))
            })?;
        let raw = &self.data[start..end];

        let decompressed = match entry.compression {
            CompressionMethod::Stored => raw.to_vec(),
            CompressionMethod::Deflate => Self::decompress_deflate(raw, entry.uncompressed_size)?,
            CompressionMethod::Zstd => Self::decompress_zstd(raw, entry.uncompressed_size)?,
        };

        if decompressed.len() != entry.uncompressed_size as usize {
            return Err(ShapeZipError::DecompressionFailed(format!(
                "Size mismatch for {}: expected {}, got {}",
                name,
                entry.uncompressed_size,
                decompressed.len()
            )));
        }

        let computed_crc = crc32fast::hash(&decompressed);
        if computed_crc != entry.crc32 {
            return Err(ShapeZipError::CrcMismatch {
                expected: entry.crc32,
                actual: computed_crc,
            });
        }

        Ok(decompressed)
    }

    /// Decompress deflate data, reading at most one byte past the declared size
    fn decompress_deflate(data: &[u8], expected: u32) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(expected as usize);
        DeflateDecoder::new(data)
            .take(expected as u64 + 1)
            .read_to_end(&mut out)
            .map_err(|e| {
                ShapeZipError::DecompressionFailed(format!("Deflate decompression failed: {}", e))
            })?;
        Ok(out)
    }

    /// Decompress zstd data, reading at most one byte past the declared size
    fn decompress_zstd(data: &[u8], expected: u32) -> Result<Vec<u8>> {
        let decoder = zstd::stream::read::Decoder::new(data).map_err(|e| {
            ShapeZipError::DecompressionFailed(format!("Zstd decompression failed: {}", e))
        })?;
        let mut out = Vec::with_capacity(expected as usize);
        decoder
            .take(expected as u64 + 1)
            .read_to_end(&mut out)
            .map_err(|e| {
                ShapeZipError::DecompressionFailed(format!("Zstd decompression failed: {}", e))
            })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerWriter;
    use crate::timestamp::Timestamp;

    fn sample() -> Vec<u8> {
        let mut writer =
            ContainerWriter::new(Vec::new()).with_timestamp(Timestamp::from_unix(0));
        writer.add_entry("a.shp", &[1u8; 300]).unwrap();
        writer.add_entry("a.shx", b"xyz").unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_entries_in_order() {
        let reader = ContainerReader::new(sample()).unwrap();
        assert_eq!(reader.list_entries(), &["a.shp".to_string(), "a.shx".to_string()]);
        assert!(reader.contains("a.shx"));
        assert!(!reader.contains("a.dbf"));
        assert_eq!(reader.read_entry("a.shp").unwrap(), vec![1u8; 300]);
    }

    #[test]
    fn test_missing_entry() {
        let reader = ContainerReader::new(sample()).unwrap();
        assert!(matches!(
            reader.read_entry("a.dbf"),
            Err(ShapeZipError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_crc_mismatch_detected() {
        let mut bytes = sample();
        // "xyz" is stored uncompressed; flip its first byte
        let pos = bytes.windows(3).position(|w| w == b"xyz").unwrap();
        bytes[pos] = b'X';

        let reader = ContainerReader::new(bytes).unwrap();
        assert!(matches!(
            reader.read_entry("a.shx"),
            Err(ShapeZipError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_container_rejected() {
        let bytes = sample();
        assert!(ContainerReader::new(bytes[..bytes.len() - 1].to_vec()).is_err());
        assert!(ContainerReader::new(Vec::new()).is_err());
    }
}
