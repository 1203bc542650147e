use crate::container::end_record::EndRecord;
use crate::container::format::{CentralEntry, CompressionMethod, FLAG_UTF8};
use crate::container::local_entry::LocalEntryHeader;
use crate::error::{Result, ShapeZipError};
use crate::timestamp::Timestamp;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use tracing::{debug, trace};

/// Default level for deflate and zstd
const DEFAULT_LEVEL: i32 = 6;

/// Normalize entry name to forward slashes
fn normalize_name(name: &str) -> String {
    name.replace('\\', "/")
}

/// Offsets and sizes must fit the 32-bit ZIP fields (no ZIP64)
fn to_u32(value: u64, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        ShapeZipError::InvalidFormat(format!("{} {} exceeds 32-bit container limits", what, value))
    })
}

/// ZIP container writer over any byte sink
pub struct ContainerWriter<W: Write> {
    writer: W,
    entries: Vec<CentralEntry>,
    current_offset: u64,
    compression: CompressionMethod,
    level: Option<i32>,
    timestamp: Timestamp,
}

impl<W: Write> ContainerWriter<W> {
    /// Start a container; nothing is written until the first entry
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entries: Vec::new(),
            current_offset: 0,
            compression: CompressionMethod::default(),
            level: None,
            timestamp: Timestamp::now(),
        }
    }

    /// Set the default compression for subsequent entries
    pub fn with_compression(mut self, compression: CompressionMethod, level: Option<i32>) -> Self {
        self.compression = compression;
        self.level = level;
        self
    }

    /// Set the modification time recorded for every entry
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Number of entries written so far
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Add an entry using the writer's default compression
    pub fn add_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.add_entry_with_compression(name, data, self.compression)
    }

    /// Add an entry by draining a reader
    pub fn add_entry_from_reader<R: Read>(&mut self, name: &str, mut reader: R) -> Result<()> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.add_entry(name, &data)
    }

    /// Add an entry with a specific compression method
    pub fn add_entry_with_compression(
        &mut self,
        name: &str,
        data: &[u8],
        compression: CompressionMethod,
    ) -> Result<()> {
        let normalized_name = normalize_name(name);
        if normalized_name.is_empty() {
            return Err(ShapeZipError::PathError("Empty entry name".to_string()));
        }
        if self.entries.iter().any(|e| e.name == normalized_name) {
            return Err(ShapeZipError::DuplicateEntry(normalized_name));
        }

        let (payload, actual_compression) = self.compress_data(data, compression)?;
        let crc32 = crc32fast::hash(data);
        let (mod_time, mod_date) = self.timestamp.to_dos();

        let uncompressed_size = to_u32(data.len() as u64, "Entry size")?;
        let compressed_size = to_u32(payload.len() as u64, "Compressed entry size")?;
        let local_header_offset = to_u32(self.current_offset, "Entry offset")?;

        let local_header = LocalEntryHeader {
            compression: actual_compression,
            flags: FLAG_UTF8,
            mod_time,
            mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            name: normalized_name.clone(),
            extra_len: 0,
        };

        let header_bytes_written = local_header.write_to(&mut self.writer)?;
        self.current_offset += header_bytes_written as u64;

        self.writer.write_all(&payload)?;
        self.current_offset += payload.len() as u64;

        trace!(
            name = %normalized_name,
            method = ?actual_compression,
            uncompressed_size,
            compressed_size,
            "container entry written"
        );

        self.entries.push(CentralEntry {
            name: normalized_name,
            compression: actual_compression,
            flags: FLAG_UTF8,
            mod_time,
            mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            local_header_offset,
        });

        Ok(())
    }

    /// Write the central directory and end record, returning the sink
    pub fn finish(mut self) -> Result<W> {
        let cd_offset = self.current_offset;

        let mut cd_size = 0u64;
        for entry in &self.entries {
            cd_size += entry.write_to(&mut self.writer)? as u64;
        }

        let entry_count = u16::try_from(self.entries.len()).map_err(|_| {
            ShapeZipError::InvalidFormat(format!("Too many entries: {}", self.entries.len()))
        })?;

        let end_record = EndRecord::new(
            entry_count,
            to_u32(cd_size, "Central directory size")?,
            to_u32(cd_offset, "Central directory offset")?,
        );
        end_record.write_to(&mut self.writer)?;
        self.writer.flush()?;

        debug!(entries = entry_count, cd_offset, cd_size, "container finished");

        Ok(self.writer)
    }

    /// Compress data with fallback to stored if not beneficial
    fn compress_data(
        &self,
        data: &[u8],
        compression: CompressionMethod,
    ) -> Result<(Vec<u8>, CompressionMethod)> {
        let level = self.level.unwrap_or(DEFAULT_LEVEL);

        let compressed = match compression {
            CompressionMethod::Stored => return Ok((data.to_vec(), CompressionMethod::Stored)),
            CompressionMethod::Deflate => Self::compress_deflate(data, level)?,
            CompressionMethod::Zstd => Self::compress_zstd(data, level)?,
        };

        // Use compressed only if it's actually smaller
        if compressed.len() < data.len() {
            Ok((compressed, compression))
        } else {
            Ok((data.to_vec(), CompressionMethod::Stored))
        }
    }

    fn compress_deflate(data: &[u8], level: i32) -> Result<Vec<u8>> {
        let level = level.clamp(0, 9) as u32;
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
        encoder
            .write_all(data)
            .map_err(|e| ShapeZipError::CompressionFailed(format!("Deflate compression failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| ShapeZipError::CompressionFailed(format!("Deflate compression failed: {}", e)))
    }

    fn compress_zstd(data: &[u8], level: i32) -> Result<Vec<u8>> {
        zstd::encode_all(data, level)
            .map_err(|e| ShapeZipError::CompressionFailed(format!("Zstd compression failed: {}", e)))
    }
}
