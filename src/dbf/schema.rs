use super::field::{Field, FIELD_DESCRIPTOR_SIZE};
use crate::error::{Result, ShapeZipError};
use crate::timestamp::Timestamp;
use std::io::{Read, Write};

/// Fixed preamble before the field descriptors
pub const TABLE_PREAMBLE_SIZE: usize = 32;

/// Terminator byte after the last field descriptor
pub const HEADER_TERMINATOR: u8 = 0x0D;

/// Table version byte (dBASE III without memo)
pub const TABLE_VERSION: u8 = 0x03;

/// Deletion flag of a live record
pub const RECORD_ACTIVE: u8 = b' ';

/// Ordered attribute columns with their derived row and header widths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    fields: Vec<Field>,
    record_width: u16,
    header_width: u16,
}

impl AttributeSchema {
    /// Validate `fields` and compute the layout.
    ///
    /// Record width is the deletion flag plus every field width; header width
    /// is 32 bytes per field plus the 32-byte preamble and the terminator.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        for field in &fields {
            field.validate()?;
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(ShapeZipError::InvalidField(format!(
                    "Duplicate field name {:?}",
                    field.name
                )));
            }
        }

        let record_width = 1 + fields.iter().map(|f| f.size as usize).sum::<usize>();
        let header_width = FIELD_DESCRIPTOR_SIZE * fields.len() + TABLE_PREAMBLE_SIZE + 1;

        let record_width = u16::try_from(record_width).map_err(|_| {
            ShapeZipError::InvalidField(format!("Record width {} too large", record_width))
        })?;
        let header_width = u16::try_from(header_width).map_err(|_| {
            ShapeZipError::InvalidField(format!("Too many fields: {}", fields.len()))
        })?;

        Ok(Self {
            fields,
            record_width,
            header_width,
        })
    }

    /// Schema with no columns
    pub fn empty() -> Self {
        Self {
            fields: Vec::new(),
            record_width: 1,
            header_width: (TABLE_PREAMBLE_SIZE + 1) as u16,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn record_width(&self) -> u16 {
        self.record_width
    }

    pub fn header_width(&self) -> u16 {
        self.header_width
    }

    /// Byte offset of field `index` within a record
    pub fn field_offset(&self, index: usize) -> Option<usize> {
        if index >= self.fields.len() {
            return None;
        }
        Some(1 + self.fields[..index].iter().map(|f| f.size as usize).sum::<usize>())
    }

    /// A live record with every cell blank
    pub fn blank_record(&self) -> Vec<u8> {
        vec![RECORD_ACTIVE; self.record_width as usize]
    }
}

/// Header of the attribute stream
///
/// Structure (32 bytes + descriptors + terminator):
/// - Version: uint8 (0x03)
/// - Last Update: 3 × uint8 (years since 1900, month, day)
/// - Record Count: uint32 LE
/// - Header Width: uint16 LE
/// - Record Width: uint16 LE
/// - Reserved: 20 bytes
/// - Field Descriptors: 32 bytes each
/// - Terminator: 0x0D
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    pub last_update: (u8, u8, u8),
    pub record_count: u32,
    pub header_width: u16,
    pub record_width: u16,
    pub fields: Vec<Field>,
}

impl TableHeader {
    pub fn new(schema: &AttributeSchema, record_count: u32, timestamp: Timestamp) -> Self {
        Self {
            last_update: timestamp.table_date(),
            record_count,
            header_width: schema.header_width(),
            record_width: schema.record_width(),
            fields: schema.fields().to_vec(),
        }
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let (yy, mm, dd) = self.last_update;
        writer.write_all(&[TABLE_VERSION, yy, mm, dd])?;
        writer.write_all(&self.record_count.to_le_bytes())?;
        writer.write_all(&self.header_width.to_le_bytes())?;
        writer.write_all(&self.record_width.to_le_bytes())?;
        writer.write_all(&[0u8; 20])?;

        let mut written = TABLE_PREAMBLE_SIZE;
        for field in &self.fields {
            written += field.write_to(&mut writer)?;
        }
        writer.write_all(&[HEADER_TERMINATOR])?;

        Ok(written + 1)
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut preamble = [0u8; TABLE_PREAMBLE_SIZE];
        reader.read_exact(&mut preamble)?;
        if preamble[0] != TABLE_VERSION {
            return Err(ShapeZipError::InvalidFormat(format!(
                "Unsupported table version: {:#04x}",
                preamble[0]
            )));
        }

        let record_count = u32::from_le_bytes([preamble[4], preamble[5], preamble[6], preamble[7]]);
        let header_width = u16::from_le_bytes([preamble[8], preamble[9]]);
        let record_width = u16::from_le_bytes([preamble[10], preamble[11]]);

        let descriptor_bytes = (header_width as usize)
            .checked_sub(TABLE_PREAMBLE_SIZE + 1)
            .filter(|n| n % FIELD_DESCRIPTOR_SIZE == 0)
            .ok_or_else(|| {
                ShapeZipError::InvalidFormat(format!("Invalid table header width {}", header_width))
            })?;

        let mut fields = Vec::with_capacity(descriptor_bytes / FIELD_DESCRIPTOR_SIZE);
        for _ in 0..descriptor_bytes / FIELD_DESCRIPTOR_SIZE {
            fields.push(Field::read_from(&mut reader)?);
        }

        let mut terminator = [0u8; 1];
        reader.read_exact(&mut terminator)?;
        if terminator[0] != HEADER_TERMINATOR {
            return Err(ShapeZipError::InvalidFormat(
                "Missing table header terminator".to_string(),
            ));
        }

        Ok(Self {
            last_update: (preamble[1], preamble[2], preamble[3]),
            record_count,
            header_width,
            record_width,
            fields,
        })
    }
}
