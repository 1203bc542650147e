use crate::error::{Result, ShapeZipError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Field descriptor size in bytes
pub const FIELD_DESCRIPTOR_SIZE: usize = 32;

/// Maximum field name length (the 11th byte is the terminator)
pub const MAX_FIELD_NAME_LENGTH: usize = 10;

/// Column type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum FieldType {
    Character = b'C',
    Numeric = b'N',
    Float = b'F',
    Date = b'D',
    Logical = b'L',
}

impl FieldType {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            b'C' => Ok(Self::Character),
            b'N' => Ok(Self::Numeric),
            b'F' => Ok(Self::Float),
            b'D' => Ok(Self::Date),
            b'L' => Ok(Self::Logical),
            _ => Err(ShapeZipError::InvalidField(format!(
                "Unknown field type tag: {:#04x}",
                value
            ))),
        }
    }
}

/// Attribute column: name, type tag and byte width
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub size: u8,
    #[serde(default)]
    pub precision: u8,
}

impl Field {
    pub fn new(name: &str, field_type: FieldType, size: u8, precision: u8) -> Result<Self> {
        let field = Self {
            name: name.to_string(),
            field_type,
            size,
            precision,
        };
        field.validate()?;
        Ok(field)
    }

    /// Character field of `size` bytes
    pub fn string(name: &str, size: u8) -> Result<Self> {
        Self::new(name, FieldType::Character, size, 0)
    }

    /// Integer field of `size` digits
    pub fn number(name: &str, size: u8) -> Result<Self> {
        Self::new(name, FieldType::Numeric, size, 0)
    }

    /// Floating point field with `precision` decimals
    pub fn float(name: &str, size: u8, precision: u8) -> Result<Self> {
        Self::new(name, FieldType::Float, size, precision)
    }

    /// Date field stored as YYYYMMDD
    pub fn date(name: &str) -> Result<Self> {
        Self::new(name, FieldType::Date, 8, 0)
    }

    pub fn logical(name: &str) -> Result<Self> {
        Self::new(name, FieldType::Logical, 1, 0)
    }

    /// Check name and width constraints
    pub fn validate(&self) -> Result<()> {
        let name = self.name.as_bytes();
        if name.is_empty() || name.len() > MAX_FIELD_NAME_LENGTH {
            return Err(ShapeZipError::InvalidField(format!(
                "Field name {:?} must be 1 to {} bytes",
                self.name, MAX_FIELD_NAME_LENGTH
            )));
        }
        if name.contains(&0) {
            return Err(ShapeZipError::InvalidField(format!(
                "Field name {:?} contains a NUL byte",
                self.name
            )));
        }
        if self.size == 0 {
            return Err(ShapeZipError::InvalidField(format!(
                "Field {:?} has zero width",
                self.name
            )));
        }

        let fixed = match self.field_type {
            FieldType::Date => Some(8),
            FieldType::Logical => Some(1),
            _ => None,
        };
        if let Some(width) = fixed {
            if self.size != width {
                return Err(ShapeZipError::InvalidField(format!(
                    "Field {:?} of type {:?} must be {} bytes wide",
                    self.name, self.field_type, width
                )));
            }
        }
        if self.precision > 0 && self.precision >= self.size {
            return Err(ShapeZipError::InvalidField(format!(
                "Field {:?} precision {} does not fit width {}",
                self.name, self.precision, self.size
            )));
        }
        Ok(())
    }

    /// Write the 32-byte descriptor
    ///
    /// Structure:
    /// - Name: 11 bytes, NUL padded
    /// - Type: 1 byte
    /// - Reserved: 4 bytes
    /// - Size: uint8
    /// - Precision: uint8
    /// - Reserved: 14 bytes
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut name_buf = [0u8; MAX_FIELD_NAME_LENGTH + 1];
        let name = self.name.as_bytes();
        let len = name.len().min(MAX_FIELD_NAME_LENGTH);
        name_buf[..len].copy_from_slice(&name[..len]);

        writer.write_all(&name_buf)?;
        writer.write_all(&[self.field_type as u8])?;
        writer.write_all(&[0u8; 4])?;
        writer.write_all(&[self.size, self.precision])?;
        writer.write_all(&[0u8; 14])?;

        Ok(FIELD_DESCRIPTOR_SIZE)
    }

    /// Read a 32-byte descriptor
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; FIELD_DESCRIPTOR_SIZE];
        reader.read_exact(&mut buf)?;

        let name_end = buf[..MAX_FIELD_NAME_LENGTH + 1]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_FIELD_NAME_LENGTH);
        let name = String::from_utf8(buf[..name_end].to_vec())
            .map_err(|e| ShapeZipError::InvalidField(format!("Invalid UTF-8 in name: {}", e)))?;

        Ok(Self {
            name,
            field_type: FieldType::from_u8(buf[11])?,
            size: buf[16],
            precision: buf[17],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Field::number("ID", 10).unwrap().field_type, FieldType::Numeric);
        assert_eq!(Field::date("BUILT").unwrap().size, 8);
        assert_eq!(Field::logical("ACTIVE").unwrap().size, 1);
        assert_eq!(Field::float("AREA", 12, 3).unwrap().precision, 3);
    }

    #[test]
    fn test_invalid_fields() {
        assert!(Field::string("", 10).is_err());
        assert!(Field::string("ELEVENCHARS", 10).is_err());
        assert!(Field::string("NAME", 0).is_err());
        assert!(Field::new("D", FieldType::Date, 10, 0).is_err());
        assert!(Field::float("AREA", 4, 4).is_err());
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let field = Field::float("AREA", 12, 3).unwrap();

        let mut buf = Vec::new();
        assert_eq!(field.write_to(&mut buf).unwrap(), FIELD_DESCRIPTOR_SIZE);
        assert_eq!(buf.len(), FIELD_DESCRIPTOR_SIZE);
        assert_eq!(&buf[..5], b"AREA\0");
        assert_eq!(buf[11], b'F');

        assert_eq!(Field::read_from(&buf[..]).unwrap(), field);
    }

    #[test]
    fn test_field_type_from_serde() {
        let field: Field =
            serde_json::from_str(r#"{"name":"ID","field_type":"numeric","size":10}"#).unwrap();
        assert_eq!(field, Field::number("ID", 10).unwrap());
    }
}
