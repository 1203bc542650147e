use super::{BoundingBox, ShapeType};
use crate::error::{Result, ShapeZipError};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// File code at offset 0 of the geometry and index streams
pub const FILE_CODE: i32 = 9994;

/// Format version
pub const SHAPE_VERSION: i32 = 1000;

/// Header size in bytes, reserved at creation and patched at finalize
pub const SHAPE_HEADER_SIZE: usize = 100;

/// Header of the geometry and index streams
///
/// Structure (100 bytes fixed):
/// - File Code: int32 BE (9994)
/// - Unused: 5 × int32 BE
/// - File Length: int32 BE, in 16-bit words
/// - Version: int32 LE (1000)
/// - Shape Type: int32 LE
/// - Bounding Box: 4 × f64 LE (Xmin, Ymin, Xmax, Ymax)
/// - Z and M ranges: 4 × f64 LE (zero)
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeHeader {
    pub file_length_words: i32,
    pub shape_type: ShapeType,
    pub bbox: BoundingBox,
}

impl ShapeHeader {
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        writer.write_i32::<BigEndian>(FILE_CODE)?;
        for _ in 0..5 {
            writer.write_i32::<BigEndian>(0)?;
        }
        writer.write_i32::<BigEndian>(self.file_length_words)?;
        writer.write_i32::<LittleEndian>(SHAPE_VERSION)?;
        writer.write_i32::<LittleEndian>(self.shape_type.code())?;
        writer.write_f64::<LittleEndian>(self.bbox.min_x)?;
        writer.write_f64::<LittleEndian>(self.bbox.min_y)?;
        writer.write_f64::<LittleEndian>(self.bbox.max_x)?;
        writer.write_f64::<LittleEndian>(self.bbox.max_y)?;
        // Z and M ranges
        writer.write_all(&[0u8; 32])?;

        Ok(SHAPE_HEADER_SIZE)
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let code = reader.read_i32::<BigEndian>()?;
        if code != FILE_CODE {
            return Err(ShapeZipError::InvalidFormat(format!(
                "Invalid shape file code: {}",
                code
            )));
        }
        let mut unused = [0u8; 20];
        reader.read_exact(&mut unused)?;

        let file_length_words = reader.read_i32::<BigEndian>()?;
        let version = reader.read_i32::<LittleEndian>()?;
        if version != SHAPE_VERSION {
            return Err(ShapeZipError::InvalidFormat(format!(
                "Unsupported shape version: {}",
                version
            )));
        }
        let shape_type = ShapeType::from_i32(reader.read_i32::<LittleEndian>()?)?;
        let bbox = BoundingBox::new(
            reader.read_f64::<LittleEndian>()?,
            reader.read_f64::<LittleEndian>()?,
            reader.read_f64::<LittleEndian>()?,
            reader.read_f64::<LittleEndian>()?,
        );
        let mut ranges = [0u8; 32];
        reader.read_exact(&mut ranges)?;

        Ok(Self {
            file_length_words,
            shape_type,
            bbox,
        })
    }
}
