use super::{BoundingBox, Shape, ShapeHeader, ShapeType, SHAPE_HEADER_SIZE};
use crate::buffer::{RandomAccessBuffer, SeekOrigin};
use crate::error::{Result, ShapeZipError};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use tracing::trace;

/// Record header in the geometry stream: number + content length
pub const RECORD_HEADER_SIZE: usize = 8;

/// Index stream entry: offset + content length
pub const INDEX_ENTRY_SIZE: usize = 8;

/// Writes shape records into the geometry stream and their entries into the
/// index stream, tracking the running bounding box.
#[derive(Debug, Clone)]
pub struct ShapeEncoder {
    shape_type: ShapeType,
    bbox: Option<BoundingBox>,
    num: u32,
}

impl ShapeEncoder {
    pub fn new(shape_type: ShapeType) -> Self {
        Self {
            shape_type,
            bbox: None,
            num: 0,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// Records encoded so far
    pub fn record_count(&self) -> u32 {
        self.num
    }

    /// Box over every encoded shape; zero when nothing was encoded
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox.unwrap_or_default()
    }

    /// Append one record to `shp` and its index entry to `shx`.
    ///
    /// The record content length is reserved, then back-patched once the
    /// payload has been written. Returns the zero-based record index.
    pub fn encode(
        &mut self,
        shp: &mut RandomAccessBuffer,
        shx: &mut RandomAccessBuffer,
        shape: &dyn Shape,
    ) -> Result<u32> {
        if shape.shape_type() != self.shape_type {
            return Err(ShapeZipError::ShapeTypeMismatch {
                expected: self.shape_type.code(),
                actual: shape.shape_type().code(),
            });
        }

        if let Some(shape_box) = shape.bbox() {
            match self.bbox.as_mut() {
                Some(bbox) => bbox.extend(&shape_box),
                None => self.bbox = Some(shape_box),
            }
        }

        let record_number = self.num + 1;

        shp.seek_to(0, SeekOrigin::End)?;
        shp.write_i32::<BigEndian>(record_number as i32)?;
        shp.seek_to(4, SeekOrigin::Current)?;

        let start = shp.position();
        shp.write_i32::<LittleEndian>(self.shape_type.code())?;
        shape.write_payload(shp)?;
        let finish = shp.position();

        let length_words = ((finish - start) / 2) as i32;
        shp.seek_to(start as i64 - 4, SeekOrigin::Start)?;
        shp.write_i32::<BigEndian>(length_words)?;
        shp.seek_to(finish as i64, SeekOrigin::Start)?;

        let offset_words = ((start - RECORD_HEADER_SIZE as u64) / 2) as i32;
        shx.seek_to(0, SeekOrigin::End)?;
        shx.write_i32::<BigEndian>(offset_words)?;
        shx.write_i32::<BigEndian>(length_words)?;

        trace!(record = record_number, offset_words, length_words, "shape encoded");

        self.num = record_number;
        Ok(record_number - 1)
    }

    /// Overwrite the placeholder headers of both streams with final totals
    pub fn patch_headers(
        &self,
        shp: &mut RandomAccessBuffer,
        shx: &mut RandomAccessBuffer,
    ) -> Result<()> {
        self.patch_header(shp)?;
        self.patch_header(shx)
    }

    fn patch_header(&self, stream: &mut RandomAccessBuffer) -> Result<()> {
        let mut length = stream.seek_to(0, SeekOrigin::End)?;
        if length < SHAPE_HEADER_SIZE as u64 {
            stream.seek_to(SHAPE_HEADER_SIZE as i64, SeekOrigin::Start)?;
            length = SHAPE_HEADER_SIZE as u64;
        }

        let header = ShapeHeader {
            file_length_words: (length / 2) as i32,
            shape_type: self.shape_type,
            bbox: self.bounding_box(),
        };

        stream.seek_to(0, SeekOrigin::Start)?;
        header.write_to(&mut *stream)?;
        stream.seek_to(0, SeekOrigin::End)?;
        Ok(())
    }
}
