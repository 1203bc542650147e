//! Shapefile triad assembly packaged as one ZIP container.
//!
//! The assembler owns the geometry, index and attribute buffers. Geometry
//! and index headers are reserved at creation and patched at finalize; the
//! attribute header is reserved when the schema is set. Rows for records
//! appended before the schema exists are backfilled as blanks so geometry
//! records and attribute rows stay aligned.

use crate::buffer::{RandomAccessBuffer, SeekOrigin};
use crate::container::ContainerWriter;
use crate::dbf::{AttributeSchema, Field, TableHeader, Value};
use crate::error::{Result, ShapeZipError};
use crate::options::ArchiveOptions;
use crate::shape::{BoundingBox, Shape, ShapeEncoder, ShapeType, SHAPE_HEADER_SIZE};
use crate::timestamp::Timestamp;
use tracing::debug;

/// Geometry stream extension
pub const GEOMETRY_EXTENSION: &str = "shp";

/// Index stream extension
pub const INDEX_EXTENSION: &str = "shx";

/// Attribute stream extension
pub const ATTRIBUTE_EXTENSION: &str = "dbf";

/// Strip a trailing ".shp" (any case)
fn strip_geometry_extension(name: &str) -> &str {
    let suffix_len = GEOMETRY_EXTENSION.len() + 1;
    if name.len() < suffix_len {
        return name;
    }
    let split = name.len() - suffix_len;
    match name.get(split..) {
        Some(suffix) if suffix.eq_ignore_ascii_case(".shp") => &name[..split],
        _ => name,
    }
}

/// Attribute buffer together with the schema that laid it out
#[derive(Debug, Clone)]
struct AttributeTable {
    schema: AttributeSchema,
    dbf: RandomAccessBuffer,
}

impl AttributeTable {
    /// Reserve the header and backfill `rows` blank records
    fn new(schema: AttributeSchema, rows: u32) -> Result<Self> {
        let mut dbf = RandomAccessBuffer::new();
        dbf.write_bytes(&vec![0u8; schema.header_width() as usize]);

        let mut table = Self { schema, dbf };
        for _ in 0..rows {
            table.append_blank()?;
        }
        Ok(table)
    }

    fn append_blank(&mut self) -> Result<()> {
        self.dbf.seek_to(0, SeekOrigin::End)?;
        self.dbf.write_bytes(&self.schema.blank_record());
        Ok(())
    }

    /// Rows present after the header; `None` when the body is not a whole
    /// number of records
    fn row_count(&self) -> Option<u32> {
        let body = self.dbf.len().checked_sub(self.schema.header_width() as usize)?;
        let width = self.schema.record_width() as usize;
        if body % width != 0 {
            return None;
        }
        u32::try_from(body / width).ok()
    }

    fn write_cell(&mut self, row: u32, field: usize, value: &Value) -> Result<()> {
        let offset = self
            .schema
            .field_offset(field)
            .ok_or(ShapeZipError::FieldOutOfRange {
                field,
                count: self.schema.fields().len(),
            })?;
        let bytes = value.format(&self.schema.fields()[field])?;

        let position = self.schema.header_width() as u64
            + row as u64 * self.schema.record_width() as u64
            + offset as u64;
        self.dbf.seek_to(position as i64, SeekOrigin::Start)?;
        self.dbf.write_bytes(&bytes);
        self.dbf.seek_to(0, SeekOrigin::End)?;
        Ok(())
    }

    fn patch_header(&mut self, record_count: u32, timestamp: Timestamp) -> Result<()> {
        let header = TableHeader::new(&self.schema, record_count, timestamp);
        self.dbf.seek_to(0, SeekOrigin::Start)?;
        header.write_to(&mut self.dbf)?;
        self.dbf.seek_to(0, SeekOrigin::End)?;
        Ok(())
    }
}

/// Attribute schema lifecycle: set at most once
#[derive(Debug, Clone)]
enum SchemaState {
    Unconfigured,
    Configured(AttributeTable),
}

/// In-memory shapefile writer that emits a ZIP container
///
/// # Example
///
/// ```
/// use shapezip::{ArchiveAssembler, Field, Point, ShapeType};
///
/// let mut assembler = ArchiveAssembler::create("cities.shp", ShapeType::Point)?;
/// assembler.set_schema(vec![Field::number("ID", 10)?])?;
/// let row = assembler.append(&Point::new(13.4, 52.5))?;
/// assembler.write_attribute(row, 0, 1)?;
///
/// let zip_bytes = assembler.emit()?;
/// assert!(!zip_bytes.is_empty());
/// # Ok::<(), shapezip::ShapeZipError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveAssembler {
    base_name: String,
    shp: RandomAccessBuffer,
    shx: RandomAccessBuffer,
    encoder: ShapeEncoder,
    schema: SchemaState,
    closed: bool,
    options: ArchiveOptions,
    timestamp: Timestamp,
}

impl ArchiveAssembler {
    /// Create an assembler with default options
    pub fn create(base_name: &str, geometry_kind: ShapeType) -> Result<Self> {
        Self::with_options(base_name, geometry_kind, ArchiveOptions::default())
    }

    /// Create an assembler; a trailing ".shp" on `base_name` is dropped
    pub fn with_options(
        base_name: &str,
        geometry_kind: ShapeType,
        options: ArchiveOptions,
    ) -> Result<Self> {
        let base_name = strip_geometry_extension(base_name);
        if base_name.is_empty() {
            return Err(ShapeZipError::InvalidName(base_name.to_string()));
        }

        let mut shp = RandomAccessBuffer::new();
        let mut shx = RandomAccessBuffer::new();
        shp.seek_to(SHAPE_HEADER_SIZE as i64, SeekOrigin::Start)?;
        shx.seek_to(SHAPE_HEADER_SIZE as i64, SeekOrigin::Start)?;

        debug!(base_name, kind = %geometry_kind, "assembler created");

        Ok(Self {
            base_name: base_name.to_string(),
            shp,
            shx,
            encoder: ShapeEncoder::new(geometry_kind),
            schema: SchemaState::Unconfigured,
            closed: false,
            timestamp: options.resolve_timestamp(),
            options,
        })
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn geometry_kind(&self) -> ShapeType {
        self.encoder.shape_type()
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Geometry records appended so far
    pub fn record_count(&self) -> u32 {
        self.encoder.record_count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Box over every appended shape
    pub fn bounding_box(&self) -> BoundingBox {
        self.encoder.bounding_box()
    }

    /// Configured attribute schema, if any
    pub fn schema(&self) -> Option<&AttributeSchema> {
        match &self.schema {
            SchemaState::Configured(table) => Some(&table.schema),
            SchemaState::Unconfigured => None,
        }
    }

    /// Attribute record width, once a schema is set
    pub fn record_width(&self) -> Option<u16> {
        self.schema().map(AttributeSchema::record_width)
    }

    /// Attribute header width, once a schema is set
    pub fn header_width(&self) -> Option<u16> {
        self.schema().map(AttributeSchema::header_width)
    }

    pub fn geometry(&self) -> &RandomAccessBuffer {
        &self.shp
    }

    pub fn index(&self) -> &RandomAccessBuffer {
        &self.shx
    }

    pub fn attributes(&self) -> Option<&RandomAccessBuffer> {
        match &self.schema {
            SchemaState::Configured(table) => Some(&table.dbf),
            SchemaState::Unconfigured => None,
        }
    }

    /// Set the attribute columns. Allowed once, before finalize.
    ///
    /// One blank row is written for every record already appended.
    pub fn set_schema(&mut self, fields: Vec<Field>) -> Result<()> {
        if self.closed {
            return Err(ShapeZipError::Closed);
        }
        if let SchemaState::Configured(_) = self.schema {
            return Err(ShapeZipError::SchemaAlreadySet);
        }

        let schema = AttributeSchema::new(fields)?;
        self.configure(schema)
    }

    fn configure(&mut self, schema: AttributeSchema) -> Result<()> {
        let backfill = self.record_count();
        debug!(
            fields = schema.fields().len(),
            record_width = schema.record_width(),
            header_width = schema.header_width(),
            backfill,
            "attribute schema configured"
        );
        self.schema = SchemaState::Configured(AttributeTable::new(schema, backfill)?);
        Ok(())
    }

    /// Encode one shape, adding a blank attribute row when a schema is set.
    ///
    /// Returns the zero-based record index.
    pub fn append(&mut self, shape: &dyn Shape) -> Result<u32> {
        if self.closed {
            return Err(ShapeZipError::Closed);
        }

        let index = self.encoder.encode(&mut self.shp, &mut self.shx, shape)?;
        if let SchemaState::Configured(table) = &mut self.schema {
            table.append_blank()?;
        }
        Ok(index)
    }

    /// Overwrite one attribute cell of an existing row
    pub fn write_attribute(
        &mut self,
        row: u32,
        field: usize,
        value: impl Into<Value>,
    ) -> Result<()> {
        if self.closed {
            return Err(ShapeZipError::Closed);
        }
        let count = self.record_count();
        let SchemaState::Configured(table) = &mut self.schema else {
            return Err(ShapeZipError::SchemaNotSet);
        };
        if row >= count {
            return Err(ShapeZipError::RowOutOfRange { row, count });
        }
        table.write_cell(row, field, &value.into())
    }

    /// Patch all headers and close the assembler.
    ///
    /// Fails with `AlreadyClosed` on a second call, leaving the buffers as
    /// they were.
    pub fn finalize(&mut self) -> Result<()> {
        if self.closed {
            return Err(ShapeZipError::AlreadyClosed);
        }

        // The implicit empty schema is only installed once finalize succeeds
        let records = self.record_count();
        let (mut table, implicit) =
            match std::mem::replace(&mut self.schema, SchemaState::Unconfigured) {
                SchemaState::Configured(table) => (table, false),
                SchemaState::Unconfigured => {
                    (AttributeTable::new(AttributeSchema::empty(), records)?, true)
                }
            };

        if let Err(err) = self.seal(&mut table, records) {
            if !implicit {
                self.schema = SchemaState::Configured(table);
            }
            return Err(err);
        }
        self.schema = SchemaState::Configured(table);
        self.closed = true;

        debug!(
            base_name = %self.base_name,
            records,
            implicit_schema = implicit,
            shp_len = self.shp.len(),
            shx_len = self.shx.len(),
            "assembler finalized"
        );
        Ok(())
    }

    /// Check row parity, then patch every header
    fn seal(&mut self, table: &mut AttributeTable, records: u32) -> Result<()> {
        match table.row_count() {
            Some(rows) if rows == records => {}
            rows => {
                return Err(ShapeZipError::RecordCountMismatch {
                    geometry: records,
                    attributes: rows.unwrap_or(u32::MAX),
                })
            }
        }

        self.encoder.patch_headers(&mut self.shp, &mut self.shx)?;
        table.patch_header(records, self.timestamp)
    }

    /// Finalize if still open and return the ZIP container bytes.
    ///
    /// Entries are written in the order geometry, index, attributes; the
    /// attribute entry is present only when the schema has fields.
    pub fn emit(&mut self) -> Result<Vec<u8>> {
        if !self.closed {
            self.finalize()?;
        }

        let mut container = ContainerWriter::new(RandomAccessBuffer::new())
            .with_compression(self.options.compression, self.options.compression_level)
            .with_timestamp(self.timestamp);

        container.add_entry_from_reader(&self.entry_name(GEOMETRY_EXTENSION), self.shp.reader())?;
        container.add_entry_from_reader(&self.entry_name(INDEX_EXTENSION), self.shx.reader())?;
        if let SchemaState::Configured(table) = &self.schema {
            if !table.schema.is_empty() {
                container
                    .add_entry_from_reader(&self.entry_name(ATTRIBUTE_EXTENSION), table.dbf.reader())?;
            }
        }

        let output = container.finish()?;
        debug!(base_name = %self.base_name, bytes = output.len(), "container emitted");
        Ok(output.into_bytes())
    }

    /// Consume the assembler and return the container bytes
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.emit()
    }

    /// Container entry name for a stream extension
    pub fn entry_name(&self, extension: &str) -> String {
        format!("{}.{}", self.base_name, extension)
    }
}
