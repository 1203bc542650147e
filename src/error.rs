use std::io;
use thiserror::Error;

/// Result type for shapezip operations
pub type Result<T> = std::result::Result<T, ShapeZipError>;

/// Unified error type for all shapezip operations
#[derive(Debug, Error)]
pub enum ShapeZipError {
    // Lifecycle errors
    #[error("Attribute schema already set")]
    SchemaAlreadySet,

    #[error("Attribute schema not set")]
    SchemaNotSet,

    #[error("Assembler is closed")]
    Closed,

    #[error("Assembler already closed")]
    AlreadyClosed,

    #[error("Record count mismatch: {geometry} geometry records, {attributes} attribute rows")]
    RecordCountMismatch { geometry: u32, attributes: u32 },

    #[error("Shape type mismatch: assembler expects {expected}, got {actual}")]
    ShapeTypeMismatch { expected: i32, actual: i32 },

    // Argument errors
    #[error("Invalid seek: resulting position {0} is negative")]
    InvalidSeek(i64),

    #[error("Invalid seek origin: {0}")]
    InvalidSeekOrigin(u8),

    #[error("Invalid base name: {0:?}")]
    InvalidName(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Row {row} out of range ({count} rows)")]
    RowOutOfRange { row: u32, count: u32 },

    #[error("Field {field} out of range ({count} fields)")]
    FieldOutOfRange { field: usize, count: usize },

    #[error("Invalid shape type code: {0}")]
    InvalidShapeType(i32),

    #[error("Invalid compression method: {0}")]
    InvalidCompression(u16),

    // Container errors
    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    #[error("Entry not found in container: {0}")]
    EntryNotFound(String),

    #[error("Duplicate entry in container: {0}")]
    DuplicateEntry(String),

    #[error("CRC mismatch: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Path error: {0}")]
    PathError(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(String),
}

impl From<toml::de::Error> for ShapeZipError {
    fn from(err: toml::de::Error) -> Self {
        ShapeZipError::TomlError(err.to_string())
    }
}

impl From<toml::ser::Error> for ShapeZipError {
    fn from(err: toml::ser::Error) -> Self {
        ShapeZipError::TomlError(err.to_string())
    }
}
