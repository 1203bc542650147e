//! Shapezip: in-memory shapefile assembly packaged as a single ZIP container
//!
//! This library writes the three streams of a shapefile dataset entirely in
//! memory and bundles them into one archive:
//! - Geometry records (`.shp`) with back-patched content lengths
//! - Record index (`.shx`) with word offsets into the geometry stream
//! - Attribute table (`.dbf`) with a schema that may be set late
//! - ZIP output (Stored/Deflate/Zstd) with CRC-32 checked reading
//!
//! # Example
//!
//! ```no_run
//! use shapezip::{ArchiveAssembler, ContainerReader, Field, Point, ShapeType};
//!
//! // Assemble a dataset
//! let mut assembler = ArchiveAssembler::create("stations.shp", ShapeType::Point)?;
//! assembler.set_schema(vec![Field::string("NAME", 32)?])?;
//! let row = assembler.append(&Point::new(-0.1276, 51.5072))?;
//! assembler.write_attribute(row, 0, "London")?;
//! let bytes = assembler.emit()?;
//!
//! // Read it back
//! let reader = ContainerReader::new(bytes)?;
//! let shp = reader.read_entry("stations.shp")?;
//! # Ok::<(), shapezip::error::ShapeZipError>(())
//! ```

// Core modules
pub mod assembler;
pub mod buffer;
pub mod container;
pub mod dbf;
pub mod error;
pub mod options;
pub mod shape;
pub mod timestamp;

// Re-export commonly used types
pub use assembler::{ArchiveAssembler, ATTRIBUTE_EXTENSION, GEOMETRY_EXTENSION, INDEX_EXTENSION};
pub use buffer::{RandomAccessBuffer, SeekOrigin};
pub use container::{CompressionMethod, ContainerReader, ContainerWriter};
pub use dbf::{AttributeSchema, Field, FieldType, TableHeader, Value};
pub use error::{Result, ShapeZipError};
pub use options::ArchiveOptions;
pub use shape::{
    BoundingBox, MultiPoint, Point, PolyLine, Polygon, Shape, ShapeHeader, ShapeType,
};
pub use timestamp::Timestamp;
