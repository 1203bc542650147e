//! Geometry stream encoding: shape records, index entries and the 100-byte
//! header shared by the geometry and index streams.

mod encoder;
mod geometry;
mod header;

pub use encoder::{ShapeEncoder, INDEX_ENTRY_SIZE, RECORD_HEADER_SIZE};
pub use geometry::{MultiPoint, Point, PolyLine, Polygon};
pub use header::{ShapeHeader, FILE_CODE, SHAPE_HEADER_SIZE, SHAPE_VERSION};

use crate::error::{Result, ShapeZipError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// Shape type codes stored in every header and record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
    MultiPatch = 31,
}

impl ShapeType {
    pub fn from_i32(value: i32) -> Result<Self> {
        Ok(match value {
            0 => Self::Null,
            1 => Self::Point,
            3 => Self::PolyLine,
            5 => Self::Polygon,
            8 => Self::MultiPoint,
            11 => Self::PointZ,
            13 => Self::PolyLineZ,
            15 => Self::PolygonZ,
            18 => Self::MultiPointZ,
            21 => Self::PointM,
            23 => Self::PolyLineM,
            25 => Self::PolygonM,
            28 => Self::MultiPointM,
            31 => Self::MultiPatch,
            _ => return Err(ShapeZipError::InvalidShapeType(value)),
        })
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Axis-aligned XY bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Box around `points`; all zero when empty
    pub fn from_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let mut bbox = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        bbox
    }

    /// Grow to cover `other`
    pub fn extend(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }
}

/// A geometry that can be serialized as one shape record
pub trait Shape {
    fn shape_type(&self) -> ShapeType;

    /// Extent of the shape; `None` when it has no points
    fn bbox(&self) -> Option<BoundingBox>;

    /// Write the record content following the shape type code
    fn write_payload(&self, writer: &mut dyn Write) -> io::Result<()>;
}
