use super::{BoundingBox, Shape, ShapeType};
use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Single XY point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn write_xy(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_f64::<LittleEndian>(self.x)?;
        writer.write_f64::<LittleEndian>(self.y)
    }
}

impl Shape for Point {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Point
    }

    fn bbox(&self) -> Option<BoundingBox> {
        Some(BoundingBox::new(self.x, self.y, self.x, self.y))
    }

    fn write_payload(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.write_xy(writer)
    }
}

fn write_box(writer: &mut dyn Write, bbox: &BoundingBox) -> io::Result<()> {
    writer.write_f64::<LittleEndian>(bbox.min_x)?;
    writer.write_f64::<LittleEndian>(bbox.min_y)?;
    writer.write_f64::<LittleEndian>(bbox.max_x)?;
    writer.write_f64::<LittleEndian>(bbox.max_y)
}

/// Unordered set of points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPoint {
    pub bbox: BoundingBox,
    pub points: Vec<Point>,
}

impl MultiPoint {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            bbox: BoundingBox::from_points(&points),
            points,
        }
    }
}

impl Shape for MultiPoint {
    fn shape_type(&self) -> ShapeType {
        ShapeType::MultiPoint
    }

    fn bbox(&self) -> Option<BoundingBox> {
        (!self.points.is_empty()).then_some(self.bbox)
    }

    fn write_payload(&self, writer: &mut dyn Write) -> io::Result<()> {
        write_box(writer, &self.bbox)?;
        writer.write_i32::<LittleEndian>(self.points.len() as i32)?;
        for p in &self.points {
            p.write_xy(writer)?;
        }
        Ok(())
    }
}

/// Multi-part geometry layout shared by polylines and polygons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Parts {
    bbox: BoundingBox,
    /// Index of the first point of each part
    parts: Vec<i32>,
    points: Vec<Point>,
}

impl Parts {
    fn flatten(parts: Vec<Vec<Point>>) -> Self {
        let mut offsets = Vec::with_capacity(parts.len());
        let mut points = Vec::with_capacity(parts.iter().map(Vec::len).sum());
        for part in parts {
            offsets.push(points.len() as i32);
            points.extend(part);
        }
        Self {
            bbox: BoundingBox::from_points(&points),
            parts: offsets,
            points,
        }
    }

    fn extent(&self) -> Option<BoundingBox> {
        (!self.points.is_empty()).then_some(self.bbox)
    }

    fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        write_box(writer, &self.bbox)?;
        writer.write_i32::<LittleEndian>(self.parts.len() as i32)?;
        writer.write_i32::<LittleEndian>(self.points.len() as i32)?;
        for offset in &self.parts {
            writer.write_i32::<LittleEndian>(*offset)?;
        }
        for p in &self.points {
            p.write_xy(writer)?;
        }
        Ok(())
    }
}

/// Ordered set of vertices in one or more parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyLine(Parts);

impl PolyLine {
    /// Build from parts, deriving the box and part offsets
    pub fn new(parts: Vec<Vec<Point>>) -> Self {
        Self(Parts::flatten(parts))
    }

    pub fn num_parts(&self) -> usize {
        self.0.parts.len()
    }

    pub fn parts(&self) -> &[i32] {
        &self.0.parts
    }

    pub fn points(&self) -> &[Point] {
        &self.0.points
    }
}

impl Shape for PolyLine {
    fn shape_type(&self) -> ShapeType {
        ShapeType::PolyLine
    }

    fn bbox(&self) -> Option<BoundingBox> {
        self.0.extent()
    }

    fn write_payload(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.0.write(writer)
    }
}

/// One or more closed rings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon(Parts);

impl Polygon {
    /// Build from rings. Rings are stored as given; closing them is the
    /// caller's responsibility.
    pub fn new(rings: Vec<Vec<Point>>) -> Self {
        Self(Parts::flatten(rings))
    }

    pub fn num_parts(&self) -> usize {
        self.0.parts.len()
    }

    pub fn parts(&self) -> &[i32] {
        &self.0.parts
    }

    pub fn points(&self) -> &[Point] {
        &self.0.points
    }
}

impl Shape for Polygon {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Polygon
    }

    fn bbox(&self) -> Option<BoundingBox> {
        self.0.extent()
    }

    fn write_payload(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.0.write(writer)
    }
}
