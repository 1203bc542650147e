//! Integration tests for shapezip

use shapezip::shape::{FILE_CODE, SHAPE_HEADER_SIZE, SHAPE_VERSION};
use shapezip::{
    ArchiveAssembler, ArchiveOptions, BoundingBox, CompressionMethod, ContainerReader, Field,
    Point, PolyLine, Polygon, ShapeHeader, ShapeType, TableHeader, Value,
};
use std::io::Write;
use tempfile::NamedTempFile;

const FIXED_TIME: u64 = 1_714_694_400; // 2024-05-03

fn options() -> ArchiveOptions {
    ArchiveOptions::new().with_timestamp(FIXED_TIME)
}

fn be_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

#[test]
fn test_point_dataset_roundtrip() {
    let mut assembler =
        ArchiveAssembler::with_options("shapes.shp", ShapeType::Point, options()).unwrap();
    assembler
        .set_schema(vec![
            Field::number("ID", 10).unwrap(),
            Field::string("NAME", 25).unwrap(),
        ])
        .unwrap();

    for (i, (x, y)) in [(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)].iter().enumerate() {
        let row = assembler.append(&Point::new(*x, *y)).unwrap();
        assert_eq!(row, i as u32);
        assembler.write_attribute(row, 0, i as i64 + 1).unwrap();
        assembler
            .write_attribute(row, 1, format!("point {}", i))
            .unwrap();
    }

    let bytes = assembler.emit().unwrap();

    // Persist and reopen
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(&bytes).unwrap();
    let on_disk = std::fs::read(temp_file.path()).unwrap();
    assert_eq!(on_disk, bytes);

    let reader = ContainerReader::new(on_disk).unwrap();
    assert_eq!(reader.entry_count(), 3);
    assert_eq!(
        reader.list_entries(),
        &["shapes.shp", "shapes.shx", "shapes.dbf"].map(String::from)
    );

    // Geometry stream
    let shp = reader.read_entry("shapes.shp").unwrap();
    let header = ShapeHeader::read_from(&shp[..]).unwrap();
    assert_eq!(header.file_length_words as usize * 2, shp.len());
    assert_eq!(header.shape_type, ShapeType::Point);
    assert_eq!(header.bbox, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(be_i32(&shp, 0), FILE_CODE);
    assert_eq!(
        i32::from_le_bytes(shp[28..32].try_into().unwrap()),
        SHAPE_VERSION
    );

    // Index stream
    let shx = reader.read_entry("shapes.shx").unwrap();
    assert_eq!(shx.len(), SHAPE_HEADER_SIZE + 3 * 8);
    for i in 0..3 {
        let entry = SHAPE_HEADER_SIZE + i * 8;
        let offset_words = be_i32(&shx, entry) as usize;
        let length_words = be_i32(&shx, entry + 4);
        assert_eq!(offset_words, 50 + 14 * i);
        assert_eq!(length_words, 10);

        // Record number at the indexed offset
        assert_eq!(be_i32(&shp, offset_words * 2), i as i32 + 1);
    }

    // Attribute stream
    let dbf = reader.read_entry("shapes.dbf").unwrap();
    let table = TableHeader::read_from(&dbf[..]).unwrap();
    assert_eq!(table.record_count, 3);
    assert_eq!(table.header_width, 97);
    assert_eq!(table.record_width, 36);
    assert_eq!(table.last_update, (124, 5, 3));
    assert_eq!(table.fields.len(), 2);
    assert_eq!(dbf.len(), 97 + 3 * 36);

    let row1 = &dbf[97 + 36..97 + 72];
    assert_eq!(&row1[..11], b"          2");
    assert_eq!(&row1[11..], format!("{:<25}", "point 1").as_bytes());
}

#[test]
fn test_geometry_without_schema() {
    let mut assembler =
        ArchiveAssembler::with_options("bare", ShapeType::Point, options()).unwrap();
    assembler.append(&Point::new(1.0, 2.0)).unwrap();

    let reader = ContainerReader::new(assembler.emit().unwrap()).unwrap();
    assert_eq!(reader.list_entries(), &["bare.shp", "bare.shx"].map(String::from));
    assert!(!reader.contains("bare.dbf"));

    // The attribute table still exists internally with one blank row
    let dbf = assembler.attributes().unwrap();
    assert_eq!(dbf.len(), 33 + 1);
    assert_eq!(dbf.as_bytes()[33], b' ');
}

#[test]
fn test_empty_dataset() {
    let mut assembler =
        ArchiveAssembler::with_options("empty", ShapeType::Polygon, options()).unwrap();
    let reader = ContainerReader::new(assembler.emit().unwrap()).unwrap();

    let shp = reader.read_entry("empty.shp").unwrap();
    let shx = reader.read_entry("empty.shx").unwrap();
    assert_eq!(shp.len(), SHAPE_HEADER_SIZE);
    assert_eq!(shx.len(), SHAPE_HEADER_SIZE);

    let header = ShapeHeader::read_from(&shp[..]).unwrap();
    assert_eq!(header.file_length_words, 50);
    assert_eq!(header.shape_type, ShapeType::Polygon);
    assert_eq!(header.bbox, BoundingBox::default());
}

#[test]
fn test_late_schema_aligns_rows() {
    let mut assembler =
        ArchiveAssembler::with_options("late", ShapeType::PolyLine, options()).unwrap();

    let line = |offset: f64| {
        PolyLine::new(vec![vec![
            Point::new(offset, 0.0),
            Point::new(offset + 1.0, 1.0),
        ]])
    };
    assembler.append(&line(0.0)).unwrap();
    assembler.append(&line(10.0)).unwrap();

    assembler
        .set_schema(vec![Field::logical("OPEN").unwrap()])
        .unwrap();
    assembler.append(&line(20.0)).unwrap();
    assembler.write_attribute(0, 0, true).unwrap();
    assembler.write_attribute(2, 0, Value::Logical(false)).unwrap();

    let reader = ContainerReader::new(assembler.emit().unwrap()).unwrap();
    let dbf = reader.read_entry("late.dbf").unwrap();
    let table = TableHeader::read_from(&dbf[..]).unwrap();
    assert_eq!(table.record_count, 3);
    assert_eq!(&dbf[65..], b" T   F");

    let shp = reader.read_entry("late.shp").unwrap();
    let header = ShapeHeader::read_from(&shp[..]).unwrap();
    assert_eq!(header.bbox, BoundingBox::new(0.0, 0.0, 21.0, 1.0));
}

#[test]
fn test_polygon_records() {
    let mut assembler =
        ArchiveAssembler::with_options("parcels", ShapeType::Polygon, options()).unwrap();
    let square = Polygon::new(vec![vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 4.0),
        Point::new(4.0, 4.0),
        Point::new(4.0, 0.0),
        Point::new(0.0, 0.0),
    ]]);
    assembler.append(&square).unwrap();
    assembler.finalize().unwrap();

    let shp = assembler.geometry().as_bytes();
    // type + bbox + counts + one part index + five points
    let content = 4 + 32 + 8 + 4 + 5 * 16;
    assert_eq!(be_i32(shp, 104) as usize * 2, content);
    assert_eq!(shp.len(), SHAPE_HEADER_SIZE + 8 + content);

    let shx = assembler.index().as_bytes();
    assert_eq!(be_i32(shx, 100), 50);
    assert_eq!(be_i32(shx, 104) as usize * 2, content);
}

#[test]
fn test_options_from_toml_file() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "compression = \"zstd\"").unwrap();
    writeln!(config, "compression_level = 3").unwrap();
    writeln!(config, "timestamp = {}", FIXED_TIME).unwrap();

    let text = std::fs::read_to_string(config.path()).unwrap();
    let options = ArchiveOptions::from_toml_str(&text).unwrap();

    let mut assembler = ArchiveAssembler::with_options("cfg", ShapeType::Point, options).unwrap();
    for i in 0..50 {
        assembler.append(&Point::new(i as f64, 0.0)).unwrap();
    }

    let reader = ContainerReader::new(assembler.emit().unwrap()).unwrap();
    let entry = reader.get_entry("cfg.shp").unwrap();
    assert_eq!(entry.compression, CompressionMethod::Zstd);
    assert_eq!(
        reader.read_entry("cfg.shp").unwrap(),
        assembler.geometry().as_bytes()
    );
}

#[test]
fn test_emit_is_repeatable() {
    let mut assembler = ArchiveAssembler::with_options("again", ShapeType::Point, options()).unwrap();
    assembler.append(&Point::new(3.0, 4.0)).unwrap();

    let first = assembler.emit().unwrap();
    let second = assembler.clone().into_bytes().unwrap();
    assert_eq!(first, second);
    assert!(assembler.is_closed());
}
