//! Large dataset stress tests
//!
//! Run with: cargo test --test stress_large_archives_test -- --ignored --nocapture

use shapezip::{
    ArchiveAssembler, ArchiveOptions, ContainerReader, Field, Point, PolyLine, ShapeType,
    TableHeader,
};
use std::time::Instant;

#[test]
fn test_ten_thousand_points() {
    let mut assembler = ArchiveAssembler::with_options(
        "many",
        ShapeType::Point,
        ArchiveOptions::new().with_timestamp(0),
    )
    .unwrap();
    assembler
        .set_schema(vec![Field::number("ID", 6).unwrap()])
        .unwrap();

    for i in 0..10_000u32 {
        let row = assembler.append(&Point::new(i as f64, 0.5)).unwrap();
        assert_eq!(row, i);
        assembler.write_attribute(row, 0, i as i64).unwrap();
    }

    let reader = ContainerReader::new(assembler.emit().unwrap()).unwrap();
    let shx = reader.read_entry("many.shx").unwrap();
    assert_eq!(shx.len(), 100 + 10_000 * 8);

    let dbf = reader.read_entry("many.dbf").unwrap();
    let table = TableHeader::read_from(&dbf[..]).unwrap();
    assert_eq!(table.record_count, 10_000);
    assert_eq!(table.last_update, (70, 1, 1));

    let last = &dbf[dbf.len() - 7..];
    assert_eq!(last, b"   9999");
}

#[test]
#[ignore] // Run manually: cargo test test_large_polylines -- --ignored
fn test_large_polylines() {
    println!("\n🚀 Assembling 2,000 polylines × 1,000 vertices...");
    let start = Instant::now();

    let mut assembler = ArchiveAssembler::create("roads", ShapeType::PolyLine).unwrap();
    for i in 0..2_000 {
        let vertices = (0..1_000)
            .map(|j| Point::new(i as f64 + j as f64 * 0.001, j as f64))
            .collect();
        assembler.append(&PolyLine::new(vec![vertices])).unwrap();

        if (i + 1) % 500 == 0 {
            println!("  Appended {} records...", i + 1);
        }
    }
    assembler
        .set_schema(vec![Field::string("NAME", 20).unwrap()])
        .unwrap();

    let bytes = assembler.emit().unwrap();
    println!(
        "  ✓ Container: {} MB in {:?}",
        bytes.len() / 1024 / 1024,
        start.elapsed()
    );

    let reader = ContainerReader::new(bytes).unwrap();
    let shp = reader.read_entry("roads.shp").unwrap();
    assert_eq!(shp.len(), assembler.geometry().len());

    let dbf = reader.read_entry("roads.dbf").unwrap();
    assert_eq!(dbf.len(), 65 + 2_000 * 21);
}
