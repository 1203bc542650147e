//! Generate seed corpus for fuzzing

use shapezip::{
    ArchiveAssembler, ArchiveOptions, CompressionMethod, Field, Point, PolyLine, ShapeType,
};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_container_parse";
    fs::create_dir_all(corpus_dir)?;

    println!("Generating seed corpus...");

    // Seed 1: Empty dataset (headers only)
    {
        let path = format!("{}/seed_empty.zip", corpus_dir);
        let mut assembler = ArchiveAssembler::create("empty", ShapeType::Point)?;
        fs::write(&path, assembler.emit()?)?;
        println!("✓ Generated: {}", path);
    }

    // Seeds 2-4: Point dataset under every compression method
    for method in [
        CompressionMethod::Stored,
        CompressionMethod::Deflate,
        CompressionMethod::Zstd,
    ] {
        let path = format!("{}/seed_points_{:?}.zip", corpus_dir, method).to_lowercase();
        let options = ArchiveOptions::new().with_compression(method);
        let mut assembler = ArchiveAssembler::with_options("points", ShapeType::Point, options)?;
        assembler.set_schema(vec![Field::number("ID", 6)?, Field::string("NAME", 12)?])?;
        for i in 0..16 {
            let row = assembler.append(&Point::new(i as f64, i as f64 * 2.0))?;
            assembler.write_attribute(row, 0, i)?;
            assembler.write_attribute(row, 1, format!("point {}", i))?;
        }
        fs::write(&path, assembler.emit()?)?;
        println!("✓ Generated: {}", path);
    }

    // Seed 5: Polylines with a late schema
    {
        let path = format!("{}/seed_polylines.zip", corpus_dir);
        let mut assembler = ArchiveAssembler::create("lines", ShapeType::PolyLine)?;
        for i in 0..4 {
            let offset = i as f64 * 10.0;
            assembler.append(&PolyLine::new(vec![
                vec![Point::new(offset, 0.0), Point::new(offset + 5.0, 5.0)],
                vec![Point::new(offset, 5.0), Point::new(offset + 5.0, 0.0)],
            ]))?;
        }
        assembler.set_schema(vec![Field::logical("PAVED")?])?;
        assembler.write_attribute(0, 0, true)?;
        fs::write(&path, assembler.emit()?)?;
        println!("✓ Generated: {}", path);
    }

    println!("\nSeed corpus generated in {}", corpus_dir);
    Ok(())
}
