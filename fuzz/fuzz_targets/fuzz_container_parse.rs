#![no_main]

use libfuzzer_sys::fuzz_target;
use shapezip::dbf::TableHeader;
use shapezip::shape::ShapeHeader;
use shapezip::ContainerReader;

fuzz_target!(|data: &[u8]| {
    // Skip inputs shorter than an end record
    if data.len() < 22 {
        return;
    }

    // Parse container - should never panic
    let reader = match ContainerReader::new(data.to_vec()) {
        Ok(r) => r,
        Err(_) => return, // Expected for invalid data
    };

    // Read every entry and decode any headers that look familiar
    let names: Vec<String> = reader.list_entries().to_vec();
    for name in &names {
        let Ok(bytes) = reader.read_entry(name) else {
            continue;
        };
        if name.ends_with(".shp") || name.ends_with(".shx") {
            let _ = ShapeHeader::read_from(&bytes[..]);
        } else if name.ends_with(".dbf") {
            let _ = TableHeader::read_from(&bytes[..]);
        }
    }

    let _ = reader.entry_count();
    let _ = reader.contains("");
    let _ = reader.contains("../../../etc/passwd");
});
