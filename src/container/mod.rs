//! ZIP container codec: writer, in-memory reader, and the on-disk records
//! they share.

mod end_record;
mod format;
mod local_entry;
mod reader;
mod writer;

pub use end_record::{EndRecord, END_RECORD_SIGNATURE, END_RECORD_SIZE};
pub use format::{
    CentralEntry, CompressionMethod, CENTRAL_ENTRY_SIGNATURE, CENTRAL_ENTRY_SIZE, FLAG_UTF8,
    MAX_NAME_LENGTH,
};
pub use local_entry::{LocalEntryHeader, LOCAL_ENTRY_SIGNATURE, LOCAL_ENTRY_SIZE};
pub use reader::ContainerReader;
pub use writer::ContainerWriter;

use crate::error::Result;
use std::io::Read;

// Helper functions for reading little-endian primitives
fn read_u16<R: Read>(mut reader: R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(mut reader: R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
