//! Attribute stream layout: field descriptors, table header and cell values.

mod field;
mod schema;
mod value;

pub use field::{Field, FieldType, FIELD_DESCRIPTOR_SIZE, MAX_FIELD_NAME_LENGTH};
pub use schema::{
    AttributeSchema, TableHeader, HEADER_TERMINATOR, RECORD_ACTIVE, TABLE_PREAMBLE_SIZE,
    TABLE_VERSION,
};
pub use value::Value;
