use super::field::{Field, FieldType};
use crate::error::{Result, ShapeZipError};

/// A single attribute cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Date { year: u16, month: u8, day: u8 },
    Logical(bool),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Logical(v)
    }
}

impl Value {
    /// Render the value as exactly `field.size` bytes.
    ///
    /// Text is left-aligned and truncated; numbers are right-aligned and must
    /// fit the width.
    pub fn format(&self, field: &Field) -> Result<Vec<u8>> {
        let width = field.size as usize;

        let text = match (field.field_type, self) {
            (_, Value::Null) => return Ok(vec![b' '; width]),

            (FieldType::Character, Value::Text(s)) => return Ok(pad_left_aligned(s, width)),
            (FieldType::Character, Value::Integer(n)) => return Ok(pad_left_aligned(&n.to_string(), width)),
            (FieldType::Character, Value::Float(x)) => return Ok(pad_left_aligned(&x.to_string(), width)),
            (FieldType::Character, Value::Logical(b)) => {
                return Ok(pad_left_aligned(if *b { "T" } else { "F" }, width))
            }

            (FieldType::Numeric | FieldType::Float, Value::Integer(n)) => {
                if field.precision > 0 {
                    format!("{:.*}", field.precision as usize, *n as f64)
                } else {
                    n.to_string()
                }
            }
            (FieldType::Numeric | FieldType::Float, Value::Float(x)) => {
                if !x.is_finite() {
                    return Err(ShapeZipError::InvalidField(format!(
                        "Non-finite value for field {:?}",
                        field.name
                    )));
                }
                format!("{:.*}", field.precision as usize, x)
            }
            (FieldType::Numeric | FieldType::Float, Value::Text(s)) => s.trim().to_string(),

            (FieldType::Date, Value::Date { year, month, day }) => {
                format!("{:04}{:02}{:02}", year, month, day)
            }
            (FieldType::Date, Value::Text(s)) if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.clone()
            }

            (FieldType::Logical, Value::Logical(b)) => (if *b { "T" } else { "F" }).to_string(),

            (field_type, value) => {
                return Err(ShapeZipError::InvalidField(format!(
                    "Cannot store {:?} in {:?} field {:?}",
                    value, field_type, field.name
                )))
            }
        };

        if text.len() > width {
            return Err(ShapeZipError::InvalidField(format!(
                "Value {:?} wider than field {:?} ({} bytes)",
                text, field.name, width
            )));
        }

        let mut out = vec![b' '; width - text.len()];
        out.extend_from_slice(text.as_bytes());
        Ok(out)
    }
}

/// Left-align `text` in `width` bytes, truncating on a character boundary
fn pad_left_aligned(text: &str, width: usize) -> Vec<u8> {
    let mut end = text.len().min(width);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = text.as_bytes()[..end].to_vec();
    out.resize(width, b' ');
    out
}
