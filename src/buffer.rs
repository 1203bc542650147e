//! Growable in-memory byte buffer with position based read/write/seek.
//!
//! Fixed-size headers whose fields are only known after all records have been
//! written are handled by reserving a zero-filled placeholder (seek past the
//! header size), appending records, then seeking back to offset 0 and
//! overwriting the placeholder in place.

use crate::error::{Result, ShapeZipError};
use std::io::{self, Cursor, Seek, SeekFrom, Write};

/// Reference point for a seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SeekOrigin {
    Start = 0,
    Current = 1,
    End = 2,
}

impl SeekOrigin {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Start),
            1 => Ok(Self::Current),
            2 => Ok(Self::End),
            _ => Err(ShapeZipError::InvalidSeekOrigin(value)),
        }
    }
}

/// Writeable and seekable byte buffer that only ever grows.
///
/// `cursor <= len()` holds after every operation. Writes and seeks past the
/// end zero-extend the contents first.
#[derive(Debug, Clone, Default)]
pub struct RandomAccessBuffer {
    contents: Vec<u8>,
    cursor: usize,
}

impl RandomAccessBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Current cursor position
    pub fn position(&self) -> u64 {
        self.cursor as u64
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.contents
    }

    /// Consume the buffer, returning its contents
    pub fn into_bytes(self) -> Vec<u8> {
        self.contents
    }

    /// Copy `bytes` in at the cursor, overwriting in place and appending the
    /// remainder. Returns the number of bytes accepted.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        let end = self.cursor + bytes.len();
        if end > self.contents.len() {
            self.contents.resize(end, 0);
        }
        self.contents[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
        bytes.len()
    }

    /// Move the cursor relative to `origin`, zero-extending when the new
    /// position lies past the end. On error the buffer is left untouched.
    pub fn seek_to(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let base = match origin {
            SeekOrigin::Start => 0i128,
            SeekOrigin::Current => self.cursor as i128,
            SeekOrigin::End => self.contents.len() as i128,
        };
        let candidate = base + offset as i128;
        if candidate < 0 {
            return Err(ShapeZipError::InvalidSeek(
                candidate.max(i64::MIN as i128) as i64,
            ));
        }
        let pos = usize::try_from(candidate)
            .map_err(|_| ShapeZipError::InvalidSeek(candidate.min(i64::MAX as i128) as i64))?;

        if pos > self.contents.len() {
            self.contents.resize(pos, 0);
        }
        self.cursor = pos;
        Ok(pos as u64)
    }

    /// Seek using a raw origin code (0 = start, 1 = current, 2 = end)
    pub fn seek_whence(&mut self, offset: i64, whence: u8) -> Result<u64> {
        let origin = SeekOrigin::from_u8(whence)?;
        self.seek_to(offset, origin)
    }

    /// Snapshot of the contents from offset 0, unaffected by later writes.
    ///
    /// The returned cursor can be rewound with `set_position(0)`.
    pub fn reader(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.contents.clone())
    }

    /// The buffer holds no external resources.
    pub fn release(&mut self) {}
}

impl Write for RandomAccessBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for RandomAccessBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let result = match pos {
            SeekFrom::Start(offset) => i64::try_from(offset)
                .map_err(|_| ShapeZipError::InvalidSeek(i64::MAX))
                .and_then(|offset| self.seek_to(offset, SeekOrigin::Start)),
            SeekFrom::Current(offset) => self.seek_to(offset, SeekOrigin::Current),
            SeekFrom::End(offset) => self.seek_to(offset, SeekOrigin::End),
        };
        result.map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_write_and_seek_sequence() {
        let mut b = RandomAccessBuffer::new();

        assert_eq!(b.write_bytes(b"hello"), 5);
        assert_eq!(b.len(), 5);

        assert_eq!(b.seek_to(0, SeekOrigin::Start).unwrap(), 0);
        assert_eq!(b.len(), 5);

        assert_eq!(b.seek_to(128, SeekOrigin::Start).unwrap(), 128);
        assert_eq!(b.len(), 128);

        assert_eq!(b.seek_to(0, SeekOrigin::Current).unwrap(), 128);
        assert_eq!(b.len(), 128);

        assert_eq!(b.seek_to(128, SeekOrigin::Current).unwrap(), 256);
        assert_eq!(b.len(), 256);

        assert_eq!(b.seek_to(128, SeekOrigin::Start).unwrap(), 128);
        assert_eq!(b.len(), 256);

        b.write_bytes(b"hello");
        assert_eq!(b.len(), 256);

        assert_eq!(b.seek_to(-8, SeekOrigin::End).unwrap(), 248);
        assert_eq!(b.len(), 256);

        b.write_bytes(b"hellohello");
        assert_eq!(b.len(), 258);
        assert_eq!(b.position(), 258);
    }

    #[test]
    fn test_cursor_never_exceeds_length() {
        let mut b = RandomAccessBuffer::new();
        let mut last_len = 0;

        let ops: [(i64, SeekOrigin, &[u8]); 6] = [
            (10, SeekOrigin::Start, &b"abc"[..]),
            (-2, SeekOrigin::Current, &b"xyz"[..]),
            (0, SeekOrigin::End, &b""[..]),
            (5, SeekOrigin::End, &b"q"[..]),
            (0, SeekOrigin::Start, &b"0123456789abcdef"[..]),
            (-20, SeekOrigin::End, &b"zz"[..]),
        ];

        for (offset, origin, data) in ops {
            b.seek_to(offset, origin).unwrap();
            assert!(b.position() as usize <= b.len());
            b.write_bytes(data);
            assert!(b.position() as usize <= b.len());
            assert!(b.len() >= last_len);
            last_len = b.len();
        }
    }

    #[test]
    fn test_seek_gap_is_zero_filled() {
        let mut b = RandomAccessBuffer::new();
        b.write_bytes(&[0xFF; 4]);
        b.seek_to(64, SeekOrigin::Start).unwrap();
        b.write_bytes(&[0xEE; 4]);

        let bytes = b.as_bytes();
        assert_eq!(bytes.len(), 68);
        assert!(bytes[4..64].iter().all(|&x| x == 0));
        assert_eq!(&bytes[64..], &[0xEE; 4]);
    }

    #[test]
    fn test_write_then_read_back() {
        let mut b = RandomAccessBuffer::new();
        b.write_bytes(&[7u8; 32]);
        b.seek_to(20, SeekOrigin::Start).unwrap();

        let start = b.position() as usize;
        let payload = b"spans the old end of the buffer";
        b.write_bytes(payload);

        assert_eq!(&b.as_bytes()[start..start + payload.len()], payload);
        assert_eq!(&b.as_bytes()[..20], &[7u8; 20]);
    }

    #[test]
    fn test_negative_seek_rejected() {
        let mut b = RandomAccessBuffer::new();
        b.write_bytes(b"abcdef");
        b.seek_to(3, SeekOrigin::Start).unwrap();

        assert!(matches!(
            b.seek_to(-4, SeekOrigin::Current),
            Err(ShapeZipError::InvalidSeek(-1))
        ));
        assert!(b.seek_to(-7, SeekOrigin::End).is_err());
        assert!(b.seek_to(-1, SeekOrigin::Start).is_err());

        assert_eq!(b.position(), 3);
        assert_eq!(b.as_bytes(), b"abcdef");
    }

    #[test]
    fn test_unknown_origin_leaves_state() {
        let mut b = RandomAccessBuffer::new();
        b.write_bytes(b"abcdef");
        b.seek_whence(2, 0).unwrap();

        let result = b.seek_whence(100, 3);
        assert!(matches!(result, Err(ShapeZipError::InvalidSeekOrigin(3))));
        assert_eq!(b.position(), 2);
        assert_eq!(b.as_bytes(), b"abcdef");

        assert_eq!(b.seek_whence(1, 1).unwrap(), 3);
        assert_eq!(b.seek_whence(-1, 2).unwrap(), 5);
    }

    #[test]
    fn test_reader_is_snapshot() {
        let mut b = RandomAccessBuffer::new();
        b.write_bytes(b"first");
        b.seek_to(2, SeekOrigin::Start).unwrap();

        let mut reader = b.reader();
        b.write_bytes(b"XXXXXX");

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"first");

        reader.set_position(0);
        let mut again = Vec::new();
        reader.read_to_end(&mut again).unwrap();
        assert_eq!(again, b"first");
    }

    #[test]
    fn test_io_traits() {
        let mut b = RandomAccessBuffer::new();
        b.seek(SeekFrom::Start(4)).unwrap();
        b.write_all(&[1, 2]).unwrap();
        assert_eq!(b.as_bytes(), &[0, 0, 0, 0, 1, 2]);

        let err = b.seek(SeekFrom::Current(-10)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(b.stream_position().unwrap(), 6);
    }
}
