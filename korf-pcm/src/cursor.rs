//! Random-access byte reader for binary containers

use crate::error::ParseError;

/// Bounds-checked reader over a byte slice
///
/// Reads are big-endian unless the method says otherwise, matching the
/// container layout. Program files use the little-endian variants.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at position 0
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a cursor at the given position
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute position (may point past the end; reads will fail)
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Skip `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.take(n).map(|_| ())
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Total length of the underlying data
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying data is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take the next `n` bytes
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        let end = self.pos.checked_add(n).ok_or(ParseError::UnexpectedEof)?;
        let bytes = self.data.get(self.pos..end).ok_or(ParseError::UnexpectedEof)?;
        self.pos = end;
        Ok(bytes)
    }

    /// Take a fixed-size array
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take_array::<1>()?[0])
    }

    /// Read a 16-bit big-endian integer
    pub fn read_u16_be(&mut self) -> Result<u16, ParseError> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    /// Read a 32-bit big-endian integer
    pub fn read_u32_be(&mut self) -> Result<u32, ParseError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    /// Read a 16-bit little-endian integer
    pub fn read_u16_le(&mut self) -> Result<u16, ParseError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    /// Read a 32-bit little-endian integer
    pub fn read_u32_le(&mut self) -> Result<u32, ParseError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Read a big-endian u16 at an absolute position without moving the cursor
    pub fn peek_u16_be(&self, pos: usize) -> Result<u16, ParseError> {
        ByteCursor::at(self.data, pos).read_u16_be()
    }
}

/// Find the last occurrence of `needle` in `haystack`
pub(crate) fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Read a NUL-terminated or fixed-length ASCII string, trimming padding
pub(crate) fn read_string(bytes: &[u8]) -> String {
    // Find null terminator or end of slice
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u16_be().unwrap(), 0x1234);
        assert_eq!(cursor.read_u16_be().unwrap(), 0x5678);
        assert_eq!(cursor.read_u8().unwrap(), 0x9A);
        assert!(matches!(cursor.read_u8(), Err(ParseError::UnexpectedEof)));
    }

    #[test]
    fn test_little_endian_reads() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u16_le().unwrap(), 0x1234);
        assert_eq!(cursor.read_u32_le().unwrap(), 0x1234_5678);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_take_past_end_does_not_move() {
        let data = [1, 2, 3];
        let mut cursor = ByteCursor::at(&data, 2);
        assert!(cursor.take(2).is_err());
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.take(1).unwrap(), &[3]);
    }

    #[test]
    fn test_peek_does_not_move() {
        let data = [0, 0, 0xBB, 0x80];
        let cursor = ByteCursor::new(&data);
        assert_eq!(cursor.peek_u16_be(2).unwrap(), 48_000);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_rfind() {
        assert_eq!(rfind(b"KBEG..KBEG..", b"KBEG"), Some(6));
        assert_eq!(rfind(b"abc", b"KBEG"), None);
        assert_eq!(rfind(b"", b"KBEG"), None);
    }

    #[test]
    fn test_read_string() {
        assert_eq!(read_string(b"Kick_01\0\0\0"), "Kick_01");
        assert_eq!(read_string(b"Strings Pad     "), "Strings Pad");
        assert_eq!(read_string(b"  Lead  \0junk"), "Lead");
        assert_eq!(read_string(b""), "");
    }
}
