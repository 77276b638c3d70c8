//! In-place RIFF chunk builder

use crate::SF2_NAME_SIZE;
use crate::error::ExportError;

/// Builds nested RIFF chunks into one buffer, patching sizes on close
#[derive(Debug)]
pub(super) struct RiffWriter {
    buf: Vec<u8>,
    open: Vec<usize>,
    limit: u64,
}

impl RiffWriter {
    /// `limit` caps every chunk size field
    pub fn new(limit: u64) -> Self {
        Self {
            buf: Vec::new(),
            open: Vec::new(),
            limit: limit.min(u64::from(u32::MAX)),
        }
    }

    /// Open a chunk; its size is written by [`RiffWriter::end`]
    pub fn begin(&mut self, tag: &[u8; 4]) {
        self.open.push(self.buf.len());
        self.buf.extend_from_slice(tag);
        self.buf.extend_from_slice(&[0; 4]);
    }

    /// Open a `RIFF` or `LIST` chunk with its form type
    pub fn begin_list(&mut self, id: &[u8; 4], form: &[u8; 4]) {
        self.begin(id);
        self.buf.extend_from_slice(form);
    }

    /// Close the innermost chunk, padding its payload to even length
    pub fn end(&mut self) -> Result<(), ExportError> {
        let Some(start) = self.open.pop() else {
            return Ok(());
        };
        let size = (self.buf.len() - start - 8) as u64;
        self.check(size)?;

        self.buf[start + 4..start + 8].copy_from_slice(&(size as u32).to_le_bytes());
        if size % 2 != 0 {
            self.buf.push(0);
        }
        Ok(())
    }

    /// Write a complete leaf chunk
    pub fn chunk(&mut self, tag: &[u8; 4], payload: &[u8]) -> Result<(), ExportError> {
        self.begin(tag);
        self.bytes(payload);
        self.end()
    }

    /// Fail early if a chunk of `size` bytes could never be written
    pub fn check(&self, size: u64) -> Result<(), ExportError> {
        if size > self.limit {
            return Err(ExportError::SizeLimitExceeded {
                size,
                limit: self.limit,
            });
        }
        Ok(())
    }

    pub fn reserve(&mut self, additional: usize) {
        self.buf.reserve(additional);
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Fixed 20-byte name field: ASCII, at most 19 characters, NUL terminated
    pub fn name(&mut self, name: &str) {
        let mut field = [0u8; SF2_NAME_SIZE];
        for (dst, c) in field[..SF2_NAME_SIZE - 1].iter_mut().zip(name.chars()) {
            *dst = if c.is_ascii() && !c.is_ascii_control() {
                c as u8
            } else {
                b'?'
            };
        }
        self.buf.extend_from_slice(&field);
    }

    /// Finish, closing anything left open
    pub fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        while !self.open.is_empty() {
            self.end()?;
        }
        Ok(self.buf)
    }
}

/// NUL-terminated string padded to even length (INFO sub-chunks)
pub(super) fn zstr(text: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = text
        .chars()
        .map(|c| if c.is_ascii() && c != '\0' { c as u8 } else { b'?' })
        .collect();
    bytes.push(0);
    if bytes.len() % 2 != 0 {
        bytes.push(0);
    }
    bytes
}
