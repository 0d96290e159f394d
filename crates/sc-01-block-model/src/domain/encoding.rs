//! # Canonical Encoding
//!
//! Byte writer used by every hash in this crate. Fields are appended in a
//! fixed order with fixed widths; variable-length fields carry a length
//! prefix unless they are the last free-form text of a record.

use shared_types::{double_hash, Hash};

/// Append-only canonical byte buffer.
#[derive(Debug, Default)]
pub struct Canonical {
    buf: Vec<u8>,
}

impl Canonical {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one byte.
    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    /// Append a big-endian u32.
    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Append a big-endian u64.
    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Append raw bytes with no prefix.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append bytes behind a u32 length prefix.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.u32(bytes.len() as u32);
        self.raw(bytes)
    }

    /// Append the ASCII decimal rendering of a number.
    pub fn decimal(&mut self, v: impl std::fmt::Display) -> &mut Self {
        self.raw(v.to_string().as_bytes())
    }

    /// Append UTF-8 text with no prefix.
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.raw(s.as_bytes())
    }

    /// Append a hash as 32 raw bytes.
    pub fn hash(&mut self, h: &Hash) -> &mut Self {
        self.raw(h)
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Double hash of the bytes written so far.
    pub fn digest(&self) -> Hash {
        double_hash(&self.buf)
    }
}
