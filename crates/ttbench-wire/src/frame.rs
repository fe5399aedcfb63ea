//! Bounded frame assembly.
//!
//! A [`FrameBuilder`] owns a buffer of exactly the size its caller computed
//! for a frame. Appends never grow the buffer: a write that does not fit is
//! dropped and the first such failure is latched. The latch is surfaced by
//! [`FrameBuilder::check`], which must run before the bytes are consumed.

use bytes::BufMut;

use crate::codec::{self, MP_UINT32};
use crate::error::{WireError, WireResult};

/// Fixed-capacity builder for a single wire frame.
#[derive(Debug)]
pub struct FrameBuilder {
    /// Pre-sized frame buffer.
    buffer: Vec<u8>,
    /// Write cursor into `buffer`.
    cursor: usize,
    /// First overflow message, if any append did not fit.
    overflow: Option<String>,
}

impl FrameBuilder {
    /// Creates a builder for a frame of exactly `estimated_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `estimated_size` is zero.
    pub fn new(estimated_size: usize) -> Self {
        assert!(estimated_size > 0, "frame size must be positive");
        Self {
            buffer: vec![0; estimated_size],
            cursor: 0,
            overflow: None,
        }
    }

    /// Bytes still available for appends.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Returns true once an append has overflowed.
    pub fn is_overflown(&self) -> bool {
        self.overflow.is_some()
    }

    /// Appends `value` using the minimal MessagePack unsigned encoding.
    pub fn append_uint(&mut self, value: u64, name: &str) {
        let size = codec::sizeof_uint(value);
        if let Some(mut dst) = self.reserve(size, name) {
            codec::encode_uint(&mut dst, value);
        }
    }

    /// Appends `value` as a fixed-width MessagePack uint32 (`0xCE` + 4 bytes).
    pub fn append_uint32(&mut self, value: u32, name: &str) {
        if let Some(mut dst) = self.reserve(5, name) {
            dst.put_u8(MP_UINT32);
            dst.put_u32(value);
        }
    }

    /// Appends a single raw byte.
    pub fn append_raw(&mut self, byte: u8, name: &str) {
        if let Some(dst) = self.reserve(1, name) {
            dst[0] = byte;
        }
    }

    /// Appends a raw byte sequence.
    pub fn append_bytes(&mut self, bytes: &[u8], name: &str) {
        if let Some(dst) = self.reserve(bytes.len(), name) {
            dst.copy_from_slice(bytes);
        }
    }

    /// Surfaces a latched overflow.
    pub fn check(&self) -> WireResult<()> {
        match &self.overflow {
            Some(message) => Err(WireError::Overflow(message.clone())),
            None => Ok(()),
        }
    }

    /// Appends the finished frame to `out`.
    ///
    /// # Panics
    ///
    /// Panics unless the cursor sits exactly at the end of the buffer. Frame
    /// capacities are computed up front, so any under-fill or overflow here
    /// is a sizing bug in the caller.
    pub fn build_into(self, out: &mut Vec<u8>) {
        assert!(
            self.overflow.is_none() && self.cursor == self.buffer.len(),
            "frame filled {} of {} bytes",
            self.cursor,
            self.buffer.len()
        );
        out.extend_from_slice(&self.buffer);
    }

    /// Checks the latch and returns the frame bytes.
    pub fn finish(self) -> WireResult<Vec<u8>> {
        self.check()?;
        let mut out = Vec::with_capacity(self.buffer.len());
        self.build_into(&mut out);
        Ok(out)
    }

    /// Claims `size` bytes at the cursor, or latches an overflow for `name`.
    fn reserve(&mut self, size: usize, name: &str) -> Option<&mut [u8]> {
        if self.overflow.is_some() {
            return None;
        }
        if size > self.remaining() {
            self.overflow = Some(format!("overflow while building {name}"));
            return None;
        }
        let start = self.cursor;
        self.cursor += size;
        Some(&mut self.buffer[start..self.cursor])
    }
}
