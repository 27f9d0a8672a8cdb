//! World identifier sync message.
//!
//! Sent server → client once per join on [`super::SYNC_CHANNEL`]. The body is a
//! single string in the host's wire format:
//!
//!   `<varint byte length><utf-8 bytes>`
use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Longest identifier in characters the host string codec accepts.
pub const MAX_IDENTIFIER_CHARS: usize = 32767;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload truncated")]
    Truncated,
    #[error("varint length prefix too long")]
    VarIntTooLong,
    #[error("identifier too long: {0} chars")]
    TooLong(usize),
    #[error("identifier is not valid utf-8")]
    InvalidUtf8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldIdPayload {
    pub world_identifier: String,
}

impl WorldIdPayload {
    pub fn new(world_identifier: impl Into<String>) -> Self {
        Self {
            world_identifier: world_identifier.into(),
        }
    }

    pub fn encode(&self) -> Result<Bytes, PayloadError> {
        let chars = self.world_identifier.chars().count();
        if chars > MAX_IDENTIFIER_CHARS {
            return Err(PayloadError::TooLong(chars));
        }
        let raw = self.world_identifier.as_bytes();
        let mut buf = BytesMut::with_capacity(raw.len() + 3);
        put_varint(&mut buf, raw.len() as u32);
        buf.put_slice(raw);
        Ok(buf.freeze())
    }

    pub fn decode(mut data: &[u8]) -> Result<Self, PayloadError> {
        let len = get_varint(&mut data)? as usize;
        // A char is at most 3 bytes in the host's modified encoding
        if len > MAX_IDENTIFIER_CHARS * 3 {
            return Err(PayloadError::TooLong(len));
        }
        if data.remaining() < len {
            return Err(PayloadError::Truncated);
        }
        let text = std::str::from_utf8(&data[..len]).map_err(|_| PayloadError::InvalidUtf8)?;
        let chars = text.chars().count();
        if chars > MAX_IDENTIFIER_CHARS {
            return Err(PayloadError::TooLong(chars));
        }
        Ok(Self::new(text))
    }
}

fn put_varint(buf: &mut BytesMut, mut value: u32) {
    loop {
        if value & !0x7F == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8(((value & 0x7F) | 0x80) as u8);
        value >>= 7;
    }
}

fn get_varint(data: &mut &[u8]) -> Result<u32, PayloadError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    loop {
        if !data.has_remaining() {
            return Err(PayloadError::Truncated);
        }
        let b = data.get_u8();
        value |= ((b & 0x7F) as u32) << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift >= 35 {
            return Err(PayloadError::VarIntTooLong);
        }
    }
}
