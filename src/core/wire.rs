//! # Wire Primitives
//!
//! Field-level binary encoding shared by every packet type.
//!
//! All integers are big-endian. Variable-length fields (strings, arrays) are
//! a `u32` count immediately followed by the raw UTF-8 bytes or the repeated
//! elements; a count of zero is a valid empty value, not an error.
//!
//! ## Contracts
//! - Encoding builds output through [`WireEncode::to_wire_bytes`], which
//!   assembles a fresh buffer: a failed encode has no side effect on any
//!   destination.
//! - [`WireEncode::encoded_len`] must equal the number of bytes `encode`
//!   writes, exactly. Every fixed field therefore sits at a constant offset
//!   from the start of its record, and the byte counts are auditable per
//!   field.
//! - Decoding consumes from a [`Bytes`] view bounded by the frame's declared
//!   content size; a short buffer fails with `Truncated` instead of
//!   panicking, and [`expect_consumed`] rejects trailing bytes.

use crate::core::ident::{Guid, Identifier, Token};
use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Binary encoding of one record or packet body.
pub trait WireEncode {
    /// Exact number of bytes [`WireEncode::encode`] will write.
    fn encoded_len(&self) -> usize;

    /// Append the encoding to `dst`. Implementations only fail before
    /// writing (size validation), never mid-field.
    fn encode(&self, dst: &mut BytesMut) -> Result<()>;

    /// Encode into a fresh buffer. On failure nothing is written anywhere.
    fn to_wire_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        debug_assert_eq!(buf.len(), self.encoded_len());
        Ok(buf.freeze())
    }
}

/// Binary decoding of one record or packet body.
pub trait WireDecode: Sized {
    /// Consume one value from the front of `src`.
    fn decode(src: &mut Bytes) -> Result<Self>;
}

/// Fail with `Truncated` unless `src` still holds `needed` bytes.
pub fn ensure(src: &Bytes, needed: usize) -> Result<()> {
    if src.remaining() < needed {
        return Err(ProtocolError::Truncated {
            needed,
            available: src.remaining(),
        });
    }
    Ok(())
}

/// Fail with `TrailingBytes` unless `src` was consumed exactly.
pub fn expect_consumed(src: &Bytes) -> Result<()> {
    if src.has_remaining() {
        return Err(ProtocolError::TrailingBytes(src.remaining()));
    }
    Ok(())
}

/// Encoded size of a length-prefixed string.
pub fn string_len(value: &str) -> usize {
    4 + value.len()
}

/// Write a `u32` count followed by raw UTF-8 bytes.
pub fn put_string(dst: &mut BytesMut, value: &str) -> Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| ProtocolError::OversizedContent(value.len()))?;
    dst.put_u32(len);
    dst.put_slice(value.as_bytes());
    Ok(())
}

/// Read a length-prefixed UTF-8 string.
pub fn get_string(src: &mut Bytes) -> Result<String> {
    ensure(src, 4)?;
    let len = src.get_u32() as usize;
    ensure(src, len)?;
    let raw = src.split_to(len);
    String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::InvalidString)
}

/// Write a 10-byte identifier.
pub fn put_ident(dst: &mut BytesMut, value: &Identifier) {
    dst.put_slice(&value.to_bytes());
}

/// Read a 10-byte identifier.
pub fn get_ident(src: &mut Bytes) -> Result<Identifier> {
    ensure(src, Identifier::SIZE)?;
    let mut raw = [0u8; Identifier::SIZE];
    src.copy_to_slice(&mut raw);
    Ok(Identifier::from_bytes(&raw))
}

/// Write a 16-byte guid.
pub fn put_guid(dst: &mut BytesMut, value: &Guid) {
    dst.put_slice(value.as_bytes());
}

/// Read a 16-byte guid.
pub fn get_guid(src: &mut Bytes) -> Result<Guid> {
    ensure(src, Guid::SIZE)?;
    let mut raw = [0u8; Guid::SIZE];
    src.copy_to_slice(&mut raw);
    Ok(Guid::from_bytes(raw))
}

/// Write a 16-byte opaque token.
pub fn put_token(dst: &mut BytesMut, value: &Token) {
    dst.put_slice(value.as_bytes());
}

/// Read a 16-byte opaque token.
pub fn get_token(src: &mut Bytes) -> Result<Token> {
    ensure(src, Token::SIZE)?;
    let mut raw = [0u8; Token::SIZE];
    src.copy_to_slice(&mut raw);
    Ok(Token::from_bytes(raw))
}

/// Encoded size of a length-prefixed identifier array.
pub fn ident_list_len(items: &[Identifier]) -> usize {
    4 + items.len() * Identifier::SIZE
}

/// Write a `u32` count followed by fixed 10-byte identifiers.
pub fn put_ident_list(dst: &mut BytesMut, items: &[Identifier]) -> Result<()> {
    let count = u32::try_from(items.len())
        .map_err(|_| ProtocolError::OversizedContent(items.len()))?;
    dst.put_u32(count);
    for item in items {
        put_ident(dst, item);
    }
    Ok(())
}

/// Read a length-prefixed identifier array.
pub fn get_ident_list(src: &mut Bytes) -> Result<Vec<Identifier>> {
    ensure(src, 4)?;
    let count = src.get_u32() as usize;
    // Fixed element size: the whole array must already be buffered.
    ensure(src, count.saturating_mul(Identifier::SIZE))?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(get_ident(src)?);
    }
    Ok(items)
}

/// Encoded size of a length-prefixed array of records.
pub fn list_len<T: WireEncode>(items: &[T]) -> usize {
    4 + items.iter().map(WireEncode::encoded_len).sum::<usize>()
}

/// Write a `u32` count followed by encoded records.
pub fn put_list<T: WireEncode>(dst: &mut BytesMut, items: &[T]) -> Result<()> {
    let count = u32::try_from(items.len())
        .map_err(|_| ProtocolError::OversizedContent(items.len()))?;
    dst.put_u32(count);
    for item in items {
        item.encode(dst)?;
    }
    Ok(())
}

/// Read a length-prefixed array of records.
pub fn get_list<T: WireDecode>(src: &mut Bytes) -> Result<Vec<T>> {
    ensure(src, 4)?;
    let count = src.get_u32() as usize;
    // Variable element size: capacity is clamped to the bytes actually
    // present so a hostile count cannot force a huge allocation up front.
    let mut items = Vec::with_capacity(count.min(src.remaining()));
    for _ in 0..count {
        items.push(T::decode(src)?);
    }
    Ok(items)
}
