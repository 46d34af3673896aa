//! # Frame Headers
//!
//! Every frame opens with a fixed-layout header; the role word of the
//! discriminant decides which layout. All integers are big-endian.
//!
//! ```text
//! request (guid generation, 52 bytes):
//!   [Signature(2)] [Kind(4)] [Correlation(10)] [UserId(16)] [SessionId(16)] [ContentSize(4)]
//! request (token generation, 62 bytes):
//!   [Signature(2)] [Kind(4)] [Correlation(10)] [UserId(10)] [Access(16)] [Refresh(16)] [ContentSize(4)]
//! response (28 bytes):
//!   [Signature(2)] [Kind(4)] [Correlation(10)] [ErrorCode(4)] [ContentSize(4)]
//! broadcast (10 bytes):
//!   [Signature(2)] [Kind(4)] [ContentSize(4)]
//! ```
//!
//! A header whose signature mismatches the protocol constant, whose role word
//! is unknown, or whose declared content size exceeds the protocol limit is
//! rejected here, before any payload deserialization is attempted. The
//! credential generation is selected by the discriminant's role word, never
//! by header length alone.

use crate::config::{MAX_CONTENT_SIZE, SIGNATURE};
use crate::core::ident::{Guid, Identifier, Token};
use crate::core::wire::{ensure, get_guid, get_ident, get_token, put_guid, put_ident, put_token};
use crate::error::{ProtocolError, Result};
use crate::protocol::kind::{
    compose, split, ROLE_BROADCAST, ROLE_REQUEST_SESSION, ROLE_REQUEST_TOKEN, ROLE_RESPONSE,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Bytes needed before the role (and thus the full header length) is known:
/// signature + discriminant.
pub const BASE_SIZE: usize = 2 + 4;

/// Header length for guid-credential requests: 6 + 10 + 16 + 16 + 4.
pub const REQUEST_SESSION_SIZE: usize = BASE_SIZE + Identifier::SIZE + Guid::SIZE + Guid::SIZE + 4;

/// Header length for token-credential requests: 6 + 10 + 10 + 16 + 16 + 4.
pub const REQUEST_TOKEN_SIZE: usize =
    BASE_SIZE + Identifier::SIZE + Identifier::SIZE + Token::SIZE + Token::SIZE + 4;

/// Header length for responses: 6 + 10 + 4 + 4.
pub const RESPONSE_SIZE: usize = BASE_SIZE + Identifier::SIZE + 4 + 4;

/// Header length for broadcasts: 6 + 4.
pub const BROADCAST_SIZE: usize = BASE_SIZE + 4;

/// One decoded frame header, tagged by role.
///
/// `op` is the raw operation word; mapping it onto the closed operation set
/// happens during payload dispatch, where the role is already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    RequestSession {
        op: u16,
        correlation: Identifier,
        user_id: Guid,
        session_id: Guid,
        content_size: u32,
    },
    RequestToken {
        op: u16,
        correlation: Identifier,
        user_id: Identifier,
        access_token: Token,
        refresh_token: Token,
        content_size: u32,
    },
    Response {
        op: u16,
        correlation: Identifier,
        error_code: u32,
        content_size: u32,
    },
    Broadcast {
        op: u16,
        content_size: u32,
    },
}

impl Header {
    /// Total header length for a role word, or `None` for an unknown role.
    pub fn size_for_role(role: u16) -> Option<usize> {
        match role {
            ROLE_REQUEST_SESSION => Some(REQUEST_SESSION_SIZE),
            ROLE_REQUEST_TOKEN => Some(REQUEST_TOKEN_SIZE),
            ROLE_RESPONSE => Some(RESPONSE_SIZE),
            ROLE_BROADCAST => Some(BROADCAST_SIZE),
            _ => None,
        }
    }

    /// The role word this header serializes under.
    pub fn role(&self) -> u16 {
        match self {
            Header::RequestSession { .. } => ROLE_REQUEST_SESSION,
            Header::RequestToken { .. } => ROLE_REQUEST_TOKEN,
            Header::Response { .. } => ROLE_RESPONSE,
            Header::Broadcast { .. } => ROLE_BROADCAST,
        }
    }

    /// Human-readable role name for logs and errors.
    pub fn role_name(&self) -> &'static str {
        match self {
            Header::RequestSession { .. } | Header::RequestToken { .. } => "request",
            Header::Response { .. } => "response",
            Header::Broadcast { .. } => "broadcast",
        }
    }

    /// The full 4-byte discriminant.
    pub fn kind(&self) -> u32 {
        let op = match self {
            Header::RequestSession { op, .. }
            | Header::RequestToken { op, .. }
            | Header::Response { op, .. }
            | Header::Broadcast { op, .. } => *op,
        };
        compose(self.role(), op)
    }

    /// Declared byte length of the payload that follows this header.
    pub fn content_size(&self) -> usize {
        match self {
            Header::RequestSession { content_size, .. }
            | Header::RequestToken { content_size, .. }
            | Header::Response { content_size, .. }
            | Header::Broadcast { content_size, .. } => *content_size as usize,
        }
    }

    /// Exact encoded length of this header.
    pub fn encoded_len(&self) -> usize {
        match self {
            Header::RequestSession { .. } => REQUEST_SESSION_SIZE,
            Header::RequestToken { .. } => REQUEST_TOKEN_SIZE,
            Header::Response { .. } => RESPONSE_SIZE,
            Header::Broadcast { .. } => BROADCAST_SIZE,
        }
    }

    /// Append the header bytes to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        if self.content_size() > MAX_CONTENT_SIZE {
            return Err(ProtocolError::OversizedContent(self.content_size()));
        }

        dst.put_u16(SIGNATURE);
        dst.put_u32(self.kind());
        match self {
            Header::RequestSession {
                correlation,
                user_id,
                session_id,
                content_size,
                ..
            } => {
                put_ident(dst, correlation);
                put_guid(dst, user_id);
                put_guid(dst, session_id);
                dst.put_u32(*content_size);
            }
            Header::RequestToken {
                correlation,
                user_id,
                access_token,
                refresh_token,
                content_size,
                ..
            } => {
                put_ident(dst, correlation);
                put_ident(dst, user_id);
                put_token(dst, access_token);
                put_token(dst, refresh_token);
                dst.put_u32(*content_size);
            }
            Header::Response {
                correlation,
                error_code,
                content_size,
                ..
            } => {
                put_ident(dst, correlation);
                dst.put_u32(*error_code);
                dst.put_u32(*content_size);
            }
            Header::Broadcast { content_size, .. } => {
                dst.put_u32(*content_size);
            }
        }
        Ok(())
    }

    /// Consume one header from the front of `src`.
    ///
    /// Signature and role are checked before any role-specific field is read,
    /// and the declared content size is bounded by the protocol limit.
    pub fn decode(src: &mut Bytes) -> Result<Header> {
        ensure(src, BASE_SIZE)?;
        let signature = src.get_u16();
        if signature != SIGNATURE {
            return Err(ProtocolError::BadSignature { found: signature });
        }

        let kind = src.get_u32();
        let (role, op) = split(kind);
        let body_size = Header::size_for_role(role)
            .ok_or(ProtocolError::UnknownPacketType(kind))?
            - BASE_SIZE;
        ensure(src, body_size)?;

        let header = match role {
            ROLE_REQUEST_SESSION => Header::RequestSession {
                op,
                correlation: get_ident(src)?,
                user_id: get_guid(src)?,
                session_id: get_guid(src)?,
                content_size: src.get_u32(),
            },
            ROLE_REQUEST_TOKEN => Header::RequestToken {
                op,
                correlation: get_ident(src)?,
                user_id: get_ident(src)?,
                access_token: get_token(src)?,
                refresh_token: get_token(src)?,
                content_size: src.get_u32(),
            },
            ROLE_RESPONSE => Header::Response {
                op,
                correlation: get_ident(src)?,
                error_code: src.get_u32(),
                content_size: src.get_u32(),
            },
            ROLE_BROADCAST => Header::Broadcast {
                op,
                content_size: src.get_u32(),
            },
            _ => unreachable!("role validated by size_for_role"),
        };

        if header.content_size() > MAX_CONTENT_SIZE {
            return Err(ProtocolError::OversizedContent(header.content_size()));
        }
        Ok(header)
    }
}
