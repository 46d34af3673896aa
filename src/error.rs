//! # Error Types
//!
//! Comprehensive error handling for the chat wire protocol.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from low-level I/O failures to frame-level violations.
//!
//! ## Error Categories
//! - **Framing Errors**: bad signature, truncated buffers, unknown
//!   discriminants, oversized content; always fatal to the current decode
//!   attempt, never retried automatically.
//! - **Protocol Errors**: role/header contradictions, fatal to the frame.
//! - **Connection Errors**: stream read/write failures, fatal to the receive
//!   loop and to every pending exchange.
//! - **Configuration Errors**: invalid or unreadable configuration.
//!
//! Application-level failures (invalid credentials, unknown room, write
//! conflict, ...) are *not* errors at this layer: they travel inside a
//! well-formed response as an [`ErrorCode`](crate::protocol::ErrorCode) and
//! are surfaced to callers as ordinary values.
//!
//! All errors implement `std::error::Error` for interoperability.

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
/// Static strings are borrowed, avoiding heap allocations for common error cases.
pub mod constants {
    /// Dispatcher-related error messages
    pub const ERR_DISPATCHER_WRITE_LOCK: &str = "Failed to acquire write lock on dispatcher";
    pub const ERR_DISPATCHER_READ_LOCK: &str = "Failed to acquire read lock on dispatcher";

    /// Frame validation errors
    pub const ERR_BAD_SIGNATURE: &str = "Frame signature mismatch";
    pub const ERR_TRUNCATED_FRAME: &str = "Frame shorter than its declared layout";
    pub const ERR_OVERSIZED_CONTENT: &str = "Frame content exceeds maximum size";
    pub const ERR_UNKNOWN_PACKET_TYPE: &str = "Unknown packet type discriminant";

    /// Connection errors
    pub const ERR_CONNECTION_CLOSED: &str = "Connection closed";
    pub const ERR_TIMEOUT: &str = "Operation timed out";

    /// Identifier errors
    pub const ERR_IDENTIFIER_LENGTH: &str =
        "Identifier text must be exactly 20 hex or 25 decimal characters";
    pub const ERR_IDENTIFIER_RANGE: &str = "Identifier value exceeds 80 bits";
}

/// Primary error type for all protocol operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The first two bytes of a frame did not match [`crate::config::SIGNATURE`].
    #[error("invalid frame signature: {found:#06x}")]
    BadSignature { found: u16 },

    /// A buffer ended before the layout it declared was complete.
    #[error("truncated frame: needed {needed} bytes, had {available}")]
    Truncated { needed: usize, available: usize },

    /// The packet-type discriminant matched no known role/operation pair.
    #[error("unknown packet type discriminant: {0:#010x}")]
    UnknownPacketType(u32),

    /// The discriminant's role word contradicts the header layout it arrived in.
    #[error("packet type {kind:#010x} is not valid for a {role} frame")]
    RoleMismatch { kind: u32, role: &'static str },

    /// Declared content size exceeds [`crate::config::MAX_CONTENT_SIZE`].
    #[error("content too large: {0} bytes")]
    OversizedContent(usize),

    /// A payload decoded cleanly but left unread bytes inside its content region.
    #[error("payload has {0} trailing bytes past its declared fields")]
    TrailingBytes(usize),

    /// A length-prefixed string was not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidString,

    /// The response carried an error-code value outside the known set.
    #[error("unknown error code: {0}")]
    UnknownErrorCode(u32),

    /// Textual identifier that cannot be parsed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout occurred")]
    Timeout,

    /// No handler registered for the operation, or a frame the dispatcher
    /// cannot act on.
    #[error("Unexpected packet")]
    UnexpectedPacket,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ProtocolError {
    /// True for errors that invalidate the whole connection rather than a
    /// single frame or call.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, ProtocolError::Io(_) | ProtocolError::ConnectionClosed)
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
