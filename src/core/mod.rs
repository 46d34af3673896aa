//! # Core Protocol Components
//!
//! Low-level identifiers, frame headers, field codecs, and stream framing.
//!
//! This module provides the foundation for the protocol: the time-ordered
//! identifier type, header layouts per frame role, length-prefixed field
//! primitives, and the tokio codec that frames packets over byte streams.
//!
//! ## Components
//! - **Ident**: 80-bit time-ordered identifiers, guids, opaque tokens
//! - **Header**: role-tagged frame headers, validated before payloads
//! - **Wire**: length-prefixed field primitives and the encode/decode traits
//! - **Codec**: tokio codec for framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Signature(2)] [Kind(4)] [role-specific fields] [ContentSize(4)] [Payload(N)]
//! ```
//!
//! ## Safety
//! - Maximum content size: 16MB (prevents memory exhaustion)
//! - Signature bytes prevent accidental misinterpretation
//! - Length validation before allocation

pub mod codec;
pub mod header;
pub mod ident;
pub mod wire;
