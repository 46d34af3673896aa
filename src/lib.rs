//! # chat-protocol
//!
//! Binary wire-protocol core for chat clients and services: framed packets,
//! time-ordered identifiers, and request/response multiplexing over a single
//! duplex stream.
//!
//! ## Architecture
//! - [`core`]: identifiers, frame headers, field codecs, stream framing
//! - [`protocol`]: the packet type hierarchy, router, and dispatcher
//! - [`transport`]: the shared-stream rental discipline
//! - [`config`]: wire constants and TOML-loadable configuration
//! - [`error`]: the error taxonomy
//! - [`utils`]: logging, time, and timeout helpers
//!
//! ## Example
//! ```no_run
//! use chat_protocol::core::ident::IdGenerator;
//! use chat_protocol::protocol::request::{Credentials, RequestBody};
//! use chat_protocol::protocol::Router;
//! use chat_protocol::core::ident::Guid;
//! use std::sync::Arc;
//!
//! # async fn run() -> chat_protocol::error::Result<()> {
//! let stream = tokio::net::TcpStream::connect("127.0.0.1:7300").await?;
//! let ids = Arc::new(IdGenerator::from_entropy());
//! let (router, mut unsolicited) = Router::spawn(stream, ids);
//!
//! let response = router
//!     .send_request(
//!         Credentials::Session {
//!             user_id: Guid::NIL,
//!             session_id: Guid::NIL,
//!         },
//!         RequestBody::Login {
//!             username: "ada".into(),
//!             password: "hunter2".into(),
//!         },
//!     )
//!     .await?;
//!
//! // application status travels inside the response
//! println!("login status: {:?}", response.status);
//!
//! // broadcasts and peer traffic arrive on the unsolicited channel
//! if let Some(frame) = unsolicited.recv().await {
//!     println!("unsolicited: {frame:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::core::ident::{Guid, IdGenerator, Identifier, TextStyle, Token};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::{
    Broadcast, Credentials, Dispatcher, ErrorCode, Event, MessageInfo, Op, Packet, Request,
    RequestBody, Response, ResponseBody, RoomInfo, Router, UserInfo,
};
pub use crate::transport::Connection;
