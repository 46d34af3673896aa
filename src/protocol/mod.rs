//! # Protocol Layer
//!
//! The packet type hierarchy and the machinery that moves it: discriminants,
//! payload records, the request/response/broadcast unions, the router that
//! multiplexes exchanges over one connection, and the server-side dispatcher.

pub mod broadcast;
pub mod dispatcher;
pub mod kind;
pub mod packet;
pub mod records;
pub mod request;
pub mod response;
pub mod router;


pub use broadcast::Broadcast;
pub use dispatcher::Dispatcher;
pub use kind::{ErrorCode, Event, Op};
pub use packet::Packet;
pub use records::{MessageInfo, RoomInfo, UserInfo};
pub use request::{Credentials, Request, RequestBody};
pub use response::{Response, ResponseBody};
pub use router::Router;
