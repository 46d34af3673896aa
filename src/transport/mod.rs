//! # Connection Transport
//!
//! One duplex stream, two mutually exclusive access modes: concurrent
//! operations and the exclusive rental. The gate enforces the discipline;
//! the connection applies it to a framed stream.

pub mod connection;
pub mod gate;

pub use connection::{Connection, FrameSource, Rental};
pub use gate::{OperationPermit, RentalGate, RentalPermit};
