//! # Request Dispatcher
//!
//! Server-side consumer for request frames arriving on the router's
//! unsolicited channel: a handler registry keyed by operation. Handlers
//! produce the response that gets written back on the same connection.

use crate::error::{constants, ProtocolError, Result};
use crate::protocol::kind::{ErrorCode, Op};
use crate::protocol::request::Request;
use crate::protocol::response::Response;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

type HandlerFn = dyn Fn(&Request) -> Result<Response> + Send + Sync + 'static;

/// Request dispatcher with per-operation handler routing.
pub struct Dispatcher {
    handlers: Arc<RwLock<HashMap<Op, Box<HandlerFn>>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register the handler for one operation, replacing any previous one.
    pub fn register<F>(&self, op: Op, handler: F) -> Result<()>
    where
        F: Fn(&Request) -> Result<Response> + Send + Sync + 'static,
    {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| ProtocolError::Custom(constants::ERR_DISPATCHER_WRITE_LOCK.to_string()))?;

        handlers.insert(op, Box::new(handler));
        Ok(())
    }

    /// Route one request to its handler.
    ///
    /// An operation nobody registered still gets a well-formed answer: an
    /// `UnsupportedOperation` response echoing the request's correlation
    /// token. That is an application error for the caller to inspect, not a
    /// transport failure.
    pub fn dispatch(&self, request: &Request) -> Result<Response> {
        let op = request.op();

        let handlers = self
            .handlers
            .read()
            .map_err(|_| ProtocolError::Custom(constants::ERR_DISPATCHER_READ_LOCK.to_string()))?;

        match handlers.get(&op) {
            Some(handler) => handler(request),
            None => {
                warn!(op = op.name(), "no handler registered");
                Ok(Response::error(
                    request.correlation,
                    op,
                    ErrorCode::UnsupportedOperation,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ident::{Guid, Identifier};
    use crate::protocol::request::{Credentials, RequestBody};
    use crate::protocol::response::ResponseBody;

    fn logout_request() -> Request {
        Request {
            correlation: Identifier::from_parts(5, 5, 5),
            credentials: Credentials::Session {
                user_id: Guid::NIL,
                session_id: Guid::NIL,
            },
            body: RequestBody::Logout,
        }
    }

    #[test]
    fn registered_handler_runs() {
        let dispatcher = Dispatcher::new();
        dispatcher
            .register(Op::Logout, |request| {
                Ok(Response::ok(request.correlation, ResponseBody::Logout))
            })
            .unwrap();

        let response = dispatcher.dispatch(&logout_request()).unwrap();
        assert_eq!(response.status, ErrorCode::Success);
        assert_eq!(response.correlation, Identifier::from_parts(5, 5, 5));
    }

    #[test]
    fn unregistered_operation_answers_unsupported() {
        let dispatcher = Dispatcher::new();
        let response = dispatcher.dispatch(&logout_request()).unwrap();
        assert_eq!(response.status, ErrorCode::UnsupportedOperation);
        assert_eq!(response.op, Op::Logout);
        assert_eq!(response.body, None);
    }
}
