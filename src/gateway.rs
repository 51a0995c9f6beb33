//! Request/response access to the backup engine.
//!
//! [`CommandGateway`] is the transport seam: a command name plus a JSON
//! object of camelCase arguments in, one JSON value (or a rejection) out.
//! [`BackendApi`] layers one typed method per backend command on top.

mod api;
mod args;
mod http;
#[cfg(any(test, feature = "testing"))]
mod memory;
mod responses;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::Result;

pub use api::BackendApi;
pub use http::HttpGateway;
#[cfg(any(test, feature = "testing"))]
pub use memory::{HeldResponse, RecordedCall, ScriptedGateway};
pub use responses::{EventBatch, RemoteEvent};

#[async_trait]
pub trait CommandGateway: Send + Sync {
    /// Run `command` with `args` and return its result. Void commands yield `Value::Null`.
    async fn invoke(&self, command: &str, args: Value) -> Result<Value>;
}
