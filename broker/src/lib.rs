//! In-process topics with broadcast fan-out, the runtime that dispatches
//! registered functions over them and the TCP gateway that lets network
//! clients publish and subscribe.

mod broker;
pub mod gateway;
mod runtime;

pub use broker::{Broker, Subscription};
pub use runtime::Runtime;

/// The value carried by every topic.
pub type Payload = serde_json::Value;
