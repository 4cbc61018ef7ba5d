//! API resources: thin REST wrappers over the transport client.

/// Message batches resource
pub mod batches;
/// Messages resource
pub mod messages;
/// Models resource
pub mod models;

pub use batches::Batches;
pub use messages::Messages;
pub use models::Models;
