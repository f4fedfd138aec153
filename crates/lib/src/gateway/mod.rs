//! Gateway: same-origin HTTP relay between the chat client and the provider.
//!
//! The server side forwards one message per request with the server-held API
//! key; the client side is the session manager's seam (`Relay`).

mod client;
mod protocol;
mod server;

pub use client::{GatewayClient, GatewayError, Relay};
pub use protocol::{ChatError, ChatReply, ChatRequest};
pub use server::{run_gateway, GatewayState};
