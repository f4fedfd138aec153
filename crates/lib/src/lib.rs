//! NexaChat core library — config, persistent store, session manager,
//! provider client, and gateway used by the CLI.

pub mod config;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod session;
pub mod store;
