//! Chat transports for the conversation agent
//!
//! Both transports feed user text into `AgentRuntime` and render the
//! resulting `OutgoingMessage`s in their own way.

pub mod console;
pub mod http;
