//! Question answering over fetched mail
//!
//! - `context` - bounded context block and summary lines
//! - `client` - chat-completion request/response
//! - `prompts` - fixed instruction text

mod client;
mod context;
mod prompts;

pub use client::ChatClient;
pub use context::summary_lines;
