//! GraphQuery LLM — text completion against an OpenAI-compatible API.
//!
//! The model is treated as a plain completion oracle: a prompt goes in, the
//! text up to the first stop sequence comes out. No streaming.

mod chat;
pub mod client;
pub mod error;

pub use client::{apply_stop, LlmClient};
pub use error::LlmError;
