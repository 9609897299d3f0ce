//! graphquery-ask: Plain-English questions over a Neo4j graph.
//!
//! A question is wrapped in a few-shot prompt together with the live schema,
//! a hosted language model writes the Cypher, the database runs it, and the
//! records are classified into a render mode for display. Successful
//! questions are kept in the session's history.

pub mod backend;
pub mod display;
pub mod examples;
pub mod history;
pub mod interpret;
pub mod pipeline;
pub mod prompt;
pub mod session;

pub use examples::{add_examples, get_examples};
pub use history::SessionHistory;
pub use interpret::{classify, render, RenderMode};
pub use prompt::{build_prompt, Prompt};
pub use session::Session;
