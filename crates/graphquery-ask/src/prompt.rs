//! Few-shot prompt construction and completion cleanup.
//!
//! Prompt layout, with blocks separated by blank lines:
//!
//! ```text
//! <instructions>
//! Schema:
//! <schema text>
//!
//! User input: <example question>
//! Cypher query: <example query>
//! ...
//! User input: <live question>
//! Cypher query:
//! ```
//!
//! The final line is left open for the model to complete. Nothing in the
//! question or schema is escaped.

use std::fmt;

use graphquery_core::Example;

/// Generation stops at the first blank line or code fence.
pub const STOP_SEQUENCES: [&str; 2] = ["\n\n", "```"];

const PREFIX: &str = "Task: Generate a Cypher statement to query a Neo4j graph database.
Instructions:
- Use only the provided schema.
- Do not include any explanations or extra text.
- Do not wrap the query in quotes or backticks.
- Output ONLY the Cypher statement.

Schema:
";

const EXAMPLE_SEPARATOR: &str = "\n\n";

/// A fully rendered prompt. Built once per model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn render_example(example: &Example) -> String {
    format!(
        "User input: {}\nCypher query: {}",
        example.question, example.query
    )
}

fn render_suffix(question: &str) -> String {
    format!("User input: {question}\nCypher query:")
}

fn render_prefix(schema: &str) -> String {
    format!("{PREFIX}{schema}\n")
}

/// Assemble the generation prompt.
pub fn build_prompt(schema: &str, question: &str, examples: &[Example]) -> Prompt {
    let mut blocks = Vec::with_capacity(examples.len() + 2);
    blocks.push(render_prefix(schema));
    blocks.extend(examples.iter().map(render_example));
    blocks.push(render_suffix(question));
    Prompt(blocks.join(EXAMPLE_SEPARATOR))
}

/// Assemble the one-shot repair prompt sent after a generated query failed
/// the database's validation.
pub fn build_repair_prompt(
    schema: &str,
    question: &str,
    examples: &[Example],
    failed_query: &str,
    error: &str,
) -> Prompt {
    let mut blocks = Vec::with_capacity(examples.len() + 3);
    blocks.push(render_prefix(schema));
    blocks.extend(examples.iter().map(render_example));
    blocks.push(format!(
        "A previous attempt for the next question was rejected by the database.\n\
         Rejected query: {}\n\
         Database error: {}\n\
         Write a corrected Cypher statement.",
        single_line(failed_query),
        single_line(error)
    ));
    blocks.push(render_suffix(question));
    Prompt(blocks.join(EXAMPLE_SEPARATOR))
}

/// Collapse whitespace runs so the text cannot open a blank line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull the Cypher statement out of a raw completion.
///
/// Models occasionally echo the `Cypher query:` label, open a code fence, or
/// quote the statement despite the instructions.
pub fn extract_query(completion: &str) -> String {
    let mut text = completion.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest
            .strip_prefix("cypher")
            .or_else(|| rest.strip_prefix("Cypher"))
            .unwrap_or(rest);
        text = rest.trim();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim();
    }

    for label in ["Cypher query:", "cypher query:", "Query:", "Cypher:"] {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim();
            break;
        }
    }

    for quote in ['`', '"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = text[1..text.len() - 1].trim();
            break;
        }
    }

    text.to_string()
}
