//! Text and JSON output for the CLI and shell.

use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Table};
use serde_json::json;

use graphquery_core::{DatabaseStats, QueryOutcome, QueryRecord};

use crate::interpret::{classify, render};

/// Output format chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Rendered result, then the Cypher that produced it and the latency.
pub fn format_outcome(outcome: &QueryOutcome) -> String {
    format!(
        "{}\n\nCypher: {}\nExecution time: {:.3}s",
        render(&classify(&outcome.result)),
        outcome.generated_query,
        outcome.execution_time.as_secs_f64()
    )
}

/// Machine-readable form of an answered question.
pub fn outcome_json(question: &str, outcome: &QueryOutcome) -> serde_json::Value {
    json!({
        "question": question,
        "query": outcome.generated_query,
        "result": outcome.result,
        "execution_time_secs": outcome.execution_time.as_secs_f64(),
    })
}

/// One history entry: local time and question, the query, latency, result.
pub fn format_record(record: &QueryRecord) -> String {
    format!(
        "{} - {}\nCypher: {}\nLatency: {:.3}s\n{}",
        record.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        record.question,
        record.query,
        record.execution_time.as_secs_f64(),
        render(&classify(&record.result))
    )
}

/// Records are expected most recent first, as `SessionHistory::recent` yields them.
pub fn format_history(records: &[&QueryRecord]) -> String {
    if records.is_empty() {
        return "No questions asked yet.".to_string();
    }
    records
        .iter()
        .map(|r| format_record(r))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_stats(stats: &DatabaseStats) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Movies", "Actors", "Directors", "Genres"]);
    table.add_row(vec![
        stats.movies.to_string(),
        stats.actors.to_string(),
        stats.directors.to_string(),
        stats.genres.to_string(),
    ]);
    table.to_string()
}

/// Numbered list, one question per line.
pub fn format_questions(questions: &[&str]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{:>2}. {q}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
